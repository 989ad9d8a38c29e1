//! `libdock show` command

use std::fmt::Write;

use anyhow::Result;

use libdock::util::diagnostic::{suggestions, Diagnostic};
use libdock::LibraryRecord;

use crate::cli::{GlobalArgs, ShowArgs};
use crate::commands::Session;

pub fn execute(args: ShowArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    session.manager.load_libraries(false)?;

    let Some(record) = session.manager.find(&args.name) else {
        return Err(Diagnostic::error(format!("library `{}` not found", args.name))
            .with_suggestion(suggestions::LIBRARY_NOT_FOUND)
            .into());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", describe(&record));
    }

    Ok(())
}

fn describe(record: &LibraryRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", record.name);

    let mut field = |label: &str, value: Option<&str>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = writeln!(out, "  {:<12} {}", format!("{}:", label), value);
        }
    };

    field("author", record.author.as_deref());
    field("maintainer", record.maintainer.as_deref());
    field("sentence", record.sentence.as_deref());
    field("category", record.category.as_deref());
    field("website", record.website.as_deref());
    field("installed", record.installed_version.as_deref());
    field("latest", record.latest_version());

    let path = record.installed_path.as_ref().map(|p| p.display().to_string());
    field("path", path.as_deref());

    let architectures = record.effective_architectures().join(", ");
    field("archs", Some(architectures.as_str()));

    let supported = record.supported.map(|s| if s { "yes" } else { "no" });
    field("supported", supported);

    let mut notes = Vec::new();
    if record.built_in {
        notes.push("built-in");
    }
    if record.update_available() {
        notes.push("update available");
    }
    let notes = notes.join(", ");
    field("notes", Some(notes.as_str()));

    out
}
