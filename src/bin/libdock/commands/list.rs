//! `libdock list` command

use anyhow::Result;

use libdock::util::diagnostic::{emit, suggestions, Diagnostic};
use libdock::LibraryRecord;

use crate::cli::{GlobalArgs, ListArgs};
use crate::commands::Session;

pub fn execute(args: ListArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;

    if args.supported && !session.has_board() {
        let diag = Diagnostic::warning("no board selected; `--supported` matches nothing")
            .with_suggestion(suggestions::NO_BOARD);
        emit(&diag, !global.no_color);
    }

    let libraries = session.manager.load_libraries(args.update)?;
    let selected: Vec<&LibraryRecord> = libraries.iter().filter(|r| args.matches(r)).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    if selected.is_empty() {
        eprintln!("No libraries found");
        return Ok(());
    }

    let width = selected.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for record in &selected {
        println!("{}", format_line(record, width));
    }

    eprintln!("{} of {} libraries", selected.len(), libraries.len());

    Ok(())
}

impl ListArgs {
    fn matches(&self, record: &LibraryRecord) -> bool {
        (!self.installed || record.installed)
            && (!self.supported || record.supported == Some(true))
            && (!self.builtin || record.built_in)
            && (!self.updatable || record.update_available())
    }
}

/// One listing row: `name  installed-version  [flags]`.
fn format_line(record: &LibraryRecord, width: usize) -> String {
    let version = record.installed_version.as_deref().unwrap_or("-");

    let mut flags = Vec::new();
    if record.installed {
        flags.push("installed");
    }
    if record.built_in {
        flags.push("built-in");
    }
    if record.update_available() {
        flags.push("update");
    }
    if record.supported == Some(false) {
        flags.push("unsupported");
    }

    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", flags.join(", "))
    };

    format!("{:<width$}  {:<8}{}", record.name, version, flags, width = width)
}
