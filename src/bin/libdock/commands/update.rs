//! `libdock update` command

use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{GlobalArgs, UpdateArgs};
use crate::commands::Session;

pub fn execute(_args: UpdateArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let start = Instant::now();

    let spinner = if global.verbose {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Updating library index");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = session.manager.load_libraries(true);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let libraries = result?;
    let installed = libraries.iter().filter(|r| r.installed).count();
    let updatable = libraries.iter().filter(|r| r.update_available()).count();

    eprintln!(
        "     Updated library index in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    eprintln!(
        "{} libraries, {} installed, {} with updates",
        libraries.len(),
        installed,
        updatable
    );

    Ok(())
}
