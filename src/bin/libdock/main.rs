//! libdock CLI - Browse the Arduino library catalog

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use libdock::util::diagnostic::{emit, Diagnostic};
use libdock::LoadError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.global.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("libdock=debug")
    } else {
        EnvFilter::new("libdock=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.global.no_color)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::List(args) => commands::list::execute(args, &cli.global),
        Commands::Show(args) => commands::show::execute(args, &cli.global),
        Commands::Update(args) => commands::update::execute(args, &cli.global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, as a diagnostic when it carries one.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(load) = err.downcast_ref::<LoadError>() {
        emit(&load.to_diagnostic(), color);
    } else if let Some(diag) = err.downcast_ref::<Diagnostic>() {
        emit(diag, color);
    } else {
        eprintln!("error: {:#}", err);
    }
}
