//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// libdock - Browse the Arduino library catalog and your installed libraries
#[derive(Parser)]
#[command(name = "libdock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Board to check compatibility against (vendor:arch:board)
    #[arg(long, global = true, value_name = "FQBN", env = "LIBDOCK_BOARD")]
    pub board: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known libraries
    List(ListArgs),

    /// Show details for one library
    Show(ShowArgs),

    /// Download a fresh library index
    Update(UpdateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only installed libraries
    #[arg(long)]
    pub installed: bool,

    /// Only libraries compatible with the selected board
    #[arg(long)]
    pub supported: bool,

    /// Only libraries bundled with the IDE or a board package
    #[arg(long)]
    pub builtin: bool,

    /// Only installed libraries with a newer version in the index
    #[arg(long)]
    pub updatable: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Refresh the library index before listing
    #[arg(long)]
    pub update: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Library name, as displayed or with spaces replaced by underscores
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct UpdateArgs {}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
