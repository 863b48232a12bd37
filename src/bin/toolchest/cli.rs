//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use toolchest::Language;

/// toolchest - find and manage C/C++ compiler toolchains
#[derive(Parser)]
#[command(name = "toolchest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Toolchain store to use (defaults to ~/.toolchest/toolchains.toml)
    #[arg(long, global = true, env = "TOOLCHEST_STORE")]
    pub store: Option<PathBuf>,

    /// Directory to search for compilers instead of PATH (repeatable)
    #[arg(long = "search-path", global = true, value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect installed compilers
    Detect(DetectArgs),

    /// List known toolchains
    List(ListArgs),

    /// Create a toolchain by hand
    Add(AddArgs),

    /// Remove a toolchain
    Remove(IdArgs),

    /// Duplicate a toolchain
    Clone(IdArgs),

    /// Change the display name of a toolchain
    Rename(RenameArgs),

    /// Check the known toolchains against a kit
    Check(CheckArgs),

    /// Show the supported languages
    Languages(JsonArgs),
}

#[derive(Args)]
pub struct DetectArgs {
    /// Add detected toolchains to the store
    #[arg(long)]
    pub save: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct JsonArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Toolchain kind (gcc, clang, custom)
    #[arg(long)]
    pub kind: String,

    /// Language (c, c++)
    #[arg(long)]
    pub language: Language,

    /// Compiler executable
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Toolchain id (or a unique prefix of it)
    pub id: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Toolchain id (or a unique prefix of it)
    pub id: String,

    /// New display name (empty resets to the default name)
    pub name: String,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Target triple of the kit
    #[arg(long)]
    pub target: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
