//! toolchest CLI - find and manage C/C++ compiler toolchains

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use toolchest::ops::{ContextOptions, ToolchainContext};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("toolchest=debug")
    } else {
        EnvFilter::new("toolchest=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let color = !cli.no_color && std::io::stderr().is_terminal();

    let ctx = ToolchainContext::load(ContextOptions {
        project_root: None,
        store: cli.store,
        search_paths: cli.search_paths,
    })?;

    // Execute command
    match cli.command {
        Commands::Detect(args) => commands::detect::execute(&ctx, args),
        Commands::List(args) => commands::list::execute(&ctx, args),
        Commands::Add(args) => commands::add::execute(&ctx, args),
        Commands::Remove(args) => commands::remove::execute(&ctx, args),
        Commands::Clone(args) => commands::clone::execute(&ctx, args),
        Commands::Rename(args) => commands::rename::execute(&ctx, args),
        Commands::Check(args) => commands::check::execute(&ctx, args, color),
        Commands::Languages(args) => commands::languages::execute(&args),
    }
}
