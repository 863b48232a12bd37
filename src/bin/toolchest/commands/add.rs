//! `toolchest add` command

use anyhow::Result;

use crate::cli::AddArgs;
use toolchest::ops::{self, AddOptions, ToolchainContext};

pub fn execute(ctx: &ToolchainContext, args: AddArgs) -> Result<()> {
    let added = ops::add(
        ctx,
        AddOptions {
            kind: args.kind,
            language: args.language,
            compiler: args.path,
            name: args.name,
        },
    )?;

    println!("Added {} ({})", added.display_name, added.id);
    Ok(())
}
