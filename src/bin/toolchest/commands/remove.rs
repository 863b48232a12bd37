//! `toolchest remove` command

use anyhow::Result;

use crate::cli::IdArgs;
use toolchest::ops::{self, ToolchainContext};

pub fn execute(ctx: &ToolchainContext, args: IdArgs) -> Result<()> {
    let removed = ops::remove(ctx, &args.id)?;
    println!("Removed {} ({})", removed.display_name, removed.id);
    Ok(())
}
