//! `toolchest clone` command

use anyhow::Result;

use crate::cli::IdArgs;
use toolchest::ops::{self, ToolchainContext};

pub fn execute(ctx: &ToolchainContext, args: IdArgs) -> Result<()> {
    let copy = ops::clone(ctx, &args.id)?;
    println!("Created {} ({})", copy.display_name, copy.id);
    Ok(())
}
