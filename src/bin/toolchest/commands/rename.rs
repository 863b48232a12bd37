//! `toolchest rename` command

use anyhow::Result;

use crate::cli::RenameArgs;
use toolchest::ops::{self, ToolchainContext};

pub fn execute(ctx: &ToolchainContext, args: RenameArgs) -> Result<()> {
    let renamed = ops::rename(ctx, &args.id, &args.name)?;
    println!("Renamed {} to {}", renamed.id, renamed.display_name);
    Ok(())
}
