//! `toolchest list` command

use anyhow::Result;

use crate::cli::ListArgs;
use crate::commands::print_json;
use toolchest::ops::{self, ToolchainContext};
use toolchest::util::diagnostic::suggestions;

pub fn execute(ctx: &ToolchainContext, args: ListArgs) -> Result<()> {
    let toolchains = ops::list(ctx)?;

    if args.json {
        return print_json(&toolchains);
    }

    if toolchains.is_empty() {
        println!("No toolchains known.");
        eprintln!("{}", suggestions::NO_TOOLCHAINS);
        return Ok(());
    }

    print!("{}", ops::format_toolchains(&toolchains));
    Ok(())
}
