//! `toolchest detect` command

use anyhow::Result;

use crate::cli::DetectArgs;
use crate::commands::print_json;
use toolchest::ops::{self, DetectOptions, ToolchainContext};

pub fn execute(ctx: &ToolchainContext, args: DetectArgs) -> Result<()> {
    let report = ops::detect(ctx, DetectOptions { save: args.save })?;

    if args.json {
        return print_json(&report);
    }

    if report.found.is_empty() {
        println!("No new toolchains found.");
        return Ok(());
    }

    print!("{}", ops::format_toolchains(&report.found));
    if report.saved {
        println!("Saved {} toolchain(s) to {}", report.found.len(), ctx.store_path.display());
    } else {
        println!("Run with --save to keep them.");
    }
    Ok(())
}
