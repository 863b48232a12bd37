//! `toolchest check` command

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use crate::commands::print_json;
use toolchest::ops::{self, CheckOptions, ToolchainContext};

pub fn execute(ctx: &ToolchainContext, args: CheckArgs, color: bool) -> Result<()> {
    let report = ops::check(ctx, CheckOptions { target: args.target })?;

    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", ops::format_check_report(&report, color));
    }

    if report.has_errors() {
        bail!("toolchain check failed");
    }
    Ok(())
}
