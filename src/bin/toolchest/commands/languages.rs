//! `toolchest languages` command

use anyhow::Result;

use crate::cli::JsonArgs;
use crate::commands::print_json;
use toolchest::ops;

pub fn execute(args: &JsonArgs) -> Result<()> {
    let languages = ops::languages();

    if args.json {
        return print_json(&languages);
    }

    for language in &languages {
        println!("{:<4} {} ({})", language.ordinal, language.display_name, language.id);
    }
    Ok(())
}
