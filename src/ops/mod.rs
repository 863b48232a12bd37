//! High-level operations.
//!
//! This module contains the implementation of toolchest commands.

pub mod toolchains;

pub use toolchains::{
    add, check, clone, detect, format_check_report, format_toolchains, languages, list, remove,
    rename, AddOptions, CheckOptions, CheckReport, ContextOptions, DetectOptions, DetectReport,
    ToolchainContext, ToolchainSummary,
};
