//! Shared utilities

pub mod config;
pub mod diagnostic;
pub mod process;

pub use config::{Config, DetectionConfig, ExtraCompiler, ToolchainStore};
pub use diagnostic::Diagnostic;
