//! Compiler toolchains.
//!
//! Descriptors for the compilers a build can use, and the factories that
//! find, create and restore them.

pub mod toolchain;

pub use toolchain::{Toolchain, ToolchainFactory, ToolchainFactoryRegistry};
