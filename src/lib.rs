//! toolchest - discovery and bookkeeping of C/C++ compiler toolchains
//!
//! This crate provides the toolchain model (descriptors, factories and
//! their registry), persistence of known toolchains, and the operations
//! behind the `toolchest` command line tool.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

pub use crate::builder::toolchain::{
    Toolchain, ToolchainData, ToolchainFactory, ToolchainFactoryRegistry,
};
pub use crate::core::{Detection, InstanceId, Kit, Language, ToolchainError, ToolchainTypeId};
pub use crate::util::config::{Config, ToolchainStore};
