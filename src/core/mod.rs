//! Core data structures for toolchest.
//!
//! This module contains the foundational types used throughout toolchest:
//! - Languages and detection provenance
//! - Toolchain identifiers (type ids, instance ids)
//! - Kits
//! - The toolchain error type

pub mod detection;
pub mod error;
pub mod ids;
pub mod kit;
pub mod language;

pub use detection::Detection;
pub use error::ToolchainError;
pub use ids::{InstanceId, ToolchainTypeId};
pub use kit::Kit;
pub use language::Language;
