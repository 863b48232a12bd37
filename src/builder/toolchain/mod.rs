//! Toolchain abstraction for C/C++ compilers.
//!
//! Every compiler family is a toolchain kind: a type implementing
//! [`Toolchain`] plus a [`ToolchainFactory`] that detects, creates and
//! restores it. Code that manages toolchains only ever sees
//! `Box<dyn Toolchain>` and `dyn ToolchainFactory`.
//!
//! Built-in kinds:
//! - `gcc` and `clang` ([`GccToolchain`])
//! - `msvc` ([`MsvcToolchain`])
//! - `custom` ([`CustomToolchain`])

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::detection::Detection;
use crate::core::error::ToolchainError;
use crate::core::ids::{InstanceId, ToolchainTypeId};
use crate::core::kit::Kit;
use crate::core::language::Language;
use crate::util::diagnostic::Diagnostic;

mod custom;
mod data;
mod descriptor;
mod detect;
mod events;
mod factory;
mod gcc;
mod msvc;
mod registry;

pub use custom::{CustomToolchain, CustomToolchainFactory, CUSTOM_TYPE_ID};
pub use data::{
    auto_detection_to_map, id_from_map, type_id_from_map, value_bool, value_int, value_string,
    value_string_list, ToolchainData, AUTODETECT_KEY, DISPLAY_NAME_KEY, ID_KEY, LANGUAGE_KEY,
    UNKNOWN_ID,
};
pub use descriptor::ToolchainCore;
pub use detect::{infer_target_triple, CompilerSearch};
pub use events::{EventLog, ToolchainEvent, ToolchainObserver, TracingObserver};
pub use factory::ToolchainFactory;
pub use gcc::{GccFamily, GccToolchain, GccToolchainFactory, CLANG_TYPE_ID, GCC_TYPE_ID};
pub use msvc::{MsvcToolchain, MsvcToolchainFactory, MSVC_TYPE_ID};
pub use registry::ToolchainFactoryRegistry;

/// A compiler toolchain.
///
/// Implementors embed a [`ToolchainCore`] and expose it through
/// [`core`](Toolchain::core)/[`core_mut`](Toolchain::core_mut); the provided
/// methods implement identity, naming, language, provenance and persistence
/// on top of it. Kinds override the hooks (`extend_map`, `restore_extra`,
/// `validate_kit`, ...) to add their own state.
pub trait Toolchain: Send + Sync + fmt::Debug {
    /// Shared descriptor state.
    fn core(&self) -> &ToolchainCore;

    /// Mutable shared descriptor state.
    fn core_mut(&mut self) -> &mut ToolchainCore;

    /// Default display name of this kind (e.g., "GCC").
    fn type_display_name(&self) -> String;

    /// Access to the concrete type, for kind-specific comparisons.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Duplicate this toolchain, or `None` if [`can_clone`](Toolchain::can_clone) is false.
    ///
    /// Implementations build the copy around [`ToolchainCore::clone_of`].
    fn clone_toolchain(&self) -> Option<Box<dyn Toolchain>>;

    /// Configured display name, or the type display name when none is set.
    fn display_name(&self) -> String {
        let fallback = self.type_display_name();
        self.core().display_name_or(&fallback).to_string()
    }

    /// Rename the toolchain. Notifies only when the name actually changes.
    fn set_display_name(&mut self, name: &str) {
        let fallback = self.type_display_name();
        self.core_mut().set_display_name(name, &fallback);
    }

    fn id(&self) -> &InstanceId {
        self.core().id()
    }

    fn type_id(&self) -> &ToolchainTypeId {
        self.core().type_id()
    }

    fn language(&self) -> Language {
        self.core().language()
    }

    /// One-time language initialization.
    fn set_language(&mut self, language: Language) -> Result<(), ToolchainError> {
        self.core_mut().set_language(language)
    }

    fn detection(&self) -> Detection {
        self.core().detection()
    }

    /// Change the provenance. Notifies only when it actually changes.
    fn set_detection(&mut self, detection: Detection) {
        self.core_mut().set_detection(detection);
    }

    fn is_auto_detected(&self) -> bool {
        self.core().is_auto_detected()
    }

    /// Attach the observer notified on every accepted mutation.
    fn set_observer(&mut self, observer: Arc<dyn ToolchainObserver>) {
        self.core_mut().set_observer(observer);
    }

    /// Compiler executable, for kinds that have one.
    fn compiler_path(&self) -> Option<&Path> {
        None
    }

    /// Point the toolchain at a different compiler.
    ///
    /// Returns `false` for kinds whose compiler cannot be changed.
    fn set_compiler_path(&mut self, _path: PathBuf) -> bool {
        false
    }

    /// Target triple the compiler produces code for, if known.
    fn target_triple(&self) -> Option<&str> {
        None
    }

    /// Kind-specific part of equality. Type and provenance are already
    /// known to match when this is called.
    fn same_configuration(&self, _other: &dyn Toolchain) -> bool {
        true
    }

    /// Whether the toolchain can be duplicated.
    fn can_clone(&self) -> bool {
        true
    }

    /// Problems between this toolchain and `kit`, in order. Empty when none.
    fn validate_kit(&self, _kit: &Kit) -> Vec<Diagnostic> {
        Vec::new()
    }

    /// Serialize the toolchain. Base keys come first, kind keys after.
    fn to_map(&self) -> ToolchainData {
        let mut data = self.core().to_map(&self.display_name());
        self.extend_map(&mut data);
        data
    }

    /// Append kind-specific keys. Must not remove or rewrite base keys.
    fn extend_map(&self, _data: &mut ToolchainData) {}

    /// Restore the toolchain from persisted data.
    ///
    /// The persisted type id must be this toolchain's own type id. On a
    /// malformed id or a type mismatch nothing is changed.
    fn from_map(&mut self, data: &ToolchainData) -> Result<(), ToolchainError> {
        let found = ToolchainCore::persisted_type_id(data)?;
        if found != *self.type_id() {
            return Err(ToolchainError::TypeMismatch {
                expected: self.type_id().to_string(),
                found: found.to_string(),
            });
        }
        self.core_mut().from_map(data)?;
        self.restore_extra(data)
    }

    /// Read kind-specific keys. Called after the base keys were restored.
    fn restore_extra(&mut self, _data: &ToolchainData) -> Result<(), ToolchainError> {
        Ok(())
    }
}

impl PartialEq for dyn Toolchain {
    fn eq(&self, other: &dyn Toolchain) -> bool {
        if std::ptr::addr_eq(self as *const dyn Toolchain, other as *const dyn Toolchain) {
            return true;
        }

        // Display name and instance id are deliberately ignored.
        self.type_id() == other.type_id()
            && self.is_auto_detected() == other.is_auto_detected()
            && self.same_configuration(other)
    }
}
