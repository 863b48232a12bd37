//! Custom toolchains: any compiler the user points us at.

use std::path::{Path, PathBuf};

use toml::Value;

use crate::core::detection::Detection;
use crate::core::error::ToolchainError;
use crate::core::ids::ToolchainTypeId;
use crate::core::kit::Kit;
use crate::core::language::Language;
use crate::util::config::ExtraCompiler;
use crate::util::diagnostic::Diagnostic;

use super::data::{value_string, value_string_list, ToolchainData};
use super::detect::{infer_target_triple, is_claimed, CompilerSearch};
use super::factory::{restore_into, ToolchainFactory};
use super::{Toolchain, ToolchainCore};

pub const CUSTOM_TYPE_ID: ToolchainTypeId = ToolchainTypeId::from_static("custom");

const COMPILER_PATH_KEY: &str = "ProjectExplorer.CustomToolChain.CompilerPath";
const FLAGS_KEY: &str = "ProjectExplorer.CustomToolChain.Flags";

/// A user-specified compiler with optional extra flags.
#[derive(Debug)]
pub struct CustomToolchain {
    core: ToolchainCore,
    compiler_path: Option<PathBuf>,
    extra_flags: Vec<String>,
    target_triple: Option<String>,
}

impl CustomToolchain {
    pub fn new() -> Self {
        CustomToolchain {
            core: ToolchainCore::new(CUSTOM_TYPE_ID, Detection::Manual),
            compiler_path: None,
            extra_flags: Vec::new(),
            target_triple: None,
        }
    }

    /// Toolchain for a compiler listed in the detection settings.
    pub fn from_settings(extra: &ExtraCompiler) -> Result<Self, ToolchainError> {
        let mut tc = CustomToolchain {
            core: ToolchainCore::new(CUSTOM_TYPE_ID, Detection::AutoFromSettings),
            compiler_path: Some(extra.path.clone()),
            extra_flags: extra.flags.clone(),
            target_triple: infer_target_triple(&extra.path),
        };
        tc.core.set_language(extra.language)?;

        let name = match &extra.name {
            Some(name) => name.clone(),
            None => format!(
                "Custom {} ({})",
                extra.language.display_name(),
                extra.path.display()
            ),
        };
        tc.set_display_name(&name);
        Ok(tc)
    }

    pub fn extra_flags(&self) -> &[String] {
        &self.extra_flags
    }

    pub fn set_extra_flags(&mut self, flags: Vec<String>) {
        if self.extra_flags != flags {
            self.extra_flags = flags;
            self.core.notify_configuration_changed();
        }
    }
}

impl Default for CustomToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolchain for CustomToolchain {
    fn core(&self) -> &ToolchainCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ToolchainCore {
        &mut self.core
    }

    fn type_display_name(&self) -> String {
        "Custom".to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn clone_toolchain(&self) -> Option<Box<dyn Toolchain>> {
        Some(Box::new(CustomToolchain {
            core: ToolchainCore::clone_of(&self.core, &self.display_name()),
            compiler_path: self.compiler_path.clone(),
            extra_flags: self.extra_flags.clone(),
            target_triple: self.target_triple.clone(),
        }))
    }

    fn compiler_path(&self) -> Option<&Path> {
        self.compiler_path.as_deref()
    }

    fn set_compiler_path(&mut self, path: PathBuf) -> bool {
        if self.compiler_path.as_ref() != Some(&path) {
            self.target_triple = infer_target_triple(&path);
            self.compiler_path = Some(path);
            self.core.notify_configuration_changed();
        }
        true
    }

    fn target_triple(&self) -> Option<&str> {
        self.target_triple.as_deref()
    }

    fn same_configuration(&self, other: &dyn Toolchain) -> bool {
        other
            .as_any()
            .downcast_ref::<CustomToolchain>()
            .is_some_and(|other| {
                other.compiler_path == self.compiler_path && other.extra_flags == self.extra_flags
            })
    }

    fn validate_kit(&self, _kit: &Kit) -> Vec<Diagnostic> {
        match &self.compiler_path {
            None => vec![Diagnostic::error(format!(
                "`{}` has no compiler set",
                self.display_name()
            ))
            .with_suggestion("Set a compiler path with `toolchest add --path`")],
            Some(path) if !path.exists() => vec![Diagnostic::error(format!(
                "compiler of `{}` does not exist",
                self.display_name()
            ))
            .with_location(path)],
            Some(_) => Vec::new(),
        }
    }

    fn extend_map(&self, data: &mut ToolchainData) {
        if let Some(path) = &self.compiler_path {
            data.insert(
                COMPILER_PATH_KEY.to_string(),
                Value::String(path.to_string_lossy().into_owned()),
            );
        }
        data.insert(
            FLAGS_KEY.to_string(),
            Value::Array(
                self.extra_flags
                    .iter()
                    .map(|flag| Value::String(flag.clone()))
                    .collect(),
            ),
        );
    }

    fn restore_extra(&mut self, data: &ToolchainData) -> Result<(), ToolchainError> {
        self.compiler_path = value_string(data, COMPILER_PATH_KEY)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        self.target_triple = self.compiler_path.as_deref().and_then(infer_target_triple);
        self.extra_flags = value_string_list(data, FLAGS_KEY);
        Ok(())
    }
}

/// Factory for custom toolchains.
///
/// Only compilers listed under `extra_compilers` in the detection settings
/// are "detected"; everything else is created by hand.
#[derive(Debug)]
pub struct CustomToolchainFactory {
    type_id: ToolchainTypeId,
    extra: Vec<ExtraCompiler>,
    search: CompilerSearch,
}

impl CustomToolchainFactory {
    pub fn new(extra: Vec<ExtraCompiler>, search: CompilerSearch) -> Self {
        CustomToolchainFactory {
            type_id: CUSTOM_TYPE_ID,
            extra,
            search,
        }
    }
}

impl ToolchainFactory for CustomToolchainFactory {
    fn type_id(&self) -> &ToolchainTypeId {
        &self.type_id
    }

    fn display_name(&self) -> &str {
        "Custom"
    }

    fn auto_detect(&self, already_known: &[Box<dyn Toolchain>]) -> Vec<Box<dyn Toolchain>> {
        let mut result: Vec<Box<dyn Toolchain>> = Vec::new();

        for extra in &self.extra {
            if let Err(reason) = self.search.check(&extra.path) {
                tracing::warn!("ignoring configured compiler: {}", reason);
                continue;
            }
            let claimed = is_claimed(already_known, &self.type_id, extra.language, &extra.path)
                || is_claimed(&result, &self.type_id, extra.language, &extra.path);
            if claimed {
                continue;
            }
            match CustomToolchain::from_settings(extra) {
                Ok(tc) => result.push(Box::new(tc)),
                Err(e) => tracing::warn!(
                    "ignoring configured compiler {}: {}",
                    extra.path.display(),
                    e
                ),
            }
        }

        result
    }

    fn can_create(&self) -> bool {
        true
    }

    fn create(&self, language: Language) -> Option<Box<dyn Toolchain>> {
        let mut tc = CustomToolchain::new();
        tc.set_language(language).ok()?;
        Some(Box::new(tc))
    }

    fn can_restore(&self, data: &ToolchainData) -> bool {
        self.is_own_type(data)
    }

    fn restore(&self, data: &ToolchainData) -> Option<Box<dyn Toolchain>> {
        restore_into(CustomToolchain::new(), data)
    }
}
