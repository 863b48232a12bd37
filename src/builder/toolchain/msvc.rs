//! MSVC toolchain implementation.
//!
//! One `cl` installation compiles both C and C++, so detection yields a
//! descriptor per language for every compiler found.

use std::path::{Path, PathBuf};

use toml::Value;

use crate::core::detection::Detection;
use crate::core::error::ToolchainError;
use crate::core::ids::ToolchainTypeId;
use crate::core::kit::Kit;
use crate::core::language::{all_languages, Language};
use crate::util::diagnostic::Diagnostic;

use super::data::{value_string, ToolchainData};
use super::detect::{is_claimed, msvc_host_arch, CompilerSearch};
use super::factory::{restore_into, ToolchainFactory};
use super::{Toolchain, ToolchainCore};

pub const MSVC_TYPE_ID: ToolchainTypeId = ToolchainTypeId::from_static("msvc");

const PATH_KEY: &str = "ProjectExplorer.MsvcToolChain.Path";
const ARCH_KEY: &str = "ProjectExplorer.MsvcToolChain.Arch";

const KNOWN_ARCHES: &[&str] = &["x64", "x86", "arm64", "arm"];

/// Microsoft Visual C++ toolchain.
#[derive(Debug)]
pub struct MsvcToolchain {
    core: ToolchainCore,
    cl_path: Option<PathBuf>,
    arch: Option<String>,
}

impl MsvcToolchain {
    pub fn new() -> Self {
        MsvcToolchain {
            core: ToolchainCore::new(MSVC_TYPE_ID, Detection::Manual),
            cl_path: None,
            arch: None,
        }
    }

    /// Toolchain for a `cl` found by autodetection.
    pub fn detected(language: Language, cl_path: PathBuf) -> Result<Self, ToolchainError> {
        let arch = arch_from_path(&cl_path).or_else(|| msvc_host_arch().map(str::to_string));
        let mut tc = MsvcToolchain {
            core: ToolchainCore::new(MSVC_TYPE_ID, Detection::Auto),
            cl_path: None,
            arch,
        };
        tc.core.set_language(language)?;

        let name = match &tc.arch {
            Some(arch) => format!("MSVC {} ({})", language.display_name(), arch),
            None => format!("MSVC {}", language.display_name()),
        };
        tc.set_display_name(&name);
        tc.cl_path = Some(cl_path);
        Ok(tc)
    }

    /// Target architecture in MSVC naming (x64, x86, arm64).
    pub fn arch(&self) -> Option<&str> {
        self.arch.as_deref()
    }
}

impl Default for MsvcToolchain {
    fn default() -> Self {
        Self::new()
    }
}

/// Architecture from the `Host<host>\<target>` layout of MSVC installs.
fn arch_from_path(cl_path: &Path) -> Option<String> {
    let dir = cl_path.parent()?.file_name()?.to_str()?.to_ascii_lowercase();
    KNOWN_ARCHES.contains(&dir.as_str()).then_some(dir)
}

fn arch_triple(arch: &str) -> Option<&'static str> {
    match arch {
        "x64" => Some("x86_64-pc-windows-msvc"),
        "x86" => Some("i686-pc-windows-msvc"),
        "arm64" => Some("aarch64-pc-windows-msvc"),
        "arm" => Some("thumbv7a-pc-windows-msvc"),
        _ => None,
    }
}

impl Toolchain for MsvcToolchain {
    fn core(&self) -> &ToolchainCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ToolchainCore {
        &mut self.core
    }

    fn type_display_name(&self) -> String {
        "MSVC".to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn can_clone(&self) -> bool {
        false
    }

    fn clone_toolchain(&self) -> Option<Box<dyn Toolchain>> {
        None
    }

    fn compiler_path(&self) -> Option<&Path> {
        self.cl_path.as_deref()
    }

    fn target_triple(&self) -> Option<&str> {
        self.arch.as_deref().and_then(arch_triple)
    }

    fn same_configuration(&self, other: &dyn Toolchain) -> bool {
        other
            .as_any()
            .downcast_ref::<MsvcToolchain>()
            .is_some_and(|other| other.cl_path == self.cl_path && other.arch == self.arch)
    }

    fn validate_kit(&self, kit: &Kit) -> Vec<Diagnostic> {
        let mut result = Vec::new();

        if let Some(path) = &self.cl_path {
            if !path.exists() {
                result.push(
                    Diagnostic::error(format!("`{}` no longer exists", self.display_name()))
                        .with_location(path)
                        .with_suggestion("Run `toolchest detect` from a developer prompt"),
                );
            }
        }

        if let Some(triple) = &kit.target_triple {
            if !triple.contains("windows") {
                result.push(Diagnostic::warning(format!(
                    "`{}` only targets Windows, but kit `{}` targets {}",
                    self.display_name(),
                    kit.name,
                    triple
                )));
            }
        }

        result
    }

    fn extend_map(&self, data: &mut ToolchainData) {
        if let Some(path) = &self.cl_path {
            data.insert(
                PATH_KEY.to_string(),
                Value::String(path.to_string_lossy().into_owned()),
            );
        }
        if let Some(arch) = &self.arch {
            data.insert(ARCH_KEY.to_string(), Value::String(arch.clone()));
        }
    }

    fn restore_extra(&mut self, data: &ToolchainData) -> Result<(), ToolchainError> {
        self.cl_path = value_string(data, PATH_KEY)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        self.arch = value_string(data, ARCH_KEY).filter(|a| !a.is_empty());
        Ok(())
    }
}

/// Detects `cl` compilers and restores MSVC toolchains.
///
/// MSVC toolchains come from the installation, so they cannot be
/// created by hand.
#[derive(Debug)]
pub struct MsvcToolchainFactory {
    type_id: ToolchainTypeId,
    search: CompilerSearch,
}

impl MsvcToolchainFactory {
    pub fn new(search: CompilerSearch) -> Self {
        MsvcToolchainFactory {
            type_id: MSVC_TYPE_ID,
            search,
        }
    }
}

impl ToolchainFactory for MsvcToolchainFactory {
    fn type_id(&self) -> &ToolchainTypeId {
        &self.type_id
    }

    fn display_name(&self) -> &str {
        "MSVC"
    }

    fn auto_detect(&self, already_known: &[Box<dyn Toolchain>]) -> Vec<Box<dyn Toolchain>> {
        let mut result: Vec<Box<dyn Toolchain>> = Vec::new();

        for cl in self.search.find_all(&["cl"]) {
            for &language in all_languages() {
                if is_claimed(already_known, &self.type_id, language, &cl) {
                    continue;
                }
                match MsvcToolchain::detected(language, cl.clone()) {
                    Ok(tc) => result.push(Box::new(tc)),
                    Err(e) => tracing::warn!("cannot set up {}: {}", cl.display(), e),
                }
            }
        }

        result
    }

    fn can_restore(&self, data: &ToolchainData) -> bool {
        self.is_own_type(data)
    }

    fn restore(&self, data: &ToolchainData) -> Option<Box<dyn Toolchain>> {
        restore_into(MsvcToolchain::new(), data)
    }
}
