//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use toml::Value;

use crate::core::detection::Detection;
use crate::core::error::ToolchainError;
use crate::core::ids::ToolchainTypeId;
use crate::core::kit::Kit;
use crate::core::language::Language;
use crate::util::config::ExtraCompiler;
use crate::util::diagnostic::Diagnostic;

use super::data::{value_string, ToolchainData};
use super::detect::{infer_target_triple, is_claimed, CompilerSearch};
use super::factory::{restore_into, ToolchainFactory};
use super::{Toolchain, ToolchainCore};

pub const GCC_TYPE_ID: ToolchainTypeId = ToolchainTypeId::from_static("gcc");
pub const CLANG_TYPE_ID: ToolchainTypeId = ToolchainTypeId::from_static("clang");

const PATH_KEY: &str = "ProjectExplorer.GccToolChain.Path";
const TARGET_TRIPLE_KEY: &str = "ProjectExplorer.GccToolChain.TargetTriple";

/// Compiler family of a GCC-style toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GccFamily {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Clang/LLVM
    Clang,
}

impl GccFamily {
    pub fn type_id(&self) -> ToolchainTypeId {
        match self {
            GccFamily::Gcc => GCC_TYPE_ID,
            GccFamily::Clang => CLANG_TYPE_ID,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GccFamily::Gcc => "GCC",
            GccFamily::Clang => "Clang",
        }
    }

    /// Executable names searched for `language`, most specific first.
    pub fn compiler_names(&self, language: Language) -> &'static [&'static str] {
        match (self, language) {
            (GccFamily::Gcc, Language::C) => &["gcc", "cc"],
            (GccFamily::Gcc, Language::Cxx) => &["g++", "c++"],
            (GccFamily::Clang, Language::C) => &["clang"],
            (GccFamily::Clang, Language::Cxx) => &["clang++"],
            (_, Language::None) => &[],
        }
    }
}

/// GCC-style toolchain (gcc, clang and their cross variants).
#[derive(Debug)]
pub struct GccToolchain {
    core: ToolchainCore,
    family: GccFamily,
    compiler_path: Option<PathBuf>,
    target_triple: Option<String>,
}

impl GccToolchain {
    /// Create an empty manual toolchain of `family`.
    pub fn new(family: GccFamily) -> Self {
        GccToolchain {
            core: ToolchainCore::new(family.type_id(), Detection::Manual),
            family,
            compiler_path: None,
            target_triple: None,
        }
    }

    /// Toolchain for a compiler found by autodetection.
    pub fn detected(
        family: GccFamily,
        language: Language,
        compiler: PathBuf,
    ) -> Result<Self, ToolchainError> {
        let mut toolchain = GccToolchain {
            core: ToolchainCore::new(family.type_id(), Detection::Auto),
            family,
            target_triple: infer_target_triple(&compiler),
            compiler_path: None,
        };
        toolchain.core.set_language(language)?;

        let name = match &toolchain.target_triple {
            Some(triple) => format!(
                "{} {} ({}, {})",
                family.display_name(),
                language.display_name(),
                triple,
                compiler.display()
            ),
            None => format!(
                "{} {} ({})",
                family.display_name(),
                language.display_name(),
                compiler.display()
            ),
        };
        toolchain.compiler_path = Some(compiler);
        toolchain.set_display_name(&name);
        Ok(toolchain)
    }

    pub fn family(&self) -> GccFamily {
        self.family
    }
}

impl Toolchain for GccToolchain {
    fn core(&self) -> &ToolchainCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ToolchainCore {
        &mut self.core
    }

    fn type_display_name(&self) -> String {
        self.family.display_name().to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn clone_toolchain(&self) -> Option<Box<dyn Toolchain>> {
        Some(Box::new(GccToolchain {
            core: ToolchainCore::clone_of(&self.core, &self.display_name()),
            family: self.family,
            compiler_path: self.compiler_path.clone(),
            target_triple: self.target_triple.clone(),
        }))
    }

    fn compiler_path(&self) -> Option<&Path> {
        self.compiler_path.as_deref()
    }

    fn set_compiler_path(&mut self, path: PathBuf) -> bool {
        if self.compiler_path.as_ref() == Some(&path) {
            return true;
        }
        self.target_triple = infer_target_triple(&path);
        self.compiler_path = Some(path);
        self.core.notify_configuration_changed();
        true
    }

    fn target_triple(&self) -> Option<&str> {
        self.target_triple.as_deref()
    }

    fn same_configuration(&self, other: &dyn Toolchain) -> bool {
        other
            .as_any()
            .downcast_ref::<GccToolchain>()
            .is_some_and(|other| other.compiler_path == self.compiler_path)
    }

    fn validate_kit(&self, kit: &Kit) -> Vec<Diagnostic> {
        let mut result = Vec::new();

        match &self.compiler_path {
            Some(path) if !path.exists() => result.push(
                Diagnostic::error(format!(
                    "compiler of `{}` does not exist",
                    self.display_name()
                ))
                .with_location(path)
                .with_suggestion("Run `toolchest detect` to find installed compilers"),
            ),
            Some(_) => {}
            None => result.push(
                Diagnostic::error(format!("`{}` has no compiler set", self.display_name()))
                    .with_suggestion("Set a compiler path with `toolchest add --path`"),
            ),
        }

        if let (Some(kit_triple), Some(own_triple)) = (&kit.target_triple, &self.target_triple) {
            if kit_triple != own_triple {
                result.push(
                    Diagnostic::warning(format!(
                        "`{}` targets {}, but kit `{}` targets {}",
                        self.display_name(),
                        own_triple,
                        kit.name,
                        kit_triple
                    ))
                    .with_suggestion("Select a toolchain for the kit's target"),
                );
            }
        }

        for assigned in kit.languages_of(self.core.id()) {
            if assigned != self.core.language() {
                result.push(Diagnostic::error(format!(
                    "kit `{}` uses {} toolchain `{}` for {}",
                    kit.name,
                    self.core.language(),
                    self.display_name(),
                    assigned
                )));
            }
        }

        result
    }

    fn extend_map(&self, data: &mut ToolchainData) {
        if let Some(path) = &self.compiler_path {
            data.insert(
                PATH_KEY.to_string(),
                Value::String(path.to_string_lossy().into_owned()),
            );
        }
        if let Some(triple) = &self.target_triple {
            data.insert(TARGET_TRIPLE_KEY.to_string(), Value::String(triple.clone()));
        }
    }

    fn restore_extra(&mut self, data: &ToolchainData) -> Result<(), ToolchainError> {
        self.compiler_path = value_string(data, PATH_KEY)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        self.target_triple = value_string(data, TARGET_TRIPLE_KEY)
            .filter(|t| !t.is_empty())
            .or_else(|| self.compiler_path.as_deref().and_then(infer_target_triple));
        Ok(())
    }
}

/// Factory for one GCC-style family.
#[derive(Debug)]
pub struct GccToolchainFactory {
    family: GccFamily,
    type_id: ToolchainTypeId,
    search: CompilerSearch,
    extra: Vec<ExtraCompiler>,
}

impl GccToolchainFactory {
    pub fn new(family: GccFamily, search: CompilerSearch) -> Self {
        GccToolchainFactory {
            family,
            type_id: family.type_id(),
            search,
            extra: Vec::new(),
        }
    }

    /// Also offer these configured compilers during detection.
    pub fn with_extra_compilers(mut self, extra: Vec<ExtraCompiler>) -> Self {
        self.extra = extra;
        self
    }

    pub fn gcc(search: CompilerSearch) -> Self {
        Self::new(GccFamily::Gcc, search)
    }

    pub fn clang(search: CompilerSearch) -> Self {
        Self::new(GccFamily::Clang, search)
    }
}

impl ToolchainFactory for GccToolchainFactory {
    fn type_id(&self) -> &ToolchainTypeId {
        &self.type_id
    }

    fn display_name(&self) -> &str {
        self.family.display_name()
    }

    fn auto_detect(&self, already_known: &[Box<dyn Toolchain>]) -> Vec<Box<dyn Toolchain>> {
        let mut result: Vec<Box<dyn Toolchain>> = Vec::new();

        for &language in crate::core::language::all_languages() {
            for path in self.search.find_all(self.family.compiler_names(language)) {
                if is_claimed(already_known, &self.type_id, language, &path) {
                    tracing::debug!("{} is already known", path.display());
                    continue;
                }
                match GccToolchain::detected(self.family, language, path) {
                    Ok(tc) => result.push(Box::new(tc)),
                    Err(e) => tracing::warn!("cannot set up detected compiler: {}", e),
                }
            }
        }

        for extra in &self.extra {
            if let Err(reason) = self.search.check(&extra.path) {
                tracing::warn!("ignoring configured compiler: {}", reason);
                continue;
            }
            if is_claimed(already_known, &self.type_id, extra.language, &extra.path)
                || is_claimed(&result, &self.type_id, extra.language, &extra.path)
            {
                continue;
            }
            match GccToolchain::detected(self.family, extra.language, extra.path.clone()) {
                Ok(mut tc) => {
                    tc.set_detection(Detection::AutoFromSettings);
                    if let Some(name) = &extra.name {
                        tc.set_display_name(name);
                    }
                    result.push(Box::new(tc));
                }
                Err(e) => tracing::warn!(
                    "ignoring configured compiler {}: {}",
                    extra.path.display(),
                    e
                ),
            }
        }

        tracing::debug!(
            "detected {} new {} toolchain(s)",
            result.len(),
            self.family.display_name()
        );
        result
    }

    fn can_create(&self) -> bool {
        true
    }

    fn create(&self, language: Language) -> Option<Box<dyn Toolchain>> {
        let mut tc = GccToolchain::new(self.family);
        match tc.set_language(language) {
            Ok(()) => Some(Box::new(tc)),
            Err(e) => {
                tracing::warn!("cannot create {} toolchain: {}", self.family.display_name(), e);
                None
            }
        }
    }

    fn can_restore(&self, data: &ToolchainData) -> bool {
        self.is_own_type(data)
    }

    fn restore(&self, data: &ToolchainData) -> Option<Box<dyn Toolchain>> {
        restore_into(GccToolchain::new(self.family), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::data::ID_KEY;
    use crate::core::ids::InstanceId;
    use crate::util::diagnostic::Severity;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn fake_compilers(names: &[&str]) -> TempDir {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        for name in names {
            let path = tmp.path().join(name);
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
        tmp
    }

    #[test]
    fn test_family_type_ids() {
        assert_eq!(GccFamily::Gcc.type_id(), "gcc");
        assert_eq!(GccFamily::Clang.type_id(), CLANG_TYPE_ID);
        assert_eq!(GccFamily::Clang.display_name(), "Clang");
    }

    #[test]
    fn test_detected_toolchain() {
        let tc = GccToolchain::detected(
            GccFamily::Gcc,
            Language::C,
            PathBuf::from("/opt/cross/bin/arm-none-eabi-gcc"),
        )
        .unwrap();

        assert_eq!(tc.language(), Language::C);
        assert_eq!(tc.detection(), Detection::Auto);
        assert_eq!(tc.target_triple(), Some("arm-none-eabi"));
        assert!(tc.display_name().starts_with("GCC C (arm-none-eabi"));
    }

    #[test]
    fn test_round_trip_keeps_compiler_path() {
        let mut tc = GccToolchain::detected(
            GccFamily::Clang,
            Language::Cxx,
            PathBuf::from("/usr/bin/clang++"),
        )
        .unwrap();
        tc.set_display_name("System Clang");

        let data = tc.to_map();
        assert_eq!(
            value_string(&data, PATH_KEY).as_deref(),
            Some("/usr/bin/clang++")
        );

        let factory = GccToolchainFactory::clang(CompilerSearch::from_env());
        assert!(factory.can_restore(&data));
        let back = factory.restore(&data).unwrap();

        assert_eq!(back.id(), tc.id());
        assert_eq!(back.type_id(), &CLANG_TYPE_ID);
        assert_eq!(back.display_name(), "System Clang");
        assert_eq!(back.compiler_path(), Some(Path::new("/usr/bin/clang++")));
        assert_eq!(back.detection(), Detection::AutoFromSettings);
        assert_eq!(back.language(), Language::Cxx);
    }

    #[test]
    fn test_restore_rejects_foreign_and_malformed_data() {
        let gcc = GccToolchainFactory::gcc(CompilerSearch::from_env());
        let clang_data = GccToolchain::new(GccFamily::Clang).to_map();
        assert!(!gcc.can_restore(&clang_data));

        let mut garbage = clang_data.clone();
        garbage.insert(ID_KEY.into(), Value::String("garbage".into()));
        assert!(gcc.restore(&garbage).is_none());

        let mut msvc = clang_data.clone();
        msvc.insert(ID_KEY.into(), Value::String("msvc:{1}".into()));
        assert!(gcc.restore(&msvc).is_none());

        // restore agrees with can_restore even within the GCC family
        assert!(gcc.restore(&clang_data).is_none());
        let clang = GccToolchainFactory::clang(CompilerSearch::from_env());
        assert_eq!(
            clang.restore(&clang_data).map(|tc| tc.type_id().clone()),
            Some(CLANG_TYPE_ID)
        );
    }

    #[test]
    fn test_from_map_of_other_family_changes_nothing() {
        let clang = GccToolchain::detected(
            GccFamily::Clang,
            Language::Cxx,
            PathBuf::from("/usr/bin/clang++"),
        )
        .unwrap();

        let mut tc = GccToolchain::new(GccFamily::Gcc);
        tc.set_display_name("Mine");
        let id = tc.id().clone();

        assert_eq!(
            tc.from_map(&clang.to_map()),
            Err(ToolchainError::TypeMismatch {
                expected: "gcc".into(),
                found: "clang".into(),
            })
        );
        assert_eq!(tc.type_id(), &GCC_TYPE_ID);
        assert_eq!(tc.family(), GccFamily::Gcc);
        assert_eq!(tc.id(), &id);
        assert_eq!(tc.display_name(), "Mine");
        assert_eq!(tc.language(), Language::None);
        assert_eq!(tc.compiler_path(), None);
    }

    #[test]
    fn test_equality_compares_compiler_path() {
        let a: Box<dyn Toolchain> = Box::new(
            GccToolchain::detected(GccFamily::Gcc, Language::C, PathBuf::from("/usr/bin/gcc"))
                .unwrap(),
        );
        let b: Box<dyn Toolchain> = Box::new(
            GccToolchain::detected(GccFamily::Gcc, Language::Cxx, PathBuf::from("/usr/bin/gcc"))
                .unwrap(),
        );
        let c: Box<dyn Toolchain> = Box::new(
            GccToolchain::detected(GccFamily::Gcc, Language::C, PathBuf::from("/opt/bin/gcc"))
                .unwrap(),
        );

        assert!(*a == *b);
        assert!(*a != *c);
    }

    #[test]
    fn test_clone_keeps_configuration() {
        let tc =
            GccToolchain::detected(GccFamily::Gcc, Language::C, PathBuf::from("/usr/bin/gcc"))
                .unwrap();
        let clone = tc.clone_toolchain().unwrap();

        assert_ne!(clone.id(), tc.id());
        assert_eq!(clone.compiler_path(), tc.compiler_path());
        assert_eq!(clone.detection(), Detection::Manual);
        assert_eq!(clone.display_name(), format!("Clone of {}", tc.display_name()));
    }

    #[test]
    fn test_create() {
        let factory = GccToolchainFactory::gcc(CompilerSearch::from_env());
        assert!(factory.can_create());

        let tc = factory.create(Language::Cxx).unwrap();
        assert_eq!(tc.language(), Language::Cxx);
        assert_eq!(tc.detection(), Detection::Manual);
        assert_eq!(tc.display_name(), "GCC");
        assert!(factory.create(Language::None).is_none());
    }

    #[test]
    fn test_validate_kit() {
        let tmp = TempDir::new().unwrap();
        let compiler = tmp.path().join("x86_64-linux-gnu-gcc");
        std::fs::write(&compiler, "").unwrap();

        let tc = GccToolchain::detected(GccFamily::Gcc, Language::C, compiler).unwrap();

        let good = Kit::new("host")
            .with_target("x86_64-linux-gnu")
            .with_toolchain(Language::C, tc.id().clone());
        assert!(tc.validate_kit(&good).is_empty());

        let bad = Kit::new("arm")
            .with_target("arm-none-eabi")
            .with_toolchain(Language::Cxx, tc.id().clone())
            .with_toolchain(Language::C, InstanceId::new());
        let problems = tc.validate_kit(&bad);
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].severity, Severity::Warning);
        assert_eq!(problems[1].severity, Severity::Error);

        let missing = GccToolchain::new(GccFamily::Gcc);
        let problems = missing.validate_kit(&Kit::new("empty"));
        assert_eq!(problems.len(), 1);
        assert!(problems[0].message.contains("has no compiler"));
    }

    #[cfg(unix)]
    #[test]
    fn test_auto_detect_is_idempotent() {
        let tmp = fake_compilers(&["gcc", "g++", "clang"]);
        let factory = GccToolchainFactory::gcc(CompilerSearch::with_paths([tmp.path()]));

        let first = factory.auto_detect(&[]);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].language(), Language::C);
        assert_eq!(first[1].language(), Language::Cxx);
        assert!(first.iter().all(|tc| tc.is_auto_detected()));

        let second = factory.auto_detect(&first);
        assert!(second.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_auto_detect_includes_configured_compilers() {
        let tools = fake_compilers(&["arm-none-eabi-gcc"]);
        let empty = TempDir::new().unwrap();
        let compiler = tools.path().join("arm-none-eabi-gcc");

        let factory = GccToolchainFactory::gcc(CompilerSearch::with_paths([empty.path()]))
            .with_extra_compilers(vec![ExtraCompiler {
                kind: Some("gcc".into()),
                path: compiler.clone(),
                language: Language::C,
                name: Some("ARM GCC".into()),
                flags: Vec::new(),
            }]);

        let found = factory.auto_detect(&[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].display_name(), "ARM GCC");
        assert_eq!(found[0].detection(), Detection::AutoFromSettings);
        assert_eq!(found[0].target_triple(), Some("arm-none-eabi"));
        assert!(factory.auto_detect(&found).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_auto_detect_ignores_other_kinds() {
        let tmp = fake_compilers(&["clang"]);
        let clang = GccToolchainFactory::clang(CompilerSearch::with_paths([tmp.path()]));
        let gcc = GccToolchainFactory::gcc(CompilerSearch::with_paths([tmp.path()]));

        let found = clang.auto_detect(&[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].type_id(), &CLANG_TYPE_ID);
        assert!(gcc.auto_detect(&found).is_empty());
    }
}
