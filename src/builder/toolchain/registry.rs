//! Factory registry - routes toolchain operations to the right kind.
//!
//! Key principle: construction never fails and never probes the system.
//! Detection only happens in [`ToolchainFactoryRegistry::auto_detect_all`].

use std::collections::HashSet;

use rayon::prelude::*;

use crate::core::ids::{InstanceId, ToolchainTypeId};
use crate::util::config::{DetectionConfig, ExtraCompiler};

use super::custom::{CustomToolchainFactory, CUSTOM_TYPE_ID};
use super::data::{type_id_from_map, ToolchainData, ID_KEY};
use super::detect::CompilerSearch;
use super::factory::ToolchainFactory;
use super::gcc::{GccToolchainFactory, CLANG_TYPE_ID, GCC_TYPE_ID};
use super::msvc::MsvcToolchainFactory;
use super::Toolchain;

/// Registry of toolchain factories, in registration order.
pub struct ToolchainFactoryRegistry {
    factories: Vec<Box<dyn ToolchainFactory>>,
}

impl ToolchainFactoryRegistry {
    /// Registry with all built-in factories searching `PATH`.
    pub fn new() -> Self {
        Self::with_search(CompilerSearch::from_env())
    }

    /// Registry without any factories.
    pub fn empty() -> Self {
        ToolchainFactoryRegistry {
            factories: Vec::new(),
        }
    }

    /// Registry with all built-in factories using `search`.
    pub fn with_search(search: CompilerSearch) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(GccToolchainFactory::gcc(search.clone())));
        registry.register(Box::new(GccToolchainFactory::clang(search.clone())));
        registry.register(Box::new(MsvcToolchainFactory::new(search.clone())));
        registry.register(Box::new(CustomToolchainFactory::new(Vec::new(), search)));
        registry
    }

    /// Registry set up from detection settings.
    ///
    /// Configured search paths replace `PATH`, disabled kinds are left out
    /// and extra compilers go to the factory of their kind (`custom` when
    /// no kind is given).
    pub fn from_config(config: &DetectionConfig) -> Self {
        let search = if config.search_paths.is_empty() {
            CompilerSearch::from_env()
        } else {
            CompilerSearch::with_paths(&config.search_paths)
        };

        let mut gcc_extra = Vec::new();
        let mut clang_extra = Vec::new();
        let mut custom_extra = Vec::new();
        for extra in &config.extra_compilers {
            match extra.kind.as_deref() {
                None | Some("custom") => custom_extra.push(extra.clone()),
                Some("gcc") => gcc_extra.push(extra.clone()),
                Some("clang") => clang_extra.push(extra.clone()),
                Some(other) => tracing::warn!(
                    "extra compiler {} has unsupported kind `{}`",
                    extra.path.display(),
                    other
                ),
            }
        }

        let mut registry = Self::empty();
        let enabled = |id: &ToolchainTypeId| !config.disabled_kinds.iter().any(|k| id == k.as_str());

        if enabled(&GCC_TYPE_ID) {
            registry.register(Box::new(
                GccToolchainFactory::gcc(search.clone()).with_extra_compilers(gcc_extra),
            ));
        } else {
            warn_unused_extras("gcc", &gcc_extra);
        }
        if enabled(&CLANG_TYPE_ID) {
            registry.register(Box::new(
                GccToolchainFactory::clang(search.clone()).with_extra_compilers(clang_extra),
            ));
        } else {
            warn_unused_extras("clang", &clang_extra);
        }
        if enabled(&super::msvc::MSVC_TYPE_ID) {
            registry.register(Box::new(MsvcToolchainFactory::new(search.clone())));
        }
        if enabled(&CUSTOM_TYPE_ID) {
            registry.register(Box::new(CustomToolchainFactory::new(custom_extra, search)));
        } else {
            warn_unused_extras("custom", &custom_extra);
        }

        tracing::debug!("registered {} toolchain factories", registry.len());
        registry
    }

    /// Register a factory. Replaces a factory with the same type id in place.
    pub fn register(&mut self, factory: Box<dyn ToolchainFactory>) {
        match self
            .factories
            .iter_mut()
            .find(|f| f.type_id() == factory.type_id())
        {
            Some(slot) => *slot = factory,
            None => self.factories.push(factory),
        }
    }

    /// Remove the factory for `type_id`. Returns whether one was registered.
    pub fn unregister(&mut self, type_id: &ToolchainTypeId) -> bool {
        let before = self.factories.len();
        self.factories.retain(|f| f.type_id() != type_id);
        self.factories.len() != before
    }

    /// Get a factory by type id.
    pub fn get(&self, type_id: &ToolchainTypeId) -> Option<&dyn ToolchainFactory> {
        self.factories
            .iter()
            .find(|f| f.type_id() == type_id)
            .map(|f| f.as_ref())
    }

    /// First factory that accepts `data`.
    pub fn factory_for(&self, data: &ToolchainData) -> Option<&dyn ToolchainFactory> {
        self.factories
            .iter()
            .find(|f| f.can_restore(data))
            .map(|f| f.as_ref())
    }

    /// Restore a single persisted toolchain.
    pub fn restore(&self, data: &ToolchainData) -> Option<Box<dyn Toolchain>> {
        let Some(factory) = self.factory_for(data) else {
            tracing::warn!(
                "no factory for toolchain type `{}`, skipping",
                type_id_from_map(data)
            );
            return None;
        };
        factory.restore(data)
    }

    /// Restore every entry that can be restored, in order.
    ///
    /// Unrestorable entries and repeated instance ids are skipped with a
    /// warning; loading always continues.
    pub fn restore_all(&self, entries: &[ToolchainData]) -> Vec<Box<dyn Toolchain>> {
        let mut seen: HashSet<InstanceId> = HashSet::new();
        let mut result = Vec::with_capacity(entries.len());

        for (index, data) in entries.iter().enumerate() {
            let Some(tc) = self.restore(data) else {
                tracing::warn!(
                    "skipping stored toolchain #{} ({:?})",
                    index + 1,
                    data.get(ID_KEY)
                );
                continue;
            };
            if !seen.insert(tc.id().clone()) {
                tracing::warn!("skipping duplicate toolchain {}", tc.id());
                continue;
            }
            result.push(tc);
        }

        result
    }

    /// Run every factory's detection in parallel.
    ///
    /// Results are concatenated in registration order.
    pub fn auto_detect_all(&self, already_known: &[Box<dyn Toolchain>]) -> Vec<Box<dyn Toolchain>> {
        let per_factory: Vec<Vec<Box<dyn Toolchain>>> = self
            .factories
            .par_iter()
            .map(|factory| {
                let found = factory.auto_detect(already_known);
                tracing::debug!("{}: {} new toolchain(s)", factory.display_name(), found.len());
                found
            })
            .collect();

        per_factory.into_iter().flatten().collect()
    }

    /// Factories that allow manual creation.
    pub fn creatable(&self) -> impl Iterator<Item = &dyn ToolchainFactory> + '_ {
        self.all().filter(|f| f.can_create())
    }

    /// Get all registered type ids.
    pub fn ids(&self) -> impl Iterator<Item = &ToolchainTypeId> + '_ {
        self.factories.iter().map(|f| f.type_id())
    }

    /// Get all registered factories.
    pub fn all(&self) -> impl Iterator<Item = &dyn ToolchainFactory> + '_ {
        self.factories.iter().map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn contains(&self, type_id: &ToolchainTypeId) -> bool {
        self.get(type_id).is_some()
    }
}

impl Default for ToolchainFactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn warn_unused_extras(kind: &str, extras: &[ExtraCompiler]) {
    for extra in extras {
        tracing::warn!(
            "extra compiler {} is ignored because `{}` is disabled",
            extra.path.display(),
            kind
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::msvc::{MsvcToolchain, MSVC_TYPE_ID};
    use crate::builder::toolchain::{CustomToolchain, GccFamily, GccToolchain};
    use crate::core::language::Language;
    use std::path::PathBuf;
    use toml::Value;

    fn stored_toolchains() -> Vec<Box<dyn Toolchain>> {
        let mut custom = CustomToolchain::new();
        custom.set_language(Language::C).unwrap();
        custom.set_compiler_path(PathBuf::from("/opt/xcc"));

        vec![
            Box::new(
                GccToolchain::detected(GccFamily::Gcc, Language::C, PathBuf::from("/usr/bin/gcc"))
                    .unwrap(),
            ),
            Box::new(
                MsvcToolchain::detected(Language::Cxx, PathBuf::from("/vs/x64/cl.exe")).unwrap(),
            ),
            Box::new(custom),
        ]
    }

    #[test]
    fn test_builtin_factories() {
        let registry = ToolchainFactoryRegistry::new();
        let ids: Vec<_> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["gcc", "clang", "msvc", "custom"]);

        let creatable: Vec<_> = registry.creatable().map(|f| f.type_id().as_str()).collect();
        assert_eq!(creatable, vec!["gcc", "clang", "custom"]);
    }

    #[test]
    fn test_restore_routes_each_kind() {
        let registry = ToolchainFactoryRegistry::new();
        let originals = stored_toolchains();
        let entries: Vec<_> = originals.iter().map(|tc| tc.to_map()).collect();

        let restored = registry.restore_all(&entries);
        assert_eq!(restored.len(), 3);
        for (original, back) in originals.iter().zip(&restored) {
            assert_eq!(back.type_id(), original.type_id());
            assert_eq!(back.id(), original.id());
            assert!(**back == **original);
        }
        assert!(restored[1].as_any().downcast_ref::<MsvcToolchain>().is_some());
    }

    #[test]
    fn test_restore_all_skips_bad_entries() {
        let registry = ToolchainFactoryRegistry::new();
        let good = stored_toolchains().remove(0).to_map();

        let mut unknown = good.clone();
        unknown.insert(ID_KEY.into(), Value::String("borland:{1}".into()));
        let mut garbage = good.clone();
        garbage.insert(ID_KEY.into(), Value::String("garbage".into()));

        let restored = registry.restore_all(&[unknown, good.clone(), garbage, good]);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].type_id(), &GCC_TYPE_ID);
    }

    #[test]
    fn test_register_replaces_same_kind() {
        let mut registry = ToolchainFactoryRegistry::new();
        let count = registry.len();

        registry.register(Box::new(MsvcToolchainFactory::new(CompilerSearch::from_env())));
        assert_eq!(registry.len(), count);
        assert_eq!(registry.ids().nth(2), Some(&MSVC_TYPE_ID));

        assert!(registry.unregister(&MSVC_TYPE_ID));
        assert!(!registry.contains(&MSVC_TYPE_ID));
        assert!(!registry.unregister(&MSVC_TYPE_ID));
    }

    #[test]
    fn test_from_config_disabled_kinds() {
        let config = DetectionConfig {
            disabled_kinds: vec!["msvc".into(), "clang".into()],
            ..Default::default()
        };
        let registry = ToolchainFactoryRegistry::from_config(&config);
        let ids: Vec<_> = registry.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["gcc", "custom"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_auto_detect_all_in_registration_order() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::TempDir::new().unwrap();
        for name in ["gcc", "clang", "cl"] {
            let path = tmp.path().join(name);
            std::fs::write(&path, "").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let registry =
            ToolchainFactoryRegistry::with_search(CompilerSearch::with_paths([tmp.path()]));
        let found = registry.auto_detect_all(&[]);
        let kinds: Vec<_> = found.iter().map(|tc| tc.type_id().as_str()).collect();
        assert_eq!(kinds, vec!["gcc", "clang", "msvc", "msvc"]);

        assert!(registry.auto_detect_all(&found).is_empty());
    }
}
