//! Toolchain management operations.
//!
//! Every operation restores the stored toolchains through the factory
//! registry, works on the descriptors, and writes changed entries back.
//! Entries that cannot be restored are left in the store untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::builder::toolchain::{Toolchain, ToolchainFactoryRegistry, TracingObserver};
use crate::core::detection::Detection;
use crate::core::ids::ToolchainTypeId;
use crate::core::kit::Kit;
use crate::core::language::{all_languages, Language};
use crate::util::config::{
    default_store_path, global_config_path, load_config, project_config_path, Config,
    ToolchainStore,
};
use crate::util::diagnostic::{has_errors, suggestions, Diagnostic};

/// Options for setting up a [`ToolchainContext`].
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    /// Directory whose `.toolchest/config.toml` is used (defaults to cwd)
    pub project_root: Option<PathBuf>,

    /// Toolchain store to use instead of the default one
    pub store: Option<PathBuf>,

    /// Search paths overriding the configured ones
    pub search_paths: Vec<PathBuf>,
}

/// Configuration, store location and factories for one invocation.
pub struct ToolchainContext {
    pub config: Config,
    pub store_path: PathBuf,
    pub registry: ToolchainFactoryRegistry,
}

impl ToolchainContext {
    /// Load configuration and set up the factory registry.
    pub fn load(options: ContextOptions) -> Result<Self> {
        let project_root = match options.project_root {
            Some(root) => root,
            None => std::env::current_dir().context("failed to get current directory")?,
        };

        let global = global_config_path();
        let mut config = load_config(global.as_deref(), &project_config_path(&project_root));
        if !options.search_paths.is_empty() {
            config.detection.search_paths = options.search_paths;
        }

        let store_path = options
            .store
            .unwrap_or_else(|| default_store_path(&project_root));
        tracing::debug!("toolchain store: {}", store_path.display());

        Ok(Self::with_config(config, store_path))
    }

    /// Context for an explicit configuration.
    pub fn with_config(config: Config, store_path: PathBuf) -> Self {
        let registry = ToolchainFactoryRegistry::from_config(&config.detection);
        ToolchainContext {
            config,
            store_path,
            registry,
        }
    }

    fn open(&self) -> Result<Session> {
        let store = ToolchainStore::load_or_default(&self.store_path)?;
        let mut toolchains = self.registry.restore_all(store.entries());
        for tc in &mut toolchains {
            tc.set_observer(Arc::new(TracingObserver));
        }
        Ok(Session { store, toolchains })
    }
}

/// Stored toolchains, raw and restored.
struct Session {
    store: ToolchainStore,
    toolchains: Vec<Box<dyn Toolchain>>,
}

impl Session {
    fn find(&self, query: &str) -> Result<usize> {
        find_toolchain(&self.toolchains, query)
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.store.save(path)
    }
}

/// What the CLI shows about a toolchain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolchainSummary {
    pub id: String,
    pub kind: String,
    pub display_name: String,
    pub language: Language,
    pub detection: Detection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl ToolchainSummary {
    pub fn from_toolchain(tc: &dyn Toolchain) -> Self {
        ToolchainSummary {
            id: tc.id().to_string(),
            kind: tc.type_id().to_string(),
            display_name: tc.display_name(),
            language: tc.language(),
            detection: tc.detection(),
            compiler: tc.compiler_path().map(Path::to_path_buf),
            target: tc.target_triple().map(str::to_string),
        }
    }
}

/// Index of the toolchain whose instance id is or starts with `query`.
///
/// Braces around the id are optional.
pub fn find_toolchain(toolchains: &[Box<dyn Toolchain>], query: &str) -> Result<usize> {
    let wanted = trim_braces(query);
    if wanted.is_empty() {
        bail!("empty toolchain id");
    }

    let matches: Vec<usize> = toolchains
        .iter()
        .enumerate()
        .filter(|(_, tc)| trim_braces(&tc.id().to_string()).starts_with(wanted))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => bail!(
            "no toolchain with id `{}`\n{}",
            query,
            suggestions::TOOLCHAIN_NOT_FOUND
        ),
        _ => bail!(
            "toolchain id `{}` is ambiguous ({} matches)",
            query,
            matches.len()
        ),
    }
}

fn trim_braces(id: &str) -> &str {
    id.trim().trim_start_matches('{').trim_end_matches('}')
}

/// List the stored toolchains that can be restored.
pub fn list(ctx: &ToolchainContext) -> Result<Vec<ToolchainSummary>> {
    let session = ctx.open()?;
    Ok(session
        .toolchains
        .iter()
        .map(|tc| ToolchainSummary::from_toolchain(tc.as_ref()))
        .collect())
}

/// Options for [`detect`].
#[derive(Debug, Clone, Default)]
pub struct DetectOptions {
    /// Add the detected toolchains to the store
    pub save: bool,
}

/// Result of [`detect`].
#[derive(Debug, Clone, Serialize)]
pub struct DetectReport {
    /// Toolchains that were not known before
    pub found: Vec<ToolchainSummary>,
    /// Whether they were written to the store
    pub saved: bool,
}

/// Run autodetection against the stored toolchains.
pub fn detect(ctx: &ToolchainContext, options: DetectOptions) -> Result<DetectReport> {
    let mut session = ctx.open()?;
    let found = ctx.registry.auto_detect_all(&session.toolchains);
    tracing::info!("found {} new toolchain(s)", found.len());

    let summaries = found
        .iter()
        .map(|tc| ToolchainSummary::from_toolchain(tc.as_ref()))
        .collect();

    let saved = options.save && !found.is_empty();
    if saved {
        for tc in &found {
            session.store.upsert(tc.to_map());
        }
        session.save(&ctx.store_path)?;
    }

    Ok(DetectReport {
        found: summaries,
        saved,
    })
}

/// Options for [`add`].
#[derive(Debug, Clone)]
pub struct AddOptions {
    /// Toolchain kind (type id)
    pub kind: String,
    pub language: Language,
    pub compiler: Option<PathBuf>,
    pub name: Option<String>,
}

/// Create a manual toolchain and store it.
pub fn add(ctx: &ToolchainContext, options: AddOptions) -> Result<ToolchainSummary> {
    let type_id = ToolchainTypeId::new(options.kind.as_str())
        .with_context(|| format!("invalid toolchain kind `{}`", options.kind))?;
    let Some(factory) = ctx.registry.get(&type_id) else {
        bail!(
            "unknown toolchain kind `{}`\n{}",
            options.kind,
            suggestions::UNKNOWN_KIND
        );
    };
    if !factory.can_create() {
        bail!(
            "{} toolchains cannot be created by hand\n{}",
            factory.display_name(),
            suggestions::NOT_CREATABLE
        );
    }

    let Some(mut tc) = factory.create(options.language) else {
        bail!(
            "cannot create a {} toolchain for {}",
            factory.display_name(),
            options.language
        );
    };

    if let Some(path) = options.compiler {
        if !path.exists() {
            tracing::warn!("compiler {} does not exist", path.display());
        }
        if !tc.set_compiler_path(path) {
            bail!("{} toolchains do not take a compiler path", factory.display_name());
        }
    }
    if let Some(name) = options.name {
        tc.set_display_name(&name);
    }

    let mut session = ctx.open()?;
    session.store.upsert(tc.to_map());
    session.save(&ctx.store_path)?;

    Ok(ToolchainSummary::from_toolchain(tc.as_ref()))
}

/// Remove a stored toolchain.
pub fn remove(ctx: &ToolchainContext, query: &str) -> Result<ToolchainSummary> {
    let mut session = ctx.open()?;
    let index = session.find(query)?;
    let tc = session.toolchains.remove(index);

    session.store.remove(tc.id());
    session.save(&ctx.store_path)?;

    Ok(ToolchainSummary::from_toolchain(tc.as_ref()))
}

/// Duplicate a stored toolchain.
pub fn clone(ctx: &ToolchainContext, query: &str) -> Result<ToolchainSummary> {
    let mut session = ctx.open()?;
    let source = &session.toolchains[session.find(query)?];

    if !source.can_clone() {
        bail!("`{}` cannot be cloned", source.display_name());
    }
    let Some(copy) = source.clone_toolchain() else {
        bail!("`{}` cannot be cloned", source.display_name());
    };

    session.store.upsert(copy.to_map());
    session.save(&ctx.store_path)?;

    Ok(ToolchainSummary::from_toolchain(copy.as_ref()))
}

/// Change the display name of a stored toolchain.
///
/// An empty name resets it to the kind's default name.
pub fn rename(ctx: &ToolchainContext, query: &str, name: &str) -> Result<ToolchainSummary> {
    let mut session = ctx.open()?;
    let index = session.find(query)?;
    let tc = &mut session.toolchains[index];

    tc.set_display_name(name);
    let data = tc.to_map();
    let summary = ToolchainSummary::from_toolchain(tc.as_ref());

    session.store.upsert(data);
    session.save(&ctx.store_path)?;

    Ok(summary)
}

/// Options for [`check`].
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Target triple of the kit
    pub target: Option<String>,
}

/// Diagnostics for one toolchain.
#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub toolchain: ToolchainSummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of [`check`].
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub kit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub entries: Vec<CheckEntry>,
}

impl CheckReport {
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| has_errors(&e.diagnostics))
    }
}

/// Validate the stored toolchains against a kit.
///
/// The kit uses the first stored toolchain of each language.
pub fn check(ctx: &ToolchainContext, options: CheckOptions) -> Result<CheckReport> {
    let session = ctx.open()?;
    if session.toolchains.is_empty() {
        bail!("no toolchains are known\n{}", suggestions::NO_TOOLCHAINS);
    }

    let mut kit = Kit::new("default");
    if let Some(target) = &options.target {
        kit = kit.with_target(target.clone());
    }
    for &language in all_languages() {
        if let Some(tc) = session.toolchains.iter().find(|tc| tc.language() == language) {
            kit = kit.with_toolchain(language, tc.id().clone());
        }
    }

    let entries = session
        .toolchains
        .iter()
        .map(|tc| CheckEntry {
            toolchain: ToolchainSummary::from_toolchain(tc.as_ref()),
            diagnostics: tc.validate_kit(&kit),
        })
        .collect();

    Ok(CheckReport {
        kit: kit.name,
        target: kit.target_triple,
        entries,
    })
}

/// One row of the language table.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub ordinal: i64,
}

/// The selectable languages.
pub fn languages() -> Vec<LanguageInfo> {
    all_languages()
        .iter()
        .map(|l| LanguageInfo {
            id: l.id(),
            display_name: l.display_name(),
            ordinal: l.ordinal(),
        })
        .collect()
}

/// Format toolchains as a table.
pub fn format_toolchains(toolchains: &[ToolchainSummary]) -> String {
    let mut output = String::new();
    for tc in toolchains {
        output.push_str(&format!(
            "{}  {:<7} {:<4} {:<18} {}\n",
            tc.id,
            tc.kind,
            tc.language.display_name(),
            tc.detection.as_str(),
            tc.display_name
        ));
        if let Some(compiler) = &tc.compiler {
            output.push_str(&format!("    compiler: {}\n", compiler.display()));
        }
        if let Some(target) = &tc.target {
            output.push_str(&format!("    target:   {}\n", target));
        }
    }
    output
}

/// Format a check report for terminal output.
pub fn format_check_report(report: &CheckReport, color: bool) -> String {
    let mut output = String::new();

    match &report.target {
        Some(target) => output.push_str(&format!("Kit `{}` ({})\n", report.kit, target)),
        None => output.push_str(&format!("Kit `{}`\n", report.kit)),
    }

    let mut problems = 0;
    for entry in &report.entries {
        let status = if entry.diagnostics.is_empty() { "ok" } else { "!!" };
        output.push_str(&format!(
            "  [{}] {} ({})\n",
            status, entry.toolchain.display_name, entry.toolchain.kind
        ));
        for diagnostic in &entry.diagnostics {
            problems += 1;
            for line in diagnostic.format(color).lines() {
                output.push_str(&format!("      {}\n", line));
            }
        }
    }

    output.push_str(&format!(
        "\n{} toolchain(s) checked, {} problem(s)\n",
        report.entries.len(),
        problems
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::DetectionConfig;
    use tempfile::TempDir;

    fn context(tmp: &TempDir, search: &Path) -> ToolchainContext {
        let config = Config {
            detection: DetectionConfig {
                search_paths: vec![search.to_path_buf()],
                ..Default::default()
            },
        };
        ToolchainContext::with_config(config, tmp.path().join("toolchains.toml"))
    }

    #[cfg(unix)]
    fn fake_compilers(dir: &Path, names: &[&str]) {
        use std::os::unix::fs::PermissionsExt;
        for name in names {
            let path = dir.join(name);
            std::fs::write(&path, "#!/bin/sh\n").unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_save_then_nothing_new() {
        let tmp = TempDir::new().unwrap();
        let bin = TempDir::new().unwrap();
        fake_compilers(bin.path(), &["gcc", "g++"]);
        let ctx = context(&tmp, bin.path());

        let first = detect(&ctx, DetectOptions { save: true }).unwrap();
        assert_eq!(first.found.len(), 2);
        assert!(first.saved);

        let second = detect(&ctx, DetectOptions { save: true }).unwrap();
        assert!(second.found.is_empty());
        assert!(!second.saved);

        let listed = list(&ctx).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed
            .iter()
            .all(|tc| tc.detection == Detection::AutoFromSettings));
    }

    #[test]
    fn test_add_rename_clone_remove() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, tmp.path());

        let added = add(
            &ctx,
            AddOptions {
                kind: "custom".into(),
                language: Language::C,
                compiler: Some(PathBuf::from("/opt/sdcc/bin/sdcc")),
                name: Some("SDCC".into()),
            },
        )
        .unwrap();
        assert_eq!(added.display_name, "SDCC");
        assert_eq!(added.detection, Detection::Manual);

        let renamed = rename(&ctx, &added.id, "Small Device C").unwrap();
        assert_eq!(renamed.id, added.id);
        assert_eq!(renamed.display_name, "Small Device C");

        let copy = clone(&ctx, &added.id).unwrap();
        assert_ne!(copy.id, added.id);
        assert_eq!(copy.display_name, "Clone of Small Device C");
        assert_eq!(copy.compiler, added.compiler);

        let removed = remove(&ctx, &added.id).unwrap();
        assert_eq!(removed.id, added.id);

        let remaining = list(&ctx).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, copy.id);
    }

    #[test]
    fn test_add_rejects_unknown_and_detect_only_kinds() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, tmp.path());

        let options = |kind: &str| AddOptions {
            kind: kind.into(),
            language: Language::Cxx,
            compiler: None,
            name: None,
        };

        let err = add(&ctx, options("borland")).unwrap_err();
        assert!(err.to_string().contains("unknown toolchain kind"));

        let err = add(&ctx, options("msvc")).unwrap_err();
        assert!(err.to_string().contains("cannot be created by hand"));

        assert!(add(&ctx, options("a:b")).is_err());
        assert!(!ctx.store_path.exists());
    }

    #[test]
    fn test_unrestorable_entries_survive_changes() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, tmp.path());
        std::fs::write(
            &ctx.store_path,
            r#"
[[toolchain]]
"ProjectExplorer.ToolChain.Id" = "borland:{1}"
"ProjectExplorer.ToolChain.DisplayName" = "Turbo C"
"#,
        )
        .unwrap();

        assert!(list(&ctx).unwrap().is_empty());

        add(
            &ctx,
            AddOptions {
                kind: "gcc".into(),
                language: Language::C,
                compiler: None,
                name: None,
            },
        )
        .unwrap();

        let store = ToolchainStore::load(&ctx.store_path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(list(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_find_toolchain_by_prefix() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, tmp.path());
        let added = add(
            &ctx,
            AddOptions {
                kind: "clang".into(),
                language: Language::Cxx,
                compiler: None,
                name: None,
            },
        )
        .unwrap();

        let session = ctx.open().unwrap();
        let prefix = &trim_braces(&added.id)[..8];
        assert_eq!(find_toolchain(&session.toolchains, prefix).unwrap(), 0);
        assert_eq!(find_toolchain(&session.toolchains, &added.id).unwrap(), 0);
        assert!(find_toolchain(&session.toolchains, "zzzz").is_err());
        assert!(find_toolchain(&session.toolchains, "{}").is_err());
    }

    #[test]
    fn test_check_reports_missing_compiler() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, tmp.path());
        assert!(check(&ctx, CheckOptions::default()).is_err());

        add(
            &ctx,
            AddOptions {
                kind: "gcc".into(),
                language: Language::C,
                compiler: Some(tmp.path().join("gone-gcc")),
                name: Some("Gone".into()),
            },
        )
        .unwrap();

        let report = check(
            &ctx,
            CheckOptions {
                target: Some("x86_64-unknown-linux-gnu".into()),
            },
        )
        .unwrap();
        assert!(report.has_errors());
        assert_eq!(report.entries.len(), 1);

        let text = format_check_report(&report, false);
        assert!(text.contains("[!!] Gone (gcc)"));
        assert!(text.contains("does not exist"));
    }

    #[test]
    fn test_languages_table() {
        let rows = languages();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "C");
        assert_eq!(rows[1].ordinal, 2);
    }

    #[test]
    fn test_format_toolchains() {
        let summary = ToolchainSummary {
            id: "{1}".into(),
            kind: "gcc".into(),
            display_name: "GCC C".into(),
            language: Language::C,
            detection: Detection::Auto,
            compiler: Some(PathBuf::from("/usr/bin/gcc")),
            target: None,
        };
        let text = format_toolchains(&[summary]);
        assert!(text.starts_with("{1}  gcc"));
        assert!(text.contains("compiler: /usr/bin/gcc"));
    }
}
