//! Compiler discovery shared by the toolchain factories.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::core::ids::ToolchainTypeId;
use crate::core::language::Language;
use crate::util::process::{canonical_path, find_executables, ExecutableCheck, FsExecutableCheck};

use super::Toolchain;

/// Where and how factories look for compilers.
#[derive(Clone)]
pub struct CompilerSearch {
    search_path: Option<OsString>,
    checker: Arc<dyn ExecutableCheck>,
}

impl CompilerSearch {
    /// Search `PATH` and accept any executable file.
    pub fn from_env() -> Self {
        CompilerSearch {
            search_path: None,
            checker: Arc::new(FsExecutableCheck),
        }
    }

    /// Search only the given directories.
    ///
    /// Falls back to `PATH` if the directories cannot be joined into a
    /// search path.
    pub fn with_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dirs: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
        let search_path = match std::env::join_paths(&dirs) {
            Ok(joined) => Some(joined),
            Err(e) => {
                tracing::warn!("ignoring configured search paths: {}", e);
                None
            }
        };
        CompilerSearch {
            search_path,
            checker: Arc::new(FsExecutableCheck),
        }
    }

    /// Replace the executable check.
    pub fn with_checker(mut self, checker: Arc<dyn ExecutableCheck>) -> Self {
        self.checker = checker;
        self
    }

    /// Validate a single candidate.
    pub fn check(&self, path: &Path) -> Result<(), String> {
        self.checker.check(path)
    }

    /// Usable compilers for any of `names`, one per installation, in search order.
    pub fn find_all(&self, names: &[&str]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        for name in names {
            for candidate in find_executables(name, self.search_path.as_ref()) {
                if let Err(reason) = self.checker.check(&candidate) {
                    tracing::debug!("skipping {}: {}", candidate.display(), reason);
                    continue;
                }
                if seen.insert(canonical_path(&candidate)) {
                    found.push(candidate);
                }
            }
        }

        found
    }
}

impl Default for CompilerSearch {
    fn default() -> Self {
        Self::from_env()
    }
}

impl std::fmt::Debug for CompilerSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerSearch")
            .field("search_path", &self.search_path)
            .finish_non_exhaustive()
    }
}

/// Whether a known toolchain of `type_id` and `language` already uses `path`.
pub(crate) fn is_claimed(
    already_known: &[Box<dyn Toolchain>],
    type_id: &ToolchainTypeId,
    language: Language,
    path: &Path,
) -> bool {
    let wanted = canonical_path(path);
    already_known.iter().any(|tc| {
        tc.type_id() == type_id
            && tc.language() == language
            && tc
                .compiler_path()
                .is_some_and(|known| canonical_path(known) == wanted)
    })
}

static CROSS_COMPILER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<triple>[A-Za-z0-9_.]+(?:-[A-Za-z0-9_.]+){1,3})-(?:gcc|g\+\+|cc|c\+\+|clang|clang\+\+)(?:-[0-9][0-9.]*)?(?:\.exe)?$",
    )
    .expect("cross-compiler pattern is valid")
});

/// Target triple encoded in a cross-compiler name.
///
/// - x86_64-linux-gnu-gcc -> x86_64-linux-gnu
/// - aarch64-none-elf-g++-13 -> aarch64-none-elf
/// - gcc, clang++ -> None
pub fn infer_target_triple(compiler: &Path) -> Option<String> {
    let name = compiler.file_name()?.to_str()?;
    CROSS_COMPILER
        .captures(name)
        .map(|caps| caps["triple"].to_string())
}

/// Host architecture in the naming MSVC uses.
pub(crate) fn msvc_host_arch() -> Option<&'static str> {
    match std::env::consts::ARCH {
        "x86_64" => Some("x64"),
        "x86" => Some("x86"),
        "aarch64" => Some("arm64"),
        _ => None,
    }
}
