//! Executable lookup and validation.
//!
//! Nothing here runs a process; candidates are judged by what the
//! filesystem says about them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Decides whether a path is a usable executable.
pub trait ExecutableCheck: Send + Sync {
    /// `Ok` if `path` can be used, otherwise a human-readable reason.
    fn check(&self, path: &Path) -> Result<(), String>;
}

/// Checks that the path is an existing file with an executable bit set.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsExecutableCheck;

impl ExecutableCheck for FsExecutableCheck {
    fn check(&self, path: &Path) -> Result<(), String> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| format!("`{}` cannot be accessed: {}", path.display(), e))?;

        if !metadata.is_file() {
            return Err(format!("`{}` is not a file", path.display()));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(format!("`{}` is not executable", path.display()));
            }
        }

        Ok(())
    }
}

/// Every executable named `name` on `search_path`, in search order.
///
/// Uses `PATH` when `search_path` is `None`.
pub fn find_executables(name: &str, search_path: Option<&OsString>) -> Vec<PathBuf> {
    let paths = match search_path {
        Some(paths) => Some(paths.clone()),
        None => std::env::var_os("PATH"),
    };
    let Some(paths) = paths else {
        return Vec::new();
    };
    let cwd = std::env::current_dir().unwrap_or_default();

    match which::which_in_all(name, Some(paths), cwd) {
        Ok(found) => found.collect(),
        Err(e) => {
            tracing::debug!("search for `{}` failed: {}", name, e);
            Vec::new()
        }
    }
}

/// Resolve symlinks so two names for one installation compare equal.
pub fn canonical_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_check_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = FsExecutableCheck
            .check(&tmp.path().join("nope"))
            .unwrap_err();
        assert!(err.contains("cannot be accessed"));
    }

    #[test]
    fn test_check_directory() {
        let tmp = TempDir::new().unwrap();
        let err = FsExecutableCheck.check(tmp.path()).unwrap_err();
        assert!(err.contains("is not a file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_executable_bit() {
        let tmp = TempDir::new().unwrap();
        let plain = tmp.path().join("plain");
        std::fs::write(&plain, "").unwrap();
        assert!(FsExecutableCheck.check(&plain).is_err());

        let exe = write_executable(tmp.path(), "gcc");
        assert!(FsExecutableCheck.check(&exe).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executables_in_search_path() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_executable(first.path(), "gcc");
        write_executable(second.path(), "gcc");

        let search = std::env::join_paths([first.path(), second.path()]).unwrap();
        let found = find_executables("gcc", Some(&search));
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with(first.path()));

        assert!(find_executables("clang", Some(&search)).is_empty());
    }
}
