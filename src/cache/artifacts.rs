//! Cache directory selection and artifact paths

use crate::config::Environment;
use crate::error::{LauncherError, LauncherResult};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local cache directory name
pub const PROJECT_CACHE_DIR: &str = ".cpcache";

/// Project deps file name, relative to the working directory
pub const PROJECT_DEPS: &str = "deps.edn";

/// Where artifacts for this launch live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLocation {
    pub dir: PathBuf,
    /// Extra key material; the project path when a shared cache is used
    pub dir_key: String,
}

/// Files written by the classpath tool for one cache key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheArtifacts {
    pub cp_file: PathBuf,
    pub jvm_file: PathBuf,
    pub main_file: PathBuf,
    pub basis_file: PathBuf,
    pub manifest_file: PathBuf,
}

impl CacheArtifacts {
    pub fn new(cache_dir: &Path, key: &str) -> Self {
        let file = |ext: &str| cache_dir.join(format!("{}.{}", key, ext));
        Self {
            cp_file: file("cp"),
            jvm_file: file("jvm"),
            main_file: file("main"),
            basis_file: file("basis"),
            manifest_file: file("manifest"),
        }
    }
}

/// Pick the cache directory.
///
/// A project with a writable working directory caches in `./.cpcache`.
/// A read-only project shares the user cache, keyed by its path; no
/// project at all uses the user cache as is.
pub fn select_cache_dir(env: &Environment) -> CacheLocation {
    select_with(env, is_writable_dir(&env.cwd))
}

fn select_with(env: &Environment, writable: bool) -> CacheLocation {
    let location = if !env.cwd.join(PROJECT_DEPS).exists() {
        CacheLocation {
            dir: env.user_cache_dir.clone(),
            dir_key: String::new(),
        }
    } else if writable {
        CacheLocation {
            dir: env.cwd.join(PROJECT_CACHE_DIR),
            dir_key: String::new(),
        }
    } else {
        CacheLocation {
            dir: env.user_cache_dir.clone(),
            dir_key: env.cwd.to_string_lossy().into_owned(),
        }
    };
    debug!("Cache location: {:?}", location);
    location
}

/// Config files taking part in the deps merge, lowest precedence first
pub fn config_paths(env: &Environment, repro: bool) -> Vec<PathBuf> {
    let mut paths = vec![env.install_dir.join("deps.edn")];
    if !repro {
        paths.push(env.user_deps());
    }
    paths.push(env.cwd.join(PROJECT_DEPS));
    paths
}

/// Make sure the cache directory exists before the tool writes into it
pub fn ensure_cache_dir(dir: &Path) -> LauncherResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| LauncherError::io(format!("creating cache directory {}", dir.display()), e))
}

#[cfg(unix)]
fn is_writable_dir(dir: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    match CString::new(dir.as_os_str().as_bytes()) {
        // SAFETY: `path` is a valid NUL-terminated string for the duration of the call
        Ok(path) => unsafe { libc::access(path.as_ptr(), libc::W_OK) == 0 },
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_writable_dir(dir: &Path) -> bool {
    let probe = dir.join(format!(".clojure-launcher-probe-{}", std::process::id()));
    match std::fs::OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(_) => {
            let _ = std::fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use tempfile::TempDir;

    fn env_in(cwd: &Path, home: &Path) -> Environment {
        let home = home.to_string_lossy().into_owned();
        Environment::resolve_with(Settings::default(), cwd.to_path_buf(), &|key| match key {
            "HOME" => Some(home.clone()),
            "JAVA_CMD" => Some("java".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn artifact_names() {
        let artifacts = CacheArtifacts::new(Path::new("/c"), "123");
        assert_eq!(artifacts.cp_file, PathBuf::from("/c/123.cp"));
        assert_eq!(artifacts.jvm_file, PathBuf::from("/c/123.jvm"));
        assert_eq!(artifacts.main_file, PathBuf::from("/c/123.main"));
        assert_eq!(artifacts.basis_file, PathBuf::from("/c/123.basis"));
        assert_eq!(artifacts.manifest_file, PathBuf::from("/c/123.manifest"));
    }

    #[test]
    fn no_project_uses_user_cache() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let env = env_in(cwd.path(), home.path());

        let location = select_cache_dir(&env);
        assert_eq!(location.dir, env.user_cache_dir);
        assert_eq!(location.dir_key, "");
    }

    #[test]
    fn writable_project_uses_local_cache() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(cwd.path().join("deps.edn"), "{}").unwrap();
        let env = env_in(cwd.path(), home.path());

        let location = select_cache_dir(&env);
        assert_eq!(location.dir, cwd.path().join(".cpcache"));
        assert_eq!(location.dir_key, "");
    }

    #[test]
    fn read_only_project_shares_user_cache() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(cwd.path().join("deps.edn"), "{}").unwrap();
        let env = env_in(cwd.path(), home.path());

        let read_only = select_with(&env, false);
        assert_eq!(read_only.dir, env.user_cache_dir);
        assert_eq!(read_only.dir_key, cwd.path().to_string_lossy());

        let writable = select_with(&env, true);
        let options = crate::cli::Options::default();
        let paths = config_paths(&env, false);
        assert_ne!(
            crate::cache::cache_key(&options, &paths, &read_only.dir_key),
            crate::cache::cache_key(&options, &paths, &writable.dir_key)
        );
    }

    #[test]
    fn config_paths_honor_repro() {
        let cwd = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        let env = env_in(cwd.path(), home.path());

        let paths = config_paths(&env, false);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], env.install_dir.join("deps.edn"));
        assert_eq!(paths[1], env.config_dir.join("deps.edn"));
        assert_eq!(paths[2], cwd.path().join("deps.edn"));

        let paths = config_paths(&env, true);
        assert_eq!(paths, vec![env.install_dir.join("deps.edn"), cwd.path().join("deps.edn")]);
    }

    #[test]
    fn ensure_cache_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");
        ensure_cache_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn temp_dir_is_writable() {
        let temp = TempDir::new().unwrap();
        assert!(is_writable_dir(temp.path()));
    }
}
