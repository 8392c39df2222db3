//! Staleness checks for cached classpath artifacts

use super::artifacts::CacheArtifacts;
use crate::cli::Options;
use crate::error::{LauncherError, LauncherResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Platform separator between classpath entries
#[cfg(windows)]
pub const PATH_LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_LIST_SEPARATOR: char = ':';

/// Decide whether the classpath must be recomputed.
pub fn is_stale(
    options: &Options,
    artifacts: &CacheArtifacts,
    config_paths: &[PathBuf],
    tools_dir: &Path,
) -> LauncherResult<bool> {
    let deps = &options.deps;
    let cp_file = &artifacts.cp_file;

    if deps.force || deps.trace || deps.tree || deps.prep || !cp_file.exists() {
        return Ok(true);
    }

    if !deps.tool_name.is_empty() {
        let tool = tools_dir.join(format!("{}.edn", deps.tool_name));
        if is_newer(&tool, cp_file)? {
            debug!("Tool descriptor {} changed", tool.display());
            return Ok(true);
        }
    }

    let classpath = read_to_string(cp_file)?;
    let missing_jar = classpath
        .trim_end()
        .split(PATH_LIST_SEPARATOR)
        .filter(|entry| entry.ends_with(".jar"))
        .find(|entry| !Path::new(entry).exists());
    if let Some(jar) = missing_jar {
        debug!("Classpath jar {} is missing", jar);
        return Ok(true);
    }

    for path in config_paths {
        if is_newer(path, cp_file)? {
            debug!("Config {} changed", path.display());
            return Ok(true);
        }
    }

    if artifacts.manifest_file.exists() {
        let manifest = read_to_string(&artifacts.manifest_file)?;
        for line in manifest.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let tracked = Path::new(line);
            if !tracked.exists() || is_newer(tracked, cp_file)? {
                debug!("Manifest entry {} changed", line);
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// True when `a` was modified strictly after `b`.
///
/// A missing `a` is never newer; a missing `b` is always older.
pub fn is_newer(a: &Path, b: &Path) -> LauncherResult<bool> {
    let Some(a_time) = modified(a)? else {
        return Ok(false);
    };
    let Some(b_time) = modified(b)? else {
        return Ok(true);
    };
    Ok(a_time > b_time)
}

fn modified(path: &Path) -> LauncherResult<Option<SystemTime>> {
    match fs::metadata(path) {
        Ok(meta) => meta
            .modified()
            .map(Some)
            .map_err(|e| LauncherError::io(format!("reading mtime of {}", path.display()), e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LauncherError::io(format!("reading metadata of {}", path.display()), e)),
    }
}

fn read_to_string(path: &Path) -> LauncherResult<String> {
    fs::read_to_string(path).map_err(|e| LauncherError::io(format!("reading {}", path.display()), e))
}
