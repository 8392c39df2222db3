//! Reading cached classpath and JVM/main option files

use super::artifacts::CacheArtifacts;
use super::stale::{is_newer, PATH_LIST_SEPARATOR};
use crate::cli::Options;
use crate::error::{LauncherError, LauncherResult};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Longer classpaths are passed to java as an `@argfile`
pub const MAX_INLINE_CLASSPATH: u64 = 2048;

/// Classpath for this launch: empty for `-Sdescribe`, `-Scp` verbatim,
/// otherwise the cached one.
pub fn active_classpath(options: &Options, artifacts: &CacheArtifacts) -> LauncherResult<String> {
    if options.deps.describe {
        return Ok(String::new());
    }
    if let Some(cp) = &options.deps.force_cp {
        return Ok(cp.clone());
    }

    let cp_file = &artifacts.cp_file;
    let content = fs::read_to_string(cp_file)
        .map_err(|e| LauncherError::io(format!("reading classpath {}", cp_file.display()), e))?;

    if content.len() as u64 > MAX_INLINE_CLASSPATH {
        debug!("Classpath exceeds {} bytes, using argfile", MAX_INLINE_CLASSPATH);
        return Ok(format!("@{}", cp_file.display()));
    }
    Ok(content)
}

/// Classpath for `clojure.run.exec`: the active classpath plus the exec jar.
///
/// For an `@argfile` classpath a sibling `.exec` argfile is kept up to date
/// and referenced instead.
pub fn exec_classpath(cp: &str, exec_jar: &Path) -> LauncherResult<String> {
    let Some(source) = cp.strip_prefix('@') else {
        return Ok(format!("{}{}{}", cp, PATH_LIST_SEPARATOR, exec_jar.display()));
    };

    let source = Path::new(source);
    let exec_file = source.with_file_name(format!(
        "{}.exec",
        source.file_name().unwrap_or_default().to_string_lossy()
    ));

    if !is_newer(&exec_file, source)? {
        debug!("Writing exec argfile {}", exec_file.display());
        fs::copy(source, &exec_file)
            .map_err(|e| LauncherError::io(format!("copying {}", source.display()), e))?;
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(&exec_file)
            .map_err(|e| LauncherError::io(format!("opening {}", exec_file.display()), e))?;
        write!(file, "{}{}", PATH_LIST_SEPARATOR, exec_jar.display())
            .map_err(|e| LauncherError::io(format!("writing {}", exec_file.display()), e))?;
    }

    Ok(format!("@{}", exec_file.display()))
}

/// Whitespace-separated options from a `.jvm` or `.main` cache file
pub fn read_cache_opts(file: &Path) -> LauncherResult<Vec<String>> {
    match fs::read_to_string(file) {
        Ok(content) => Ok(content.split_whitespace().map(str::to_string).collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(LauncherError::io(format!("reading {}", file.display()), e)),
    }
}
