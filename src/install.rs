//! Tools distribution installer
//!
//! The launcher runs the official tools jars, unpacked once per version
//! under the install directory. A missing file triggers a download of the
//! release archive; only the jars and the three EDN files are kept.

use crate::config::Environment;
use crate::error::{LauncherError, LauncherResult};
use crate::CLOJURE_TOOLS_VERSION;
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory of the jars inside the install dir
pub const LIBEXEC_DIR: &str = "libexec";

/// Top-level directory inside the release archive
const ARCHIVE_ROOT: &str = "clojure-tools";

fn tools_jar_name() -> String {
    format!("clojure-tools-{}.jar", CLOJURE_TOOLS_VERSION)
}

fn archive_name() -> String {
    format!("clojure-tools-{}.tar.gz", CLOJURE_TOOLS_VERSION)
}

/// Release archive URL, unless overridden in settings
pub fn download_url(env: &Environment) -> String {
    env.settings.tools.download_url.clone().unwrap_or_else(|| {
        format!(
            "https://github.com/clojure/brew-install/releases/download/{}/{}",
            CLOJURE_TOOLS_VERSION,
            archive_name()
        )
    })
}

/// Files kept from the release archive
fn archive_files() -> Vec<String> {
    vec![
        "deps.edn".to_string(),
        "example-deps.edn".to_string(),
        "tools.edn".to_string(),
        "exec.jar".to_string(),
        tools_jar_name(),
    ]
}

/// Install location of an archive file; jars go to `libexec/`
fn install_path(install_dir: &Path, name: &str) -> PathBuf {
    if name.ends_with(".jar") {
        install_dir.join(LIBEXEC_DIR).join(name)
    } else {
        install_dir.join(name)
    }
}

/// Required files not yet present in `install_dir`
pub fn missing_files(install_dir: &Path) -> Vec<PathBuf> {
    archive_files()
        .iter()
        .map(|name| install_path(install_dir, name))
        .filter(|path| !path.exists())
        .collect()
}

/// Make sure the tools are unpacked and the user config is seeded
pub async fn ensure_installed(env: &Environment) -> LauncherResult<()> {
    let install_dir = env.install_dir.clone();
    let missing = missing_files(&install_dir);

    if !missing.is_empty() {
        debug!("Missing tools files: {:?}", missing);
        fs::create_dir_all(install_dir.join(LIBEXEC_DIR)).map_err(|e| {
            LauncherError::io(format!("creating install directory {}", install_dir.display()), e)
        })?;

        let archive = install_dir.join(archive_name());
        if !archive.exists() {
            let url = download_url(env);
            let pb = create_progress_bar(&format!("Downloading Clojure tools {}", CLOJURE_TOOLS_VERSION));
            let dest = archive.clone();
            let result = tokio::task::spawn_blocking(move || download(&url, &dest))
                .await
                .map_err(|e| LauncherError::Internal(format!("download task failed: {}", e)));
            pb.finish_and_clear();
            result??;
        }

        let dir = install_dir.clone();
        let source = archive.clone();
        tokio::task::spawn_blocking(move || extract(&source, &dir))
            .await
            .map_err(|e| LauncherError::Internal(format!("extract task failed: {}", e)))??;

        fs::remove_file(&archive)
            .map_err(|e| LauncherError::io(format!("removing {}", archive.display()), e))?;
        info!("Installed Clojure tools {} in {}", CLOJURE_TOOLS_VERSION, install_dir.display());
    }

    seed_user_config(env)
}

/// Fetch `url` into `dest`. The body lands in a sibling `.part` file first.
fn download(url: &str, dest: &Path) -> LauncherResult<()> {
    debug!("Downloading {}", url);
    let response = ureq::get(url).call().map_err(|e| LauncherError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let partial = dest.with_extension("part");
    let mut file = File::create(&partial)
        .map_err(|e| LauncherError::io(format!("creating {}", partial.display()), e))?;
    let mut reader = response.into_body().into_reader();
    io::copy(&mut reader, &mut file).map_err(|e| LauncherError::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    drop(file);

    fs::rename(&partial, dest)
        .map_err(|e| LauncherError::io(format!("moving download to {}", dest.display()), e))
}

/// Unpack the required files of a release archive into `install_dir`
pub fn extract(archive: &Path, install_dir: &Path) -> LauncherResult<()> {
    let extract_err = |reason: String| LauncherError::Extract {
        path: archive.to_path_buf(),
        reason,
    };

    let file = File::open(archive)
        .map_err(|e| LauncherError::io(format!("opening {}", archive.display()), e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let wanted = archive_files();

    let entries = tar.entries().map_err(|e| extract_err(e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| extract_err(e.to_string()))?;
        let path = entry.path().map_err(|e| extract_err(e.to_string()))?.into_owned();

        let Ok(name) = path.strip_prefix(ARCHIVE_ROOT) else {
            continue;
        };
        let Some(name) = name.to_str().filter(|n| wanted.iter().any(|w| w.as_str() == *n)) else {
            continue;
        };

        let target = install_path(install_dir, name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| LauncherError::io(format!("creating {}", parent.display()), e))?;
        }
        debug!("Extracting {} to {}", name, target.display());
        entry
            .unpack(&target)
            .map_err(|e| extract_err(format!("{}: {}", name, e)))?;
    }

    let missing = missing_files(install_dir);
    if !missing.is_empty() {
        return Err(extract_err(format!("archive lacks {:?}", missing)));
    }
    Ok(())
}

/// Copy the example user deps and the tools registry into the config dir
/// unless the user already has them.
pub fn seed_user_config(env: &Environment) -> LauncherResult<()> {
    copy_if_missing(&env.install_dir.join("example-deps.edn"), &env.user_deps())?;
    copy_if_missing(&env.install_dir.join("tools.edn"), &env.tools_dir.join("tools.edn"))
}

fn copy_if_missing(source: &Path, dest: &Path) -> LauncherResult<()> {
    if dest.exists() {
        return Ok(());
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| LauncherError::io(format!("creating {}", parent.display()), e))?;
    }
    debug!("Seeding {} from {}", dest.display(), source.display());
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|e| LauncherError::io(format!("copying {} to {}", source.display(), dest.display()), e))
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn env_with_home(home: &Path) -> Environment {
        let home = home.to_string_lossy().into_owned();
        Environment::resolve_with(Settings::default(), PathBuf::from("/work"), &|key| match key {
            "HOME" => Some(home.clone()),
            "JAVA_CMD" => Some("java".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn build_archive(path: &Path, names: &[String]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        let mut entries: Vec<String> = names.to_vec();
        entries.push("README.md".to_string());
        for name in entries {
            let data = format!("content of {}", name);
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, format!("{}/{}", ARCHIVE_ROOT, name), data.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    fn install_all(dir: &Path) {
        for name in archive_files() {
            let path = install_path(dir, &name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, name).unwrap();
        }
    }

    #[test]
    fn default_download_url() {
        let temp = TempDir::new().unwrap();
        let env = env_with_home(temp.path());
        assert_eq!(
            download_url(&env),
            format!(
                "https://github.com/clojure/brew-install/releases/download/{v}/clojure-tools-{v}.tar.gz",
                v = CLOJURE_TOOLS_VERSION
            )
        );

        let mut env = env;
        env.settings.tools.download_url = Some("https://mirror/tools.tar.gz".to_string());
        assert_eq!(download_url(&env), "https://mirror/tools.tar.gz");
    }

    #[test]
    fn missing_files_detected() {
        let temp = TempDir::new().unwrap();
        assert_eq!(missing_files(temp.path()).len(), 5);

        install_all(temp.path());
        assert!(missing_files(temp.path()).is_empty());

        fs::remove_file(temp.path().join(LIBEXEC_DIR).join("exec.jar")).unwrap();
        assert_eq!(
            missing_files(temp.path()),
            vec![temp.path().join(LIBEXEC_DIR).join("exec.jar")]
        );
    }

    #[test]
    fn extract_places_jars_in_libexec() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("tools.tar.gz");
        build_archive(&archive, &archive_files());
        let install_dir = temp.path().join("install");

        extract(&archive, &install_dir).unwrap();

        assert!(missing_files(&install_dir).is_empty());
        assert_eq!(
            fs::read_to_string(install_dir.join(LIBEXEC_DIR).join(tools_jar_name())).unwrap(),
            format!("content of {}", tools_jar_name())
        );
        assert!(install_dir.join("deps.edn").is_file());
        assert!(!install_dir.join("README.md").exists());
    }

    #[test]
    fn extract_rejects_incomplete_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("tools.tar.gz");
        build_archive(&archive, &["deps.edn".to_string()]);

        let err = extract(&archive, &temp.path().join("install")).unwrap_err();
        assert!(matches!(err, LauncherError::Extract { .. }));
    }

    #[test]
    fn seeding_keeps_existing_user_files() {
        let home = TempDir::new().unwrap();
        let env = env_with_home(home.path());
        install_all(&env.install_dir);

        fs::create_dir_all(&env.config_dir).unwrap();
        fs::write(env.user_deps(), "{:mine true}").unwrap();

        seed_user_config(&env).unwrap();

        assert_eq!(fs::read_to_string(env.user_deps()).unwrap(), "{:mine true}");
        assert_eq!(
            fs::read_to_string(env.tools_dir.join("tools.edn")).unwrap(),
            "tools.edn"
        );
    }

    #[tokio::test]
    async fn ensure_installed_from_local_archive() {
        let home = TempDir::new().unwrap();
        let env = env_with_home(home.path());
        fs::create_dir_all(&env.install_dir).unwrap();
        build_archive(&env.install_dir.join(archive_name()), &archive_files());

        ensure_installed(&env).await.unwrap();

        assert!(missing_files(&env.install_dir).is_empty());
        assert!(!env.install_dir.join(archive_name()).exists());
        assert_eq!(
            fs::read_to_string(env.user_deps()).unwrap(),
            "content of example-deps.edn"
        );
    }
}
