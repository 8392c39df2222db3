//! Launcher configuration
//!
//! Two pieces: optional user [`Settings`] loaded from TOML, and the
//! [`Environment`], the immutable set of resolved directories and
//! executables built once at startup and passed to everything downstream.

pub mod schema;

pub use schema::Settings;

use crate::error::{LauncherError, LauncherResult};
use crate::CLOJURE_TOOLS_VERSION;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Launcher home directory name, under the user home
pub const LAUNCHER_HOME: &str = ".clojure-launcher";

/// Settings file loader
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for `$CLOJURE_LAUNCHER_CONFIG` or the default path
    pub fn new() -> Self {
        let config_path = std::env::var_os("CLOJURE_LAUNCHER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);
        Self { config_path }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default settings file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(LAUNCHER_HOME)
            .join("config.toml")
    }

    /// Load settings, falling back to defaults when the file is absent
    pub async fn load(&self) -> LauncherResult<Settings> {
        if !self.config_path.exists() {
            debug!("Settings file not found, using defaults");
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_path).await.map_err(|e| {
            LauncherError::io(format!("reading settings from {}", self.config_path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| LauncherError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })
    }

    /// Get the settings file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved directories and executables for one launch
#[derive(Debug, Clone)]
pub struct Environment {
    /// Unpacked tools distribution, `~/.clojure-launcher/<version>`
    pub install_dir: PathBuf,
    /// User deps config, `~/.clojure` by default
    pub config_dir: PathBuf,
    /// Installed tool descriptors, `<config_dir>/tools`
    pub tools_dir: PathBuf,
    /// Cache used when the project has no writable `.cpcache`
    pub user_cache_dir: PathBuf,
    /// Working directory of the launch
    pub cwd: PathBuf,
    /// Java executable
    pub java: PathBuf,
    /// JVM options for the launched program (settings, then JAVA_OPTS)
    pub java_opts: Vec<String>,
    /// JVM options for classpath computation (CLJ_JVM_OPTS)
    pub tool_jvm_opts: Vec<String>,
    pub settings: Settings,
}

impl Environment {
    /// Resolve from the process environment
    pub fn resolve(settings: Settings) -> LauncherResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| LauncherError::io("getting current directory", e))?;
        Self::resolve_with(settings, cwd, &|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` for environment variables
    pub fn resolve_with(
        settings: Settings,
        cwd: PathBuf,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> LauncherResult<Self> {
        let home = || {
            lookup("HOME")
                .map(PathBuf::from)
                .or_else(dirs::home_dir)
                .ok_or(LauncherError::HomeNotFound)
        };

        let install_dir = home()?.join(LAUNCHER_HOME).join(CLOJURE_TOOLS_VERSION);

        let config_dir = match (lookup("CLJ_CONFIG"), lookup("XDG_CONFIG_HOME")) {
            (Some(dir), _) => PathBuf::from(dir),
            (None, Some(xdg)) => PathBuf::from(xdg).join("clojure"),
            (None, None) => home()?.join(".clojure"),
        };

        let user_cache_dir = match (lookup("CLJ_CACHE"), lookup("XDG_CACHE_HOME")) {
            (Some(dir), _) => PathBuf::from(dir),
            (None, Some(xdg)) => PathBuf::from(xdg).join("clojure"),
            (None, None) => config_dir.join(".cpcache"),
        };

        let java = find_java(&settings, lookup)?;
        debug!("Using java: {}", java.display());

        let mut java_opts = settings.java.opts.clone();
        java_opts.extend(split_opts(lookup("JAVA_OPTS")));
        let tool_jvm_opts = split_opts(lookup("CLJ_JVM_OPTS"));

        Ok(Self {
            install_dir,
            tools_dir: config_dir.join("tools"),
            config_dir,
            user_cache_dir,
            cwd,
            java,
            java_opts,
            tool_jvm_opts,
            settings,
        })
    }

    /// Classpath of the deps tool itself
    pub fn tools_jar(&self) -> PathBuf {
        self.install_dir
            .join("libexec")
            .join(format!("clojure-tools-{}.jar", CLOJURE_TOOLS_VERSION))
    }

    /// Jar providing `clojure.run.exec` for -X and -T
    pub fn exec_jar(&self) -> PathBuf {
        self.install_dir.join("libexec").join("exec.jar")
    }

    /// User-level deps.edn
    pub fn user_deps(&self) -> PathBuf {
        self.config_dir.join("deps.edn")
    }
}

/// Java lookup order: JAVA_CMD, settings, PATH, JAVA_HOME
fn find_java(settings: &Settings, lookup: &dyn Fn(&str) -> Option<String>) -> LauncherResult<PathBuf> {
    if let Some(cmd) = lookup("JAVA_CMD") {
        return Ok(PathBuf::from(cmd));
    }
    if let Some(cmd) = &settings.java.cmd {
        return Ok(cmd.clone());
    }
    if let Ok(path) = which::which("java") {
        return Ok(path);
    }
    match lookup("JAVA_HOME") {
        Some(home) => {
            let exe = if cfg!(windows) { "java.exe" } else { "java" };
            Ok(PathBuf::from(home).join("bin").join(exe))
        }
        None => Err(LauncherError::JavaNotFound),
    }
}

fn split_opts(value: Option<String>) -> Vec<String> {
    value
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
