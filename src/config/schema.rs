//! Launcher settings schema
//!
//! Settings are read from `~/.clojure-launcher/config.toml` (or
//! `$CLOJURE_LAUNCHER_CONFIG`). Every key is optional.

use serde::Deserialize;
use std::path::PathBuf;

/// Root settings structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Logging settings
    pub general: GeneralSettings,

    /// Java runtime settings
    pub java: JavaSettings,

    /// Readline wrapper settings
    pub readline: ReadlineSettings,

    /// Tools distribution settings
    pub tools: ToolsSettings,
}

/// General settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log filter used when CLOJURE_LAUNCHER_LOG is unset
    pub log: Option<String>,
}

/// Java runtime settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JavaSettings {
    /// Java executable, used when JAVA_CMD is unset
    pub cmd: Option<PathBuf>,

    /// JVM options added to every program launch, before JAVA_OPTS
    pub opts: Vec<String>,
}

/// Readline wrapper settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadlineSettings {
    /// Allow `clj` to wrap the REPL in rlwrap
    pub rlwrap: bool,
}

impl Default for ReadlineSettings {
    fn default() -> Self {
        Self { rlwrap: true }
    }
}

/// Tools distribution settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsSettings {
    /// Alternative URL of the tools tar.gz
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert!(settings.readline.rlwrap);
        assert!(settings.java.cmd.is_none());
        assert!(settings.java.opts.is_empty());
        assert!(settings.tools.download_url.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [java]
            cmd = "/opt/jdk/bin/java"
            "#,
        )
        .unwrap();
        assert_eq!(settings.java.cmd, Some(PathBuf::from("/opt/jdk/bin/java")));
        assert!(settings.readline.rlwrap);
    }

    #[test]
    fn full_file() {
        let settings: Settings = toml::from_str(
            r#"
            [general]
            log = "clojure_launcher=info"

            [java]
            opts = ["-Xss4m"]

            [readline]
            rlwrap = false

            [tools]
            download_url = "https://mirror.example/tools.tar.gz"
            "#,
        )
        .unwrap();
        assert_eq!(settings.general.log.as_deref(), Some("clojure_launcher=info"));
        assert_eq!(settings.java.opts, vec!["-Xss4m"]);
        assert!(!settings.readline.rlwrap);
        assert_eq!(
            settings.tools.download_url.as_deref(),
            Some("https://mirror.example/tools.tar.gz")
        );
    }
}
