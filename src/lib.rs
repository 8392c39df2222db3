//! Clojure launcher
//!
//! Native `clojure` and `clj` commands. They parse the Clojure CLI
//! grammar, keep the official tools distribution installed, maintain the
//! classpath cache and start the JVM.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod install;
pub mod invoke;
pub mod process;

pub use error::{LauncherError, LauncherResult};

/// Version of the official Clojure tools this launcher drives
pub const CLOJURE_TOOLS_VERSION: &str = "1.12.0.1517";
