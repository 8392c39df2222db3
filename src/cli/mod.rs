//! Command line front end shared by the `clojure` and `clj` binaries

pub mod commands;
pub mod options;
pub mod parser;
pub mod tokenize;
pub mod usage;

pub use options::{Entry, Mode, Options, ParseOutcome, VersionStream};

use crate::config::{ConfigManager, Environment, Settings};
use crate::error::LauncherResult;
use crate::process::SystemRunner;
use crate::CLOJURE_TOOLS_VERSION;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter
pub const LOG_ENV: &str = "CLOJURE_LAUNCHER_LOG";

/// Run a launcher binary to completion
pub async fn main(entry: Entry) -> ExitCode {
    match run(entry).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(entry: Entry) -> LauncherResult<()> {
    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    let options = match parser::read(args, entry)? {
        ParseOutcome::Version(VersionStream::Stdout) => {
            println!("{}", version_line());
            return Ok(());
        }
        ParseOutcome::Version(VersionStream::Stderr) => {
            eprintln!("{}", version_line());
            return Ok(());
        }
        ParseOutcome::Run(options) => options,
    };

    if options.wants_help() {
        println!("{}", usage::usage());
        return Ok(());
    }

    let config_manager = ConfigManager::new();
    let settings = config_manager.load().await?;
    init_logging(&settings, options.deps.verbose);
    debug!("Settings loaded from {}", config_manager.path().display());

    let env = Environment::resolve(settings)?;
    commands::launch(&options, &env, &SystemRunner).await
}

fn version_line() -> String {
    format!("Clojure CLI version {}", CLOJURE_TOOLS_VERSION)
}

/// Log filter: `$CLOJURE_LAUNCHER_LOG`, then settings, then verbosity
fn log_filter(env_filter: Option<String>, settings: &Settings, verbose: bool) -> String {
    env_filter
        .or_else(|| settings.general.log.clone())
        .unwrap_or_else(|| {
            if verbose {
                "clojure_launcher=debug".to_string()
            } else {
                "clojure_launcher=warn".to_string()
            }
        })
}

fn init_logging(settings: &Settings, verbose: bool) {
    let directive = log_filter(std::env::var(LOG_ENV).ok(), settings, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("clojure_launcher=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
