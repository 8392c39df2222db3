//! `clojure` entry point

use clojure_launcher::cli::{self, Entry};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::main(Entry::Clojure).await
}
