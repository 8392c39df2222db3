//! `clj` entry point: the REPL launcher, wrapped in rlwrap when available

use clojure_launcher::cli::{self, Entry};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cli::main(Entry::Clj).await
}
