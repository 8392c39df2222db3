//! Command line re-tokenization
//!
//! On Windows the arguments handed to a native binary have already been
//! mangled by the C runtime's quoting rules, which mis-handle EDN literals
//! such as `'{:deps {}}'`. Unless `--native-args` is given, the raw command
//! line is fetched again and split with POSIX-like quoting.

use crate::error::{LauncherError, LauncherResult};

const SPACE: char = ' ';
const DOUBLE_QUOTE: char = '"';
const SINGLE_QUOTE: char = '\'';
const ESCAPE: char = '\\';

/// Return the argument vector to parse.
///
/// `native` passes `args` through; otherwise the process command line is
/// queried from the OS and split again.
pub fn linuxize(args: Vec<String>, native: bool) -> LauncherResult<Vec<String>> {
    if native {
        return Ok(args);
    }

    query_command_line()
}

#[cfg(windows)]
fn query_command_line() -> LauncherResult<Vec<String>> {
    use std::process::Command;
    use tracing::debug;

    let pid = std::process::id();
    debug!("Querying command line of process {}", pid);

    let output = Command::new("wmic")
        .args([
            "process",
            "where",
            &format!("ProcessId={}", pid),
            "get",
            "CommandLine",
        ])
        .output()
        .map_err(|e| LauncherError::command_failed("wmic process get CommandLine", e))?;

    parse_wmic_output(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(windows))]
fn query_command_line() -> LauncherResult<Vec<String>> {
    Err(LauncherError::CommandLineUnavailable)
}

/// Extract the argument list from `wmic ... get CommandLine` output.
///
/// The first line is the `CommandLine` column header, the second the value.
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_wmic_output(output: &str) -> LauncherResult<Vec<String>> {
    let mut lines = output.split('\n').map(|line| line.trim_end_matches('\r'));

    let header = lines.next().unwrap_or_default();
    if !header.starts_with("CommandLine") {
        return Err(LauncherError::CommandLineUnavailable);
    }

    match lines.next() {
        Some(line) if !line.trim().is_empty() => Ok(split_to_args(line)),
        _ => Err(LauncherError::CommandLineUnavailable),
    }
}

/// Split a raw command line into arguments.
///
/// Single and double quotes group characters, `\"` inside double quotes is
/// kept inside the group. Quotes wrapping a whole token are stripped;
/// unbalanced quotes stay in the token as typed.
pub fn split_to_args(command_line: &str) -> Vec<String> {
    let cleaned = command_line.replace('\r', "");
    let mut args = Vec::new();
    let mut arg = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in cleaned.trim().chars() {
        match quote {
            None => match c {
                SPACE => {
                    if !arg.is_empty() {
                        args.push(trim_quotes(&arg));
                        arg.clear();
                    }
                }
                DOUBLE_QUOTE | SINGLE_QUOTE => {
                    quote = Some(c);
                    arg.push(c);
                }
                _ => arg.push(c),
            },
            Some(open) => {
                if escaped {
                    escaped = false;
                } else if open == DOUBLE_QUOTE && c == ESCAPE {
                    escaped = true;
                } else if c == open {
                    quote = None;
                }
                arg.push(c);
            }
        }
    }

    if !arg.is_empty() {
        args.push(trim_quotes(&arg));
    }

    args
}

fn trim_quotes(token: &str) -> String {
    for quote in [DOUBLE_QUOTE, SINGLE_QUOTE] {
        if token.len() >= 2 && token.starts_with(quote) && token.ends_with(quote) {
            let inner = &token[1..token.len() - 1];
            return if quote == DOUBLE_QUOTE {
                inner.replace("\\\"", "\"")
            } else {
                inner.to_string()
            };
        }
    }
    token.to_string()
}
