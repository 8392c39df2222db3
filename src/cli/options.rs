//! Parsed command line options
//!
//! The record produced by the phased parser in [`super::parser`]. It holds
//! only what was typed; paths and cache decisions are derived later.

/// Which launcher binary is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// `clojure`: plain launcher
    Clojure,
    /// `clj`: REPL-oriented launcher with readline support
    Clj,
}

/// Execution mode selected by the exec-opt flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No -M/-X/-T given
    #[default]
    Repl,
    /// `-M[aliases]`
    Main,
    /// `-X[aliases]`
    Exec,
    /// `-T[name|aliases]`
    Tool,
}

/// Where `-version` / `--version` print
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStream {
    Stdout,
    Stderr,
}

/// Result of reading the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Continue with these options
    Run(Options),
    /// Print the version and exit
    Version(VersionStream),
}

/// Launcher-specific flags, consumed before anything else
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOpts {
    /// Keep the argument vector as the OS delivered it
    pub native_args: bool,
    /// Wrap the REPL in rlwrap
    pub rlwrap: bool,
}

/// Dependency and classpath flags (`-J`, `-A`, `-M`, `-X`, `-T`, `-P`, `-S*`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepsOpts {
    pub jvm_opts: Vec<String>,
    pub repl_aliases: Vec<String>,
    pub main_aliases: String,
    pub exec_aliases: String,
    pub tool_aliases: String,
    pub tool_name: String,
    pub deps_data: Option<String>,
    pub force_cp: Option<String>,
    pub threads: Option<u32>,
    pub print_classpath: bool,
    pub prep: bool,
    pub repro: bool,
    pub force: bool,
    pub pom: bool,
    pub tree: bool,
    pub verbose: bool,
    pub describe: bool,
    pub trace: bool,
}

/// clojure.main init flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitOpts {
    pub init: Option<String>,
    pub eval: Option<String>,
    pub report: Option<String>,
}

/// clojure.main main flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainOpts {
    pub main_args: Vec<String>,
    pub repl: bool,
    /// The literal help token (`-h`, `-?` or `--help`), if given
    pub help: Option<String>,
}

/// Everything read from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub tool: ToolOpts,
    pub deps: DepsOpts,
    pub init: InitOpts,
    pub main: MainOpts,
    /// Trailing arguments passed through untouched
    pub args: Vec<String>,
    pub mode: Mode,
}

impl Options {
    /// Whether the usage screen should be printed instead of launching
    pub fn wants_help(&self) -> bool {
        self.main.help.is_some()
    }

    /// clojure.main init arguments in the order the runtime expects them
    pub fn init_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(init) = &self.init.init {
            args.push("-i".to_string());
            args.push(init.clone());
        }
        if let Some(eval) = &self.init.eval {
            args.push("-e".to_string());
            args.push(eval.clone());
        }
        if let Some(report) = &self.init.report {
            args.push("--report".to_string());
            args.push(report.clone());
        }
        args
    }

    /// `-A` aliases as one concatenated string
    pub fn repl_aliases(&self) -> String {
        self.deps.repl_aliases.concat()
    }
}
