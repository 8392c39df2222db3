//! JVM invocation builders
//!
//! Every builder is pure: it turns options, environment and cache data into
//! an [`Invocation`] without touching the filesystem or spawning anything.
//! Running it is the job of [`crate::process`].

use crate::cache::CacheArtifacts;
use crate::cli::{Mode, Options};
use crate::config::Environment;
use std::fmt;
use std::path::{Path, PathBuf};

/// Namespace computing the classpath and writing the cache artifacts
pub const MAKE_CLASSPATH_NS: &str = "clojure.tools.deps.script.make-classpath2";

/// Namespace generating pom.xml
pub const GENERATE_MANIFEST_NS: &str = "clojure.tools.deps.script.generate-manifest2";

/// Namespace running -X and -T functions
pub const EXEC_NS: &str = "clojure.run.exec";

/// Project config passed to the classpath tool
pub const CONFIG_PROJECT: &str = "deps.edn";

/// rlwrap flags for a Clojure-friendly REPL
const RLWRAP_ARGS: [&str; 5] = ["-r", "-q", "\"", "-b", "(){}[],^%#@\";:'"];

/// A program with its arguments, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    /// Empty arguments are dropped.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().filter(|arg| !arg.is_empty()).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Cache-derived inputs of a program launch
#[derive(Debug, Clone, Copy)]
pub struct ProgramInputs<'a> {
    /// Options from the `.jvm` cache file
    pub jvm_cache_opts: &'a [String],
    pub basis_file: &'a Path,
    pub classpath: &'a str,
}

/// Arguments forwarded to the classpath tool; empty unless the cache is
/// stale or a pom is requested.
pub fn tools_args(options: &Options, stale: bool) -> Vec<String> {
    let deps = &options.deps;
    if !stale && !deps.pom {
        return Vec::new();
    }

    let mut args = Vec::new();
    if let Some(data) = deps.deps_data.as_deref().filter(|d| !d.is_empty()) {
        args.extend(["--config-data".to_string(), data.to_string()]);
    }
    if !deps.main_aliases.is_empty() {
        args.push(format!("-M{}", deps.main_aliases));
    }
    if !deps.repl_aliases.is_empty() {
        args.push(format!("-A{}", options.repl_aliases()));
    }
    if !deps.exec_aliases.is_empty() {
        args.push(format!("-X{}", deps.exec_aliases));
    }
    if options.mode == Mode::Tool {
        args.push("--tool-mode".to_string());
    }
    if !deps.tool_name.is_empty() {
        args.extend(["--tool-name".to_string(), deps.tool_name.clone()]);
    }
    if !deps.tool_aliases.is_empty() {
        args.push(format!("-T{}", deps.tool_aliases));
    }
    if deps.force_cp.is_some() {
        args.push("--skip-cp".to_string());
    }
    if let Some(threads) = deps.threads.filter(|t| *t > 0) {
        args.extend(["--threads".to_string(), threads.to_string()]);
    }
    if deps.tree {
        args.push("--tree".to_string());
    }
    if deps.trace {
        args.push("--trace".to_string());
    }
    args
}

/// `java ... clojure.main -m <ns>` on the tools classpath
fn tool_invocation(env: &Environment, ns: &str, config_user: Option<&Path>) -> Vec<String> {
    let mut args = env.tool_jvm_opts.clone();
    args.extend([
        "-classpath".to_string(),
        env.tools_jar().display().to_string(),
        "clojure.main".to_string(),
        "-m".to_string(),
        ns.to_string(),
    ]);
    if let Some(user) = config_user {
        args.extend(["--config-user".to_string(), user.display().to_string()]);
    }
    args.extend(["--config-project".to_string(), CONFIG_PROJECT.to_string()]);
    args
}

/// Recompute the classpath into the cache artifacts
pub fn make_classpath(
    env: &Environment,
    config_user: Option<&Path>,
    artifacts: &CacheArtifacts,
    tools_args: &[String],
) -> Invocation {
    let mut args = tool_invocation(env, MAKE_CLASSPATH_NS, config_user);
    for (flag, file) in [
        ("--basis-file", &artifacts.basis_file),
        ("--cp-file", &artifacts.cp_file),
        ("--jvm-file", &artifacts.jvm_file),
        ("--main-file", &artifacts.main_file),
        ("--manifest-file", &artifacts.manifest_file),
    ] {
        args.extend([flag.to_string(), file.display().to_string()]);
    }
    args.extend_from_slice(tools_args);
    Invocation::new(&env.java, args)
}

/// Generate or update pom.xml
pub fn generate_manifest(env: &Environment, config_user: Option<&Path>, tools_args: &[String]) -> Invocation {
    let mut args = tool_invocation(env, GENERATE_MANIFEST_NS, config_user);
    args.push("--gen=pom".to_string());
    args.extend_from_slice(tools_args);
    Invocation::new(&env.java, args)
}

/// JVM options shared by program launches
fn program_jvm_args(env: &Environment, options: &Options, inputs: &ProgramInputs<'_>) -> Vec<String> {
    let mut args = inputs.jvm_cache_opts.to_vec();
    args.extend(env.java_opts.iter().cloned());
    args.extend(options.deps.jvm_opts.iter().cloned());
    args.extend([
        format!("-Dclojure.basis={}", inputs.basis_file.display()),
        "-classpath".to_string(),
        inputs.classpath.to_string(),
        "clojure.main".to_string(),
    ]);
    args
}

/// Run a function with `-X` or `-T`; `inputs.classpath` must already include
/// the exec jar.
pub fn execute(env: &Environment, options: &Options, inputs: &ProgramInputs<'_>) -> Invocation {
    let mut args = program_jvm_args(env, options, inputs);
    args.extend(["-m".to_string(), EXEC_NS.to_string()]);
    args.extend(options.args.iter().cloned());
    Invocation::new(&env.java, args)
}

/// Run clojure.main, optionally under a readline wrapper
pub fn main(
    env: &Environment,
    options: &Options,
    inputs: &ProgramInputs<'_>,
    main_cache_opts: &[String],
    readline: Option<&Path>,
) -> Invocation {
    let mut args = program_jvm_args(env, options, inputs);
    args.extend_from_slice(main_cache_opts);
    args.extend(options.init_args());
    args.extend(options.main.main_args.iter().cloned());
    args.extend(options.args.iter().cloned());

    match readline {
        Some(wrapper) => {
            let mut wrapped: Vec<String> = RLWRAP_ARGS.iter().map(|s| s.to_string()).collect();
            wrapped.push(env.java.display().to_string());
            wrapped.extend(args);
            Invocation::new(wrapper, wrapped)
        }
        None => Invocation::new(&env.java, args),
    }
}

/// rlwrap location when the REPL should be wrapped
pub fn readline_wrapper(env: &Environment, options: &Options) -> Option<PathBuf> {
    if cfg!(windows) || !options.tool.rlwrap || !env.settings.readline.rlwrap {
        return None;
    }
    which::which("rlwrap").ok()
}
