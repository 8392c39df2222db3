//! Launch flow: install, refresh the classpath cache, then run the program

use crate::cache::{self, CacheArtifacts, CacheLocation};
use crate::cli::{Mode, Options};
use crate::config::Environment;
use crate::error::LauncherResult;
use crate::install;
use crate::invoke::{self, ProgramInputs};
use crate::process::ProcessRunner;
use crate::CLOJURE_TOOLS_VERSION;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Printed before running clojure.main without -M when arguments follow
pub const IMPLICIT_MAIN_WARNING: &str =
    "WARNING: Implicit use of clojure.main with options is deprecated, use -M";

/// Execute the launch for parsed options
pub async fn execute(options: &Options, env: &Environment, runner: &dyn ProcessRunner) -> LauncherResult<()> {
    install::ensure_installed(env).await?;

    let config_paths = cache::config_paths(env, options.deps.repro);
    let config_user = (!options.deps.repro).then(|| env.user_deps());

    let location = cache::select_cache_dir(env);
    let key = cache::cache_key(options, &config_paths, &location.dir_key);
    let artifacts = CacheArtifacts::new(&location.dir, &key);

    if options.deps.verbose {
        eprintln!("{}", verbose_report(env, &config_paths, &location, &artifacts));
    }

    let stale = cache::is_stale(options, &artifacts, &config_paths, &env.tools_dir)?;
    let tools_args = invoke::tools_args(options, stale);
    debug!("Classpath stale: {}, tools args: {:?}", stale, tools_args);

    if stale && !options.deps.describe {
        if options.deps.verbose {
            eprintln!("Refreshing classpath");
        }
        cache::ensure_cache_dir(&location.dir)?;
        runner
            .run(&invoke::make_classpath(env, config_user.as_deref(), &artifacts, &tools_args))
            .await?;
    }

    let classpath = cache::active_classpath(options, &artifacts)?;
    let deps = &options.deps;

    if deps.pom {
        runner
            .run(&invoke::generate_manifest(env, config_user.as_deref(), &tools_args))
            .await
    } else if deps.prep {
        Ok(())
    } else if deps.print_classpath {
        println!("{}", classpath);
        Ok(())
    } else if deps.describe {
        println!("{}", describe(env, options, &config_paths, config_user.as_deref(), &location.dir));
        Ok(())
    } else if deps.tree {
        Ok(())
    } else if deps.trace {
        eprintln!("Wrote trace.edn");
        Ok(())
    } else if matches!(options.mode, Mode::Exec | Mode::Tool) {
        let jvm_cache_opts = cache::read_cache_opts(&artifacts.jvm_file)?;
        let exec_cp = cache::exec_classpath(&classpath, &env.exec_jar())?;
        let inputs = ProgramInputs {
            jvm_cache_opts: &jvm_cache_opts,
            basis_file: &artifacts.basis_file,
            classpath: &exec_cp,
        };
        runner.run_cancellable(&invoke::execute(env, options, &inputs)).await
    } else {
        if options.mode == Mode::Repl && !options.args.is_empty() {
            debug!("Implicit clojure.main with arguments {:?}", options.args);
            eprintln!("{}", IMPLICIT_MAIN_WARNING);
        }
        let jvm_cache_opts = cache::read_cache_opts(&artifacts.jvm_file)?;
        let main_cache_opts = cache::read_cache_opts(&artifacts.main_file)?;
        let inputs = ProgramInputs {
            jvm_cache_opts: &jvm_cache_opts,
            basis_file: &artifacts.basis_file,
            classpath: &classpath,
        };
        let readline = invoke::readline_wrapper(env, options);
        runner
            .run_cancellable(&invoke::main(env, options, &inputs, &main_cache_opts, readline.as_deref()))
            .await
    }
}

/// Path summary printed by `-Sverbose`
pub fn verbose_report(
    env: &Environment,
    config_paths: &[PathBuf],
    location: &CacheLocation,
    artifacts: &CacheArtifacts,
) -> String {
    let paths: Vec<String> = config_paths.iter().map(|p| p.display().to_string()).collect();
    format!(
        "version      = {}\ninstall_dir  = {}\nconfig_dir   = {}\nconfig_paths = {}\ncache_dir    = {}\ncp_file      = {}",
        CLOJURE_TOOLS_VERSION,
        env.install_dir.display(),
        env.config_dir.display(),
        paths.join(" "),
        location.dir.display(),
        artifacts.cp_file.display(),
    )
}

/// EDN map printed by `-Sdescribe`
pub fn describe(
    env: &Environment,
    options: &Options,
    config_paths: &[PathBuf],
    config_user: Option<&Path>,
    cache_dir: &Path,
) -> String {
    let files: String = config_paths
        .iter()
        .map(|p| format!("\"{}\" ", edn_path(p)))
        .collect();
    let user = config_user.map(edn_path).unwrap_or_default();

    format!(
        r#"{{:version "{version}"
 :config-files [{files}]
 :config-user "{user}"
 :config-project "{project}"
 :install-dir "{install}"
 :config-dir "{config}"
 :cache-dir "{cache}"
 :force {force}
 :repro {repro}
 :main-aliases "{main}"
 :repl-aliases "{repl}"}}"#,
        version = CLOJURE_TOOLS_VERSION,
        project = invoke::CONFIG_PROJECT,
        install = edn_path(&env.install_dir),
        config = edn_path(&env.config_dir),
        cache = edn_path(cache_dir),
        force = options.deps.force,
        repro = options.deps.repro,
        main = options.deps.main_aliases,
        repl = options.deps.repl_aliases.join(" "),
    )
}

/// Path as an EDN string body; backslashes are escaped on Windows
fn edn_path(path: &Path) -> String {
    let text = path.display().to_string();
    if cfg!(windows) {
        text.replace('\\', "\\\\")
    } else {
        text
    }
}
