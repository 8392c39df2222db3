//! Help screen

use crate::CLOJURE_TOOLS_VERSION;

/// Full usage text printed for `-h`, `-?` and `--help`
pub fn usage() -> String {
    format!(
        r#"Version: {version} of the Clojure tools, native launcher

Usage:
  Start a REPL   clj     [clj-opt*] [-Aaliases]
  Exec fn(s)     clojure [clj-opt*] -X[aliases] a/fn? [kpath v]* kv-map?
  Run tool       clojure [clj-opt*] -T[name|aliases] a/fn [kpath v] kv-map?
  Run main       clojure [launcher-opt*] [clj-opt*] -M[aliases] [init-opt*] [main-opt] [arg*]
  Prepare        clojure [launcher-opt*] [clj-opt*] -P [other exec opts]

exec-opts:
  -Aaliases      Use concatenated aliases to modify classpath
  -X[aliases]    Use concatenated aliases to modify classpath or supply exec fn/args
  -T[name|aliases]  Invoke tool by name or via aliases ala -X
  -M[aliases]    Use concatenated aliases to modify classpath or supply main opts
  -P             Prepare deps - download libs, cache classpath, but don't exec

clj-opts:
  -Jopt          Pass opt through in java_opts, ex: -J-Xmx512m
  -Sdeps EDN     Deps data to use as the last deps file to be merged
  -Spath         Compute classpath and echo to stdout only
  -Stree         Print dependency tree
  -Scp CP        Do NOT compute or cache classpath, use this one instead
  -Srepro        Ignore the ~/.clojure/deps.edn config file
  -Sforce        Force recomputation of the classpath (don't use the cache)
  -Sverbose      Print important path info to console
  -Sdescribe     Print environment and command parsing info as data
  -Sthreads N    Set specific number of download threads
  -Strace        Write a trace.edn file that traces deps expansion
  -Spom          Generate (or update) pom.xml with deps and paths
  --             Stop parsing dep options and pass remaining arguments to clojure.main
  -version       Print the version to stderr and exit
  --version      Print the version to stdout and exit

init-opt:
  -i, --init path     Load a file or resource
  -e, --eval string   Eval exprs in string; print non-nil values
  --report target     Report uncaught exception to "file" (default), "stderr", or "none"

main-opt:
  -m, --main ns-name  Call the -main function from namespace w/args
  -r, --repl          Run a repl
  path                Run a script from a file or resource
  -                   Run a script from standard input
  -h, -?, --help      Print this help message and exit

launcher-opt:
  --rebel        clj only. Start the REPL in rebel-readline instead of rlwrap
  --native-args  Keep the command line as delivered by the OS (Windows only;
                 always on elsewhere)

Environment:
  CLJ_CONFIG, XDG_CONFIG_HOME   user config directory (default ~/.clojure)
  CLJ_CACHE, XDG_CACHE_HOME     user cache directory
  JAVA_CMD, JAVA_HOME           java executable
  JAVA_OPTS                     extra JVM options for the program
  CLJ_JVM_OPTS                  extra JVM options for classpath computation
  CLOJURE_LAUNCHER_CONFIG       launcher settings file
  CLOJURE_LAUNCHER_LOG          log filter, ex: clojure_launcher=debug

For more info, see:
  https://clojure.org/guides/deps_and_cli
  https://clojure.org/reference/repl_and_main"#,
        version = CLOJURE_TOOLS_VERSION
    )
}
