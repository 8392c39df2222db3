//! Integration tests for the clojure and clj launchers

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn clojure() -> Command {
        cargo_bin_cmd!("clojure")
    }

    fn clj() -> Command {
        cargo_bin_cmd!("clj")
    }

    #[test]
    fn version_to_stdout() {
        clojure()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("Clojure CLI version"));
    }

    #[test]
    fn version_to_stderr() {
        clojure()
            .arg("-version")
            .assert()
            .success()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("Clojure CLI version"));
    }

    #[test]
    fn help_displays() {
        clojure()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("-Sdeps EDN"));
    }

    #[test]
    fn clj_help_displays() {
        clj()
            .arg("-h")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"));
    }

    #[test]
    fn duplicate_sdeps_fails() {
        clojure()
            .args(["-Sdeps", "{}", "-Sdeps", "{}"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "deps data option -Sdeps defined more than one time",
            ));
    }

    #[test]
    fn init_without_path_fails() {
        clojure()
            .arg("-i")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("init path not defined for -i option"));
    }

    #[test]
    fn rebel_requires_clj() {
        clojure()
            .arg("--rebel")
            .assert()
            .failure()
            .stderr(predicate::str::contains("can only be used with clj"));
    }

    #[test]
    fn removed_option_fails() {
        clojure()
            .arg("-R:dev")
            .assert()
            .failure()
            .stderr(predicate::str::contains("-R is no longer supported"));
    }

    #[test]
    fn threads_must_be_numeric() {
        clojure()
            .args(["-Sthreads", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("threads value 'x' is not a number"));
    }

    #[test]
    fn unknown_s_option_hints_help() {
        clojure()
            .arg("-Sbogus")
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid option: -Sbogus"))
            .stderr(predicate::str::contains("Hint:"));
    }
}

#[cfg(unix)]
mod launch_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use clojure_launcher::CLOJURE_TOOLS_VERSION;
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// A home with the tools already unpacked and a project with deps.edn
    struct Sandbox {
        home: TempDir,
        project: TempDir,
    }

    impl Sandbox {
        fn new() -> Self {
            let home = TempDir::new().unwrap();
            let project = TempDir::new().unwrap();
            fs::write(project.path().join("deps.edn"), "{}").unwrap();

            let install = home
                .path()
                .join(".clojure-launcher")
                .join(CLOJURE_TOOLS_VERSION);
            let libexec = install.join("libexec");
            fs::create_dir_all(&libexec).unwrap();
            fs::write(libexec.join(format!("clojure-tools-{}.jar", CLOJURE_TOOLS_VERSION)), "").unwrap();
            fs::write(libexec.join("exec.jar"), "").unwrap();
            for name in ["deps.edn", "example-deps.edn", "tools.edn"] {
                fs::write(install.join(name), "{}").unwrap();
            }

            Self { home, project }
        }

        fn home(&self) -> &Path {
            self.home.path()
        }

        fn command(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("clojure");
            cmd.current_dir(self.project.path())
                .env("HOME", self.home())
                .env("JAVA_CMD", "true")
                .env("CLOJURE_LAUNCHER_CONFIG", self.home().join("launcher.toml"))
                .env_remove("CLJ_CONFIG")
                .env_remove("CLJ_CACHE")
                .env_remove("XDG_CONFIG_HOME")
                .env_remove("XDG_CACHE_HOME")
                .env_remove("JAVA_OPTS")
                .env_remove("CLJ_JVM_OPTS")
                .env_remove("CLOJURE_LAUNCHER_LOG");
            cmd
        }
    }

    #[test]
    fn describe_prints_edn() {
        let sandbox = Sandbox::new();
        sandbox
            .command()
            .args(["-Sdescribe", "-Srepro"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with(format!(
                "{{:version \"{}\"",
                CLOJURE_TOOLS_VERSION
            )))
            .stdout(predicate::str::contains(":repro true"))
            .stdout(predicate::str::contains(":config-user \"\""));
    }

    #[test]
    fn forced_classpath_printed() {
        let sandbox = Sandbox::new();
        sandbox
            .command()
            .args(["-Scp", "src:lib/a.jar", "-Spath"])
            .assert()
            .success()
            .stdout("src:lib/a.jar\n");

        assert!(sandbox.home().join(".clojure").join("deps.edn").is_file());
        assert!(sandbox
            .home()
            .join(".clojure")
            .join("tools")
            .join("tools.edn")
            .is_file());
    }

    #[test]
    fn tree_still_prints_classpath() {
        let sandbox = Sandbox::new();
        sandbox
            .command()
            .args(["-Stree", "-Spath", "-Scp", "foo"])
            .assert()
            .success()
            .stdout("foo\n");
    }

    #[test]
    fn tree_still_describes() {
        let sandbox = Sandbox::new();
        sandbox
            .command()
            .args(["-Stree", "-Sdescribe"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("{:version"));
    }

    #[test]
    fn verbose_paths_on_stderr() {
        let sandbox = Sandbox::new();
        sandbox
            .command()
            .args(["-Sverbose", "-Scp", "src", "-Spath"])
            .assert()
            .success()
            .stderr(predicate::str::contains("install_dir  = "))
            .stderr(predicate::str::contains("cp_file      = "))
            .stderr(predicate::str::contains("Refreshing classpath"));
    }

    #[test]
    fn failing_tool_exit_code_passed_through() {
        let sandbox = Sandbox::new();
        sandbox
            .command()
            .env("JAVA_CMD", "false")
            .arg("-P")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn invalid_settings_reported() {
        let sandbox = Sandbox::new();
        fs::write(sandbox.home().join("launcher.toml"), "[readline]\nrlwrap = 3\n").unwrap();
        sandbox
            .command()
            .arg("-Spath")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
