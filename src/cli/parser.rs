//! Phased command line parser
//!
//! The launcher grammar is positional: tool opts, then dependency opts, then
//! clojure.main init opts, then a single main opt. Each phase consumes tokens
//! greedily and hands over to the next one on the first token it does not
//! recognize; phases never resume. Whatever is left is passed through to the
//! program untouched.

use super::options::{Entry, Mode, Options, ParseOutcome, VersionStream};
use super::tokenize;
use crate::error::{LauncherError, LauncherResult};
use tracing::debug;

/// Extra deps injected by `--rebel`
pub const REBEL_DEPS: &str = r#"{:deps {com.bhauman/rebel-readline {:mvn/version "0.1.4"}}}"#;

/// Main namespace launched by `--rebel`
pub const REBEL_MAIN: &str = "rebel-readline.main";

/// Read the full argument vector (`args[0]` is the program name).
pub fn read(args: Vec<String>, entry: Entry) -> LauncherResult<ParseOutcome> {
    if args.is_empty() {
        return Err(LauncherError::MissingProgram);
    }

    let mut options = Options::default();
    let mut tokens = Tokens { args, pos: 1 };

    read_tool_opts(&mut options, &mut tokens, entry)?;

    let args = std::mem::take(&mut tokens.args);
    tokens.args = tokenize::linuxize(args, options.tool.native_args)?;

    if let Some(stream) = read_deps_opts(&mut options, &mut tokens)? {
        return Ok(ParseOutcome::Version(stream));
    }
    read_init_opts(&mut options, &mut tokens)?;
    read_main_opts(&mut options, &mut tokens)?;

    let aliased = !options.deps.main_aliases.is_empty() || !options.deps.repl_aliases.is_empty();
    if aliased {
        // the delegated program prints its own help when aliases are in play
        if let Some(help) = options.main.help.take() {
            options.args.push(help);
        }
    }
    options.args.extend(tokens.rest());

    debug!("Parsed options: {:?}", options);
    Ok(ParseOutcome::Run(options))
}

/// Cursor over the argument vector
struct Tokens {
    args: Vec<String>,
    pos: usize,
}

impl Tokens {
    fn peek(&self) -> Option<&str> {
        self.args.get(self.pos).map(String::as_str)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consume the flag at the cursor and the value after it.
    fn flag_value(&mut self, what: &'static str) -> LauncherResult<(String, String)> {
        let flag = self.peek().unwrap_or_default().to_string();
        match self.args.get(self.pos + 1) {
            Some(value) => {
                let value = value.clone();
                self.pos += 2;
                Ok((flag, value))
            }
            None => Err(LauncherError::MissingValue { what, flag }),
        }
    }

    fn rest(self) -> Vec<String> {
        self.args.into_iter().skip(self.pos).collect()
    }
}

/// Store a value for a flag that may be given only once.
fn take_single(
    slot: &mut Option<String>,
    tokens: &mut Tokens,
    name: &'static str,
    what: &'static str,
) -> LauncherResult<()> {
    if slot.is_some() {
        return Err(LauncherError::DuplicateOption {
            what: name,
            flag: tokens.peek().unwrap_or_default().to_string(),
        });
    }
    let (_, value) = tokens.flag_value(what)?;
    *slot = Some(value);
    Ok(())
}

fn read_tool_opts(options: &mut Options, tokens: &mut Tokens, entry: Entry) -> LauncherResult<()> {
    options.tool.rlwrap = entry == Entry::Clj;
    options.tool.native_args = !cfg!(windows);

    let mut rebel = false;
    while let Some(token) = tokens.peek() {
        match token {
            "--rebel" => {
                if entry != Entry::Clj {
                    return Err(LauncherError::ReadlineClojure(token.to_string()));
                }
                if rebel {
                    return Err(LauncherError::DuplicateOption {
                        what: "readline",
                        flag: token.to_string(),
                    });
                }
                rebel = true;
                options.tool.rlwrap = false;
                options.deps.deps_data = Some(REBEL_DEPS.to_string());
                options
                    .main
                    .main_args
                    .extend(["-m".to_string(), REBEL_MAIN.to_string()]);
            }
            "--native-args" => options.tool.native_args = true,
            _ => break,
        }
        tokens.advance();
    }
    Ok(())
}

/// Alias-carrying exec-opt flags and how each accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AliasKind {
    /// `-A`: appended to a list
    Repl,
    /// `-M`: set once, selects main mode
    Main,
    /// `-X`: set once, selects exec mode
    Exec,
    /// `-T:aliases`: set once, selects tool mode
    ToolAliases,
    /// `-Tname`: set once, selects tool mode
    ToolName,
}

impl AliasKind {
    /// Record the aliases; returns the mode for kinds that end the phase
    fn apply(self, options: &mut Options, aliases: &str) -> Option<Mode> {
        let deps = &mut options.deps;
        match self {
            Self::Repl => {
                deps.repl_aliases.push(aliases.to_string());
                None
            }
            Self::Main => {
                deps.main_aliases = aliases.to_string();
                Some(Mode::Main)
            }
            Self::Exec => {
                deps.exec_aliases = aliases.to_string();
                Some(Mode::Exec)
            }
            Self::ToolAliases => {
                deps.tool_aliases = aliases.to_string();
                Some(Mode::Tool)
            }
            Self::ToolName => {
                deps.tool_name = aliases.to_string();
                Some(Mode::Tool)
            }
        }
    }
}

/// `-S` flags that take a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueFlag {
    DepsData,
    Classpath,
    Threads,
}

/// `-S` and `-P` switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Toggle {
    Prep,
    PrintClasspath,
    Repro,
    Force,
    Pom,
    Tree,
    Verbose,
    Describe,
    Trace,
}

impl Toggle {
    fn set(self, options: &mut Options) {
        let deps = &mut options.deps;
        match self {
            Self::Prep => deps.prep = true,
            Self::PrintClasspath => deps.print_classpath = true,
            Self::Repro => deps.repro = true,
            Self::Force => deps.force = true,
            Self::Pom => deps.pom = true,
            Self::Tree => deps.tree = true,
            Self::Verbose => deps.verbose = true,
            Self::Describe => deps.describe = true,
            Self::Trace => deps.trace = true,
        }
    }
}

/// One token of the dependency-opts phase
#[derive(Debug, PartialEq, Eq)]
enum DepsToken<'a> {
    Version(VersionStream),
    Jvm(&'a str),
    Removed,
    AliasRequired,
    Alias(AliasKind, &'a str),
    Value(ValueFlag),
    Toggle(Toggle),
    Changed(&'static str),
    Invalid,
    Separator,
    End,
}

fn classify(token: &str) -> DepsToken<'_> {
    match token {
        "-version" => return DepsToken::Version(VersionStream::Stderr),
        "--version" => return DepsToken::Version(VersionStream::Stdout),
        "-A" => return DepsToken::AliasRequired,
        "-T" => return DepsToken::Alias(AliasKind::ToolAliases, ""),
        "-P" => return DepsToken::Toggle(Toggle::Prep),
        "-Sdeps" => return DepsToken::Value(ValueFlag::DepsData),
        "-Scp" => return DepsToken::Value(ValueFlag::Classpath),
        "-Sthreads" => return DepsToken::Value(ValueFlag::Threads),
        "-Spath" => return DepsToken::Toggle(Toggle::PrintClasspath),
        "-Srepro" => return DepsToken::Toggle(Toggle::Repro),
        "-Sforce" => return DepsToken::Toggle(Toggle::Force),
        "-Spom" => return DepsToken::Toggle(Toggle::Pom),
        "-Stree" => return DepsToken::Toggle(Toggle::Tree),
        "-Sverbose" => return DepsToken::Toggle(Toggle::Verbose),
        "-Sdescribe" => return DepsToken::Toggle(Toggle::Describe),
        "-Strace" => return DepsToken::Toggle(Toggle::Trace),
        "-Sresolve-tags" => return DepsToken::Changed("clj -X:deps git-resolve-tags"),
        "--" => return DepsToken::Separator,
        _ => {}
    }

    if let Some(opt) = token.strip_prefix("-J") {
        DepsToken::Jvm(opt)
    } else if ["-R", "-C", "-O"].iter().any(|p| token.starts_with(*p)) {
        DepsToken::Removed
    } else if let Some(aliases) = token.strip_prefix("-A") {
        DepsToken::Alias(AliasKind::Repl, aliases)
    } else if let Some(aliases) = token.strip_prefix("-M") {
        DepsToken::Alias(AliasKind::Main, aliases)
    } else if let Some(aliases) = token.strip_prefix("-X") {
        DepsToken::Alias(AliasKind::Exec, aliases)
    } else if token.starts_with("-T:") {
        DepsToken::Alias(AliasKind::ToolAliases, &token[2..])
    } else if let Some(name) = token.strip_prefix("-T") {
        DepsToken::Alias(AliasKind::ToolName, name)
    } else if token.starts_with("-S") {
        DepsToken::Invalid
    } else {
        DepsToken::End
    }
}

/// Returns `Some` when a version flag cut parsing short.
fn read_deps_opts(
    options: &mut Options,
    tokens: &mut Tokens,
) -> LauncherResult<Option<VersionStream>> {
    options.mode = Mode::Repl;

    while let Some(token) = tokens.peek() {
        match classify(token) {
            DepsToken::Version(stream) => return Ok(Some(stream)),
            DepsToken::Jvm(opt) => options.deps.jvm_opts.push(opt.to_string()),
            DepsToken::Removed => {
                return Err(LauncherError::RemovedOption {
                    flag: token[..2].to_string(),
                })
            }
            DepsToken::AliasRequired => return Err(LauncherError::AliasRequired),
            DepsToken::Alias(kind, aliases) => {
                if let Some(mode) = kind.apply(options, aliases) {
                    options.mode = mode;
                    tokens.advance();
                    break;
                }
            }
            DepsToken::Value(flag) => {
                read_value_flag(options, tokens, flag)?;
                continue;
            }
            DepsToken::Toggle(toggle) => toggle.set(options),
            DepsToken::Changed(replacement) => {
                return Err(LauncherError::ChangedOption { replacement })
            }
            DepsToken::Invalid => return Err(LauncherError::InvalidOption(token.to_string())),
            DepsToken::Separator => {
                tokens.advance();
                break;
            }
            DepsToken::End => break,
        }
        tokens.advance();
    }

    Ok(None)
}

fn read_value_flag(options: &mut Options, tokens: &mut Tokens, flag: ValueFlag) -> LauncherResult<()> {
    match flag {
        ValueFlag::DepsData => take_single(
            &mut options.deps.deps_data,
            tokens,
            "deps data",
            "deps data value (EDN)",
        ),
        ValueFlag::Classpath => take_single(
            &mut options.deps.force_cp,
            tokens,
            "classpath",
            "classpath value (CP)",
        ),
        ValueFlag::Threads => {
            if options.deps.threads.is_some() {
                return Err(LauncherError::DuplicateOption {
                    what: "threads",
                    flag: tokens.peek().unwrap_or_default().to_string(),
                });
            }
            let (_, value) = tokens.flag_value("threads value (N)")?;
            let threads = value
                .parse::<u32>()
                .map_err(|_| LauncherError::InvalidThreads(value.clone()))?;
            options.deps.threads = Some(threads);
            Ok(())
        }
    }
}

fn read_init_opts(options: &mut Options, tokens: &mut Tokens) -> LauncherResult<()> {
    while let Some(token) = tokens.peek() {
        match token {
            "-i" | "--init" => take_single(&mut options.init.init, tokens, "init", "init path")?,
            "-e" | "--eval" => take_single(&mut options.init.eval, tokens, "eval", "eval string")?,
            "--report" => {
                if options.init.report.is_some() {
                    return Err(LauncherError::DuplicateOption {
                        what: "report",
                        flag: token.to_string(),
                    });
                }
                let (flag, target) = tokens.flag_value("report target")?;
                if target.is_empty() {
                    return Err(LauncherError::EmptyReportTarget(flag));
                }
                options.init.report = Some(target);
            }
            _ => break,
        }
    }
    Ok(())
}

fn read_main_opts(options: &mut Options, tokens: &mut Tokens) -> LauncherResult<()> {
    match tokens.peek() {
        Some("-m" | "--main") => {
            let (_, ns) = tokens.flag_value("main ns-name")?;
            options.main.main_args.extend(["-m".to_string(), ns]);
        }
        Some("-r" | "--repl") => {
            options.main.repl = true;
            tokens.advance();
        }
        Some(help @ ("-h" | "-?" | "--help")) => {
            options.main.help = Some(help.to_string());
            tokens.advance();
        }
        _ => {}
    }
    Ok(())
}
