//! ArbSh entrypoint: interactive REPL, script runner, and console
//! diagnostics mode.

use std::ffi::OsStr;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use core_shell::{CommandRegistry, Executor, SessionState, ShellOptions, Sinks};
use core_text::DisplayFormatter;

/// Exit code when a script file exists but cannot be used.
const EXIT_SCRIPT_UNUSABLE: u8 = 126;
/// Exit code when a script file does not exist.
const EXIT_SCRIPT_NOT_FOUND: u8 = 127;

/// Longest directory tail shown in the prompt, in grapheme clusters.
const PROMPT_TAIL_MAX: usize = 24;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "arbsh", version, about = "ArbSh: Arabic-first object-pipeline shell")]
struct Args {
    /// Optional script to execute as if its lines were typed interactively.
    pub script: Option<PathBuf>,
    /// Print console and input diagnostics before entering the shell.
    #[arg(long = "debug-console")]
    pub debug_console: bool,
}

/// Opt-in session telemetry. A shell must not scribble log files next to
/// whatever directory it was launched from, so file logging only happens
/// when `ARBSH_LOG=<path>` is set; the file is appended, letting one log
/// collect consecutive sessions. Returns the writer guard, which must live
/// until exit so buffered events flush, or `None` when logging is off or a
/// global subscriber is already installed.
fn init_telemetry() -> Option<WorkerGuard> {
    let target = PathBuf::from(std::env::var_os("ARBSH_LOG")?);
    let directory = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = target.file_name().unwrap_or_else(|| OsStr::new("arbsh.log"));
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .ok()?;
    info!(
        target: "runtime",
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        "session_start"
    );
    Some(guard)
}

/// Route panics into the session log before the default hook aborts the
/// process. Called once from `main`.
fn hook_panics_into_log() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        error!(target: "runtime", %panic, "shell_panicked");
        previous(panic);
    }));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitReason {
    EndOfInput,
    ExitCommand,
    ScriptDone,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::EndOfInput => "end_of_input",
            ExitReason::ExitCommand => "exit_command",
            ExitReason::ScriptDone => "script_done",
        }
    }
}

struct ShellRuntime {
    executor: Executor,
    formatter: DisplayFormatter,
}

impl ShellRuntime {
    /// Session rooted at the launch directory, with the builtin registry.
    fn new() -> Result<Self> {
        let session = SessionState::new()?;
        let registry = Arc::new(CommandRegistry::with_builtins());
        Ok(ShellRuntime {
            executor: Executor::new(
                registry,
                Arc::new(RwLock::new(session)),
                ShellOptions::default(),
            ),
            formatter: DisplayFormatter::new(),
        })
    }

    /// Execute one already-normalized input line. Parse problems only kill
    /// the current line.
    async fn run_line(&self, line: &str, sinks: &mut Sinks) {
        let session = Arc::clone(self.executor.session());
        let resolver = move |name: &str| {
            session
                .read()
                .expect("session lock")
                .get_var(name)
                .map(str::to_string)
        };
        match core_lang::parse(line, &resolver) {
            Ok(output) => {
                for warning in &output.warnings {
                    sinks.write_error_line(&format!(
                        "تحذير (warning) @{}: {}",
                        warning.offset, warning.message
                    ));
                }
                let summary = self
                    .executor
                    .run_statements(&output.statements, &mut *sinks)
                    .await;
                if summary.had_errors() {
                    warn!(
                        target: "runtime",
                        failed = summary.failed_statements,
                        "line_had_errors"
                    );
                }
            }
            Err(parse_error) => {
                sinks.write_error_line(&format!("خطأ في التحليل (parse error): {parse_error}"));
            }
        }
    }

    fn prompt(&self) -> String {
        let session = self.executor.session().read().expect("session lock");
        let arabic = session.language == core_shell::Language::Arabic;
        let tail = prompt_tail(session.current_dir());
        self.formatter.format_prompt(&tail, arabic)
    }

    async fn run_interactive(&self) -> ExitReason {
        let mut sinks = Sinks::stdio(std::io::stderr().is_terminal());
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        loop {
            print!("{}", self.prompt());
            let _ = std::io::stdout().flush();
            match lines.next_line().await {
                Ok(Some(raw)) => {
                    let line: String = raw.nfc().collect();
                    let trimmed = line.trim();
                    if trimmed == "خروج" || trimmed == "exit" {
                        return ExitReason::ExitCommand;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    self.run_line(&line, &mut sinks).await;
                }
                Ok(None) => return ExitReason::EndOfInput,
                Err(error) => {
                    error!(target: "runtime", %error, "stdin_read_failed");
                    return ExitReason::EndOfInput;
                }
            }
        }
    }

    /// Run a script's lines as if typed. Parse and execution errors are
    /// reported per line and the script continues.
    async fn run_script(&self, content: &str) -> ExitReason {
        let mut sinks = Sinks::stdio(std::io::stderr().is_terminal());
        for (index, raw) in content.lines().enumerate() {
            let line: String = raw.nfc().collect();
            if line.trim().is_empty() {
                continue;
            }
            info!(target: "runtime.script", line = index + 1, "script_line");
            self.run_line(&line, &mut sinks).await;
        }
        ExitReason::ScriptDone
    }
}

/// Last path component, truncated to a sane prompt width by grapheme
/// clusters (Arabic directory names must not be cut mid-cluster).
fn prompt_tail(dir: &Path) -> String {
    let name = match dir.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => dir.display().to_string(),
    };
    let graphemes: Vec<&str> = name.graphemes(true).collect();
    if graphemes.len() <= PROMPT_TAIL_MAX {
        name
    } else {
        let tail: String = graphemes[graphemes.len() - PROMPT_TAIL_MAX..].concat();
        format!("…{tail}")
    }
}

fn print_console_diagnostics() {
    let size = crossterm::terminal::size();
    let raw_mode = crossterm::terminal::is_raw_mode_enabled();
    println!("console diagnostics:");
    match size {
        Ok((columns, rows)) => println!("  size: {columns}x{rows}"),
        Err(ref error) => println!("  size: unavailable ({error})"),
    }
    println!("  colors: {}", crossterm::style::available_color_count());
    println!("  stdin tty: {}", std::io::stdin().is_terminal());
    println!("  stdout tty: {}", std::io::stdout().is_terminal());
    println!("  stderr tty: {}", std::io::stderr().is_terminal());
    match raw_mode {
        Ok(enabled) => println!("  raw mode available, currently {enabled}"),
        Err(error) => println!("  raw mode unavailable ({error})"),
    }
    for key in ["TERM", "LANG", "LC_ALL"] {
        match std::env::var(key) {
            Ok(value) => println!("  {key}={value}"),
            Err(_) => println!("  {key} unset"),
        }
    }
}

/// Load a script, mapping filesystem failures to the documented exit
/// codes.
fn read_script(path: &Path) -> Result<String, u8> {
    match std::fs::metadata(path) {
        Err(_) => {
            eprintln!("arbsh: {}: غير موجود (not found)", path.display());
            Err(EXIT_SCRIPT_NOT_FOUND)
        }
        Ok(metadata) if !metadata.is_file() => {
            eprintln!("arbsh: {}: ليس ملفا (not a regular file)", path.display());
            Err(EXIT_SCRIPT_UNUSABLE)
        }
        Ok(_) => std::fs::read_to_string(path).map_err(|error| {
            eprintln!("arbsh: {}: {error}", path.display());
            EXIT_SCRIPT_UNUSABLE
        }),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = init_telemetry();
    hook_panics_into_log();
    let runtime = match ShellRuntime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("arbsh: startup failed: {error}");
            return ExitCode::FAILURE;
        }
    };
    info!(target: "runtime", interactive = args.script.is_none(), "startup");

    if args.debug_console {
        print_console_diagnostics();
    }

    let reason = match &args.script {
        Some(path) => match read_script(path) {
            Ok(content) => runtime.run_script(&content).await,
            Err(code) => return ExitCode::from(code),
        },
        None => runtime.run_interactive().await,
    };
    info!(target: "runtime.shutdown", reason = reason.as_str(), "shutdown");
    ExitCode::SUCCESS
}
