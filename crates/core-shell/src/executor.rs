//! Statement executor.
//!
//! One statement = one pipeline. All stage names are resolved and all
//! sub-expression arguments evaluated up front; then every stage gets its
//! own blocking task, wired to its neighbors through bounded queues. The
//! executor itself drains the last queue while the stages run (draining
//! concurrently is what keeps a full final queue from wedging the last
//! stage) and joins every task afterwards, aggregating stage errors per
//! statement. Statements run strictly in order; a failed statement prints
//! its aggregate and the shell moves on.

use std::fs::File;
use std::future::Future;
use std::io::{BufRead, BufReader};
use std::pin::Pin;
use std::sync::{Arc, RwLock};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use core_lang::{Argument, ParsedCommand, Statement};

use crate::binder::{bind_pipeline, bind_static};
use crate::command::{Emitter, StageContext};
use crate::error::ShellError;
use crate::queue::{stage_queue, QueueReader, QueueWriter, STAGE_QUEUE_CAP};
use crate::registry::{CommandRegistry, CommandSpec};
use crate::session::{normalize_path, SessionState};
use crate::sink::{RedirectionSinks, Sinks};
use crate::value::{PipelineItem, Value};

/// Engine tunables. Configuration files are a host concern; these are the
/// knobs the core actually consumes.
#[derive(Debug, Clone, Copy)]
pub struct ShellOptions {
    /// Bound for every stage queue of a statement.
    pub queue_capacity: usize,
}

impl Default for ShellOptions {
    fn default() -> Self {
        ShellOptions {
            queue_capacity: STAGE_QUEUE_CAP,
        }
    }
}

/// Per-call accounting for the REPL and script runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecSummary {
    pub statements: usize,
    pub failed_statements: usize,
}

impl ExecSummary {
    pub fn had_errors(&self) -> bool {
        self.failed_statements > 0
    }
}

/// Where a statement's final output goes: the console (with redirections)
/// or a capture buffer (sub-expression evaluation).
enum DrainTarget<'a> {
    Console(&'a mut Sinks),
    Collect(&'a mut Vec<PipelineItem>),
}

pub struct Executor {
    registry: Arc<CommandRegistry>,
    session: Arc<RwLock<SessionState>>,
    options: ShellOptions,
}

impl Executor {
    pub fn new(
        registry: Arc<CommandRegistry>,
        session: Arc<RwLock<SessionState>>,
        options: ShellOptions,
    ) -> Self {
        Executor {
            registry,
            session,
            options,
        }
    }

    pub fn session(&self) -> &Arc<RwLock<SessionState>> {
        &self.session
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Run statements sequentially, printing each statement's aggregated
    /// errors before starting the next.
    pub async fn run_statements(&self, statements: &[Statement], sinks: &mut Sinks) -> ExecSummary {
        let mut summary = ExecSummary::default();
        for statement in statements {
            summary.statements += 1;
            let errors = self
                .run_statement(statement, DrainTarget::Console(sinks))
                .await;
            if !errors.is_empty() {
                summary.failed_statements += 1;
                for error in &errors {
                    sinks.write_error_line(&error.to_string());
                }
            }
        }
        summary
    }

    /// Type-erased recursion point for sub-expression evaluation.
    fn run_statement_boxed<'a>(
        &'a self,
        stages: &'a [ParsedCommand],
        target: DrainTarget<'a>,
    ) -> Pin<Box<dyn Future<Output = Vec<ShellError>> + Send + 'a>> {
        Box::pin(self.run_statement(stages, target))
    }

    async fn run_statement(
        &self,
        stages: &[ParsedCommand],
        target: DrainTarget<'_>,
    ) -> Vec<ShellError> {
        debug_assert!(!stages.is_empty(), "parser never emits empty statements");
        if stages.is_empty() {
            return Vec::new();
        }

        // Resolution first: an unknown name anywhere aborts the statement
        // before any handler runs.
        let mut resolved: Vec<CommandSpec> = Vec::with_capacity(stages.len());
        for stage in stages {
            match self.registry.resolve(&stage.name) {
                Some(spec) => resolved.push(spec.clone()),
                None => {
                    return vec![ShellError::CommandNotFound {
                        name: stage.name.clone(),
                    }]
                }
            }
        }

        // Sub-expressions run as complete nested statements, their output
        // substituted as literal text.
        let mut evaluated: Vec<ParsedCommand> = Vec::with_capacity(stages.len());
        for stage in stages {
            match self.evaluate_stage_args(stage).await {
                Ok(stage) => evaluated.push(stage),
                Err(errors) => return errors,
            }
        }

        // Redirection files for the final stage open before anything is
        // scheduled; an unopenable file aborts the statement. Paths resolve
        // against the session directory, never the process one.
        let last_stage = self.resolve_redirection_paths(evaluated.last().expect("non-empty"));
        let mut redirect = match RedirectionSinks::for_stage(&last_stage) {
            Ok(redirect) => redirect,
            Err(error) => return vec![error],
        };
        for stage in &evaluated[..evaluated.len() - 1] {
            if !stage.redirections.is_empty() {
                warn!(
                    target: "exec.redirect",
                    command = %stage.name,
                    "redirections_on_non_final_stage_ignored"
                );
            }
        }

        let mut tasks: Vec<JoinHandle<Result<(), ShellError>>> = Vec::new();
        let mut prev_reader: Option<QueueReader> = None;

        // Optional file producer feeding the first stage.
        if let Some(path) = &evaluated[0].input_redirect {
            let resolved_path = {
                let session = self.session.read().expect("session lock");
                normalize_path(session.current_dir(), std::path::Path::new(path))
            };
            let file = match File::open(&resolved_path) {
                Ok(file) => file,
                Err(source) => {
                    return vec![ShellError::Redirection {
                        path: path.clone(),
                        source,
                    }]
                }
            };
            let (writer, reader) = stage_queue(self.options.queue_capacity);
            let path = path.clone();
            tasks.push(tokio::task::spawn_blocking(move || {
                input_producer(file, path, writer)
            }));
            prev_reader = Some(reader);
        }

        for (stage, spec) in evaluated.iter().zip(resolved.iter()) {
            let (writer, reader) = stage_queue(self.options.queue_capacity);
            let input = prev_reader.take();
            let spec = spec.clone();
            let stage = stage.clone();
            let session = Arc::clone(&self.session);
            let registry = Arc::clone(&self.registry);
            tasks.push(tokio::task::spawn_blocking(move || {
                run_stage(spec, stage, input, writer, session, registry)
            }));
            prev_reader = Some(reader);
        }
        let mut final_reader = prev_reader.expect("at least one stage");

        // Drain while the stages run; this is the backpressure release
        // valve for the last queue.
        match target {
            DrainTarget::Console(sinks) => {
                while let Some(item) = final_reader.take().await {
                    if let Some(line) = redirect.route(&item) {
                        if line.to_stderr {
                            sinks.write_error_line(&line.text);
                        } else {
                            sinks.write_output_line(&line.text);
                        }
                    }
                }
            }
            DrainTarget::Collect(buffer) => {
                while let Some(item) = final_reader.take().await {
                    if let Some(line) = redirect.route(&item) {
                        buffer.push(PipelineItem {
                            value: item.value,
                            is_error: line.to_stderr,
                        });
                    }
                }
            }
        }
        redirect.finish();

        let mut errors = Vec::new();
        for task in tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => errors.push(error),
                Err(join_error) => errors.push(ShellError::handler(
                    "executor",
                    format!("stage task aborted: {join_error}"),
                )),
            }
        }
        info!(
            target: "exec",
            stages = stages.len(),
            errors = errors.len(),
            "statement_complete"
        );
        errors
    }

    /// Rewrite a stage's file redirection targets to absolute paths under
    /// the session directory.
    fn resolve_redirection_paths(&self, stage: &ParsedCommand) -> ParsedCommand {
        let base = {
            let session = self.session.read().expect("session lock");
            session.current_dir().to_path_buf()
        };
        let mut out = stage.clone();
        for redirection in &mut out.redirections {
            if let core_lang::RedirTarget::File { path, .. } = &mut redirection.target {
                *path = normalize_path(&base, std::path::Path::new(path))
                    .display()
                    .to_string();
            }
        }
        out
    }

    /// Replace `$( … )` arguments with their captured output.
    async fn evaluate_stage_args(
        &self,
        stage: &ParsedCommand,
    ) -> Result<ParsedCommand, Vec<ShellError>> {
        let mut out = stage.clone();
        for arg in &mut out.args {
            if let Argument::SubExpr(statements) = arg {
                let text = self.eval_subexpr(&statements.clone()).await?;
                *arg = Argument::Literal(text);
            }
        }
        for (_, value) in &mut out.params {
            if let Some(Argument::SubExpr(statements)) = value {
                let text = self.eval_subexpr(&statements.clone()).await?;
                *value = Some(Argument::Literal(text));
            }
        }
        Ok(out)
    }

    /// Deterministic sub-expression conversion: run the nested statements,
    /// join the non-error items' text with single spaces, in emission
    /// order.
    async fn eval_subexpr(&self, statements: &[Statement]) -> Result<String, Vec<ShellError>> {
        let mut items: Vec<PipelineItem> = Vec::new();
        for statement in statements {
            let errors = self
                .run_statement_boxed(statement, DrainTarget::Collect(&mut items))
                .await;
            if !errors.is_empty() {
                return Err(errors);
            }
        }
        Ok(items
            .iter()
            .filter(|item| !item.is_error)
            .map(|item| item.value.to_text())
            .collect::<Vec<_>>()
            .join(" "))
    }
}

/// Feed a redirected input file into the first stage, one line per item.
fn input_producer(file: File, path: String, mut writer: QueueWriter) -> Result<(), ShellError> {
    let reader = BufReader::new(file);
    for line in reader.lines() {
        match line {
            Ok(text) => writer.send(PipelineItem::output(Value::Str(text))),
            Err(source) => {
                writer.complete();
                return Err(ShellError::Redirection { path, source });
            }
        }
    }
    writer.complete();
    Ok(())
}

/// One stage, on the blocking pool: bind, begin, process each input (or
/// `None` exactly once), end. The output queue completes on every exit
/// path: explicitly here, and via the writer's Drop as a backstop.
fn run_stage(
    spec: CommandSpec,
    stage: ParsedCommand,
    input: Option<QueueReader>,
    writer: QueueWriter,
    session: Arc<RwLock<SessionState>>,
    registry: Arc<CommandRegistry>,
) -> Result<(), ShellError> {
    let mut ctx = StageContext {
        session,
        registry,
        out: Emitter::new(writer),
    };
    let result = drive_stage(&spec, &stage, input, &mut ctx);
    if let Err(error) = &result {
        warn!(target: "exec.stage", command = spec.name, %error, "stage_failed");
    }
    ctx.out.complete();
    result
}

fn drive_stage(
    spec: &CommandSpec,
    stage: &ParsedCommand,
    input: Option<QueueReader>,
    ctx: &mut StageContext,
) -> Result<(), ShellError> {
    let (mut bound, warnings) = bind_static(spec, stage)?;
    for warning in warnings {
        warn!(target: "exec.binder", command = spec.name, %warning, "binding_warning");
    }
    let mut handler = (spec.factory)();
    handler.begin(&bound, ctx)?;
    match input {
        Some(mut reader) => {
            while let Some(item) = reader.blocking_take() {
                bind_pipeline(spec, &mut bound, &item);
                handler.process(&bound, Some(&item), ctx)?;
            }
        }
        None => handler.process(&bound, None, ctx)?,
    }
    handler.end(&bound, ctx)
}
