//! Pipeline execution engine: registry, binding, bounded stage queues, the
//! concurrent statement executor, and the built-in command set.
//!
//! A statement is one pipeline. Each stage runs as its own blocking task,
//! consuming from the previous stage's bounded queue and producing into its
//! own; the executor drains the last queue and distributes every item to
//! the console or to redirection files. Statements run strictly one after
//! another; stages within a statement run concurrently.

pub mod binder;
pub mod command;
pub mod commands;
pub mod error;
pub mod executor;
pub mod queue;
pub mod registry;
pub mod session;
pub mod sink;
pub mod value;

pub use binder::{bind_pipeline, bind_static};
pub use command::{BoundArgs, CommandHandler, Emitter, StageContext};
pub use error::ShellError;
pub use executor::{ExecSummary, Executor, ShellOptions};
pub use queue::{stage_queue, QueueReader, QueueWriter, STAGE_QUEUE_CAP};
pub use registry::{CommandRegistry, CommandSpec, ParameterSpec};
pub use session::{Language, SessionState};
pub use sink::{SharedBuffer, Sinks};
pub use value::{convert, ParamType, PipelineItem, Value};
