//! The command handler capability: each command supplies begin/process/end
//! and the executor drives them in that order. Handlers are owned by
//! exactly one stage task and never shared.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::ShellError;
use crate::queue::QueueWriter;
use crate::registry::CommandRegistry;
use crate::session::SessionState;
use crate::value::{PipelineItem, Value};

/// Parameter values after binding, keyed by the English parameter name.
#[derive(Debug, Default, Clone)]
pub struct BoundArgs {
    values: HashMap<&'static str, Value>,
}

impl BoundArgs {
    pub fn insert(&mut self, name: &'static str, value: Value) {
        self.values.insert(name, value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).map(Value::to_text)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Value::Bool(true)))
    }

    pub fn get_list(&self, name: &str) -> Vec<Value> {
        match self.get(name) {
            Some(Value::List(items)) => items.clone(),
            Some(other) => vec![other.clone()],
            None => Vec::new(),
        }
    }
}

/// Output handle given to handlers; wraps the stage's output queue.
#[derive(Debug)]
pub struct Emitter {
    writer: QueueWriter,
}

impl Emitter {
    pub fn new(writer: QueueWriter) -> Self {
        Emitter { writer }
    }

    pub fn emit(&mut self, value: Value) {
        self.writer.send(PipelineItem::output(value));
    }

    pub fn emit_error(&mut self, value: Value) {
        self.writer.send(PipelineItem::error(value));
    }

    pub fn emit_item(&mut self, item: PipelineItem) {
        self.writer.send(item);
    }

    /// End-of-stream; exactly-once semantics live in the queue writer.
    pub fn complete(&mut self) {
        self.writer.complete();
    }
}

/// Everything a handler may touch while running.
pub struct StageContext {
    pub session: Arc<RwLock<SessionState>>,
    pub registry: Arc<CommandRegistry>,
    pub out: Emitter,
}

/// Lifecycle contract: `begin` happens-before the first `process`, every
/// `process` happens-before the next, `end` happens-after the last. A stage
/// with no upstream queue gets exactly one `process(None)` call.
pub trait CommandHandler: Send {
    fn begin(&mut self, _args: &BoundArgs, _ctx: &mut StageContext) -> Result<(), ShellError> {
        Ok(())
    }

    fn process(
        &mut self,
        args: &BoundArgs,
        input: Option<&PipelineItem>,
        ctx: &mut StageContext,
    ) -> Result<(), ShellError>;

    fn end(&mut self, _args: &BoundArgs, _ctx: &mut StageContext) -> Result<(), ShellError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_args_accessors() {
        let mut args = BoundArgs::default();
        args.insert("text", Value::List(vec![Value::str("a"), Value::str("b")]));
        args.insert("hidden", Value::Bool(true));
        args.insert("path", Value::str("/tmp"));
        assert!(args.contains("text"));
        assert_eq!(args.get_list("text").len(), 2);
        assert!(args.get_bool("hidden"));
        assert!(!args.get_bool("missing"));
        assert_eq!(args.get_text("path").as_deref(), Some("/tmp"));
        assert_eq!(args.get_list("path"), vec![Value::str("/tmp")]);
    }
}
