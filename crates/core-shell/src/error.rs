//! Shell error taxonomy. Stage tasks return these instead of panicking;
//! the executor aggregates them per statement and keeps going.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    /// Statement-level syntax problem surfaced at execution time.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Command name did not resolve in the registry.
    #[error("الأمر غير موجود (command not found): {name}")]
    CommandNotFound { name: String },

    /// Parameter binding failed: missing mandatory value, switch misuse,
    /// or type conversion failure.
    #[error("{command}: binding error: {message}")]
    Binding { command: String, message: String },

    /// A redirection file could not be opened, read, or written.
    #[error("redirection {path:?}: {source}")]
    Redirection {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A handler's begin/process/end reported failure.
    #[error("{command}: {message}")]
    Handler { command: String, message: String },
}

impl ShellError {
    pub fn handler(command: impl Into<String>, message: impl Into<String>) -> Self {
        ShellError::Handler {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn binding(command: impl Into<String>, message: impl Into<String>) -> Self {
        ShellError::Binding {
            command: command.into(),
            message: message.into(),
        }
    }
}
