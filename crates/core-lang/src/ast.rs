//! Parsed command model: statements, pipeline stages, redirections.

/// One pipeline: stages executed concurrently, wired head to tail.
pub type Statement = Vec<ParsedCommand>;

/// An argument as parsed, before binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Quoted or bare literal, variable expansion already applied.
    Literal(String),
    /// `$( … )`: a nested program whose output substitutes for the value.
    SubExpr(Vec<Statement>),
    /// `[name]`: carries the bracketed name without the brackets.
    TypeLiteral(String),
}

impl Argument {
    /// Literal text if this argument is one.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Argument::Literal(text) => Some(text),
            _ => None,
        }
    }
}

/// Where a redirected stream lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirTarget {
    /// `> path` / `>> path`; `append` distinguishes the two.
    File { path: String, append: bool },
    /// `2>&1` style merge into another stream handle.
    Stream(u8),
}

/// One redirection on a stage. `source` is 1 (stdout) or 2 (stderr).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub source: u8,
    pub target: RedirTarget,
}

/// A single pipeline stage: command name plus everything bound to it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedCommand {
    /// Matched case-insensitively against the registry.
    pub name: String,
    /// Positional arguments in order.
    pub args: Vec<Argument>,
    /// Named parameters in source order; `None` values are switches.
    /// Names are stored without the leading `-`.
    pub params: Vec<(String, Option<Argument>)>,
    /// Output redirections in source order.
    pub redirections: Vec<Redirection>,
    /// `< path`, at most one per stage.
    pub input_redirect: Option<String>,
}

impl ParsedCommand {
    pub fn named(name: impl Into<String>) -> Self {
        ParsedCommand {
            name: name.into(),
            ..ParsedCommand::default()
        }
    }

    /// Whether any redirection merges stderr into stdout.
    pub fn merges_err_into_out(&self) -> bool {
        self.redirections
            .iter()
            .any(|r| r.source == 2 && r.target == RedirTarget::Stream(1))
    }

    /// Whether any redirection merges stdout into stderr.
    pub fn merges_out_into_err(&self) -> bool {
        self.redirections
            .iter()
            .any(|r| r.source == 1 && r.target == RedirTarget::Stream(2))
    }

    /// Last file target for the given stream, if any. Later redirections
    /// win, matching left-to-right evaluation.
    pub fn file_target(&self, stream: u8) -> Option<(&str, bool)> {
        self.redirections.iter().rev().find_map(|r| match &r.target {
            RedirTarget::File { path, append } if r.source == stream => {
                Some((path.as_str(), *append))
            }
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_flags_read_redirections() {
        let mut cmd = ParsedCommand::named("اطبع");
        assert!(!cmd.merges_err_into_out());
        cmd.redirections.push(Redirection {
            source: 2,
            target: RedirTarget::Stream(1),
        });
        assert!(cmd.merges_err_into_out());
        assert!(!cmd.merges_out_into_err());
    }

    #[test]
    fn later_file_target_wins() {
        let mut cmd = ParsedCommand::named("اطبع");
        cmd.redirections.push(Redirection {
            source: 1,
            target: RedirTarget::File {
                path: "a.txt".into(),
                append: false,
            },
        });
        cmd.redirections.push(Redirection {
            source: 1,
            target: RedirTarget::File {
                path: "b.txt".into(),
                append: true,
            },
        });
        assert_eq!(cmd.file_target(1), Some(("b.txt", true)));
        assert_eq!(cmd.file_target(2), None);
    }
}
