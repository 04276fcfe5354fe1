//! Token stream → statements.
//!
//! Splitting happens on the token stream, so quoting has already been
//! respected by the lexer. Variable expansion happens here: bare `$name`
//! tokens and `$name` inside double-quoted strings are resolved through the
//! caller-supplied resolver; undefined names expand to the empty string.
//! Unterminated quotes warn and keep the remainder as a literal; an
//! unterminated `$(` is a hard parse error because the nesting intent is
//! ambiguous.

use thiserror::Error;
use tracing::debug;

use crate::ast::{Argument, ParsedCommand, RedirTarget, Redirection, Statement};
use crate::lexer::tokenize;
use crate::token::{OperatorKind, Token, TokenKind};

/// Resolves `$name`; `None` means undefined (expands empty).
pub type VariableResolver<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected {text:?} at position {offset}")]
    UnexpectedToken { text: String, offset: usize },
    #[error("sub-expression opened at position {offset} is never closed")]
    UnterminatedSubExpr { offset: usize },
    #[error("redirection at position {offset} is missing its file target")]
    MissingRedirTarget { offset: usize },
    #[error("stream handle {handle} at position {offset} is not 1 or 2")]
    BadStreamHandle { handle: u8, offset: usize },
    #[error("pipeline stage at position {offset} has no command name")]
    MissingCommand { offset: usize },
}

/// Non-fatal parse diagnostics (unterminated quotes, duplicate input
/// redirections); the statement still runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub message: String,
    pub offset: usize,
}

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub statements: Vec<Statement>,
    pub warnings: Vec<ParseWarning>,
}

/// Parse one input line into statements.
pub fn parse(input: &str, resolver: VariableResolver) -> Result<ParseOutput, ParseError> {
    let tokens = tokenize(input);
    let mut parser = Parser {
        tokens,
        pos: 0,
        warnings: Vec::new(),
        resolver,
    };
    let statements = parser.parse_program(false)?;
    debug!(
        target: "lang.parser",
        statements = statements.len(),
        warnings = parser.warnings.len(),
        "line_parsed"
    );
    Ok(ParseOutput {
        statements,
        warnings: parser.warnings,
    })
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    warnings: Vec<ParseWarning>,
    resolver: VariableResolver<'a>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn warn(&mut self, message: impl Into<String>, offset: usize) {
        self.warnings.push(ParseWarning {
            message: message.into(),
            offset,
        });
    }

    /// `input := statement (';' statement)*`, optionally stopping at the
    /// `)` of an enclosing sub-expression.
    fn parse_program(&mut self, in_subexpr: bool) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();
        loop {
            match self.peek().map(|t| t.kind) {
                None => {
                    if in_subexpr {
                        // The opener's offset is reported by the caller.
                        return Err(ParseError::UnterminatedSubExpr { offset: 0 });
                    }
                    return Ok(statements);
                }
                Some(TokenKind::SubExprEnd) if in_subexpr => {
                    self.bump();
                    return Ok(statements);
                }
                Some(TokenKind::Separator) => {
                    self.bump();
                }
                _ => {
                    let statement = self.parse_statement(in_subexpr)?;
                    if !statement.is_empty() {
                        statements.push(statement);
                    }
                }
            }
        }
    }

    /// `statement := stage ('|' stage)*`
    fn parse_statement(&mut self, in_subexpr: bool) -> Result<Statement, ParseError> {
        let mut stages = vec![self.parse_stage()?];
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Operator(OperatorKind::Pipe) => {
                    self.bump();
                    stages.push(self.parse_stage()?);
                }
                TokenKind::Separator => break,
                TokenKind::SubExprEnd if in_subexpr => break,
                _ => break,
            }
        }
        Ok(stages)
    }

    fn parse_stage(&mut self) -> Result<ParsedCommand, ParseError> {
        let name_token = self.bump().ok_or(ParseError::MissingCommand { offset: 0 })?;
        let name = match name_token.kind {
            TokenKind::Identifier => name_token.text.clone(),
            TokenKind::StringLiteralDQ | TokenKind::StringLiteralSQ => {
                self.literal_from_string(&name_token)
            }
            _ => {
                return Err(ParseError::MissingCommand {
                    offset: name_token.offset,
                })
            }
        };
        let mut stage = ParsedCommand::named(name);

        while let Some(token) = self.peek().cloned() {
            match token.kind {
                TokenKind::Operator(OperatorKind::Pipe)
                | TokenKind::Separator
                | TokenKind::SubExprEnd => break,
                TokenKind::ParameterName => {
                    self.bump();
                    let name = token.text[1..].to_string();
                    let value = if self.peek_is_argument_start() {
                        Some(self.parse_argument()?)
                    } else {
                        None
                    };
                    stage.params.push((name, value));
                }
                TokenKind::Operator(OperatorKind::RedirectFile { stream, append }) => {
                    self.bump();
                    self.check_stream_handle(stream, token.offset)?;
                    let path = self.expect_path(token.offset)?;
                    stage.redirections.push(Redirection {
                        source: stream,
                        target: RedirTarget::File { path, append },
                    });
                }
                TokenKind::Operator(OperatorKind::RedirectStream { from, to }) => {
                    self.bump();
                    self.check_stream_handle(from, token.offset)?;
                    self.check_stream_handle(to, token.offset)?;
                    stage.redirections.push(Redirection {
                        source: from,
                        target: RedirTarget::Stream(to),
                    });
                }
                TokenKind::Operator(OperatorKind::RedirectInput) => {
                    self.bump();
                    let path = self.expect_path(token.offset)?;
                    if stage.input_redirect.is_some() {
                        self.warn("duplicate input redirection; last one wins", token.offset);
                    }
                    stage.input_redirect = Some(path);
                }
                TokenKind::Identifier
                | TokenKind::StringLiteralDQ
                | TokenKind::StringLiteralSQ
                | TokenKind::Variable
                | TokenKind::TypeLiteral
                | TokenKind::SubExprStart => {
                    let argument = self.parse_argument()?;
                    stage.args.push(argument);
                }
                TokenKind::Unknown
                | TokenKind::GroupStart
                | TokenKind::GroupEnd
                | TokenKind::Whitespace
                | TokenKind::Comment => {
                    return Err(ParseError::UnexpectedToken {
                        text: token.text.clone(),
                        offset: token.offset,
                    });
                }
            }
        }
        Ok(stage)
    }

    fn peek_is_argument_start(&self) -> bool {
        matches!(
            self.peek().map(|t| t.kind),
            Some(
                TokenKind::Identifier
                    | TokenKind::StringLiteralDQ
                    | TokenKind::StringLiteralSQ
                    | TokenKind::Variable
                    | TokenKind::TypeLiteral
                    | TokenKind::SubExprStart
            )
        )
    }

    fn parse_argument(&mut self) -> Result<Argument, ParseError> {
        let token = self.bump().expect("caller checked an argument follows");
        match token.kind {
            TokenKind::Identifier => Ok(Argument::Literal(token.text.clone())),
            TokenKind::Variable => {
                let name = &token.text[1..];
                Ok(Argument::Literal(
                    (self.resolver)(name).unwrap_or_default(),
                ))
            }
            TokenKind::StringLiteralSQ | TokenKind::StringLiteralDQ => {
                Ok(Argument::Literal(self.literal_from_string(&token)))
            }
            TokenKind::TypeLiteral => {
                let inner = token.text[1..token.text.len() - 1].to_string();
                Ok(Argument::TypeLiteral(inner))
            }
            TokenKind::SubExprStart => {
                let statements = self.parse_program(true).map_err(|err| match err {
                    ParseError::UnterminatedSubExpr { .. } => ParseError::UnterminatedSubExpr {
                        offset: token.offset,
                    },
                    other => other,
                })?;
                Ok(Argument::SubExpr(statements))
            }
            _ => Err(ParseError::UnexpectedToken {
                text: token.text.clone(),
                offset: token.offset,
            }),
        }
    }

    /// Quoted-string surface form → literal value, warning on a missing
    /// closing quote and expanding `$name` in double quotes.
    fn literal_from_string(&mut self, token: &Token) -> String {
        let text = &token.text;
        match token.kind {
            TokenKind::StringLiteralSQ => {
                if text.len() >= 2 && text.ends_with('\'') {
                    text[1..text.len() - 1].to_string()
                } else {
                    self.warn("unterminated single quote; treating remainder as literal", token.offset);
                    text[1..].to_string()
                }
            }
            _ => {
                let body = if dq_is_terminated(text) {
                    &text[1..text.len() - 1]
                } else {
                    self.warn("unterminated double quote; treating remainder as literal", token.offset);
                    &text[1..]
                };
                self.expand_double_quoted(body)
            }
        }
    }

    fn expand_double_quoted(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len());
        let mut chars = body.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                },
                '$' => {
                    let mut name = String::new();
                    while let Some(&next) = chars.peek() {
                        if next.is_alphanumeric() || next == '_' {
                            name.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if name.is_empty() {
                        out.push('$');
                    } else {
                        out.push_str(&(self.resolver)(&name).unwrap_or_default());
                    }
                }
                other => out.push(other),
            }
        }
        out
    }

    fn check_stream_handle(&self, handle: u8, offset: usize) -> Result<(), ParseError> {
        if handle == 1 || handle == 2 {
            Ok(())
        } else {
            Err(ParseError::BadStreamHandle { handle, offset })
        }
    }

    fn expect_path(&mut self, redir_offset: usize) -> Result<String, ParseError> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Identifier) => {
                let token = self.bump().expect("peeked");
                Ok(token.text)
            }
            Some(TokenKind::StringLiteralDQ | TokenKind::StringLiteralSQ) => {
                let token = self.bump().expect("peeked");
                Ok(self.literal_from_string(&token))
            }
            Some(TokenKind::Variable) => {
                let token = self.bump().expect("peeked");
                Ok((self.resolver)(&token.text[1..]).unwrap_or_default())
            }
            _ => Err(ParseError::MissingRedirTarget {
                offset: redir_offset,
            }),
        }
    }
}

/// Whether a double-quoted surface form ends with a real (unescaped)
/// closing quote. The lexer guarantees no unescaped quote appears earlier.
fn dq_is_terminated(text: &str) -> bool {
    let mut chars = text[1..].chars();
    let mut closed = false;
    while let Some(c) = chars.next() {
        closed = false;
        match c {
            '\\' => {
                let _ = chars.next();
            }
            '"' => closed = true,
            _ => {}
        }
    }
    closed
}
