//! Regex-driven lexical scanner.
//!
//! Patterns are tried in a fixed order per position, longest/most specific
//! first, so `2>>&1` wins over `2>>` which wins over `2>`. Whitespace and
//! comments are consumed but not returned; anything unrecognized becomes an
//! `Unknown` token and the parser decides whether that is fatal.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::token::{OperatorKind, Token, TokenKind};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s+").unwrap());
static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[^\n\r]*").unwrap());
static STRING_DQ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:\\.|[^"\\])*""#).unwrap());
static STRING_DQ_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:\\.|[^"\\])*"#).unwrap());
static STRING_SQ: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'[^']*'").unwrap());
static STRING_SQ_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'[^']*").unwrap());
static STREAM_REDIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]?>>?&[0-9]").unwrap());
static FILE_APPEND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]?>>").unwrap());
static FILE_WRITE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]?>").unwrap());
static SUBEXPR_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$\(").unwrap());
static TYPE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[A-Za-z_][A-Za-z0-9_.]*\]").unwrap());
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\$[\p{L}\p{N}_]+").unwrap());
static PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-[\p{L}\p{N}_][\p{L}\p{N}_-]*").unwrap());
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}_./\\-]+").unwrap());

/// Stream handle encoded in a redirection operator; an absent digit means
/// stdout.
fn stream_digit(text: &str) -> u8 {
    text.bytes()
        .next()
        .filter(u8::is_ascii_digit)
        .map_or(1, |b| b - b'0')
}

fn decode_stream_redirect(text: &str) -> OperatorKind {
    let from = stream_digit(text);
    let to = text.bytes().last().map_or(1, |b| b - b'0');
    OperatorKind::RedirectStream { from, to }
}

/// Split one input line into significant tokens. Whitespace and comments
/// are dropped; `)` is classified as `SubExprEnd` while a `$(` is open and
/// `GroupEnd` otherwise.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = input;
    let mut offset = 0usize;
    let mut subexpr_depth = 0usize;

    while !rest.is_empty() {
        let (len, token) = next_token(rest, offset, &mut subexpr_depth);
        debug_assert!(len > 0, "lexer must always make progress");
        if let Some(token) = token {
            tokens.push(token);
        }
        offset += rest[..len].chars().count();
        rest = &rest[len..];
    }

    trace!(target: "lang.lexer", tokens = tokens.len(), "line_tokenized");
    tokens
}

/// Match one token at the head of `rest`. Returns the byte length consumed
/// and the token, or `None` for dropped whitespace/comments.
fn next_token(rest: &str, offset: usize, subexpr_depth: &mut usize) -> (usize, Option<Token>) {
    if let Some(m) = WHITESPACE.find(rest) {
        return (m.end(), None);
    }
    if let Some(m) = COMMENT.find(rest) {
        return (m.end(), None);
    }
    if let Some(m) = STRING_DQ.find(rest) {
        return token_at(TokenKind::StringLiteralDQ, m.as_str(), offset);
    }
    if let Some(m) = STRING_DQ_OPEN.find(rest) {
        // Unterminated double quote: take the remainder, parser warns.
        return token_at(TokenKind::StringLiteralDQ, m.as_str(), offset);
    }
    if let Some(m) = STRING_SQ.find(rest) {
        return token_at(TokenKind::StringLiteralSQ, m.as_str(), offset);
    }
    if let Some(m) = STRING_SQ_OPEN.find(rest) {
        return token_at(TokenKind::StringLiteralSQ, m.as_str(), offset);
    }
    if let Some(m) = STREAM_REDIR.find(rest) {
        let kind = TokenKind::Operator(decode_stream_redirect(m.as_str()));
        return token_at(kind, m.as_str(), offset);
    }
    if let Some(m) = FILE_APPEND.find(rest) {
        let kind = TokenKind::Operator(OperatorKind::RedirectFile {
            stream: stream_digit(m.as_str()),
            append: true,
        });
        return token_at(kind, m.as_str(), offset);
    }
    if let Some(m) = FILE_WRITE.find(rest) {
        let kind = TokenKind::Operator(OperatorKind::RedirectFile {
            stream: stream_digit(m.as_str()),
            append: false,
        });
        return token_at(kind, m.as_str(), offset);
    }
    if rest.starts_with('<') {
        return token_at(TokenKind::Operator(OperatorKind::RedirectInput), "<", offset);
    }
    if rest.starts_with('|') {
        return token_at(TokenKind::Operator(OperatorKind::Pipe), "|", offset);
    }
    if let Some(m) = SUBEXPR_START.find(rest) {
        *subexpr_depth += 1;
        return token_at(TokenKind::SubExprStart, m.as_str(), offset);
    }
    if rest.starts_with(';') {
        return token_at(TokenKind::Separator, ";", offset);
    }
    if rest.starts_with('(') {
        return token_at(TokenKind::GroupStart, "(", offset);
    }
    if rest.starts_with(')') {
        let kind = if *subexpr_depth > 0 {
            *subexpr_depth -= 1;
            TokenKind::SubExprEnd
        } else {
            TokenKind::GroupEnd
        };
        return token_at(kind, ")", offset);
    }
    if let Some(m) = TYPE_LITERAL.find(rest) {
        return token_at(TokenKind::TypeLiteral, m.as_str(), offset);
    }
    if let Some(m) = VARIABLE.find(rest) {
        return token_at(TokenKind::Variable, m.as_str(), offset);
    }
    if let Some(m) = PARAMETER.find(rest) {
        return token_at(TokenKind::ParameterName, m.as_str(), offset);
    }
    if let Some(m) = IDENTIFIER.find(rest) {
        return token_at(TokenKind::Identifier, m.as_str(), offset);
    }

    let ch = rest.chars().next().expect("rest is non-empty");
    let len = ch.len_utf8();
    (
        len,
        Some(Token::new(TokenKind::Unknown, ch.to_string(), offset)),
    )
}

fn token_at(kind: TokenKind, text: &str, offset: usize) -> (usize, Option<Token>) {
    (text.len(), Some(Token::new(kind, text, offset)))
}
