use thiserror::Error;

use crate::parser::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ParseError: {message}\n  at [{start}:{end}] -> '{text}' ({kind})")]
pub struct ParseError {
    pub message: String,
    /// Text of the offending token, empty at end of input
    pub text: String,
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl ParseError {
    pub fn new(message: &str, token: &Token) -> Self {
        Self {
            message: message.to_string(),
            text: token.text.clone(),
            kind: token.kind,
            start: token.start,
            end: token.end,
        }
    }

    pub fn err<T>(self) -> Result<T, ParseError> {
        Err(self)
    }
}
