//! Lexer for the ModelPhy language

mod tokens;

pub use tokens::{Token, TokenKind};

use crate::common::{LineIndex, Span};
use crate::diagnostics::{ModelError, SyntaxError, SyntaxErrorSink};
use logos::Logos;

/// Tokenize `source`, failing with every unrecognized character at once
pub fn lex(source: &str) -> Result<Vec<Token>, ModelError> {
    let mut errors = Vec::new();
    let tokens = lex_with_sink(source, &mut errors);
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(ModelError::Syntax { errors })
    }
}

/// Tokenize `source`, reporting unrecognized input to `sink` and skipping it.
///
/// The returned stream always ends with a single `Eof` token.
pub fn lex_with_sink(source: &str, sink: &mut dyn SyntaxErrorSink) -> Vec<Token> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                span,
                text: lexer.slice().to_string(),
            }),
            Err(()) => sink.syntax_error(SyntaxError::new(
                format!("unrecognized input `{}`", lexer.slice()),
                span,
                &index,
            )),
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(source.len(), source.len()),
        text: String::new(),
    });
    tokens
}
