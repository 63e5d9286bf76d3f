//! Parser for the ModelPhy language
//!
//! A recursive descent parser that produces a [`Program`] from a token stream.
//! Errors do not stop the parse: each one is reported to a
//! [`SyntaxErrorSink`] and the parser resumes after the next `;`, so a single
//! run reports every broken statement in the file.

use crate::ast::*;
use crate::common::{LineIndex, Span};
use crate::diagnostics::{ModelError, SyntaxError, SyntaxErrorSink};
use crate::lexer::{Token, TokenKind};

type PResult<T> = Result<T, SyntaxError>;

/// Parse a token stream, failing with all syntax errors if there are any
pub fn parse(tokens: &[Token], source: &str) -> Result<Program, ModelError> {
    let mut errors = Vec::new();
    let program = parse_with_sink(tokens, source, &mut errors);
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(ModelError::Syntax { errors })
    }
}

/// Parse a token stream, reporting syntax errors to `sink`.
///
/// Statements that fail to parse are left out of the returned program.
pub fn parse_with_sink(tokens: &[Token], source: &str, sink: &mut dyn SyntaxErrorSink) -> Program {
    let mut parser = Parser::new(tokens, source);
    parser.parse_program(sink)
}

/// Parser state
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    index: LineIndex,
    eof: Token,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], source: &str) -> Self {
        Self {
            tokens,
            pos: 0,
            index: LineIndex::new(source),
            eof: Token {
                kind: TokenKind::Eof,
                span: Span::new(source.len(), source.len()),
                text: String::new(),
            },
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_n(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(what))
        }
    }

    /// "expected X, found Y" at the current token
    fn error_here(&self, what: &str) -> SyntaxError {
        let tok = self.current();
        let found = if tok.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("`{}`", tok.text)
        };
        SyntaxError::new(format!("expected {what}, found {found}"), tok.span, &self.index)
    }

    fn span(&self) -> Span {
        self.current().span
    }

    /// Skip past the next `;` (or to end of file)
    fn recover(&mut self) {
        while !self.at(TokenKind::Eof) {
            if self.advance().kind == TokenKind::Semi {
                break;
            }
        }
    }

    // ==================== PROGRAM ====================

    fn parse_program(&mut self, sink: &mut dyn SyntaxErrorSink) -> Program {
        let mut statements = Vec::new();

        while !self.at(TokenKind::Eof) {
            match self.parse_stmt() {
                Ok(stmt) => statements.push(stmt),
                Err(error) => {
                    sink.syntax_error(error);
                    self.recover();
                }
            }
        }

        Program { statements }
    }

    // ==================== STATEMENTS ====================

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.peek() {
            TokenKind::Constraint => self.parse_constraint(),
            TokenKind::Observe => self.parse_observe(),
            TokenKind::Ident if self.peek_n(1) == TokenKind::LParen => self.parse_call_stochastic(),
            TokenKind::Ident => self.parse_typed(),
            _ => Err(self.error_here("a statement")),
        }
    }

    /// `Type id ;` | `Type id ~ dist ;` | `Type id = expr ;`
    fn parse_typed(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let ty = self.parse_ident("a type name")?;
        let id = self.parse_ident("a variable name")?;

        let stmt = match self.peek() {
            TokenKind::Semi => {
                let end = self.advance().span;
                Stmt::Declaration {
                    ty,
                    id,
                    init: None,
                    span: start.merge(end),
                }
            }
            TokenKind::Tilde => {
                self.advance();
                let distribution = self.parse_call()?;
                let end = self.expect(TokenKind::Semi, "`;`")?.span;
                Stmt::Stochastic {
                    target: StochasticTarget::Variable { ty, id },
                    distribution,
                    span: start.merge(end),
                }
            }
            TokenKind::Eq => {
                self.advance();
                let expr = self.parse_expr()?;
                let end = self.expect(TokenKind::Semi, "`;`")?.span;
                let span = start.merge(end);
                if expr.is_literal_only() {
                    Stmt::Declaration {
                        ty,
                        id,
                        init: Some(expr),
                        span,
                    }
                } else {
                    Stmt::Deterministic { ty, id, expr, span }
                }
            }
            _ => return Err(self.error_here("`;`, `~` or `=`")),
        };

        Ok(stmt)
    }

    /// `call(...) ~ dist ;`
    fn parse_call_stochastic(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let call = self.parse_call()?;
        self.expect(TokenKind::Tilde, "`~`")?;
        let distribution = self.parse_call()?;
        let end = self.expect(TokenKind::Semi, "`;`")?.span;

        Ok(Stmt::Stochastic {
            target: StochasticTarget::Call(call),
            distribution,
            span: start.merge(end),
        })
    }

    /// `constraint id = call(...) ;`
    fn parse_constraint(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Constraint, "`constraint`")?.span;
        let id = self.parse_ident("a constraint name")?;
        self.expect(TokenKind::Eq, "`=`")?;
        let call = self.parse_call()?;
        let end = self.expect(TokenKind::Semi, "`;`")?.span;

        Ok(Stmt::Constraint {
            id,
            call,
            span: start.merge(end),
        })
    }

    /// `observe id from "file" ;` | `observe id [ key = expr, ... ] ;`
    fn parse_observe(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::Observe, "`observe`")?.span;
        let id = self.parse_ident("a variable name")?;

        let source = match self.peek() {
            TokenKind::From => {
                self.advance();
                let tok = self.expect(TokenKind::StringLit, "a file name string")?;
                ObservationSource::File {
                    literal: tok.text,
                    span: tok.span,
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let mut pairs = Vec::new();
                while !self.at(TokenKind::RBracket) {
                    let key = self.parse_ident("an observation key")?;
                    self.expect(TokenKind::Eq, "`=`")?;
                    let value = self.parse_expr()?;
                    pairs.push(KeyValue { key, value });
                    if !self.at(TokenKind::RBracket) {
                        self.expect(TokenKind::Comma, "`,` or `]`")?;
                    }
                }
                self.expect(TokenKind::RBracket, "`]`")?;
                ObservationSource::KeyValues(pairs)
            }
            _ => return Err(self.error_here("`from` or `[`")),
        };

        let end = self.expect(TokenKind::Semi, "`;`")?.span;
        Ok(Stmt::Observe {
            id,
            source,
            span: start.merge(end),
        })
    }

    // ==================== EXPRESSIONS ====================

    fn parse_call(&mut self) -> PResult<Call> {
        let name = self.parse_ident("a function or distribution name")?;
        self.expect(TokenKind::LParen, "`(`")?;

        let mut args = Vec::new();
        while !self.at(TokenKind::RParen) {
            args.push(self.parse_arg()?);
            if !self.at(TokenKind::RParen) {
                self.expect(TokenKind::Comma, "`,` or `)`")?;
            }
        }
        let end = self.expect(TokenKind::RParen, "`)`")?.span;

        Ok(Call {
            span: name.span.merge(end),
            name,
            args,
        })
    }

    fn parse_arg(&mut self) -> PResult<CallArg> {
        if self.at(TokenKind::Ident) && self.peek_n(1) == TokenKind::Eq {
            let name = self.parse_ident("an argument name")?;
            self.advance();
            let value = self.parse_expr()?;
            Ok(CallArg {
                name: Some(name),
                value,
            })
        } else {
            Ok(CallArg {
                name: None,
                value: self.parse_expr()?,
            })
        }
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        match self.peek() {
            // Literals
            TokenKind::IntLit => Ok(self.literal(LiteralKind::Integer)),
            TokenKind::FloatLit => Ok(self.literal(LiteralKind::Float)),
            TokenKind::StringLit => Ok(self.literal(LiteralKind::String)),
            TokenKind::True | TokenKind::False => Ok(self.literal(LiteralKind::Boolean)),

            // Identifiers and calls
            TokenKind::Ident if self.peek_n(1) == TokenKind::LParen => {
                Ok(Expr::Call(self.parse_call()?))
            }
            TokenKind::Ident => Ok(Expr::Ident(self.parse_ident("an identifier")?)),

            // Array literal
            TokenKind::LBracket => {
                let start = self.advance().span;
                let mut elements = Vec::new();
                while !self.at(TokenKind::RBracket) {
                    elements.push(self.parse_expr()?);
                    if !self.at(TokenKind::RBracket) {
                        self.expect(TokenKind::Comma, "`,` or `]`")?;
                    }
                }
                let end = self.expect(TokenKind::RBracket, "`]`")?.span;
                Ok(Expr::Array {
                    elements,
                    span: start.merge(end),
                })
            }

            // Grouped expression
            TokenKind::LParen => {
                let start = self.advance().span;
                let inner = self.parse_expr()?;
                let end = self.expect(TokenKind::RParen, "`)`")?.span;
                Ok(Expr::Paren {
                    inner: Box::new(inner),
                    span: start.merge(end),
                })
            }

            _ => Err(self.error_here("an expression")),
        }
    }

    fn literal(&mut self, kind: LiteralKind) -> Expr {
        let tok = self.advance();
        Expr::Literal {
            kind,
            text: tok.text,
            span: tok.span,
        }
    }

    // ==================== HELPERS ====================

    fn parse_ident(&mut self, what: &str) -> PResult<Ident> {
        let tok = self.expect(TokenKind::Ident, what)?;
        Ok(Ident {
            name: tok.text,
            span: tok.span,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn test_recovery_keeps_following_statements() {
        let source = "Real x ~ ;\nReal y ~ Normal(mean=0.0);";
        let tokens = lex(source).unwrap();
        let mut errors = Vec::new();
        let program = parse_with_sink(&tokens, source, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_missing_semicolon_at_eof() {
        let source = "Real x";
        let tokens = lex(source).unwrap();
        let err = parse(&tokens, source).unwrap_err();
        assert_eq!(
            err.to_string(),
            "1 syntax error(s)",
        );
    }
}
