//! Recursive-descent parser for Asl
//!
//! Converts the token stream from the lexer directly into the typed AST
//! (see [`crate::ast`]). There is no intermediate concrete syntax tree:
//! each grammar production builds its AST node as it is recognized.

mod decl;
mod expr;
mod stmt;

use crate::ast::{NodeIdGen, Program};
use crate::error::{ParseError, ParseErrors, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// Asl parser
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) lexer: Lexer<'a>,
    pub(crate) source_map: SourceMap,
    pub(crate) current: Option<SpannedToken<'a>>,
    pub(crate) errors: ParseErrors,
    pub(crate) ids: NodeIdGen,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let source_map = SourceMap::new(source);
        let lexer = Lexer::new(source);
        let mut parser = Self {
            source,
            lexer,
            source_map,
            current: None,
            errors: ParseErrors::new(),
            ids: NodeIdGen::new(),
        };
        parser.advance();
        parser
    }

    /// Parse the whole program: one or more functions.
    pub fn parse(mut self) -> (Program, ParseErrors) {
        let start = 0;
        let id = self.ids.next();
        let mut functions = Vec::new();

        while !self.is_at_end() {
            match self.parse_function() {
                Ok(function) => functions.push(function),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }

        let end = self.source.len();
        let span = self.source_map.span(start, end);
        (
            Program {
                id,
                functions,
                span,
            },
            self.errors,
        )
    }

    // ==================== Token management ====================

    pub(crate) fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let prev = self.current.take();
        loop {
            match self.lexer.next_token() {
                Some(Ok(token)) => {
                    self.current = Some(token);
                    break;
                }
                Some(Err(e)) => {
                    self.errors.push(e);
                    continue;
                }
                None => {
                    self.current = None;
                    break;
                }
            }
        }
        prev
    }

    pub(crate) fn check(&self, expected: &Token) -> bool {
        self.current
            .as_ref()
            .map(|t| &t.token == expected)
            .unwrap_or(false)
    }

    pub(crate) fn peek_token(&self) -> Option<&Token> {
        self.current.as_ref().map(|t| &t.token)
    }

    pub(crate) fn matches(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        if self.check(&expected) {
            Ok(self.advance().unwrap())
        } else {
            Err(self.unexpected(expected.describe()))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> ParseResult<(String, Span)> {
        match self.current.as_ref().map(|t| t.token.clone()) {
            Some(Token::Ident(name)) => {
                let span = self.current_span();
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let span = self.current_span();
        match &self.current {
            Some(t) => ParseError::unexpected_token(t.token.describe(), expected, span),
            None => ParseError::unexpected_eof(expected, span),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current
            .as_ref()
            .map(|t| t.span)
            .unwrap_or_else(|| self.source_map.span(self.source.len(), self.source.len()))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Skip tokens until the start of what looks like the next function or
    /// statement, so one syntax error does not abort the whole parse.
    pub(crate) fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.check(&Token::Semicolon) {
                self.advance();
                return;
            }
            if self.check(&Token::Func) {
                return;
            }
            self.advance();
        }
    }
}

/// Parse Asl source code into a [`Program`], stopping at the first error.
pub fn parse(source: &str) -> ParseResult<Program> {
    let (program, errors) = Parser::new(source).parse();
    if errors.is_empty() {
        Ok(program)
    } else {
        Err(errors.into_iter().next().unwrap())
    }
}

/// Parse Asl source code with error recovery: always returns a program,
/// along with every error collected along the way.
pub fn parse_with_errors(source: &str) -> (Program, ParseErrors) {
    Parser::new(source).parse()
}
