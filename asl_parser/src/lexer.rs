//! Lexer for Asl source code
//!
//! Wraps the logos-generated token stream with span tracking and a
//! one-token lookahead buffer for the parser.

use logos::Logos;

use crate::error::ParseError;
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token with its span and source text.
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

impl<'a> SpannedToken<'a> {
    pub fn new(token: Token, span: Span, text: &'a str) -> Self {
        Self { token, span, text }
    }
}

/// Asl lexer
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    peeked: Option<Result<SpannedToken<'a>, ParseError>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Peek at the next token without consuming it
    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let text = &self.source[span.start..span.end];
        let span = self.source_map.span(span.start, span.end);
        match result {
            Ok(token) => Some(Ok(SpannedToken::new(token, span, text))),
            Err(()) => Some(Err(ParseError::LexerError { span })),
        }
    }

    /// Collect all tokens (used by the `--tokens` CLI mode)
    pub fn collect_all(mut self) -> Vec<Result<SpannedToken<'a>, ParseError>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<SpannedToken<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize source code into a vector of spanned tokens
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    Lexer::new(source).collect_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokens() {
        let source = "func foo(x: int): int x := x + 1; endfunc";
        let tokens: Vec<_> = tokenize(source)
            .into_iter()
            .filter_map(|r| r.ok())
            .map(|t| t.token)
            .collect();

        assert_eq!(tokens[0], Token::Func);
        assert_eq!(tokens[1], Token::Ident("foo".into()));
        assert_eq!(tokens[2], Token::LParen);
    }

    #[test]
    fn spans_track_line_and_column() {
        let source = "var\nx: int;";
        let tokens: Vec<_> = tokenize(source)
            .into_iter()
            .filter_map(|r| r.ok())
            .collect();

        assert_eq!(tokens[0].span.start_line, 1);
        assert_eq!(tokens[1].span.start_line, 2);
        assert_eq!(tokens[1].span.start_column, 1);
    }

    #[test]
    fn peek_does_not_consume() {
        let source = "a b";
        let mut lexer = Lexer::new(source);
        let peeked = lexer.peek().unwrap().as_ref().unwrap().text.to_string();
        assert_eq!(peeked, "a");
        let next = lexer.next_token().unwrap().unwrap();
        assert_eq!(next.text, "a");
        let next = lexer.next_token().unwrap().unwrap();
        assert_eq!(next.text, "b");
    }

    #[test]
    fn unrecognized_character_is_a_lexer_error() {
        let tokens = tokenize("x @ y");
        assert!(tokens.iter().any(|t| t.is_err()));
    }
}
