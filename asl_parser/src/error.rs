//! Parse error types

use crate::span::Span;
use thiserror::Error;

/// Parse error type
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    /// Unexpected token
    #[error("unexpected token {found}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    /// Unexpected end of input
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    /// Invalid integer literal (does not fit in the target width)
    #[error("invalid integer literal '{literal}'")]
    InvalidNumber { literal: String, span: Span },

    /// Invalid character literal (empty, or more than one character)
    #[error("invalid character literal '{literal}'")]
    InvalidCharacter { literal: String, span: Span },

    /// Array size in a declaration is not a positive integer
    #[error("array size must be a positive integer literal")]
    InvalidArraySize { span: Span },

    /// Generic syntax error with a custom message
    #[error("{message}")]
    InvalidSyntax { message: String, span: Span },

    /// Lexer could not recognize a token
    #[error("unrecognized token")]
    LexerError { span: Span },
}

impl ParseError {
    /// Get the span of the error
    pub fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => span,
            ParseError::UnexpectedEof { span, .. } => span,
            ParseError::InvalidNumber { span, .. } => span,
            ParseError::InvalidCharacter { span, .. } => span,
            ParseError::InvalidArraySize { span } => span,
            ParseError::InvalidSyntax { span, .. } => span,
            ParseError::LexerError { span } => span,
        }
    }

    /// Create an unexpected token error
    pub fn unexpected_token(
        found: impl Into<String>,
        expected: impl Into<String>,
        span: Span,
    ) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            span,
        }
    }

    /// Create an unexpected EOF error
    pub fn unexpected_eof(expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedEof {
            expected: expected.into(),
            span,
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span,
        }
    }

    /// Render as the `L<line>:<col>: <message>` diagnostic line shared with
    /// the semantic passes.
    pub fn to_diagnostic(&self) -> String {
        format!(
            "L{}:{}: {}",
            self.span().start_line,
            self.span().start_column,
            self
        )
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Collection of parse errors for error recovery
#[derive(Debug, Default)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
}

impl ParseErrors {
    /// Create a new empty error collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Add an error
    pub fn push(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Take all errors
    pub fn take(self) -> Vec<ParseError> {
        self.errors
    }

    /// Iterate over errors
    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.errors.iter()
    }

    /// Get the first error
    pub fn first(&self) -> Option<&ParseError> {
        self.errors.first()
    }

    /// Render every error as a `L<line>:<col>: <message>` diagnostic, one per line.
    pub fn to_diagnostics(&self) -> Vec<String> {
        self.errors.iter().map(ParseError::to_diagnostic).collect()
    }
}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_token_renders_diagnostic() {
        let span = Span::new(10, 13, 2, 2, 5, 8);
        let err = ParseError::unexpected_token("';'", "an expression", span);
        assert!(err.to_string().contains("expected an expression"));
        assert_eq!(err.to_diagnostic(), "L2:5: unexpected token ';', expected an expression");
    }

    #[test]
    fn parse_errors_collects_in_order() {
        let mut errors = ParseErrors::new();
        assert!(errors.is_empty());

        errors.push(ParseError::unexpected_token("a", "b", Span::new(0, 1, 1, 1, 1, 2)));
        errors.push(ParseError::unexpected_eof("end", Span::new(5, 5, 1, 1, 6, 6)));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.to_diagnostics().len(), 2);
    }
}
