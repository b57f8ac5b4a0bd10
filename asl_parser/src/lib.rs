//! asl_parser
//!
//! Lexer and recursive-descent parser for Asl, a small statically typed
//! procedural teaching language. Produces a typed abstract syntax tree
//! (see [`ast`]) rather than a generic concrete syntax tree; later
//! compiler passes attach scope, type, and lvalue-ness decorations to
//! tree nodes by [`ast::NodeId`] rather than walking back through parser
//! internals.
//!
//! # Example
//!
//! ```
//! use asl_parser::parse;
//!
//! let source = "func main()\nendfunc";
//! let program = parse(source).expect("parse failed");
//! assert_eq!(program.functions.len(), 1);
//! assert_eq!(program.functions[0].name, "main");
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{Expr, Function, Program, Statement};
pub use error::{ParseError, ParseErrors, ParseResult};
pub use lexer::{Lexer, SpannedToken};
pub use parser::Parser;
pub use span::{SourceMap, Span};
pub use token::Token;

/// Parse Asl source code into a [`Program`], stopping at the first error.
pub fn parse(source: &str) -> ParseResult<Program> {
    parser::parse(source)
}

/// Parse Asl source code with error recovery: always returns a program
/// (possibly partial), along with every error collected along the way.
pub fn parse_with_errors(source: &str) -> (Program, ParseErrors) {
    parser::parse_with_errors(source)
}

/// Tokenize Asl source code, for the `--tokens` CLI dump mode.
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    lexer::tokenize(source)
}

/// Crate version, reported by `aslc --version`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_function() {
        let program = parse("func main()\nendfunc").unwrap();
        assert_eq!(program.functions.len(), 1);
    }

    #[test]
    fn tokenizes_a_snippet() {
        let tokens = tokenize("1 + 2");
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn version_is_non_empty() {
        assert!(!version().is_empty());
    }

    #[test]
    fn parse_with_errors_recovers_from_a_bad_statement() {
        let source = "func main()\n x := ;\n write 1;\nendfunc";
        let (program, errors) = parse_with_errors(source);
        assert!(!errors.is_empty());
        assert_eq!(program.functions.len(), 1);
    }
}
