//! Expression parsing.
//!
//! Precedence, loosest to tightest: logical (`and`/`or`) > relational
//! (non-chaining) > additive (`+`/`-`) > multiplicative (`*`/`/`/`%`) >
//! unary (`not`/`+`/`-`) > primary.

use super::Parser;
use crate::ast::{ArithOp, Expr, Ident, LeftExpr, LogicOp, RelOp, UnaryOp, WriteArg};
use crate::error::ParseResult;
use crate::token::Token;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_logical()
    }

    fn parse_logical(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::And) => LogicOp::And,
                Some(Token::Or) => LogicOp::Or,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_relational()?;
            let span = lhs.span().merge(&rhs.span());
            let id = self.ids.next();
            lhs = Expr::Logical {
                id,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_arithmetic()?;
        let op = match self.peek_token() {
            Some(Token::Equal) => RelOp::Eq,
            Some(Token::NotEqual) => RelOp::Neq,
            Some(Token::Lt) => RelOp::Lt,
            Some(Token::Leq) => RelOp::Leq,
            Some(Token::Gt) => RelOp::Gt,
            Some(Token::Geq) => RelOp::Geq,
            _ => return Ok(lhs),
        };
        self.advance();
        let rhs = self.parse_arithmetic()?;
        let span = lhs.span().merge(&rhs.span());
        let id = self.ids.next();
        Ok(Expr::Relational {
            id,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        })
    }

    fn parse_arithmetic(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => ArithOp::Add,
                Some(Token::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_term()?;
            let span = lhs.span().merge(&rhs.span());
            let id = self.ids.next();
            lhs = Expr::Arithmetic {
                id,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_token() {
                Some(Token::Mul) => ArithOp::Mul,
                Some(Token::Div) => ArithOp::Div,
                Some(Token::Mod) => ArithOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            let span = lhs.span().merge(&rhs.span());
            let id = self.ids.next();
            lhs = Expr::Arithmetic {
                id,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.current_span();
        let op = match self.peek_token() {
            Some(Token::Not) => Some(UnaryOp::Not),
            Some(Token::Plus) => Some(UnaryOp::Plus),
            Some(Token::Minus) => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(&operand.span());
            let id = self.ids.next();
            return Ok(Expr::Unary {
                id,
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let span = self.current_span();
        match self.current.as_ref().map(|t| t.token.clone()) {
            Some(Token::IntVal(text)) => {
                self.advance();
                let id = self.ids.next();
                let value = text
                    .parse::<i64>()
                    .map_err(|_| crate::error::ParseError::InvalidNumber { literal: text, span })?;
                Ok(Expr::IntLit(id, value, span))
            }
            Some(Token::FloatVal(text)) => {
                self.advance();
                let id = self.ids.next();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| crate::error::ParseError::InvalidNumber { literal: text, span })?;
                Ok(Expr::FloatLit(id, value, span))
            }
            Some(Token::CharVal(text)) => {
                self.advance();
                let id = self.ids.next();
                let ch = parse_char_literal(&text)
                    .ok_or_else(|| crate::error::ParseError::InvalidCharacter {
                        literal: text.clone(),
                        span,
                    })?;
                Ok(Expr::CharLit(id, ch, span))
            }
            Some(Token::True) => {
                self.advance();
                let id = self.ids.next();
                Ok(Expr::BoolLit(id, true, span))
            }
            Some(Token::False) => {
                self.advance();
                let id = self.ids.next();
                Ok(Expr::BoolLit(id, false, span))
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                let end = self.current_span();
                self.expect(Token::RParen)?;
                let id = self.ids.next();
                Ok(Expr::Paren {
                    id,
                    inner: Box::new(inner),
                    span: span.merge(&end),
                })
            }
            Some(Token::Ident(name)) => {
                self.advance();
                let ident_id = self.ids.next();
                let ident = Ident {
                    id: ident_id,
                    name,
                    span,
                };
                if self.matches(&Token::LBracket) {
                    let index = self.parse_expr()?;
                    let end = self.current_span();
                    self.expect(Token::RBracket)?;
                    let id = self.ids.next();
                    Ok(Expr::ArrayAccess {
                        id,
                        base: ident,
                        index: Box::new(index),
                        span: span.merge(&end),
                    })
                } else if self.matches(&Token::LParen) {
                    let args = self.parse_arg_list()?;
                    let end = self.current_span();
                    self.expect(Token::RParen)?;
                    let id = self.ids.next();
                    Ok(Expr::Call {
                        id,
                        ident,
                        args,
                        span: span.merge(&end),
                    })
                } else {
                    Ok(Expr::Ident(ident))
                }
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn parse_arg_list(&mut self) -> ParseResult<Vec<Expr>> {
        if self.check(&Token::RParen) {
            return Ok(Vec::new());
        }
        let mut args = vec![self.parse_expr()?];
        while self.matches(&Token::Comma) {
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    /// `ident` or `ident '[' expr ']'`, the only forms valid on the
    /// left-hand side of `:=` or `read`.
    pub(crate) fn parse_left_expr(&mut self) -> ParseResult<LeftExpr> {
        let (name, name_span) = self.expect_ident()?;
        let ident_id = self.ids.next();
        let ident = Ident {
            id: ident_id,
            name,
            span: name_span,
        };
        let (index, span) = if self.matches(&Token::LBracket) {
            let index = self.parse_expr()?;
            let end = self.current_span();
            self.expect(Token::RBracket)?;
            (Some(Box::new(index)), name_span.merge(&end))
        } else {
            (None, name_span)
        };
        let id = self.ids.next();
        Ok(LeftExpr {
            id,
            ident,
            index,
            span,
        })
    }

    /// The argument of a `write` statement: a bare string literal is kept
    /// distinct from the general expression grammar (see the `write` entry
    /// in the language glossary). The raw quoted text is kept verbatim —
    /// TAC string operands are written exactly as they appear in source.
    pub(crate) fn parse_write_arg(&mut self) -> ParseResult<WriteArg> {
        let span = self.current_span();
        if let Some(Token::StringVal(text)) = self.current.as_ref().map(|t| t.token.clone()) {
            self.advance();
            return Ok(WriteArg::Str(text, span));
        }
        Ok(WriteArg::Expr(self.parse_expr()?))
    }
}

fn parse_char_literal(text: &str) -> Option<char> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    let c = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            other => other,
        },
        c => c,
    };
    if chars.next().is_some() {
        None
    } else {
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn parse_expr(src: &str) -> Expr {
        let mut parser = Parser::new(src);
        parser.parse_expr().expect("expression should parse")
    }

    #[test]
    fn relational_does_not_chain() {
        let expr = parse_expr("1 < 2");
        assert!(matches!(expr, Expr::Relational { op: RelOp::Lt, .. }));
    }

    #[test]
    fn logical_is_left_associative_and_looser_than_relational() {
        let expr = parse_expr("a < b and c < d");
        match expr {
            Expr::Logical { op: LogicOp::And, lhs, rhs, .. } => {
                assert!(matches!(*lhs, Expr::Relational { .. }));
                assert!(matches!(*rhs, Expr::Relational { .. }));
            }
            other => panic!("expected Logical, got {other:?}"),
        }
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let expr = parse_expr("1 + 2 * 3");
        match expr {
            Expr::Arithmetic { op: ArithOp::Add, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Arithmetic { op: ArithOp::Mul, .. }));
            }
            other => panic!("expected Add at the top, got {other:?}"),
        }
    }

    #[test]
    fn write_arg_keeps_string_literal_raw() {
        use crate::ast::WriteArg;
        let mut parser = Parser::new("\"hi\\n\"");
        let arg = parser.parse_write_arg().unwrap();
        match arg {
            WriteArg::Str(text, _) => assert_eq!(text, "\"hi\\n\""),
            other => panic!("expected WriteArg::Str, got {other:?}"),
        }
    }

    #[test]
    fn parses_char_literal_escape() {
        assert_eq!(parse_char_literal("'\\n'"), Some('\n'));
        assert_eq!(parse_char_literal("'a'"), Some('a'));
    }
}
