//! Statement parsing.

use super::Parser;
use crate::ast::Statement;
use crate::error::ParseResult;
use crate::token::Token;

impl<'a> Parser<'a> {
    pub(crate) fn parse_statements_until(&mut self, terminator: &Token) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.is_at_end() && !self.check(terminator) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                    if self.check(terminator) || self.is_at_end() {
                        break;
                    }
                }
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek_token() {
            Some(Token::If) => self.parse_if_stmt(),
            Some(Token::While) => self.parse_while_stmt(),
            Some(Token::Read) => self.parse_read_stmt(),
            Some(Token::Write) => self.parse_write_stmt(),
            Some(Token::Return) => self.parse_return_stmt(),
            Some(Token::Ident(_)) if self.next_is_call() => self.parse_call_stmt(),
            _ => self.parse_assign_stmt(),
        }
    }

    /// True when the identifier under the cursor opens a procedure call
    /// (`ident (`) rather than a left-hand-side expression (`ident`,
    /// `ident :=`, `ident [`).
    fn next_is_call(&mut self) -> bool {
        matches!(self.lexer.peek(), Some(Ok(tok)) if tok.token == Token::LParen)
    }

    fn parse_assign_stmt(&mut self) -> ParseResult<Statement> {
        let target = self.parse_left_expr()?;
        self.expect(Token::Assign)?;
        let value = self.parse_expr()?;
        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        let span = target.span.merge(&end);
        Ok(Statement::Assign { target, value, span })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.current_span();
        self.expect(Token::If)?;
        let cond = self.parse_expr()?;
        self.expect(Token::Then)?;
        let then_branch = self.parse_statements_until_any(&[Token::Else, Token::EndIf])?;
        let else_branch = if self.matches(&Token::Else) {
            Some(self.parse_statements_until(&Token::EndIf)?)
        } else {
            None
        };
        let end = self.current_span();
        self.expect(Token::EndIf)?;
        Ok(Statement::If {
            cond,
            then_branch,
            else_branch,
            span: start.merge(&end),
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.current_span();
        self.expect(Token::While)?;
        let cond = self.parse_expr()?;
        self.expect(Token::Do)?;
        let body = self.parse_statements_until(&Token::EndWhile)?;
        let end = self.current_span();
        self.expect(Token::EndWhile)?;
        Ok(Statement::While {
            cond,
            body,
            span: start.merge(&end),
        })
    }

    fn parse_call_stmt(&mut self) -> ParseResult<Statement> {
        let (name, name_span) = self.expect_ident()?;
        let ident_id = self.ids.next();
        self.expect(Token::LParen)?;
        let args = if self.check(&Token::RParen) {
            Vec::new()
        } else {
            let mut args = vec![self.parse_expr()?];
            while self.matches(&Token::Comma) {
                args.push(self.parse_expr()?);
            }
            args
        };
        self.expect(Token::RParen)?;
        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        let id = self.ids.next();
        Ok(Statement::Call {
            id,
            ident: crate::ast::Ident {
                id: ident_id,
                name,
                span: name_span,
            },
            args,
            span: name_span.merge(&end),
        })
    }

    fn parse_read_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.current_span();
        self.expect(Token::Read)?;
        let target = self.parse_left_expr()?;
        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        Ok(Statement::Read {
            target,
            span: start.merge(&end),
        })
    }

    fn parse_write_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.current_span();
        self.expect(Token::Write)?;
        let arg = self.parse_write_arg()?;
        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        Ok(Statement::Write {
            arg,
            span: start.merge(&end),
        })
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Statement> {
        let start = self.current_span();
        self.expect(Token::Return)?;
        let value = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        Ok(Statement::Return {
            value,
            span: start.merge(&end),
        })
    }

    fn parse_statements_until_any(&mut self, terminators: &[Token]) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.is_at_end() && !terminators.iter().any(|t| self.check(t)) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                    if self.is_at_end() || terminators.iter().any(|t| self.check(t)) {
                        break;
                    }
                }
            }
        }
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn distinguishes_call_from_assignment() {
        let mut parser = Parser::new("foo(1, 2);");
        let stmt = parser.parse_statement().unwrap();
        assert!(matches!(stmt, Statement::Call { .. }));

        let mut parser = Parser::new("x := 1;");
        let stmt = parser.parse_statement().unwrap();
        assert!(matches!(stmt, Statement::Assign { .. }));

        let mut parser = Parser::new("a[0] := 1;");
        let stmt = parser.parse_statement().unwrap();
        assert!(matches!(stmt, Statement::Assign { .. }));
    }

    #[test]
    fn if_without_else() {
        let mut parser = Parser::new("if true then x := 1; endif");
        let stmt = parser.parse_statement().unwrap();
        match stmt {
            Statement::If { else_branch, .. } => assert!(else_branch.is_none()),
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn return_without_expression() {
        let mut parser = Parser::new("return;");
        let stmt = parser.parse_statement().unwrap();
        match stmt {
            Statement::Return { value, .. } => assert!(value.is_none()),
            other => panic!("expected Return, got {other:?}"),
        }
    }
}
