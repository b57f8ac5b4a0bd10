//! Function signatures, parameters, types, and local declarations.

use super::Parser;
use crate::ast::{BasicType, Function, Param, TypeKind, TypeNode, VarDecl};
use crate::error::ParseResult;
use crate::token::Token;

impl<'a> Parser<'a> {
    pub(crate) fn parse_function(&mut self) -> ParseResult<Function> {
        let start = self.current_span();
        self.expect(Token::Func)?;
        let (name, name_span) = self.expect_ident()?;

        self.expect(Token::LParen)?;
        let params = if self.check(&Token::RParen) {
            Vec::new()
        } else {
            self.parse_param_list()?
        };
        self.expect(Token::RParen)?;

        let return_type = if self.matches(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let declarations = self.parse_declarations()?;
        let statements = self.parse_statements_until(&Token::EndFunc)?;
        let end = self.current_span();
        self.expect(Token::EndFunc)?;

        let id = self.ids.next();
        Ok(Function {
            id,
            name,
            name_span,
            params,
            return_type,
            declarations,
            statements,
            span: start.merge(&end),
        })
    }

    fn parse_param_list(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = vec![self.parse_param()?];
        while self.matches(&Token::Comma) {
            params.push(self.parse_param()?);
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let (name, name_span) = self.expect_ident()?;
        self.expect(Token::Colon)?;
        let ty = self.parse_type()?;
        let span = name_span.merge(&ty.span);
        Ok(Param { name, ty, span })
    }

    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeNode> {
        let start = self.current_span();
        if self.matches(&Token::Array) {
            self.expect(Token::LBracket)?;
            let size_span = self.current_span();
            let size = match self.current.as_ref().map(|t| t.token.clone()) {
                Some(Token::IntVal(text)) => {
                    self.advance();
                    text.parse::<u32>()
                        .map_err(|_| crate::error::ParseError::InvalidArraySize { span: size_span })?
                }
                _ => return Err(self.unexpected("array size")),
            };
            self.expect(Token::RBracket)?;
            self.expect(Token::Of)?;
            let basic = self.parse_basic_type()?;
            let end = self.current_span();
            let id = self.ids.next();
            return Ok(TypeNode {
                id,
                kind: TypeKind::Array(basic, size),
                span: start.merge(&end),
            });
        }

        let basic = self.parse_basic_type()?;
        let id = self.ids.next();
        Ok(TypeNode {
            id,
            kind: TypeKind::Basic(basic),
            span: start,
        })
    }

    fn parse_basic_type(&mut self) -> ParseResult<BasicType> {
        let span = self.current_span();
        let basic = match self.peek_token() {
            Some(Token::Int) => BasicType::Int,
            Some(Token::Float) => BasicType::Float,
            Some(Token::Bool) => BasicType::Bool,
            Some(Token::Char) => BasicType::Char,
            _ => return Err(self.unexpected("a type name")),
        };
        let _ = span;
        self.advance();
        Ok(basic)
    }

    fn parse_declarations(&mut self) -> ParseResult<Vec<VarDecl>> {
        let mut decls = Vec::new();
        while self.check(&Token::Var) {
            decls.push(self.parse_variable_decl()?);
        }
        Ok(decls)
    }

    fn parse_variable_decl(&mut self) -> ParseResult<VarDecl> {
        let start = self.current_span();
        self.expect(Token::Var)?;
        let mut names = vec![self.expect_ident()?];
        while self.matches(&Token::Comma) {
            names.push(self.expect_ident()?);
        }
        self.expect(Token::Colon)?;
        let ty = self.parse_type()?;
        let end = self.current_span();
        self.expect(Token::Semicolon)?;
        Ok(VarDecl {
            names,
            ty,
            span: start.merge(&end),
        })
    }
}
