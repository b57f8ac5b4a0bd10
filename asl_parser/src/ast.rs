//! Typed abstract syntax tree for Asl.
//!
//! Every node that later passes attach a decoration to (see
//! `asl_compiler::decoration`) carries a [`NodeId`]: identifiers, left-hand
//! expressions, type annotations, every expression, and each function and
//! the program itself. Decorations live in a side table keyed by this id
//! rather than on the node, so the tree stays plain data.

use serde::Serialize;

use crate::span::Span;

/// Opaque identity for an AST node, used to key side-table decorations.
pub type NodeId = u32;

#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub id: NodeId,
    pub functions: Vec<Function>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub id: NodeId,
    pub name: String,
    pub name_span: Span,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub declarations: Vec<VarDecl>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct VarDecl {
    pub names: Vec<(String, Span)>,
    pub ty: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BasicType {
    Int,
    Float,
    Bool,
    Char,
}

#[derive(Debug, Clone, Serialize)]
pub enum TypeKind {
    Basic(BasicType),
    /// Element type and declared size.
    Array(BasicType, u32),
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeNode {
    pub id: NodeId,
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

/// The left-hand side of an assignment or `read`: a variable, or one
/// element of an array variable.
#[derive(Debug, Clone, Serialize)]
pub struct LeftExpr {
    pub id: NodeId,
    pub ident: Ident,
    pub index: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelOp {
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, Serialize)]
pub enum Expr {
    IntLit(NodeId, i64, Span),
    FloatLit(NodeId, f64, Span),
    CharLit(NodeId, char, Span),
    BoolLit(NodeId, bool, Span),
    Ident(Ident),
    ArrayAccess {
        id: NodeId,
        base: Ident,
        index: Box<Expr>,
        span: Span,
    },
    Unary {
        id: NodeId,
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Arithmetic {
        id: NodeId,
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Relational {
        id: NodeId,
        op: RelOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Logical {
        id: NodeId,
        op: LogicOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Paren {
        id: NodeId,
        inner: Box<Expr>,
        span: Span,
    },
    Call {
        id: NodeId,
        ident: Ident,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::IntLit(id, ..)
            | Expr::FloatLit(id, ..)
            | Expr::CharLit(id, ..)
            | Expr::BoolLit(id, ..) => *id,
            Expr::Ident(ident) => ident.id,
            Expr::ArrayAccess { id, .. }
            | Expr::Unary { id, .. }
            | Expr::Arithmetic { id, .. }
            | Expr::Relational { id, .. }
            | Expr::Logical { id, .. }
            | Expr::Paren { id, .. }
            | Expr::Call { id, .. } => *id,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit(_, _, span)
            | Expr::FloatLit(_, _, span)
            | Expr::CharLit(_, _, span)
            | Expr::BoolLit(_, _, span) => *span,
            Expr::Ident(ident) => ident.span,
            Expr::ArrayAccess { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Arithmetic { span, .. }
            | Expr::Relational { span, .. }
            | Expr::Logical { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }
}

/// The argument to a `write` statement: either a general expression or a
/// bare string literal, which ASL treats as a distinct grammar production
/// rather than a string-typed expression (see `write` in the language
/// glossary).
#[derive(Debug, Clone, Serialize)]
pub enum WriteArg {
    Expr(Expr),
    Str(String, Span),
}

#[derive(Debug, Clone, Serialize)]
pub enum Statement {
    Assign {
        target: LeftExpr,
        value: Expr,
        span: Span,
    },
    If {
        cond: Expr,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Vec<Statement>,
        span: Span,
    },
    Call {
        id: NodeId,
        ident: Ident,
        args: Vec<Expr>,
        span: Span,
    },
    Read {
        target: LeftExpr,
        span: Span,
    },
    Write {
        arg: WriteArg,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Assign { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::Call { span, .. }
            | Statement::Read { span, .. }
            | Statement::Write { span, .. }
            | Statement::Return { span, .. } => *span,
        }
    }
}

/// Monotonic id generator shared by a single parse.
#[derive(Debug, Default)]
pub struct NodeIdGen(NodeId);

impl NodeIdGen {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> NodeId {
        let id = self.0;
        self.0 += 1;
        id
    }
}
