//! The three compiler passes, one module each (`spec.md` §4).

pub mod codegen;
pub mod symbols;
pub mod typecheck;

pub use codegen::CodeGenVisitor;
pub use symbols::SymbolsVisitor;
pub use typecheck::TypeCheckVisitor;
