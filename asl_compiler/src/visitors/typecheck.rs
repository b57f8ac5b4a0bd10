//! Pass 2: type checking and decoration (`spec.md` §4.4).
//!
//! Computes a type and an l-value flag for every expression node and
//! records both in the shared [`TreeDecoration`]. The `Error` type is a
//! sentinel: once an expression's own type rule fails, or one of its
//! operands is already `Error`, the node itself becomes `Error` and no
//! further diagnostic is raised about it — this is what keeps one bad
//! sub-expression from producing a cascade of messages.

use asl_parser::ast::{ArithOp, Expr, Function, Ident, LeftExpr, Program, RelOp, Statement, WriteArg};
use asl_parser::span::Span;

use crate::decoration::TreeDecoration;
use crate::error::{Diagnostics, SemError};
use crate::symtable::{SymTable, SymbolKind};
use crate::types::{TypeId, TypesMgr};

pub struct TypeCheckVisitor<'a> {
    types: &'a mut TypesMgr,
    diags: &'a mut Diagnostics,
    current_return: TypeId,
}

impl<'a> TypeCheckVisitor<'a> {
    pub fn new(types: &'a mut TypesMgr, diags: &'a mut Diagnostics) -> Self {
        let void = types.void();
        Self {
            types,
            diags,
            current_return: void,
        }
    }

    pub fn run(&mut self, program: &Program, symtab: &mut SymTable, decoration: &mut TreeDecoration) {
        for function in &program.functions {
            self.visit_function(function, symtab, decoration);
        }
    }

    fn visit_function(&mut self, function: &Function, symtab: &mut SymTable, decoration: &mut TreeDecoration) {
        let sid = decoration
            .scope(function.id)
            .expect("pass 1 records a scope on every function");
        symtab.push_this_scope(sid);

        self.current_return = match &function.return_type {
            Some(rt) => decoration.ty(rt.id).unwrap_or_else(|| self.types.error()),
            None => self.types.void(),
        };

        for stmt in &function.statements {
            self.visit_statement(stmt, symtab, decoration);
        }

        symtab.pop_scope();
    }

    fn visit_statement(&mut self, stmt: &Statement, symtab: &mut SymTable, decoration: &mut TreeDecoration) {
        match stmt {
            Statement::Assign { target, value, span } => {
                let (lty, lvalue) = self.visit_left_expr(target, symtab, decoration);
                let (vty, _) = self.visit_expr(value, symtab, decoration);
                if self.types.is_void(vty) {
                    self.diags.push(SemError::VoidValueUsed { span: value.span() });
                } else if !self.types.is_error(lty)
                    && !self.types.is_error(vty)
                    && !self.types.copyable(lty, vty)
                {
                    self.diags
                        .push(SemError::IncompatibleAssignment { span: *span });
                }
                if !self.types.is_error(lty) && !lvalue {
                    self.diags.push(SemError::NonLvalue { span: target.span });
                }
            }
            Statement::If {
                cond,
                then_branch,
                else_branch,
                span,
            } => {
                self.check_condition(cond, symtab, decoration, *span);
                for s in then_branch {
                    self.visit_statement(s, symtab, decoration);
                }
                if let Some(else_branch) = else_branch {
                    for s in else_branch {
                        self.visit_statement(s, symtab, decoration);
                    }
                }
            }
            Statement::While { cond, body, span } => {
                self.check_condition(cond, symtab, decoration, *span);
                for s in body {
                    self.visit_statement(s, symtab, decoration);
                }
            }
            Statement::Call { ident, args, span, .. } => {
                self.check_call(ident, args, *span, symtab, decoration);
            }
            Statement::Read { target, span } => {
                let (lty, lvalue) = self.visit_left_expr(target, symtab, decoration);
                if !self.types.is_error(lty) && !self.types.is_primitive(lty) {
                    self.diags
                        .push(SemError::NonPrimitiveReadWrite { span: *span });
                }
                if !self.types.is_error(lty) && !lvalue {
                    self.diags.push(SemError::NonLvalue { span: *span });
                }
            }
            Statement::Write { arg, span } => match arg {
                WriteArg::Expr(expr) => {
                    let (ty, _) = self.visit_expr(expr, symtab, decoration);
                    if !self.types.is_error(ty) && !self.types.is_primitive(ty) {
                        self.diags
                            .push(SemError::NonPrimitiveReadWrite { span: *span });
                    }
                }
                WriteArg::Str(..) => {}
            },
            Statement::Return { value, span } => {
                let ty = match value {
                    Some(expr) => self.visit_expr(expr, symtab, decoration).0,
                    None => self.types.void(),
                };
                if !self.types.is_error(ty)
                    && !self.types.is_error(self.current_return)
                    && !self.types.copyable(self.current_return, ty)
                {
                    self.diags.push(SemError::IncompatibleReturn { span: *span });
                }
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr, symtab: &mut SymTable, decoration: &mut TreeDecoration, span: Span) {
        let (ty, _) = self.visit_expr(cond, symtab, decoration);
        if !self.types.is_error(ty) && !self.types.is_boolean(ty) {
            self.diags.push(SemError::NonBooleanCondition { span });
        }
    }

    /// Resolves `ident` as a plain identifier reference: an undeclared name
    /// becomes `Error`/non-lvalue; otherwise the l-value flag is true unless
    /// the binding is a function (`spec.md` §4.4, "identifier").
    fn visit_ident_ref(&mut self, ident: &Ident, symtab: &SymTable, decoration: &mut TreeDecoration) -> (TypeId, bool) {
        let (ty, lvalue) = match symtab.find_in_stack(&ident.name) {
            None => {
                self.diags.push(SemError::UndeclaredIdentifier {
                    name: ident.name.clone(),
                    span: ident.span,
                });
                (self.types.error(), false)
            }
            Some((_, sym)) => (sym.ty, sym.kind != SymbolKind::Function),
        };
        decoration.set_type(ident.id, ty);
        decoration.set_lvalue(ident.id, lvalue);
        (ty, lvalue)
    }

    fn visit_left_expr(&mut self, target: &LeftExpr, symtab: &mut SymTable, decoration: &mut TreeDecoration) -> (TypeId, bool) {
        let (ident_ty, ident_lvalue) = self.visit_ident_ref(&target.ident, symtab, decoration);
        let ty = match &target.index {
            None => ident_ty,
            Some(index) => {
                let mut array_err = self.types.is_error(ident_ty);
                if !array_err && !self.types.is_array(ident_ty) {
                    self.diags
                        .push(SemError::NonArrayIndexed { span: target.span });
                    array_err = true;
                }
                let (ity, _) = self.visit_expr(index, symtab, decoration);
                if !self.types.is_error(ity) && !self.types.is_integer(ity) {
                    self.diags
                        .push(SemError::NonIntegerIndex { span: index.span() });
                }
                if array_err {
                    self.types.error()
                } else {
                    self.types.array_elem(ident_ty).expect("checked is_array above")
                }
            }
        };
        decoration.set_type(target.id, ty);
        decoration.set_lvalue(target.id, ident_lvalue);
        (ty, ident_lvalue)
    }

    /// Shared by the statement-form `f(args);` and the expression-form
    /// `f(args)`: resolves `ident`, checks arity and argument compatibility,
    /// and returns the callee's raw return type (which may be `Void` — it
    /// is the *caller* context's job to reject `Void` used as a value, per
    /// `spec.md` §4.4's note on function-expressions).
    fn check_call(&mut self, ident: &Ident, args: &[Expr], span: Span, symtab: &mut SymTable, decoration: &mut TreeDecoration) -> TypeId {
        let (callee_ty, _) = self.visit_ident_ref(ident, symtab, decoration);

        if self.types.is_error(callee_ty) {
            for arg in args {
                self.visit_expr(arg, symtab, decoration);
            }
            return self.types.error();
        }
        if !self.types.is_function(callee_ty) {
            self.diags.push(SemError::NonCallable {
                name: ident.name.clone(),
                span: ident.span,
            });
            for arg in args {
                self.visit_expr(arg, symtab, decoration);
            }
            return self.types.error();
        }

        let params: Vec<TypeId> = self.types.func_params(callee_ty).unwrap().to_vec();
        let ret = self.types.func_return(callee_ty).unwrap();

        if args.len() != params.len() {
            self.diags.push(SemError::WrongArity {
                name: ident.name.clone(),
                expected: params.len(),
                found: args.len(),
                span,
            });
        }
        for (i, arg) in args.iter().enumerate() {
            let (aty, _) = self.visit_expr(arg, symtab, decoration);
            if let Some(&ptype) = params.get(i) {
                if !self.types.is_error(aty) && !self.types.copyable(ptype, aty) {
                    self.diags.push(SemError::IncompatibleArgument {
                        index: i,
                        span: arg.span(),
                    });
                }
            }
        }
        ret
    }

    fn visit_expr(&mut self, expr: &Expr, symtab: &mut SymTable, decoration: &mut TreeDecoration) -> (TypeId, bool) {
        match expr {
            Expr::IntLit(id, _, _) => self.literal(*id, self.types.integer(), decoration),
            Expr::FloatLit(id, _, _) => self.literal(*id, self.types.float(), decoration),
            Expr::CharLit(id, _, _) => self.literal(*id, self.types.character(), decoration),
            Expr::BoolLit(id, _, _) => self.literal(*id, self.types.boolean(), decoration),
            Expr::Ident(ident) => self.visit_ident_ref(ident, symtab, decoration),
            Expr::ArrayAccess { id, base, index, span } => {
                let (base_ty, _) = self.visit_ident_ref(base, symtab, decoration);
                let mut err = self.types.is_error(base_ty);
                if !err && !self.types.is_array(base_ty) {
                    self.diags.push(SemError::NonArrayIndexed { span: *span });
                    err = true;
                }
                let (ity, _) = self.visit_expr(index, symtab, decoration);
                if !self.types.is_error(ity) && !self.types.is_integer(ity) {
                    self.diags
                        .push(SemError::NonIntegerIndex { span: index.span() });
                }
                let ty = if err {
                    self.types.error()
                } else {
                    self.types.array_elem(base_ty).expect("checked is_array above")
                };
                decoration.set_type(*id, ty);
                decoration.set_lvalue(*id, false);
                (ty, false)
            }
            Expr::Unary { id, op, operand, span } => {
                use asl_parser::ast::UnaryOp;
                let (oty, _) = self.visit_expr(operand, symtab, decoration);
                let ty = if self.types.is_error(oty) {
                    self.types.error()
                } else {
                    match op {
                        UnaryOp::Not => {
                            if self.types.is_boolean(oty) {
                                self.types.boolean()
                            } else {
                                self.diags.push(SemError::NonBooleanOperand { span: *span });
                                self.types.error()
                            }
                        }
                        UnaryOp::Plus | UnaryOp::Neg => {
                            if self.types.is_numeric(oty) {
                                oty
                            } else {
                                self.diags
                                    .push(SemError::NonNumericArithmetic { span: *span });
                                self.types.error()
                            }
                        }
                    }
                };
                decoration.set_type(*id, ty);
                decoration.set_lvalue(*id, false);
                (ty, false)
            }
            Expr::Arithmetic { id, op, lhs, rhs, span } => {
                let (lt, _) = self.visit_expr(lhs, symtab, decoration);
                let (rt, _) = self.visit_expr(rhs, symtab, decoration);
                let ty = if self.types.is_error(lt) || self.types.is_error(rt) {
                    self.types.error()
                } else if !self.types.is_numeric(lt) || !self.types.is_numeric(rt) {
                    self.diags
                        .push(SemError::NonNumericArithmetic { span: *span });
                    self.types.error()
                } else if *op == ArithOp::Mod && !self.types.equal(lt, rt) {
                    self.diags.push(SemError::CrossTypeModulo { span: *span });
                    self.types.error()
                } else if self.types.is_float(lt) || self.types.is_float(rt) {
                    self.types.float()
                } else {
                    self.types.integer()
                };
                decoration.set_type(*id, ty);
                decoration.set_lvalue(*id, false);
                (ty, false)
            }
            Expr::Relational { id, op, lhs, rhs, span } => {
                let (lt, _) = self.visit_expr(lhs, symtab, decoration);
                let (rt, _) = self.visit_expr(rhs, symtab, decoration);
                let rel_op: RelOp = *op;
                let ty = if self.types.is_error(lt) || self.types.is_error(rt) {
                    self.types.error()
                } else if !self.types.comparable(lt, rt, rel_op) {
                    self.diags.push(SemError::NonComparable { span: *span });
                    self.types.error()
                } else {
                    self.types.boolean()
                };
                decoration.set_type(*id, ty);
                decoration.set_lvalue(*id, false);
                (ty, false)
            }
            Expr::Logical { id, lhs, rhs, span, .. } => {
                let (lt, _) = self.visit_expr(lhs, symtab, decoration);
                let (rt, _) = self.visit_expr(rhs, symtab, decoration);
                let ty = if self.types.is_error(lt) || self.types.is_error(rt) {
                    self.types.error()
                } else if !self.types.is_boolean(lt) || !self.types.is_boolean(rt) {
                    self.diags.push(SemError::NonBooleanOperand { span: *span });
                    self.types.error()
                } else {
                    self.types.boolean()
                };
                decoration.set_type(*id, ty);
                decoration.set_lvalue(*id, false);
                (ty, false)
            }
            Expr::Paren { id, inner, .. } => {
                let (ty, lvalue) = self.visit_expr(inner, symtab, decoration);
                decoration.set_type(*id, ty);
                decoration.set_lvalue(*id, lvalue);
                (ty, lvalue)
            }
            Expr::Call { id, ident, args, span } => {
                let ty = self.check_call(ident, args, *span, symtab, decoration);
                decoration.set_type(*id, ty);
                decoration.set_lvalue(*id, false);
                (ty, false)
            }
        }
    }

    fn literal(&mut self, id: asl_parser::ast::NodeId, ty: TypeId, decoration: &mut TreeDecoration) -> (TypeId, bool) {
        decoration.set_type(id, ty);
        decoration.set_lvalue(id, false);
        (ty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtable::SymTable;

    fn check(src: &str) -> Diagnostics {
        let program = asl_parser::parse(src).expect("source should parse");
        let mut types = TypesMgr::new();
        let mut symtab = SymTable::new();
        let mut decoration = TreeDecoration::new();
        let mut diags = Diagnostics::new();
        crate::visitors::symbols::SymbolsVisitor::new(&mut types, &mut diags).run(&program, &mut symtab, &mut decoration);
        TypeCheckVisitor::new(&mut types, &mut diags).run(&program, &mut symtab, &mut decoration);
        diags
    }

    #[test]
    fn integer_widens_to_float_on_assignment() {
        let diags = check("func main()\nvar x: float;\nvar y: int;\nx := y;\nendfunc");
        assert!(diags.is_empty());
    }

    #[test]
    fn assigning_float_to_integer_is_rejected() {
        let diags = check("func main()\nvar x: int;\nvar y: float;\nx := y;\nendfunc");
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::IncompatibleAssignment { .. })));
    }

    #[test]
    fn cross_type_modulo_is_rejected() {
        let diags = check("func main()\nvar a: int;\nvar b: float;\na := a % b;\nendfunc");
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::CrossTypeModulo { .. })));
    }

    #[test]
    fn undeclared_identifier_in_condition_does_not_cascade() {
        let diags = check("func main()\nif foo then\nendif\nendfunc");
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags.errors()[0], SemError::UndeclaredIdentifier { .. }));
    }

    #[test]
    fn non_boolean_condition_is_rejected() {
        let diags = check("func main()\nvar x: int;\nif x then\nendif\nendfunc");
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::NonBooleanCondition { .. })));
    }

    #[test]
    fn array_whole_copy_requires_matching_element_and_size() {
        let diags = check("func main()\nvar a,b: array[4] of int;\na := b;\nendfunc");
        assert!(diags.is_empty());
    }

    #[test]
    fn wrong_arity_call_is_rejected() {
        let diags = check("func f(x: int)\nendfunc\nfunc main()\nf();\nendfunc");
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::WrongArity { .. })));
    }

    #[test]
    fn assigning_a_void_call_result_is_rejected() {
        let diags = check("func f()\nendfunc\nfunc main()\nvar x: int;\nx := f();\nendfunc");
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::VoidValueUsed { .. })));
    }

    #[test]
    fn assigning_to_a_function_name_is_non_lvalue() {
        let diags = check("func f()\nendfunc\nfunc main()\nf := 1;\nendfunc");
        assert!(diags.errors().iter().any(|e| matches!(e, SemError::NonLvalue { .. })));
    }
}
