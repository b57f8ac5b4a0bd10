//! Pass 1: scope and symbol construction (`spec.md` §4.3).
//!
//! Walks the program once, building the global scope, one scope per
//! function, and the symbol entries for each function/parameter/variable.
//! Statements are not resolved here; that is [`super::typecheck`]'s job.

use asl_parser::ast::{BasicType, Function, Program, TypeKind as AstTypeKind, TypeNode, VarDecl};

use crate::error::{Diagnostics, SemError};
use crate::symtable::{SymTable, SymbolKind};
use crate::types::{TypeId, TypesMgr};

pub struct SymbolsVisitor<'a> {
    types: &'a mut TypesMgr,
    diags: &'a mut Diagnostics,
    max_array_size: u32,
}

impl<'a> SymbolsVisitor<'a> {
    pub fn new(types: &'a mut TypesMgr, diags: &'a mut Diagnostics) -> Self {
        Self {
            types,
            diags,
            max_array_size: crate::config::CompilerConfig::default().max_array_size,
        }
    }

    /// Overrides the array-size ceiling `resolve_type` enforces, taken from
    /// the caller's `CompilerConfig` instead of the default.
    pub fn with_max_array_size(mut self, max_array_size: u32) -> Self {
        self.max_array_size = max_array_size;
        self
    }

    pub fn run(&mut self, program: &Program, symtab: &mut SymTable, decoration: &mut crate::decoration::TreeDecoration) {
        decoration.set_scope(program.id, crate::symtable::GLOBAL_SCOPE);
        for function in &program.functions {
            self.visit_function(function, symtab, decoration);
        }
        if symtab.no_main_properly_declared(self.types) {
            self.diags.push(SemError::MissingMain { span: program.span });
        }
    }

    fn visit_function(&mut self, function: &Function, symtab: &mut SymTable, decoration: &mut crate::decoration::TreeDecoration) {
        let param_types: Vec<TypeId> = function
            .params
            .iter()
            .map(|p| self.resolve_type(&p.ty, decoration))
            .collect();
        let ret_type = match &function.return_type {
            Some(rt) => self.resolve_type(rt, decoration),
            None => self.types.void(),
        };
        let func_ty = self.types.function(param_types, ret_type);

        // The function binding lives in the scope that is current *before*
        // its own scope is pushed, i.e. global for every function in Asl.
        if symtab
            .add_symbol(&function.name, SymbolKind::Function, func_ty)
            .is_err()
        {
            self.diags.push(SemError::DuplicateFunction {
                name: function.name.clone(),
                span: function.name_span,
            });
        }

        let sid = symtab.push_new_scope();
        decoration.set_scope(function.id, sid);

        for param in &function.params {
            let ty = decoration.ty(param.ty.id).unwrap_or(self.types.error());
            if symtab
                .add_symbol(&param.name, SymbolKind::Parameter, ty)
                .is_err()
            {
                self.diags.push(SemError::DuplicateParameter {
                    name: param.name.clone(),
                    span: param.span,
                });
            }
        }

        for decl in &function.declarations {
            self.visit_declaration(decl, symtab, decoration);
        }

        symtab.pop_scope();
    }

    fn visit_declaration(&mut self, decl: &VarDecl, symtab: &mut SymTable, decoration: &mut crate::decoration::TreeDecoration) {
        let ty = self.resolve_type(&decl.ty, decoration);
        for (name, span) in &decl.names {
            if symtab.add_symbol(name, SymbolKind::Variable, ty).is_err() {
                self.diags.push(SemError::DuplicateVariable {
                    name: name.clone(),
                    span: *span,
                });
            }
        }
    }

    /// Interns the type named by a `type`/`basic_type`/`array_type` node and
    /// decorates it. Every array element here is already a [`BasicType`], so
    /// the "array element must be primitive" defensive check in `spec.md`
    /// §4.3 can never trip — the grammar makes the shape unrepresentable.
    fn resolve_type(&mut self, node: &TypeNode, decoration: &mut crate::decoration::TreeDecoration) -> TypeId {
        let ty = match &node.kind {
            AstTypeKind::Basic(basic) => self.basic_type_id(*basic),
            AstTypeKind::Array(basic, size) => {
                if *size > self.max_array_size {
                    self.diags.push(SemError::ArrayTooLarge {
                        size: *size,
                        max: self.max_array_size,
                        span: node.span,
                    });
                }
                let elem = self.basic_type_id(*basic);
                self.types.array(elem, *size)
            }
        };
        decoration.set_type(node.id, ty);
        ty
    }

    fn basic_type_id(&self, basic: BasicType) -> TypeId {
        match basic {
            BasicType::Int => self.types.integer(),
            BasicType::Float => self.types.float(),
            BasicType::Bool => self.types.boolean(),
            BasicType::Char => self.types.character(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoration::TreeDecoration;

    fn run(src: &str) -> (Diagnostics, SymTable, TypesMgr, TreeDecoration, Program) {
        let program = asl_parser::parse(src).expect("source should parse");
        let mut types = TypesMgr::new();
        let mut symtab = SymTable::new();
        let mut decoration = TreeDecoration::new();
        let mut diags = Diagnostics::new();
        SymbolsVisitor::new(&mut types, &mut diags).run(&program, &mut symtab, &mut decoration);
        (diags, symtab, types, decoration, program)
    }

    #[test]
    fn well_formed_main_produces_no_diagnostics() {
        let (diags, ..) = run("func main()\nendfunc");
        assert!(diags.is_empty());
    }

    #[test]
    fn missing_main_is_reported() {
        let (diags, ..) = run("func helper()\nendfunc");
        assert_eq!(diags.len(), 1);
        assert!(matches!(diags.errors()[0], SemError::MissingMain { .. }));
    }

    #[test]
    fn duplicate_function_names_are_reported() {
        let (diags, ..) = run("func main()\nendfunc\nfunc main()\nendfunc");
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::DuplicateFunction { name, .. } if name == "main")));
    }

    #[test]
    fn duplicate_variable_in_one_declaration_is_reported() {
        let (diags, ..) = run("func main()\nvar x,x: int;\nendfunc");
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::DuplicateVariable { name, .. } if name == "x")));
    }

    #[test]
    fn array_within_default_limit_is_accepted() {
        let (diags, ..) = run("func main()\nvar a: array[4] of int;\nendfunc");
        assert!(diags.is_empty());
    }

    #[test]
    fn array_over_a_configured_limit_is_reported() {
        let program = asl_parser::parse("func main()\nvar a: array[10] of int;\nendfunc").expect("source should parse");
        let mut types = TypesMgr::new();
        let mut symtab = SymTable::new();
        let mut decoration = TreeDecoration::new();
        let mut diags = Diagnostics::new();
        SymbolsVisitor::new(&mut types, &mut diags)
            .with_max_array_size(8)
            .run(&program, &mut symtab, &mut decoration);
        assert!(diags
            .errors()
            .iter()
            .any(|e| matches!(e, SemError::ArrayTooLarge { size: 10, max: 8, .. })));
    }

    #[test]
    fn parameters_and_variables_land_in_the_function_scope() {
        let (_, mut symtab, _, decoration, program) = run("func f(x: int)\nvar y: bool;\nendfunc");
        let sid = decoration.scope(program.functions[0].id).unwrap();
        symtab.push_this_scope(sid);
        assert!(symtab.find_in_current_scope("x").is_some());
        assert!(symtab.find_in_current_scope("y").is_some());
    }
}
