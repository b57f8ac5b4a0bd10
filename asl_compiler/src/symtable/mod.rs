//! Lexical scope stack (`spec.md` §3 "Symbols", §4.2).
//!
//! Scopes are persistent objects keyed by [`ScopeId`], stored in a flat
//! vector; children hold their parent's id rather than a back-pointer
//! (`spec.md` §9 "Parent/child references in scopes"). Passes 2 and 3
//! re-enter a function's scope with [`SymTable::push_this_scope`] using the
//! id pass 1 recorded on the `function` node, instead of recomputing
//! resolution.

use std::collections::HashMap;

use crate::types::{TypeId, TypesMgr};

pub type ScopeId = u32;

/// The scope every function symbol lives in; holds no variables of its own.
pub const GLOBAL_SCOPE: ScopeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub ty: TypeId,
}

#[derive(Debug, Default)]
struct Scope {
    parent: Option<ScopeId>,
    symbols: HashMap<String, Symbol>,
}

/// Stack of lexical scopes; binds names to (kind, type) entries.
#[derive(Debug)]
pub struct SymTable {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
}

impl Default for SymTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymTable {
    pub fn new() -> Self {
        let mut table = Self {
            scopes: vec![Scope::default()],
            stack: Vec::new(),
        };
        table.stack.push(GLOBAL_SCOPE);
        table
    }

    /// Opens a new scope whose parent is whatever scope is currently on top
    /// of the stack, pushes it, and returns its id so the caller can record
    /// it on the owning `function` node for later re-entry.
    pub fn push_new_scope(&mut self) -> ScopeId {
        let parent = self.stack.last().copied();
        let id = self.scopes.len() as ScopeId;
        self.scopes.push(Scope {
            parent,
            symbols: HashMap::new(),
        });
        self.stack.push(id);
        id
    }

    /// Re-enters a previously created scope (passes 2 and 3).
    pub fn push_this_scope(&mut self, sid: ScopeId) {
        self.stack.push(sid);
    }

    /// Caller must guarantee this is called on every exit path from a
    /// scope-owning node, including error-suppression paths (`spec.md` §5).
    pub fn pop_scope(&mut self) -> Option<ScopeId> {
        self.stack.pop()
    }

    pub fn current_scope(&self) -> ScopeId {
        *self.stack.last().expect("scope stack must never be empty")
    }

    /// `Err(())` on redeclaration within the same scope.
    pub fn add_symbol(&mut self, name: &str, kind: SymbolKind, ty: TypeId) -> Result<(), ()> {
        let sid = self.current_scope();
        let scope = &mut self.scopes[sid as usize];
        if scope.symbols.contains_key(name) {
            return Err(());
        }
        scope.symbols.insert(name.to_string(), Symbol { kind, ty });
        Ok(())
    }

    pub fn find_in_current_scope(&self, name: &str) -> Option<Symbol> {
        self.scopes[self.current_scope() as usize]
            .symbols
            .get(name)
            .copied()
    }

    /// Innermost enclosing definition of `name`, searching outward from the
    /// current scope to global.
    pub fn find_in_stack(&self, name: &str) -> Option<(ScopeId, Symbol)> {
        let mut sid = Some(self.current_scope());
        while let Some(id) = sid {
            let scope = &self.scopes[id as usize];
            if let Some(sym) = scope.symbols.get(name) {
                return Some((id, *sym));
            }
            sid = scope.parent;
        }
        None
    }

    pub fn is_function_class(&self, name: &str) -> bool {
        self.scopes[GLOBAL_SCOPE as usize]
            .symbols
            .get(name)
            .map(|s| s.kind == SymbolKind::Function)
            .unwrap_or(false)
    }

    pub fn is_parameter_class(&self, name: &str) -> bool {
        self.find_in_stack(name)
            .map(|(_, s)| s.kind == SymbolKind::Parameter)
            .unwrap_or(false)
    }

    /// True unless the global scope has exactly one function named `main`
    /// taking no parameters and returning nothing.
    pub fn no_main_properly_declared(&self, types: &TypesMgr) -> bool {
        let Some(sym) = self.scopes[GLOBAL_SCOPE as usize].symbols.get("main") else {
            return true;
        };
        if sym.kind != SymbolKind::Function {
            return true;
        }
        let Some(params) = types.func_params(sym.ty) else {
            return true;
        };
        if !params.is_empty() {
            return true;
        }
        match types.func_return(sym.ty) {
            Some(ret) => !types.is_void(ret),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypesMgr;

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut types = TypesMgr::new();
        let mut table = SymTable::new();
        table.push_new_scope();
        assert!(table
            .add_symbol("x", SymbolKind::Variable, types.integer())
            .is_ok());
        assert!(table
            .add_symbol("x", SymbolKind::Variable, types.integer())
            .is_err());
    }

    #[test]
    fn find_in_stack_sees_global_from_a_function_scope() {
        let mut types = TypesMgr::new();
        let mut table = SymTable::new();
        let ret = types.void();
        table
            .add_symbol("main", SymbolKind::Function, ret)
            .unwrap();
        table.push_new_scope();
        table
            .add_symbol("x", SymbolKind::Variable, types.integer())
            .unwrap();

        assert!(table.find_in_stack("x").is_some());
        let (sid, sym) = table.find_in_stack("main").unwrap();
        assert_eq!(sid, GLOBAL_SCOPE);
        assert_eq!(sym.kind, SymbolKind::Function);
    }

    #[test]
    fn push_this_scope_reenters_a_prior_scope() {
        let mut types = TypesMgr::new();
        let mut table = SymTable::new();
        let sid = table.push_new_scope();
        table
            .add_symbol("y", SymbolKind::Variable, types.integer())
            .unwrap();
        table.pop_scope();

        table.push_this_scope(sid);
        assert!(table.find_in_current_scope("y").is_some());
    }

    #[test]
    fn main_must_be_a_zero_arg_void_function() {
        let mut types = TypesMgr::new();
        let mut table = SymTable::new();
        assert!(table.no_main_properly_declared(&types));

        let ty = types.function(Vec::new(), types.void());
        table.add_symbol("main", SymbolKind::Function, ty).unwrap();
        assert!(!table.no_main_properly_declared(&types));
    }

    #[test]
    fn main_with_parameters_is_not_properly_declared() {
        let mut types = TypesMgr::new();
        let mut table = SymTable::new();
        let ty = types.function(vec![types.integer()], types.void());
        table.add_symbol("main", SymbolKind::Function, ty).unwrap();
        assert!(table.no_main_properly_declared(&types));
    }
}
