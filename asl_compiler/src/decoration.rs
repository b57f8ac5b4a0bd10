//! Sparse side table attaching `{scope?, type?, isLValue?}` to parse nodes
//! (`spec.md` §3 "Tree decorations").
//!
//! Keyed by [`NodeId`] rather than by parse-tree pointer: the parser builds
//! a typed AST directly (see `DESIGN.md`), so node identity is already a
//! dense integer and a side table over it is simpler than an arena of
//! `Rc`/`RefCell` nodes.

use std::collections::{BTreeMap, HashMap};

use asl_parser::ast::NodeId;
use serde::Serialize;

use crate::symtable::ScopeId;
use crate::types::TypeId;

#[derive(Debug, Default, Clone, Copy, Serialize)]
struct Entry {
    scope: Option<ScopeId>,
    ty: Option<TypeId>,
    is_lvalue: Option<bool>,
}

/// Mapping from parse-node identity to its decorations. Entries are only
/// ever added during passes 1–2 and read during pass 3; nothing is removed.
#[derive(Debug, Default)]
pub struct TreeDecoration {
    entries: HashMap<NodeId, Entry>,
}

impl TreeDecoration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attached to `program` and each `function`.
    pub fn set_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.entries.entry(node).or_default().scope = Some(scope);
    }

    pub fn scope(&self, node: NodeId) -> Option<ScopeId> {
        self.entries.get(&node).and_then(|e| e.scope)
    }

    /// Attached to every expression node, every `type`/`basic_type`/
    /// `array_type` node, and every `ident`/`left_expr`.
    pub fn set_type(&mut self, node: NodeId, ty: TypeId) {
        self.entries.entry(node).or_default().ty = Some(ty);
    }

    pub fn ty(&self, node: NodeId) -> Option<TypeId> {
        self.entries.get(&node).and_then(|e| e.ty)
    }

    /// Attached to every expression-level node.
    pub fn set_lvalue(&mut self, node: NodeId, is_lvalue: bool) {
        self.entries.entry(node).or_default().is_lvalue = Some(is_lvalue);
    }

    pub fn is_lvalue(&self, node: NodeId) -> Option<bool> {
        self.entries.get(&node).and_then(|e| e.is_lvalue)
    }

    /// Every decorated node keyed by id, in id order, for dumping alongside
    /// the AST (`aslc --decorated`). `scope`/`ty` are the raw interned ids;
    /// nothing here resolves a `TypeId` back to a human-readable name.
    pub fn as_json(&self) -> serde_json::Value {
        let sorted: BTreeMap<NodeId, Entry> = self.entries.iter().map(|(id, entry)| (*id, *entry)).collect();
        serde_json::to_value(sorted).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_independent_per_node() {
        let mut dec = TreeDecoration::new();
        dec.set_type(1, 7);
        dec.set_lvalue(1, true);
        dec.set_scope(2, 0);

        assert_eq!(dec.ty(1), Some(7));
        assert_eq!(dec.is_lvalue(1), Some(true));
        assert_eq!(dec.scope(1), None);
        assert_eq!(dec.scope(2), Some(0));
    }

    #[test]
    fn undecorated_node_reads_as_none() {
        let dec = TreeDecoration::new();
        assert_eq!(dec.ty(42), None);
    }

    #[test]
    fn as_json_includes_every_decorated_field() {
        let mut dec = TreeDecoration::new();
        dec.set_type(1, 7);
        dec.set_lvalue(1, true);
        dec.set_scope(2, 0);

        let json = dec.as_json();
        assert_eq!(json["1"]["ty"], 7);
        assert_eq!(json["1"]["is_lvalue"], true);
        assert_eq!(json["2"]["scope"], 0);
        assert!(json["2"]["ty"].is_null());
    }
}
