//! Type interning and the type-predicate API (`spec.md` §3 "Types", §4.1).
//!
//! A [`TypeId`] is an opaque handle into [`TypesMgr`]'s arena. Constructing
//! the same structural type twice returns the same id, so structural
//! equality is id equality.

use std::collections::HashMap;

use asl_parser::ast::RelOp;
use serde::Serialize;

/// Opaque handle into [`TypesMgr`]'s arena.
pub type TypeId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    /// Sentinel injected at error sites to suppress cascading diagnostics.
    Error,
    /// Return type of procedures; legal only as a function return.
    Void,
    Integer,
    Float,
    Boolean,
    Character,
    /// Element type is always primitive; no nested arrays.
    Array { elem: TypeId, size: u32 },
    Function { params: Vec<TypeId>, ret: TypeId },
}

/// Interning pool for [`TypeKind`]s, plus the derived predicates every pass
/// queries by [`TypeId`].
#[derive(Debug)]
pub struct TypesMgr {
    kinds: Vec<TypeKind>,
    interned: HashMap<TypeKind, TypeId>,
    error: TypeId,
    void: TypeId,
    integer: TypeId,
    float: TypeId,
    boolean: TypeId,
    character: TypeId,
}

impl Default for TypesMgr {
    fn default() -> Self {
        Self::new()
    }
}

impl TypesMgr {
    /// Pre-interns `Error`, `Void`, and the four primitive kinds so callers
    /// never have to special-case their first use.
    pub fn new() -> Self {
        let mut mgr = Self {
            kinds: Vec::new(),
            interned: HashMap::new(),
            error: 0,
            void: 0,
            integer: 0,
            float: 0,
            boolean: 0,
            character: 0,
        };
        mgr.error = mgr.intern(TypeKind::Error);
        mgr.void = mgr.intern(TypeKind::Void);
        mgr.integer = mgr.intern(TypeKind::Integer);
        mgr.float = mgr.intern(TypeKind::Float);
        mgr.boolean = mgr.intern(TypeKind::Boolean);
        mgr.character = mgr.intern(TypeKind::Character);
        mgr
    }

    fn intern(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.interned.get(&kind) {
            return id;
        }
        let id = self.kinds.len() as TypeId;
        self.interned.insert(kind.clone(), id);
        self.kinds.push(kind);
        id
    }

    pub fn error(&self) -> TypeId {
        self.error
    }

    pub fn void(&self) -> TypeId {
        self.void
    }

    pub fn integer(&self) -> TypeId {
        self.integer
    }

    pub fn float(&self) -> TypeId {
        self.float
    }

    pub fn boolean(&self) -> TypeId {
        self.boolean
    }

    pub fn character(&self) -> TypeId {
        self.character
    }

    /// `elem` must already be a primitive `TypeId`; violating this is a
    /// programmer error (the parser/visitor only ever constructs array
    /// types over a `basic_type`).
    pub fn array(&mut self, elem: TypeId, size: u32) -> TypeId {
        debug_assert!(self.is_primitive(elem), "array element must be primitive");
        self.intern(TypeKind::Array { elem, size })
    }

    pub fn function(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(TypeKind::Function { params, ret })
    }

    fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id as usize]
    }

    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Error)
    }

    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Void)
    }

    pub fn is_primitive(&self, id: TypeId) -> bool {
        matches!(
            self.kind(id),
            TypeKind::Integer | TypeKind::Float | TypeKind::Boolean | TypeKind::Character
        )
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Integer | TypeKind::Float)
    }

    pub fn is_boolean(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Boolean)
    }

    pub fn is_character(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Character)
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Integer)
    }

    pub fn is_float(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Float)
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Array { .. })
    }

    pub fn is_function(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Function { .. })
    }

    pub fn array_elem(&self, id: TypeId) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Array { elem, .. } => Some(*elem),
            _ => None,
        }
    }

    pub fn array_size(&self, id: TypeId) -> Option<u32> {
        match self.kind(id) {
            TypeKind::Array { size, .. } => Some(*size),
            _ => None,
        }
    }

    pub fn func_params(&self, id: TypeId) -> Option<&[TypeId]> {
        match self.kind(id) {
            TypeKind::Function { params, .. } => Some(params),
            _ => None,
        }
    }

    pub fn func_return(&self, id: TypeId) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Function { ret, .. } => Some(*ret),
            _ => None,
        }
    }

    /// 1 for every primitive, the declared length for an array.
    pub fn size_of(&self, id: TypeId) -> u32 {
        match self.kind(id) {
            TypeKind::Array { size, .. } => *size,
            _ => 1,
        }
    }

    /// Structural equality; since kinds are hash-consed this is id equality.
    pub fn equal(&self, a: TypeId, b: TypeId) -> bool {
        a == b
    }

    /// Holds when `dst` may receive a value of type `src` by `:=`,
    /// parameter passing, or `return`.
    pub fn copyable(&self, dst: TypeId, src: TypeId) -> bool {
        if self.equal(dst, src) {
            return true;
        }
        if self.is_float(dst) && self.is_integer(src) {
            return true;
        }
        if let (TypeKind::Array { elem: de, size: ds }, TypeKind::Array { elem: se, size: ss }) =
            (self.kind(dst), self.kind(src))
        {
            return de == se && ds == ss;
        }
        false
    }

    /// Holds when `a op b` is a legal relational comparison.
    pub fn comparable(&self, a: TypeId, b: TypeId, op: RelOp) -> bool {
        match op {
            RelOp::Eq | RelOp::Neq => {
                (self.is_numeric(a) && self.is_numeric(b)) || (self.equal(a, b) && !self.is_numeric(a))
            }
            RelOp::Lt | RelOp::Leq | RelOp::Gt | RelOp::Geq => {
                self.is_numeric(a) && self.is_numeric(b)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_pre_interned_and_stable() {
        let mgr = TypesMgr::new();
        assert!(mgr.is_integer(mgr.integer()));
        assert!(mgr.is_float(mgr.float()));
        assert_ne!(mgr.integer(), mgr.float());
    }

    #[test]
    fn array_types_hash_cons() {
        let mut mgr = TypesMgr::new();
        let a1 = mgr.array(mgr.integer(), 4);
        let a2 = mgr.array(mgr.integer(), 4);
        let a3 = mgr.array(mgr.integer(), 5);
        assert_eq!(a1, a2);
        assert_ne!(a1, a3);
    }

    #[test]
    fn copyable_allows_integer_to_float_widening_only() {
        let mgr = TypesMgr::new();
        assert!(mgr.copyable(mgr.float(), mgr.integer()));
        assert!(!mgr.copyable(mgr.integer(), mgr.float()));
        assert!(mgr.copyable(mgr.integer(), mgr.integer()));
    }

    #[test]
    fn copyable_arrays_require_matching_elem_and_size() {
        let mut mgr = TypesMgr::new();
        let a4i = mgr.array(mgr.integer(), 4);
        let a5i = mgr.array(mgr.integer(), 5);
        let a4f = mgr.array(mgr.float(), 4);
        assert!(mgr.copyable(a4i, a4i));
        assert!(!mgr.copyable(a4i, a5i));
        assert!(!mgr.copyable(a4i, a4f));
    }

    #[test]
    fn comparable_equality_allows_numeric_mix_or_matching_non_numeric() {
        let mgr = TypesMgr::new();
        assert!(mgr.comparable(mgr.integer(), mgr.float(), RelOp::Eq));
        assert!(mgr.comparable(mgr.boolean(), mgr.boolean(), RelOp::Neq));
        assert!(!mgr.comparable(mgr.boolean(), mgr.character(), RelOp::Eq));
    }

    #[test]
    fn comparable_ordering_requires_numeric() {
        let mgr = TypesMgr::new();
        assert!(mgr.comparable(mgr.integer(), mgr.integer(), RelOp::Lt));
        assert!(!mgr.comparable(mgr.boolean(), mgr.boolean(), RelOp::Lt));
    }

    #[test]
    fn size_of_primitive_is_one_array_is_its_length() {
        let mut mgr = TypesMgr::new();
        let arr = mgr.array(mgr.integer(), 7);
        assert_eq!(mgr.size_of(mgr.integer()), 1);
        assert_eq!(mgr.size_of(arr), 7);
    }

    #[test]
    fn error_is_distinct_from_every_primitive() {
        let mgr = TypesMgr::new();
        assert!(mgr.is_error(mgr.error()));
        assert!(!mgr.is_error(mgr.integer()));
    }
}
