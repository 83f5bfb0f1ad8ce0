//! The semantic oracle interface.
//!
//! The host compiler owns symbol and type resolution; the analyzer only
//! queries it. Every query is total: a failed or unanswerable lookup is
//! `None`/`false`, never an error. Handles are opaque and compare by
//! identity.

use std::fmt;

use crate::syntax::{NodeId, SyntaxNode};

/// Opaque handle for a program entity (field, property, method, parameter,
/// local, type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym#{}", self.0)
    }
}

/// Opaque handle for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ty#{}", self.0)
    }
}

/// Kind of a resolved symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Field,
    Property,
    Method,
    Parameter,
    Local,
    Type,
}

/// A compile-time constant value produced by the oracle's constant folder.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Str(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Null,
}

impl ConstValue {
    /// The string payload, if this is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Read-only semantic queries answered by the host.
///
/// Implementations must be safe for concurrent read-only use; the analyzer
/// never writes through this interface and may query it from parallel rule
/// invocations.
pub trait SemanticOracle: Sync {
    /// Resolve the symbol a node refers to (identifier reference,
    /// invocation target, declaration site).
    fn resolve_symbol(&self, node: SyntaxNode<'_>) -> Option<SymbolId>;

    /// Static type of an expression node.
    fn type_of(&self, node: SyntaxNode<'_>) -> Option<TypeId>;

    /// The type named by a type-syntax node (cast targets, `typeof`
    /// operands, pattern types).
    fn resolve_type(&self, node: SyntaxNode<'_>) -> Option<TypeId>;

    /// Constant-fold an expression: string literals, `nameof` expressions,
    /// references to `const` members.
    fn constant_value(&self, node: SyntaxNode<'_>) -> Option<ConstValue>;

    /// Whether a value of `from` is implicitly assignable to `to`.
    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool;

    fn symbol_kind(&self, symbol: SymbolId) -> Option<SymbolKind>;

    fn symbol_name(&self, symbol: SymbolId) -> Option<String>;

    /// Declared type of a field/property/parameter/local; return type of a
    /// method (the host's `void` type for void methods).
    fn symbol_type(&self, symbol: SymbolId) -> Option<TypeId>;

    fn containing_type(&self, symbol: SymbolId) -> Option<TypeId>;

    /// Parameter symbols of a method, in declaration order.
    fn parameters(&self, method: SymbolId) -> Vec<SymbolId>;

    /// The declaring syntax node of a symbol (variable declarator, property
    /// declaration, method declaration, parameter).
    fn declaration(&self, symbol: SymbolId) -> Option<NodeId>;

    /// Member symbols of a type, in declaration order.
    fn members(&self, ty: TypeId) -> Vec<SymbolId>;

    fn type_name(&self, ty: TypeId) -> Option<String>;

    fn is_static(&self, symbol: SymbolId) -> bool;

    fn is_readonly(&self, symbol: SymbolId) -> bool;

    fn is_interface(&self, ty: TypeId) -> bool;
}
