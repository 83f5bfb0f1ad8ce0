//! Explicit in-memory semantic model.
//!
//! Hosts that lack native symbol infrastructure (and the test suite)
//! populate this model by hand: declare types and symbols, then bind syntax
//! nodes to them. The model never infers anything: it answers
//! [`SemanticOracle`] queries from what was declared, with a few literal
//! conveniences (string/numeric/bool literals and `nameof` fold without an
//! explicit binding when the predefined types are present).

use std::collections::HashMap;

use crate::syntax::{NodeId, SyntaxKind, SyntaxNode};

use super::oracle::{ConstValue, SemanticOracle, SymbolId, SymbolKind, TypeId};

#[derive(Debug, Clone)]
struct TypeData {
    name: String,
    base: Option<TypeId>,
    interfaces: Vec<TypeId>,
    is_interface: bool,
    members: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
struct SymbolData {
    name: String,
    kind: SymbolKind,
    ty: Option<TypeId>,
    containing: Option<TypeId>,
    parameters: Vec<SymbolId>,
    declaration: Option<NodeId>,
    is_static: bool,
    is_readonly: bool,
}

/// Host-populated implementation of [`SemanticOracle`].
#[derive(Debug, Default)]
pub struct SemanticModel {
    types: Vec<TypeData>,
    symbols: Vec<SymbolData>,
    type_names: HashMap<String, TypeId>,
    node_symbols: HashMap<NodeId, SymbolId>,
    node_types: HashMap<NodeId, TypeId>,
    constants: HashMap<NodeId, ConstValue>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- type declarations ----

    pub fn declare_type(&mut self, name: &str) -> TypeId {
        self.insert_type(name, false)
    }

    pub fn declare_interface(&mut self, name: &str) -> TypeId {
        self.insert_type(name, true)
    }

    fn insert_type(&mut self, name: &str, is_interface: bool) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(TypeData {
            name: name.to_string(),
            base: None,
            interfaces: Vec::new(),
            is_interface,
            members: Vec::new(),
        });
        self.type_names.insert(name.to_string(), id);
        id
    }

    pub fn set_base_type(&mut self, ty: TypeId, base: TypeId) {
        self.types[ty.0 as usize].base = Some(base);
    }

    pub fn add_interface(&mut self, ty: TypeId, iface: TypeId) {
        self.types[ty.0 as usize].interfaces.push(iface);
    }

    /// Look up a declared type by name.
    pub fn find_type(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name).copied()
    }

    // ---- symbol declarations ----

    pub fn declare_field(&mut self, containing: TypeId, name: &str, ty: TypeId) -> SymbolId {
        self.insert_symbol(SymbolKind::Field, name, Some(ty), Some(containing))
    }

    pub fn declare_property(&mut self, containing: TypeId, name: &str, ty: TypeId) -> SymbolId {
        self.insert_symbol(SymbolKind::Property, name, Some(ty), Some(containing))
    }

    /// Declare a method; `return_type` is the host's void type for void
    /// methods.
    pub fn declare_method(
        &mut self,
        containing: TypeId,
        name: &str,
        return_type: TypeId,
    ) -> SymbolId {
        self.insert_symbol(SymbolKind::Method, name, Some(return_type), Some(containing))
    }

    /// Declare a parameter and append it to `method`'s parameter list.
    pub fn declare_parameter(&mut self, method: SymbolId, name: &str, ty: TypeId) -> SymbolId {
        let param = self.insert_symbol(SymbolKind::Parameter, name, Some(ty), None);
        self.symbols[method.0 as usize].parameters.push(param);
        param
    }

    pub fn declare_local(&mut self, name: &str, ty: TypeId) -> SymbolId {
        self.insert_symbol(SymbolKind::Local, name, Some(ty), None)
    }

    fn insert_symbol(
        &mut self,
        kind: SymbolKind,
        name: &str,
        ty: Option<TypeId>,
        containing: Option<TypeId>,
    ) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(SymbolData {
            name: name.to_string(),
            kind,
            ty,
            containing,
            parameters: Vec::new(),
            declaration: None,
            is_static: false,
            is_readonly: false,
        });
        if let Some(containing) = containing {
            self.types[containing.0 as usize].members.push(id);
        }
        id
    }

    pub fn mark_static(&mut self, symbol: SymbolId) {
        self.symbols[symbol.0 as usize].is_static = true;
    }

    pub fn mark_readonly(&mut self, symbol: SymbolId) {
        self.symbols[symbol.0 as usize].is_readonly = true;
    }

    // ---- node bindings ----

    /// Record `node` as the declaring syntax of `symbol`. Also binds the
    /// node to the symbol so `resolve_symbol` works at the declaration.
    pub fn set_declaration(&mut self, symbol: SymbolId, node: NodeId) {
        self.symbols[symbol.0 as usize].declaration = Some(node);
        self.node_symbols.insert(node, symbol);
    }

    /// Bind a reference node (identifier, invocation, creation) to the
    /// symbol it resolves to.
    pub fn bind_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.node_symbols.insert(node, symbol);
    }

    /// Bind a node to a type: the expression's static type, or for type
    /// syntax, the type it names.
    pub fn bind_type(&mut self, node: NodeId, ty: TypeId) {
        self.node_types.insert(node, ty);
    }

    pub fn bind_constant(&mut self, node: NodeId, value: ConstValue) {
        self.constants.insert(node, value);
    }

    // ---- derived lookups ----

    fn assignable(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        // Walk the base chain and every interface reachable from it. The
        // chain is host-declared; a length cap guards malformed cycles.
        let mut current = Some(from);
        let mut hops = 0usize;
        while let Some(ty) = current {
            if hops > 64 {
                return false;
            }
            hops += 1;
            if ty == to {
                return true;
            }
            let data = &self.types[ty.0 as usize];
            for iface in &data.interfaces {
                if *iface == to || self.assignable(*iface, to) {
                    return true;
                }
            }
            current = data.base;
        }
        false
    }

    fn fold_nameof(&self, node: SyntaxNode<'_>) -> Option<ConstValue> {
        let operand = node.child(0)?;
        let name = match operand.kind() {
            SyntaxKind::IdentifierName => operand.text()?,
            SyntaxKind::MemberAccessExpression => operand.child(1)?.text()?,
            _ => return None,
        };
        Some(ConstValue::Str(name.to_string()))
    }
}

impl SemanticOracle for SemanticModel {
    fn resolve_symbol(&self, node: SyntaxNode<'_>) -> Option<SymbolId> {
        self.node_symbols.get(&node.id()).copied()
    }

    fn type_of(&self, node: SyntaxNode<'_>) -> Option<TypeId> {
        if let Some(ty) = self.node_types.get(&node.id()) {
            return Some(*ty);
        }
        match node.kind() {
            SyntaxKind::StringLiteral => self.find_type("string"),
            SyntaxKind::NumericLiteral => self.find_type("int"),
            SyntaxKind::BoolLiteral => self.find_type("bool"),
            SyntaxKind::CastExpression | SyntaxKind::ObjectCreationExpression => {
                self.resolve_type(node.child(0)?)
            }
            SyntaxKind::ParenthesizedExpression => self.type_of(node.child(0)?),
            _ => {
                let symbol = self.resolve_symbol(node)?;
                self.symbol_type(symbol)
            }
        }
    }

    fn resolve_type(&self, node: SyntaxNode<'_>) -> Option<TypeId> {
        if let Some(ty) = self.node_types.get(&node.id()) {
            return Some(*ty);
        }
        match node.kind() {
            SyntaxKind::IdentifierName
            | SyntaxKind::GenericName
            | SyntaxKind::PredefinedType => self.find_type(node.text()?),
            SyntaxKind::QualifiedName => self.resolve_type(node.child(1)?),
            _ => None,
        }
    }

    fn constant_value(&self, node: SyntaxNode<'_>) -> Option<ConstValue> {
        if let Some(value) = self.constants.get(&node.id()) {
            return Some(value.clone());
        }
        match node.kind() {
            SyntaxKind::StringLiteral => Some(ConstValue::Str(node.text()?.to_string())),
            SyntaxKind::NumericLiteral => node.text()?.parse().ok().map(ConstValue::Int),
            SyntaxKind::BoolLiteral => node.text()?.parse().ok().map(ConstValue::Bool),
            SyntaxKind::NullLiteral => Some(ConstValue::Null),
            SyntaxKind::NameOfExpression => self.fold_nameof(node),
            _ => None,
        }
    }

    fn is_assignable(&self, from: TypeId, to: TypeId) -> bool {
        if from.0 as usize >= self.types.len() || to.0 as usize >= self.types.len() {
            return false;
        }
        self.assignable(from, to)
    }

    fn symbol_kind(&self, symbol: SymbolId) -> Option<SymbolKind> {
        self.symbols.get(symbol.0 as usize).map(|s| s.kind)
    }

    fn symbol_name(&self, symbol: SymbolId) -> Option<String> {
        self.symbols.get(symbol.0 as usize).map(|s| s.name.clone())
    }

    fn symbol_type(&self, symbol: SymbolId) -> Option<TypeId> {
        self.symbols.get(symbol.0 as usize)?.ty
    }

    fn containing_type(&self, symbol: SymbolId) -> Option<TypeId> {
        self.symbols.get(symbol.0 as usize)?.containing
    }

    fn parameters(&self, method: SymbolId) -> Vec<SymbolId> {
        self.symbols
            .get(method.0 as usize)
            .map(|s| s.parameters.clone())
            .unwrap_or_default()
    }

    fn declaration(&self, symbol: SymbolId) -> Option<NodeId> {
        self.symbols.get(symbol.0 as usize)?.declaration
    }

    fn members(&self, ty: TypeId) -> Vec<SymbolId> {
        self.types
            .get(ty.0 as usize)
            .map(|t| t.members.clone())
            .unwrap_or_default()
    }

    fn type_name(&self, ty: TypeId) -> Option<String> {
        self.types.get(ty.0 as usize).map(|t| t.name.clone())
    }

    fn is_static(&self, symbol: SymbolId) -> bool {
        self.symbols
            .get(symbol.0 as usize)
            .map(|s| s.is_static)
            .unwrap_or(false)
    }

    fn is_readonly(&self, symbol: SymbolId) -> bool {
        self.symbols
            .get(symbol.0 as usize)
            .map(|s| s.is_readonly)
            .unwrap_or(false)
    }

    fn is_interface(&self, ty: TypeId) -> bool {
        self.types
            .get(ty.0 as usize)
            .map(|t| t.is_interface)
            .unwrap_or(false)
    }
}
