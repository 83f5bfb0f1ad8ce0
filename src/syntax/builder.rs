//! Construction API for [`SyntaxTree`].
//!
//! Hosts (and tests) build trees bottom-up: create leaves, then interior
//! nodes from already-created children. Every node is used as a child at
//! most once; `finish` seals the tree with its root.
//!
//! # Child layout conventions
//!
//! The predicate library and matchers rely on a fixed child layout per kind:
//!
//! - `ClassDeclaration`: `[IdentifierName, member*]`
//! - `FieldDeclaration`: `[type, VariableDeclarator]`
//! - `VariableDeclarator`: `[IdentifierName, EqualsValueClause?]`
//! - `PropertyDeclaration`: `[type, IdentifierName, AccessorList]`
//! - `GetAccessor` / `SetAccessor`: `[Block | expression]`
//! - `MethodDeclaration`: `[return-type, IdentifierName, ParameterList, Block | expression]`
//! - `Parameter`: `[type?, IdentifierName]`
//! - `InvocationExpression`: `[callee, ArgumentList]`
//! - `Argument`: `[NameColon?, expression]`; `NameColon`: `[IdentifierName]`
//! - `MemberAccessExpression`: `[expression, IdentifierName]`
//! - `ObjectCreationExpression`: `[type, ArgumentList?]`
//! - `TypeOfExpression`: `[type]`; `NameOfExpression`: `[expression]`
//! - `CastExpression`: `[type, expression]`; `AsExpression`: `[expression, type]`
//! - `IsPatternExpression`: `[expression, type | DeclarationPattern]`
//! - `DeclarationPattern`: `[type, IdentifierName]`
//! - `SwitchExpression`: `[expression, SwitchExpressionArm*]`
//! - `SwitchExpressionArm`: `[type | DeclarationPattern, expression]`
//! - lambdas: `[ParameterList, Block | expression]`

use super::tree::{NodeData, NodeId, Span, SyntaxTree};
use super::SyntaxKind;

/// Builder for an immutable [`SyntaxTree`].
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    pos: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            pos: 0,
        }
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    /// Create a leaf node carrying token text.
    pub fn leaf(&mut self, kind: SyntaxKind, text: impl Into<String>) -> NodeId {
        let text = text.into();
        let start = self.pos;
        let end = start + text.len().max(1);
        self.pos = end + 1;
        self.push(NodeData {
            kind,
            span: Span::new(start, end),
            parent: None,
            children: Vec::new(),
            text: Some(text),
        })
    }

    /// Create an interior node from already-created children.
    ///
    /// Panics if a child already has a parent; the tree must stay a tree.
    pub fn node(&mut self, kind: SyntaxKind, children: Vec<NodeId>) -> NodeId {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => Span::new(
                self.nodes[first.index()].span.start,
                self.nodes[last.index()].span.end,
            ),
            _ => {
                let start = self.pos;
                self.pos += 1;
                Span::new(start, start)
            }
        };
        let id = self.push(NodeData {
            kind,
            span,
            parent: None,
            children: children.clone(),
            text: None,
        });
        for child in children {
            let slot = &mut self.nodes[child.index()].parent;
            assert!(slot.is_none(), "node {} already has a parent", child);
            *slot = Some(id);
        }
        id
    }

    /// Seal the tree. Panics if `root` has a parent.
    pub fn finish(self, root: NodeId) -> SyntaxTree {
        assert!(
            self.nodes[root.index()].parent.is_none(),
            "root must not have a parent"
        );
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }

    // ---- leaves ----

    pub fn identifier(&mut self, name: impl Into<String>) -> NodeId {
        self.leaf(SyntaxKind::IdentifierName, name)
    }

    pub fn string_literal(&mut self, value: impl Into<String>) -> NodeId {
        self.leaf(SyntaxKind::StringLiteral, value)
    }

    pub fn numeric_literal(&mut self, text: impl Into<String>) -> NodeId {
        self.leaf(SyntaxKind::NumericLiteral, text)
    }

    pub fn predefined_type(&mut self, name: impl Into<String>) -> NodeId {
        self.leaf(SyntaxKind::PredefinedType, name)
    }

    // ---- expressions ----

    /// `target.name`
    pub fn member_access(&mut self, target: NodeId, name: impl Into<String>) -> NodeId {
        let name = self.identifier(name);
        self.node(SyntaxKind::MemberAccessExpression, vec![target, name])
    }

    /// `callee(args...)` where each arg is already an `Argument` node.
    pub fn invocation(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        let list = self.node(SyntaxKind::ArgumentList, args);
        self.node(SyntaxKind::InvocationExpression, vec![callee, list])
    }

    pub fn argument(&mut self, expr: NodeId) -> NodeId {
        self.node(SyntaxKind::Argument, vec![expr])
    }

    /// `label: expr`
    pub fn named_argument(&mut self, label: impl Into<String>, expr: NodeId) -> NodeId {
        let name = self.identifier(label);
        let colon = self.node(SyntaxKind::NameColon, vec![name]);
        self.node(SyntaxKind::Argument, vec![colon, expr])
    }

    /// `new type(args...)`
    pub fn object_creation(&mut self, type_node: NodeId, args: Vec<NodeId>) -> NodeId {
        let list = self.node(SyntaxKind::ArgumentList, args);
        self.node(SyntaxKind::ObjectCreationExpression, vec![type_node, list])
    }

    /// `typeof(type)`
    pub fn typeof_expr(&mut self, type_node: NodeId) -> NodeId {
        self.node(SyntaxKind::TypeOfExpression, vec![type_node])
    }

    /// `nameof(expr)`
    pub fn nameof_expr(&mut self, expr: NodeId) -> NodeId {
        self.node(SyntaxKind::NameOfExpression, vec![expr])
    }

    /// `(type)expr`
    pub fn cast(&mut self, type_node: NodeId, expr: NodeId) -> NodeId {
        self.node(SyntaxKind::CastExpression, vec![type_node, expr])
    }

    /// `expr as type`
    pub fn as_expr(&mut self, expr: NodeId, type_node: NodeId) -> NodeId {
        self.node(SyntaxKind::AsExpression, vec![expr, type_node])
    }

    /// `expr is pattern`
    pub fn is_pattern(&mut self, expr: NodeId, pattern: NodeId) -> NodeId {
        self.node(SyntaxKind::IsPatternExpression, vec![expr, pattern])
    }

    /// `type name` declaration pattern.
    pub fn declaration_pattern(&mut self, type_node: NodeId, name: impl Into<String>) -> NodeId {
        let name = self.identifier(name);
        self.node(SyntaxKind::DeclarationPattern, vec![type_node, name])
    }

    pub fn parenthesized(&mut self, expr: NodeId) -> NodeId {
        self.node(SyntaxKind::ParenthesizedExpression, vec![expr])
    }

    /// `lhs = rhs`
    pub fn assignment(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.node(SyntaxKind::AssignmentExpression, vec![lhs, rhs])
    }

    /// `(params...) => body`
    pub fn lambda(&mut self, params: Vec<NodeId>, body: NodeId) -> NodeId {
        let list = self.node(SyntaxKind::ParameterList, params);
        self.node(SyntaxKind::ParenthesizedLambdaExpression, vec![list, body])
    }

    // ---- statements ----

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::Block, statements)
    }

    pub fn return_statement(&mut self, expr: Option<NodeId>) -> NodeId {
        let children = expr.into_iter().collect();
        self.node(SyntaxKind::ReturnStatement, children)
    }

    pub fn expression_statement(&mut self, expr: NodeId) -> NodeId {
        self.node(SyntaxKind::ExpressionStatement, vec![expr])
    }

    /// `type name = init;`
    pub fn local_declaration(
        &mut self,
        type_node: NodeId,
        name: impl Into<String>,
        init: NodeId,
    ) -> NodeId {
        let declarator = self.variable_declarator(name, Some(init));
        self.node(
            SyntaxKind::LocalDeclarationStatement,
            vec![type_node, declarator],
        )
    }

    // ---- declarations ----

    pub fn variable_declarator(&mut self, name: impl Into<String>, init: Option<NodeId>) -> NodeId {
        let name = self.identifier(name);
        let mut children = vec![name];
        if let Some(init) = init {
            let clause = self.node(SyntaxKind::EqualsValueClause, vec![init]);
            children.push(clause);
        }
        self.node(SyntaxKind::VariableDeclarator, children)
    }

    /// `type name = init;` field member.
    pub fn field(
        &mut self,
        type_node: NodeId,
        name: impl Into<String>,
        init: Option<NodeId>,
    ) -> NodeId {
        let declarator = self.variable_declarator(name, init);
        self.node(SyntaxKind::FieldDeclaration, vec![type_node, declarator])
    }

    /// `type Name { get…; set…; }` property member. Accessor bodies may be
    /// blocks or bare expressions (expression-bodied accessors).
    pub fn property(
        &mut self,
        type_node: NodeId,
        name: impl Into<String>,
        getter: Option<NodeId>,
        setter: Option<NodeId>,
    ) -> NodeId {
        let name = self.identifier(name);
        let mut accessors = Vec::new();
        if let Some(body) = getter {
            accessors.push(self.node(SyntaxKind::GetAccessor, vec![body]));
        }
        if let Some(body) = setter {
            accessors.push(self.node(SyntaxKind::SetAccessor, vec![body]));
        }
        let list = self.node(SyntaxKind::AccessorList, accessors);
        self.node(SyntaxKind::PropertyDeclaration, vec![type_node, name, list])
    }

    /// `type Name { get; } = init;` get-only property with initializer.
    pub fn initialized_property(
        &mut self,
        type_node: NodeId,
        name: impl Into<String>,
        getter: Option<NodeId>,
        init: NodeId,
    ) -> NodeId {
        let name = self.identifier(name);
        let mut accessors = Vec::new();
        if let Some(body) = getter {
            accessors.push(self.node(SyntaxKind::GetAccessor, vec![body]));
        }
        let list = self.node(SyntaxKind::AccessorList, accessors);
        let clause = self.node(SyntaxKind::EqualsValueClause, vec![init]);
        self.node(
            SyntaxKind::PropertyDeclaration,
            vec![type_node, name, list, clause],
        )
    }

    /// `return-type Name(params...) body` method member.
    pub fn method(
        &mut self,
        return_type: NodeId,
        name: impl Into<String>,
        params: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let name = self.identifier(name);
        let list = self.node(SyntaxKind::ParameterList, params);
        self.node(
            SyntaxKind::MethodDeclaration,
            vec![return_type, name, list, body],
        )
    }

    /// `type name` parameter.
    pub fn parameter(&mut self, type_node: NodeId, name: impl Into<String>) -> NodeId {
        let name = self.identifier(name);
        self.node(SyntaxKind::Parameter, vec![type_node, name])
    }

    /// `class Name { members... }`
    pub fn class(&mut self, name: impl Into<String>, members: Vec<NodeId>) -> NodeId {
        let name = self.identifier(name);
        let mut children = vec![name];
        children.extend(members);
        self.node(SyntaxKind::ClassDeclaration, children)
    }

    pub fn compilation_unit(&mut self, members: Vec<NodeId>) -> NodeId {
        self.node(SyntaxKind::CompilationUnit, members)
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_shape() {
        let mut b = TreeBuilder::new();
        let target = b.identifier("DependencyProperty");
        let callee = b.member_access(target, "Register");
        let lit = b.string_literal("Bar");
        let arg = b.argument(lit);
        let call = b.invocation(callee, vec![arg]);
        let tree = b.finish(call);

        let root = tree.root();
        assert_eq!(root.kind(), SyntaxKind::InvocationExpression);
        let callee = root.child(0).unwrap();
        assert_eq!(callee.kind(), SyntaxKind::MemberAccessExpression);
        assert_eq!(callee.child(1).unwrap().text(), Some("Register"));
        let list = root.child(1).unwrap();
        assert_eq!(list.kind(), SyntaxKind::ArgumentList);
        assert_eq!(list.child_count(), 1);
    }

    #[test]
    fn test_named_argument_shape() {
        let mut b = TreeBuilder::new();
        let lit = b.string_literal("Bar");
        let arg = b.named_argument("name", lit);
        let tree = b.finish(arg);

        let arg = tree.root();
        assert_eq!(arg.child(0).unwrap().kind(), SyntaxKind::NameColon);
        assert_eq!(
            arg.child(0).unwrap().child(0).unwrap().text(),
            Some("name")
        );
        assert_eq!(arg.child(1).unwrap().kind(), SyntaxKind::StringLiteral);
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn test_reused_child_panics() {
        let mut b = TreeBuilder::new();
        let leaf = b.identifier("x");
        let _first = b.node(SyntaxKind::Block, vec![leaf]);
        let _second = b.node(SyntaxKind::Block, vec![leaf]);
    }
}
