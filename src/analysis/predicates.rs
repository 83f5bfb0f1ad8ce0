//! Stateless syntax predicates.
//!
//! Pure functions over tree nodes. None of these consult the oracle and
//! none can fail: absent structure is a negative result. They fire on
//! nearly every node visited, so the non-match path allocates nothing.

use crate::syntax::{SyntaxKind, SyntaxNode};

/// Unwrap any number of parenthesized layers.
pub fn strip_parens<'t>(node: SyntaxNode<'t>) -> SyntaxNode<'t> {
    let mut current = node;
    while current.kind() == SyntaxKind::ParenthesizedExpression {
        match current.child(0) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// The simple name an invocation calls: `Foo(...)` or `x.Foo(...)` → `Foo`.
pub fn invocation_target_name<'t>(node: SyntaxNode<'t>) -> Option<&'t str> {
    if node.kind() != SyntaxKind::InvocationExpression {
        return None;
    }
    let callee = node.child(0)?;
    match callee.kind() {
        SyntaxKind::IdentifierName => callee.text(),
        SyntaxKind::MemberAccessExpression => member_access_name(callee),
        _ => None,
    }
}

/// The receiver expression of an invocation through a member access:
/// `x.Foo(...)` → `x`. `None` for bare calls.
pub fn invocation_receiver<'t>(node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    if node.kind() != SyntaxKind::InvocationExpression {
        return None;
    }
    let callee = node.child(0)?;
    if callee.kind() == SyntaxKind::MemberAccessExpression {
        callee.child(0)
    } else {
        None
    }
}

/// Check for an invocation of `name`, optionally with an exact argument
/// count.
pub fn is_invocation_named(node: SyntaxNode<'_>, name: &str, arg_count: Option<usize>) -> bool {
    match invocation_target_name(node) {
        Some(target) if target == name => match arg_count {
            Some(count) => arguments(node).count() == count,
            None => true,
        },
        _ => false,
    }
}

/// The argument list of an invocation or object creation.
pub fn argument_list<'t>(node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    match node.kind() {
        SyntaxKind::InvocationExpression | SyntaxKind::ObjectCreationExpression => {
            node.first_child_of_kind(SyntaxKind::ArgumentList)
        }
        _ => None,
    }
}

/// Arguments of an invocation or object creation, in source order.
pub fn arguments<'t>(node: SyntaxNode<'t>) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
    argument_list(node)
        .into_iter()
        .flat_map(|list| list.children_of_kind(SyntaxKind::Argument))
}

/// The expression of an argument, skipping a `name:` label if present.
pub fn argument_expression<'t>(arg: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    if arg.kind() != SyntaxKind::Argument {
        return None;
    }
    arg.children().find(|c| c.kind() != SyntaxKind::NameColon)
}

/// The `name:` label of an argument, if the call site used one.
pub fn argument_label<'t>(arg: SyntaxNode<'t>) -> Option<&'t str> {
    if arg.kind() != SyntaxKind::Argument {
        return None;
    }
    arg.first_child_of_kind(SyntaxKind::NameColon)?
        .child(0)?
        .text()
}

/// Check that `candidate` is exactly the concatenation of `parts`, in
/// order, case-sensitive, no separators: `("SetFoo", ["Set", "Foo"])`.
pub fn is_parts_name(candidate: &str, parts: &[&str]) -> bool {
    if parts.is_empty() {
        return false;
    }
    let mut rest = candidate;
    for part in parts {
        rest = match rest.strip_prefix(part) {
            Some(rest) => rest,
            None => return false,
        };
    }
    rest.is_empty()
}

/// Check for a `nameof(...)` expression.
pub fn is_nameof(node: SyntaxNode<'_>) -> bool {
    node.kind() == SyntaxKind::NameOfExpression
}

/// The name a `nameof(...)` expression evaluates to: the final identifier
/// of its operand. Purely syntactic; the oracle's constant folder gives
/// the same answer through resolution.
pub fn nameof_value<'t>(node: SyntaxNode<'t>) -> Option<&'t str> {
    if node.kind() != SyntaxKind::NameOfExpression {
        return None;
    }
    let operand = node.child(0)?;
    match operand.kind() {
        SyntaxKind::IdentifierName => operand.text(),
        SyntaxKind::MemberAccessExpression => member_access_name(operand),
        _ => None,
    }
}

/// The type-syntax operand of a `typeof(...)` expression.
pub fn typeof_operand<'t>(node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    if node.kind() != SyntaxKind::TypeOfExpression {
        return None;
    }
    let operand = node.child(0)?;
    operand.kind().is_type_name().then_some(operand)
}

/// The member name of `target.name`.
pub fn member_access_name<'t>(node: SyntaxNode<'t>) -> Option<&'t str> {
    if node.kind() != SyntaxKind::MemberAccessExpression {
        return None;
    }
    node.child(1)?.text()
}

/// The receiver of `target.name`.
pub fn member_access_target<'t>(node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    if node.kind() != SyntaxKind::MemberAccessExpression {
        return None;
    }
    node.child(0)
}

/// The string payload of a string-literal node.
pub fn string_literal_value<'t>(node: SyntaxNode<'t>) -> Option<&'t str> {
    if node.kind() != SyntaxKind::StringLiteral {
        return None;
    }
    node.text()
}

/// The simple name of a type-syntax node (`Foo`, `Foo<T>`, `A.B.Foo` → the
/// final identifier).
pub fn type_name_identifier<'t>(node: SyntaxNode<'t>) -> Option<&'t str> {
    match node.kind() {
        SyntaxKind::IdentifierName | SyntaxKind::GenericName | SyntaxKind::PredefinedType => {
            node.text()
        }
        SyntaxKind::QualifiedName => node.child(1)?.text(),
        _ => None,
    }
}

/// The name of a declared member (field declarator, property, method,
/// parameter, class).
pub fn declared_name<'t>(node: SyntaxNode<'t>) -> Option<&'t str> {
    match node.kind() {
        SyntaxKind::VariableDeclarator | SyntaxKind::ClassDeclaration => node.child(0)?.text(),
        SyntaxKind::FieldDeclaration | SyntaxKind::LocalDeclarationStatement => {
            declared_name(node.first_child_of_kind(SyntaxKind::VariableDeclarator)?)
        }
        // Name is the second child; the leading type node may itself be an
        // identifier.
        SyntaxKind::PropertyDeclaration | SyntaxKind::MethodDeclaration => node.child(1)?.text(),
        SyntaxKind::Parameter => node
            .child(node.child_count().saturating_sub(1))?
            .text(),
        _ => None,
    }
}

/// The initializer expression of a field declarator, local declaration, or
/// initialized property, parens stripped.
pub fn initializer<'t>(node: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    let holder = match node.kind() {
        SyntaxKind::VariableDeclarator | SyntaxKind::PropertyDeclaration => node,
        SyntaxKind::FieldDeclaration | SyntaxKind::LocalDeclarationStatement => {
            node.first_child_of_kind(SyntaxKind::VariableDeclarator)?
        }
        _ => return None,
    };
    let clause = holder.first_child_of_kind(SyntaxKind::EqualsValueClause)?;
    Some(strip_parens(clause.child(0)?))
}

/// The body (block or bare expression) of a property's `get` accessor.
pub fn get_accessor_body<'t>(property: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    accessor_body(property, SyntaxKind::GetAccessor)
}

/// The body (block or bare expression) of a property's `set` accessor.
pub fn set_accessor_body<'t>(property: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    accessor_body(property, SyntaxKind::SetAccessor)
}

fn accessor_body<'t>(property: SyntaxNode<'t>, accessor: SyntaxKind) -> Option<SyntaxNode<'t>> {
    if property.kind() != SyntaxKind::PropertyDeclaration {
        return None;
    }
    property
        .first_child_of_kind(SyntaxKind::AccessorList)?
        .first_child_of_kind(accessor)?
        .child(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TreeBuilder;

    #[test]
    fn test_parts_name() {
        assert!(is_parts_name("SetFoo", &["Set", "Foo"]));
        assert!(!is_parts_name("Setfoo", &["Set", "Foo"]));
        assert!(!is_parts_name("Foo", &["Set", "Foo"]));
        assert!(!is_parts_name("SetFooBar", &["Set", "Foo"]));
        assert!(is_parts_name("OnBarChanged", &["On", "Bar", "Changed"]));
        assert!(!is_parts_name("anything", &[]));
    }

    #[test]
    fn test_invocation_name_and_args() {
        let mut b = TreeBuilder::new();
        let target = b.identifier("DependencyProperty");
        let callee = b.member_access(target, "Register");
        let lit = b.string_literal("Bar");
        let arg = b.argument(lit);
        let call = b.invocation(callee, vec![arg]);
        let tree = b.finish(call);

        let call = tree.root();
        assert_eq!(invocation_target_name(call), Some("Register"));
        assert!(is_invocation_named(call, "Register", None));
        assert!(is_invocation_named(call, "Register", Some(1)));
        assert!(!is_invocation_named(call, "Register", Some(2)));
        assert!(!is_invocation_named(call, "RegisterReadOnly", None));
        assert_eq!(
            invocation_receiver(call).and_then(|r| r.text()),
            Some("DependencyProperty")
        );
    }

    #[test]
    fn test_argument_label_and_expression() {
        let mut b = TreeBuilder::new();
        let lit = b.string_literal("Bar");
        let named = b.named_argument("name", lit);
        let ident = b.identifier("x");
        let plain = b.argument(ident);
        let root = b.node(SyntaxKind::ArgumentList, vec![named, plain]);
        let tree = b.finish(root);

        let named = tree.root().child(0).unwrap();
        let plain = tree.root().child(1).unwrap();
        assert_eq!(argument_label(named), Some("name"));
        assert_eq!(
            argument_expression(named).unwrap().kind(),
            SyntaxKind::StringLiteral
        );
        assert_eq!(argument_label(plain), None);
        assert_eq!(argument_expression(plain).unwrap().text(), Some("x"));
    }

    #[test]
    fn test_typeof_operand_rejects_non_type() {
        let mut b = TreeBuilder::new();
        let ty = b.identifier("FooControl");
        let ok = b.typeof_expr(ty);
        let lit = b.string_literal("oops");
        let bad = b.node(SyntaxKind::TypeOfExpression, vec![lit]);
        let root = b.block(vec![ok, bad]);
        let tree = b.finish(root);

        let ok = tree.root().child(0).unwrap();
        let bad = tree.root().child(1).unwrap();
        assert_eq!(typeof_operand(ok).unwrap().text(), Some("FooControl"));
        assert!(typeof_operand(bad).is_none());
    }

    #[test]
    fn test_nameof_value() {
        let mut b = TreeBuilder::new();
        let this = b.identifier("FooControl");
        let access = b.member_access(this, "Bar");
        let nameof = b.nameof_expr(access);
        let plain = b.identifier("Bar");
        let tree = b.finish(nameof);

        assert!(is_nameof(tree.root()));
        assert_eq!(nameof_value(tree.root()), Some("Bar"));
        assert!(nameof_value(tree.node(plain)).is_none());
    }

    #[test]
    fn test_strip_parens() {
        let mut b = TreeBuilder::new();
        let ident = b.identifier("x");
        let inner = b.parenthesized(ident);
        let outer = b.parenthesized(inner);
        let tree = b.finish(outer);

        assert_eq!(strip_parens(tree.root()).text(), Some("x"));
    }

    #[test]
    fn test_declared_name_and_initializer() {
        let mut b = TreeBuilder::new();
        let ty = b.identifier("DependencyProperty");
        let init = b.identifier("Other");
        let field = b.field(ty, "BarProperty", Some(init));
        let tree = b.finish(field);

        let field = tree.root();
        assert_eq!(declared_name(field), Some("BarProperty"));
        assert_eq!(initializer(field).unwrap().text(), Some("Other"));
    }
}
