//! Identifier-usage walker.
//!
//! Finds identifier references to a name inside a subtree. Several rules
//! only act when a symbol has exactly one usage site ("rename the callback
//! to match the registered name" is unsafe when the method is referenced
//! from two places), so [`find_single_usage`] is the load-bearing query.
//!
//! Implemented as a pure pre-order fold; no walker state survives a call.

use crate::semantic::{DomainVocabulary, SemanticOracle};
use crate::syntax::{SyntaxKind, SyntaxNode};

/// Whether a walk descends into nested type declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkScope {
    /// Stop at nested type declarations (the default; a nested type's
    /// members are a different naming scope).
    #[default]
    SameType,
    IncludeNestedTypes,
}

/// All identifier references to `name` inside `root`, in pre-order.
///
/// Declaration-name positions (the identifier being declared) and argument
/// labels are not references. A `None` root or empty name yields nothing.
pub fn find_identifier_usages<'t>(
    root: Option<SyntaxNode<'t>>,
    name: &str,
) -> Vec<SyntaxNode<'t>> {
    find_identifier_usages_in(root, name, WalkScope::SameType)
}

/// [`find_identifier_usages`] with explicit nested-type control.
pub fn find_identifier_usages_in<'t>(
    root: Option<SyntaxNode<'t>>,
    name: &str,
    scope: WalkScope,
) -> Vec<SyntaxNode<'t>> {
    let root = match root {
        Some(root) if !name.is_empty() => root,
        _ => return Vec::new(),
    };

    let mut usages = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if scope == WalkScope::SameType && node.kind().is_type_declaration() && node != root {
            continue;
        }
        if node.kind() == SyntaxKind::IdentifierName
            && node.text() == Some(name)
            && !is_declaration_name(node)
            && !is_argument_label(node)
        {
            usages.push(node);
        }
        // Reverse push keeps pre-order on pop.
        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push(child);
        }
    }
    usages
}

/// The single identifier reference to `name` inside `root`, or `None` when
/// there are zero or several.
pub fn find_single_usage<'t>(root: Option<SyntaxNode<'t>>, name: &str) -> Option<SyntaxNode<'t>> {
    let usages = find_identifier_usages(root, name);
    match usages.as_slice() {
        [single] => Some(*single),
        _ => None,
    }
}

/// The argument node a usage is passed through, bridging the
/// named-delegate-constructor idiom.
///
/// `Register(..., new PropertyChangedCallback(OnBarChanged))` passes the
/// callback wrapped in a one-argument delegate construction; the wrapping is
/// a normalization step, not a second usage, and downstream checks want the
/// *outer* argument so they walk from the registration context.
pub fn effective_argument<'t>(
    usage: SyntaxNode<'t>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<SyntaxNode<'t>> {
    // `this.OnBarChanged`: the argument expression is the member access.
    let mut expr = usage;
    while let Some(parent) = expr.parent() {
        if parent.kind() == SyntaxKind::MemberAccessExpression && parent.child(1) == Some(expr) {
            expr = parent;
        } else {
            break;
        }
    }

    let arg = expr.parent()?;
    if arg.kind() != SyntaxKind::Argument {
        return None;
    }

    // Unwrap one level of `new SomeCallback(usage)`.
    let list = arg.parent()?;
    if list.kind() == SyntaxKind::ArgumentList && list.child_count() == 1 {
        if let Some(creation) = list.parent() {
            if creation.kind() == SyntaxKind::ObjectCreationExpression {
                let is_delegate = creation
                    .child(0)
                    .and_then(|ty| oracle.resolve_type(ty))
                    .map(|ty| vocab.is_callback_delegate(ty))
                    .unwrap_or(false);
                if is_delegate {
                    if let Some(outer) = creation.parent() {
                        if outer.kind() == SyntaxKind::Argument {
                            return Some(outer);
                        }
                    }
                }
            }
        }
    }

    Some(arg)
}

fn is_declaration_name(node: SyntaxNode<'_>) -> bool {
    let parent = match node.parent() {
        Some(parent) => parent,
        None => return false,
    };
    match parent.kind() {
        SyntaxKind::VariableDeclarator | SyntaxKind::ClassDeclaration => {
            parent.child(0) == Some(node)
        }
        // Name is the second child; the leading type node may itself be an
        // identifier and must stay a reference.
        SyntaxKind::PropertyDeclaration | SyntaxKind::MethodDeclaration => {
            parent.child(1) == Some(node)
        }
        SyntaxKind::Parameter | SyntaxKind::DeclarationPattern => {
            // The name is the last child; a leading type annotation is a
            // reference, not a declaration.
            parent.child(parent.child_count().saturating_sub(1)) == Some(node)
        }
        _ => false,
    }
}

fn is_argument_label(node: SyntaxNode<'_>) -> bool {
    node.parent()
        .map(|p| p.kind() == SyntaxKind::NameColon)
        .unwrap_or(false)
}
