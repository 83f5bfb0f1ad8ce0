//! Callback-signature matcher.
//!
//! Classifies methods and lambdas into the three framework callback roles
//! purely from parameter/return shape, finds where a callback is passed,
//! and checks that casts applied to the sender/value parameters agree with
//! the statically-expected types recovered from the registration.

use crate::semantic::{DomainVocabulary, SemanticOracle, SymbolId, SymbolKind, TypeId};
use crate::syntax::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};

use super::walker::{effective_argument, find_identifier_usages};

/// Role of a callback, identified by shape alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackRole {
    Changed,
    Coerce,
    Validate,
}

/// What a callback expression denotes: a named method, or a lambda the host
/// did not expose as a method symbol (the parameter view is synthesized
/// from the lambda's parameter list instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackTarget {
    Method(SymbolId),
    Lambda(NodeId),
}

/// A classified callback.
///
/// `sender_parameter` is present exactly when the role is not `Validate`.
#[derive(Debug, Clone)]
pub struct CallbackMatch {
    pub role: CallbackRole,
    pub target: CallbackTarget,
    pub sender_parameter: Option<SymbolId>,
    pub value_parameter: Option<SymbolId>,
}

/// Classify a method symbol. Shape rules, in priority order:
///
/// 1. Changed: 2 parameters, void return, sender assignable to the
///    dependency-object base, second parameter exactly the changed-args
///    type.
/// 2. Coerce: 2 parameters, sender as above, second parameter and return
///    both the universal object type.
/// 3. Validate: 1 object parameter, bool return.
///
/// The shapes are disjoint by construction; at most one matches.
pub fn match_callback_role(
    method: SymbolId,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<CallbackMatch> {
    if oracle.symbol_kind(method)? != SymbolKind::Method {
        return None;
    }
    let params = oracle.parameters(method);
    let ret = oracle.symbol_type(method)?;
    let target = CallbackTarget::Method(method);

    match params.as_slice() {
        [sender, value] => {
            let sender_ty = oracle.symbol_type(*sender)?;
            let value_ty = oracle.symbol_type(*value)?;
            if !oracle.is_assignable(sender_ty, vocab.dependency_object) {
                return None;
            }
            if value_ty == vocab.property_changed_event_args && ret == vocab.void_type {
                Some(CallbackMatch {
                    role: CallbackRole::Changed,
                    target,
                    sender_parameter: Some(*sender),
                    value_parameter: Some(*value),
                })
            } else if value_ty == vocab.object_type && ret == vocab.object_type {
                Some(CallbackMatch {
                    role: CallbackRole::Coerce,
                    target,
                    sender_parameter: Some(*sender),
                    value_parameter: Some(*value),
                })
            } else {
                None
            }
        }
        [value] => {
            let value_ty = oracle.symbol_type(*value)?;
            (value_ty == vocab.object_type && ret == vocab.bool_type).then_some(CallbackMatch {
                role: CallbackRole::Validate,
                target,
                sender_parameter: None,
                value_parameter: Some(*value),
            })
        }
        _ => None,
    }
}

/// Classify a callback-position expression: a method group, a lambda, or a
/// delegate construction wrapping either.
pub fn match_callback_expression(
    expr: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<CallbackMatch> {
    let expr = super::predicates::strip_parens(expr);
    match expr.kind() {
        SyntaxKind::IdentifierName | SyntaxKind::MemberAccessExpression => {
            let symbol = oracle.resolve_symbol(expr)?;
            match_callback_role(symbol, oracle, vocab)
        }
        kind if kind.is_lambda() => match_lambda(expr, oracle, vocab),
        SyntaxKind::ObjectCreationExpression => {
            // `new PropertyChangedCallback(OnBarChanged)`, one level of
            // wrapping.
            let ty = oracle.resolve_type(expr.child(0)?)?;
            if !vocab.is_callback_delegate(ty) {
                return None;
            }
            let arg = super::predicates::arguments(expr).next()?;
            let inner = super::predicates::argument_expression(arg)?;
            match_callback_expression(inner, oracle, vocab)
        }
        _ => None,
    }
}

/// Lambdas: prefer the host's method-symbol view; otherwise synthesize one
/// from the delegate conversion type and the declared parameters.
fn match_lambda(
    lambda: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<CallbackMatch> {
    if let Some(method) = oracle.resolve_symbol(lambda) {
        if let Some(m) = match_callback_role(method, oracle, vocab) {
            return Some(m);
        }
    }

    let delegate = oracle.type_of(lambda)?;
    let role = if delegate == vocab.property_changed_callback {
        CallbackRole::Changed
    } else if delegate == vocab.coerce_value_callback {
        CallbackRole::Coerce
    } else if delegate == vocab.validate_value_callback {
        CallbackRole::Validate
    } else {
        return None;
    };

    let params: Vec<SymbolId> = lambda
        .first_child_of_kind(SyntaxKind::ParameterList)
        .map(|list| {
            list.children_of_kind(SyntaxKind::Parameter)
                .filter_map(|p| oracle.resolve_symbol(p))
                .collect()
        })
        .unwrap_or_default();

    let (sender, value) = match role {
        CallbackRole::Validate => (None, params.first().copied()),
        _ => (params.first().copied(), params.get(1).copied()),
    };
    Some(CallbackMatch {
        role,
        target: CallbackTarget::Lambda(lambda.id()),
        sender_parameter: sender,
        value_parameter: value,
    })
}

/// Every argument position inside `class` where `method` is passed as a
/// callback, unwrapped to the outer argument when wrapped in a delegate
/// construction.
pub fn find_callback_usages<'t>(
    method: SymbolId,
    class: SyntaxNode<'t>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Vec<SyntaxNode<'t>> {
    let name = match oracle.symbol_name(method) {
        Some(name) => name,
        None => return Vec::new(),
    };
    find_identifier_usages(Some(class), &name)
        .into_iter()
        .filter(|usage| {
            oracle
                .resolve_symbol(*usage)
                .map(|s| s == method)
                .unwrap_or(true)
        })
        .filter_map(|usage| effective_argument(usage, oracle, vocab))
        .collect()
}

/// The body of a callback target: a method's block/expression or the
/// lambda body.
pub fn callback_body<'t>(
    target: CallbackTarget,
    tree: &'t SyntaxTree,
    oracle: &dyn SemanticOracle,
) -> Option<SyntaxNode<'t>> {
    match target {
        CallbackTarget::Method(method) => {
            let declaration = tree.node(oracle.declaration(method)?);
            if declaration.kind() != SyntaxKind::MethodDeclaration {
                return None;
            }
            declaration.child(3)
        }
        CallbackTarget::Lambda(node) => tree.node(node).child(1),
    }
}

/// How a cast disagrees with the expected parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastConcernKind {
    /// Cast target is unrelated to the expected type: neither assignable to
    /// nor from it.
    WrongType,
    /// Cast target is related but not the exact expected type.
    PreferExact,
}

/// One cast disagreement found in a callback body.
#[derive(Debug, Clone)]
pub struct CastConcern {
    pub kind: CastConcernKind,
    /// The cast / pattern / `as` expression node.
    pub node: NodeId,
    pub found: TypeId,
}

/// Walk every reference to `parameter` in `body` and check the casts
/// applied to it against `expected`.
///
/// A reference through `.NewValue`/`.OldValue` on a changed-args parameter
/// is bridged: the member access itself is treated as the reference.
/// `as`-casts are only checked for plausibility, and interface targets are
/// exempt from that check since interface assignability is not decidable
/// from symbol identity.
pub fn check_parameter_casts(
    body: SyntaxNode<'_>,
    parameter: SymbolId,
    expected: TypeId,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Vec<CastConcern> {
    let name = match oracle.symbol_name(parameter) {
        Some(name) => name,
        None => return Vec::new(),
    };
    let bridged = oracle.symbol_type(parameter) == Some(vocab.property_changed_event_args);

    let mut concerns = Vec::new();
    for usage in find_identifier_usages(Some(body), &name) {
        if let Some(symbol) = oracle.resolve_symbol(usage) {
            if symbol != parameter {
                continue;
            }
        }

        let reference = if bridged {
            // Only `.NewValue`/`.OldValue` projections carry the property
            // value; other uses of the args parameter are not value reads.
            match value_projection(usage) {
                Some(projection) => projection,
                None => continue,
            }
        } else {
            usage
        };

        check_reference(reference, expected, oracle, &mut concerns);
    }
    concerns
}

/// `e.NewValue` / `e.OldValue` member access off a usage.
fn value_projection<'t>(usage: SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    let parent = usage.parent()?;
    if parent.kind() != SyntaxKind::MemberAccessExpression || parent.child(0) != Some(usage) {
        return None;
    }
    match parent.child(1)?.text() {
        Some("NewValue") | Some("OldValue") => Some(parent),
        _ => None,
    }
}

fn check_reference(
    reference: SyntaxNode<'_>,
    expected: TypeId,
    oracle: &dyn SemanticOracle,
    concerns: &mut Vec<CastConcern>,
) {
    // Step out of parentheses before looking at the enclosing expression.
    let mut expr = reference;
    while let Some(parent) = expr.parent() {
        if parent.kind() == SyntaxKind::ParenthesizedExpression {
            expr = parent;
        } else {
            break;
        }
    }
    let parent = match expr.parent() {
        Some(parent) => parent,
        None => return,
    };

    match parent.kind() {
        SyntaxKind::CastExpression if parent.child(1) == Some(expr) => {
            if let Some(found) = parent.child(0).and_then(|ty| oracle.resolve_type(ty)) {
                classify_cast(parent.id(), found, expected, oracle, concerns);
            }
        }
        SyntaxKind::IsPatternExpression if parent.child(0) == Some(expr) => {
            if let Some(pattern) = parent.child(1) {
                check_pattern_type(parent.id(), pattern, expected, oracle, concerns);
            }
        }
        SyntaxKind::SwitchExpression if parent.child(0) == Some(expr) => {
            for arm in parent.children_of_kind(SyntaxKind::SwitchExpressionArm) {
                if let Some(pattern) = arm.child(0) {
                    check_pattern_type(arm.id(), pattern, expected, oracle, concerns);
                }
            }
        }
        SyntaxKind::AsExpression if parent.child(0) == Some(expr) => {
            if let Some(found) = parent.child(1).and_then(|ty| oracle.resolve_type(ty)) {
                if oracle.is_interface(found) || oracle.is_interface(expected) {
                    return;
                }
                if !related(found, expected, oracle) {
                    concerns.push(CastConcern {
                        kind: CastConcernKind::WrongType,
                        node: parent.id(),
                        found,
                    });
                }
            }
        }
        _ => {}
    }
}

fn check_pattern_type(
    at: NodeId,
    pattern: SyntaxNode<'_>,
    expected: TypeId,
    oracle: &dyn SemanticOracle,
    concerns: &mut Vec<CastConcern>,
) {
    let type_node = match pattern.kind() {
        SyntaxKind::DeclarationPattern => match pattern.child(0) {
            Some(ty) => ty,
            None => return,
        },
        kind if kind.is_type_name() => pattern,
        _ => return,
    };
    if let Some(found) = oracle.resolve_type(type_node) {
        classify_cast(at, found, expected, oracle, concerns);
    }
}

fn classify_cast(
    at: NodeId,
    found: TypeId,
    expected: TypeId,
    oracle: &dyn SemanticOracle,
    concerns: &mut Vec<CastConcern>,
) {
    if !related(found, expected, oracle) {
        concerns.push(CastConcern {
            kind: CastConcernKind::WrongType,
            node: at,
            found,
        });
    } else if found != expected {
        concerns.push(CastConcern {
            kind: CastConcernKind::PreferExact,
            node: at,
            found,
        });
    }
}

fn related(a: TypeId, b: TypeId, oracle: &dyn SemanticOracle) -> bool {
    oracle.is_assignable(a, b) || oracle.is_assignable(b, a)
}
