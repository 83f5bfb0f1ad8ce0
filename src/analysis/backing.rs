//! Backing-member resolver.
//!
//! Recovers the registration behind a `DependencyProperty` /
//! `DependencyPropertyKey` / `RoutedEvent` field or property, following the
//! aliasing idioms:
//!
//! - `public static readonly DependencyProperty BarProperty =
//!   BarPropertyKey.DependencyProperty;`
//! - `public static readonly DependencyProperty BarProperty =
//!   Other.BarProperty.AddOwner(typeof(FooControl));`
//!
//! Alias chains are host-authored and may be malformed; a visited set and a
//! hop bound keep cyclic input a `None`, never a hang.

use std::collections::HashSet;

use tracing::warn;

use crate::semantic::{BackingKind, DomainVocabulary, SemanticOracle, SymbolId, SymbolKind, TypeId};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};

use super::predicates;
use super::registration::{match_registration, RegistrationCall, RegistrationKind};

const MAX_ALIAS_HOPS: usize = 4;

/// A field or property recognized as a registration backing member.
#[derive(Debug, Clone)]
pub struct BackingMember {
    pub symbol: SymbolId,
    pub name: String,
    pub kind: BackingKind,
    /// The containing type.
    pub owner: TypeId,
}

/// Classify a symbol as a backing member.
///
/// Cheap rejection is the common case: anything that is not a field or
/// property of one of the three recognized types is `None`.
pub fn resolve_backing(
    symbol: SymbolId,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<BackingMember> {
    match oracle.symbol_kind(symbol)? {
        SymbolKind::Field | SymbolKind::Property => {}
        _ => return None,
    }
    let kind = vocab.backing_kind(oracle.symbol_type(symbol)?)?;
    Some(BackingMember {
        symbol,
        name: oracle.symbol_name(symbol)?,
        kind,
        owner: oracle.containing_type(symbol)?,
    })
}

/// The registration call reachable from a backing member's initializer.
///
/// For `AddOwner` the origin registration's name and value type are merged
/// into the result, so callers always see the registered name regardless of
/// which owner's field they started from.
pub fn registration_of(
    symbol: SymbolId,
    tree: &SyntaxTree,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<RegistrationCall> {
    let mut visited = HashSet::new();
    registration_step(symbol, tree, oracle, vocab, &mut visited)
}

fn registration_step(
    symbol: SymbolId,
    tree: &SyntaxTree,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
    visited: &mut HashSet<SymbolId>,
) -> Option<RegistrationCall> {
    if visited.len() >= MAX_ALIAS_HOPS {
        warn!(%symbol, "backing-member alias chain exceeds hop bound, giving up");
        return None;
    }
    if !visited.insert(symbol) {
        warn!(%symbol, "cyclic backing-member aliasing, giving up");
        return None;
    }

    let declaration = oracle.declaration(symbol)?;
    let init = predicates::initializer(tree.node(declaration))?;
    initializer_registration(init, tree, oracle, vocab, visited)
}

fn initializer_registration(
    init: SyntaxNode<'_>,
    tree: &SyntaxTree,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
    visited: &mut HashSet<SymbolId>,
) -> Option<RegistrationCall> {
    match init.kind() {
        SyntaxKind::InvocationExpression | SyntaxKind::ObjectCreationExpression => {
            let call = match_registration(init, oracle, vocab)?;
            if !call.kind.declares_backing() {
                return None;
            }
            if call.kind == RegistrationKind::AddOwner {
                return merge_add_owner(call, init, tree, oracle, vocab, visited);
            }
            Some(call)
        }
        SyntaxKind::MemberAccessExpression => {
            // `BarPropertyKey.DependencyProperty`: hop to the key member.
            if predicates::member_access_name(init) == Some("DependencyProperty") {
                if let Some(target) = predicates::member_access_target(init) {
                    if let Some(target_symbol) = oracle.resolve_symbol(target) {
                        let is_key = oracle
                            .symbol_type(target_symbol)
                            .map(|ty| ty == vocab.dependency_property_key)
                            .unwrap_or(false);
                        if is_key {
                            return registration_step(target_symbol, tree, oracle, vocab, visited);
                        }
                    }
                }
            }
            let aliased = oracle.resolve_symbol(init)?;
            registration_step(aliased, tree, oracle, vocab, visited)
        }
        SyntaxKind::IdentifierName => {
            let aliased = oracle.resolve_symbol(init)?;
            registration_step(aliased, tree, oracle, vocab, visited)
        }
        _ => None,
    }
}

/// `Other.BarProperty.AddOwner(...)`: take owner/metadata from the
/// `AddOwner` call itself and name/value type from the origin registration.
fn merge_add_owner(
    call: RegistrationCall,
    invocation: SyntaxNode<'_>,
    tree: &SyntaxTree,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
    visited: &mut HashSet<SymbolId>,
) -> Option<RegistrationCall> {
    let receiver = predicates::invocation_receiver(invocation)?;
    let origin_symbol = oracle.resolve_symbol(predicates::strip_parens(receiver))?;
    let origin = registration_step(origin_symbol, tree, oracle, vocab, visited)?;
    Some(RegistrationCall {
        name: origin.name,
        value_type: origin.value_type,
        ..call
    })
}

/// The sibling `DependencyPropertyKey` member whose registration is the
/// same invocation as `member`'s, the inverse of the
/// `Key.DependencyProperty` alias. Used to enforce "set read-only
/// properties through the key".
pub fn key_for_property(
    member: &BackingMember,
    tree: &SyntaxTree,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<SymbolId> {
    if member.kind != BackingKind::DependencyProperty {
        return None;
    }
    let registration = registration_of(member.symbol, tree, oracle, vocab)?;

    for sibling in oracle.members(member.owner) {
        if sibling == member.symbol {
            continue;
        }
        let is_key = oracle
            .symbol_type(sibling)
            .map(|ty| ty == vocab.dependency_property_key)
            .unwrap_or(false);
        if !is_key {
            continue;
        }
        let same_registration = registration_of(sibling, tree, oracle, vocab)
            .map(|r| r.invocation == registration.invocation)
            .unwrap_or(false);
        if same_registration {
            return Some(sibling);
        }
    }
    None
}

/// The backing member a wrapper accessor body passes to
/// `GetValue`/`SetValue`: the first such invocation's first argument,
/// resolved. Returns the invocation node and the symbol.
pub fn accessor_target<'t>(
    body: SyntaxNode<'t>,
    accessor_method: &str,
    oracle: &dyn SemanticOracle,
) -> Option<(SyntaxNode<'t>, SymbolId)> {
    for node in body.descendants() {
        if predicates::is_invocation_named(node, accessor_method, None) {
            let arg = predicates::arguments(node).next()?;
            let expr = predicates::strip_parens(predicates::argument_expression(arg)?);
            let symbol = oracle.resolve_symbol(expr)?;
            return Some((node, symbol));
        }
    }
    None
}
