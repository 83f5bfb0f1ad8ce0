//! Rules over CLR wrapper properties and attached accessor methods.

use crate::analysis::{
    accessor_target, key_for_property, registration_of, resolve_backing, BackingMember,
    RegistrationCall,
};
use crate::analysis::predicates;
use crate::semantic::{BackingKind, SemanticOracle, SymbolId, SymbolKind};
use crate::syntax::{SyntaxKind, SyntaxTree};

use super::backing_members::member_name_span;
use super::registrations::type_display;
use super::runner::{Rule, RuleContext};
use super::types::{Finding, RuleDescriptor, RuleId, Severity};

pub static WRAPPER_NAME_MISMATCH: RuleDescriptor = RuleDescriptor {
    id: RuleId::WrapperNameMismatch,
    title: "Wrapper property names match the registered name",
    message_template: "Property '{0}' wraps a dependency property registered as '{1}'",
    default_severity: Severity::Error,
};

pub static WRAPPER_TYPE_MISMATCH: RuleDescriptor = RuleDescriptor {
    id: RuleId::WrapperTypeMismatch,
    title: "Wrapper property types match the registered value type",
    message_template: "Property type '{0}' does not match the registered value type '{1}'",
    default_severity: Severity::Error,
};

pub static WRAPPER_ACCESSOR_INCONSISTENT: RuleDescriptor = RuleDescriptor {
    id: RuleId::WrapperAccessorInconsistent,
    title: "Wrapper accessors agree on one backing member",
    message_template: "Accessors of '{0}' should read '{1}' and write '{2}'",
    default_severity: Severity::Error,
};

pub static ATTACHED_ACCESSOR_NAME: RuleDescriptor = RuleDescriptor {
    id: RuleId::AttachedAccessorName,
    title: "Attached accessors are named after the registered name",
    message_template: "Attached accessor '{0}' should be named '{1}'",
    default_severity: Severity::Warning,
};

pub static ATTACHED_ACCESSOR_SIGNATURE: RuleDescriptor = RuleDescriptor {
    id: RuleId::AttachedAccessorSignature,
    title: "Attached accessor signatures use the registered value type",
    message_template: "Attached accessor '{0}' should use value type '{1}' but uses '{2}'",
    default_severity: Severity::Error,
};

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule {
            kind: SyntaxKind::PropertyDeclaration,
            descriptors: vec![&WRAPPER_NAME_MISMATCH],
            check: check_wrapper_name,
        },
        Rule {
            kind: SyntaxKind::PropertyDeclaration,
            descriptors: vec![&WRAPPER_TYPE_MISMATCH],
            check: check_wrapper_type,
        },
        Rule {
            kind: SyntaxKind::PropertyDeclaration,
            descriptors: vec![&WRAPPER_ACCESSOR_INCONSISTENT],
            check: check_wrapper_accessors,
        },
        Rule {
            kind: SyntaxKind::MethodDeclaration,
            descriptors: vec![&ATTACHED_ACCESSOR_NAME],
            check: check_attached_name,
        },
        Rule {
            kind: SyntaxKind::MethodDeclaration,
            descriptors: vec![&ATTACHED_ACCESSOR_SIGNATURE],
            check: check_attached_signature,
        },
    ]
}

/// The sibling property whose getter reads `member` through `GetValue`:
/// the CLR wrapper, when one exists.
pub(super) fn wrapper_property_for(
    member: &BackingMember,
    tree: &SyntaxTree,
    oracle: &dyn SemanticOracle,
) -> Option<SymbolId> {
    for sibling in oracle.members(member.owner) {
        if oracle.symbol_kind(sibling) != Some(SymbolKind::Property) {
            continue;
        }
        let declaration = match oracle.declaration(sibling) {
            Some(declaration) => declaration,
            None => continue,
        };
        let node = tree.node(declaration);
        if node.kind() != SyntaxKind::PropertyDeclaration {
            continue;
        }
        let body = match predicates::get_accessor_body(node) {
            Some(body) => body,
            None => continue,
        };
        if let Some((_, target)) = accessor_target(body, "GetValue", oracle) {
            if target == member.symbol {
                return Some(sibling);
            }
        }
    }
    None
}

/// The wrapper property the visited node declares, with the backing member
/// its accessors reach. `None` for anything that is not a wrapper.
fn wrapped_backing(ctx: &RuleContext<'_>) -> Option<BackingMember> {
    let property = ctx.oracle.resolve_symbol(ctx.node)?;
    if ctx.oracle.symbol_kind(property) != Some(SymbolKind::Property) {
        return None;
    }
    // A backing member declared as a property is not a wrapper.
    if resolve_backing(property, ctx.oracle, ctx.vocab).is_some() {
        return None;
    }
    let from_getter = predicates::get_accessor_body(ctx.node)
        .and_then(|body| accessor_target(body, "GetValue", ctx.oracle))
        .and_then(|(_, symbol)| resolve_backing(symbol, ctx.oracle, ctx.vocab));
    if from_getter.is_some() {
        return from_getter;
    }
    predicates::set_accessor_body(ctx.node)
        .and_then(|body| accessor_target(body, "SetValue", ctx.oracle))
        .and_then(|(_, symbol)| resolve_backing(symbol, ctx.oracle, ctx.vocab))
}

fn wrapped_registration(ctx: &RuleContext<'_>) -> Option<(BackingMember, RegistrationCall)> {
    let backing = wrapped_backing(ctx)?;
    let registration = registration_of(backing.symbol, ctx.tree, ctx.oracle, ctx.vocab)?;
    Some((backing, registration))
}

/// PC0020: the end-to-end name comparison between a wrapper and its
/// registration.
fn check_wrapper_name(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let property = ctx.oracle.resolve_symbol(ctx.node)?;
        let property_name = ctx.oracle.symbol_name(property)?;
        let (_, registration) = wrapped_registration(ctx)?;
        let registered = registration.name?.value;
        if property_name == registered {
            return None;
        }
        let span = member_name_span(ctx.node).unwrap_or_else(|| ctx.node.span());
        Some(
            Finding::new(
                WRAPPER_NAME_MISMATCH.id,
                span,
                vec![property_name, registered.clone()],
            )
            .with_property("ExpectedName", registered),
        )
    };
    finding().into_iter().collect()
}

/// PC0021: wrapper declared type vs registered value type, exact.
fn check_wrapper_type(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let property = ctx.oracle.resolve_symbol(ctx.node)?;
        let property_ty = ctx.oracle.symbol_type(property)?;
        let (_, registration) = wrapped_registration(ctx)?;
        let value_type = registration.value_type?;
        if property_ty == value_type.resolved {
            return None;
        }
        let span = ctx
            .node
            .child(0)
            .map(|ty| ty.span())
            .unwrap_or_else(|| ctx.node.span());
        Some(Finding::new(
            WRAPPER_TYPE_MISMATCH.id,
            span,
            vec![
                type_display(ctx.oracle, property_ty),
                type_display(ctx.oracle, value_type.resolved),
            ],
        ))
    };
    finding().into_iter().collect()
}

/// PC0022: getter reads the property, setter writes the same member, or
/// its key when the registration is read-only.
fn check_wrapper_accessors(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let property = ctx.oracle.resolve_symbol(ctx.node)?;
        if ctx.oracle.symbol_kind(property) != Some(SymbolKind::Property) {
            return None;
        }
        if resolve_backing(property, ctx.oracle, ctx.vocab).is_some() {
            return None;
        }
        let property_name = ctx.oracle.symbol_name(property)?;

        let get_body = predicates::get_accessor_body(ctx.node)?;
        let (_, get_symbol) = accessor_target(get_body, "GetValue", ctx.oracle)?;
        let set_body = predicates::set_accessor_body(ctx.node)?;
        let (set_invocation, set_symbol) = accessor_target(set_body, "SetValue", ctx.oracle)?;

        let get_backing = resolve_backing(get_symbol, ctx.oracle, ctx.vocab)?;
        let (expected_read, expected_write) = match get_backing.kind {
            BackingKind::DependencyProperty => {
                let write = key_for_property(&get_backing, ctx.tree, ctx.oracle, ctx.vocab)
                    .unwrap_or(get_backing.symbol);
                (get_backing.symbol, write)
            }
            // Reading through the key is itself the defect; the read side
            // should be the derived property.
            BackingKind::DependencyPropertyKey => {
                let derived = derived_property_for(ctx, &get_backing)?;
                (derived, get_backing.symbol)
            }
            BackingKind::RoutedEvent => return None,
        };
        if get_symbol == expected_read && set_symbol == expected_write {
            return None;
        }

        let expected_read = ctx.oracle.symbol_name(expected_read)?;
        let expected_write_name = ctx.oracle.symbol_name(expected_write)?;
        let span = predicates::arguments(set_invocation)
            .next()
            .and_then(predicates::argument_expression)
            .map(|expr| expr.span())
            .unwrap_or_else(|| ctx.node.span());
        Some(
            Finding::new(
                WRAPPER_ACCESSOR_INCONSISTENT.id,
                span,
                vec![property_name, expected_read, expected_write_name.clone()],
            )
            .with_property("ExpectedName", expected_write_name),
        )
    };
    finding().into_iter().collect()
}

/// The `DependencyProperty` sibling derived from a key member.
fn derived_property_for(ctx: &RuleContext<'_>, key: &BackingMember) -> Option<SymbolId> {
    for sibling in ctx.oracle.members(key.owner) {
        if sibling == key.symbol {
            continue;
        }
        let backing = match resolve_backing(sibling, ctx.oracle, ctx.vocab) {
            Some(backing) => backing,
            None => continue,
        };
        if backing.kind != BackingKind::DependencyProperty {
            continue;
        }
        if key_for_property(&backing, ctx.tree, ctx.oracle, ctx.vocab) == Some(key.symbol) {
            return Some(sibling);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessorRole {
    Get,
    Set,
}

impl AccessorRole {
    fn prefix(self) -> &'static str {
        match self {
            AccessorRole::Get => "Get",
            AccessorRole::Set => "Set",
        }
    }
}

struct AttachedAccessor {
    role: AccessorRole,
    method: SymbolId,
    method_name: String,
    registration: RegistrationCall,
}

/// A static `Get<Name>`/`Set<Name>`-shaped method whose body reaches an
/// attached registration. Shape mismatches are a quiet `None`; a helper
/// that merely mentions `GetValue` is not an accessor.
fn attached_accessor(ctx: &RuleContext<'_>) -> Option<AttachedAccessor> {
    let method = ctx.oracle.resolve_symbol(ctx.node)?;
    if ctx.oracle.symbol_kind(method) != Some(SymbolKind::Method) {
        return None;
    }
    if !ctx.oracle.is_static(method) {
        return None;
    }
    let params = ctx.oracle.parameters(method);
    let body = ctx.node.child(3)?;
    let (role, target) = match params.len() {
        1 => (AccessorRole::Get, accessor_target(body, "GetValue", ctx.oracle)?),
        2 => (AccessorRole::Set, accessor_target(body, "SetValue", ctx.oracle)?),
        _ => return None,
    };
    let first_param_ty = ctx.oracle.symbol_type(*params.first()?)?;
    if !ctx.oracle.is_assignable(first_param_ty, ctx.vocab.dependency_object) {
        return None;
    }
    let backing = resolve_backing(target.1, ctx.oracle, ctx.vocab)?;
    let registration = registration_of(backing.symbol, ctx.tree, ctx.oracle, ctx.vocab)?;
    if !registration.kind.is_attached() {
        return None;
    }
    Some(AttachedAccessor {
        role,
        method,
        method_name: ctx.oracle.symbol_name(method)?,
        registration,
    })
}

/// PC0030.
fn check_attached_name(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let accessor = attached_accessor(ctx)?;
        let registered = accessor.registration.name.as_ref()?.value.clone();
        if predicates::is_parts_name(&accessor.method_name, &[accessor.role.prefix(), &registered])
        {
            return None;
        }
        let expected = format!("{}{}", accessor.role.prefix(), registered);
        let span = member_name_span(ctx.node).unwrap_or_else(|| ctx.node.span());
        Some(
            Finding::new(
                ATTACHED_ACCESSOR_NAME.id,
                span,
                vec![accessor.method_name.clone(), expected.clone()],
            )
            .with_property("ExpectedName", expected),
        )
    };
    finding().into_iter().collect()
}

/// PC0031: getter return type / setter value parameter against the
/// registered value type.
fn check_attached_signature(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let accessor = attached_accessor(ctx)?;
        let value_type = accessor.registration.value_type?;
        let found = match accessor.role {
            AccessorRole::Get => ctx.oracle.symbol_type(accessor.method)?,
            AccessorRole::Set => {
                let params = ctx.oracle.parameters(accessor.method);
                ctx.oracle.symbol_type(*params.get(1)?)?
            }
        };
        if found == value_type.resolved {
            return None;
        }
        let span = member_name_span(ctx.node).unwrap_or_else(|| ctx.node.span());
        Some(Finding::new(
            ATTACHED_ACCESSOR_SIGNATURE.id,
            span,
            vec![
                accessor.method_name.clone(),
                type_display(ctx.oracle, value_type.resolved),
                type_display(ctx.oracle, found),
            ],
        ))
    };
    finding().into_iter().collect()
}
