//! Rules over backing-member declarations.

use crate::analysis::{key_for_property, registration_of, resolve_backing, BackingMember};
use crate::analysis::predicates;
use crate::semantic::BackingKind;
use crate::syntax::{Span, SyntaxKind, SyntaxNode};

use super::runner::{Rule, RuleContext};
use super::types::{Finding, RuleDescriptor, RuleId, Severity};
use super::wrappers;

pub static BACKING_MEMBER_NAME: RuleDescriptor = RuleDescriptor {
    id: RuleId::BackingMemberName,
    title: "Backing member name follows the naming convention",
    message_template: "Backing member '{0}' should be named '{1}'",
    default_severity: Severity::Warning,
};

pub static BACKING_MEMBER_NOT_STATIC_READONLY: RuleDescriptor = RuleDescriptor {
    id: RuleId::BackingMemberNotStaticReadonly,
    title: "Backing members are static readonly",
    message_template: "Backing member '{0}' should be static and readonly",
    default_severity: Severity::Error,
};

pub static SET_VALUE_WITHOUT_KEY: RuleDescriptor = RuleDescriptor {
    id: RuleId::SetValueWithoutKey,
    title: "Read-only properties are set through their key",
    message_template: "SetValue on read-only property '{0}' must pass '{1}'",
    default_severity: Severity::Error,
};

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule {
            kind: SyntaxKind::FieldDeclaration,
            descriptors: vec![&BACKING_MEMBER_NAME],
            check: check_member_name,
        },
        Rule {
            kind: SyntaxKind::PropertyDeclaration,
            descriptors: vec![&BACKING_MEMBER_NAME],
            check: check_member_name,
        },
        Rule {
            kind: SyntaxKind::FieldDeclaration,
            descriptors: vec![&BACKING_MEMBER_NOT_STATIC_READONLY],
            check: check_static_readonly,
        },
        Rule {
            kind: SyntaxKind::PropertyDeclaration,
            descriptors: vec![&BACKING_MEMBER_NOT_STATIC_READONLY],
            check: check_static_readonly,
        },
        Rule {
            kind: SyntaxKind::InvocationExpression,
            descriptors: vec![&SET_VALUE_WITHOUT_KEY],
            check: check_set_value_key,
        },
    ]
}

/// The backing member declared by the visited field/property node, if any.
fn declared_backing(ctx: &RuleContext<'_>) -> Option<BackingMember> {
    let symbol = ctx.oracle.resolve_symbol(ctx.node)?;
    resolve_backing(symbol, ctx.oracle, ctx.vocab)
}

/// Span of the name identifier inside a member declaration, for anchoring
/// findings on the name rather than the whole declaration.
pub(super) fn member_name_span(node: SyntaxNode<'_>) -> Option<Span> {
    let name = match node.kind() {
        SyntaxKind::FieldDeclaration => node
            .first_child_of_kind(SyntaxKind::VariableDeclarator)?
            .child(0)?,
        SyntaxKind::PropertyDeclaration | SyntaxKind::MethodDeclaration => node.child(1)?,
        _ => return None,
    };
    Some(name.span())
}

/// PC0001: `<Name>Property` / `<Name>PropertyKey` / `<Name>Event`.
///
/// Anchored on the CLR wrapper property's name when one exists; otherwise
/// on the registered name. The wrapper-vs-registered comparison itself
/// belongs to PC0020, so one naming defect yields one finding.
fn check_member_name(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let member = declared_backing(ctx)?;
        let anchor = wrappers::wrapper_property_for(&member, ctx.tree, ctx.oracle)
            .and_then(|prop| ctx.oracle.symbol_name(prop))
            .or_else(|| {
                registration_of(member.symbol, ctx.tree, ctx.oracle, ctx.vocab)
                    .and_then(|call| call.name)
                    .map(|name| name.value)
            })?;
        let expected = format!("{}{}", anchor, member.kind.expected_suffix());
        if member.name == expected {
            return None;
        }
        let span = member_name_span(ctx.node).unwrap_or_else(|| ctx.node.span());
        Some(
            Finding::new(
                BACKING_MEMBER_NAME.id,
                span,
                vec![member.name.clone(), expected.clone()],
            )
            .with_property("ExpectedName", expected),
        )
    };
    finding().into_iter().collect()
}

/// PC0002: the registration handle must not be reassignable.
fn check_static_readonly(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let member = declared_backing(ctx)?;
        if ctx.oracle.is_static(member.symbol) && ctx.oracle.is_readonly(member.symbol) {
            return None;
        }
        let span = member_name_span(ctx.node).unwrap_or_else(|| ctx.node.span());
        Some(Finding::new(
            BACKING_MEMBER_NOT_STATIC_READONLY.id,
            span,
            vec![member.name],
        ))
    };
    finding().into_iter().collect()
}

/// PC0015: `SetValue(FooProperty, ...)` where `FooProperty` was registered
/// read-only and a sibling key exists.
///
/// Wrapper setter bodies are skipped; PC0022 owns accessor consistency so
/// the defect is reported once.
fn check_set_value_key(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        if !predicates::is_invocation_named(ctx.node, "SetValue", None) {
            return None;
        }
        if ctx.node.ancestor_of_kind(SyntaxKind::SetAccessor).is_some() {
            return None;
        }
        let arg = predicates::arguments(ctx.node).next()?;
        let expr = predicates::strip_parens(predicates::argument_expression(arg)?);
        let symbol = ctx.oracle.resolve_symbol(expr)?;
        let member = resolve_backing(symbol, ctx.oracle, ctx.vocab)?;
        if member.kind != BackingKind::DependencyProperty {
            return None;
        }
        let key = key_for_property(&member, ctx.tree, ctx.oracle, ctx.vocab)?;
        let key_name = ctx.oracle.symbol_name(key)?;
        Some(
            Finding::new(
                SET_VALUE_WITHOUT_KEY.id,
                expr.span(),
                vec![member.name.clone(), key_name.clone()],
            )
            .with_property("ExpectedName", key_name),
        )
    };
    finding().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::{register_call, run_rules, standard_model};
    use crate::syntax::TreeBuilder;

    #[test]
    fn test_non_static_backing_field_flagged() {
        let mut model = standard_model();
        let mut b = TreeBuilder::new();
        let call = register_call(&mut b, "Bar", "int", "FooControl");
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BarProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let foo = model.find_type("FooControl").unwrap();
        let dp = model.find_type("DependencyProperty").unwrap();
        let symbol = model.declare_field(foo, "BarProperty", dp);
        model.set_declaration(symbol, field);
        // Neither static nor readonly.

        let findings = run_rules(rules(), &tree, &model);
        let flagged: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == RuleId::BackingMemberNotStaticReadonly)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].message_args, vec!["BarProperty"]);
    }

    #[test]
    fn test_misnamed_field_without_wrapper_uses_registered_name() {
        let mut model = standard_model();
        let mut b = TreeBuilder::new();
        let call = register_call(&mut b, "Bar", "int", "FooControl");
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "WrongName", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let foo = model.find_type("FooControl").unwrap();
        let dp = model.find_type("DependencyProperty").unwrap();
        let symbol = model.declare_field(foo, "WrongName", dp);
        model.set_declaration(symbol, field);
        model.mark_static(symbol);
        model.mark_readonly(symbol);

        let findings = run_rules(rules(), &tree, &model);
        let flagged: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == RuleId::BackingMemberName)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].message_args, vec!["WrongName", "BarProperty"]);
        assert_eq!(
            flagged[0].properties.get("ExpectedName").map(String::as_str),
            Some("BarProperty")
        );
    }

    #[test]
    fn test_well_named_field_passes() {
        let mut model = standard_model();
        let mut b = TreeBuilder::new();
        let call = register_call(&mut b, "Bar", "int", "FooControl");
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BarProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let foo = model.find_type("FooControl").unwrap();
        let dp = model.find_type("DependencyProperty").unwrap();
        let symbol = model.declare_field(foo, "BarProperty", dp);
        model.set_declaration(symbol, field);
        model.mark_static(symbol);
        model.mark_readonly(symbol);

        let findings = run_rules(rules(), &tree, &model);
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }

    #[test]
    fn test_ordinary_field_ignored() {
        let mut model = standard_model();
        let mut b = TreeBuilder::new();
        let ty = b.predefined_type("int");
        let init = b.numeric_literal("42");
        let field = b.field(ty, "count", Some(init));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let foo = model.find_type("FooControl").unwrap();
        let int = model.find_type("int").unwrap();
        let symbol = model.declare_field(foo, "count", int);
        model.set_declaration(symbol, field);

        assert!(run_rules(rules(), &tree, &model).is_empty());
    }
}
