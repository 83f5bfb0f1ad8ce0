//! Rules over registration call sites.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::{
    match_callback_expression, match_registration, resolve_metadata, CallbackRole, NameForm,
    RegistrationCall,
};
use crate::analysis::predicates;
use crate::semantic::TypeId;
use crate::syntax::SyntaxKind;

use super::runner::{Rule, RuleContext};
use super::types::{Finding, RuleDescriptor, RuleId, Severity};

pub static REGISTERED_NAME_INVALID: RuleDescriptor = RuleDescriptor {
    id: RuleId::RegisteredNameInvalid,
    title: "Registered names are valid identifiers",
    message_template: "Registered name '{0}' is not a valid identifier",
    default_severity: Severity::Error,
};

pub static OWNER_TYPE_MISMATCH: RuleDescriptor = RuleDescriptor {
    id: RuleId::OwnerTypeMismatch,
    title: "Registered owner type matches the containing type",
    message_template: "Registered owner type '{0}' does not match the containing type '{1}'",
    default_severity: Severity::Error,
};

pub static DEFAULT_VALUE_TYPE_MISMATCH: RuleDescriptor = RuleDescriptor {
    id: RuleId::DefaultValueTypeMismatch,
    title: "Metadata default values match the registered value type",
    message_template: "Default value of type '{0}' is not assignable to the registered value type '{1}'",
    default_severity: Severity::Error,
};

pub static CALLBACK_SLOT_MISMATCH: RuleDescriptor = RuleDescriptor {
    id: RuleId::CallbackSlotMismatch,
    title: "Callback arguments match their metadata slot",
    message_template: "Callback in the {0} slot has the shape of a {1} callback",
    default_severity: Severity::Error,
};

pub static PREFER_NAMEOF: RuleDescriptor = RuleDescriptor {
    id: RuleId::PreferNameof,
    title: "Registered names use nameof",
    message_template: "Registered name '{0}' is a string literal; prefer nameof",
    default_severity: Severity::Info,
};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex"));

pub(super) fn default_rules() -> Vec<Rule> {
    let mut rules = Vec::new();
    // Registrations appear as static-method invocations and, for routed
    // commands, as constructions.
    for kind in [
        SyntaxKind::InvocationExpression,
        SyntaxKind::ObjectCreationExpression,
    ] {
        rules.push(Rule {
            kind,
            descriptors: vec![&REGISTERED_NAME_INVALID],
            check: check_registered_name,
        });
        rules.push(Rule {
            kind,
            descriptors: vec![&OWNER_TYPE_MISMATCH],
            check: check_owner_type,
        });
    }
    rules.push(Rule {
        kind: SyntaxKind::InvocationExpression,
        descriptors: vec![&DEFAULT_VALUE_TYPE_MISMATCH],
        check: check_default_value,
    });
    rules.push(Rule {
        kind: SyntaxKind::InvocationExpression,
        descriptors: vec![&CALLBACK_SLOT_MISMATCH],
        check: check_callback_slots,
    });
    rules
}

pub(super) fn style_rules() -> Vec<Rule> {
    vec![
        Rule {
            kind: SyntaxKind::InvocationExpression,
            descriptors: vec![&PREFER_NAMEOF],
            check: check_prefer_nameof,
        },
        Rule {
            kind: SyntaxKind::ObjectCreationExpression,
            descriptors: vec![&PREFER_NAMEOF],
            check: check_prefer_nameof,
        },
    ]
}

pub(super) fn type_display(oracle: &dyn crate::semantic::SemanticOracle, ty: TypeId) -> String {
    oracle.type_name(ty).unwrap_or_else(|| ty.to_string())
}

fn matched(ctx: &RuleContext<'_>) -> Option<RegistrationCall> {
    match_registration(ctx.node, ctx.oracle, ctx.vocab)
}

/// PC0010.
fn check_registered_name(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let name = matched(ctx)?.name?;
        if IDENTIFIER.is_match(&name.value) {
            return None;
        }
        Some(Finding::new(
            REGISTERED_NAME_INVALID.id,
            ctx.tree.node(name.argument).span(),
            vec![name.value],
        ))
    };
    finding().into_iter().collect()
}

/// PC0011: `typeof(...)` owner argument against the class the registration
/// lexically sits in.
fn check_owner_type(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let owner = matched(ctx)?.owner_type?;
        let class = ctx.node.ancestor_of_kind(SyntaxKind::ClassDeclaration)?;
        let class_ty = ctx.oracle.resolve_type(class.child(0)?)?;
        if owner.resolved == class_ty {
            return None;
        }
        Some(Finding::new(
            OWNER_TYPE_MISMATCH.id,
            ctx.tree.node(owner.argument).span(),
            vec![
                type_display(ctx.oracle, owner.resolved),
                type_display(ctx.oracle, class_ty),
            ],
        ))
    };
    finding().into_iter().collect()
}

/// PC0012.
fn check_default_value(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let call = matched(ctx)?;
        let value_type = call.value_type?;
        let metadata = resolve_metadata(ctx.tree.node(call.metadata?), ctx.oracle, ctx.vocab)?;
        let default = ctx.tree.node(metadata.default_value?);
        let default_ty = ctx.oracle.type_of(default)?;
        if ctx.oracle.is_assignable(default_ty, value_type.resolved) {
            return None;
        }
        Some(Finding::new(
            DEFAULT_VALUE_TYPE_MISMATCH.id,
            default.span(),
            vec![
                type_display(ctx.oracle, default_ty),
                type_display(ctx.oracle, value_type.resolved),
            ],
        ))
    };
    finding().into_iter().collect()
}

fn role_name(role: CallbackRole) -> &'static str {
    match role {
        CallbackRole::Changed => "changed",
        CallbackRole::Coerce => "coerce",
        CallbackRole::Validate => "validate",
    }
}

/// PC0013: each callback slot gets a callback of its own shape.
///
/// An expression the matcher cannot classify at all is left alone; absence
/// of a fact is not a defect.
fn check_callback_slots(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let call = match matched(ctx) {
        Some(call) => call,
        None => return Vec::new(),
    };

    let mut findings = Vec::new();
    if let Some(metadata) =
        call.metadata
            .and_then(|arg| resolve_metadata(ctx.tree.node(arg), ctx.oracle, ctx.vocab))
    {
        check_slot(ctx, metadata.changed_callback, CallbackRole::Changed, &mut findings);
        check_slot(ctx, metadata.coerce_callback, CallbackRole::Coerce, &mut findings);
    }
    check_slot(ctx, call.validate, CallbackRole::Validate, &mut findings);
    findings
}

fn check_slot(
    ctx: &RuleContext<'_>,
    slot: Option<crate::syntax::NodeId>,
    expected: CallbackRole,
    findings: &mut Vec<Finding>,
) {
    let arg = match slot {
        Some(arg) => ctx.tree.node(arg),
        None => return,
    };
    let expr = match predicates::argument_expression(arg) {
        Some(expr) => expr,
        None => return,
    };
    if let Some(callback) = match_callback_expression(expr, ctx.oracle, ctx.vocab) {
        if callback.role != expected {
            findings.push(Finding::new(
                CALLBACK_SLOT_MISMATCH.id,
                expr.span(),
                vec![
                    role_name(expected).to_string(),
                    role_name(callback.role).to_string(),
                ],
            ));
        }
    }
}

/// PC0014 (style).
fn check_prefer_nameof(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let name = matched(ctx)?.name?;
        if name.form != NameForm::Literal {
            return None;
        }
        Some(Finding::new(
            PREFER_NAMEOF.id,
            ctx.tree.node(name.argument).span(),
            vec![name.value],
        ))
    };
    finding().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::{register_call, register_call_with, run_rules, standard_model};
    use crate::syntax::TreeBuilder;

    #[test]
    fn test_invalid_registered_name() {
        let model = standard_model();
        let mut b = TreeBuilder::new();
        let call = register_call(&mut b, "123bad", "int", "FooControl");
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BadProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let findings = run_rules(default_rules(), &tree, &model);
        let flagged: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == RuleId::RegisteredNameInvalid)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].message_args, vec!["123bad"]);
    }

    #[test]
    fn test_owner_type_mismatch() {
        let model = standard_model();
        let mut b = TreeBuilder::new();
        let call = register_call(&mut b, "Bar", "int", "BarControl");
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BarProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let findings = run_rules(default_rules(), &tree, &model);
        let flagged: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == RuleId::OwnerTypeMismatch)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].message_args, vec!["BarControl", "FooControl"]);
    }

    #[test]
    fn test_default_value_type_mismatch() {
        let model = standard_model();
        let mut b = TreeBuilder::new();
        let meta_ty = b.identifier("PropertyMetadata");
        let default = b.string_literal("oops");
        let default_arg = b.argument(default);
        let metadata = b.object_creation(meta_ty, vec![default_arg]);
        let call = register_call_with(&mut b, "Bar", "int", "FooControl", vec![metadata]);
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BarProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let findings = run_rules(default_rules(), &tree, &model);
        let flagged: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == RuleId::DefaultValueTypeMismatch)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].message_args, vec!["string", "int"]);
    }

    #[test]
    fn test_named_arguments_reordered() {
        // `Register(propertyType: ..., name: ...)` still extracts the right
        // slots; the invalid name is found.
        let model = standard_model();
        let mut b = TreeBuilder::new();
        let target = b.identifier("DependencyProperty");
        let callee = b.member_access(target, "Register");
        let value_ty = b.predefined_type("int");
        let value_typeof = b.typeof_expr(value_ty);
        let value_arg = b.named_argument("propertyType", value_typeof);
        let name_lit = b.string_literal("no good");
        let name_arg = b.named_argument("name", name_lit);
        let owner_ty = b.identifier("FooControl");
        let owner_typeof = b.typeof_expr(owner_ty);
        let owner_arg = b.named_argument("ownerType", owner_typeof);
        let call = b.invocation(callee, vec![value_arg, name_arg, owner_arg]);
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BarProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        let findings = run_rules(default_rules(), &tree, &model);
        let flagged: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == RuleId::RegisteredNameInvalid)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].message_args, vec!["no good"]);
    }

    #[test]
    fn test_literal_name_is_style_only() {
        let model = standard_model();
        let mut b = TreeBuilder::new();
        let call = register_call(&mut b, "Bar", "int", "FooControl");
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BarProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        assert!(run_rules(default_rules(), &tree, &model).is_empty());
        let styled = run_rules(style_rules(), &tree, &model);
        assert_eq!(styled.len(), 1);
        assert_eq!(styled[0].rule, RuleId::PreferNameof);
    }

    #[test]
    fn test_nameof_name_passes_style() {
        let model = standard_model();
        let mut b = TreeBuilder::new();
        let target = b.identifier("DependencyProperty");
        let callee = b.member_access(target, "Register");
        let referent = b.identifier("Bar");
        let nameof = b.nameof_expr(referent);
        let name_arg = b.argument(nameof);
        let value_ty = b.predefined_type("int");
        let value_typeof = b.typeof_expr(value_ty);
        let value_arg = b.argument(value_typeof);
        let owner_ty = b.identifier("FooControl");
        let owner_typeof = b.typeof_expr(owner_ty);
        let owner_arg = b.argument(owner_typeof);
        let call = b.invocation(callee, vec![name_arg, value_arg, owner_arg]);
        let ty = b.identifier("DependencyProperty");
        let field = b.field(ty, "BarProperty", Some(call));
        let class = b.class("FooControl", vec![field]);
        let tree = b.finish(class);

        assert!(run_rules(style_rules(), &tree, &model).is_empty());
    }
}
