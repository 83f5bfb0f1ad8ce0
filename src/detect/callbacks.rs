//! Rules over property-changed / coerce / validate callbacks.

use crate::analysis::{
    callback_body, check_parameter_casts, find_callback_usages, match_callback_expression,
    match_callback_role, match_registration, resolve_metadata, CallbackMatch, CallbackRole,
    CastConcern, CastConcernKind, RegistrationCall,
};
use crate::analysis::predicates;
use crate::analysis::walker::{effective_argument, find_single_usage};
use crate::semantic::TypeId;
use crate::syntax::{SyntaxKind, SyntaxNode};

use super::backing_members::member_name_span;
use super::registrations::type_display;
use super::runner::{Rule, RuleContext};
use super::types::{Finding, RuleDescriptor, RuleId, Severity};

pub static CALLBACK_NAME: RuleDescriptor = RuleDescriptor {
    id: RuleId::CallbackName,
    title: "Callback names match the registered name",
    message_template: "Callback '{0}' should be named '{1}'",
    default_severity: Severity::Warning,
};

pub static CAST_UNRELATED_TYPE: RuleDescriptor = RuleDescriptor {
    id: RuleId::CastUnrelatedType,
    title: "Callback casts agree with the registered types",
    message_template: "Cast to '{0}' but the expected type is '{1}'",
    default_severity: Severity::Error,
};

pub static CAST_NOT_EXACT_TYPE: RuleDescriptor = RuleDescriptor {
    id: RuleId::CastNotExactType,
    title: "Callback casts use the exact registered type",
    message_template: "Cast to '{0}' where the exact expected type is '{1}'",
    default_severity: Severity::Warning,
};

pub(super) fn rules() -> Vec<Rule> {
    vec![
        Rule {
            kind: SyntaxKind::MethodDeclaration,
            descriptors: vec![&CALLBACK_NAME],
            check: check_callback_name,
        },
        Rule {
            kind: SyntaxKind::MethodDeclaration,
            descriptors: vec![&CAST_UNRELATED_TYPE, &CAST_NOT_EXACT_TYPE],
            check: check_method_casts,
        },
        // Inline lambdas never reach a MethodDeclaration visit; they are
        // checked from the registration that carries them.
        Rule {
            kind: SyntaxKind::InvocationExpression,
            descriptors: vec![&CAST_UNRELATED_TYPE, &CAST_NOT_EXACT_TYPE],
            check: check_lambda_casts,
        },
    ]
}

/// The registration call an argument lexically sits in, however deep the
/// metadata nesting.
fn enclosing_registration(
    arg: SyntaxNode<'_>,
    ctx: &RuleContext<'_>,
) -> Option<RegistrationCall> {
    for ancestor in arg.ancestors() {
        if matches!(
            ancestor.kind(),
            SyntaxKind::InvocationExpression | SyntaxKind::ObjectCreationExpression
        ) {
            if let Some(call) = match_registration(ancestor, ctx.oracle, ctx.vocab) {
                return Some(call);
            }
        }
    }
    None
}

fn expected_name_parts(role: CallbackRole, registered: &str) -> Vec<&str> {
    match role {
        CallbackRole::Changed => vec!["On", registered, "Changed"],
        CallbackRole::Coerce => vec!["Coerce", registered],
        CallbackRole::Validate => vec!["IsValid", registered],
    }
}

/// PC0040: `On<Name>Changed` / `Coerce<Name>` / `IsValid<Name>`.
///
/// Applies only when the method has exactly one reference in the class; a
/// second reference makes the rename this rule suggests ambiguous, so the
/// rule stays silent even when both uses would be equivalent.
fn check_callback_name(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let finding = || -> Option<Finding> {
        let method = ctx.oracle.resolve_symbol(ctx.node)?;
        let callback = match_callback_role(method, ctx.oracle, ctx.vocab)?;
        let class = ctx.node.ancestor_of_kind(SyntaxKind::ClassDeclaration)?;
        let name = ctx.oracle.symbol_name(method)?;

        let usage = find_single_usage(Some(class), &name)?;
        let arg = effective_argument(usage, ctx.oracle, ctx.vocab)?;
        let registered = enclosing_registration(arg, ctx)?.name?.value;

        let parts = expected_name_parts(callback.role, &registered);
        if predicates::is_parts_name(&name, &parts) {
            return None;
        }
        let expected = parts.concat();
        let span = member_name_span(ctx.node).unwrap_or_else(|| ctx.node.span());
        Some(
            Finding::new(CALLBACK_NAME.id, span, vec![name, expected.clone()])
                .with_property("ExpectedName", expected),
        )
    };
    finding().into_iter().collect()
}

/// PC0041/PC0042 for named callback methods.
fn check_method_casts(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let method = match ctx.oracle.resolve_symbol(ctx.node) {
        Some(method) => method,
        None => return Vec::new(),
    };
    let callback = match match_callback_role(method, ctx.oracle, ctx.vocab) {
        Some(callback) => callback,
        None => return Vec::new(),
    };
    let class = match ctx.node.ancestor_of_kind(SyntaxKind::ClassDeclaration) {
        Some(class) => class,
        None => return Vec::new(),
    };

    // The expected types come from the registration the callback is wired
    // into. Distinct registrations with distinct types make the expectation
    // ambiguous; verify nothing rather than guess.
    let mut expectations: Vec<(Option<TypeId>, Option<TypeId>)> =
        find_callback_usages(method, class, ctx.oracle, ctx.vocab)
            .into_iter()
            .filter_map(|arg| enclosing_registration(arg, ctx))
            .map(|call| {
                (
                    call.owner_type.map(|t| t.resolved),
                    call.value_type.map(|t| t.resolved),
                )
            })
            .collect();
    expectations.sort();
    expectations.dedup();
    let (owner, value) = match expectations.as_slice() {
        [single] => *single,
        _ => return Vec::new(),
    };

    let body = match callback_body(callback.target, ctx.tree, ctx.oracle) {
        Some(body) => body,
        None => return Vec::new(),
    };
    cast_findings(ctx, body, &callback, owner, value)
}

/// PC0041/PC0042 for lambdas carried directly by a registration.
fn check_lambda_casts(ctx: &RuleContext<'_>) -> Vec<Finding> {
    let call = match match_registration(ctx.node, ctx.oracle, ctx.vocab) {
        Some(call) => call,
        None => return Vec::new(),
    };
    let owner = call.owner_type.map(|t| t.resolved);
    let value = call.value_type.map(|t| t.resolved);

    let mut slots = Vec::new();
    if let Some(metadata) = call
        .metadata
        .and_then(|arg| resolve_metadata(ctx.tree.node(arg), ctx.oracle, ctx.vocab))
    {
        slots.push(metadata.changed_callback);
        slots.push(metadata.coerce_callback);
    }
    slots.push(call.validate);

    let mut findings = Vec::new();
    for slot in slots.into_iter().flatten() {
        let expr = match predicates::argument_expression(ctx.tree.node(slot)) {
            Some(expr) => predicates::strip_parens(expr),
            None => continue,
        };
        if !expr.kind().is_lambda() {
            continue;
        }
        let callback = match match_callback_expression(expr, ctx.oracle, ctx.vocab) {
            Some(callback) => callback,
            None => continue,
        };
        let body = match callback_body(callback.target, ctx.tree, ctx.oracle) {
            Some(body) => body,
            None => continue,
        };
        findings.extend(cast_findings(ctx, body, &callback, owner, value));
    }
    findings
}

fn cast_findings(
    ctx: &RuleContext<'_>,
    body: SyntaxNode<'_>,
    callback: &CallbackMatch,
    owner: Option<TypeId>,
    value: Option<TypeId>,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    if let (Some(parameter), Some(expected)) = (callback.sender_parameter, owner) {
        for concern in check_parameter_casts(body, parameter, expected, ctx.oracle, ctx.vocab) {
            findings.push(concern_finding(ctx, concern, expected));
        }
    }
    if let (Some(parameter), Some(expected)) = (callback.value_parameter, value) {
        for concern in check_parameter_casts(body, parameter, expected, ctx.oracle, ctx.vocab) {
            findings.push(concern_finding(ctx, concern, expected));
        }
    }
    findings
}

fn concern_finding(ctx: &RuleContext<'_>, concern: CastConcern, expected: TypeId) -> Finding {
    let rule = match concern.kind {
        CastConcernKind::WrongType => CAST_UNRELATED_TYPE.id,
        CastConcernKind::PreferExact => CAST_NOT_EXACT_TYPE.id,
    };
    Finding::new(
        rule,
        ctx.tree.node(concern.node).span(),
        vec![
            type_display(ctx.oracle, concern.found),
            type_display(ctx.oracle, expected),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::{
        changed_callback_method, register_call_with, run_rules, standard_model,
    };
    use crate::syntax::TreeBuilder;

    #[test]
    fn test_misnamed_changed_callback() {
        let mut model = standard_model();
        let mut b = TreeBuilder::new();

        let meta_ty = b.identifier("PropertyMetadata");
        let default = b.leaf(SyntaxKind::DefaultExpression, "default(int)");
        let default_arg = b.argument(default);
        let callback_ref = b.identifier("OnWrongChanged");
        let callback_arg = b.argument(callback_ref);
        let metadata = b.object_creation(meta_ty, vec![default_arg, callback_arg]);
        let call = register_call_with(&mut b, "Bar", "int", "FooControl", vec![metadata]);
        let field_ty = b.identifier("DependencyProperty");
        let field = b.field(field_ty, "BarProperty", Some(call));

        let (method, _d_ref, _e_ref) = changed_callback_method(&mut b, "OnWrongChanged", None);
        let class = b.class("FooControl", vec![field, method]);
        let tree = b.finish(class);

        let foo = model.find_type("FooControl").unwrap();
        let dp = model.find_type("DependencyProperty").unwrap();
        let dobj = model.find_type("DependencyObject").unwrap();
        let args_ty = model.find_type("DependencyPropertyChangedEventArgs").unwrap();
        let void = model.find_type("void").unwrap();
        let int = model.find_type("int").unwrap();
        let field_sym = model.declare_field(foo, "BarProperty", dp);
        model.set_declaration(field_sym, field);
        let method_sym = model.declare_method(foo, "OnWrongChanged", void);
        model.declare_parameter(method_sym, "d", dobj);
        model.declare_parameter(method_sym, "e", args_ty);
        model.set_declaration(method_sym, method);
        model.bind_symbol(callback_ref, method_sym);
        model.bind_type(default, int);

        let findings = run_rules(rules(), &tree, &model);
        let flagged: Vec<_> = findings
            .iter()
            .filter(|f| f.rule == RuleId::CallbackName)
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].message_args, vec!["OnWrongChanged", "OnBarChanged"]);
        assert_eq!(
            flagged[0].properties.get("ExpectedName").map(String::as_str),
            Some("OnBarChanged")
        );
    }

    #[test]
    fn test_well_named_callback_passes() {
        let mut model = standard_model();
        let mut b = TreeBuilder::new();

        let meta_ty = b.identifier("PropertyMetadata");
        let callback_ref = b.identifier("OnBarChanged");
        let callback_arg = b.argument(callback_ref);
        let metadata = b.object_creation(meta_ty, vec![callback_arg]);
        let call = register_call_with(&mut b, "Bar", "int", "FooControl", vec![metadata]);
        let field_ty = b.identifier("DependencyProperty");
        let field = b.field(field_ty, "BarProperty", Some(call));

        let (method, _d_ref, _e_ref) = changed_callback_method(&mut b, "OnBarChanged", None);
        let class = b.class("FooControl", vec![field, method]);
        let tree = b.finish(class);

        let foo = model.find_type("FooControl").unwrap();
        let dp = model.find_type("DependencyProperty").unwrap();
        let dobj = model.find_type("DependencyObject").unwrap();
        let args_ty = model.find_type("DependencyPropertyChangedEventArgs").unwrap();
        let void = model.find_type("void").unwrap();
        let field_sym = model.declare_field(foo, "BarProperty", dp);
        model.set_declaration(field_sym, field);
        let method_sym = model.declare_method(foo, "OnBarChanged", void);
        model.declare_parameter(method_sym, "d", dobj);
        model.declare_parameter(method_sym, "e", args_ty);
        model.set_declaration(method_sym, method);
        model.bind_symbol(callback_ref, method_sym);

        let findings = run_rules(rules(), &tree, &model);
        assert!(findings.is_empty(), "unexpected findings: {:?}", findings);
    }
}
