//! Shared fixtures for rule unit tests.
//!
//! Builds the minimal WPF-flavoured universe the rules operate in: the
//! framework types, a small control hierarchy, and tree snippets for the
//! common registration shapes. Integration tests carry their own richer
//! fixture under `tests/common`.

use crate::detect::runner::{Rule, Runner};
use crate::detect::types::{CancellationToken, Finding};
use crate::semantic::{DomainVocabulary, SemanticModel};
use crate::syntax::{NodeId, SyntaxTree, TreeBuilder};

/// Framework and test types, with the primitive types based on `object`.
pub fn standard_model() -> SemanticModel {
    let mut model = SemanticModel::new();
    let object = model.declare_type("object");
    for name in ["bool", "string", "void", "int", "double"] {
        let ty = model.declare_type(name);
        model.set_base_type(ty, object);
    }
    let dobj = model.declare_type("DependencyObject");
    model.set_base_type(dobj, object);
    let control = model.declare_type("Control");
    model.set_base_type(control, dobj);
    for name in ["FooControl", "BarControl"] {
        let ty = model.declare_type(name);
        model.set_base_type(ty, control);
    }
    for name in [
        "DependencyProperty",
        "DependencyPropertyKey",
        "RoutedEvent",
        "EventManager",
        "RoutedCommand",
        "DependencyPropertyChangedEventArgs",
        "PropertyMetadata",
        "FrameworkPropertyMetadata",
        "PropertyChangedCallback",
        "CoerceValueCallback",
        "ValidateValueCallback",
    ] {
        let ty = model.declare_type(name);
        model.set_base_type(ty, object);
    }
    model
}

fn type_node(b: &mut TreeBuilder, name: &str) -> NodeId {
    if name.chars().next().is_some_and(|c| c.is_lowercase()) {
        b.predefined_type(name)
    } else {
        b.identifier(name)
    }
}

fn registration(
    b: &mut TreeBuilder,
    method: &str,
    name: &str,
    value: &str,
    owner: &str,
    extra: Vec<NodeId>,
) -> NodeId {
    let target = b.identifier("DependencyProperty");
    let callee = b.member_access(target, method);
    let name_lit = b.string_literal(name);
    let name_arg = b.argument(name_lit);
    let value_ty = type_node(b, value);
    let value_typeof = b.typeof_expr(value_ty);
    let value_arg = b.argument(value_typeof);
    let owner_ty = type_node(b, owner);
    let owner_typeof = b.typeof_expr(owner_ty);
    let owner_arg = b.argument(owner_typeof);
    let mut args = vec![name_arg, value_arg, owner_arg];
    for expr in extra {
        args.push(b.argument(expr));
    }
    b.invocation(callee, args)
}

/// `DependencyProperty.Register(name, typeof(value), typeof(owner))`.
pub fn register_call(b: &mut TreeBuilder, name: &str, value: &str, owner: &str) -> NodeId {
    registration(b, "Register", name, value, owner, Vec::new())
}

/// `Register` with trailing argument expressions (metadata, validate).
pub fn register_call_with(
    b: &mut TreeBuilder,
    name: &str,
    value: &str,
    owner: &str,
    extra: Vec<NodeId>,
) -> NodeId {
    registration(b, "Register", name, value, owner, extra)
}

/// `DependencyProperty.RegisterAttached(...)`.
pub fn attached_register_call(b: &mut TreeBuilder, name: &str, value: &str, owner: &str) -> NodeId {
    registration(b, "RegisterAttached", name, value, owner, Vec::new())
}

/// A CLR wrapper: `type Name { get => (type)GetValue(backing); set =>
/// SetValue(backing, value); }`. Returns the property node and the two
/// backing references for symbol binding.
pub fn wrapper_property(
    b: &mut TreeBuilder,
    name: &str,
    ty: &str,
    backing: &str,
) -> (NodeId, NodeId, NodeId) {
    let prop_ty = type_node(b, ty);

    let get_callee = b.identifier("GetValue");
    let get_ref = b.identifier(backing);
    let get_arg = b.argument(get_ref);
    let get_call = b.invocation(get_callee, vec![get_arg]);
    let cast_ty = type_node(b, ty);
    let getter = b.cast(cast_ty, get_call);

    let set_callee = b.identifier("SetValue");
    let set_ref = b.identifier(backing);
    let set_backing_arg = b.argument(set_ref);
    let value_ref = b.identifier("value");
    let set_value_arg = b.argument(value_ref);
    let setter = b.invocation(set_callee, vec![set_backing_arg, set_value_arg]);

    let property = b.property(prop_ty, name, Some(getter), Some(setter));
    (property, get_ref, set_ref)
}

/// `static void name(DependencyObject d, DependencyPropertyChangedEventArgs
/// e) { ... }`. Returns the method node and the two parameter nodes.
pub fn changed_callback_method(
    b: &mut TreeBuilder,
    name: &str,
    body: Option<NodeId>,
) -> (NodeId, NodeId, NodeId) {
    let ret = b.predefined_type("void");
    let d_ty = b.identifier("DependencyObject");
    let d = b.parameter(d_ty, "d");
    let e_ty = b.identifier("DependencyPropertyChangedEventArgs");
    let e = b.parameter(e_ty, "e");
    let body = body.unwrap_or_else(|| b.block(Vec::new()));
    let method = b.method(ret, name, vec![d, e], body);
    (method, d, e)
}

/// Run a rule list over one tree with a vocabulary resolved from `model`.
pub fn run_rules(rules: Vec<Rule>, tree: &SyntaxTree, model: &SemanticModel) -> Vec<Finding> {
    let vocab = DomainVocabulary::resolve(model).expect("fixture vocabulary");
    let mut runner = Runner::new();
    for rule in rules {
        runner.register(rule);
    }
    runner
        .run(tree, model, &vocab, &CancellationToken::new())
        .expect("fixture run")
}
