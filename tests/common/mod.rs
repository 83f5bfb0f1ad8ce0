//! Shared fixture for the integration tests.
//!
//! Builds the WPF-flavoured universe the analyzer targets: the framework
//! types, a small control hierarchy, and the canonical
//! registration-plus-wrapper scenario the end-to-end tests exercise.

#![allow(dead_code)]

use propcheck::semantic::ConstValue;
use propcheck::{
    DomainVocabulary, NodeId, SemanticModel, SymbolId, SyntaxKind, SyntaxTree, TreeBuilder,
};

pub fn vocab(model: &SemanticModel) -> DomainVocabulary {
    DomainVocabulary::resolve(model).expect("framework types present")
}

/// Framework and test types, primitives based on `object`.
pub fn framework_model() -> SemanticModel {
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
    for name in ["FooControl", "BarControl", "OtherControl"] {
        let ty = model.declare_type(name);
        model.set_base_type(ty, control);
    }
    for name in [
        "DependencyProperty",
        "DependencyPropertyKey",
        "RoutedEvent",
        "RoutedEventHandler",
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

pub fn type_node(b: &mut TreeBuilder, name: &str) -> NodeId {
    if name.chars().next().is_some_and(|c| c.is_lowercase()) {
        b.predefined_type(name)
    } else {
        b.identifier(name)
    }
}

/// `DependencyProperty.<method>(name, typeof(value), typeof(owner), extra...)`.
pub fn registration_call(
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

pub fn register_call(b: &mut TreeBuilder, name: &str, value: &str, owner: &str) -> NodeId {
    registration_call(b, "Register", name, value, owner, Vec::new())
}

/// A CLR wrapper property; returns `(property, get_ref, set_ref)` so the
/// backing references can be bound.
pub fn wrapper_property(
    b: &mut TreeBuilder,
    name: &str,
    ty: &str,
    get_backing: &str,
    set_backing: &str,
) -> (NodeId, NodeId, NodeId) {
    let prop_ty = type_node(b, ty);

    let get_callee = b.identifier("GetValue");
    let get_ref = b.identifier(get_backing);
    let get_arg = b.argument(get_ref);
    let get_call = b.invocation(get_callee, vec![get_arg]);
    let cast_ty = type_node(b, ty);
    let getter = b.cast(cast_ty, get_call);

    let set_callee = b.identifier("SetValue");
    let set_ref = b.identifier(set_backing);
    let set_backing_arg = b.argument(set_ref);
    let value_ref = b.identifier("value");
    let set_value_arg = b.argument(value_ref);
    let setter = b.invocation(set_callee, vec![set_backing_arg, set_value_arg]);

    let property = b.property(prop_ty, name, Some(getter), Some(setter));
    (property, get_ref, set_ref)
}

/// The canonical scenario: one registration with metadata, one wrapper.
///
/// ```text
/// class FooControl {
///     static readonly DependencyProperty BarProperty =
///         DependencyProperty.Register(<registered>, typeof(int),
///             typeof(FooControl), new PropertyMetadata(default(int)));
///     int Bar { get => (int)GetValue(BarProperty);
///               set => SetValue(BarProperty, value); }
/// }
/// ```
pub struct Scenario {
    pub tree: SyntaxTree,
    pub model: SemanticModel,
    pub field: NodeId,
    pub field_symbol: SymbolId,
    pub property: NodeId,
    pub property_symbol: SymbolId,
    /// The `Bar` identifier of the wrapper property declaration.
    pub property_name_node: NodeId,
    pub registration: NodeId,
}

pub fn canonical_scenario(registered: &str) -> Scenario {
    let mut model = framework_model();
    let mut b = TreeBuilder::new();

    let meta_ty = b.identifier("PropertyMetadata");
    let default = b.leaf(SyntaxKind::DefaultExpression, "default(int)");
    let default_arg = b.argument(default);
    let metadata = b.object_creation(meta_ty, vec![default_arg]);
    let registration = registration_call(
        &mut b,
        "Register",
        registered,
        "int",
        "FooControl",
        vec![metadata],
    );
    let field_ty = b.identifier("DependencyProperty");
    let field = b.field(field_ty, "BarProperty", Some(registration));
    let (property, get_ref, set_ref) =
        wrapper_property(&mut b, "Bar", "int", "BarProperty", "BarProperty");
    let class = b.class("FooControl", vec![field, property]);
    let tree = b.finish(class);

    let foo = model.find_type("FooControl").unwrap();
    let dp = model.find_type("DependencyProperty").unwrap();
    let int = model.find_type("int").unwrap();
    let field_symbol = model.declare_field(foo, "BarProperty", dp);
    model.set_declaration(field_symbol, field);
    model.mark_static(field_symbol);
    model.mark_readonly(field_symbol);
    let property_symbol = model.declare_property(foo, "Bar", int);
    model.set_declaration(property_symbol, property);
    model.bind_symbol(get_ref, field_symbol);
    model.bind_symbol(set_ref, field_symbol);
    model.bind_type(default, int);

    let property_name_node = tree
        .node(property)
        .child(1)
        .expect("property name")
        .id();

    Scenario {
        tree,
        model,
        field,
        field_symbol,
        property,
        property_symbol,
        property_name_node,
        registration,
    }
}

/// The read-only scenario: a key registration, the derived property via
/// the `Key.DependencyProperty` alias, a wrapper whose setter (wrongly)
/// writes through the property, and a helper method doing the same.
///
/// ```text
/// class FooControl {
///     static readonly DependencyPropertyKey BarPropertyKey =
///         DependencyProperty.RegisterReadOnly("Bar", typeof(int), typeof(FooControl));
///     static readonly DependencyProperty BarProperty = BarPropertyKey.DependencyProperty;
///     int Bar { get => (int)GetValue(BarProperty);
///               set => SetValue(BarProperty, value); }
///     void Reset() { SetValue(BarProperty, 0); }
/// }
/// ```
pub struct KeyedScenario {
    pub tree: SyntaxTree,
    pub model: SemanticModel,
    pub key_field: NodeId,
    pub key_symbol: SymbolId,
    pub property_field: NodeId,
    pub property_symbol: SymbolId,
    /// The `RegisterReadOnly` invocation both members resolve to.
    pub registration: NodeId,
}

pub fn keyed_scenario() -> KeyedScenario {
    let mut model = framework_model();
    let mut b = TreeBuilder::new();

    let registration =
        registration_call(&mut b, "RegisterReadOnly", "Bar", "int", "FooControl", Vec::new());
    let key_ty = b.identifier("DependencyPropertyKey");
    let key_field = b.field(key_ty, "BarPropertyKey", Some(registration));

    let alias_target = b.identifier("BarPropertyKey");
    let alias = b.member_access(alias_target, "DependencyProperty");
    let property_ty = b.identifier("DependencyProperty");
    let property_field = b.field(property_ty, "BarProperty", Some(alias));

    let (wrapper, get_ref, set_ref) =
        wrapper_property(&mut b, "Bar", "int", "BarProperty", "BarProperty");

    let reset_ret = b.predefined_type("void");
    let reset_callee = b.identifier("SetValue");
    let reset_ref = b.identifier("BarProperty");
    let reset_backing_arg = b.argument(reset_ref);
    let zero = b.numeric_literal("0");
    let reset_value_arg = b.argument(zero);
    let reset_call = b.invocation(reset_callee, vec![reset_backing_arg, reset_value_arg]);
    let reset_stmt = b.expression_statement(reset_call);
    let reset_body = b.block(vec![reset_stmt]);
    let reset = b.method(reset_ret, "Reset", Vec::new(), reset_body);

    let class = b.class("FooControl", vec![key_field, property_field, wrapper, reset]);
    let tree = b.finish(class);

    let foo = model.find_type("FooControl").unwrap();
    let dp = model.find_type("DependencyProperty").unwrap();
    let dp_key = model.find_type("DependencyPropertyKey").unwrap();
    let int = model.find_type("int").unwrap();
    let void = model.find_type("void").unwrap();

    let key_symbol = model.declare_field(foo, "BarPropertyKey", dp_key);
    model.set_declaration(key_symbol, key_field);
    model.mark_static(key_symbol);
    model.mark_readonly(key_symbol);

    let property_symbol = model.declare_field(foo, "BarProperty", dp);
    model.set_declaration(property_symbol, property_field);
    model.mark_static(property_symbol);
    model.mark_readonly(property_symbol);
    model.bind_symbol(alias_target, key_symbol);

    let wrapper_symbol = model.declare_property(foo, "Bar", int);
    model.set_declaration(wrapper_symbol, wrapper);
    model.bind_symbol(get_ref, property_symbol);
    model.bind_symbol(set_ref, property_symbol);

    let reset_symbol = model.declare_method(foo, "Reset", void);
    model.set_declaration(reset_symbol, reset);
    model.bind_symbol(reset_ref, property_symbol);

    KeyedScenario {
        tree,
        model,
        key_field,
        key_symbol,
        property_field,
        property_symbol,
        registration,
    }
}

/// Fold helper for tests that bind constants by hand.
pub fn str_const(value: &str) -> ConstValue {
    ConstValue::Str(value.to_string())
}
