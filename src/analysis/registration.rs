//! Registration-call matcher.
//!
//! Matches an invocation (or `RoutedCommand` construction) against the
//! catalogue of registration shapes and extracts the name / value-type /
//! owner-type / metadata argument slots. Slots are found by parameter name
//! when the call site labels arguments, else by canonical position, so
//! reordered and optional trailing arguments are tolerated.

use tracing::debug;

use crate::semantic::{
    ConstValue, DomainVocabulary, SemanticOracle, SymbolKind, TypeId, REGISTRATION_METHOD_NAMES,
};
use crate::syntax::{NodeId, SyntaxKind, SyntaxNode};

use super::predicates;

/// Which registration shape an invocation matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationKind {
    Register,
    RegisterReadOnly,
    RegisterAttached,
    RegisterAttachedReadOnly,
    AddOwner,
    OverrideMetadata,
    RegisterRoutedEvent,
    RoutedCommand,
}

impl RegistrationKind {
    /// Whether this shape declares a new backing entity (as opposed to
    /// amending an existing one).
    pub fn declares_backing(&self) -> bool {
        !matches!(self, RegistrationKind::OverrideMetadata)
    }

    /// Whether this shape registers a read-only property (backed by a key).
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterReadOnly | RegistrationKind::RegisterAttachedReadOnly
        )
    }

    /// Whether this shape registers an attached property.
    pub fn is_attached(&self) -> bool {
        matches!(
            self,
            RegistrationKind::RegisterAttached | RegistrationKind::RegisterAttachedReadOnly
        )
    }
}

/// How the name argument was written at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameForm {
    Literal,
    Nameof,
    ConstReference,
}

/// The constant-folded name slot.
#[derive(Debug, Clone)]
pub struct NameArgument {
    /// The `Argument` node supplying the name.
    pub argument: NodeId,
    pub value: String,
    pub form: NameForm,
}

/// A resolved `typeof(...)` slot.
#[derive(Debug, Clone, Copy)]
pub struct TypeArgument {
    /// The `Argument` node supplying the type.
    pub argument: NodeId,
    pub resolved: TypeId,
}

/// A matched registration invocation with its extracted slots.
///
/// `kind` fully determines which slots are meaningful; slots a shape does
/// not supply are always `None`. A malformed slot (e.g. a `typeof` argument
/// that is not a type) is also `None` while `kind` still reports the match;
/// rules decide whether the hole is itself a defect.
#[derive(Debug, Clone)]
pub struct RegistrationCall {
    pub invocation: NodeId,
    pub kind: RegistrationKind,
    pub name: Option<NameArgument>,
    pub value_type: Option<TypeArgument>,
    pub owner_type: Option<TypeArgument>,
    /// The `Argument` node supplying metadata, if any.
    pub metadata: Option<NodeId>,
    /// The `Argument` node supplying a validate callback, if any.
    pub validate: Option<NodeId>,
    pub handler_type: Option<TypeArgument>,
    /// The `Argument` node supplying a key (`OverrideMetadata` only).
    pub key: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotRole {
    Name,
    ValueType,
    OwnerType,
    Metadata,
    Validate,
    RoutingStrategy,
    HandlerType,
    Key,
}

struct SlotSpec {
    role: SlotRole,
    param: &'static str,
    position: usize,
}

const fn slot(role: SlotRole, param: &'static str, position: usize) -> SlotSpec {
    SlotSpec {
        role,
        param,
        position,
    }
}

struct ShapeSpec {
    kind: RegistrationKind,
    method: &'static str,
    min_args: usize,
    max_args: usize,
    slots: &'static [SlotSpec],
}

const REGISTER_SLOTS: &[SlotSpec] = &[
    slot(SlotRole::Name, "name", 0),
    slot(SlotRole::ValueType, "propertyType", 1),
    slot(SlotRole::OwnerType, "ownerType", 2),
    slot(SlotRole::Metadata, "typeMetadata", 3),
    slot(SlotRole::Validate, "validateValueCallback", 4),
];

const ADD_OWNER_SLOTS: &[SlotSpec] = &[
    slot(SlotRole::OwnerType, "ownerType", 0),
    slot(SlotRole::Metadata, "typeMetadata", 1),
];

const OVERRIDE_METADATA_SLOTS: &[SlotSpec] = &[
    slot(SlotRole::OwnerType, "forType", 0),
    slot(SlotRole::Metadata, "typeMetadata", 1),
    slot(SlotRole::Key, "key", 2),
];

const ROUTED_EVENT_SLOTS: &[SlotSpec] = &[
    slot(SlotRole::Name, "name", 0),
    slot(SlotRole::RoutingStrategy, "routingStrategy", 1),
    slot(SlotRole::HandlerType, "handlerType", 2),
    slot(SlotRole::OwnerType, "ownerType", 3),
];

const ROUTED_COMMAND_SLOTS: &[SlotSpec] = &[
    slot(SlotRole::Name, "name", 0),
    slot(SlotRole::OwnerType, "ownerType", 1),
];

const SHAPES: &[ShapeSpec] = &[
    ShapeSpec {
        kind: RegistrationKind::Register,
        method: "Register",
        min_args: 3,
        max_args: 5,
        slots: REGISTER_SLOTS,
    },
    ShapeSpec {
        kind: RegistrationKind::RegisterReadOnly,
        method: "RegisterReadOnly",
        min_args: 3,
        max_args: 5,
        slots: REGISTER_SLOTS,
    },
    ShapeSpec {
        kind: RegistrationKind::RegisterAttached,
        method: "RegisterAttached",
        min_args: 3,
        max_args: 5,
        slots: REGISTER_SLOTS,
    },
    ShapeSpec {
        kind: RegistrationKind::RegisterAttachedReadOnly,
        method: "RegisterAttachedReadOnly",
        min_args: 3,
        max_args: 5,
        slots: REGISTER_SLOTS,
    },
    ShapeSpec {
        kind: RegistrationKind::AddOwner,
        method: "AddOwner",
        min_args: 1,
        max_args: 2,
        slots: ADD_OWNER_SLOTS,
    },
    ShapeSpec {
        kind: RegistrationKind::OverrideMetadata,
        method: "OverrideMetadata",
        min_args: 1,
        max_args: 3,
        slots: OVERRIDE_METADATA_SLOTS,
    },
    ShapeSpec {
        kind: RegistrationKind::RegisterRoutedEvent,
        method: "RegisterRoutedEvent",
        min_args: 4,
        max_args: 4,
        slots: ROUTED_EVENT_SLOTS,
    },
];

/// Match an invocation or object creation against the registration
/// catalogue.
pub fn match_registration(
    node: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<RegistrationCall> {
    match node.kind() {
        SyntaxKind::InvocationExpression => match_invocation(node, oracle, vocab),
        SyntaxKind::ObjectCreationExpression => match_routed_command(node, oracle, vocab),
        _ => None,
    }
}

fn match_invocation(
    node: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<RegistrationCall> {
    let method_name = predicates::invocation_target_name(node)?;
    // Cheap pre-filter; almost every invocation fails here.
    if !REGISTRATION_METHOD_NAMES.contains(method_name) {
        return None;
    }

    let shape = SHAPES.iter().find(|s| s.method == method_name)?;
    let arg_count = predicates::arguments(node).count();
    if arg_count < shape.min_args || arg_count > shape.max_args {
        return None;
    }
    if !receiver_matches(node, shape.kind, oracle, vocab) {
        return None;
    }

    let call = extract_slots(node, shape, oracle);
    debug!(kind = ?call.kind, invocation = %call.invocation, "matched registration call");
    Some(call)
}

fn match_routed_command(
    node: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<RegistrationCall> {
    let command_type = vocab.routed_command?;
    let created = oracle.resolve_type(node.child(0)?)?;
    if created != command_type {
        return None;
    }
    let arg_count = predicates::arguments(node).count();
    if !(2..=3).contains(&arg_count) {
        return None;
    }
    let shape = ShapeSpec {
        kind: RegistrationKind::RoutedCommand,
        method: "RoutedCommand",
        min_args: 2,
        max_args: 3,
        slots: ROUTED_COMMAND_SLOTS,
    };
    Some(extract_slots(node, &shape, oracle))
}

/// Check the invocation is aimed at the framework, not a same-named
/// bystander. Prefers the resolved method symbol; falls back to the
/// syntactic receiver when the oracle has no binding for the call.
fn receiver_matches(
    node: SyntaxNode<'_>,
    kind: RegistrationKind,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> bool {
    if let Some(method) = oracle.resolve_symbol(node) {
        if oracle.symbol_kind(method) == Some(SymbolKind::Method) {
            if let Some(containing) = oracle.containing_type(method) {
                return match kind {
                    RegistrationKind::RegisterRoutedEvent => {
                        Some(containing) == vocab.event_manager
                    }
                    _ => containing == vocab.dependency_property,
                };
            }
        }
    }

    let receiver = match predicates::invocation_receiver(node) {
        Some(receiver) => receiver,
        None => return false,
    };
    match kind {
        RegistrationKind::Register
        | RegistrationKind::RegisterReadOnly
        | RegistrationKind::RegisterAttached
        | RegistrationKind::RegisterAttachedReadOnly => {
            receiver.text() == Some(crate::semantic::names::DEPENDENCY_PROPERTY)
        }
        RegistrationKind::RegisterRoutedEvent => {
            receiver.text() == Some(crate::semantic::names::EVENT_MANAGER)
        }
        RegistrationKind::AddOwner | RegistrationKind::OverrideMetadata => oracle
            .type_of(receiver)
            .map(|ty| ty == vocab.dependency_property)
            .unwrap_or(false),
        RegistrationKind::RoutedCommand => false,
    }
}

fn extract_slots(
    node: SyntaxNode<'_>,
    shape: &ShapeSpec,
    oracle: &dyn SemanticOracle,
) -> RegistrationCall {
    let mut call = RegistrationCall {
        invocation: node.id(),
        kind: shape.kind,
        name: None,
        value_type: None,
        owner_type: None,
        metadata: None,
        validate: None,
        handler_type: None,
        key: None,
    };

    for (index, arg) in predicates::arguments(node).enumerate() {
        let spec = match predicates::argument_label(arg) {
            Some(label) => shape.slots.iter().find(|s| s.param == label),
            None => shape.slots.iter().find(|s| s.position == index),
        };
        let spec = match spec {
            Some(spec) => spec,
            None => continue,
        };
        match spec.role {
            SlotRole::Name => call.name = name_argument(arg, oracle),
            SlotRole::ValueType => call.value_type = type_argument(arg, node, oracle),
            SlotRole::OwnerType => call.owner_type = type_argument(arg, node, oracle),
            SlotRole::HandlerType => call.handler_type = type_argument(arg, node, oracle),
            SlotRole::Metadata => call.metadata = Some(arg.id()),
            SlotRole::Validate => call.validate = Some(arg.id()),
            SlotRole::Key => call.key = Some(arg.id()),
            SlotRole::RoutingStrategy => {}
        }
    }

    call
}

/// Fold the name slot and record which source form supplied it.
fn name_argument(arg: SyntaxNode<'_>, oracle: &dyn SemanticOracle) -> Option<NameArgument> {
    let expr = predicates::strip_parens(predicates::argument_expression(arg)?);
    let form = match expr.kind() {
        SyntaxKind::StringLiteral => NameForm::Literal,
        SyntaxKind::NameOfExpression => NameForm::Nameof,
        SyntaxKind::IdentifierName | SyntaxKind::MemberAccessExpression => NameForm::ConstReference,
        _ => return None,
    };
    let value = match oracle.constant_value(expr)? {
        ConstValue::Str(value) => value,
        _ => return None,
    };
    Some(NameArgument {
        argument: arg.id(),
        value,
        form,
    })
}

/// Resolve a `typeof(...)` slot. Malformed or unresolvable slots come back
/// `None`; the call shape itself still matched.
fn type_argument(
    arg: SyntaxNode<'_>,
    invocation: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
) -> Option<TypeArgument> {
    let expr = predicates::strip_parens(predicates::argument_expression(arg)?);
    let operand = predicates::typeof_operand(expr)?;
    let resolved = resolve_type_operand(operand, invocation, oracle)?;
    Some(TypeArgument {
        argument: arg.id(),
        resolved,
    })
}

fn resolve_type_operand(
    operand: SyntaxNode<'_>,
    invocation: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
) -> Option<TypeId> {
    if let Some(ty) = oracle.resolve_type(operand) {
        return Some(ty);
    }
    // `typeof(FooControl<T>)` inside generic `FooControl<T>` is
    // self-referential: fall back to the containing class when the open
    // generic does not resolve on its own.
    if operand.kind() == SyntaxKind::GenericName {
        let simple = operand.text()?;
        let class = invocation.ancestor_of_kind(SyntaxKind::ClassDeclaration)?;
        if predicates::declared_name(class) == Some(simple) {
            return oracle.resolve_type(class.child(0)?);
        }
    }
    None
}

/// A metadata construction reachable from a registration call: either the
/// inline `new PropertyMetadata(...)` argument or a one-hop reference to a
/// local/field initialized with one.
#[derive(Debug, Clone)]
pub struct MetadataInfo {
    /// The object-creation node.
    pub creation: NodeId,
    pub metadata_type: TypeId,
    /// Expression node of the default-value argument.
    pub default_value: Option<NodeId>,
    /// `Argument` node carrying the changed callback.
    pub changed_callback: Option<NodeId>,
    /// `Argument` node carrying the coerce callback.
    pub coerce_callback: Option<NodeId>,
}

/// Walk one level into the metadata argument of a matched registration.
pub fn resolve_metadata<'t>(
    argument: SyntaxNode<'t>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<MetadataInfo> {
    let expr = predicates::strip_parens(predicates::argument_expression(argument)?);
    let creation = metadata_creation(expr, oracle, vocab)?;
    let metadata_type = oracle.resolve_type(creation.child(0)?)?;

    let mut info = MetadataInfo {
        creation: creation.id(),
        metadata_type,
        default_value: None,
        changed_callback: None,
        coerce_callback: None,
    };

    for (index, arg) in predicates::arguments(creation).enumerate() {
        let expr = match predicates::argument_expression(arg) {
            Some(expr) => predicates::strip_parens(expr),
            None => continue,
        };
        match predicates::argument_label(arg) {
            Some("defaultValue") => info.default_value = Some(expr.id()),
            Some("propertyChangedCallback") => info.changed_callback = Some(arg.id()),
            Some("coerceValueCallback") => info.coerce_callback = Some(arg.id()),
            Some(_) => {}
            None => {
                if is_callback_shaped(expr, oracle, vocab) {
                    if info.changed_callback.is_none() {
                        info.changed_callback = Some(arg.id());
                    } else if info.coerce_callback.is_none() {
                        info.coerce_callback = Some(arg.id());
                    }
                } else if index == 0 {
                    info.default_value = Some(expr.id());
                }
                // Later non-callback arguments (metadata option flags) are
                // not interesting here.
            }
        }
    }

    Some(info)
}

/// Find the metadata object creation behind an expression, following at
/// most one local/field indirection.
fn metadata_creation<'t>(
    expr: SyntaxNode<'t>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<SyntaxNode<'t>> {
    if let Some(creation) = as_metadata_creation(expr, oracle, vocab) {
        return Some(creation);
    }
    // One resolution hop: a named local or field initialized with the
    // creation.
    if matches!(
        expr.kind(),
        SyntaxKind::IdentifierName | SyntaxKind::MemberAccessExpression
    ) {
        let symbol = oracle.resolve_symbol(expr)?;
        let declaration = oracle.declaration(symbol)?;
        let declaration = expr.tree().node(declaration);
        let init = predicates::initializer(declaration)?;
        return as_metadata_creation(init, oracle, vocab);
    }
    None
}

fn as_metadata_creation<'t>(
    expr: SyntaxNode<'t>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> Option<SyntaxNode<'t>> {
    if expr.kind() != SyntaxKind::ObjectCreationExpression {
        return None;
    }
    let ty = oracle.resolve_type(expr.child(0)?)?;
    vocab.is_metadata_type(ty).then_some(expr)
}

/// Whether an expression can denote a callback: a lambda, a method group,
/// or a delegate construction over one.
fn is_callback_shaped(
    expr: SyntaxNode<'_>,
    oracle: &dyn SemanticOracle,
    vocab: &DomainVocabulary,
) -> bool {
    match expr.kind() {
        kind if kind.is_lambda() => true,
        SyntaxKind::ObjectCreationExpression => expr
            .child(0)
            .and_then(|ty| oracle.resolve_type(ty))
            .map(|ty| vocab.is_callback_delegate(ty))
            .unwrap_or(false),
        SyntaxKind::IdentifierName | SyntaxKind::MemberAccessExpression => oracle
            .resolve_symbol(expr)
            .and_then(|s| oracle.symbol_kind(s))
            .map(|k| k == SymbolKind::Method)
            .unwrap_or(false),
        _ => false,
    }
}
