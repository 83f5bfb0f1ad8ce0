//! The injected catalogue of well-known framework symbols.
//!
//! Matchers compare resolved handles against this value instead of comparing
//! names at every call site. It is built once per compilation from a
//! [`TypeLookup`] and passed by reference everywhere; there is no global
//! state.

use std::fmt;

use super::oracle::TypeId;

/// Well-known type names the vocabulary resolves.
pub mod names {
    pub const OBJECT: &str = "object";
    pub const BOOL: &str = "bool";
    pub const STRING: &str = "string";
    pub const VOID: &str = "void";

    pub const DEPENDENCY_OBJECT: &str = "DependencyObject";
    pub const DEPENDENCY_PROPERTY: &str = "DependencyProperty";
    pub const DEPENDENCY_PROPERTY_KEY: &str = "DependencyPropertyKey";
    pub const ROUTED_EVENT: &str = "RoutedEvent";
    pub const ROUTED_COMMAND: &str = "RoutedCommand";
    pub const EVENT_MANAGER: &str = "EventManager";
    pub const PROPERTY_CHANGED_EVENT_ARGS: &str = "DependencyPropertyChangedEventArgs";

    pub const PROPERTY_METADATA: &str = "PropertyMetadata";
    pub const UI_PROPERTY_METADATA: &str = "UIPropertyMetadata";
    pub const FRAMEWORK_PROPERTY_METADATA: &str = "FrameworkPropertyMetadata";

    pub const PROPERTY_CHANGED_CALLBACK: &str = "PropertyChangedCallback";
    pub const COERCE_VALUE_CALLBACK: &str = "CoerceValueCallback";
    pub const VALIDATE_VALUE_CALLBACK: &str = "ValidateValueCallback";
}

/// Registration method names, used as a cheap syntactic pre-filter before
/// any symbol resolution happens. Almost every invocation in a file fails
/// this test.
pub static REGISTRATION_METHOD_NAMES: phf::Set<&'static str> = phf::phf_set! {
    "Register",
    "RegisterReadOnly",
    "RegisterAttached",
    "RegisterAttachedReadOnly",
    "AddOwner",
    "OverrideMetadata",
    "RegisterRoutedEvent",
};

/// Accessor method names on `DependencyObject`.
pub static VALUE_ACCESSOR_NAMES: phf::Set<&'static str> = phf::phf_set! {
    "GetValue",
    "SetValue",
    "SetCurrentValue",
    "ClearValue",
};

/// Name-based type lookup over a compilation, answered by the host.
pub trait TypeLookup {
    fn find_type(&self, name: &str) -> Option<TypeId>;
}

impl TypeLookup for crate::semantic::SemanticModel {
    fn find_type(&self, name: &str) -> Option<TypeId> {
        crate::semantic::SemanticModel::find_type(self, name)
    }
}

/// Declared type of a backing member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackingKind {
    DependencyProperty,
    DependencyPropertyKey,
    RoutedEvent,
}

impl BackingKind {
    /// The naming-convention suffix for members of this kind.
    pub fn expected_suffix(&self) -> &'static str {
        match self {
            BackingKind::DependencyProperty => "Property",
            BackingKind::DependencyPropertyKey => "PropertyKey",
            BackingKind::RoutedEvent => "Event",
        }
    }
}

impl fmt::Display for BackingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackingKind::DependencyProperty => write!(f, "DependencyProperty"),
            BackingKind::DependencyPropertyKey => write!(f, "DependencyPropertyKey"),
            BackingKind::RoutedEvent => write!(f, "RoutedEvent"),
        }
    }
}

/// Resolved handles for the framework types the analyses compare against.
///
/// Built once per compilation; immutable afterwards.
#[derive(Debug, Clone)]
pub struct DomainVocabulary {
    pub object_type: TypeId,
    pub bool_type: TypeId,
    pub string_type: TypeId,
    pub void_type: TypeId,

    pub dependency_object: TypeId,
    pub dependency_property: TypeId,
    pub dependency_property_key: TypeId,
    pub routed_event: TypeId,
    pub event_manager: Option<TypeId>,
    pub routed_command: Option<TypeId>,
    pub property_changed_event_args: TypeId,

    pub property_metadata: TypeId,
    /// All recognized metadata types (`PropertyMetadata` and any resolved
    /// derived variants).
    pub metadata_types: Vec<TypeId>,

    pub property_changed_callback: TypeId,
    pub coerce_value_callback: TypeId,
    pub validate_value_callback: TypeId,
}

impl DomainVocabulary {
    /// Resolve the vocabulary against a compilation.
    ///
    /// Returns `None` when the compilation does not reference the framework
    /// at all, in which case no rule can apply.
    pub fn resolve(lookup: &dyn TypeLookup) -> Option<Self> {
        let mut metadata_types = Vec::new();
        let property_metadata = lookup.find_type(names::PROPERTY_METADATA)?;
        metadata_types.push(property_metadata);
        for name in [names::UI_PROPERTY_METADATA, names::FRAMEWORK_PROPERTY_METADATA] {
            if let Some(ty) = lookup.find_type(name) {
                metadata_types.push(ty);
            }
        }

        Some(Self {
            object_type: lookup.find_type(names::OBJECT)?,
            bool_type: lookup.find_type(names::BOOL)?,
            string_type: lookup.find_type(names::STRING)?,
            void_type: lookup.find_type(names::VOID)?,
            dependency_object: lookup.find_type(names::DEPENDENCY_OBJECT)?,
            dependency_property: lookup.find_type(names::DEPENDENCY_PROPERTY)?,
            dependency_property_key: lookup.find_type(names::DEPENDENCY_PROPERTY_KEY)?,
            routed_event: lookup.find_type(names::ROUTED_EVENT)?,
            event_manager: lookup.find_type(names::EVENT_MANAGER),
            routed_command: lookup.find_type(names::ROUTED_COMMAND),
            property_changed_event_args: lookup.find_type(names::PROPERTY_CHANGED_EVENT_ARGS)?,
            property_metadata,
            metadata_types,
            property_changed_callback: lookup.find_type(names::PROPERTY_CHANGED_CALLBACK)?,
            coerce_value_callback: lookup.find_type(names::COERCE_VALUE_CALLBACK)?,
            validate_value_callback: lookup.find_type(names::VALIDATE_VALUE_CALLBACK)?,
        })
    }

    /// Classify a type as a backing-member type.
    pub fn backing_kind(&self, ty: TypeId) -> Option<BackingKind> {
        if ty == self.dependency_property {
            Some(BackingKind::DependencyProperty)
        } else if ty == self.dependency_property_key {
            Some(BackingKind::DependencyPropertyKey)
        } else if ty == self.routed_event {
            Some(BackingKind::RoutedEvent)
        } else {
            None
        }
    }

    /// Check if a type is a recognized metadata type.
    pub fn is_metadata_type(&self, ty: TypeId) -> bool {
        self.metadata_types.contains(&ty)
    }

    /// Check if a type is one of the three callback delegate types.
    pub fn is_callback_delegate(&self, ty: TypeId) -> bool {
        ty == self.property_changed_callback
            || ty == self.coerce_value_callback
            || ty == self.validate_value_callback
    }
}
