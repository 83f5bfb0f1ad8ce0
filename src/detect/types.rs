//! Core types for rule findings.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::syntax::Span;

/// Errors the rule engine can surface to the host.
///
/// There is no fatal error class inside the rules themselves; a rule that
/// cannot verify something emits nothing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("analysis cancelled by host")]
    Cancelled,
}

/// Cooperative cancellation flag passed down from the host.
///
/// Polled at node granularity during traversals; never used for timeouts.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Default severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Identifiers for the rule catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleId {
    #[serde(rename = "PC0001")]
    BackingMemberName,
    #[serde(rename = "PC0002")]
    BackingMemberNotStaticReadonly,
    #[serde(rename = "PC0010")]
    RegisteredNameInvalid,
    #[serde(rename = "PC0011")]
    OwnerTypeMismatch,
    #[serde(rename = "PC0012")]
    DefaultValueTypeMismatch,
    #[serde(rename = "PC0013")]
    CallbackSlotMismatch,
    #[serde(rename = "PC0014")]
    PreferNameof,
    #[serde(rename = "PC0015")]
    SetValueWithoutKey,
    #[serde(rename = "PC0020")]
    WrapperNameMismatch,
    #[serde(rename = "PC0021")]
    WrapperTypeMismatch,
    #[serde(rename = "PC0022")]
    WrapperAccessorInconsistent,
    #[serde(rename = "PC0030")]
    AttachedAccessorName,
    #[serde(rename = "PC0031")]
    AttachedAccessorSignature,
    #[serde(rename = "PC0040")]
    CallbackName,
    #[serde(rename = "PC0041")]
    CastUnrelatedType,
    #[serde(rename = "PC0042")]
    CastNotExactType,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::BackingMemberName => "PC0001",
            RuleId::BackingMemberNotStaticReadonly => "PC0002",
            RuleId::RegisteredNameInvalid => "PC0010",
            RuleId::OwnerTypeMismatch => "PC0011",
            RuleId::DefaultValueTypeMismatch => "PC0012",
            RuleId::CallbackSlotMismatch => "PC0013",
            RuleId::PreferNameof => "PC0014",
            RuleId::SetValueWithoutKey => "PC0015",
            RuleId::WrapperNameMismatch => "PC0020",
            RuleId::WrapperTypeMismatch => "PC0021",
            RuleId::WrapperAccessorInconsistent => "PC0022",
            RuleId::AttachedAccessorName => "PC0030",
            RuleId::AttachedAccessorSignature => "PC0031",
            RuleId::CallbackName => "PC0040",
            RuleId::CastUnrelatedType => "PC0041",
            RuleId::CastNotExactType => "PC0042",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PC0001" => Some(RuleId::BackingMemberName),
            "PC0002" => Some(RuleId::BackingMemberNotStaticReadonly),
            "PC0010" => Some(RuleId::RegisteredNameInvalid),
            "PC0011" => Some(RuleId::OwnerTypeMismatch),
            "PC0012" => Some(RuleId::DefaultValueTypeMismatch),
            "PC0013" => Some(RuleId::CallbackSlotMismatch),
            "PC0014" => Some(RuleId::PreferNameof),
            "PC0015" => Some(RuleId::SetValueWithoutKey),
            "PC0020" => Some(RuleId::WrapperNameMismatch),
            "PC0021" => Some(RuleId::WrapperTypeMismatch),
            "PC0022" => Some(RuleId::WrapperAccessorInconsistent),
            "PC0030" => Some(RuleId::AttachedAccessorName),
            "PC0031" => Some(RuleId::AttachedAccessorSignature),
            "PC0040" => Some(RuleId::CallbackName),
            "PC0041" => Some(RuleId::CastUnrelatedType),
            "PC0042" => Some(RuleId::CastNotExactType),
            _ => None,
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of a rule: what it may emit and how to render it.
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor {
    pub id: RuleId,
    pub title: &'static str,
    /// Message template with `{0}`, `{1}`, ... placeholders filled from
    /// [`Finding::message_args`].
    pub message_template: &'static str,
    pub default_severity: Severity,
}

impl RuleDescriptor {
    /// Render the message template with ordered arguments.
    pub fn render(&self, args: &[String]) -> String {
        let mut message = self.message_template.to_string();
        for (index, arg) in args.iter().enumerate() {
            message = message.replace(&format!("{{{}}}", index), arg);
        }
        message
    }
}

/// A single rule finding.
///
/// `properties` is an opaque key/value side channel for a downstream
/// auto-fix subsystem (e.g. `{"ExpectedName": "OnFooChanged"}`); the rule
/// engine never interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule: RuleId,
    pub span: Span,
    pub message_args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(rule: RuleId, span: Span, message_args: Vec<String>) -> Self {
        Self {
            rule,
            span,
            message_args,
            properties: BTreeMap::new(),
        }
    }

    /// Attach an auto-fix property.
    pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }
}
