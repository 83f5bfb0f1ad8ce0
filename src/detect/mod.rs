//! Rule engine and the rule catalogue.
//!
//! Every rule here is a thin consumer of the extraction core in
//! [`crate::analysis`]: recover the facts, compare, emit a [`Finding`] on
//! disagreement. Rules never interpret syntax themselves beyond anchoring
//! spans.

mod backing_members;
mod callbacks;
mod registrations;
mod runner;
#[cfg(test)]
pub(crate) mod testutil;
mod types;
mod wrappers;

pub use runner::{Rule, RuleContext, Runner};
pub use types::{
    CancellationToken, Error, Finding, RuleDescriptor, RuleId, Severity,
};

/// The static descriptor for a rule id.
pub fn descriptor(id: RuleId) -> &'static RuleDescriptor {
    match id {
        RuleId::BackingMemberName => &backing_members::BACKING_MEMBER_NAME,
        RuleId::BackingMemberNotStaticReadonly => {
            &backing_members::BACKING_MEMBER_NOT_STATIC_READONLY
        }
        RuleId::RegisteredNameInvalid => &registrations::REGISTERED_NAME_INVALID,
        RuleId::OwnerTypeMismatch => &registrations::OWNER_TYPE_MISMATCH,
        RuleId::DefaultValueTypeMismatch => &registrations::DEFAULT_VALUE_TYPE_MISMATCH,
        RuleId::CallbackSlotMismatch => &registrations::CALLBACK_SLOT_MISMATCH,
        RuleId::PreferNameof => &registrations::PREFER_NAMEOF,
        RuleId::SetValueWithoutKey => &backing_members::SET_VALUE_WITHOUT_KEY,
        RuleId::WrapperNameMismatch => &wrappers::WRAPPER_NAME_MISMATCH,
        RuleId::WrapperTypeMismatch => &wrappers::WRAPPER_TYPE_MISMATCH,
        RuleId::WrapperAccessorInconsistent => &wrappers::WRAPPER_ACCESSOR_INCONSISTENT,
        RuleId::AttachedAccessorName => &wrappers::ATTACHED_ACCESSOR_NAME,
        RuleId::AttachedAccessorSignature => &wrappers::ATTACHED_ACCESSOR_SIGNATURE,
        RuleId::CallbackName => &callbacks::CALLBACK_NAME,
        RuleId::CastUnrelatedType => &callbacks::CAST_UNRELATED_TYPE,
        RuleId::CastNotExactType => &callbacks::CAST_NOT_EXACT_TYPE,
    }
}
