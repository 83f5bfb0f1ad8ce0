//! Fact-extraction core.
//!
//! Everything a rule knows about a program it learns here: syntax
//! predicates, identifier-usage walks, backing-member resolution,
//! registration-call matching and callback classification. All of it is
//! pure and per-call; nothing is cached across rule invocations (the host
//! caches the underlying tree and semantic queries).
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌──────────────┐
//! │ SyntaxTree + │────▶│ backing /          │────▶│ Detection    │
//! │ Oracle       │     │ registration /     │     │ Rules        │
//! └──────────────┘     │ callbacks matchers │     └──────────────┘
//!                      └────────────────────┘
//!                               │
//!                               ▼
//!                      ┌────────────────────┐
//!                      │ predicates, walker │
//!                      └────────────────────┘
//! ```

pub mod backing;
pub mod callbacks;
pub mod predicates;
pub mod registration;
pub mod walker;

pub use backing::{
    accessor_target, key_for_property, registration_of, resolve_backing, BackingMember,
};
pub use callbacks::{
    callback_body, check_parameter_casts, find_callback_usages, match_callback_expression,
    match_callback_role, CallbackMatch, CallbackRole, CallbackTarget, CastConcern,
    CastConcernKind,
};
pub use registration::{
    match_registration, resolve_metadata, MetadataInfo, NameArgument, NameForm, RegistrationCall,
    RegistrationKind, TypeArgument,
};
pub use walker::{
    effective_argument, find_identifier_usages, find_identifier_usages_in, find_single_usage,
    WalkScope,
};
