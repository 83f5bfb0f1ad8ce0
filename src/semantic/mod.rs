//! Semantic layer: the host oracle interface, the explicit in-memory model,
//! and the injected well-known-symbol vocabulary.

mod model;
mod oracle;
mod vocabulary;

pub use model::SemanticModel;
pub use oracle::{ConstValue, SemanticOracle, SymbolId, SymbolKind, TypeId};
pub use vocabulary::{
    names, BackingKind, DomainVocabulary, TypeLookup, REGISTRATION_METHOD_NAMES,
    VALUE_ACCESSOR_NAMES,
};
