//! Propcheck - dependency property metadata analyzer.
//!
//! Propcheck inspects class-based UI framework code for misuse of the
//! declarative dependency-property / routed-event registration pattern:
//! name and type mismatches between a registration call and its accessors,
//! wrong callback signatures, casts that disagree with the registered
//! types, and non-idiomatic accessor bodies.
//!
//! The crate contributes no parsing and no type resolution of its own. The
//! host hands it a syntax tree and a semantic oracle; the analyzer recovers
//! domain facts from them and emits structured findings.
//!
//! # Architecture
//!
//! - `syntax`: the host-supplied tree surface (`SyntaxTree`, `TreeBuilder`)
//! - `semantic`: the oracle interface, an explicit in-memory model, and
//!   the injected well-known-symbol vocabulary
//! - `analysis`: the fact-extraction core every rule consumes
//! - `detect`: the rule engine and the rule catalogue
//! - `report`: JSON output for findings
//!
//! # Running an analysis
//!
//! Resolve a [`DomainVocabulary`] once per compilation, build a [`Runner`],
//! and feed it trees:
//!
//! ```
//! use propcheck::{CancellationToken, DomainVocabulary, Runner, SemanticModel, TreeBuilder};
//!
//! let mut model = SemanticModel::new();
//! for name in [
//!     "object", "bool", "string", "void",
//!     "DependencyObject", "DependencyProperty", "DependencyPropertyKey",
//!     "RoutedEvent", "DependencyPropertyChangedEventArgs", "PropertyMetadata",
//!     "PropertyChangedCallback", "CoerceValueCallback", "ValidateValueCallback",
//! ] {
//!     model.declare_type(name);
//! }
//! let vocab = DomainVocabulary::resolve(&model).expect("framework types present");
//!
//! let mut builder = TreeBuilder::new();
//! let root = builder.compilation_unit(vec![]);
//! let tree = builder.finish(root);
//!
//! let runner = Runner::with_default_rules();
//! let findings = runner
//!     .run(&tree, &model, &vocab, &CancellationToken::new())
//!     .expect("not cancelled");
//! assert!(findings.is_empty());
//! ```

pub mod analysis;
pub mod detect;
pub mod report;
pub mod semantic;
pub mod syntax;

pub use detect::{
    descriptor, CancellationToken, Error, Finding, Rule, RuleContext, RuleDescriptor, RuleId,
    Runner, Severity,
};
pub use semantic::{
    BackingKind, ConstValue, DomainVocabulary, SemanticModel, SemanticOracle, SymbolId,
    SymbolKind, TypeId,
};
pub use syntax::{NodeId, Span, SyntaxKind, SyntaxNode, SyntaxTree, TreeBuilder};
