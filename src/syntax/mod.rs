//! Syntax tree surface consumed from the host.
//!
//! The analyzer performs no parsing of its own: the host hands it a
//! [`SyntaxTree`] built through [`TreeBuilder`], and all analyses navigate
//! it read-only through [`SyntaxNode`] cursors.

mod builder;
mod kind;
mod tree;

pub use builder::TreeBuilder;
pub use kind::SyntaxKind;
pub use tree::{Descendants, NodeId, Span, SyntaxNode, SyntaxTree};
