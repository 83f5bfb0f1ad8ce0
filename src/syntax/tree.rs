//! Immutable syntax tree arena and node cursor.
//!
//! The host owns parsing; the analyzer receives a finished [`SyntaxTree`]
//! and navigates it through the copyable [`SyntaxNode`] cursor. Nodes are
//! never mutated after construction.

use std::fmt;

use super::SyntaxKind;

/// Source location span with byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Index handle for a node within its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Token text for identifiers and literals; `None` for interior nodes.
    pub(crate) text: Option<String>,
}

/// An immutable tree of syntax nodes.
///
/// Construct with [`TreeBuilder`](super::TreeBuilder).
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    /// The root node of the tree.
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            id: self.root,
        }
    }

    /// Get a cursor for a node id.
    pub fn node(&self, id: NodeId) -> SyntaxNode<'_> {
        debug_assert!(id.index() < self.nodes.len());
        SyntaxNode { tree: self, id }
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }
}

/// Cheap copyable cursor over a node in a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> SyntaxNode<'t> {
    /// The id of this node within its tree.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree this node belongs to.
    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> SyntaxKind {
        self.tree.data(self.id).kind
    }

    pub fn span(&self) -> Span {
        self.tree.data(self.id).span
    }

    /// Token text, present only on identifiers and literals.
    pub fn text(&self) -> Option<&'t str> {
        self.tree.data(self.id).text.as_deref()
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.tree.data(self.id).parent.map(|id| self.tree.node(id))
    }

    /// Direct children, in source order.
    ///
    /// The iterator borrows the tree, not the cursor, so it can outlive
    /// the `SyntaxNode` it came from.
    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        let tree = self.tree;
        tree.data(self.id)
            .children
            .iter()
            .map(move |id| tree.node(*id))
    }

    /// The nth child, if present.
    pub fn child(&self, n: usize) -> Option<SyntaxNode<'t>> {
        self.tree
            .data(self.id)
            .children
            .get(n)
            .map(|id| self.tree.node(*id))
    }

    pub fn child_count(&self) -> usize {
        self.tree.data(self.id).children.len()
    }

    /// Direct children of a given kind.
    pub fn children_of_kind(
        &self,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(move |c| c.kind() == kind)
    }

    /// First direct child of a given kind.
    pub fn first_child_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.children().find(|c| c.kind() == kind)
    }

    pub fn is_kind(&self, kind: SyntaxKind) -> bool {
        self.kind() == kind
    }

    /// Ancestors from the parent upward to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        let mut current = self.parent();
        std::iter::from_fn(move || {
            let node = current?;
            current = node.parent();
            Some(node)
        })
    }

    /// The nearest enclosing node of a given kind, excluding this node.
    pub fn ancestor_of_kind(&self, kind: SyntaxKind) -> Option<SyntaxNode<'t>> {
        self.ancestors().find(|a| a.kind() == kind)
    }

    /// All nodes of this subtree in pre-order, including this node.
    pub fn descendants(&self) -> Descendants<'t> {
        Descendants {
            tree: self.tree,
            stack: vec![self.id],
        }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}({})", self.kind(), self.id, self.span())?;
        if let Some(text) = self.text() {
            write!(f, " {:?}", text)?;
        }
        Ok(())
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let data = self.tree.data(id);
        // Push in reverse so the leftmost child pops first.
        for child in data.children.iter().rev() {
            self.stack.push(*child);
        }
        Some(self.tree.node(id))
    }
}
