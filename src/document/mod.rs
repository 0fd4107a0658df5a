//! Document Tree Adapter
//!
//! The mention engine never touches a host's rich-text tree directly. It
//! reads and mutates it through [`DocumentTree`], the same way UI code in a
//! multi-frontend app talks to an editor through an adapter trait.
//!
//! A host tree is a root holding paragraphs, each holding inline nodes:
//! text nodes (mutable strings) and mention nodes (atomic units).
//! [`MemoryDocument`] is an in-memory host used by the CLI and tests.

pub mod chars;
mod memory;
mod types;

pub use memory::{CellMetrics, MemoryDocument};
pub use types::{
    CaretRect, Inline, Mention, Mutation, NewNode, NodeId, NodeKind, PointKind, SelectionPoint,
    Transaction, Viewport,
};

pub use crate::errors::DocumentError;

/// Read/mutate contract over a host document tree and its selection
pub trait DocumentTree {
    /// Collapsed selection anchor, if the editor has one
    fn selection(&self) -> Option<SelectionPoint>;

    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Text content, for text nodes only
    fn text(&self, node: NodeId) -> Option<String>;

    /// Mention payload, for mention nodes only
    fn mention(&self, node: NodeId) -> Option<Mention>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId>;

    /// Allocate an id for a node a later transaction will insert
    fn reserve_id(&mut self) -> NodeId;

    /// Apply every mutation in order, or none of them
    fn apply(&mut self, tx: Transaction) -> Result<(), DocumentError>;

    /// Caret box used to anchor popups
    fn caret_rect(&self) -> Option<CaretRect>;

    fn viewport(&self) -> Viewport;

    /// Return keyboard focus to the editor surface
    fn focus(&mut self);

    /// Monotonic counter bumped on every applied change
    fn revision(&self) -> u64;

    fn is_text(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Text)
    }

    fn is_mention(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Mention)
    }

    /// Anchor as `(node, offset, text)` when it sits inside a text node
    fn text_anchor(&self) -> Option<(NodeId, usize, String)> {
        let point = self.selection()?;
        if !point.is_text() {
            return None;
        }
        let text = self.text(point.node)?;
        Some((point.node, point.offset, text))
    }
}

/// Host behaviour for keys the mention engine leaves unhandled
pub trait DefaultEditing {
    fn insert_char(&mut self, ch: char) -> Result<(), DocumentError>;

    fn delete_backward(&mut self) -> Result<(), DocumentError>;

    fn move_left(&mut self) -> Result<(), DocumentError>;

    fn move_right(&mut self) -> Result<(), DocumentError>;

    /// Split the current paragraph at the caret
    fn insert_paragraph(&mut self) -> Result<(), DocumentError>;
}
