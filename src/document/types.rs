use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in the host tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind discriminant for host nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Text,
    Mention,
    /// Paragraphs, the root, and anything else the mention engine treats as opaque
    Other,
}

/// Whether a selection offset counts characters or children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Text,
    Element,
}

/// A collapsed caret position
///
/// Text offsets count Unicode scalar values, element offsets count children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionPoint {
    pub node: NodeId,
    pub offset: usize,
    pub kind: PointKind,
}

impl SelectionPoint {
    pub fn text(node: NodeId, offset: usize) -> Self {
        Self {
            node,
            offset,
            kind: PointKind::Text,
        }
    }

    pub fn element(node: NodeId, offset: usize) -> Self {
        Self {
            node,
            offset,
            kind: PointKind::Element,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == PointKind::Text
    }
}

/// Payload of a mention node: who is referenced and how it is shown
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub name: String,
}

impl Mention {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A node to be inserted by a [`Transaction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewNode {
    Text(String),
    Mention(Mention),
}

/// A single tree mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetText {
        node: NodeId,
        text: String,
    },
    InsertBefore {
        sibling: NodeId,
        id: NodeId,
        node: NewNode,
    },
    InsertAfter {
        sibling: NodeId,
        id: NodeId,
        node: NewNode,
    },
    AppendChild {
        parent: NodeId,
        id: NodeId,
        node: NewNode,
    },
    Remove {
        node: NodeId,
    },
    SetSelection(SelectionPoint),
}

/// An ordered batch of mutations applied atomically
///
/// Adapters apply every mutation or none of them; no handler ever observes
/// a half-applied batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    mutations: Vec<Mutation>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> &mut Self {
        self.mutations.push(Mutation::SetText {
            node,
            text: text.into(),
        });
        self
    }

    pub fn insert_before(&mut self, sibling: NodeId, id: NodeId, node: NewNode) -> &mut Self {
        self.mutations
            .push(Mutation::InsertBefore { sibling, id, node });
        self
    }

    pub fn insert_after(&mut self, sibling: NodeId, id: NodeId, node: NewNode) -> &mut Self {
        self.mutations.push(Mutation::InsertAfter { sibling, id, node });
        self
    }

    pub fn append_child(&mut self, parent: NodeId, id: NodeId, node: NewNode) -> &mut Self {
        self.mutations.push(Mutation::AppendChild { parent, id, node });
        self
    }

    pub fn remove(&mut self, node: NodeId) -> &mut Self {
        self.mutations.push(Mutation::Remove { node });
        self
    }

    pub fn select(&mut self, point: SelectionPoint) -> &mut Self {
        self.mutations.push(Mutation::SetSelection(point));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

/// Caret box in host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaretRect {
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

impl CaretRect {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Visible area available to popups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Serializable snapshot of one inline node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text { text: String },
    Mention { id: String, name: String },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text { text: text.into() }
    }

    pub fn mention(id: impl Into<String>, name: impl Into<String>) -> Self {
        Inline::Mention {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn is_mention(&self) -> bool {
        matches!(self, Inline::Mention { .. })
    }
}
