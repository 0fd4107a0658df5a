//! In-memory host document
//!
//! Arena of nodes (root → paragraphs → inline nodes) with a collapsed
//! selection. Transactions snapshot the arena and roll back on failure.

use std::collections::BTreeMap;
use unicode_width::UnicodeWidthChar;

use super::chars::{char_len, insert_char_at, remove_char_at, split_at_char};
use super::types::{
    CaretRect, Inline, Mention, Mutation, NewNode, NodeId, NodeKind, PointKind, SelectionPoint,
    Transaction, Viewport,
};
use super::{DefaultEditing, DocumentTree};
use crate::errors::DocumentError;

/// Cell size used to turn a caret column into host coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub cell_width: f32,
    pub line_height: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 20.0,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Root,
    Paragraph,
    Text(String),
    Mention(Mention),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

impl Node {
    fn inline(parent: NodeId, new: NewNode) -> Self {
        let data = match new {
            NewNode::Text(text) => NodeData::Text(text),
            NewNode::Mention(mention) => NodeData::Mention(mention),
        };
        Self {
            parent: Some(parent),
            children: Vec::new(),
            data,
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Root | NodeData::Paragraph)
    }
}

#[derive(Debug, Clone, Default)]
struct Tree {
    nodes: BTreeMap<NodeId, Node>,
    selection: Option<SelectionPoint>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Result<&Node, DocumentError> {
        self.nodes.get(&id).ok_or(DocumentError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DocumentError> {
        self.nodes.get_mut(&id).ok_or(DocumentError::NodeNotFound(id))
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes.get(&id)?.parent?;
        let index = self
            .nodes
            .get(&parent)?
            .children
            .iter()
            .position(|child| *child == id)?;
        Some((parent, index))
    }

    fn insert_at(
        &mut self,
        parent: NodeId,
        index: usize,
        id: NodeId,
        new: NewNode,
    ) -> Result<(), DocumentError> {
        if self.nodes.contains_key(&id) {
            return Err(DocumentError::DuplicateNode(id));
        }
        let parent_node = self.node_mut(parent)?;
        if !parent_node.is_element() {
            return Err(DocumentError::NotElement(parent));
        }
        parent_node.children.insert(index, id);
        self.nodes.insert(id, Node::inline(parent, new));
        Ok(())
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    fn apply(&mut self, mutation: Mutation) -> Result<(), DocumentError> {
        match mutation {
            Mutation::SetText { node, text } => match &mut self.node_mut(node)?.data {
                NodeData::Text(current) => {
                    *current = text;
                    Ok(())
                }
                _ => Err(DocumentError::NotText(node)),
            },
            Mutation::InsertBefore { sibling, id, node } => {
                self.node(sibling)?;
                let (parent, index) = self
                    .index_in_parent(sibling)
                    .ok_or(DocumentError::Detached(sibling))?;
                self.insert_at(parent, index, id, node)
            }
            Mutation::InsertAfter { sibling, id, node } => {
                self.node(sibling)?;
                let (parent, index) = self
                    .index_in_parent(sibling)
                    .ok_or(DocumentError::Detached(sibling))?;
                self.insert_at(parent, index + 1, id, node)
            }
            Mutation::AppendChild { parent, id, node } => {
                let index = self.node(parent)?.children.len();
                self.insert_at(parent, index, id, node)
            }
            Mutation::Remove { node } => {
                self.node(node)?;
                let (parent, index) = self
                    .index_in_parent(node)
                    .ok_or(DocumentError::Detached(node))?;
                self.node_mut(parent)?.children.remove(index);
                self.remove_subtree(node);
                Ok(())
            }
            Mutation::SetSelection(point) => {
                self.selection = Some(point);
                Ok(())
            }
        }
    }

    fn validate_selection(&self) -> Result<(), DocumentError> {
        let Some(point) = self.selection else {
            return Ok(());
        };
        let node = self
            .nodes
            .get(&point.node)
            .ok_or(DocumentError::InvalidSelection(point))?;
        let in_bounds = match (&node.data, point.kind) {
            (NodeData::Text(text), PointKind::Text) => point.offset <= char_len(text),
            (NodeData::Root | NodeData::Paragraph, PointKind::Element) => {
                point.offset <= node.children.len()
            }
            _ => false,
        };
        if in_bounds {
            Ok(())
        } else {
            Err(DocumentError::InvalidSelection(point))
        }
    }
}

/// In-memory [`DocumentTree`] host
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    tree: Tree,
    root: NodeId,
    next_id: u64,
    revision: u64,
    focused: bool,
    viewport: Viewport,
    metrics: CellMetrics,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Empty document: one empty paragraph with the caret in it
    pub fn new() -> Self {
        Self::from_paragraphs(vec![Vec::new()])
    }

    /// Single paragraph document with the caret at its end
    pub fn from_inlines(inlines: impl IntoIterator<Item = Inline>) -> Self {
        Self::from_paragraphs(vec![inlines.into_iter().collect()])
    }

    /// Document with one paragraph per entry, caret at the end of the last
    pub fn from_paragraphs(paragraphs: Vec<Vec<Inline>>) -> Self {
        let root = NodeId(0);
        let mut tree = Tree::default();
        tree.nodes.insert(
            root,
            Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Root,
            },
        );

        let mut next_id = 1;
        let mut caret = SelectionPoint::element(root, 0);
        let paragraphs = if paragraphs.is_empty() {
            vec![Vec::new()]
        } else {
            paragraphs
        };

        for inlines in paragraphs {
            let paragraph = NodeId(next_id);
            next_id += 1;
            tree.nodes.insert(
                paragraph,
                Node {
                    parent: Some(root),
                    children: Vec::new(),
                    data: NodeData::Paragraph,
                },
            );
            if let Some(root_node) = tree.nodes.get_mut(&root) {
                root_node.children.push(paragraph);
            }

            caret = SelectionPoint::element(paragraph, 0);
            for (index, inline) in inlines.into_iter().enumerate() {
                let id = NodeId(next_id);
                next_id += 1;
                caret = match &inline {
                    Inline::Text { text } => SelectionPoint::text(id, char_len(text)),
                    Inline::Mention { .. } => SelectionPoint::element(paragraph, index + 1),
                };
                let new = match inline {
                    Inline::Text { text } => NewNode::Text(text),
                    Inline::Mention { id, name } => NewNode::Mention(Mention { id, name }),
                };
                tree.nodes.insert(id, Node::inline(paragraph, new));
                if let Some(paragraph_node) = tree.nodes.get_mut(&paragraph) {
                    paragraph_node.children.push(id);
                }
            }
        }
        tree.selection = Some(caret);

        Self {
            tree,
            root,
            next_id,
            revision: 0,
            focused: true,
            viewport: Viewport::default(),
            metrics: CellMetrics::default(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_metrics(mut self, metrics: CellMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn paragraphs(&self) -> Vec<NodeId> {
        self.children(self.root)
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.tree
            .nodes
            .get(&parent)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Inline nodes of one paragraph
    pub fn inlines(&self, paragraph: NodeId) -> Vec<Inline> {
        self.children(paragraph)
            .into_iter()
            .filter_map(|id| match &self.tree.nodes.get(&id)?.data {
                NodeData::Text(text) => Some(Inline::text(text.clone())),
                NodeData::Mention(m) => Some(Inline::mention(m.id.clone(), m.name.clone())),
                _ => None,
            })
            .collect()
    }

    /// Inline nodes of every paragraph, in document order
    pub fn snapshot(&self) -> Vec<Vec<Inline>> {
        self.paragraphs()
            .into_iter()
            .map(|paragraph| self.inlines(paragraph))
            .collect()
    }

    /// Visible text: mentions as `@name`, zero-width chars dropped
    pub fn plain_text(&self) -> String {
        self.snapshot()
            .iter()
            .map(|inlines| {
                inlines
                    .iter()
                    .map(|inline| match inline {
                        Inline::Text { text } => {
                            text.chars().filter(|c| !is_zero_width(*c)).collect()
                        }
                        Inline::Mention { name, .. } => format!("@{name}"),
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Move the caret, as a pointer click would
    pub fn set_selection(&mut self, point: SelectionPoint) -> Result<(), DocumentError> {
        let mut tx = Transaction::new();
        tx.select(point);
        self.apply(tx)
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn transact<F>(&mut self, change: F) -> Result<(), DocumentError>
    where
        F: FnOnce(&mut Tree) -> Result<(), DocumentError>,
    {
        let snapshot = self.tree.clone();
        let result = change(&mut self.tree).and_then(|()| self.tree.validate_selection());
        match result {
            Ok(()) => {
                self.revision += 1;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Rejected document change, rolling back");
                self.tree = snapshot;
                Err(err)
            }
        }
    }

    fn require_selection(&self) -> Result<SelectionPoint, DocumentError> {
        self.tree.selection.ok_or(DocumentError::NoSelection)
    }

    fn require_text(&self, node: NodeId) -> Result<String, DocumentError> {
        match &self.tree.node(node)?.data {
            NodeData::Text(text) => Ok(text.clone()),
            _ => Err(DocumentError::NotText(node)),
        }
    }

    fn text_len(&self, node: NodeId) -> Option<usize> {
        self.text(node).map(|text| char_len(&text))
    }

    /// Where the caret goes once `node` is removed
    fn caret_after_removing(&self, node: NodeId) -> Result<SelectionPoint, DocumentError> {
        if let Some(prev) = self.previous_sibling(node) {
            if let Some(len) = self.text_len(prev) {
                return Ok(SelectionPoint::text(prev, len));
            }
        }
        if let Some(next) = self.next_sibling(node) {
            if self.is_text(next) {
                return Ok(SelectionPoint::text(next, 0));
            }
        }
        let (parent, index) = self
            .tree
            .index_in_parent(node)
            .ok_or(DocumentError::Detached(node))?;
        Ok(SelectionPoint::element(parent, index))
    }

    /// Caret immediately left of an inline node
    fn point_before(&self, node: NodeId) -> Result<SelectionPoint, DocumentError> {
        if let Some(prev) = self.previous_sibling(node) {
            if let Some(len) = self.text_len(prev) {
                return Ok(SelectionPoint::text(prev, len));
            }
        }
        let (parent, index) = self
            .tree
            .index_in_parent(node)
            .ok_or(DocumentError::Detached(node))?;
        Ok(SelectionPoint::element(parent, index))
    }

    /// Caret immediately right of an inline node
    fn point_after(&self, node: NodeId) -> Result<SelectionPoint, DocumentError> {
        if let Some(next) = self.next_sibling(node) {
            if self.is_text(next) {
                return Ok(SelectionPoint::text(next, 0));
            }
        }
        let (parent, index) = self
            .tree
            .index_in_parent(node)
            .ok_or(DocumentError::Detached(node))?;
        Ok(SelectionPoint::element(parent, index + 1))
    }

    /// Remove the last char of a text node, dropping the node once empty
    fn trim_last_char(&self, tx: &mut Transaction, node: NodeId) -> Result<(), DocumentError> {
        let text = self.require_text(node)?;
        let len = char_len(&text);
        if len <= 1 {
            tx.remove(node);
        } else {
            tx.set_text(node, remove_char_at(&text, len - 1));
        }
        Ok(())
    }

    fn inline_width(&self, node: NodeId) -> usize {
        match self.tree.nodes.get(&node).map(|n| &n.data) {
            Some(NodeData::Text(text)) => display_width(text),
            Some(NodeData::Mention(m)) => 1 + display_width(&m.name),
            _ => 0,
        }
    }
}

fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}') || c.width() == Some(0)
}

fn display_width(s: &str) -> usize {
    s.chars()
        .filter(|c| !is_zero_width(*c))
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

impl DocumentTree for MemoryDocument {
    fn selection(&self) -> Option<SelectionPoint> {
        self.tree.selection
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.tree.nodes.get(&node).map(|n| match n.data {
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Mention(_) => NodeKind::Mention,
            NodeData::Root | NodeData::Paragraph => NodeKind::Other,
        })
    }

    fn text(&self, node: NodeId) -> Option<String> {
        match &self.tree.nodes.get(&node)?.data {
            NodeData::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    fn mention(&self, node: NodeId) -> Option<Mention> {
        match &self.tree.nodes.get(&node)?.data {
            NodeData::Mention(mention) => Some(mention.clone()),
            _ => None,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.nodes.get(&node)?.parent
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, index) = self.tree.index_in_parent(node)?;
        let index = index.checked_sub(1)?;
        self.child_at(parent, index)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, index) = self.tree.index_in_parent(node)?;
        self.child_at(parent, index + 1)
    }

    fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.tree.nodes.get(&parent)?.children.get(index).copied()
    }

    fn reserve_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn apply(&mut self, tx: Transaction) -> Result<(), DocumentError> {
        if tx.is_empty() {
            return Ok(());
        }
        self.transact(|tree| {
            tx.into_mutations()
                .into_iter()
                .try_for_each(|mutation| tree.apply(mutation))
        })
    }

    fn caret_rect(&self) -> Option<CaretRect> {
        let point = self.tree.selection?;
        let (paragraph, column) = match point.kind {
            PointKind::Text => {
                let paragraph = self.parent(point.node)?;
                let (_, index) = self.tree.index_in_parent(point.node)?;
                let before: usize = self.children(paragraph)[..index]
                    .iter()
                    .map(|id| self.inline_width(*id))
                    .sum();
                let text = self.text(point.node)?;
                let (head, _) = split_at_char(&text, point.offset);
                (paragraph, before + display_width(head))
            }
            PointKind::Element if point.node == self.root => {
                (self.child_at(self.root, point.offset)?, 0)
            }
            PointKind::Element => {
                let children = self.children(point.node);
                let end = point.offset.min(children.len());
                let column = children[..end].iter().map(|id| self.inline_width(*id)).sum();
                (point.node, column)
            }
        };
        let line = self.tree.index_in_parent(paragraph)?.1;

        Some(CaretRect {
            x: column as f32 * self.metrics.cell_width,
            y: line as f32 * self.metrics.line_height,
            height: self.metrics.line_height,
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl DefaultEditing for MemoryDocument {
    fn insert_char(&mut self, ch: char) -> Result<(), DocumentError> {
        let point = self.require_selection()?;
        let mut tx = Transaction::new();

        if point.is_text() {
            let text = self.require_text(point.node)?;
            tx.set_text(point.node, insert_char_at(&text, point.offset, ch))
                .select(SelectionPoint::text(point.node, point.offset + 1));
            return self.apply(tx);
        }

        let before = point
            .offset
            .checked_sub(1)
            .and_then(|index| self.child_at(point.node, index));
        let after = self.child_at(point.node, point.offset);

        if let Some(prev) = before.filter(|id| self.is_text(*id)) {
            let text = self.require_text(prev)?;
            let len = char_len(&text);
            tx.set_text(prev, format!("{text}{ch}"))
                .select(SelectionPoint::text(prev, len + 1));
        } else if let Some(next) = after.filter(|id| self.is_text(*id)) {
            let text = self.require_text(next)?;
            tx.set_text(next, format!("{ch}{text}"))
                .select(SelectionPoint::text(next, 1));
        } else {
            let id = self.reserve_id();
            let node = NewNode::Text(ch.to_string());
            match (before, after) {
                (_, Some(next)) => tx.insert_before(next, id, node),
                (Some(prev), None) => tx.insert_after(prev, id, node),
                (None, None) => tx.append_child(point.node, id, node),
            };
            tx.select(SelectionPoint::text(id, 1));
        }
        self.apply(tx)
    }

    fn delete_backward(&mut self) -> Result<(), DocumentError> {
        let point = self.require_selection()?;
        let mut tx = Transaction::new();

        match point.kind {
            PointKind::Text if point.offset > 0 => {
                let text = self.require_text(point.node)?;
                let remaining = remove_char_at(&text, point.offset - 1);
                if remaining.is_empty() {
                    let caret = self.caret_after_removing(point.node)?;
                    tx.remove(point.node).select(caret);
                } else {
                    tx.set_text(point.node, remaining)
                        .select(SelectionPoint::text(point.node, point.offset - 1));
                }
            }
            PointKind::Text => match self.previous_sibling(point.node) {
                Some(prev) if self.is_text(prev) => {
                    self.trim_last_char(&mut tx, prev)?;
                    tx.select(point);
                }
                Some(prev) if self.is_mention(prev) => {
                    tx.remove(prev).select(point);
                }
                _ => return Ok(()),
            },
            PointKind::Element => {
                let Some(prev) = point
                    .offset
                    .checked_sub(1)
                    .and_then(|index| self.child_at(point.node, index))
                else {
                    return Ok(());
                };
                if self.is_mention(prev) {
                    tx.remove(prev)
                        .select(SelectionPoint::element(point.node, point.offset - 1));
                } else if let Some(text) = self.text(prev) {
                    let len = char_len(&text);
                    if len <= 1 {
                        tx.remove(prev)
                            .select(SelectionPoint::element(point.node, point.offset - 1));
                    } else {
                        tx.set_text(prev, remove_char_at(&text, len - 1))
                            .select(SelectionPoint::text(prev, len - 1));
                    }
                } else {
                    return Ok(());
                }
            }
        }
        self.apply(tx)
    }

    fn move_left(&mut self) -> Result<(), DocumentError> {
        let point = self.require_selection()?;
        let target = match point.kind {
            PointKind::Text if point.offset > 0 => {
                Some(SelectionPoint::text(point.node, point.offset - 1))
            }
            PointKind::Text => match self.previous_sibling(point.node) {
                Some(prev) if self.is_mention(prev) => Some(self.point_before(prev)?),
                Some(prev) => self
                    .text_len(prev)
                    .map(|len| SelectionPoint::text(prev, len.saturating_sub(1))),
                None => None,
            },
            PointKind::Element => match point
                .offset
                .checked_sub(1)
                .and_then(|index| self.child_at(point.node, index))
            {
                Some(prev) if self.is_mention(prev) => {
                    Some(SelectionPoint::element(point.node, point.offset - 1))
                }
                Some(prev) => self
                    .text_len(prev)
                    .map(|len| SelectionPoint::text(prev, len.saturating_sub(1))),
                None => None,
            },
        };
        match target {
            Some(target) => self.set_selection(target),
            None => Ok(()),
        }
    }

    fn move_right(&mut self) -> Result<(), DocumentError> {
        let point = self.require_selection()?;
        let target = match point.kind {
            PointKind::Text => {
                let len = self.require_text(point.node).map(|t| char_len(&t))?;
                if point.offset < len {
                    Some(SelectionPoint::text(point.node, point.offset + 1))
                } else {
                    match self.next_sibling(point.node) {
                        Some(next) if self.is_mention(next) => Some(self.point_after(next)?),
                        Some(next) => self
                            .text_len(next)
                            .map(|len| SelectionPoint::text(next, len.min(1))),
                        None => None,
                    }
                }
            }
            PointKind::Element => match self.child_at(point.node, point.offset) {
                Some(next) if self.is_mention(next) => {
                    Some(SelectionPoint::element(point.node, point.offset + 1))
                }
                Some(next) => self
                    .text_len(next)
                    .map(|len| SelectionPoint::text(next, len.min(1))),
                None => None,
            },
        };
        match target {
            Some(target) => self.set_selection(target),
            None => Ok(()),
        }
    }

    fn insert_paragraph(&mut self) -> Result<(), DocumentError> {
        let point = self.require_selection()?;
        let (paragraph, split_index, tail) = match point.kind {
            PointKind::Text => {
                let (paragraph, index) = self
                    .tree
                    .index_in_parent(point.node)
                    .ok_or(DocumentError::Detached(point.node))?;
                let text = self.require_text(point.node)?;
                let (_, tail) = split_at_char(&text, point.offset);
                (paragraph, index + 1, Some(tail.to_string()))
            }
            PointKind::Element if point.node != self.root => (point.node, point.offset, None),
            PointKind::Element => return Ok(()),
        };
        let (root, paragraph_index) = self
            .tree
            .index_in_parent(paragraph)
            .ok_or(DocumentError::Detached(paragraph))?;

        let new_paragraph = self.reserve_id();
        let tail_node = match &tail {
            Some(tail) if !tail.is_empty() => Some(self.reserve_id()),
            _ => None,
        };

        self.transact(|tree| {
            if let (PointKind::Text, Some(NodeData::Text(text))) = (
                point.kind,
                tree.nodes.get_mut(&point.node).map(|n| &mut n.data),
            ) {
                let head = split_at_char(text, point.offset).0.to_string();
                *text = head;
            }

            let paragraph_node = tree.node_mut(paragraph)?;
            let split_at = split_index.min(paragraph_node.children.len());
            let moved: Vec<NodeId> = paragraph_node.children.drain(split_at..).collect();

            tree.nodes.insert(
                new_paragraph,
                Node {
                    parent: Some(root),
                    children: Vec::new(),
                    data: NodeData::Paragraph,
                },
            );
            tree.node_mut(root)?
                .children
                .insert(paragraph_index + 1, new_paragraph);

            let mut children = Vec::with_capacity(moved.len() + 1);
            if let (Some(id), Some(tail)) = (tail_node, tail) {
                tree.nodes
                    .insert(id, Node::inline(new_paragraph, NewNode::Text(tail)));
                children.push(id);
            }
            for id in moved {
                tree.node_mut(id)?.parent = Some(new_paragraph);
                children.push(id);
            }

            tree.selection = Some(match children.first() {
                Some(first) if matches!(tree.node(*first)?.data, NodeData::Text(_)) => {
                    SelectionPoint::text(*first, 0)
                }
                _ => SelectionPoint::element(new_paragraph, 0),
            });
            tree.node_mut(new_paragraph)?.children = children;
            Ok(())
        })
    }
}
