//! Document tree storage and tracked structural edits
//!
//! Every structural primitive accepts an optional [`SelectionRange`] and
//! rebases it as part of the edit, using the same rules a live DOM range
//! follows:
//!
//! - inserting a child at `(parent, i)` shifts parent offsets greater than `i`
//! - removing a child collapses endpoints inside it onto `(parent, i)` and
//!   shifts parent offsets greater than `i` down by one
//! - moving a subtree keeps endpoints that point inside it
//! - merging two text leaves redirects endpoints into the surviving leaf
//!
//! Callers never patch offsets by hand.

use crate::{
    ElementData, ModelError, Node, NodeId, NodeKind, NodeType, Position, Result, SelectionRange,
    Tag,
};
use std::collections::{HashMap, HashSet};

/// A rooted, ordered, mutable tree of nodes.
///
/// Nodes live in a map keyed by id. A node created with one of the
/// `create_*` methods is detached until it is inserted; the designated
/// editable root is created with the tree and can never be detached.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

impl DocumentTree {
    /// Create a tree whose editable root is an empty element with `root_tag`
    pub fn new(root_tag: Tag) -> Self {
        Self::with_root(ElementData::new(root_tag))
    }

    /// Create a tree with a fully specified root element
    pub fn with_root(data: ElementData) -> Self {
        let root = Node::new(NodeKind::Element(data));
        let root_id = root.id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            root: root_id,
            nodes,
        }
    }

    /// Get the editable root ID
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Number of stored nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(ModelError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(ModelError::NodeNotFound(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(&id).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&Tag> {
        self.get(id).and_then(Node::tag)
    }

    pub fn has_tag(&self, id: NodeId, tag: &Tag) -> bool {
        self.tag(id) == Some(tag)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.node_type(id) == Some(NodeType::Text)
    }

    pub fn is_comment(&self, id: NodeId) -> bool {
        self.node_type(id) == Some(NodeType::Comment)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.node_type(id) == Some(NodeType::Element)
    }

    /// A hard line break is a `BR` element
    pub fn is_line_break(&self, id: NodeId) -> bool {
        self.has_tag(id, &Tag::Br)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::text)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children of a node (empty for leaves and unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Proper ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether `node` is `ancestor` or lies inside its subtree
    pub fn contains_node(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether a node is reachable from the editable root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(id) && self.contains_node(self.root, id)
    }

    /// Nearest node that is an ancestor-or-self of both `a` and `b`
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let chain: HashSet<NodeId> = std::iter::once(a).chain(self.ancestors(a)).collect();
        std::iter::once(b)
            .chain(self.ancestors(b))
            .find(|n| chain.contains(n))
    }

    /// Pre-order walk of a subtree, `id` first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Offset bound of a container: chars for text, children for elements
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Text(text)) => text.chars().count(),
            Some(NodeKind::Element(_)) => self.child_count(id),
            _ => 0,
        }
    }

    /// Concatenated text of all text leaves in a subtree
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    pub fn validate_position(&self, position: &Position) -> Result<()> {
        self.node(position.node)?;
        if !self.is_attached(position.node) {
            return Err(ModelError::Detached(position.node));
        }
        if position.offset > self.node_length(position.node) {
            return Err(ModelError::InvalidPosition {
                node: position.node,
                offset: position.offset,
            });
        }
        Ok(())
    }

    /// Both endpoints attached with in-bounds offsets
    pub fn validate_range(&self, range: &SelectionRange) -> Result<()> {
        self.validate_position(&range.start)?;
        self.validate_position(&range.end)
    }

    // =========================================================================
    // Construction (nodes start detached)
    // =========================================================================

    fn create(&mut self, kind: NodeKind) -> NodeId {
        let node = Node::new(kind);
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(text.into()))
    }

    pub fn create_element(&mut self, tag: Tag) -> NodeId {
        self.create(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_element_with(&mut self, data: ElementData) -> NodeId {
        self.create(NodeKind::Element(data))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Comment(text.into()))
    }

    pub fn create_line_break(&mut self) -> NodeId {
        self.create_element(Tag::Br)
    }

    // =========================================================================
    // Tracked structural edits
    // =========================================================================

    /// Append a detached node as the last child of `parent`
    pub fn append_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        tracked: Option<&mut SelectionRange>,
    ) -> Result<()> {
        let index = self.child_count(parent);
        self.insert_at(parent, index, child, tracked)
    }

    /// Insert a detached node before `reference`
    pub fn insert_before(
        &mut self,
        reference: NodeId,
        child: NodeId,
        tracked: Option<&mut SelectionRange>,
    ) -> Result<()> {
        let (parent, index) = self.slot_of(reference)?;
        self.insert_at(parent, index, child, tracked)
    }

    /// Insert a detached node after `reference`
    pub fn insert_after(
        &mut self,
        reference: NodeId,
        child: NodeId,
        tracked: Option<&mut SelectionRange>,
    ) -> Result<()> {
        let (parent, index) = self.slot_of(reference)?;
        self.insert_at(parent, index + 1, child, tracked)
    }

    /// Insert a detached node as child number `index` of `parent`
    pub fn insert_at(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
        tracked: Option<&mut SelectionRange>,
    ) -> Result<()> {
        self.check_insertable(parent, child)?;
        if self.node(child)?.parent().is_some() {
            return Err(ModelError::TreeStructure(format!(
                "node {child} is already attached; use move_to"
            )));
        }
        if index > self.child_count(parent) {
            return Err(ModelError::InvalidPosition {
                node: parent,
                offset: index,
            });
        }

        if let Some(range) = tracked {
            for position in range.endpoints_mut() {
                if position.node == parent && position.offset > index {
                    position.offset += 1;
                }
            }
        }

        self.node_mut(parent)?.children_mut().insert(index, child);
        self.node_mut(child)?.set_parent(Some(parent));
        Ok(())
    }

    /// Move an attached node to child number `index` of `new_parent`.
    ///
    /// `index` is counted after the node has left its old slot. Endpoints
    /// inside the moved subtree keep pointing at the same nodes.
    pub fn move_to(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        index: usize,
        tracked: Option<&mut SelectionRange>,
    ) -> Result<()> {
        self.check_insertable(new_parent, node)?;
        let (old_parent, old_index) = self.slot_of(node)?;
        let available = self.child_count(new_parent) - usize::from(old_parent == new_parent);
        if index > available {
            return Err(ModelError::InvalidPosition {
                node: new_parent,
                offset: index,
            });
        }

        if let Some(range) = tracked {
            for position in range.endpoints_mut() {
                if self.contains_node(node, position.node) {
                    continue;
                }
                if position.node == old_parent && position.offset > old_index {
                    position.offset -= 1;
                }
                if position.node == new_parent && position.offset > index {
                    position.offset += 1;
                }
            }
        }

        self.node_mut(old_parent)?.children_mut().remove(old_index);
        self.node_mut(new_parent)?.children_mut().insert(index, node);
        self.node_mut(node)?.set_parent(Some(new_parent));
        Ok(())
    }

    /// Detach a node and drop its whole subtree
    pub fn remove(&mut self, node: NodeId, tracked: Option<&mut SelectionRange>) -> Result<()> {
        if node == self.root {
            return Err(ModelError::TreeStructure("cannot remove the editable root".into()));
        }
        self.node(node)?;

        if let Ok((parent, index)) = self.slot_of(node) {
            if let Some(range) = tracked {
                for position in range.endpoints_mut() {
                    if self.contains_node(node, position.node) {
                        *position = Position::new(parent, index);
                    } else if position.node == parent && position.offset > index {
                        position.offset -= 1;
                    }
                }
            }
            self.node_mut(parent)?.children_mut().remove(index);
        }

        for id in self.descendants(node) {
            self.nodes.remove(&id);
        }
        Ok(())
    }

    /// Append the text of `node` to its previous text sibling and remove
    /// `node`. Returns the surviving text node.
    pub fn merge_text_into_previous(
        &mut self,
        node: NodeId,
        mut tracked: Option<&mut SelectionRange>,
    ) -> Result<NodeId> {
        let previous = self
            .previous_sibling(node)
            .ok_or_else(|| ModelError::TreeStructure(format!("node {node} has no previous sibling")))?;
        let tail = self.text(node).ok_or(ModelError::NotText(node))?.to_string();
        let head = self.text(previous).ok_or(ModelError::NotText(previous))?.to_string();
        let head_len = head.chars().count();

        if let Some(range) = tracked.as_deref_mut() {
            for position in range.endpoints_mut() {
                if position.node == node {
                    *position = Position::new(previous, head_len + position.offset);
                }
            }
        }

        self.node_mut(previous)?.kind = NodeKind::Text(head + &tail);
        self.remove(node, tracked)?;
        tracing::trace!(survivor = %previous, "merged text into previous sibling");
        Ok(previous)
    }

    /// Prepend the text of `node` to its next text sibling and remove
    /// `node`. Returns the surviving text node.
    pub fn merge_text_into_next(
        &mut self,
        node: NodeId,
        mut tracked: Option<&mut SelectionRange>,
    ) -> Result<NodeId> {
        let next = self
            .next_sibling(node)
            .ok_or_else(|| ModelError::TreeStructure(format!("node {node} has no next sibling")))?;
        let head = self.text(node).ok_or(ModelError::NotText(node))?.to_string();
        let tail = self.text(next).ok_or(ModelError::NotText(next))?.to_string();
        let head_len = head.chars().count();

        if let Some(range) = tracked.as_deref_mut() {
            for position in range.endpoints_mut() {
                if position.node == next {
                    position.offset += head_len;
                } else if position.node == node {
                    position.node = next;
                }
            }
        }

        self.node_mut(next)?.kind = NodeKind::Text(head + &tail);
        self.remove(node, tracked)?;
        tracing::trace!(survivor = %next, "merged text into next sibling");
        Ok(next)
    }

    /// Replace the text of a text node, clamping endpoints inside it
    pub fn set_text(
        &mut self,
        node: NodeId,
        text: impl Into<String>,
        tracked: Option<&mut SelectionRange>,
    ) -> Result<()> {
        let text = text.into();
        let len = text.chars().count();
        match &mut self.node_mut(node)?.kind {
            NodeKind::Text(slot) => *slot = text,
            _ => return Err(ModelError::NotText(node)),
        }
        if let Some(range) = tracked {
            for position in range.endpoints_mut() {
                if position.node == node && position.offset > len {
                    position.offset = len;
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Parent and child index of an attached node
    fn slot_of(&self, node: NodeId) -> Result<(NodeId, usize)> {
        let parent = self
            .parent(node)
            .ok_or_else(|| ModelError::TreeStructure(format!("node {node} has no parent")))?;
        let index = self
            .index_in_parent(node)
            .ok_or_else(|| ModelError::TreeStructure(format!("node {node} missing from its parent")))?;
        Ok((parent, index))
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        self.node(child)?;
        if !parent_node.can_have_children() {
            return Err(ModelError::NotAnElement(parent));
        }
        if child == self.root {
            return Err(ModelError::TreeStructure("the editable root cannot be moved".into()));
        }
        if self.contains_node(child, parent) {
            return Err(ModelError::TreeStructure(format!(
                "inserting {child} under {parent} would create a cycle"
            )));
        }
        Ok(())
    }
}

/// Iterator over proper ancestors, nearest first
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a DocumentTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_div(text: &str) -> (DocumentTree, NodeId, NodeId) {
        let mut tree = DocumentTree::new(Tag::Div);
        let div = tree.create_element(Tag::Div);
        let t = tree.create_text(text);
        tree.append_child(tree.root_id(), div, None).unwrap();
        tree.append_child(div, t, None).unwrap();
        (tree, div, t)
    }

    #[test]
    fn test_append_and_navigate() {
        let (mut tree, div, t) = tree_with_div("hello");
        let br = tree.create_line_break();
        tree.append_child(div, br, None).unwrap();

        assert_eq!(tree.parent(t), Some(div));
        assert_eq!(tree.next_sibling(t), Some(br));
        assert_eq!(tree.previous_sibling(br), Some(t));
        assert_eq!(tree.first_child(tree.root_id()), Some(div));
        assert!(tree.is_line_break(br));
        assert!(tree.is_attached(t));
    }

    #[test]
    fn test_insert_shifts_parent_offsets() {
        let (mut tree, div, _t) = tree_with_div("a");
        let mut range = SelectionRange::within(div, 0, 1);
        let span = tree.create_element(Tag::Span);
        tree.insert_at(div, 0, span, Some(&mut range)).unwrap();

        assert_eq!(range.start, Position::new(div, 0));
        assert_eq!(range.end, Position::new(div, 2));
    }

    #[test]
    fn test_remove_collapses_inner_endpoints() {
        let (mut tree, div, t) = tree_with_div("abc");
        let mut range = SelectionRange::within(t, 1, 2);
        tree.remove(t, Some(&mut range)).unwrap();

        assert_eq!(range.start, Position::new(div, 0));
        assert!(range.is_collapsed());
        assert!(!tree.contains(t));
        tree.validate_range(&range).unwrap();
    }

    #[test]
    fn test_move_keeps_inner_endpoints() {
        let (mut tree, div, t) = tree_with_div("abc");
        let other = tree.create_element(Tag::P);
        tree.append_child(tree.root_id(), other, None).unwrap();
        let mut range = SelectionRange::within(t, 1, 3);

        tree.move_to(t, other, 0, Some(&mut range)).unwrap();

        assert_eq!(range.start, Position::new(t, 1));
        assert_eq!(range.end, Position::new(t, 3));
        assert_eq!(tree.parent(t), Some(other));
        assert_eq!(tree.child_count(div), 0);
    }

    #[test]
    fn test_move_within_same_parent() {
        let mut tree = DocumentTree::new(Tag::Div);
        let root = tree.root_id();
        let a = tree.create_text("a");
        let b = tree.create_element(Tag::Span);
        let c = tree.create_comment("c");
        for n in [a, b, c] {
            tree.append_child(root, n, None).unwrap();
        }
        tree.move_to(a, root, 2, None).unwrap();
        assert_eq!(tree.children(root), &[b, c, a]);
    }

    #[test]
    fn test_merge_into_previous_redirects_endpoints() {
        let (mut tree, div, t) = tree_with_div("ab");
        let t2 = tree.create_text("cd");
        tree.append_child(div, t2, None).unwrap();
        let mut range = SelectionRange::new(Position::new(t, 1), Position::new(t2, 1));

        let survivor = tree.merge_text_into_previous(t2, Some(&mut range)).unwrap();

        assert_eq!(survivor, t);
        assert_eq!(tree.text(t), Some("abcd"));
        assert_eq!(range.end, Position::new(t, 3));
        assert_eq!(tree.child_count(div), 1);
    }

    #[test]
    fn test_merge_into_next_redirects_endpoints() {
        let (mut tree, div, t) = tree_with_div("ab");
        let t2 = tree.create_text("cd");
        tree.append_child(div, t2, None).unwrap();
        let mut range = SelectionRange::new(Position::new(t, 2), Position::new(t2, 2));

        let survivor = tree.merge_text_into_next(t, Some(&mut range)).unwrap();

        assert_eq!(survivor, t2);
        assert_eq!(tree.text(t2), Some("abcd"));
        assert_eq!(range.start, Position::new(t2, 2));
        assert_eq!(range.end, Position::new(t2, 4));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let (mut tree, div, _) = tree_with_div("x");
        let inner = tree.create_element(Tag::Span);
        tree.append_child(div, inner, None).unwrap();
        assert!(tree.move_to(div, inner, 0, None).is_err());
    }

    #[test]
    fn test_void_element_takes_no_children() {
        let mut tree = DocumentTree::new(Tag::Div);
        let br = tree.create_line_break();
        let t = tree.create_text("x");
        assert!(matches!(
            tree.append_child(br, t, None),
            Err(ModelError::NotAnElement(_))
        ));
    }

    #[test]
    fn test_validate_detected_detached_node() {
        let mut tree = DocumentTree::new(Tag::Div);
        let loose = tree.create_text("loose");
        let range = SelectionRange::within(loose, 0, 0);
        assert!(matches!(
            tree.validate_range(&range),
            Err(ModelError::Detached(_))
        ));
    }

    #[test]
    fn test_validate_out_of_bounds_offset() {
        let (tree, _, t) = tree_with_div("abc");
        let range = SelectionRange::within(t, 0, 4);
        assert!(matches!(
            tree.validate_range(&range),
            Err(ModelError::InvalidPosition { offset: 4, .. })
        ));
    }

    #[test]
    fn test_common_ancestor() {
        let (mut tree, div, t) = tree_with_div("a");
        let p = tree.create_element(Tag::P);
        let t2 = tree.create_text("b");
        tree.append_child(tree.root_id(), p, None).unwrap();
        tree.append_child(p, t2, None).unwrap();

        assert_eq!(tree.common_ancestor(t, t2), Some(tree.root_id()));
        assert_eq!(tree.common_ancestor(t, div), Some(div));
    }

    #[test]
    fn test_text_content_and_length() {
        let (mut tree, div, _) = tree_with_div("שלום");
        let b = tree.create_element(Tag::B);
        let t = tree.create_text(" world");
        tree.append_child(div, b, None).unwrap();
        tree.append_child(b, t, None).unwrap();

        assert_eq!(tree.text_content(div), "שלום world");
        assert_eq!(tree.node_length(tree.first_child(div).unwrap()), 4);
        assert_eq!(tree.node_length(div), 2);
    }
}
