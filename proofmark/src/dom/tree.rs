//! Arena-backed document tree.
//!
//! Nodes live in an `indextree` arena and refer to each other by [`NodeId`].
//! A node's root is found by walking parents, so reparenting never leaves a
//! stale back-reference behind. Every walk here is iterative: nesting depth is
//! input-controlled.

use std::collections::HashMap;

use indextree::{Arena, NodeEdge, NodeId};

use crate::dom::{DomNode, NodeKind};
use crate::macros::trace;
use crate::{Attributes, DiffError, ModificationType, Result};

/// Name of the element holding a document's content.
pub const BODY: &str = "body";

/// Element whose whitespace is preserved verbatim.
pub const PRE: &str = "pre";

/// A document: a tree of [`DomNode`]s under a `body` element, plus the
/// document-order list of its leaves as they were parsed.
#[derive(Debug, Clone)]
pub struct DomTree {
    arena: Arena<DomNode>,
    body: NodeId,
    leaves: Vec<NodeId>,
}

/// Where content from another tree attaches to this one, relative to an
/// anchor node. See [`DomTree::last_common_parent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommonParent {
    /// Deepest ancestor of the anchor whose chain from the root matches the
    /// other node's chain.
    pub parent: NodeId,
    /// Depth of `parent`, the body being at depth zero.
    pub depth: usize,
    /// Index within `parent` of the anchor, or of the anchor's ancestor
    /// that is a child of `parent`. May be -1 or the child count for
    /// synthetic anchors before the first or after the last child.
    pub index: isize,
    /// The anchor sits below a child of `parent` that has no counterpart, so
    /// that child must be split to attach content next to the anchor.
    pub splitting_needed: bool,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// An empty document.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let body = arena.new_node(DomNode::tag(BODY, Attributes::new()));
        Self {
            arena,
            body,
            leaves: Vec::new(),
        }
    }

    /// The `body` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// The leaves recorded while the document was built, in document order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    pub(crate) fn push_leaf(&mut self, leaf: NodeId) {
        self.leaves.push(leaf);
    }

    /// The node behind `id`.
    ///
    /// `id` must come from this tree.
    pub fn node(&self, id: NodeId) -> &DomNode {
        self.arena[id].get()
    }

    /// Mutable access to the node behind `id`.
    pub fn node_mut(&mut self, id: NodeId) -> &mut DomNode {
        self.arena[id].get_mut()
    }

    /// The node behind `id`, if `id` is valid in this tree.
    pub fn get(&self, id: NodeId) -> Option<&DomNode> {
        self.arena.get(id).map(|node| node.get())
    }

    /// A new node, not yet attached anywhere.
    pub fn new_node(&mut self, node: DomNode) -> NodeId {
        self.arena.new_node(node)
    }

    /// The parent of `id`; `None` for the body and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent())
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Number of children of `id`.
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Child of `parent` at `index`.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index)
    }

    /// Position of `child` among the children of `parent`.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).position(|c| c == child)
    }

    /// `id` and everything below it, in document order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// Enter and leave events of a depth-first walk below `id`.
    pub(crate) fn traverse(&self, id: NodeId) -> impl Iterator<Item = NodeEdge> + '_ {
        id.traverse(&self.arena)
    }

    /// The topmost ancestor of `id`, `id` itself when detached.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        id.ancestors(&self.arena).last().unwrap_or(id)
    }

    /// Ancestors of `id` from the root down to its parent.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain: Vec<NodeId> = id.ancestors(&self.arena).skip(1).collect();
        chain.reverse();
        chain
    }

    /// Whether `a` in this tree and `b` in `other` are the same element.
    /// Within one tree that is identity; across trees, the same name and
    /// attribute set.
    pub fn same_tag(&self, a: NodeId, other: &DomTree, b: NodeId) -> bool {
        if core::ptr::eq(self, other) {
            a == b
        } else {
            self.node(a).same_tag(other.node(b))
        }
    }

    /// Attach the detached node `child` to `parent`, at `index` or last.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> Result<()> {
        if !self.node(parent).is_tag() {
            return Err(DiffError::invalid_tree("cannot add a child to a leaf"));
        }
        if self.parent(child).is_some() {
            return Err(DiffError::invalid_tree(
                "node is already held by another parent",
            ));
        }
        match index.and_then(|index| self.child_at(parent, index)) {
            Some(sibling) => sibling.checked_insert_before(child, &mut self.arena)?,
            None => parent.checked_append(child, &mut self.arena)?,
        }
        Ok(())
    }

    /// Insert the detached node `node` at `index` in `parent`. Negative
    /// indices insert first; indices past the end append.
    pub(crate) fn insert_at(&mut self, parent: NodeId, index: isize, node: NodeId) -> Result<()> {
        let index = usize::try_from(index.max(0)).unwrap_or_default();
        self.add_child(parent, node, Some(index))
    }

    /// Remove `id` from its parent. The node and its subtree stay in the
    /// arena.
    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    /// Copy the subtree below `id` into a new, detached subtree of this tree.
    pub fn copy_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        // pre-order, so every parent is copied before its children
        let nodes: Vec<(NodeId, Option<NodeId>, DomNode)> = self
            .descendants(id)
            .map(|from| {
                let parent = if from == id { None } else { self.parent(from) };
                (from, parent, self.node(from).clone())
            })
            .collect();

        let mut copies: HashMap<NodeId, NodeId> = HashMap::with_capacity(nodes.len());
        for (from, parent, node) in nodes {
            let copy = self.arena.new_node(node);
            if let Some(&parent) = parent.and_then(|parent| copies.get(&parent)) {
                parent.checked_append(copy, &mut self.arena)?;
            }
            copies.insert(from, copy);
        }
        copies
            .get(&id)
            .copied()
            .ok_or_else(|| DiffError::invalid_tree("copied subtree lost its root"))
    }

    /// Copy the subtree below `id` of `source` into a new, detached subtree
    /// of this tree. Flags and modifications are copied along.
    pub fn copy_subtree_from(&mut self, source: &DomTree, id: NodeId) -> Result<NodeId> {
        let root = self.arena.new_node(source.node(id).clone());
        let mut pending = vec![(id, root)];
        while let Some((from, to)) = pending.pop() {
            for child in source.children(from) {
                let copy = self.arena.new_node(source.node(child).clone());
                to.checked_append(copy, &mut self.arena)?;
                pending.push((child, copy));
            }
        }
        Ok(root)
    }

    /// The first leaf below `id`, or the innermost childless tag on the way.
    pub fn left_most(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(child) = self.arena[current].first_child() {
            current = child;
        }
        current
    }

    /// The last leaf below `id`, or the innermost childless tag on the way.
    pub fn right_most(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(child) = self.arena[current].last_child() {
            current = child;
        }
        current
    }

    /// Text leaves below `id`, in document order. Images, separators and
    /// spaces are left out.
    pub fn text_leaves(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .filter(|&d| matches!(self.node(d).kind, NodeKind::Text(_)))
            .collect()
    }

    /// The smallest set of nodes that together cover exactly the leaves
    /// removed under deletion `id`.
    ///
    /// A container is in the set when every child is entirely removed and
    /// none of its ancestors is; a container without children never counts
    /// as removed. The body itself is never returned.
    pub fn minimal_deleted_set(&self, id: u64) -> Vec<NodeId> {
        let order: Vec<NodeId> = self.descendants(self.body).collect();
        let mut removed: HashMap<NodeId, bool> = HashMap::with_capacity(order.len());

        for &node_id in order.iter().rev() {
            let node = self.node(node_id);
            let is_removed = if node.is_tag() {
                let mut children = self.children(node_id).peekable();
                children.peek().is_some()
                    && children.all(|child| removed.get(&child).copied().unwrap_or(false))
            } else {
                node.modification.as_ref().is_some_and(|modification| {
                    modification.kind == ModificationType::Removed && modification.id == id
                })
            };
            removed.insert(node_id, is_removed);
        }

        let mut set = Vec::new();
        let mut pending: Vec<NodeId> = self.children(self.body).collect();
        pending.reverse();
        while let Some(node_id) = pending.pop() {
            if removed.get(&node_id).copied().unwrap_or(false) {
                set.push(node_id);
            } else {
                let first = pending.len();
                pending.extend(self.children(node_id));
                pending[first..].reverse();
            }
        }
        set
    }

    /// Split every ancestor of `split`, starting at `node` and stopping below
    /// `stop`, into a left and a right clone.
    ///
    /// Children before `split` go left, children after it go right, and
    /// `split` itself goes left when `include_left` is set. Non-empty clones
    /// take the place of the original, which is detached. The split moves up
    /// one level at a time, following the clone that holds the split point.
    ///
    /// Returns whether the first level actually produced two halves.
    pub fn split_until(
        &mut self,
        node: NodeId,
        stop: NodeId,
        split: NodeId,
        include_left: bool,
    ) -> Result<bool> {
        let mut node = node;
        let mut split = split;
        let mut first_level = true;
        let mut split_occurred = false;

        while node != stop {
            let Some(parent) = self.parent(node) else {
                return Err(DiffError::invalid_tree(
                    "split stop node is not an ancestor of the split node",
                ));
            };
            let original = self.node(node).clone();
            let (name, attributes) = match &original.kind {
                NodeKind::Tag { name, attributes } => (name.clone(), attributes.clone()),
                _ => return Err(DiffError::invalid_tree("cannot split a leaf")),
            };

            let left = self.arena.new_node(DomNode::tag(name.clone(), attributes.clone()));
            let right = self.arena.new_node(DomNode::tag(name, attributes));

            let children: Vec<NodeId> = self.children(node).collect();
            let position = children.iter().position(|&child| child == split);
            for (i, child) in children.into_iter().enumerate() {
                let target = match position {
                    Some(p) if i < p => left,
                    Some(p) if i == p && include_left => left,
                    Some(_) => right,
                    None => left,
                };
                child.detach(&mut self.arena);
                target.checked_append(child, &mut self.arena)?;
            }

            let has_left = self.arena[left].first_child().is_some();
            let has_right = self.arena[right].first_child().is_some();
            match (has_left, has_right) {
                (true, true) => {
                    self.node_mut(left).white_before = original.white_before;
                    self.node_mut(right).white_after = original.white_after;
                }
                (true, false) => {
                    self.node_mut(left).white_before = original.white_before;
                    self.node_mut(left).white_after = original.white_after;
                }
                (false, true) => {
                    self.node_mut(right).white_before = original.white_before;
                    self.node_mut(right).white_after = original.white_after;
                }
                (false, false) => {}
            }
            if has_left {
                node.checked_insert_before(left, &mut self.arena)?;
            } else {
                left.remove(&mut self.arena);
            }
            if has_right {
                node.checked_insert_before(right, &mut self.arena)?;
            } else {
                right.remove(&mut self.arena);
            }
            if first_level {
                split_occurred = has_left && has_right;
                first_level = false;
            }
            trace!(?node, has_left, has_right, "split container");

            node.detach(&mut self.arena);
            split = if include_left { left } else { right };
            node = parent;
        }

        Ok(split_occurred)
    }

    /// Turn the whitespace flags below `id` into explicit space leaves.
    ///
    /// A space is inserted before a child with `white_before`, unless the
    /// previous child already got one after it, and after a child with
    /// `white_after`. A space takes over the modification of the leaf it
    /// touches, without opening a new run. `pre` elements are left alone.
    pub fn expand_whitespace(&mut self, id: NodeId) -> Result<()> {
        let mut containers = Vec::new();
        let mut pending = vec![id];
        while let Some(container) = pending.pop() {
            if !self.node(container).is_tag() {
                continue;
            }
            containers.push(container);
            if self.node(container).tag_name() != Some(PRE) {
                pending.extend(self.children(container));
            }
        }

        for container in containers {
            if self.node(container).tag_name() == Some(PRE) {
                continue;
            }
            let children: Vec<NodeId> = self.children(container).collect();
            let mut space_added = false;
            for child in children {
                let (white_before, white_after) = {
                    let node = self.node(child);
                    (node.white_before, node.white_after)
                };
                if !space_added && white_before {
                    let like = self.left_most(child);
                    let space = self.space_like(like);
                    child.checked_insert_before(space, &mut self.arena)?;
                }
                if white_after {
                    let like = self.right_most(child);
                    let space = self.space_like(like);
                    child.checked_insert_after(space, &mut self.arena)?;
                    space_added = true;
                } else {
                    space_added = false;
                }
            }
        }
        Ok(())
    }

    fn space_like(&mut self, like: NodeId) -> NodeId {
        let mut space = DomNode::white_space();
        if !self.node(like).is_tag() {
            space.modification = self.node(like).modification.clone().map(|mut modification| {
                modification.first_of_id = false;
                modification
            });
        }
        self.arena.new_node(space)
    }

    /// Locate where content belonging next to `other` (a node of `other_tree`)
    /// attaches relative to `node`.
    ///
    /// The ancestor chains of both nodes are compared from just below the
    /// root. The last matching ancestor of `node` is the common parent. When
    /// the chains differ in length, or `node` sits below a mismatching
    /// ancestor, splitting is flagged and the index is that of the child of
    /// the common parent on the way to `node` (`node` itself when its chain
    /// ran out first).
    pub fn last_common_parent(&self, node: NodeId, other_tree: &DomTree, other: NodeId) -> CommonParent {
        let mine = self.ancestors(node);
        let theirs = other_tree.ancestors(other);

        let mut i = 1;
        let mut same = true;
        while same && i < mine.len() && i < theirs.len() {
            if self.same_tag(mine[i], other_tree, theirs[i]) {
                i += 1;
            } else {
                same = false;
            }
        }

        let parent = mine.get(i - 1).copied().unwrap_or(self.body);
        let (below, splitting_needed) = if !same || mine.len() != theirs.len() {
            (mine.get(i).copied().unwrap_or(node), true)
        } else {
            (node, false)
        };
        let index = self
            .index_of(parent, below)
            .and_then(|index| isize::try_from(index).ok())
            .unwrap_or(-1);

        CommonParent {
            parent,
            depth: i - 1,
            index,
            splitting_needed,
        }
    }

    /// Compare the subtrees below `a` and `b` of `other` node by node.
    pub fn subtree_eq(&self, a: NodeId, other: &DomTree, b: NodeId) -> bool {
        let left: Vec<NodeEdge> = self.traverse(a).collect();
        let right: Vec<NodeEdge> = other.traverse(b).collect();
        left.len() == right.len()
            && left.iter().zip(&right).all(|pair| match pair {
                (NodeEdge::Start(x), NodeEdge::Start(y)) => self.node(*x) == other.node(*y),
                (NodeEdge::End(_), NodeEdge::End(_)) => true,
                _ => false,
            })
    }
}
