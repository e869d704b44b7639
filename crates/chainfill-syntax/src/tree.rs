use std::fmt;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::SyntaxKind;

/// Stable identity of a node inside a [`SyntaxTree`].
///
/// Ids stay valid for the lifetime of the tree, including while the node is
/// detached. Detached nodes are never freed; the arena only grows.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Source text for tokens; `None` for composite nodes.
    text: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("{0:?} does not belong to this tree")]
    UnknownNode(NodeId),
    #[error("the root node cannot be detached or replaced")]
    RootNode,
    #[error("{0:?} is still attached to a parent")]
    StillAttached(NodeId),
    #[error("{0:?} is not attached to a parent")]
    NotAttached(NodeId),
    #[error("{0:?} is a token and cannot have children")]
    NotComposite(NodeId),
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("child index {index} is out of bounds for {parent:?} ({len} children)")]
    IndexOutOfBounds {
        parent: NodeId,
        index: usize,
        len: usize,
    },
}

/// A mutable, lossless syntax tree stored in an arena.
///
/// Every node has a non-owning parent link and an ordered list of owned
/// children. Tokens (including trivia) are leaves carrying their text, so
/// [`SyntaxTree::render`] reproduces the source exactly.
#[derive(Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn new(root_kind: SyntaxKind) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: root_kind,
                parent: None,
                children: Vec::new(),
                text: None,
            }],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.index()]
    }

    fn check(&self, node: NodeId) -> Result<(), TreeError> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(node))
        }
    }

    // --- Construction -----------------------------------------------------

    /// Allocate a detached composite node.
    pub fn alloc_node(&mut self, kind: SyntaxKind) -> NodeId {
        self.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            text: None,
        })
    }

    /// Allocate a detached token.
    pub fn alloc_token(&mut self, kind: SyntaxKind, text: impl Into<SmolStr>) -> NodeId {
        self.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            text: Some(text.into()),
        })
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    // --- Navigation -------------------------------------------------------

    /// Panics if `node` was not allocated by this tree.
    pub fn kind(&self, node: NodeId) -> SyntaxKind {
        self.data(node).kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|data| data.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn is_token(&self, node: NodeId) -> bool {
        self.data(node).text.is_some()
    }

    pub fn token_text(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node.index())
            .and_then(|data| data.text.as_deref())
    }

    pub fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|&child| child == node)
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.index_in_parent(node)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let index = self.index_in_parent(node)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.children(parent).get(prev).copied())
    }

    /// Previous sibling, skipping whitespace and comments.
    pub fn prev_non_trivia_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.prev_sibling(node)?;
        while self.kind(current).is_trivia() {
            current = self.prev_sibling(current)?;
        }
        Some(current)
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(node) && self.is_ancestor_or_self(self.root, node)
    }

    /// Leaves (tokens and childless nodes) under `node`, in source order.
    pub fn leaves(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let children = self.children(id);
            if children.is_empty() {
                out.push(id);
            } else {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    pub fn first_token(&self, node: NodeId) -> Option<NodeId> {
        self.leaves(node)
            .into_iter()
            .find(|&leaf| self.is_token(leaf))
    }

    pub fn last_token(&self, node: NodeId) -> Option<NodeId> {
        self.leaves(node)
            .into_iter()
            .rev()
            .find(|&leaf| self.is_token(leaf))
    }

    // --- Text -------------------------------------------------------------

    pub fn text_len(&self, node: NodeId) -> TextSize {
        self.leaves(node)
            .into_iter()
            .filter_map(|leaf| self.token_text(leaf))
            .fold(TextSize::from(0), |acc, text| acc + TextSize::of(text))
    }

    /// Source text covered by `node`.
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        for leaf in self.leaves(node) {
            if let Some(text) = self.token_text(leaf) {
                out.push_str(text);
            }
        }
        out
    }

    /// Source text of the whole tree.
    pub fn render(&self) -> String {
        self.text(self.root)
    }

    /// Range of `node` relative to the start of its top-most ancestor (the
    /// root for attached nodes).
    pub fn text_range(&self, node: NodeId) -> TextRange {
        let mut start = TextSize::from(0);
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            for &sibling in self.children(parent) {
                if sibling == current {
                    break;
                }
                start += self.text_len(sibling);
            }
            current = parent;
        }
        TextRange::at(start, self.text_len(node))
    }

    /// Map a byte offset to the anchor node a host would hand to an editor
    /// action.
    ///
    /// A childless marker node (such as the zero-width `Error` left where a
    /// `;` was expected) sitting exactly at `offset` wins; otherwise the token
    /// whose range covers `offset` is returned.
    pub fn anchor_at(&self, offset: TextSize) -> Option<NodeId> {
        let mut pos = TextSize::from(0);
        for leaf in self.leaves(self.root) {
            let len = self
                .token_text(leaf)
                .map(TextSize::of)
                .unwrap_or_else(|| TextSize::from(0));
            if len == TextSize::from(0) {
                if pos == offset && !self.is_token(leaf) && leaf != self.root {
                    return Some(leaf);
                }
                continue;
            }
            if pos <= offset && offset < pos + len {
                return Some(leaf);
            }
            pos += len;
        }
        None
    }

    // --- Mutation ---------------------------------------------------------

    /// Detach `node` from its parent. The node (and its subtree) keeps its
    /// identity and can be re-inserted elsewhere.
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.check(node)?;
        if node == self.root {
            return Err(TreeError::RootNode);
        }
        let parent = self.parent(node).ok_or(TreeError::NotAttached(node))?;
        self.nodes[parent.index()]
            .children
            .retain(|&child| child != node);
        self.nodes[node.index()].parent = None;
        Ok(())
    }

    /// Insert the detached `child` at `index` among `parent`'s children.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), TreeError> {
        self.check_insertable(parent, child)?;
        let len = self.children(parent).len();
        if index > len {
            return Err(TreeError::IndexOutOfBounds { parent, index, len });
        }
        self.nodes[parent.index()].children.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Put the detached `new` where `old` currently is; `old` ends up
    /// detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<(), TreeError> {
        self.check(old)?;
        if old == self.root {
            return Err(TreeError::RootNode);
        }
        let parent = self.parent(old).ok_or(TreeError::NotAttached(old))?;
        self.check_insertable(parent, new)?;
        let index = self
            .index_in_parent(old)
            .ok_or(TreeError::NotAttached(old))?;
        self.nodes[parent.index()].children[index] = new;
        self.nodes[new.index()].parent = Some(parent);
        self.nodes[old.index()].parent = None;
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;
        if child == self.root {
            return Err(TreeError::RootNode);
        }
        if self.is_token(parent) {
            return Err(TreeError::NotComposite(parent));
        }
        if self.parent(child).is_some() {
            return Err(TreeError::StillAttached(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        Ok(())
    }

    /// Indented `Kind "text"` dump of the subtree, for tests and debugging.
    pub fn debug_dump(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.dump_into(node, 0, &mut out);
        out
    }

    fn dump_into(&self, node: NodeId, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        match self.token_text(node) {
            Some(text) => out.push_str(&format!("{:?} {:?}\n", self.kind(node), text)),
            None => out.push_str(&format!("{:?}\n", self.kind(node))),
        }
        for &child in self.children(node) {
            self.dump_into(child, depth + 1, out);
        }
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_dump(self.root))
    }
}

/// Position recorded by [`TreeBuilder::checkpoint`].
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    parent: NodeId,
    index: usize,
}

/// Incremental, event-style builder used by the parser.
///
/// Mirrors the usual `start_node` / `token` / `finish_node` protocol,
/// including checkpoints for wrapping already-built children in a new node
/// (needed for left-recursive postfix expressions like `a.b().c()`).
pub struct TreeBuilder {
    tree: SyntaxTree,
    stack: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(root_kind: SyntaxKind) -> Self {
        let tree = SyntaxTree::new(root_kind);
        let root = tree.root();
        Self {
            tree,
            stack: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.tree.root)
    }

    pub fn start_node(&mut self, kind: SyntaxKind) {
        let parent = self.current();
        let node = self.tree.alloc_node(kind);
        self.attach(parent, node);
        self.stack.push(node);
    }

    pub fn token(&mut self, kind: SyntaxKind, text: &str) {
        let parent = self.current();
        let token = self.tree.alloc_token(kind, text);
        self.attach(parent, token);
    }

    /// Append a childless marker node (e.g. a zero-width `Error`).
    pub fn marker(&mut self, kind: SyntaxKind) {
        let parent = self.current();
        let node = self.tree.alloc_node(kind);
        self.attach(parent, node);
    }

    pub fn finish_node(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        let parent = self.current();
        Checkpoint {
            parent,
            index: self.tree.children(parent).len(),
        }
    }

    /// Start a node that adopts every child appended to the checkpoint's
    /// parent since the checkpoint was taken.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        let parent = checkpoint.parent;
        debug_assert_eq!(parent, self.current(), "checkpoint from another node");
        let node = self.tree.alloc_node(kind);
        let index = checkpoint.index.min(self.tree.children(parent).len());
        let adopted = self.tree.nodes[parent.index()].children.split_off(index);
        for &child in &adopted {
            self.tree.nodes[child.index()].parent = Some(node);
        }
        self.tree.nodes[node.index()].children = adopted;
        self.attach(parent, node);
        self.stack.push(node);
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.tree.nodes[parent.index()].children.push(child);
        self.tree.nodes[child.index()].parent = Some(parent);
    }

    pub fn finish(self) -> SyntaxTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> (SyntaxTree, NodeId, NodeId, NodeId) {
        let mut tree = SyntaxTree::new(SyntaxKind::Statement);
        let root = tree.root();
        let a = tree.alloc_token(SyntaxKind::Identifier, "a");
        let ws = tree.alloc_token(SyntaxKind::Whitespace, " ");
        let semi = tree.alloc_token(SyntaxKind::Semicolon, ";");
        for node in [a, ws, semi] {
            tree.append_child(root, node).unwrap();
        }
        (tree, a, ws, semi)
    }

    #[test]
    fn renders_and_measures() {
        let (tree, a, _, semi) = sample();
        assert_eq!(tree.render(), "a ;");
        assert_eq!(tree.text_range(semi), TextRange::new(TextSize::from(2), TextSize::from(3)));
        assert_eq!(tree.prev_non_trivia_sibling(semi), Some(a));
    }

    #[test]
    fn replace_moves_identity() {
        let (mut tree, a, _, semi) = sample();
        let b = tree.alloc_token(SyntaxKind::Identifier, "b");
        tree.replace(a, b).unwrap();
        assert_eq!(tree.render(), "b ;");
        assert_eq!(tree.parent(a), None);
        assert!(!tree.is_attached(a));
        assert_eq!(tree.prev_non_trivia_sibling(semi), Some(b));
    }

    #[test]
    fn rejects_cycles_and_attached_children() {
        let (mut tree, a, _, _) = sample();
        let root = tree.root();
        assert_eq!(
            tree.append_child(root, a),
            Err(TreeError::StillAttached(a))
        );

        let outer = tree.alloc_node(SyntaxKind::ParenthesizedExpression);
        let inner = tree.alloc_node(SyntaxKind::ParenthesizedExpression);
        tree.append_child(outer, inner).unwrap();
        assert_eq!(
            tree.append_child(inner, outer),
            Err(TreeError::Cycle {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(tree.detach(root), Err(TreeError::RootNode));
    }

    #[test]
    fn checkpoint_wraps_previous_children() {
        let mut builder = TreeBuilder::new(SyntaxKind::Statement);
        let checkpoint = builder.checkpoint();
        builder.token(SyntaxKind::Identifier, "a");
        builder.start_node_at(checkpoint, SyntaxKind::FieldAccessExpression);
        builder.token(SyntaxKind::Dot, ".");
        builder.token(SyntaxKind::Identifier, "b");
        builder.finish_node();
        builder.marker(SyntaxKind::Error);
        let tree = builder.finish();

        assert_eq!(
            tree.debug_dump(tree.root()),
            "Statement\n  FieldAccessExpression\n    Identifier \"a\"\n    Dot \".\"\n    Identifier \"b\"\n  Error\n"
        );
        let anchor = tree.anchor_at(TextSize::from(3)).unwrap();
        assert_eq!(tree.kind(anchor), SyntaxKind::Error);
    }
}
