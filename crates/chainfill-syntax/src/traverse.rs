//! Generic tree traversal.
//!
//! These helpers only need parent / first-child / next-sibling navigation and
//! a kind accessor, so any parser backend can implement [`TreeView`] and reuse
//! them unchanged.

use crate::{NodeId, SyntaxKind, SyntaxTree};

pub trait TreeView {
    type Node: Copy + Eq;
    type Kind: Copy;

    fn kind(&self, node: Self::Node) -> Self::Kind;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
}

impl TreeView for SyntaxTree {
    type Node = NodeId;
    type Kind = SyntaxKind;

    fn kind(&self, node: NodeId) -> SyntaxKind {
        SyntaxTree::kind(self, node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        SyntaxTree::parent(self, node)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        SyntaxTree::first_child(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        SyntaxTree::next_sibling(self, node)
    }
}

/// `node` followed by each of its ancestors up to the root.
pub fn ancestors<T: TreeView>(view: &T, node: T::Node) -> impl Iterator<Item = T::Node> + '_ {
    std::iter::successors(Some(node), move |&current| view.parent(current))
}

/// Nearest ancestor whose kind matches `pred`. With `strict`, `node` itself is
/// never returned.
pub fn find_ancestor<T: TreeView>(
    view: &T,
    node: T::Node,
    strict: bool,
    mut pred: impl FnMut(T::Kind) -> bool,
) -> Option<T::Node> {
    ancestors(view, node)
        .skip(usize::from(strict))
        .find(|&candidate| pred(view.kind(candidate)))
}

/// Pre-order (document order) walk of the subtree rooted at `root`,
/// `root` included.
pub fn preorder<T: TreeView>(view: &T, root: T::Node) -> Preorder<'_, T> {
    Preorder {
        view,
        root,
        next: Some(root),
    }
}

pub struct Preorder<'a, T: TreeView> {
    view: &'a T,
    root: T::Node,
    next: Option<T::Node>,
}

impl<T: TreeView> Iterator for Preorder<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<T::Node> {
        let current = self.next?;
        self.next = match self.view.first_child(current) {
            Some(child) => Some(child),
            None => {
                // Climb until a node with a next sibling is found, never
                // leaving the subtree.
                let mut node = current;
                loop {
                    if node == self.root {
                        break None;
                    }
                    if let Some(sibling) = self.view.next_sibling(node) {
                        break Some(sibling);
                    }
                    match self.view.parent(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };
        Some(current)
    }
}

/// First node in pre-order below `root` whose kind matches `pred`. With
/// `strict`, `root` itself is skipped.
pub fn find_descendant<T: TreeView>(
    view: &T,
    root: T::Node,
    strict: bool,
    mut pred: impl FnMut(T::Kind) -> bool,
) -> Option<T::Node> {
    preorder(view, root)
        .skip(usize::from(strict))
        .find(|&candidate| pred(view.kind(candidate)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parse_java_statement_fragment;

    #[test]
    fn preorder_visits_in_document_order_and_stays_in_subtree() {
        let tree = parse_java_statement_fragment("a(b, c); d;").tree;
        let first_statement = tree.first_child(tree.root()).unwrap();
        let idents: Vec<_> = preorder(&tree, first_statement)
            .filter(|&node| tree.kind(node) == SyntaxKind::Identifier)
            .map(|node| tree.token_text(node).unwrap().to_string())
            .collect();
        assert_eq!(idents, vec!["a", "b", "c"]);
    }

    #[test]
    fn find_ancestor_respects_strictness() {
        let tree = parse_java_statement_fragment("f(x);").tree;
        let x = preorder(&tree, tree.root())
            .find(|&node| tree.token_text(node) == Some("x"))
            .unwrap();
        let name = tree.parent(x).unwrap();
        assert_eq!(tree.kind(name), SyntaxKind::NameExpression);

        assert_eq!(
            find_ancestor(&tree, name, false, |kind| kind == SyntaxKind::NameExpression),
            Some(name)
        );
        let strict = find_ancestor(&tree, name, true, SyntaxKind::is_context).unwrap();
        assert_eq!(tree.kind(strict), SyntaxKind::ArgumentList);
    }

    #[test]
    fn find_descendant_returns_first_match() {
        let tree = parse_java_statement_fragment("x = new A(new B());").tree;
        let found = find_descendant(&tree, tree.root(), true, |kind| {
            kind == SyntaxKind::NewExpression
        })
        .unwrap();
        assert_eq!(tree.text(found), "new A(new B())");
    }
}
