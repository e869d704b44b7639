//! Building and splicing the completed call chain.
//!
//! Mutation is split in two phases. [`synthesize_chain`] only allocates
//! detached `<placeholder>.<name>()` fragments, so the document is untouched
//! if it is dropped halfway. [`splice_chain`] validates everything it needs
//! first and only then moves nodes around.

use chainfill_format::Formatter;
use chainfill_syntax::{NodeId, SyntaxKind, SyntaxTree};
use chainfill_types::{MethodDescriptor, TypeDecl};

use crate::CompleteError;

/// A detached `<receiver>.<name>()` call whose receiver is still a
/// `Placeholder` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainFragment {
    root: NodeId,
    receiver: NodeId,
}

impl ChainFragment {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn receiver(&self) -> NodeId {
        self.receiver
    }
}

/// All methods declared on `decl`, those returning the builder's own type
/// first. Declaration order is kept within each group.
pub fn collect_methods(decl: &TypeDecl) -> Vec<MethodDescriptor> {
    let mut methods = decl.methods.clone();
    methods.sort_by_key(|method| !returns_own_type(decl, method));
    methods
}

fn returns_own_type(decl: &TypeDecl, method: &MethodDescriptor) -> bool {
    method
        .return_type
        .as_deref()
        .is_some_and(|ty| decl.is_own_type(ty))
}

/// Public, non-constructor methods. Static methods are kept.
pub fn filter_applicable(methods: Vec<MethodDescriptor>) -> Vec<MethodDescriptor> {
    methods
        .into_iter()
        .filter(|method| method.is_public() && !method.is_constructor)
        .collect()
}

/// One detached zero-argument call fragment per method, in order.
pub fn synthesize_chain(
    tree: &mut SyntaxTree,
    methods: &[MethodDescriptor],
) -> Result<Vec<ChainFragment>, CompleteError> {
    methods
        .iter()
        .map(|method| synthesize_call(tree, &method.name))
        .collect()
}

fn synthesize_call(tree: &mut SyntaxTree, name: &str) -> Result<ChainFragment, CompleteError> {
    let root = tree.alloc_node(SyntaxKind::MethodCallExpression);
    let receiver = tree.alloc_node(SyntaxKind::Placeholder);
    tree.append_child(root, receiver)?;

    let dot = tree.alloc_token(SyntaxKind::Dot, ".");
    tree.append_child(root, dot)?;

    let name_ref = tree.alloc_node(SyntaxKind::NameRef);
    let ident = tree.alloc_token(SyntaxKind::Identifier, name);
    tree.append_child(name_ref, ident)?;
    tree.append_child(root, name_ref)?;

    let args = tree.alloc_node(SyntaxKind::ArgumentList);
    for (kind, text) in [(SyntaxKind::LParen, "("), (SyntaxKind::RParen, ")")] {
        let token = tree.alloc_token(kind, text);
        tree.append_child(args, token)?;
    }
    tree.append_child(root, args)?;

    Ok(ChainFragment { root, receiver })
}

/// Chain every fragment onto the expression preceding `anchor` (trivia
/// skipped) and return the resulting outermost call, or that expression
/// itself when `fragments` is empty.
///
/// Fails without touching the tree when the anchor is detached, has no
/// preceding expression, or a fragment is not a fresh detached one.
pub fn splice_chain(
    tree: &mut SyntaxTree,
    anchor: NodeId,
    fragments: &[ChainFragment],
) -> Result<NodeId, CompleteError> {
    if !tree.is_attached(anchor) || anchor == tree.root() {
        return Err(CompleteError::StaleAnchor(anchor));
    }
    let receiver = tree
        .prev_non_trivia_sibling(anchor)
        .filter(|&node| tree.kind(node).is_expression())
        .ok_or(CompleteError::MissingReceiver(anchor))?;
    for fragment in fragments {
        let well_formed = tree.contains(fragment.root)
            && tree.contains(fragment.receiver)
            && tree.parent(fragment.root).is_none()
            && fragment.root != tree.root()
            && tree.parent(fragment.receiver) == Some(fragment.root)
            && tree.kind(fragment.receiver) == SyntaxKind::Placeholder;
        if !well_formed {
            return Err(CompleteError::MalformedFragment(fragment.root));
        }
    }

    let mut current = receiver;
    for fragment in fragments {
        // The fragment takes the receiver's place, then the receiver fills
        // the fragment's slot. Every node stays reachable throughout.
        tree.replace(current, fragment.root)?;
        tree.replace(fragment.receiver, current)?;
        current = fragment.root;
    }
    tracing::debug!(
        target: "chainfill.refactor",
        calls = fragments.len(),
        "spliced call chain"
    );
    Ok(current)
}

/// Insert a `;` right after `chain` unless `anchor` sits in an argument list
/// or is itself a `;`. A zero-width `Error` anchor (the parser's "missing
/// `;`" marker) is removed once the terminator is in place.
///
/// Returns whether a terminator was inserted.
pub fn ensure_terminated(
    tree: &mut SyntaxTree,
    chain: NodeId,
    anchor: NodeId,
) -> Result<bool, CompleteError> {
    let in_argument_list = tree
        .parent(anchor)
        .is_some_and(|parent| tree.kind(parent) == SyntaxKind::ArgumentList);
    if in_argument_list || tree.kind(anchor) == SyntaxKind::Semicolon {
        return Ok(false);
    }

    let (Some(parent), Some(index)) = (tree.parent(chain), tree.index_in_parent(chain)) else {
        return Err(CompleteError::StaleAnchor(chain));
    };
    let semicolon = tree.alloc_token(SyntaxKind::Semicolon, ";");
    tree.insert_child(parent, index + 1, semicolon)?;

    let is_missing_marker = tree.kind(anchor) == SyntaxKind::Error
        && tree.children(anchor).is_empty()
        && !tree.is_token(anchor);
    if is_missing_marker && tree.parent(anchor).is_some() {
        tree.detach(anchor)?;
    }
    Ok(true)
}

/// Hand the rewritten expression to the formatter.
pub fn normalize<F>(tree: &mut SyntaxTree, node: NodeId, formatter: &F) -> Result<(), CompleteError>
where
    F: Formatter + ?Sized,
{
    formatter.reformat(tree, node)?;
    Ok(())
}
