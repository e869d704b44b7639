//! Locating and classifying the builder construction around an anchor.

use std::sync::Arc;

use chainfill_syntax::{find_ancestor, find_descendant, NodeId, SyntaxKind, SyntaxTree};
use chainfill_types::{TypeDecl, TypeReference, TypeResolver};

const BUILDER_SUFFIX: &str = "BUILDER";

/// View over a `new <Type>(...)` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpr {
    node: NodeId,
    type_reference: TypeReference,
}

impl NewExpr {
    pub fn cast(tree: &SyntaxTree, node: NodeId) -> Option<Self> {
        if !tree.contains(node) || tree.kind(node) != SyntaxKind::NewExpression {
            return None;
        }
        let named_type = tree
            .children(node)
            .iter()
            .copied()
            .find(|&child| tree.kind(child) == SyntaxKind::NamedType)?;
        Some(Self {
            node,
            type_reference: TypeReference::new(tree.text(named_type)),
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The referenced type as written, e.g. `Pizza.Builder<T>`.
    pub fn type_reference(&self) -> &TypeReference {
        &self.type_reference
    }
}

/// The first construction expression inside the nearest context node
/// strictly above `anchor`.
///
/// Only that context is searched, never the rest of the file.
pub fn find_enclosing_construction(tree: &SyntaxTree, anchor: NodeId) -> Option<NewExpr> {
    if !tree.contains(anchor) {
        return None;
    }
    let context = find_ancestor(tree, anchor, true, SyntaxKind::is_context)?;
    let node = find_descendant(tree, context, true, |kind| {
        kind == SyntaxKind::NewExpression
    })?;
    NewExpr::cast(tree, node)
}

/// Resolve the constructed type. Unresolved references and references to
/// anything but a type declaration give `None`.
pub fn resolve_builder_type<R>(expr: &NewExpr, resolver: &R) -> Option<Arc<TypeDecl>>
where
    R: TypeResolver + ?Sized,
{
    resolver
        .resolve(expr.type_reference())?
        .as_type()
        .cloned()
}

/// Whether `decl` is treated as a builder: its qualified name, upper-cased,
/// ends with `BUILDER`. Types without a qualified name never are.
pub fn is_builder_candidate(decl: &TypeDecl) -> bool {
    decl.qualified_name
        .as_deref()
        .is_some_and(|name| name.to_uppercase().ends_with(BUILDER_SUFFIX))
}

/// The construction expression and builder type the action would operate
/// on, if any.
pub fn find_builder<R>(
    tree: &SyntaxTree,
    anchor: NodeId,
    resolver: &R,
) -> Option<(NewExpr, Arc<TypeDecl>)>
where
    R: TypeResolver + ?Sized,
{
    let Some(expr) = find_enclosing_construction(tree, anchor) else {
        tracing::debug!(target: "chainfill.refactor", ?anchor, "no construction expression in context");
        return None;
    };
    let Some(decl) = resolve_builder_type(&expr, resolver) else {
        tracing::debug!(
            target: "chainfill.refactor",
            reference = %expr.type_reference().text(),
            "construction type did not resolve to a type declaration"
        );
        return None;
    };
    if !is_builder_candidate(&decl) {
        tracing::debug!(
            target: "chainfill.refactor",
            name = ?decl.qualified_name,
            "type is not named like a builder"
        );
        return None;
    }
    Some((expr, decl))
}

/// Side-effect free availability check.
pub fn available_at<R>(tree: &SyntaxTree, anchor: NodeId, resolver: &R, writable: bool) -> bool
where
    R: TypeResolver + ?Sized,
{
    if !writable {
        tracing::debug!(target: "chainfill.refactor", "document is read-only");
        return false;
    }
    find_builder(tree, anchor, resolver).is_some()
}
