use chainfill_format::{ChainFormatter, Formatter};
use chainfill_syntax::NodeId;
use chainfill_types::TypeResolver;

use crate::completer::{
    collect_methods, ensure_terminated, filter_applicable, normalize, splice_chain,
    synthesize_chain,
};
use crate::resolver::{available_at, find_builder};
use crate::{CompleteError, Document};

/// What [`CompleteBuilderMethods::invoke`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeOutcome {
    Completed {
        /// The outermost call of the rewritten chain.
        chain: NodeId,
        /// Number of calls appended.
        calls: usize,
        /// Whether a `;` was inserted.
        terminated: bool,
    },
    /// No builder construction around the anchor. Nothing was changed.
    NotApplicable,
    /// The document is read-only. Nothing was changed.
    ReadOnly,
}

/// The "Complete builder methods" editor action.
///
/// Appends a zero-argument call for every public method of the builder
/// constructed around the anchor, self-returning methods first, then
/// terminates the statement when needed and reformats the chain.
#[derive(Debug, Clone)]
pub struct CompleteBuilderMethods<R, F = ChainFormatter> {
    resolver: R,
    formatter: F,
}

impl<R: TypeResolver> CompleteBuilderMethods<R> {
    pub fn new(resolver: R) -> Self {
        Self::with_formatter(resolver, ChainFormatter::default())
    }
}

impl<R: TypeResolver, F: Formatter> CompleteBuilderMethods<R, F> {
    pub const LABEL: &'static str = "Complete builder methods";
    pub const ID: &'static str = "chainfill.completeBuilderMethods";

    pub fn with_formatter(resolver: R, formatter: F) -> Self {
        Self {
            resolver,
            formatter,
        }
    }

    pub fn label(&self) -> &'static str {
        Self::LABEL
    }

    pub fn family_name(&self) -> &'static str {
        Self::LABEL
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn is_available(&self, document: &Document, anchor: NodeId) -> bool {
        available_at(document.tree(), anchor, &self.resolver, document.is_writable())
    }

    /// Complete the chain at `anchor` inside one undoable edit.
    ///
    /// A structural failure after resolution rolls the document back and is
    /// returned as an error.
    pub fn invoke(
        &self,
        document: &mut Document,
        anchor: NodeId,
    ) -> Result<InvokeOutcome, CompleteError> {
        if !document.is_writable() {
            return Ok(InvokeOutcome::ReadOnly);
        }
        let Some((_, decl)) = find_builder(document.tree(), anchor, &self.resolver) else {
            return Ok(InvokeOutcome::NotApplicable);
        };

        let methods = filter_applicable(collect_methods(&decl));
        tracing::debug!(
            target: "chainfill.refactor",
            builder = ?decl.qualified_name,
            declared = decl.methods.len(),
            applicable = methods.len(),
            "completing builder chain"
        );

        document.edit(Self::LABEL, |tree| {
            let fragments = synthesize_chain(tree, &methods)?;
            let chain = splice_chain(tree, anchor, &fragments)?;
            let terminated = ensure_terminated(tree, chain, anchor)?;
            normalize(tree, chain, &self.formatter)?;
            Ok(InvokeOutcome::Completed {
                chain,
                calls: fragments.len(),
                terminated,
            })
        })
    }
}
