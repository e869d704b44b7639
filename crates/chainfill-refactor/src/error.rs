use chainfill_format::FormatError;
use chainfill_syntax::{NodeId, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompleteError {
    #[error("the document is read-only")]
    ReadOnly,
    #[error("anchor {0:?} is no longer part of the document")]
    StaleAnchor(NodeId),
    #[error("no expression precedes anchor {0:?}")]
    MissingReceiver(NodeId),
    #[error("call fragment {0:?} is attached or has no receiver slot")]
    MalformedFragment(NodeId),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Format(#[from] FormatError),
}
