//! Builder chain completion.
//!
//! Given an anchor just after `new FooBuilder()` (or after a call already
//! chained onto it), [`CompleteBuilderMethods`] appends a zero-argument call
//! for every public method `FooBuilder` declares:
//!
//! ```text
//! new FooBuilder()   =>   new FooBuilder().withA().withB().build();
//! ```
//!
//! The pieces are usable on their own: [`resolver`] decides whether the
//! action applies, [`completer`] builds and splices the chain, and
//! [`Document`] provides the atomic, undoable edit they run in.

pub mod completer;
mod document;
mod error;
mod intention;
pub mod resolver;

pub use completer::{
    collect_methods, ensure_terminated, filter_applicable, normalize, splice_chain,
    synthesize_chain, ChainFragment,
};
pub use document::Document;
pub use error::CompleteError;
pub use intention::{CompleteBuilderMethods, InvokeOutcome};
pub use resolver::{
    available_at, find_builder, find_enclosing_construction, is_builder_candidate,
    resolve_builder_type, NewExpr,
};
