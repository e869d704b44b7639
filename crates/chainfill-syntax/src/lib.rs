//! Syntax tree and parsing primitives.
//!
//! This crate provides:
//! - [`SyntaxTree`]: an arena-backed, lossless, mutable syntax tree. Nodes keep
//!   their identity while detached, which lets editing code move an existing
//!   expression into a freshly built fragment.
//! - [`traverse`]: ancestor / pre-order search helpers generic over
//!   [`TreeView`], so they work with any tree backend.
//! - [`parse_java`] / [`parse_java_statement_fragment`]: a small error-tolerant
//!   Java parser producing a [`SyntaxTree`].
//! - [`lex`]: the token stream shared by the parser and the declaration scanner
//!   in `chainfill-types`.

mod lexer;
mod parser;
mod syntax_kind;
pub mod traverse;
mod tree;

pub use lexer::{lex, Lexer, Token};
pub use parser::{parse_java, parse_java_statement_fragment, JavaParseResult, ParseError};
pub use syntax_kind::SyntaxKind;
pub use text_size::{TextRange, TextSize};
pub use traverse::{ancestors, find_ancestor, find_descendant, preorder, TreeView};
pub use tree::{Checkpoint, NodeId, SyntaxTree, TreeBuilder, TreeError};
