//! Formatting of rewritten syntax.
//!
//! Editing actions hand the node they rewrote to a [`Formatter`]; the
//! formatter only ever touches whitespace tokens inside that node, so the
//! text outside the rewritten region is left byte-for-byte as it was.

use chainfill_syntax::{NodeId, SyntaxTree, TreeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod chain;

pub use chain::ChainFormatter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub indent_width: usize,
    pub indent_style: IndentStyle,
    pub max_line_length: usize,
    /// Extra indentation (in columns) of a wrapped chain call relative to the
    /// line that starts the chain.
    pub continuation_indent: usize,
    pub chain_wrap: ChainWrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentStyle {
    Spaces,
    Tabs,
}

/// When a method chain is split into one call per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainWrap {
    Never,
    /// Only when the line holding the chain exceeds `max_line_length`.
    IfLong,
    Always,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            indent_style: IndentStyle::Spaces,
            max_line_length: 100,
            continuation_indent: 8,
            chain_wrap: ChainWrap::IfLong,
        }
    }
}

impl FormatConfig {
    /// Indentation appended to a line's own indentation for continuation
    /// lines.
    pub fn continuation_unit(&self) -> String {
        match self.indent_style {
            IndentStyle::Spaces => " ".repeat(self.continuation_indent),
            IndentStyle::Tabs => {
                let width = self.indent_width.max(1);
                "\t".repeat((self.continuation_indent / width).max(1))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{0:?} does not belong to the tree being formatted")]
    UnknownNode(NodeId),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Normalizes the whitespace of a subtree in place.
pub trait Formatter {
    fn reformat(&self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), FormatError>;
}

impl<F: Formatter + ?Sized> Formatter for &F {
    fn reformat(&self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), FormatError> {
        (**self).reformat(tree, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_unit_follows_indent_style() {
        let spaces = FormatConfig::default();
        assert_eq!(spaces.continuation_unit(), " ".repeat(8));

        let tabs = FormatConfig {
            indent_style: IndentStyle::Tabs,
            ..FormatConfig::default()
        };
        assert_eq!(tabs.continuation_unit(), "\t\t");
    }
}
