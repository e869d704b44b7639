use chainfill_syntax::{parse_java, SyntaxTree};

use crate::CompleteError;

/// An editable source document: a syntax tree, a writable flag and an undo
/// stack.
///
/// All mutation goes through [`Document::edit`], which is atomic: if the edit
/// fails the tree is restored to its state before the edit.
#[derive(Debug, Clone)]
pub struct Document {
    tree: SyntaxTree,
    writable: bool,
    undo: Vec<UndoGroup>,
}

#[derive(Debug, Clone)]
struct UndoGroup {
    label: String,
    before: SyntaxTree,
}

impl Document {
    pub fn new(tree: SyntaxTree) -> Self {
        Self {
            tree,
            writable: true,
            undo: Vec::new(),
        }
    }

    /// Parse `text` as a Java compilation unit.
    pub fn parse(text: &str) -> Self {
        Self::new(parse_java(text).tree)
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn text(&self) -> String {
        self.tree.render()
    }

    /// Run `f` as one undoable edit.
    ///
    /// Refused with [`CompleteError::ReadOnly`] before `f` runs when the
    /// document is not writable.
    pub fn edit<T>(
        &mut self,
        label: impl Into<String>,
        f: impl FnOnce(&mut SyntaxTree) -> Result<T, CompleteError>,
    ) -> Result<T, CompleteError> {
        if !self.writable {
            return Err(CompleteError::ReadOnly);
        }
        let label = label.into();
        let before = self.tree.clone();
        match f(&mut self.tree) {
            Ok(value) => {
                self.undo.push(UndoGroup { label, before });
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(
                    target: "chainfill.refactor",
                    label = %label,
                    error = %err,
                    "edit failed; rolling back"
                );
                self.tree = before;
                Err(err)
            }
        }
    }

    /// Revert the most recent edit, returning its label.
    pub fn undo(&mut self) -> Option<String> {
        let group = self.undo.pop()?;
        self.tree = group.before;
        Some(group.label)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}
