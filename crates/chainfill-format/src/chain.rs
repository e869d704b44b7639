use chainfill_syntax::{ancestors, NodeId, SyntaxKind, SyntaxTree};

use crate::{ChainWrap, FormatConfig, FormatError, Formatter};

/// Formatter for rewritten call chains.
///
/// Spacing rules, applied outside of nested block bodies:
/// - no whitespace around `.`, before `)`, `,` and `;`, or before the `(`
///   of an argument list;
/// - exactly one space after `,`, unless a line break follows it;
/// - whitespace that spans lines is kept, except around the `.` of a chain
///   call, and a line break after a `//` comment is always kept.
///
/// Afterwards the chain is wrapped one call per line according to
/// [`ChainWrap`]. Running the formatter twice gives the same text as running
/// it once.
#[derive(Debug, Clone, Default)]
pub struct ChainFormatter {
    config: FormatConfig,
}

enum Edit {
    Remove(NodeId),
    SingleSpace(NodeId),
    SpaceAfter(NodeId),
}

impl ChainFormatter {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    fn normalize_spacing(
        &self,
        tree: &mut SyntaxTree,
        node: NodeId,
        links: &[NodeId],
    ) -> Result<(), FormatError> {
        let leaves = leaves_outside_blocks(tree, node);
        let mut edits = Vec::new();
        for (index, &leaf) in leaves.iter().enumerate() {
            let prev = index.checked_sub(1).map(|prev| tree.kind(leaves[prev]));
            let next = leaves.get(index + 1).map(|&next| tree.kind(next));

            match tree.kind(leaf) {
                SyntaxKind::Comma => {
                    if !matches!(next, None | Some(SyntaxKind::Whitespace | SyntaxKind::RParen)) {
                        edits.push(Edit::SpaceAfter(leaf));
                    }
                }
                SyntaxKind::Whitespace => {
                    if prev == Some(SyntaxKind::LineComment) {
                        continue;
                    }
                    let text = tree.token_text(leaf).unwrap_or_default();
                    if prev == Some(SyntaxKind::Comma) {
                        if !text.contains('\n') && text != " " {
                            edits.push(Edit::SingleSpace(leaf));
                        }
                        continue;
                    }
                    let at_chain_dot = is_next_to_chain_dot(tree, leaf, links);
                    if text.contains('\n') && !at_chain_dot {
                        continue;
                    }
                    let before_call_parens = leaves
                        .get(index + 1)
                        .is_some_and(|&next| opens_argument_list(tree, next));
                    let strip = at_chain_dot
                        || before_call_parens
                        || prev == Some(SyntaxKind::Dot)
                        || matches!(
                            next,
                            Some(
                                SyntaxKind::Dot
                                    | SyntaxKind::RParen
                                    | SyntaxKind::Comma
                                    | SyntaxKind::Semicolon
                            )
                        );
                    if strip {
                        edits.push(Edit::Remove(leaf));
                    }
                }
                _ => {}
            }
        }

        for edit in edits {
            match edit {
                Edit::Remove(ws) => tree.detach(ws)?,
                Edit::SingleSpace(ws) => {
                    let space = tree.alloc_token(SyntaxKind::Whitespace, " ");
                    tree.replace(ws, space)?;
                }
                Edit::SpaceAfter(comma) => {
                    let (Some(parent), Some(index)) = (tree.parent(comma), tree.index_in_parent(comma))
                    else {
                        continue;
                    };
                    let space = tree.alloc_token(SyntaxKind::Whitespace, " ");
                    tree.insert_child(parent, index + 1, space)?;
                }
            }
        }
        Ok(())
    }

    fn should_wrap(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        match self.config.chain_wrap {
            ChainWrap::Never => false,
            ChainWrap::Always => true,
            ChainWrap::IfLong => {
                let (text, line_start, _, line_end) = line_context(tree, node);
                text[line_start..line_end]
                    .lines()
                    .any(|line| line.chars().count() > self.config.max_line_length)
            }
        }
    }

    fn wrap(
        &self,
        tree: &mut SyntaxTree,
        node: NodeId,
        links: &[NodeId],
    ) -> Result<(), FormatError> {
        let (text, line_start, start, _) = line_context(tree, node);
        let line_indent: String = text[line_start..start]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        let break_text = format!("\n{line_indent}{}", self.config.continuation_unit());

        // Innermost call first so the chain reads top to bottom.
        for &link in links.iter().rev() {
            let Some(dot) = dot_of(tree, link) else {
                continue;
            };
            let already_broken = tree.prev_sibling(dot).is_some_and(|prev| {
                tree.kind(prev) == SyntaxKind::Whitespace
                    && tree.token_text(prev).is_some_and(|text| text.contains('\n'))
            });
            if already_broken {
                continue;
            }
            let Some(index) = tree.index_in_parent(dot) else {
                continue;
            };
            let line_break = tree.alloc_token(SyntaxKind::Whitespace, break_text.as_str());
            tree.insert_child(link, index, line_break)?;
        }
        Ok(())
    }
}

impl Formatter for ChainFormatter {
    fn reformat(&self, tree: &mut SyntaxTree, node: NodeId) -> Result<(), FormatError> {
        if !tree.contains(node) {
            return Err(FormatError::UnknownNode(node));
        }
        let links = chain_links(tree, node);
        self.normalize_spacing(tree, node, &links)?;
        let wrapped = !links.is_empty() && self.should_wrap(tree, node);
        if wrapped {
            self.wrap(tree, node, &links)?;
        }
        tracing::trace!(
            target: "chainfill.format",
            node = ?node,
            calls = links.len(),
            wrapped,
            "reformatted chain"
        );
        Ok(())
    }
}

/// Qualified method calls making up the chain rooted at `node`, outermost
/// first.
fn chain_links(tree: &SyntaxTree, node: NodeId) -> Vec<NodeId> {
    let mut links = Vec::new();
    let mut current = node;
    while tree.kind(current) == SyntaxKind::MethodCallExpression {
        let Some(receiver) = tree
            .children(current)
            .iter()
            .copied()
            .find(|&child| !tree.kind(child).is_trivia())
        else {
            break;
        };
        if !tree.kind(receiver).is_expression() || dot_of(tree, current).is_none() {
            break;
        }
        links.push(current);
        current = receiver;
    }
    links
}

fn dot_of(tree: &SyntaxTree, link: NodeId) -> Option<NodeId> {
    tree.children(link)
        .iter()
        .copied()
        .find(|&child| tree.kind(child) == SyntaxKind::Dot)
}

/// `(` of an argument list, as opposed to a parenthesised expression or a
/// cast.
fn opens_argument_list(tree: &SyntaxTree, leaf: NodeId) -> bool {
    tree.kind(leaf) == SyntaxKind::LParen
        && tree
            .parent(leaf)
            .is_some_and(|parent| tree.kind(parent) == SyntaxKind::ArgumentList)
}

fn is_next_to_chain_dot(tree: &SyntaxTree, ws: NodeId, links: &[NodeId]) -> bool {
    let Some(parent) = tree.parent(ws) else {
        return false;
    };
    if !links.contains(&parent) {
        return false;
    }
    let is_dot = |node: Option<NodeId>| node.is_some_and(|node| tree.kind(node) == SyntaxKind::Dot);
    is_dot(tree.prev_sibling(ws)) || is_dot(tree.next_sibling(ws))
}

/// Leaves under `node` in source order, not descending into block bodies
/// (anonymous classes, lambda bodies) below it.
fn leaves_outside_blocks(tree: &SyntaxTree, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![node];
    while let Some(id) = stack.pop() {
        if id != node && tree.kind(id) == SyntaxKind::Block {
            // Still a neighbour for the spacing rules; its contents are not.
            out.push(id);
            continue;
        }
        let children = tree.children(id);
        if children.is_empty() {
            out.push(id);
        } else {
            stack.extend(children.iter().rev().copied());
        }
    }
    out
}

/// Text of the tree holding `node`, plus the start of the first line the
/// node is on, the node's own start, and the end of its last line.
fn line_context(tree: &SyntaxTree, node: NodeId) -> (String, usize, usize, usize) {
    let top = ancestors(tree, node).last().unwrap_or(node);
    let text = tree.text(top);
    let range = tree.text_range(node);
    let start = usize::from(range.start());
    let end = usize::from(range.end());
    let line_start = text[..start].rfind('\n').map_or(0, |idx| idx + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |idx| end + idx);
    (text, line_start, start, line_end)
}
