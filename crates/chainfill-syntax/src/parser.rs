use text_size::{TextRange, TextSize};

use crate::lexer::{lex, Token};
use crate::{SyntaxKind, SyntaxTree, TreeBuilder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

#[derive(Debug, Clone)]
pub struct JavaParseResult {
    pub tree: SyntaxTree,
    pub errors: Vec<ParseError>,
}

/// Parse a Java compilation unit into a lossless [`SyntaxTree`].
///
/// This is a sketch parser: it recognises blocks, statements, argument lists
/// and the postfix expression forms a call chain is made of (`new`, method
/// calls, field access, names, literals, parenthesised expressions). Anything
/// else is kept as raw tokens inside the enclosing node. Parsing never fails;
/// missing `;`, `)` and `}` are recorded as zero-width `Error` nodes.
pub fn parse_java(text: &str) -> JavaParseResult {
    Parser::new(text, SyntaxKind::CompilationUnit).parse()
}

/// Parse a sequence of statements (e.g. a method body without braces). The
/// root is a brace-less [`SyntaxKind::Block`].
pub fn parse_java_statement_fragment(text: &str) -> JavaParseResult {
    Parser::new(text, SyntaxKind::Block).parse()
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    builder: TreeBuilder,
    errors: Vec<ParseError>,
    /// End of the last non-trivia token emitted.
    last_end: TextSize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, root: SyntaxKind) -> Self {
        Self {
            input,
            tokens: lex(input),
            pos: 0,
            builder: TreeBuilder::new(root),
            errors: Vec::new(),
            last_end: TextSize::from(0),
        }
    }

    fn parse(mut self) -> JavaParseResult {
        self.items(false);
        self.eat_trivia();
        tracing::trace!(
            target: "chainfill.syntax",
            tokens = self.tokens.len(),
            errors = self.errors.len(),
            "parsed java source"
        );
        JavaParseResult {
            tree: self.builder.finish(),
            errors: self.errors,
        }
    }

    // --- Token cursor -----------------------------------------------------

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens[self.pos..]
            .iter()
            .filter(|token| !token.kind.is_trivia())
            .nth(n)
            .map(|token| token.kind)
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == Some(kind)
    }

    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind, token.text(self.input));
            self.pos += 1;
        }
    }

    /// Emit pending trivia, then the next significant token.
    fn bump(&mut self) {
        self.eat_trivia();
        if let Some(token) = self.tokens.get(self.pos).copied() {
            self.builder.token(token.kind, token.text(self.input));
            self.last_end = token.range.end();
            self.pos += 1;
        }
    }

    /// Open a node. Pending trivia stays in the enclosing node.
    fn start(&mut self, kind: SyntaxKind) {
        self.eat_trivia();
        self.builder.start_node(kind);
    }

    /// Text of the last significant token emitted.
    fn last_significant(&self) -> Option<&'a str> {
        self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|token| !token.kind.is_trivia())
            .map(|token| token.text(self.input))
    }

    fn missing(&mut self, what: &str) {
        self.builder.marker(SyntaxKind::Error);
        self.errors.push(ParseError {
            message: format!("expected {what}"),
            range: TextRange::empty(self.last_end),
        });
    }

    fn expect(&mut self, kind: SyntaxKind, what: &str) {
        if self.at(kind) {
            self.bump();
        } else {
            self.missing(what);
        }
    }

    // --- Statements -------------------------------------------------------

    fn items(&mut self, in_block: bool) {
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::RBrace if in_block => break,
                SyntaxKind::RBrace => {
                    self.start(SyntaxKind::Error);
                    self.bump();
                    self.builder.finish_node();
                    self.errors.push(ParseError {
                        message: "unmatched `}`".to_string(),
                        range: TextRange::at(self.last_end - TextSize::from(1), TextSize::from(1)),
                    });
                }
                SyntaxKind::LBrace => self.block(),
                SyntaxKind::Semicolon => {
                    self.start(SyntaxKind::Statement);
                    self.bump();
                    self.builder.finish_node();
                }
                _ => self.statement(),
            }
        }
    }

    fn block(&mut self) {
        self.start(SyntaxKind::Block);
        self.bump();
        self.items(true);
        self.expect(SyntaxKind::RBrace, "`}`");
        self.builder.finish_node();
    }

    fn statement(&mut self) {
        self.start(SyntaxKind::Statement);
        self.sequence(&[SyntaxKind::Semicolon, SyntaxKind::LBrace, SyntaxKind::RBrace]);
        match self.current() {
            Some(SyntaxKind::Semicolon) => self.bump(),
            Some(SyntaxKind::LBrace) if self.last_significant() == Some("=") => {
                self.initializer();
                self.expect(SyntaxKind::Semicolon, "`;`");
            }
            Some(SyntaxKind::LBrace) => {
                // Declaration or control-flow header followed by its body.
                self.block();
                if self.at(SyntaxKind::Semicolon) {
                    self.bump();
                }
            }
            _ => self.missing("`;`"),
        }
        self.builder.finish_node();
    }

    /// Parse expressions and raw tokens until one of `stops` (or EOF).
    fn sequence(&mut self, stops: &[SyntaxKind]) {
        while let Some(kind) = self.current() {
            if stops.contains(&kind) {
                break;
            }
            match kind {
                SyntaxKind::LBrace => self.block(),
                kind if is_expression_start(kind) => self.expression(),
                _ => self.bump(),
            }
        }
    }

    /// Array initializer `{a, {b, c}}`: expressions separated by commas,
    /// not statements.
    fn initializer(&mut self) {
        self.start(SyntaxKind::Block);
        self.bump();
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::RBrace | SyntaxKind::Semicolon => break,
                SyntaxKind::LBrace => self.initializer(),
                kind if is_expression_start(kind) => self.expression(),
                _ => self.bump(),
            }
        }
        self.expect(SyntaxKind::RBrace, "`}`");
        self.builder.finish_node();
    }

    // --- Expressions ------------------------------------------------------

    fn expression(&mut self) {
        // Trivia before the expression belongs to the enclosing node, not to
        // the postfix nodes wrapped around it below.
        self.eat_trivia();
        let checkpoint = self.builder.checkpoint();
        self.primary();

        while self.at(SyntaxKind::Dot) {
            match self.nth(1) {
                Some(SyntaxKind::Identifier) => {
                    let is_call = self.nth(2) == Some(SyntaxKind::LParen);
                    let kind = if is_call {
                        SyntaxKind::MethodCallExpression
                    } else {
                        SyntaxKind::FieldAccessExpression
                    };
                    self.builder.start_node_at(checkpoint, kind);
                    self.bump();
                    self.name_ref();
                    if is_call {
                        self.argument_list();
                    }
                    self.builder.finish_node();
                }
                Some(SyntaxKind::ClassKw | SyntaxKind::ThisKw) => {
                    self.builder
                        .start_node_at(checkpoint, SyntaxKind::FieldAccessExpression);
                    self.bump();
                    self.bump();
                    self.builder.finish_node();
                }
                _ => break,
            }
        }
    }

    fn primary(&mut self) {
        match self.current() {
            Some(SyntaxKind::NewKw) => self.new_expression(),
            Some(SyntaxKind::Identifier) if self.nth(1) == Some(SyntaxKind::LParen) => {
                self.start(SyntaxKind::MethodCallExpression);
                self.name_ref();
                self.argument_list();
                self.builder.finish_node();
            }
            Some(SyntaxKind::Identifier) => self.wrap_token(SyntaxKind::NameExpression),
            Some(SyntaxKind::ThisKw) => self.wrap_token(SyntaxKind::ThisExpression),
            Some(SyntaxKind::SuperKw) => self.wrap_token(SyntaxKind::SuperExpression),
            Some(SyntaxKind::LParen) => {
                self.start(SyntaxKind::ParenthesizedExpression);
                self.bump();
                self.sequence(&[SyntaxKind::RParen, SyntaxKind::Semicolon, SyntaxKind::RBrace]);
                self.expect(SyntaxKind::RParen, "`)`");
                self.builder.finish_node();
            }
            Some(kind) if kind.is_literal() => self.wrap_token(SyntaxKind::LiteralExpression),
            _ => self.bump(),
        }
    }

    fn wrap_token(&mut self, kind: SyntaxKind) {
        self.start(kind);
        self.bump();
        self.builder.finish_node();
    }

    fn name_ref(&mut self) {
        self.wrap_token(SyntaxKind::NameRef);
    }

    fn new_expression(&mut self) {
        self.start(SyntaxKind::NewExpression);
        self.bump();

        if matches!(self.current(), Some(kind) if kind == SyntaxKind::Identifier || kind.is_primitive_type())
        {
            self.named_type();
        } else {
            self.missing("a type");
        }

        match self.current() {
            Some(SyntaxKind::LParen) => {
                self.argument_list();
                if self.at(SyntaxKind::LBrace) {
                    // Anonymous class body.
                    self.block();
                }
            }
            Some(SyntaxKind::LBracket) => {
                while self.at(SyntaxKind::LBracket) {
                    self.bump();
                    self.sequence(&[
                        SyntaxKind::RBracket,
                        SyntaxKind::Semicolon,
                        SyntaxKind::RBrace,
                    ]);
                    self.expect(SyntaxKind::RBracket, "`]`");
                }
                if self.at(SyntaxKind::LBrace) {
                    self.initializer();
                }
            }
            _ => self.missing("`(`"),
        }

        self.builder.finish_node();
    }

    fn named_type(&mut self) {
        self.start(SyntaxKind::NamedType);
        self.bump();
        while self.at(SyntaxKind::Dot) && self.nth(1) == Some(SyntaxKind::Identifier) {
            self.bump();
            self.bump();
        }
        if self.at(SyntaxKind::Less) {
            self.type_arguments();
        }
        self.builder.finish_node();
    }

    fn type_arguments(&mut self) {
        self.start(SyntaxKind::TypeArguments);
        let mut depth = 0usize;
        while let Some(kind) = self.current() {
            match kind {
                SyntaxKind::Less => depth += 1,
                SyntaxKind::Greater => depth = depth.saturating_sub(1),
                SyntaxKind::Identifier
                | SyntaxKind::Comma
                | SyntaxKind::Dot
                | SyntaxKind::Question
                | SyntaxKind::ExtendsKw
                | SyntaxKind::SuperKw
                | SyntaxKind::LBracket
                | SyntaxKind::RBracket => {}
                kind if kind.is_primitive_type() => {}
                _ => break,
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
        if depth > 0 {
            self.missing("`>`");
        }
        self.builder.finish_node();
    }

    fn argument_list(&mut self) {
        self.start(SyntaxKind::ArgumentList);
        self.bump();
        loop {
            match self.current() {
                Some(SyntaxKind::RParen) => {
                    self.bump();
                    break;
                }
                Some(SyntaxKind::Comma) => self.bump(),
                None | Some(SyntaxKind::Semicolon) | Some(SyntaxKind::RBrace) => {
                    self.missing("`)`");
                    break;
                }
                Some(_) => self.sequence(&[
                    SyntaxKind::Comma,
                    SyntaxKind::RParen,
                    SyntaxKind::Semicolon,
                    SyntaxKind::RBrace,
                ]),
            }
        }
        self.builder.finish_node();
    }
}

fn is_expression_start(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::NewKw
            | SyntaxKind::ThisKw
            | SyntaxKind::SuperKw
            | SyntaxKind::LParen
    ) || kind.is_literal()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parsing_is_lossless() {
        let text = r#"package a;

class A {
    void m() {
        Foo f = new FooBuilder()
            .withA() // trailing
            .build();
        consume(new FooBuilder(), 1 + 2);
        int[] xs = new int[] {1, 2};
        Runnable r = () -> { go(); };
    }
}
"#;
        let parse = parse_java(text);
        assert_eq!(parse.tree.render(), text);
        assert_eq!(parse.errors, vec![]);
    }

    #[test]
    fn builder_chain_shape() {
        let parse = parse_java_statement_fragment("new FooBuilder().withA();");
        assert_eq!(
            parse.tree.debug_dump(parse.tree.root()),
            r#"Block
  Statement
    MethodCallExpression
      NewExpression
        NewKw "new"
        Whitespace " "
        NamedType
          Identifier "FooBuilder"
        ArgumentList
          LParen "("
          RParen ")"
      Dot "."
      NameRef
        Identifier "withA"
      ArgumentList
        LParen "("
        RParen ")"
    Semicolon ";"
"#
        );
    }

    #[test]
    fn missing_semicolon_leaves_zero_width_error_after_expression() {
        let parse = parse_java_statement_fragment("new FooBuilder()\n");
        let tree = &parse.tree;
        let statement = tree.first_child(tree.root()).unwrap();
        let kinds: Vec<_> = tree
            .children(statement)
            .iter()
            .map(|&child| tree.kind(child))
            .collect();
        assert_eq!(kinds, vec![SyntaxKind::NewExpression, SyntaxKind::Error]);
        assert_eq!(
            parse.errors,
            vec![ParseError {
                message: "expected `;`".to_string(),
                range: TextRange::empty(TextSize::from(16)),
            }]
        );

        let anchor = tree.anchor_at(TextSize::from(16)).unwrap();
        assert_eq!(tree.kind(anchor), SyntaxKind::Error);
    }

    #[test]
    fn argument_list_holds_nested_construction() {
        let parse = parse_java_statement_fragment("consume(new FooBuilder());");
        let tree = &parse.tree;
        let offset = "consume(new FooBuilder()".len() as u32;
        let anchor = tree.anchor_at(TextSize::from(offset)).unwrap();
        assert_eq!(tree.kind(anchor), SyntaxKind::RParen);
        let parent = tree.parent(anchor).unwrap();
        assert_eq!(tree.kind(parent), SyntaxKind::ArgumentList);
        let prev = tree.prev_non_trivia_sibling(anchor).unwrap();
        assert_eq!(tree.kind(prev), SyntaxKind::NewExpression);
    }

    #[test]
    fn qualified_and_generic_types() {
        let parse = parse_java_statement_fragment("new com.acme.Outer.Builder<String, List<Integer>>();");
        let tree = &parse.tree;
        let named = crate::find_descendant(tree, tree.root(), true, |kind| {
            kind == SyntaxKind::NamedType
        })
        .unwrap();
        assert_eq!(tree.text(named), "com.acme.Outer.Builder<String, List<Integer>>");
        assert!(parse.errors.is_empty());
    }
}
