//! Declaration scanner.
//!
//! A token-level, brace-depth aware pass that extracts type declarations and
//! method signatures from Java source. Method bodies, field initializers and
//! enum constants are skipped wholesale, so local and anonymous classes are
//! never reported.

use chainfill_syntax::{lex, SyntaxKind, Token};

use crate::{MethodDescriptor, TypeDecl, TypeKind, Visibility};

/// Extract every (possibly nested) type declared in `source`.
///
/// Nested types get `Outer.Inner` qualified names. Interface members without
/// an explicit modifier are public; everything else defaults to
/// package-private.
pub fn index_java_source(source: &str) -> Vec<TypeDecl> {
    let tokens = lex(source)
        .into_iter()
        .filter(|token| !token.kind.is_trivia())
        .collect();
    let mut scanner = Scanner {
        input: source,
        tokens,
        pos: 0,
        package: None,
        out: Vec::new(),
    };
    scanner.members(None);
    scanner.out
}

struct Owner {
    name: String,
    qualified_name: Option<String>,
    kind: TypeKind,
}

struct Scanner<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    package: Option<String>,
    out: Vec<TypeDecl>,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<SyntaxKind> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens.get(self.pos + n).map(|token| token.kind)
    }

    fn peek_text(&self) -> Option<&'a str> {
        self.tokens
            .get(self.pos)
            .map(|token| token.text(self.input))
    }

    fn bump(&mut self) -> Option<&'a str> {
        let text = self.peek_text();
        if text.is_some() {
            self.pos += 1;
        }
        text
    }

    fn at_assign(&self) -> bool {
        self.peek() == Some(SyntaxKind::Operator) && self.peek_text() == Some("=")
    }

    /// Source text of `tokens[start..end]` with whitespace runs collapsed.
    fn text_of(&self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        let from = self.tokens[start].range.start();
        let to = self.tokens[end - 1].range.end();
        self.input[usize::from(from)..usize::from(to)]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Members of a type body (or top-level items when `owner` is `None`).
    /// Consumes the closing `}` of the body.
    fn members(&mut self, owner: Option<&Owner>) -> Vec<MethodDescriptor> {
        let mut methods = Vec::new();
        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::RBrace => {
                    self.bump();
                    if owner.is_some() {
                        break;
                    }
                }
                SyntaxKind::Semicolon => {
                    self.bump();
                }
                SyntaxKind::LBrace => self.skip_balanced(),
                SyntaxKind::PackageKw if owner.is_none() => {
                    self.bump();
                    let start = self.pos;
                    self.skip_statement();
                    let end = self.pos.saturating_sub(1).max(start);
                    self.package = Some(self.text_of(start, end).replace(' ', ""));
                }
                SyntaxKind::ImportKw => self.skip_statement(),
                _ => {
                    if let Some(method) = self.member(owner) {
                        methods.push(method);
                    }
                }
            }
        }
        methods
    }

    fn member(&mut self, owner: Option<&Owner>) -> Option<MethodDescriptor> {
        let mut visibility = None;
        let mut is_static = false;
        loop {
            match self.peek() {
                Some(SyntaxKind::PublicKw) => visibility = Some(Visibility::Public),
                Some(SyntaxKind::ProtectedKw) => visibility = Some(Visibility::Protected),
                Some(SyntaxKind::PrivateKw) => visibility = Some(Visibility::Private),
                Some(SyntaxKind::StaticKw) => is_static = true,
                Some(kind) if kind.is_modifier_keyword() => {}
                Some(SyntaxKind::Identifier)
                    if matches!(self.peek_text(), Some("sealed" | "non"))
                        && self.peek_nth(1) != Some(SyntaxKind::LParen) =>
                {
                    // `sealed` / `non-sealed`
                    if self.peek_text() == Some("non") {
                        self.bump();
                        self.bump();
                    }
                }
                Some(SyntaxKind::At) if self.peek_nth(1) != Some(SyntaxKind::InterfaceKw) => {
                    self.skip_annotation();
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let type_kind = match self.peek() {
            Some(SyntaxKind::ClassKw) => Some(TypeKind::Class),
            Some(SyntaxKind::InterfaceKw) => Some(TypeKind::Interface),
            Some(SyntaxKind::At) => {
                // `@interface`
                self.bump();
                Some(TypeKind::Interface)
            }
            Some(SyntaxKind::EnumKw) => Some(TypeKind::Enum),
            Some(SyntaxKind::Identifier)
                if self.peek_text() == Some("record")
                    && self.peek_nth(1) == Some(SyntaxKind::Identifier) =>
            {
                Some(TypeKind::Record)
            }
            _ => None,
        };
        if let Some(kind) = type_kind {
            self.type_declaration(kind, owner);
            return None;
        }

        let Some(owner) = owner else {
            self.skip_statement();
            return None;
        };
        self.method(owner, visibility, is_static)
    }

    fn type_declaration(&mut self, kind: TypeKind, owner: Option<&Owner>) {
        self.bump();
        if self.peek() != Some(SyntaxKind::Identifier) {
            return;
        }
        let name = self.bump().unwrap_or_default().to_string();
        let type_parameters = if self.peek() == Some(SyntaxKind::Less) {
            self.type_parameters()
        } else {
            Vec::new()
        };

        // extends / implements / permits / record components
        while let Some(next) = self.peek() {
            match next {
                SyntaxKind::LBrace => break,
                SyntaxKind::LParen => self.skip_balanced(),
                SyntaxKind::Semicolon | SyntaxKind::RBrace => return,
                _ => {
                    self.bump();
                }
            }
        }
        if self.peek() != Some(SyntaxKind::LBrace) {
            return;
        }
        self.bump();

        let qualified_name = match owner {
            Some(owner) => owner
                .qualified_name
                .as_ref()
                .map(|outer| format!("{outer}.{name}")),
            None => Some(match &self.package {
                Some(package) if !package.is_empty() => format!("{package}.{name}"),
                _ => name.clone(),
            }),
        };

        if kind == TypeKind::Enum {
            self.skip_enum_constants();
        }

        let inner = Owner {
            name: name.clone(),
            qualified_name: qualified_name.clone(),
            kind,
        };
        let methods = self.members(Some(&inner));
        tracing::trace!(
            target: "chainfill.types",
            name = %name,
            methods = methods.len(),
            "scanned type declaration"
        );
        self.out.push(TypeDecl {
            name,
            qualified_name,
            kind,
            type_parameters,
            methods,
        });
    }

    fn method(
        &mut self,
        owner: &Owner,
        visibility: Option<Visibility>,
        is_static: bool,
    ) -> Option<MethodDescriptor> {
        // Generic method: `<T> T pick()`.
        if self.peek() == Some(SyntaxKind::Less) {
            self.skip_angles();
        }

        let header_start = self.pos;
        loop {
            match self.peek() {
                Some(SyntaxKind::LParen) => break,
                Some(SyntaxKind::Less) => self.skip_angles(),
                // Initializer block or compact record constructor.
                Some(SyntaxKind::LBrace) => {
                    self.skip_balanced();
                    return None;
                }
                Some(SyntaxKind::Semicolon | SyntaxKind::RBrace) | None => {
                    self.skip_statement();
                    return None;
                }
                Some(_) if self.at_assign() => {
                    self.skip_statement();
                    return None;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let header_end = self.pos;
        if header_end == header_start
            || self.tokens[header_end - 1].kind != SyntaxKind::Identifier
        {
            self.skip_balanced();
            self.skip_statement();
            return None;
        }
        let name = self.tokens[header_end - 1].text(self.input).to_string();
        let return_type = self.text_of(header_start, header_end - 1);
        let parameters = self.parameters();

        // `throws ...`, `default ...` (annotation elements), then body or `;`.
        while let Some(next) = self.peek() {
            match next {
                SyntaxKind::LBrace => {
                    self.skip_balanced();
                    break;
                }
                SyntaxKind::Semicolon => {
                    self.bump();
                    break;
                }
                SyntaxKind::RBrace => break,
                _ => {
                    self.bump();
                }
            }
        }

        let is_constructor = return_type.is_empty() && name == owner.name;
        if return_type.is_empty() && !is_constructor {
            return None;
        }
        let visibility = visibility.unwrap_or(match owner.kind {
            TypeKind::Interface => Visibility::Public,
            _ => Visibility::PackagePrivate,
        });
        Some(MethodDescriptor {
            name,
            return_type: (!is_constructor).then_some(return_type),
            visibility,
            is_constructor,
            is_static,
            parameters,
        })
    }

    /// Parameter list starting at `(`; returns one entry per top-level
    /// comma-separated parameter.
    fn parameters(&mut self) -> Vec<String> {
        let mut parameters = Vec::new();
        self.bump();
        let mut depth = 0usize;
        let mut start = self.pos;
        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::LParen | SyntaxKind::Less | SyntaxKind::LBracket => depth += 1,
                SyntaxKind::RBracket | SyntaxKind::Greater => depth = depth.saturating_sub(1),
                SyntaxKind::RParen if depth == 0 => {
                    if self.pos > start {
                        parameters.push(self.text_of(start, self.pos));
                    }
                    self.bump();
                    break;
                }
                SyntaxKind::RParen => depth -= 1,
                SyntaxKind::Comma if depth == 0 => {
                    parameters.push(self.text_of(start, self.pos));
                    self.bump();
                    start = self.pos;
                    continue;
                }
                SyntaxKind::LBrace | SyntaxKind::RBrace | SyntaxKind::Semicolon => break,
                _ => {}
            }
            self.bump();
        }
        parameters
    }

    fn type_parameters(&mut self) -> Vec<String> {
        let mut names = Vec::new();
        let mut depth = 0usize;
        let mut expect_name = false;
        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::Less => {
                    depth += 1;
                    expect_name = depth == 1;
                }
                SyntaxKind::Greater => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                }
                SyntaxKind::Comma if depth == 1 => expect_name = true,
                SyntaxKind::Identifier if expect_name => {
                    names.push(self.peek_text().unwrap_or_default().to_string());
                    expect_name = false;
                }
                SyntaxKind::LBrace | SyntaxKind::Semicolon => break,
                _ => {}
            }
            self.bump();
        }
        names
    }

    fn skip_angles(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::Less => depth += 1,
                SyntaxKind::Greater => depth = depth.saturating_sub(1),
                SyntaxKind::LBrace | SyntaxKind::Semicolon | SyntaxKind::LParen => return,
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    fn skip_annotation(&mut self) {
        self.bump();
        while matches!(self.peek(), Some(SyntaxKind::Identifier | SyntaxKind::Dot)) {
            self.bump();
        }
        if self.peek() == Some(SyntaxKind::LParen) {
            self.skip_balanced();
        }
    }

    /// Skip a `(...)`, `[...]` or `{...}` group starting at the current token.
    fn skip_balanced(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::LParen | SyntaxKind::LBrace | SyntaxKind::LBracket => depth += 1,
                SyntaxKind::RParen | SyntaxKind::RBrace | SyntaxKind::RBracket => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    /// Skip to just past the next `;` at the current nesting level. Stops
    /// (without consuming) at an unmatched `}`.
    fn skip_statement(&mut self) {
        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::Semicolon => {
                    self.bump();
                    return;
                }
                SyntaxKind::RBrace => return,
                SyntaxKind::LParen | SyntaxKind::LBrace | SyntaxKind::LBracket => {
                    self.skip_balanced()
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn skip_enum_constants(&mut self) {
        while let Some(kind) = self.peek() {
            match kind {
                SyntaxKind::Semicolon => {
                    self.bump();
                    return;
                }
                SyntaxKind::RBrace => return,
                SyntaxKind::LParen | SyntaxKind::LBrace => self.skip_balanced(),
                _ => {
                    self.bump();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn scans_builder_with_methods_in_declaration_order() {
        let source = r#"
package com.acme;

import java.util.List;

public class FooBuilder {
    private String a;
    private final List<String> items = new ArrayList<>();

    public FooBuilder() {}

    public FooBuilder withA() { this.a = "a"; return this; }
    public FooBuilder withB(String b) { return this; }
    @Override
    public String toString() { return a; }
    public Foo build() { return new Foo(a); }
    private void helper() {}
    static <T> List<T> wrap(T value, Map<String, T> extra) throws Exception { return null; }
}
"#;
        let decls = index_java_source(source);
        assert_eq!(decls.len(), 1);
        let decl = &decls[0];
        assert_eq!(decl.qualified_name.as_deref(), Some("com.acme.FooBuilder"));

        let summary: Vec<_> = decl
            .methods
            .iter()
            .map(|m| (m.name.as_str(), m.return_type.as_deref(), m.visibility, m.is_constructor))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("FooBuilder", None, Visibility::Public, true),
                ("withA", Some("FooBuilder"), Visibility::Public, false),
                ("withB", Some("FooBuilder"), Visibility::Public, false),
                ("toString", Some("String"), Visibility::Public, false),
                ("build", Some("Foo"), Visibility::Public, false),
                ("helper", Some("void"), Visibility::Private, false),
                ("wrap", Some("List<T>"), Visibility::PackagePrivate, false),
            ]
        );
        assert_eq!(decl.methods[2].parameters, vec!["String b".to_string()]);
        assert_eq!(
            decl.methods[6].parameters,
            vec!["T value".to_string(), "Map<String, T> extra".to_string()]
        );
        assert!(decl.methods[6].is_static);
    }

    #[test]
    fn nested_types_get_dotted_qualified_names() {
        let source = r#"
package p;
public class Pizza {
    private Pizza(Builder b) {}
    public static class Builder<T extends Topping> {
        public Builder<T> cheese() { return this; }
        public Pizza build() { return new Pizza(this); }
    }
    enum Size { SMALL(1), LARGE(2) { int x() { return 3; } }; Size(int n) {} public int inches() { return 0; } }
    interface Visitor { void visit(Pizza p); }
}
"#;
        let decls = index_java_source(source);
        let mut names: Vec<_> = decls
            .iter()
            .map(|d| d.qualified_name.clone().unwrap())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["p.Pizza", "p.Pizza.Builder", "p.Pizza.Size", "p.Pizza.Visitor"]
        );

        let builder = decls.iter().find(|d| d.name == "Builder").unwrap();
        assert_eq!(builder.type_parameters, vec!["T".to_string()]);
        assert_eq!(builder.methods.len(), 2);
        assert_eq!(builder.methods[0].return_type.as_deref(), Some("Builder<T>"));

        let size = decls.iter().find(|d| d.name == "Size").unwrap();
        assert_eq!(size.kind, TypeKind::Enum);
        let size_methods: Vec<_> = size.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(size_methods, vec!["Size", "inches"]);

        let visitor = decls.iter().find(|d| d.name == "Visitor").unwrap();
        assert_eq!(visitor.methods[0].visibility, Visibility::Public);
    }

    #[test]
    fn default_package_uses_simple_name() {
        let decls = index_java_source("record PointBuilder(int x) { PointBuilder x(int x) { return this; } }");
        assert_eq!(decls[0].qualified_name.as_deref(), Some("PointBuilder"));
        assert_eq!(decls[0].kind, TypeKind::Record);
        assert_eq!(decls[0].methods[0].name, "x");
    }
}
