use text_size::{TextRange, TextSize};

use crate::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl Token {
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.range]
    }
}

/// Lex `input` into a lossless token stream (trivia included).
///
/// Lexing never fails: unterminated literals and comments run to the end of
/// the input and unrecognised characters become [`SyntaxKind::Unknown`].
pub fn lex(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    tokens
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        let rest = &self.input[self.pos..];
        let ch = rest.chars().next()?;
        let start = self.pos;

        let kind = if ch.is_whitespace() {
            self.eat_while(char::is_whitespace);
            SyntaxKind::Whitespace
        } else if rest.starts_with("/**") && !rest.starts_with("/**/") {
            self.eat_block_comment();
            SyntaxKind::DocComment
        } else if rest.starts_with("/*") {
            self.eat_block_comment();
            SyntaxKind::BlockComment
        } else if rest.starts_with("//") {
            self.eat_while(|c| c != '\n');
            SyntaxKind::LineComment
        } else if rest.starts_with("\"\"\"") {
            self.eat_text_block();
            SyntaxKind::TextBlock
        } else if ch == '"' {
            self.eat_quoted('"');
            SyntaxKind::StringLiteral
        } else if ch == '\'' {
            self.eat_quoted('\'');
            SyntaxKind::CharLiteral
        } else if ch.is_ascii_digit()
            || (ch == '.' && rest[1..].starts_with(|c: char| c.is_ascii_digit()))
        {
            self.eat_number()
        } else if is_ident_start(ch) {
            self.eat_while(is_ident_continue);
            SyntaxKind::from_keyword(&self.input[start..self.pos])
                .unwrap_or(SyntaxKind::Identifier)
        } else {
            self.eat_punctuation(rest)
        };

        let range = TextRange::new(
            TextSize::from(start as u32),
            TextSize::from(self.pos as u32),
        );
        Some(Token { kind, range })
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        for (offset, ch) in self.input[self.pos..].char_indices() {
            if !pred(ch) {
                self.pos += offset;
                return;
            }
        }
        self.pos = self.input.len();
    }

    fn eat_block_comment(&mut self) {
        let body = self.pos + 2;
        self.pos = match self.input[body..].find("*/") {
            Some(end) => body + end + 2,
            None => self.input.len(),
        };
    }

    fn eat_text_block(&mut self) {
        let body = self.pos + 3;
        let mut escaped = false;
        for (offset, ch) in self.input[body..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '"' if self.input[body + offset..].starts_with("\"\"\"") => {
                    self.pos = body + offset + 3;
                    return;
                }
                _ => {}
            }
        }
        self.pos = self.input.len();
    }

    fn eat_quoted(&mut self, quote: char) {
        let body = self.pos + 1;
        let mut escaped = false;
        for (offset, ch) in self.input[body..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                // Unterminated literal: stop at the end of the line.
                '\n' => {
                    self.pos = body + offset;
                    return;
                }
                c if c == quote => {
                    self.pos = body + offset + c.len_utf8();
                    return;
                }
                _ => {}
            }
        }
        self.pos = self.input.len();
    }

    fn eat_number(&mut self) -> SyntaxKind {
        let mut kind = SyntaxKind::IntLiteral;
        let bytes = self.input.as_bytes();
        let mut prev = 0u8;
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            let exponent_sign = (b == b'+' || b == b'-')
                && matches!(prev, b'e' | b'E' | b'p' | b'P')
                && kind == SyntaxKind::FloatLiteral;
            if b == b'.' {
                // `1.foo` is not a float, but `1.` and `1.5` are.
                let next = bytes.get(self.pos + 1).copied().unwrap_or(0);
                if next.is_ascii_alphabetic() && !matches!(next, b'e' | b'E' | b'f' | b'F' | b'd' | b'D') {
                    break;
                }
                kind = SyntaxKind::FloatLiteral;
            } else if matches!(b, b'e' | b'E') && !self.is_hex_literal() {
                kind = SyntaxKind::FloatLiteral;
            } else if matches!(b, b'f' | b'F' | b'd' | b'D') && !self.is_hex_literal() {
                kind = SyntaxKind::FloatLiteral;
            } else if !(b.is_ascii_alphanumeric() || b == b'_' || exponent_sign) {
                break;
            }
            prev = b;
            self.pos += 1;
        }
        kind
    }

    fn is_hex_literal(&self) -> bool {
        let rest = &self.input[..self.pos];
        let start = rest
            .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let literal = &rest[start..];
        literal.starts_with("0x") || literal.starts_with("0X")
    }

    fn eat_punctuation(&mut self, rest: &str) -> SyntaxKind {
        const OPERATORS: &[&str] = &[
            ">>>=", "<<=", ">>=", ">>>", "...", "::", "->", "==", "!=", "<=", ">=", "&&", "||",
            "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<",
        ];

        // `>>` and `>>>` are lexed as single `>` tokens so nested type
        // arguments (`List<List<String>>`) close one level at a time.
        if rest.starts_with('>') && !rest.starts_with(">=") && !rest.starts_with(">>=") && !rest.starts_with(">>>=") {
            self.pos += 1;
            return SyntaxKind::Greater;
        }

        for op in OPERATORS {
            if rest.starts_with(op) {
                self.pos += op.len();
                return match *op {
                    "..." => SyntaxKind::Ellipsis,
                    "::" => SyntaxKind::DoubleColon,
                    "->" => SyntaxKind::Arrow,
                    _ => SyntaxKind::Operator,
                };
            }
        }

        let ch = rest.chars().next().unwrap_or('\0');
        self.pos += ch.len_utf8().max(1);
        match ch {
            '(' => SyntaxKind::LParen,
            ')' => SyntaxKind::RParen,
            '{' => SyntaxKind::LBrace,
            '}' => SyntaxKind::RBrace,
            '[' => SyntaxKind::LBracket,
            ']' => SyntaxKind::RBracket,
            ';' => SyntaxKind::Semicolon,
            ',' => SyntaxKind::Comma,
            '.' => SyntaxKind::Dot,
            '@' => SyntaxKind::At,
            '?' => SyntaxKind::Question,
            ':' => SyntaxKind::Colon,
            '<' => SyntaxKind::Less,
            '+' | '-' | '*' | '/' | '%' | '=' | '!' | '~' | '&' | '|' | '^' => {
                SyntaxKind::Operator
            }
            _ => SyntaxKind::Unknown,
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_ident::is_xid_start(ch)
}

fn is_ident_continue(ch: char) -> bool {
    ch == '$' || unicode_ident::is_xid_continue(ch)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn dump_non_trivia(input: &str) -> Vec<(SyntaxKind, String)> {
        lex(input)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .map(|t| (t.kind, t.text(input).to_string()))
            .collect()
    }

    #[test]
    fn lexes_builder_chain() {
        assert_eq!(
            dump_non_trivia("new FooBuilder().withA();"),
            vec![
                (SyntaxKind::NewKw, "new".to_string()),
                (SyntaxKind::Identifier, "FooBuilder".to_string()),
                (SyntaxKind::LParen, "(".to_string()),
                (SyntaxKind::RParen, ")".to_string()),
                (SyntaxKind::Dot, ".".to_string()),
                (SyntaxKind::Identifier, "withA".to_string()),
                (SyntaxKind::LParen, "(".to_string()),
                (SyntaxKind::RParen, ")".to_string()),
                (SyntaxKind::Semicolon, ";".to_string()),
            ]
        );
    }

    #[test]
    fn lexing_is_lossless() {
        let input = "a /* c */ . b(\"x\\\")\", 'y', 1.5e-3f) // tail\n>>= >";
        let rebuilt: String = lex(input).iter().map(|t| t.text(input)).collect();
        assert_eq!(rebuilt, input);
    }

    #[test]
    fn nested_type_arguments_close_one_level_at_a_time() {
        let kinds: Vec<_> = dump_non_trivia("List<List<String>>")
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::Identifier,
                SyntaxKind::Less,
                SyntaxKind::Identifier,
                SyntaxKind::Less,
                SyntaxKind::Identifier,
                SyntaxKind::Greater,
                SyntaxKind::Greater,
            ]
        );
    }

    #[test]
    fn numbers_do_not_swallow_member_access() {
        let tokens = dump_non_trivia("1.toString 0x1F 2.5d");
        assert_eq!(tokens[0], (SyntaxKind::IntLiteral, "1".to_string()));
        assert_eq!(tokens[1], (SyntaxKind::Dot, ".".to_string()));
        assert_eq!(tokens[3], (SyntaxKind::IntLiteral, "0x1F".to_string()));
        assert_eq!(tokens[4], (SyntaxKind::FloatLiteral, "2.5d".to_string()));
    }
}
