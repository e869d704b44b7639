use serde_repr::{Deserialize_repr, Serialize_repr};

/// Unified syntax kind for both tokens and tree nodes.
///
/// Token kinds come first, composite node kinds after `__FirstNode`. The
/// sketch parser only produces the node kinds it understands; anything else is
/// kept as raw tokens inside the nearest node so the tree stays lossless.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u16)]
pub enum SyntaxKind {
    // --- Trivia ---
    Whitespace,
    LineComment,
    BlockComment,
    DocComment,

    // --- Identifiers & literals ---
    Identifier,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
    TextBlock,

    // --- Keywords (reserved) ---
    AbstractKw,
    BooleanKw,
    ByteKw,
    CharKw,
    ClassKw,
    DefaultKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    ExtendsKw,
    FinalKw,
    FloatKw,
    IfKw,
    ImplementsKw,
    ImportKw,
    InstanceofKw,
    IntKw,
    InterfaceKw,
    LongKw,
    NativeKw,
    NewKw,
    PackageKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReturnKw,
    ShortKw,
    StaticKw,
    SuperKw,
    SynchronizedKw,
    ThisKw,
    ThrowKw,
    ThrowsKw,
    TransientKw,
    VoidKw,
    VolatileKw,

    // Literal keywords.
    TrueKw,
    FalseKw,
    NullKw,

    // --- Operators / punctuation ---
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Ellipsis,
    At,
    Question,
    Colon,
    DoubleColon,
    Arrow,
    Less,
    Greater,
    /// Any other operator (`+`, `==`, `&&`, `>>>=`, ...). The sketch parser
    /// never needs to tell them apart.
    Operator,
    /// A character the lexer does not recognise.
    Unknown,

    // --- Special ---
    /// Parser recovery node. A childless `Error` marks something that was
    /// expected but missing, e.g. the `;` of an unterminated statement.
    Error,
    /// Receiver slot of a synthesized call fragment, replaced before the
    /// fragment is attached.
    Placeholder,

    __FirstNode,

    // --- Nodes ---
    CompilationUnit,
    Block,
    Statement,
    ArgumentList,
    NamedType,
    TypeArguments,

    // Expressions
    LiteralExpression,
    NameExpression,
    NameRef,
    ThisExpression,
    SuperExpression,
    ParenthesizedExpression,
    NewExpression,
    MethodCallExpression,
    FieldAccessExpression,

    __Last,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::LineComment
                | SyntaxKind::BlockComment
                | SyntaxKind::DocComment
        )
    }

    pub fn is_token(self) -> bool {
        (self as u16) < (SyntaxKind::__FirstNode as u16)
    }

    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::AbstractKw as u16)
            && (self as u16) <= (SyntaxKind::NullKw as u16)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntLiteral
                | SyntaxKind::FloatLiteral
                | SyntaxKind::CharLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::TextBlock
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw
        )
    }

    pub fn is_modifier_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::PrivateKw
                | SyntaxKind::StaticKw
                | SyntaxKind::AbstractKw
                | SyntaxKind::FinalKw
                | SyntaxKind::NativeKw
                | SyntaxKind::SynchronizedKw
                | SyntaxKind::TransientKw
                | SyntaxKind::VolatileKw
                | SyntaxKind::DefaultKw
        )
    }

    pub fn is_primitive_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BooleanKw
                | SyntaxKind::ByteKw
                | SyntaxKind::CharKw
                | SyntaxKind::ShortKw
                | SyntaxKind::IntKw
                | SyntaxKind::LongKw
                | SyntaxKind::FloatKw
                | SyntaxKind::DoubleKw
                | SyntaxKind::VoidKw
        )
    }

    /// Kinds that can stand as the receiver of a method call.
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::LiteralExpression
                | SyntaxKind::NameExpression
                | SyntaxKind::ThisExpression
                | SyntaxKind::SuperExpression
                | SyntaxKind::ParenthesizedExpression
                | SyntaxKind::NewExpression
                | SyntaxKind::MethodCallExpression
                | SyntaxKind::FieldAccessExpression
        )
    }

    /// Composite nodes that scope the search for a construction expression.
    pub fn is_context(self) -> bool {
        !self.is_token() && self != SyntaxKind::__Last
    }

    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "abstract" => SyntaxKind::AbstractKw,
            "boolean" => SyntaxKind::BooleanKw,
            "byte" => SyntaxKind::ByteKw,
            "char" => SyntaxKind::CharKw,
            "class" => SyntaxKind::ClassKw,
            "default" => SyntaxKind::DefaultKw,
            "double" => SyntaxKind::DoubleKw,
            "else" => SyntaxKind::ElseKw,
            "enum" => SyntaxKind::EnumKw,
            "extends" => SyntaxKind::ExtendsKw,
            "final" => SyntaxKind::FinalKw,
            "float" => SyntaxKind::FloatKw,
            "if" => SyntaxKind::IfKw,
            "implements" => SyntaxKind::ImplementsKw,
            "import" => SyntaxKind::ImportKw,
            "instanceof" => SyntaxKind::InstanceofKw,
            "int" => SyntaxKind::IntKw,
            "interface" => SyntaxKind::InterfaceKw,
            "long" => SyntaxKind::LongKw,
            "native" => SyntaxKind::NativeKw,
            "new" => SyntaxKind::NewKw,
            "package" => SyntaxKind::PackageKw,
            "private" => SyntaxKind::PrivateKw,
            "protected" => SyntaxKind::ProtectedKw,
            "public" => SyntaxKind::PublicKw,
            "return" => SyntaxKind::ReturnKw,
            "short" => SyntaxKind::ShortKw,
            "static" => SyntaxKind::StaticKw,
            "super" => SyntaxKind::SuperKw,
            "synchronized" => SyntaxKind::SynchronizedKw,
            "this" => SyntaxKind::ThisKw,
            "throw" => SyntaxKind::ThrowKw,
            "throws" => SyntaxKind::ThrowsKw,
            "transient" => SyntaxKind::TransientKw,
            "void" => SyntaxKind::VoidKw,
            "volatile" => SyntaxKind::VolatileKw,

            // Literal keywords.
            "true" => SyntaxKind::TrueKw,
            "false" => SyntaxKind::FalseKw,
            "null" => SyntaxKind::NullKw,

            _ => return None,
        })
    }
}
