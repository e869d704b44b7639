use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
}

/// A method as declared on a type. Only the signature is modelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Declared return type as written (`FooBuilder`, `List<String>`).
    /// Constructors have none.
    pub return_type: Option<String>,
    pub visibility: Visibility,
    pub is_constructor: bool,
    pub is_static: bool,
    /// Parameter declarations as written, one entry per parameter.
    #[serde(default)]
    pub parameters: Vec<String>,
}

impl MethodDescriptor {
    pub fn method(
        name: impl Into<String>,
        return_type: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: Some(return_type.into()),
            visibility,
            is_constructor: false,
            is_static: false,
            parameters: Vec::new(),
        }
    }

    pub fn constructor(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            visibility,
            is_constructor: true,
            is_static: false,
            parameters: Vec::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// A class-like type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Simple name (`Builder` for `com.acme.Foo.Builder`).
    pub name: String,
    /// `None` for local and anonymous types.
    pub qualified_name: Option<String>,
    pub kind: TypeKind,
    #[serde(default)]
    pub type_parameters: Vec<String>,
    /// Declared methods in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, qualified_name: Option<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            qualified_name,
            kind,
            type_parameters: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Convenience for a top-level class: the simple name is the last
    /// segment of `qualified_name`.
    pub fn class(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let name = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name.as_str())
            .to_string();
        Self::new(name, Some(qualified_name), TypeKind::Class)
    }

    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Whether the type written as `ty` denotes this declaration. Type
    /// arguments are ignored, so `FooBuilder<T>` matches `FooBuilder`.
    pub fn is_own_type(&self, ty: &str) -> bool {
        let erased = TypeReference::new(ty).erased();
        if erased.is_empty() {
            return false;
        }
        if erased == self.name {
            return true;
        }
        match self.qualified_name.as_deref() {
            Some(qualified) => {
                qualified == erased
                    || (qualified.len() > erased.len()
                        && qualified.ends_with(erased.as_str())
                        && qualified.as_bytes()[qualified.len() - erased.len() - 1] == b'.')
            }
            None => false,
        }
    }
}

/// A type reference as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeReference {
    text: String,
}

impl TypeReference {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The reference without type arguments, annotations or whitespace:
    /// `java.util.Map<K, V>` becomes `java.util.Map`.
    pub fn erased(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut depth = 0usize;
        let mut chars = self.text.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '<' => depth += 1,
                '>' => depth = depth.saturating_sub(1),
                '@' if depth == 0 => {
                    // Type annotation: drop `@Name` and the whitespace after it.
                    while chars
                        .peek()
                        .is_some_and(|c| c.is_alphanumeric() || *c == '_' || *c == '.' || *c == '$')
                    {
                        chars.next();
                    }
                }
                c if c.is_whitespace() => {}
                c if depth == 0 => out.push(c),
                _ => {}
            }
        }
        out
    }

    /// Last segment of the erased reference.
    pub fn simple_name(&self) -> String {
        let erased = self.erased();
        erased.rsplit('.').next().unwrap_or_default().to_string()
    }
}

impl From<&str> for TypeReference {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
