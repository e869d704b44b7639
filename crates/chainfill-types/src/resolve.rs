use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::{index_java_source, TypeDecl, TypeReference};

/// What a type reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Type(Arc<TypeDecl>),
    TypeParameter { name: String },
}

impl Declaration {
    pub fn as_type(&self) -> Option<&Arc<TypeDecl>> {
        match self {
            Declaration::Type(decl) => Some(decl),
            Declaration::TypeParameter { .. } => None,
        }
    }
}

/// Resolves textual type references to declarations.
///
/// Editing code depends only on this trait; hosts plug in whatever semantic
/// model they have (a workspace index, a fixture table, ...).
pub trait TypeResolver {
    fn resolve(&self, reference: &TypeReference) -> Option<Declaration>;
}

impl<R: TypeResolver + ?Sized> TypeResolver for &R {
    fn resolve(&self, reference: &TypeReference) -> Option<Declaration> {
        (**self).resolve(reference)
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Arc<R> {
    fn resolve(&self, reference: &TypeReference) -> Option<Declaration> {
        (**self).resolve(reference)
    }
}

impl<R: TypeResolver + ?Sized> TypeResolver for Box<R> {
    fn resolve(&self, reference: &TypeReference) -> Option<Declaration> {
        (**self).resolve(reference)
    }
}

/// In-memory table of type declarations keyed by qualified name.
///
/// Lookups accept the qualified name or any dotted suffix of it
/// (`Pizza.Builder`, `Builder`), as long as the suffix is unambiguous.
///
/// Type parameters come in two scopes. Names passed to
/// [`declare_type_parameter`](Self::declare_type_parameter) are in scope at
/// the lookup site and shadow types with the same simple name. Parameters of
/// the inserted declarations (`T` of `Builder<T>`) only resolve when no type
/// of that name exists, so one generic class never hides a real type `T`
/// declared elsewhere.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    types: BTreeMap<String, Arc<TypeDecl>>,
    scope_type_parameters: BTreeSet<String>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from Java sources using the declaration scanner.
    pub fn from_java_sources<'a>(sources: impl IntoIterator<Item = &'a str>) -> Self {
        let mut table = Self::new();
        for source in sources {
            table.add_java_source(source);
        }
        table
    }

    /// Scan `source` and insert every declared type. Returns how many types
    /// were added.
    pub fn add_java_source(&mut self, source: &str) -> usize {
        let decls = index_java_source(source);
        let count = decls.len();
        for decl in decls {
            self.insert(decl);
        }
        count
    }

    /// Insert `decl`, replacing any previous declaration with the same key.
    /// Local types (no qualified name) are keyed by their simple name.
    pub fn insert(&mut self, decl: TypeDecl) -> Arc<TypeDecl> {
        let key = decl
            .qualified_name
            .clone()
            .unwrap_or_else(|| decl.name.clone());
        let decl = Arc::new(decl);
        self.types.insert(key, decl.clone());
        decl
    }

    /// Put a type parameter in scope for every lookup.
    pub fn declare_type_parameter(&mut self, name: impl Into<String>) {
        self.scope_type_parameters.insert(name.into());
    }

    fn declares_type_parameter(&self, name: &str) -> bool {
        self.types
            .values()
            .any(|decl| decl.type_parameters.iter().any(|param| param == name))
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Arc<TypeDecl>> {
        self.types.get(qualified_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TypeDecl>> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeResolver for TypeTable {
    fn resolve(&self, reference: &TypeReference) -> Option<Declaration> {
        let erased = reference.erased();
        if erased.is_empty() {
            return None;
        }

        let simple = !erased.contains('.');
        if simple && self.scope_type_parameters.contains(&erased) {
            return Some(Declaration::TypeParameter { name: erased });
        }

        if let Some(decl) = self.types.get(&erased) {
            return Some(Declaration::Type(decl.clone()));
        }

        let suffix = format!(".{erased}");
        let mut candidates = self
            .types
            .iter()
            .filter(|(key, _)| key.ends_with(&suffix))
            .map(|(_, decl)| decl);
        match (candidates.next(), candidates.next()) {
            (Some(decl), None) => return Some(Declaration::Type(decl.clone())),
            (Some(_), Some(_)) => {
                tracing::debug!(
                    target: "chainfill.types",
                    reference = %reference.text(),
                    "ambiguous type reference"
                );
                return None;
            }
            (None, _) => {}
        }

        (simple && self.declares_type_parameter(&erased))
            .then(|| Declaration::TypeParameter { name: erased })
    }
}
