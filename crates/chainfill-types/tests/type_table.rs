use chainfill_types::{
    Declaration, MethodDescriptor, TypeDecl, TypeReference, TypeResolver, TypeTable, Visibility,
};
use pretty_assertions::assert_eq;

const PIZZA: &str = r#"
package com.acme;

public class Pizza {
    public static class Builder<T> {
        public Builder<T> cheese() { return this; }
        public Pizza build() { return new Pizza(); }
    }
}
"#;

const OTHER: &str = r#"
package org.other;

public class Builder {
    public void reset() {}
}
"#;

fn resolve_type(table: &TypeTable, text: &str) -> Option<String> {
    table
        .resolve(&TypeReference::new(text))
        .and_then(|decl| decl.as_type().and_then(|decl| decl.qualified_name.clone()))
}

#[test]
fn resolves_qualified_and_suffix_references() {
    let table = TypeTable::from_java_sources([PIZZA]);
    assert_eq!(table.len(), 2);

    assert_eq!(
        resolve_type(&table, "com.acme.Pizza.Builder"),
        Some("com.acme.Pizza.Builder".to_string())
    );
    assert_eq!(
        resolve_type(&table, "Pizza.Builder<String>"),
        Some("com.acme.Pizza.Builder".to_string())
    );
    assert_eq!(
        resolve_type(&table, "Builder"),
        Some("com.acme.Pizza.Builder".to_string())
    );
    assert_eq!(resolve_type(&table, "Missing"), None);
    assert_eq!(resolve_type(&table, "izza.Builder"), None);
}

#[test]
fn ambiguous_simple_names_do_not_resolve() {
    let table = TypeTable::from_java_sources([PIZZA, OTHER]);
    assert_eq!(resolve_type(&table, "Builder"), None);
    assert_eq!(
        resolve_type(&table, "org.other.Builder"),
        Some("org.other.Builder".to_string())
    );
}

#[test]
fn type_parameters_resolve_to_parameter_declarations() {
    let table = TypeTable::from_java_sources([PIZZA]);
    assert_eq!(
        table.resolve(&TypeReference::new("T")),
        Some(Declaration::TypeParameter {
            name: "T".to_string()
        })
    );

    let mut table = TypeTable::new();
    table.declare_type_parameter("B");
    assert!(table.resolve(&"B".into()).is_some_and(|decl| decl.as_type().is_none()));
}

#[test]
fn declared_type_parameters_do_not_hide_real_types() {
    let real_t = "package demo;\n\npublic class T {\n    public void run() {}\n}\n";
    let table = TypeTable::from_java_sources([PIZZA, real_t]);
    assert_eq!(resolve_type(&table, "T"), Some("demo.T".to_string()));

    // Parameters put in scope by the host still shadow.
    let mut table = table;
    table.declare_type_parameter("T");
    assert_eq!(
        table.resolve(&TypeReference::new("T")),
        Some(Declaration::TypeParameter {
            name: "T".to_string()
        })
    );
}

#[test]
fn hand_built_declarations_are_keyed_by_qualified_name() {
    let mut table = TypeTable::new();
    table.insert(
        TypeDecl::class("demo.FooBuilder").with_method(MethodDescriptor::method(
            "withA",
            "FooBuilder",
            Visibility::Public,
        )),
    );
    let decl = table.get("demo.FooBuilder").unwrap();
    assert_eq!(decl.name, "FooBuilder");
    assert!(decl.is_own_type(decl.methods[0].return_type.as_deref().unwrap()));

    // Resolution through a reference to the table.
    let by_ref: &dyn TypeResolver = &table;
    assert!(by_ref.resolve(&"FooBuilder".into()).is_some());
}
