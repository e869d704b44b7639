use chainfill_refactor::{
    available_at, collect_methods, filter_applicable, CompleteBuilderMethods, Document,
};
use chainfill_syntax::{parse_java_statement_fragment, SyntaxKind, TextSize};
use chainfill_types::{MethodDescriptor, TypeDecl, TypeTable, Visibility};
use proptest::prelude::*;

fn visibility() -> impl Strategy<Value = Visibility> {
    prop_oneof![
        Just(Visibility::Public),
        Just(Visibility::Protected),
        Just(Visibility::PackagePrivate),
        Just(Visibility::Private),
    ]
}

#[derive(Debug, Clone)]
enum Returns {
    Builder,
    Other(&'static str),
    Nothing,
}

fn returns() -> impl Strategy<Value = Returns> {
    prop_oneof![
        Just(Returns::Builder),
        Just(Returns::Other("Foo")),
        Just(Returns::Other("void")),
        Just(Returns::Other("String")),
        Just(Returns::Nothing),
    ]
}

fn builder_decl(methods: &[(Returns, Visibility)]) -> TypeDecl {
    let mut decl = TypeDecl::class("demo.FooBuilder");
    for (index, (ret, vis)) in methods.iter().enumerate() {
        let name = format!("m{index}");
        let method = match ret {
            Returns::Builder => MethodDescriptor::method(name, "FooBuilder", *vis),
            Returns::Other(ty) => MethodDescriptor::method(name, *ty, *vis),
            Returns::Nothing => MethodDescriptor::constructor("FooBuilder", *vis),
        };
        decl = decl.with_method(method);
    }
    decl
}

fn suffix() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(&["Builder", "BUILDER", "builder", "Factory", "Build", ""][..])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn self_returning_methods_precede_all_others(
        methods in proptest::collection::vec((returns(), visibility()), 0..12),
    ) {
        let decl = builder_decl(&methods);
        let applicable = filter_applicable(collect_methods(&decl));

        prop_assert!(applicable.iter().all(|m| m.is_public() && !m.is_constructor));

        let own: Vec<bool> = applicable
            .iter()
            .map(|m| m.return_type.as_deref() == Some("FooBuilder"))
            .collect();
        if let Some(first_other) = own.iter().position(|is_own| !is_own) {
            prop_assert!(own[first_other..].iter().all(|is_own| !is_own));
        }

        // Declaration order survives inside each group.
        for group in [true, false] {
            let indices: Vec<usize> = applicable
                .iter()
                .zip(&own)
                .filter(|(_, is_own)| **is_own == group)
                .map(|(m, _)| m.name[1..].parse().unwrap())
                .collect();
            prop_assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
        }

        // Deterministic.
        prop_assert_eq!(applicable, filter_applicable(collect_methods(&decl)));
    }

    #[test]
    fn availability_follows_builder_suffix(
        stem in "[A-Z][a-z]{0,6}",
        suffix in suffix(),
    ) {
        let name = format!("{stem}{suffix}");
        let mut table = TypeTable::new();
        table.insert(TypeDecl::class(format!("demo.{name}")).with_method(
            MethodDescriptor::method("build", "Object", Visibility::Public),
        ));

        let source = format!("new {name}();");
        let tree = parse_java_statement_fragment(&source).tree;
        let anchor = tree
            .anchor_at(TextSize::from((source.len() - 1) as u32))
            .unwrap();
        prop_assert_eq!(tree.kind(anchor), SyntaxKind::Semicolon);

        let expected = name.to_uppercase().ends_with("BUILDER");
        prop_assert_eq!(available_at(&tree, anchor, &table, true), expected);
        prop_assert!(!available_at(&tree, anchor, &table, false));
    }

    #[test]
    fn non_builders_are_never_mutated(stem in "[A-Z][a-z]{0,6}") {
        prop_assume!(!stem.to_uppercase().ends_with("BUILDER"));
        let mut table = TypeTable::new();
        table.insert(TypeDecl::class(format!("demo.{stem}")).with_method(
            MethodDescriptor::method("with", stem.as_str(), Visibility::Public),
        ));
        let action = CompleteBuilderMethods::new(table);

        let source = format!("x = new {stem}()");
        let mut doc = Document::parse(&source);
        let anchor = doc
            .tree()
            .anchor_at(TextSize::from(source.len() as u32))
            .unwrap();
        action.invoke(&mut doc, anchor).unwrap();
        prop_assert_eq!(doc.text(), source);
    }
}
