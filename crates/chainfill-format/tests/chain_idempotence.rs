use chainfill_format::{ChainFormatter, ChainWrap, FormatConfig, Formatter};
use chainfill_syntax::{parse_java_statement_fragment, preorder, SyntaxKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn around_dot() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(&["", " ", "  ", "\n    ", " \n\t\t", "\r\n  "][..])
}

fn before_paren() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(&["", " ", "\t"][..])
}

fn argument() -> impl Strategy<Value = &'static str> {
    proptest::sample::select(
        &["a", "count", "42", "\"s\"", "null", "(x)", "(int) y", "(long) (z)", "((a))"][..],
    )
}

/// Already formatted argument list text, without the parentheses.
fn arguments() -> impl Strategy<Value = String> {
    proptest::collection::vec(argument(), 0..4).prop_map(|args| args.join(", "))
}

fn call() -> impl Strategy<Value = (String, &'static str, &'static str, &'static str, String)> {
    (
        "[a-z][a-zA-Z0-9]{0,8}"
            .prop_filter("keywords are not method names", |name| {
                SyntaxKind::from_keyword(name).is_none()
            }),
        around_dot(),
        around_dot(),
        before_paren(),
        arguments(),
    )
}

fn wrap_mode() -> impl Strategy<Value = ChainWrap> {
    prop_oneof![
        Just(ChainWrap::Never),
        Just(ChainWrap::IfLong),
        Just(ChainWrap::Always),
    ]
}

fn format(source: &str, config: &FormatConfig) -> String {
    let mut tree = parse_java_statement_fragment(source).tree;
    let chain = preorder(&tree, tree.root())
        .find(|&node| tree.kind(node) == SyntaxKind::MethodCallExpression)
        .expect("chain");
    ChainFormatter::new(config.clone())
        .reformat(&mut tree, chain)
        .expect("reformat");
    tree.render()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn formatting_is_idempotent(
        calls in proptest::collection::vec(call(), 1..6),
        constructor_args in arguments(),
        chain_wrap in wrap_mode(),
        max_line_length in 20usize..120,
    ) {
        let mut source = format!("b = new FooBuilder({constructor_args})");
        let mut canonical = source.clone();
        for (name, before, after, paren, args) in &calls {
            source.push_str(&format!("{before}.{after}{name}{paren}({args})"));
            canonical.push_str(&format!(".{name}({args})"));
        }
        source.push(';');
        canonical.push(';');

        let config = FormatConfig {
            chain_wrap,
            max_line_length,
            ..FormatConfig::default()
        };
        let once = format(&source, &config);
        let twice = format(&once, &config);
        prop_assert_eq!(&once, &twice);

        // Dropping the layout whitespace of a wrapped chain gives back the
        // single-line form.
        let joined: String = once
            .split('\n')
            .map(str::trim_start)
            .collect::<Vec<_>>()
            .join("");
        prop_assert_eq!(joined, canonical);
    }
}

#[test]
fn never_wrap_produces_single_line() {
    let config = FormatConfig {
        chain_wrap: ChainWrap::Never,
        max_line_length: 10,
        ..FormatConfig::default()
    };
    assert_eq!(
        format("b = new FooBuilder()\n  .a()\n  .b ();", &config),
        "b = new FooBuilder().a().b();"
    );
}
