use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const FOO_BUILDER: &str = r#"package demo;

public class FooBuilder {
    public FooBuilder withA() { return this; }
    public FooBuilder withB() { return this; }
    public Foo build() { return new Foo(); }
}
"#;

const DEMO: &str = "package demo;

class Demo {
    void run() {
        Foo foo = new FooBuilder()
    }
}
";

fn chainfill() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("chainfill"))
}

/// Byte offset just after the first `new FooBuilder()` in `DEMO`.
fn anchor_offset() -> String {
    let needle = "new FooBuilder()";
    (DEMO.find(needle).unwrap() + needle.len()).to_string()
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    temp.child("src/Demo.java").write_str(DEMO).unwrap();
    temp.child("types/demo/FooBuilder.java")
        .write_str(FOO_BUILDER)
        .unwrap();
    temp
}

#[test]
fn help_mentions_commands() {
    chainfill().arg("--help").assert().success().stdout(
        predicate::str::contains("complete")
            .and(predicate::str::contains("available"))
            .and(predicate::str::contains("parse")),
    );
}

#[test]
fn complete_prints_rewritten_source() {
    let temp = project();
    chainfill()
        .arg("complete")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg(anchor_offset())
        .arg("--types")
        .arg(temp.child("types").path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Foo foo = new FooBuilder().withA().withB().build();",
        ));

    // Without --write the file stays as it was.
    temp.child("src/Demo.java").assert(DEMO);
}

#[test]
fn complete_write_updates_file_in_place() {
    let temp = project();
    chainfill()
        .arg("complete")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg(anchor_offset())
        .arg("--types")
        .arg(temp.child("types/demo/FooBuilder.java").path())
        .arg("--write")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    temp.child("src/Demo.java").assert(predicate::str::contains(
        "new FooBuilder().withA().withB().build();\n",
    ));
}

#[test]
fn complete_json_reports_outcome() {
    let temp = project();
    let output = chainfill()
        .arg("complete")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg(anchor_offset())
        .arg("--types")
        .arg(temp.child("types").path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["applied"], true);
    assert_eq!(report["calls"], 3);
    assert_eq!(report["terminated"], true);
    assert!(report["text"]
        .as_str()
        .unwrap()
        .contains("new FooBuilder().withA().withB().build();"));
}

#[test]
fn config_file_controls_chain_wrapping() {
    let temp = project();
    temp.child("src/chainfill.toml")
        .write_str("[format]\nchain_wrap = \"always\"\n")
        .unwrap();

    chainfill()
        .arg("complete")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg(anchor_offset())
        .arg("--types")
        .arg(temp.child("types").path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "new FooBuilder()\n                .withA()\n                .withB()\n                .build();",
        ));
}

#[test]
fn missing_builder_type_is_not_applicable() {
    let temp = project();
    chainfill()
        .arg("complete")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg(anchor_offset())
        .arg("--write")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no builder construction"));

    temp.child("src/Demo.java").assert(DEMO);
}

#[test]
fn available_reports_through_exit_code() {
    let temp = project();
    chainfill()
        .arg("available")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg(anchor_offset())
        .arg("--types")
        .arg(temp.child("types").path())
        .assert()
        .success()
        .stdout("true\n");

    chainfill()
        .arg("available")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg("0")
        .arg("--types")
        .arg(temp.child("types").path())
        .assert()
        .code(1)
        .stdout("false\n");
}

#[test]
fn out_of_range_offset_is_an_error() {
    let temp = project();
    chainfill()
        .arg("available")
        .arg(temp.child("src/Demo.java").path())
        .arg("--offset")
        .arg("100000")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("outside of"));
}

#[test]
fn parse_dumps_tree_and_reports_errors() {
    let temp = project();
    chainfill()
        .arg("parse")
        .arg(temp.child("types/demo/FooBuilder.java").path())
        .assert()
        .success()
        .stdout(predicate::str::contains("CompilationUnit"));

    chainfill()
        .arg("parse")
        .arg(temp.child("src/Demo.java").path())
        .assert()
        .code(1);
}
