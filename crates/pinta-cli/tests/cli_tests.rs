use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CLASSES: &str = r"
class Object {}
class A {}
class B {}
class Box {
    field item: Object;
    method set(v: Object): void {
        this.<Box: item> = v;
        return;
    }
    method get(): Object {
        r = this.<Box: item>;
        return r;
    }
}
";

const MAIN: &str = r"
class Main {
    static method main(): void {
        b1 = new Box;
        b2 = new Box;
        o1 = new A;
        o2 = new B;
        invokevirtual b1.<Box: set(Object)>(o1);
        invokevirtual b2.<Box: set(Object)>(o2);
        x1 = invokevirtual b1.<Box: get()>();
        return;
    }
}
";

const X1_CI: &str =
    "<Main: main()>/x1 -> [NewObj{<Main: main()>[2]:A}, NewObj{<Main: main()>[3]:B}]";
const X1_OBJ: &str = "<Main: main()>/x1 -> [NewObj{<Main: main()>[2]:A}]";

fn pinta() -> Command {
    let mut cmd = Command::cargo_bin("pinta").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn boxes_file(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("boxes.pir");
    fs::write(&path, format!("{}{}", CLASSES, MAIN)).unwrap();
    path
}

#[test]
fn test_analyze_insensitive() {
    let dir = TempDir::new().unwrap();
    pinta()
        .arg("analyze")
        .arg(boxes_file(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "-------------------- Points-to sets of all variables --------------------",
        ))
        .stdout(predicate::str::contains(X1_CI))
        .stdout(predicate::str::contains(
            "<Main: main()>[6] -> <Box: get()>",
        ));
}

#[test]
fn test_analyze_object_sensitive() {
    let dir = TempDir::new().unwrap();
    pinta()
        .args(["analyze", "--cs", "1-obj"])
        .arg(boxes_file(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains(X1_OBJ))
        .stdout(predicate::str::contains(X1_CI).not());
}

#[test]
fn test_options_string() {
    let dir = TempDir::new().unwrap();
    pinta()
        .args(["analyze", "--options", "cs:2-obj;heap-model:alloc-site"])
        .arg(boxes_file(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains(X1_OBJ));
}

#[test]
fn test_unknown_selector_fails() {
    let dir = TempDir::new().unwrap();
    pinta()
        .args(["analyze", "--cs", "2-heap"])
        .arg(boxes_file(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown context selector"));
}

#[test]
fn test_selector_checked_before_loading_input() {
    pinta()
        .args(["analyze", "--cs", "k-obj", "/definitely/not/here.pir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid context sensitivity"))
        .stderr(predicate::str::contains("failed to load").not());
}

#[test]
fn test_compare_with_saved_dump() {
    let dir = TempDir::new().unwrap();
    let input = boxes_file(&dir);
    let expected = dir.path().join("expected.txt");

    pinta()
        .arg("analyze")
        .arg(&input)
        .arg("--output")
        .arg(&expected)
        .assert()
        .success();
    assert!(fs::read_to_string(&expected).unwrap().contains(X1_CI));

    pinta()
        .arg("analyze")
        .arg(&input)
        .arg("--compare")
        .arg(&expected)
        .assert()
        .success()
        .stdout(predicate::str::contains("MATCH"));

    pinta()
        .args(["analyze", "--cs", "1-obj"])
        .arg(&input)
        .arg("--compare")
        .arg(&expected)
        .assert()
        .failure()
        .stdout(predicate::str::contains(format!("{} should be included", X1_CI)))
        .stdout(predicate::str::contains(format!(
            "{} should NOT be included",
            X1_OBJ
        )));
}

#[test]
fn test_json_dump() {
    let dir = TempDir::new().unwrap();
    let output = pinta()
        .args(["analyze", "--json"])
        .arg(boxes_file(&dir))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["sections"].as_array().unwrap().len(), 5);
    assert_eq!(json["sections"][4]["title"], "Call graph edges");
}

#[test]
fn test_directory_input() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("classes.pir"), CLASSES).unwrap();
    fs::write(dir.path().join("main.pir"), MAIN).unwrap();

    pinta()
        .arg("analyze")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(X1_CI));
}

#[test]
fn test_callgraph_text_and_dot() {
    let dir = TempDir::new().unwrap();
    let dot = dir.path().join("graph.dot");

    pinta()
        .args(["callgraph", "--algorithm", "cha"])
        .arg(boxes_file(&dir))
        .arg("--dot")
        .arg(&dot)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<Main: main()>[4] -> <Box: set(Object)> (virtual)",
        ))
        .stdout(predicate::str::contains("3 reachable methods, 3 edges"));

    let dot_text = fs::read_to_string(&dot).unwrap();
    assert!(dot_text.starts_with("digraph CallGraph {"));
    assert!(dot_text.contains("n2 -> n0;"));
}

#[test]
fn test_callgraph_unknown_algorithm() {
    let dir = TempDir::new().unwrap();
    pinta()
        .args(["callgraph", "--algorithm", "rta"])
        .arg(boxes_file(&dir))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown call graph algorithm"));
}

#[test]
fn test_validate() {
    let dir = TempDir::new().unwrap();
    pinta()
        .arg("validate")
        .arg(boxes_file(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"));

    let broken = dir.path().join("broken.pir");
    fs::write(&broken, "class Main { static method main(): void { x = ; } }").unwrap();
    pinta()
        .arg("validate")
        .arg(&broken)
        .assert()
        .failure()
        .stdout(predicate::str::contains("INVALID"));
}

#[test]
fn test_dump_ir() {
    let dir = TempDir::new().unwrap();
    pinta()
        .arg("dump-ir")
        .arg(boxes_file(&dir))
        .assert()
        .success()
        .stdout(predicate::str::contains("class Box extends Object {"))
        .stdout(predicate::str::contains("        this.<Box: item> = v;"))
        .stdout(predicate::str::contains("entry <Main: main()>;"));

    let output = pinta()
        .args(["dump-ir", "--json"])
        .arg(boxes_file(&dir))
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice::<serde_json::Value>(&output.stdout).unwrap();
}

#[test]
fn test_missing_input() {
    pinta()
        .args(["analyze", "does-not-exist.pir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load does-not-exist.pir"));
}
