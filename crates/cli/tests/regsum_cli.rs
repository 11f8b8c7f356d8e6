use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn regsum(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("regsum").expect("binary");
    cmd.current_dir(workdir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_API_ORG")
        .env_remove("REGSUM_MODEL")
        .env_remove("REGSUM_CONCURRENCY")
        .arg("--quiet");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

const RULE: &str = "\
Page 1 of 2
I. Background
The rule applies to health IT.
A. Statutory Basis
Cures Act text.
Page 2 of 2
II. Provisions
Final text.
";

#[test]
fn parse_text_prints_tree() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("rule.txt"), RULE).unwrap();

    let output = regsum(temp.path())
        .args(["parse", "rule.txt", "--strip-pattern", r"Page \d+ of \d+\n"])
        .output()
        .unwrap();
    let tree = stdout_json(&output);

    let children = tree["children"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["title"], "I. Background");
    assert_eq!(children[0]["text"], "The rule applies to health IT.\n");
    assert_eq!(children[0]["children"][0]["path"], serde_json::json!([0, 0]));
    assert_eq!(children[0]["children"][0]["text"], "Cures Act text.\n");
    assert_eq!(children[1]["title"], "II. Provisions");
    assert_eq!(tree["text"], "");
}

#[test]
fn parse_html_writes_relevelled_markup() {
    let temp = tempdir().unwrap();
    fs::write(
        temp.path().join("page1.html"),
        "```html\n<h2>I. Scope</h2><p>Covers developers.</p>\n```",
    )
    .unwrap();
    fs::write(temp.path().join("page2.html"), "<h1>A. Definitions</h1><p>Terms.</p>").unwrap();

    regsum(temp.path())
        .args([
            "parse",
            "--format",
            "html",
            "page1.html",
            "page2.html",
            "--output",
            "out/tree.json",
            "--html-output",
            "out/relevelled.html",
        ])
        .assert()
        .success();

    let html = fs::read_to_string(temp.path().join("out/relevelled.html")).unwrap();
    assert!(html.contains(r#"<h1 data-path="[0]">I. Scope</h1>"#), "{html}");
    assert!(html.contains(r#"<h2 data-path="[0,0]">A. Definitions</h2>"#), "{html}");

    let tree: Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("out/tree.json")).unwrap())
            .unwrap();
    assert_eq!(tree["children"][0]["children"][0]["title"], "A. Definitions");

    let output = regsum(temp.path())
        .args(["parse", "--format", "annotated", "out/relevelled.html"])
        .output()
        .unwrap();
    let reread = stdout_json(&output);
    assert_eq!(reread["children"][0]["title"], "I. Scope");
    assert_eq!(reread["children"][0]["children"][0]["path"], serde_json::json!([0, 0]));
}

#[test]
fn render_emits_annotated_headings() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("rule.txt"), "I. One\nalpha\nA. Two\nbeta\n").unwrap();

    regsum(temp.path())
        .args(["parse", "rule.txt", "-o", "tree.json"])
        .assert()
        .success();

    regsum(temp.path())
        .args(["render", "tree.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<H1 data-path='[0]'>I. One</H1>"))
        .stdout(predicate::str::contains("<H2 data-path='[0,0]'>A. Two</H2>"));
}

#[test]
fn summarize_without_api_key_fails() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("tree.json"), r#"{"title": "", "children": []}"#).unwrap();

    regsum(temp.path())
        .args(["summarize", "tree.json", "--memory-cache"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn summarize_uses_warm_cache_without_network() {
    let temp = tempdir().unwrap();
    let tree = serde_json::json!({
        "title": "",
        "text": "",
        "path": [],
        "children": [
            {"title": "I. Intro", "text": "body\n", "path": [0], "children": []}
        ]
    });
    fs::write(temp.path().join("tree.json"), tree.to_string()).unwrap();

    // Whole-tree payload is `"" + "\n" + "body\n"`.
    let cache = serde_json::json!({ "\nbody\n": { "summary": "Cached summary." } });
    fs::write(temp.path().join("cache.json"), cache.to_string()).unwrap();

    // Any request would fail: nothing listens on the discard port.
    fs::write(
        temp.path().join("regsum.toml"),
        "[openai]\nendpoint = \"http://127.0.0.1:9/v1/chat/completions\"\ntimeout_secs = 1\n\n[retry]\nmax_attempts = 1\n",
    )
    .unwrap();

    let output = regsum(temp.path())
        .env("OPENAI_API_KEY", "sk-test")
        .args([
            "--config",
            "regsum.toml",
            "summarize",
            "tree.json",
            "--cache",
            "cache.json",
        ])
        .output()
        .unwrap();
    let summarized = stdout_json(&output);

    assert_eq!(summarized["summary"]["summary"], "Cached summary.");
    assert!(summarized["children"][0].get("summary").is_none());
}

#[test]
fn summarize_rejects_unknown_node_path() {
    let temp = tempdir().unwrap();
    fs::write(temp.path().join("tree.json"), r#"{"title": "", "children": []}"#).unwrap();

    regsum(temp.path())
        .env("OPENAI_API_KEY", "sk-test")
        .args(["summarize", "tree.json", "--memory-cache", "--node", "3,1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No node at path [3, 1]"));
}
