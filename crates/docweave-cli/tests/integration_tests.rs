//! End-to-end tests for the docweave binary

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE: &str = "namespace Acme\n{\n    public class Foo\n    {\n        public void Bar() {}\n    }\n}\n";

const DOCUMENTED: &str = "namespace Acme\n{\n    /// <summary>Does things.</summary>\n    public class Foo\n    {\n        /// <summary>Does things.</summary>\n        public void Bar() {}\n    }\n}\n";

/// Command isolated from the developer's environment and any config file
/// above the working directory's contents
fn docweave(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docweave").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("DOCWEAVE_ENDPOINT")
        .env_remove("DOCWEAVE_API_KEY")
        .env_remove("DOCWEAVE_DEPLOYMENT");
    cmd
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    docweave(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("document"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    docweave(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_list_human() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), SOURCE).unwrap();

    docweave(dir.path())
        .args(["list", "Foo.cs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme.Foo"))
        .stdout(predicate::str::contains("Acme.Foo.Bar()"))
        .stdout(predicate::str::contains("2 undocumented declarations"));
}

#[test]
fn test_list_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), SOURCE).unwrap();

    let output = docweave(dir.path())
        .args(["list", "Foo.cs", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["kind"], "class");
    assert_eq!(rows[0]["name"], "Acme.Foo");
    assert_eq!(rows[1]["kind"], "method");
    assert_eq!(rows[1]["name"], "Acme.Foo.Bar()");
    assert!(rows[0]["id"].as_u64().unwrap() < rows[1]["id"].as_u64().unwrap());
}

#[test]
fn test_list_fully_documented_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), DOCUMENTED).unwrap();

    docweave(dir.path())
        .args(["list", "Foo.cs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Every declaration is documented"));
}

#[test]
fn test_document_without_configuration_exits_2() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), SOURCE).unwrap();

    docweave(dir.path())
        .args(["document", "Foo.cs", "-o", "Out.cs"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("service.endpoint"))
        .stderr(predicate::str::contains("service.apiKey"))
        .stderr(predicate::str::contains("service.deployment"));

    assert!(!dir.path().join("Out.cs").exists());
}

#[test]
fn test_config_init_then_validate_rejects_placeholders() {
    let dir = TempDir::new().unwrap();

    docweave(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docweave.toml"));
    assert!(dir.path().join("docweave.toml").exists());

    docweave(dir.path())
        .args(["config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    docweave(dir.path())
        .args(["config", "init", "--force"])
        .assert()
        .success();

    docweave(dir.path())
        .args(["config", "validate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("input"))
        .stderr(predicate::str::contains("service.apiKey"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_document_with_flags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-4o/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("<summary>Does things.</summary>")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), SOURCE).unwrap();

    docweave(dir.path())
        .args(["document", "Foo.cs", "-o", "Out.cs", "--quiet"])
        .args(["--endpoint", &server.uri()])
        .args(["--api-key", "secret", "--deployment", "gpt-4o"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("Out.cs")).unwrap(),
        DOCUMENTED
    );
    // Input is never modified
    assert_eq!(fs::read_to_string(dir.path().join("Foo.cs")).unwrap(), SOURCE);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_document_with_discovered_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("<summary>Does things.</summary>")),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/Foo.cs"), SOURCE).unwrap();
    fs::write(
        dir.path().join("docweave.toml"),
        format!(
            "input = \"src/Foo.cs\"\noutput = \"src/Foo.documented.cs\"\n\n\
             [service]\nendpoint = \"{}\"\napiKey = \"secret\"\ndeployment = \"gpt-4o\"\n",
            server.uri()
        ),
    )
    .unwrap();

    docweave(dir.path())
        .arg("document")
        .assert()
        .success()
        .stdout(predicate::str::contains("/// <summary>Does things.</summary>"))
        .stderr(predicate::str::contains("Documented: 2"));

    assert_eq!(
        fs::read_to_string(dir.path().join("src/Foo.documented.cs")).unwrap(),
        DOCUMENTED
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_generation_leaves_declaration_undocumented() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), SOURCE).unwrap();

    docweave(dir.path())
        .args(["document", "Foo.cs", "-o", "Out.cs"])
        .args(["--endpoint", &server.uri()])
        .args(["--api-key", "secret", "--deployment", "gpt-4o"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed: 2"));

    assert_eq!(fs::read_to_string(dir.path().join("Out.cs")).unwrap(), SOURCE);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_documented_file_never_calls_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("<summary>x</summary>")))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), DOCUMENTED).unwrap();

    docweave(dir.path())
        .args(["document", "Foo.cs", "-o", "Out.cs", "-q"])
        .args(["--endpoint", &server.uri()])
        .args(["--api-key", "secret", "--deployment", "gpt-4o"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("Out.cs")).unwrap(),
        DOCUMENTED
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_parse_failure_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("<summary>x</summary>")))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Broken.cs"), "class A { void M( }").unwrap();

    docweave(dir.path())
        .args(["document", "Broken.cs", "-o", "Out.cs"])
        .args(["--endpoint", &server.uri()])
        .args(["--api-key", "secret", "--deployment", "gpt-4o"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Parse failure"));

    assert!(!dir.path().join("Out.cs").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backup_keeps_previous_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("<summary>Does things.</summary>")),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), SOURCE).unwrap();
    fs::write(dir.path().join("Out.cs"), "// previous run\n").unwrap();

    docweave(dir.path())
        .args(["document", "Foo.cs", "-o", "Out.cs", "-q", "--backup"])
        .args(["--endpoint", &server.uri()])
        .args(["--api-key", "secret", "--deployment", "gpt-4o"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dir.path().join("Out.cs.bak")).unwrap(),
        "// previous run\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("Out.cs")).unwrap(),
        DOCUMENTED
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fallback_comments_are_not_counted_as_documented() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("Foo.cs"), SOURCE).unwrap();

    docweave(dir.path())
        .args(["document", "Foo.cs", "-o", "Out.cs", "--on-failure", "placeholder"])
        .args(["--endpoint", &server.uri()])
        .args(["--api-key", "secret", "--deployment", "gpt-4o"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Documented: 0"))
        .stderr(predicate::str::contains("Fallback comments: 2"))
        .stderr(predicate::str::contains("Failed: 2"));

    let output = fs::read_to_string(dir.path().join("Out.cs")).unwrap();
    assert_eq!(
        output.matches("Documentation could not be generated").count(),
        2
    );
}
