use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use serde_json::{Value, json};

const SIGNUP: &str = include_str!("../../form-spec/tests/fixtures/signup_form.json");

fn formstack() -> Command {
    Command::cargo_bin("formstack").expect("binary")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    dir.child("schema.json").write_str(SIGNUP).expect("schema");
    dir
}

#[test]
fn check_reports_compiled_fields() {
    let dir = workspace();
    let assert = formstack()
        .args(["check", "--schema"])
        .arg(dir.child("schema.json").path())
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Schema OK: 8 of 9 fields compiled"));
}

#[test]
fn strict_check_rejects_duplicate_names() {
    let dir = TempDir::new().expect("tempdir");
    dir.child("dup.json")
        .write_str(
            &json!({
                "fields": [
                    { "id": "a", "name": "x", "type": "text", "label": "A" },
                    { "id": "b", "name": "x", "type": "text", "label": "B" }
                ]
            })
            .to_string(),
        )
        .expect("schema");

    formstack()
        .args(["check", "--schema"])
        .arg(dir.child("dup.json").path())
        .assert()
        .success();
    formstack()
        .args(["check", "--strict", "--schema"])
        .arg(dir.child("dup.json").path())
        .assert()
        .failure();
}

#[test]
fn validate_prints_error_map_and_fails() {
    let dir = workspace();
    dir.child("data.json")
        .write_str(r#"{ "account.username": "ab", "account.email": "nope" }"#)
        .expect("data");

    let assert = formstack()
        .args(["validate", "--visible-only", "--schema"])
        .arg(dir.child("schema.json").path())
        .arg("--data")
        .arg(dir.child("data.json").path())
        .assert()
        .failure();
    let report = stdout_json(assert.get_output());
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"]["account.username"], "Min length is 3");
    assert_eq!(report["errors"]["account.email"], "Invalid email address");
    assert_eq!(report["errors"]["profile.role"], "Required");
}

#[test]
fn validate_single_field_succeeds() {
    let dir = workspace();
    dir.child("data.json")
        .write_str(r#"{ "account.email": "ada@example.com" }"#)
        .expect("data");

    let assert = formstack()
        .args(["validate", "--field", "account.email", "--schema"])
        .arg(dir.child("schema.json").path())
        .arg("--data")
        .arg(dir.child("data.json").path())
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("account.email: valid"));
}

#[test]
fn visibility_reports_rule_hidden_fields() {
    let dir = workspace();
    dir.child("data.json")
        .write_str(r#"{ "profile.role": "other" }"#)
        .expect("data");

    let assert = formstack()
        .args(["visibility", "--schema"])
        .arg(dir.child("schema.json").path())
        .arg("--data")
        .arg(dir.child("data.json").path())
        .assert()
        .success();
    let output = stdout_json(assert.get_output());
    assert_eq!(output["visible"]["f-other-role"], true);
    assert_eq!(output["visible"]["f-internal"], false);
    assert_eq!(output["disabled"], json!([]));
}

#[test]
fn answers_schema_is_printed() {
    let dir = workspace();
    let assert = formstack()
        .args(["answers-schema", "--schema"])
        .arg(dir.child("schema.json").path())
        .assert()
        .success();
    let schema = stdout_json(assert.get_output());
    assert_eq!(schema["type"], "object");
    assert!(schema["properties"]["account.username"].is_object());
}

#[test]
fn model_schema_describes_form_schema() {
    let assert = formstack().arg("model-schema").assert().success();
    let schema = stdout_json(assert.get_output());
    assert!(schema["properties"]["fields"].is_object());
}

#[test]
fn replay_runs_actions_through_controller() {
    let dir = workspace();
    dir.child("events.json")
        .write_str(
            &json!([
                { "type": "submit" },
                { "type": "setFieldValue", "name": "account.username", "value": "ada_l" },
                { "type": "setFieldValue", "name": "account.email", "value": "ada@example.com" },
                { "type": "blur", "name": "account.email" },
                { "type": "submit" }
            ])
            .to_string(),
        )
        .expect("events");
    dir.child("config.json")
        .write_str(r#"{ "mode": "onChange", "skipHiddenFields": true }"#)
        .expect("config");

    let assert = formstack()
        .args(["replay", "--schema"])
        .arg(dir.child("schema.json").path())
        .arg("--events")
        .arg(dir.child("events.json").path())
        .arg("--config")
        .arg(dir.child("config.json").path())
        .assert()
        .success();
    let output = stdout_json(assert.get_output());
    assert_eq!(output["state"]["submitCount"], 2);
    assert_eq!(output["isSubmitted"], true);
    let submissions = output["submissions"].as_array().expect("submissions");
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["account.username"], "ada_l");
    assert_eq!(submissions[0]["profile.role"], "developer");
}
