use assert_cmd::Command;
use httpmock::{Method::GET, MockServer};
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn temp_output() -> PathBuf {
    std::env::temp_dir().join(format!("cotacao-cli-{}.txt", uuid::Uuid::new_v4()))
}

fn client_cmd(service_url: &str, output: &Path) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("cotacao-client")?;
    cmd.env("COTACAO_SERVICE_URL", service_url)
        .env("COTACAO_OUTPUT_PATH", output)
        .arg("--log-level")
        .arg("info");
    Ok(cmd)
}

#[test]
fn writes_file_and_exits_zero() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/cotacao");
        then.status(200).json_body(serde_json::json!({"bid": "5.43"}));
    });
    let out = temp_output();
    client_cmd(&server.url("/cotacao"), &out)?
        .assert()
        .success()
        .stderr(predicate::str::contains("successfully saved"));
    assert_eq!(std::fs::read_to_string(&out)?, "Dollar: 5.43");
    let _ = std::fs::remove_file(out);
    Ok(())
}

#[test]
fn service_error_exits_non_zero_without_file() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/cotacao");
        then.status(500).body("error saving exchange rate to database");
    });
    let out = temp_output();
    client_cmd(&server.url("/cotacao"), &out)?
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("status 500"));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn invalid_service_url_is_rejected() -> anyhow::Result<()> {
    let out = temp_output();
    client_cmd("not a url", &out)?
        .assert()
        .failure()
        .stderr(predicate::str::contains("COTACAO_SERVICE_URL"));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn version_flag_prints_and_exits() -> anyhow::Result<()> {
    Command::cargo_bin("cotacao-client")?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}
