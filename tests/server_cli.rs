use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn version_flag_prints_and_exits() -> anyhow::Result<()> {
    Command::cargo_bin("cotacao-server")?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cotacao-server"));
    Ok(())
}

#[test]
fn bad_listen_addr_fails_before_serving() -> anyhow::Result<()> {
    let db = std::env::temp_dir().join(format!("cotacao-{}.db", uuid::Uuid::new_v4()));
    Command::cargo_bin("cotacao-server")?
        .env("COTACAO_LISTEN_ADDR", "nowhere:eighty")
        .env("COTACAO_DB_PATH", &db)
        .arg("--log-level")
        .arg("warn")
        .assert()
        .failure()
        .stderr(predicate::str::contains("COTACAO_LISTEN_ADDR"));
    assert!(!db.exists());
    Ok(())
}
