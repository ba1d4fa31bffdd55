#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// 呼び出し元の設定ファイルと環境変数から切り離したコマンド
fn ecrship(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ecrship").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("NO_COLOR", "1")
        .env_remove("ECRSHIP_CONFIG")
        .env_remove("ECRSHIP_REGION")
        .env_remove("ECRSHIP_APP")
        .env_remove("ECRSHIP_TAG")
        .env_remove("ECRSHIP_ACCOUNT_ID")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Amazon ECR"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("uri"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ecrship"));
}

#[test]
fn test_publish_help_mentions_confirmation() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .args(["publish", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"))
        .stdout(predicate::str::contains("--keep-going"))
        .stdout(predicate::str::contains("--sudo"));
}

#[test]
fn test_plan_with_account_id() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .args(["plan", "--account-id", "123456789012"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "123456789012.dkr.ecr.ap-southeast-1.amazonaws.com/next-bedrock-app:latest",
        ))
        .stdout(predicate::str::contains("docker system prune --all --force"))
        .stdout(predicate::str::contains("docker build -t next-bedrock-app:latest"))
        .stdout(predicate::str::contains("(password on stdin)"))
        .stdout(predicate::str::contains("<image-id>"))
        .stdout(predicate::str::contains("get-caller-identity").not());
}

#[test]
fn test_plan_without_account_uses_placeholder() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .args(["plan", "--no-prune", "--sudo", "-a", "shop", "-t", "v2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aws sts get-caller-identity"))
        .stdout(predicate::str::contains(
            "<account-id>.dkr.ecr.ap-southeast-1.amazonaws.com/shop:v2",
        ))
        .stdout(predicate::str::contains("sudo docker build -t shop:v2"))
        .stdout(predicate::str::contains("system prune").not());
}

#[test]
fn test_plan_reads_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ecrship.yaml"),
        "region: eu-west-1\napp_name: billing\ntag: \"2024.1\"\n",
    )
    .unwrap();

    ecrship(&dir)
        .args(["plan", "--account-id", "123456789012"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ecrship.yaml"))
        .stdout(predicate::str::contains(
            "123456789012.dkr.ecr.eu-west-1.amazonaws.com/billing:2024.1",
        ));
}

#[test]
fn test_uri_with_account_id() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .args(["uri", "--account-id", "123456789012", "-r", "us-east-1"])
        .assert()
        .success()
        .stdout("123456789012.dkr.ecr.us-east-1.amazonaws.com/next-bedrock-app:latest\n");
}

/// --yes なしの publish は何も実行せず失敗する
#[test]
fn test_publish_without_yes_fails_without_running() {
    let dir = TempDir::new().unwrap();
    // 何か実行されればエンジンが見つからずビルドで失敗する
    ecrship(&dir)
        .args(["--docker-bin", "ecrship-missing-engine", "--account-id", "123456789012"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"))
        .stderr(predicate::str::contains("--no-prune"))
        .stdout(predicate::str::contains("[1/8]").not());
}

#[test]
fn test_invalid_region_fails() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .args(["plan", "--region", "Not A Region"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_account_id_fails() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .args(["uri", "--account-id", "12345"])
        .assert()
        .failure();
}

#[test]
fn test_unknown_config_key_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ecrship.yaml"), "regoin: us-east-1\n").unwrap();

    ecrship(&dir).arg("plan").assert().failure();
}

#[test]
fn test_invalid_command() {
    let dir = TempDir::new().unwrap();
    ecrship(&dir)
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
