#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

mod common;

use assert_cmd::Command;
use common::{API_KEY, CLOUDFLARE_VARS, TOKEN, TestProject};
use predicates::prelude::*;

/// CLOUDFLARE_* を全て取り除いたコマンド
fn flareform() -> Command {
    let mut cmd = Command::cargo_bin("flareform").unwrap();
    for var in CLOUDFLARE_VARS {
        cmd.env_remove(var);
    }
    cmd.env_remove("FLAREFORM_TOOL_VERSION").env("NO_COLOR", "1");
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    flareform()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloudflare プロバイダー設定"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("docs"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    flareform()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flareform"));
}

/// checkコマンドのヘルプが正しく表示されることを確認
#[test]
fn test_check_help() {
    flareform()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--tool-version"))
        .stdout(predicate::str::contains("--json"));
}

/// 環境変数のトークンで check が成功することを確認
#[test]
fn test_check_with_env_token() {
    flareform()
        .env("CLOUDFLARE_API_TOKEN", TOKEN)
        .args(["check", "--tool-version", "1.5.7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api_token"))
        .stdout(predicate::str::contains("https://api.cloudflare.com/client/v4"))
        .stdout(predicate::str::contains("terraform/1.5.7"))
        .stdout(predicate::str::contains(TOKEN).not());
}

/// JSON 出力に解決済みの値が含まれることを確認
#[test]
fn test_check_json_output() {
    let output = flareform()
        .env("CLOUDFLARE_API_TOKEN", TOKEN)
        .env("CLOUDFLARE_RETRIES", "5")
        .args(["check", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["credential_mode"], "api_token");
    assert_eq!(summary["retries"], 5);
    assert_eq!(summary["rps"], 4);
    assert!(summary["account_id"].is_null());
    assert!(summary["user_agent"].as_str().unwrap().starts_with("terraform/unknown "));
}

/// email 無しの api_key で check が失敗することを確認
#[test]
fn test_check_api_key_without_email_fails() {
    flareform()
        .env("CLOUDFLARE_API_KEY", API_KEY)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"email\" is not set correctly"));
}

/// 認証情報が無い場合に check が失敗することを確認
#[test]
fn test_check_without_credentials_fails() {
    flareform()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must provide exactly one of"));
}

/// 大きすぎる値が拒否されることを確認
#[test]
fn test_check_rejects_too_large_retries() {
    flareform()
        .env("CLOUDFLARE_API_TOKEN", TOKEN)
        .env("CLOUDFLARE_RETRIES", "65")
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("retries value of 65 is too large"));
}

/// 設定ファイルを読み込めることを確認
#[test]
fn test_check_with_config_file() {
    let project = TestProject::new();
    let path = project.write(
        "provider.json",
        &format!(r#"{{"api_token": "{}", "account_id": "acct123", "rps": 8}}"#, TOKEN),
    );

    flareform()
        .arg("check")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("acct123"))
        .stdout(predicate::str::contains("8"));
}

/// 未対応の拡張子はエラーになることを確認
#[test]
fn test_check_with_unsupported_file() {
    let project = TestProject::new();
    let path = project.write("provider.toml", "api_token = \"x\"");

    flareform()
        .arg("check")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure();
}

/// docs に全属性が出力されることを確認
#[test]
fn test_docs_lists_attributes() {
    flareform()
        .arg("docs")
        .assert()
        .success()
        .stdout(predicate::str::contains("`api_token`"))
        .stdout(predicate::str::contains("CLOUDFLARE_API_TOKEN"))
        .stdout(predicate::str::contains("`account_id`"))
        .stdout(predicate::str::contains("Deprecated"));
}

/// docs に属性名を渡すと単一属性のみ出力されることを確認
#[test]
fn test_docs_single_attribute() {
    flareform()
        .args(["docs", "rps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("`rps`"))
        .stdout(predicate::str::contains("CLOUDFLARE_RPS"))
        .stdout(predicate::str::contains("`api_token`").not());

    flareform()
        .args(["docs", "zone_id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown attribute: zone_id"));
}

/// 設定ファイル内の巨大な整数が属性名付きで拒否されることを確認
#[test]
fn test_check_rejects_oversized_file_integer() {
    let project = TestProject::new();
    let path = project.write(
        "provider.json",
        &format!(r#"{{"api_token": "{}", "retries": 99999999999999999999}}"#, TOKEN),
    );

    flareform()
        .arg("check")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("retries value of"))
        .stderr(predicate::str::contains("is too large"));
}
