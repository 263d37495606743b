// CLI behaviour through the compiled binary, with file storage in a temp dir

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn onboarding(state_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("member-onboarding").unwrap();
    cmd.current_dir(state_dir)
        .env_remove("NODE_ENV")
        .env_remove("APP_ENV")
        .env_remove("RUST_LOG")
        .env_remove("VERIFICATION_WEBHOOK_SECRET")
        .env("MEMBER_ONBOARDING_AUTH__TOKEN_SECRET", "cli-token-secret")
        .env("MEMBER_ONBOARDING_VERIFICATION__WEBHOOK_SECRET", "cli-webhook-secret")
        .env("MEMBER_ONBOARDING_STORAGE__STATE_DIR", state_dir.join("registrations"));
    cmd
}

fn issue_token(state_dir: &Path, user: &str) -> String {
    let output = onboarding(state_dir)
        .args(["issue-token", "--user", user])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn test_no_subcommand_shows_usage() {
    let dir = TempDir::new().unwrap();
    onboarding(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("member-onboarding status"))
        .stdout(predicate::str::contains("verification-callback"));
}

#[test]
fn test_full_onboarding_through_cli() {
    let dir = TempDir::new().unwrap();
    let token = issue_token(dir.path(), "cli-member");

    onboarding(dir.path())
        .args(["status", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("/register/verification"));

    let payload = dir.path().join("callback.json");
    std::fs::write(
        &payload,
        r#"{"status":"approved","vendorData":"cli-member","id":"sess_cli"}"#,
    )
    .unwrap();
    onboarding(dir.path())
        .args(["verification-callback", "--sign", "--payload"])
        .arg(&payload)
        .assert()
        .success()
        .stdout(predicate::str::contains("verification is now completed"));

    onboarding(dir.path())
        .args(["status", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("/register/payment"));

    onboarding(dir.path())
        .args(["payment-setup", "--dev-bypass", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev_cus_"));

    onboarding(dir.path())
        .args(["complete", "--token", &token])
        .assert()
        .success()
        .stdout(predicate::str::contains("/dashboard"));
}

#[test]
fn test_bad_signature_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let payload = dir.path().join("callback.json");
    std::fs::write(&payload, r#"{"status":"approved","vendorData":"anyone"}"#).unwrap();

    onboarding(dir.path())
        .args(["verification-callback", "--signature", "deadbeef", "--payload"])
        .arg(&payload)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unauthorized (401)"));
}

#[test]
fn test_dev_bypass_refused_in_production() {
    let dir = TempDir::new().unwrap();
    let token = issue_token(dir.path(), "prod-member");

    onboarding(dir.path())
        .args(["status", "--token", &token])
        .assert()
        .success();

    onboarding(dir.path())
        .env("NODE_ENV", "production")
        .args(["payment-setup", "--dev-bypass", "--token", &token])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Forbidden (403)"));
}
