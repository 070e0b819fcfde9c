//! Argument validation and error reporting.

use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.run(&["--help"]);
    assert_success(&output);
    let out = stdout(&output);
    for command in ["get", "ls", "cat", "put", "rm", "kms", "completions"] {
        assert!(out.contains(command), "help is missing {}: {}", command, out);
    }
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.run(&["--version"]);
    assert_success(&output);
    assert!(stdout(&output).contains("s3secrets"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();
    assert_failure(&t.run(&["unknown-command"]));
}

#[test]
fn test_get_without_bucket() {
    let t = Test::new();

    let output = t.run(&["get", "/app"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "you have not specified a s3 bucket name");
    assert_stderr_contains(&output, "AWS_S3_BUCKET");
}

#[test]
fn test_bucket_from_env() {
    let t = Test::new();

    // the bucket check passes, so the bad filter is what gets reported
    let output = t
        .cmd()
        .env("AWS_S3_BUCKET", "platform")
        .args(["get", "--filter", "(["])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "filter: ([ is invalid");
}

#[test]
fn test_invalid_filter_rejected_before_any_listing() {
    let t = Test::new();

    let output = t.run(&["get", "--bucket", "platform", "-r", "--filter", "*.pem", "/"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "is invalid");
    assert!(!t.dir.path().join("secrets").exists());
}

#[test]
fn test_invalid_sync_interval() {
    let t = Test::new();

    let output = t.run(&["get", "--bucket", "b", "--sync", "--sync-interval", "never"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid interval: never");
}

#[test]
fn test_zero_sync_interval() {
    let t = Test::new();

    let output = t.run(&["get", "--bucket", "b", "--sync-interval", "0s"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid interval");
}

#[test]
fn test_invalid_perms() {
    let t = Test::new();

    let output = t.run(&["get", "--bucket", "b", "--perms", "rw-------"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid file mode");
}

#[test]
fn test_empty_suffix_rejected() {
    let t = Test::new();

    let output = t.run(&["ls", "--bucket", "b", "--suffix", ""]);
    assert_failure(&output);
    assert_stderr_contains(&output, "suffix must not be empty");
}

#[test]
fn test_put_requires_kms_key() {
    let t = Test::new();
    t.write("db.yaml", "password: hunter2");

    let output = t.run(&["put", "--bucket", "b", "db.yaml"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "kms id");
    assert_stderr_contains(&output, "AWS_KMS_ID");
}

#[test]
fn test_kms_encrypt_requires_kms_key() {
    let t = Test::new();
    let file = t.write("db.yaml", "password: hunter2");

    let output = t.run(&["kms", "encrypt", "db.yaml"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "kms id");
    assert!(file.exists(), "the source must be left alone");
}

#[test]
fn test_kms_requires_files() {
    let t = Test::new();
    assert_failure(&t.run(&["kms", "encrypt", "-k", "alias/x"]));
    assert_failure(&t.run(&["kms", "decrypt"]));
}

#[test]
fn test_put_path_and_flatten_conflict() {
    let t = Test::new();
    t.write("db.yaml", "x");

    let output = t.run(&[
        "put", "--bucket", "b", "--kms", "alias/x", "--path", "app", "--flatten", "db.yaml",
    ]);
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot be used with");
}

#[test]
fn test_put_missing_file() {
    let t = Test::new();

    let output = t.run(&["put", "--bucket", "b", "--kms", "alias/x", "missing.yaml"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "io error");
}

#[test]
fn test_cat_and_rm_require_keys() {
    let t = Test::new();
    assert_failure(&t.run(&["cat", "--bucket", "b"]));
    assert_failure(&t.run(&["rm", "--bucket", "b"]));
}

#[test]
fn test_missing_bucket_exit_code() {
    use predicates::prelude::*;

    let t = Test::new();
    t.cmd()
        .args(["ls", "/"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("s3 bucket name"));
}

#[test]
fn test_get_help_shows_defaults() {
    use predicates::prelude::*;

    let t = Test::new();
    t.cmd()
        .args(["get", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sync-interval"))
        .stdout(predicate::str::contains("--flatten"))
        .stdout(predicate::str::contains("[default: .*]"));
}
