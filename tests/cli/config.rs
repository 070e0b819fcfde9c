//! Config file loading and precedence.

use crate::support::*;

#[test]
fn test_bucket_from_default_config_file() {
    let t = Test::new();
    t.write("s3secrets.toml", "[store]\nbucket = \"platform\"\n");

    // gets past the bucket check and stops at the filter
    let output = t.run(&["get", "--filter", "(["]);
    assert_failure(&output);
    assert_stderr_contains(&output, "is invalid");
}

#[test]
fn test_explicit_config_file() {
    let t = Test::new();
    t.write("conf/custom.toml", "[store]\nbucket = \"platform\"\n");

    let output = t.run(&["--config", "conf/custom.toml", "get", "--filter", "(["]);
    assert_failure(&output);
    assert_stderr_contains(&output, "is invalid");
}

#[test]
fn test_missing_explicit_config_file() {
    let t = Test::new();

    let output = t.run(&["--config", "nope.toml", "ls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to read config file");
}

#[test]
fn test_unknown_config_key() {
    let t = Test::new();
    t.write("s3secrets.toml", "[store]\nbukket = \"typo\"\n");

    let output = t.run(&["ls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config file");
}

#[test]
fn test_invalid_interval_in_config() {
    let t = Test::new();
    t.write("s3secrets.toml", "[sync]\ninterval = \"0\"\n");

    let output = t.run(&["get", "--bucket", "b"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid interval");
}

#[test]
fn test_flag_overrides_config_mode() {
    let t = Test::new();
    t.write("s3secrets.toml", "[sync]\nfile_mode = \"0640\"\n");

    // an invalid flag value wins over the valid file value
    let output = t.run(&["get", "--bucket", "b", "--perms", "9"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid file mode: 9");
}
