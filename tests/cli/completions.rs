//! Shell completion generation.

use crate::support::*;

#[test]
fn test_completions_bash() {
    let t = Test::new();

    let output = t.run(&["completions", "bash"]);
    assert_success(&output);
    assert!(stdout(&output).contains("_s3secrets"));
}

#[test]
fn test_completions_other_shells() {
    let t = Test::new();

    for shell in ["zsh", "fish", "power-shell"] {
        let output = t.run(&["completions", shell]);
        assert_success(&output);
        assert!(
            stdout(&output).contains("s3secrets"),
            "{} completions do not mention the binary",
            shell
        );
    }
}

#[test]
fn test_completions_need_no_bucket_or_config() {
    let t = Test::new();
    t.write("s3secrets.toml", "this is not toml");

    assert_success(&t.run(&["completions", "bash"]));
}

#[test]
fn test_completions_unknown_shell() {
    let t = Test::new();
    assert_failure(&t.run(&["completions", "tcsh"]));
}
