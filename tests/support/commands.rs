//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables that would otherwise leak configuration from the host.
const ISOLATED_ENV: &[&str] = &[
    "AWS_S3_BUCKET",
    "AWS_KMS_ID",
    "AWS_DEFAULT_REGION",
    "AWS_PROFILE",
    "S3SECRETS_ENDPOINT",
    "S3SECRETS_OUTPUT_DIR",
    "S3SECRETS_SUFFIX",
    "S3SECRETS_LOG",
];

impl Test {
    /// Create an s3secrets command isolated from the host environment.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("s3secrets").expect("failed to find s3secrets binary");
        for var in ISOLATED_ENV {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run s3secrets with arguments and capture the output.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("failed to run s3secrets")
    }
}
