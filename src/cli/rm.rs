//! Remove command.

use tracing::{info, warn};

use crate::cli::{output, Context};
use crate::core::filter::normalize_prefix;
use crate::core::remote::Remote;
use crate::core::store::ObjectStore;
use crate::error::{RemoteError, Result};

/// Delete each key from the bucket.
pub async fn execute(ctx: &Context, keys: &[String]) -> Result<()> {
    ctx.store.require_bucket()?;
    let remote = Remote::connect(&ctx.store).await?;
    run(&remote, keys).await.map(|_| ())
}

/// Delete every key, carrying on past failures. Returns the keys deleted,
/// or an error counting the failures once every key has been tried.
pub async fn run(remote: &Remote, keys: &[String]) -> Result<Vec<String>> {
    let mut deleted = Vec::new();
    let mut failed = 0;

    for key in keys {
        let key = normalize_prefix(key);
        if key.is_empty() {
            output::warn("refusing to delete the bucket root");
            continue;
        }

        match remote.store.delete(&key).await {
            Ok(()) => {
                info!(action = "rm", bucket = %remote.store.bucket(), key = %key, "deleted the file");
                output::success(&format!("deleted {}", output::path(&key)));
                deleted.push(key);
            }
            Err(e) => {
                warn!(action = "rm", bucket = %remote.store.bucket(), key = %key, error = %e, "failed to delete key");
                output::error(&format!("failed to delete {}: {}", key, e));
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(RemoteError::new(format!(
            "failed to delete {} of {} keys",
            failed,
            deleted.len() + failed
        ))
        .into());
    }
    Ok(deleted)
}
