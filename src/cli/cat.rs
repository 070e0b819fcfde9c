//! Cat command.

use std::io::Write;

use zeroize::Zeroizing;

use crate::cli::Context;
use crate::core::filter::normalize_prefix;
use crate::core::pipeline;
use crate::core::remote::Remote;
use crate::error::Result;

/// Print each key's content to stdout, decrypting suffixed keys unless
/// `no_decrypt` is set.
pub async fn execute(ctx: &Context, keys: &[String], no_decrypt: bool) -> Result<()> {
    ctx.store.require_bucket()?;
    let remote = Remote::connect(&ctx.store).await?;
    run(ctx, &remote, keys, no_decrypt, &mut std::io::stdout()).await
}

/// Write each key's content to `out`, in argument order.
pub async fn run(
    ctx: &Context,
    remote: &Remote,
    keys: &[String],
    no_decrypt: bool,
    out: &mut impl Write,
) -> Result<()> {
    for key in keys {
        let key = normalize_prefix(key);
        let content = if no_decrypt {
            Zeroizing::new(pipeline::fetch(remote.store.as_ref(), &key).await?)
        } else {
            pipeline::retrieve(remote.store.as_ref(), remote.kms.as_ref(), &key, &ctx.suffix)
                .await?
        };

        out.write_all(&content)?;
        out.flush()?;
    }
    Ok(())
}
