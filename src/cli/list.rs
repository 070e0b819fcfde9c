//! List command.

use std::io::{self, Write};

use clap::Args;

use crate::cli::{output, Context, OutputFormat};
use crate::core::constants;
use crate::core::domain::RemoteObject;
use crate::core::filter::PathFilter;
use crate::core::listing::list_objects;
use crate::core::pipeline::is_encrypted;
use crate::core::remote::Remote;
use crate::error::Result;

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Paths in the bucket to list (default: the bucket root)
    pub paths: Vec<String>,

    /// List everything below the paths
    #[arg(short, long)]
    pub recursive: bool,

    /// Show size, last modified time and fingerprint
    #[arg(short, long)]
    pub long: bool,

    /// Regular expression keys must also match
    #[arg(short, long, default_value = constants::DEFAULT_FILTER)]
    pub filter: String,
}

/// List the keys under each path.
pub async fn execute(ctx: &Context, args: ListArgs) -> Result<()> {
    ctx.store.require_bucket()?;
    let filters = filters(&args)?;
    let remote = Remote::connect(&ctx.store).await?;

    let listed = run(&remote, &filters).await?;
    match ctx.format {
        OutputFormat::Json => output::json(&listed)?,
        OutputFormat::Text => {
            write_objects(&mut std::io::stdout().lock(), &listed, args.long, &ctx.suffix)?
        }
    }
    Ok(())
}

/// One filter per path; the bucket root when no path is given.
pub fn filters(args: &ListArgs) -> Result<Vec<PathFilter>> {
    let paths: Vec<&str> = if args.paths.is_empty() {
        vec![""]
    } else {
        args.paths.iter().map(String::as_str).collect()
    };
    let filters = paths
        .into_iter()
        .map(|p| PathFilter::new(p, args.recursive, &args.filter))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(filters)
}

/// Objects accepted by each filter, in filter order.
pub async fn run(remote: &Remote, filters: &[PathFilter]) -> Result<Vec<RemoteObject>> {
    let mut listed = Vec::new();
    for filter in filters {
        let objects = list_objects(remote.store.as_ref(), filter.prefix()).await?;
        listed.extend(objects.into_iter().filter(|o| filter.matches(&o.key)));
    }
    Ok(listed)
}

pub fn write_objects(
    out: &mut impl Write,
    objects: &[RemoteObject],
    long: bool,
    suffix: &str,
) -> io::Result<()> {
    if objects.is_empty() {
        return writeln!(out, "{}", output::dim("no files found"));
    }

    for object in objects {
        let name = output::key(
            &object.key,
            is_encrypted(&object.key, suffix),
            object.is_directory_marker,
        );
        if long {
            let modified = object
                .last_modified
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            writeln!(
                out,
                "{:>10}  {:<16}  {:<34}  {}",
                object.size, modified, object.fingerprint, name
            )?;
        } else {
            writeln!(out, "{}", name)?;
        }
    }

    if long {
        writeln!(out, "total: {}", objects.len())?;
    }
    Ok(())
}
