mod args;
mod validators;

use anyhow::Result;
use args::Args;
use osm_tile_stitcher::{stitch, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse()?;
    let dry_run = args.dry_run;
    let config: Config = args.into();

    if dry_run {
        let tile_count = config.tile_region()?.count();

        eprintln!(
            "would fetch {} tiles (approx {}, assuming 10 kb per tile)",
            tile_count,
            pretty_bytes::converter::convert((tile_count as f64) * 10_000f64)
        );

        Ok(())
    } else {
        let saved = stitch(config).await?;
        eprintln!("saved {} stitched image(s)", saved.len());

        Ok(())
    }
}
