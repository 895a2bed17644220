use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use image::{GenericImage, RgbaImage};
use tracing::{info, warn};

use crate::cache::DiskCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{FailurePolicy, TileFetcher};
use crate::partition::partitions;
use crate::region::TileRegion;
use crate::source::HttpSource;

/// Fetches and stitches all tiles described by `cfg`, returning the paths
/// of the saved canvases.
///
/// Tiles are prefetched concurrently into the disk cache first, then
/// pasted partition by partition; interrupting the run at any point
/// leaves the cache valid, and re-running with the same parameters picks
/// up where it left off.
pub async fn stitch(cfg: Config) -> Result<Vec<PathBuf>> {
    let region = cfg.tile_region()?;
    info!(
        zoom = region.zoom(),
        columns = region.columns(),
        rows = region.rows(),
        tiles = region.count(),
        "planned tile region"
    );

    let cache = Arc::new(DiskCache::new(cfg.cache_dir.clone())?);
    let source = Arc::new(HttpSource::new(
        cfg.url.clone(),
        &cfg.user_agent,
        cfg.timeout,
        cfg.request_retries,
    )?);
    let fetcher = TileFetcher::new(cache, source);

    let report = fetcher
        .fetch_region(&region, cfg.fetch_rate, cfg.on_failure)
        .await?;
    info!(
        downloaded = report.downloaded,
        cache_hits = report.cache_hits,
        failed = report.failed.len(),
        "tile fetch complete"
    );

    assemble(&region, &fetcher, &cfg).await
}

/// Assembles the region into one canvas per partition and saves them
/// under the configured output directory.
///
/// Each partition's canvas is `columns * tile_size` by
/// `rows * tile_size` pixels, zero-initialized; tiles that cannot be
/// fetched or decoded leave their block transparent-black when the
/// failure policy allows skipping. Every canvas is encoded and written
/// exactly once.
pub async fn assemble(
    region: &TileRegion,
    fetcher: &TileFetcher,
    cfg: &Config,
) -> Result<Vec<PathBuf>> {
    if cfg.tile_size == 0 {
        return Err(Error::InvalidInput(
            "tile size must be at least 1 pixel".into(),
        ));
    }

    let parts = partitions(region, cfg.partition)?;

    fs::create_dir_all(&cfg.output_dir).map_err(|err| Error::io(&cfg.output_dir, err))?;

    let tile_size = cfg.tile_size;
    let mut saved = Vec::with_capacity(parts.len());

    for part in parts {
        let mut canvas = RgbaImage::new(
            (part.columns * tile_size) as u32,
            (part.rows * tile_size) as u32,
        );
        let mut painted = 0usize;

        for col in 0..part.columns {
            for row in 0..part.rows {
                let tile = region.tile_at(part.col_offset + col, part.row_offset + row);

                let bytes = match fetcher.fetch(&tile).await {
                    Ok(fetched) => fetched.bytes,
                    Err(err @ (Error::InvalidInput(_) | Error::Io { .. })) => return Err(err),
                    Err(err) => match cfg.on_failure {
                        FailurePolicy::Abort => return Err(err),
                        FailurePolicy::Skip => {
                            warn!(
                                zoom = tile.z,
                                x = tile.x,
                                y = tile.y,
                                error = %err,
                                "tile unavailable, leaving block blank"
                            );
                            continue;
                        }
                    },
                };

                // a decode failure means corrupt bytes in the cache, not
                // server trouble, so it is logged distinctly
                let paste = image::load_from_memory(&bytes)
                    .map(|img| img.to_rgba8())
                    .and_then(|decoded| {
                        canvas
                            .copy_from(&decoded, (col * tile_size) as u32, (row * tile_size) as u32)
                    });

                match paste {
                    Ok(()) => painted += 1,
                    Err(err) => {
                        let err = Error::Decode { tile, source: err };
                        match cfg.on_failure {
                            FailurePolicy::Abort => return Err(err),
                            FailurePolicy::Skip => {
                                warn!(
                                    zoom = tile.z,
                                    x = tile.x,
                                    y = tile.y,
                                    error = %err,
                                    "corrupt tile bytes, leaving block blank"
                                );
                                continue;
                            }
                        }
                    }
                }
            }
        }

        if painted == 0 && cfg.skip_empty {
            info!(
                file = part.file_name(),
                "all tiles missing, skipping empty partition"
            );
            continue;
        }

        let path = cfg.output_dir.join(part.file_name());
        canvas
            .save(&path)
            .map_err(|err| Error::io(&path, io::Error::new(io::ErrorKind::Other, err)))?;

        info!(file = %path.display(), tiles = painted, "saved stitched canvas");
        saved.push(path);
    }

    Ok(saved)
}
