use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::{prelude::*, stream};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use crate::cache::TileCache;
use crate::error::{Error, Result};
use crate::region::TileRegion;
use crate::source::TileSource;
use crate::tile::Tile;

/// What to do when a single tile cannot be fetched or decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Log the failure, leave the tile's canvas block blank and continue.
    /// The safer choice for large regions, where one missing tile should
    /// not discard everything else already downloaded.
    Skip,

    /// Fail the whole run on the first per-tile error.
    Abort,
}

impl std::str::FromStr for FailurePolicy {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "abort" => Ok(FailurePolicy::Abort),
            _ => Err("expected `skip` or `abort`"),
        }
    }
}

/// Bytes for one tile, plus whether they came from the local cache.
#[derive(Debug)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub cache_hit: bool,
}

/// Outcome of a region prefetch.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub downloaded: usize,
    pub cache_hits: usize,
    pub failed: Vec<Tile>,
}

/// Cache-through tile fetcher.
///
/// Both collaborators sit behind traits so the backend combination
/// (disk + HTTP in production, in-memory + mock in tests) is swappable.
pub struct TileFetcher {
    cache: Arc<dyn TileCache>,
    source: Arc<dyn TileSource>,
}

impl TileFetcher {
    pub fn new(cache: Arc<dyn TileCache>, source: Arc<dyn TileSource>) -> Self {
        Self { cache, source }
    }

    /// Returns the bytes for a tile, fetching and persisting them on a
    /// cache miss.
    ///
    /// A cache hit performs no network access, so re-running after a
    /// partial failure is free for tiles that already made it to disk.
    pub async fn fetch(&self, tile: &Tile) -> Result<Fetched> {
        if let Some(bytes) = self.cache.get(tile)? {
            return Ok(Fetched {
                bytes,
                cache_hit: true,
            });
        }

        let bytes = self.source.fetch(tile).await?;
        self.cache.put(tile, &bytes)?;

        Ok(Fetched {
            bytes,
            cache_hit: false,
        })
    }

    /// Prefetches every tile of the region into the cache, running at most
    /// `rate` requests concurrently.
    ///
    /// Tile order within the run is unspecified; correctness does not
    /// depend on it since every tile lands at its own cache key.
    pub async fn fetch_region(
        &self,
        region: &TileRegion,
        rate: usize,
        on_failure: FailurePolicy,
    ) -> Result<FetchReport> {
        let pb = ProgressBar::new(region.count() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );

        let downloaded = AtomicUsize::new(0);
        let cache_hits = AtomicUsize::new(0);
        let failed = Mutex::new(Vec::new());

        let result = stream::iter(region.tiles().map(Ok::<_, Error>))
            .try_for_each_concurrent(rate, |tile| {
                let pb = &pb;
                let downloaded = &downloaded;
                let cache_hits = &cache_hits;
                let failed = &failed;

                async move {
                    match self.fetch(&tile).await {
                        Ok(fetched) if fetched.cache_hit => {
                            cache_hits.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(_) => {
                            downloaded.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(err) => match on_failure {
                            FailurePolicy::Abort => return Err(err),
                            FailurePolicy::Skip => {
                                warn!(
                                    zoom = tile.z,
                                    x = tile.x,
                                    y = tile.y,
                                    error = %err,
                                    "skipping tile"
                                );
                                failed.lock().unwrap().push(tile);
                            }
                        },
                    }

                    pb.inc(1);
                    Ok(())
                }
            })
            .await;

        pb.finish_and_clear();
        result?;

        Ok(FetchReport {
            downloaded: downloaded.into_inner(),
            cache_hits: cache_hits.into_inner(),
            failed: failed.into_inner().unwrap(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    use async_trait::async_trait;

    struct CountingSource {
        requests: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TileSource for CountingSource {
        async fn fetch(&self, tile: &Tile) -> Result<Vec<u8>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}/{}/{}", tile.z, tile.x, tile.y).into_bytes())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TileSource for FailingSource {
        async fn fetch(&self, tile: &Tile) -> Result<Vec<u8>> {
            Err(Error::fetch(*tile, "tile server unreachable"))
        }
    }

    #[tokio::test]
    async fn cached_tile_is_not_refetched() {
        let source = Arc::new(CountingSource::new());
        let fetcher = TileFetcher::new(Arc::new(MemoryCache::new()), source.clone());
        let tile = Tile::new(33491, 53582, 17);

        let first = fetcher.fetch(&tile).await.unwrap();
        let second = fetcher.fetch(&tile).await.unwrap();

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(second.bytes, first.bytes);
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_region_counts_hits_and_downloads() {
        let cache = Arc::new(MemoryCache::new());
        let source = Arc::new(CountingSource::new());
        let region = TileRegion::new(10, 4, 5, 8, 9).unwrap();

        cache.put(&Tile::new(4, 8, 10), b"already here").unwrap();

        let fetcher = TileFetcher::new(cache, source.clone());
        let report = fetcher
            .fetch_region(&region, 4, FailurePolicy::Abort)
            .await
            .unwrap();

        assert_eq!(report.cache_hits, 1);
        assert_eq!(report.downloaded, 3);
        assert!(report.failed.is_empty());
        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn skip_policy_records_failures_and_continues() {
        let fetcher = TileFetcher::new(Arc::new(MemoryCache::new()), Arc::new(FailingSource));
        let region = TileRegion::new(10, 4, 5, 8, 9).unwrap();

        let report = fetcher
            .fetch_region(&region, 2, FailurePolicy::Skip)
            .await
            .unwrap();

        assert_eq!(report.downloaded, 0);
        assert_eq!(report.failed.len(), region.count());
    }

    #[tokio::test]
    async fn abort_policy_fails_fast() {
        let fetcher = TileFetcher::new(Arc::new(MemoryCache::new()), Arc::new(FailingSource));
        let region = TileRegion::new(10, 4, 5, 8, 9).unwrap();

        let result = fetcher.fetch_region(&region, 2, FailurePolicy::Abort).await;

        assert!(matches!(result, Err(Error::TileFetch { .. })));
    }
}
