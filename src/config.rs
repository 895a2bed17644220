use std::{path::PathBuf, time::Duration};

use crate::bounding_box::BoundingBox;
use crate::error::Result;
use crate::fetch::FailurePolicy;
use crate::partition::PartitionPolicy;
use crate::region::TileRegion;
use crate::url::UrlFormat;

/// Standard slippy-map tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: usize = 256;

/// The geographic area a run covers.
#[derive(Clone, Debug, PartialEq)]
pub enum RegionSpec {
    /// Cover a bounding box.
    BoundingBox(BoundingBox),

    /// Cover a square window of `window` tiles per side centered on a
    /// point.
    Centered {
        latitude: f64,
        longitude: f64,
        window: usize,
    },
}

/// Stitching configuration.
///
/// An explicit, immutable value handed into the pipeline; nothing in the
/// library reads process-global state.
#[derive(Debug)]
pub struct Config {
    /// The area to cover.
    pub region: RegionSpec,

    /// The zoom level to fetch and stitch at.
    pub zoom: u8,

    /// Edge length of one source tile in pixels.
    pub tile_size: usize,

    /// How the region is split into output canvases.
    pub partition: PartitionPolicy,

    /// The folder raw tiles are cached in.
    pub cache_dir: PathBuf,

    /// The folder stitched canvases are written to.
    pub output_dir: PathBuf,

    /// The URL to download individual tiles from, including the
    /// replacement specifiers `{x}`, `{y}` and `{z}`.
    pub url: UrlFormat,

    /// Identifying `User-Agent` string, mandatory under the usage policy
    /// of the public tile servers.
    pub user_agent: String,

    /// Whether a failed tile skips ahead or aborts the run.
    pub on_failure: FailurePolicy,

    /// Maximum number of parallel downloads.
    pub fetch_rate: usize,

    /// How many times to retry a failed HTTP request.
    pub request_retries: u8,

    /// Timeout for fetching a single tile.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Skip saving partitions whose every tile is missing.
    pub skip_empty: bool,
}

impl Config {
    /// Resolves the configured region spec into the tile rectangle for
    /// this run, validating all geographic inputs up front.
    pub fn tile_region(&self) -> Result<TileRegion> {
        match &self.region {
            RegionSpec::BoundingBox(bbox) => TileRegion::from_bounding_box(bbox, self.zoom),
            RegionSpec::Centered {
                latitude,
                longitude,
                window,
            } => TileRegion::centered_on(*latitude, *longitude, self.zoom, *window),
        }
    }
}
