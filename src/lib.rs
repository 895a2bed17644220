//! Download OpenStreetMap-tiles and stitch them into composite images.
//!
//! **Use with absolute caution.** Downloading tiles en-masse can hog
//! down a tile server easily. I am not responsible for any damage this
//! tool may cause.
//!
//! Given a geographic bounding box (or a center point and a window of
//! tiles) and a zoom level, this crate computes the covering rectangle of
//! slippy-map tiles, downloads each tile exactly once into a local cache,
//! and pastes the tiles into one or more output canvases — a single
//! mosaic, fixed-size chunks or four quadrants.
//!
//! # CLI Example
//!
//! ```bash
//! osm-tile-stitcher \
//!   --north 31.17015 \
//!   --east -87.969942 \
//!   --south 31.133495 \
//!   --west -88.01396 \
//!   --zoom 17 \
//!   --mode single \
//!   --output ./stitched
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use osm_tile_stitcher::{
//!     stitch, BoundingBox, Config, FailurePolicy, PartitionPolicy, RegionSpec, UrlFormat,
//! };
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let config = Config {
//!     region: RegionSpec::BoundingBox(
//!         BoundingBox::new(50.811, 6.1649, 50.7492, 6.031).unwrap(),
//!     ),
//!     zoom: 17,
//!     tile_size: 256,
//!     partition: PartitionPolicy::Quadrant,
//!     cache_dir: "./tiles".into(),
//!     output_dir: "./stitched".into(),
//!     url: UrlFormat::default(),
//!     user_agent: "my-stitcher/1.0 (me@example.org)".into(),
//!     on_failure: FailurePolicy::Skip,
//!     fetch_rate: 5,
//!     request_retries: 3,
//!     timeout: Duration::from_secs(30),
//!     skip_empty: false,
//! };
//!
//! let saved = stitch(config).await.expect("failed stitching tiles");
//! println!("wrote {} canvases", saved.len());
//! # }
//! ```

mod bounding_box;
mod cache;
mod config;
mod error;
mod fetch;
mod partition;
mod region;
mod source;
mod stitch;
mod tile;
mod url;

pub use bounding_box::{BoundingBox, Fixture};
pub use cache::{DiskCache, MemoryCache, TileCache};
pub use config::{Config, RegionSpec, DEFAULT_TILE_SIZE};
pub use error::{Error, Result};
pub use fetch::{FailurePolicy, FetchReport, Fetched, TileFetcher};
pub use partition::{partitions, Partition, PartitionPolicy};
pub use region::TileRegion;
pub use source::{HttpSource, TileSource};
pub use stitch::{assemble, stitch};
pub use tile::{Tile, MAX_LATITUDE, MAX_ZOOM};
pub use url::{UrlFormat, DEFAULT_TILE_URL};
