use std::path::PathBuf;

use thiserror::Error;

use crate::tile::Tile;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning, fetching or stitching.
///
/// `InvalidInput` and `Io` are fatal; `TileFetch` and `Decode` are
/// per-tile failures that callers may skip over, depending on the
/// configured [`FailurePolicy`](crate::FailurePolicy).
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed parameters, rejected before any network activity.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A single tile could not be fetched from the remote source.
    #[error("failed fetching tile {}/{}/{}: {reason}", .tile.z, .tile.x, .tile.y)]
    TileFetch { tile: Tile, reason: String },

    /// Tile bytes were fetched (or read back from the cache) but are not
    /// a valid image.
    #[error("failed decoding tile {}/{}/{}", .tile.z, .tile.x, .tile.y)]
    Decode {
        tile: Tile,
        #[source]
        source: image::ImageError,
    },

    /// Filesystem access failed.
    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn fetch(tile: Tile, reason: impl Into<String>) -> Self {
        Error::TileFetch {
            tile,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
