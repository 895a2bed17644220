use std::fmt::Debug;

use crate::bounding_box::BoundingBox;
use crate::error::{Error, Result};
use crate::tile::{Tile, MAX_ZOOM};

/// A rectangle of tile coordinates at a fixed zoom level, inclusive on all
/// four bounds.
///
/// Tile y grows *southward*, so the region's `y_min` corresponds to its
/// northern edge. Constructors uphold `x_min <= x_max`, `y_min <= y_max`
/// and keep all coordinates inside the `2^zoom` grid; a single-row or
/// single-column region is legal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileRegion {
    zoom: u8,
    x_min: usize,
    x_max: usize,
    y_min: usize,
    y_max: usize,
}

impl TileRegion {
    pub fn new(zoom: u8, x_min: usize, x_max: usize, y_min: usize, y_max: usize) -> Result<Self> {
        if zoom > MAX_ZOOM {
            return Err(Error::InvalidInput(format!(
                "zoom level {zoom} is out of range 0..={MAX_ZOOM}"
            )));
        }
        if x_min > x_max || y_min > y_max {
            return Err(Error::InvalidInput(format!(
                "empty tile region: x {x_min}..={x_max}, y {y_min}..={y_max}"
            )));
        }

        let n = 1usize << zoom;
        if x_max >= n || y_max >= n {
            return Err(Error::InvalidInput(format!(
                "tile region x {x_min}..={x_max}, y {y_min}..={y_max} exceeds the \
                 {n}x{n} grid at zoom {zoom}"
            )));
        }

        Ok(Self {
            zoom,
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// Computes the rectangle of tiles covering a geographic bounding box.
    ///
    /// The north-west corner projects to `(x_min, y_min)` and the
    /// south-east corner to `(x_max, y_max)`: the vertical tile axis is
    /// inverted with respect to latitude.
    pub fn from_bounding_box(bbox: &BoundingBox, zoom: u8) -> Result<Self> {
        let nw = Tile::from_coords_and_zoom(bbox.north, bbox.west, zoom)?;
        let se = Tile::from_coords_and_zoom(bbox.south, bbox.east, zoom)?;

        Self::new(zoom, nw.x, se.x, nw.y, se.y)
    }

    /// Computes a square window of tiles centered on a point.
    ///
    /// The window spans `x in [cx - window/2, cx + window/2 - 1]` (integer
    /// division, symmetric for y), so an odd `window` rounds down to an
    /// even span with the center tile top/left-biased.
    pub fn centered_on(lat: f64, lon: f64, zoom: u8, window: usize) -> Result<Self> {
        if window < 2 {
            return Err(Error::InvalidInput(format!(
                "centered window must span at least 2 tiles per side, got {window}"
            )));
        }

        let center = Tile::from_coords_and_zoom(lat, lon, zoom)?;
        let half = window / 2;

        let (x_min, y_min) = center
            .x
            .checked_sub(half)
            .zip(center.y.checked_sub(half))
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "centered window of {window} tiles extends past the edge of the tile grid"
                ))
            })?;

        Self::new(zoom, x_min, center.x + half - 1, y_min, center.y + half - 1)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn x_min(&self) -> usize {
        self.x_min
    }

    pub fn x_max(&self) -> usize {
        self.x_max
    }

    pub fn y_min(&self) -> usize {
        self.y_min
    }

    pub fn y_max(&self) -> usize {
        self.y_max
    }

    pub fn columns(&self) -> usize {
        self.x_max - self.x_min + 1
    }

    pub fn rows(&self) -> usize {
        self.y_max - self.y_min + 1
    }

    pub fn count(&self) -> usize {
        self.columns() * self.rows()
    }

    /// Creates an iterator over all tiles in the region, column by column.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + Debug {
        let Self {
            zoom,
            x_min,
            x_max,
            y_min,
            y_max,
        } = *self;

        (x_min..=x_max).flat_map(move |x| (y_min..=y_max).map(move |y| Tile::new(x, y, zoom)))
    }

    /// Maps a region-local (column, row) offset to the global tile
    /// coordinate.
    pub fn tile_at(&self, col: usize, row: usize) -> Tile {
        debug_assert!(col < self.columns() && row < self.rows());

        Tile::new(self.x_min + col, self.y_min + row, self.zoom)
    }
}
