use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Maximum zoom level served by the standard OSM tile pyramid.
pub const MAX_ZOOM: u8 = 19;

/// Web Mercator latitude cutoff. The projection is undefined at the poles,
/// so inputs must stay strictly inside ±this bound.
pub const MAX_LATITUDE: f64 = 85.0511;

/// An OSM slippy-map tile with x, y and z-coordinate.
/// ref: https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Tile {
    pub x: usize,
    pub y: usize,
    pub z: u8,
}

impl Tile {
    pub fn new(x: usize, y: usize, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Projects a WGS84 coordinate (in degrees) onto the tile grid at the
    /// given zoom level.
    ///
    /// Fails with [`Error::InvalidInput`] if the latitude is outside the
    /// Mercator-defined range, the longitude is outside [-180, 180) or the
    /// zoom level exceeds [`MAX_ZOOM`]. Out-of-range coordinates are
    /// rejected, never clamped.
    pub fn from_coords_and_zoom(lat: f64, lon: f64, zoom: u8) -> Result<Self> {
        if zoom > MAX_ZOOM {
            return Err(Error::InvalidInput(format!(
                "zoom level {zoom} is out of range 0..={MAX_ZOOM}"
            )));
        }
        if !lat.is_finite() || lat.abs() >= MAX_LATITUDE {
            return Err(Error::InvalidInput(format!(
                "latitude {lat}° is outside the Mercator range ±{MAX_LATITUDE}°"
            )));
        }
        if !lon.is_finite() || !(-180.0..180.0).contains(&lon) {
            return Err(Error::InvalidInput(format!(
                "longitude {lon}° is outside [-180°, 180°)"
            )));
        }

        // scale factor
        let n = 2_f64.powi(zoom as i32);

        let x = (lon + 180.0) / 360.0 * n;
        let y = (1.0 - lat.to_radians().tan().asinh() / PI) / 2.0 * n;

        Ok(Self::new(x as usize, y as usize, zoom))
    }
}
