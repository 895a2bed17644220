use crate::error::{Error, Result};
use crate::tile::MAX_LATITUDE;

/// A geographic bounding box with north, east, south and west boundaries
/// given in degrees.
///
/// # Example
/// ```rust
/// # use osm_tile_stitcher::BoundingBox;
/// let aachen_germany = BoundingBox::new(50.811, 6.1649, 50.7492, 6.031).unwrap();
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub west: f64,
    pub east: f64,
    pub south: f64,
}

impl BoundingBox {
    /// Create a new bounding box from coordinates specified in degrees.
    ///
    /// Latitudes must lie strictly inside the Mercator range ±85.0511°,
    /// longitudes inside [-180°, 180°), and the box must not be inverted
    /// (`north >= south`, `east >= west`). A box whose opposite edges
    /// coincide is legal and resolves to a single tile row or column.
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> Result<Self> {
        for (name, lat) in [("north", north), ("south", south)] {
            if !lat.is_finite() || lat.abs() >= MAX_LATITUDE {
                return Err(Error::InvalidInput(format!(
                    "{name} latitude {lat}° is outside the Mercator range ±{MAX_LATITUDE}°"
                )));
            }
        }
        for (name, lon) in [("east", east), ("west", west)] {
            if !lon.is_finite() || !(-180.0..180.0).contains(&lon) {
                return Err(Error::InvalidInput(format!(
                    "{name} longitude {lon}° is outside [-180°, 180°)"
                )));
            }
        }
        if north < south {
            return Err(Error::InvalidInput(format!(
                "north boundary {north}° lies south of south boundary {south}°"
            )));
        }
        if east < west {
            return Err(Error::InvalidInput(format!(
                "east boundary {east}° lies west of west boundary {west}°"
            )));
        }

        Ok(BoundingBox {
            north,
            east,
            south,
            west,
        })
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        fixture.into()
    }
}

/// A bounding box fixture containing preset coordinates for a known
/// geographic region.
#[derive(Clone, Copy, Debug)]
pub enum Fixture {
    CalvertAlabama,
    AachenGermany,
}

impl std::str::FromStr for Fixture {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        use Fixture::*;

        if s.to_lowercase().starts_with("calvert") {
            return Ok(CalvertAlabama);
        }

        if s.to_lowercase().starts_with("aachen") {
            return Ok(AachenGermany);
        }

        Err("unrecognized fixture")
    }
}

impl std::convert::From<Fixture> for BoundingBox {
    fn from(fixture: Fixture) -> Self {
        use Fixture::*;

        // both presets are known-valid, so the unwraps cannot fire
        match fixture {
            CalvertAlabama => Self::new(31.17015, -87.969942, 31.133495, -88.01396).unwrap(),
            AachenGermany => Self::new(50.811, 6.1649, 50.7492, 6.031).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_box() {
        assert!(BoundingBox::new(31.133495, -87.969942, 31.17015, -88.01396).is_err());
        assert!(BoundingBox::new(31.17015, -88.01396, 31.133495, -87.969942).is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(BoundingBox::new(360.0, 0.0, 0.0, 0.0).is_err());
        assert!(BoundingBox::new(86.0, 0.0, 0.0, 0.0).is_err());
        assert!(BoundingBox::new(10.0, 200.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn degenerate_box_is_legal() {
        assert!(BoundingBox::new(50.811, 6.031, 50.811, 6.031).is_ok());
    }

    #[test]
    fn fixtures_parse() {
        assert!("calvert".parse::<Fixture>().is_ok());
        assert!("aachen-germany".parse::<Fixture>().is_ok());
        assert!("atlantis".parse::<Fixture>().is_err());
    }
}
