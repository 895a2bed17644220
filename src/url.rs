use std::{fmt, sync::Mutex};

use maplit::hashmap;
use strfmt::strfmt;

use crate::error::{Error, Result};
use crate::tile::Tile;

const OSM_SERVERS: &[&str] = &["a", "b", "c"];

/// The tile server the original scripts pulled from.
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// A tile URL template with `{x}`, `{y}` and `{z}` replacement specifiers.
///
/// Templates may also contain `{s}`, which rotates through the classic
/// `a`/`b`/`c` OSM subdomains to spread load between mirror servers.
pub struct UrlFormat {
    inc: Mutex<u8>,
    format_str: String,
}

impl UrlFormat {
    pub fn from_string(format_str: String) -> Self {
        Self {
            inc: Mutex::new(0),
            format_str,
        }
    }

    fn get_inc(&self) -> u8 {
        let mut inc = self.inc.lock().unwrap();

        let val = *inc;
        *inc = inc.wrapping_add(1);

        val
    }

    pub fn tile_url(&self, tile: &Tile) -> Result<String> {
        let inc = self.get_inc() as usize;
        let vars = hashmap! {
            "s".to_owned() => OSM_SERVERS[inc % OSM_SERVERS.len()].to_owned(),
            "x".to_owned() => tile.x.to_string(),
            "y".to_owned() => tile.y.to_string(),
            "z".to_owned() => tile.z.to_string(),
        };

        strfmt(&self.format_str, &vars)
            .map_err(|err| Error::InvalidInput(format!("malformed URL template: {err}")))
    }
}

impl Default for UrlFormat {
    fn default() -> Self {
        Self::from_string(DEFAULT_TILE_URL.to_owned())
    }
}

impl Clone for UrlFormat {
    fn clone(&self) -> Self {
        // the subdomain rotation counter restarts in the clone
        Self::from_string(self.format_str.clone())
    }
}

impl PartialEq for UrlFormat {
    fn eq(&self, other: &Self) -> bool {
        self.format_str == other.format_str
    }
}

impl fmt::Debug for UrlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlFormat")
            .field("format_str", &self.format_str)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_coordinates() {
        let fmt = UrlFormat::default();
        let url = fmt.tile_url(&Tile::new(33491, 53582, 17)).unwrap();

        assert_eq!(url, "https://tile.openstreetmap.org/17/33491/53582.png");
    }

    #[test]
    fn rotates_subdomains() {
        let fmt = UrlFormat::from_string("https://{s}.tile.example.org/{z}/{x}/{y}.png".into());
        let tile = Tile::new(0, 0, 0);

        let first = fmt.tile_url(&tile).unwrap();
        let second = fmt.tile_url(&tile).unwrap();
        let fourth = {
            fmt.tile_url(&tile).unwrap();
            fmt.tile_url(&tile).unwrap()
        };

        assert_eq!(first, "https://a.tile.example.org/0/0/0.png");
        assert_eq!(second, "https://b.tile.example.org/0/0/0.png");
        assert_eq!(first, fourth);
    }

    #[test]
    fn rejects_unknown_specifier() {
        let fmt = UrlFormat::from_string("https://tile.example.org/{unknown}.png".into());
        assert!(fmt.tile_url(&Tile::new(0, 0, 0)).is_err());
    }
}
