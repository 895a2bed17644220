use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::tile::Tile;

/// Key-value store for raw tile bytes, keyed by tile coordinate.
///
/// Entries are immutable once written — tile content for a given
/// coordinate and zoom never changes on the server — so last-writer-wins
/// on concurrent puts is safe and repeated runs are idempotent.
pub trait TileCache: Send + Sync {
    /// Returns the cached bytes for the tile, if present.
    fn get(&self, tile: &Tile) -> Result<Option<Vec<u8>>>;

    /// Stores the bytes for the tile.
    fn put(&self, tile: &Tile, bytes: &[u8]) -> Result<()>;

    /// Checks whether the tile is present without reading it.
    fn contains(&self, tile: &Tile) -> bool;
}

/// Disk-backed tile cache, one `{z}_{x}_{y}.png` file per tile.
///
/// Re-running against the same directory turns already-downloaded tiles
/// into cache hits, which makes an interrupted run cheap to resume.
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Opens the cache, creating the directory if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| Error::io(&dir, err))?;

        Ok(Self { dir })
    }

    fn entry_path(&self, tile: &Tile) -> PathBuf {
        self.dir
            .join(format!("{}_{}_{}.png", tile.z, tile.x, tile.y))
    }
}

impl TileCache for DiskCache {
    fn get(&self, tile: &Tile) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(tile);

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::io(path, err)),
        }
    }

    fn put(&self, tile: &Tile, bytes: &[u8]) -> Result<()> {
        let path = self.entry_path(tile);

        fs::write(&path, bytes).map_err(|err| Error::io(path, err))
    }

    fn contains(&self, tile: &Tile) -> bool {
        self.entry_path(tile).exists()
    }
}

/// In-memory tile cache.
///
/// Behaves like [`DiskCache`] without touching the filesystem; used as the
/// cache backend in tests and wherever persistence is not wanted.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Tile, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TileCache for MemoryCache {
    fn get(&self, tile: &Tile) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().unwrap().get(tile).cloned())
    }

    fn put(&self, tile: &Tile, bytes: &[u8]) -> Result<()> {
        self.entries.lock().unwrap().insert(*tile, bytes.to_vec());

        Ok(())
    }

    fn contains(&self, tile: &Tile) -> bool {
        self.entries.lock().unwrap().contains_key(tile)
    }
}
