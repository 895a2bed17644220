use std::str::FromStr;

use crate::error::{Error, Result};
use crate::region::TileRegion;

/// How a tile region is split into output canvases.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PartitionPolicy {
    /// One canvas covering the whole region, saved as `osm_bkg_z{zoom}.png`.
    Single,

    /// A grid of N×N-tile canvases saved as `z{zoom}_{x}_{y}.png`, keyed
    /// by each chunk's global tile origin. Edge chunks are clipped to the
    /// remaining columns/rows rather than padded with blank pixels.
    FixedChunk(usize),

    /// Four canvases of `columns/2 × rows/2` tiles each, saved as
    /// `osm_q1.png`..`osm_q4.png` (top-left, top-right, bottom-left,
    /// bottom-right). For odd region dimensions the trailing row/column
    /// is dropped from all four outputs.
    Quadrant,
}

impl FromStr for PartitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.to_lowercase();

        match lower.as_str() {
            "single" => Ok(PartitionPolicy::Single),
            "quadrant" => Ok(PartitionPolicy::Quadrant),
            _ => lower
                .strip_prefix("chunk:")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|&n| n > 0)
                .map(PartitionPolicy::FixedChunk)
                .ok_or_else(|| format!("expected `single`, `quadrant` or `chunk:N`, got `{s}`")),
        }
    }
}

/// A sub-rectangle of a [`TileRegion`] that becomes one output canvas.
///
/// Offsets and dimensions are in tiles, relative to the region's
/// north-west corner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Partition {
    pub col_offset: usize,
    pub row_offset: usize,
    pub columns: usize,
    pub rows: usize,
    file_name: String,
}

impl Partition {
    /// Deterministic output file name derived from the zoom level and the
    /// partition's identity.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Splits a region into output partitions according to the policy.
pub fn partitions(region: &TileRegion, policy: PartitionPolicy) -> Result<Vec<Partition>> {
    match policy {
        PartitionPolicy::Single => Ok(vec![Partition {
            col_offset: 0,
            row_offset: 0,
            columns: region.columns(),
            rows: region.rows(),
            file_name: format!("osm_bkg_z{}.png", region.zoom()),
        }]),

        PartitionPolicy::FixedChunk(chunk) => {
            let mut parts = Vec::new();

            for col_offset in (0..region.columns()).step_by(chunk) {
                for row_offset in (0..region.rows()).step_by(chunk) {
                    parts.push(Partition {
                        col_offset,
                        row_offset,
                        columns: chunk.min(region.columns() - col_offset),
                        rows: chunk.min(region.rows() - row_offset),
                        file_name: format!(
                            "z{}_{}_{}.png",
                            region.zoom(),
                            region.x_min() + col_offset,
                            region.y_min() + row_offset,
                        ),
                    });
                }
            }

            Ok(parts)
        }

        PartitionPolicy::Quadrant => {
            let half_columns = region.columns() / 2;
            let half_rows = region.rows() / 2;

            if half_columns == 0 || half_rows == 0 {
                return Err(Error::InvalidInput(format!(
                    "{}x{} region is too small to split into quadrants",
                    region.columns(),
                    region.rows(),
                )));
            }

            let origins = [
                (0, 0),
                (half_columns, 0),
                (0, half_rows),
                (half_columns, half_rows),
            ];

            Ok(origins
                .iter()
                .enumerate()
                .map(|(i, &(col_offset, row_offset))| Partition {
                    col_offset,
                    row_offset,
                    columns: half_columns,
                    rows: half_rows,
                    file_name: format!("osm_q{}.png", i + 1),
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(columns: usize, rows: usize) -> TileRegion {
        TileRegion::new(12, 100, 100 + columns - 1, 200, 200 + rows - 1).unwrap()
    }

    #[test]
    fn single_covers_whole_region() {
        let parts = partitions(&region(17, 16), PartitionPolicy::Single).unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!((parts[0].columns, parts[0].rows), (17, 16));
        assert_eq!(parts[0].file_name(), "osm_bkg_z12.png");
    }

    #[test]
    fn even_region_quarters_exactly() {
        let parts = partitions(&region(8, 8), PartitionPolicy::Quadrant).unwrap();

        assert_eq!(parts.len(), 4);
        for part in &parts {
            assert_eq!((part.columns, part.rows), (4, 4));
        }
        assert_eq!(
            parts
                .iter()
                .map(|p| (p.col_offset, p.row_offset))
                .collect::<Vec<_>>(),
            vec![(0, 0), (4, 0), (0, 4), (4, 4)]
        );
        assert_eq!(parts[0].file_name(), "osm_q1.png");
        assert_eq!(parts[3].file_name(), "osm_q4.png");
    }

    #[test]
    fn odd_region_quarters_drop_remainder() {
        let parts = partitions(&region(7, 7), PartitionPolicy::Quadrant).unwrap();

        assert_eq!(parts.len(), 4);
        for part in &parts {
            assert_eq!((part.columns, part.rows), (3, 3));
        }

        // column 6 and row 6 appear in no quadrant
        let covered = parts
            .iter()
            .flat_map(|p| {
                (p.col_offset..p.col_offset + p.columns)
                    .flat_map(move |c| (p.row_offset..p.row_offset + p.rows).map(move |r| (c, r)))
            })
            .collect::<Vec<_>>();
        assert!(covered.iter().all(|&(c, r)| c != 6 && r != 6));
        assert_eq!(covered.len(), 36);
    }

    #[test]
    fn too_small_region_cannot_be_quartered() {
        assert!(partitions(&region(1, 8), PartitionPolicy::Quadrant).is_err());
        assert!(partitions(&region(8, 1), PartitionPolicy::Quadrant).is_err());
    }

    #[test]
    fn chunks_clip_to_remainder() {
        let parts = partitions(&region(10, 5), PartitionPolicy::FixedChunk(4)).unwrap();

        assert_eq!(parts.len(), 6);

        let sizes = parts
            .iter()
            .map(|p| (p.col_offset, p.row_offset, p.columns, p.rows))
            .collect::<Vec<_>>();
        assert_eq!(
            sizes,
            vec![
                (0, 0, 4, 4),
                (0, 4, 4, 1),
                (4, 0, 4, 4),
                (4, 4, 4, 1),
                (8, 0, 2, 4),
                (8, 4, 2, 1),
            ]
        );

        // names carry the chunk's global tile origin
        assert_eq!(parts[0].file_name(), "z12_100_200.png");
        assert_eq!(parts[5].file_name(), "z12_108_204.png");
    }

    #[test]
    fn chunk_grid_covers_every_tile_once() {
        let parts = partitions(&region(10, 5), PartitionPolicy::FixedChunk(4)).unwrap();
        let covered: usize = parts.iter().map(|p| p.columns * p.rows).sum();

        assert_eq!(covered, 50);
    }

    #[test]
    fn policy_parses() {
        assert_eq!("single".parse::<PartitionPolicy>(), Ok(PartitionPolicy::Single));
        assert_eq!(
            "quadrant".parse::<PartitionPolicy>(),
            Ok(PartitionPolicy::Quadrant)
        );
        assert_eq!(
            "chunk:8".parse::<PartitionPolicy>(),
            Ok(PartitionPolicy::FixedChunk(8))
        );
        assert!("chunk:0".parse::<PartitionPolicy>().is_err());
        assert!("chunk:".parse::<PartitionPolicy>().is_err());
        assert!("mosaic".parse::<PartitionPolicy>().is_err());
    }
}
