#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::Vec2;

/// The fixed width and height of a [`TileGrid`], in tiles.
pub const MAP_EXTENT: u16 = 1024;

/// The identifier of a single tile. `0` is empty space.
pub type TileId = u8;

/// The tile id treated as a "safe zone" — traversable, but penalized in
/// [`crate::EdgeTable::build`] so that paths avoid lingering there.
pub const SAFE_TILE_ID: TileId = 171;

/// Classify a tile id as solid (blocking) or not, per the fixed id ranges
/// this engine's tileset was authored against.
///
/// - `0`: empty.
/// - `1..=161`: solid.
/// - `162..=169`: doors, treated as non-solid.
/// - `170..=191`: non-solid backgrounds and safe zones.
/// - `192..=240`: solid.
/// - `241`: non-solid.
/// - `242..=252`: solid.
/// - `253..=255`: non-solid.
#[inline]
#[must_use]
pub fn is_solid_tile(id: TileId) -> bool {
    match id {
        0 => false,
        162..=169 => false,
        1..=161 => true,
        170..=191 => false,
        192..=240 => true,
        241 => false,
        242..=252 => true,
        253..=255 => false,
    }
}

/// An immutable `1024x1024` grid of [`TileId`]s, row-major (`index = y * 1024 + x`).
///
/// A `TileGrid` is built once, typically by [`crate::MapLoader`], and then shared
/// by reference across an [`crate::OccupancyModel`], an [`crate::EdgeTable`], and
/// any number of [`crate::PathfindingEngine`]s.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    tiles: Vec<TileId>,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::empty()
    }
}

impl TileGrid {
    /// Create a grid with every tile set to `0` (empty).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            tiles: vec![0; MAP_EXTENT as usize * MAP_EXTENT as usize],
        }
    }

    /// Build a grid from an already-populated, row-major tile buffer.
    ///
    /// # Panics
    ///
    /// Panics if `tiles.len() != 1024 * 1024`.
    #[must_use]
    pub fn from_tiles(tiles: Vec<TileId>) -> Self {
        assert_eq!(
            tiles.len(),
            MAP_EXTENT as usize * MAP_EXTENT as usize,
            "TileGrid requires exactly {}x{} tiles",
            MAP_EXTENT,
            MAP_EXTENT
        );
        Self { tiles }
    }

    /// The raw row-major tile buffer.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    #[inline]
    fn in_bounds(x: u16, y: u16) -> bool {
        x < MAP_EXTENT && y < MAP_EXTENT
    }

    #[inline]
    fn index(x: u16, y: u16) -> usize {
        y as usize * MAP_EXTENT as usize + x as usize
    }

    /// The tile id at `(x, y)`, or `0` if out of bounds.
    #[inline]
    #[must_use]
    pub fn tile_id(&self, x: u16, y: u16) -> TileId {
        if !Self::in_bounds(x, y) {
            return 0;
        }
        self.tiles[Self::index(x, y)]
    }

    /// The tile id under the (floored) world-space `position`.
    #[inline]
    #[must_use]
    pub fn tile_id_at(&self, position: Vec2) -> TileId {
        self.tile_id(position.x as u16, position.y as u16)
    }

    /// True if `(x, y)` is out of bounds or its tile is solid.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, x: u16, y: u16) -> bool {
        if !Self::in_bounds(x, y) {
            return true;
        }
        is_solid_tile(self.tile_id(x, y))
    }

    /// True if the (floored) world-space `position` is out of bounds or solid.
    #[inline]
    #[must_use]
    pub fn is_solid_at(&self, position: Vec2) -> bool {
        self.is_solid(position.x.floor() as u16, position.y.floor() as u16)
    }

    pub(crate) fn set_tile(&mut self, x: u16, y: u16, id: TileId) {
        if Self::in_bounds(x, y) {
            self.tiles[Self::index(x, y)] = id;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_empty_grid_is_not_solid() {
        let grid = TileGrid::empty();
        assert!(!grid.is_solid(0, 0));
        assert!(!grid.is_solid(512, 512));
    }

    #[test]
    fn test_out_of_bounds_is_solid() {
        let grid = TileGrid::empty();
        assert!(grid.is_solid(MAP_EXTENT, 0));
        assert!(grid.is_solid(0, MAP_EXTENT));
        assert_eq!(grid.tile_id(MAP_EXTENT, 0), 0);
    }

    #[test]
    fn test_classification_table() {
        assert!(!is_solid_tile(0));
        assert!(is_solid_tile(1));
        assert!(is_solid_tile(161));
        assert!(!is_solid_tile(162));
        assert!(!is_solid_tile(169));
        assert!(!is_solid_tile(170));
        assert!(!is_solid_tile(SAFE_TILE_ID));
        assert!(!is_solid_tile(191));
        assert!(is_solid_tile(192));
        assert!(is_solid_tile(240));
        assert!(!is_solid_tile(241));
        assert!(is_solid_tile(242));
        assert!(is_solid_tile(252));
        assert!(!is_solid_tile(253));
        assert!(!is_solid_tile(255));
    }

    #[test]
    fn test_set_and_get_tile() {
        let mut grid = TileGrid::empty();
        grid.set_tile(5, 5, 200);
        assert_eq!(grid.tile_id(5, 5), 200);
        assert!(grid.is_solid(5, 5));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn test_ron_round_trip() {
        let mut grid = TileGrid::empty();
        grid.set_tile(3, 4, SAFE_TILE_ID);

        let encoded = ron::to_string(&grid).unwrap();
        let decoded: TileGrid = ron::from_str(&encoded).unwrap();

        assert_eq!(grid, decoded);
    }
}
