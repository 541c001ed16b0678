#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::IVec2;

/// One of the 8 directions a ship may step in on the tile grid.
///
/// Variant order is significant: [`Direction::edge_index`] must match the bit
/// layout of an [`crate::EdgeSet`], which in turn mirrors the neighbor order
/// used throughout the original engine this crate is modeled on. Do not
/// reorder these variants without also updating every place that indexes an
/// `EdgeSet` by a raw `usize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    West,
    East,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Direction {
    /// All 8 directions, in the fixed `EdgeSet` bit order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    /// The unit offset for this direction, in grid space where `y` increases
    /// downward (row index), matching [`crate::TileGrid`]'s row-major layout.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> IVec2 {
        match self {
            Direction::North => IVec2::new(0, -1),
            Direction::South => IVec2::new(0, 1),
            Direction::West => IVec2::new(-1, 0),
            Direction::East => IVec2::new(1, 0),
            Direction::NorthWest => IVec2::new(-1, -1),
            Direction::NorthEast => IVec2::new(1, -1),
            Direction::SouthWest => IVec2::new(-1, 1),
            Direction::SouthEast => IVec2::new(1, 1),
        }
    }

    /// The bit index of this direction within an [`crate::EdgeSet`].
    #[inline]
    #[must_use]
    pub fn edge_index(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::South => 1,
            Direction::West => 2,
            Direction::East => 3,
            Direction::NorthWest => 4,
            Direction::NorthEast => 5,
            Direction::SouthWest => 6,
            Direction::SouthEast => 7,
        }
    }

    /// Recover a direction from its `EdgeSet` bit index.
    #[inline]
    #[must_use]
    pub fn from_edge_index(index: usize) -> Option<Direction> {
        Self::ALL.get(index).copied()
    }

    /// The reverse of this direction (the direction back to where it came from).
    #[inline]
    #[must_use]
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::NorthWest => Direction::SouthEast,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::SouthEast => Direction::NorthWest,
        }
    }

    /// Returns true if this direction is cardinal (N, S, W, E).
    #[inline]
    #[must_use]
    pub fn is_cardinal(&self) -> bool {
        matches!(
            self,
            Direction::North | Direction::South | Direction::West | Direction::East
        )
    }

    /// Returns true if this direction is diagonal (NW, NE, SW, SE).
    #[inline]
    #[must_use]
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            Direction::NorthWest
                | Direction::NorthEast
                | Direction::SouthWest
                | Direction::SouthEast
        )
    }

    /// The cardinal direction a diagonal move is gated on: `NorthWest`/`NorthEast`
    /// are only passable when `North` is, `SouthWest`/`SouthEast` when `South` is.
    /// Returns `None` for cardinal directions, which have no gating requirement.
    #[inline]
    #[must_use]
    pub fn gating_cardinal(&self) -> Option<Direction> {
        match self {
            Direction::NorthWest | Direction::NorthEast => Some(Direction::North),
            Direction::SouthWest | Direction::SouthEast => Some(Direction::South),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Direction;

    #[test]
    fn test_edge_index_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_edge_index(d.edge_index()), Some(d));
        }
    }

    #[test]
    fn test_opposite_is_involutive() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_gating_cardinal() {
        assert_eq!(Direction::NorthWest.gating_cardinal(), Some(Direction::North));
        assert_eq!(Direction::NorthEast.gating_cardinal(), Some(Direction::North));
        assert_eq!(Direction::SouthWest.gating_cardinal(), Some(Direction::South));
        assert_eq!(Direction::SouthEast.gating_cardinal(), Some(Direction::South));
        assert_eq!(Direction::North.gating_cardinal(), None);
        assert_eq!(Direction::East.gating_cardinal(), None);
    }

    #[test]
    fn test_is_cardinal_diagonal() {
        for d in Direction::ALL {
            assert_ne!(d.is_cardinal(), d.is_diagonal());
        }
    }
}
