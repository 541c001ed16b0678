#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::node_arena::{NodeArena, NodeFlags};
use crate::occupancy::{OccupancyModel, OccupiedRect};
use crate::tile_grid::{SAFE_TILE_ID, TileGrid, MAP_EXTENT};
use glam::Vec2;

/// A bitmask of which of the 8 [`Direction`]s are passable from some cell.
/// Bit layout matches [`Direction::edge_index`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeSet(u8);

impl EdgeSet {
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub fn is_set(&self, direction: Direction) -> bool {
        self.0 & (1 << direction.edge_index()) != 0
    }

    #[inline]
    pub fn set(&mut self, direction: Direction) {
        self.0 |= 1 << direction.edge_index();
    }

    #[inline]
    pub fn erase(&mut self, direction: Direction) {
        self.0 &= !(1 << direction.edge_index());
    }

    /// Iterate the directions currently set, in `EdgeSet` bit order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.is_set(*d))
    }
}

/// A precomputed `1024x1024` table of which directions are passable from each
/// cell, given a fixed ship radius.
///
/// Built once by [`EdgeTable::build`] alongside a [`NodeArena`]'s traversable
/// flags and weights, then consulted (minus the edge back to a search's
/// parent node) by [`crate::PathfindingEngine::find_path`].
pub struct EdgeTable {
    edges: Vec<EdgeSet>,
}

impl EdgeTable {
    #[inline]
    fn index(x: u16, y: u16) -> usize {
        y as usize * MAP_EXTENT as usize + x as usize
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> EdgeSet {
        if x >= MAP_EXTENT || y >= MAP_EXTENT {
            return EdgeSet::empty();
        }
        self.edges[Self::index(x, y)]
    }

    fn set(&mut self, x: u16, y: u16, edges: EdgeSet) {
        let i = Self::index(x, y);
        self.edges[i] = edges;
    }

    /// Precompute traversability, weights, and edges for every non-solid cell
    /// of `grid`, for a ship of `ship_radius`. `linear_weights` enables the
    /// wall-proximity weight penalty (see [`crate::wall_distance`]).
    ///
    /// This is the expensive, one-time setup step of [`crate::PathfindingEngine::new`].
    #[must_use]
    pub fn build(grid: &TileGrid, arena: &mut NodeArena, ship_radius: f32, linear_weights: bool) -> Self {
        let occupancy = OccupancyModel::new(grid);
        let mut table = Self {
            edges: vec![EdgeSet::empty(); MAP_EXTENT as usize * MAP_EXTENT as usize],
        };

        for y in 0..MAP_EXTENT {
            for x in 0..MAP_EXTENT {
                if grid.is_solid(x, y) {
                    continue;
                }
                if occupancy.can_overlap_tile(Vec2::new(x as f32, y as f32), ship_radius) {
                    arena.set_traversable(x, y);
                }
            }
        }

        for y in 0..MAP_EXTENT {
            for x in 0..MAP_EXTENT {
                if grid.is_solid(x, y) {
                    continue;
                }

                let edges = calculate_edges(grid, &occupancy, arena, x, y, ship_radius);
                table.set(x, y, edges);

                let index = arena.get_node(x, y).expect("in-bounds cell");
                arena.node_mut(index).weight = 1.0;

                if linear_weights {
                    let close_distance: u16 = 5;
                    let mut distance = crate::weights::wall_distance(grid, x, y, close_distance);
                    if distance < 1.0 {
                        distance = 1.0;
                    }
                    if distance < close_distance as f32 {
                        arena.node_mut(index).weight = close_distance as f32 / distance;
                    }
                }
            }
        }

        table
    }
}

/// Determine which of the 8 directions are passable from `(x, y)`, given the
/// ship's `radius`-sized occupancy footprint there.
///
/// Diagonal directions are only considered when their gating cardinal
/// direction ([`Direction::gating_cardinal`]) has already passed, matching
/// the original engine's asymmetric diagonal-cutting rule (only N/S gate
/// diagonals; E/W do not). As a side effect, a neighbor cell whose tile is
/// the safe-zone tile id has its arena weight bumped — this mutation happens
/// here, at edge-computation time, rather than in the later weight pass, and
/// can be overwritten if that neighbor cell's own turn through the precompute
/// loop comes later. That ordering quirk is carried over unchanged.
fn calculate_edges(
    grid: &TileGrid,
    occupancy: &OccupancyModel,
    arena: &mut NodeArena,
    x: u16,
    y: u16,
    radius: f32,
) -> EdgeSet {
    let mut edges = EdgeSet::empty();
    let mut north = false;
    let mut south = false;

    let occupied = occupancy.get_all_occupied_rects(Vec2::new(x as f32, y as f32), radius);

    for direction in Direction::ALL {
        if let Some(gate) = direction.gating_cardinal() {
            let passed = match gate {
                Direction::North => north,
                Direction::South => south,
                _ => unreachable!(),
            };
            if !passed {
                continue;
            }
        }

        let offset = direction.offset();
        let world_x = x as i32 + offset.x;
        let world_y = y as i32 + offset.y;
        if world_x < 0 || world_y < 0 || world_x >= MAP_EXTENT as i32 || world_y >= MAP_EXTENT as i32 {
            continue;
        }
        let (world_x, world_y) = (world_x as u16, world_y as u16);
        let target = Vec2::new(world_x as f32, world_y as f32);

        let is_occupied = occupied.iter().any(|rect| rect.contains(target));

        if !is_occupied {
            let can_occupy = occupied
                .iter()
                .all(|rect| can_occupy_after_move(grid, *rect, offset, direction.is_diagonal()));
            if !can_occupy {
                continue;
            }
        }

        let Some(index) = arena.get_node(world_x, world_y) else {
            continue;
        };
        if !arena.node(index).flags.contains(NodeFlags::TRAVERSABLE) {
            continue;
        }

        if grid.tile_id(world_x, world_y) == SAFE_TILE_ID {
            arena.node_mut(index).weight = 10.0;
        }

        edges.set(direction);

        match direction {
            Direction::North => north = true,
            Direction::South => south = true,
            _ => {}
        }
    }

    edges
}

/// Mirrors `CanOccupy`/`CanOccupyAxis`: for a diagonal move, the whole
/// translated rectangle must be clear; for a cardinal move, only the leading
/// edge (the side of the rectangle facing the direction of travel) needs to be.
fn can_occupy_after_move(grid: &TileGrid, rect: OccupiedRect, offset: glam::IVec2, diagonal: bool) -> bool {
    let min_x = rect.start.x as i32 + offset.x;
    let min_y = rect.start.y as i32 + offset.y;
    let max_x = rect.end.x as i32 + offset.x;
    let max_y = rect.end.y as i32 + offset.y;

    let is_solid = |x: i32, y: i32| x < 0 || y < 0 || grid.is_solid(x as u16, y as u16);

    if diagonal {
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if is_solid(x, y) {
                    return false;
                }
            }
        }
        return true;
    }

    if offset.x < 0 {
        for y in min_y..=max_y {
            if is_solid(min_x, y) {
                return false;
            }
        }
    } else if offset.x > 0 {
        for y in min_y..=max_y {
            if is_solid(max_x, y) {
                return false;
            }
        }
    } else if offset.y < 0 {
        for x in min_x..=max_x {
            if is_solid(x, min_y) {
                return false;
            }
        }
    } else if offset.y > 0 {
        for x in min_x..=max_x {
            if is_solid(x, max_y) {
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_edge_set_bits() {
        let mut e = EdgeSet::empty();
        assert!(!e.is_set(Direction::North));
        e.set(Direction::North);
        assert!(e.is_set(Direction::North));
        e.erase(Direction::North);
        assert!(!e.is_set(Direction::North));
    }

    #[test]
    fn test_open_map_has_all_edges_away_from_border() {
        let grid = TileGrid::empty();
        let mut arena = NodeArena::new();
        let table = EdgeTable::build(&grid, &mut arena, 0.5, false);
        let edges = table.get(512, 512);
        for d in Direction::ALL {
            assert!(edges.is_set(d), "expected {d:?} to be passable on an open map");
        }
    }

    #[test]
    fn test_solid_wall_blocks_edge() {
        let mut grid = TileGrid::empty();
        grid.set_tile(513, 512, 1);
        let mut arena = NodeArena::new();
        let table = EdgeTable::build(&grid, &mut arena, 0.0, false);
        let edges = table.get(512, 512);
        assert!(!edges.is_set(Direction::East));
    }

    #[test]
    fn test_diagonal_gating_follows_north_south_only() {
        // Cursor at (512, 512): only the N neighbor is solid. NW/NE must be
        // excluded (gated on N), while SW/SE must still be included (gated
        // on S, which is open) even though NW/NE are not.
        let mut grid = TileGrid::empty();
        grid.set_tile(512, 511, 1);
        let mut arena = NodeArena::new();
        let table = EdgeTable::build(&grid, &mut arena, 0.5, false);
        let edges = table.get(512, 512);

        assert!(!edges.is_set(Direction::North));
        assert!(!edges.is_set(Direction::NorthWest));
        assert!(!edges.is_set(Direction::NorthEast));

        assert!(edges.is_set(Direction::South));
        assert!(edges.is_set(Direction::West));
        assert!(edges.is_set(Direction::East));
        assert!(edges.is_set(Direction::SouthWest));
        assert!(edges.is_set(Direction::SouthEast));
    }

    #[test]
    fn test_border_cell_has_no_out_of_bounds_edges() {
        let grid = TileGrid::empty();
        let mut arena = NodeArena::new();
        let table = EdgeTable::build(&grid, &mut arena, 0.0, false);
        let edges = table.get(0, 0);
        assert!(!edges.is_set(Direction::North));
        assert!(!edges.is_set(Direction::West));
        assert!(!edges.is_set(Direction::NorthWest));
    }
}
