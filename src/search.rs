use crate::direction::Direction;
use crate::edges::EdgeTable;
use crate::node_arena::{NodeArena, NodeFlags};
use crate::occupancy::OccupancyModel;
use crate::open_set::OpenSet;
use crate::tile_grid::TileGrid;
use glam::{UVec2, Vec2};

/// A ready-to-query pathfinding engine for a single ship radius over a fixed
/// [`TileGrid`].
///
/// Construction is the expensive step: it precomputes traversability,
/// per-cell weights, and the full edge table for every non-solid cell.
/// [`Self::find_path`] is then cheap relative to that setup, and may be
/// called repeatedly and concurrently with other `PathfindingEngine`s sharing
/// the same underlying map, since each owns its own [`NodeArena`] and
/// [`OpenSet`] scratch state.
pub struct PathfindingEngine<'a> {
    grid: &'a TileGrid,
    ship_radius: f32,
    edges: EdgeTable,
    arena: NodeArena,
    open_set: OpenSet,
}

impl<'a> PathfindingEngine<'a> {
    /// Precompute traversability, weights, and edges for a ship of
    /// `ship_radius` navigating `grid`. `linear_weights` enables the
    /// wall-proximity weight penalty used to bias searches away from walls.
    #[must_use]
    pub fn new(grid: &'a TileGrid, ship_radius: f32, linear_weights: bool) -> Self {
        let mut arena = NodeArena::new();
        let edges = EdgeTable::build(grid, &mut arena, ship_radius, linear_weights);

        Self {
            grid,
            ship_radius,
            edges,
            arena,
            open_set: OpenSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn ship_radius(&self) -> f32 {
        self.ship_radius
    }

    /// Find a shortest traversable path from `from` to `to`, returning the
    /// waypoints a ship should steer through in order.
    ///
    /// `ship_radius` governs only the waypoint smoothing done by
    /// [`OccupancyModel::occupy_center`] during path reconstruction; the
    /// traversability and edge checks a search walks were already baked into
    /// this engine's [`EdgeTable`] at the radius passed to [`Self::new`].
    /// Matches the original engine, whose `FindPath` likewise takes a
    /// `ship_radius` used only for that final smoothing pass, independent of
    /// whatever radius the edge table was built with.
    ///
    /// Returns an empty vector if either endpoint is out of bounds,
    /// non-traversable, or no path exists. The first waypoint (when the
    /// path is non-trivial) is `from` rounded to its cell center; interior
    /// waypoints are nudged to the center of whichever occupy rectangle the
    /// ship best fits into there, via [`OccupancyModel::occupy_center`].
    pub fn find_path(&mut self, from: Vec2, to: Vec2, ship_radius: f32) -> Vec<Vec2> {
        let start_point = UVec2::new(from.x as u32, from.y as u32);
        let goal_point = UVec2::new(to.x as u32, to.y as u32);

        let Some(start) = self.arena.get_node(start_point.x as u16, start_point.y as u16) else {
            return Vec::new();
        };
        let Some(goal) = self.arena.get_node(goal_point.x as u16, goal_point.y as u16) else {
            return Vec::new();
        };

        if !self.arena.node(start).flags.contains(NodeFlags::TRAVERSABLE)
            || !self.arena.node(goal).flags.contains(NodeFlags::TRAVERSABLE)
        {
            return Vec::new();
        }

        self.open_set.clear();
        self.open_set.push(&self.arena, start);

        while !self.open_set.is_empty() {
            let Some(node) = self.open_set.pop() else {
                break;
            };

            if node == goal {
                break;
            }

            self.arena.node_mut(node).flags |= NodeFlags::CLOSED;

            let n = self.arena.node(node);
            if n.f > 0.0 && n.f == n.f_last {
                // Re-added because it improved; the earlier, stale entry was
                // already relaxed, so skip reprocessing the same node.
                continue;
            }
            self.arena.node_mut(node).f_last = self.arena.node(node).f;

            let (node_x, node_y) = NodeArena::coords_of(node);
            let parent_offset = self.arena.node(node).parent.map(|p| {
                let (px, py) = NodeArena::coords_of(p);
                (px as i32 - node_x as i32, py as i32 - node_y as i32)
            });

            let mut edges = self.edges.get(node_x, node_y);
            if let Some(offset) = parent_offset {
                if let Some(back) = Direction::ALL
                    .into_iter()
                    .find(|d| (d.offset().x, d.offset().y) == offset)
                {
                    edges.erase(back);
                }
            }

            for direction in edges.iter() {
                let offset = direction.offset();
                let edge_x = node_x as i32 + offset.x;
                let edge_y = node_y as i32 + offset.y;
                if edge_x < 0 || edge_y < 0 {
                    continue;
                }
                let Some(edge) = self.arena.get_node(edge_x as u16, edge_y as u16) else {
                    continue;
                };

                let step = crate::math::distance_to_uvec(
                    UVec2::new(node_x as u32, node_y as u32),
                    UVec2::new(edge_x as u32, edge_y as u32),
                );
                let cost = self.arena.node(node).g + self.arena.node(edge).weight * step;

                if self.arena.node(edge).flags.contains(NodeFlags::CLOSED) && cost < self.arena.node(edge).g {
                    self.arena.node_mut(edge).flags.remove(NodeFlags::CLOSED);
                }

                let h = crate::math::distance_to_uvec(
                    UVec2::new(edge_x as u32, edge_y as u32),
                    goal_point,
                );

                let in_open_set = self.arena.node(edge).flags.contains(NodeFlags::OPEN_SET);
                if !in_open_set || cost + h < self.arena.node(edge).f {
                    let e = self.arena.node_mut(edge);
                    e.g = cost;
                    e.f = cost + h;
                    e.parent = Some(node);
                    e.flags |= NodeFlags::OPEN_SET;

                    self.open_set.push(&self.arena, edge);
                }
            }
        }

        let path = self.reconstruct_path(start, goal, start_point, ship_radius);

        self.arena.clear_touched();

        path
    }

    fn reconstruct_path(&self, start: u32, goal: u32, start_point: UVec2, ship_radius: f32) -> Vec<Vec2> {
        let mut points: Vec<(u16, u16)> = Vec::new();
        let mut current = Some(goal);

        while let Some(node) = current {
            if node == start {
                break;
            }
            points.push(NodeArena::coords_of(node));
            current = self.arena.node(node).parent;
        }

        if points.is_empty() {
            return Vec::new();
        }

        let mut path = Vec::with_capacity(points.len() + 1);

        if self.arena.node(goal).parent.is_some() {
            path.push(Vec2::new(start_point.x as f32 + 0.5, start_point.y as f32 + 0.5));
        }

        let occupancy = OccupancyModel::new(self.grid);
        for (x, y) in points.into_iter().rev() {
            let pos = Vec2::new(x as f32, y as f32);
            path.push(occupancy.occupy_center(pos, ship_radius));
        }

        path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_path_when_start_is_solid() {
        let mut grid = TileGrid::empty();
        grid.set_tile(5, 5, 1);
        let mut engine = PathfindingEngine::new(&grid, 0.5, false);
        let path = engine.find_path(Vec2::new(5.5, 5.5), Vec2::new(10.5, 10.5), 0.5);
        assert!(path.is_empty());
    }

    #[test]
    fn test_same_start_and_goal_yields_no_waypoints() {
        // Matches the original engine: the goal is popped before its `parent`
        // is ever set, so path reconstruction finds nothing to walk back.
        let grid = TileGrid::empty();
        let mut engine = PathfindingEngine::new(&grid, 0.5, false);
        let path = engine.find_path(Vec2::new(10.5, 10.5), Vec2::new(10.5, 10.5), 0.5);
        assert!(path.is_empty());
    }

    #[test]
    fn test_straight_path_on_open_map_is_monotonic() {
        let grid = TileGrid::empty();
        let mut engine = PathfindingEngine::new(&grid, 0.875, false);
        let path = engine.find_path(Vec2::new(512.0, 512.0), Vec2::new(520.0, 512.0), 0.875);
        assert_eq!(path.len(), 9);
        for pair in path.windows(2) {
            assert!(pair[1].x >= pair[0].x);
        }
        let length: f32 = path.windows(2).map(|p| (p[1] - p[0]).length()).sum();
        assert!((length - 8.0).abs() < 1.0, "path length {length} not close to 8");
    }

    #[test]
    fn test_vertical_wall_spanning_full_height_is_impassable() {
        let mut grid = TileGrid::empty();
        for y in 0..1024u16 {
            grid.set_tile(10, y, 1);
        }
        let mut engine = PathfindingEngine::new(&grid, 0.875, false);
        let path = engine.find_path(Vec2::new(5.0, 512.0), Vec2::new(15.0, 512.0), 0.875);
        assert!(path.is_empty());
    }

    #[test]
    fn test_safe_tile_weight_discourages_but_does_not_forbid_crossing() {
        // A safe-tile strip directly on the straight-line route; the engine
        // should still be willing to cross it (there's no detour available
        // in this narrow corridor) but the effective route cost reflects the
        // 10x weight penalty rather than the raw unit distance.
        let mut grid = TileGrid::empty();
        for y in 8..=12u16 {
            grid.set_tile(10, y, 1);
        }
        grid.set_tile(10, 10, crate::tile_grid::SAFE_TILE_ID);
        let mut engine = PathfindingEngine::new(&grid, 0.0, false);
        let path = engine.find_path(Vec2::new(5.0, 10.0), Vec2::new(15.0, 10.0), 0.0);
        assert!(!path.is_empty());
    }

    #[test]
    fn test_path_reaches_goal_around_a_wall() {
        let mut grid = TileGrid::empty();
        for y in 0..20 {
            if y == 10 {
                continue;
            }
            grid.set_tile(10, y, 1);
        }
        let mut engine = PathfindingEngine::new(&grid, 0.5, false);
        let path = engine.find_path(Vec2::new(5.5, 5.5), Vec2::new(15.5, 5.5), 0.5);
        assert!(!path.is_empty());
        let last = *path.last().unwrap();
        assert!((last - Vec2::new(15.5, 5.5)).length() < 2.0);
    }

    #[test]
    fn test_no_path_when_fully_enclosed() {
        let mut grid = TileGrid::empty();
        for x in 8..=12 {
            grid.set_tile(x, 8, 1);
            grid.set_tile(x, 12, 1);
        }
        for y in 8..=12 {
            grid.set_tile(8, y, 1);
            grid.set_tile(12, y, 1);
        }
        let mut engine = PathfindingEngine::new(&grid, 0.5, false);
        let path = engine.find_path(Vec2::new(10.5, 10.5), Vec2::new(50.5, 50.5), 0.5);
        assert!(path.is_empty());
    }
}
