#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tile_grid::{MAP_EXTENT, TileGrid};
use glam::{UVec2, Vec2};
use std::ops::ControlFlow;

/// An inclusive integer rectangle describing a square sub-region of the grid
/// that a ship of some radius can occupy without overlapping a solid tile.
///
/// Unlike [`OccupyRect`], this has no `occupy` flag — its mere existence in a
/// result means it passed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedRect {
    pub start: UVec2,
    pub end: UVec2,
}

impl OccupiedRect {
    #[inline]
    #[must_use]
    fn new(start: UVec2, end: UVec2) -> Self {
        Self { start, end }
    }

    /// True if `position` (floored) falls within this rectangle, inclusive.
    #[inline]
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        let x = position.x as u32;
        let y = position.y as u32;
        x >= self.start.x && x <= self.end.x && y >= self.start.y && y <= self.end.y
    }

    /// The center point of this rectangle, treating each tile as a unit square.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec2 {
        let min = self.start.as_vec2();
        let max = self.end.as_vec2() + Vec2::ONE;
        (min + max) * 0.5
    }
}

/// The result of looking for a single occupy rectangle around a point: either
/// none exists (`occupy: false`), or `rect` describes one that does.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupyRect {
    pub occupy: bool,
    pub rect: OccupiedRect,
}

impl OccupyRect {
    #[inline]
    #[must_use]
    fn none(at: UVec2) -> Self {
        Self {
            occupy: false,
            rect: OccupiedRect::new(at, at),
        }
    }

    #[inline]
    #[must_use]
    fn some(rect: OccupiedRect) -> Self {
        Self { occupy: true, rect }
    }
}

/// Derives shape-fitting predicates for a ship of some radius over a [`TileGrid`].
///
/// See the module-level discussion in the crate docs for the geometric primitive
/// all of these methods share: a square of side `2*floor(r)+1` that contains the
/// query cell and has no solid cell inside it.
pub struct OccupancyModel<'a> {
    grid: &'a TileGrid,
}

/// A generous guess at how many candidate rectangles a single query can produce,
/// used only to size the initial allocation of [`OccupancyModel::get_all_occupied_rects`].
/// Not a hard limit: the returned `Vec` grows past this if needed.
const TYPICAL_CANDIDATE_CAPACITY: usize = 64;

impl<'a> OccupancyModel<'a> {
    #[must_use]
    pub fn new(grid: &'a TileGrid) -> Self {
        Self { grid }
    }

    #[inline]
    fn diameter(radius: f32) -> u16 {
        (radius * 2.0) as u16
    }

    /// The search window `[far_left, far_right] x [far_top, far_bottom]`, clamped
    /// to the grid extent the same way the original engine handles `u16` wrap.
    fn search_window(start: UVec2, d: u16) -> (u16, u16, u16, u16) {
        let mut far_left = start.x as i32 - d as i32;
        let mut far_right = start.x as i32 + d as i32;
        let mut far_top = start.y as i32 - d as i32;
        let mut far_bottom = start.y as i32 + d as i32;

        if far_left < 0 || far_left > (MAP_EXTENT - 1) as i32 {
            far_left = 0;
        }
        if far_right > (MAP_EXTENT - 1) as i32 {
            far_right = (MAP_EXTENT - 1) as i32;
        }
        if far_top < 0 || far_top > (MAP_EXTENT - 1) as i32 {
            far_top = 0;
        }
        if far_bottom > (MAP_EXTENT - 1) as i32 {
            far_bottom = (MAP_EXTENT - 1) as i32;
        }

        (far_left as u16, far_right as u16, far_top as u16, far_bottom as u16)
    }

    /// Test whether the `d+1`-sided square anchored at `check`, extending toward
    /// `start` by `d` cells in each axis, is entirely non-solid.
    fn can_fit(&self, check: UVec2, start: UVec2, d: u16) -> bool {
        let dir_y: i32 = match start.y.cmp(&check.y) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Less => -1,
        };
        let dir_x: i32 = match start.x.cmp(&check.x) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Less => -1,
        };

        let mut y = check.y as i32;
        for _ in 0..=d {
            let mut x = check.x as i32;
            for _ in 0..=d {
                if x < 0 || y < 0 || self.grid.is_solid(x as u16, y as u16) {
                    return false;
                }
                x += dir_x;
            }
            y += dir_y;
        }
        true
    }

    /// Build the candidate rectangle anchored at `check` given it passed [`Self::can_fit`].
    fn candidate_rect(check: UVec2, start: UVec2, d: u16) -> OccupiedRect {
        let (sx, ex) = if check.x > start.x {
            (check.x - d as u32, check.x)
        } else {
            (check.x, check.x + d as u32)
        };
        let (sy, ey) = if check.y > start.y {
            (check.y - d as u32, check.y)
        } else {
            (check.y, check.y + d as u32)
        };
        OccupiedRect::new(UVec2::new(sx, sy), UVec2::new(ex, ey))
    }

    /// Walk every strictly-diagonal cell of the search window around `position`,
    /// invoking `visit` with each passing candidate rectangle. `visit` controls
    /// iteration via `ControlFlow`: `Break` stops early.
    fn visit_candidates<B>(
        &self,
        position: Vec2,
        radius: f32,
        mut visit: impl FnMut(OccupiedRect) -> ControlFlow<B>,
    ) -> Option<B> {
        let d = Self::diameter(radius);
        let start = UVec2::new(position.x as u32, position.y as u32);

        if d < 1 {
            return None;
        }

        let (far_left, far_right, far_top, far_bottom) = Self::search_window(start, d);

        for check_y in far_top..=far_bottom {
            if check_y == start.y as u16 {
                continue;
            }
            for check_x in far_left..=far_right {
                if check_x == start.x as u16 {
                    continue;
                }
                let check = UVec2::new(check_x as u32, check_y as u32);
                if self.can_fit(check, start, d) {
                    let rect = Self::candidate_rect(check, start, d);
                    if let ControlFlow::Break(b) = visit(rect) {
                        return Some(b);
                    }
                }
            }
        }
        None
    }

    /// The degenerate single-tile case used whenever `radius` rounds to a
    /// diameter under 1, or the query tile itself is solid.
    fn degenerate_rect(&self, position: Vec2) -> Option<OccupiedRect> {
        let x = position.x as u16;
        let y = position.y as u16;
        if self.grid.is_solid(x, y) {
            None
        } else {
            Some(OccupiedRect::new(
                UVec2::new(x as u32, y as u32),
                UVec2::new(x as u32, y as u32),
            ))
        }
    }

    fn is_degenerate(&self, position: Vec2, radius: f32) -> bool {
        let d = Self::diameter(radius);
        let x = position.x as u16;
        let y = position.y as u16;
        d < 1 || self.grid.is_solid(x, y)
    }

    /// True if some occupy rectangle exists for `position` at `radius`.
    #[must_use]
    pub fn can_overlap_tile(&self, position: Vec2, radius: f32) -> bool {
        if self.is_degenerate(position, radius) {
            return self.degenerate_rect(position).is_some();
        }
        self.visit_candidates(position, radius, |_| ControlFlow::Break(()))
            .is_some()
    }

    /// The first occupy rectangle found for `position` at `radius`, if any.
    #[must_use]
    pub fn possible_occupy_rect(&self, position: Vec2, radius: f32) -> OccupyRect {
        if self.is_degenerate(position, radius) {
            return match self.degenerate_rect(position) {
                Some(rect) => OccupyRect::some(rect),
                None => OccupyRect::none(UVec2::new(position.x as u32, position.y as u32)),
            };
        }
        let found = self.visit_candidates(position, radius, |rect| ControlFlow::Break(rect));
        match found {
            Some(rect) => OccupyRect::some(rect),
            None => OccupyRect::none(UVec2::new(position.x as u32, position.y as u32)),
        }
    }

    /// Every occupy rectangle for `position` at `radius`.
    ///
    /// The original engine wrote these into a caller-supplied fixed buffer of 64
    /// slots; here we return an owned, growable `Vec` instead — idiomatic, and
    /// free of the original's silent-truncation risk. In practice, for the ship
    /// radii this engine is tuned for (`d = floor(2r)` of 1 or 2), there are at
    /// most 4 candidates; the 64 is only a capacity hint.
    #[must_use]
    pub fn get_all_occupied_rects(&self, position: Vec2, radius: f32) -> Vec<OccupiedRect> {
        if self.is_degenerate(position, radius) {
            return self.degenerate_rect(position).into_iter().collect();
        }
        let mut out = Vec::with_capacity(TYPICAL_CANDIDATE_CAPACITY);
        self.visit_candidates(position, radius, |rect| {
            out.push(rect);
            ControlFlow::<()>::Continue(())
        });
        out
    }

    /// The average center of every occupy rectangle for `position` at `radius`,
    /// or `position` itself if none exist.
    #[must_use]
    pub fn occupy_center(&self, position: Vec2, radius: f32) -> Vec2 {
        if self.is_degenerate(position, radius) {
            return position;
        }
        let mut sum = Vec2::ZERO;
        let mut count = 0u32;
        self.visit_candidates(position, radius, |rect| {
            sum += rect.center();
            count += 1;
            ControlFlow::<()>::Continue(())
        });
        if count == 0 {
            position
        } else {
            sum / count as f32
        }
    }

    /// The occupy rectangle for `position` at `radius` whose center is closest
    /// to `reference`, short-circuiting if any candidate directly contains it.
    #[must_use]
    pub fn closest_occupy_rect(&self, position: Vec2, radius: f32, reference: Vec2) -> OccupyRect {
        if self.is_degenerate(position, radius) {
            return match self.degenerate_rect(position) {
                Some(rect) => OccupyRect::some(rect),
                None => OccupyRect::none(UVec2::new(position.x as u32, position.y as u32)),
            };
        }

        let mut best: Option<OccupiedRect> = None;
        let mut best_distance_sq = f32::MAX;

        let found = self.visit_candidates(position, radius, |rect| {
            let contains_ref = rect.contains(reference);

            let better = match best {
                None => true,
                Some(_) => {
                    let d = rect.center().distance_squared(reference);
                    d < best_distance_sq
                }
            };

            if contains_ref || better {
                best = Some(rect);
                best_distance_sq = rect.center().distance_squared(reference);
            }

            if contains_ref {
                ControlFlow::Break(rect)
            } else {
                ControlFlow::Continue(())
            }
        });

        match found.or(best) {
            Some(rect) => OccupyRect::some(rect),
            None => OccupyRect::none(UVec2::new(position.x as u32, position.y as u32)),
        }
    }

    /// A stricter, cheaper fit test used by [`crate::EdgeTable`] generation:
    /// the tile itself and every tile within `round(radius)` of it (a simple
    /// axis-aligned square, not a fit-rectangle search) must be non-solid.
    #[must_use]
    pub fn can_occupy(&self, position: Vec2, radius: f32) -> bool {
        if self.grid.is_solid_at(position) {
            return false;
        }
        let radius_check = (radius + 0.5).floor() as i32;
        for dy in -radius_check..=radius_check {
            for dx in -radius_check..=radius_check {
                let wx = position.x as i32 + dx;
                let wy = position.y as i32 + dy;
                if wx < 0 || wy < 0 || self.grid.is_solid(wx as u16, wy as u16) {
                    return false;
                }
            }
        }
        true
    }

    /// A cardinal-step fit check consulted when [`Self::can_occupy`] fails on a
    /// neighboring cell: succeeds if at least one relative "occupy point" around
    /// `from` or `to` is free.
    ///
    /// This mirrors the original engine exactly, including its permissive
    /// "at least one side is free" comparison rather than the stricter,
    /// commented-out "moved in the same direction" check — see `DESIGN.md` for
    /// why that behavior is kept rather than tightened.
    #[must_use]
    pub fn can_move_to(&self, from: UVec2, to: UVec2, radius: f32) -> bool {
        let from_map = self.occupy_bitmap(from, radius);
        let to_map = self.occupy_bitmap(to, radius);

        for (f, t) in from_map.iter().zip(to_map.iter()) {
            if *f || *t {
                continue;
            }
            return true;
        }
        false
    }

    /// For every cell in a `diameter x diameter` window anchored so that `start`
    /// is its bottom-right-most covered cell, record whether a `diameter`-sided
    /// square at that cell is solid anywhere.
    fn occupy_bitmap(&self, start: UVec2, radius: f32) -> Vec<bool> {
        let diameter = ((radius + 0.5) as u16).max(0) * 2;
        if diameter == 0 {
            return vec![!self.grid.is_solid(start.x as u16, start.y as u16)];
        }
        let origin_x = start.x as i32 - diameter as i32 + 1;
        let origin_y = start.y as i32 - diameter as i32 + 1;

        let mut result = Vec::with_capacity(diameter as usize * diameter as usize);
        for x in 0..diameter as i32 {
            for y in 0..diameter as i32 {
                let pos = (origin_x + x, origin_y + y);
                result.push(self.is_solid_square(pos, diameter));
            }
        }
        result
    }

    fn is_solid_square(&self, top_left: (i32, i32), length: u16) -> bool {
        for x in 0..length as i32 {
            for y in 0..length as i32 {
                let wx = top_left.0 + x;
                let wy = top_left.1 + y;
                if wx < 0 || wy < 0 || self.grid.is_solid(wx as u16, wy as u16) {
                    return true;
                }
            }
        }
        false
    }
}
