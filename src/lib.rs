//! elm_path
//! ========
//!
//! A tile-grid collision model and A* pathfinding engine for a circular
//! ("ship") agent navigating a fixed `1024x1024` map.
//!
//! The pieces compose in one direction: a [`TileGrid`] (built directly, or by
//! [`MapLoader`]) feeds an [`OccupancyModel`], which in turn drives
//! [`EdgeTable`] precompute inside [`PathfindingEngine::new`]. Once built, a
//! `PathfindingEngine` answers [`PathfindingEngine::find_path`] queries using
//! its own private [`NodeArena`] and [`OpenSet`] scratch state.
//!
//! [`RegionMetadata`] decodes a map file's optional named-region metadata; it
//! is independent of the pathfinding pipeline.

mod direction;
mod edges;
mod map_loader;
mod math;
mod node_arena;
mod occupancy;
mod open_set;
mod region_metadata;
mod search;
mod tile_grid;
mod weights;

pub use self::{
    direction::*, edges::*, map_loader::*, math::*, node_arena::*, occupancy::*, open_set::*,
    region_metadata::*, search::*, tile_grid::*, weights::*,
};
