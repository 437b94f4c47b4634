//! Read-only interface to the voxel world.
//!
//! Path jobs call these queries from worker threads, the navigator calls them
//! from the tick thread. Implementations must be cheap, synchronous, and safe
//! to call concurrently; the engine tolerates eventually-consistent staleness
//! and re-validates terrain on the tick thread while actually moving.

use crate::core::{CellPos, Direction, RailShape};

pub trait WorldGrid: Send + Sync {
    /// Whether world data for this cell is currently available. Searches abort
    /// (rather than fail hard) when they touch unloaded cells.
    fn is_loaded(&self, cell: CellPos) -> bool;

    /// Whether the cell blocks movement entirely.
    fn is_solid(&self, cell: CellPos) -> bool;

    /// Height of the cell's collision shape in fractions of a cell.
    /// `0.0` for empty cells, `1.0` for full cubes; may exceed `1.0` for
    /// blocks that reach into the cell above (fences and the like).
    fn collision_height(&self, cell: CellPos) -> f64;

    /// Whether the cell contains a liquid.
    fn is_liquid(&self, cell: CellPos) -> bool;

    /// Facing of the ladder in this cell, if any.
    fn ladder_facing(&self, cell: CellPos) -> Option<Direction>;

    /// Shape of the rail in this cell, if any.
    fn rail_shape(&self, cell: CellPos) -> Option<RailShape>;

    /// Whether the cell is a closed door (passable only to door-opening agents).
    fn is_door(&self, cell: CellPos) -> bool;

    /// Whether the cell is a tagged "path" surface (roads, faster to walk on).
    fn is_path_surface(&self, cell: CellPos) -> bool;

    /// Generic tag test used by find-nearest-of-tag goals.
    fn has_tag(&self, cell: CellPos, tag: &str) -> bool;
}
