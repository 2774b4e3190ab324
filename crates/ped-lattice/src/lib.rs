//! `ped-lattice`: the discretized occupancy grid.
//!
//! A [`Lattice`] is a rectangular array of square cells laid over the
//! scenario.  Each cell is in exactly one [`CellState`]: a permanent
//! obstacle (`Fixed`), a transient occupant (`Dynamic`), or free (`Empty`,
//! optionally carrying a scalar such as a distance-map value).
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`cell`]    | `CellIndex`, `CellState`, `Neighborhood`                    |
//! | [`lattice`] | `Lattice`: index mapping, per-cell atomic reads and writes  |
//! | [`raster`]  | `Shape`, segment/polygon/circle rasterization               |
//! | [`cast`]    | `LineCast`, 4-connected Bresenham line casts                |
//! | [`flood`]   | Reachability flood fill, dead-region sealing, distance map  |
//! | [`error`]   | `LatticeError`, `LatticeResult<T>`                          |
//!
//! # Concurrency
//!
//! Cells are stored as `AtomicU64`s.  `occupy` and `free` are single-cell
//! compare-and-set operations, so agents on different threads can claim cells
//! without a grid-wide lock.  Whole-grid passes (`flood`, `set_all`, the
//! distance map) take `&mut self`: they belong to pre-processing, before any
//! agent task runs.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `CellIndex` and friends. |

pub mod cast;
pub mod cell;
pub mod error;
pub mod flood;
pub mod lattice;
pub mod raster;

#[cfg(test)]
mod tests;

pub use cast::LineCast;
pub use cell::{CellIndex, CellState, Neighborhood};
pub use error::{LatticeError, LatticeResult};
pub use lattice::Lattice;
pub use raster::Shape;
