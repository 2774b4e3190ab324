//! `ped-core`: foundational types for the `rust_ped` crowd-simulation core.
//!
//! This crate is a dependency of every other `ped-*` crate.  It intentionally
//! has no `ped-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `VertexId`, `EdgeId`, `AreaId`, `LatticeId`     |
//! | [`geometry`]    | `Vec2`, `Segment`, `Polygon`, `Circle`, `Bounds`           |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                            |
//! | [`rng`]         | `AgentRng` (per-agent, deterministic)                      |
//! | [`error`]       | `PedError`, `PedResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geometry;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{PedError, PedResult};
pub use geometry::{Bounds, Circle, Polygon, Segment, Vec2};
pub use ids::{AgentId, AreaId, EdgeId, LatticeId, VertexId};
pub use rng::AgentRng;
pub use time::{SimClock, SimConfig, Tick};
