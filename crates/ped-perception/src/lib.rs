//! `ped-perception`: what a pedestrian can see.
//!
//! Visibility is a straight-line ray cast over a pre-processed occupancy
//! lattice.  Obstacles are rasterized as `Fixed` cells; regions pedestrians
//! can never reach are sealed by a flood from the origin areas, so rays
//! cannot pass "through" closed rooms.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`scenario`]   | `Scenario`, `Area`, `PerceptionConfig`                     |
//! | [`visibility`] | `VisibilityMap` (pre-processing + queries), `PointOfInterest`, `VertexRef` |
//! | [`peers`]      | `AgentView`, `VisibilityCache`, `PeerVisibility`           |
//! | [`error`]      | `PerceptionError`, `PerceptionResult<T>`                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on configs and `Area`.     |

pub mod error;
pub mod peers;
pub mod scenario;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use error::{PerceptionError, PerceptionResult};
pub use peers::{AgentView, PeerVisibility, VisibilityCache};
pub use scenario::{Area, PerceptionConfig, Scenario};
pub use visibility::{PointOfInterest, VertexRef, VisibilityMap, DEFAULT_PERCEPTION_CELLS};
