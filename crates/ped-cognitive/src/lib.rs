//! `ped-cognitive`: routing on a distorted mental map.
//!
//! Each agent keeps its own picture of where the graph's vertices are.
//! Distances are bent by a random exponent near 0.95 (familiar places look
//! closer to how they really are) and directions are off by a von Mises
//! angle.  Routes are ordinary A* searches over those positions.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`von_mises`] | `VonMises` direction sampler, `bessel_i0`                  |
//! | [`extension`] | `CognitiveExtension` (per-agent map), `CognitiveWeights`, `distort` |
//! | [`routing`]   | `CognitiveRouting`, `CognitiveConfig`, `DistortionRefresh` |
//! | [`error`]     | `CognitiveError`, `CognitiveResult<T>`                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the config types.       |

pub mod error;
pub mod extension;
pub mod routing;
pub mod von_mises;


pub use error::{CognitiveError, CognitiveResult};
pub use extension::{distort, CognitiveExtension, CognitiveWeights};
pub use routing::{CognitiveConfig, CognitiveRouting, DistortionRefresh};
pub use von_mises::{bessel_i0, VonMises};
