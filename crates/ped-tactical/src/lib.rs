//! `ped-tactical`: which behavior each pedestrian performs this tick.
//!
//! Every tick the state machine picks exactly one of `None`, `Routing`,
//! `Queuing`, `Staying` or `Searching` per agent.  The nominal command comes
//! from the strategic layer; when it needs a goal the agent cannot yet see,
//! routing takes over until the goal comes into view.  Routing itself runs
//! here.  The other three are delegated to optional [`TacticalBehavior`]
//! sub-models.  A final pass turns the outcome into a Walking / Standing
//! directive for locomotion.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`state`]    | `Behavior`, `Motoric`, `TacticalState`, `PedestrianState`, `Pedestrian`, sub-behavior states |
//! | [`config`]   | `TacticalConfig`                                             |
//! | [`behavior`] | `TacticalBehavior` trait, `TacticalContext`                  |
//! | [`model`]    | `TacticalModel` (selection, dispatch, look-ahead, motoric)   |
//! | [`error`]    | `TacticalError`, `TacticalResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Per-agent passes run on Rayon's thread pool.              |
//! | `serde`    | Derives `Serialize`/`Deserialize` on state and config.    |

pub mod behavior;
pub mod config;
pub mod error;
pub mod model;
pub mod state;


pub use behavior::{TacticalBehavior, TacticalContext};
pub use config::TacticalConfig;
pub use error::{TacticalError, TacticalResult};
pub use model::TacticalModel;
pub use state::{
    Behavior, Motoric, Pedestrian, PedestrianState, QueuingState, SearchingState, StandingState,
    StayingState, TacticalState,
};
