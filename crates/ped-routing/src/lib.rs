//! `ped-routing`: graph navigation for pedestrians.
//!
//! A routing model turns "go to that vertex" into "walk to this hop next".
//! The tactical layer asks it, in order: can the goal be seen directly
//! (shortcut)?  Is the current hop still good (re-routing check)?  If not,
//! plan again (route).
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`state`]      | `RoutingState`, `NavigationTarget`                         |
//! | [`model`]      | `RoutingModel` trait, `RoutingContext`, `RoutingAgent`     |
//! | [`navigation`] | Shared rules: start-point choice, route-state update, shortcut, re-route check |
//! | [`shortest`]   | `ShortestPathRouting` (Euclidean A*)                       |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the state types.        |

pub mod model;
pub mod navigation;
pub mod shortest;
pub mod state;

#[cfg(test)]
mod tests;

pub use model::{RoutingAgent, RoutingContext, RoutingModel};
pub use navigation::{find_navigation_start_point, re_routing_necessary, short_cut_route, update_route_state};
pub use shortest::ShortestPathRouting;
pub use state::{NavigationTarget, RoutingState};
