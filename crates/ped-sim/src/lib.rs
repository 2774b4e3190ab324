//! `ped-sim`: tick loop orchestrator for the rust_ped core.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Lifecycle  report agents spawned / removed since the last tick.
//!   ② Peers      build the tick's mutual-visibility cache from the
//!                  positions agents hold before the tick.
//!   ③ Tactical   TacticalModel::tick over every agent
//!                  (parallel with the `parallel` feature).
//!   ④ Observe    on_tick_end with every agent's fresh state.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the tactical per-agent passes on Rayon's pool.    |
//! | `serde`    | Serialize / deserialize agent state and configs.       |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ped_core::SimConfig;
//! use ped_routing::{NavigationTarget, ShortestPathRouting};
//! use ped_sim::{NoopObserver, SimBuilder};
//! use ped_tactical::Behavior;
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), scenario, graph, ShortestPathRouting)
//!     .build()?;
//! sim.spawn(start, Behavior::Routing, Some(NavigationTarget::new(goal, goal_point)));
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
