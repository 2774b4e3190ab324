//! Simulation observer trait for progress reporting and data collection.

use ped_core::{AgentId, Tick};
use ped_tactical::Pedestrian;

/// Callbacks invoked by [`Sim::step`][crate::Sim::step] and
/// [`Sim::run`][crate::Sim::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: standing counter
///
/// ```rust,ignore
/// struct Standing(usize);
///
/// impl SimObserver for Standing {
///     fn on_tick_end<E>(&mut self, _tick: Tick, agents: &[Pedestrian<E>]) {
///         self.0 += agents
///             .iter()
///             .filter(|a| a.state.tactical_state.motoric == Motoric::Standing)
///             .count();
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per agent spawned since the previous tick, right after
    /// `on_tick_start`.
    fn on_agent_spawned(&mut self, _tick: Tick, _agent: AgentId) {}

    /// Called once per agent removed since the previous tick, right after
    /// the spawn notifications.
    fn on_agent_removed(&mut self, _tick: Tick, _agent: AgentId) {}

    /// Called after the tactical pass with every agent's fresh state.
    fn on_tick_end<E>(&mut self, _tick: Tick, _agents: &[Pedestrian<E>]) {}

    /// Called once after the final tick of [`Sim::run`][crate::Sim::run].
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
