//! Tactical-layer configuration.

use crate::{Behavior, TacticalError, TacticalResult};

/// Switches for the tactical state machine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TacticalConfig {
    /// Fixes every agent's nominal behavior.  `None` uses each agent's
    /// own `behavior_task`.
    pub strategic_command: Option<Behavior>,

    /// Distance to the walking target at which a small-scale behavior
    /// stands still.  Default: 0.15.
    pub goal_distance_radius: f64,

    /// Distance at which a route hop counts as reached.  Default: 0.15.
    pub navigation_distance_radius: f64,

    /// Bottom-up override and goal shortcutting.  Default: on.
    pub tactical_control: bool,

    /// Extra hops of route look-ahead.  0 disables it.
    pub deep_node_selection: u32,

    /// Keep the visited-vertex history between routing episodes.
    pub route_memory: bool,
}

impl TacticalConfig {
    pub fn validate(&self) -> TacticalResult<()> {
        for (name, value) in [
            ("goal_distance_radius", self.goal_distance_radius),
            ("navigation_distance_radius", self.navigation_distance_radius),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(TacticalError::Config(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for TacticalConfig {
    fn default() -> Self {
        Self {
            strategic_command:          None,
            goal_distance_radius:       0.15,
            navigation_distance_radius: 0.15,
            tactical_control:           true,
            deep_node_selection:        0,
            route_memory:               true,
        }
    }
}
