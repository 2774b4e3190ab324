//! `CognitiveRouting`: shortest paths over each agent's distorted map.

use ped_core::{AgentId, AgentRng};
use ped_graph::NavGraph;
use ped_routing::{
    find_navigation_start_point, update_route_state, RoutingAgent, RoutingContext, RoutingModel,
    RoutingState,
};
use tracing::{debug, trace, warn};

use crate::{CognitiveError, CognitiveExtension, CognitiveResult};

/// When an agent's mental map is re-sampled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistortionRefresh {
    /// Before every route, blended into the previous map.
    #[default]
    PerRoute,
    /// Once, on the agent's first route; the map is fixed afterwards.
    Once,
}

/// Parameters handed to every new [`CognitiveExtension`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CognitiveConfig {
    /// In `[0, 1]`.  Default: 0.9.
    pub familiarity:   f64,
    /// Von Mises κ for direction errors.  Default: 30.
    pub concentration: f64,
    pub refresh:       DistortionRefresh,
}

impl CognitiveConfig {
    pub fn validate(&self) -> CognitiveResult<()> {
        if !(0.0..=1.0).contains(&self.familiarity) {
            return Err(CognitiveError::Config(format!(
                "familiarity must lie in [0, 1], got {}",
                self.familiarity
            )));
        }
        if !(self.concentration >= 0.0) || !self.concentration.is_finite() {
            return Err(CognitiveError::Config(format!(
                "concentration must be non-negative and finite, got {}",
                self.concentration
            )));
        }
        Ok(())
    }
}

impl Default for CognitiveConfig {
    fn default() -> Self {
        Self {
            familiarity:   0.9,
            concentration: 30.0,
            refresh:       DistortionRefresh::PerRoute,
        }
    }
}

/// Routing model in which each agent plans on its own distorted copy of
/// the graph.
#[derive(Clone, Debug, Default)]
pub struct CognitiveRouting {
    config: CognitiveConfig,
}

impl CognitiveRouting {
    pub fn new(config: CognitiveConfig) -> CognitiveResult<Self> {
        config.validate()?;
        debug!(
            "cognitive routing: familiarity {}, concentration {}, refresh {:?}",
            config.familiarity, config.concentration, config.refresh
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &CognitiveConfig {
        &self.config
    }
}

impl RoutingModel for CognitiveRouting {
    type Extension = CognitiveExtension;

    fn on_agent_spawn(&self, _agent: AgentId, _graph: &NavGraph, _rng: &mut AgentRng) -> CognitiveExtension {
        CognitiveExtension::new(self.config.familiarity, self.config.concentration)
    }

    fn on_agent_removed(&self, agent: AgentId, mut extension: CognitiveExtension) {
        trace!("{}: dropping mental map", agent);
        extension.remove_weights();
    }

    fn route(
        &self,
        ctx:       &RoutingContext<'_>,
        agent:     &RoutingAgent<'_>,
        extension: &mut CognitiveExtension,
        rng:       &mut AgentRng,
    ) -> RoutingState {
        let Some(target) = agent.target else {
            warn!("{} has no navigation target", agent.id);
            return RoutingState::no_route(agent.state);
        };

        if self.config.refresh == DistortionRefresh::PerRoute || !extension.has_distortion() {
            extension.update_distortion(ctx.graph, agent.position, rng);
        }

        let Some(start) = find_navigation_start_point(ctx, agent) else {
            return RoutingState::no_route(agent.state);
        };
        let path = match extension.route(ctx.graph, start, target.vertex) {
            Ok(path) => path,
            Err(e) => {
                warn!("{}: {}", agent.id, e);
                None
            }
        };
        update_route_state(ctx, agent, path.as_ref())
    }
}
