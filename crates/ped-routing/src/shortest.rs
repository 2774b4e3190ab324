//! Euclidean shortest-path routing.

use ped_core::{AgentId, AgentRng};
use ped_graph::{CostTable, EuclideanWeights, NavGraph, ShortestPath, WeightCalculator};
use tracing::warn;

use crate::navigation::{find_navigation_start_point, update_route_state};
use crate::{RoutingAgent, RoutingContext, RoutingModel, RoutingState};

/// A* over true vertex positions.  Each agent keeps its own [`CostTable`].
#[derive(Copy, Clone, Debug, Default)]
pub struct ShortestPathRouting;

impl RoutingModel for ShortestPathRouting {
    type Extension = CostTable;

    fn on_agent_spawn(&self, _agent: AgentId, graph: &NavGraph, _rng: &mut AgentRng) -> CostTable {
        CostTable::new(graph.vertex_count())
    }

    fn on_agent_removed(&self, _agent: AgentId, mut costs: CostTable) {
        EuclideanWeights.remove_weights(&mut costs);
    }

    fn route(
        &self,
        ctx:   &RoutingContext<'_>,
        agent: &RoutingAgent<'_>,
        costs: &mut CostTable,
        _rng:  &mut AgentRng,
    ) -> RoutingState {
        let Some(target) = agent.target else {
            warn!("{} has no navigation target", agent.id);
            return RoutingState::no_route(agent.state);
        };
        let Some(start) = find_navigation_start_point(ctx, agent) else {
            return RoutingState::no_route(agent.state);
        };

        let path = match ShortestPath::new(ctx.graph, &EuclideanWeights).find(start, target.vertex, costs) {
            Ok(path) => path,
            Err(e) => {
                warn!("{}: {}", agent.id, e);
                None
            }
        };
        update_route_state(ctx, agent, path.as_ref())
    }
}
