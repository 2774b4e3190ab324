//! Fluent builder for constructing a [`Sim`].

use ped_core::SimConfig;
use ped_graph::NavGraph;
use ped_perception::{PeerVisibility, PerceptionConfig, Scenario, VisibilityMap};
use ped_routing::RoutingModel;
use ped_tactical::{TacticalBehavior, TacticalConfig, TacticalModel};
use tracing::info;

use crate::{Sim, SimResult};

/// Fluent builder for [`Sim<R>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, time step, …
/// - [`Scenario`]: bounds, obstacles and areas of the walkable world
/// - [`NavGraph`]: the navigation graph agents route on
/// - `R: RoutingModel`: e.g. [`ped_routing::ShortestPathRouting`]
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                      |
/// |-------------------|------------------------------|
/// | `.perception(c)`  | `PerceptionConfig::default()`|
/// | `.tactical(c)`    | `TacticalConfig::default()`  |
/// | `.staying(m)`     | none; staying agents idle    |
/// | `.queuing(m)`     | none; queuing agents idle    |
/// | `.searching(m)`   | none; searching agents idle  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, scenario, graph, ShortestPathRouting)
///     .tactical(TacticalConfig { deep_node_selection: 2, ..Default::default() })
///     .build()?;
/// sim.spawn(start, Behavior::Routing, Some(goal));
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: RoutingModel> {
    config:     SimConfig,
    scenario:   Scenario,
    graph:      NavGraph,
    routing:    R,
    perception: Option<PerceptionConfig>,
    tactical:   Option<TacticalConfig>,
    staying:    Option<Box<dyn TacticalBehavior>>,
    queuing:    Option<Box<dyn TacticalBehavior>>,
    searching:  Option<Box<dyn TacticalBehavior>>,
}

impl<R: RoutingModel> SimBuilder<R> {
    pub fn new(config: SimConfig, scenario: Scenario, graph: NavGraph, routing: R) -> Self {
        Self {
            config,
            scenario,
            graph,
            routing,
            perception: None,
            tactical:   None,
            staying:    None,
            queuing:    None,
            searching:  None,
        }
    }

    pub fn perception(mut self, config: PerceptionConfig) -> Self {
        self.perception = Some(config);
        self
    }

    pub fn tactical(mut self, config: TacticalConfig) -> Self {
        self.tactical = Some(config);
        self
    }

    pub fn staying(mut self, model: impl TacticalBehavior + 'static) -> Self {
        self.staying = Some(Box::new(model));
        self
    }

    pub fn queuing(mut self, model: impl TacticalBehavior + 'static) -> Self {
        self.queuing = Some(Box::new(model));
        self
    }

    pub fn searching(mut self, model: impl TacticalBehavior + 'static) -> Self {
        self.searching = Some(Box::new(model));
        self
    }

    /// Validate every configuration, pre-process the visibility grid, and
    /// return a ready-to-run [`Sim`] with no agents.
    pub fn build(self) -> SimResult<Sim<R>> {
        self.config.validate()?;

        let perception_config = self.perception.unwrap_or_default();
        let perception = VisibilityMap::preprocess(&self.scenario, &self.graph, &perception_config)?;

        let mut tactical = TacticalModel::new(self.tactical.unwrap_or_default(), self.routing)?;
        if let Some(m) = self.staying {
            tactical = tactical.with_staying(m);
        }
        if let Some(m) = self.queuing {
            tactical = tactical.with_queuing(m);
        }
        if let Some(m) = self.searching {
            tactical = tactical.with_searching(m);
        }

        info!(
            "sim ready: {} vertices, {} edges, {} perception cells, {} ticks",
            self.graph.vertex_count(),
            self.graph.edge_count(),
            perception.perception_cells(),
            self.config.total_ticks
        );

        Ok(Sim::new(self.config, self.scenario, self.graph, perception, PeerVisibility::new(), tactical))
    }
}
