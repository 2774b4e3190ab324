use ped_core::{AgentId, PedError};
use ped_graph::GraphError;
use ped_perception::PerceptionError;
use ped_tactical::TacticalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("agent {0} is not in the simulation")]
    AgentNotFound(AgentId),

    #[error(transparent)]
    Core(#[from] PedError),

    #[error("perception set-up failed: {0}")]
    Perception(#[from] PerceptionError),

    #[error("tactical set-up failed: {0}")]
    Tactical(#[from] TacticalError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type SimResult<T> = Result<T, SimError>;
