//! `ped-graph`: navigation graph, spatial indexing, and shortest paths.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`graph`]  | `NavGraph` (CSR + R-tree + named weights), `NavGraphBuilder` |
//! | [`weight`] | `WeightCalculator` trait, `CostTable`, `Estimate`, `EuclideanWeights`, `NamedEdgeWeights` |
//! | [`search`] | `ShortestPath` (A*), `Path`, `shortest_path`                 |
//! | [`error`]  | `GraphError`, `GraphResult<T>`                               |
//!
//! # Pluggability
//!
//! The search engine never decides what a vertex "costs".  It asks a
//! [`WeightCalculator`] for every relaxation, so the same A* runs over true
//! geometry ([`EuclideanWeights`]), over an agent's distorted mental map
//! (`ped-cognitive`), or over annotated edge costs ([`NamedEdgeWeights`]).
//!
//! Tentative costs live in a [`CostTable`] owned by the caller, never on the
//! graph, so any number of searches can share one `&NavGraph`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Path`.                 |

pub mod error;
pub mod graph;
pub mod search;
pub mod weight;


pub use error::{GraphError, GraphResult};
pub use graph::{NavGraph, NavGraphBuilder};
pub use search::{shortest_path, Path, ShortestPath};
pub use weight::{CostTable, Estimate, EuclideanWeights, NamedEdgeWeights, WeightCalculator};
