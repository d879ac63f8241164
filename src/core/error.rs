//! Error taxonomy for the simulation core.
//!
//! Graph operations report `GraphError`; model configuration and lifecycle
//! report `ModelError`. Frontends and `main` wrap both in `anyhow`.

use thiserror::Error;

use super::graph::NodeId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node {node} is out of range (graph has {node_count} nodes)")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    #[error("no edge from node {from} to node {to}")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("could not generate a connected graph after {attempts} attempts")]
    GenerationFailed { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("edge probability must be in [0, 1], got {0}")]
    InvalidEdgeProbability(f64),

    #[error("max number of graph generation attempts must be positive")]
    InvalidMaxAttempts,

    #[error("start node {start} is out of range (graph has {node_count} nodes)")]
    StartNodeOutOfRange { start: NodeId, node_count: usize },

    #[error("layout extent must be positive, got {width} x {height}")]
    InvalidLayoutExtent { width: f64, height: f64 },

    #[error(transparent)]
    Graph(#[from] GraphError),
}
