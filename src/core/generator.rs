//! Graph generators.
//!
//! Randomized generators take the RNG as a parameter so a seeded run
//! reproduces the same topology.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::graph::Graph;

const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GraphType {
    Path,
    Cycle,
    Complete,
    ErdosRenyiRandom,
    ArbitraryTree,
    BinaryTree,
}

impl GraphType {
    pub const ALL: [GraphType; 6] = [
        GraphType::Path,
        GraphType::Cycle,
        GraphType::Complete,
        GraphType::ErdosRenyiRandom,
        GraphType::ArbitraryTree,
        GraphType::BinaryTree,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Path => "Path",
            Self::Cycle => "Cycle",
            Self::Complete => "Complete",
            Self::ErdosRenyiRandom => "Erdős–Rényi",
            Self::ArbitraryTree => "Arbitrary tree",
            Self::BinaryTree => "Binary tree",
        }
    }
}

/// Parameters for building a graph. Validation lives in `SimulationModel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSettings {
    #[serde(rename = "type")]
    pub graph_type: GraphType,
    pub node_count: usize,
    #[serde(default = "default_edge_probability")]
    pub edge_probability: f64,
    #[serde(default)]
    pub directed: bool,
    #[serde(default)]
    pub allow_self_loops: bool,
    #[serde(default)]
    pub require_connected: bool,
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
}

fn default_edge_probability() -> f64 {
    0.5
}

fn default_max_generation_attempts() -> u32 {
    10
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            graph_type: GraphType::Path,
            node_count: 0,
            edge_probability: default_edge_probability(),
            directed: false,
            allow_self_loops: false,
            require_connected: false,
            max_generation_attempts: default_max_generation_attempts(),
        }
    }
}

pub struct GraphGenerator;

impl GraphGenerator {
    pub fn generate<R: Rng + ?Sized>(
        settings: &GraphSettings,
        rng: &mut R,
    ) -> Result<Graph, GraphError> {
        let n = settings.node_count;
        let directed = settings.directed;

        let graph = match settings.graph_type {
            GraphType::Path => Self::path(n, directed),
            GraphType::Cycle => Self::cycle(n, directed),
            GraphType::Complete => Self::complete(n, directed, settings.allow_self_loops),
            GraphType::ErdosRenyiRandom => {
                return Self::erdos_renyi(
                    rng,
                    n,
                    settings.edge_probability,
                    directed,
                    settings.allow_self_loops,
                    settings.require_connected,
                    settings.max_generation_attempts,
                )
            }
            GraphType::ArbitraryTree => Self::arbitrary_tree(rng, n, directed),
            GraphType::BinaryTree => Self::binary_tree(n, directed),
        };

        tracing::debug!(
            graph_type = ?settings.graph_type,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Generated graph"
        );
        Ok(graph)
    }

    fn with_nodes(n: usize, directed: bool) -> Graph {
        let mut graph = Graph::new(directed);
        for _ in 0..n {
            graph.add_node(DEFAULT_WEIGHT);
        }
        graph
    }

    pub fn path(n: usize, directed: bool) -> Graph {
        let mut graph = Self::with_nodes(n, directed);
        for i in 1..n {
            graph.push_edge(i - 1, i, DEFAULT_WEIGHT);
        }
        graph
    }

    /// Path plus a closing edge. The closing edge is skipped when it would be a
    /// self-loop or duplicate the path edge (n < 3 undirected, n < 2 directed).
    pub fn cycle(n: usize, directed: bool) -> Graph {
        let mut graph = Self::path(n, directed);
        let min_nodes = if directed { 2 } else { 3 };
        if n >= min_nodes {
            graph.push_edge(n - 1, 0, DEFAULT_WEIGHT);
        }
        graph
    }

    pub fn complete(n: usize, directed: bool, allow_self_loops: bool) -> Graph {
        let mut graph = Self::with_nodes(n, directed);
        for i in 0..n {
            let start = if directed { 0 } else { i };
            for j in start..n {
                if i != j || allow_self_loops {
                    graph.push_edge(i, j, DEFAULT_WEIGHT);
                }
            }
        }
        graph
    }

    /// G(n, p) random graph. With `require_connected`, retries up to
    /// `max_attempts` times before giving up.
    pub fn erdos_renyi<R: Rng + ?Sized>(
        rng: &mut R,
        n: usize,
        p: f64,
        directed: bool,
        allow_self_loops: bool,
        require_connected: bool,
        max_attempts: u32,
    ) -> Result<Graph, GraphError> {
        let attempts = max_attempts.max(1);

        for attempt in 1..=attempts {
            let mut graph = Self::with_nodes(n, directed);
            for i in 0..n {
                let start = if directed { 0 } else { i };
                for j in start..n {
                    if (i != j || allow_self_loops) && rng.random::<f64>() < p {
                        graph.push_edge(i, j, DEFAULT_WEIGHT);
                    }
                }
            }

            if !require_connected || graph.is_connected() {
                tracing::debug!(
                    attempt,
                    nodes = n,
                    edges = graph.edge_count(),
                    "Generated Erdős–Rényi graph"
                );
                return Ok(graph);
            }
            tracing::debug!(attempt, "Random graph was disconnected, retrying");
        }

        tracing::warn!(attempts, "Could not generate a connected graph");
        Err(GraphError::GenerationFailed { attempts })
    }

    /// Random recursive tree: node `i` attaches to a uniform node below it.
    pub fn arbitrary_tree<R: Rng + ?Sized>(rng: &mut R, n: usize, directed: bool) -> Graph {
        let mut graph = Self::with_nodes(n, directed);
        for i in 1..n {
            let parent = rng.random_range(0..i);
            graph.push_edge(parent, i, DEFAULT_WEIGHT);
        }
        graph
    }

    pub fn binary_tree(n: usize, directed: bool) -> Graph {
        let mut graph = Self::with_nodes(n, directed);
        for i in 1..n {
            graph.push_edge((i - 1) / 2, i, DEFAULT_WEIGHT);
        }
        graph
    }
}
