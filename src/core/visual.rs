//! Render-ready projection of a graph: named nodes, deduplicated edges and a
//! layout. Also produces the `v-network-graph`-shaped JSON used by `export`.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use super::graph::{Graph, NodeId, Port};
use super::layout::{LayoutGenerator, LayoutSettings, LayoutType, Position};
use super::robot::Robot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualNode {
    pub name: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub source_port: Port,
    /// Port on the target leading back; `None` for one-way edges.
    pub target_port: Option<Port>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisualGraph {
    pub nodes: Vec<VisualNode>,
    /// (edge id, edge), in source-node then port order.
    pub edges: Vec<(String, VisualEdge)>,
    pub positions: Vec<Position>,
    pub layout_type: LayoutType,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeLayouts {
    pub nodes: BTreeMap<String, Position>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RobotPath {
    pub edges: Vec<String>,
}

/// JSON document written by `robograph export`.
#[derive(Debug, Clone, Serialize)]
pub struct VisualExport {
    pub nodes: BTreeMap<String, VisualNode>,
    pub edges: BTreeMap<String, VisualEdge>,
    pub layouts: NodeLayouts,
    pub paths: BTreeMap<String, RobotPath>,
}

/// Edge ids are `"<source>-<target>"`; undirected edges always use the smaller id first.
pub fn edge_id(graph: &Graph, source: NodeId, target: NodeId) -> String {
    if !graph.is_directed() && target < source {
        format!("{target}-{source}")
    } else {
        format!("{source}-{target}")
    }
}

impl VisualGraph {
    pub fn new<R: Rng + ?Sized>(graph: &Graph, layout: &LayoutSettings, rng: &mut R) -> Self {
        Self {
            nodes: Self::extract_nodes(graph),
            edges: Self::extract_edges(graph),
            positions: LayoutGenerator::generate(graph, layout, rng),
            layout_type: layout.layout_type,
        }
    }

    pub fn extract_nodes(graph: &Graph) -> Vec<VisualNode> {
        graph
            .vertices()
            .iter()
            .enumerate()
            .map(|(id, vertex)| VisualNode {
                name: id.to_string(),
                weight: vertex.weight,
            })
            .collect()
    }

    pub fn extract_edges(graph: &Graph) -> Vec<(String, VisualEdge)> {
        let mut edges = Vec::new();

        for (source, vertex) in graph.vertices().iter().enumerate() {
            for (port, edge) in vertex.edges.iter().enumerate() {
                // The reverse copy of an undirected edge is emitted from the smaller endpoint
                if !graph.is_directed() && edge.target < source {
                    continue;
                }
                // Undirected self-loops occupy two ports; keep the first
                if !graph.is_directed()
                    && edge.target == source
                    && graph.port_to(source, source) != Some(port)
                {
                    continue;
                }

                edges.push((
                    edge_id(graph, source, edge.target),
                    VisualEdge {
                        source: source.to_string(),
                        target: edge.target.to_string(),
                        weight: edge.weight,
                        source_port: port,
                        target_port: graph.port_to(edge.target, source),
                    },
                ));
            }
        }

        edges
    }

    pub fn relayout<R: Rng + ?Sized>(&mut self, graph: &Graph, layout: &LayoutSettings, rng: &mut R) {
        self.positions = LayoutGenerator::generate(graph, layout, rng);
        self.layout_type = layout.layout_type;
    }

    /// Edge ids the robot has walked, in order, replayed from its start node.
    pub fn robot_path(robot: &Robot, graph: &Graph) -> Vec<String> {
        let mut source = robot.start_node;
        let mut edges = Vec::with_capacity(robot.ports_traversed.len());

        for &port in &robot.ports_traversed {
            let Some(target) = graph.adjacent_node_from_port(source, port) else {
                tracing::warn!(robot = robot.id, node = source, port, "Robot path has a dangling port");
                break;
            };
            edges.push(edge_id(graph, source, target));
            source = target;
        }

        edges
    }

    pub fn export(&self, graph: &Graph, robots: &[Robot]) -> VisualExport {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| (id.to_string(), node.clone()))
            .collect();

        let edges = self.edges.iter().cloned().collect();

        let layouts = NodeLayouts {
            nodes: self
                .positions
                .iter()
                .enumerate()
                .map(|(id, position)| (id.to_string(), *position))
                .collect(),
        };

        let paths = robots
            .iter()
            .map(|robot| {
                (
                    robot.id.to_string(),
                    RobotPath {
                        edges: Self::robot_path(robot, graph),
                    },
                )
            })
            .collect();

        VisualExport {
            nodes,
            edges,
            layouts,
            paths,
        }
    }
}
