//! Port-labelled adjacency-list graph.
//!
//! Node ids are dense indices (`0..node_count`). Every node keeps an ordered
//! list of outgoing edges; the position of an edge in that list is its
//! *port*, which is how robots choose where to move. Undirected graphs store
//! each edge once per endpoint.

use std::collections::VecDeque;
use std::ops::Range;

use super::error::GraphError;

pub type NodeId = usize;
pub type Port = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub weight: f64,
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub weight: f64,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Vertex>,
    is_directed: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Graph {
    pub fn new(is_directed: bool) -> Self {
        Self {
            nodes: Vec::new(),
            is_directed,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.is_directed
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.nodes
    }

    fn check_node(&self, node: NodeId) -> Result<(), GraphError> {
        if node < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange {
                node,
                node_count: self.nodes.len(),
            })
        }
    }

    pub fn add_node(&mut self, weight: f64) -> NodeId {
        self.nodes.push(Vertex {
            weight,
            edges: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Add an edge. Parallel edges are not rejected; generators never produce them.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, weight: f64) -> Result<(), GraphError> {
        self.check_node(source)?;
        self.check_node(target)?;
        self.push_edge(source, target, weight);
        Ok(())
    }

    /// `add_edge` for callers that only pass ids below `node_count`.
    /// Panics on an out-of-range id.
    pub(crate) fn push_edge(&mut self, source: NodeId, target: NodeId, weight: f64) {
        self.nodes[source].edges.push(Edge { weight, target });

        if !self.is_directed {
            self.nodes[target].edges.push(Edge {
                weight,
                target: source,
            });
        }
    }

    /// Remove a node and every edge pointing at it. Ids above `node` shift down by one.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), GraphError> {
        self.check_node(node)?;
        self.nodes.remove(node);

        for vertex in &mut self.nodes {
            vertex.edges.retain(|edge| edge.target != node);
            for edge in &mut vertex.edges {
                if edge.target > node {
                    edge.target -= 1;
                }
            }
        }
        Ok(())
    }

    pub fn remove_edge(&mut self, source: NodeId, target: NodeId) -> Result<(), GraphError> {
        self.check_node(source)?;
        self.check_node(target)?;

        let port = self
            .port_to(source, target)
            .ok_or(GraphError::EdgeNotFound {
                from: source,
                to: target,
            })?;
        self.nodes[source].edges.remove(port);

        if !self.is_directed {
            if let Some(reverse) = self.port_to(target, source) {
                self.nodes[target].edges.remove(reverse);
            }
        }
        Ok(())
    }

    pub fn set_node_weight(&mut self, node: NodeId, weight: f64) -> Result<(), GraphError> {
        self.check_node(node)?;
        self.nodes[node].weight = weight;
        Ok(())
    }

    pub fn set_edge_weight(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
    ) -> Result<(), GraphError> {
        self.check_node(source)?;
        self.check_node(target)?;

        let edge = self.nodes[source]
            .edges
            .iter_mut()
            .find(|edge| edge.target == target)
            .ok_or(GraphError::EdgeNotFound {
                from: source,
                to: target,
            })?;
        edge.weight = weight;

        if !self.is_directed {
            if let Some(reverse) = self.nodes[target]
                .edges
                .iter_mut()
                .find(|edge| edge.target == source)
            {
                reverse.weight = weight;
            }
        }
        Ok(())
    }

    pub fn node_ids(&self) -> Range<NodeId> {
        0..self.nodes.len()
    }

    pub fn node_weight(&self, node: NodeId) -> Option<f64> {
        self.nodes.get(node).map(|vertex| vertex.weight)
    }

    pub fn edge_weight(&self, source: NodeId, target: NodeId) -> Option<f64> {
        self.nodes
            .get(source)?
            .edges
            .iter()
            .find(|edge| edge.target == target)
            .map(|edge| edge.weight)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges; undirected edges are counted once.
    pub fn edge_count(&self) -> usize {
        let count: usize = self.nodes.iter().map(|vertex| vertex.edges.len()).sum();
        if self.is_directed {
            count
        } else {
            count / 2
        }
    }

    pub fn adjacent_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .map(|vertex| vertex.edges.iter().map(|edge| edge.target).collect())
            .unwrap_or_default()
    }

    /// Adjacent nodes other than `parent`.
    pub fn child_nodes(&self, node: NodeId, parent: NodeId) -> Vec<NodeId> {
        self.adjacent_nodes(node)
            .into_iter()
            .filter(|&adjacent| adjacent != parent)
            .collect()
    }

    pub fn are_adjacent(&self, source: NodeId, target: NodeId) -> bool {
        self.nodes
            .get(source)
            .is_some_and(|vertex| vertex.edges.iter().any(|edge| edge.target == target))
    }

    pub fn number_of_ports(&self, node: NodeId) -> usize {
        self.nodes.get(node).map_or(0, |vertex| vertex.edges.len())
    }

    pub fn adjacent_node_from_port(&self, node: NodeId, port: Port) -> Option<NodeId> {
        self.nodes.get(node)?.edges.get(port).map(|edge| edge.target)
    }

    /// Port on `node` leading to `adjacent`, if any.
    pub fn port_to(&self, node: NodeId, adjacent: NodeId) -> Option<Port> {
        self.nodes
            .get(node)?
            .edges
            .iter()
            .position(|edge| edge.target == adjacent)
    }

    /// BFS hop distances from `root`; `None` for unreachable nodes.
    fn bfs_distances(&self, root: NodeId) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.nodes.len()];
        if root >= self.nodes.len() {
            return dist;
        }

        let mut queue = VecDeque::new();
        dist[root] = Some(0);
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            let next = dist[current].map_or(0, |d| d + 1);
            for edge in &self.nodes[current].edges {
                if dist[edge.target].is_none() {
                    dist[edge.target] = Some(next);
                    queue.push_back(edge.target);
                }
            }
        }
        dist
    }

    /// Shortest path by hop count, including both endpoints.
    pub fn shortest_path(&self, source: NodeId, target: NodeId) -> Option<Vec<NodeId>> {
        if source >= self.nodes.len() || target >= self.nodes.len() {
            return None;
        }

        let mut parent: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        seen[source] = true;
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut path = vec![target];
                let mut node = target;
                while let Some(prev) = parent[node] {
                    path.push(prev);
                    node = prev;
                }
                path.reverse();
                return Some(path);
            }

            for edge in &self.nodes[current].edges {
                if !seen[edge.target] {
                    seen[edge.target] = true;
                    parent[edge.target] = Some(current);
                    queue.push_back(edge.target);
                }
            }
        }
        None
    }

    pub fn distance(&self, source: NodeId, target: NodeId) -> Option<usize> {
        self.bfs_distances(source).get(target).copied().flatten()
    }

    /// Largest hop distance from `root` to any node reachable from it.
    pub fn depth(&self, root: NodeId) -> usize {
        self.bfs_distances(root)
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(0)
    }

    pub fn reachable_from(&self, root: NodeId) -> Vec<bool> {
        self.bfs_distances(root)
            .into_iter()
            .map(|d| d.is_some())
            .collect()
    }

    /// Every node is reachable from node 0. Empty graphs count as connected.
    pub fn is_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return true;
        }
        self.reachable_from(0).into_iter().all(|reached| reached)
    }
}
