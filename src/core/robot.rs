//! Robots and the coordinators that move them.
//!
//! A coordinator owns the swarm (robots plus the shared visited-node map) and
//! advances it one synchronous step at a time. Robots only know ports: at
//! each step a moving robot picks one of its current node's ports uniformly
//! at random.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::graph::{Graph, NodeId, Port};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotState {
    Active,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Robot {
    pub id: usize,
    pub start_node: NodeId,
    pub current_node: NodeId,
    pub ports_traversed: Vec<Port>,
    pub state: RobotState,
}

impl Robot {
    pub fn new(id: usize, start_node: NodeId) -> Self {
        Self {
            id,
            start_node,
            current_node: start_node,
            ports_traversed: Vec::new(),
            state: RobotState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == RobotState::Active
    }

    /// Move through `port`. Returns false (and stays put) if the port does not exist.
    fn traverse(&mut self, graph: &Graph, port: Port) -> bool {
        match graph.adjacent_node_from_port(self.current_node, port) {
            Some(next) => {
                self.current_node = next;
                self.ports_traversed.push(port);
                true
            }
            None => false,
        }
    }

    /// Take one uniformly random port out of the current node, if it has any.
    fn random_walk(&mut self, graph: &Graph, rng: &mut StdRng) -> bool {
        let ports = graph.number_of_ports(self.current_node);
        if ports == 0 {
            return false;
        }
        let port = rng.random_range(0..ports);
        self.traverse(graph, port)
    }
}

/// Robots plus the visited-node map they share.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Swarm {
    pub robots: Vec<Robot>,
    pub visited_nodes: Vec<bool>,
    pub step_number: u64,
}

impl Swarm {
    pub fn new(node_count: usize) -> Self {
        Self {
            robots: Vec::new(),
            visited_nodes: vec![false; node_count],
            step_number: 0,
        }
    }

    /// Place `count` robots on `start`, numbering them after any existing robots.
    pub fn create_robots(&mut self, count: usize, start: NodeId) -> Result<(), ModelError> {
        if count > 0 && start >= self.visited_nodes.len() {
            return Err(ModelError::StartNodeOutOfRange {
                start,
                node_count: self.visited_nodes.len(),
            });
        }

        let first_id = self.robots.len();
        self.robots
            .extend((first_id..first_id + count).map(|id| Robot::new(id, start)));
        Ok(())
    }

    pub fn visited_count(&self) -> usize {
        self.visited_nodes.iter().filter(|&&visited| visited).count()
    }

    pub fn stopped_count(&self) -> usize {
        self.robots.iter().filter(|robot| !robot.is_active()).count()
    }

    /// Mark `node` visited. Returns true if it was not visited before.
    fn visit(&mut self, node: NodeId) -> bool {
        match self.visited_nodes.get_mut(node) {
            Some(visited) if !*visited => {
                *visited = true;
                true
            }
            _ => false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorKind {
    Dispersion,
    Exploration,
}

impl CoordinatorKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Dispersion => "Random-walk dispersion",
            Self::Exploration => "Random-walk exploration",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Dispersion => Self::Exploration,
            Self::Exploration => Self::Dispersion,
        }
    }

    pub fn build(&self, swarm: Swarm) -> Box<dyn RobotCoordinator> {
        match self {
            Self::Dispersion => Box::new(RandomWalkDispersion::new(swarm)),
            Self::Exploration => Box::new(RandomWalkExploration::new(swarm)),
        }
    }
}

pub trait RobotCoordinator {
    fn kind(&self) -> CoordinatorKind;

    fn swarm(&self) -> &Swarm;

    /// Advance every robot by one synchronous step.
    fn step(&mut self, graph: &Graph, rng: &mut StdRng);

    /// True once further steps can no longer change the swarm's progress.
    fn is_finished(&self, graph: &Graph) -> bool;
}

/// Robots wander until each one settles on a node nobody has claimed yet.
#[derive(Debug, Clone)]
pub struct RandomWalkDispersion {
    swarm: Swarm,
}

impl RandomWalkDispersion {
    pub fn new(swarm: Swarm) -> Self {
        Self { swarm }
    }
}

impl RobotCoordinator for RandomWalkDispersion {
    fn kind(&self) -> CoordinatorKind {
        CoordinatorKind::Dispersion
    }

    fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    fn step(&mut self, graph: &Graph, rng: &mut StdRng) {
        let Swarm {
            robots,
            visited_nodes,
            step_number,
        } = &mut self.swarm;

        for robot in robots.iter_mut().filter(|robot| robot.is_active()) {
            if let Some(visited) = visited_nodes.get_mut(robot.current_node) {
                if !*visited {
                    *visited = true;
                    robot.state = RobotState::Stopped;
                    tracing::trace!(robot = robot.id, node = robot.current_node, "Robot settled");
                    continue;
                }
            }
            robot.random_walk(graph, rng);
        }

        *step_number += 1;
    }

    fn is_finished(&self, graph: &Graph) -> bool {
        self.swarm.robots.iter().all(|robot| {
            !robot.is_active()
                || (graph.number_of_ports(robot.current_node) == 0
                    && self
                        .swarm
                        .visited_nodes
                        .get(robot.current_node)
                        .copied()
                        .unwrap_or(true))
        })
    }
}

/// Robots wander forever, marking every node they reach.
#[derive(Debug, Clone)]
pub struct RandomWalkExploration {
    swarm: Swarm,
}

impl RandomWalkExploration {
    pub fn new(swarm: Swarm) -> Self {
        Self { swarm }
    }
}

impl RobotCoordinator for RandomWalkExploration {
    fn kind(&self) -> CoordinatorKind {
        CoordinatorKind::Exploration
    }

    fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    fn step(&mut self, graph: &Graph, rng: &mut StdRng) {
        let mut robots = std::mem::take(&mut self.swarm.robots);
        for robot in &mut robots {
            if self.swarm.visit(robot.current_node) {
                continue;
            }
            robot.random_walk(graph, rng);
        }
        self.swarm.robots = robots;
        self.swarm.step_number += 1;
    }

    fn is_finished(&self, graph: &Graph) -> bool {
        let starts: Vec<NodeId> = self.swarm.robots.iter().map(|r| r.start_node).collect();
        if starts.is_empty() {
            return true;
        }

        let mut reachable = vec![false; graph.node_count()];
        for start in starts {
            for (node, reached) in graph.reachable_from(start).into_iter().enumerate() {
                reachable[node] |= reached;
            }
        }

        reachable
            .iter()
            .zip(&self.swarm.visited_nodes)
            .all(|(&reached, &visited)| !reached || visited)
    }
}
