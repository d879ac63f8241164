//! The simulation model: settings, the current graph, the robot coordinator
//! and a cached render projection.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::error::ModelError;
use super::generator::{GraphGenerator, GraphSettings, GraphType};
use super::graph::{Graph, NodeId};
use super::layout::{LayoutSettings, LayoutType};
use super::robot::{CoordinatorKind, Robot, RobotCoordinator, Swarm};
use super::visual::{VisualExport, VisualGraph};
use super::Model;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotSettings {
    pub algorithm: CoordinatorKind,
    pub count: usize,
    #[serde(default)]
    pub start_node: NodeId,
}

impl Default for RobotSettings {
    fn default() -> Self {
        Self {
            algorithm: CoordinatorKind::Dispersion,
            count: 1,
            start_node: 0,
        }
    }
}

/// Everything needed to build a simulation; the `[graph]`, `[robots]` and
/// `[layout]` config sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub graph: GraphSettings,
    pub robots: RobotSettings,
    pub layout: LayoutSettings,
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_edge_probability(self.graph.edge_probability)?;
        validate_max_attempts(self.graph.max_generation_attempts)?;
        validate_layout_extent(self.layout.width, self.layout.height)?;
        Ok(())
    }
}

fn validate_edge_probability(p: f64) -> Result<(), ModelError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ModelError::InvalidEdgeProbability(p))
    }
}

fn validate_max_attempts(attempts: u32) -> Result<(), ModelError> {
    if attempts >= 1 {
        Ok(())
    } else {
        Err(ModelError::InvalidMaxAttempts)
    }
}

fn validate_layout_extent(width: f64, height: f64) -> Result<(), ModelError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidLayoutExtent { width, height })
    }
}

/// One edit to the settings, as issued from a view. Adjustments are deltas
/// applied to the current value and then validated like the setters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingChange {
    NextGraphType,
    AdjustNodeCount(isize),
    AdjustEdgeProbability(f64),
    AdjustMaxGenerationAttempts(i32),
    ToggleDirected,
    ToggleSelfLoops,
    ToggleRequireConnected,
    NextAlgorithm,
    AdjustRobotCount(isize),
    AdjustStartNode(isize),
}

/// Read-only copy of everything a view draws.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSnapshot {
    pub visual: VisualGraph,
    pub robots: Vec<Robot>,
    pub visited_nodes: Vec<bool>,
    pub step_number: u64,
    pub algorithm: CoordinatorKind,
    pub graph_type: GraphType,
    pub layout_type: LayoutType,
    pub directed: bool,
    pub finished: bool,
    /// Settings the next regenerate or reset will use
    pub settings: SimulationSettings,
}

impl SimulationSnapshot {
    pub fn visited_count(&self) -> usize {
        self.visited_nodes.iter().filter(|&&visited| visited).count()
    }

    pub fn stopped_count(&self) -> usize {
        self.robots.iter().filter(|robot| !robot.is_active()).count()
    }
}

pub struct SimulationModel {
    settings: SimulationSettings,
    graph: Graph,
    coordinator: Box<dyn RobotCoordinator>,
    visual: VisualGraph,
    rng: StdRng,
}

impl SimulationModel {
    /// Validate settings and build the first graph. Without a seed the RNG is
    /// seeded from the OS.
    pub fn new(settings: SimulationSettings, seed: Option<u64>) -> Result<Self, ModelError> {
        settings.validate()?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let graph = GraphGenerator::generate(&settings.graph, &mut rng)?;
        let coordinator = Self::build_coordinator(&graph, &settings.robots)?;
        let visual = VisualGraph::new(&graph, &settings.layout, &mut rng);

        tracing::info!(
            graph_type = ?settings.graph.graph_type,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            robots = settings.robots.count,
            algorithm = ?settings.robots.algorithm,
            seed = ?seed,
            "Simulation created"
        );

        Ok(Self {
            settings,
            graph,
            coordinator,
            visual,
            rng,
        })
    }

    fn build_coordinator(
        graph: &Graph,
        robots: &RobotSettings,
    ) -> Result<Box<dyn RobotCoordinator>, ModelError> {
        let mut swarm = Swarm::new(graph.node_count());
        swarm.create_robots(robots.count, robots.start_node)?;
        Ok(robots.algorithm.build(swarm))
    }

    /// Build a new graph from the current settings and restart the robots on it.
    /// On failure the previous graph stays in place.
    pub fn generate_graph(&mut self) -> Result<(), ModelError> {
        let graph = GraphGenerator::generate(&self.settings.graph, &mut self.rng)?;
        let coordinator = Self::build_coordinator(&graph, &self.settings.robots)?;

        self.visual = VisualGraph::new(&graph, &self.settings.layout, &mut self.rng);
        self.graph = graph;
        self.coordinator = coordinator;

        tracing::info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "Graph regenerated"
        );
        Ok(())
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn robots(&self) -> &[Robot] {
        &self.coordinator.swarm().robots
    }

    pub fn swarm(&self) -> &Swarm {
        self.coordinator.swarm()
    }

    pub fn visual(&self) -> &VisualGraph {
        &self.visual
    }

    pub fn export(&self) -> VisualExport {
        self.visual.export(&self.graph, self.robots())
    }

    // Graph settings take effect on the next `generate_graph`.

    pub fn node_count(&self) -> usize {
        self.settings.graph.node_count
    }

    pub fn set_node_count(&mut self, node_count: usize) {
        self.settings.graph.node_count = node_count;
    }

    pub fn edge_probability(&self) -> f64 {
        self.settings.graph.edge_probability
    }

    pub fn set_edge_probability(&mut self, p: f64) -> Result<(), ModelError> {
        validate_edge_probability(p)?;
        self.settings.graph.edge_probability = p;
        Ok(())
    }

    pub fn max_generation_attempts(&self) -> u32 {
        self.settings.graph.max_generation_attempts
    }

    pub fn set_max_generation_attempts(&mut self, attempts: u32) -> Result<(), ModelError> {
        validate_max_attempts(attempts)?;
        self.settings.graph.max_generation_attempts = attempts;
        Ok(())
    }

    pub fn graph_type(&self) -> GraphType {
        self.settings.graph.graph_type
    }

    pub fn set_graph_type(&mut self, graph_type: GraphType) {
        self.settings.graph.graph_type = graph_type;
    }

    pub fn directed(&self) -> bool {
        self.settings.graph.directed
    }

    pub fn set_directed(&mut self, directed: bool) {
        self.settings.graph.directed = directed;
    }

    pub fn allow_self_loops(&self) -> bool {
        self.settings.graph.allow_self_loops
    }

    pub fn set_allow_self_loops(&mut self, allow: bool) {
        self.settings.graph.allow_self_loops = allow;
    }

    pub fn require_connected(&self) -> bool {
        self.settings.graph.require_connected
    }

    pub fn set_require_connected(&mut self, require: bool) {
        self.settings.graph.require_connected = require;
    }

    pub fn layout_type(&self) -> LayoutType {
        self.settings.layout.layout_type
    }

    /// Applies immediately to the current graph.
    pub fn set_layout_type(&mut self, layout_type: LayoutType) {
        self.settings.layout.layout_type = layout_type;
        self.visual
            .relayout(&self.graph, &self.settings.layout, &mut self.rng);
    }

    // Robot settings take effect on the next `reset` or `generate_graph`.

    pub fn algorithm(&self) -> CoordinatorKind {
        self.settings.robots.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: CoordinatorKind) {
        self.settings.robots.algorithm = algorithm;
    }

    pub fn robot_count(&self) -> usize {
        self.settings.robots.count
    }

    pub fn set_robot_count(&mut self, count: usize) {
        self.settings.robots.count = count;
    }

    pub fn start_node(&self) -> NodeId {
        self.settings.robots.start_node
    }

    /// Rejected if `start` is not a node of the current graph.
    pub fn set_start_node(&mut self, start: NodeId) -> Result<(), ModelError> {
        if start >= self.graph.node_count() {
            return Err(ModelError::StartNodeOutOfRange {
                start,
                node_count: self.graph.node_count(),
            });
        }
        self.settings.robots.start_node = start;
        Ok(())
    }
}

impl Model for SimulationModel {
    fn step(&mut self) {
        self.coordinator.step(&self.graph, &mut self.rng);
        tracing::trace!(step = self.coordinator.swarm().step_number, "Simulation step");
    }

    fn reset(&mut self) -> Result<(), ModelError> {
        self.coordinator = Self::build_coordinator(&self.graph, &self.settings.robots)?;
        tracing::debug!("Robots reset");
        Ok(())
    }

    fn regenerate(&mut self) -> Result<(), ModelError> {
        self.generate_graph()
    }

    fn cycle_layout(&mut self) {
        let next = self.layout_type().next();
        tracing::debug!(layout = ?next, "Switching layout");
        self.set_layout_type(next);
    }

    fn apply_setting(&mut self, change: SettingChange) -> Result<(), ModelError> {
        match change {
            SettingChange::NextGraphType => self.set_graph_type(self.graph_type().next()),
            SettingChange::AdjustNodeCount(delta) => {
                self.set_node_count(self.node_count().saturating_add_signed(delta))
            }
            SettingChange::AdjustEdgeProbability(delta) => {
                // Round so repeated steps of 0.05 stay on the grid
                let p = ((self.edge_probability() + delta) * 100.0).round() / 100.0;
                self.set_edge_probability(p)?;
            }
            SettingChange::AdjustMaxGenerationAttempts(delta) => self
                .set_max_generation_attempts(
                    self.max_generation_attempts().saturating_add_signed(delta),
                )?,
            SettingChange::ToggleDirected => self.set_directed(!self.directed()),
            SettingChange::ToggleSelfLoops => self.set_allow_self_loops(!self.allow_self_loops()),
            SettingChange::ToggleRequireConnected => {
                self.set_require_connected(!self.require_connected())
            }
            SettingChange::NextAlgorithm => self.set_algorithm(self.algorithm().next()),
            SettingChange::AdjustRobotCount(delta) => {
                self.set_robot_count(self.robot_count().saturating_add_signed(delta))
            }
            SettingChange::AdjustStartNode(delta) => {
                self.set_start_node(self.start_node().saturating_add_signed(delta))?
            }
        }
        tracing::debug!(?change, "Setting changed");
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.coordinator.is_finished(&self.graph)
    }

    fn snapshot(&self) -> Option<SimulationSnapshot> {
        let swarm = self.coordinator.swarm();
        Some(SimulationSnapshot {
            visual: self.visual.clone(),
            robots: swarm.robots.clone(),
            visited_nodes: swarm.visited_nodes.clone(),
            step_number: swarm.step_number,
            algorithm: self.coordinator.kind(),
            graph_type: self.settings.graph.graph_type,
            layout_type: self.visual.layout_type,
            directed: self.graph.is_directed(),
            finished: self.is_finished(),
            settings: self.settings().clone(),
        })
    }
}
