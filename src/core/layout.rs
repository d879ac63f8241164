//! Node placement for rendering.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    Random,
    Circular,
    LinearHorizontal,
    LinearVertical,
    ForceDirected,
}

impl LayoutType {
    pub const ALL: [LayoutType; 5] = [
        LayoutType::Random,
        LayoutType::Circular,
        LayoutType::LinearHorizontal,
        LayoutType::LinearVertical,
        LayoutType::ForceDirected,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|&l| l == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::Circular => "Circular",
            Self::LinearHorizontal => "Linear (horizontal)",
            Self::LinearVertical => "Linear (vertical)",
            Self::ForceDirected => "Force directed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    #[serde(rename = "type")]
    pub layout_type: LayoutType,
    #[serde(default = "default_extent")]
    pub width: f64,
    #[serde(default = "default_extent")]
    pub height: f64,
}

fn default_extent() -> f64 {
    1000.0
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            layout_type: LayoutType::Circular,
            width: default_extent(),
            height: default_extent(),
        }
    }
}

const FORCE_ITERATIONS: usize = 200;

pub struct LayoutGenerator;

impl LayoutGenerator {
    /// One position per node, indexed by node id.
    pub fn generate<R: Rng + ?Sized>(
        graph: &Graph,
        settings: &LayoutSettings,
        rng: &mut R,
    ) -> Vec<Position> {
        let n = graph.node_count();
        let (width, height) = (settings.width, settings.height);

        match settings.layout_type {
            LayoutType::Random => Self::random(n, width, height, rng),
            LayoutType::Circular => Self::circular(n, width, height),
            LayoutType::LinearHorizontal => Self::linear_horizontal(n, width),
            LayoutType::LinearVertical => Self::linear_vertical(n, height),
            LayoutType::ForceDirected => Self::force_directed(graph, width, height),
        }
    }

    pub fn random<R: Rng + ?Sized>(n: usize, width: f64, height: f64, rng: &mut R) -> Vec<Position> {
        (0..n)
            .map(|_| Position {
                x: rng.random::<f64>() * width,
                y: rng.random::<f64>() * height,
            })
            .collect()
    }

    /// Evenly spaced on a circle centered at the origin.
    pub fn circular(n: usize, width: f64, height: f64) -> Vec<Position> {
        let radius = width.min(height) / 2.0 * 0.9;
        let step = 2.0 * PI / n.max(1) as f64;

        (0..n)
            .map(|i| {
                let angle = step * i as f64;
                Position {
                    x: radius * angle.cos(),
                    y: radius * angle.sin(),
                }
            })
            .collect()
    }

    pub fn linear_horizontal(n: usize, width: f64) -> Vec<Position> {
        let step = width / n.max(1) as f64;
        (0..n)
            .map(|i| Position {
                x: step * i as f64,
                y: 0.0,
            })
            .collect()
    }

    pub fn linear_vertical(n: usize, height: f64) -> Vec<Position> {
        let step = height / n.max(1) as f64;
        (0..n)
            .map(|i| Position {
                x: 0.0,
                y: step * i as f64,
            })
            .collect()
    }

    /// Fruchterman-Reingold spring embedding seeded from the circular layout.
    /// Deterministic for a given graph.
    pub fn force_directed(graph: &Graph, width: f64, height: f64) -> Vec<Position> {
        let n = graph.node_count();
        let mut positions = Self::circular(n, width, height);
        if n < 2 {
            return positions;
        }

        let area = width * height;
        let k = (area / n as f64).sqrt();
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        let mut temperature = width.min(height) / 10.0;
        let cooling = temperature / FORCE_ITERATIONS as f64;

        for _ in 0..FORCE_ITERATIONS {
            let mut disp = vec![(0.0f64, 0.0f64); n];

            for v in 0..n {
                for u in (v + 1)..n {
                    let dx = positions[v].x - positions[u].x;
                    let dy = positions[v].y - positions[u].y;
                    let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                    let force = k * k / dist;
                    let (fx, fy) = (dx / dist * force, dy / dist * force);
                    disp[v].0 += fx;
                    disp[v].1 += fy;
                    disp[u].0 -= fx;
                    disp[u].1 -= fy;
                }
            }

            for (v, vertex) in graph.vertices().iter().enumerate() {
                for edge in &vertex.edges {
                    let u = edge.target;
                    if u == v {
                        continue;
                    }
                    let dx = positions[v].x - positions[u].x;
                    let dy = positions[v].y - positions[u].y;
                    let dist = (dx * dx + dy * dy).sqrt().max(0.01);
                    // Undirected edges are stored twice; each copy pulls half as hard.
                    let scale = if graph.is_directed() { 1.0 } else { 0.5 };
                    let force = dist * dist / k * scale;
                    let (fx, fy) = (dx / dist * force, dy / dist * force);
                    disp[v].0 -= fx;
                    disp[v].1 -= fy;
                    disp[u].0 += fx;
                    disp[u].1 += fy;
                }
            }

            for (position, (dx, dy)) in positions.iter_mut().zip(disp) {
                let length = (dx * dx + dy * dy).sqrt();
                if length > 0.0 {
                    let capped = length.min(temperature);
                    position.x += dx / length * capped;
                    position.y += dy / length * capped;
                }
                position.x = position.x.clamp(-half_w, half_w);
                position.y = position.y.clamp(-half_h, half_h);
            }

            temperature = (temperature - cooling).max(0.0);
        }

        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::GraphGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_circular_layout() {
        let positions = LayoutGenerator::circular(4, 1000.0, 800.0);
        let radius = 360.0;
        assert!(approx(positions[0].x, radius));
        assert!(approx(positions[0].y, 0.0));
        assert!(approx(positions[1].x, 0.0));
        assert!(approx(positions[1].y, radius));
        assert!(approx(positions[2].x, -radius));
    }

    #[test]
    fn test_linear_layouts() {
        let horizontal = LayoutGenerator::linear_horizontal(4, 1000.0);
        let xs: Vec<f64> = horizontal.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 250.0, 500.0, 750.0]);
        assert!(horizontal.iter().all(|p| p.y == 0.0));

        let vertical = LayoutGenerator::linear_vertical(2, 100.0);
        assert_eq!(vertical[1], Position { x: 0.0, y: 50.0 });
    }

    #[test]
    fn test_random_layout_within_bounds() {
        let mut rng = StdRng::seed_from_u64(4);
        let positions = LayoutGenerator::random(50, 200.0, 100.0, &mut rng);
        assert_eq!(positions.len(), 50);
        assert!(positions
            .iter()
            .all(|p| (0.0..200.0).contains(&p.x) && (0.0..100.0).contains(&p.y)));
    }

    #[test]
    fn test_force_directed_is_deterministic_and_bounded() {
        let graph = GraphGenerator::cycle(6, false);
        let a = LayoutGenerator::force_directed(&graph, 1000.0, 1000.0);
        let b = LayoutGenerator::force_directed(&graph, 1000.0, 1000.0);
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|p| p.x.abs() <= 500.0 && p.y.abs() <= 500.0 && p.x.is_finite()));
    }

    #[test]
    fn test_empty_graph_layouts() {
        let graph = Graph::new(false);
        let mut rng = StdRng::seed_from_u64(0);
        for layout_type in LayoutType::ALL {
            let settings = LayoutSettings {
                layout_type,
                ..LayoutSettings::default()
            };
            assert!(LayoutGenerator::generate(&graph, &settings, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_layout_cycles_through_all_types() {
        let mut layout = LayoutType::Random;
        for _ in 0..LayoutType::ALL.len() {
            layout = layout.next();
        }
        assert_eq!(layout, LayoutType::Random);
        assert_eq!(LayoutType::ForceDirected.next(), LayoutType::Random);
    }
}
