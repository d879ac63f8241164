//! Braille canvas drawing of the graph, visited nodes and robot positions.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Points},
        Block, Widget,
    },
};
use std::collections::BTreeMap;

use crate::core::layout::Position;
use crate::core::SimulationSnapshot;

const EDGE_COLOR: Color = Color::DarkGray;
const VISITED_COLOR: Color = Color::Green;
const UNVISITED_COLOR: Color = Color::White;
const ROBOT_COLOR: Color = Color::Yellow;

pub struct GraphCanvas<'a> {
    snapshot: &'a SimulationSnapshot,
    block: Option<Block<'a>>,
}

impl<'a> GraphCanvas<'a> {
    pub fn new(snapshot: &'a SimulationSnapshot) -> Self {
        Self {
            snapshot,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Padded drawing bounds around all positions
fn bounds(positions: &[Position]) -> ([f64; 2], [f64; 2]) {
    if positions.is_empty() {
        return ([-1.0, 1.0], [-1.0, 1.0]);
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in positions {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let pad = |min: f64, max: f64| {
        let margin = ((max - min) * 0.1).max(1.0);
        [min - margin, max + margin]
    };
    (pad(min_x, max_x), pad(min_y, max_y))
}

impl Widget for GraphCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot;
        let positions = &snapshot.visual.positions;
        let (x_bounds, y_bounds) = bounds(positions);

        let mut visited = Vec::new();
        let mut unvisited = Vec::new();
        for (node, p) in positions.iter().enumerate() {
            if snapshot.visited_nodes.get(node).copied().unwrap_or(false) {
                visited.push((p.x, p.y));
            } else {
                unvisited.push((p.x, p.y));
            }
        }

        let mut robots_at: BTreeMap<usize, usize> = BTreeMap::new();
        for robot in &snapshot.robots {
            *robots_at.entry(robot.current_node).or_default() += 1;
        }

        let mut canvas = Canvas::default()
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .marker(Marker::Braille)
            .paint(|ctx| {
                for (_, edge) in &snapshot.visual.edges {
                    let (Ok(source), Ok(target)) =
                        (edge.source.parse::<usize>(), edge.target.parse::<usize>())
                    else {
                        continue;
                    };
                    let (Some(a), Some(b)) = (positions.get(source), positions.get(target)) else {
                        continue;
                    };
                    ctx.draw(&CanvasLine::new(a.x, a.y, b.x, b.y, EDGE_COLOR));
                }
                ctx.layer();

                ctx.draw(&Points {
                    coords: &unvisited,
                    color: UNVISITED_COLOR,
                });
                ctx.draw(&Points {
                    coords: &visited,
                    color: VISITED_COLOR,
                });
                ctx.layer();

                for (&node, &count) in &robots_at {
                    if let Some(p) = positions.get(node) {
                        ctx.print(
                            p.x,
                            p.y,
                            Span::styled(
                                format!("R{}", count),
                                Style::default()
                                    .fg(ROBOT_COLOR)
                                    .add_modifier(Modifier::BOLD),
                            ),
                        );
                    }
                }
            });

        if let Some(block) = self.block {
            canvas = canvas.block(block);
        }
        canvas.render(area, buf);
    }
}
