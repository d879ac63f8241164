use crate::config::{Config, KeyAction, KeybindMap, UiConfig};
use crate::core::SimulationSnapshot;
use crate::frontend::{FrontendEvent, View};
use crate::presenter::PresenterHandle;
use anyhow::{Context, Result};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use std::io::Stdout;
use std::time::{Duration, Instant};

use super::event_source::{CrosstermEvents, EventSource};
use super::graph_canvas::GraphCanvas;
use super::window::{Window, WINDOW_TITLE};

/// Poll timeout while paused
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Terminal view: graph canvas above a three-line status bar
///
/// Keys are resolved through the `[keybinds]` table. While playing, the
/// model advances once per tick until it reports finished or reaches
/// `max_steps`. Settings keys edit the model's pending settings, shown on
/// the last status line.
pub struct TerminalView<B: Backend, E: EventSource> {
    window: Window<B>,
    events: E,
    presenter: Option<PresenterHandle>,
    keybinds: KeybindMap,
    tick: Duration,
    max_steps: u64,
    playing: bool,
    running: bool,
    last_error: Option<String>,
}

impl TerminalView<CrosstermBackend<Stdout>, CrosstermEvents> {
    /// Open the real terminal window
    pub fn open(config: &Config) -> Result<Self> {
        let window = Window::open(WINDOW_TITLE)?;
        Ok(Self::new(
            window,
            CrosstermEvents,
            config.keybind_map(),
            &config.ui,
        ))
    }
}

impl<B: Backend, E: EventSource> TerminalView<B, E> {
    pub fn new(window: Window<B>, events: E, keybinds: KeybindMap, ui: &UiConfig) -> Self {
        Self {
            window,
            events,
            presenter: None,
            keybinds,
            tick: Duration::from_millis(ui.tick_ms),
            max_steps: ui.max_steps,
            playing: ui.autoplay,
            running: false,
            last_error: None,
        }
    }

    pub fn window(&self) -> &Window<B> {
        &self.window
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn render(&mut self, presenter: &PresenterHandle) -> Result<()> {
        let snapshot = presenter.snapshot();
        let title = self.window.title().to_string();
        let status = status_lines(snapshot.as_ref(), self.playing, self.last_error.as_deref());

        self.window
            .draw(|f| draw_frame(f, &title, snapshot.as_ref(), status))
    }

    fn handle_event(&mut self, presenter: &PresenterHandle, event: FrontendEvent) {
        match event {
            FrontendEvent::Key { code, modifiers } => {
                match self.keybinds.get(&(code, modifiers)).copied() {
                    Some(action) => self.apply(presenter, action),
                    None => tracing::trace!("Unbound key {:?} {:?}", code, modifiers),
                }
            }
            FrontendEvent::Resize { width, height } => {
                tracing::debug!("Terminal resized to {}x{}", width, height);
            }
            FrontendEvent::Quit => {
                tracing::debug!("Event source closed");
                self.running = false;
            }
        }
    }

    fn apply(&mut self, presenter: &PresenterHandle, action: KeyAction) {
        tracing::debug!("Key action {:?}", action);
        match action {
            KeyAction::Step => {
                if !presenter.is_finished() {
                    presenter.step();
                }
            }
            KeyAction::TogglePlay => {
                self.playing = !self.playing;
            }
            KeyAction::Reset => {
                self.playing = false;
                match presenter.reset() {
                    Ok(()) => self.last_error = None,
                    Err(e) => self.report_error("Reset failed", &e),
                }
            }
            KeyAction::Regenerate => {
                self.playing = false;
                match presenter.regenerate() {
                    Ok(()) => self.last_error = None,
                    Err(e) => self.report_error("Regenerate failed", &e),
                }
            }
            KeyAction::CycleLayout => presenter.cycle_layout(),
            KeyAction::Quit => self.running = false,
            setting => {
                let Some(change) = setting.setting_change() else {
                    return;
                };
                match presenter.apply_setting(change) {
                    Ok(()) => self.last_error = None,
                    Err(e) => self.report_error("Setting rejected", &e),
                }
            }
        }
    }

    fn report_error(&mut self, what: &str, error: &dyn std::fmt::Display) {
        tracing::warn!("{}: {}", what, error);
        self.last_error = Some(format!("{}: {}", what, error));
    }

    /// One autoplay tick
    fn advance(&mut self, presenter: &PresenterHandle) {
        let steps = presenter.snapshot().map_or(0, |s| s.step_number);
        if steps >= self.max_steps {
            tracing::info!("Reached max steps ({}), autoplay stopped", self.max_steps);
            self.playing = false;
            return;
        }
        if presenter.is_finished() {
            tracing::info!("Simulation finished, autoplay stopped");
            self.playing = false;
            return;
        }
        presenter.step();
    }
}

impl<B: Backend, E: EventSource> View for TerminalView<B, E> {
    fn init_gui(&mut self, presenter: PresenterHandle) -> Result<()> {
        self.render(&presenter)?;
        self.presenter = Some(presenter);
        Ok(())
    }

    fn mainloop(&mut self) -> Result<()> {
        let presenter = self
            .presenter
            .clone()
            .context("mainloop called before init_gui")?;

        self.running = true;
        let mut last_tick = Instant::now();

        while self.running {
            self.render(&presenter)?;

            let timeout = if self.playing {
                self.tick.saturating_sub(last_tick.elapsed())
            } else {
                IDLE_POLL
            };
            if let Some(event) = self.events.next_event(timeout)? {
                self.handle_event(&presenter, event);
            }
            if !self.running {
                break;
            }

            if self.playing && last_tick.elapsed() >= self.tick {
                self.advance(&presenter);
                last_tick = Instant::now();
            }
        }

        self.window.close()
    }
}

fn status_lines(
    snapshot: Option<&SimulationSnapshot>,
    playing: bool,
    last_error: Option<&str>,
) -> Vec<Line<'static>> {
    let Some(snapshot) = snapshot else {
        return vec![Line::from("Idle")];
    };

    let progress = Line::from(format!(
        "Step {} │ Robots settled {}/{} │ Visited {}/{} │ {} · {} · {}",
        snapshot.step_number,
        snapshot.stopped_count(),
        snapshot.robots.len(),
        snapshot.visited_count(),
        snapshot.visited_nodes.len(),
        snapshot.graph_type.display_name(),
        snapshot.layout_type.display_name(),
        snapshot.algorithm.display_name(),
    ));

    let state = if snapshot.finished {
        Span::styled("Finished", Style::default().fg(Color::Green))
    } else if playing {
        Span::styled("Playing", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("Paused")
    };
    let mut second = vec![state];
    if let Some(error) = last_error {
        second.push(Span::raw(" │ "));
        second.push(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    vec![progress, Line::from(second), pending_settings_line(snapshot)]
}

/// Settings the next regenerate or reset will use
fn pending_settings_line(snapshot: &SimulationSnapshot) -> Line<'static> {
    let graph = &snapshot.settings.graph;
    let robots = &snapshot.settings.robots;

    let mut flags = vec![if graph.directed { "directed" } else { "undirected" }];
    if graph.allow_self_loops {
        flags.push("self-loops");
    }
    if graph.require_connected {
        flags.push("connected");
    }

    Line::from(vec![
        Span::styled("Next: ", Style::default().add_modifier(Modifier::DIM)),
        Span::raw(format!(
            "{} · {} nodes · p {:.2} · {} · {} tries │ {} robots from node {} · {}",
            graph.graph_type.display_name(),
            graph.node_count,
            graph.edge_probability,
            flags.join(", "),
            graph.max_generation_attempts,
            robots.count,
            robots.start_node,
            robots.algorithm.display_name(),
        )),
    ])
}

fn draw_frame(
    f: &mut Frame,
    title: &str,
    snapshot: Option<&SimulationSnapshot>,
    status: Vec<Line<'static>>,
) {
    let [graph_area, status_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(5)]).areas(f.area());

    let graph_block = Block::bordered()
        .title(format!(" {} ", title))
        .title_alignment(Alignment::Center);

    match snapshot {
        Some(snapshot) => {
            f.render_widget(GraphCanvas::new(snapshot).block(graph_block), graph_area);
        }
        None => {
            let empty = Paragraph::new("No simulation loaded")
                .alignment(Alignment::Center)
                .block(graph_block);
            f.render_widget(empty, graph_area);
        }
    }

    f.render_widget(
        Paragraph::new(status).block(Block::bordered().title(" Status ")),
        status_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::{GraphSettings, GraphType};
    use crate::core::robot::CoordinatorKind;
    use crate::core::simulation::{RobotSettings, SimulationModel, SimulationSettings};
    use crate::core::{EmptyModel, Model};
    use crate::frontend::tui::event_source::ScriptedEvents;
    use crate::presenter::Presenter;
    use ratatui::backend::TestBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    type TestView = TerminalView<TestBackend, ScriptedEvents>;

    fn test_view(events: Vec<FrontendEvent>, ui: UiConfig) -> TestView {
        let window = Window::with_backend(TestBackend::new(100, 30), WINDOW_TITLE).unwrap();
        let keybinds = Config::defaults().unwrap().keybind_map();
        TerminalView::new(window, ScriptedEvents::new(events), keybinds, &ui)
    }

    fn screen_text(view: &TestView) -> String {
        view.window()
            .terminal()
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn path_model(nodes: usize, algorithm: CoordinatorKind) -> Rc<RefCell<SimulationModel>> {
        let settings = SimulationSettings {
            graph: GraphSettings {
                graph_type: GraphType::Path,
                node_count: nodes,
                ..GraphSettings::default()
            },
            robots: RobotSettings {
                algorithm,
                count: 1,
                start_node: 0,
            },
            ..SimulationSettings::default()
        };
        Rc::new(RefCell::new(SimulationModel::new(settings, Some(5)).unwrap()))
    }

    #[test]
    fn test_view_window_has_title() {
        let view = test_view(vec![], UiConfig::default());
        assert_eq!(view.window().title(), WINDOW_TITLE);
    }

    #[test]
    fn test_end_to_end_steps_and_quits() {
        let model = path_model(20, CoordinatorKind::Exploration);
        let events = vec![
            FrontendEvent::char(' '),
            FrontendEvent::char(' '),
            FrontendEvent::char('q'),
            // Never reached
            FrontendEvent::char(' '),
        ];
        let mut presenter = Presenter::new(model.clone(), test_view(events, UiConfig::default()));

        presenter.run().unwrap();

        assert_eq!(model.borrow().swarm().step_number, 2);
        let view = presenter.view();
        assert!(view.window().is_closed());
        let screen = screen_text(view);
        assert!(screen.contains(WINDOW_TITLE));
        assert!(screen.contains("Step 2"));
    }

    #[test]
    fn test_empty_model_closes_when_events_end() {
        let mut presenter = Presenter::new(
            Rc::new(RefCell::new(EmptyModel)),
            test_view(vec![FrontendEvent::resize(100, 30)], UiConfig::default()),
        );

        presenter.run().unwrap();

        let screen = screen_text(presenter.view());
        assert!(screen.contains(WINDOW_TITLE));
        assert!(screen.contains("No simulation loaded"));
        assert!(screen.contains("Idle"));
    }

    #[test]
    fn test_autoplay_steps_each_tick() {
        let model = path_model(50, CoordinatorKind::Exploration);
        let ui = UiConfig {
            tick_ms: 0,
            ..UiConfig::default()
        };
        let events = vec![
            FrontendEvent::char('p'),
            FrontendEvent::char('x'),
            FrontendEvent::char('x'),
        ];
        let mut presenter = Presenter::new(model.clone(), test_view(events, ui));

        presenter.run().unwrap();

        assert_eq!(model.borrow().swarm().step_number, 3);
        assert!(presenter.view().is_playing());
    }

    #[test]
    fn test_autoplay_respects_max_steps() {
        let model = path_model(50, CoordinatorKind::Exploration);
        let ui = UiConfig {
            tick_ms: 0,
            autoplay: true,
            max_steps: 2,
        };
        let events = vec![FrontendEvent::char('x'); 5];
        let mut presenter = Presenter::new(model.clone(), test_view(events, ui));

        presenter.run().unwrap();

        assert_eq!(model.borrow().swarm().step_number, 2);
        assert!(!presenter.view().is_playing());
    }

    #[test]
    fn test_autoplay_with_zero_max_steps_never_steps() {
        let model = path_model(50, CoordinatorKind::Exploration);
        let ui = UiConfig {
            tick_ms: 0,
            autoplay: true,
            max_steps: 0,
        };
        let events = vec![FrontendEvent::char('x'); 3];
        let mut presenter = Presenter::new(model.clone(), test_view(events, ui));

        presenter.run().unwrap();

        assert_eq!(model.borrow().swarm().step_number, 0);
        assert!(!presenter.view().is_playing());
    }

    #[test]
    fn test_toggling_play_at_max_steps_adds_no_steps() {
        let model = path_model(50, CoordinatorKind::Exploration);
        model.borrow_mut().step();
        model.borrow_mut().step();
        let ui = UiConfig {
            tick_ms: 0,
            autoplay: false,
            max_steps: 2,
        };
        let events = vec![FrontendEvent::char('p'); 4];
        let mut presenter = Presenter::new(model.clone(), test_view(events, ui));

        presenter.run().unwrap();

        assert_eq!(model.borrow().swarm().step_number, 2);
        assert!(!presenter.view().is_playing());
    }

    #[test]
    fn test_settings_keys_apply_on_regenerate() {
        let model = path_model(6, CoordinatorKind::Dispersion);
        let events = vec![
            FrontendEvent::char('t'),
            FrontendEvent::char(']'),
            FrontendEvent::char('d'),
            FrontendEvent::char('a'),
            FrontendEvent::char('g'),
        ];
        let mut presenter = Presenter::new(model.clone(), test_view(events, UiConfig::default()));

        presenter.run().unwrap();

        let model = model.borrow();
        assert_eq!(model.graph_type(), GraphType::Cycle);
        assert_eq!(model.graph().node_count(), 7);
        assert!(model.graph().is_directed());
        assert_eq!(model.graph().edge_count(), 7);
        assert_eq!(model.snapshot().unwrap().algorithm, CoordinatorKind::Exploration);

        let view = presenter.view();
        assert_eq!(view.last_error(), None);
        assert!(screen_text(view).contains("Next: Cycle · 7 nodes"));
    }

    #[test]
    fn test_rejected_setting_shown_in_status() {
        let model = path_model(4, CoordinatorKind::Dispersion);
        model.borrow_mut().set_edge_probability(1.0).unwrap();
        let events = vec![FrontendEvent::char('=')];
        let mut presenter = Presenter::new(model.clone(), test_view(events, UiConfig::default()));

        presenter.run().unwrap();

        let view = presenter.view();
        assert!(view.last_error().unwrap().contains("edge probability"));
        assert!(screen_text(view).contains("Setting rejected"));
        assert_eq!(model.borrow().edge_probability(), 1.0);
    }

    #[test]
    fn test_regenerate_error_shown_in_status() {
        let model = path_model(4, CoordinatorKind::Dispersion);
        {
            let mut m = model.borrow_mut();
            m.set_graph_type(GraphType::ErdosRenyiRandom);
            m.set_edge_probability(0.0).unwrap();
            m.set_require_connected(true);
            m.set_max_generation_attempts(1).unwrap();
        }
        let events = vec![FrontendEvent::char('g')];
        let mut presenter = Presenter::new(model.clone(), test_view(events, UiConfig::default()));

        presenter.run().unwrap();

        let view = presenter.view();
        let error = view.last_error().unwrap();
        assert!(error.contains("could not generate a connected graph"));
        assert!(screen_text(view).contains("Regenerate failed"));
        // The previous graph is still there
        assert_eq!(model.borrow().graph().node_count(), 4);
    }

    #[test]
    fn test_reset_and_cycle_layout_keys() {
        let model = path_model(6, CoordinatorKind::Dispersion);
        model.borrow_mut().step();
        let events = vec![FrontendEvent::char('r'), FrontendEvent::char('l')];
        let mut presenter = Presenter::new(model.clone(), test_view(events, UiConfig::default()));

        presenter.run().unwrap();

        let snapshot = model.borrow().snapshot().unwrap();
        assert_eq!(snapshot.step_number, 0);
        assert_eq!(snapshot.layout_type.display_name(), "Linear (horizontal)");
    }
}
