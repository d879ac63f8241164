//! Headless frontend: runs the model to completion without a terminal UI.

use anyhow::{Context, Result};
use std::io::{self, Write};

use super::View;
use crate::presenter::PresenterHandle;

const PROGRESS_INTERVAL: u64 = 1000;

pub struct HeadlessView<W: Write = io::Stdout> {
    presenter: Option<PresenterHandle>,
    max_steps: u64,
    out: W,
}

impl HeadlessView {
    pub fn new(max_steps: u64) -> Self {
        Self::with_writer(max_steps, io::stdout())
    }
}

impl<W: Write> HeadlessView<W> {
    pub fn with_writer(max_steps: u64, out: W) -> Self {
        Self {
            presenter: None,
            max_steps,
            out,
        }
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> View for HeadlessView<W> {
    fn init_gui(&mut self, presenter: PresenterHandle) -> Result<()> {
        self.presenter = Some(presenter);
        tracing::info!(max_steps = self.max_steps, "Headless run starting");
        Ok(())
    }

    fn mainloop(&mut self) -> Result<()> {
        let presenter = self
            .presenter
            .clone()
            .context("mainloop called before init_gui")?;

        let mut steps = 0;
        while steps < self.max_steps && !presenter.is_finished() {
            presenter.step();
            steps += 1;
            if steps % PROGRESS_INTERVAL == 0 {
                tracing::info!(steps, "Headless run in progress");
            }
        }

        let summary = match presenter.snapshot() {
            Some(snapshot) => format!(
                "{} after {} steps: {}/{} robots settled, {}/{} nodes visited",
                if snapshot.finished { "Finished" } else { "Stopped" },
                snapshot.step_number,
                snapshot.stopped_count(),
                snapshot.robots.len(),
                snapshot.visited_count(),
                snapshot.visited_nodes.len(),
            ),
            None => "Nothing to simulate".to_string(),
        };

        tracing::info!("{}", summary);
        writeln!(self.out, "{}", summary).context("Failed to write summary")?;
        Ok(())
    }
}
