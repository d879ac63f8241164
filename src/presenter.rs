//! Presenter: owns one model and one view and drives the view's lifecycle.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::core::{Model, ModelError, SettingChange, SimulationSnapshot};
use crate::frontend::View;

pub struct Presenter<M: Model + 'static, V: View> {
    model: Rc<RefCell<M>>,
    view: V,
    has_run: bool,
}

impl<M: Model + 'static, V: View> Presenter<M, V> {
    pub fn new(model: Rc<RefCell<M>>, view: V) -> Self {
        Self {
            model,
            view,
            has_run: false,
        }
    }

    pub fn model(&self) -> &Rc<RefCell<M>> {
        &self.model
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Initialize the view, then block in its main loop until it closes.
    ///
    /// A presenter runs once. Calling `run` again returns an error without
    /// touching the view.
    pub fn run(&mut self) -> Result<()> {
        if self.has_run {
            bail!("presenter has already been run");
        }
        self.has_run = true;
        tracing::debug!("Presenter starting view");

        let handle = PresenterHandle::new(self.model.clone());
        let result = self
            .view
            .init_gui(handle)
            .and_then(|()| self.view.mainloop());

        match &result {
            Ok(()) => tracing::debug!("View closed"),
            Err(e) => tracing::error!("View failed: {:#}", e),
        }
        result
    }
}

/// What a view holds to act on the model. Cheap to clone.
#[derive(Clone)]
pub struct PresenterHandle {
    model: Rc<RefCell<dyn Model>>,
}

impl PresenterHandle {
    pub fn new(model: Rc<RefCell<dyn Model>>) -> Self {
        Self { model }
    }

    pub fn step(&self) {
        self.model.borrow_mut().step();
    }

    pub fn reset(&self) -> Result<(), ModelError> {
        self.model.borrow_mut().reset()
    }

    pub fn regenerate(&self) -> Result<(), ModelError> {
        self.model.borrow_mut().regenerate()
    }

    pub fn cycle_layout(&self) {
        self.model.borrow_mut().cycle_layout();
    }

    pub fn apply_setting(&self, change: SettingChange) -> Result<(), ModelError> {
        self.model.borrow_mut().apply_setting(change)
    }

    pub fn is_finished(&self) -> bool {
        self.model.borrow().is_finished()
    }

    pub fn snapshot(&self) -> Option<SimulationSnapshot> {
        self.model.borrow().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generator::{GraphSettings, GraphType};
    use crate::core::simulation::{RobotSettings, SimulationModel, SimulationSettings};
    use crate::core::EmptyModel;
    use anyhow::anyhow;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    #[derive(Default)]
    struct RecordingView {
        log: Log,
        handle: Option<PresenterHandle>,
        fail_init: bool,
        fail_mainloop: bool,
        steps_in_mainloop: usize,
    }

    impl View for RecordingView {
        fn init_gui(&mut self, presenter: PresenterHandle) -> Result<()> {
            self.log.borrow_mut().push("init_gui");
            if self.fail_init {
                return Err(anyhow!("init failed"));
            }
            self.handle = Some(presenter);
            Ok(())
        }

        fn mainloop(&mut self) -> Result<()> {
            self.log.borrow_mut().push("mainloop");
            if let Some(handle) = &self.handle {
                for _ in 0..self.steps_in_mainloop {
                    handle.step();
                }
            }
            if self.fail_mainloop {
                return Err(anyhow!("window lost"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_new_stores_model_and_view() {
        let model = Rc::new(RefCell::new(EmptyModel));
        let log = Log::default();
        let view = RecordingView {
            log: log.clone(),
            ..Default::default()
        };

        let presenter = Presenter::new(model.clone(), view);
        assert!(Rc::ptr_eq(presenter.model(), &model));
        assert!(Rc::ptr_eq(&presenter.view().log, &log));
        // Construction has no side effects on the view
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_run_calls_init_before_mainloop_once() {
        let log = Log::default();
        let view = RecordingView {
            log: log.clone(),
            ..Default::default()
        };
        let mut presenter = Presenter::new(Rc::new(RefCell::new(EmptyModel)), view);

        presenter.run().unwrap();
        assert_eq!(*log.borrow(), vec!["init_gui", "mainloop"]);
        assert!(presenter.view().handle.is_some());
    }

    #[test]
    fn test_second_run_fails_without_touching_view() {
        let log = Log::default();
        let view = RecordingView {
            log: log.clone(),
            ..Default::default()
        };
        let mut presenter = Presenter::new(Rc::new(RefCell::new(EmptyModel)), view);

        presenter.run().unwrap();
        assert!(presenter.run().is_err());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_init_error_skips_mainloop() {
        let log = Log::default();
        let view = RecordingView {
            log: log.clone(),
            fail_init: true,
            ..Default::default()
        };
        let mut presenter = Presenter::new(Rc::new(RefCell::new(EmptyModel)), view);

        let err = presenter.run().unwrap_err();
        assert_eq!(err.to_string(), "init failed");
        assert_eq!(*log.borrow(), vec!["init_gui"]);
        assert!(presenter.run().is_err());
    }

    #[test]
    fn test_mainloop_error_propagates() {
        let view = RecordingView {
            fail_mainloop: true,
            ..Default::default()
        };
        let mut presenter = Presenter::new(Rc::new(RefCell::new(EmptyModel)), view);
        assert_eq!(presenter.run().unwrap_err().to_string(), "window lost");
    }

    #[test]
    fn test_handle_drives_shared_model() {
        let settings = SimulationSettings {
            graph: GraphSettings {
                graph_type: GraphType::Path,
                node_count: 4,
                ..GraphSettings::default()
            },
            robots: RobotSettings::default(),
            ..SimulationSettings::default()
        };
        let model = Rc::new(RefCell::new(SimulationModel::new(settings, Some(3)).unwrap()));
        let view = RecordingView {
            steps_in_mainloop: 3,
            ..Default::default()
        };
        let mut presenter = Presenter::new(model.clone(), view);

        presenter.run().unwrap();
        assert_eq!(model.borrow().swarm().step_number, 3);

        let handle = presenter.view().handle.clone().unwrap();
        handle.reset().unwrap();
        assert_eq!(handle.snapshot().unwrap().step_number, 0);

        handle.apply_setting(SettingChange::AdjustNodeCount(2)).unwrap();
        assert_eq!(model.borrow().node_count(), 6);
        assert!(handle
            .apply_setting(SettingChange::AdjustStartNode(10))
            .is_err());
    }
}
