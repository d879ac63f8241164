//! Core simulation layer
//!
//! This module contains the graph, generators, robots, layouts and the
//! simulation model. NO imports from frontend/ or rendering code.
//! Frontends read `SimulationSnapshot`s and draw them.

pub mod error;
pub mod generator;
pub mod graph;
pub mod layout;
pub mod robot;
pub mod simulation;
pub mod visual;

pub use error::ModelError;
pub use simulation::{SettingChange, SimulationModel, SimulationSnapshot};

/// Model trait - the state a presenter drives
///
/// Every operation has a default, so an empty `impl Model for T {}` is a
/// valid model that does nothing and reports itself finished.
pub trait Model {
    /// Advance the simulation by one tick
    fn step(&mut self) {}

    /// Put the robots back on their start node, keeping the current graph
    ///
    /// # Returns
    /// - `Ok(())` - Robots restarted
    /// - `Err(ModelError)` - If the robot settings do not fit the graph
    fn reset(&mut self) -> Result<(), ModelError> {
        Ok(())
    }

    /// Build a new graph from the current settings
    ///
    /// # Returns
    /// - `Ok(())` - New graph in place, robots restarted
    /// - `Err(ModelError)` - Generation failed; the previous graph is kept
    fn regenerate(&mut self) -> Result<(), ModelError> {
        Ok(())
    }

    /// Switch to the next layout type
    fn cycle_layout(&mut self) {}

    /// Edit one setting; graph and robot settings apply on the next
    /// `regenerate` or `reset`
    ///
    /// # Returns
    /// - `Err(ModelError)` - The new value is invalid and was not stored
    fn apply_setting(&mut self, _change: SettingChange) -> Result<(), ModelError> {
        Ok(())
    }

    /// Whether further steps can still change anything
    fn is_finished(&self) -> bool {
        true
    }

    /// Copy of the state a view renders, or `None` if there is nothing to draw
    fn snapshot(&self) -> Option<SimulationSnapshot> {
        None
    }
}

/// Model with no behavior. Runs end to end with any view.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyModel;

impl Model for EmptyModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_model_defaults() {
        let mut model = EmptyModel;
        model.step();
        model.cycle_layout();
        assert_eq!(model.reset(), Ok(()));
        assert_eq!(model.regenerate(), Ok(()));
        assert_eq!(model.apply_setting(SettingChange::NextGraphType), Ok(()));
        assert!(model.is_finished());
        assert!(model.snapshot().is_none());
    }
}
