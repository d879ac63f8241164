//! robograph - Mobile robots in dynamic graph simulation
//!
//! - **core**: graph, generators, robots, layouts and the `Model` trait
//! - **frontend**: the `View` trait with terminal (ratatui) and headless views
//! - **presenter**: wires one model to one view
//! - **config**: TOML settings, keybinds and the data directory

pub mod config;
pub mod core;
pub mod frontend;
pub mod presenter;
