//! TUI Frontend (ratatui-based)
//!
//! This module implements the `View` trait using ratatui for terminal rendering.
//! It wraps crossterm for event handling and terminal management.

pub mod app;
pub mod event_source;
pub mod graph_canvas;
pub mod window;

pub use app::TerminalView;
