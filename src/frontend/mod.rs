//! Frontend abstraction layer
//!
//! This module defines the `View` trait that every frontend implements. The
//! presenter hands a view a `PresenterHandle` and then blocks in the view's
//! main loop until the window closes.

pub mod events;
pub mod headless;
pub mod tui;

use anyhow::Result;
pub use events::FrontendEvent;
pub use headless::HeadlessView;
pub use tui::TerminalView;

use crate::presenter::PresenterHandle;

/// View trait - implemented by the terminal and headless frontends
///
/// A view owns its window (if it has one) and never touches the model
/// directly; it acts through the handle it receives in `init_gui`.
pub trait View {
    /// Prepare widgets and keep the handle for event dispatch
    ///
    /// Called exactly once, before `mainloop`.
    ///
    /// # Returns
    /// - `Ok(())` - View is ready
    /// - `Err(...)` - If the window or widgets could not be set up
    fn init_gui(&mut self, presenter: PresenterHandle) -> Result<()>;

    /// Dispatch events until the window is closed
    ///
    /// Blocks the calling thread. Returning means the window is gone.
    ///
    /// # Returns
    /// - `Ok(())` - Window closed normally
    /// - `Err(...)` - If drawing or event polling failed
    fn mainloop(&mut self) -> Result<()>;
}
