//! Frontend-agnostic input events.
//!
//! Event sources translate their native streams (crossterm, scripted test
//! input) into this enum so the view only handles one event shape.

use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum FrontendEvent {
    /// Keyboard input
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    /// Terminal resize
    Resize { width: u16, height: u16 },
    /// The event stream has ended or the window was asked to close
    Quit,
}

impl FrontendEvent {
    pub fn key(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self::Key { code, modifiers }
    }

    /// Unmodified character key
    pub fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub fn resize(width: u16, height: u16) -> Self {
        Self::Resize { width, height }
    }
}
