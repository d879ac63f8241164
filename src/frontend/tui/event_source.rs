//! Where the terminal view gets its input from.

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

use crate::frontend::FrontendEvent;

pub trait EventSource {
    /// Wait up to `timeout` for the next event. `Ok(None)` means nothing arrived.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<FrontendEvent>>;
}

/// Events from the real terminal
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl CrosstermEvents {
    /// Convert crossterm event to FrontendEvent
    fn convert_event(event: Event) -> Option<FrontendEvent> {
        match event {
            Event::Key(key_event) => {
                // Only process key press events (ignore repeats and releases)
                if key_event.kind != KeyEventKind::Press {
                    return None;
                }
                Some(FrontendEvent::key(key_event.code, key_event.modifiers))
            }
            Event::Resize(w, h) => Some(FrontendEvent::resize(w, h)),
            _ => None,
        }
    }
}

impl EventSource for CrosstermEvents {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<FrontendEvent>> {
        if event::poll(timeout)? {
            return Ok(Self::convert_event(event::read()?));
        }
        Ok(None)
    }
}

/// Replays a fixed list of events, then reports `Quit`
#[cfg(test)]
pub struct ScriptedEvents {
    events: std::collections::VecDeque<FrontendEvent>,
}

#[cfg(test)]
impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = FrontendEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl EventSource for ScriptedEvents {
    fn next_event(&mut self, _timeout: Duration) -> Result<Option<FrontendEvent>> {
        Ok(Some(self.events.pop_front().unwrap_or(FrontendEvent::Quit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    #[test]
    fn test_convert_ignores_key_release() {
        let press = Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(
            CrosstermEvents::convert_event(press),
            Some(FrontendEvent::char('a'))
        );

        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(CrosstermEvents::convert_event(release), None);
        assert_eq!(
            CrosstermEvents::convert_event(Event::FocusGained),
            None
        );
    }

    #[test]
    fn test_scripted_events_end_with_quit() {
        let mut events = ScriptedEvents::new([FrontendEvent::char('x')]);
        let timeout = Duration::ZERO;
        assert_eq!(
            events.next_event(timeout).unwrap(),
            Some(FrontendEvent::char('x'))
        );
        assert_eq!(events.next_event(timeout).unwrap(), Some(FrontendEvent::Quit));
    }
}
