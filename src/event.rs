use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Terminal-side inputs to the event loop.
#[derive(Debug, Clone)]
pub enum Event {
    /// Animation tick.
    Tick,
    Resize,
    Key(KeyEvent),
}

impl Event {
    /// Ctrl-C acts as an interrupt regardless of state.
    pub fn is_quit(&self) -> bool {
        match self {
            Event::Key(key) => {
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
            }
            _ => false,
        }
    }
}
