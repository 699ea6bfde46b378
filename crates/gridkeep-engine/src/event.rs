//! Typed input events and event sources.
//!
//! The interpreter pulls one [`Event`] at a time from an [`EventSource`].
//! Sources block until an event is available; there are no timeouts.

use std::io::BufRead;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySym {
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// Main enter key.
    Return,
    /// Secondary enter key found on some keyboards.
    Return2,
    KpEnter,
    /// Keypad digit `0..=9`.
    Kp(u8),
    Escape,
    Backspace,
    Delete,
    Tab,
    /// Any printable key, by the character it produces unshifted.
    Char(char),
}

impl KeySym {
    /// The unit step this key stands for, if it is a direction key.
    ///
    /// Covers the arrow keys, Home/End/PageUp/PageDown as diagonals, the
    /// keypad and the vi keys `h j k l y u b n`.
    pub fn direction(self) -> Option<(i32, i32)> {
        let step = match self {
            KeySym::Left | KeySym::Kp(4) | KeySym::Char('h') => (-1, 0),
            KeySym::Right | KeySym::Kp(6) | KeySym::Char('l') => (1, 0),
            KeySym::Up | KeySym::Kp(8) | KeySym::Char('k') => (0, -1),
            KeySym::Down | KeySym::Kp(2) | KeySym::Char('j') => (0, 1),
            KeySym::Home | KeySym::Kp(7) | KeySym::Char('y') => (-1, -1),
            KeySym::End | KeySym::Kp(1) | KeySym::Char('b') => (-1, 1),
            KeySym::PageUp | KeySym::Kp(9) | KeySym::Char('u') => (1, -1),
            KeySym::PageDown | KeySym::Kp(3) | KeySym::Char('n') => (1, 1),
            _ => return None,
        };
        Some(step)
    }

    /// Whether this key confirms a selection.
    pub fn is_confirm(self) -> bool {
        matches!(self, KeySym::Return | KeySym::Return2 | KeySym::KpEnter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// One input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user asked to close the program.
    Quit,
    KeyDown(KeySym),
    /// Text typed by the user, already composed.
    TextInput(String),
    /// Pointer moved; coordinates are console cells.
    MouseMotion { x: i32, y: i32 },
    MouseButtonUp(MouseButton),
    /// Wheel scrolled; positive `dy` is away from the user.
    MouseWheel { dy: i32 },
}

// ---------------------------------------------------------------------------
// EventSource
// ---------------------------------------------------------------------------

/// A blocking producer of input events.
pub trait EventSource {
    /// Wait for and return the next event.
    fn wait_event(&mut self) -> Event;
}

/// Replays a fixed list of events, then reports [`Event::Quit`] forever.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    events: std::collections::VecDeque<Event>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn wait_event(&mut self) -> Event {
        self.events.pop_front().unwrap_or(Event::Quit)
    }
}

/// Reads one command per line from a text stream.
///
/// Blank and unrecognized lines are skipped. End of input and read errors
/// produce [`Event::Quit`].
pub struct LineEvents<R: BufRead> {
    input: R,
}

impl<R: BufRead> LineEvents<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> EventSource for LineEvents<R> {
    fn wait_event(&mut self) -> Event {
        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) => return Event::Quit,
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "input stream failed, quitting");
                    return Event::Quit;
                }
            }
            match parse_command(&line) {
                Some(event) => return event,
                None if line.trim().is_empty() => {}
                None => tracing::warn!(line = line.trim(), "unrecognized input command"),
            }
        }
    }
}

/// Parse one text command into an event.
///
/// Recognized forms: key names (`left`, `pageup`, `enter`, `esc`,
/// `backspace`, `kp7`, ...), single characters (`h`, `v`), `quit`,
/// `text <string>`, `click`, `rclick`, `move <x> <y>`, `wheel <dy>`.
pub fn parse_command(line: &str) -> Option<Event> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(text) = line.strip_prefix("text ") {
        return Some(Event::TextInput(text.to_owned()));
    }
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let event = match head {
        "quit" => Event::Quit,
        "click" => Event::MouseButtonUp(MouseButton::Left),
        "rclick" => Event::MouseButtonUp(MouseButton::Right),
        "move" => {
            let x = words.next()?.parse().ok()?;
            let y = words.next()?.parse().ok()?;
            Event::MouseMotion { x, y }
        }
        "wheel" => Event::MouseWheel {
            dy: words.next()?.parse().ok()?,
        },
        key => Event::KeyDown(parse_key(key)?),
    };
    Some(event)
}

fn parse_key(name: &str) -> Option<KeySym> {
    let key = match name {
        "left" => KeySym::Left,
        "right" => KeySym::Right,
        "up" => KeySym::Up,
        "down" => KeySym::Down,
        "home" => KeySym::Home,
        "end" => KeySym::End,
        "pageup" => KeySym::PageUp,
        "pagedown" => KeySym::PageDown,
        "enter" | "return" => KeySym::Return,
        "kpenter" => KeySym::KpEnter,
        "esc" | "escape" => KeySym::Escape,
        "backspace" => KeySym::Backspace,
        "delete" | "del" => KeySym::Delete,
        "tab" => KeySym::Tab,
        _ => {
            if let Some(digit) = name.strip_prefix("kp") {
                let digit: u8 = digit.parse().ok()?;
                return (digit <= 9).then_some(KeySym::Kp(digit));
            }
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => KeySym::Char(ch),
                _ => return None,
            }
        }
    };
    Some(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
