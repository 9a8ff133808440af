use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend-independent key identifier.
///
/// Window backends translate their own key codes into this type so that the
/// binding table can be exercised without a real keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Escape,
    Enter,
    /// An ASCII letter, always stored upper-case.
    Char(char),
    /// A digit key `0..=9`.
    Digit(u8),
    /// Any other key, carried as the backend's raw code.
    Other(u32),
}

impl Key {
    /// Build a letter key, normalising case. Non-letters become `None`.
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Key::Char(c.to_ascii_uppercase()))
    }

    /// Parse a key name as written in scripts and config, e.g. `up`, `a`, `space`.
    pub fn parse(name: &str) -> Option<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "up" | "arrowup" => Key::Up,
            "down" | "arrowdown" => Key::Down,
            "left" | "arrowleft" => Key::Left,
            "right" | "arrowright" => Key::Right,
            "space" => Key::Space,
            "escape" | "esc" => Key::Escape,
            "enter" | "return" => Key::Enter,
            _ => {
                let mut chars = lower.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                if let Some(d) = c.to_digit(10) {
                    Key::Digit(d as u8)
                } else {
                    Key::letter(c)?
                }
            }
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::Space => write!(f, "Space"),
            Key::Escape => write!(f, "Esc"),
            Key::Enter => write!(f, "Enter"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Digit(d) => write!(f, "{d}"),
            Key::Other(code) => write!(f, "#{code}"),
        }
    }
}

/// Modifier keys held when a key event was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub super_key: bool,
}

/// A key press or release as delivered by the window backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    /// Platform scancode, `0` when the backend cannot provide one.
    pub scancode: u32,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            scancode: 0,
            modifiers: Modifiers::default(),
        }
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_upper_cased() {
        assert_eq!(Key::letter('q'), Some(Key::Char('Q')));
        assert_eq!(Key::letter('Q'), Some(Key::Char('Q')));
        assert_eq!(Key::letter('1'), None);
    }

    #[test]
    fn parse_names() {
        assert_eq!(Key::parse("up"), Some(Key::Up));
        assert_eq!(Key::parse("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::parse(" a "), Some(Key::Char('A')));
        assert_eq!(Key::parse("7"), Some(Key::Digit(7)));
        assert_eq!(Key::parse("space"), Some(Key::Space));
        assert_eq!(Key::parse("ab"), None);
        assert_eq!(Key::parse(""), None);
        assert_eq!(Key::parse("?"), None);
    }

    #[test]
    fn display_is_short() {
        assert_eq!(Key::Char('H').to_string(), "H");
        assert_eq!(Key::Up.to_string(), "Up");
        assert_eq!(Key::Other(300).to_string(), "#300");
    }

    #[test]
    fn key_event_from_key_has_no_modifiers() {
        let e = KeyEvent::from(Key::Space);
        assert_eq!(e.scancode, 0);
        assert_eq!(e.modifiers, Modifiers::default());
    }
}
