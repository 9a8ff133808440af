use serde::{Deserialize, Serialize};

/// One of the held-key flags consumed every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InputFlag {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    Left,
    Right,
    Up,
    Down,
    Space,
}

impl InputFlag {
    pub const ALL: [InputFlag; 9] = [
        InputFlag::Forward,
        InputFlag::Backward,
        InputFlag::StrafeLeft,
        InputFlag::StrafeRight,
        InputFlag::Left,
        InputFlag::Right,
        InputFlag::Up,
        InputFlag::Down,
        InputFlag::Space,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Held-key state. Written only by the input dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlags {
    held: [bool; 9],
}

impl InputFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, flag: InputFlag, held: bool) {
        self.held[flag.index()] = held;
    }

    pub fn is_set(&self, flag: InputFlag) -> bool {
        self.held[flag.index()]
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn any(&self) -> bool {
        self.held.iter().any(|h| *h)
    }

    /// Flags that are currently held, in declaration order.
    pub fn held(&self) -> impl Iterator<Item = InputFlag> + '_ {
        InputFlag::ALL.into_iter().filter(|f| self.is_set(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        let flags = InputFlags::new();
        assert!(!flags.any());
        for f in InputFlag::ALL {
            assert!(!flags.is_set(f));
        }
    }

    #[test]
    fn flags_are_independent() {
        let mut flags = InputFlags::new();
        flags.set(InputFlag::Forward, true);
        flags.set(InputFlag::StrafeRight, true);
        assert!(flags.is_set(InputFlag::Forward));
        assert!(flags.is_set(InputFlag::StrafeRight));
        assert!(!flags.is_set(InputFlag::Backward));

        flags.set(InputFlag::Forward, false);
        assert!(!flags.is_set(InputFlag::Forward));
        assert!(flags.is_set(InputFlag::StrafeRight));

        let held: Vec<_> = flags.held().collect();
        assert_eq!(held, vec![InputFlag::StrafeRight]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut flags = InputFlags::new();
        for f in InputFlag::ALL {
            flags.set(f, true);
        }
        flags.clear();
        assert!(!flags.any());
    }
}
