use crate::action::Action;
use crate::flags::InputFlag;
use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Binding {
    /// The flag follows the key: set while held, cleared on release.
    Hold(InputFlag),
    /// The action fires once when the key is released.
    Trigger(Action),
}

/// The result of resolving a key event against the binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    SetFlag(InputFlag, bool),
    Fire(Action),
}

/// Key-to-binding lookup table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Key, Binding>,
}

impl Default for KeyBindings {
    /// Arrow keys fly/strafe the camera; letters trigger the viewer actions.
    fn default() -> Self {
        let mut bindings = Self::empty();
        bindings.bind(Key::Up, Binding::Hold(InputFlag::Forward));
        bindings.bind(Key::Down, Binding::Hold(InputFlag::Backward));
        bindings.bind(Key::Left, Binding::Hold(InputFlag::StrafeLeft));
        bindings.bind(Key::Right, Binding::Hold(InputFlag::StrafeRight));

        bindings.bind(Key::Char('H'), Binding::Trigger(Action::ToggleHelpText));
        bindings.bind(Key::Char('R'), Binding::Trigger(Action::ToggleMultisampling));
        bindings.bind(Key::Char('E'), Binding::Trigger(Action::ToggleTalking));
        bindings.bind(Key::Char('W'), Binding::Trigger(Action::ToggleWireframe));
        bindings.bind(Key::Char('Q'), Binding::Trigger(Action::NextAnimation));
        bindings.bind(Key::Char('A'), Binding::Trigger(Action::CycleWeapon));
        bindings.bind(Key::Char('Z'), Binding::Trigger(Action::ReplayAnimation));
        bindings
    }
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind `key`, returning the binding it replaced.
    pub fn bind(&mut self, key: Key, binding: Binding) -> Option<Binding> {
        let previous = self.map.insert(key, binding);
        if let Some(prev) = previous {
            tracing::debug!(%key, ?prev, ?binding, "key rebound");
        }
        previous
    }

    pub fn unbind(&mut self, key: Key) -> Option<Binding> {
        self.map.remove(&key)
    }

    pub fn get(&self, key: Key) -> Option<Binding> {
        self.map.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve a key transition. Unbound keys, and presses of trigger keys,
    /// resolve to nothing.
    pub fn resolve(&self, key: Key, pressed: bool) -> Option<InputCommand> {
        match self.get(key)? {
            Binding::Hold(flag) => Some(InputCommand::SetFlag(flag, pressed)),
            Binding::Trigger(action) if !pressed => Some(InputCommand::Fire(action)),
            Binding::Trigger(_) => None,
        }
    }

    /// The first key (in key order) bound to `action`.
    pub fn key_for(&self, action: Action) -> Option<Key> {
        self.map
            .iter()
            .filter(|(_, b)| **b == Binding::Trigger(action))
            .map(|(k, _)| *k)
            .min()
    }

    /// `"<key> - <label>"` for each bound action, in canonical action order.
    pub fn hints(&self) -> Vec<String> {
        Action::ALL
            .iter()
            .filter_map(|action| {
                self.key_for(*action)
                    .map(|key| format!("{key} - {}", action.label()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_hold_movement_flags() {
        let b = KeyBindings::default();
        assert_eq!(
            b.resolve(Key::Up, true),
            Some(InputCommand::SetFlag(InputFlag::Forward, true))
        );
        assert_eq!(
            b.resolve(Key::Up, false),
            Some(InputCommand::SetFlag(InputFlag::Forward, false))
        );
        assert_eq!(
            b.resolve(Key::Left, true),
            Some(InputCommand::SetFlag(InputFlag::StrafeLeft, true))
        );
    }

    #[test]
    fn triggers_fire_on_release_only() {
        let b = KeyBindings::default();
        assert_eq!(b.resolve(Key::Char('Q'), true), None);
        assert_eq!(
            b.resolve(Key::Char('Q'), false),
            Some(InputCommand::Fire(Action::NextAnimation))
        );
        assert_eq!(
            b.resolve(Key::Char('A'), false),
            Some(InputCommand::Fire(Action::CycleWeapon))
        );
    }

    #[test]
    fn unbound_keys_resolve_to_nothing() {
        let b = KeyBindings::default();
        assert_eq!(b.resolve(Key::Char('X'), true), None);
        assert_eq!(b.resolve(Key::Char('X'), false), None);
        assert_eq!(b.resolve(Key::Space, false), None);
        assert_eq!(b.resolve(Key::Other(999), false), None);
    }

    #[test]
    fn default_hints_follow_stock_order() {
        let hints = KeyBindings::default().hints();
        assert_eq!(
            hints,
            vec![
                "H - Toggle HelpText",
                "R - Toggle MSAA",
                "E - Toggle Talking",
                "W - Toggle Wireframe",
                "Q - Cycle Animations",
                "A - Cycle Weapons",
                "Z - Play Animation",
            ]
        );
    }

    #[test]
    fn rebinding_replaces_and_unbinding_removes() {
        let mut b = KeyBindings::default();
        let old = b.bind(Key::Char('H'), Binding::Trigger(Action::CycleWeapon));
        assert_eq!(old, Some(Binding::Trigger(Action::ToggleHelpText)));
        assert_eq!(b.key_for(Action::ToggleHelpText), None);
        assert_eq!(b.key_for(Action::CycleWeapon), Some(Key::Char('A')));

        b.unbind(Key::Char('A'));
        assert_eq!(b.key_for(Action::CycleWeapon), Some(Key::Char('H')));
        assert_eq!(b.len(), 10);
    }
}
