use serde::{Deserialize, Serialize};

/// A one-shot viewer action, fired when its key is released.
///
/// The viewer consumes actions, never raw key codes, so any backend (or a
/// scripted test) can drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Show or hide the help overlay.
    ToggleHelpText,
    /// Toggle multisample anti-aliasing.
    ToggleMultisampling,
    /// Toggle the character's talking animation.
    ToggleTalking,
    /// Toggle wireframe rendering of the character.
    ToggleWireframe,
    /// Select and play the next animation, wrapping at the end.
    NextAnimation,
    /// Advance to the next weapon loadout.
    CycleWeapon,
    /// Restart the current animation.
    ReplayAnimation,
}

impl Action {
    /// Canonical order, used for help hints.
    pub const ALL: [Action; 7] = [
        Action::ToggleHelpText,
        Action::ToggleMultisampling,
        Action::ToggleTalking,
        Action::ToggleWireframe,
        Action::NextAnimation,
        Action::CycleWeapon,
        Action::ReplayAnimation,
    ];

    /// Short description shown in the help overlay.
    pub fn label(self) -> &'static str {
        match self {
            Action::ToggleHelpText => "Toggle HelpText",
            Action::ToggleMultisampling => "Toggle MSAA",
            Action::ToggleTalking => "Toggle Talking",
            Action::ToggleWireframe => "Toggle Wireframe",
            Action::NextAnimation => "Cycle Animations",
            Action::CycleWeapon => "Cycle Weapons",
            Action::ReplayAnimation => "Play Animation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = Action::ALL.iter().map(|a| a.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), Action::ALL.len());
    }

    #[test]
    fn canonical_order_starts_with_help() {
        assert_eq!(Action::ALL[0], Action::ToggleHelpText);
        assert_eq!(Action::ALL[6], Action::ReplayAnimation);
    }
}
