use voxview_character::Hand;

/// Load or unload one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponOp {
    /// Attach the weapon asset with this name.
    Load(Hand, &'static str),
    Unload(Hand),
}

/// One entry of the weapon cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loadout {
    pub name: &'static str,
    pub ops: &'static [WeaponOp],
}

/// The fixed weapon rotation. Each loadout only lists the changes from the
/// one before it.
pub const LOADOUTS: [Loadout; 6] = [
    Loadout {
        name: "Sword",
        ops: &[WeaponOp::Load(Hand::Right, "Sword")],
    },
    Loadout {
        name: "Sword & Shield",
        ops: &[WeaponOp::Load(Hand::Left, "Shield")],
    },
    Loadout {
        name: "Staff",
        ops: &[
            WeaponOp::Unload(Hand::Left),
            WeaponOp::Load(Hand::Right, "Staff"),
        ],
    },
    Loadout {
        name: "Bow",
        ops: &[
            WeaponOp::Unload(Hand::Right),
            WeaponOp::Load(Hand::Left, "Bow"),
        ],
    },
    Loadout {
        name: "2HandedSword",
        ops: &[
            WeaponOp::Unload(Hand::Left),
            WeaponOp::Load(Hand::Right, "2HandedSword"),
        ],
    },
    Loadout {
        name: "NONE",
        ops: &[WeaponOp::Unload(Hand::Left), WeaponOp::Unload(Hand::Right)],
    },
];

/// Sequential weapon selection. The index is the loadout applied next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponCycle {
    index: usize,
    name: &'static str,
}

impl Default for WeaponCycle {
    fn default() -> Self {
        Self {
            index: 0,
            name: "NONE",
        }
    }
}

impl WeaponCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Display name of the loadout currently worn.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Switch to the loadout at the current index and step the index.
    /// Returns the operations the caller must apply to the character.
    pub fn advance(&mut self) -> &'static [WeaponOp] {
        let loadout = &LOADOUTS[self.index];
        self.name = loadout.name;
        self.index = (self.index + 1) % LOADOUTS.len();
        loadout.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unarmed_at_zero() {
        let c = WeaponCycle::new();
        assert_eq!(c.index(), 0);
        assert_eq!(c.name(), "NONE");
    }

    #[test]
    fn first_four_names_in_order() {
        let mut c = WeaponCycle::new();
        let names: Vec<_> = (0..4)
            .map(|_| {
                c.advance();
                c.name()
            })
            .collect();
        assert_eq!(names, ["Sword", "Sword & Shield", "Staff", "Bow"]);
    }

    #[test]
    fn index_wraps_after_six() {
        let mut c = WeaponCycle::new();
        for step in 1..=20 {
            c.advance();
            assert!(c.index() < 6);
            assert_eq!(c.index(), step % 6);
        }
    }

    #[test]
    fn full_cycle_ends_unarmed() {
        let mut c = WeaponCycle::new();
        for _ in 0..6 {
            c.advance();
        }
        assert_eq!(c.name(), "NONE");
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn ops_track_hands() {
        // replay every op and check which hands end up armed
        let mut c = WeaponCycle::new();
        let mut hands: [Option<&str>; 2] = [None, None];
        let mut armed = Vec::new();
        for _ in 0..6 {
            for op in c.advance() {
                match *op {
                    WeaponOp::Load(h, name) => hands[h.index()] = Some(name),
                    WeaponOp::Unload(h) => hands[h.index()] = None,
                }
            }
            armed.push(hands);
        }
        assert_eq!(armed[0], [None, Some("Sword")]);
        assert_eq!(armed[1], [Some("Shield"), Some("Sword")]);
        assert_eq!(armed[2], [None, Some("Staff")]);
        assert_eq!(armed[3], [Some("Bow"), None]);
        assert_eq!(armed[4], [None, Some("2HandedSword")]);
        assert_eq!(armed[5], [None, None]);
    }
}
