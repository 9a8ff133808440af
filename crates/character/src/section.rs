/// Body regions that can run independent animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationSection {
    /// Drives every other section at once.
    FullBody,
    HeadBody,
    LeftArmHand,
    RightArmHand,
    LegsFeet,
}

impl AnimationSection {
    pub const COUNT: usize = 5;

    pub const ALL: [AnimationSection; Self::COUNT] = [
        AnimationSection::FullBody,
        AnimationSection::HeadBody,
        AnimationSection::LeftArmHand,
        AnimationSection::RightArmHand,
        AnimationSection::LegsFeet,
    ];

    /// The sections that own limbs, i.e. everything but `FullBody`.
    pub const PARTS: [AnimationSection; 4] = [
        AnimationSection::HeadBody,
        AnimationSection::LeftArmHand,
        AnimationSection::RightArmHand,
        AnimationSection::LegsFeet,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Per-section playback speed multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSpeeds([f32; AnimationSection::COUNT]);

impl SectionSpeeds {
    pub fn uniform(speed: f32) -> Self {
        Self([speed; AnimationSection::COUNT])
    }

    pub fn get(&self, section: AnimationSection) -> f32 {
        self.0[section.index()]
    }

    pub fn set(&mut self, section: AnimationSection, speed: f32) {
        self.0[section.index()] = speed;
    }
}

impl Default for SectionSpeeds {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_speeds() {
        let s = SectionSpeeds::default();
        for section in AnimationSection::ALL {
            assert_eq!(s.get(section), 1.0);
        }
    }

    #[test]
    fn set_one_section() {
        let mut s = SectionSpeeds::uniform(1.0);
        s.set(AnimationSection::LegsFeet, 2.0);
        assert_eq!(s.get(AnimationSection::LegsFeet), 2.0);
        assert_eq!(s.get(AnimationSection::HeadBody), 1.0);
    }

    #[test]
    fn parts_exclude_full_body() {
        assert!(!AnimationSection::PARTS.contains(&AnimationSection::FullBody));
        assert_eq!(AnimationSection::FullBody.index(), 0);
    }
}
