use crate::weapons::WeaponCycle;
use voxview_common::ViewerConfig;

/// Toggles and selections changed by input and read when rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub width: u32,
    pub height: u32,
    pub multisampling: bool,
    pub help_text: bool,
    pub wireframe: bool,
    pub talking: bool,
    pub animation_index: usize,
    pub weapons: WeaponCycle,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            width: config.window.width,
            height: config.window.height,
            multisampling: config.display.multisampling,
            help_text: config.display.help_text,
            wireframe: false,
            talking: false,
            animation_index: 0,
            weapons: WeaponCycle::new(),
        }
    }

    /// Step to the next animation, wrapping to 0. Returns the new index.
    pub fn next_animation(&mut self, count: usize) -> usize {
        self.animation_index = if count == 0 {
            0
        } else {
            (self.animation_index + 1) % count
        };
        self.animation_index
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}
