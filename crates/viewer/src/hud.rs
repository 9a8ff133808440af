//! Heads-up display text and its placement. Coordinates are pixels from the
//! bottom-left corner of the window.

use crate::clock::FrameTiming;
use serde::Serialize;

const MARGIN: f32 = 15.0;
const CENTRE_OFFSET: f32 = 75.0;
const HINT_COLUMN: f32 = 130.0;
const HINT_TOP: f32 = 135.0;
const HINT_SPACING: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

impl HudLine {
    fn new(x: f32, y: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

/// Everything the HUD shows for one frame.
#[derive(Debug, Clone)]
pub struct HudInput<'a> {
    pub timing: FrameTiming,
    pub width: u32,
    pub height: u32,
    pub text_height: f32,
    pub help_text: bool,
    pub camera: String,
    pub animation_index: usize,
    pub animation_count: usize,
    pub animation_name: &'a str,
    pub weapon_name: &'a str,
    pub hints: &'a [String],
}

pub fn fps_line(timing: &FrameTiming) -> String {
    format!("FPS: {:.0}  Delta: {:.4}", timing.fps, timing.delta)
}

pub fn animation_line(index: usize, count: usize, name: &str) -> String {
    format!("Animation [{index}/{}]: {name}", count as i64 - 1)
}

pub fn weapon_line(name: &str) -> String {
    format!("Weapon: {name}")
}

/// Lines in draw order. Only the FPS line is shown with help text off.
pub fn compose(input: &HudInput<'_>) -> Vec<HudLine> {
    let mut lines = vec![HudLine::new(MARGIN, MARGIN, fps_line(&input.timing))];
    if !input.help_text {
        return lines;
    }

    let width = input.width as f32;
    let centre = (width * 0.5).trunc() - CENTRE_OFFSET;
    lines.push(HudLine::new(
        MARGIN,
        input.height as f32 - input.text_height - 10.0,
        input.camera.clone(),
    ));
    lines.push(HudLine::new(
        centre,
        35.0,
        animation_line(input.animation_index, input.animation_count, input.animation_name),
    ));
    lines.push(HudLine::new(centre, MARGIN, weapon_line(input.weapon_name)));
    for (k, hint) in input.hints.iter().enumerate() {
        lines.push(HudLine::new(
            width - HINT_COLUMN,
            HINT_TOP - HINT_SPACING * k as f32,
            hint.clone(),
        ));
    }
    lines
}
