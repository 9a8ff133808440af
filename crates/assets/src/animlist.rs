use crate::{AssetError, AssetKind, require_file};
use serde::Serialize;
use std::path::Path;

/// One named clip from an animation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationClip {
    pub name: String,
    pub start_frame: u32,
    pub end_frame: u32,
    pub looping: bool,
}

impl AnimationClip {
    pub fn frame_count(&self) -> u32 {
        self.end_frame - self.start_frame + 1
    }
}

/// Read and parse an `.animlist` file.
pub fn read_animation_list(path: &Path) -> Result<Vec<AnimationClip>, AssetError> {
    require_file(AssetKind::AnimationList, path)?;
    let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let clips = parse_animation_list(path, &text)?;
    tracing::debug!(path = %path.display(), clips = clips.len(), "animation list loaded");
    Ok(clips)
}

/// Parse animation list text.
///
/// One clip per line: `name [start end [loop]]`. Blank lines and text after
/// `#` are ignored. A clip without a frame range is a single frame at 0.
pub fn parse_animation_list(path: &Path, text: &str) -> Result<Vec<AnimationClip>, AssetError> {
    let mut clips = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let parse_err = |message: String| AssetError::Parse {
            path: path.to_path_buf(),
            line: line_no,
            message,
        };
        let frame = |field: &str| {
            field
                .parse::<u32>()
                .map_err(|_| parse_err(format!("invalid frame number '{field}'")))
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let (start_frame, end_frame, looping) = match fields.as_slice() {
            [_] => (0, 0, false),
            [_, start, end] => (frame(*start)?, frame(*end)?, false),
            [_, start, end, flag] if flag.eq_ignore_ascii_case("loop") => {
                (frame(*start)?, frame(*end)?, true)
            }
            [_, _, _, flag] => return Err(parse_err(format!("unknown flag '{flag}'"))),
            _ => {
                return Err(parse_err(format!(
                    "expected 'name [start end [loop]]', got {} fields",
                    fields.len()
                )));
            }
        };

        if end_frame < start_frame {
            return Err(parse_err(format!(
                "end frame {end_frame} precedes start frame {start_frame}"
            )));
        }
        if clips.iter().any(|c: &AnimationClip| c.name == fields[0]) {
            return Err(parse_err(format!("duplicate animation '{}'", fields[0])));
        }

        clips.push(AnimationClip {
            name: fields[0].to_string(),
            start_frame,
            end_frame,
            looping,
        });
    }

    Ok(clips)
}
