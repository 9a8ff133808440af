//! Asset resolution for the character viewer.
//!
//! Every file the viewer reads is derived from [`voxview_common::ModelConfig`]
//! or the weapons directory, resolved once at startup and validated before
//! anything is loaded.
//!
//! # Layout
//! ```text
//! <base>/<Type>/<Model>.qb          voxel geometry
//! <base>/<Type>/<Type>.ms3d         skeleton
//! <base>/<Type>/<Type>.animlist     animation clips
//! <base>/<Type>/<Model>.faces       face mapping
//! <base>/<Type>/<Model>.character   character definition
//! <weapons>/<Name>/<Name>.weapon    weapon attachment
//! ```

mod animlist;
mod paths;

use std::path::PathBuf;

pub use animlist::{AnimationClip, parse_animation_list, read_animation_list};
pub use paths::{AssetKind, AssetPaths, WeaponAsset, require_file};

/// Errors from asset resolution and parsing.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing {kind} file: {path}")]
    Missing { kind: AssetKind, path: PathBuf },
    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}
