use crate::AssetError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use voxview_common::ModelConfig;

/// The kinds of file a character is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssetKind {
    VoxelGeometry,
    Skeleton,
    AnimationList,
    FaceMapping,
    CharacterDefinition,
    Weapon,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::VoxelGeometry => "voxel geometry",
            AssetKind::Skeleton => "skeleton",
            AssetKind::AnimationList => "animation list",
            AssetKind::FaceMapping => "face mapping",
            AssetKind::CharacterDefinition => "character definition",
            AssetKind::Weapon => "weapon",
        };
        f.write_str(name)
    }
}

/// Resolved file locations for one character model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetPaths {
    pub type_name: String,
    pub model_name: String,
    pub base_dir: PathBuf,
    pub voxel_geometry: PathBuf,
    pub skeleton: PathBuf,
    pub animation_list: PathBuf,
    pub face_mapping: PathBuf,
    pub character_definition: PathBuf,
}

impl AssetPaths {
    pub fn resolve(model: &ModelConfig) -> Self {
        let type_dir = model.base_dir.join(&model.type_name);
        let by_model = |ext: &str| type_dir.join(format!("{}.{ext}", model.name));
        let by_type = |ext: &str| type_dir.join(format!("{}.{ext}", model.type_name));

        Self {
            type_name: model.type_name.clone(),
            model_name: model.name.clone(),
            base_dir: model.base_dir.clone(),
            voxel_geometry: by_model("qb"),
            skeleton: by_type("ms3d"),
            animation_list: by_type("animlist"),
            face_mapping: by_model("faces"),
            character_definition: by_model("character"),
        }
    }

    /// Every file of the model paired with its kind.
    pub fn files(&self) -> [(AssetKind, &Path); 5] {
        [
            (AssetKind::VoxelGeometry, self.voxel_geometry.as_path()),
            (AssetKind::Skeleton, self.skeleton.as_path()),
            (AssetKind::AnimationList, self.animation_list.as_path()),
            (AssetKind::FaceMapping, self.face_mapping.as_path()),
            (AssetKind::CharacterDefinition, self.character_definition.as_path()),
        ]
    }

    /// Files that do not exist on disk.
    pub fn missing(&self) -> Vec<(AssetKind, PathBuf)> {
        self.files()
            .into_iter()
            .filter(|(_, p)| !p.is_file())
            .map(|(k, p)| (k, p.to_path_buf()))
            .collect()
    }

    /// Fail on the first missing file.
    pub fn verify(&self) -> Result<(), AssetError> {
        for (kind, path) in self.files() {
            require_file(kind, path)?;
        }
        tracing::debug!(model = %self.model_name, kind = %self.type_name, "character assets present");
        Ok(())
    }
}

/// A weapon attachment file and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponAsset {
    pub name: String,
    pub path: PathBuf,
}

impl WeaponAsset {
    /// `<weapons_dir>/<name>/<name>.weapon`
    pub fn resolve(weapons_dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: weapons_dir.join(name).join(format!("{name}.weapon")),
        }
    }

    /// Open a weapon by path, taking its name from the file stem.
    pub fn from_path(path: &Path) -> Result<Self, AssetError> {
        require_file(AssetKind::Weapon, path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("weapon")
            .to_string();
        Ok(Self {
            name,
            path: path.to_path_buf(),
        })
    }
}

/// Ensure `path` names an existing regular file.
pub fn require_file(kind: AssetKind, path: &Path) -> Result<(), AssetError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AssetError::Missing {
            kind,
            path: path.to_path_buf(),
        })
    }
}
