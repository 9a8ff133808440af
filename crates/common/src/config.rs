use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level viewer configuration.
///
/// Every section is optional in the YAML source; missing sections and fields
/// fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub model: ModelConfig,
    /// Directory holding `<Name>/<Name>.weapon` files.
    pub weapons_dir: PathBuf,
    pub font: FontConfig,
    pub camera: CameraConfig,
    pub character: CharacterConfig,
    pub display: DisplayConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            model: ModelConfig::default(),
            weapons_dir: PathBuf::from("media/gamedata/weapons"),
            font: FontConfig::default(),
            camera: CameraConfig::default(),
            character: CharacterConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            title: "voxview".into(),
        }
    }
}

/// Which character model to load and where its files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name, e.g. `Steve`. Selects the `.qb`, `.faces` and `.character` files.
    pub name: String,
    /// Character type, e.g. `Human`. Selects the folder, `.ms3d` and `.animlist` files.
    pub type_name: String,
    pub base_dir: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "Steve".into(),
            type_name: "Human".into(),
            base_dir: PathBuf::from("media/gamedata/models"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub path: PathBuf,
    pub point_size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("media/fonts/arial.ttf"),
            point_size: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub facing: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Fly/strafe speed in world units per second.
    pub move_speed: f32,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.25, 3.0),
            facing: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            move_speed: 20.0,
            fov_degrees: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    pub scale: f32,
    /// Seed for idle mouth and look-direction selection.
    pub seed: u64,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            scale: 0.08,
            seed: 0x5eed,
        }
    }
}

/// Initial values of the runtime display toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub multisampling: bool,
    pub help_text: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            multisampling: true,
            help_text: true,
        }
    }
}

impl ViewerConfig {
    /// Load and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.model.name.is_empty() || self.model.type_name.is_empty() {
            return Err(ConfigError::Invalid(
                "model name and type name must not be empty".into(),
            ));
        }
        if self.font.point_size == 0 {
            return Err(ConfigError::Invalid("font point size must be non-zero".into()));
        }
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fov must be in (0, 180), got {}",
                self.camera.fov_degrees
            )));
        }
        if self.character.scale <= 0.0 {
            return Err(ConfigError::Invalid("character scale must be positive".into()));
        }
        Ok(())
    }
}
