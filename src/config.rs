//! Demo configuration.
//!
//! Every field has a default, so a config file only needs the values it wants to change. The file
//! is looked up at `--config`, then at `<config dir>/texsphere/config.json`.

use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::{cli::Args, error::ConfigError};

/// Window and timing settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Interval between two ticks in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "OpenGL with SDL2: Textured Sphere".to_string(),
            width: 800,
            height: 600,
            tick_interval_ms: 16,
        }
    }
}

/// The constants of the scene: camera, animation and sphere geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// How far the sphere is pushed along the negative view axis.
    pub camera_distance: f32,
    /// Rotation axis. Does not need to be normalized.
    pub rotation_axis: Vec3,
    /// Degrees added to the angle per tick.
    pub rotation_step: f32,
    pub sphere_scale: f32,
    pub sphere_radius: f32,
    /// Longitude subdivisions.
    pub slices: u32,
    /// Latitude subdivisions.
    pub stacks: u32,
    pub clear_color: Vec4,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            camera_distance: 4.5,
            rotation_axis: Vec3::new(2.0, -1.0, -1.0),
            rotation_step: 0.5,
            sphere_scale: 1.0,
            sphere_radius: 1.5,
            slices: 32,
            stacks: 32,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

/// Top level configuration of the demo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub scene: SceneSettings,
    /// Image mapped onto the sphere.
    pub texture: PathBuf,
    /// Optional image drawn behind the sphere. An empty path means no background.
    pub background: PathBuf,
    pub log_level: log::LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            scene: SceneSettings::default(),
            texture: PathBuf::from("8k_earth_daymap.jpg"),
            background: PathBuf::new(),
            log_level: log::LevelFilter::Info,
        }
    }
}

impl Config {
    /// Parses a configuration from JSON text.
    pub fn from_json(path: &Path, text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &text)
    }

    /// Loads the configuration from `explicit` if given, else from the default location if a file
    /// exists there, else returns the defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Lets image paths given on the command line override the ones from the file.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(texture) = &args.texture {
            self.texture = texture.clone();
        }
        if let Some(background) = &args.background {
            self.background = background.clone();
        }
    }

    /// Returns the background path, or `None` if it is empty.
    pub fn background_path(&self) -> Option<&Path> {
        if self.background.as_os_str().is_empty() {
            None
        } else {
            Some(&self.background)
        }
    }
}

/// The per-user config file location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("texsphere").join("config.json"))
}
