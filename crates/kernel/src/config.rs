use donutfield_assets::AssetPaths;
use donutfield_input::DEFAULT_SENSITIVITY;
use donutfield_render::CameraConfig;
use donutfield_scene::SceneConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::KernelError;

/// Everything tunable about the demo. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub pointer_sensitivity: f32,
    pub assets: AssetPaths,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            camera: CameraConfig::default(),
            pointer_sensitivity: DEFAULT_SENSITIVITY,
            assets: AssetPaths::default(),
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub font: Option<PathBuf>,
    pub matcaps: Option<PathBuf>,
    pub seed: Option<u64>,
    pub count: Option<usize>,
}

impl DemoConfig {
    /// Load `path` if given (defaults otherwise), then apply `overrides`.
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, KernelError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(font) = &overrides.font {
            self.assets.font = font.clone();
        }
        if let Some(dir) = &overrides.matcaps {
            self.assets.matcap_dir = dir.clone();
        }
        if let Some(seed) = overrides.seed {
            self.scene.seed = Some(seed);
        }
        if let Some(count) = overrides.count {
            self.scene.instance_count = count;
        }
    }

    pub fn from_json(path: &Path, json: &str) -> Result<Self, KernelError> {
        serde_json::from_str(json).map_err(|source| KernelError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, KernelError> {
        let json = std::fs::read_to_string(path).map_err(|source| KernelError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(path, &json)?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        let config = DemoConfig::from_json(Path::new("inline"), "{}").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.scene.instance_count, 1000);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.pointer_sensitivity, 0.02);
    }

    #[test]
    fn partial_override() {
        let json = r#"{
            "scene": { "instance_count": 10, "seed": 5 },
            "assets": { "matcap_count": 4 }
        }"#;
        let config = DemoConfig::from_json(Path::new("inline"), json).unwrap();
        assert_eq!(config.scene.instance_count, 10);
        assert_eq!(config.scene.seed, Some(5));
        assert_eq!(config.scene.donut_opacity, 0.7);
        assert_eq!(config.assets.matcap_count, 4);
    }

    #[test]
    fn json_survives_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        let mut config = DemoConfig::default();
        config.camera.easing = 0.1;
        std::fs::write(&path, config.to_json()).unwrap();
        assert_eq!(DemoConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn overrides_beat_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        std::fs::write(&path, r#"{ "scene": { "instance_count": 10, "seed": 1 } }"#).unwrap();
        let overrides = ConfigOverrides {
            font: Some(PathBuf::from("other.otf")),
            seed: Some(2),
            ..ConfigOverrides::default()
        };
        let config = DemoConfig::resolve(Some(&path), &overrides).unwrap();
        assert_eq!(config.assets.font, PathBuf::from("other.otf"));
        assert_eq!(config.scene.seed, Some(2));
        assert_eq!(config.scene.instance_count, 10);
        let default_dir = PathBuf::from("assets/textures/matcaps");
        assert_eq!(config.assets.matcap_dir, default_dir);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = DemoConfig::resolve(
            Some(Path::new("/no/such/demo.json")),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::ConfigIo { .. }));
    }

    #[test]
    fn bad_json_names_file() {
        let err = DemoConfig::from_json(Path::new("broken.json"), "{ nope").unwrap_err();
        assert!(matches!(err, KernelError::ConfigParse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
