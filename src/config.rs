//! Configuration for the input resolver
//!
//! Loaded from YAML. Every field has a default so an empty file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::delegate::RenderMode;
use crate::haptics::DEFAULT_MIN_HAPTIC_AMPLITUDE;
use crate::hand::DEFAULT_PINCH_THRESHOLD;
use crate::mapping::{MappingCatalog, SystemProperties};
use crate::resolver::DEFAULT_CLICK_THRESHOLD;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Analog level above which a button without click channel is clicked
    #[serde(default = "default_click_threshold")]
    pub click_threshold: f32,
    /// Pinch strength at which a tracked finger counts as pinching
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,
    #[serde(default = "default_min_haptic_amplitude")]
    pub min_haptic_amplitude: f32,
    /// Height added to poses in standalone mode, in meters
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
    #[serde(default)]
    pub render_mode: RenderMode,
    /// Force this interaction profile instead of asking the runtime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emulate_profile: Option<String>,
    #[serde(default = "default_system")]
    pub system: SystemProperties,
    /// Extra device mappings, appended after the built-in ones
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mappings_file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub include_builtin_mappings: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            click_threshold: default_click_threshold(),
            pinch_threshold: default_pinch_threshold(),
            min_haptic_amplitude: default_min_haptic_amplitude(),
            eye_height: default_eye_height(),
            render_mode: RenderMode::default(),
            emulate_profile: None,
            system: default_system(),
            mappings_file: None,
            include_builtin_mappings: true,
        }
    }
}

impl ResolverConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to load config: {}", path))?;

        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty map
        let config: ResolverConfig = if yaml.trim().is_empty() {
            ResolverConfig::default()
        } else {
            serde_yaml::from_str(yaml).context("Failed to parse YAML config")?
        };

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.click_threshold > 0.0 && self.click_threshold <= 1.0) {
            anyhow::bail!(
                "click_threshold {} is invalid (must be in (0, 1])",
                self.click_threshold
            );
        }
        if !(self.pinch_threshold > 0.0 && self.pinch_threshold <= 1.0) {
            anyhow::bail!(
                "pinch_threshold {} is invalid (must be in (0, 1])",
                self.pinch_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.min_haptic_amplitude) {
            anyhow::bail!(
                "min_haptic_amplitude {} is invalid (must be in [0, 1])",
                self.min_haptic_amplitude
            );
        }
        if !(self.eye_height >= 0.0) {
            anyhow::bail!("eye_height {} cannot be negative", self.eye_height);
        }
        if let Some(profile) = &self.emulate_profile {
            if profile.is_empty() {
                anyhow::bail!("emulate_profile cannot be empty");
            }
        }
        if self.system.name.is_empty() {
            anyhow::bail!("system name cannot be empty");
        }
        if !self.include_builtin_mappings && self.mappings_file.is_none() {
            anyhow::bail!("Built-in mappings disabled but no mappings_file given");
        }

        Ok(())
    }

    /// Build the mapping catalog this configuration describes
    pub fn build_catalog(&self) -> Result<MappingCatalog> {
        let mut catalog = if self.include_builtin_mappings {
            MappingCatalog::builtin()
        } else {
            MappingCatalog::empty()
        };

        if let Some(path) = &self.mappings_file {
            catalog.extend(MappingCatalog::load_from_file(path)?);
        }

        Ok(catalog)
    }
}

// Default value functions
fn default_click_threshold() -> f32 { DEFAULT_CLICK_THRESHOLD }
fn default_pinch_threshold() -> f32 { DEFAULT_PINCH_THRESHOLD }
fn default_min_haptic_amplitude() -> f32 { DEFAULT_MIN_HAPTIC_AMPLITUDE }
fn default_eye_height() -> f32 { 1.7 }
fn default_system() -> SystemProperties { SystemProperties::new("Simulated Headset", true) }
fn default_true() -> bool { true }

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ResolverConfig::from_yaml("").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.click_threshold, 0.91);
        assert_eq!(config.pinch_threshold, 0.4);
        assert_eq!(config.render_mode, RenderMode::Standalone);
    }

    #[test]
    fn test_partial_document() {
        let config = ResolverConfig::from_yaml(
            r#"
render_mode: immersive
emulate_profile: /interaction_profiles/ext/hand_interaction_ext
system:
  name: Pico Neo 3
  position_tracking: true
"#,
        )
        .unwrap();

        assert_eq!(config.render_mode, RenderMode::Immersive);
        assert_eq!(config.system.name, "Pico Neo 3");
        assert_eq!(config.eye_height, 1.7);
        assert!(config.include_builtin_mappings);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let err = ResolverConfig::from_yaml("click_threshold: 1.5").unwrap_err();
        assert!(format!("{:#}", err).contains("click_threshold"));

        assert!(ResolverConfig::from_yaml("pinch_threshold: 0.0").is_err());
        assert!(ResolverConfig::from_yaml("min_haptic_amplitude: -0.1").is_err());
        assert!(ResolverConfig::from_yaml("eye_height: -1.0").is_err());
        assert!(ResolverConfig::from_yaml("include_builtin_mappings: false").is_err());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ResolverConfig {
            render_mode: RenderMode::Immersive,
            min_haptic_amplitude: 0.3,
            ..ResolverConfig::default()
        };
        config.save(&path).await.unwrap();

        let loaded = ResolverConfig::load(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ResolverConfig::load("/nonexistent/resolver.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_catalog_with_extra_mappings() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
- profile: /interaction_profiles/test/wand
  dof: 6dof
  controller_type: test-wand
  left_model: wand-left
  right_model: wand-right
"#
        )
        .unwrap();

        let config = ResolverConfig {
            mappings_file: Some(file.path().to_path_buf()),
            include_builtin_mappings: false,
            ..ResolverConfig::default()
        };
        let catalog = config.build_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find_by_profile("/interaction_profiles/test/wand").is_some());
    }
}
