//! Model file schema.

use gf_sim::GreenhouseConfig;
use serde::{Deserialize, Serialize};

/// Current schema version.
pub const LATEST_VERSION: u32 = 1;

/// A greenhouse model definition as stored on disk.
///
/// `greenhouse` reuses the engine configuration types directly; every
/// section carries defaults, so a minimal file is just a name and a
/// version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub greenhouse: GreenhouseConfig,
}

impl ModelDef {
    /// A fresh definition with engine defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            greenhouse: GreenhouseConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() {
        let model: ModelDef = serde_yaml::from_str("version: 1\nname: venlo\n").unwrap();
        assert_eq!(model.name, "venlo");
        assert_eq!(model.greenhouse, GreenhouseConfig::default());
    }

    #[test]
    fn partial_section_overrides_only_named_fields() {
        let yaml = r#"
version: 1
name: venlo
greenhouse:
  geometry:
    floor_area_m2: 9600.0
  screen_usable: false
"#;
        let model: ModelDef = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(model.greenhouse.geometry.floor_area_m2, 9600.0);
        // Unnamed fields keep defaults
        assert_eq!(
            model.greenhouse.geometry.h_air_m,
            GreenhouseConfig::default().geometry.h_air_m
        );
        assert!(!model.greenhouse.screen_usable);
    }
}
