//! Editor configuration.

use crate::model::{Color, RoomAppearance};
use serde::Deserialize;
use std::path::PathBuf;

/// Configuration for a room editor session.
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EditorConfig {
    /// Largest bounding-box dimension of a freshly loaded asset, in meters.
    pub target_size: f32,

    /// Primitive kind substituted when an asset cannot be loaded and the
    /// item carries no kind hint of its own.
    pub fallback_kind: String,

    /// Store key of the layout record.
    pub layout_key: String,

    /// Store keys read for colors of layouts saved in the older format.
    pub floor_color_key: String,
    pub wall_color_key: String,

    /// Initial floor / wall colors.
    pub floor_color: Color,
    pub wall_color: Color,

    /// Directory asset urls are resolved against.
    pub models_dir: PathBuf,

    /// Directory of the file-backed layout store.
    pub storage_dir: PathBuf,

    /// Place the starter sofa, chair and table on startup.
    pub seed_sample_room: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let appearance = RoomAppearance::default();
        Self {
            target_size: 1.4,
            fallback_kind: "sofa".to_string(),
            layout_key: "roomLayout".to_string(),
            floor_color_key: "floorColor".to_string(),
            wall_color_key: "wallColor".to_string(),
            floor_color: appearance.floor,
            wall_color: appearance.wall,
            models_dir: PathBuf::from("."),
            storage_dir: PathBuf::from(".room-layout"),
            seed_sample_room: true,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn appearance(&self) -> RoomAppearance {
        RoomAppearance {
            floor: self.floor_color,
            wall: self.wall_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = EditorConfig::from_json(r##"{ "target_size": 2.0, "wall_color": "#336699" }"##)
            .unwrap();
        assert_eq!(cfg.target_size, 2.0);
        assert_eq!(cfg.wall_color, Color::rgb(0x33, 0x66, 0x99));
        assert_eq!(cfg.fallback_kind, "sofa");
        assert_eq!(cfg.layout_key, "roomLayout");
        assert_eq!(cfg.floor_color, Color::WHITE);
    }

    #[test]
    fn bad_color_is_rejected() {
        assert!(EditorConfig::from_json(r#"{ "floor_color": "white" }"#).is_err());
    }
}
