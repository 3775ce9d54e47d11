//! Persisted layout records.
//!
//! A layout is stored as one JSON record:
//!
//! ```json
//! { "items": [ { "provenanceKind": "primitive", "kind": "sofa",
//!                "position": [-1.5, 0.5, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1] } ],
//!   "floorColor": "#ffffff", "wallColor": "#f0f0f0" }
//! ```
//!
//! Older layouts stored a bare array of `{ modelUrl, type, name, pos, rot, scale }`
//! entries, with the colors under separate keys as bare hex. Both parse into
//! a [`LayoutSnapshot`]; only the record form is ever written.

use crate::model::{Color, Provenance, Transform};
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceKind {
    Asset,
    Primitive,
}

/// One item of a persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotItem {
    pub provenance_kind: ProvenanceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Primitive kind, or the fallback hint of an asset item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub position: [f32; 3],
    #[serde(default = "zero3")]
    pub rotation: [f32; 3],
    #[serde(default = "one3")]
    pub scale: [f32; 3],
}

fn zero3() -> [f32; 3] {
    [0.0; 3]
}

fn one3() -> [f32; 3] {
    [1.0; 3]
}

impl SnapshotItem {
    pub fn new(provenance: &Provenance, transform: &Transform, name: Option<&str>) -> Self {
        let (provenance_kind, url, kind) = match provenance {
            Provenance::AssetRef { url, kind_hint } => {
                (ProvenanceKind::Asset, Some(url.clone()), kind_hint.clone())
            }
            Provenance::Primitive { kind } => (ProvenanceKind::Primitive, None, Some(kind.clone())),
        };
        Self {
            provenance_kind,
            url,
            kind,
            name: name.map(str::to_string),
            position: transform.position.to_array(),
            rotation: transform.rotation.to_array(),
            scale: transform.scale.to_array(),
        }
    }

    /// Rebuild the provenance. An asset entry without a url, or a primitive
    /// entry without a kind, degrades to a primitive of `default_kind`.
    pub fn provenance(&self, default_kind: &str) -> Provenance {
        match (self.provenance_kind, &self.url) {
            (ProvenanceKind::Asset, Some(url)) if !url.is_empty() => Provenance::AssetRef {
                url: url.clone(),
                kind_hint: self.kind.clone(),
            },
            _ => Provenance::Primitive {
                kind: self
                    .kind
                    .clone()
                    .filter(|k| !k.is_empty())
                    .unwrap_or_else(|| default_kind.to_string()),
            },
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: Vec3::from_array(self.position),
            rotation: Vec3::from_array(self.rotation),
            scale: Vec3::from_array(self.scale),
        }
    }
}

/// A complete persisted layout: items in placement order plus room colors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    pub items: Vec<SnapshotItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_color: Option<Color>,
}

impl LayoutSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Entry of the older array-only layout format.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LegacyItem {
    #[serde(rename = "modelUrl", default)]
    pub model_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub pos: [f32; 3],
    #[serde(default = "zero3")]
    pub rot: [f32; 3],
    #[serde(default = "one3")]
    pub scale: [f32; 3],
}

impl From<LegacyItem> for SnapshotItem {
    fn from(item: LegacyItem) -> Self {
        let provenance_kind = if item.model_url.is_some() {
            ProvenanceKind::Asset
        } else {
            ProvenanceKind::Primitive
        };
        SnapshotItem {
            provenance_kind,
            url: item.model_url,
            kind: item.kind,
            name: item.name.filter(|n| !n.is_empty()),
            position: item.pos,
            rotation: item.rot,
            scale: item.scale,
        }
    }
}

/// Whatever was found under the layout key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredLayout {
    Legacy(Vec<LegacyItem>),
    Record(LayoutSnapshot),
}

impl StoredLayout {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredLayout::Legacy(_))
    }

    /// Normalize to a snapshot. Legacy layouts take their colors from the
    /// separately stored values, if any.
    pub fn into_snapshot(self, legacy_floor: Option<Color>, legacy_wall: Option<Color>) -> LayoutSnapshot {
        match self {
            StoredLayout::Record(snapshot) => snapshot,
            StoredLayout::Legacy(items) => LayoutSnapshot {
                items: items.into_iter().map(SnapshotItem::from).collect(),
                floor_color: legacy_floor,
                wall_color: legacy_wall,
            },
        }
    }
}
