//! Core data model for a furnished room.
//!
//! A room holds an ordered set of placed items. Each item knows where its
//! visual form comes from (its [`Provenance`]), where it sits (its
//! [`Transform`]), and which collaborator-owned visual node draws it.
//! Room surfaces (floor, walls) carry only a color.

use crate::id::ItemId;
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit sRGB color. Room surfaces have no alpha.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`. The leading `#` is optional, since older
    /// layouts stored colors as bare hex.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 => Some(Self::rgb(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
            )),
            6 => Some(Self::rgb(
                hex_val(bytes[0])? << 4 | hex_val(bytes[1])?,
                hex_val(bytes[2])? << 4 | hex_val(bytes[3])?,
                hex_val(bytes[4])? << 4 | hex_val(bytes[5])?,
            )),
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear-ish float triple for renderers that want `[0, 1]` channels.
    pub fn to_rgb_f32(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    /// Quantize `[0, 1]` channels (e.g. a glTF base color factor).
    pub fn from_rgb_f32(rgb: [f32; 3]) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(q(rgb[0]), q(rgb[1]), q(rgb[2]))
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {s:?}")))
    }
}

// ─── Room surfaces ───────────────────────────────────────────────────────

/// Colorable room surfaces. All walls share one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Floor,
    Walls,
}

/// Scene appearance state, independent of items and persisted with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomAppearance {
    pub floor: Color,
    pub wall: Color,
}

impl Default for RoomAppearance {
    fn default() -> Self {
        Self {
            floor: Color::WHITE,
            wall: Color::rgb(0xf0, 0xf0, 0xf0),
        }
    }
}

// ─── Provenance ──────────────────────────────────────────────────────────

/// Where an item's visual form comes from. Fixed for the item's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    /// An external model resource (glTF / GLB).
    AssetRef {
        url: String,
        /// Primitive kind to substitute if the asset cannot be loaded.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind_hint: Option<String>,
    },
    /// One of the built-in shapes, selected by kind name.
    Primitive { kind: String },
}

impl Provenance {
    pub fn primitive(kind: impl Into<String>) -> Self {
        Provenance::Primitive { kind: kind.into() }
    }

    pub fn asset(url: impl Into<String>) -> Self {
        Provenance::AssetRef {
            url: url.into(),
            kind_hint: None,
        }
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, Provenance::AssetRef { .. })
    }

    /// The primitive kind this provenance names or hints at, if any.
    pub fn primitive_kind(&self) -> Option<&str> {
        match self {
            Provenance::Primitive { kind } => Some(kind),
            Provenance::AssetRef { kind_hint, .. } => kind_hint.as_deref(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Provenance::AssetRef { url, .. } => Some(url),
            Provenance::Primitive { .. } => None,
        }
    }

    /// Human-readable label: the shape name for primitives, the file stem
    /// for assets (`models/armchair.glb` → `armchair`).
    pub fn default_label(&self) -> String {
        match self {
            Provenance::Primitive { kind } => PrimitiveShape::for_kind(kind).label().to_string(),
            Provenance::AssetRef { url, .. } => {
                let file = url.rsplit(['/', '\\']).next().unwrap_or(url);
                let stem = file.split('.').next().unwrap_or(file);
                if stem.is_empty() {
                    url.clone()
                } else {
                    stem.to_string()
                }
            }
        }
    }
}

// ─── Built-in shapes ─────────────────────────────────────────────────────

/// Built-in furniture shapes. Unrecognized kinds build a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveShape {
    Sofa,
    Chair,
    Table,
}

impl PrimitiveShape {
    /// Map a kind name to its shape. Total: never fails.
    pub fn for_kind(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "sofa" | "box_sofa" => PrimitiveShape::Sofa,
            "chair" | "box_chair" => PrimitiveShape::Chair,
            _ => PrimitiveShape::Table,
        }
    }

    /// Full box extents (width, height, depth) in meters.
    pub fn size(&self) -> Vec3 {
        match self {
            PrimitiveShape::Sofa => Vec3::new(2.0, 0.8, 0.9),
            PrimitiveShape::Chair => Vec3::new(0.9, 0.9, 0.9),
            PrimitiveShape::Table => Vec3::new(1.2, 0.6, 1.2),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            PrimitiveShape::Sofa => Color::rgb(0x8b, 0x5c, 0xf6),
            PrimitiveShape::Chair => Color::rgb(0xf5, 0x9e, 0x0b),
            PrimitiveShape::Table => Color::rgb(0x10, 0xb9, 0x81),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrimitiveShape::Sofa => "Sofa",
            PrimitiveShape::Chair => "Chair",
            PrimitiveShape::Table => "Table",
        }
    }
}

// ─── Transform ───────────────────────────────────────────────────────────

/// Position, Euler rotation (XYZ order, radians) and per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_uniform_scale(mut self, factor: f32) -> Self {
        self.scale = Vec3::splat(factor);
        self
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Replace every non-finite component with its identity value.
    pub fn sanitized(&self) -> Transform {
        let fix = |v: Vec3, identity: f32| {
            Vec3::new(
                if v.x.is_finite() { v.x } else { identity },
                if v.y.is_finite() { v.y } else { identity },
                if v.z.is_finite() { v.z } else { identity },
            )
        };
        Transform {
            position: fix(self.position, 0.0),
            rotation: fix(self.rotation, 0.0),
            scale: fix(self.scale, 1.0),
        }
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Transform, eps: f32) -> bool {
        self.position.abs_diff_eq(other.position, eps)
            && self.rotation.abs_diff_eq(other.rotation, eps)
            && self.scale.abs_diff_eq(other.scale, eps)
    }
}

// ─── Placed items ────────────────────────────────────────────────────────

/// An item in the room. `H` is the scene collaborator's handle type: a
/// non-owning back-reference used to route detach and pick requests.
#[derive(Debug, Clone)]
pub struct PlacedItem<H> {
    pub id: ItemId,
    provenance: Provenance,
    pub transform: Transform,
    pub label: String,
    pub visual: H,
}

impl<H: Copy> PlacedItem<H> {
    pub fn new(id: ItemId, provenance: Provenance, transform: Transform, label: String, visual: H) -> Self {
        Self {
            id,
            provenance,
            transform,
            label,
            visual,
        }
    }

    /// Provenance is read-only; replacing it means deleting and re-adding.
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#F0F0F0").unwrap();
        assert_eq!(c.to_hex(), "#f0f0f0");
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#abc"), Some(Color::rgb(0xaa, 0xbb, 0xcc)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
    }

    #[test]
    fn color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 255)).unwrap();
        assert_eq!(json, "\"#0102ff\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(1, 2, 255));
        assert!(serde_json::from_str::<Color>("\"blue\"").is_err());
    }

    #[test]
    fn shape_lookup_is_total() {
        assert_eq!(PrimitiveShape::for_kind("sofa"), PrimitiveShape::Sofa);
        assert_eq!(PrimitiveShape::for_kind("box_chair"), PrimitiveShape::Chair);
        assert_eq!(PrimitiveShape::for_kind("Table"), PrimitiveShape::Table);
        assert_eq!(PrimitiveShape::for_kind("lamp"), PrimitiveShape::Table);
        assert_eq!(PrimitiveShape::for_kind(""), PrimitiveShape::Table);
    }

    #[test]
    fn asset_label_is_file_stem() {
        assert_eq!(Provenance::asset("models/armchair.glb").default_label(), "armchair");
        assert_eq!(Provenance::asset("sofa.gltf").default_label(), "sofa");
        assert_eq!(Provenance::primitive("chair").default_label(), "Chair");
        assert_eq!(Provenance::primitive("lamp").default_label(), "Table");
    }

    #[test]
    fn primitive_kind_reads_hint() {
        let p = Provenance::AssetRef {
            url: "models/x.glb".into(),
            kind_hint: Some("chair".into()),
        };
        assert_eq!(p.primitive_kind(), Some("chair"));
        assert_eq!(Provenance::asset("models/x.glb").primitive_kind(), None);
    }

    #[test]
    fn transform_sanitize_replaces_non_finite() {
        let t = Transform {
            position: Vec3::new(f32::NAN, 1.0, 2.0),
            rotation: Vec3::new(0.0, f32::INFINITY, 0.0),
            scale: Vec3::new(2.0, f32::NAN, 2.0),
        };
        assert!(!t.is_finite());
        let s = t.sanitized();
        assert!(s.is_finite());
        assert_eq!(s.position, Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(s.rotation, Vec3::ZERO);
        assert_eq!(s.scale, Vec3::new(2.0, 1.0, 2.0));
    }

    #[test]
    fn transform_matrix_applies_scale_then_translation() {
        let t = Transform::from_position(Vec3::new(1.0, 0.0, 0.0)).with_uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 2.0), 1e-6));
    }
}
