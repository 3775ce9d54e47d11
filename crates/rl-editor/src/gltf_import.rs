//! glTF / GLB → [`VisualTree`] conversion.
//!
//! Only what the editor needs is read: the node hierarchy, node transforms,
//! per-primitive bounds (from the POSITION accessor's min/max, so buffers
//! are never decoded) and the base color factor.

use crate::error::AssetLoadCause;
use glam::{EulerRot, Quat, Vec3};
use gltf::Gltf;
use rl_core::geometry::Aabb;
use rl_core::model::{Color, Transform};
use rl_core::visual::{MeshPart, VisualNode, VisualTree};

/// Deeper hierarchies are cut off; guards against cyclic node references.
const MAX_DEPTH: usize = 64;

/// Parse glTF JSON or binary GLB bytes into a visual tree.
///
/// The tree root is a synthetic node with identity transform whose
/// children are the scene's top-level nodes.
pub fn parse_visual(bytes: &[u8]) -> Result<VisualTree, AssetLoadCause> {
    let gltf = Gltf::from_slice(bytes)?;
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .ok_or(AssetLoadCause::EmptyScene)?;

    let mut root = VisualNode::named(scene.name().unwrap_or("scene"));
    for node in scene.nodes() {
        root.children.push(convert_node(&node, 0));
    }

    let tree = VisualTree::new(root);
    if tree.mesh_count() == 0 {
        return Err(AssetLoadCause::EmptyScene);
    }
    log::debug!(
        "parsed glTF scene {:?}: {} nodes, {} meshes",
        tree.root.name,
        tree.node_count(),
        tree.mesh_count()
    );
    Ok(tree)
}

fn convert_node(node: &gltf::Node, depth: usize) -> VisualNode {
    let (translation, rotation, scale) = node.transform().decomposed();
    let (rx, ry, rz) = Quat::from_array(rotation).normalize().to_euler(EulerRot::XYZ);

    let mut out = VisualNode::named(node.name().unwrap_or_default());
    out.local = Transform {
        position: Vec3::from_array(translation),
        rotation: Vec3::new(rx, ry, rz),
        scale: Vec3::from_array(scale),
    }
    .sanitized();

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            match primitive_bounds(&primitive) {
                Some(bounds) => out.meshes.push(MeshPart {
                    bounds,
                    color: base_color(&primitive),
                    cast_shadow: false,
                    receive_shadow: false,
                }),
                None => log::warn!(
                    "skipping primitive {} of mesh {:?}: POSITION has no min/max",
                    primitive.index(),
                    mesh.name()
                ),
            }
        }
    }

    if depth < MAX_DEPTH {
        out.children = node
            .children()
            .map(|child| convert_node(&child, depth + 1))
            .collect();
    }
    out
}

fn primitive_bounds(primitive: &gltf::Primitive) -> Option<Aabb> {
    let positions = primitive.get(&gltf::Semantic::Positions)?;
    let min: [f32; 3] = serde_json::from_value(positions.min()?).ok()?;
    let max: [f32; 3] = serde_json::from_value(positions.max()?).ok()?;
    let (min, max) = (Vec3::from_array(min), Vec3::from_array(max));
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    Some(Aabb::new(min, max))
}

fn base_color(primitive: &gltf::Primitive) -> Color {
    let [r, g, b, _] = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();
    Color::from_rgb_f32([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIR: &str = include_str!("../tests/fixtures/chair.gltf");
    const EMPTY: &str = include_str!("../tests/fixtures/empty_scene.gltf");

    #[test]
    fn chair_hierarchy_and_bounds() {
        let tree = parse_visual(CHAIR.as_bytes()).unwrap();
        assert_eq!(tree.root.name, "ChairScene");
        // scene root → Chair → Seat, Back
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.mesh_count(), 2);

        let chair = &tree.root.children[0];
        assert_eq!(chair.name, "Chair");
        assert_eq!(chair.children[1].name, "Back");

        let b = tree.bounding_box().unwrap();
        assert!(b.size().abs_diff_eq(Vec3::new(1.0, 2.0, 1.0), 1e-5));
        assert!(b.min.abs_diff_eq(Vec3::new(-0.5, 0.0, -0.5), 1e-5));
    }

    #[test]
    fn base_color_comes_from_material() {
        let tree = parse_visual(CHAIR.as_bytes()).unwrap();
        let meshes = tree.meshes();
        assert_eq!(meshes[0].color, Color::rgb(204, 102, 51));
    }

    #[test]
    fn scene_without_meshes_is_rejected() {
        assert!(matches!(
            parse_visual(EMPTY.as_bytes()),
            Err(AssetLoadCause::EmptyScene)
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_visual(b"definitely not a model"),
            Err(AssetLoadCause::Parse(_))
        ));
    }
}
