//! Hit testing: ray → drawable node lookup.
//!
//! Walks each requested subtree, tests the ray against every mesh part in
//! that part's local space, and reports hits nearest first.

use crate::scene::MemoryScene;
use petgraph::graph::NodeIndex;
use rl_core::geometry::{Ray, RayHit};

/// Intersect `ray` with every mesh below (and including) each root.
pub fn intersect_subtrees(scene: &MemoryScene, ray: &Ray, roots: &[NodeIndex]) -> Vec<RayHit<NodeIndex>> {
    let mut hits = Vec::new();
    for &root in roots {
        if !scene.contains(root) {
            continue;
        }
        collect_hits(scene, root, ray, &mut hits);
    }
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

fn collect_hits(scene: &MemoryScene, idx: NodeIndex, ray: &Ray, out: &mut Vec<RayHit<NodeIndex>>) {
    if let Some(hit) = hit_node(scene, idx, ray) {
        out.push(hit);
    }
    for child in scene.children(idx) {
        collect_hits(scene, child, ray, out);
    }
}

/// Nearest hit on one node's own meshes, ignoring its children.
pub fn hit_node(scene: &MemoryScene, idx: NodeIndex, ray: &Ray) -> Option<RayHit<NodeIndex>> {
    let node = scene.node(idx)?;
    if node.meshes.is_empty() {
        return None;
    }

    let world = scene.world_matrix(idx);
    let inverse = world.inverse();
    // Zero scale collapses the node; nothing to hit.
    if !inverse.is_finite() {
        return None;
    }
    let local_ray = ray.transformed(&inverse);

    let t = node
        .meshes
        .iter()
        .filter_map(|mesh| mesh.bounds.intersect_ray(&local_ray))
        .min_by(f32::total_cmp)?;

    let point = ray.at(t);
    Some(RayHit {
        node: idx,
        distance: (point - ray.origin).length(),
        point,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use pretty_assertions::assert_eq;
    use rl_core::backend::SceneBackend;
    use rl_core::model::{PrimitiveShape, Transform};
    use rl_core::visual::VisualTree;

    fn down_ray_at(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn nearest_hit_first() {
        let mut scene = MemoryScene::new();
        let low = scene.attach(
            &VisualTree::primitive(PrimitiveShape::Table),
            &Transform::from_position(Vec3::new(0.0, 0.3, 0.0)),
        );
        let high = scene.attach(
            &VisualTree::primitive(PrimitiveShape::Chair),
            &Transform::from_position(Vec3::new(0.0, 3.0, 0.0)),
        );

        let hits = scene.intersect(&down_ray_at(0.0, 0.0), &[low, high]);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].node, high);
        assert_eq!(hits[1].node, low);
        assert!((hits[0].distance - (10.0 - 3.45)).abs() < 1e-4);
    }

    #[test]
    fn only_requested_roots_are_tested() {
        let mut scene = MemoryScene::new();
        let a = scene.attach(&VisualTree::primitive(PrimitiveShape::Sofa), &Transform::IDENTITY);
        let _b = scene.attach(
            &VisualTree::primitive(PrimitiveShape::Sofa),
            &Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
        );
        let hits = scene.intersect(&down_ray_at(0.0, 0.0), &[a]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, a);
    }

    #[test]
    fn miss_returns_nothing() {
        let mut scene = MemoryScene::new();
        let a = scene.attach(&VisualTree::primitive(PrimitiveShape::Chair), &Transform::IDENTITY);
        assert!(scene.intersect(&down_ray_at(5.0, 5.0), &[a]).is_empty());
    }

    #[test]
    fn rotated_and_scaled_nodes_are_hit_in_local_space() {
        let mut scene = MemoryScene::new();
        // Sofa is 2m wide on X; rotate it a quarter turn so it spans Z instead.
        let t = Transform {
            position: Vec3::ZERO,
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            scale: Vec3::ONE,
        };
        let sofa = scene.attach(&VisualTree::primitive(PrimitiveShape::Sofa), &t);
        assert!(scene.intersect(&down_ray_at(0.0, 0.9), &[sofa]).len() == 1);
        assert!(scene.intersect(&down_ray_at(0.9, 0.0), &[sofa]).is_empty());

        let collapsed = Transform::IDENTITY.with_uniform_scale(0.0);
        scene.set_transform(sofa, &collapsed);
        assert!(scene.intersect(&down_ray_at(0.0, 0.0), &[sofa]).is_empty());
    }
}
