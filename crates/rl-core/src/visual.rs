//! Renderer-independent description of an item's visual form.
//!
//! Asset resolution produces a [`VisualTree`]; the scene collaborator turns
//! it into real nodes when the item is attached. A tree is a hierarchy of
//! nodes with local transforms, each carrying zero or more mesh parts.

use crate::geometry::Aabb;
use crate::model::{Color, PrimitiveShape, Transform};
use glam::Mat4;
use smallvec::SmallVec;

/// One drawable piece of geometry, described by its local bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub bounds: Aabb,
    pub color: Color,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisualNode {
    pub name: String,
    pub local: Transform,
    pub meshes: SmallVec<[MeshPart; 2]>,
    pub children: Vec<VisualNode>,
}

impl VisualNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn collect_bounds(&self, parent: Mat4, acc: &mut Option<Aabb>) {
        let world = parent * self.local.matrix();
        for mesh in &self.meshes {
            let b = mesh.bounds.transformed(&world);
            *acc = Some(match acc.take() {
                Some(a) => a.union(&b),
                None => b,
            });
        }
        for child in &self.children {
            child.collect_bounds(world, acc);
        }
    }

    fn for_each_mesh_mut(&mut self, f: &mut impl FnMut(&mut MeshPart)) {
        for mesh in &mut self.meshes {
            f(mesh);
        }
        for child in &mut self.children {
            child.for_each_mesh_mut(f);
        }
    }

    fn count(&self) -> (usize, usize) {
        self.children
            .iter()
            .map(VisualNode::count)
            .fold((1, self.meshes.len()), |(n, m), (cn, cm)| (n + cn, m + cm))
    }
}

/// A complete visual subtree ready to be attached to the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    pub root: VisualNode,
}

impl VisualTree {
    pub fn new(root: VisualNode) -> Self {
        Self { root }
    }

    /// Single box mesh for a built-in shape, centered on the origin.
    pub fn primitive(shape: PrimitiveShape) -> Self {
        let mut root = VisualNode::named(shape.label());
        root.meshes.push(MeshPart {
            bounds: Aabb::centered(shape.size()),
            color: shape.color(),
            cast_shadow: true,
            receive_shadow: false,
        });
        Self { root }
    }

    /// Bounds of all meshes, in the space of the root's parent
    /// (the root's own local transform included). `None` if there are no meshes.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut acc = None;
        self.root.collect_bounds(Mat4::IDENTITY, &mut acc);
        acc
    }

    /// Flag every mesh in the tree as casting and receiving shadows.
    pub fn enable_shadows(&mut self) {
        self.root.for_each_mesh_mut(&mut |mesh| {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        });
    }

    pub fn node_count(&self) -> usize {
        self.root.count().0
    }

    pub fn mesh_count(&self) -> usize {
        self.root.count().1
    }

    pub fn meshes(&self) -> Vec<&MeshPart> {
        fn walk<'a>(node: &'a VisualNode, out: &mut Vec<&'a MeshPart>) {
            out.extend(node.meshes.iter());
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn mesh(size: Vec3) -> MeshPart {
        MeshPart {
            bounds: Aabb::centered(size),
            color: Color::WHITE,
            cast_shadow: false,
            receive_shadow: false,
        }
    }

    #[test]
    fn primitive_tree_has_one_shadow_casting_mesh() {
        let tree = VisualTree::primitive(PrimitiveShape::Sofa);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.mesh_count(), 1);
        let m = tree.meshes()[0];
        assert!(m.cast_shadow);
        assert_eq!(tree.bounding_box().unwrap().size(), Vec3::new(2.0, 0.8, 0.9));
    }

    #[test]
    fn nested_bounds_include_child_transforms() {
        let mut root = VisualNode::named("root");
        let mut leg = VisualNode::named("leg");
        leg.local = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        leg.meshes.push(mesh(Vec3::ONE));
        root.meshes.push(mesh(Vec3::ONE));
        root.children.push(leg);

        let tree = VisualTree::new(root);
        let b = tree.bounding_box().unwrap();
        assert!(b.min.abs_diff_eq(Vec3::new(-0.5, -0.5, -0.5), 1e-6));
        assert!(b.max.abs_diff_eq(Vec3::new(0.5, 2.5, 0.5), 1e-6));
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn empty_tree_has_no_bounds() {
        let tree = VisualTree::new(VisualNode::named("empty"));
        assert_eq!(tree.bounding_box(), None);
    }

    #[test]
    fn enable_shadows_reaches_every_mesh() {
        let mut root = VisualNode::named("root");
        let mut child = VisualNode::named("child");
        child.meshes.push(mesh(Vec3::ONE));
        child.meshes.push(mesh(Vec3::ONE));
        root.children.push(child);
        let mut tree = VisualTree::new(root);

        tree.enable_shadows();
        assert!(tree.meshes().iter().all(|m| m.cast_shadow && m.receive_shadow));
        assert_eq!(tree.mesh_count(), 2);
    }
}
