//! Headless scene graph.
//!
//! A `StableDiGraph` of visual nodes with parent → child edges under a
//! single root. This is the scene the editor runs against when there is no
//! GPU renderer (CLI, tests); it implements every collaborator operation the
//! editor needs: attach/detach subtrees, ray picking, bounds, transforms and
//! surface colors.

use crate::hit;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use rl_core::backend::SceneBackend;
use rl_core::geometry::{Aabb, Ray, RayHit};
use rl_core::model::{Color, RoomAppearance, Surface, Transform};
use rl_core::visual::{MeshPart, VisualNode, VisualTree};
use glam::Mat4;

/// A node materialized from a [`VisualNode`].
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub local: Transform,
    pub meshes: Vec<MeshPart>,
}

impl SceneNode {
    fn root() -> Self {
        Self {
            name: "root".to_string(),
            local: Transform::IDENTITY,
            meshes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryScene {
    pub graph: StableDiGraph<SceneNode, ()>,
    pub root: NodeIndex,
    pub appearance: RoomAppearance,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode::root());
        Self {
            graph,
            root,
            appearance: RoomAppearance::default(),
        }
    }

    pub fn with_appearance(appearance: RoomAppearance) -> Self {
        Self {
            appearance,
            ..Self::new()
        }
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&SceneNode> {
        self.graph.node_weight(idx)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children in insertion order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        children.sort();
        children
    }

    /// Top-level nodes currently in the scene.
    pub fn top_level(&self) -> Vec<NodeIndex> {
        self.children(self.root)
    }

    /// Number of nodes, excluding the root.
    pub fn node_count(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        idx != self.root && self.graph.contains_node(idx)
    }

    /// World matrix of a node: product of local transforms up to the root.
    pub fn world_matrix(&self, idx: NodeIndex) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(idx);
        while let Some(i) = current {
            if i == self.root {
                break;
            }
            match self.graph.node_weight(i) {
                Some(node) => matrix = node.local.matrix() * matrix,
                None => break,
            }
            current = self.parent(i);
        }
        matrix
    }

    fn add_subtree(&mut self, parent: NodeIndex, node: &VisualNode) -> NodeIndex {
        let idx = self.graph.add_node(SceneNode {
            name: node.name.clone(),
            local: node.local,
            meshes: node.meshes.to_vec(),
        });
        self.graph.add_edge(parent, idx, ());
        for child in &node.children {
            self.add_subtree(idx, child);
        }
        idx
    }

    fn subtree(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            out.push(i);
            let children = self.children(i);
            stack.extend(children.into_iter().rev());
        }
        out
    }
}

impl SceneBackend for MemoryScene {
    type Handle = NodeIndex;

    fn attach(&mut self, visual: &VisualTree, transform: &Transform) -> NodeIndex {
        let idx = self.add_subtree(self.root, &visual.root);
        // The item transform replaces the tree root's own local transform.
        self.graph[idx].local = *transform;
        log::trace!("attach {} as {:?}", visual.root.name, idx);
        idx
    }

    fn detach(&mut self, handle: NodeIndex) {
        if !self.contains(handle) {
            return;
        }
        for idx in self.subtree(handle) {
            self.graph.remove_node(idx);
        }
        log::trace!("detach {handle:?}");
    }

    fn descendants(&self, handle: NodeIndex) -> Vec<NodeIndex> {
        if !self.contains(handle) {
            return Vec::new();
        }
        self.subtree(handle)
    }

    fn intersect(&self, ray: &Ray, roots: &[NodeIndex]) -> Vec<RayHit<NodeIndex>> {
        hit::intersect_subtrees(self, ray, roots)
    }

    fn bounding_box(&self, handle: NodeIndex) -> Option<Aabb> {
        if !self.contains(handle) {
            return None;
        }
        self.subtree(handle)
            .into_iter()
            .flat_map(|idx| {
                let world = self.world_matrix(idx);
                self.graph[idx]
                    .meshes
                    .iter()
                    .map(move |m| m.bounds.transformed(&world))
                    .collect::<Vec<_>>()
            })
            .reduce(|a, b| a.union(&b))
    }

    fn transform(&self, handle: NodeIndex) -> Option<Transform> {
        if !self.contains(handle) {
            return None;
        }
        Some(self.graph[handle].local)
    }

    fn set_transform(&mut self, handle: NodeIndex, transform: &Transform) {
        if self.contains(handle) {
            self.graph[handle].local = *transform;
        }
    }

    fn set_surface_color(&mut self, surface: Surface, color: Color) {
        match surface {
            Surface::Floor => self.appearance.floor = color,
            Surface::Walls => self.appearance.wall = color,
        }
    }
}
