//! The item registry: single source of truth for what is in the room.
//!
//! Items are kept in insertion order. Adding an item attaches its visual to
//! the scene and records every node of the attached subtree in an owner map,
//! so a pick on any sub-node resolves to its item by direct lookup.
//! Removing an item detaches the subtree and forgets the owner entries in
//! the same call; there is never a registered item without a visual or a
//! visual without an item.

use rl_core::backend::SceneBackend;
use rl_core::id::ItemId;
use rl_core::model::{PlacedItem, PrimitiveShape, Provenance, Transform};
use rl_core::visual::VisualTree;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::Hash;

/// Everything needed to place a new item.
#[derive(Debug, Clone)]
pub struct NewItem {
    /// Explicit id; a fresh one is generated when `None` or already taken.
    pub id: Option<ItemId>,
    pub provenance: Provenance,
    pub transform: Transform,
    pub label: Option<String>,
    pub visual: VisualTree,
}

impl NewItem {
    pub fn new(provenance: Provenance, visual: VisualTree, transform: Transform) -> Self {
        Self {
            id: None,
            provenance,
            transform,
            label: None,
            visual,
        }
    }

    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

fn id_prefix(provenance: &Provenance) -> String {
    match provenance {
        Provenance::Primitive { kind } => PrimitiveShape::for_kind(kind).label().to_ascii_lowercase(),
        Provenance::AssetRef { .. } => "model".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ItemRegistry<H> {
    items: Vec<PlacedItem<H>>,
    /// Scene nodes attached for each item (top-level handle first).
    nodes: HashMap<ItemId, SmallVec<[H; 4]>>,
    /// Scene node → owning item, for every attached node.
    owners: HashMap<H, ItemId>,
    /// Bumped by every `clear`.
    generation: u64,
}

impl<H> Default for ItemRegistry<H> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            nodes: HashMap::new(),
            owners: HashMap::new(),
            generation: 0,
        }
    }
}

impl<H: Copy + Eq + Hash + std::fmt::Debug> ItemRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the item's visual and append it. Returns the item's id.
    pub fn add<S>(&mut self, scene: &mut S, new: NewItem) -> ItemId
    where
        S: SceneBackend<Handle = H>,
    {
        let id = match new.id {
            Some(id) if !self.contains(id) => id,
            Some(taken) => {
                let fresh = ItemId::with_prefix(&id_prefix(&new.provenance));
                log::warn!("item id {taken} already in use; using {fresh}");
                fresh
            }
            None => ItemId::with_prefix(&id_prefix(&new.provenance)),
        };

        let transform = new.transform.sanitized();
        let handle = scene.attach(&new.visual, &transform);
        let nodes: SmallVec<[H; 4]> = scene.descendants(handle).into_iter().collect();
        for &node in &nodes {
            self.owners.insert(node, id);
        }
        self.nodes.insert(id, nodes);

        let label = new
            .label
            .unwrap_or_else(|| new.provenance.default_label());
        self.items
            .push(PlacedItem::new(id, new.provenance, transform, label, handle));
        log::debug!("added {id} as {handle:?}");
        id
    }

    /// Detach and delete an item. Unknown ids are a no-op.
    pub fn remove<S>(&mut self, scene: &mut S, id: ItemId) -> Option<PlacedItem<H>>
    where
        S: SceneBackend<Handle = H>,
    {
        let pos = self.items.iter().position(|item| item.id == id)?;
        let item = self.items.remove(pos);
        scene.detach(item.visual);
        for node in self.nodes.remove(&id).unwrap_or_default() {
            self.owners.remove(&node);
        }
        log::debug!("removed {id}");
        Some(item)
    }

    /// Remove every item.
    pub fn clear<S>(&mut self, scene: &mut S)
    where
        S: SceneBackend<Handle = H>,
    {
        let ids: Vec<ItemId> = self.items.iter().map(|item| item.id).collect();
        for id in ids {
            self.remove(scene, id);
        }
        self.generation += 1;
    }

    /// Items in insertion order.
    pub fn list(&self) -> &[PlacedItem<H>] {
        &self.items
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&PlacedItem<H>> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Top-level handles of all items, in insertion order.
    pub fn handles(&self) -> Vec<H> {
        self.items.iter().map(|item| item.visual).collect()
    }

    /// The item owning a scene node (top-level or any descendant).
    pub fn owner_of(&self, node: H) -> Option<ItemId> {
        self.owners.get(&node).copied()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Overwrite an item's transform and move its visual. Returns `false`
    /// for unknown ids.
    pub fn set_transform<S>(&mut self, scene: &mut S, id: ItemId, transform: Transform) -> bool
    where
        S: SceneBackend<Handle = H>,
    {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.transform = transform.sanitized();
        scene.set_transform(item.visual, &item.transform);
        true
    }

    /// Pull an item's transform back from the scene, e.g. after the
    /// manipulator moved the visual directly.
    pub fn sync_transform<S>(&mut self, scene: &S, id: ItemId) -> Option<Transform>
    where
        S: SceneBackend<Handle = H>,
    {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        let transform = scene.transform(item.visual)?.sanitized();
        item.transform = transform;
        Some(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rl_core::visual::{MeshPart, VisualNode};
    use rl_core::{Aabb, Color};
    use rl_render::{MemoryScene, NodeIndex};
    use std::collections::HashSet;

    fn primitive(kind: &str) -> NewItem {
        NewItem::new(
            Provenance::primitive(kind),
            VisualTree::primitive(PrimitiveShape::for_kind(kind)),
            Transform::IDENTITY,
        )
    }

    fn two_level_tree() -> VisualTree {
        let mut root = VisualNode::named("lamp");
        let mut shade = VisualNode::named("shade");
        shade.meshes.push(MeshPart {
            bounds: Aabb::centered(Vec3::ONE),
            color: Color::WHITE,
            cast_shadow: true,
            receive_shadow: true,
        });
        root.children.push(shade);
        VisualTree::new(root)
    }

    #[test]
    fn add_assigns_ids_and_keeps_order() {
        let mut scene = MemoryScene::new();
        let mut reg = ItemRegistry::new();
        let a = reg.add(&mut scene, primitive("sofa"));
        let b = reg.add(&mut scene, primitive("chair"));
        let c = reg.add(&mut scene, primitive("table"));

        assert_ne!(a, b);
        assert!(a.as_str().starts_with("sofa_"));
        let order: Vec<ItemId> = reg.list().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![a, b, c]);
        assert_eq!(scene.top_level(), reg.handles());
    }

    #[test]
    fn duplicate_explicit_id_is_replaced() {
        let mut scene = MemoryScene::new();
        let mut reg = ItemRegistry::new();
        let wanted = ItemId::intern("reg_test_fixed");
        let a = reg.add(&mut scene, primitive("sofa").with_id(wanted));
        let b = reg.add(&mut scene, primitive("sofa").with_id(wanted));
        assert_eq!(a, wanted);
        assert_ne!(b, wanted);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn remove_is_idempotent_and_detaches() {
        let mut scene = MemoryScene::new();
        let mut reg = ItemRegistry::new();
        let a = reg.add(&mut scene, primitive("sofa"));
        let handle = reg.get(a).unwrap().visual;

        assert!(reg.remove(&mut scene, a).is_some());
        assert!(!scene.contains(handle));
        assert_eq!(reg.owner_of(handle), None);
        assert!(reg.remove(&mut scene, a).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn owner_map_covers_descendants() {
        let mut scene = MemoryScene::new();
        let mut reg = ItemRegistry::new();
        let lamp = reg.add(&mut scene, NewItem::new(Provenance::asset("lamp.glb"), two_level_tree(), Transform::IDENTITY));
        let handle = reg.get(lamp).unwrap().visual;
        let shade = scene.children(handle)[0];

        assert_eq!(reg.owner_of(handle), Some(lamp));
        assert_eq!(reg.owner_of(shade), Some(lamp));
        assert_eq!(reg.get(lamp).unwrap().label, "lamp");

        reg.remove(&mut scene, lamp);
        assert_eq!(reg.owner_of(shade), None);
    }

    #[test]
    fn clear_empties_scene_and_bumps_generation() {
        let mut scene = MemoryScene::new();
        let mut reg = ItemRegistry::new();
        reg.add(&mut scene, primitive("sofa"));
        reg.add(&mut scene, primitive("chair"));
        let g = reg.generation();

        reg.clear(&mut scene);
        assert!(reg.is_empty());
        assert_eq!(scene.node_count(), 0);
        assert_eq!(reg.generation(), g + 1);
    }

    #[test]
    fn transforms_are_sanitized_and_synced() {
        let mut scene = MemoryScene::new();
        let mut reg = ItemRegistry::new();
        let a = reg.add(&mut scene, primitive("chair"));

        let mut t = Transform::from_position(Vec3::new(1.0, f32::NAN, 2.0));
        t.scale = Vec3::splat(2.0);
        assert!(reg.set_transform(&mut scene, a, t));
        let stored = reg.get(a).unwrap().transform;
        assert_eq!(stored.position, Vec3::new(1.0, 0.0, 2.0));

        // Simulate the manipulator moving the node directly.
        let handle = reg.get(a).unwrap().visual;
        let dragged = Transform::from_position(Vec3::new(3.0, 0.5, -1.0));
        scene.set_transform(handle, &dragged);
        assert_eq!(reg.sync_transform(&scene, a), Some(dragged));
        assert_eq!(reg.get(a).unwrap().transform, dragged);

        assert!(!reg.set_transform(&mut scene, ItemId::intern("reg_test_missing"), t));
    }

    #[test]
    fn random_add_remove_keeps_one_visual_per_id() {
        let mut scene = MemoryScene::new();
        let mut reg: ItemRegistry<NodeIndex> = ItemRegistry::new();
        let kinds = ["sofa", "chair", "table", "shelf"];
        let mut seed: u64 = 0x5eed;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) as usize
        };

        for _ in 0..300 {
            let roll = next();
            if roll % 3 == 0 && !reg.is_empty() {
                let victim = reg.list()[next() % reg.len()].id;
                reg.remove(&mut scene, victim);
            } else {
                reg.add(&mut scene, primitive(kinds[roll % kinds.len()]));
            }

            let ids: HashSet<ItemId> = reg.list().iter().map(|i| i.id).collect();
            assert_eq!(ids.len(), reg.len(), "ids must stay unique");
            assert_eq!(scene.top_level().len(), reg.len());
            for item in reg.list() {
                assert!(scene.contains(item.visual));
                assert_eq!(reg.owner_of(item.visual), Some(item.id));
            }
        }
    }
}
