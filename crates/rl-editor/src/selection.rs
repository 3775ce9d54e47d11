//! Single selection.
//!
//! At most one item is selected, and the manipulator widget is attached
//! exactly when one is. Picking resolves the nearest ray hit to its owning
//! item through the registry's owner map; a miss deselects.

use crate::registry::ItemRegistry;
use rl_core::backend::{ManipulatorWidget, SceneBackend};
use rl_core::geometry::Ray;
use rl_core::id::ItemId;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selected: Option<ItemId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn is_selected(&self, id: ItemId) -> bool {
        self.selected == Some(id)
    }

    /// Select whatever the ray hits first, or deselect on a miss.
    pub fn pick<S, W>(
        &mut self,
        ray: &Ray,
        registry: &ItemRegistry<S::Handle>,
        scene: &S,
        widget: &mut W,
    ) -> Option<ItemId>
    where
        S: SceneBackend,
        W: ManipulatorWidget<S::Handle>,
    {
        let roots = registry.handles();
        let owner = scene
            .intersect(ray, &roots)
            .first()
            .and_then(|hit| registry.owner_of(hit.node));

        match owner {
            Some(id) if self.select(id, registry, widget) => Some(id),
            _ => {
                self.deselect(widget);
                None
            }
        }
    }

    /// Move the widget to `id`. Returns `false` (and changes nothing) if the
    /// registry has no such item.
    pub fn select<H, W>(&mut self, id: ItemId, registry: &ItemRegistry<H>, widget: &mut W) -> bool
    where
        H: Copy + Eq + Hash + Debug,
        W: ManipulatorWidget<H>,
    {
        let Some(item) = registry.get(id) else {
            return false;
        };
        if self.selected.is_some() {
            widget.detach();
        }
        widget.attach(item.visual);
        self.selected = Some(id);
        log::debug!("selected {id}");
        true
    }

    pub fn deselect<H, W: ManipulatorWidget<H>>(&mut self, widget: &mut W) {
        if let Some(id) = self.selected.take() {
            widget.detach();
            log::debug!("deselected {id}");
        }
    }

    /// Called when `id` leaves the registry; deselects if it was selected.
    pub fn forget<H, W: ManipulatorWidget<H>>(&mut self, id: ItemId, widget: &mut W) {
        if self.selected == Some(id) {
            self.deselect(widget);
        }
    }
}
