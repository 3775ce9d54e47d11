//! The room editor: one context object owning every component and the
//! collaborators they drive.
//!
//! Hosts translate their UI events into calls on [`RoomEditor`]. Commands
//! that fail for a user-visible reason queue a [`Notice`] and return the
//! error; the editor state is consistent either way.

use crate::error::{AssetLoadError, EditorError};
use crate::manipulator::ManipulatorModeController;
use crate::notice::Notice;
use crate::persistence::{KvStore, LayoutPersistence};
use crate::registry::{ItemRegistry, NewItem};
use crate::resolver::{AssetFetcher, AssetResolver, ResolvedVisual};
use crate::selection::SelectionController;
use glam::Vec3;
use rl_core::backend::{ManipulatorMode, ManipulatorWidget, OrbitControl, SceneBackend};
use rl_core::config::EditorConfig;
use rl_core::geometry::Ray;
use rl_core::id::ItemId;
use rl_core::model::{Color, PlacedItem, Provenance, RoomAppearance, Surface, Transform};
use rl_core::snapshot::LayoutSnapshot;

// ─── Item selectors ──────────────────────────────────────────────────────

/// What the "add item" menu asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSelector {
    Asset { url: String, kind_hint: Option<String> },
    Primitive(String),
}

const KNOWN_KINDS: [&str; 3] = ["sofa", "chair", "table"];

impl ItemSelector {
    /// Map a menu value: model files become assets (with a kind hint when
    /// the name mentions one), anything else the primitive it names, and
    /// `table` when it names none.
    pub fn from_menu_value(value: &str) -> Self {
        let value = value.trim();
        let lower = value.to_ascii_lowercase();
        let named_kind = KNOWN_KINDS.iter().find(|k| lower.contains(*k)).copied();

        if lower.ends_with(".glb") || lower.ends_with(".gltf") {
            ItemSelector::Asset {
                url: value.to_string(),
                kind_hint: named_kind.map(str::to_string),
            }
        } else {
            ItemSelector::Primitive(named_kind.unwrap_or("table").to_string())
        }
    }
}

// ─── Pending asset adds ──────────────────────────────────────────────────

/// An asset add whose resolution is in flight.
///
/// Carries the registry generation at the time it started; completing it
/// after the registry was cleared discards the result.
#[derive(Debug, Clone)]
pub struct AddTicket {
    url: String,
    kind_hint: Option<String>,
    /// Primitive kind placed if resolution fails.
    substitute: String,
    transform: Transform,
    label: Option<String>,
    /// Fresh adds take the normalization scale; restored items keep
    /// their stored transform.
    normalize: bool,
    generation: u64,
}

impl AddTicket {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// ─── Editor ──────────────────────────────────────────────────────────────

pub struct RoomEditor<S: SceneBackend, C, F, K> {
    scene: S,
    controls: C,
    resolver: AssetResolver<F>,
    persistence: LayoutPersistence<K>,
    registry: ItemRegistry<S::Handle>,
    selection: SelectionController,
    manipulator: ManipulatorModeController,
    appearance: RoomAppearance,
    fallback_kind: String,
    notices: Vec<Notice>,
}

impl<S, C, F, K> RoomEditor<S, C, F, K>
where
    S: SceneBackend,
    C: ManipulatorWidget<S::Handle> + OrbitControl,
    F: AssetFetcher,
    K: KvStore,
{
    /// Wire up the editor. The widget is put into the controller's initial
    /// mode and the scene gets the configured colors.
    pub fn new(mut scene: S, mut controls: C, fetcher: F, store: K, config: &EditorConfig) -> Self {
        let appearance = config.appearance();
        scene.set_surface_color(Surface::Floor, appearance.floor);
        scene.set_surface_color(Surface::Walls, appearance.wall);
        let mut manipulator = ManipulatorModeController::new();
        let initial = manipulator.mode();
        manipulator.set_mode(initial, &mut controls);
        Self {
            scene,
            controls,
            resolver: AssetResolver::new(fetcher, config.target_size),
            persistence: LayoutPersistence::new(store, config),
            registry: ItemRegistry::new(),
            selection: SelectionController::new(),
            manipulator,
            appearance,
            fallback_kind: config.fallback_kind.clone(),
            notices: Vec::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Direct scene access, for hosts whose widget moves nodes itself.
    /// Call [`Self::manipulator_drag_changed`] so the registry picks the
    /// new transform up.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    pub fn resolver(&self) -> &AssetResolver<F> {
        &self.resolver
    }

    pub fn persistence(&self) -> &LayoutPersistence<K> {
        &self.persistence
    }

    pub fn registry(&self) -> &ItemRegistry<S::Handle> {
        &self.registry
    }

    pub fn items(&self) -> &[PlacedItem<S::Handle>] {
        self.registry.list()
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selection.selected()
    }

    pub fn mode(&self) -> ManipulatorMode {
        self.manipulator.mode()
    }

    pub fn is_dragging(&self) -> bool {
        self.manipulator.is_dragging()
    }

    pub fn appearance(&self) -> RoomAppearance {
        self.appearance
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Adding items ────────────────────────────────────────────────────

    pub fn add_primitive(&mut self, kind: &str, position: Vec3) -> ItemId {
        self.place_primitive(kind, Transform::from_position(position), None)
    }

    /// Resolve and place an external model. On failure a warning notice is
    /// queued and a primitive of the configured fallback kind takes its
    /// place at the same position. `kind_hint` is kept in the provenance
    /// and only used as the substitute when a saved layout is restored.
    pub async fn add_asset(&mut self, url: &str, kind_hint: Option<&str>, position: Vec3) -> ItemId {
        let ticket = self.begin_asset_add(url, kind_hint, position);
        let result = self.resolver.resolve_asset(url).await;
        self.complete_asset_add(ticket, result)
    }

    pub async fn add_item(&mut self, selector: ItemSelector, position: Vec3) -> ItemId {
        match selector {
            ItemSelector::Asset { url, kind_hint } => {
                self.add_asset(&url, kind_hint.as_deref(), position).await
            }
            ItemSelector::Primitive(kind) => self.add_primitive(&kind, position),
        }
    }

    /// First half of an asset add for hosts that resolve without holding
    /// the editor: resolve `ticket.url()` with a clone of
    /// [`Self::resolver`], then hand the result to [`Self::finish_asset_add`].
    pub fn begin_asset_add(&mut self, url: &str, kind_hint: Option<&str>, position: Vec3) -> AddTicket {
        AddTicket {
            url: url.to_string(),
            kind_hint: kind_hint.map(str::to_string),
            substitute: self.fallback_kind.clone(),
            transform: Transform::from_position(position),
            label: None,
            normalize: true,
            generation: self.registry.generation(),
        }
    }

    /// Second half of an asset add. Returns `None` when the registry was
    /// cleared since the ticket was issued.
    pub fn finish_asset_add(
        &mut self,
        ticket: AddTicket,
        result: Result<ResolvedVisual, AssetLoadError>,
    ) -> Option<ItemId> {
        if ticket.generation != self.registry.generation() {
            log::debug!("discarding stale load of {}", ticket.url);
            return None;
        }
        Some(self.complete_asset_add(ticket, result))
    }

    fn complete_asset_add(
        &mut self,
        ticket: AddTicket,
        result: Result<ResolvedVisual, AssetLoadError>,
    ) -> ItemId {
        match result {
            Ok(resolved) => {
                let transform = if ticket.normalize {
                    ticket.transform.with_uniform_scale(resolved.normalized_scale)
                } else {
                    ticket.transform
                };
                let provenance = Provenance::AssetRef {
                    url: ticket.url,
                    kind_hint: ticket.kind_hint,
                };
                let mut new = NewItem::new(provenance, resolved.tree, transform);
                new.label = ticket.label;
                let id = self.registry.add(&mut self.scene, new);
                log::info!("placed {id}");
                id
            }
            Err(err) => {
                let kind = ticket.substitute;
                log::warn!("{err}; substituting {kind}");
                self.notices.push(Notice::warning(format!(
                    "Could not load {}; placed a {kind} instead",
                    err.url
                )));
                self.place_primitive(&kind, ticket.transform, None)
            }
        }
    }

    fn place_primitive(&mut self, kind: &str, transform: Transform, label: Option<String>) -> ItemId {
        let resolved = self.resolver.resolve_primitive(kind);
        let mut new = NewItem::new(Provenance::primitive(kind), resolved.tree, transform);
        new.label = label;
        let id = self.registry.add(&mut self.scene, new);
        log::info!("placed {id}");
        id
    }

    /// The original starter furniture: a sofa, a chair and a table.
    pub fn populate_sample_room(&mut self) -> Vec<ItemId> {
        vec![
            self.add_primitive("sofa", Vec3::new(-1.5, 0.5, 0.0)),
            self.add_primitive("chair", Vec3::new(1.2, 0.5, -0.5)),
            self.add_primitive("table", Vec3::new(0.0, 0.5, 1.5)),
        ]
    }

    /// Move an item programmatically.
    pub fn set_item_transform(&mut self, id: ItemId, transform: Transform) -> bool {
        self.registry.set_transform(&mut self.scene, id, transform)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Pointer press in the viewport. Ignored while the manipulator is being
    /// dragged, since that press belongs to the widget.
    pub fn pointer_down(&mut self, ray: &Ray) -> Option<ItemId> {
        if self.manipulator.is_dragging() {
            return self.selection.selected();
        }
        self.selection
            .pick(ray, &self.registry, &self.scene, &mut self.controls)
    }

    pub fn select(&mut self, id: ItemId) -> bool {
        self.selection.select(id, &self.registry, &mut self.controls)
    }

    pub fn deselect(&mut self) {
        self.selection.deselect(&mut self.controls);
    }

    /// Delete the selected item.
    pub fn delete_selected(&mut self) -> Result<ItemId, EditorError> {
        let Some(id) = self.selection.selected() else {
            self.notices.push(Notice::error("Select an item first"));
            return Err(EditorError::EmptySelection);
        };
        self.selection.forget(id, &mut self.controls);
        self.registry.remove(&mut self.scene, id);
        log::info!("deleted {id}");
        Ok(id)
    }

    // ─── Manipulator ─────────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: ManipulatorMode) {
        self.manipulator.set_mode(mode, &mut self.controls);
    }

    /// The widget started or stopped a drag. When a drag ends, the selected
    /// item's transform is read back from the scene.
    pub fn manipulator_drag_changed(&mut self, dragging: bool) {
        let ended = self.manipulator.drag_changed(dragging, &mut self.controls);
        if ended && let Some(id) = self.selection.selected() {
            self.registry.sync_transform(&self.scene, id);
        }
    }

    // ─── Room colors ─────────────────────────────────────────────────────

    pub fn set_floor_color(&mut self, color: Color) {
        self.appearance.floor = color;
        self.scene.set_surface_color(Surface::Floor, color);
    }

    pub fn set_wall_color(&mut self, color: Color) {
        self.appearance.wall = color;
        self.scene.set_surface_color(Surface::Walls, color);
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutPersistence::<K>::snapshot(&self.registry, &self.appearance)
    }

    pub fn save_layout(&mut self) -> Result<(), EditorError> {
        let snapshot = self.snapshot();
        match self.persistence.save(&snapshot) {
            Ok(()) => {
                self.notices.push(Notice::info(format!(
                    "Layout saved ({} items)",
                    snapshot.items.len()
                )));
                Ok(())
            }
            Err(err) => {
                log::error!("save failed: {err}");
                self.notices.push(Notice::error(format!("Could not save layout: {err}")));
                Err(err)
            }
        }
    }

    /// Replace the room with the saved layout. Returns the number of items
    /// placed. When nothing was saved, the room is left untouched.
    pub async fn load_layout(&mut self) -> Result<usize, EditorError> {
        let snapshot = match self.persistence.read() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                self.notices.push(Notice::info("No saved layout found"));
                return Err(EditorError::NoSnapshot);
            }
            Err(err) => {
                log::error!("load failed: {err}");
                self.notices.push(Notice::error(format!("Could not load layout: {err}")));
                return Err(err);
            }
        };

        self.selection.deselect(&mut self.controls);
        self.registry.clear(&mut self.scene);

        for entry in &snapshot.items {
            let transform = entry.transform();
            match entry.provenance(&self.fallback_kind) {
                Provenance::Primitive { kind } => {
                    self.place_primitive(&kind, transform, entry.name.clone());
                }
                Provenance::AssetRef { url, kind_hint } => {
                    let result = self.resolver.resolve_asset(&url).await;
                    let substitute = kind_hint
                        .clone()
                        .unwrap_or_else(|| self.fallback_kind.clone());
                    let ticket = AddTicket {
                        url,
                        kind_hint,
                        substitute,
                        transform,
                        label: entry.name.clone(),
                        normalize: false,
                        generation: self.registry.generation(),
                    };
                    self.complete_asset_add(ticket, result);
                }
            }
        }

        if let Some(color) = snapshot.floor_color {
            self.set_floor_color(color);
        }
        if let Some(color) = snapshot.wall_color {
            self.set_wall_color(color);
        }

        let count = self.registry.len();
        log::info!("loaded {count} items");
        self.notices.push(Notice::info(format!("Layout loaded ({count} items)")));
        Ok(count)
    }
}
