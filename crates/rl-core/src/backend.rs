//! Traits for the collaborators the editor drives but does not own:
//! the scene (renderer), the manipulator widget, and camera orbit input.

use crate::geometry::{Aabb, Ray, RayHit};
use crate::model::{Color, Surface, Transform};
use crate::visual::VisualTree;
use std::fmt;
use std::hash::Hash;

/// The rendering scene, as far as the item lifecycle needs it.
///
/// Visual nodes are owned by the implementation. The editor only keeps
/// handles and never frees nodes except through [`SceneBackend::detach`].
pub trait SceneBackend {
    type Handle: Copy + Eq + Hash + fmt::Debug;

    /// Build nodes for `visual`, place the top-level node at `transform`,
    /// and add it to the scene. Returns the top-level handle.
    fn attach(&mut self, visual: &VisualTree, transform: &Transform) -> Self::Handle;

    /// Remove a top-level node and its whole subtree. Unknown handles are ignored.
    fn detach(&mut self, handle: Self::Handle);

    /// `handle` followed by every node below it.
    fn descendants(&self, handle: Self::Handle) -> Vec<Self::Handle>;

    /// Intersect `ray` with the subtrees rooted at `roots` (descendants
    /// included). Hits are sorted nearest first.
    fn intersect(&self, ray: &Ray, roots: &[Self::Handle]) -> Vec<RayHit<Self::Handle>>;

    /// World-space bounds of a node's subtree.
    fn bounding_box(&self, handle: Self::Handle) -> Option<Aabb>;

    fn transform(&self, handle: Self::Handle) -> Option<Transform>;

    fn set_transform(&mut self, handle: Self::Handle, transform: &Transform);

    fn set_surface_color(&mut self, surface: Surface, color: Color);
}

/// Active transform mode of the manipulator widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ManipulatorMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl ManipulatorMode {
    pub const ALL: [ManipulatorMode; 3] = [
        ManipulatorMode::Translate,
        ManipulatorMode::Rotate,
        ManipulatorMode::Scale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManipulatorMode::Translate => "translate",
            ManipulatorMode::Rotate => "rotate",
            ManipulatorMode::Scale => "scale",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "translate" | "move" => Some(ManipulatorMode::Translate),
            "rotate" => Some(ManipulatorMode::Rotate),
            "scale" => Some(ManipulatorMode::Scale),
            _ => None,
        }
    }
}

/// The on-screen drag-handle gizmo.
pub trait ManipulatorWidget<H> {
    fn attach(&mut self, target: H);
    fn detach(&mut self);
    fn set_mode(&mut self, mode: ManipulatorMode);
}

/// Camera orbit input, suspended while the manipulator is dragged.
pub trait OrbitControl {
    fn set_orbit_enabled(&mut self, enabled: bool);
}
