pub mod backend;
pub mod config;
pub mod geometry;
pub mod id;
pub mod model;
pub mod snapshot;
pub mod visual;

pub use backend::{ManipulatorMode, ManipulatorWidget, OrbitControl, SceneBackend};
pub use config::EditorConfig;
pub use geometry::{Aabb, Ray, RayHit};
pub use id::ItemId;
pub use model::*;
pub use snapshot::{LayoutSnapshot, SnapshotItem, StoredLayout};
pub use visual::{MeshPart, VisualNode, VisualTree};

// Re-export glam so downstream crates agree on the vector types.
pub use glam;
