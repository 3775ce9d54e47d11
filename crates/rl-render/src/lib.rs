//! Headless rendering collaborators for the room editor.

pub mod controls;
pub mod hit;
pub mod scene;

pub use controls::{ControlEvent, HeadlessControls};
pub use scene::{MemoryScene, SceneNode};

// Re-export petgraph's index type so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
