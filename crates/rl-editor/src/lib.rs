//! Scene-item lifecycle for the room layout editor: placing furniture,
//! picking and manipulating it, and saving / restoring the arrangement.

pub mod editor;
pub mod error;
pub mod gltf_import;
pub mod manipulator;
pub mod notice;
pub mod persistence;
pub mod registry;
pub mod resolver;
pub mod selection;
pub mod shortcuts;

pub use editor::{AddTicket, ItemSelector, RoomEditor};
pub use error::{AssetLoadCause, AssetLoadError, EditorError, StoreError};
pub use manipulator::ManipulatorModeController;
pub use notice::{Notice, NoticeLevel};
pub use persistence::{FileStore, KvStore, LayoutPersistence, MemoryStore};
pub use registry::{ItemRegistry, NewItem};
pub use resolver::{AssetFetcher, AssetResolver, FsAssetFetcher, MemoryAssetFetcher, ResolvedVisual};
pub use selection::SelectionController;
pub use shortcuts::{ShortcutAction, ShortcutMap};

/// An editor wired to the in-memory scene and recording controls.
pub type HeadlessEditor<F, K> =
    RoomEditor<rl_render::MemoryScene, rl_render::HeadlessControls<rl_render::NodeIndex>, F, K>;
