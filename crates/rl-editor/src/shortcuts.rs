//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s:
//! - `w` / `e` / `r` switch the manipulator to translate / rotate / scale
//! - Delete or Backspace removes the selected item
//! - Escape clears the selection
//! - ⌘S / ⌘O save and load the layout (Ctrl off macOS)

use crate::editor::RoomEditor;
use crate::error::EditorError;
use crate::persistence::KvStore;
use crate::resolver::AssetFetcher;
use rl_core::backend::{ManipulatorMode, ManipulatorWidget, OrbitControl, SceneBackend};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Manipulator ──
    ModeTranslate,
    ModeRotate,
    ModeScale,

    // ── Edit ──
    Delete,
    Deselect,

    // ── Layout ──
    Save,
    Load,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"w"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, ctrl: bool, shift: bool, _alt: bool, meta: bool) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd {
            if shift {
                return None;
            }
            return match key {
                "s" | "S" => Some(ShortcutAction::Save),
                "o" | "O" => Some(ShortcutAction::Load),
                _ => None,
            };
        }

        match key {
            "w" | "W" => Some(ShortcutAction::ModeTranslate),
            "e" | "E" => Some(ShortcutAction::ModeRotate),
            "r" | "R" => Some(ShortcutAction::ModeScale),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

impl<S, C, F, K> RoomEditor<S, C, F, K>
where
    S: SceneBackend,
    C: ManipulatorWidget<S::Handle> + OrbitControl,
    F: AssetFetcher,
    K: KvStore,
{
    /// Run the command bound to `action`.
    pub async fn apply_shortcut(&mut self, action: ShortcutAction) -> Result<(), EditorError> {
        match action {
            ShortcutAction::ModeTranslate => self.set_mode(ManipulatorMode::Translate),
            ShortcutAction::ModeRotate => self.set_mode(ManipulatorMode::Rotate),
            ShortcutAction::ModeScale => self.set_mode(ManipulatorMode::Scale),
            ShortcutAction::Delete => {
                self.delete_selected()?;
            }
            ShortcutAction::Deselect => self.deselect(),
            ShortcutAction::Save => self.save_layout()?,
            ShortcutAction::Load => {
                self.load_layout().await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::resolver::MemoryAssetFetcher;
    use rl_core::config::EditorConfig;
    use rl_render::{HeadlessControls, MemoryScene, NodeIndex};

    #[test]
    fn resolve_mode_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("w", false, false, false, false),
            Some(ShortcutAction::ModeTranslate)
        );
        assert_eq!(
            ShortcutMap::resolve("E", false, false, false, false),
            Some(ShortcutAction::ModeRotate)
        );
        assert_eq!(
            ShortcutMap::resolve("r", false, false, false, false),
            Some(ShortcutAction::ModeScale)
        );
    }

    #[test]
    fn resolve_save_load() {
        // Cmd+S → Save
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, true),
            Some(ShortcutAction::Save)
        );
        // Ctrl+O → Load
        assert_eq!(
            ShortcutMap::resolve("o", true, false, false, false),
            Some(ShortcutAction::Load)
        );
        // Plain s is unbound
        assert_eq!(ShortcutMap::resolve("s", false, false, false, false), None);
    }

    #[test]
    fn resolve_delete_and_escape() {
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
        assert_eq!(ShortcutMap::resolve("Delete", true, false, false, false), None);
    }

    #[tokio::test]
    async fn apply_shortcuts_drive_the_editor() {
        let mut ed = RoomEditor::new(
            MemoryScene::new(),
            HeadlessControls::<NodeIndex>::new(),
            MemoryAssetFetcher::new(),
            MemoryStore::new(),
            &EditorConfig::default(),
        );
        let ids = ed.populate_sample_room();

        ed.apply_shortcut(ShortcutAction::ModeScale).await.unwrap();
        assert_eq!(ed.mode(), ManipulatorMode::Scale);

        ed.select(ids[0]);
        ed.apply_shortcut(ShortcutAction::Deselect).await.unwrap();
        assert_eq!(ed.selected(), None);

        assert!(matches!(
            ed.apply_shortcut(ShortcutAction::Delete).await,
            Err(EditorError::EmptySelection)
        ));

        ed.apply_shortcut(ShortcutAction::Save).await.unwrap();
        ed.apply_shortcut(ShortcutAction::Load).await.unwrap();
        assert_eq!(ed.registry().len(), 3);
    }
}
