//! Manipulator mode and drag tracking.

use rl_core::backend::{ManipulatorMode, ManipulatorWidget, OrbitControl};

/// Holds the active manipulator mode and whether a drag is in progress.
///
/// Mode changes are forwarded to the widget every time, so re-selecting the
/// current mode is harmless. Orbit is disabled for exactly as long as a drag
/// lasts, whatever the mode.
#[derive(Debug, Clone, Default)]
pub struct ManipulatorModeController {
    mode: ManipulatorMode,
    dragging: bool,
}

impl ManipulatorModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ManipulatorMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_mode<H, W: ManipulatorWidget<H>>(&mut self, mode: ManipulatorMode, widget: &mut W) {
        if self.mode != mode {
            log::debug!("manipulator mode {} -> {}", self.mode.as_str(), mode.as_str());
        }
        self.mode = mode;
        widget.set_mode(mode);
    }

    /// Returns `true` when this call ended a drag.
    pub fn drag_changed<O: OrbitControl>(&mut self, dragging: bool, orbit: &mut O) -> bool {
        let ended = self.dragging && !dragging;
        self.dragging = dragging;
        orbit.set_orbit_enabled(!dragging);
        ended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rl_render::{ControlEvent, HeadlessControls};

    type Controls = HeadlessControls<u32>;

    #[test]
    fn starts_in_translate() {
        assert_eq!(ManipulatorModeController::new().mode(), ManipulatorMode::Translate);
    }

    #[test]
    fn set_mode_is_idempotent() {
        let mut ctl = ManipulatorModeController::new();
        let mut widget = Controls::new();
        ctl.set_mode(ManipulatorMode::Rotate, &mut widget);
        ctl.set_mode(ManipulatorMode::Rotate, &mut widget);
        assert_eq!(ctl.mode(), ManipulatorMode::Rotate);
        assert_eq!(widget.mode, ManipulatorMode::Rotate);
    }

    #[test]
    fn every_mode_reachable_from_every_mode() {
        let mut ctl = ManipulatorModeController::new();
        let mut widget = Controls::new();
        for from in ManipulatorMode::ALL {
            for to in ManipulatorMode::ALL {
                ctl.set_mode(from, &mut widget);
                ctl.set_mode(to, &mut widget);
                assert_eq!(ctl.mode(), to);
                assert_eq!(widget.mode, to);
            }
        }
    }

    #[test]
    fn orbit_suspended_only_while_dragging() {
        let mut ctl = ManipulatorModeController::new();
        let mut controls = Controls::new();
        ctl.set_mode(ManipulatorMode::Scale, &mut controls);
        controls.clear_events();

        assert!(!ctl.drag_changed(true, &mut controls));
        assert!(!controls.orbit_enabled);
        assert!(ctl.is_dragging());

        assert!(ctl.drag_changed(false, &mut controls));
        assert!(controls.orbit_enabled);
        assert_eq!(
            controls.events,
            vec![ControlEvent::Orbit(false), ControlEvent::Orbit(true)]
        );
    }

    #[test]
    fn drag_end_without_start_is_not_an_end() {
        let mut ctl = ManipulatorModeController::new();
        let mut controls = Controls::new();
        assert!(!ctl.drag_changed(false, &mut controls));
        assert!(controls.orbit_enabled);
    }
}
