//! Stand-ins for the manipulator widget and camera orbit controls.
//!
//! Records what the editor asked for so headless hosts can display it and
//! tests can assert on it.

use rl_core::backend::{ManipulatorMode, ManipulatorWidget, OrbitControl};

/// A control request, in the order it was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent<H> {
    Attach(H),
    Detach,
    Mode(ManipulatorMode),
    Orbit(bool),
}

#[derive(Debug, Clone)]
pub struct HeadlessControls<H> {
    pub attached: Option<H>,
    pub mode: ManipulatorMode,
    pub orbit_enabled: bool,
    pub events: Vec<ControlEvent<H>>,
}

impl<H> Default for HeadlessControls<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> HeadlessControls<H> {
    pub fn new() -> Self {
        Self {
            attached: None,
            mode: ManipulatorMode::default(),
            orbit_enabled: true,
            events: Vec::new(),
        }
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl<H: Copy> ManipulatorWidget<H> for HeadlessControls<H> {
    fn attach(&mut self, target: H) {
        self.attached = Some(target);
        self.events.push(ControlEvent::Attach(target));
    }

    fn detach(&mut self) {
        self.attached = None;
        self.events.push(ControlEvent::Detach);
    }

    fn set_mode(&mut self, mode: ManipulatorMode) {
        self.mode = mode;
        self.events.push(ControlEvent::Mode(mode));
    }
}

impl<H> OrbitControl for HeadlessControls<H> {
    fn set_orbit_enabled(&mut self, enabled: bool) {
        self.orbit_enabled = enabled;
        self.events.push(ControlEvent::Orbit(enabled));
    }
}
