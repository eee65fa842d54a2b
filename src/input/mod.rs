//! Input Snapshot
//!
//! The host's input system keeps a map from normalized key identity to held
//! state; the simulation samples it once per tick and reduces it to a small
//! set of logical controls.

pub mod latch;

pub use latch::KeyLatch;

use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    /// Logical controls held during a tick
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Controls: u8 {
        /// Accelerate forward (`w`, `arrowup`)
        const THROTTLE = 0x01;
        /// Accelerate backward (`s`, `arrowdown`)
        const REVERSE = 0x02;
        /// Brake (space)
        const BRAKE = 0x04;
        /// Steer left (`a`, `arrowleft`)
        const LEFT = 0x08;
        /// Steer right (`d`, `arrowright`)
        const RIGHT = 0x10;
    }
}

/// Key identities bound to each control
const KEY_BINDINGS: [(&str, Controls); 9] = [
    ("w", Controls::THROTTLE),
    ("arrowup", Controls::THROTTLE),
    ("s", Controls::REVERSE),
    ("arrowdown", Controls::REVERSE),
    ("a", Controls::LEFT),
    ("arrowleft", Controls::LEFT),
    ("d", Controls::RIGHT),
    ("arrowright", Controls::RIGHT),
    (" ", Controls::BRAKE),
];

impl Controls {
    /// Reduce a key snapshot to logical controls
    pub fn from_snapshot(snapshot: &InputSnapshot) -> Self {
        KEY_BINDINGS
            .iter()
            .filter(|(key, _)| snapshot.is_held(key))
            .fold(Controls::empty(), |acc, (_, control)| acc | *control)
    }

    /// Directional input this tick: +1 throttle, -1 reverse, 0 none
    ///
    /// Throttle wins when both are held.
    pub fn drive_direction(&self) -> i8 {
        if self.contains(Controls::THROTTLE) {
            1
        } else if self.contains(Controls::REVERSE) {
            -1
        } else {
            0
        }
    }

    /// Check if either steering control is held
    pub fn is_turning(&self) -> bool {
        self.intersects(Controls::LEFT | Controls::RIGHT)
    }
}

/// Normalized key identity → held state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    keys: HashMap<String, bool>,
}

impl InputSnapshot {
    /// Create an empty snapshot (nothing held)
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a host key name (`"ArrowUp"` → `"arrowup"`)
    pub fn normalize(key: &str) -> String {
        key.to_lowercase()
    }

    /// Set the held state of a key
    pub fn set(&mut self, key: &str, held: bool) {
        self.keys.insert(Self::normalize(key), held);
    }

    /// Mark a key as held
    pub fn press(&mut self, key: &str) {
        self.set(key, true);
    }

    /// Mark a key as released
    pub fn release(&mut self, key: &str) {
        self.set(key, false);
    }

    /// Release every key
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Check if a key is held
    pub fn is_held(&self, key: &str) -> bool {
        self.keys.get(&Self::normalize(key)).copied().unwrap_or(false)
    }

    /// Logical controls for this snapshot
    pub fn controls(&self) -> Controls {
        Controls::from_snapshot(self)
    }
}

impl<'a> FromIterator<&'a str> for InputSnapshot {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut snapshot = InputSnapshot::new();
        for key in iter {
            snapshot.press(key);
        }
        snapshot
    }
}
