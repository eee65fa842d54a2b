//! Key latch for hosts without key-release events
//!
//! A raw terminal only reports key presses (and auto-repeats while a key is
//! down). The latch treats a key as held until a hold window has passed since
//! its most recent press. The first auto-repeat arrives after the terminal's
//! repeat delay, which is much longer than the gap between later repeats, so a
//! fresh press gets the longer `repeat_delay_ms` window and a repeating key
//! the shorter `hold_ms` one.
//!
//! Arrow keys arrive as `ESC [ A..D` (or `ESC O A..D` in application cursor
//! mode) and are decoded into `arrowup`, `arrowdown`, `arrowright` and
//! `arrowleft`.

use super::InputSnapshot;
use std::collections::HashMap;

/// Default hold window between auto-repeats in milliseconds
pub const DEFAULT_HOLD_MS: f64 = 150.0;

/// Default window from a fresh press to its first auto-repeat in milliseconds
pub const DEFAULT_REPEAT_DELAY_MS: f64 = 600.0;

const ESC: u8 = 0x1b;

/// Progress through a terminal escape sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    Idle,
    Start,
    Cursor,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    last_ms: f64,
    repeating: bool,
}

/// Press-timestamp latch producing per-tick input snapshots
#[derive(Debug, Clone)]
pub struct KeyLatch {
    hold_ms: f64,
    repeat_delay_ms: f64,
    escape: Escape,
    presses: HashMap<String, Press>,
}

impl KeyLatch {
    /// Create a latch with the given hold window
    ///
    /// A fresh press is held for the same window; see
    /// [`with_repeat_delay`](Self::with_repeat_delay).
    pub fn new(hold_ms: f64) -> Self {
        KeyLatch {
            hold_ms,
            repeat_delay_ms: hold_ms,
            escape: Escape::Idle,
            presses: HashMap::new(),
        }
    }

    /// Hold a fresh press for `delay_ms` while waiting for its first repeat
    pub fn with_repeat_delay(mut self, delay_ms: f64) -> Self {
        self.repeat_delay_ms = delay_ms.max(self.hold_ms);
        self
    }

    /// Record a key press at `now_ms`
    pub fn press(&mut self, key: &str, now_ms: f64) {
        let hold_ms = self.hold_ms;
        let repeat_delay_ms = self.repeat_delay_ms;
        self.presses
            .entry(InputSnapshot::normalize(key))
            .and_modify(|press| {
                let window = if press.repeating { hold_ms } else { repeat_delay_ms };
                press.repeating = now_ms - press.last_ms < window;
                press.last_ms = now_ms;
            })
            .or_insert(Press {
                last_ms: now_ms,
                repeating: false,
            });
    }

    /// Feed one raw terminal byte and record the key it completes
    ///
    /// Returns false for bytes that complete no bound key, including the
    /// leading bytes of an escape sequence.
    pub fn press_byte(&mut self, byte: u8, now_ms: f64) -> bool {
        let key = match (self.escape, byte) {
            (_, ESC) => {
                self.escape = Escape::Start;
                return false;
            }
            (Escape::Start, b'[' | b'O') => {
                self.escape = Escape::Cursor;
                return false;
            }
            (Escape::Cursor, _) => {
                self.escape = Escape::Idle;
                match byte {
                    b'A' => "arrowup",
                    b'B' => "arrowdown",
                    b'C' => "arrowright",
                    b'D' => "arrowleft",
                    _ => return false,
                }
            }
            (Escape::Start | Escape::Idle, _) => {
                self.escape = Escape::Idle;
                match byte {
                    b'w' => "w",
                    b's' => "s",
                    b'a' => "a",
                    b'd' => "d",
                    b' ' => " ",
                    _ => return false,
                }
            }
        };
        self.press(key, now_ms);
        true
    }

    /// Snapshot of keys still within their hold window at `now_ms`
    pub fn snapshot(&mut self, now_ms: f64) -> InputSnapshot {
        let hold_ms = self.hold_ms;
        let repeat_delay_ms = self.repeat_delay_ms;
        self.presses.retain(|_, press| {
            let window = if press.repeating { hold_ms } else { repeat_delay_ms };
            now_ms - press.last_ms < window
        });
        self.presses.keys().map(String::as_str).collect()
    }
}

impl Default for KeyLatch {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_MS).with_repeat_delay(DEFAULT_REPEAT_DELAY_MS)
    }
}
