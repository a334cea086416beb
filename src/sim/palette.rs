//! Player color palette
//!
//! The full four-color cycle is fixed for a session; the player starts with
//! the first color and unlocks the rest by passing obstacles. Chasers can
//! take colors away again, but never the last one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::COLOR_COUNT;

/// A packed 0xRRGGBB color
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const RED: Color = Color(0xff0000);
    pub const GREEN: Color = Color(0x00ff00);
    pub const YELLOW: Color = Color(0xffff00);
    pub const BLUE: Color = Color(0x0000ff);

    /// RGB components in 0..=1 (for renderers)
    pub fn to_rgb(self) -> [f32; 3] {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        [r, g, b]
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// Colors unlocked so far plus the current selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorPalette {
    all: [Color; COLOR_COUNT],
    available: Vec<Color>,
    selected: usize,
}

impl ColorPalette {
    pub fn new(all: [Color; COLOR_COUNT]) -> Self {
        Self {
            all,
            available: vec![all[0]],
            selected: 0,
        }
    }

    /// Back to a single unlocked color
    pub fn reset(&mut self) {
        self.available.clear();
        self.available.push(self.all[0]);
        self.selected = 0;
    }

    /// The fixed four-color cycle
    pub fn all_colors(&self) -> &[Color; COLOR_COUNT] {
        &self.all
    }

    /// Color at position `index` of the full cycle (wraps)
    pub fn color_at(&self, index: usize) -> Color {
        self.all[index % COLOR_COUNT]
    }

    pub fn available(&self) -> &[Color] {
        &self.available
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Currently selected color (the ball's color)
    pub fn selected(&self) -> Color {
        self.available[self.selected]
    }

    pub fn contains(&self, color: Color) -> bool {
        self.available.contains(&color)
    }

    /// Unlock `all[passed / 2]` if it is not already available
    ///
    /// Returns the newly unlocked color. Calling again with the same
    /// counter is a no-op.
    pub fn unlock_next(&mut self, obstacles_passed: u32) -> Option<Color> {
        let target = (obstacles_passed / 2) as usize;
        if target >= COLOR_COUNT {
            return None;
        }
        let color = self.all[target];
        if self.available.contains(&color) {
            return None;
        }
        self.available.push(color);
        Some(color)
    }

    /// Step the selection forward (wraps) and return the new color
    pub fn advance_selection(&mut self) -> Color {
        self.cycle(1)
    }

    /// Step the selection by `direction` (+1 / -1), wrapping both ways
    pub fn cycle(&mut self, direction: i8) -> Color {
        let len = self.available.len() as i64;
        let next = (self.selected as i64 + direction as i64).rem_euclid(len);
        self.selected = next as usize;
        self.selected()
    }

    /// Remove `color` unless it is the last one left
    ///
    /// Keeps the current selection pointing at the same color when a
    /// different color is removed; otherwise clamps it back into range.
    pub fn remove_color(&mut self, color: Color) -> bool {
        if self.available.len() <= 1 {
            return false;
        }
        let Some(index) = self.available.iter().position(|&c| c == color) else {
            return false;
        };
        self.available.remove(index);
        if index < self.selected {
            self.selected -= 1;
        } else if self.selected >= self.available.len() {
            self.selected = 0;
        }
        debug_assert!(self.selected < self.available.len());
        true
    }

    /// True when the selection invariants hold
    pub fn is_consistent(&self) -> bool {
        !self.available.is_empty() && self.selected < self.available.len()
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new([Color::RED, Color::GREEN, Color::YELLOW, Color::BLUE])
    }
}
