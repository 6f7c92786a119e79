//! Per-channel pattern storage and frame mapping.

use alloc::vec::Vec;

use crate::pattern::Pattern;
use crate::song::{MAX_FRAMES, MAX_PATTERNS};

/// One channel's patterns plus the frame → pattern-index mapping and the
/// number of visible effect columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    patterns: Vec<Pattern>,
    frame_list: [u8; MAX_FRAMES],
    effect_columns: usize,
}

impl Track {
    pub fn new() -> Self {
        let mut patterns = Vec::new();
        patterns.resize_with(MAX_PATTERNS, Pattern::default);
        Self {
            patterns,
            frame_list: [0; MAX_FRAMES],
            effect_columns: 1,
        }
    }

    pub fn pattern(&self, index: usize) -> &Pattern {
        debug_assert!(index < MAX_PATTERNS);
        &self.patterns[index]
    }

    pub fn pattern_mut(&mut self, index: usize) -> &mut Pattern {
        debug_assert!(index < MAX_PATTERNS);
        &mut self.patterns[index]
    }

    /// Pattern index assigned to a frame.
    pub fn frame_pattern(&self, frame: usize) -> u8 {
        debug_assert!(frame < MAX_FRAMES);
        self.frame_list[frame]
    }

    pub fn set_frame_pattern(&mut self, frame: usize, pattern: u8) {
        debug_assert!(frame < MAX_FRAMES);
        self.frame_list[frame] = pattern;
    }

    /// The pattern a frame resolves to.
    pub fn pattern_on_frame(&self, frame: usize) -> &Pattern {
        self.pattern(self.frame_pattern(frame) as usize)
    }

    pub fn pattern_on_frame_mut(&mut self, frame: usize) -> &mut Pattern {
        let index = self.frame_pattern(frame) as usize;
        self.pattern_mut(index)
    }

    /// Visible effect columns, `1..=4`.
    pub fn effect_columns(&self) -> usize {
        self.effect_columns
    }

    pub fn set_effect_columns(&mut self, columns: usize) {
        self.effect_columns = columns.clamp(1, crate::effect::MAX_EFFECT_COLUMNS);
    }

    /// Shift frame-list entries right from `frame`, dropping the last.
    /// The vacated entry is assigned pattern 0.
    pub(crate) fn insert_frame_entry(&mut self, frame: usize) {
        self.frame_list.copy_within(frame..MAX_FRAMES - 1, frame + 1);
        self.frame_list[frame] = 0;
    }

    /// Shift frame-list entries left over `frame`, zeroing the last.
    pub(crate) fn remove_frame_entry(&mut self, frame: usize) {
        self.frame_list.copy_within(frame + 1..MAX_FRAMES, frame);
        self.frame_list[MAX_FRAMES - 1] = 0;
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}
