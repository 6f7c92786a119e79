//! Frame and row cursors with wraparound arithmetic.
//!
//! Selections, paste targets, and playback stepping all address rows that
//! may fall outside the current frame; these cursors normalize positions
//! modulo the song bounds so row-granular addressing spans frame
//! boundaries transparently.

use core::ops::{Add, AddAssign, Sub, SubAssign};

use crate::effect::EffectKind;
use crate::view::{SongView, SongViewMut};

/// Map any frame number into `[0, count)`.
pub fn normalize_frame(frame: isize, count: usize) -> usize {
    debug_assert!(count > 0);
    let count = count as isize;
    (((frame % count) + count) % count) as usize
}

/// A frame index kept normalized against a song's frame count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameCursor {
    frame: usize,
    count: usize,
}

impl FrameCursor {
    pub fn new(frame: isize, count: usize) -> Self {
        Self {
            frame: normalize_frame(frame, count),
            count,
        }
    }

    /// Cursor for the view's current frame count.
    pub fn with_view(view: &SongView, frame: isize) -> Self {
        Self::new(frame, view.frame_count())
    }

    pub fn frame(self) -> usize {
        self.frame
    }

    pub fn next(self) -> Self {
        self + 1
    }

    pub fn prev(self) -> Self {
        self - 1
    }

    /// Pattern index under the cursor for a channel slot.
    pub fn pattern(self, view: &SongView, channel: usize) -> Option<u8> {
        view.pattern_index(channel, self.frame)
    }

    /// Assign a pattern index under the cursor for a channel slot.
    pub fn set_pattern(self, view: &mut SongViewMut, channel: usize, pattern: u8) {
        view.set_pattern_index(channel, self.frame, pattern);
    }
}

impl Add<isize> for FrameCursor {
    type Output = FrameCursor;

    fn add(self, rhs: isize) -> FrameCursor {
        FrameCursor::new(self.frame as isize + rhs, self.count)
    }
}

impl Sub<isize> for FrameCursor {
    type Output = FrameCursor;

    fn sub(self, rhs: isize) -> FrameCursor {
        self + -rhs
    }
}

impl AddAssign<isize> for FrameCursor {
    fn add_assign(&mut self, rhs: isize) {
        *self = *self + rhs;
    }
}

impl SubAssign<isize> for FrameCursor {
    fn sub_assign(&mut self, rhs: isize) {
        *self = *self - rhs;
    }
}

/// An unnormalized (frame, row) position, ordered frame-first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowPos {
    pub frame: isize,
    pub row: isize,
}

impl RowPos {
    pub const fn new(frame: isize, row: isize) -> Self {
        Self { frame, row }
    }
}

/// A rectangular selection between two row positions (either order).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub begin: RowPos,
    pub end: RowPos,
}

/// A (frame, row) cursor supporting row arithmetic across frame edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PatternCursor {
    pub frame: isize,
    pub row: isize,
}

impl PatternCursor {
    pub const fn new(frame: isize, row: isize) -> Self {
        Self { frame, row }
    }

    /// Normalize so that `0 <= row < frame_length(frame)`, carrying row
    /// overflow and underflow across (normalized) frame boundaries.
    pub fn warp(&mut self, view: &SongView) {
        let count = view.frame_count();
        self.frame = normalize_frame(self.frame, count) as isize;
        loop {
            let length = view.frame_length(self.frame as usize) as isize;
            if self.row < length {
                break;
            }
            self.row -= length;
            self.frame = normalize_frame(self.frame + 1, count) as isize;
        }
        while self.row < 0 {
            self.frame = normalize_frame(self.frame - 1, count) as isize;
            self.row += view.frame_length(self.frame as usize) as isize;
        }
    }

    /// Step one row forward, honoring control-flow effects on the current
    /// row: a jump moves to its target frame at row 0, a skip to the next
    /// frame at the skip's row.
    pub fn step(&mut self, view: &SongView) {
        match control_effect(view, *self) {
            Some((EffectKind::Jump, target)) => {
                let last = view.frame_count() as isize - 1;
                self.frame = (target as isize).min(last);
                self.row = 0;
            }
            Some((_, row)) => {
                self.frame += 1;
                self.row = 0;
                self.warp(view);
                let length = view.frame_length(self.frame as usize) as isize;
                self.row = (row as isize).min(length - 1);
            }
            None => {
                self.row += 1;
                self.warp(view);
            }
        }
    }

    /// Step one row backward with wraparound.
    pub fn step_back(&mut self, view: &SongView) {
        self.row -= 1;
        self.warp(view);
    }

    /// True if this (already warped) cursor sits at the song start.
    pub fn is_origin(&self) -> bool {
        self.frame == 0 && self.row == 0
    }
}

/// Jump or skip command on a row, scanning every channel's visible effect
/// columns. A jump anywhere on the row takes priority over a skip.
fn control_effect(view: &SongView, pos: PatternCursor) -> Option<(EffectKind, u8)> {
    let frame = pos.frame as usize;
    let row = pos.row as usize;
    let mut skip = None;
    for channel in 0..view.channels() {
        let Some(note) = view.note(channel, frame, row) else {
            continue;
        };
        for fx in &note.effects[..view.effect_columns(channel)] {
            match fx.kind {
                EffectKind::Jump => return Some((EffectKind::Jump, fx.param)),
                EffectKind::Skip => skip = Some((EffectKind::Skip, fx.param)),
                _ => {}
            }
        }
    }
    skip
}

/// A warped cursor at the given position.
pub fn from_cursor(view: &SongView, frame: isize, row: isize) -> PatternCursor {
    let mut cursor = PatternCursor::new(frame, row);
    cursor.warp(view);
    cursor
}

/// Warped begin/end cursors for a selection, normalized so begin <= end.
pub fn from_selection(view: &SongView, selection: &Selection) -> (PatternCursor, PatternCursor) {
    let begin = from_cursor(view, selection.begin.frame, selection.begin.row);
    let end = from_cursor(view, selection.end.frame, selection.end.row);
    if begin <= end {
        (begin, end)
    } else {
        (end, begin)
    }
}
