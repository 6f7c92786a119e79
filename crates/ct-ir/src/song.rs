//! Song structure: per-song metadata plus one track per known channel.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::channel::{ChannelId, ChannelOrder};
use crate::pattern::Pattern;
use crate::track::Track;

/// Maximum patterns per track.
pub const MAX_PATTERNS: usize = 256;

/// Maximum frames per song.
pub const MAX_FRAMES: usize = 256;

const DEFAULT_SPEED: u8 = 6;
const DEFAULT_TEMPO: u8 = 150;

/// Row-highlight intervals (beat and measure) for the pattern display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Highlight {
    /// Rows per beat highlight
    pub first: u8,
    /// Rows per measure highlight
    pub second: u8,
}

impl Default for Highlight {
    fn default() -> Self {
        Self { first: 4, second: 16 }
    }
}

/// A named position marker inside a song.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bookmark {
    pub name: ArrayString<32>,
    pub frame: u8,
    pub row: u8,
    /// Highlight override from this bookmark on, if any.
    pub highlight: Option<Highlight>,
    /// Whether the highlight override persists past the next bookmark.
    pub persist: bool,
}

impl Bookmark {
    pub fn new(name: &str, frame: u8, row: u8) -> Self {
        let mut bookmark = Self::default();
        let _ = bookmark.name.try_push_str(name);
        bookmark.frame = frame;
        bookmark.row = row;
        bookmark
    }
}

/// A complete song: metadata plus one [`Track`] per known channel.
///
/// Tracks are keyed by stable channel identity; index-based access goes
/// through [`SongView`](crate::SongView) with a [`ChannelOrder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    /// Song title
    pub title: ArrayString<32>,
    pattern_length: usize,
    frame_count: usize,
    /// Default speed; doubles as the groove index when `uses_groove` is set
    pub speed: u8,
    /// Default tempo; 0 = fixed-rate mode (rows last `speed` frames)
    pub tempo: u8,
    /// Whether `speed` names a groove instead of a constant speed
    pub uses_groove: bool,
    pub highlight: Highlight,
    pub bookmarks: Vec<Bookmark>,
    tracks: BTreeMap<ChannelId, Track>,
}

impl Song {
    /// Create a song with one frame and a track per channel in `order`.
    pub fn new(title: &str, order: &ChannelOrder, pattern_length: usize) -> Self {
        let mut song_title = ArrayString::new();
        let _ = song_title.try_push_str(title);
        Self {
            title: song_title,
            pattern_length: pattern_length.clamp(1, crate::pattern::MAX_PATTERN_LENGTH),
            frame_count: 1,
            speed: DEFAULT_SPEED,
            tempo: DEFAULT_TEMPO,
            uses_groove: false,
            highlight: Highlight::default(),
            bookmarks: Vec::new(),
            tracks: order.iter().map(|id| (id, Track::new())).collect(),
        }
    }

    pub fn pattern_length(&self) -> usize {
        self.pattern_length
    }

    pub fn set_pattern_length(&mut self, length: usize) {
        self.pattern_length = length.clamp(1, crate::pattern::MAX_PATTERN_LENGTH);
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn set_frame_count(&mut self, count: usize) {
        self.frame_count = count.clamp(1, MAX_FRAMES);
    }

    pub fn track(&self, id: ChannelId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn track_mut(&mut self, id: ChannelId) -> Option<&mut Track> {
        self.tracks.get_mut(&id)
    }

    /// Add a blank track for a channel. Returns false if already present.
    pub fn add_track(&mut self, id: ChannelId) -> bool {
        if self.tracks.contains_key(&id) {
            return false;
        }
        self.tracks.insert(id, Track::new());
        true
    }

    /// Remove a channel's track. Returns false if absent.
    pub fn remove_track(&mut self, id: ChannelId) -> bool {
        self.tracks.remove(&id).is_some()
    }

    pub fn pattern(&self, id: ChannelId, index: usize) -> Option<&Pattern> {
        Some(self.track(id)?.pattern(index))
    }

    pub fn pattern_mut(&mut self, id: ChannelId, index: usize) -> Option<&mut Pattern> {
        Some(self.track_mut(id)?.pattern_mut(index))
    }

    pub fn pattern_on_frame(&self, id: ChannelId, frame: usize) -> Option<&Pattern> {
        Some(self.track(id)?.pattern_on_frame(frame))
    }

    pub fn pattern_on_frame_mut(&mut self, id: ChannelId, frame: usize) -> Option<&mut Pattern> {
        Some(self.track_mut(id)?.pattern_on_frame_mut(frame))
    }

    /// Whether any live frame references the given pattern index.
    pub fn is_pattern_in_use(&self, id: ChannelId, pattern: u8) -> bool {
        let Some(track) = self.track(id) else {
            return false;
        };
        (0..self.frame_count).any(|frame| track.frame_pattern(frame) == pattern)
    }

    /// Lowest pattern index above `watermark` that is both unused in the
    /// frame list and structurally empty. `None` when exhausted — there is
    /// no valid index to hand out.
    pub fn free_pattern_index(&self, id: ChannelId, watermark: usize) -> Option<u8> {
        let track = self.track(id)?;
        (watermark.saturating_add(1)..MAX_PATTERNS)
            .find(|&index| {
                !self.is_pattern_in_use(id, index as u8) && track.pattern(index).is_empty()
            })
            .map(|index| index as u8)
    }

    /// Replace `dst`'s track with a copy of `src`'s: patterns, frame-list
    /// entries, and effect-column count, as one operation.
    pub fn copy_track(&mut self, dst: ChannelId, src: ChannelId) {
        if dst == src {
            return;
        }
        if let Some(track) = self.tracks.get(&src).cloned() {
            if let Some(slot) = self.tracks.get_mut(&dst) {
                *slot = track;
            }
        }
    }

    /// Exchange two channels' entire tracks.
    pub fn swap_channels(&mut self, a: ChannelId, b: ChannelId) {
        if a == b || !self.tracks.contains_key(&a) || !self.tracks.contains_key(&b) {
            return;
        }
        let track_a = self.tracks.remove(&a).unwrap_or_default();
        let track_b = self.tracks.remove(&b).unwrap_or_default();
        self.tracks.insert(a, track_b);
        self.tracks.insert(b, track_a);
    }

    /// Insert a blank frame before `frame`. Returns false when the frame
    /// table is full.
    pub fn insert_frame(&mut self, frame: usize) -> bool {
        if self.frame_count >= MAX_FRAMES || frame > self.frame_count {
            return false;
        }
        for track in self.tracks.values_mut() {
            track.insert_frame_entry(frame);
        }
        self.frame_count += 1;
        true
    }

    /// Remove a frame. Returns false for the last remaining frame.
    pub fn remove_frame(&mut self, frame: usize) -> bool {
        if self.frame_count <= 1 || frame >= self.frame_count {
            return false;
        }
        for track in self.tracks.values_mut() {
            track.remove_frame_entry(frame);
        }
        self.frame_count -= 1;
        true
    }

    /// Insert a copy of `frame` directly after it.
    pub fn duplicate_frame(&mut self, frame: usize) -> bool {
        if self.frame_count >= MAX_FRAMES || frame >= self.frame_count {
            return false;
        }
        for track in self.tracks.values_mut() {
            let pattern = track.frame_pattern(frame);
            track.insert_frame_entry(frame + 1);
            track.set_frame_pattern(frame + 1, pattern);
        }
        self.frame_count += 1;
        true
    }

    pub fn add_bookmark(&mut self, bookmark: Bookmark) {
        self.bookmarks.push(bookmark);
    }

    /// First bookmark at exactly (frame, row), if any.
    pub fn bookmark_at(&self, frame: u8, row: u8) -> Option<&Bookmark> {
        self.bookmarks
            .iter()
            .find(|b| b.frame == frame && b.row == row)
    }

    /// Order bookmarks by position.
    pub fn sort_bookmarks(&mut self) {
        self.bookmarks.sort_by_key(|b| (b.frame, b.row));
    }
}
