//! The module: top-level owner of songs, channels, and grooves.

use alloc::vec::Vec;
use arrayvec::ArrayVec;

use crate::channel::{ChannelId, ChannelOrder};
use crate::machine::Machine;
use crate::song::Song;
use crate::view::{SongView, SongViewMut};

/// Groove table slots per module.
pub const MAX_GROOVES: usize = 32;

/// Maximum entries in one groove.
pub const MAX_GROOVE_SIZE: usize = 128;

/// Default boundary between speed and tempo values sharing the `Fxx`
/// parameter byte: `param >= split` means tempo.
pub const DEFAULT_SPEED_SPLIT_POINT: u8 = 32;

const DEFAULT_PATTERN_LENGTH: usize = 64;

/// A short cyclic sequence of per-row speeds, used instead of a constant
/// speed when a song or an `Oxx` effect selects it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Groove {
    entries: ArrayVec<u8, MAX_GROOVE_SIZE>,
}

impl Groove {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a slice, truncating to capacity.
    pub fn from_slice(entries: &[u8]) -> Self {
        let mut groove = Self::new();
        for &entry in entries.iter().take(MAX_GROOVE_SIZE) {
            groove.entries.push(entry);
        }
        groove
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push an entry; false when full.
    pub fn push(&mut self, speed: u8) -> bool {
        self.entries.try_push(speed).is_ok()
    }

    /// The speed for a row counter, consumed cyclically. Empty grooves
    /// fall back to the default engine speed.
    pub fn entry(&self, position: usize) -> u8 {
        if self.entries.is_empty() {
            return 6;
        }
        self.entries[position % self.entries.len()]
    }
}

/// Top-level container: channel order, songs, groove table, and the
/// machine/speed-split settings the playback layer consults.
///
/// The core itself is single-threaded; when a realtime thread reads songs
/// concurrently with UI edits, wrap the whole `Module` in one exclusive
/// lock (an `RwLock` or an owning actor) rather than locking pieces.
#[derive(Clone, Debug)]
pub struct Module {
    channel_order: ChannelOrder,
    songs: Vec<Song>,
    grooves: [Option<Groove>; MAX_GROOVES],
    machine: Machine,
    speed_split_point: u8,
}

impl Module {
    /// Create a module with the given channels and one default song.
    pub fn new(channel_order: ChannelOrder) -> Self {
        let song = Song::new("New song", &channel_order, DEFAULT_PATTERN_LENGTH);
        let mut songs = Vec::new();
        songs.push(song);
        Self {
            channel_order,
            songs,
            grooves: core::array::from_fn(|_| None),
            machine: Machine::default(),
            speed_split_point: DEFAULT_SPEED_SPLIT_POINT,
        }
    }

    pub fn channel_order(&self) -> &ChannelOrder {
        &self.channel_order
    }

    /// Add a channel, creating its track in every song.
    pub fn add_channel(&mut self, id: ChannelId) -> bool {
        if !self.channel_order.add_channel(id) {
            return false;
        }
        for song in &mut self.songs {
            song.add_track(id);
        }
        true
    }

    /// Remove a channel and its track from every song.
    pub fn remove_channel(&mut self, id: ChannelId) -> bool {
        if !self.channel_order.remove_channel(id) {
            return false;
        }
        for song in &mut self.songs {
            song.remove_track(id);
        }
        true
    }

    pub fn songs(&self) -> usize {
        self.songs.len()
    }

    pub fn song(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn song_mut(&mut self, index: usize) -> Option<&mut Song> {
        self.songs.get_mut(index)
    }

    /// Append a new song; returns its index.
    pub fn add_song(&mut self, title: &str) -> usize {
        self.songs
            .push(Song::new(title, &self.channel_order, DEFAULT_PATTERN_LENGTH));
        self.songs.len() - 1
    }

    /// Read-only view of a song through this module's channel order.
    pub fn song_view(&self, index: usize) -> Option<SongView<'_>> {
        Some(SongView::new(&self.channel_order, self.song(index)?))
    }

    /// Mutable view of a song through this module's channel order.
    pub fn song_view_mut(&mut self, index: usize) -> Option<SongViewMut<'_>> {
        let Self {
            channel_order,
            songs,
            ..
        } = self;
        Some(SongViewMut::new(channel_order, songs.get_mut(index)?))
    }

    pub fn groove(&self, index: usize) -> Option<&Groove> {
        self.grooves.get(index)?.as_ref()
    }

    pub fn has_groove(&self, index: usize) -> bool {
        self.groove(index).is_some()
    }

    /// Install or clear a groove slot. Out-of-range slots are ignored.
    pub fn set_groove(&mut self, index: usize, groove: Option<Groove>) {
        if let Some(slot) = self.grooves.get_mut(index) {
            *slot = groove;
        }
    }

    pub fn machine(&self) -> Machine {
        self.machine
    }

    pub fn set_machine(&mut self, machine: Machine) {
        self.machine = machine;
    }

    /// Ticks per second for row-to-seconds conversion.
    pub fn frame_rate(&self) -> f64 {
        self.machine.frame_rate()
    }

    pub fn speed_split_point(&self) -> u8 {
        self.speed_split_point
    }

    pub fn set_speed_split_point(&mut self, split: u8) {
        self.speed_split_point = split;
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new(ChannelOrder::with_channels(&[
            crate::channel::APU_PULSE1,
            crate::channel::APU_PULSE2,
            crate::channel::APU_TRIANGLE,
            crate::channel::APU_NOISE,
            crate::channel::APU_DPCM,
        ]))
    }
}
