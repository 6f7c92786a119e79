//! Song data model for the chiptracker sequencing core.
//!
//! This crate defines the storage types for a channels × frames ×
//! patterns × rows song grid, the channel-order mapping between logical
//! slot indices and stable channel identities, and the cursor arithmetic
//! used to address rows across frame boundaries. The playback engine
//! consumes these types read-only.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod channel;
mod clip;
mod cursor;
mod effect;
mod machine;
mod module;
mod note;
mod pattern;
mod song;
mod track;
mod view;

pub use channel::{
    ChannelId, ChannelOrder, Chip, APU_DPCM, APU_NOISE, APU_PULSE1, APU_PULSE2, APU_TRIANGLE,
};
pub use clip::{ClipError, PatternClip};
pub use cursor::{
    from_cursor, from_selection, normalize_frame, FrameCursor, PatternCursor, RowPos, Selection,
};
pub use effect::{Effect, EffectKind, MAX_EFFECT_COLUMNS};
pub use machine::{Machine, DMC_PERIODS_NTSC, DMC_PERIODS_PAL};
pub use module::{Groove, Module, DEFAULT_SPEED_SPLIT_POINT, MAX_GROOVES, MAX_GROOVE_SIZE};
pub use note::{Note, Pitch, MAX_INSTRUMENTS, MAX_VOLUME};
pub use pattern::{Pattern, MAX_PATTERN_LENGTH};
pub use song::{Bookmark, Highlight, Song, MAX_FRAMES, MAX_PATTERNS};
pub use track::Track;
pub use view::{SongView, SongViewMut};
