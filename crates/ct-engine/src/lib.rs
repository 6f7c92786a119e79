//! Playback-position machinery for the chiptracker core.
//!
//! Everything here is a pure reader over `ct-ir` song data: the player
//! cursor state machine, the backward state reconstructor, and the
//! song-length scanner. All algorithms are synchronous and bounded by
//! the song's frame × row grid.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod length;
mod player;
mod state;
mod tempo;

pub use length::SongLengthScanner;
pub use player::PlayerCursor;
pub use state::{ActiveNote, ChannelState, SongState, ECHO_DEPTH};
pub use tempo::{row_seconds, split_speed, SpeedParam};
