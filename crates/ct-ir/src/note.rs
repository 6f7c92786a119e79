//! Row contents: pitch, volume, instrument, and effect slots.

use crate::effect::{Effect, MAX_EFFECT_COLUMNS};

/// Volume values are `0..16`; this sentinel means "no volume written".
pub const MAX_VOLUME: u8 = 16;

/// Instrument indices are `0..64`; this sentinel means "no instrument".
pub const MAX_INSTRUMENTS: u8 = 64;

/// Pitch field of a row.
///
/// For `Note`, the semitone is `0..12` and the octave field of [`Note`]
/// completes the pitch. For `Echo`, the octave field holds the echo-buffer
/// offset instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Pitch {
    /// No note on this row
    #[default]
    None,
    /// Note on, semitone 0-11 (0 = C)
    Note(u8),
    /// Note cut
    Halt,
    /// Note release
    Release,
    /// Echo pseudo-note referring back into the echo buffer
    Echo,
}

impl Pitch {
    /// True if the octave field carries meaning for this pitch.
    pub fn uses_octave(self) -> bool {
        matches!(self, Pitch::Note(_) | Pitch::Echo)
    }
}

/// One row of one channel: pitch/octave, volume, instrument, and up to
/// four effect command slots.
///
/// Equality ignores the octave field when the pitch does not use it.
#[derive(Clone, Copy, Debug)]
pub struct Note {
    pub pitch: Pitch,
    pub octave: u8,
    /// 0-15, or [`MAX_VOLUME`] when unset
    pub volume: u8,
    /// 0-63, or [`MAX_INSTRUMENTS`] when unset
    pub instrument: u8,
    pub effects: [Effect; MAX_EFFECT_COLUMNS],
}

impl Note {
    /// The default (completely blank) row.
    pub const fn empty() -> Self {
        Self {
            pitch: Pitch::None,
            octave: 0,
            volume: MAX_VOLUME,
            instrument: MAX_INSTRUMENTS,
            effects: [Effect::EMPTY; MAX_EFFECT_COLUMNS],
        }
    }

    /// A note-on row at the given semitone and octave.
    pub const fn note_on(semitone: u8, octave: u8) -> Self {
        let mut note = Self::empty();
        note.pitch = Pitch::Note(semitone);
        note.octave = octave;
        note
    }

    pub fn is_empty(&self) -> bool {
        *self == Note::empty()
    }

    pub fn has_volume(&self) -> bool {
        self.volume < MAX_VOLUME
    }

    pub fn has_instrument(&self) -> bool {
        self.instrument < MAX_INSTRUMENTS
    }

    /// Linear note value `octave * 12 + semitone`, for pitched rows.
    pub fn value(&self) -> Option<u8> {
        match self.pitch {
            Pitch::Note(semitone) => Some(self.octave * 12 + semitone),
            _ => None,
        }
    }

    /// First effect slot of the given kind, if any.
    pub fn effect(&self, kind: crate::effect::EffectKind) -> Option<Effect> {
        self.effects.iter().copied().find(|fx| fx.kind == kind)
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.pitch == other.pitch
            && (!self.pitch.uses_octave() || self.octave == other.octave)
            && self.volume == other.volume
            && self.instrument == other.instrument
            && self.effects == other.effects
    }
}

impl Eq for Note {}
