//! Binary clip payloads for copy/paste and drag-drop transfer.
//!
//! The payload is fully validated and decoded into an owned [`PatternClip`]
//! before anything else happens; applying a clip bounds-checks the whole
//! destination rectangle before writing any note. No partially-applied
//! state is observable on failure.

use alloc::vec::Vec;

use crate::cursor::from_cursor;
use crate::effect::{Effect, EffectKind, MAX_EFFECT_COLUMNS};
use crate::note::{Note, Pitch, MAX_INSTRUMENTS, MAX_VOLUME};
use crate::pattern::MAX_PATTERN_LENGTH;
use crate::view::SongViewMut;

const MAGIC: &[u8; 4] = b"CTCL";
const HEADER_LEN: usize = 7;
const NOTE_LEN: usize = 4 + 2 * MAX_EFFECT_COLUMNS;
const MAX_CLIP_CHANNELS: usize = 64;

/// Error type for clip payload decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipError {
    /// Missing or malformed header
    BadHeader,
    /// Buffer shorter than the note data it declares
    UnexpectedEof,
    /// Declared geometry out of range, or clip does not fit the target
    Oversize,
    /// A note field holds an out-of-range value
    BadNote,
}

/// A rectangular block of notes cut or copied from a song.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternClip {
    channels: usize,
    rows: usize,
    /// Row-major: `notes[row * channels + channel]`
    notes: Vec<Note>,
}

impl PatternClip {
    /// Create a blank clip. Geometry is clamped to the valid range.
    pub fn new(channels: usize, rows: usize) -> Self {
        let channels = channels.clamp(1, MAX_CLIP_CHANNELS);
        let rows = rows.clamp(1, MAX_PATTERN_LENGTH);
        Self {
            channels,
            rows,
            notes: alloc::vec![Note::empty(); channels * rows],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn note(&self, row: usize, channel: usize) -> &Note {
        debug_assert!(row < self.rows && channel < self.channels);
        &self.notes[row * self.channels + channel]
    }

    pub fn set_note(&mut self, row: usize, channel: usize, note: Note) {
        debug_assert!(row < self.rows && channel < self.channels);
        self.notes[row * self.channels + channel] = note;
    }

    /// Serialize to the transfer format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.notes.len() * NOTE_LEN);
        out.extend_from_slice(MAGIC);
        out.push(self.channels as u8);
        out.extend_from_slice(&(self.rows as u16).to_le_bytes());
        for note in &self.notes {
            encode_note(note, &mut out);
        }
        out
    }

    /// Decode a transfer payload, validating the complete buffer before
    /// constructing the clip.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ClipError> {
        if data.len() < HEADER_LEN {
            return Err(ClipError::UnexpectedEof);
        }
        if &data[..4] != MAGIC {
            return Err(ClipError::BadHeader);
        }
        let channels = data[4] as usize;
        let rows = u16::from_le_bytes([data[5], data[6]]) as usize;
        if channels == 0 || channels > MAX_CLIP_CHANNELS || rows == 0 || rows > MAX_PATTERN_LENGTH
        {
            return Err(ClipError::Oversize);
        }
        let body_len = channels * rows * NOTE_LEN;
        match data.len().checked_sub(HEADER_LEN) {
            Some(have) if have == body_len => {}
            Some(have) if have < body_len => return Err(ClipError::UnexpectedEof),
            _ => return Err(ClipError::BadHeader),
        }

        let mut notes = Vec::with_capacity(channels * rows);
        for chunk in data[HEADER_LEN..].chunks_exact(NOTE_LEN) {
            notes.push(decode_note(chunk)?);
        }
        Ok(Self {
            channels,
            rows,
            notes,
        })
    }

    /// Paste the clip at (frame, row), starting at a channel slot. Rows
    /// wrap across frame boundaries; channels must fit the view. Nothing
    /// is written unless the whole destination is valid.
    pub fn apply(
        &self,
        view: &mut SongViewMut,
        channel: usize,
        frame: isize,
        row: isize,
    ) -> Result<(), ClipError> {
        if channel + self.channels > view.channels() {
            return Err(ClipError::Oversize);
        }
        let mut cursor = from_cursor(&view.as_view(), frame, row);
        for src_row in 0..self.rows {
            for src_channel in 0..self.channels {
                view.set_note(
                    channel + src_channel,
                    cursor.frame as usize,
                    cursor.row as usize,
                    *self.note(src_row, src_channel),
                );
            }
            cursor.row += 1;
            cursor.warp(&view.as_view());
        }
        Ok(())
    }
}

fn encode_note(note: &Note, out: &mut Vec<u8>) {
    let pitch = match note.pitch {
        Pitch::None => 0,
        Pitch::Halt => 1,
        Pitch::Release => 2,
        Pitch::Echo => 3,
        Pitch::Note(semitone) => 4 + semitone,
    };
    out.push(pitch);
    out.push(note.octave);
    out.push(note.volume);
    out.push(note.instrument);
    for fx in &note.effects {
        out.push(fx.kind as u8);
        out.push(fx.param);
    }
}

fn decode_note(data: &[u8]) -> Result<Note, ClipError> {
    debug_assert_eq!(data.len(), NOTE_LEN);
    let mut note = Note::empty();
    note.pitch = match data[0] {
        0 => Pitch::None,
        1 => Pitch::Halt,
        2 => Pitch::Release,
        3 => Pitch::Echo,
        tag @ 4..=15 => Pitch::Note(tag - 4),
        _ => return Err(ClipError::BadNote),
    };
    note.octave = data[1];
    note.volume = data[2];
    note.instrument = data[3];
    if note.volume > MAX_VOLUME || note.instrument > MAX_INSTRUMENTS {
        return Err(ClipError::BadNote);
    }
    for (slot, chunk) in note.effects.iter_mut().zip(data[4..].chunks_exact(2)) {
        let kind = EffectKind::from_u8(chunk[0]).ok_or(ClipError::BadNote)?;
        *slot = Effect::new(kind, chunk[1]);
    }
    Ok(note)
}
