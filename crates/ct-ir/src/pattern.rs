//! Sparse pattern storage.

use alloc::boxed::Box;

use crate::note::Note;

/// Fixed capacity of a pattern, in rows.
pub const MAX_PATTERN_LENGTH: usize = 256;

const DEFAULT_NOTE: Note = Note::empty();

/// A block of up to 256 rows of note data for one channel.
///
/// Row storage is allocated lazily on first write. An unallocated pattern
/// is defined to compare equal to one filled entirely with default notes;
/// reads, equality, and emptiness checks honor this without forcing an
/// allocation.
#[derive(Clone, Debug, Default)]
pub struct Pattern {
    notes: Option<Box<[Note; MAX_PATTERN_LENGTH]>>,
}

impl Pattern {
    /// Create an empty (unallocated) pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether row storage has been allocated.
    pub fn is_allocated(&self) -> bool {
        self.notes.is_some()
    }

    /// Read a row. Unallocated patterns yield the default note.
    pub fn note(&self, row: usize) -> &Note {
        debug_assert!(row < MAX_PATTERN_LENGTH);
        match &self.notes {
            Some(notes) => &notes[row],
            None => &DEFAULT_NOTE,
        }
    }

    /// Mutable access to a row, allocating storage if needed.
    pub fn note_mut(&mut self, row: usize) -> &mut Note {
        debug_assert!(row < MAX_PATTERN_LENGTH);
        &mut self
            .notes
            .get_or_insert_with(|| Box::new([DEFAULT_NOTE; MAX_PATTERN_LENGTH]))[row]
    }

    /// Write a row, allocating storage if needed.
    pub fn set_note(&mut self, row: usize, note: Note) {
        *self.note_mut(row) = note;
    }

    /// True if every row is the default note.
    pub fn is_empty(&self) -> bool {
        match &self.notes {
            Some(notes) => notes.iter().all(Note::is_empty),
            None => true,
        }
    }

    /// Clear all rows and release storage.
    pub fn clear(&mut self) {
        self.notes = None;
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (&self.notes, &other.notes) {
            (None, None) => true,
            (Some(a), Some(b)) => a[..] == b[..],
            (Some(a), None) | (None, Some(a)) => a.iter().all(Note::is_empty),
        }
    }
}

impl Eq for Pattern {}
