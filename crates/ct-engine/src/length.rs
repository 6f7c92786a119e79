//! Song length measurement.
//!
//! Walks a song the way playback would, resolving jump/skip/halt, and
//! separates the one-shot prologue from the steady-state loop by running
//! the traversal twice. Visited (frame, row) pairs are tracked in a
//! bitset, so each pass terminates within `frame_count * pattern_length`
//! steps for any song.

use alloc::vec;
use alloc::vec::Vec;

use ct_ir::{EffectKind, Module, PatternCursor, SongView};

use crate::tempo::{row_seconds, split_speed, SpeedParam};

/// Measured row and second counts for one song.
///
/// The first traversal covers the prologue plus one trip around the loop;
/// the second starts where the first stopped, past the prologue, so it
/// measures the loop alone. A halt row is counted by the first pass (a
/// terminated song is measured in full) but ends the second pass before
/// counting, leaving a halted song with an empty loop.
pub struct SongLengthScanner {
    full_rows: u32,
    loop_rows: u32,
    full_seconds: f64,
    loop_seconds: f64,
}

impl SongLengthScanner {
    /// Measure a song. Returns `None` for an out-of-range song index.
    pub fn scan(module: &Module, song_index: usize) -> Option<SongLengthScanner> {
        let view = module.song_view(song_index)?;
        let song = module.song(song_index)?;

        let mut tempo = TempoState::new(module, song.speed, song.tempo, song.uses_groove);
        let mut cursor = PatternCursor::new(0, 0);
        let (full_rows, full_seconds) = run_pass(&view, &mut cursor, &mut tempo, module, false);
        let (loop_rows, loop_seconds) = run_pass(&view, &mut cursor, &mut tempo, module, true);

        Some(SongLengthScanner {
            full_rows,
            loop_rows,
            full_seconds,
            loop_seconds,
        })
    }

    /// `(steady_loop_rows, prologue_rows)`.
    pub fn row_counts(&self) -> (u32, u32) {
        (self.loop_rows, self.full_rows - self.loop_rows)
    }

    /// `(steady_loop_seconds, prologue_seconds)`.
    pub fn second_counts(&self) -> (f64, f64) {
        (self.loop_seconds, self.full_seconds - self.loop_seconds)
    }
}

/// Speed, tempo, and groove position carried across rows (and across both
/// passes, so speed changes in the prologue still govern the loop).
struct TempoState {
    speed: u8,
    tempo: u8,
    groove: Option<(u8, usize)>,
    split_point: u8,
    frame_rate: f64,
}

impl TempoState {
    fn new(module: &Module, speed: u8, tempo: u8, uses_groove: bool) -> Self {
        let groove = if uses_groove && module.has_groove(speed as usize) {
            Some((speed, 0))
        } else {
            None
        };
        Self {
            speed,
            tempo,
            groove,
            split_point: module.speed_split_point(),
            frame_rate: module.frame_rate(),
        }
    }

    fn apply(&mut self, module: &Module, kind: EffectKind, param: u8) {
        match kind {
            EffectKind::Speed => match split_speed(param, self.split_point) {
                SpeedParam::Speed(speed) => {
                    self.speed = speed;
                    self.groove = None;
                }
                SpeedParam::Tempo(tempo) => self.tempo = tempo,
            },
            EffectKind::Groove => {
                if module.has_groove(param as usize) {
                    self.groove = Some((param, 0));
                }
            }
            _ => {}
        }
    }

    /// Duration of the current row, advancing the groove position.
    fn step_row(&mut self, module: &Module) -> f64 {
        let speed = match &mut self.groove {
            Some((index, position)) => {
                let speed = module
                    .groove(*index as usize)
                    .map_or(self.speed, |g| g.entry(*position));
                *position += 1;
                speed
            }
            None => self.speed,
        };
        row_seconds(speed, self.tempo, self.frame_rate)
    }
}

/// One traversal from the cursor's position until a (frame, row) repeats
/// or a halt ends the pass. Leaves the cursor at the stopping position so
/// the next pass picks up there.
fn run_pass(
    view: &SongView,
    cursor: &mut PatternCursor,
    tempo: &mut TempoState,
    module: &Module,
    halt_ends_before_counting: bool,
) -> (u32, f64) {
    let pattern_length = view.pattern_length();
    let mut visited = Bitset::new(view.frame_count() * pattern_length);
    let mut rows = 0u32;
    let mut seconds = 0.0f64;

    loop {
        let position = cursor.frame as usize * pattern_length + cursor.row as usize;
        if visited.insert(position) {
            break;
        }

        let halted = apply_row_effects(view, cursor, tempo, module);
        if halted && halt_ends_before_counting {
            break;
        }
        seconds += tempo.step_row(module);
        rows += 1;
        if halted {
            break;
        }
        cursor.step(view);
    }
    (rows, seconds)
}

/// Apply speed/tempo/groove effects on the cursor's row, in playback
/// order, before the row's duration is charged. Returns true if the row
/// carries a halt.
fn apply_row_effects(
    view: &SongView,
    cursor: &PatternCursor,
    tempo: &mut TempoState,
    module: &Module,
) -> bool {
    let mut halted = false;
    for channel in 0..view.channels() {
        let Some(note) = view.note(channel, cursor.frame as usize, cursor.row as usize) else {
            continue;
        };
        for fx in &note.effects[..view.effect_columns(channel)] {
            if fx.kind == EffectKind::Halt {
                halted = true;
            } else {
                tempo.apply(module, fx.kind, fx.param);
            }
        }
    }
    halted
}

/// Visited-position set over `frame * pattern_length + row` indices.
struct Bitset {
    words: Vec<u64>,
}

impl Bitset {
    fn new(bits: usize) -> Self {
        Self {
            words: vec![0; (bits + 63) / 64],
        }
    }

    /// Mark a position; returns true if it was already present.
    fn insert(&mut self, index: usize) -> bool {
        let word = &mut self.words[index / 64];
        let mask = 1u64 << (index % 64);
        let seen = *word & mask != 0;
        *word |= mask;
        seen
    }
}
