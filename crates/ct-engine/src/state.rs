//! Backward play-state reconstruction.
//!
//! Recovers each channel's logical state at an arbitrary position as if
//! the song had been played from the start, by scanning backward instead.
//! Because the walk moves backward, the first occurrence of any value is
//! definitionally its most recent forward occurrence, so every cell is a
//! write-once "first writer wins" slot.

use alloc::vec::Vec;
use core::fmt;

use ct_ir::{
    from_cursor, ChannelId, EffectKind, Module, Note, Pitch, SongView,
};

use crate::tempo::{split_speed, SpeedParam};

/// Depth of the echo-note history ring.
pub const ECHO_DEPTH: usize = 4;

/// Highest note value the echo buffer clamps to (octave 7, B).
const MAX_NOTE_VALUE: i32 = 95;

/// The note a channel is sounding (or was last told to sound).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveNote {
    /// Note cut
    Cut,
    /// Note released
    Release,
    /// Pitched note, `octave * 12 + semitone`
    Note(u8),
}

/// Reconstructed per-channel state.
#[derive(Clone, Debug)]
pub struct ChannelState {
    pub id: ChannelId,
    pub note: Option<ActiveNote>,
    pub instrument: Option<u8>,
    pub volume: Option<u8>,
    /// Most recent parameter per state-relevant effect kind, indexed by
    /// `EffectKind as usize`.
    pub effects: [Option<u8>; EffectKind::COUNT],
    /// Echo history, most recent first.
    pub echo: [Option<u8>; ECHO_DEPTH],
}

impl ChannelState {
    fn new(id: ChannelId) -> Self {
        Self {
            id,
            note: None,
            instrument: None,
            volume: None,
            effects: [None; EffectKind::COUNT],
            echo: [None; ECHO_DEPTH],
        }
    }

    /// Most recent parameter of a state-relevant effect kind.
    pub fn effect(&self, kind: EffectKind) -> Option<u8> {
        self.effects[kind as usize]
    }
}

/// Snapshot of the whole song's play-state at one position.
#[derive(Clone, Debug)]
pub struct SongState {
    pub channels: Vec<ChannelState>,
    pub speed: u8,
    pub tempo: u8,
    /// Active groove index, if a groove governs the speed.
    pub groove: Option<u8>,
    /// Position within the active groove.
    pub groove_step: usize,
}

/// Echo-ring slot contents during the backward walk.
#[derive(Clone, Copy)]
enum EchoSlot {
    /// A concrete note value (transpose already folded in).
    Value(i32),
    /// An echo pseudo-note referring `offset` entries further back.
    Alias(usize),
}

/// Per-channel scratch for one retrieve pass.
struct ChannelScan {
    state: ChannelState,
    slots: [Option<EchoSlot>; ECHO_DEPTH],
    filled: usize,
    /// Pending semitone offsets for slots not yet filled.
    transpose: [i32; ECHO_DEPTH],
    /// Slot index holding the channel's current note, when that note must
    /// be resolved through the echo ring.
    note_slot: Option<usize>,
}

impl ChannelScan {
    fn new(id: ChannelId) -> Self {
        Self {
            state: ChannelState::new(id),
            slots: [None; ECHO_DEPTH],
            filled: 0,
            transpose: [0; ECHO_DEPTH],
            note_slot: None,
        }
    }

    fn push_slot(&mut self, slot: EchoSlot) -> usize {
        let index = self.filled;
        if index < ECHO_DEPTH {
            self.slots[index] = Some(slot);
            self.filled += 1;
        }
        index
    }

    /// Fold a transposing effect into every not-yet-filled slot.
    fn add_transpose(&mut self, amount: i32) {
        for pending in &mut self.transpose[self.filled..] {
            *pending += amount;
        }
    }

    fn note(&mut self, note: &Note) {
        match note.pitch {
            Pitch::None => return,
            Pitch::Note(semitone) => {
                let value =
                    (note.octave as i32 * 12 + semitone as i32 + self.transpose[self.filled.min(ECHO_DEPTH - 1)])
                        .clamp(0, MAX_NOTE_VALUE);
                let slot = self.push_slot(EchoSlot::Value(value));
                if self.state.note.is_none() && self.note_slot.is_none() {
                    self.note_slot = Some(slot);
                }
            }
            Pitch::Echo => {
                // The octave field carries the buffer offset; zero would
                // self-reference, so it reads as one.
                let offset = (note.octave as usize).max(1);
                let slot = self.push_slot(EchoSlot::Alias(offset));
                if self.state.note.is_none() && self.note_slot.is_none() {
                    self.note_slot = Some(slot);
                }
            }
            Pitch::Halt => {
                if self.state.note.is_none() && self.note_slot.is_none() {
                    self.state.note = Some(ActiveNote::Cut);
                }
            }
            Pitch::Release => {
                if self.state.note.is_none() && self.note_slot.is_none() {
                    self.state.note = Some(ActiveNote::Release);
                }
            }
        }
        if self.state.instrument.is_none() && note.has_instrument() {
            self.state.instrument = Some(note.instrument);
        }
    }

    fn volume(&mut self, note: &Note) {
        if self.state.volume.is_none() && note.has_volume() {
            self.state.volume = Some(note.volume);
        }
    }

    /// Resolve alias chains and fill the public echo ring.
    fn finish(mut self) -> ChannelState {
        for index in 0..ECHO_DEPTH {
            self.state.echo[index] = self.resolve(index, 0);
        }
        if let Some(slot) = self.note_slot {
            self.state.note = self.resolve(slot, 0).map(ActiveNote::Note);
        }
        self.state
    }

    fn resolve(&self, index: usize, depth: usize) -> Option<u8> {
        if depth > ECHO_DEPTH {
            return None;
        }
        match self.slots.get(index).copied().flatten()? {
            EchoSlot::Value(value) => Some(value.clamp(0, MAX_NOTE_VALUE) as u8),
            // The referenced slot's value already carries every transpose
            // up to the target position, so an alias adds nothing.
            EchoSlot::Alias(offset) => self.resolve(index + offset, depth + 1),
        }
    }
}

/// Global scratch for one retrieve pass.
#[derive(Default)]
struct GlobalScan {
    speed: Option<u8>,
    tempo: Option<u8>,
    groove: Option<(u8, usize)>,
    /// Set once the most recent speed source (Fxx speed or Oxx groove)
    /// has been found.
    speed_source_found: bool,
}

impl SongState {
    /// Reconstruct the play-state at `(frame, row)` of a song.
    ///
    /// Walks backward from the position toward the song start, stopping
    /// early at a halt boundary; nothing before a `Cxx` is still playing.
    pub fn retrieve(module: &Module, song_index: usize, frame: usize, row: usize) -> Option<SongState> {
        let view = module.song_view(song_index)?;
        let song = module.song(song_index)?;

        let mut channels: Vec<ChannelScan> = (0..view.channels())
            .map(|channel| ChannelScan::new(view.channel_id(channel).unwrap_or(ct_ir::APU_PULSE1)))
            .collect();
        let mut global = GlobalScan::default();

        let mut cursor = from_cursor(&view, frame as isize, row as isize);
        let mut distance = 0usize;
        let last_distance;
        loop {
            let halted = scan_row(
                module,
                &view,
                cursor.frame as usize,
                cursor.row as usize,
                distance,
                &mut channels,
                &mut global,
            );
            if halted || cursor.is_origin() {
                last_distance = distance;
                break;
            }
            cursor.step_back(&view);
            distance += 1;
        }

        let mut groove = global.groove;
        if groove.is_none() && !global.speed_source_found && song.uses_groove {
            // Groove running since the song start.
            if let Some(g) = module.groove(song.speed as usize) {
                groove = Some((song.speed, last_distance % g.len().max(1)));
            }
        }

        Some(SongState {
            channels: channels.into_iter().map(ChannelScan::finish).collect(),
            speed: global.speed.unwrap_or(song.speed),
            tempo: global.tempo.unwrap_or(song.tempo),
            groove: groove.map(|(index, _)| index),
            groove_step: groove.map_or(0, |(_, step)| step),
        })
    }

    /// The channel state at a slot index.
    pub fn channel(&self, index: usize) -> Option<&ChannelState> {
        self.channels.get(index)
    }
}

/// Process one row for all channels. Returns true if the row carries a
/// halt effect, which ends the backward walk.
fn scan_row(
    module: &Module,
    view: &SongView,
    frame: usize,
    row: usize,
    distance: usize,
    channels: &mut [ChannelScan],
    global: &mut GlobalScan,
) -> bool {
    let mut halted = false;
    // Forward playback applies channels left to right and effect columns
    // left to right, with the last write winning; the backward first-write
    // rule must therefore visit both in reverse.
    for channel in (0..channels.len()).rev() {
        let Some(note) = view.note(channel, frame, row) else {
            continue;
        };
        let scan = &mut channels[channel];
        let columns = view.effect_columns(channel);
        for fx in note.effects[..columns].iter().rev() {
            match fx.kind {
                EffectKind::None => {}
                EffectKind::Halt => halted = true,
                EffectKind::Speed => {
                    if !global.speed_source_found || global.tempo.is_none() {
                        match split_speed(fx.param, module.speed_split_point()) {
                            SpeedParam::Speed(speed) => {
                                if !global.speed_source_found {
                                    global.speed = Some(speed);
                                    global.speed_source_found = true;
                                }
                            }
                            SpeedParam::Tempo(tempo) => {
                                if global.tempo.is_none() {
                                    global.tempo = Some(tempo);
                                }
                            }
                        }
                    }
                }
                EffectKind::Groove => {
                    if !global.speed_source_found && module.has_groove(fx.param as usize) {
                        let len = module
                            .groove(fx.param as usize)
                            .map_or(1, |g| g.len().max(1));
                        // The groove starts at step 0 on its own row.
                        global.groove = Some((fx.param, distance % len));
                        global.speed_source_found = true;
                    }
                }
                kind if kind.is_channel_state() => {
                    let cell = &mut scan.state.effects[kind as usize];
                    if cell.is_none() {
                        *cell = Some(fx.param);
                    }
                }
                kind if kind.is_transposing() => {
                    scan.add_transpose(fx.transpose_amount());
                }
                _ => {}
            }
        }
        scan.volume(note);
        scan.note(note);
    }
    halted
}

const NOTE_NAMES: [&str; 12] = [
    "C-", "C#", "D-", "D#", "E-", "F-", "F#", "G-", "G#", "A-", "A#", "B-",
];

fn write_note(f: &mut fmt::Formatter<'_>, value: u8) -> fmt::Result {
    write!(f, "{}{}", NOTE_NAMES[(value % 12) as usize], value / 12)
}

impl fmt::Display for SongState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.groove {
            Some(index) => write!(f, "groove {:02X}+{}", index, self.groove_step)?,
            None => write!(f, "speed {}", self.speed)?,
        }
        writeln!(f, ", tempo {}", self.tempo)?;
        for channel in &self.channels {
            write!(f, "{:?}:{} ", channel.id.chip, channel.id.subindex)?;
            match channel.note {
                Some(ActiveNote::Note(value)) => write_note(f, value)?,
                Some(ActiveNote::Cut) => write!(f, "---")?,
                Some(ActiveNote::Release) => write!(f, "===")?,
                None => write!(f, "...")?,
            }
            if let Some(instrument) = channel.instrument {
                write!(f, " i{:02X}", instrument)?;
            }
            if let Some(volume) = channel.volume {
                write!(f, " v{:X}", volume)?;
            }
            for kind in EffectKind::ALL {
                if let Some(param) = channel.effect(kind) {
                    write!(f, " {}{:02X}", kind.code(), param)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_ir::{ChannelOrder, Effect, Groove, APU_PULSE1, APU_PULSE2};

    fn module_with_song(frames: usize, pattern_length: usize) -> Module {
        let order = ChannelOrder::with_channels(&[APU_PULSE1, APU_PULSE2]);
        let mut module = Module::new(order);
        let song = module.song_mut(0).unwrap();
        song.set_pattern_length(pattern_length);
        song.set_frame_count(frames);
        module
    }

    fn put(module: &mut Module, channel: usize, frame: usize, row: usize, note: Note) {
        let mut view = module.song_view_mut(0).unwrap();
        view.set_note(channel, frame, row, note);
    }

    fn note_with_fx(kind: EffectKind, param: u8) -> Note {
        let mut note = Note::empty();
        note.effects[0] = Effect::new(kind, param);
        note
    }

    #[test]
    fn most_recent_note_instrument_volume_win() {
        let mut module = module_with_song(1, 16);
        let mut early = Note::note_on(0, 3);
        early.instrument = 1;
        early.volume = 9;
        put(&mut module, 0, 0, 2, early);
        let mut late = Note::note_on(4, 3);
        late.instrument = 2;
        put(&mut module, 0, 0, 5, late);

        let state = SongState::retrieve(&module, 0, 0, 10).unwrap();
        let pulse1 = state.channel(0).unwrap();
        assert_eq!(pulse1.note, Some(ActiveNote::Note(40)));
        assert_eq!(pulse1.instrument, Some(2));
        // Volume only appears on the earlier row.
        assert_eq!(pulse1.volume, Some(9));
        // The other channel saw nothing.
        assert_eq!(state.channel(1).unwrap().note, None);
    }

    #[test]
    fn effect_table_is_first_write_wins() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 1, note_with_fx(EffectKind::Vibrato, 0x11));
        put(&mut module, 0, 0, 4, note_with_fx(EffectKind::Vibrato, 0x47));
        put(&mut module, 0, 0, 6, note_with_fx(EffectKind::DutyCycle, 2));

        let state = SongState::retrieve(&module, 0, 0, 8).unwrap();
        let pulse1 = state.channel(0).unwrap();
        assert_eq!(pulse1.effect(EffectKind::Vibrato), Some(0x47));
        assert_eq!(pulse1.effect(EffectKind::DutyCycle), Some(2));
        assert_eq!(pulse1.effect(EffectKind::Tremolo), None);
    }

    #[test]
    fn rows_after_position_are_invisible() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 9, note_with_fx(EffectKind::Vibrato, 0x33));
        let state = SongState::retrieve(&module, 0, 0, 8).unwrap();
        assert_eq!(state.channel(0).unwrap().effect(EffectKind::Vibrato), None);
    }

    #[test]
    fn scan_crosses_frame_boundaries() {
        let mut module = module_with_song(3, 4);
        {
            let song = module.song_mut(0).unwrap();
            for frame in 0..3 {
                song.track_mut(APU_PULSE1)
                    .unwrap()
                    .set_frame_pattern(frame, frame as u8);
            }
        }
        let mut note = Note::note_on(7, 2);
        note.instrument = 3;
        put(&mut module, 0, 0, 2, note);

        let state = SongState::retrieve(&module, 0, 2, 1).unwrap();
        let pulse1 = state.channel(0).unwrap();
        assert_eq!(pulse1.note, Some(ActiveNote::Note(31)));
        assert_eq!(pulse1.instrument, Some(3));
    }

    #[test]
    fn halt_is_a_state_boundary() {
        let mut module = module_with_song(1, 16);
        let mut old = Note::note_on(0, 4);
        old.instrument = 7;
        put(&mut module, 0, 0, 1, old);
        put(&mut module, 1, 0, 3, note_with_fx(EffectKind::Halt, 0));

        let state = SongState::retrieve(&module, 0, 0, 10).unwrap();
        // The note before the halt boundary is not playing any more.
        assert_eq!(state.channel(0).unwrap().note, None);
        assert_eq!(state.channel(0).unwrap().instrument, None);
    }

    #[test]
    fn speed_param_routes_by_split_point() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 1, note_with_fx(EffectKind::Speed, 4));
        put(&mut module, 1, 0, 2, note_with_fx(EffectKind::Speed, 180));

        let state = SongState::retrieve(&module, 0, 0, 10).unwrap();
        assert_eq!(state.speed, 4);
        assert_eq!(state.tempo, 180);
        assert_eq!(state.groove, None);
    }

    #[test]
    fn groove_effect_resets_step() {
        let mut module = module_with_song(1, 16);
        module.set_groove(2, Some(Groove::from_slice(&[8, 4, 2])));
        put(&mut module, 0, 0, 3, note_with_fx(EffectKind::Groove, 2));

        // Target is 7 rows past the Oxx row: step = 7 % 3.
        let state = SongState::retrieve(&module, 0, 0, 10).unwrap();
        assert_eq!(state.groove, Some(2));
        assert_eq!(state.groove_step, 1);
    }

    #[test]
    fn groove_effect_with_unknown_index_is_ignored() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 3, note_with_fx(EffectKind::Groove, 9));
        let state = SongState::retrieve(&module, 0, 0, 10).unwrap();
        assert_eq!(state.groove, None);
        assert_eq!(state.speed, 6);
    }

    #[test]
    fn song_level_groove_counts_from_origin() {
        let mut module = module_with_song(1, 16);
        module.set_groove(0, Some(Groove::from_slice(&[7, 5])));
        {
            let song = module.song_mut(0).unwrap();
            song.uses_groove = true;
            song.speed = 0; // groove index
        }
        let state = SongState::retrieve(&module, 0, 0, 5).unwrap();
        assert_eq!(state.groove, Some(0));
        assert_eq!(state.groove_step, 1);
    }

    #[test]
    fn echo_ring_collects_recent_notes() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 0, Note::note_on(0, 4)); // 48
        put(&mut module, 0, 0, 2, Note::note_on(2, 4)); // 50
        put(&mut module, 0, 0, 4, Note::note_on(4, 4)); // 52
        put(&mut module, 0, 0, 6, Note::note_on(5, 4)); // 53

        let state = SongState::retrieve(&module, 0, 0, 8).unwrap();
        let echo = state.channel(0).unwrap().echo;
        assert_eq!(echo, [Some(53), Some(52), Some(50), Some(48)]);
    }

    #[test]
    fn echo_note_resolves_through_alias() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 0, Note::note_on(0, 4)); // 48
        put(&mut module, 0, 0, 2, Note::note_on(4, 4)); // 52
        let mut echo = Note::empty();
        echo.pitch = Pitch::Echo;
        echo.octave = 2; // two entries back: the note 48
        put(&mut module, 0, 0, 4, echo);

        let state = SongState::retrieve(&module, 0, 0, 6).unwrap();
        let pulse1 = state.channel(0).unwrap();
        assert_eq!(pulse1.note, Some(ActiveNote::Note(48)));
        assert_eq!(pulse1.echo[0], Some(48));
        assert_eq!(pulse1.echo[1], Some(52));
        assert_eq!(pulse1.echo[2], Some(48));
    }

    #[test]
    fn slide_after_echo_row_is_counted_once() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 0, Note::note_on(0, 4)); // 48
        let mut echo = Note::empty();
        echo.pitch = Pitch::Echo;
        echo.octave = 1;
        put(&mut module, 0, 0, 2, echo);
        put(&mut module, 0, 0, 4, note_with_fx(EffectKind::SlideUp, 0x12));

        // The slide moves both the original note and its echo by two
        // semitones; the echoed note must not shift twice.
        let state = SongState::retrieve(&module, 0, 0, 6).unwrap();
        let pulse1 = state.channel(0).unwrap();
        assert_eq!(pulse1.note, Some(ActiveNote::Note(50)));
        assert_eq!(pulse1.echo[0], Some(50));
        assert_eq!(pulse1.echo[1], Some(50));
    }

    #[test]
    fn slides_transpose_older_echo_entries() {
        let mut module = module_with_song(1, 16);
        put(&mut module, 0, 0, 0, Note::note_on(0, 4)); // 48
        // Slide up 2 semitones, after the note.
        put(&mut module, 0, 0, 2, note_with_fx(EffectKind::SlideUp, 0x12));
        put(&mut module, 0, 0, 4, Note::note_on(7, 4)); // 55, after the slide

        let state = SongState::retrieve(&module, 0, 0, 6).unwrap();
        let echo = state.channel(0).unwrap().echo;
        assert_eq!(echo[0], Some(55));
        assert_eq!(echo[1], Some(50)); // 48 + 2
    }

    #[test]
    fn self_referential_echo_terminates() {
        let mut module = module_with_song(1, 16);
        let mut echo = Note::empty();
        echo.pitch = Pitch::Echo;
        echo.octave = 0; // would self-reference; reads as offset 1
        put(&mut module, 0, 0, 0, echo);

        let state = SongState::retrieve(&module, 0, 0, 4).unwrap();
        // Nothing further back to alias to.
        assert_eq!(state.channel(0).unwrap().echo[0], None);
        assert_eq!(state.channel(0).unwrap().note, None);
    }

    #[test]
    fn matches_forward_simulation_without_control_flow() {
        let mut module = module_with_song(2, 8);
        // A little melody with state changes sprinkled in.
        let mut rows: Vec<(usize, usize, usize, Note)> = Vec::new();
        let mut n1 = Note::note_on(0, 3);
        n1.instrument = 1;
        n1.volume = 10;
        rows.push((0, 0, 0, n1));
        rows.push((0, 0, 3, note_with_fx(EffectKind::Vibrato, 0x24)));
        let mut n2 = Note::note_on(7, 3);
        n2.instrument = 2;
        rows.push((0, 0, 6, n2));
        rows.push((1, 0, 2, note_with_fx(EffectKind::DutyCycle, 1)));
        rows.push((0, 1, 1, note_with_fx(EffectKind::Speed, 3)));
        let mut n3 = Note::note_on(2, 4);
        n3.volume = 5;
        rows.push((1, 1, 2, n3));
        for &(channel, frame, row, note) in &rows {
            put(&mut module, channel, frame, row, note);
        }

        // Forward-simulate to (frame 1, row 4).
        let mut fwd_note = [None::<ActiveNote>; 2];
        let mut fwd_inst = [None::<u8>; 2];
        let mut fwd_vol = [None::<u8>; 2];
        let mut fwd_fx = [[None::<u8>; EffectKind::COUNT]; 2];
        let mut fwd_speed = None::<u8>;
        let view = module.song_view(0).unwrap();
        for (frame, row) in (0..8).map(|r| (0, r)).chain((0..=4).map(|r| (1, r))) {
            for channel in 0..2 {
                let note = view.note(channel, frame, row).unwrap();
                if let Some(value) = note.value() {
                    fwd_note[channel] = Some(ActiveNote::Note(value));
                }
                if note.has_instrument() {
                    fwd_inst[channel] = Some(note.instrument);
                }
                if note.has_volume() {
                    fwd_vol[channel] = Some(note.volume);
                }
                for fx in note.effects {
                    if fx.kind.is_channel_state() {
                        fwd_fx[channel][fx.kind as usize] = Some(fx.param);
                    } else if fx.kind == EffectKind::Speed {
                        fwd_speed = Some(fx.param);
                    }
                }
            }
        }

        let state = SongState::retrieve(&module, 0, 1, 4).unwrap();
        for channel in 0..2 {
            let reconstructed = state.channel(channel).unwrap();
            assert_eq!(reconstructed.note, fwd_note[channel], "channel {}", channel);
            assert_eq!(reconstructed.instrument, fwd_inst[channel]);
            assert_eq!(reconstructed.volume, fwd_vol[channel]);
            assert_eq!(reconstructed.effects, fwd_fx[channel]);
        }
        assert_eq!(Some(state.speed), fwd_speed);
    }

    #[test]
    fn display_renders_without_panicking() {
        let mut module = module_with_song(1, 8);
        let mut note = Note::note_on(9, 4);
        note.instrument = 0;
        note.volume = 15;
        put(&mut module, 0, 0, 0, note);
        let state = SongState::retrieve(&module, 0, 0, 4).unwrap();
        let rendered = alloc::format!("{}", state);
        assert!(rendered.contains("A-4"));
        assert!(rendered.contains("speed 6"));
    }
}
