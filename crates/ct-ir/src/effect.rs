//! Effect commands for pattern rows.
//!
//! Effects are a compact (kind, parameter-byte) pair rather than a payload
//! enum: every command takes exactly one byte of argument, and rows carry
//! up to four command slots.

/// Maximum effect command slots per row.
pub const MAX_EFFECT_COLUMNS: usize = 4;

/// Effect command kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum EffectKind {
    /// Empty slot
    #[default]
    None = 0,
    /// Fxx: set speed (param < split point) or tempo (param >= split point)
    Speed,
    /// Bxx: jump to frame
    Jump,
    /// Dxx: skip to row xx of the next frame
    Skip,
    /// Cxx: halt the song
    Halt,
    /// Exx: set channel volume
    Volume,
    /// 3xx: tone portamento
    Portamento,
    /// 1xx: portamento up
    PortaUp,
    /// 2xx: portamento down
    PortaDown,
    /// 0xy: arpeggio
    Arpeggio,
    /// 4xy: vibrato
    Vibrato,
    /// 7xy: tremolo
    Tremolo,
    /// Pxx: fine pitch offset
    Pitch,
    /// Gxx: delay note start by xx ticks
    Delay,
    /// Vxx: duty cycle / waveform select
    DutyCycle,
    /// Qxy: slide up y semitones
    SlideUp,
    /// Rxy: slide down y semitones
    SlideDown,
    /// Axy: volume slide
    VolumeSlide,
    /// Sxx: cut note after xx ticks
    NoteCut,
    /// Lxx: delayed note release
    NoteRelease,
    /// Oxx: switch to groove xx
    Groove,
    /// Txy: delayed transpose by y semitones (bit 7 of param = down)
    Transpose,
    /// Yxx: DPCM sample offset
    SampleOffset,
    /// Zxx: DPCM delta counter
    Dac,
    /// Xxx: DPCM retrigger
    Retrigger,
}

impl EffectKind {
    /// Number of kinds, including `None`.
    pub const COUNT: usize = 25;

    /// All kinds, indexed by discriminant.
    pub const ALL: [EffectKind; Self::COUNT] = [
        EffectKind::None,
        EffectKind::Speed,
        EffectKind::Jump,
        EffectKind::Skip,
        EffectKind::Halt,
        EffectKind::Volume,
        EffectKind::Portamento,
        EffectKind::PortaUp,
        EffectKind::PortaDown,
        EffectKind::Arpeggio,
        EffectKind::Vibrato,
        EffectKind::Tremolo,
        EffectKind::Pitch,
        EffectKind::Delay,
        EffectKind::DutyCycle,
        EffectKind::SlideUp,
        EffectKind::SlideDown,
        EffectKind::VolumeSlide,
        EffectKind::NoteCut,
        EffectKind::NoteRelease,
        EffectKind::Groove,
        EffectKind::Transpose,
        EffectKind::SampleOffset,
        EffectKind::Dac,
        EffectKind::Retrigger,
    ];

    /// The effect-column letter used in pattern displays.
    pub fn code(self) -> char {
        match self {
            EffectKind::None => '.',
            EffectKind::Speed => 'F',
            EffectKind::Jump => 'B',
            EffectKind::Skip => 'D',
            EffectKind::Halt => 'C',
            EffectKind::Volume => 'E',
            EffectKind::Portamento => '3',
            EffectKind::PortaUp => '1',
            EffectKind::PortaDown => '2',
            EffectKind::Arpeggio => '0',
            EffectKind::Vibrato => '4',
            EffectKind::Tremolo => '7',
            EffectKind::Pitch => 'P',
            EffectKind::Delay => 'G',
            EffectKind::DutyCycle => 'V',
            EffectKind::SlideUp => 'Q',
            EffectKind::SlideDown => 'R',
            EffectKind::VolumeSlide => 'A',
            EffectKind::NoteCut => 'S',
            EffectKind::NoteRelease => 'L',
            EffectKind::Groove => 'O',
            EffectKind::Transpose => 'T',
            EffectKind::SampleOffset => 'Y',
            EffectKind::Dac => 'Z',
            EffectKind::Retrigger => 'X',
        }
    }

    /// Inverse of [`code`](Self::code). `None` has no letter.
    pub fn from_code(code: char) -> Option<EffectKind> {
        EffectKind::ALL[1..].iter().copied().find(|k| k.code() == code)
    }

    /// Kind from its discriminant byte.
    pub fn from_u8(byte: u8) -> Option<EffectKind> {
        Self::ALL.get(byte as usize).copied()
    }

    /// True for kinds whose most recent parameter is part of a channel's
    /// persistent play-state (snapshotted by state reconstruction).
    pub fn is_channel_state(self) -> bool {
        matches!(
            self,
            EffectKind::DutyCycle
                | EffectKind::Vibrato
                | EffectKind::Tremolo
                | EffectKind::VolumeSlide
                | EffectKind::Pitch
                | EffectKind::SampleOffset
                | EffectKind::Dac
        )
    }

    /// True for kinds that transpose the sounding note, and therefore
    /// accumulate into the echo-buffer history.
    pub fn is_transposing(self) -> bool {
        matches!(
            self,
            EffectKind::SlideUp | EffectKind::SlideDown | EffectKind::Transpose
        )
    }
}

/// One effect command slot: a kind plus its parameter byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Effect {
    pub kind: EffectKind,
    pub param: u8,
}

impl Effect {
    /// The empty slot.
    pub const EMPTY: Effect = Effect {
        kind: EffectKind::None,
        param: 0,
    };

    pub const fn new(kind: EffectKind, param: u8) -> Self {
        Self { kind, param }
    }

    pub fn is_empty(self) -> bool {
        self.kind == EffectKind::None
    }

    /// Semitone offset this command applies to the sounding note.
    /// Zero for non-transposing kinds.
    pub fn transpose_amount(self) -> i32 {
        let amount = (self.param & 0x0F) as i32;
        match self.kind {
            EffectKind::SlideUp => amount,
            EffectKind::SlideDown => -amount,
            EffectKind::Transpose => {
                if self.param & 0x80 != 0 {
                    -amount
                } else {
                    amount
                }
            }
            _ => 0,
        }
    }
}
