//! Hardware timing constants.
//!
//! The playback layer needs the console's tick rate to convert row counts
//! to seconds; the export layer additionally reads the DMC period tables.

/// DMC sample-rate period table, NTSC, indexed by rate `0..16`.
pub const DMC_PERIODS_NTSC: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// DMC sample-rate period table, PAL.
pub const DMC_PERIODS_PAL: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];

/// Target console region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Machine {
    #[default]
    Ntsc,
    Pal,
}

impl Machine {
    /// Engine ticks per second (the PPU vblank rate).
    pub const fn frame_rate(self) -> f64 {
        match self {
            Machine::Ntsc => 60.0988,
            Machine::Pal => 50.0070,
        }
    }

    /// CPU clock in Hz.
    pub const fn cpu_rate(self) -> u32 {
        match self {
            Machine::Ntsc => 1_789_773,
            Machine::Pal => 1_662_607,
        }
    }

    pub const fn dmc_periods(self) -> &'static [u16; 16] {
        match self {
            Machine::Ntsc => &DMC_PERIODS_NTSC,
            Machine::Pal => &DMC_PERIODS_PAL,
        }
    }
}
