//! Speed/tempo parameter routing and row timing.

/// Interpretation of an `Fxx` parameter byte, which carries either a
/// speed or a tempo depending on the module's split point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeedParam {
    /// Ticks per row
    Speed(u8),
    /// Tempo in BPM-like units (150 = one tick per engine frame)
    Tempo(u8),
}

/// Route an `Fxx` parameter: values at or above the split point are
/// tempos, values below are speeds.
pub fn split_speed(param: u8, split: u8) -> SpeedParam {
    if param >= split {
        SpeedParam::Tempo(param)
    } else {
        SpeedParam::Speed(param)
    }
}

/// Seconds one row occupies.
///
/// At tempo 150 a row lasts exactly `speed` engine frames; other tempos
/// scale the tick rate proportionally. Tempo 0 selects fixed-rate mode,
/// where a row always lasts `speed` frames.
pub fn row_seconds(speed: u8, tempo: u8, frame_rate: f64) -> f64 {
    if tempo == 0 {
        return speed as f64 / frame_rate;
    }
    speed as f64 * 150.0 / (tempo as f64 * frame_rate)
}
