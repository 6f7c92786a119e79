//! Realtime playback position state machine.

use ct_ir::{normalize_frame, SongView};

/// Tracks where the sound engine is in a song and applies the control-flow
/// semantics of jump/skip/halt plus externally queued frames and frame
/// looping.
///
/// There are no failure states: every input is clamped into the song's
/// bounds. The cursor never touches song data; the driver reads rows and
/// feeds the relevant effects back in.
#[derive(Clone, Debug, Default)]
pub struct PlayerCursor {
    song_index: usize,
    frame: usize,
    row: usize,
    tick: u32,
    total_frames: u32,
    total_rows: u32,
    total_ticks: u64,
    queued_frame: Option<usize>,
    loop_frame: bool,
}

impl PlayerCursor {
    /// A cursor at the start of a song.
    pub fn new(song_index: usize) -> Self {
        Self {
            song_index,
            ..Self::default()
        }
    }

    /// A cursor at an arbitrary position.
    pub fn at(song_index: usize, frame: usize, row: usize) -> Self {
        Self {
            song_index,
            frame,
            row,
            ..Self::default()
        }
    }

    pub fn song_index(&self) -> usize {
        self.song_index
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Sub-row tick within the current row.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn total_rows(&self) -> u32 {
        self.total_rows
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn queued_frame(&self) -> Option<usize> {
        self.queued_frame
    }

    pub fn is_frame_loop_enabled(&self) -> bool {
        self.loop_frame
    }

    /// Advance one engine tick within the current row.
    pub fn step_tick(&mut self) {
        self.tick += 1;
        self.total_ticks += 1;
    }

    /// Advance one row, moving to the next frame past the pattern end.
    pub fn step_row(&mut self, view: &SongView) {
        self.tick = 0;
        self.row += 1;
        self.total_rows += 1;
        if self.row >= view.frame_length(self.frame) {
            self.row = 0;
            self.move_to_checked_frame(self.frame as isize + 1, view);
        }
    }

    /// Move to the next frame, resolving overrides by priority: a queued
    /// frame (consumed here) beats the frame-loop flag, which beats the
    /// naturally computed target.
    pub fn move_to_checked_frame(&mut self, next: isize, view: &SongView) {
        let next = match self.queued_frame.take() {
            Some(queued) => queued as isize,
            None if self.loop_frame => self.frame as isize,
            None => next,
        };
        self.frame = normalize_frame(next, view.frame_count());
        self.total_frames += 1;
    }

    /// Jump effect: move to `frame` (clamped), row 0, immediately.
    pub fn do_bxx(&mut self, frame: usize, view: &SongView) {
        self.frame = frame.min(view.frame_count() - 1);
        self.row = 0;
        self.tick = 0;
        self.total_frames += 1;
    }

    /// Skip effect: advance a frame through the checked path, then land on
    /// `row` (clamped to the new frame's length).
    pub fn do_dxx(&mut self, row: usize, view: &SongView) {
        self.move_to_checked_frame(self.frame as isize + 1, view);
        self.row = row.min(view.frame_length(self.frame) - 1);
        self.tick = 0;
    }

    /// Halt effect: bookkeeping only; stopping the transport is the
    /// caller's job.
    pub fn do_cxx(&mut self) {
        self.total_frames += 1;
    }

    /// Request that the next frame transition lands on `frame`.
    pub fn queue_frame(&mut self, frame: usize) {
        self.queued_frame = Some(frame);
    }

    pub fn clear_queued_frame(&mut self) {
        self.queued_frame = None;
    }

    pub fn set_frame_loop(&mut self, enabled: bool) {
        self.loop_frame = enabled;
    }

    /// Enable looping of the current frame.
    pub fn enable_frame_loop(&mut self) {
        self.loop_frame = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_ir::{ChannelOrder, Song, APU_PULSE1};

    fn make_song(frames: usize, pattern_length: usize) -> (ChannelOrder, Song) {
        let order = ChannelOrder::with_channels(&[APU_PULSE1]);
        let mut song = Song::new("player", &order, pattern_length);
        song.set_frame_count(frames);
        (order, song)
    }

    #[test]
    fn step_row_crosses_frame_boundary() {
        let (order, song) = make_song(2, 4);
        let view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::new(0);

        for _ in 0..4 {
            cursor.step_row(&view);
        }
        assert_eq!((cursor.frame(), cursor.row()), (1, 0));
        assert_eq!(cursor.total_rows(), 4);
        assert_eq!(cursor.total_frames(), 1);
    }

    #[test]
    fn step_row_wraps_last_frame() {
        let (order, song) = make_song(2, 2);
        let view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::at(0, 1, 1);
        cursor.step_row(&view);
        assert_eq!((cursor.frame(), cursor.row()), (0, 0));
    }

    #[test]
    fn ticks_reset_per_row() {
        let (order, song) = make_song(1, 4);
        let view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::new(0);
        cursor.step_tick();
        cursor.step_tick();
        assert_eq!(cursor.tick(), 2);
        cursor.step_row(&view);
        assert_eq!(cursor.tick(), 0);
        assert_eq!(cursor.total_ticks(), 2);
    }

    #[test]
    fn queued_frame_overrides_loop_and_natural() {
        let (order, song) = make_song(4, 1);
        let view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::new(0);
        cursor.enable_frame_loop();
        cursor.queue_frame(3);

        cursor.step_row(&view);
        assert_eq!(cursor.frame(), 3);
        assert_eq!(cursor.queued_frame(), None);

        // Queued frame consumed; the loop flag now holds the frame.
        cursor.step_row(&view);
        assert_eq!(cursor.frame(), 3);

        cursor.set_frame_loop(false);
        cursor.step_row(&view);
        assert_eq!(cursor.frame(), 0);
    }

    #[test]
    fn bxx_clamps_and_resets_row() {
        let (order, song) = make_song(3, 4);
        let view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::at(0, 1, 2);
        cursor.do_bxx(200, &view);
        assert_eq!((cursor.frame(), cursor.row()), (2, 0));
    }

    #[test]
    fn dxx_moves_to_next_frame_at_row() {
        let (order, song) = make_song(3, 4);
        let view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::at(0, 0, 1);
        cursor.do_dxx(2, &view);
        assert_eq!((cursor.frame(), cursor.row()), (1, 2));

        // Target row beyond the pattern clamps to the last row.
        let mut cursor = PlayerCursor::at(0, 0, 0);
        cursor.do_dxx(99, &view);
        assert_eq!((cursor.frame(), cursor.row()), (1, 3));
    }

    #[test]
    fn dxx_honors_queued_frame() {
        let (order, song) = make_song(3, 4);
        let view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::new(0);
        cursor.queue_frame(2);
        cursor.do_dxx(1, &view);
        assert_eq!((cursor.frame(), cursor.row()), (2, 1));
    }

    #[test]
    fn cxx_only_counts_frames() {
        let (order, song) = make_song(2, 4);
        let _view = SongView::new(&order, &song);
        let mut cursor = PlayerCursor::at(0, 1, 3);
        cursor.do_cxx();
        assert_eq!((cursor.frame(), cursor.row()), (1, 3));
        assert_eq!(cursor.total_frames(), 1);
    }
}
