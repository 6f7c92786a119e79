//! Index-based song access.
//!
//! A view binds a [`ChannelOrder`] to a [`Song`] so that callers address
//! channels by slot index rather than by identity. All cursor and playback
//! code works through views.

use crate::channel::{ChannelId, ChannelOrder};
use crate::note::Note;
use crate::pattern::Pattern;
use crate::song::Song;
use crate::track::Track;

/// Read-only view of a song through a channel order.
#[derive(Clone, Copy)]
pub struct SongView<'a> {
    order: &'a ChannelOrder,
    song: &'a Song,
}

impl<'a> SongView<'a> {
    pub fn new(order: &'a ChannelOrder, song: &'a Song) -> Self {
        Self { order, song }
    }

    pub fn song(&self) -> &'a Song {
        self.song
    }

    pub fn order(&self) -> &'a ChannelOrder {
        self.order
    }

    /// Number of channel slots.
    pub fn channels(&self) -> usize {
        self.order.len()
    }

    pub fn channel_id(&self, channel: usize) -> Option<ChannelId> {
        self.order.translate(channel)
    }

    pub fn track(&self, channel: usize) -> Option<&'a Track> {
        self.song.track(self.channel_id(channel)?)
    }

    pub fn pattern(&self, channel: usize, index: usize) -> Option<&'a Pattern> {
        Some(self.track(channel)?.pattern(index))
    }

    /// Pattern index assigned to a frame on a channel.
    pub fn pattern_index(&self, channel: usize, frame: usize) -> Option<u8> {
        Some(self.track(channel)?.frame_pattern(frame))
    }

    pub fn pattern_on_frame(&self, channel: usize, frame: usize) -> Option<&'a Pattern> {
        Some(self.track(channel)?.pattern_on_frame(frame))
    }

    pub fn note(&self, channel: usize, frame: usize, row: usize) -> Option<&'a Note> {
        Some(self.pattern_on_frame(channel, frame)?.note(row))
    }

    pub fn effect_columns(&self, channel: usize) -> usize {
        self.track(channel).map_or(0, Track::effect_columns)
    }

    pub fn frame_count(&self) -> usize {
        self.song.frame_count()
    }

    pub fn pattern_length(&self) -> usize {
        self.song.pattern_length()
    }

    /// Playable length of a frame, in rows. Currently uniform across
    /// frames; callers must not assume so.
    pub fn frame_length(&self, frame: usize) -> usize {
        debug_assert!(frame < self.frame_count());
        self.song.pattern_length()
    }
}

/// Mutable view of a song through a channel order.
pub struct SongViewMut<'a> {
    order: &'a ChannelOrder,
    song: &'a mut Song,
}

impl<'a> SongViewMut<'a> {
    pub fn new(order: &'a ChannelOrder, song: &'a mut Song) -> Self {
        Self { order, song }
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> SongView<'_> {
        SongView::new(self.order, self.song)
    }

    pub fn channels(&self) -> usize {
        self.order.len()
    }

    pub fn channel_id(&self, channel: usize) -> Option<ChannelId> {
        self.order.translate(channel)
    }

    pub fn track_mut(&mut self, channel: usize) -> Option<&mut Track> {
        self.song.track_mut(self.order.translate(channel)?)
    }

    pub fn set_pattern_index(&mut self, channel: usize, frame: usize, pattern: u8) {
        if let Some(track) = self.track_mut(channel) {
            track.set_frame_pattern(frame, pattern);
        }
    }

    pub fn note_mut(&mut self, channel: usize, frame: usize, row: usize) -> Option<&mut Note> {
        Some(
            self.track_mut(channel)?
                .pattern_on_frame_mut(frame)
                .note_mut(row),
        )
    }

    pub fn set_note(&mut self, channel: usize, frame: usize, row: usize, note: Note) {
        if let Some(slot) = self.note_mut(channel, frame, row) {
            *slot = note;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{APU_PULSE1, APU_PULSE2, APU_TRIANGLE};

    fn setup() -> (ChannelOrder, Song) {
        let order = ChannelOrder::with_channels(&[APU_PULSE1, APU_PULSE2]);
        let song = Song::new("view", &order, 16);
        (order, song)
    }

    #[test]
    fn index_access_translates_through_order() {
        let (order, mut song) = setup();
        song.track_mut(APU_PULSE2).unwrap().set_frame_pattern(0, 3);

        let view = SongView::new(&order, &song);
        assert_eq!(view.channels(), 2);
        assert_eq!(view.channel_id(1), Some(APU_PULSE2));
        assert_eq!(view.pattern_index(1, 0), Some(3));
        assert_eq!(view.pattern_index(2, 0), None);
    }

    #[test]
    fn missing_track_yields_none() {
        let (mut order, song) = setup();
        // A channel present in the order but absent from the song.
        order.add_channel(APU_TRIANGLE);
        let view = SongView::new(&order, &song);
        assert_eq!(view.channels(), 3);
        assert!(view.track(2).is_none());
        assert!(view.note(2, 0, 0).is_none());
        assert_eq!(view.effect_columns(2), 0);
    }

    #[test]
    fn mutation_through_view() {
        let (order, mut song) = setup();
        {
            let mut view = SongViewMut::new(&order, &mut song);
            view.set_note(0, 0, 5, Note::note_on(2, 3));
            view.set_pattern_index(1, 0, 7);
        }
        assert_eq!(
            song.pattern_on_frame(APU_PULSE1, 0).unwrap().note(5),
            &Note::note_on(2, 3)
        );
        assert_eq!(song.track(APU_PULSE2).unwrap().frame_pattern(0), 7);
    }
}
