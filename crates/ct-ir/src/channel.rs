//! Channel identity and ordering.
//!
//! A [`ChannelId`] names a channel by hardware identity (chip + sub-index)
//! and never changes as channels are added or removed. A [`ChannelOrder`]
//! assigns each known id a contiguous slot index, which is what UI and
//! playback code address channels by.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Sound chip a channel belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chip {
    /// 2A03 APU
    Apu,
    Vrc6,
    Vrc7,
    Fds,
    Mmc5,
    N163,
    S5b,
}

/// Identity of a channel: chip plus sub-index within that chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelId {
    pub chip: Chip,
    pub subindex: u8,
}

impl ChannelId {
    pub const fn new(chip: Chip, subindex: u8) -> Self {
        Self { chip, subindex }
    }
}

pub const APU_PULSE1: ChannelId = ChannelId::new(Chip::Apu, 0);
pub const APU_PULSE2: ChannelId = ChannelId::new(Chip::Apu, 1);
pub const APU_TRIANGLE: ChannelId = ChannelId::new(Chip::Apu, 2);
pub const APU_NOISE: ChannelId = ChannelId::new(Chip::Apu, 3);
pub const APU_DPCM: ChannelId = ChannelId::new(Chip::Apu, 4);

/// Internal sound-engine priority: 2A03 melodic channels, then expansion
/// chips in register-write order, DPCM last.
const BUILT_IN_PRIORITY: &[(Chip, u8)] = &[
    (Chip::Apu, 4),
    (Chip::Vrc6, 3),
    (Chip::Mmc5, 2),
    (Chip::N163, 8),
    (Chip::Fds, 1),
    (Chip::Vrc7, 6),
    (Chip::S5b, 3),
];

/// Canonical NSF channel numbering: the full 2A03 block including DPCM,
/// then expansions in chip-id order.
const CANONICAL_PRIORITY: &[(Chip, u8)] = &[
    (Chip::Apu, 5),
    (Chip::Vrc6, 3),
    (Chip::Vrc7, 6),
    (Chip::Fds, 1),
    (Chip::Mmc5, 2),
    (Chip::N163, 8),
    (Chip::S5b, 3),
];

/// An ordered set of channels with a bidirectional id ↔ index mapping.
///
/// Invariant: the indices of all contained ids are contiguous `0..len()`;
/// removing an id shifts every higher index down by one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelOrder {
    order: Vec<ChannelId>,
    index: BTreeMap<ChannelId, usize>,
}

impl ChannelOrder {
    /// Create an empty order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an order containing the given channels, in the given order.
    /// Duplicates are ignored.
    pub fn with_channels(ids: &[ChannelId]) -> Self {
        let mut order = Self::new();
        for &id in ids {
            order.add_channel(id);
        }
        order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Append a channel if not already present. Returns false if present.
    pub fn add_channel(&mut self, id: ChannelId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.order.len());
        self.order.push(id);
        true
    }

    /// Remove a channel, shifting all higher slot indices down by one.
    /// Returns false if the channel was not present.
    pub fn remove_channel(&mut self, id: ChannelId) -> bool {
        let Some(removed) = self.index.remove(&id) else {
            return false;
        };
        self.order.remove(removed);
        for slot in self.index.values_mut() {
            if *slot > removed {
                *slot -= 1;
            }
        }
        true
    }

    /// The channel at a slot index, if in range.
    pub fn translate(&self, index: usize) -> Option<ChannelId> {
        self.order.get(index).copied()
    }

    /// The slot index of a channel, if present.
    pub fn index_of(&self, id: ChannelId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn has_channel(&self, id: ChannelId) -> bool {
        self.index.contains_key(&id)
    }

    /// Iterate over channels in slot order.
    pub fn iter(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.order.iter().copied()
    }

    /// Project onto the internal sound-engine priority order.
    ///
    /// Returns a new order containing exactly the channels present in
    /// `self`, reordered; `self` is not modified.
    pub fn built_in_order(&self) -> ChannelOrder {
        self.project(BUILT_IN_PRIORITY, Some(APU_DPCM))
    }

    /// Project onto the canonical NSF-export channel numbering.
    pub fn canonical_order(&self) -> ChannelOrder {
        self.project(CANONICAL_PRIORITY, None)
    }

    fn project(&self, priority: &[(Chip, u8)], last: Option<ChannelId>) -> ChannelOrder {
        let mut out = ChannelOrder::new();
        for &(chip, count) in priority {
            for sub in 0..count {
                let id = ChannelId::new(chip, sub);
                if self.has_channel(id) && Some(id) != last {
                    out.add_channel(id);
                }
            }
        }
        if let Some(id) = last {
            if self.has_channel(id) {
                out.add_channel(id);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_contiguous_indices() {
        let mut order = ChannelOrder::new();
        assert!(order.add_channel(APU_PULSE1));
        assert!(order.add_channel(APU_TRIANGLE));
        assert!(!order.add_channel(APU_PULSE1));

        assert_eq!(order.len(), 2);
        assert_eq!(order.index_of(APU_PULSE1), Some(0));
        assert_eq!(order.index_of(APU_TRIANGLE), Some(1));
        assert_eq!(order.translate(1), Some(APU_TRIANGLE));
        assert_eq!(order.translate(2), None);
    }

    #[test]
    fn remove_reindexes_higher_channels() {
        let mut order = ChannelOrder::with_channels(&[APU_PULSE1, APU_PULSE2]);
        assert!(order.remove_channel(APU_PULSE1));
        assert_eq!(order.index_of(APU_PULSE2), Some(0));
        assert_eq!(order.translate(0), Some(APU_PULSE2));
        assert!(!order.has_channel(APU_PULSE1));
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut order = ChannelOrder::with_channels(&[APU_PULSE1]);
        assert!(!order.remove_channel(APU_NOISE));
        assert_eq!(order.len(), 1);
    }

    #[test]
    fn built_in_order_puts_dpcm_last() {
        let order = ChannelOrder::with_channels(&[
            APU_PULSE1,
            APU_DPCM,
            ChannelId::new(Chip::Vrc6, 0),
            APU_NOISE,
        ]);
        let engine = order.built_in_order();
        let ids: Vec<ChannelId> = engine.iter().collect();
        assert_eq!(
            ids,
            [
                APU_PULSE1,
                APU_NOISE,
                ChannelId::new(Chip::Vrc6, 0),
                APU_DPCM
            ]
        );
        // Pure projection: the source order is untouched.
        assert_eq!(order.translate(1), Some(APU_DPCM));
    }

    #[test]
    fn canonical_order_keeps_dpcm_in_apu_block() {
        let order = ChannelOrder::with_channels(&[
            ChannelId::new(Chip::Vrc6, 1),
            APU_DPCM,
            APU_PULSE2,
        ]);
        let canonical = order.canonical_order();
        let ids: Vec<ChannelId> = canonical.iter().collect();
        assert_eq!(ids, [APU_PULSE2, APU_DPCM, ChannelId::new(Chip::Vrc6, 1)]);
    }

    #[test]
    fn projections_drop_nothing() {
        let order = ChannelOrder::with_channels(&[
            APU_PULSE1,
            APU_PULSE2,
            APU_TRIANGLE,
            APU_NOISE,
            APU_DPCM,
            ChannelId::new(Chip::S5b, 2),
            ChannelId::new(Chip::Fds, 0),
        ]);
        assert_eq!(order.built_in_order().len(), order.len());
        assert_eq!(order.canonical_order().len(), order.len());
    }
}
