//! Segment descriptors and cursor selectors.
//!
//! The occupied region of a [`RollingBuffer`](crate::RollingBuffer) is at most
//! two contiguous runs over one backing array. Each run lives in a *slot*; a
//! slot either holds a [`Span`] or is unanchored. Two independent
//! [`Selector`]s pick the slot the next read drains and the slot the next
//! write appends to.
//!
//! Per slot the lifecycle is
//!
//! ```text
//! Unanchored -> Filling -> Saturated -> Draining -> Empty -> Unanchored
//! ```
//!
//! This is the path of a slot written to the array end before it is read.
//! Reads may also consume a slot's front while it is still filling; see
//! [`SlotState`] for how such slots are reported.
//!
//! A slot is only ever re-anchored at offset zero, and only once it is
//! unanchored or has been drained at the array end. A slot that empties
//! before reaching the array end keeps its anchor so the writer can keep
//! appending where it left off.

use core::ops::Range;

/// Half-open range `[start, end)` of live bytes in the backing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Span {
    /// A fresh, empty span anchored at the start of the array.
    pub(crate) const ANCHOR: Span = Span { start: 0, end: 0 };

    #[inline]
    pub(crate) fn len(self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub(crate) fn is_empty(self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub(crate) fn range(self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether two non-empty spans share any index.
    pub(crate) fn overlaps(self, other: Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

/// Which of the two slots a cursor currently targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Selector {
    #[default]
    A,
    B,
}

impl Selector {
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            Selector::A => 0,
            Selector::B => 1,
        }
    }

    #[inline]
    #[must_use]
    pub(crate) fn flip(self) -> Self {
        match self {
            Selector::A => Selector::B,
            Selector::B => Selector::A,
        }
    }
}

/// Observable state of one slot.
///
/// Classified from the slot's current span alone. Whether a slot can still
/// grow (its end is below the array end) takes precedence over whether its
/// front has been consumed, so a slot being read while it is still the write
/// target reports [`Filling`](SlotState::Filling). Once the end reaches the
/// array end, the front offset separates
/// [`Saturated`](SlotState::Saturated) from
/// [`Draining`](SlotState::Draining); unreading back to offset zero therefore
/// reports `Saturated` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No anchor; the next write into this slot starts at offset zero.
    Unanchored,
    /// Holds bytes and ends below the array end, so it can still grow. Its
    /// front may already have been consumed.
    Filling,
    /// Reaches the array end and its front is at offset zero.
    Saturated,
    /// Reaches the array end and its front is past offset zero.
    Draining,
    /// Anchored but holding no bytes.
    Empty,
}

impl SlotState {
    pub(crate) fn of(slot: Option<Span>, capacity: usize) -> Self {
        match slot {
            None => SlotState::Unanchored,
            Some(span) if span.is_empty() => SlotState::Empty,
            Some(span) if span.end < capacity => SlotState::Filling,
            Some(Span { start: 0, .. }) => SlotState::Saturated,
            Some(_) => SlotState::Draining,
        }
    }
}
