//! Half-open instruction offset ranges.

use std::fmt;

/// A half-open range `[start, end)` of instruction offsets in a finalized method body.
///
/// Scopes, local live ranges, flow nodes and iterator-local buckets all describe code this way.
/// An empty range (`start >= end`) never covers any offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OffsetRange {
    /// First offset covered by the range
    pub start: u32,
    /// First offset after the range
    pub end: u32,
}

impl OffsetRange {
    /// Creates the range `[start, end)`.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        OffsetRange { start, end }
    }

    /// Number of offsets covered.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range covers no offset.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns `true` if `offset` lies in `[start, end)`.
    #[must_use]
    pub const fn contains(&self, offset: u32) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    ///
    /// An empty range is contained in every range.
    #[must_use]
    pub const fn contains_range(&self, other: &OffsetRange) -> bool {
        other.is_empty() || (other.start >= self.start && other.end <= self.end)
    }

    /// Returns `true` if the two ranges share at least one offset.
    #[must_use]
    pub const fn overlaps(&self, other: &OffsetRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// The offsets covered by both ranges, or `None` if they are disjoint.
    #[must_use]
    pub fn intersect(&self, other: &OffsetRange) -> Option<OffsetRange> {
        let range = OffsetRange::new(self.start.max(other.start), self.end.min(other.end));
        (!range.is_empty()).then_some(range)
    }

    /// The smallest range covering both inputs. Empty inputs are ignored.
    #[must_use]
    pub fn hull(&self, other: &OffsetRange) -> OffsetRange {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => *other,
            (_, true) => *self,
            _ => OffsetRange::new(self.start.min(other.start), self.end.max(other.end)),
        }
    }

    /// Hull of `self` clipped to every range in `reachable`, or `None` if nothing survives.
    #[must_use]
    pub fn clip_to(&self, reachable: &[OffsetRange]) -> Option<OffsetRange> {
        reachable
            .iter()
            .filter_map(|r| self.intersect(r))
            .reduce(|acc, r| acc.hull(&r))
    }
}

impl fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#06x}, {:#06x})", self.start, self.end)
    }
}
