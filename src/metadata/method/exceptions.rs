//! Protected regions of a lowered method body.
//!
//! Only the regions the user wrote (try/catch, try/finally, fault and filter clauses that
//! survived lowering) are described here. The catch-all handler the state machine wraps around
//! its whole body is not a protected region of this kind; its offset travels separately as the
//! top-level handler offset of [`crate::metadata::lowered::StateMachineInfo`].

use bitflags::bitflags;

use crate::metadata::range::OffsetRange;

bitflags! {
    /// Kind of the handler clause attached to a protected region.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExceptionHandlerFlags: u16 {
        /// A typed catch clause.
        const EXCEPTION = 0x0000;

        /// A filter expression followed by its handler.
        const FILTER = 0x0001;

        /// A finally clause, run on every exit from the try block.
        const FINALLY = 0x0002;

        /// A fault clause, run only when the try block exits by an exception.
        const FAULT = 0x0004;
    }
}

/// A user try block with its handler, at final code offsets.
///
/// ```text
/// try {
///     // try_offset -> try_offset + try_length
/// }
/// finally {
///     // handler_offset -> handler_offset + handler_length
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedRegion {
    /// Kind of the handler clause
    pub flags: ExceptionHandlerFlags,
    /// Offset in bytes of the try block from the start of the method body
    pub try_offset: u32,
    /// Length in bytes of the try block
    pub try_length: u32,
    /// Offset of the handler (or the filter, for `FILTER`)
    pub handler_offset: u32,
    /// Length in bytes of the handler
    pub handler_length: u32,
}

impl ProtectedRegion {
    /// Creates a region from its try and handler ranges.
    #[must_use]
    pub fn new(flags: ExceptionHandlerFlags, try_range: OffsetRange, handler: OffsetRange) -> Self {
        ProtectedRegion {
            flags,
            try_offset: try_range.start,
            try_length: try_range.len(),
            handler_offset: handler.start,
            handler_length: handler.len(),
        }
    }

    /// The protected try block.
    #[must_use]
    pub fn try_range(&self) -> OffsetRange {
        OffsetRange::new(self.try_offset, self.try_offset.saturating_add(self.try_length))
    }

    /// The handler block.
    #[must_use]
    pub fn handler_range(&self) -> OffsetRange {
        OffsetRange::new(
            self.handler_offset,
            self.handler_offset.saturating_add(self.handler_length),
        )
    }

    /// Returns `true` if `offset` lies in the try block or in the handler.
    ///
    /// An await inside either part needs the state machine's exception dispatch to route a
    /// resumed exception back into this region.
    #[must_use]
    pub fn covers(&self, offset: u32) -> bool {
        self.try_range().contains(offset) || self.handler_range().contains(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_try_and_handler() {
        let region = ProtectedRegion::new(
            ExceptionHandlerFlags::FINALLY,
            OffsetRange::new(0x10, 0x30),
            OffsetRange::new(0x30, 0x38),
        );
        assert_eq!(region.try_length, 0x20);
        assert!(region.covers(0x10));
        assert!(region.covers(0x35));
        assert!(!region.covers(0x38));
        assert!(!region.covers(0x08));
    }

    #[test]
    fn flag_kinds_are_distinct() {
        assert!(ExceptionHandlerFlags::EXCEPTION.is_empty());
        assert!(ExceptionHandlerFlags::FAULT.contains(ExceptionHandlerFlags::FAULT));
        assert_ne!(ExceptionHandlerFlags::FILTER, ExceptionHandlerFlags::FINALLY);
    }
}
