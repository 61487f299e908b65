//! Sequence point tables: the offset to source span map of one method.
//!
//! A sequence point says "the code starting at this offset belongs to that source span", or,
//! for a *hidden* point, "the code starting here has no source location; step over it". The
//! table of a method is recorded while the code generator walks the finalized body, so
//! offsets arrive in order. [`SequencePointBuilder`] enforces that order and resolves points
//! that land on the same offset.
//!
//! # Key Components
//!
//! - [`crate::metadata::sequencepoints::SequencePointBuilder`] - Records points during emission
//! - [`crate::metadata::sequencepoints::SequencePoints`] - The finished, immutable table
//! - [`crate::metadata::sequencepoints::encode_sequence_points`] /
//!   [`crate::metadata::sequencepoints::parse_sequence_points`] - The compressed blob form
//!
//! # Usage Examples
//!
//! ```rust
//! use debugscope::metadata::sequencepoints::{SequencePointBuilder, SequencePointKind, SourceSpan};
//!
//! let mut builder = SequencePointBuilder::new("C.<M>d__0.MoveNext");
//! builder.record(0, SequencePointKind::Hidden)?;
//! builder.record(0, SequencePointKind::Visible(SourceSpan::new(0, 10, 9, 10, 30)))?;
//! builder.record(12, SequencePointKind::Hidden)?;
//!
//! let points = builder.finish();
//! assert_eq!(points.len(), 2);
//! assert!(!points.find_by_offset(0).unwrap().is_hidden());
//! assert_eq!(points.covering(20).unwrap().offset, 12);
//! # Ok::<(), debugscope::Error>(())
//! ```
//!
//! # Blob Format
//!
//! The blob opens with the initial document index as a compressed unsigned integer. Each
//! following record is either a document change or a point:
//!
//! - **Document change**: an offset delta of `0` followed by the new document index. Only
//!   records after the first may be document changes, since later point deltas are never zero.
//! - **Point**: the offset (absolute for the first point, a positive delta afterwards), the
//!   start line (absolute for the first point, a signed delta from the previous start line
//!   afterwards), the start column (same scheme), the end line as an unsigned delta from the
//!   start line and the end column as a signed delta from the start column.
//!
//! Hidden points carry the start line [`HIDDEN_LINE`], start column `0` and zero deltas. All
//! values use the ECMA-335 II.23.2 compressed integer encodings.

use crate::{
    file::{
        io::{write_compressed_int, write_compressed_uint, MAX_COMPRESSED_UINT},
        parser::Parser,
    },
    Invariant, Result,
};

/// The reserved line number of hidden sequence points.
pub const HIDDEN_LINE: u32 = 0x00FE_EFEE;

/// A source location: document index plus start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    /// Index of the source document
    pub document: u32,
    /// Starting line in the source file
    pub start_line: u32,
    /// Starting column in the source file
    pub start_col: u16,
    /// Ending line in the source file
    pub end_line: u32,
    /// Ending column in the source file
    pub end_col: u16,
}

impl SourceSpan {
    /// Creates a span.
    #[must_use]
    pub const fn new(
        document: u32,
        start_line: u32,
        start_col: u16,
        end_line: u32,
        end_col: u16,
    ) -> Self {
        SourceSpan {
            document,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

/// What a sequence point maps its offset to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequencePointKind {
    /// A user statement at the given span
    Visible(SourceSpan),
    /// Compiler-generated code the debugger steps over
    Hidden,
}

/// Represents a single sequence point mapping an offset to a source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequencePoint {
    /// Offset in the method body
    pub offset: u32,
    /// The span, or hidden
    pub kind: SequencePointKind,
}

impl SequencePoint {
    /// Returns `true` if this is a hidden sequence point.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        matches!(self.kind, SequencePointKind::Hidden)
    }

    /// The source span of a visible point.
    #[must_use]
    pub fn span(&self) -> Option<&SourceSpan> {
        match &self.kind {
            SequencePointKind::Visible(span) => Some(span),
            SequencePointKind::Hidden => None,
        }
    }

    /// Start line, or [`HIDDEN_LINE`] for hidden points.
    #[must_use]
    pub fn start_line(&self) -> u32 {
        self.span().map_or(HIDDEN_LINE, |s| s.start_line)
    }

    /// Start column, `0` for hidden points.
    #[must_use]
    pub fn start_col(&self) -> u16 {
        self.span().map_or(0, |s| s.start_col)
    }

    /// End line, or [`HIDDEN_LINE`] for hidden points.
    #[must_use]
    pub fn end_line(&self) -> u32 {
        self.span().map_or(HIDDEN_LINE, |s| s.end_line)
    }

    /// End column, `0` for hidden points.
    #[must_use]
    pub fn end_col(&self) -> u16 {
        self.span().map_or(0, |s| s.end_col)
    }
}

/// Collection of sequence points for a method, strictly ascending by offset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequencePoints(Vec<SequencePoint>);

impl SequencePoints {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the method has no sequence points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The points in offset order.
    #[must_use]
    pub fn as_slice(&self) -> &[SequencePoint] {
        &self.0
    }

    /// Iterates over the points in offset order.
    pub fn iter(&self) -> std::slice::Iter<'_, SequencePoint> {
        self.0.iter()
    }

    /// Returns the sequence point recorded exactly at `offset`, if any.
    #[must_use]
    pub fn find_by_offset(&self, offset: u32) -> Option<&SequencePoint> {
        self.0
            .binary_search_by_key(&offset, |sp| sp.offset)
            .ok()
            .map(|idx| &self.0[idx])
    }

    /// Returns the point governing `offset`: the one with the greatest offset not above it.
    #[must_use]
    pub fn covering(&self, offset: u32) -> Option<&SequencePoint> {
        let idx = self.0.partition_point(|sp| sp.offset <= offset);
        idx.checked_sub(1).map(|idx| &self.0[idx])
    }
}

impl<'a> IntoIterator for &'a SequencePoints {
    type Item = &'a SequencePoint;
    type IntoIter = std::slice::Iter<'a, SequencePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Records the sequence points of one method in emission order.
///
/// - An offset smaller than the last recorded one is an internal compiler error.
/// - A visible point at the offset of a hidden one replaces it.
/// - A hidden point at the offset of a visible one is dropped.
/// - A second visible point at the same offset replaces the first; the last statement wins.
///
/// A method may finish with no points at all, which is the case for pure forwarding wrappers.
#[derive(Debug)]
pub struct SequencePointBuilder {
    method: String,
    points: Vec<SequencePoint>,
}

impl SequencePointBuilder {
    /// Starts an empty table for the method with display name `method`.
    pub fn new(method: impl Into<String>) -> Self {
        SequencePointBuilder {
            method: method.into(),
            points: Vec::new(),
        }
    }

    /// Records a point at `offset`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] with [`Invariant::MonotonicOffsets`] if
    /// `offset` is smaller than the last recorded offset.
    pub fn record(&mut self, offset: u32, kind: SequencePointKind) -> Result<()> {
        let point = SequencePoint { offset, kind };
        let Some(last) = self.points.last_mut() else {
            self.points.push(point);
            return Ok(());
        };

        if offset < last.offset {
            return Err(ice!(
                self.method,
                Invariant::MonotonicOffsets,
                "sequence point at {:#x} recorded after one at {:#x}",
                offset,
                last.offset
            ));
        }

        if offset > last.offset {
            self.points.push(point);
        } else if point.is_hidden() {
            tracing::trace!(method = %self.method, offset, "hidden point shadowed at same offset");
        } else {
            *last = point;
        }
        Ok(())
    }

    /// Number of points recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Freezes the table.
    #[must_use]
    pub fn finish(self) -> SequencePoints {
        SequencePoints(self.points)
    }
}

fn signed_delta(from: u32, to: u32) -> Result<i32> {
    let delta = i64::from(to) - i64::from(from);
    let limit = i64::from(MAX_COMPRESSED_UINT >> 1);
    if delta > limit || delta < -limit - 1 {
        return Err(malformed_error!(
            "Delta {} does not fit a compressed signed integer",
            delta
        ));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(delta as i32)
}

fn unsigned(value: u32) -> Result<u32> {
    if value > MAX_COMPRESSED_UINT {
        return Err(malformed_error!(
            "Value {:#x} does not fit a compressed unsigned integer",
            value
        ));
    }
    Ok(value)
}

/// Encodes a table into the compressed blob form described in the module documentation.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a value or delta exceeds the compressed integer range,
/// if an end position precedes its start line, or if a visible point starts on [`HIDDEN_LINE`].
pub fn encode_sequence_points(points: &SequencePoints) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut document = points
        .iter()
        .find_map(|sp| sp.span().map(|s| s.document))
        .unwrap_or(0);
    write_compressed_uint(unsigned(document)?, &mut buffer);

    let mut previous: Option<&SequencePoint> = None;
    for point in points {
        if let Some(span) = point.span() {
            if span.start_line == HIDDEN_LINE {
                return Err(malformed_error!(
                    "Visible sequence point at {:#x} starts on the hidden line marker",
                    point.offset
                ));
            }
            if span.document != document {
                document = span.document;
                write_compressed_uint(0, &mut buffer);
                write_compressed_uint(unsigned(document)?, &mut buffer);
            }
        }

        let (start_line, start_col) = (point.start_line(), point.start_col());
        match previous {
            None => {
                write_compressed_uint(unsigned(point.offset)?, &mut buffer);
                write_compressed_uint(unsigned(start_line)?, &mut buffer);
                write_compressed_uint(u32::from(start_col), &mut buffer);
            }
            Some(prev) => {
                if point.offset <= prev.offset {
                    return Err(malformed_error!(
                        "Sequence point offsets must increase ({:#x} after {:#x})",
                        point.offset,
                        prev.offset
                    ));
                }
                write_compressed_uint(unsigned(point.offset - prev.offset)?, &mut buffer);
                write_compressed_int(signed_delta(prev.start_line(), start_line)?, &mut buffer);
                write_compressed_int(
                    signed_delta(u32::from(prev.start_col()), u32::from(start_col))?,
                    &mut buffer,
                );
            }
        }

        let Some(line_span) = point.end_line().checked_sub(start_line) else {
            return Err(malformed_error!(
                "End line {} precedes start line {}",
                point.end_line(),
                start_line
            ));
        };
        write_compressed_uint(unsigned(line_span)?, &mut buffer);
        write_compressed_int(
            signed_delta(u32::from(start_col), u32::from(point.end_col()))?,
            &mut buffer,
        );

        previous = Some(point);
    }

    Ok(buffer)
}

/// Parses a blob produced by [`encode_sequence_points`].
///
/// # Errors
/// Returns [`crate::Error::Malformed`] or [`crate::Error::OutOfBounds`] if the blob is
/// truncated, uses an invalid compressed integer, or describes positions out of range.
pub fn parse_sequence_points(blob: &[u8]) -> Result<SequencePoints> {
    let mut parser = Parser::new(blob);
    let mut points: Vec<SequencePoint> = Vec::new();
    let mut document = parser.read_compressed_uint()?;

    while parser.has_more_data() {
        let (offset, start_line, start_col) = match points.last() {
            None => (
                parser.read_compressed_uint()?,
                parser.read_compressed_uint()?,
                i64::from(parser.read_compressed_uint()?),
            ),
            Some(prev) => {
                let delta = parser.read_compressed_uint()?;
                if delta == 0 {
                    document = parser.read_compressed_uint()?;
                    continue;
                }
                let offset = prev
                    .offset
                    .checked_add(delta)
                    .ok_or_else(|| malformed_error!("Offset overflow after {:#x}", prev.offset))?;
                let line = i64::from(prev.start_line()) + i64::from(parser.read_compressed_int()?);
                let col = i64::from(prev.start_col()) + i64::from(parser.read_compressed_int()?);
                let line = u32::try_from(line)
                    .map_err(|_| malformed_error!("Start line {} out of range", line))?;
                (offset, line, col)
            }
        };

        let line_span = parser.read_compressed_uint()?;
        let end_col = start_col + i64::from(parser.read_compressed_int()?);
        let start_col = u16::try_from(start_col)
            .map_err(|_| malformed_error!("Start column {} out of range", start_col))?;
        let end_col = u16::try_from(end_col)
            .map_err(|_| malformed_error!("End column {} out of range", end_col))?;
        let end_line = start_line
            .checked_add(line_span)
            .ok_or_else(|| malformed_error!("End line overflow at {:#x}", offset))?;

        let kind = if start_line == HIDDEN_LINE {
            SequencePointKind::Hidden
        } else {
            SequencePointKind::Visible(SourceSpan::new(
                document, start_line, start_col, end_line, end_col,
            ))
        };
        points.push(SequencePoint { offset, kind });
    }

    Ok(SequencePoints(points))
}
