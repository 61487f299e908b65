use strum::{Display, EnumCount, EnumIter};
use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// Builds an [`crate::Error::InternalCompilerError`] for `$method` violating `$invariant`.
///
/// ```rust, ignore
/// return Err(ice!(method, Invariant::MonotonicOffsets, "offset {} < {}", offset, last));
/// ```
macro_rules! ice {
    ($method:expr, $invariant:expr, $msg:expr) => {
        crate::Error::InternalCompilerError {
            method: $method.to_string(),
            invariant: $invariant,
            message: $msg.to_string(),
        }
    };

    ($method:expr, $invariant:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::InternalCompilerError {
            method: $method.to_string(),
            invariant: $invariant,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The invariants whose violation aborts a compilation.
///
/// Every one of them signals a defect in the lowering phase that produced the input, never a
/// problem in user source code. They are carried by [`Error::InternalCompilerError`] so the
/// driver can report which rule was broken for which method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum Invariant {
    /// Sequence point offsets must never decrease.
    #[strum(to_string = "monotonic sequence point offsets")]
    MonotonicOffsets,
    /// A local's live range must lie inside its scope.
    #[strum(to_string = "local live range contained in scope")]
    LocalContainment,
    /// A child scope must lie inside its parent and must not overlap its siblings.
    #[strum(to_string = "scope nesting")]
    ScopeNesting,
    /// Block and local references in the lowered input must resolve.
    #[strum(to_string = "lexical block reference")]
    BlockReference,
    /// Await yield/resume offsets must resolve inside the final method body.
    #[strum(to_string = "resolved await offsets")]
    AwaitResolution,
    /// Await points must be ordered by yield offset with `yield < resume`.
    #[strum(to_string = "await point ordering")]
    AwaitOrdering,
    /// A protected region around an await needs a top-level dispatch offset.
    #[strum(to_string = "catch dispatch offset")]
    CatchDispatch,
    /// A forward target must own the namespace import record itself.
    #[strum(to_string = "forward depth of one")]
    ForwardDepth,
    /// A method may carry only one of `Using`, `Forward` and `ForwardIterator`, and each type
    /// has exactly one owner of its `Using` record.
    #[strum(to_string = "exclusive import ownership")]
    ExclusiveOwnership,
    /// Slot ids must be dense and unique within a method.
    #[strum(to_string = "dense slot ids")]
    SlotAssignment,
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Builder Errors
/// - [`Error::InternalCompilerError`] - The lowering phase handed over inconsistent data
///
/// ## Blob Errors
/// - [`Error::Malformed`] - A debug-information blob could not be decoded
/// - [`Error::OutOfBounds`] - A blob ended before the data it announced
///
/// ## Projection Errors
/// - [`Error::Xml`] - The XML writer failed
///
/// # Examples
///
/// ```rust
/// use debugscope::{Error, Invariant};
/// use debugscope::metadata::sequencepoints::{SequencePointBuilder, SequencePointKind};
///
/// let mut builder = SequencePointBuilder::new("C.M");
/// builder.record(8, SequencePointKind::Hidden)?;
/// match builder.record(4, SequencePointKind::Hidden) {
///     Err(Error::InternalCompilerError { invariant, .. }) => {
///         assert_eq!(invariant, Invariant::MonotonicOffsets);
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// # Ok::<(), debugscope::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The lowering phase handed over data that violates one of the builder invariants.
    ///
    /// Not recoverable: the enclosing compilation must abort with this diagnostic.
    ///
    /// # Fields
    ///
    /// * `method` - Display name of the method being built
    /// * `invariant` - The rule that was violated
    /// * `message` - Details about the offending data
    #[error("internal compiler error in '{method}' ({invariant}): {message}")]
    InternalCompilerError {
        /// Display name of the method whose record was being built
        method: String,
        /// The violated invariant
        invariant: Invariant,
        /// Detailed description
        message: String,
    },

    /// The blob is damaged and could not be decoded.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while decoding a blob.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The XML projection writer failed.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error while writing a projection.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the violated invariant if this is an internal compiler error.
    #[must_use]
    pub fn invariant(&self) -> Option<Invariant> {
        match self {
            Error::InternalCompilerError { invariant, .. } => Some(*invariant),
            _ => None,
        }
    }
}
