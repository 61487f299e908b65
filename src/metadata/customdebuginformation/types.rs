//! Custom debug information record types.
//!
//! The record set of a method is a closed family of tagged records. Each record kind has one
//! fixed tag byte in the binary form; [`CustomDebugKind`] names the tags and
//! [`CustomDebugInfo`] carries the decoded payloads.

use strum::{Display, EnumCount, EnumIter};

use crate::metadata::{method::MethodRef, range::OffsetRange};

/// Format version written in the set header and in every record header.
pub const CDI_VERSION: u8 = 4;

/// Longest dynamic-local name, in UTF-16 code units, that fits the fixed name field.
pub const MAX_DYNAMIC_NAME_UNITS: usize = 63;

/// Most dynamic-typing flags a single entry can carry.
pub const MAX_DYNAMIC_FLAGS: usize = 64;

/// Tag of a custom debug information record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumCount)]
#[repr(u8)]
pub enum CustomDebugKind {
    /// Per-scope namespace import counts, owned by one method per type
    #[strum(to_string = "using")]
    Using = 0,
    /// Reuse the import record of another method
    #[strum(to_string = "forward")]
    Forward = 1,
    /// Hoisted loop-local buckets of a state-machine step
    #[strum(to_string = "iteratorLocals")]
    IteratorLocalsBuckets = 3,
    /// A kickoff method pointing at its state-machine type
    #[strum(to_string = "forwardIterator")]
    ForwardIterator = 4,
    /// Type flags of dynamically typed locals
    #[strum(to_string = "dynamicLocals")]
    DynamicLocalsBuckets = 5,
}

impl CustomDebugKind {
    /// Maps a tag byte to its kind.
    #[must_use]
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(CustomDebugKind::Using),
            1 => Some(CustomDebugKind::Forward),
            3 => Some(CustomDebugKind::IteratorLocalsBuckets),
            4 => Some(CustomDebugKind::ForwardIterator),
            5 => Some(CustomDebugKind::DynamicLocalsBuckets),
            _ => None,
        }
    }

    /// The tag byte of this kind.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// One dynamically typed local.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DynamicLocalEntry {
    /// Slot id of the local
    pub slot: u32,
    /// Name of the local
    pub name: String,
    /// One flag per node of the local's type, `true` where the node is `dynamic`
    pub flags: Vec<bool>,
}

impl DynamicLocalEntry {
    /// Creates an entry, falling back to [`DynamicLocalEntry::placeholder`] when the name or
    /// the flags exceed what the fixed-size entry can hold.
    #[must_use]
    pub fn new(slot: u32, name: &str, flags: &[bool]) -> Self {
        if name.encode_utf16().count() > MAX_DYNAMIC_NAME_UNITS || flags.len() > MAX_DYNAMIC_FLAGS
        {
            return DynamicLocalEntry::placeholder();
        }
        DynamicLocalEntry {
            slot,
            name: name.to_string(),
            flags: flags.to_vec(),
        }
    }

    /// The empty entry written in place of a local that cannot be represented.
    #[must_use]
    pub fn placeholder() -> Self {
        DynamicLocalEntry::default()
    }

    /// Returns `true` for the placeholder entry.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty() && self.flags.is_empty() && self.slot == 0
    }
}

/// A decoded custom debug information record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomDebugInfo {
    /// Number of namespace imports per scope, outermost first
    Using {
        /// Import count per scope
        import_counts: Vec<u16>,
    },

    /// The imports of this method are those of `target`
    Forward {
        /// The method owning the `Using` record
        target: MethodRef,
    },

    /// The kickoff method's locals and imports live in the named state-machine type
    ForwardIterator {
        /// Fully qualified name of the state-machine type
        type_name: String,
    },

    /// Code ranges in which hoisted loop locals are in scope, one per local in slot order
    IteratorLocalsBuckets {
        /// One range per hoisted local declared in a loop body
        buckets: Vec<OffsetRange>,
    },

    /// Dynamic-typing flags of locals, in slot order
    DynamicLocalsBuckets {
        /// One entry per dynamically typed local
        entries: Vec<DynamicLocalEntry>,
    },
}

impl CustomDebugInfo {
    /// Returns the tag of this record.
    #[must_use]
    pub fn kind(&self) -> CustomDebugKind {
        match self {
            CustomDebugInfo::Using { .. } => CustomDebugKind::Using,
            CustomDebugInfo::Forward { .. } => CustomDebugKind::Forward,
            CustomDebugInfo::ForwardIterator { .. } => CustomDebugKind::ForwardIterator,
            CustomDebugInfo::IteratorLocalsBuckets { .. } => CustomDebugKind::IteratorLocalsBuckets,
            CustomDebugInfo::DynamicLocalsBuckets { .. } => CustomDebugKind::DynamicLocalsBuckets,
        }
    }

    /// Returns `true` for the three mutually exclusive import records.
    #[must_use]
    pub fn is_import_record(&self) -> bool {
        matches!(
            self,
            CustomDebugInfo::Using { .. }
                | CustomDebugInfo::Forward { .. }
                | CustomDebugInfo::ForwardIterator { .. }
        )
    }
}
