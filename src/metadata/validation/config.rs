//! Configuration of debug-information generation.
//!
//! [`DebugInfoConfig`] selects which optional records the emitter writes, whether finished
//! records are re-validated, and whether per-method work runs in parallel.

/// Options for a [`crate::compiler::DebugInfoCompiler`] run.
///
/// # Examples
///
/// ```rust
/// use debugscope::metadata::validation::DebugInfoConfig;
///
/// let config = DebugInfoConfig {
///     forwarding: false,
///     ..DebugInfoConfig::default()
/// };
/// assert!(config.emit_iterator_locals);
/// assert!(DebugInfoConfig::strict().validate_records);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DebugInfoConfig {
    /// Emit `Forward` records pointing at the import owner of a type.
    ///
    /// When disabled every method other than a kickoff wrapper carries its own `Using` record.
    pub forwarding: bool,

    /// Emit `DynamicLocalsBuckets` records for dynamically typed locals
    pub emit_dynamic_locals: bool,

    /// Emit `IteratorLocalsBuckets` records for hoisted loop locals
    pub emit_iterator_locals: bool,

    /// Re-check every invariant on each finished record
    pub validate_records: bool,

    /// Build the records of different methods on the rayon thread pool
    pub parallel: bool,
}

impl Default for DebugInfoConfig {
    fn default() -> Self {
        Self {
            forwarding: true,
            emit_dynamic_locals: true,
            emit_iterator_locals: true,
            validate_records: false,
            parallel: true,
        }
    }
}

impl DebugInfoConfig {
    /// Only the mandatory records, on the calling thread, without re-validation.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            forwarding: true,
            emit_dynamic_locals: false,
            emit_iterator_locals: false,
            validate_records: false,
            parallel: false,
        }
    }

    /// Every record, with every finished record re-validated.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validate_records: true,
            ..Self::default()
        }
    }
}
