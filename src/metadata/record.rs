//! The finished debug record of one method.

use crate::{
    metadata::{
        asyncinfo::AsyncInfo,
        customdebuginformation::{encode_custom_debug_info, CustomDebugInfo},
        method::MethodRef,
        scope::ScopeTree,
        sequencepoints::{encode_sequence_points, SequencePoints},
    },
    Result,
};

/// Everything a debugger needs about one compiled method.
///
/// Created once per method by [`crate::compiler::DebugInfoCompiler`] and never modified
/// afterwards; all access goes through the read-only accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDebugRecord {
    method: MethodRef,
    sequence_points: SequencePoints,
    scopes: ScopeTree,
    async_info: Option<AsyncInfo>,
    custom_debug_info: Vec<CustomDebugInfo>,
}

impl MethodDebugRecord {
    pub(crate) fn new(
        method: MethodRef,
        sequence_points: SequencePoints,
        scopes: ScopeTree,
        async_info: Option<AsyncInfo>,
        custom_debug_info: Vec<CustomDebugInfo>,
    ) -> Self {
        MethodDebugRecord {
            method,
            sequence_points,
            scopes,
            async_info,
            custom_debug_info,
        }
    }

    /// The method this record describes.
    #[must_use]
    pub fn method(&self) -> &MethodRef {
        &self.method
    }

    /// The sequence point table.
    #[must_use]
    pub fn sequence_points(&self) -> &SequencePoints {
        &self.sequence_points
    }

    /// The scope tree with its locals.
    #[must_use]
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Async metadata, for state-machine step methods.
    #[must_use]
    pub fn async_info(&self) -> Option<&AsyncInfo> {
        self.async_info.as_ref()
    }

    /// The custom debug information records in emission order.
    #[must_use]
    pub fn custom_debug_info(&self) -> &[CustomDebugInfo] {
        &self.custom_debug_info
    }

    /// The import record (`Using`, `Forward` or `ForwardIterator`), if any.
    #[must_use]
    pub fn import_record(&self) -> Option<&CustomDebugInfo> {
        self.custom_debug_info.iter().find(|r| r.is_import_record())
    }

    /// The sequence point table in its blob form.
    ///
    /// # Errors
    /// See [`crate::metadata::sequencepoints::encode_sequence_points`].
    pub fn sequence_point_blob(&self) -> Result<Vec<u8>> {
        encode_sequence_points(&self.sequence_points)
    }

    /// The custom debug information in its blob form.
    ///
    /// # Errors
    /// See [`crate::metadata::customdebuginformation::encode_custom_debug_info`].
    pub fn custom_debug_info_blob(&self) -> Result<Vec<u8>> {
        encode_custom_debug_info(&self.custom_debug_info)
    }
}
