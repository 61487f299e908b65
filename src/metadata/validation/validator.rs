//! Re-validation of finished debug records.
//!
//! The builders already refuse inconsistent input. [`RecordValidator`] checks the finished
//! records once more, independently of how they were built, and is what the property tests and
//! the `validate_records` option of [`crate::metadata::validation::DebugInfoConfig`] run.

use std::collections::HashMap;

use crate::{
    metadata::{customdebuginformation::CustomDebugInfo, method::MethodRef, record::MethodDebugRecord},
    Invariant, Result,
};

/// Checks the invariants of [`MethodDebugRecord`]s.
pub struct RecordValidator;

impl RecordValidator {
    /// Checks one record in isolation.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] naming the first violated invariant.
    pub fn validate(record: &MethodDebugRecord) -> Result<()> {
        let name = record.method().to_string();
        Self::check_sequence_points(&name, record)?;
        Self::check_scopes(&name, record)?;
        Self::check_awaits(&name, record)?;

        let imports = record
            .custom_debug_info()
            .iter()
            .filter(|r| r.is_import_record())
            .count();
        if imports > 1 {
            return Err(ice!(
                name,
                Invariant::ExclusiveOwnership,
                "{} import records on one method",
                imports
            ));
        }
        Ok(())
    }

    /// Checks that every `Forward` record targets a method that owns a `Using` record.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] with [`Invariant::ForwardDepth`].
    pub fn validate_forwarding(records: &[MethodDebugRecord]) -> Result<()> {
        let by_method: HashMap<&MethodRef, &MethodDebugRecord> =
            records.iter().map(|r| (r.method(), r)).collect();

        for record in records {
            let Some(CustomDebugInfo::Forward { target }) = record.import_record() else {
                continue;
            };
            let owns_using = by_method
                .get(target)
                .and_then(|r| r.import_record())
                .is_some_and(|r| matches!(r, CustomDebugInfo::Using { .. }));
            if !owns_using {
                return Err(ice!(
                    record.method(),
                    Invariant::ForwardDepth,
                    "forward target {} does not own a using record",
                    target
                ));
            }
        }
        Ok(())
    }

    fn check_sequence_points(name: &str, record: &MethodDebugRecord) -> Result<()> {
        let points = record.sequence_points().as_slice();
        if let Some(pair) = points.windows(2).find(|w| w[0].offset >= w[1].offset) {
            return Err(ice!(
                name,
                Invariant::MonotonicOffsets,
                "sequence point at {:#x} follows one at {:#x}",
                pair[1].offset,
                pair[0].offset
            ));
        }
        Ok(())
    }

    fn check_scopes(name: &str, record: &MethodDebugRecord) -> Result<()> {
        let tree = record.scopes();
        let mut slots = Vec::with_capacity(tree.local_count());

        for (id, scope) in tree.iter() {
            if let Some(parent) = scope.parent.and_then(|p| tree.get(p)) {
                if !parent.range.contains_range(&scope.range) {
                    return Err(ice!(
                        name,
                        Invariant::ScopeNesting,
                        "scope {} {} escapes its parent {}",
                        id,
                        scope.range,
                        parent.range
                    ));
                }
            }

            let mut children: Vec<_> = scope
                .children
                .iter()
                .filter_map(|&c| tree.get(c).map(|s| s.range))
                .collect();
            children.sort();
            if let Some(pair) = children.windows(2).find(|w| w[0].overlaps(&w[1])) {
                return Err(ice!(
                    name,
                    Invariant::ScopeNesting,
                    "sibling scopes {} and {} overlap",
                    pair[0],
                    pair[1]
                ));
            }

            for local in &scope.locals {
                if !scope.range.contains_range(&local.live_range) {
                    return Err(ice!(
                        name,
                        Invariant::LocalContainment,
                        "local '{}' {} escapes scope {}",
                        local.name,
                        local.live_range,
                        scope.range
                    ));
                }
                slots.push(local.slot);
            }
        }

        slots.sort_unstable();
        for (expected, &slot) in slots.iter().enumerate() {
            if slot as usize != expected {
                return Err(ice!(
                    name,
                    Invariant::SlotAssignment,
                    "slot ids are not dense: expected {} but found {}",
                    expected,
                    slot
                ));
            }
        }
        Ok(())
    }

    fn check_awaits(name: &str, record: &MethodDebugRecord) -> Result<()> {
        let Some(info) = record.async_info() else {
            return Ok(());
        };
        if let Some(point) = info
            .await_points
            .iter()
            .find(|p| p.yield_offset >= p.resume_offset)
        {
            return Err(ice!(
                name,
                Invariant::AwaitOrdering,
                "await yields at {:#x} but resumes at {:#x}",
                point.yield_offset,
                point.resume_offset
            ));
        }
        if let Some(pair) = info
            .await_points
            .windows(2)
            .find(|w| w[0].yield_offset >= w[1].yield_offset)
        {
            return Err(ice!(
                name,
                Invariant::AwaitOrdering,
                "await at {:#x} listed after await at {:#x}",
                pair[1].yield_offset,
                pair[0].yield_offset
            ));
        }
        Ok(())
    }
}
