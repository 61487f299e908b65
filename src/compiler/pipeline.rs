//! The debug-information pipeline of one module.

use rayon::prelude::*;

use crate::{
    metadata::{
        asyncinfo::AsyncInfo,
        customdebuginformation::{CustomDebugInfoEmitter, ForwardingPlan},
        lowered::LoweredMethod,
        record::MethodDebugRecord,
        scope::{HoistingAnalysis, ScopeBuilder, ScopeTree},
        sequencepoints::{SequencePointBuilder, SequencePoints},
        validation::{DebugInfoConfig, RecordValidator},
    },
    Result,
};

/// Builds the debug records of every method of a module.
///
/// The work runs in three phases:
///
/// 1. **Per method**: sequence points, hoisting, scope tree and async info. Methods are
///    independent, so this phase runs on the rayon pool when [`DebugInfoConfig::parallel`]
///    is set.
/// 2. **Per type**: the [`ForwardingPlan`] picks one import owner for every user type. It
///    needs to see all methods of a type and is the only sequential step.
/// 3. **Emission**: custom debug information for every method against the finished plan,
///    followed by re-validation if [`DebugInfoConfig::validate_records`] is set.
///
/// Records are returned in input order. When several methods fail, the error of the first
/// failing method in input order is reported, independent of scheduling.
///
/// # Examples
///
/// ```rust
/// use debugscope::compiler::DebugInfoCompiler;
/// use debugscope::metadata::{
///     lowered::LoweredMethod,
///     method::{MethodRef, SynthesizedKind},
///     validation::DebugInfoConfig,
/// };
///
/// let methods = vec![
///     LoweredMethod::builder(MethodRef::new("C", "A", "()"), "C", SynthesizedKind::UserMethod)
///         .body_length(8)
///         .build(),
///     LoweredMethod::builder(MethodRef::new("C", "B", "()"), "C", SynthesizedKind::UserMethod)
///         .declaration_order(1)
///         .body_length(8)
///         .build(),
/// ];
///
/// let records = DebugInfoCompiler::new(DebugInfoConfig::strict()).compile(&methods)?;
/// assert_eq!(records.len(), 2);
/// # Ok::<(), debugscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugInfoCompiler {
    config: DebugInfoConfig,
}

/// What phase 1 produces for one method.
struct MethodArtifacts<'a> {
    method: &'a LoweredMethod,
    sequence_points: SequencePoints,
    scopes: ScopeTree,
    async_info: Option<AsyncInfo>,
}

impl DebugInfoCompiler {
    /// Creates a compiler with `config`.
    #[must_use]
    pub fn new(config: DebugInfoConfig) -> Self {
        DebugInfoCompiler { config }
    }

    /// The configuration of this compiler.
    #[must_use]
    pub fn config(&self) -> &DebugInfoConfig {
        &self.config
    }

    /// Builds one record per method of `methods`.
    ///
    /// `methods` must hold every method of the module that can own namespace imports, since
    /// the owner of a type is chosen among the methods passed here.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] for the first method whose lowered
    /// data violates an invariant. The compilation must be aborted.
    pub fn compile(&self, methods: &[LoweredMethod]) -> Result<Vec<MethodDebugRecord>> {
        tracing::debug!(
            methods = methods.len(),
            parallel = self.config.parallel,
            "building debug records"
        );

        let artifacts = self.try_map(methods.iter().collect(), build_method)?;

        let plan = ForwardingPlan::resolve(methods)?;
        let emitter = CustomDebugInfoEmitter::new(&plan, &self.config);

        let records = self.try_map(artifacts, |artifacts| {
            let custom_debug_info = emitter.emit(artifacts.method, &artifacts.scopes)?;
            Ok(MethodDebugRecord::new(
                artifacts.method.method.clone(),
                artifacts.sequence_points,
                artifacts.scopes,
                artifacts.async_info,
                custom_debug_info,
            ))
        })?;

        if self.config.validate_records {
            for record in &records {
                RecordValidator::validate(record)?;
            }
            RecordValidator::validate_forwarding(&records)?;
            tracing::trace!(records = records.len(), "records re-validated");
        }

        Ok(records)
    }

    /// Maps `items` in input order, on the rayon pool when configured.
    fn try_map<T, U, F>(&self, items: Vec<T>, f: F) -> Result<Vec<U>>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> Result<U> + Sync + Send,
    {
        let results: Vec<Result<U>> = if self.config.parallel {
            items.into_par_iter().map(f).collect()
        } else {
            items.into_iter().map(f).collect()
        };
        results.into_iter().collect()
    }
}

fn build_method(method: &LoweredMethod) -> Result<MethodArtifacts<'_>> {
    let name = method.display_name();

    let mut points = SequencePointBuilder::new(name.as_str());
    for event in &method.trace {
        points.record(event.offset, event.kind)?;
    }

    let storage = HoistingAnalysis::classify(&name, &method.flow, &method.locals)?;
    let scopes = ScopeBuilder::new(method).build(&storage)?;
    let async_info = AsyncInfo::from_lowered(method)?;

    tracing::debug!(
        method = %name,
        sequence_points = points.len(),
        scopes = scopes.len(),
        locals = scopes.local_count(),
        awaits = async_info.as_ref().map_or(0, |info| info.await_points.len()),
        "built method debug info"
    );

    Ok(MethodArtifacts {
        method,
        sequence_points: points.finish(),
        scopes,
        async_info,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            customdebuginformation::CustomDebugInfo,
            method::{MethodRef, SynthesizedKind},
        },
        test::{async_pair, span, user_method},
        Invariant,
    };

    fn module() -> Vec<LoweredMethod> {
        async_pair("M", &[(0x10, 0x22)])
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let methods = module();
        let parallel = DebugInfoCompiler::new(DebugInfoConfig::strict())
            .compile(&methods)
            .unwrap();
        let sequential = DebugInfoCompiler::new(DebugInfoConfig {
            parallel: false,
            ..DebugInfoConfig::strict()
        })
        .compile(&methods)
        .unwrap();
        assert_eq!(parallel, sequential);

        assert!(matches!(
            parallel[0].custom_debug_info()[0],
            CustomDebugInfo::ForwardIterator { .. }
        ));
        assert!(matches!(
            parallel[1].custom_debug_info()[0],
            CustomDebugInfo::Using { .. }
        ));
        assert_eq!(parallel[1].sequence_points().len(), 2);
        assert!(parallel[1].async_info().is_some());
    }

    #[test]
    fn first_failing_method_reported() {
        let mut methods = module();
        for name in ["X", "Y"] {
            methods.push(
                LoweredMethod::builder(MethodRef::new("D", name, "()"), "D", SynthesizedKind::UserMethod)
                    .visible(8, span(1, 1, 2))
                    .hidden(4)
                    .build(),
            );
        }
        let err = DebugInfoCompiler::default().compile(&methods).unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::MonotonicOffsets));
        assert!(err.to_string().contains("D.X()"));
    }

    #[test]
    fn later_methods_forward_to_first() {
        let methods = vec![user_method("D", "B", 1, 8), user_method("D", "A", 0, 8)];
        let records = DebugInfoCompiler::new(DebugInfoConfig::strict())
            .compile(&methods)
            .unwrap();
        assert_eq!(
            records[0].import_record(),
            Some(&CustomDebugInfo::Forward {
                target: MethodRef::new("D", "A", "()")
            })
        );
        assert!(matches!(
            records[1].import_record(),
            Some(CustomDebugInfo::Using { .. })
        ));
    }

    #[test]
    fn empty_module() {
        assert!(DebugInfoCompiler::default().compile(&[]).unwrap().is_empty());
    }
}
