//! Emission of the custom debug information records of one method.

use crate::{
    metadata::{
        customdebuginformation::{
            ownership::ForwardingPlan,
            types::{CustomDebugInfo, DynamicLocalEntry},
        },
        lowered::LoweredMethod,
        method::SynthesizedKind,
        scope::ScopeTree,
        validation::DebugInfoConfig,
    },
    Invariant, Result,
};

/// Builds the record set of a method from its finished scope tree and the forwarding plan.
///
/// Records appear in a fixed order: the import record first (`ForwardIterator` for kickoff
/// wrappers, `Using` for the owner of the type's imports, `Forward` for everyone else), then
/// `IteratorLocalsBuckets`, then `DynamicLocalsBuckets`.
pub struct CustomDebugInfoEmitter<'a> {
    plan: &'a ForwardingPlan,
    config: &'a DebugInfoConfig,
}

impl<'a> CustomDebugInfoEmitter<'a> {
    /// Creates an emitter over a resolved plan.
    #[must_use]
    pub fn new(plan: &'a ForwardingPlan, config: &'a DebugInfoConfig) -> Self {
        CustomDebugInfoEmitter { plan, config }
    }

    /// Emits the records of `method`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] with [`Invariant::ForwardDepth`] when
    /// forwarding is enabled and the plan has no owner for the method's type, which means the
    /// method was not part of the ownership pass.
    pub fn emit(&self, method: &LoweredMethod, scopes: &ScopeTree) -> Result<Vec<CustomDebugInfo>> {
        let mut records = vec![self.import_record(method)?];

        if self.config.emit_iterator_locals {
            let buckets: Vec<_> = scopes
                .locals()
                .into_iter()
                .filter(|(_, local)| local.is_hoisted())
                .filter_map(|(scope, _)| scopes.enclosing_loop(scope))
                .filter_map(|scope| scope.loop_extent)
                .collect();
            if !buckets.is_empty() {
                records.push(CustomDebugInfo::IteratorLocalsBuckets { buckets });
            }
        }

        if self.config.emit_dynamic_locals {
            let entries: Vec<_> = scopes
                .locals()
                .into_iter()
                .filter_map(|(_, local)| {
                    local
                        .dynamic_flags
                        .as_ref()
                        .map(|flags| DynamicLocalEntry::new(local.slot, &local.name, flags))
                })
                .collect();
            if !entries.is_empty() {
                records.push(CustomDebugInfo::DynamicLocalsBuckets { entries });
            }
        }

        tracing::debug!(
            method = %method.method,
            records = records.len(),
            "emitted custom debug info"
        );
        Ok(records)
    }

    fn import_record(&self, method: &LoweredMethod) -> Result<CustomDebugInfo> {
        if let SynthesizedKind::KickoffWrapper { state_machine_type } = &method.kind {
            return Ok(CustomDebugInfo::ForwardIterator {
                type_name: state_machine_type.clone(),
            });
        }

        let using = CustomDebugInfo::Using {
            import_counts: method.import_counts.clone(),
        };
        if !self.config.forwarding {
            return Ok(using);
        }

        match self.plan.owner_of(&method.owning_type) {
            Some(owner) if *owner == method.method => Ok(using),
            Some(owner) => Ok(CustomDebugInfo::Forward {
                target: owner.clone(),
            }),
            None => Err(ice!(
                method.display_name(),
                Invariant::ForwardDepth,
                "no import owner was chosen for type '{}'",
                method.owning_type
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        lowered::{DeclaredLocal, LexicalBlock},
        method::MethodRef,
        range::OffsetRange,
        scope::{LocalStorage, ScopeBuilder},
    };

    fn method(name: &str, kind: SynthesizedKind, order: u32) -> LoweredMethod {
        LoweredMethod::builder(MethodRef::new("C", name, "()"), "C", kind)
            .declaration_order(order)
            .body_length(0x40)
            .imports(&[2])
            .build()
    }

    fn emit(
        method: &LoweredMethod,
        plan: &ForwardingPlan,
        config: &DebugInfoConfig,
        storage: &[LocalStorage],
    ) -> Vec<CustomDebugInfo> {
        let scopes = ScopeBuilder::new(method).build(storage).unwrap();
        CustomDebugInfoEmitter::new(plan, config)
            .emit(method, &scopes)
            .unwrap()
    }

    #[test]
    fn owner_uses_and_others_forward() {
        let owner = method("A", SynthesizedKind::UserMethod, 0);
        let other = method("B", SynthesizedKind::LambdaBody, 1);
        let plan = ForwardingPlan::resolve([&owner, &other]).unwrap();
        let config = DebugInfoConfig::default();

        assert_eq!(
            emit(&owner, &plan, &config, &[]),
            vec![CustomDebugInfo::Using {
                import_counts: vec![2]
            }]
        );
        assert_eq!(
            emit(&other, &plan, &config, &[]),
            vec![CustomDebugInfo::Forward {
                target: owner.method.clone()
            }]
        );
    }

    #[test]
    fn forwarding_disabled_gives_everyone_using() {
        let owner = method("A", SynthesizedKind::UserMethod, 0);
        let other = method("B", SynthesizedKind::LambdaBody, 1);
        let plan = ForwardingPlan::resolve([&owner, &other]).unwrap();
        let config = DebugInfoConfig {
            forwarding: false,
            ..DebugInfoConfig::default()
        };
        assert!(matches!(
            emit(&other, &plan, &config, &[])[0],
            CustomDebugInfo::Using { .. }
        ));
    }

    #[test]
    fn kickoff_forwards_to_state_machine() {
        let kickoff = method(
            "M",
            SynthesizedKind::KickoffWrapper {
                state_machine_type: "C+<M>d__0".into(),
            },
            0,
        );
        let records = emit(
            &kickoff,
            &ForwardingPlan::default(),
            &DebugInfoConfig::default(),
            &[],
        );
        assert_eq!(
            records,
            vec![CustomDebugInfo::ForwardIterator {
                type_name: "C+<M>d__0".into()
            }]
        );
    }

    #[test]
    fn missing_owner_is_fatal() {
        let m = method("A", SynthesizedKind::UserMethod, 0);
        let scopes = ScopeBuilder::new(&m).build(&[]).unwrap();
        let plan = ForwardingPlan::default();
        let config = DebugInfoConfig::default();
        let err = CustomDebugInfoEmitter::new(&plan, &config)
            .emit(&m, &scopes)
            .unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::ForwardDepth));
    }

    #[test]
    fn iterator_and_dynamic_buckets() {
        let m = LoweredMethod::builder(
            MethodRef::new("C+<M>d__0", "MoveNext", "()"),
            "C",
            SynthesizedKind::StateMachineStep,
        )
        .body_length(0x40)
        .block(
            LexicalBlock::loop_body(None, OffsetRange::new(0x10, 0x20))
                .with_duplicate(OffsetRange::new(0x28, 0x30)),
        )
        .local(DeclaredLocal::user("outer", None).dynamic(vec![false, true]))
        .local(DeclaredLocal::user("i", Some(0)))
        .local(DeclaredLocal::user("tmp", Some(0)))
        .build();
        let plan = ForwardingPlan::resolve([&m]).unwrap();
        let records = emit(
            &m,
            &plan,
            &DebugInfoConfig::default(),
            &[LocalStorage::Hoisted, LocalStorage::Hoisted, LocalStorage::Frame],
        );

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            CustomDebugInfo::IteratorLocalsBuckets {
                buckets: vec![OffsetRange::new(0x10, 0x30)]
            }
        );
        assert_eq!(
            records[2],
            CustomDebugInfo::DynamicLocalsBuckets {
                entries: vec![DynamicLocalEntry::new(0, "outer", &[false, true])]
            }
        );

        let minimal = emit(&m, &plan, &DebugInfoConfig::minimal(), &[LocalStorage::Hoisted; 3]);
        assert_eq!(minimal.len(), 1);
    }
}
