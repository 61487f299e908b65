//! The per-type choice of the method that owns the namespace import record.
//!
//! All methods synthesized for one user type share that type's namespace imports. Only one of
//! them stores the imports in a `Using` record; the others point at it with a `Forward`
//! record. Debuggers follow exactly one forward, so the owner must be chosen for the whole type
//! before any record is emitted.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    metadata::{
        lowered::LoweredMethod,
        method::{MethodRef, SynthesizedKind},
    },
    Invariant, Result,
};

/// The immutable `type → owner` map of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardingPlan {
    owners: BTreeMap<String, MethodRef>,
}

impl ForwardingPlan {
    /// Chooses the owner of every type that has at least one eligible method.
    ///
    /// Kickoff wrappers are never eligible. The type initializer owns the record when it is
    /// eligible; otherwise the first eligible method in declaration order does, with ties
    /// broken by method identity. The result does not depend on the order of `methods`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] with [`Invariant::ExclusiveOwnership`]
    /// when two methods share one identity, since both would then claim the same record.
    pub fn resolve<'a, I>(methods: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a LoweredMethod>,
    {
        let mut seen: BTreeSet<&MethodRef> = BTreeSet::new();
        let mut owners: BTreeMap<String, &LoweredMethod> = BTreeMap::new();
        for method in methods {
            if !seen.insert(&method.method) {
                return Err(ice!(
                    method.display_name(),
                    Invariant::ExclusiveOwnership,
                    "method identity appears more than once in the module"
                ));
            }
            if method.kind.is_kickoff() {
                continue;
            }
            match owners.get(&method.owning_type) {
                Some(current) if !precedes(method, current) => {}
                _ => {
                    owners.insert(method.owning_type.clone(), method);
                }
            }
        }

        for (owning_type, owner) in &owners {
            tracing::debug!(%owning_type, owner = %owner.method, "chose import owner");
        }

        Ok(ForwardingPlan {
            owners: owners
                .into_iter()
                .map(|(ty, m)| (ty, m.method.clone()))
                .collect(),
        })
    }

    /// The owner of `owning_type`.
    #[must_use]
    pub fn owner_of(&self, owning_type: &str) -> Option<&MethodRef> {
        self.owners.get(owning_type)
    }

    /// Returns `true` if `method` owns the imports of `owning_type`.
    #[must_use]
    pub fn is_owner(&self, owning_type: &str, method: &MethodRef) -> bool {
        self.owner_of(owning_type) == Some(method)
    }

    /// Number of types with an owner.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns `true` if no type has an owner.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// All `(type, owner)` pairs ordered by type name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MethodRef)> {
        self.owners.iter().map(|(ty, m)| (ty.as_str(), m))
    }
}

/// Ownership priority: type initializer first, then declaration order, then identity.
fn precedes(candidate: &LoweredMethod, current: &LoweredMethod) -> bool {
    let rank = |m: &LoweredMethod| {
        (
            m.kind != SynthesizedKind::TypeInitializer,
            m.declaration_order,
        )
    };
    (rank(candidate), &candidate.method) < (rank(current), &current.method)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(ty: &str, name: &str, kind: SynthesizedKind, order: u32) -> LoweredMethod {
        LoweredMethod::builder(MethodRef::new(ty, name, "()"), "C", kind)
            .declaration_order(order)
            .build()
    }

    #[test]
    fn type_initializer_wins() {
        let methods = vec![
            method("C+<M>d__0", "MoveNext", SynthesizedKind::StateMachineStep, 0),
            method("C", "<M>b__0_0", SynthesizedKind::LambdaBody, 1),
            method("C", ".cctor", SynthesizedKind::TypeInitializer, 5),
        ];
        let plan = ForwardingPlan::resolve(&methods).unwrap();
        assert_eq!(plan.owner_of("C").unwrap().method_name, ".cctor");
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn first_in_declaration_order_without_initializer() {
        let methods = vec![
            method("C", "B", SynthesizedKind::UserMethod, 2),
            method("C", "A", SynthesizedKind::UserMethod, 1),
            method(
                "C",
                "K",
                SynthesizedKind::KickoffWrapper {
                    state_machine_type: "C+<K>d__0".into(),
                },
                0,
            ),
        ];
        let plan = ForwardingPlan::resolve(&methods).unwrap();
        assert_eq!(plan.owner_of("C").unwrap().method_name, "A");
    }

    #[test]
    fn ties_broken_by_identity_and_independent_of_input_order() {
        let mut methods = vec![
            method("C", "Z", SynthesizedKind::UserMethod, 1),
            method("C", "Y", SynthesizedKind::UserMethod, 1),
        ];
        let first = ForwardingPlan::resolve(&methods).unwrap();
        methods.reverse();
        let second = ForwardingPlan::resolve(&methods).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.owner_of("C").unwrap().method_name, "Y");
    }

    #[test]
    fn only_kickoffs_means_no_owner() {
        let methods = vec![method(
            "C",
            "K",
            SynthesizedKind::KickoffWrapper {
                state_machine_type: "C+<K>d__0".into(),
            },
            0,
        )];
        assert!(ForwardingPlan::resolve(&methods).unwrap().is_empty());
    }

    #[test]
    fn duplicate_identity_rejected() {
        let methods = vec![
            method("C", "A", SynthesizedKind::UserMethod, 0),
            method("C", "A", SynthesizedKind::UserMethod, 1),
        ];
        let err = ForwardingPlan::resolve(&methods).unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::ExclusiveOwnership));
    }
}
