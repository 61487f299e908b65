//! The hoisting decision: which locals must survive a suspension.
//!
//! A local becomes a field of the state machine when a definition of it may reach a suspending
//! node at whose end it is still live, i.e. some path from a write to a read crosses an await.
//! The decision is made per method over its flow graph with two fixpoints:
//! [`ReachingDefinitions`] forward and [`LiveLocals`] backward.
//!
//! The result is conservative. A local is hoisted when *some* path crosses a suspension, even if
//! the await on that path completes synchronously at run time.

use crate::{
    analysis::{dataflow::LiveLocals, dataflow::ReachingDefinitions, flow::FlowGraph},
    metadata::{lowered::DeclaredLocal, scope::LocalStorage},
    utils::BitSet,
    Result,
};

/// Classifies every declared local of one method as frame slot or hoisted field.
pub struct HoistingAnalysis;

impl HoistingAnalysis {
    /// Returns the storage of each local in `locals`, by declaration index.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] if the flow graph references an unknown
    /// node or local.
    pub fn classify(
        method: &str,
        flow: &FlowGraph,
        locals: &[DeclaredLocal],
    ) -> Result<Vec<LocalStorage>> {
        flow.check(method, locals.len())?;

        let mut hoisted = BitSet::new(locals.len());
        if flow.nodes().iter().any(|n| n.suspends) {
            let reaching = ReachingDefinitions::solve(flow, locals.len());
            let live = LiveLocals::solve(flow, locals.len());

            for (id, _) in flow.nodes().iter().enumerate().filter(|(_, n)| n.suspends) {
                let (Some(defined), Some(live_out)) = (reaching.reaching_out(id), live.live_out(id))
                else {
                    continue;
                };
                let mut crossing = defined.clone();
                crossing.intersect_with(live_out);
                hoisted.union_with(&crossing);
            }
        }

        for (index, local) in locals.iter().enumerate() {
            if local.force_hoisted {
                hoisted.insert(index);
            }
        }

        tracing::debug!(
            method,
            locals = locals.len(),
            hoisted = hoisted.count(),
            "classified local storage"
        );

        Ok((0..locals.len())
            .map(|index| {
                if hoisted.contains(index) {
                    LocalStorage::Hoisted
                } else {
                    LocalStorage::Frame
                }
            })
            .collect())
    }
}
