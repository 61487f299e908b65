//! Live local analysis.
//!
//! A local is *live* at a point if some path from that point reads it before writing it.
//!
//! This is a backward data flow analysis:
//!
//! - `USE[N]` = locals read in N before any write in N
//! - `DEF[N]` = locals written in N
//! - `OUT[N]` = ∪{IN[S] | S is a successor of N}
//! - `IN[N]` = USE[N] ∪ (OUT[N] - DEF[N])
//!
//! The hoisting decision asks whether a local is live on exit from a suspending node, i.e.
//! whether its value must survive the suspension.

use crate::{
    analysis::{
        dataflow::{
            framework::{AnalysisResults, DataFlowAnalysis, Direction},
            solver::DataFlowSolver,
        },
        flow::{FlowGraph, FlowNode, FlowNodeId},
    },
    utils::BitSet,
};

/// Live local analysis over declaration indices.
pub struct LiveLocals {
    local_count: usize,
    use_sets: Vec<BitSet>,
    def_sets: Vec<BitSet>,
}

impl LiveLocals {
    /// Prepares the analysis for `graph` with `local_count` declared locals.
    #[must_use]
    pub fn new(graph: &FlowGraph, local_count: usize) -> Self {
        let mut use_sets = Vec::with_capacity(graph.node_count());
        let mut def_sets = Vec::with_capacity(graph.node_count());

        for node in graph.nodes() {
            let mut uses = BitSet::new(local_count);
            let mut defs = BitSet::new(local_count);
            for &local in &node.uses {
                uses.insert(local);
            }
            for &local in &node.defs {
                defs.insert(local);
            }
            use_sets.push(uses);
            def_sets.push(defs);
        }

        LiveLocals {
            local_count,
            use_sets,
            def_sets,
        }
    }

    /// Runs the analysis to its fixpoint.
    #[must_use]
    pub fn solve(graph: &FlowGraph, local_count: usize) -> LivenessResult {
        let results = DataFlowSolver::new(LiveLocals::new(graph, local_count)).solve(graph);
        LivenessResult { results }
    }
}

impl DataFlowAnalysis for LiveLocals {
    type Lattice = BitSet;
    const DIRECTION: Direction = Direction::Backward;

    fn boundary(&self, _graph: &FlowGraph) -> BitSet {
        BitSet::new(self.local_count)
    }

    fn initial(&self, _graph: &FlowGraph) -> BitSet {
        BitSet::new(self.local_count)
    }

    fn transfer(
        &self,
        node_id: FlowNodeId,
        _node: &FlowNode,
        input: &BitSet,
        _graph: &FlowGraph,
    ) -> BitSet {
        let mut live = input.clone();
        live.difference_with(&self.def_sets[node_id]);
        live.union_with(&self.use_sets[node_id]);
        live
    }
}

/// Fixpoint of [`LiveLocals`].
#[derive(Debug, Clone)]
pub struct LivenessResult {
    results: AnalysisResults<BitSet>,
}

impl LivenessResult {
    /// Locals live on exit from `node`.
    #[must_use]
    pub fn live_out(&self, node: FlowNodeId) -> Option<&BitSet> {
        self.results.out_state(node)
    }

}
