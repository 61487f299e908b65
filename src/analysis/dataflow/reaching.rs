//! Reaching definitions over locals.
//!
//! For the hoisting decision it only matters *whether* some write of a local may reach a
//! point, not which one, so the lattice holds one bit per local:
//!
//! - `IN[N]` = ∪{OUT[P] | P is a predecessor of N}
//! - `OUT[N]` = IN[N] ∪ DEF[N]
//!
//! A later write kills an earlier one but keeps the bit set, so kills never show in the result.

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

/// Forward may-analysis: which locals have a definition that may reach each node.
pub struct ReachingDefinitions {
    local_count: usize,
    gen_sets: Vec<BitSet>,
}

impl ReachingDefinitions {
    /// Prepares the analysis for `graph` with `local_count` declared locals.
    #[must_use]
    pub fn new(graph: &FlowGraph, local_count: usize) -> Self {
        let gen_sets = graph
            .nodes()
            .iter()
            .map(|node| {
                let mut defs = BitSet::new(local_count);
                for &local in &node.defs {
                    defs.insert(local);
                }
                defs
            })
            .collect();

        ReachingDefinitions {
            local_count,
            gen_sets,
        }
    }

    /// Runs the analysis to its fixpoint.
    #[must_use]
    pub fn solve(graph: &FlowGraph, local_count: usize) -> ReachingDefsResult {
        let results =
            DataFlowSolver::new(ReachingDefinitions::new(graph, local_count)).solve(graph);
        ReachingDefsResult { results }
    }
}

impl DataFlowAnalysis for ReachingDefinitions {
    type Lattice = BitSet;
    const DIRECTION: Direction = Direction::Forward;

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
        let mut out = input.clone();
        out.union_with(&self.gen_sets[node_id]);
        out
    }
}

/// Fixpoint of [`ReachingDefinitions`].
#[derive(Debug, Clone)]
pub struct ReachingDefsResult {
    results: AnalysisResults<BitSet>,
}

impl ReachingDefsResult {
    /// Locals with a definition that may reach the end of `node`.
    #[must_use]
    pub fn reaching_out(&self, node: FlowNodeId) -> Option<&BitSet> {
        self.results.out_state(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::range::OffsetRange;

    fn node(start: u32) -> FlowNode {
        FlowNode::new(OffsetRange::new(start, start + 4))
    }

    fn reaches_out(reach: &ReachingDefsResult, node: FlowNodeId, local: usize) -> bool {
        reach.reaching_out(node).is_some_and(|s| s.contains(local))
    }

    #[test]
    fn definition_flows_forward_only() {
        let graph = FlowGraph::new(vec![
            node(0).to(&[1]),
            node(4).defines(&[1]).to(&[2]),
            node(8),
        ]);
        let reach = ReachingDefinitions::solve(&graph, 2);
        assert!(!reaches_out(&reach, 0, 1));
        assert!(reaches_out(&reach, 1, 1));
        assert!(reaches_out(&reach, 2, 1));
        assert!(!reaches_out(&reach, 2, 0));
    }

    #[test]
    fn back_edge_into_entry() {
        let graph = FlowGraph::new(vec![node(0).to(&[1]), node(4).defines(&[0]).to(&[0])]);
        let reach = ReachingDefinitions::solve(&graph, 1);
        assert!(reaches_out(&reach, 0, 0));
    }
}
