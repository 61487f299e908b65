//! Data flow analysis framework trait and direction.
//!
//! Any specific analysis implements the [`DataFlowAnalysis`] trait to work with the
//! [`crate::analysis::dataflow::DataFlowSolver`].

use crate::analysis::{
    dataflow::lattice::MeetSemiLattice,
    flow::{FlowGraph, FlowNode, FlowNodeId},
};

/// Direction of data flow analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Information flows from the entry towards the exits.
    ///
    /// Examples: reaching definitions.
    Forward,

    /// Information flows from the exits back towards the entry.
    ///
    /// Examples: live locals.
    Backward,
}

/// A data flow analysis over a [`FlowGraph`].
///
/// Implementations provide the transfer function and boundary conditions; the solver handles
/// iteration to a fixpoint.
///
/// For forward analyses: `out[N] = transfer(N, in[N])`
/// For backward analyses: `in[N] = transfer(N, out[N])`
pub trait DataFlowAnalysis {
    /// The lattice type for this analysis.
    type Lattice: MeetSemiLattice;

    /// The direction of this analysis.
    const DIRECTION: Direction;

    /// The value at the entry (forward) or at the exits (backward).
    fn boundary(&self, graph: &FlowGraph) -> Self::Lattice;

    /// The value every other node starts from.
    fn initial(&self, graph: &FlowGraph) -> Self::Lattice;

    /// Computes the state after flowing through `node`.
    fn transfer(
        &self,
        node_id: FlowNodeId,
        node: &FlowNode,
        input: &Self::Lattice,
        graph: &FlowGraph,
    ) -> Self::Lattice;
}

/// Results of a data flow analysis: the abstract values at node boundaries.
#[derive(Debug, Clone)]
pub struct AnalysisResults<L> {
    /// State on entry to each node.
    pub in_states: Vec<L>,
    /// State on exit from each node.
    pub out_states: Vec<L>,
}

impl<L: Clone> AnalysisResults<L> {
    /// Creates new analysis results with the given states.
    #[must_use]
    pub fn new(in_states: Vec<L>, out_states: Vec<L>) -> Self {
        Self {
            in_states,
            out_states,
        }
    }

    /// Returns the state on exit from `node`.
    #[must_use]
    pub fn out_state(&self, node: FlowNodeId) -> Option<&L> {
        self.out_states.get(node)
    }
}
