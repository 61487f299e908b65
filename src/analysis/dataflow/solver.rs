//! Worklist-based data flow solver.
//!
//! 1. Initialize all nodes with the initial value
//! 2. Set the boundary value at the entry (forward) or the exits (backward)
//! 3. Add all nodes to the worklist in reverse postorder (forward) or postorder (backward)
//! 4. While the worklist is non-empty, recompute one node from its neighbours and requeue the
//!    nodes that depend on it when its result changed
//!
//! The lattices used here only grow, so the iteration terminates after at most
//! `nodes * locals` changes.

use std::collections::VecDeque;

use crate::analysis::{
    dataflow::{
        framework::{AnalysisResults, DataFlowAnalysis, Direction},
        lattice::MeetSemiLattice,
    },
    flow::{FlowGraph, FlowNodeId},
};

/// Worklist-based data flow solver.
///
/// ```rust,ignore
/// use debugscope::analysis::dataflow::{DataFlowSolver, LiveLocals};
///
/// let results = DataFlowSolver::new(LiveLocals::new(&graph, local_count)).solve(&graph);
/// let live = results.out_state(node_id);
/// ```
pub struct DataFlowSolver<A: DataFlowAnalysis> {
    analysis: A,
    in_states: Vec<A::Lattice>,
    out_states: Vec<A::Lattice>,
    worklist: VecDeque<FlowNodeId>,
    in_worklist: Vec<bool>,
    iterations: usize,
}

impl<A: DataFlowAnalysis> DataFlowSolver<A> {
    /// Creates a new solver for the given analysis.
    #[must_use]
    pub fn new(analysis: A) -> Self {
        Self {
            analysis,
            in_states: Vec::new(),
            out_states: Vec::new(),
            worklist: VecDeque::new(),
            in_worklist: Vec::new(),
            iterations: 0,
        }
    }

    /// Solves the analysis to a fixpoint over `graph`.
    pub fn solve(mut self, graph: &FlowGraph) -> AnalysisResults<A::Lattice> {
        if graph.is_empty() {
            return AnalysisResults::new(Vec::new(), Vec::new());
        }

        self.initialize(graph);
        while let Some(node) = self.worklist.pop_front() {
            self.in_worklist[node] = false;
            self.iterations += 1;

            let changed = match A::DIRECTION {
                Direction::Forward => self.process_forward(node, graph),
                Direction::Backward => self.process_backward(node, graph),
            };
            if changed {
                self.requeue_dependents(node, graph);
            }
        }

        tracing::trace!(iterations = self.iterations, nodes = graph.node_count(), "dataflow fixpoint");
        AnalysisResults::new(self.in_states, self.out_states)
    }

    fn initialize(&mut self, graph: &FlowGraph) {
        let count = graph.node_count();
        let initial = self.analysis.initial(graph);
        let boundary = self.analysis.boundary(graph);

        self.in_states = vec![initial.clone(); count];
        self.out_states = vec![initial; count];
        self.in_worklist = vec![false; count];

        let order = match A::DIRECTION {
            Direction::Forward => {
                self.in_states[0] = boundary;
                graph.reverse_postorder()
            }
            Direction::Backward => {
                for exit in graph.exits() {
                    self.out_states[exit] = boundary.clone();
                }
                graph.postorder()
            }
        };

        for node in order {
            self.worklist.push_back(node);
            self.in_worklist[node] = true;
        }
    }

    fn process_forward(&mut self, node: FlowNodeId, graph: &FlowGraph) -> bool {
        let merged = graph
            .predecessors(node)
            .iter()
            .map(|&p| self.out_states[p].clone())
            .reduce(|acc, s| acc.meet(&s));
        if let Some(merged) = merged {
            // The entry keeps its boundary value and also receives back edges.
            self.in_states[node] = if node == 0 {
                self.in_states[0].meet(&merged)
            } else {
                merged
            };
        }

        let Some(data) = graph.node(node) else {
            return false;
        };
        let output = self
            .analysis
            .transfer(node, data, &self.in_states[node], graph);
        if output == self.out_states[node] {
            return false;
        }
        self.out_states[node] = output;
        true
    }

    fn process_backward(&mut self, node: FlowNodeId, graph: &FlowGraph) -> bool {
        if let Some(output) = graph
            .successors(node)
            .map(|s| self.in_states[s].clone())
            .reduce(|acc, s| acc.meet(&s))
        {
            self.out_states[node] = output;
        }

        let Some(data) = graph.node(node) else {
            return false;
        };
        let input = self
            .analysis
            .transfer(node, data, &self.out_states[node], graph);
        if input == self.in_states[node] {
            return false;
        }
        self.in_states[node] = input;
        true
    }

    fn requeue_dependents(&mut self, node: FlowNodeId, graph: &FlowGraph) {
        let dependents: Vec<FlowNodeId> = match A::DIRECTION {
            Direction::Forward => graph.successors(node).collect(),
            Direction::Backward => graph.predecessors(node).to_vec(),
        };
        for dep in dependents {
            if !self.in_worklist[dep] {
                self.in_worklist[dep] = true;
                self.worklist.push_back(dep);
            }
        }
    }
}
