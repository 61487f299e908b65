//! The flow graph of a lowered state-machine body.
//!
//! The lowering pass hands over a coarse control flow graph of the finalized body: every node
//! covers an offset range, lists the declared locals it defines and uses, and may be marked as
//! suspending. A suspending node ends with an await that hands control back to the caller; the
//! method resumes at the node's successors on the next `MoveNext` call.
//!
//! Node `0` is the entry. Within a node, uses are read before the node's own definitions.

use crate::{metadata::range::OffsetRange, Invariant, Result};

/// Index of a [`FlowNode`] inside its [`FlowGraph`].
pub type FlowNodeId = usize;

/// One node of a [`FlowGraph`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowNode {
    /// Code covered by this node
    pub range: OffsetRange,
    /// Nodes control may continue with after this one
    pub successors: Vec<FlowNodeId>,
    /// The node ends by suspending at an await
    pub suspends: bool,
    /// Declaration indices of the locals written in this node
    pub defs: Vec<usize>,
    /// Declaration indices of the locals read in this node, before any write
    pub uses: Vec<usize>,
}

impl FlowNode {
    /// Creates a node covering `range` with no edges and no local accesses.
    #[must_use]
    pub fn new(range: OffsetRange) -> Self {
        FlowNode {
            range,
            ..FlowNode::default()
        }
    }

    /// Adds control flow edges to `successors`.
    #[must_use]
    pub fn to(mut self, successors: &[FlowNodeId]) -> Self {
        self.successors.extend_from_slice(successors);
        self
    }

    /// Marks the node as ending in a suspension.
    #[must_use]
    pub fn suspending(mut self) -> Self {
        self.suspends = true;
        self
    }

    /// Records writes to the given locals.
    #[must_use]
    pub fn defines(mut self, locals: &[usize]) -> Self {
        self.defs.extend_from_slice(locals);
        self
    }

    /// Records reads of the given locals.
    #[must_use]
    pub fn reads(mut self, locals: &[usize]) -> Self {
        self.uses.extend_from_slice(locals);
        self
    }
}

/// Control flow over the nodes of one method body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    predecessors: Vec<Vec<FlowNodeId>>,
}

impl FlowGraph {
    /// Builds a graph from `nodes`. Node `0` is the entry; dangling edges are ignored here and
    /// reported by [`FlowGraph::check`].
    #[must_use]
    pub fn new(nodes: Vec<FlowNode>) -> Self {
        let mut predecessors = vec![Vec::new(); nodes.len()];
        for (id, node) in nodes.iter().enumerate() {
            for &succ in &node.successors {
                if let Some(preds) = predecessors.get_mut(succ) {
                    if !preds.contains(&id) {
                        preds.push(id);
                    }
                }
            }
        }
        FlowGraph {
            nodes,
            predecessors,
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node with index `id`.
    #[must_use]
    pub fn node(&self, id: FlowNodeId) -> Option<&FlowNode> {
        self.nodes.get(id)
    }

    /// All nodes, by index.
    #[must_use]
    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    /// Successors of `id` that exist in the graph.
    pub fn successors(&self, id: FlowNodeId) -> impl Iterator<Item = FlowNodeId> + '_ {
        let count = self.nodes.len();
        self.nodes
            .get(id)
            .map(|n| n.successors.as_slice())
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |&s| s < count)
    }

    /// Predecessors of `id`.
    #[must_use]
    pub fn predecessors(&self, id: FlowNodeId) -> &[FlowNodeId] {
        self.predecessors.get(id).map_or(&[], Vec::as_slice)
    }

    /// Nodes without successors.
    pub fn exits(&self) -> impl Iterator<Item = FlowNodeId> + '_ {
        (0..self.nodes.len()).filter(|&id| self.successors(id).next().is_none())
    }

    /// Depth-first postorder from the entry, followed by nodes the entry cannot reach.
    #[must_use]
    pub fn postorder(&self) -> Vec<FlowNodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        if self.nodes.is_empty() {
            return order;
        }

        // (node, next successor position)
        let mut stack: Vec<(FlowNodeId, usize)> = vec![(0, 0)];
        visited[0] = true;
        while let Some((node, pos)) = stack.pop() {
            let next = self.successors(node).skip(pos).find(|&s| !visited[s]);
            match next {
                Some(succ) => {
                    stack.push((node, pos + 1));
                    visited[succ] = true;
                    stack.push((succ, 0));
                }
                None => order.push(node),
            }
        }

        order.extend((0..self.nodes.len()).filter(|&id| !visited[id]));
        order
    }

    /// Reverse of [`FlowGraph::postorder`].
    #[must_use]
    pub fn reverse_postorder(&self) -> Vec<FlowNodeId> {
        let mut order = self.postorder();
        order.reverse();
        order
    }

    /// Verifies that every edge and every local reference resolves.
    ///
    /// # Errors
    /// Returns [`crate::Error::InternalCompilerError`] with [`Invariant::BlockReference`] for a
    /// successor outside the graph or a local index outside `local_count`.
    pub fn check(&self, method: &str, local_count: usize) -> Result<()> {
        for (id, node) in self.nodes.iter().enumerate() {
            if let Some(&bad) = node.successors.iter().find(|&&s| s >= self.nodes.len()) {
                return Err(ice!(
                    method,
                    Invariant::BlockReference,
                    "flow node {} has successor {} but the graph has {} nodes",
                    id,
                    bad,
                    self.nodes.len()
                ));
            }
            if let Some(&bad) = node
                .defs
                .iter()
                .chain(node.uses.iter())
                .find(|&&l| l >= local_count)
            {
                return Err(ice!(
                    method,
                    Invariant::BlockReference,
                    "flow node {} references local {} but only {} are declared",
                    id,
                    bad,
                    local_count
                ));
            }
        }
        Ok(())
    }
}
