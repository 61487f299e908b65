//! Program analysis over lowered state-machine bodies.
//!
//! - [`flow`] - the coarse flow graph handed over by the lowering pass
//! - [`dataflow`] - fixpoint analyses over that graph (reaching definitions, live locals)
//!
//! The hoisting decision of [`crate::metadata::scope`] is built on these two analyses.

pub mod dataflow;
pub mod flow;

pub use dataflow::{DataFlowSolver, LiveLocals, ReachingDefinitions};
pub use flow::{FlowGraph, FlowNode, FlowNodeId};
