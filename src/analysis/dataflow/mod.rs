//! Data flow analyses over a method's [`crate::analysis::FlowGraph`].
//!
//! - **Lattice**: sets of locals ([`crate::utils::BitSet`]) combined by union
//! - **Analysis**: transfer functions and boundary conditions ([`DataFlowAnalysis`])
//! - **Solver**: iterative fixpoint computation ([`DataFlowSolver`])
//!
//! [`ReachingDefinitions`] and [`LiveLocals`] together decide which locals must survive a
//! suspension and therefore be hoisted into state-machine fields.

mod framework;
mod lattice;
mod liveness;
mod reaching;
mod solver;

pub use framework::{AnalysisResults, DataFlowAnalysis, Direction};
pub use lattice::MeetSemiLattice;
pub use liveness::{LiveLocals, LivenessResult};
pub use reaching::{ReachingDefinitions, ReachingDefsResult};
pub use solver::DataFlowSolver;
