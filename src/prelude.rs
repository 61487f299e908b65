//! # debugscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the
//! debugscope library. Import it to describe lowered methods, run the pipeline and inspect
//! the resulting records.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all debugscope operations
pub use crate::Error;

/// The invariants carried by internal compiler errors
pub use crate::Invariant;

/// The result type used throughout debugscope
pub use crate::Result;

// ================================================================================================
// Pipeline
// ================================================================================================

/// Module-level driver
pub use crate::compiler::DebugInfoCompiler;

/// Options of a compilation
pub use crate::metadata::validation::DebugInfoConfig;

/// Re-validation of finished records
pub use crate::metadata::validation::RecordValidator;

// ================================================================================================
// Input Model
// ================================================================================================

/// Lowered method description and its parts
pub use crate::metadata::lowered::{
    AwaitSite, BlockId, DeclaredLocal, LexicalBlock, LoweredMethod, LoweredMethodBuilder,
    StateMachineInfo, TraceEvent,
};

/// Method identity, role and protected regions
pub use crate::metadata::method::{
    ExceptionHandlerFlags, MethodRef, ProtectedRegion, SynthesizedKind,
};

/// Code offset ranges
pub use crate::metadata::range::OffsetRange;

/// Flow graph of a lowered body
pub use crate::analysis::{FlowGraph, FlowNode, FlowNodeId};

// ================================================================================================
// Records
// ================================================================================================

/// The per-method result
pub use crate::metadata::record::MethodDebugRecord;

/// Sequence points
pub use crate::metadata::sequencepoints::{
    SequencePoint, SequencePointBuilder, SequencePointKind, SequencePoints, SourceSpan,
};

/// Scopes and locals
pub use crate::metadata::scope::{
    LocalEntry, LocalKind, LocalStorage, LocalVisibility, Scope, ScopeId, ScopeTree,
};

/// Async metadata
pub use crate::metadata::asyncinfo::{AsyncInfo, AwaitPoint};

/// Custom debug information
pub use crate::metadata::customdebuginformation::{
    CustomDebugInfo, CustomDebugKind, DynamicLocalEntry, ForwardingPlan,
};
