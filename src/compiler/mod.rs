//! Module-level driver of debug-information generation.
//!
//! This module sits on top of [`crate::metadata`] and runs its builders for every method of a
//! module in the right order:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     DebugInfoCompiler                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  Phase 1: per method (rayon)                                     │
//! │    ├─ SequencePointBuilder     trace events → table              │
//! │    ├─ HoistingAnalysis         reaching defs ∩ liveness          │
//! │    ├─ ScopeBuilder             blocks → scope tree + slots       │
//! │    └─ AsyncInfo                await sites → await points        │
//! │                                                                  │
//! │  Phase 2: per type (sequential)                                  │
//! │    └─ ForwardingPlan           one import owner per type         │
//! │                                                                  │
//! │  Phase 3: per method (rayon)                                     │
//! │    ├─ CustomDebugInfoEmitter   import, iterator, dynamic records │
//! │    └─ RecordValidator          optional re-validation            │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

mod pipeline;

pub use pipeline::DebugInfoCompiler;
