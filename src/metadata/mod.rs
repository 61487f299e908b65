//! Debug-information model of compiled methods.
//!
//! This module contains the data model handed over by the lowering phase and the builders that
//! turn it into the debug records a debugger consumes.
//!
//! # Key Components
//!
//! - [`lowered`] - What lowering knows about a method: trace, blocks, locals, awaits
//! - [`sequencepoints`] - Offset to source-span table and its blob encoding
//! - [`scope`] - Scope tree construction and hoisting classification
//! - [`asyncinfo`] - Await points and catch dispatch of state-machine steps
//! - [`customdebuginformation`] - Import forwarding, iterator and dynamic locals records
//! - [`record`] - The immutable per-method result
//! - [`validation`] - Configuration and re-validation of finished records
//! - [`projection`] - XML rendering for tests and diagnostics
//!
//! # Examples
//!
//! ```rust
//! use debugscope::metadata::{
//!     lowered::{DeclaredLocal, LoweredMethod},
//!     method::{MethodRef, SynthesizedKind},
//!     scope::{HoistingAnalysis, ScopeBuilder},
//! };
//!
//! let method = LoweredMethod::builder(MethodRef::new("C", "M", "()"), "C", SynthesizedKind::UserMethod)
//!     .body_length(0x20)
//!     .local(DeclaredLocal::user("x", None))
//!     .build();
//!
//! let storage = HoistingAnalysis::classify("C.M()", &method.flow, &method.locals)?;
//! let scopes = ScopeBuilder::new(&method).build(&storage)?;
//! assert_eq!(scopes.local_count(), 1);
//! # Ok::<(), debugscope::Error>(())
//! ```

/// Await points and catch dispatch of state-machine step methods
pub mod asyncinfo;
/// Custom debug information records, their encoding and the forwarding plan
pub mod customdebuginformation;
/// Input model produced by the lowering phase
pub mod lowered;
/// Method identity, synthesized kinds and protected regions
pub mod method;
/// XML projection of finished records
pub mod projection;
/// Half-open code offset ranges
pub mod range;
/// The immutable per-method debug record
pub mod record;
/// Scope trees and local hoisting
pub mod scope;
/// Sequence point tables
pub mod sequencepoints;
/// Configuration and record re-validation
pub mod validation;
