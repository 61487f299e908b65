// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # debugscope
//!
//! Debug-information model builder for methods that a compiler lowered into state machines.
//!
//! Once `async` methods and iterators are rewritten into generated state-machine types, source
//! statements, locals and await expressions no longer exist 1:1 in the emitted code.
//! `debugscope` takes the final code layout together with the bookkeeping of the lowering
//! phase and reconstructs what a debugger needs to step through such code as if it were the
//! original method.
//!
//! ## Features
//!
//! - **Sequence points** - ordered offset to source span table with hidden points and a
//!   compressed blob encoding
//! - **Scopes and hoisting** - nested scope trees clipped to reachable code, with a dataflow
//!   decision which locals live in state-machine fields
//! - **Async info** - kickoff method, await yield/resume offsets and catch dispatch
//! - **Custom debug information** - import ownership and forwarding, iterator locals buckets,
//!   dynamic locals, in a versioned binary record set
//! - **Validation** - every builder invariant re-checked on finished records
//! - **XML projection** - readable rendering for tests and diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use debugscope::prelude::*;
//!
//! let kickoff = MethodRef::new("C", "RunAsync", "()");
//! let methods = vec![
//!     LoweredMethod::builder(
//!         kickoff.clone(),
//!         "C",
//!         SynthesizedKind::KickoffWrapper { state_machine_type: "C+<RunAsync>d__0".into() },
//!     )
//!     .body_length(0x18)
//!     .build(),
//!     LoweredMethod::builder(
//!         MethodRef::new("C+<RunAsync>d__0", "MoveNext", "()"),
//!         "C",
//!         SynthesizedKind::StateMachineStep,
//!     )
//!     .declaration_order(1)
//!     .body_length(0x40)
//!     .visible(0x00, SourceSpan::new(1, 4, 9, 4, 30))
//!     .hidden(0x12)
//!     .state_machine(StateMachineInfo::new(kickoff))
//!     .await_site(AwaitSite::resolved(0x12, 0x28))
//!     .build(),
//! ];
//!
//! let records = DebugInfoCompiler::new(DebugInfoConfig::strict()).compile(&methods)?;
//! let step = &records[1];
//! assert_eq!(step.async_info().map(|info| info.await_points.len()), Some(1));
//! assert_eq!(step.sequence_points().len(), 2);
//! # Ok::<(), debugscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - the data model, the per-method builders and the blob codecs
//! - [`analysis`] - flow graph and dataflow analyses behind the hoisting decision
//! - [`compiler`] - the module-level pipeline
//! - [`file`] - little-endian and compressed-integer primitives
//! - [`Error`] and [`Result`] - error handling
//!
//! Every builder failure is an [`Error::InternalCompilerError`]: the lowering phase handed
//! over data that breaks one of the [`Invariant`]s, and the compilation has to stop.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use debugscope::prelude::*;
///
/// let config = DebugInfoConfig::minimal();
/// let compiler = DebugInfoCompiler::new(config);
/// assert!(compiler.compile(&[])?.is_empty());
/// # Ok::<(), debugscope::Error>(())
/// ```
pub mod prelude;

/// Binary primitives shared by the blob encoders and decoders
pub mod file;

/// Flow graph and dataflow analyses
pub mod analysis;

/// Debug-information model, builders and codecs
pub mod metadata;

/// Module-level pipeline
pub mod compiler;

/// Shared helpers
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::{Error, Invariant};

/// Drives the builders for a whole module.
///
/// See [`compiler::DebugInfoCompiler`].
pub use compiler::DebugInfoCompiler;

/// Options of a compilation.
///
/// See [`metadata::validation::DebugInfoConfig`].
pub use metadata::validation::DebugInfoConfig;

/// Bounds-checked cursor over a blob.
pub use file::parser::Parser;
