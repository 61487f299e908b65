//! Lexical scopes and locals of lowered methods.
//!
//! For every method the tracker produces a [`ScopeTree`]: nested scopes over final code
//! ranges, each listing the locals declared in it. Every local is classified as a frame slot or
//! as a field hoisted into the state machine ([`LocalStorage`]), and numbered with a dense slot
//! id the debugger uses to match locals with their storage.
//!
//! # Key Components
//!
//! - [`HoistingAnalysis`] - the dataflow decision which locals survive a suspension
//! - [`ScopeBuilder`] - clips blocks to reachable code, validates nesting, assigns slots
//! - [`ScopeTree`] - the arena of finished scopes
//!
//! # Usage Examples
//!
//! ```rust
//! use debugscope::analysis::FlowNode;
//! use debugscope::metadata::{
//!     lowered::{DeclaredLocal, LexicalBlock, LoweredMethod},
//!     method::{MethodRef, SynthesizedKind},
//!     range::OffsetRange,
//!     scope::{HoistingAnalysis, LocalStorage, ScopeBuilder},
//! };
//!
//! let method = LoweredMethod::builder(
//!     MethodRef::new("C+<M>d__0", "MoveNext", "()"),
//!     "C",
//!     SynthesizedKind::StateMachineStep,
//! )
//! .body_length(0x20)
//! .block(LexicalBlock::new(None, OffsetRange::new(0, 0x20)))
//! .local(DeclaredLocal::user("x", Some(0)))
//! .flow_node(FlowNode::new(OffsetRange::new(0, 0x10)).defines(&[0]).suspending().to(&[1]))
//! .flow_node(FlowNode::new(OffsetRange::new(0x10, 0x20)).reads(&[0]))
//! .build();
//!
//! let storage = HoistingAnalysis::classify("C+<M>d__0.MoveNext", &method.flow, &method.locals)?;
//! assert_eq!(storage, vec![LocalStorage::Hoisted]);
//!
//! let tree = ScopeBuilder::new(&method).build(&storage)?;
//! assert_eq!(tree.local_count(), 1);
//! # Ok::<(), debugscope::Error>(())
//! ```

mod builder;
mod hoisting;
mod types;

pub use builder::ScopeBuilder;
pub use hoisting::HoistingAnalysis;
pub use types::{LocalEntry, LocalKind, LocalStorage, LocalVisibility, Scope, ScopeId, ScopeTree};
