//! Method identities and the roles compiler-synthesized methods play.
//!
//! A lowered async or iterator method turns into several methods: a kickoff wrapper that keeps
//! the original signature, a state-machine step method (`MoveNext`) holding the user code, and
//! possibly lambda bodies and a type initializer. [`SynthesizedKind`] records which role a
//! method plays; the custom debug information emitter uses it to decide which method owns the
//! namespace import record of a type.

mod exceptions;

pub use exceptions::{ExceptionHandlerFlags, ProtectedRegion};

use std::fmt;

/// A value reference to a method.
///
/// Debug records never hold live references into compiler state; a method is named by its
/// declaring type, name and parameter signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodRef {
    /// Fully qualified name of the declaring type
    pub declaring_type: String,
    /// Simple method name
    pub method_name: String,
    /// Parameter signature, e.g. `(int, string)`
    pub parameter_signature: String,
}

impl MethodRef {
    /// Creates a method reference.
    pub fn new(
        declaring_type: impl Into<String>,
        method_name: impl Into<String>,
        parameter_signature: impl Into<String>,
    ) -> Self {
        MethodRef {
            declaring_type: declaring_type.into(),
            method_name: method_name.into(),
            parameter_signature: parameter_signature.into(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}{}",
            self.declaring_type, self.method_name, self.parameter_signature
        )
    }
}

/// The role a method plays after lowering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SynthesizedKind {
    /// An ordinary method with user code
    UserMethod,
    /// The static type initializer
    TypeInitializer,
    /// The step method of a state machine (`MoveNext`)
    StateMachineStep,
    /// A compiler-generated lambda body
    LambdaBody,
    /// The stub that creates and starts a state machine
    KickoffWrapper {
        /// Fully qualified name of the state-machine type it starts
        state_machine_type: String,
    },
}

impl SynthesizedKind {
    /// Returns `true` for kickoff wrappers, which never own or forward imports.
    #[must_use]
    pub fn is_kickoff(&self) -> bool {
        matches!(self, SynthesizedKind::KickoffWrapper { .. })
    }
}
