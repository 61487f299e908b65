//! Fixtures for unit tests: small lowered methods in the shapes the lowering pass produces.

use crate::metadata::{
    lowered::{AwaitSite, LoweredMethod, StateMachineInfo},
    method::{MethodRef, SynthesizedKind},
    sequencepoints::SourceSpan,
};

/// A single-line span in document 1.
pub fn span(line: u32, start_col: u16, end_col: u16) -> SourceSpan {
    SourceSpan::new(1, line, start_col, line, end_col)
}

/// A plain user method of `owning_type` with a body of `length` bytes.
pub fn user_method(owning_type: &str, name: &str, order: u32, length: u32) -> LoweredMethod {
    LoweredMethod::builder(
        MethodRef::new(owning_type, name, "()"),
        owning_type,
        SynthesizedKind::UserMethod,
    )
    .declaration_order(order)
    .body_length(length)
    .build()
}

/// The kickoff wrapper and step method of `async Task {name}()` on type `C`, with one await
/// per `(yield, resume)` pair.
pub fn async_pair(name: &str, awaits: &[(u32, u32)]) -> Vec<LoweredMethod> {
    let kickoff = MethodRef::new("C", name, "()");
    let state_machine_type = format!("C+<{name}>d__0");

    let wrapper = LoweredMethod::builder(
        kickoff.clone(),
        "C",
        SynthesizedKind::KickoffWrapper {
            state_machine_type: state_machine_type.clone(),
        },
    )
    .body_length(0x10)
    .build();

    let mut step = LoweredMethod::builder(
        MethodRef::new(state_machine_type, "MoveNext", "()"),
        "C",
        SynthesizedKind::StateMachineStep,
    )
    .declaration_order(1)
    .body_length(0x40)
    .visible(0, span(3, 5, 20))
    .state_machine(StateMachineInfo::new(kickoff))
    .imports(&[1]);
    for &(yield_offset, resume_offset) in awaits {
        step = step
            .hidden(yield_offset)
            .await_site(AwaitSite::resolved(yield_offset, resume_offset));
    }

    vec![wrapper, step.build()]
}
