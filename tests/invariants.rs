//! Inconsistent lowered input aborts the compilation with the violated invariant.

use debugscope::prelude::*;

fn method(kind: SynthesizedKind) -> LoweredMethodBuilder {
    LoweredMethod::builder(MethodRef::new("C", "M", "()"), "C", kind).body_length(0x40)
}

fn invariant_of(method: LoweredMethod) -> Option<Invariant> {
    DebugInfoCompiler::new(DebugInfoConfig::strict())
        .compile(&[method])
        .err()
        .and_then(|err| err.invariant())
}

#[test]
fn block_escaping_its_parent() {
    let m = method(SynthesizedKind::UserMethod)
        .block(LexicalBlock::new(None, OffsetRange::new(0x00, 0x20)))
        .block(LexicalBlock::new(Some(0), OffsetRange::new(0x10, 0x30)))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::ScopeNesting));
}

#[test]
fn overlapping_sibling_blocks() {
    let m = method(SynthesizedKind::UserMethod)
        .block(LexicalBlock::new(None, OffsetRange::new(0x00, 0x20)))
        .block(LexicalBlock::new(None, OffsetRange::new(0x18, 0x30)))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::ScopeNesting));
}

#[test]
fn block_with_forward_parent() {
    let m = method(SynthesizedKind::UserMethod)
        .block(LexicalBlock::new(Some(1), OffsetRange::new(0x00, 0x10)))
        .block(LexicalBlock::new(None, OffsetRange::new(0x00, 0x20)))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::BlockReference));
}

#[test]
fn local_in_unknown_block() {
    let m = method(SynthesizedKind::UserMethod)
        .local(DeclaredLocal::user("x", Some(3)))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::BlockReference));
}

#[test]
fn live_range_escaping_block() {
    let m = method(SynthesizedKind::UserMethod)
        .block(LexicalBlock::new(None, OffsetRange::new(0x10, 0x20)))
        .local(DeclaredLocal::user("x", Some(0)).live(OffsetRange::new(0x10, 0x28)))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::LocalContainment));
}

#[test]
fn flow_node_reading_unknown_local() {
    let m = method(SynthesizedKind::StateMachineStep)
        .local(DeclaredLocal::user("x", None))
        .flow_node(FlowNode::new(OffsetRange::new(0x00, 0x40)).reads(&[4]))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::BlockReference));
}

#[test]
fn unresolved_await() {
    let m = method(SynthesizedKind::StateMachineStep)
        .state_machine(StateMachineInfo::new(MethodRef::new("C", "K", "()")))
        .await_site(AwaitSite {
            yield_offset: Some(0x10),
            resume_offset: None,
        })
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::AwaitResolution));
}

#[test]
fn await_outside_body() {
    let m = method(SynthesizedKind::StateMachineStep)
        .state_machine(StateMachineInfo::new(MethodRef::new("C", "K", "()")))
        .await_site(AwaitSite::resolved(0x10, 0x48))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::AwaitResolution));
}

#[test]
fn await_in_eliminated_code() {
    let m = method(SynthesizedKind::StateMachineStep)
        .reachable(OffsetRange::new(0x00, 0x10))
        .reachable(OffsetRange::new(0x30, 0x40))
        .state_machine(StateMachineInfo::new(MethodRef::new("C", "K", "()")))
        .await_site(AwaitSite::resolved(0x14, 0x20))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::AwaitResolution));
}

#[test]
fn await_resuming_in_eliminated_code() {
    let m = method(SynthesizedKind::StateMachineStep)
        .reachable(OffsetRange::new(0x00, 0x10))
        .reachable(OffsetRange::new(0x30, 0x40))
        .state_machine(StateMachineInfo::new(MethodRef::new("C", "K", "()")))
        .await_site(AwaitSite::resolved(0x08, 0x20))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::AwaitResolution));
}

#[test]
fn await_resuming_before_it_yields() {
    let m = method(SynthesizedKind::StateMachineStep)
        .state_machine(StateMachineInfo::new(MethodRef::new("C", "K", "()")))
        .await_site(AwaitSite::resolved(0x20, 0x10))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::AwaitOrdering));
}

#[test]
fn awaits_without_state_machine() {
    let m = method(SynthesizedKind::UserMethod)
        .await_site(AwaitSite::resolved(0x10, 0x20))
        .build();
    assert_eq!(invariant_of(m), Some(Invariant::AwaitResolution));
}

#[test]
fn duplicate_method_identity() {
    let first = method(SynthesizedKind::UserMethod).declaration_order(0).build();
    let second = method(SynthesizedKind::LambdaBody).declaration_order(1).build();
    let err = DebugInfoCompiler::new(DebugInfoConfig::strict())
        .compile(&[first, second])
        .unwrap_err();
    assert_eq!(err.invariant(), Some(Invariant::ExclusiveOwnership));
}

#[test]
fn consistent_input_passes() {
    let m = method(SynthesizedKind::UserMethod)
        .visible(0, SourceSpan::new(1, 1, 1, 1, 10))
        .block(LexicalBlock::new(None, OffsetRange::new(0x10, 0x20)))
        .local(DeclaredLocal::user("x", Some(0)).live(OffsetRange::new(0x14, 0x18)))
        .build();
    assert_eq!(invariant_of(m), None);
}
