//! Benchmarks for building and encoding debug records.
//!
//! - Pipeline over a module of async methods (sequential and parallel)
//! - Sequence point blob encoding and decoding
//! - Custom debug information blob encoding and decoding

extern crate debugscope;

use criterion::{criterion_group, criterion_main, Criterion};
use debugscope::{
    metadata::{
        customdebuginformation::{encode_custom_debug_info, parse_custom_debug_info},
        sequencepoints::{encode_sequence_points, parse_sequence_points},
    },
    prelude::*,
};
use std::hint::black_box;

/// One async method per index: a kickoff wrapper and a step method with a loop, a hoisted
/// local and three awaits.
fn module(size: usize) -> Vec<LoweredMethod> {
    let mut methods = Vec::with_capacity(size * 2);
    for index in 0..size {
        let order = u32::try_from(index).unwrap() * 2;
        let kickoff = MethodRef::new("Service", format!("Run{index}Async"), "()");
        let state_machine = format!("Service+<Run{index}Async>d__{index}");

        methods.push(
            LoweredMethod::builder(
                kickoff.clone(),
                "Service",
                SynthesizedKind::KickoffWrapper {
                    state_machine_type: state_machine.clone(),
                },
            )
            .declaration_order(order)
            .body_length(0x20)
            .build(),
        );

        let mut step = LoweredMethod::builder(
            MethodRef::new(state_machine, "MoveNext", "()"),
            "Service",
            SynthesizedKind::StateMachineStep,
        )
        .declaration_order(order + 1)
        .body_length(0x100)
        .block(
            LexicalBlock::loop_body(None, OffsetRange::new(0x20, 0x80))
                .with_duplicate(OffsetRange::new(0xA0, 0xC0)),
        )
        .local(DeclaredLocal::user("item", Some(0)))
        .local(DeclaredLocal::user("total", None).dynamic(vec![false, true]))
        .flow_node(FlowNode::new(OffsetRange::new(0x00, 0x20)).defines(&[1]).to(&[1]))
        .flow_node(
            FlowNode::new(OffsetRange::new(0x20, 0x50))
                .defines(&[0])
                .suspending()
                .to(&[2]),
        )
        .flow_node(
            FlowNode::new(OffsetRange::new(0x50, 0x80))
                .reads(&[0, 1])
                .to(&[1, 3]),
        )
        .flow_node(FlowNode::new(OffsetRange::new(0x80, 0x100)).reads(&[1]))
        .state_machine(StateMachineInfo::new(kickoff))
        .imports(&[4, 2]);

        for line in 0..24u32 {
            let offset = line * 8;
            step = if line % 5 == 4 {
                step.hidden(offset)
            } else {
                step.visible(offset, SourceSpan::new(1, 10 + line, 9, 10 + line, 40))
            };
        }
        for (yield_offset, resume_offset) in [(0x30, 0x40), (0x60, 0x70), (0xB0, 0xB8)] {
            step = step.await_site(AwaitSite::resolved(yield_offset, resume_offset));
        }
        methods.push(step.build());
    }
    methods
}

fn bench_compile(c: &mut Criterion) {
    let methods = module(256);

    c.bench_function("compile_256_async_methods", |b| {
        let compiler = DebugInfoCompiler::new(DebugInfoConfig::default());
        b.iter(|| black_box(compiler.compile(black_box(&methods)).unwrap()));
    });

    c.bench_function("compile_256_async_methods_sequential", |b| {
        let compiler = DebugInfoCompiler::new(DebugInfoConfig {
            parallel: false,
            ..DebugInfoConfig::default()
        });
        b.iter(|| black_box(compiler.compile(black_box(&methods)).unwrap()));
    });
}

fn bench_blobs(c: &mut Criterion) {
    let records = DebugInfoCompiler::default().compile(&module(1)).unwrap();
    let step = &records[1];

    let points = encode_sequence_points(step.sequence_points()).unwrap();
    c.bench_function("sequence_points_encode", |b| {
        b.iter(|| black_box(encode_sequence_points(black_box(step.sequence_points())).unwrap()));
    });
    c.bench_function("sequence_points_parse", |b| {
        b.iter(|| black_box(parse_sequence_points(black_box(&points)).unwrap()));
    });

    let custom = encode_custom_debug_info(step.custom_debug_info()).unwrap();
    c.bench_function("custom_debug_info_encode", |b| {
        b.iter(|| black_box(encode_custom_debug_info(black_box(step.custom_debug_info())).unwrap()));
    });
    c.bench_function("custom_debug_info_parse", |b| {
        b.iter(|| black_box(parse_custom_debug_info(black_box(&custom)).unwrap()));
    });
}

criterion_group!(benches, bench_compile, bench_blobs);
criterion_main!(benches);
