//! Blob encodings and the XML projection of compiled records.

use debugscope::{
    metadata::{
        customdebuginformation::{encode_custom_debug_info, parse_custom_debug_info},
        projection::{to_xml_string, write_records},
        sequencepoints::parse_sequence_points,
    },
    prelude::*,
};
use pretty_assertions::assert_eq;

fn module() -> Vec<LoweredMethod> {
    let kickoff = MethodRef::new("Worker", "PollAsync", "(System.Threading.CancellationToken)");
    vec![
        LoweredMethod::builder(
            kickoff.clone(),
            "Worker",
            SynthesizedKind::KickoffWrapper {
                state_machine_type: "Worker+<PollAsync>d__4".into(),
            },
        )
        .body_length(0x20)
        .build(),
        LoweredMethod::builder(
            MethodRef::new("Worker+<PollAsync>d__4", "MoveNext", "()"),
            "Worker",
            SynthesizedKind::StateMachineStep,
        )
        .declaration_order(4)
        .body_length(0x60)
        .visible(0x00, SourceSpan::new(1, 20, 9, 20, 10))
        .visible(0x08, SourceSpan::new(1, 21, 13, 21, 52))
        .hidden(0x1A)
        .visible(0x2C, SourceSpan::new(2, 4, 13, 6, 14))
        .block(
            LexicalBlock::loop_body(None, OffsetRange::new(0x08, 0x30))
                .with_duplicate(OffsetRange::new(0x40, 0x50)),
        )
        .local(DeclaredLocal::user("state", None).dynamic(vec![false, true, true]))
        .local(DeclaredLocal::user("attempt", Some(0)).hoisted())
        .state_machine(StateMachineInfo::new(kickoff).with_handler(0x54))
        .await_site(AwaitSite::resolved(0x1A, 0x2C))
        .imports(&[3, 1])
        .build(),
        LoweredMethod::builder(
            MethodRef::new("Worker", "<PollAsync>b__4_0", "(int)"),
            "Worker",
            SynthesizedKind::LambdaBody,
        )
        .declaration_order(5)
        .body_length(0x0A)
        .visible(0x00, SourceSpan::new(1, 22, 30, 22, 44))
        .build(),
    ]
}

#[test]
fn compiled_records_round_trip() -> Result<()> {
    let records = DebugInfoCompiler::new(DebugInfoConfig::strict()).compile(&module())?;

    for record in &records {
        let points = parse_sequence_points(&record.sequence_point_blob()?)?;
        assert_eq!(&points, record.sequence_points());

        let custom = parse_custom_debug_info(&record.custom_debug_info_blob()?)?;
        assert_eq!(custom.as_slice(), record.custom_debug_info());
    }

    let step = &records[1];
    let kinds: Vec<_> = step
        .custom_debug_info()
        .iter()
        .map(CustomDebugInfo::kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            CustomDebugKind::Using,
            CustomDebugKind::IteratorLocalsBuckets,
            CustomDebugKind::DynamicLocalsBuckets,
        ]
    );
    Ok(())
}

#[test]
fn forward_blob_layout() -> Result<()> {
    let blob = encode_custom_debug_info(&[CustomDebugInfo::Forward {
        target: MethodRef::new("A", "B", ""),
    }])?;

    // set header, record header, then "A\0B\0\0" as UTF-16LE padded to four bytes
    let expected: Vec<u8> = vec![
        4, 1, 0, 0, //
        4, 1, 0, 0, 20, 0, 0, 0, //
        b'A', 0, 0, 0, b'B', 0, 0, 0, 0, 0, 0, 0,
    ];
    assert_eq!(blob, expected);
    Ok(())
}

#[test]
fn oversized_dynamic_local_becomes_placeholder() -> Result<()> {
    let long_name = "x".repeat(64);
    let method = LoweredMethod::builder(
        MethodRef::new("C", "M", "()"),
        "C",
        SynthesizedKind::UserMethod,
    )
    .body_length(0x10)
    .local(DeclaredLocal::user(long_name, None).dynamic(vec![true]))
    .local(DeclaredLocal::user("d", None).dynamic(vec![true; 65]))
    .local(DeclaredLocal::user("ok", None).dynamic(vec![true]))
    .build();

    let records = DebugInfoCompiler::default().compile(&[method])?;
    let Some(CustomDebugInfo::DynamicLocalsBuckets { entries }) =
        records[0].custom_debug_info().last()
    else {
        panic!("expected dynamic locals");
    };
    assert_eq!(entries.len(), 3);
    assert!(entries[0].is_placeholder());
    assert!(entries[1].is_placeholder());
    assert_eq!(entries[2], DynamicLocalEntry::new(2, "ok", &[true]));

    let decoded = parse_custom_debug_info(&records[0].custom_debug_info_blob()?)?;
    assert_eq!(decoded.as_slice(), records[0].custom_debug_info());
    Ok(())
}

#[test]
fn damaged_blobs_are_rejected() {
    assert!(matches!(
        parse_custom_debug_info(&[4, 1, 0, 0, 4, 9, 0, 0, 8, 0, 0, 0]),
        Err(Error::Malformed { .. })
    ));
    assert!(matches!(
        parse_custom_debug_info(&[4, 2, 0, 0, 4, 0, 0, 0, 12, 0, 0, 0, 0, 0, 0, 0]),
        Err(Error::OutOfBounds)
    ));
    assert!(parse_sequence_points(&[1, 0x80]).is_err());
}

#[test]
fn projection_of_compiled_module() -> Result<()> {
    let records = DebugInfoCompiler::default().compile(&module())?;

    let step = to_xml_string(&records[1])?;
    assert!(step.contains("<async-info>"));
    assert!(!step.contains("catch-IL-offset"));
    assert!(step.contains(r#"<await yield="0x1a" resume="0x2c"/>"#));
    assert!(step.contains(r#"<kickoff-method declaringType="Worker" methodName="PollAsync""#));
    assert!(step.contains(r#"<local name="attempt" slot="1""#));
    assert!(step.contains(r#"storage="hoisted""#));
    assert!(step.contains(r#"<bucket startOffset="0x8" endOffset="0x50"/>"#));
    assert!(step.contains(r#"flags="011""#));

    let lambda = to_xml_string(&records[2])?;
    assert!(lambda.contains(r#"<forward declaringType="Worker+&lt;PollAsync&gt;d__4" methodName="MoveNext""#));

    let mut sink = Vec::new();
    write_records(&records, &mut sink)?;
    let all = String::from_utf8_lossy(&sink);
    assert!(all.contains(r#"<forwardIterator name="Worker+&lt;PollAsync&gt;d__4"/>"#));
    Ok(())
}
