//! XML rendering of finished debug records.
//!
//! The projection is meant for diffs in tests and for eyeballing what a debugger will see. It
//! is not a storage format and nothing reads it back. Offsets are rendered as `0x`-prefixed
//! hex, lines and columns as decimal.
//!
//! ```text
//! <method name="C+&lt;M&gt;d__0.MoveNext()">
//!   <sequencepoints>
//!     <entry il_offset="0x0" hidden="true" start_row="16707566" .../>
//!   </sequencepoints>
//!   <locals>
//!     <scope start="0x0" end="0x40">
//!       <local name="x" slot="0" start="0x0" end="0x40" storage="hoisted" visibility="user"/>
//!     </scope>
//!   </locals>
//!   <async-info catch-IL-offset="0x38">
//!     <kickoff-method declaringType="C" methodName="M" parameterNames="()"/>
//!     <await yield="0x10" resume="0x22"/>
//!   </async-info>
//!   <customDebugInfo>
//!     <forward declaringType="C" methodName="A" parameterNames="()"/>
//!   </customDebugInfo>
//! </method>
//! ```

use std::io::{Cursor, Write};

use quick_xml::{
    events::{BytesEnd, BytesStart, Event},
    Writer,
};

use crate::{
    metadata::{
        asyncinfo::AsyncInfo,
        customdebuginformation::CustomDebugInfo,
        method::MethodRef,
        record::MethodDebugRecord,
        scope::{ScopeId, ScopeTree},
        sequencepoints::{SequencePoints, HIDDEN_LINE},
    },
    Result,
};

/// Writes the XML projection of `records` into `sink`, wrapped in a `<methods>` element.
///
/// # Errors
/// Returns [`crate::Error::Io`] or [`crate::Error::Xml`] if the sink fails.
pub fn write_records<W: Write>(records: &[MethodDebugRecord], sink: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(sink, b' ', 2);
    writer.write_event(Event::Start(BytesStart::new("methods")))?;
    for record in records {
        write_method(&mut writer, record)?;
    }
    writer.write_event(Event::End(BytesEnd::new("methods")))?;
    Ok(())
}

/// Renders one record as an XML string.
///
/// # Errors
/// Returns [`crate::Error::Xml`] if the writer fails.
pub fn to_xml_string(record: &MethodDebugRecord) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    write_method(&mut writer, record)?;
    Ok(String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned())
}

fn hex(value: u32) -> String {
    format!("{value:#x}")
}

fn write_method<W: Write>(writer: &mut Writer<W>, record: &MethodDebugRecord) -> Result<()> {
    let mut method = BytesStart::new("method");
    method.push_attribute(("name", record.method().to_string().as_str()));
    writer.write_event(Event::Start(method))?;

    write_sequence_points(writer, record.sequence_points())?;
    write_scopes(writer, record.scopes())?;
    if let Some(info) = record.async_info() {
        write_async_info(writer, info)?;
    }
    write_custom_debug_info(writer, record.custom_debug_info())?;

    writer.write_event(Event::End(BytesEnd::new("method")))?;
    Ok(())
}

fn write_sequence_points<W: Write>(writer: &mut Writer<W>, points: &SequencePoints) -> Result<()> {
    if points.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("sequencepoints")))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("sequencepoints")))?;
    for point in points {
        let mut entry = BytesStart::new("entry");
        entry.push_attribute(("il_offset", hex(point.offset).as_str()));
        match point.span() {
            Some(span) => {
                entry.push_attribute(("start_row", span.start_line.to_string().as_str()));
                entry.push_attribute(("start_column", span.start_col.to_string().as_str()));
                entry.push_attribute(("end_row", span.end_line.to_string().as_str()));
                entry.push_attribute(("end_column", span.end_col.to_string().as_str()));
                entry.push_attribute(("document", span.document.to_string().as_str()));
            }
            None => {
                let row = HIDDEN_LINE.to_string();
                entry.push_attribute(("hidden", "true"));
                entry.push_attribute(("start_row", row.as_str()));
                entry.push_attribute(("start_column", "0"));
                entry.push_attribute(("end_row", row.as_str()));
                entry.push_attribute(("end_column", "0"));
            }
        }
        writer.write_event(Event::Empty(entry))?;
    }
    writer.write_event(Event::End(BytesEnd::new("sequencepoints")))?;
    Ok(())
}

fn write_scopes<W: Write>(writer: &mut Writer<W>, tree: &ScopeTree) -> Result<()> {
    if tree.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("locals")))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("locals")))?;
    write_scope(writer, tree, 0)?;
    writer.write_event(Event::End(BytesEnd::new("locals")))?;
    Ok(())
}

fn write_scope<W: Write>(writer: &mut Writer<W>, tree: &ScopeTree, id: ScopeId) -> Result<()> {
    let Some(scope) = tree.get(id) else {
        return Ok(());
    };

    let mut start = BytesStart::new("scope");
    start.push_attribute(("start", hex(scope.range.start).as_str()));
    start.push_attribute(("end", hex(scope.range.end).as_str()));
    if scope.locals.is_empty() && scope.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;

    for local in &scope.locals {
        let mut entry = BytesStart::new("local");
        entry.push_attribute(("name", local.name.as_str()));
        entry.push_attribute(("slot", local.slot.to_string().as_str()));
        entry.push_attribute(("start", hex(local.live_range.start).as_str()));
        entry.push_attribute(("end", hex(local.live_range.end).as_str()));
        entry.push_attribute(("storage", local.storage.to_string().as_str()));
        entry.push_attribute(("visibility", local.visibility.to_string().as_str()));
        writer.write_event(Event::Empty(entry))?;
    }
    for &child in &scope.children {
        write_scope(writer, tree, child)?;
    }

    writer.write_event(Event::End(BytesEnd::new("scope")))?;
    Ok(())
}

fn method_ref_element<'a>(name: &'a str, method: &MethodRef) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("declaringType", method.declaring_type.as_str()));
    element.push_attribute(("methodName", method.method_name.as_str()));
    element.push_attribute(("parameterNames", method.parameter_signature.as_str()));
    element
}

fn write_async_info<W: Write>(writer: &mut Writer<W>, info: &AsyncInfo) -> Result<()> {
    let mut start = BytesStart::new("async-info");
    if let Some(offset) = info.catch_dispatch_offset {
        start.push_attribute(("catch-IL-offset", hex(offset).as_str()));
    }
    writer.write_event(Event::Start(start))?;

    writer.write_event(Event::Empty(method_ref_element("kickoff-method", &info.kickoff)))?;
    for point in &info.await_points {
        let mut entry = BytesStart::new("await");
        entry.push_attribute(("yield", hex(point.yield_offset).as_str()));
        entry.push_attribute(("resume", hex(point.resume_offset).as_str()));
        writer.write_event(Event::Empty(entry))?;
    }

    writer.write_event(Event::End(BytesEnd::new("async-info")))?;
    Ok(())
}

fn write_custom_debug_info<W: Write>(
    writer: &mut Writer<W>,
    records: &[CustomDebugInfo],
) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("customDebugInfo")))?;
    for record in records {
        match record {
            CustomDebugInfo::Using { import_counts } => {
                writer.write_event(Event::Start(BytesStart::new("using")))?;
                for count in import_counts {
                    let mut namespace = BytesStart::new("namespace");
                    namespace.push_attribute(("usingCount", count.to_string().as_str()));
                    writer.write_event(Event::Empty(namespace))?;
                }
                writer.write_event(Event::End(BytesEnd::new("using")))?;
            }
            CustomDebugInfo::Forward { target } => {
                writer.write_event(Event::Empty(method_ref_element("forward", target)))?;
            }
            CustomDebugInfo::ForwardIterator { type_name } => {
                let mut element = BytesStart::new("forwardIterator");
                element.push_attribute(("name", type_name.as_str()));
                writer.write_event(Event::Empty(element))?;
            }
            CustomDebugInfo::IteratorLocalsBuckets { buckets } => {
                writer.write_event(Event::Start(BytesStart::new("iteratorLocals")))?;
                for bucket in buckets {
                    let mut element = BytesStart::new("bucket");
                    element.push_attribute(("startOffset", hex(bucket.start).as_str()));
                    element.push_attribute(("endOffset", hex(bucket.end).as_str()));
                    writer.write_event(Event::Empty(element))?;
                }
                writer.write_event(Event::End(BytesEnd::new("iteratorLocals")))?;
            }
            CustomDebugInfo::DynamicLocalsBuckets { entries } => {
                writer.write_event(Event::Start(BytesStart::new("dynamicLocals")))?;
                for entry in entries {
                    let flags: String = entry
                        .flags
                        .iter()
                        .map(|&flag| if flag { '1' } else { '0' })
                        .collect();
                    let mut element = BytesStart::new("bucket");
                    element.push_attribute(("flags", flags.as_str()));
                    element.push_attribute(("flagCount", entry.flags.len().to_string().as_str()));
                    element.push_attribute(("slotId", entry.slot.to_string().as_str()));
                    element.push_attribute(("localName", entry.name.as_str()));
                    writer.write_event(Event::Empty(element))?;
                }
                writer.write_event(Event::End(BytesEnd::new("dynamicLocals")))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new("customDebugInfo")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        asyncinfo::AwaitPoint,
        range::OffsetRange,
        scope::{LocalEntry, LocalStorage, LocalVisibility, Scope},
        sequencepoints::{SequencePointBuilder, SequencePointKind, SourceSpan},
    };

    fn sample() -> MethodDebugRecord {
        let mut points = SequencePointBuilder::new("C.M");
        points.record(0, SequencePointKind::Hidden).unwrap();
        points
            .record(4, SequencePointKind::Visible(SourceSpan::new(1, 10, 5, 10, 20)))
            .unwrap();

        let range = OffsetRange::new(0, 0x40);
        let scopes = ScopeTree::from_scopes(vec![Scope {
            range,
            parent: None,
            children: Vec::new(),
            locals: vec![LocalEntry {
                name: "x".into(),
                slot: 0,
                live_range: range,
                storage: LocalStorage::Hoisted,
                visibility: LocalVisibility::UserVisible,
                dynamic_flags: None,
            }],
            block: None,
            loop_extent: None,
        }]);

        let kickoff = MethodRef::new("C", "M", "()");
        MethodDebugRecord::new(
            MethodRef::new("C+<M>d__0", "MoveNext", "()"),
            points.finish(),
            scopes,
            Some(AsyncInfo {
                kickoff: kickoff.clone(),
                await_points: vec![AwaitPoint {
                    yield_offset: 0x10,
                    resume_offset: 0x22,
                }],
                catch_dispatch_offset: Some(0x38),
            }),
            vec![CustomDebugInfo::Forward { target: kickoff }],
        )
    }

    #[test]
    fn renders_every_section() {
        let xml = to_xml_string(&sample()).unwrap();
        assert!(xml.contains(r#"<method name="C+&lt;M&gt;d__0.MoveNext()">"#));
        assert!(xml.contains(r#"il_offset="0x0" hidden="true" start_row="16707566""#));
        assert!(xml.contains(r#"il_offset="0x4" start_row="10" start_column="5""#));
        assert!(xml.contains(
            r#"<local name="x" slot="0" start="0x0" end="0x40" storage="hoisted" visibility="user"/>"#
        ));
        assert!(xml.contains(r#"<async-info catch-IL-offset="0x38">"#));
        assert!(xml.contains(r#"<await yield="0x10" resume="0x22"/>"#));
        assert!(xml.contains(r#"<forward declaringType="C" methodName="M" parameterNames="()"/>"#));
    }

    #[test]
    fn wraps_many_records() {
        let mut out = Vec::new();
        write_records(&[sample(), sample()], &mut out).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.starts_with("<methods>"));
        assert_eq!(xml.matches("<method ").count(), 2);
    }
}
