//! Binary encoding of custom debug information record sets.
//!
//! ```text
//! set header:    version (u8 = 4) | record count (u8) | 2 bytes padding
//! record header: version (u8 = 4) | kind (u8) | 2 bytes padding | size (u32, incl. header)
//! payload:       kind specific, zero padded to a 4-byte boundary
//! ```
//!
//! Payloads:
//!
//! - `Using`: `u16` scope count, then one `u16` import count per scope
//! - `Forward`: declaring type, method name and parameter signature as null-terminated UTF-16
//! - `ForwardIterator`: the state-machine type name as null-terminated UTF-16
//! - `IteratorLocalsBuckets`: `u32` bucket count, then `u32` start and `u32` end per bucket
//! - `DynamicLocalsBuckets`: `u32` entry count, then per entry 64 flag bytes, the `u32` flag
//!   count, the `u32` slot id and the name as 64 UTF-16 units, null padded

use widestring::U16String;

use crate::{
    file::io::{pad_to_alignment, write_le},
    metadata::customdebuginformation::types::{
        CustomDebugInfo, DynamicLocalEntry, CDI_VERSION, MAX_DYNAMIC_FLAGS,
        MAX_DYNAMIC_NAME_UNITS,
    },
    Result,
};

/// Size of a record header in bytes.
pub const RECORD_HEADER_SIZE: usize = 8;

fn write_utf16_cstr(buffer: &mut Vec<u8>, value: &str) -> Result<()> {
    let units = U16String::from_str(value).into_vec();
    if units.contains(&0) {
        return Err(malformed_error!("Name '{}' contains a null character", value.escape_debug()));
    }
    for unit in units {
        write_le(buffer, unit);
    }
    write_le(buffer, 0u16);
    Ok(())
}

fn write_dynamic_entry(buffer: &mut Vec<u8>, entry: &DynamicLocalEntry) -> Result<()> {
    let name = U16String::from_str(&entry.name).into_vec();
    if name.len() > MAX_DYNAMIC_NAME_UNITS || entry.flags.len() > MAX_DYNAMIC_FLAGS {
        return Err(malformed_error!(
            "Dynamic local '{}' exceeds the entry limits ({} name units, {} flags)",
            entry.name,
            name.len(),
            entry.flags.len()
        ));
    }
    if name.contains(&0) {
        return Err(malformed_error!(
            "Dynamic local '{}' contains a null character",
            entry.name.escape_debug()
        ));
    }

    for index in 0..MAX_DYNAMIC_FLAGS {
        let flag = entry.flags.get(index).copied().unwrap_or(false);
        buffer.push(u8::from(flag));
    }
    #[allow(clippy::cast_possible_truncation)]
    write_le(buffer, entry.flags.len() as u32);
    write_le(buffer, entry.slot);
    for index in 0..=MAX_DYNAMIC_NAME_UNITS {
        write_le(buffer, name.get(index).copied().unwrap_or(0));
    }
    Ok(())
}

fn encode_payload(record: &CustomDebugInfo, buffer: &mut Vec<u8>) -> Result<()> {
    match record {
        CustomDebugInfo::Using { import_counts } => {
            let count = u16::try_from(import_counts.len()).map_err(|_| {
                malformed_error!("Too many import scopes: {}", import_counts.len())
            })?;
            write_le(buffer, count);
            for &imports in import_counts {
                write_le(buffer, imports);
            }
        }
        CustomDebugInfo::Forward { target } => {
            write_utf16_cstr(buffer, &target.declaring_type)?;
            write_utf16_cstr(buffer, &target.method_name)?;
            write_utf16_cstr(buffer, &target.parameter_signature)?;
        }
        CustomDebugInfo::ForwardIterator { type_name } => {
            write_utf16_cstr(buffer, type_name)?;
        }
        CustomDebugInfo::IteratorLocalsBuckets { buckets } => {
            let count = u32::try_from(buckets.len())
                .map_err(|_| malformed_error!("Too many buckets: {}", buckets.len()))?;
            write_le(buffer, count);
            for bucket in buckets {
                write_le(buffer, bucket.start);
                write_le(buffer, bucket.end);
            }
        }
        CustomDebugInfo::DynamicLocalsBuckets { entries } => {
            let count = u32::try_from(entries.len())
                .map_err(|_| malformed_error!("Too many dynamic locals: {}", entries.len()))?;
            write_le(buffer, count);
            for entry in entries {
                write_dynamic_entry(buffer, entry)?;
            }
        }
    }
    Ok(())
}

/// Encodes a record set.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the set holds more than 255 records, a record
/// exceeds the limits of its binary form, or a name contains a null character.
pub fn encode_custom_debug_info(records: &[CustomDebugInfo]) -> Result<Vec<u8>> {
    let count = u8::try_from(records.len())
        .map_err(|_| malformed_error!("Too many custom debug records: {}", records.len()))?;

    let mut buffer = vec![CDI_VERSION, count, 0, 0];
    for record in records {
        let mut payload = Vec::new();
        encode_payload(record, &mut payload)?;
        pad_to_alignment(&mut payload, 4);

        let size = u32::try_from(RECORD_HEADER_SIZE + payload.len())
            .map_err(|_| malformed_error!("Record too large: {} bytes", payload.len()))?;
        buffer.extend_from_slice(&[CDI_VERSION, record.kind().to_u8(), 0, 0]);
        write_le(&mut buffer, size);
        buffer.extend_from_slice(&payload);
    }
    Ok(buffer)
}
