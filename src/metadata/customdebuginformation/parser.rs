//! Decoding of custom debug information record sets.
//!
//! The inverse of [`crate::metadata::customdebuginformation::encode_custom_debug_info`]. Every
//! record is decoded from its own size-delimited payload, so a damaged payload cannot make the
//! parser lose track of the following records.

use crate::{
    file::parser::Parser,
    metadata::{
        customdebuginformation::{
            encoder::RECORD_HEADER_SIZE,
            types::{
                CustomDebugInfo, CustomDebugKind, DynamicLocalEntry, CDI_VERSION,
                MAX_DYNAMIC_FLAGS, MAX_DYNAMIC_NAME_UNITS,
            },
        },
        method::MethodRef,
        range::OffsetRange,
    },
    Result,
};

/// Parser for a custom debug information blob.
pub struct CustomDebugParser<'a> {
    parser: Parser<'a>,
}

impl<'a> CustomDebugParser<'a> {
    /// Creates a parser over `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        CustomDebugParser {
            parser: Parser::new(data),
        }
    }

    /// Parses the set header and every record.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an unsupported version, an unknown record kind or
    /// an inconsistent record size, and [`crate::Error::OutOfBounds`] for truncated data.
    pub fn parse_records(&mut self) -> Result<Vec<CustomDebugInfo>> {
        let version = self.parser.read_le::<u8>()?;
        if version != CDI_VERSION {
            return Err(malformed_error!("Unsupported custom debug info version {}", version));
        }
        let count = self.parser.read_le::<u8>()?;
        self.parser.read_bytes(2)?;

        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            records.push(self.parse_record()?);
        }
        Ok(records)
    }

    fn parse_record(&mut self) -> Result<CustomDebugInfo> {
        let start = self.parser.pos();
        let version = self.parser.read_le::<u8>()?;
        if version != CDI_VERSION {
            return Err(malformed_error!(
                "Unsupported record version {} at {}",
                version,
                start
            ));
        }
        let tag = self.parser.read_le::<u8>()?;
        self.parser.read_bytes(2)?;
        let size = self.parser.read_le::<u32>()? as usize;
        if size < RECORD_HEADER_SIZE || size % 4 != 0 {
            return Err(malformed_error!("Invalid record size {} at {}", size, start));
        }

        let Some(kind) = CustomDebugKind::from_u8(tag) else {
            return Err(malformed_error!("Unknown custom debug kind {} at {}", tag, start));
        };
        let payload = self.parser.read_bytes(size - RECORD_HEADER_SIZE)?;
        parse_payload(kind, payload)
    }
}

fn parse_payload(kind: CustomDebugKind, payload: &[u8]) -> Result<CustomDebugInfo> {
    let mut parser = Parser::new(payload);
    let record = match kind {
        CustomDebugKind::Using => {
            let count = parser.read_le::<u16>()?;
            let mut import_counts = Vec::with_capacity(usize::from(count));
            for _ in 0..count {
                import_counts.push(parser.read_le::<u16>()?);
            }
            CustomDebugInfo::Using { import_counts }
        }
        CustomDebugKind::Forward => CustomDebugInfo::Forward {
            target: MethodRef {
                declaring_type: parser.read_utf16_cstr()?,
                method_name: parser.read_utf16_cstr()?,
                parameter_signature: parser.read_utf16_cstr()?,
            },
        },
        CustomDebugKind::ForwardIterator => CustomDebugInfo::ForwardIterator {
            type_name: parser.read_utf16_cstr()?,
        },
        CustomDebugKind::IteratorLocalsBuckets => {
            let count = parser.read_le::<u32>()?;
            if count as usize > parser.remaining() / 8 {
                return Err(malformed_error!("Bucket count {} exceeds the payload", count));
            }
            let mut buckets = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let start = parser.read_le::<u32>()?;
                let end = parser.read_le::<u32>()?;
                buckets.push(OffsetRange::new(start, end));
            }
            CustomDebugInfo::IteratorLocalsBuckets { buckets }
        }
        CustomDebugKind::DynamicLocalsBuckets => {
            let count = parser.read_le::<u32>()?;
            let entry_size = MAX_DYNAMIC_FLAGS + 8 + (MAX_DYNAMIC_NAME_UNITS + 1) * 2;
            if count as usize > parser.remaining() / entry_size {
                return Err(malformed_error!("Entry count {} exceeds the payload", count));
            }
            let mut entries = Vec::with_capacity(count as usize);
            for _ in 0..count {
                entries.push(parse_dynamic_entry(&mut parser)?);
            }
            CustomDebugInfo::DynamicLocalsBuckets { entries }
        }
    };

    if parser.remaining() >= 4 {
        return Err(malformed_error!(
            "{} bytes left after {} payload",
            parser.remaining(),
            kind
        ));
    }
    Ok(record)
}

fn parse_dynamic_entry(parser: &mut Parser<'_>) -> Result<DynamicLocalEntry> {
    let raw_flags = parser.read_bytes(MAX_DYNAMIC_FLAGS)?;
    let flag_count = parser.read_le::<u32>()? as usize;
    if flag_count > MAX_DYNAMIC_FLAGS {
        return Err(malformed_error!("Flag count {} exceeds {}", flag_count, MAX_DYNAMIC_FLAGS));
    }
    let slot = parser.read_le::<u32>()?;
    let name = parser.read_utf16_fixed(MAX_DYNAMIC_NAME_UNITS + 1)?;

    Ok(DynamicLocalEntry {
        slot,
        name,
        flags: raw_flags[..flag_count].iter().map(|&b| b != 0).collect(),
    })
}

/// Parses a custom debug information blob into its records.
///
/// # Errors
/// See [`CustomDebugParser::parse_records`].
pub fn parse_custom_debug_info(data: &[u8]) -> Result<Vec<CustomDebugInfo>> {
    CustomDebugParser::new(data).parse_records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn header_only() {
        assert!(parse_custom_debug_info(&[4, 0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn wrong_version() {
        assert!(matches!(
            parse_custom_debug_info(&[5, 0, 0, 0]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn unknown_kind() {
        let blob = [4, 1, 0, 0, 4, 2, 0, 0, 8, 0, 0, 0];
        assert!(matches!(
            parse_custom_debug_info(&blob),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_record() {
        let blob = [4, 1, 0, 0, 4, 0, 0, 0, 16, 0, 0, 0, 2, 0];
        assert!(matches!(
            parse_custom_debug_info(&blob),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn using_record() {
        let blob = [
            4, 1, 0, 0, 4, 0, 0, 0, 16, 0, 0, 0, 2, 0, 2, 0, 1, 0, 0, 0,
        ];
        assert_eq!(
            parse_custom_debug_info(&blob).unwrap(),
            vec![CustomDebugInfo::Using {
                import_counts: vec![2, 1]
            }]
        );
    }

    #[test]
    fn bucket_count_larger_than_payload() {
        let blob = [4, 1, 0, 0, 4, 3, 0, 0, 12, 0, 0, 0, 0xFF, 0xFF, 0, 0];
        assert!(matches!(
            parse_custom_debug_info(&blob),
            Err(Error::Malformed { .. })
        ));
    }
}
