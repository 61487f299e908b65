//! Custom debug information: per-method records a debugger needs beyond locals and lines.
//!
//! Methods synthesized from one user type share the type's namespace imports, which are stored
//! only once. Kickoff wrappers point the debugger at their state-machine type. State-machine
//! step methods describe where hoisted loop locals are in scope, and any method may describe
//! the `dynamic` flags of its locals.
//!
//! # Key Components
//!
//! - [`ForwardingPlan`] - the per-type choice of the import owner, resolved before emission
//! - [`CustomDebugInfoEmitter`] - the record set of one method
//! - [`encode_custom_debug_info`] / [`parse_custom_debug_info`] - the binary form
//!
//! # Usage Examples
//!
//! ```rust
//! use debugscope::metadata::customdebuginformation::{
//!     encode_custom_debug_info, parse_custom_debug_info, CustomDebugInfo,
//! };
//! use debugscope::metadata::method::MethodRef;
//!
//! let records = vec![CustomDebugInfo::Forward {
//!     target: MethodRef::new("C", ".cctor", "()"),
//! }];
//! let blob = encode_custom_debug_info(&records)?;
//! assert_eq!(parse_custom_debug_info(&blob)?, records);
//! # Ok::<(), debugscope::Error>(())
//! ```

mod emitter;
mod encoder;
mod ownership;
mod parser;
mod types;

pub use emitter::CustomDebugInfoEmitter;
pub use encoder::encode_custom_debug_info;
pub use ownership::ForwardingPlan;
pub use parser::{parse_custom_debug_info, CustomDebugParser};
pub use types::{
    CustomDebugInfo, CustomDebugKind, DynamicLocalEntry, CDI_VERSION, MAX_DYNAMIC_FLAGS,
    MAX_DYNAMIC_NAME_UNITS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{method::MethodRef, range::OffsetRange};

    #[test]
    fn full_set_round_trip() {
        let records = vec![
            CustomDebugInfo::Using {
                import_counts: vec![3, 0, 1],
            },
            CustomDebugInfo::Forward {
                target: MethodRef::new("N.Outer+Inner", "Run", "(int, string[])"),
            },
            CustomDebugInfo::ForwardIterator {
                type_name: "N.Outer+<Run>d__4".into(),
            },
            CustomDebugInfo::IteratorLocalsBuckets {
                buckets: vec![OffsetRange::new(0x10, 0x44), OffsetRange::new(0x50, 0x60)],
            },
            CustomDebugInfo::DynamicLocalsBuckets {
                entries: vec![
                    DynamicLocalEntry::new(0, "d", &[true]),
                    DynamicLocalEntry::placeholder(),
                    DynamicLocalEntry::new(4, "λ", &[false, true, true]),
                ],
            },
        ];

        let blob = encode_custom_debug_info(&records).unwrap();
        assert_eq!(blob.len() % 4, 0);
        assert_eq!(parse_custom_debug_info(&blob).unwrap(), records);
    }
}
