//! Low-level byte order and compressed-integer utilities for debug-information blobs.
//!
//! This module provides the endian-aware primitives the blob encoders and the
//! [`crate::file::parser::Parser`] are built on. Reading is bounds-checked against the input
//! slice; writing always appends to a growable buffer, since every blob produced by this crate
//! is assembled front to back.
//!
//! # Key Components
//!
//! - [`crate::file::io::BlobIO`] - Trait defining little-endian conversion for primitive types
//! - [`crate::file::io::read_le_at`] - Read values at a specific offset with auto-advance
//! - [`crate::file::io::write_le`] - Append a value in little-endian byte order
//! - [`crate::file::io::write_compressed_uint`] / [`crate::file::io::write_compressed_int`] -
//!   ECMA-335 II.23.2 compressed integers
//! - [`crate::file::io::pad_to_alignment`] - Zero padding up to an alignment boundary
//!
//! # Usage Examples
//!
//! ```rust
//! use debugscope::file::io::{read_le_at, write_le, write_compressed_uint};
//!
//! let mut buffer = Vec::new();
//! write_le(&mut buffer, 0x1234_u16);
//! write_compressed_uint(0x80, &mut buffer);
//! assert_eq!(buffer, [0x34, 0x12, 0x80, 0x80]);
//!
//! let mut offset = 0;
//! let value: u16 = read_le_at(&buffer, &mut offset)?;
//! assert_eq!(value, 0x1234);
//! # Ok::<(), debugscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Largest value representable as an ECMA-335 compressed unsigned integer.
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Trait for primitive types that can be read from and written to little-endian byte buffers.
///
/// Implemented for the integer widths used by the debug-information blobs.
pub trait BlobIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_blob_io {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl BlobIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_blob_io!(u8 => 1, u16 => 2, u32 => 4, i32 => 4, u64 => 8);

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: BlobIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;
    Ok(T::from_le_bytes(read))
}

/// Appends `value` to `buffer` in little-endian byte order.
pub fn write_le<T: BlobIO>(buffer: &mut Vec<u8>, value: T) {
    buffer.extend_from_slice(value.to_le_bytes().as_ref());
}

/// Appends an ECMA-335 II.23.2 compressed unsigned integer.
///
/// - Values 0-127: 1 byte (0xxxxxxx)
/// - Values 128-16383: 2 bytes (10xxxxxx xxxxxxxx)
/// - Values up to [`MAX_COMPRESSED_UINT`]: 4 bytes (110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx)
///
/// Values above [`MAX_COMPRESSED_UINT`] are not representable and are clamped; the encoders
/// of this crate check their inputs against the limit before calling this.
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) {
    let value = value.min(MAX_COMPRESSED_UINT);
    if value < 0x80 {
        buffer.push(value as u8);
    } else if value < 0x4000 {
        buffer.push(0x80 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        buffer.push(0xC0 | (value >> 24) as u8);
        buffer.push((value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    }
}

/// Appends an ECMA-335 II.23.2 compressed signed integer.
///
/// The magnitude is shifted left by one with the sign in the lowest bit, mirroring
/// [`crate::file::parser::Parser::read_compressed_int`].
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) {
    let encoded = if value >= 0 {
        (value as u32) << 1
    } else {
        ((value.unsigned_abs() - 1) << 1) | 1
    };
    write_compressed_uint(encoded, buffer);
}

/// Appends zero bytes until `buffer.len()` is a multiple of `alignment`.
pub fn pad_to_alignment(buffer: &mut Vec<u8>, alignment: usize) {
    while !buffer.len().is_multiple_of(alignment) {
        buffer.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parser::Parser;

    #[test]
    fn read_le_at_advances() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00];
        let mut offset = 0;
        assert_eq!(read_le_at::<u16>(&data, &mut offset).unwrap(), 1);
        assert_eq!(read_le_at::<u32>(&data, &mut offset).unwrap(), 2);
        assert_eq!(offset, 6);
        assert!(matches!(
            read_le_at::<u8>(&data, &mut offset),
            Err(crate::Error::OutOfBounds)
        ));
    }

    #[test]
    fn compressed_uint_widths() {
        let cases: [(u32, &[u8]); 6] = [
            (0x03, &[0x03]),
            (0x7F, &[0x7F]),
            (0x80, &[0x80, 0x80]),
            (0x3FFF, &[0xBF, 0xFF]),
            (0x4000, &[0xC0, 0x00, 0x40, 0x00]),
            (0x1FFF_FFFF, &[0xDF, 0xFF, 0xFF, 0xFF]),
        ];

        for (value, expected) in cases {
            let mut buffer = Vec::new();
            write_compressed_uint(value, &mut buffer);
            assert_eq!(buffer, expected, "value {value:#x}");
            assert_eq!(Parser::new(&buffer).read_compressed_uint().unwrap(), value);
        }
    }

    #[test]
    fn compressed_int_sign_bit() {
        let mut buffer = Vec::new();
        write_compressed_int(10, &mut buffer);
        write_compressed_int(-5, &mut buffer);
        assert_eq!(buffer, [20, 9]);

        let mut parser = Parser::new(&buffer);
        assert_eq!(parser.read_compressed_int().unwrap(), 10);
        assert_eq!(parser.read_compressed_int().unwrap(), -5);
    }

    #[test]
    fn padding() {
        let mut buffer = vec![1, 2, 3, 4, 5];
        pad_to_alignment(&mut buffer, 4);
        assert_eq!(buffer, [1, 2, 3, 4, 5, 0, 0, 0]);
        pad_to_alignment(&mut buffer, 4);
        assert_eq!(buffer.len(), 8);
    }
}
