//! Low-level byte stream parser for debug-information blobs.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser used by the sequence point and custom debug information decoders. It offers
//! bounds-checked access to binary data with support for the ECMA-335 compressed integer
//! encodings and the null-terminated UTF-16 names used by custom debug information records.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::pos`] - Get current position
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::file::parser::Parser::read_bytes`] - Read a raw chunk
//! - [`crate::file::parser::Parser::read_compressed_uint`] - Read compressed unsigned integers
//! - [`crate::file::parser::Parser::read_compressed_int`] - Read compressed signed integers
//! - [`crate::file::parser::Parser::read_utf16_cstr`] - Read null-terminated UTF-16 strings
//!
//! # Usage Examples
//!
//! ```rust
//! use debugscope::Parser;
//!
//! let data = [0x01, 0x02, 0x80, 0x80];
//! let mut parser = Parser::new(&data);
//!
//! let value = parser.read_le::<u16>()?;
//! assert_eq!(value, 0x0201);
//! assert_eq!(parser.read_compressed_uint()?, 0x80);
//! assert!(!parser.has_more_data());
//! # Ok::<(), debugscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, BlobIO},
    Result,
};

/// A generic binary data parser for reading debug-information blobs.
///
/// `Parser` provides a cursor-based interface for reading little-endian binary data. The parser
/// maintains an internal position cursor and provides bounds checking to prevent buffer overruns
/// when reading malformed or truncated data.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use debugscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Returns the current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes left after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Read a type `T` from the current position in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: BlobIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Reads a slice of bytes of the specified length from the current position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `length` bytes would exceed the data.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;
        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a compressed unsigned integer as defined in ECMA-335 II.23.2.
    ///
    /// - Values 0-127: 1 byte (0xxxxxxx)
    /// - Values 128-16383: 2 bytes (10xxxxxx xxxxxxxx)
    /// - Values 16384-536870911: 4 bytes (110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid compressed uint format.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use debugscope::Parser;
    ///
    /// let data = [0x80, 0x80]; // Represents 128
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_compressed_uint()?, 128);
    /// # Ok::<(), debugscope::Error>(())
    /// ```
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok(value);
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            let value = ((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3;
            return Ok(value);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Read a compressed signed integer: the magnitude shifted left by one, sign in bit 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid encoding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use debugscope::Parser;
    ///
    /// // -5 encoded as 9 ((5-1) << 1 | 1)
    /// let data = [9];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_compressed_int()?, -5);
    /// # Ok::<(), debugscope::Error>(())
    /// ```
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let unsigned = self.read_compressed_uint()?;

        let signed = if (unsigned & 1) == 0 {
            #[allow(clippy::cast_possible_wrap)]
            let result = (unsigned >> 1) as i32;
            result
        } else {
            #[allow(clippy::cast_possible_wrap)]
            let result = -((unsigned >> 1) as i32 + 1);
            result
        };

        Ok(signed)
    }

    /// Read a null-terminated UTF-16LE string.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if no terminator is found or
    /// [`crate::Error::Malformed`] for invalid UTF-16.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use debugscope::Parser;
    ///
    /// let data = [0x48, 0x00, 0x69, 0x00, 0x00, 0x00];
    /// let mut parser = Parser::new(&data);
    /// assert_eq!(parser.read_utf16_cstr()?, "Hi");
    /// assert_eq!(parser.pos(), 6);
    /// # Ok::<(), debugscope::Error>(())
    /// ```
    pub fn read_utf16_cstr(&mut self) -> Result<String> {
        let mut units = Vec::new();
        loop {
            let unit = self.read_le::<u16>()?;
            if unit == 0 {
                break;
            }
            units.push(unit);
        }

        String::from_utf16(&units)
            .map_err(|_| malformed_error!("Invalid UTF-16 str at {}", self.position))
    }

    /// Read a fixed-width UTF-16LE field of `units` code units, trimmed at the first null.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the field is truncated or
    /// [`crate::Error::Malformed`] for invalid UTF-16.
    pub fn read_utf16_fixed(&mut self, units: usize) -> Result<String> {
        let mut chars = Vec::with_capacity(units);
        for _ in 0..units {
            chars.push(self.read_le::<u16>()?);
        }
        let len = chars.iter().position(|&c| c == 0).unwrap_or(chars.len());
        chars.truncate(len);

        String::from_utf16(&chars)
            .map_err(|_| malformed_error!("Invalid UTF-16 field at {}", self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_read_compressed_uint() {
        let test_cases = vec![
            (vec![0x03], 3),                             // 1-byte format
            (vec![0x7F], 0x7F),                          // 1-byte format, max value
            (vec![0x80, 0x80], 0x80),                    // 2-byte format, min value
            (vec![0xBF, 0xFF], 0x3FFF),                  // 2-byte format, max value
            (vec![0xC0, 0x00, 0x00, 0x00], 0x00),        // 4-byte format, min value
            (vec![0xDF, 0xFF, 0xFF, 0xFF], 0x1FFF_FFFF), // 4-byte format, max value
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            let result = parser.read_compressed_uint().unwrap();
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn test_read_compressed_uint_invalid() {
        let data = [0xE0, 0x00, 0x00, 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_read_compressed_uint_truncated() {
        let data = [0xC0, 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(
            parser.read_compressed_uint(),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn test_read_utf16_cstr_unterminated() {
        let data = [0x41, 0x00, 0x42, 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(parser.read_utf16_cstr(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_read_utf16_fixed_trims_padding() {
        let data = [0x61, 0x00, 0x62, 0x00, 0x00, 0x00, 0x00, 0x00];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_utf16_fixed(4).unwrap(), "ab");
        assert_eq!(parser.pos(), 8);
    }

    #[test]
    fn test_read_bytes() {
        let data = [1, 2, 3, 4, 5];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_bytes(3).unwrap(), &[1, 2, 3]);
        assert!(parser.read_bytes(3).is_err());
        assert_eq!(parser.pos(), 3);
    }
}
