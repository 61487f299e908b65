//! Binary blob primitives.
//!
//! - [`io`] - little-endian and ECMA-335 compressed integer encoding helpers
//! - [`parser`] - the bounds-checked [`parser::Parser`] cursor used by every decoder

pub mod io;
pub mod parser;
