//! Byte-range access to (possibly remote) files.
//!
//! The viewer never assumes where a file lives. Everything that needs raw
//! bytes goes through [`ByteSource`], and the columnar providers layer a
//! [`RangeReadBuffer`] on top so repeated footer/row-group reads of large
//! files hit a bounded in-memory cache instead of the transport.

mod byte_source;
mod range_buffer;

pub use byte_source::*;
pub use range_buffer::*;
