//! The codec contract implemented by every wire encoding.
//!
//! Callers drive a protocol in a fixed grammar:
//!
//! ```text
//! message_begin
//!   struct_begin
//!     { field_begin  value  field_end }*
//!     field_stop
//!   struct_end
//! message_end
//! ```
//!
//! Reads mirror writes. Collections bracket their elements with
//! `*_begin`/`*_end` in the same way.

use crate::error::Result;
use crate::field::Field;
use crate::message::Message;
use crate::schema::{ListHeader, MapHeader, SetHeader};
use crate::skip::{skip, DEFAULT_MAX_SKIP_DEPTH};
use crate::types::TypeTag;
use bytes::Bytes;
use hbwire_transport::{BoxedTransport, Transport};

pub trait Protocol {
    fn write_message_begin(&mut self, message: &Message) -> Result<()>;
    fn write_message_end(&mut self) -> Result<()>;
    fn write_struct_begin(&mut self, name: &str) -> Result<()>;
    fn write_struct_end(&mut self) -> Result<()>;
    fn write_field_begin(&mut self, field: &Field) -> Result<()>;
    fn write_field_end(&mut self) -> Result<()>;
    fn write_field_stop(&mut self) -> Result<()>;
    fn write_map_begin(&mut self, header: &MapHeader) -> Result<()>;
    fn write_map_end(&mut self) -> Result<()>;
    fn write_list_begin(&mut self, header: &ListHeader) -> Result<()>;
    fn write_list_end(&mut self) -> Result<()>;
    fn write_set_begin(&mut self, header: &SetHeader) -> Result<()>;
    fn write_set_end(&mut self) -> Result<()>;
    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_byte(&mut self, value: i8) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_binary(&mut self, value: &[u8]) -> Result<()>;

    /// Reads a message header. The method name is decoded like
    /// [`read_string`](Protocol::read_string), so a name that is not valid
    /// UTF-8 fails with `InvalidData`.
    fn read_message_begin(&mut self) -> Result<Message>;
    fn read_message_end(&mut self) -> Result<()>;
    /// Returns the record name when the encoding carries one.
    fn read_struct_begin(&mut self) -> Result<String>;
    fn read_struct_end(&mut self) -> Result<()>;
    /// Returns the next field header; a stop-tagged descriptor ends the record.
    fn read_field_begin(&mut self) -> Result<Field>;
    fn read_field_end(&mut self) -> Result<()>;
    fn read_map_begin(&mut self) -> Result<MapHeader>;
    fn read_map_end(&mut self) -> Result<()>;
    fn read_list_begin(&mut self) -> Result<ListHeader>;
    fn read_list_end(&mut self) -> Result<()>;
    fn read_set_begin(&mut self) -> Result<SetHeader>;
    fn read_set_end(&mut self) -> Result<()>;
    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    /// Reads a length-prefixed string.
    ///
    /// Unlike the wire format itself, which treats strings as opaque bytes,
    /// this requires valid UTF-8 and fails with `InvalidData` otherwise.
    /// Use [`read_binary`](Protocol::read_binary) for text that must pass
    /// through unchecked.
    fn read_string(&mut self) -> Result<String>;
    fn read_binary(&mut self) -> Result<Bytes>;

    /// Recursion budget used by [`Protocol::skip`].
    fn max_skip_depth(&self) -> usize {
        DEFAULT_MAX_SKIP_DEPTH
    }

    /// Consumes and discards one value of type `tag`.
    fn skip(&mut self, tag: TypeTag) -> Result<()> {
        let depth = self.max_skip_depth();
        skip(self, tag, depth)
    }

    /// Flushes the underlying transport.
    fn flush(&mut self) -> Result<()>;

    fn transport(&mut self) -> &mut dyn Transport;
}

/// Owned, type-erased protocol.
pub type BoxedProtocol = Box<dyn Protocol + Send>;

/// Builds protocols over transports chosen at runtime.
pub trait ProtocolFactory {
    fn get_protocol(&self, transport: BoxedTransport) -> BoxedProtocol;
}
