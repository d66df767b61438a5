//! Big-endian binary encoding.
//!
//! ```text
//! strict message header  | i32 (VERSION_1 | type) | string name | i32 seqid |
//! legacy message header  | string name | byte type | i32 seqid |
//! field header           | byte type | i16 id |        (type 0 = stop, no id)
//! map header             | byte key type | byte value type | i32 size |
//! list / set header      | byte element type | i32 size |
//! string / binary        | i32 length | bytes |
//! bool                   | byte 0 or 1 |
//! double                 | IEEE-754 bits as i64 |
//! ```

use crate::error::{ProtocolError, ProtocolErrorKind, Result};
use crate::field::Field;
use crate::message::Message;
use crate::protocol::{BoxedProtocol, Protocol, ProtocolFactory};
use crate::schema::{ListHeader, MapHeader, SetHeader};
use crate::skip::DEFAULT_MAX_SKIP_DEPTH;
use crate::types::{MessageType, TypeTag};
use crate::{VERSION_1, VERSION_MASK};
use bytes::{Bytes, BytesMut};
use hbwire_transport::{BoxedTransport, Transport, TransportError};

/// Large payloads are pulled in steps of this size so memory tracks the
/// bytes actually received rather than the length a peer claims (64 KiB).
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Behavior switches for [`BinaryProtocol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryProtocolConfig {
    /// Reject message headers without a version word.
    pub strict_read: bool,
    /// Emit the versioned message header.
    pub strict_write: bool,
    /// Total bytes primitive reads may consume; `None` is unbounded.
    pub read_length: Option<usize>,
    /// Recursion budget for skipping nested values.
    pub max_skip_depth: usize,
}

impl Default for BinaryProtocolConfig {
    fn default() -> Self {
        Self {
            strict_read: false,
            strict_write: true,
            read_length: None,
            max_skip_depth: DEFAULT_MAX_SKIP_DEPTH,
        }
    }
}

impl BinaryProtocolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_read(mut self, strict: bool) -> Self {
        self.strict_read = strict;
        self
    }

    pub fn with_strict_write(mut self, strict: bool) -> Self {
        self.strict_write = strict;
        self
    }

    pub fn with_read_length(mut self, limit: usize) -> Self {
        self.read_length = Some(limit);
        self
    }

    pub fn with_max_skip_depth(mut self, depth: usize) -> Self {
        self.max_skip_depth = depth;
        self
    }
}

/// Binary protocol over a transport.
#[derive(Debug)]
pub struct BinaryProtocol<T> {
    transport: T,
    config: BinaryProtocolConfig,
    read_budget: Option<usize>,
}

impl<T: Transport> BinaryProtocol<T> {
    /// Creates a protocol with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, BinaryProtocolConfig::default())
    }

    pub fn with_config(transport: T, config: BinaryProtocolConfig) -> Self {
        Self {
            transport,
            read_budget: config.read_length,
            config,
        }
    }

    pub fn config(&self) -> &BinaryProtocolConfig {
        &self.config
    }

    /// Arms (or with `None`, disarms) the read budget.
    pub fn set_read_length(&mut self, limit: Option<usize>) {
        self.read_budget = limit;
    }

    /// Remaining read budget, if armed.
    pub fn read_length(&self) -> Option<usize> {
        self.read_budget
    }

    pub fn transport_ref(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn check_read_length(&mut self, len: usize) -> Result<()> {
        if let Some(remaining) = self.read_budget.as_mut() {
            if len > *remaining {
                return Err(ProtocolError::new(
                    ProtocolErrorKind::SizeLimit,
                    format!(
                        "Message length exceeded: {} bytes requested, {} remaining",
                        len, remaining
                    ),
                )
                .into());
            }
            *remaining -= len;
        }
        Ok(())
    }

    fn check_collection_size(&self, size: usize) -> Result<()> {
        match self.read_budget {
            Some(remaining) if size > remaining => Err(ProtocolError::new(
                ProtocolErrorKind::SizeLimit,
                format!(
                    "Collection of {} elements exceeds remaining read length {}",
                    size, remaining
                ),
            )
            .into()),
            _ => Ok(()),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check_read_length(N)?;
        let mut buf = [0u8; N];
        self.transport.read_all(&mut buf)?;
        Ok(buf)
    }

    fn read_payload(&mut self, len: usize) -> Result<Bytes> {
        self.check_read_length(len)?;
        let mut buf = BytesMut::with_capacity(len.min(READ_CHUNK_SIZE));
        while buf.len() < len {
            let start = buf.len();
            let step = (len - start).min(READ_CHUNK_SIZE);
            buf.resize(start + step, 0);
            self.transport.read_all(&mut buf[start..])?;
        }
        Ok(buf.freeze())
    }

    fn read_size(&mut self) -> Result<usize> {
        let size = self.read_i32()?;
        checked_size(size)
    }

    fn read_type_tag(&mut self) -> Result<TypeTag> {
        let [code] = self.read_array::<1>()?;
        Ok(TypeTag::try_from(code)?)
    }

    fn read_collection<const N: usize>(&mut self) -> Result<([TypeTag; N], usize)> {
        let mut tags = [TypeTag::Stop; N];
        for tag in tags.iter_mut() {
            *tag = self.read_type_tag()?;
        }
        let size = self.read_size()?;
        if size > 0 {
            if let Some(tag) = tags
                .iter()
                .find(|tag| matches!(tag, TypeTag::Stop | TypeTag::Void))
            {
                return Err(ProtocolError::new(
                    ProtocolErrorKind::InvalidData,
                    format!("invalid collection element type: {}", tag),
                )
                .into());
            }
        }
        self.check_collection_size(size)?;
        Ok((tags, size))
    }

    fn read_string_body(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_payload(len)?;
        let value = std::str::from_utf8(&bytes).map_err(ProtocolError::from)?;
        Ok(value.to_owned())
    }

    fn write_raw(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            let n = self.transport.write(buf)?;
            if n == 0 {
                return Err(TransportError::unknown(format!(
                    "Transport accepted 0 of {} bytes",
                    buf.len()
                ))
                .into());
            }
            buf = &buf[n..];
        }
        Ok(())
    }

    fn write_size(&mut self, size: usize) -> Result<()> {
        let size = i32::try_from(size).map_err(|_| {
            ProtocolError::new(
                ProtocolErrorKind::SizeLimit,
                format!("size {} does not fit the i32 length prefix", size),
            )
        })?;
        self.write_i32(size)
    }
}

/// Rejects a negative declared length.
fn checked_size(size: i32) -> Result<usize> {
    usize::try_from(size).map_err(|_| {
        ProtocolError::new(
            ProtocolErrorKind::NegativeSize,
            format!("Negative length: {}", size),
        )
        .into()
    })
}

impl<T: Transport> Protocol for BinaryProtocol<T> {
    fn write_message_begin(&mut self, message: &Message) -> Result<()> {
        if self.config.strict_write {
            let version = VERSION_1 | u32::from(message.message_type().code());
            self.write_i32(version as i32)?;
            self.write_string(message.name())?;
        } else {
            self.write_string(message.name())?;
            self.write_byte(message.message_type().code() as i8)?;
        }
        self.write_i32(message.sequence_id())
    }

    fn write_message_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_begin(&mut self, field: &Field) -> Result<()> {
        self.write_byte(field.type_tag().code() as i8)?;
        self.write_i16(field.id())
    }

    fn write_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.write_byte(TypeTag::Stop.code() as i8)
    }

    fn write_map_begin(&mut self, header: &MapHeader) -> Result<()> {
        self.write_byte(header.key_type.code() as i8)?;
        self.write_byte(header.value_type.code() as i8)?;
        self.write_size(header.size)
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_list_begin(&mut self, header: &ListHeader) -> Result<()> {
        self.write_byte(header.element_type.code() as i8)?;
        self.write_size(header.size)
    }

    fn write_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_set_begin(&mut self, header: &SetHeader) -> Result<()> {
        self.write_byte(header.element_type.code() as i8)?;
        self.write_size(header.size)
    }

    fn write_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_byte(if value { 1 } else { 0 })
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_i64(value.to_bits() as i64)
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_binary(value.as_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<()> {
        self.write_size(value.len())?;
        self.write_raw(value)
    }

    fn read_message_begin(&mut self) -> Result<Message> {
        let header = self.read_i32()?;
        if header < 0 {
            let version = header as u32 & VERSION_MASK;
            if version != VERSION_1 {
                tracing::warn!("Rejecting message with bad version {:#010x}", version);
                return Err(ProtocolError::new(
                    ProtocolErrorKind::BadVersion,
                    format!("Bad version in read_message_begin: {:#010x}", version),
                )
                .into());
            }
            let message_type = MessageType::try_from((header & 0xff) as u8)?;
            let name = self.read_string()?;
            let sequence_id = self.read_i32()?;
            return Ok(Message::new(name, message_type, sequence_id));
        }

        if self.config.strict_read {
            tracing::warn!("Rejecting unversioned message header");
            return Err(ProtocolError::new(
                ProtocolErrorKind::BadVersion,
                "Missing version in read_message_begin, old client?",
            )
            .into());
        }

        // Legacy header: the first word is the name length.
        let name = self.read_string_body(header as usize)?;
        let message_type = MessageType::try_from(self.read_byte()? as u8)?;
        let sequence_id = self.read_i32()?;
        Ok(Message::new(name, message_type, sequence_id))
    }

    fn read_message_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_struct_begin(&mut self) -> Result<String> {
        Ok(String::new())
    }

    fn read_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<Field> {
        let tag = self.read_type_tag()?;
        if tag == TypeTag::Stop {
            return Ok(Field::anonymous());
        }
        let id = self.read_i16()?;
        Ok(Field::unnamed(tag, id))
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapHeader> {
        let ([key_type, value_type], size) = self.read_collection::<2>()?;
        Ok(MapHeader::new(key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListHeader> {
        let ([element_type], size) = self.read_collection::<1>()?;
        Ok(ListHeader::new(element_type, size))
    }

    fn read_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<SetHeader> {
        let ([element_type], size) = self.read_collection::<1>()?;
        Ok(SetHeader::new(element_type, size))
    }

    fn read_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? == 1)
    }

    fn read_byte(&mut self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.read_array()?))
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_i64()? as u64))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_size()?;
        self.read_string_body(len)
    }

    fn read_binary(&mut self) -> Result<Bytes> {
        let len = self.read_size()?;
        self.read_payload(len)
    }

    fn max_skip_depth(&self) -> usize {
        self.config.max_skip_depth
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.transport.flush()?)
    }

    fn transport(&mut self) -> &mut dyn Transport {
        &mut self.transport
    }
}

/// Produces [`BinaryProtocol`] instances sharing one configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryProtocolFactory {
    config: BinaryProtocolConfig,
}

impl BinaryProtocolFactory {
    pub fn new(config: BinaryProtocolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BinaryProtocolConfig {
        &self.config
    }
}

impl ProtocolFactory for BinaryProtocolFactory {
    fn get_protocol(&self, transport: BoxedTransport) -> BoxedProtocol {
        Box::new(BinaryProtocol::with_config(transport, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WireError;
    use hbwire_transport::{MemoryTransport, TransportErrorKind};

    fn protocol() -> BinaryProtocol<MemoryTransport> {
        BinaryProtocol::new(MemoryTransport::new())
    }

    fn reader(bytes: &[u8]) -> BinaryProtocol<MemoryTransport> {
        BinaryProtocol::new(MemoryTransport::from_bytes(bytes))
    }

    fn protocol_kind(err: WireError) -> ProtocolErrorKind {
        err.protocol_kind()
            .unwrap_or_else(|| panic!("expected protocol error, got {:?}", err))
    }

    #[test]
    fn test_scalar_layout_is_big_endian() {
        let mut p = protocol();
        p.write_bool(true).unwrap();
        p.write_bool(false).unwrap();
        p.write_byte(-2).unwrap();
        p.write_i16(0x0102).unwrap();
        p.write_i32(0x01020304).unwrap();
        p.write_i64(0x0102030405060708).unwrap();
        assert_eq!(
            p.transport_ref().bytes(),
            &[1, 0, 0xFE, 1, 2, 1, 2, 3, 4, 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_double_uses_ieee_bits() {
        let mut p = protocol();
        p.write_double(1.0).unwrap();
        assert_eq!(
            p.transport_ref().bytes(),
            &[0x3F, 0xF0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(p.read_double().unwrap(), 1.0);

        p.write_double(f64::NAN).unwrap();
        assert!(p.read_double().unwrap().is_nan());
    }

    #[test]
    fn test_scalar_roundtrip() {
        let mut p = protocol();
        p.write_bool(true).unwrap();
        p.write_byte(i8::MIN).unwrap();
        p.write_i16(i16::MIN).unwrap();
        p.write_i32(-1).unwrap();
        p.write_i64(i64::MAX).unwrap();
        p.write_double(-0.5).unwrap();
        p.write_string("").unwrap();
        p.write_string("héllo").unwrap();
        p.write_binary(&[]).unwrap();
        p.write_binary(&[0, 255, 7]).unwrap();

        assert!(p.read_bool().unwrap());
        assert_eq!(p.read_byte().unwrap(), i8::MIN);
        assert_eq!(p.read_i16().unwrap(), i16::MIN);
        assert_eq!(p.read_i32().unwrap(), -1);
        assert_eq!(p.read_i64().unwrap(), i64::MAX);
        assert_eq!(p.read_double().unwrap(), -0.5);
        assert_eq!(p.read_string().unwrap(), "");
        assert_eq!(p.read_string().unwrap(), "héllo");
        assert!(p.read_binary().unwrap().is_empty());
        assert_eq!(p.read_binary().unwrap().as_ref(), &[0, 255, 7]);
        assert_eq!(p.transport_ref().remaining(), 0);
    }

    #[test]
    fn test_strict_message_header_layout() {
        let mut p = protocol();
        p.write_message_begin(&Message::call("get", 7)).unwrap();
        assert_eq!(
            p.transport_ref().bytes(),
            &[0x80, 0x01, 0x00, 0x01, 0, 0, 0, 3, b'g', b'e', b't', 0, 0, 0, 7]
        );
        assert_eq!(p.read_message_begin().unwrap(), Message::call("get", 7));
    }

    #[test]
    fn test_legacy_message_header() {
        let config = BinaryProtocolConfig::new().with_strict_write(false);
        let mut p = BinaryProtocol::with_config(MemoryTransport::new(), config);
        p.write_message_begin(&Message::reply("get", 9)).unwrap();
        assert_eq!(
            p.transport_ref().bytes(),
            &[0, 0, 0, 3, b'g', b'e', b't', 2, 0, 0, 0, 9]
        );
        assert_eq!(p.read_message_begin().unwrap(), Message::reply("get", 9));
    }

    #[test]
    fn test_strict_read_rejects_legacy_header() {
        let config = BinaryProtocolConfig::new()
            .with_strict_write(false)
            .with_strict_read(true);
        let mut p = BinaryProtocol::with_config(MemoryTransport::new(), config);
        p.write_message_begin(&Message::call("get", 1)).unwrap();
        let err = p.read_message_begin().unwrap_err();
        assert_eq!(protocol_kind(err), ProtocolErrorKind::BadVersion);
    }

    #[test]
    fn test_strict_read_accepts_strict_header() {
        let config = BinaryProtocolConfig::new().with_strict_read(true);
        let mut p = BinaryProtocol::with_config(MemoryTransport::new(), config);
        p.write_message_begin(&Message::new("put", MessageType::Oneway, 2))
            .unwrap();
        let m = p.read_message_begin().unwrap();
        assert_eq!(m.message_type(), MessageType::Oneway);
    }

    #[test]
    fn test_tampered_version_rejected() {
        let mut p = reader(&[0x80, 0x02, 0x00, 0x01, 0, 0, 0, 1, b'x', 0, 0, 0, 1]);
        let err = p.read_message_begin().unwrap_err();
        assert_eq!(protocol_kind(err), ProtocolErrorKind::BadVersion);
    }

    #[test]
    fn test_invalid_message_type_rejected() {
        let mut p = reader(&[0x80, 0x01, 0x00, 0x09, 0, 0, 0, 0, 0, 0, 0, 1]);
        let err = p.read_message_begin().unwrap_err();
        assert_eq!(protocol_kind(err), ProtocolErrorKind::InvalidData);
    }

    #[test]
    fn test_field_headers() {
        let mut p = protocol();
        p.write_field_begin(&Field::new("row", TypeTag::String, 1))
            .unwrap();
        p.write_field_stop().unwrap();
        assert_eq!(p.transport_ref().bytes(), &[11, 0, 1, 0]);

        let field = p.read_field_begin().unwrap();
        assert_eq!(field.type_tag(), TypeTag::String);
        assert_eq!(field.id(), 1);
        assert_eq!(field.name(), "");
        assert!(p.read_field_begin().unwrap().is_anonymous());
        assert_eq!(p.transport_ref().remaining(), 0);
    }

    #[test]
    fn test_collection_headers() {
        let mut p = protocol();
        p.write_map_begin(&MapHeader::new(TypeTag::String, TypeTag::I64, 2))
            .unwrap();
        p.write_list_begin(&ListHeader::new(TypeTag::Struct, 0))
            .unwrap();
        p.write_set_begin(&SetHeader::new(TypeTag::I32, 5)).unwrap();
        assert_eq!(
            p.transport_ref().bytes(),
            &[11, 10, 0, 0, 0, 2, 12, 0, 0, 0, 0, 8, 0, 0, 0, 5]
        );

        assert_eq!(
            p.read_map_begin().unwrap(),
            MapHeader::new(TypeTag::String, TypeTag::I64, 2)
        );
        assert_eq!(
            p.read_list_begin().unwrap(),
            ListHeader::new(TypeTag::Struct, 0)
        );
        assert_eq!(p.read_set_begin().unwrap(), SetHeader::new(TypeTag::I32, 5));
    }

    #[test]
    fn test_negative_sizes_rejected() {
        let mut p = reader(&[0xFF, 0xFF, 0xFF, 0xFE]);
        assert_eq!(
            protocol_kind(p.read_string().unwrap_err()),
            ProtocolErrorKind::NegativeSize
        );

        let mut p = reader(&[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            protocol_kind(p.read_binary().unwrap_err()),
            ProtocolErrorKind::NegativeSize
        );

        let mut p = reader(&[8, 0x80, 0, 0, 0]);
        assert_eq!(
            protocol_kind(p.read_list_begin().unwrap_err()),
            ProtocolErrorKind::NegativeSize
        );
    }

    #[test]
    fn test_stop_element_type_rejected() {
        let mut p = reader(&[0, 0x7F, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            protocol_kind(p.read_list_begin().unwrap_err()),
            ProtocolErrorKind::InvalidData
        );

        // Either map tag may be the offender.
        let mut p = reader(&[11, 1, 0, 0, 0, 3]);
        let err = p.read_map_begin().unwrap_err();
        assert!(err.to_string().contains("VOID"));
        assert_eq!(protocol_kind(err), ProtocolErrorKind::InvalidData);

        let mut p = reader(&[14, 0, 0, 0, 0, 1]);
        assert_eq!(
            protocol_kind(p.read_set_begin().unwrap_err()),
            ProtocolErrorKind::InvalidData
        );

        // Empty collections may carry any tag.
        let mut p = reader(&[0, 0, 0, 0, 0, 0]);
        assert_eq!(p.read_map_begin().unwrap().size, 0);
    }

    #[test]
    fn test_unknown_type_tag_rejected() {
        let mut p = reader(&[0x42, 0, 1]);
        assert_eq!(
            protocol_kind(p.read_field_begin().unwrap_err()),
            ProtocolErrorKind::InvalidData
        );
    }

    #[test]
    fn test_invalid_utf8_is_invalid_data() {
        let mut p = reader(&[0, 0, 0, 2, 0xC3, 0x28]);
        assert_eq!(
            protocol_kind(p.read_string().unwrap_err()),
            ProtocolErrorKind::InvalidData
        );

        // The same bytes pass through unchecked as binary.
        let mut p = reader(&[0, 0, 0, 2, 0xC3, 0x28]);
        assert_eq!(p.read_binary().unwrap().as_ref(), &[0xC3, 0x28]);

        // Message names are decoded as strings.
        let mut p = reader(&[0x80, 0x01, 0x00, 0x01, 0, 0, 0, 1, 0xFF, 0, 0, 0, 1]);
        assert_eq!(
            protocol_kind(p.read_message_begin().unwrap_err()),
            ProtocolErrorKind::InvalidData
        );
    }

    #[test]
    fn test_truncated_input_is_transport_eof() {
        let mut p = reader(&[0, 0, 0, 10, b'a', b'b']);
        let err = p.read_string().unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::EndOfFile));
        assert_eq!(err.into_protocol().kind(), ProtocolErrorKind::InvalidData);
    }

    #[test]
    fn test_read_budget() {
        let mut p = protocol();
        p.write_string("abcdef").unwrap();
        p.set_read_length(Some(8));
        let err = p.read_string().unwrap_err();
        assert_eq!(protocol_kind(err), ProtocolErrorKind::SizeLimit);
        // The length prefix was consumed and charged before the body failed.
        assert_eq!(p.read_length(), Some(4));
    }

    #[test]
    fn test_read_budget_counts_every_primitive() {
        let config = BinaryProtocolConfig::new().with_read_length(6);
        let mut p = BinaryProtocol::with_config(MemoryTransport::new(), config);
        p.write_i32(1).unwrap();
        p.write_i16(2).unwrap();
        p.write_byte(3).unwrap();

        assert_eq!(p.read_i32().unwrap(), 1);
        assert_eq!(p.read_length(), Some(2));
        assert_eq!(p.read_i16().unwrap(), 2);
        assert_eq!(p.read_length(), Some(0));
        assert_eq!(
            protocol_kind(p.read_byte().unwrap_err()),
            ProtocolErrorKind::SizeLimit
        );

        p.set_read_length(None);
        assert_eq!(p.read_byte().unwrap(), 3);
    }

    #[test]
    fn test_read_budget_bounds_collection_claims() {
        let mut p = protocol();
        p.write_list_begin(&ListHeader::new(TypeTag::I64, 1_000_000))
            .unwrap();
        p.set_read_length(Some(64));
        assert_eq!(
            protocol_kind(p.read_list_begin().unwrap_err()),
            ProtocolErrorKind::SizeLimit
        );
    }

    #[test]
    fn test_oversized_claim_without_budget_fails_on_eof() {
        let mut p = reader(&[0x7F, 0xFF, 0xFF, 0xFF, 1, 2, 3]);
        let err = p.read_binary().unwrap_err();
        assert_eq!(err.transport_kind(), Some(TransportErrorKind::EndOfFile));
    }

    #[test]
    fn test_large_payload_spans_chunks() {
        let payload: Vec<u8> = (0..READ_CHUNK_SIZE * 2 + 17)
            .map(|i| (i % 253) as u8)
            .collect();
        let mut p = protocol();
        p.write_binary(&payload).unwrap();
        assert_eq!(p.read_binary().unwrap().as_ref(), payload.as_slice());
    }

    #[test]
    fn test_non_one_bool_byte_is_false() {
        let mut p = reader(&[2]);
        assert!(!p.read_bool().unwrap());
    }

    #[test]
    fn test_factory_applies_config() {
        let factory = BinaryProtocolFactory::new(
            BinaryProtocolConfig::new()
                .with_strict_write(false)
                .with_max_skip_depth(3),
        );
        let mut p = factory.get_protocol(Box::new(MemoryTransport::new()));
        assert_eq!(p.max_skip_depth(), 3);
        p.write_message_begin(&Message::call("a", 1)).unwrap();
        // Legacy header starts with the name length.
        let mut first = [0u8; 4];
        p.transport().read_all(&mut first).unwrap();
        assert_eq!(first, [0, 0, 0, 1]);
    }
}
