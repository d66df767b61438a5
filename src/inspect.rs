//! Decoding of captured messages for the `inspect` command.

use hbwire_client::{ClientConfig, TransportKind};
use hbwire_protocol::{
    ApplicationError, BinaryProtocol, BinaryProtocolConfig, Field, Message, MessageType,
    Protocol, Result,
};
use hbwire_transport::{FramedTransport, MemoryTransport};
use std::fmt;

/// How a capture is decoded.
#[derive(Debug, Clone)]
pub struct InspectOptions {
    pub framed: bool,
    pub max_frame_size: usize,
    pub protocol: BinaryProtocolConfig,
}

impl From<&ClientConfig> for InspectOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            framed: config.transport == TransportKind::Framed,
            max_frame_size: config.max_frame_size,
            protocol: config.binary_protocol_config(),
        }
    }
}

/// Top-level view of one decoded message.
#[derive(Debug)]
pub struct Report {
    pub message: Message,
    /// Field headers of the argument or result record, in wire order.
    pub fields: Vec<Field>,
    /// Set when the message carries an application exception.
    pub exception: Option<ApplicationError>,
    /// Bytes left in the capture after the message.
    pub trailing: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        if let Some(exception) = &self.exception {
            writeln!(f, "  {}", exception)?;
        }
        for field in &self.fields {
            writeln!(f, "  {:>6}  {}", field.id(), field.type_tag())?;
        }
        if self.trailing > 0 {
            writeln!(f, "  ({} trailing bytes)", self.trailing)?;
        }
        Ok(())
    }
}

/// Decodes the first message in `capture`.
pub fn inspect(capture: &[u8], options: &InspectOptions) -> Result<Report> {
    let memory = MemoryTransport::from_bytes(capture);
    if options.framed {
        let framed = FramedTransport::new(memory).with_max_frame_size(options.max_frame_size);
        let mut p = BinaryProtocol::with_config(framed, options.protocol);
        let mut report = read_message(&mut p)?;
        let framed = p.into_inner();
        report.trailing = framed.buffered() + framed.inner().remaining();
        Ok(report)
    } else {
        let mut p = BinaryProtocol::with_config(memory, options.protocol);
        let mut report = read_message(&mut p)?;
        report.trailing = p.transport_ref().remaining();
        Ok(report)
    }
}

fn read_message<P: Protocol>(p: &mut P) -> Result<Report> {
    let message = p.read_message_begin()?;
    tracing::debug!("Decoded header {}", message);

    if message.message_type() == MessageType::Exception {
        let exception = ApplicationError::read(p)?;
        p.read_message_end()?;
        return Ok(Report {
            message,
            fields: Vec::new(),
            exception: Some(exception),
            trailing: 0,
        });
    }

    let mut fields = Vec::new();
    p.read_struct_begin()?;
    loop {
        let field = p.read_field_begin()?;
        if field.is_stop() {
            break;
        }
        p.skip(field.type_tag())?;
        p.read_field_end()?;
        fields.push(field);
    }
    p.read_struct_end()?;
    p.read_message_end()?;

    Ok(Report {
        message,
        fields,
        exception: None,
        trailing: 0,
    })
}
