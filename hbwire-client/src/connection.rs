//! Connection assembly: socket, optional framing, protocol.

use crate::config::{ClientConfig, ProtocolKind, TransportKind};
use crate::error::ClientError;
use hbwire_protocol::{
    ApplicationError, ApplicationErrorKind, BinaryProtocolFactory, BoxedProtocol, Message,
    MessageType, Protocol, ProtocolError, ProtocolErrorKind, ProtocolFactory, WireError,
};
use hbwire_transport::{
    BoxedTransport, FramedTransportFactory, PassThroughTransportFactory, SocketTransport,
    Transport, TransportFactory,
};

/// Returns the protocol factory for `config`, or a `NotImplemented`
/// protocol error for encodings this crate cannot speak.
pub fn protocol_factory(config: &ClientConfig) -> Result<Box<dyn ProtocolFactory>, ClientError> {
    match config.protocol {
        ProtocolKind::Binary => Ok(Box::new(BinaryProtocolFactory::new(
            config.binary_protocol_config(),
        ))),
        ProtocolKind::Compact => Err(ProtocolError::new(
            ProtocolErrorKind::NotImplemented,
            format!("unsupported protocol: {}", config.protocol),
        )
        .into()),
    }
}

/// Returns the transport factory layered over the raw socket.
pub fn transport_factory(config: &ClientConfig) -> Box<dyn TransportFactory> {
    match config.transport {
        TransportKind::Socket => Box::new(PassThroughTransportFactory),
        TransportKind::Framed => {
            Box::new(FramedTransportFactory::new().with_max_frame_size(config.max_frame_size))
        }
    }
}

/// An open protocol stack to one server.
pub struct Connection {
    config: ClientConfig,
    protocol: BoxedProtocol,
    next_sequence_id: i32,
}

impl Connection {
    /// Validates `config`, dials the server and assembles the stack.
    pub fn open(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        // Resolve the encoding first so an unsupported one never dials.
        let protocols = protocol_factory(&config)?;
        let transports = transport_factory(&config);

        let mut socket = SocketTransport::new(config.addr.clone(), config.timeout());
        socket.open()?;

        let transport: BoxedTransport = transports.get_transport(Box::new(socket));
        tracing::debug!(
            "Connected to {} using {} transport and {} protocol",
            config.addr,
            config.transport,
            config.protocol
        );

        Ok(Self {
            protocol: protocols.get_protocol(transport),
            config,
            next_sequence_id: 1,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn protocol(&mut self) -> &mut dyn Protocol {
        self.protocol.as_mut()
    }

    pub fn into_protocol(self) -> BoxedProtocol {
        self.protocol
    }

    /// Writes the header of a call and returns it for matching the reply.
    pub fn begin_call(&mut self, name: &str) -> Result<Message, ClientError> {
        let message = Message::call(name, self.next_sequence_id);
        self.next_sequence_id = self.next_sequence_id.wrapping_add(1);
        self.protocol.write_message_begin(&message)?;
        Ok(message)
    }

    /// Reads a reply header and checks it answers `call`.
    ///
    /// An exception reply is decoded and returned as an application error.
    pub fn begin_reply(&mut self, call: &Message) -> Result<Message, ClientError> {
        let reply = self.protocol.read_message_begin()?;
        match reply.message_type() {
            MessageType::Reply => {}
            MessageType::Exception => {
                let err = ApplicationError::read(self.protocol.as_mut())?;
                self.protocol.read_message_end()?;
                return Err(WireError::from(err).into());
            }
            other => {
                return Err(application_error(
                    ApplicationErrorKind::InvalidMessageType,
                    format!("{}: expected REPLY, got {}", call.name(), other),
                ))
            }
        }
        if reply.name() != call.name() {
            return Err(application_error(
                ApplicationErrorKind::WrongMethodName,
                format!("expected {}, got {}", call.name(), reply.name()),
            ));
        }
        if reply.sequence_id() != call.sequence_id() {
            return Err(application_error(
                ApplicationErrorKind::BadSequenceId,
                format!(
                    "{}: expected seqid {}, got {}",
                    call.name(),
                    call.sequence_id(),
                    reply.sequence_id()
                ),
            ));
        }
        Ok(reply)
    }

    /// Closes the underlying transport.
    pub fn close(&mut self) -> Result<(), ClientError> {
        tracing::debug!("Closing connection to {}", self.config.addr);
        self.protocol.transport().close()?;
        Ok(())
    }
}

fn application_error(kind: ApplicationErrorKind, message: String) -> ClientError {
    WireError::from(ApplicationError::new(kind, message)).into()
}

/// Opens a connection described by `config`.
pub fn connect(config: &ClientConfig) -> Result<Connection, ClientError> {
    Connection::open(config.clone())
}
