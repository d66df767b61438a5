//! Wire type tags and message kinds.

use crate::error::{ProtocolError, ProtocolErrorKind};
use std::fmt;

/// Type tag carried on the wire ahead of fields and collection elements.
///
/// The discriminants are the exact byte values of the binary encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeTag {
    /// End of a struct's field list.
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    /// Strings and raw binary share this tag.
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
    /// Encoded as an i32.
    Enum = 16,
}

impl TypeTag {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns whether values of this type nest other values.
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            TypeTag::Struct | TypeTag::Map | TypeTag::Set | TypeTag::List
        )
    }
}

impl TryFrom<u8> for TypeTag {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TypeTag::Stop),
            1 => Ok(TypeTag::Void),
            2 => Ok(TypeTag::Bool),
            3 => Ok(TypeTag::Byte),
            4 => Ok(TypeTag::Double),
            6 => Ok(TypeTag::I16),
            8 => Ok(TypeTag::I32),
            10 => Ok(TypeTag::I64),
            11 => Ok(TypeTag::String),
            12 => Ok(TypeTag::Struct),
            13 => Ok(TypeTag::Map),
            14 => Ok(TypeTag::Set),
            15 => Ok(TypeTag::List),
            16 => Ok(TypeTag::Enum),
            _ => Err(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                format!("unknown type tag: {}", value),
            )),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Stop => write!(f, "STOP"),
            TypeTag::Void => write!(f, "VOID"),
            TypeTag::Bool => write!(f, "BOOL"),
            TypeTag::Byte => write!(f, "BYTE"),
            TypeTag::Double => write!(f, "DOUBLE"),
            TypeTag::I16 => write!(f, "I16"),
            TypeTag::I32 => write!(f, "I32"),
            TypeTag::I64 => write!(f, "I64"),
            TypeTag::String => write!(f, "STRING"),
            TypeTag::Struct => write!(f, "STRUCT"),
            TypeTag::Map => write!(f, "MAP"),
            TypeTag::Set => write!(f, "SET"),
            TypeTag::List => write!(f, "LIST"),
            TypeTag::Enum => write!(f, "ENUM"),
        }
    }
}

/// Kind of RPC message carried by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Call = 1,
    Reply = 2,
    Exception = 3,
    Oneway = 4,
}

impl MessageType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MessageType::Call),
            2 => Ok(MessageType::Reply),
            3 => Ok(MessageType::Exception),
            4 => Ok(MessageType::Oneway),
            _ => Err(ProtocolError::new(
                ProtocolErrorKind::InvalidData,
                format!("invalid message type: {}", value),
            )),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Call => write!(f, "CALL"),
            MessageType::Reply => write!(f, "REPLY"),
            MessageType::Exception => write!(f, "EXCEPTION"),
            MessageType::Oneway => write!(f, "ONEWAY"),
        }
    }
}
