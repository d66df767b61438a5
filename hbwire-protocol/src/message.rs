//! Message envelope metadata.

use crate::types::MessageType;
use std::fmt;

/// The envelope that opens every RPC message: method name, kind and
/// sequence id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message {
    name: String,
    message_type: MessageType,
    sequence_id: i32,
}

impl Message {
    pub fn new(name: impl Into<String>, message_type: MessageType, sequence_id: i32) -> Self {
        Self {
            name: name.into(),
            message_type,
            sequence_id,
        }
    }

    pub fn call(name: impl Into<String>, sequence_id: i32) -> Self {
        Self::new(name, MessageType::Call, sequence_id)
    }

    pub fn reply(name: impl Into<String>, sequence_id: i32) -> Self {
        Self::new(name, MessageType::Reply, sequence_id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn sequence_id(&self) -> i32 {
        self.sequence_id
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Message name:'{}' type:{} seqid:{}>",
            self.name, self.message_type, self.sequence_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Message::call("get", 7);
        assert_eq!(a, Message::new("get", MessageType::Call, 7));
        assert_ne!(a, Message::call("get", 8));
        assert_ne!(a, Message::reply("get", 7));
        assert_ne!(a, Message::call("put", 7));
    }

    #[test]
    fn test_accessors_and_display() {
        let m = Message::reply("scannerOpen", -3);
        assert_eq!(m.name(), "scannerOpen");
        assert_eq!(m.message_type(), MessageType::Reply);
        assert_eq!(m.sequence_id(), -3);
        assert_eq!(
            m.to_string(),
            "<Message name:'scannerOpen' type:REPLY seqid:-3>"
        );
    }
}
