//! Discarding values of a known type without knowing their schema.

use crate::error::{ProtocolError, ProtocolErrorKind, Result};
use crate::protocol::Protocol;
use crate::types::TypeTag;

/// Default recursion budget for [`skip`]; effectively unbounded.
pub const DEFAULT_MAX_SKIP_DEPTH: usize = i32::MAX as usize;

/// Reads and discards exactly one value of type `tag`.
///
/// Every descent into a struct, map, set or list consumes one unit of
/// `max_depth`; running out fails with [`ProtocolErrorKind::DepthLimit`]
/// before anything of the nested value is read.
pub fn skip<P: Protocol + ?Sized>(protocol: &mut P, tag: TypeTag, max_depth: usize) -> Result<()> {
    match tag {
        TypeTag::Stop | TypeTag::Void => Ok(()),
        TypeTag::Bool => protocol.read_bool().map(drop),
        TypeTag::Byte => protocol.read_byte().map(drop),
        TypeTag::I16 => protocol.read_i16().map(drop),
        TypeTag::I32 | TypeTag::Enum => protocol.read_i32().map(drop),
        TypeTag::I64 => protocol.read_i64().map(drop),
        TypeTag::Double => protocol.read_double().map(drop),
        // Read as binary: the bytes are discarded, so no UTF-8 check.
        TypeTag::String => protocol.read_binary().map(drop),
        TypeTag::Struct => {
            let depth = descend(max_depth)?;
            protocol.read_struct_begin()?;
            loop {
                let field = protocol.read_field_begin()?;
                if field.is_stop() {
                    break;
                }
                skip(protocol, field.type_tag(), depth)?;
                protocol.read_field_end()?;
            }
            protocol.read_struct_end()
        }
        TypeTag::Map => {
            let depth = descend(max_depth)?;
            let header = protocol.read_map_begin()?;
            for _ in 0..header.size {
                skip(protocol, header.key_type, depth)?;
                skip(protocol, header.value_type, depth)?;
            }
            protocol.read_map_end()
        }
        TypeTag::Set => {
            let depth = descend(max_depth)?;
            let header = protocol.read_set_begin()?;
            for _ in 0..header.size {
                skip(protocol, header.element_type, depth)?;
            }
            protocol.read_set_end()
        }
        TypeTag::List => {
            let depth = descend(max_depth)?;
            let header = protocol.read_list_begin()?;
            for _ in 0..header.size {
                skip(protocol, header.element_type, depth)?;
            }
            protocol.read_list_end()
        }
    }
}

fn descend(max_depth: usize) -> Result<usize> {
    match max_depth.checked_sub(1) {
        Some(depth) => Ok(depth),
        None => {
            tracing::debug!("Skip depth limit reached");
            Err(ProtocolError::new(ProtocolErrorKind::DepthLimit, "Depth limit exceeded").into())
        }
    }
}
