// crates/nanotec-rs/src/frame/codec.rs
use super::{
    Direction, MEI_HEADER_SIZE, MIN_READ_RESPONSE_SIZE, REGISTER_SIZE, ResponseFrame,
    ResponsePayload,
};
use crate::hal::NanotecError;
use crate::types::{MEI_TYPE_CANOPEN, NodeId, ObjectAddress};
use alloc::vec::Vec;
use log::trace;

/// Writes the 11-byte MEI header into the start of `buffer`.
/// Multi-byte header fields are big-endian.
fn serialize_header(
    buffer: &mut Vec<u8>,
    direction: Direction,
    node_id: NodeId,
    address: ObjectAddress,
    start_offset: u16,
    data_count: u16,
) {
    buffer.push(MEI_TYPE_CANOPEN);
    buffer.push(direction as u8);
    buffer.push(0x00); // Reserved / protocol
    buffer.push(node_id.0);
    buffer.extend_from_slice(&address.index.to_be_bytes());
    buffer.push(address.sub_index);
    buffer.extend_from_slice(&start_offset.to_be_bytes());
    buffer.extend_from_slice(&data_count.to_be_bytes());
}

/// Builds an object read request. The request carries no payload.
pub fn encode_read(
    node_id: NodeId,
    address: ObjectAddress,
    start_offset: u16,
    data_count: u16,
) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(MEI_HEADER_SIZE);
    serialize_header(
        &mut buffer,
        Direction::Read,
        node_id,
        address,
        start_offset,
        data_count,
    );
    trace!("Encoded read {} for node {}: {:02X?}", address, node_id.0, buffer);
    buffer
}

/// Builds an object write request.
///
/// `payload` must already be in the byte order the target object expects
/// (little-endian for numeric objects). The data count field is set to the
/// payload length in bytes.
pub fn encode_write(
    node_id: NodeId,
    address: ObjectAddress,
    start_offset: u16,
    payload: &[u8],
) -> Result<Vec<u8>, NanotecError> {
    let data_count =
        u16::try_from(payload.len()).map_err(|_| NanotecError::PayloadTooLarge(payload.len()))?;
    let mut buffer = Vec::with_capacity(MEI_HEADER_SIZE + payload.len());
    serialize_header(
        &mut buffer,
        Direction::Write,
        node_id,
        address,
        start_offset,
        data_count,
    );
    buffer.extend_from_slice(payload);
    trace!("Encoded write {} for node {}: {:02X?}", address, node_id.0, buffer);
    Ok(buffer)
}

/// Parses and validates a response PDU for the session's node.
///
/// Write acknowledgements are only length-checked. Read responses yield their
/// registers as big-endian 16-bit values.
pub fn decode_response(buffer: &[u8], expected_node: NodeId) -> Result<ResponseFrame, NanotecError> {
    if buffer.len() < MEI_HEADER_SIZE {
        return Err(NanotecError::MalformedFrame {
            length: buffer.len(),
            minimum: MEI_HEADER_SIZE,
        });
    }
    if buffer[0] != MEI_TYPE_CANOPEN {
        return Err(NanotecError::UnexpectedFrame("MEI type is not CANopen object access"));
    }
    let direction = Direction::try_from(buffer[1])
        .map_err(|_| NanotecError::UnexpectedFrame("unknown transfer direction"))?;
    let node_id = NodeId(buffer[3]);
    if node_id != expected_node {
        return Err(NanotecError::UnexpectedFrame("response from a different node"));
    }
    let address = ObjectAddress::new(u16::from_be_bytes([buffer[4], buffer[5]]), buffer[6]);

    let payload = match direction {
        // The header itself satisfies the write acknowledgement minimum.
        Direction::Write => ResponsePayload::Empty,
        Direction::Read => {
            if buffer.len() < MIN_READ_RESPONSE_SIZE {
                return Err(NanotecError::MalformedFrame {
                    length: buffer.len(),
                    minimum: MIN_READ_RESPONSE_SIZE,
                });
            }
            let data_count = u16::from_be_bytes([buffer[9], buffer[10]]);
            let data = &buffer[MEI_HEADER_SIZE..];
            let needed = data_count as usize * REGISTER_SIZE;
            if data.len() < needed {
                return Err(NanotecError::TruncatedPayload {
                    declared: data_count,
                    available: data.len(),
                });
            }
            // Registers are big-endian on the wire, unlike write payloads.
            match data_count {
                0 => ResponsePayload::Empty,
                1 => ResponsePayload::Single(u16::from_be_bytes([data[0], data[1]])),
                _ => ResponsePayload::Multiple(
                    data[..needed]
                        .chunks_exact(REGISTER_SIZE)
                        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                        .collect(),
                ),
            }
        }
    };

    Ok(ResponseFrame {
        direction,
        node_id,
        address,
        payload,
    })
}
