// crates/nanotec-rs/src/frame/mod.rs
pub mod codec;

use crate::types::{NodeId, ObjectAddress};
use alloc::vec::Vec;

pub use codec::{decode_response, encode_read, encode_write};

// --- Constants and Sizes ---

/// Size of the fixed MEI header (marker up to and including data count).
pub const MEI_HEADER_SIZE: usize = 11;
/// Minimum length of a valid write acknowledgement.
pub const MIN_WRITE_ACK_SIZE: usize = MEI_HEADER_SIZE;
/// Minimum length of a valid read response.
pub const MIN_READ_RESPONSE_SIZE: usize = 12;
/// Width of one register in a read response.
pub const REGISTER_SIZE: usize = 2;

/// Transfer direction, byte 1 of the MEI PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Direction {
    Read = 0x00,
    Write = 0x01,
}

impl TryFrom<u8> for Direction {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Read),
            0x01 => Ok(Self::Write),
            other => Err(other),
        }
    }
}

/// Registers carried by a read response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    /// Write acknowledgement, or a read that declared a data count of zero.
    Empty,
    /// Exactly one register was returned.
    Single(u16),
    /// Several registers, in wire order.
    Multiple(Vec<u16>),
}

impl ResponsePayload {
    /// Returns the first register, if any.
    pub fn first(&self) -> Option<u16> {
        match self {
            ResponsePayload::Empty => None,
            ResponsePayload::Single(value) => Some(*value),
            ResponsePayload::Multiple(values) => values.first().copied(),
        }
    }
}

/// A validated response to an object read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFrame {
    pub direction: Direction,
    pub node_id: NodeId,
    pub address: ObjectAddress,
    pub payload: ResponsePayload,
}
