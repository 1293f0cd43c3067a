use core::convert::TryFrom;
use core::fmt;

// --- Primitive Types (CANopen UNSIGNEDn) ---

/// Alias for UNSIGNED8 (8-bit unsigned integer)
pub type UNSIGNED8 = u8;
/// Alias for UNSIGNED16 (16-bit unsigned integer)
pub type UNSIGNED16 = u16;

// --- Protocol Constants ---

/// Modbus function code used by the vendor object access extension.
pub const MODBUS_FC_MEI: u8 = 0x2B;

/// MEI type marker for CANopen-style object read/write transactions.
pub const MEI_TYPE_CANOPEN: u8 = 0x0D;

/// Modbus server (slave) address the drive answers on by default.
pub const DEFAULT_SERVER_ADDRESS: u8 = 0x05;

/// Node ID of the drive inside the MEI frame.
pub const DEFAULT_NODE_ID: u8 = 0x01;

/// Identifies the drive a frame is addressed to (byte 3 of the MEI PDU).
///
/// Valid node IDs are 1-127, the same range CANopen allows. The newtype
/// keeps raw bytes from being passed where a node is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u8);

impl Default for NodeId {
    fn default() -> Self {
        NodeId(DEFAULT_NODE_ID)
    }
}

/// Error type for invalid Node ID creation.
#[derive(Debug, PartialEq, Eq)]
pub enum NodeIdError {
    /// Node ID is outside the valid range (1-127).
    InvalidRange(u8),
}

impl fmt::Display for NodeIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeIdError::InvalidRange(value) => {
                write!(f, "Invalid NodeId value: {}. Valid range is 1-127.", value)
            }
        }
    }
}

impl TryFrom<u8> for NodeId {
    type Error = NodeIdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=127 => Ok(NodeId(value)),
            _ => Err(NodeIdError::InvalidRange(value)),
        }
    }
}

impl From<NodeId> for u8 {
    fn from(node_id: NodeId) -> Self {
        node_id.0
    }
}

/// An entry of the drive's object dictionary: index plus sub-index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectAddress {
    pub index: UNSIGNED16,
    pub sub_index: UNSIGNED8,
}

impl ObjectAddress {
    pub const fn new(index: u16, sub_index: u8) -> Self {
        Self { index, sub_index }
    }
}

impl fmt::Display for ObjectAddress {
    /// Formats the address as "0xIIII/SS".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}/{}", self.index, self.sub_index)
    }
}
