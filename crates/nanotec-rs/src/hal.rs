use alloc::vec::Vec;
use thiserror::Error;

/// Portable error type for the drive stack.
///
/// None of these are fatal to a drive session: frame-level errors are logged
/// and the affected response is dropped, and the power state machine recovers
/// by polling the status word again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NanotecError {
    /// The response is shorter than the minimum for its direction.
    #[error("Malformed frame: {length} bytes, at least {minimum} required")]
    MalformedFrame { length: usize, minimum: usize },
    /// A read response declares more registers than it carries.
    #[error("Truncated payload: {declared} registers declared, {available} bytes available")]
    TruncatedPayload { declared: u16, available: usize },
    /// The MEI marker, direction or node id does not belong to this session.
    #[error("Unexpected frame: {0}")]
    UnexpectedFrame(&'static str),
    /// The transport failed to complete the transaction.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    /// An intent was issued while the link to the drive is down.
    #[error("Drive is not connected")]
    NotConnected,
    /// A write payload does not fit the 16-bit data count field.
    #[error("Payload of {0} bytes exceeds the frame data count")]
    PayloadTooLarge(usize),
}

/// Opaque failure reported by a transport for a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No (complete) response arrived in time.
    #[error("response timed out")]
    Timeout,
    /// An underlying I/O error occurred.
    #[error("an underlying I/O error occurred")]
    Io,
    /// The response failed its checksum.
    #[error("checksum mismatch")]
    Crc,
    /// The server answered with a Modbus exception code.
    #[error("Modbus exception {0:#04x}")]
    Exception(u8),
    /// The response was not a well-formed application data unit.
    #[error("invalid application data unit")]
    InvalidAdu,
    /// The link went down before the transaction completed.
    #[error("link is down")]
    LinkDown,
}

/// Identifies one submitted transaction until its completion is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionHandle(pub u32);

/// The outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub handle: TransactionHandle,
    /// The MEI PDU data of the response (after the function code).
    pub result: Result<Vec<u8>, TransportError>,
}

/// Connection lifecycle events reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
}

/// Hardware Abstraction Layer (HAL) for the request/response link to the drive.
///
/// The transport owns everything below the MEI PDU: serial framing, checksum,
/// server addressing, request/response matching, timeouts and retries. None
/// of its methods may block the caller for longer than a single exchange.
pub trait Transport {
    /// Queues a vendor request PDU (function code `0x2B` is implied).
    ///
    /// Returns a handle that is echoed back in the matching `Completion`.
    fn submit(&mut self, pdu: &[u8]) -> Result<TransactionHandle, NanotecError>;

    /// Returns the next finished transaction, if any.
    fn poll_completion(&mut self) -> Option<Completion>;

    /// Returns the next connection state change, if any.
    fn poll_link_event(&mut self) -> Option<LinkEvent>;
}
