// crates/nanotec-rs/tests/simulator/interface.rs
use super::SimulatedDrive;
use nanotec_rs::frame::{Direction, encode_read, encode_write};
use nanotec_rs::hal::{
    Completion, LinkEvent, NanotecError, TransactionHandle, Transport, TransportError,
};
use nanotec_rs::types::{NodeId, ObjectAddress};
use std::collections::VecDeque;

/// A decoded request as the drive saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub direction: Direction,
    pub node_id: u8,
    pub address: ObjectAddress,
    pub payload: Vec<u8>,
}

impl Request {
    fn parse(pdu: &[u8]) -> Self {
        Self {
            direction: Direction::try_from(pdu[1]).expect("simulator received bad direction"),
            node_id: pdu[3],
            address: ObjectAddress::new(u16::from_be_bytes([pdu[4], pdu[5]]), pdu[6]),
            payload: pdu[11..].to_vec(),
        }
    }
}

/// An in-memory transport that answers from a `SimulatedDrive`.
///
/// Requests are queued on `submit` and answered one at a time, in order, on
/// `poll_completion`.
pub struct SimulatedTransport {
    pub drive: SimulatedDrive,
    next_handle: u32,
    /// Submitted but not yet answered.
    queue: VecDeque<(TransactionHandle, Vec<u8>)>,
    link_events: VecDeque<LinkEvent>,
    /// Every request submitted, in order.
    pub request_log: Vec<Request>,
    /// The next request to the given object fails with the given error.
    failures: Vec<(ObjectAddress, TransportError)>,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self {
            drive: SimulatedDrive::new(),
            next_handle: 0,
            queue: VecDeque::new(),
            link_events: VecDeque::new(),
            request_log: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// A transport whose first link event is `Connected`.
    pub fn connected() -> Self {
        let mut transport = Self::new();
        transport.connect();
        transport
    }

    pub fn connect(&mut self) {
        self.link_events.push_back(LinkEvent::Connected);
    }

    /// Drops everything in flight and reports the link as down.
    pub fn disconnect(&mut self) {
        self.queue.clear();
        self.link_events.push_back(LinkEvent::Disconnected);
    }

    pub fn fail_next(&mut self, address: ObjectAddress, error: TransportError) {
        self.failures.push((address, error));
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Requests of the given direction to the given object.
    pub fn requests_to(&self, direction: Direction, address: ObjectAddress) -> Vec<&Request> {
        self.request_log
            .iter()
            .filter(|r| r.direction == direction && r.address == address)
            .collect()
    }

    fn answer(&mut self, pdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        let request = Request::parse(pdu);
        if let Some(pos) = self.failures.iter().position(|(a, _)| *a == request.address) {
            return Err(self.failures.remove(pos).1);
        }

        let node = NodeId(request.node_id);
        match request.direction {
            Direction::Read => {
                let value = self.drive.read(request.address).ok_or(TransportError::Exception(0x02))?;
                let mut response = encode_read(node, request.address, 0, 1);
                response.extend_from_slice(&value.to_be_bytes());
                Ok(response)
            }
            Direction::Write => {
                self.drive.write(request.address, &request.payload);
                encode_write(node, request.address, 0, &[]).map_err(|_| TransportError::InvalidAdu)
            }
        }
    }
}

impl Transport for SimulatedTransport {
    fn submit(&mut self, pdu: &[u8]) -> Result<TransactionHandle, NanotecError> {
        self.next_handle += 1;
        let handle = TransactionHandle(self.next_handle);
        self.request_log.push(Request::parse(pdu));
        self.queue.push_back((handle, pdu.to_vec()));
        Ok(handle)
    }

    fn poll_completion(&mut self) -> Option<Completion> {
        let (handle, pdu) = self.queue.pop_front()?;
        let result = self.answer(&pdu);
        Some(Completion { handle, result })
    }

    fn poll_link_event(&mut self) -> Option<LinkEvent> {
        self.link_events.pop_front()
    }
}
