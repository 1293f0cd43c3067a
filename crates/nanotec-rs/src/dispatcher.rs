// crates/nanotec-rs/src/dispatcher.rs
//! Matches transport completions to the requests that caused them.

use crate::frame::{self, Direction, ResponseFrame, ResponsePayload};
use crate::hal::{Completion, LinkEvent, NanotecError, TransactionHandle, Transport};
use crate::od;
use crate::types::{NodeId, ObjectAddress};
use alloc::collections::BTreeMap;
use log::{debug, error, info, trace, warn};

/// What was asked of the drive for one outstanding transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub direction: Direction,
    pub address: ObjectAddress,
}

/// The routed outcome of one completed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A status word read finished. `None` if it failed or returned no register.
    StatusWord(Option<u16>),
    /// A control word read finished. `None` if it failed or returned no register.
    ControlWord(Option<u16>),
    /// Any write acknowledgement, or a read of another object.
    Completed {
        address: ObjectAddress,
        payload: ResponsePayload,
    },
    /// The completion failed, or matched no pending request.
    Discarded,
}

/// Issues encoded requests through a `Transport` and routes their responses.
pub struct Dispatcher<T: Transport> {
    transport: T,
    node_id: NodeId,
    pending: BTreeMap<TransactionHandle, PendingRequest>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, node_id: NodeId) -> Self {
        Self {
            transport,
            node_id,
            pending: BTreeMap::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Number of transactions submitted but not yet completed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Submits a read of `count` registers of `address`.
    pub fn send_read(
        &mut self,
        address: ObjectAddress,
        count: u16,
    ) -> Result<TransactionHandle, NanotecError> {
        let pdu = frame::encode_read(self.node_id, address, 0, count);
        let handle = self.transport.submit(&pdu)?;
        debug!("Read {} ({} registers) submitted as {:?}", address, count, handle);
        self.pending.insert(
            handle,
            PendingRequest {
                direction: Direction::Read,
                address,
            },
        );
        Ok(handle)
    }

    /// Submits a write of `payload` (already in the object's byte order) to `address`.
    pub fn send_write(
        &mut self,
        address: ObjectAddress,
        payload: &[u8],
    ) -> Result<TransactionHandle, NanotecError> {
        let pdu = frame::encode_write(self.node_id, address, 0, payload)?;
        let handle = self.transport.submit(&pdu)?;
        debug!("Write {} {:02X?} submitted as {:?}", address, payload, handle);
        self.pending.insert(
            handle,
            PendingRequest {
                direction: Direction::Write,
                address,
            },
        );
        Ok(handle)
    }

    /// Takes one completion from the transport and routes it.
    ///
    /// Returns `None` when the transport has nothing finished. Errors never
    /// escape: they are logged, and a failed status or control read is
    /// reported as a missing observation.
    pub fn poll(&mut self) -> Option<Delivery> {
        let Completion { handle, result } = self.transport.poll_completion()?;

        let Some(request) = self.pending.remove(&handle) else {
            warn!("Completion for unknown transaction {:?}, ignoring.", handle);
            return Some(Delivery::Discarded);
        };

        let outcome = result
            .map_err(NanotecError::from)
            .and_then(|bytes| self.validate(&request, &bytes));

        let delivery = match outcome {
            Ok(response) => Self::route(&request, response),
            Err(e) => {
                warn!(
                    "{:?} of {} ({:?}) failed: {}",
                    request.direction, request.address, handle, e
                );
                Self::route_failure(&request)
            }
        };
        trace!("{:?} -> {:?}", handle, delivery);
        Some(delivery)
    }

    /// Forwards the next link event. A disconnect abandons every pending transaction.
    pub fn poll_link(&mut self) -> Option<LinkEvent> {
        let event = self.transport.poll_link_event()?;
        match event {
            LinkEvent::Connected => info!("Link to node {} established.", self.node_id.0),
            LinkEvent::Disconnected => {
                error!(
                    "Link to node {} lost, dropping {} pending transactions.",
                    self.node_id.0,
                    self.pending.len()
                );
                self.pending.clear();
            }
        }
        Some(event)
    }

    /// Decodes a response and checks it answers `request`.
    fn validate(
        &self,
        request: &PendingRequest,
        bytes: &[u8],
    ) -> Result<ResponseFrame, NanotecError> {
        let response = frame::decode_response(bytes, self.node_id)?;
        if response.direction != request.direction {
            return Err(NanotecError::UnexpectedFrame("direction does not match request"));
        }
        if response.address != request.address {
            return Err(NanotecError::UnexpectedFrame("object does not match request"));
        }
        Ok(response)
    }

    fn route(request: &PendingRequest, response: ResponseFrame) -> Delivery {
        match (request.direction, request.address) {
            (Direction::Read, od::STATUS_WORD) => Delivery::StatusWord(response.payload.first()),
            (Direction::Read, od::CONTROL_WORD) => Delivery::ControlWord(response.payload.first()),
            _ => Delivery::Completed {
                address: response.address,
                payload: response.payload,
            },
        }
    }

    fn route_failure(request: &PendingRequest) -> Delivery {
        match (request.direction, request.address) {
            (Direction::Read, od::STATUS_WORD) => Delivery::StatusWord(None),
            (Direction::Read, od::CONTROL_WORD) => Delivery::ControlWord(None),
            _ => Delivery::Discarded,
        }
    }
}
