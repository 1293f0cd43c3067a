// crates/nanotec-rs-serial/src/lib.rs
pub mod adu;
pub mod config;

pub use config::{ParityMode, SerialConfig};

use log::{debug, error, info, trace, warn};
use nanotec_rs::types::MODBUS_FC_MEI;
use nanotec_rs::{Completion, LinkEvent, NanotecError, TransactionHandle, Transport, TransportError};
use serialport::{ClearBuffer, SerialPort};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use thiserror::Error;

/// Failure to bring up the serial link.
#[derive(Debug, Error)]
pub enum SerialError {
    #[error("failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },
}

/// Modbus RTU master on a serial port.
///
/// Requests are queued by `submit` and exchanged one at a time, oldest first,
/// each time `poll_completion` is called. An exchange blocks for at most the
/// configured response timeout.
pub struct RtuSerialTransport {
    port: Box<dyn SerialPort>,
    config: SerialConfig,
    next_handle: u32,
    queue: VecDeque<(TransactionHandle, Vec<u8>)>,
    link_events: VecDeque<LinkEvent>,
    connected: bool,
}

impl RtuSerialTransport {
    /// Opens the port. The first link event reported is `Connected`.
    pub fn open(config: SerialConfig) -> Result<Self, SerialError> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .parity(config.parity.into())
            .data_bits(config.data_bits())
            .stop_bits(config.stop_bits())
            .timeout(config.response_timeout())
            .open()
            .map_err(|source| SerialError::Open {
                port: config.port.clone(),
                source,
            })?;
        info!(
            "Opened {} at {} baud, server address {}.",
            config.port, config.baud_rate, config.server_address
        );

        let mut link_events = VecDeque::new();
        link_events.push_back(LinkEvent::Connected);
        Ok(Self {
            port,
            config,
            next_handle: 0,
            queue: VecDeque::new(),
            link_events,
            connected: true,
        })
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Sends one request ADU and collects the response.
    fn exchange(&mut self, pdu: &[u8]) -> Result<Vec<u8>, TransportError> {
        let request = adu::encode_adu(self.config.server_address, MODBUS_FC_MEI, pdu);
        trace!("TX {:02X?}", request);

        if let Err(e) = self.port.clear(ClearBuffer::Input) {
            warn!("Could not flush stale input: {}", e);
        }
        self.port.write_all(&request).map_err(|e| self.link_failure(e))?;
        self.port.flush().map_err(|e| self.link_failure(e))?;

        let response = self.read_response()?;
        trace!("RX {:02X?}", response);
        adu::decode_adu(self.config.server_address, MODBUS_FC_MEI, &response)
    }

    /// Reads until the line stays silent for the inter-frame gap.
    fn read_response(&mut self) -> Result<Vec<u8>, TransportError> {
        let mut response = Vec::with_capacity(adu::MAX_ADU_SIZE);
        let mut chunk = [0u8; adu::MAX_ADU_SIZE];
        self.set_timeout(self.config.response_timeout());

        let result = loop {
            match self.port.read(&mut chunk) {
                Ok(0) => break Ok(()),
                Ok(n) => {
                    response.extend_from_slice(&chunk[..n]);
                    if response.len() >= adu::MAX_ADU_SIZE {
                        break Ok(());
                    }
                    self.set_timeout(self.config.frame_silence());
                }
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(self.link_failure(e)),
            }
        };
        self.set_timeout(self.config.response_timeout());
        result?;

        if response.is_empty() {
            debug!("No response within {} ms.", self.config.response_timeout_ms);
            return Err(TransportError::Timeout);
        }
        Ok(response)
    }

    fn set_timeout(&mut self, timeout: std::time::Duration) {
        if let Err(e) = self.port.set_timeout(timeout) {
            warn!("Could not set serial timeout: {}", e);
        }
    }

    /// Marks the link down and abandons queued requests.
    fn link_failure(&mut self, e: io::Error) -> TransportError {
        error!("Serial I/O on {} failed: {}", self.config.port, e);
        if self.connected {
            self.connected = false;
            self.queue.clear();
            self.link_events.push_back(LinkEvent::Disconnected);
        }
        TransportError::Io
    }
}

impl Transport for RtuSerialTransport {
    fn submit(&mut self, pdu: &[u8]) -> Result<TransactionHandle, NanotecError> {
        if !self.connected {
            return Err(NanotecError::NotConnected);
        }
        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = TransactionHandle(self.next_handle);
        self.queue.push_back((handle, pdu.to_vec()));
        Ok(handle)
    }

    fn poll_completion(&mut self) -> Option<Completion> {
        let (handle, pdu) = self.queue.pop_front()?;
        let result = self.exchange(&pdu);
        Some(Completion { handle, result })
    }

    fn poll_link_event(&mut self) -> Option<LinkEvent> {
        self.link_events.pop_front()
    }
}
