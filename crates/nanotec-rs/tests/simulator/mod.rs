// crates/nanotec-rs/tests/simulator/mod.rs
pub mod interface;

pub use interface::SimulatedTransport;

use nanotec_rs::od;
use nanotec_rs::types::ObjectAddress;
use std::collections::BTreeMap;

/// Internal power stage of the simulated drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    SwitchOnDisabled,
    ReadyToSwitchOn,
    SwitchedOn,
    OperationEnabled,
    QuickStopActive,
    Fault,
}

impl SimState {
    /// Status word reported for the state. Bits outside the state mask are set
    /// the way a real drive sets them (voltage enabled, remote, target reached).
    pub fn status_word(self) -> u16 {
        match self {
            SimState::SwitchOnDisabled => 0x0250,
            SimState::ReadyToSwitchOn => 0x0231,
            SimState::SwitchedOn => 0x0233,
            SimState::OperationEnabled => 0x0637,
            SimState::QuickStopActive => 0x0217,
            SimState::Fault => 0x0218,
        }
    }
}

/// A CiA 402 drive model that answers object reads and writes.
pub struct SimulatedDrive {
    pub state: SimState,
    pub control_word: u16,
    /// When set, fault reset commands are ignored.
    pub fault_latched: bool,
    /// Raw status words returned instead of the modelled one, oldest first.
    pub status_overrides: Vec<u16>,
    /// Last payload written to each object other than the control word.
    pub objects: BTreeMap<ObjectAddress, Vec<u8>>,
    /// Every control word written, in order.
    pub control_history: Vec<u16>,
}

impl SimulatedDrive {
    pub fn new() -> Self {
        Self {
            state: SimState::SwitchOnDisabled,
            control_word: 0x0000,
            fault_latched: false,
            status_overrides: Vec::new(),
            objects: BTreeMap::new(),
            control_history: Vec::new(),
        }
    }

    pub fn inject_fault(&mut self) {
        self.state = SimState::Fault;
    }

    pub fn read(&mut self, address: ObjectAddress) -> Option<u16> {
        match address {
            od::STATUS_WORD => {
                if self.status_overrides.is_empty() {
                    Some(self.state.status_word())
                } else {
                    Some(self.status_overrides.remove(0))
                }
            }
            od::CONTROL_WORD => Some(self.control_word),
            other => self.objects.get(&other).map(|bytes| {
                let mut word = [0u8; 2];
                for (dst, src) in word.iter_mut().zip(bytes) {
                    *dst = *src;
                }
                u16::from_le_bytes(word)
            }),
        }
    }

    pub fn write(&mut self, address: ObjectAddress, payload: &[u8]) {
        if address == od::CONTROL_WORD && payload.len() == 2 {
            let word = u16::from_le_bytes([payload[0], payload[1]]);
            self.control_history.push(word);
            self.apply_control_word(word);
        } else {
            self.objects.insert(address, payload.to_vec());
        }
    }

    /// Device control commands (CiA 402). Bit 7 only matters in Fault.
    fn apply_control_word(&mut self, word: u16) {
        self.control_word = word;

        if self.state == SimState::Fault {
            if word & 0x80 != 0 && !self.fault_latched {
                self.state = SimState::SwitchOnDisabled;
            }
            return;
        }

        use SimState::*;
        self.state = match (self.state, word & 0x0F) {
            // Disable voltage
            (_, w) if w & 0x02 == 0 => SwitchOnDisabled,
            // Quick stop
            (OperationEnabled, w) if w & 0x06 == 0x02 => QuickStopActive,
            (QuickStopActive, w) if w & 0x06 == 0x02 => QuickStopActive,
            (_, w) if w & 0x06 == 0x02 => SwitchOnDisabled,
            // Shutdown
            (SwitchOnDisabled | SwitchedOn | OperationEnabled, w) if w & 0x07 == 0x06 => {
                ReadyToSwitchOn
            }
            // Switch on
            (ReadyToSwitchOn | OperationEnabled, 0x07) => SwitchedOn,
            // Enable operation
            (SwitchedOn | QuickStopActive, 0x0F) => OperationEnabled,
            (current, _) => current,
        };
    }
}
