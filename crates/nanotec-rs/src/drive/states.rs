// crates/nanotec-rs/src/drive/states.rs
use core::fmt;

/// Bits of the status word that encode the power-stage state.
pub const STATUS_WORD_STATE_MASK: u16 = 0x006F;

/// Power-stage states of the drive, as reported by the status word (0x6041).
/// (Reference: CiA 402, device control state machine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    /// Switch On Disabled: power stage off, no command pending.
    SwitchedOff,
    /// Ready To Switch On.
    Ready,
    /// Switched On: power stage on, drive function disabled.
    SwitchedOn,
    /// Operation Enabled: the motor follows the setpoint.
    Running,
    /// Quick Stop Active.
    QuickStop,
    /// Fault or Fault Reaction Active. Held until the drive clears it.
    Fault,
    /// The masked status word matches no known state.
    #[default]
    Unknown,
}

impl PowerState {
    /// Decodes a raw status word. Only the bits in `STATUS_WORD_STATE_MASK`
    /// are considered.
    pub const fn from_status_word(status: u16) -> Self {
        match status & STATUS_WORD_STATE_MASK {
            0x40 | 0x60 => PowerState::SwitchedOff,
            0x21 => PowerState::Ready,
            0x23 => PowerState::SwitchedOn,
            0x27 => PowerState::Running,
            0x07 => PowerState::QuickStop,
            0x08 | 0x28 => PowerState::Fault,
            _ => PowerState::Unknown,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PowerState::SwitchedOff => "SwitchedOff",
            PowerState::Ready => "Ready",
            PowerState::SwitchedOn => "SwitchedOn",
            PowerState::Running => "Running",
            PowerState::QuickStop => "QuickStop",
            PowerState::Fault => "Fault",
            PowerState::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// The operator intent the state machine keeps steering toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetOperation {
    /// No intent has been issued on this session yet.
    #[default]
    Uninitialized,
    Start,
    Stop,
    Pause,
}
