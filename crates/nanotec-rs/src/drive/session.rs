// crates/nanotec-rs/src/drive/session.rs
use super::states::{PowerState, TargetOperation};
use crate::od::constants::POLARITY_VELOCITY_REVERSED;

/// Control word assumed before any has been observed: all enable bits set
/// (switch on, enable voltage, quick stop, enable operation) plus bit 6.
pub const DEFAULT_CONTROL_BASIS: u16 = 0x004F;

/// Direction of rotation for a commanded velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Normal,
    Reversed,
}

impl Polarity {
    /// The byte written to the polarity object (0x607E).
    pub const fn object_value(self) -> u8 {
        match self {
            Polarity::Normal => 0x00,
            Polarity::Reversed => POLARITY_VELOCITY_REVERSED,
        }
    }
}

/// Which transaction of the polling loop is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPhase {
    /// No loop transaction in flight; the drive has converged or nothing was requested.
    #[default]
    Idle,
    /// A status word read has been submitted.
    AwaitingStatus,
    /// A control word read has been submitted.
    AwaitingControl,
    /// A loop transaction could not be submitted. Repeating the current
    /// intent restarts the loop.
    Stalled,
}

/// Everything known about one connected drive.
///
/// The session is a plain value: the state machine takes it and hands back
/// the updated copy, so a test can replay any sequence of observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveSession {
    pub power_state: PowerState,
    pub target: TargetOperation,
    /// Last velocity written to 0x60FF.
    pub speed: Option<u32>,
    /// Last polarity written to 0x607E.
    pub polarity: Option<Polarity>,
    /// Last control word read from or written to the drive.
    pub last_control_word: Option<u16>,
    pub phase: LoopPhase,
}

impl DriveSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while a loop transaction is outstanding.
    pub fn is_polling(&self) -> bool {
        matches!(self.phase, LoopPhase::AwaitingStatus | LoopPhase::AwaitingControl)
    }

    /// Base bits for a command issued outside the loop.
    pub fn command_basis(&self) -> u16 {
        self.last_control_word.unwrap_or(DEFAULT_CONTROL_BASIS)
    }
}
