// crates/nanotec-rs/src/drive/mod.rs
//! Power-stage state machine of the drive (CiA 402 device control).

pub mod session;
pub mod state_machine;
pub mod states;

pub use session::{DEFAULT_CONTROL_BASIS, DriveSession, LoopPhase, Polarity};
pub use state_machine::{LoopStep, PowerStateMachine, next_control_word};
pub use states::{PowerState, TargetOperation};
