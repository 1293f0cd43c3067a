#![cfg_attr(not(feature = "std"), no_std)]

// 'alloc' is used for dynamic allocation (e.g., Vec<u8> in frames)
extern crate alloc;

// --- Foundation Modules ---
pub mod config;
pub mod hal;
pub mod types;

// --- Vendor Frame Layer ---
pub mod frame;
pub mod od;

// --- Transactions and Drive Control ---
pub mod dispatcher;
pub mod drive;
pub mod motor;

// --- Top-level Exports ---
pub use config::{DriveConfig, ProfileVelocityConfig};
pub use dispatcher::{Delivery, Dispatcher};
pub use drive::{DriveSession, Polarity, PowerState, PowerStateMachine, TargetOperation};
pub use frame::{ResponseFrame, ResponsePayload, decode_response, encode_read, encode_write};
pub use hal::{Completion, LinkEvent, NanotecError, TransactionHandle, Transport, TransportError};
pub use motor::MotorController;
pub use types::{NodeId, ObjectAddress};
