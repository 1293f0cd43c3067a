// crates/nanotec-rs/src/od/mod.rs
//! Addresses of the drive objects used by the controller.
//!
//! All of these live at sub-index 0.

pub mod constants;

use crate::types::ObjectAddress;
use constants::*;

pub const CONTROL_WORD: ObjectAddress = ObjectAddress::new(IDX_CONTROL_WORD_U16, 0);
pub const STATUS_WORD: ObjectAddress = ObjectAddress::new(IDX_STATUS_WORD_U16, 0);
pub const QUICK_STOP_OPTION_CODE: ObjectAddress =
    ObjectAddress::new(IDX_QUICK_STOP_OPTION_CODE_I16, 0);
pub const MODES_OF_OPERATION: ObjectAddress = ObjectAddress::new(IDX_MODES_OF_OPERATION_I8, 0);
pub const POLARITY: ObjectAddress = ObjectAddress::new(IDX_POLARITY_U8, 0);
pub const PROFILE_ACCELERATION: ObjectAddress =
    ObjectAddress::new(IDX_PROFILE_ACCELERATION_U32, 0);
pub const PROFILE_DECELERATION: ObjectAddress =
    ObjectAddress::new(IDX_PROFILE_DECELERATION_U32, 0);
pub const QUICK_STOP_DECELERATION: ObjectAddress =
    ObjectAddress::new(IDX_QUICK_STOP_DECELERATION_U32, 0);
pub const MAX_ACCELERATION: ObjectAddress = ObjectAddress::new(IDX_MAX_ACCELERATION_U32, 0);
pub const MAX_DECELERATION: ObjectAddress = ObjectAddress::new(IDX_MAX_DECELERATION_U32, 0);
pub const TARGET_VELOCITY: ObjectAddress = ObjectAddress::new(IDX_TARGET_VELOCITY_I32, 0);

/// Registers requested when reading the 16-bit control or status word.
///
/// The drive is expected to answer with one big-endian register. Firmware
/// that instead counts the reply in bytes (count 2, low byte first) needs a
/// different count here and a matching decode in `frame::decode_response`.
pub const WORD_REGISTER_COUNT: u16 = 1;
