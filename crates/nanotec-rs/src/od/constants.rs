// crates/nanotec-rs/src/od/constants.rs
//! Object indices the controller touches on the drive.
//!
//! Indices follow CiA 402 (drive profile) and are named with the
//! `IDX_` + type-suffix convention.

// --- 0x6000 - 0x6FFF: Drive Profile Area ---

pub const IDX_CONTROL_WORD_U16: u16 = 0x6040;
pub const IDX_STATUS_WORD_U16: u16 = 0x6041;
pub const IDX_QUICK_STOP_OPTION_CODE_I16: u16 = 0x605A;
pub const IDX_MODES_OF_OPERATION_I8: u16 = 0x6060;
pub const IDX_POLARITY_U8: u16 = 0x607E;
pub const IDX_PROFILE_ACCELERATION_U32: u16 = 0x6083;
pub const IDX_PROFILE_DECELERATION_U32: u16 = 0x6084;
pub const IDX_QUICK_STOP_DECELERATION_U32: u16 = 0x6085;
pub const IDX_MAX_ACCELERATION_U32: u16 = 0x60C5;
pub const IDX_MAX_DECELERATION_U32: u16 = 0x60C6;
pub const IDX_TARGET_VELOCITY_I32: u16 = 0x60FF;

// --- Values ---

/// Modes of operation (0x6060): Profile Velocity.
pub const MODE_PROFILE_VELOCITY: u8 = 3;

/// Polarity (0x607E) bit that reverses the velocity direction.
pub const POLARITY_VELOCITY_REVERSED: u8 = 0x40;
