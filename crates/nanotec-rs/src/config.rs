// crates/nanotec-rs/src/config.rs
//! Static configuration of a drive session.

use crate::od::{self, constants::MODE_PROFILE_VELOCITY};
use crate::types::{NodeId, ObjectAddress};
use alloc::vec::Vec;

/// Ramp value the drive ships with for all acceleration objects.
pub const DEFAULT_RAMP: u32 = 2250;
/// Quick-stop option code 6: slow down on quick-stop ramp and stay in QuickStop.
pub const DEFAULT_QUICK_STOP_OPTION_CODE: i16 = 6;

/// Parameters written by `MotorController::initialize_profile_velocity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProfileVelocityConfig {
    pub profile_acceleration: u32,
    pub profile_deceleration: u32,
    pub quick_stop_deceleration: u32,
    pub max_acceleration: u32,
    pub max_deceleration: u32,
    pub quick_stop_option_code: i16,
}

impl Default for ProfileVelocityConfig {
    fn default() -> Self {
        Self {
            profile_acceleration: DEFAULT_RAMP,
            profile_deceleration: DEFAULT_RAMP,
            quick_stop_deceleration: DEFAULT_RAMP,
            max_acceleration: DEFAULT_RAMP,
            max_deceleration: DEFAULT_RAMP,
            quick_stop_option_code: DEFAULT_QUICK_STOP_OPTION_CODE,
        }
    }
}

impl ProfileVelocityConfig {
    /// The ordered object writes that switch the drive to Profile Velocity.
    /// Values are serialized little-endian with the width of each object.
    pub fn writes(&self) -> Vec<(ObjectAddress, Vec<u8>)> {
        let mut writes = Vec::with_capacity(7);
        writes.push((od::MODES_OF_OPERATION, [MODE_PROFILE_VELOCITY].to_vec()));
        writes.push((od::PROFILE_ACCELERATION, self.profile_acceleration.to_le_bytes().to_vec()));
        writes.push((od::PROFILE_DECELERATION, self.profile_deceleration.to_le_bytes().to_vec()));
        writes.push((
            od::QUICK_STOP_DECELERATION,
            self.quick_stop_deceleration.to_le_bytes().to_vec(),
        ));
        writes.push((od::MAX_ACCELERATION, self.max_acceleration.to_le_bytes().to_vec()));
        writes.push((od::MAX_DECELERATION, self.max_deceleration.to_le_bytes().to_vec()));
        writes.push((
            od::QUICK_STOP_OPTION_CODE,
            self.quick_stop_option_code.to_le_bytes().to_vec(),
        ));
        writes
    }
}

/// Per-connection settings of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DriveConfig {
    /// Node the MEI frames are addressed to; responses from other nodes are dropped.
    pub node_id: NodeId,
    pub profile: ProfileVelocityConfig,
}
