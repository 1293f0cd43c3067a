// crates/nanotec-rs-serial/src/config.rs
use nanotec_rs::types::DEFAULT_SERVER_ADDRESS;
use std::time::Duration;

/// Parity setting of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParityMode {
    None,
    Odd,
    Even,
}

impl From<ParityMode> for serialport::Parity {
    fn from(parity: ParityMode) -> Self {
        match parity {
            ParityMode::None => serialport::Parity::None,
            ParityMode::Odd => serialport::Parity::Odd,
            ParityMode::Even => serialport::Parity::Even,
        }
    }
}

/// Serial line and Modbus settings. The defaults match the drive's factory setup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    /// Modbus server (slave) address of the drive.
    pub server_address: u8,
    pub baud_rate: u32,
    pub parity: ParityMode,
    /// 5 to 8.
    pub data_bits: u8,
    /// 1 or 2.
    pub stop_bits: u8,
    /// How long to wait for the first byte of a response.
    pub response_timeout_ms: u64,
    /// Line silence that ends a response.
    pub frame_silence_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::from("/dev/ttyUSB0"),
            server_address: DEFAULT_SERVER_ADDRESS,
            baud_rate: 19_200,
            parity: ParityMode::Even,
            data_bits: 8,
            stop_bits: 1,
            response_timeout_ms: 500,
            frame_silence_ms: 5,
        }
    }
}

impl SerialConfig {
    pub fn with_port(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn frame_silence(&self) -> Duration {
        Duration::from_millis(self.frame_silence_ms)
    }

    pub(crate) fn data_bits(&self) -> serialport::DataBits {
        match self.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            _ => serialport::DataBits::Eight,
        }
    }

    pub(crate) fn stop_bits(&self) -> serialport::StopBits {
        match self.stop_bits {
            2 => serialport::StopBits::Two,
            _ => serialport::StopBits::One,
        }
    }
}
