// crates/nanotec-rs-serial/src/adu.rs
//! Modbus RTU application data units: `[address][function][data][CRC16 LE]`.

use crc_any::CRCu16;
use nanotec_rs::TransportError;

/// Set in the function code of an exception response.
pub const EXCEPTION_FLAG: u8 = 0x80;
/// Size of the trailing checksum.
pub const CRC_SIZE: usize = 2;
/// Address, function code and checksum.
pub const MIN_ADU_SIZE: usize = 2 + CRC_SIZE;
/// Largest ADU a serial line server may send.
pub const MAX_ADU_SIZE: usize = 256;

/// CRC-16/MODBUS over `data`.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = CRCu16::crc16modbus();
    crc.digest(data);
    crc.get_crc()
}

/// Frames `data` for `server_address`. The checksum is appended low byte first.
pub fn encode_adu(server_address: u8, function: u8, data: &[u8]) -> Vec<u8> {
    let mut adu = Vec::with_capacity(MIN_ADU_SIZE + data.len());
    adu.push(server_address);
    adu.push(function);
    adu.extend_from_slice(data);
    let crc = crc16(&adu);
    adu.extend_from_slice(&crc.to_le_bytes());
    adu
}

/// Validates a response ADU and returns the data after the function code.
pub fn decode_adu(
    expected_address: u8,
    expected_function: u8,
    adu: &[u8],
) -> Result<Vec<u8>, TransportError> {
    if adu.len() < MIN_ADU_SIZE {
        return Err(TransportError::InvalidAdu);
    }
    let (body, checksum) = adu.split_at(adu.len() - CRC_SIZE);
    if crc16(body) != u16::from_le_bytes([checksum[0], checksum[1]]) {
        return Err(TransportError::Crc);
    }
    if body[0] != expected_address {
        return Err(TransportError::InvalidAdu);
    }

    let function = body[1];
    if function == expected_function | EXCEPTION_FLAG {
        return match body.get(2) {
            Some(code) => Err(TransportError::Exception(*code)),
            None => Err(TransportError::InvalidAdu),
        };
    }
    if function != expected_function {
        return Err(TransportError::InvalidAdu);
    }
    Ok(body[2..].to_vec())
}
