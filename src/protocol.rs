//! Inbound NMEA2000 autopilot command/status record.
//!
//! The autopilot publishes a private PGN carrying its heading setpoint, error
//! bits, mode and the rudder position it is commanding. Only the rudder
//! position drives the simulation; the other fields are decoded for logging.
//!
//! Wire layout, little endian, explicit byte offsets:
//!
//! | offset | size | field          |
//! |--------|------|----------------|
//! | 0      | 2    | heading, i16, rad * 10000 |
//! | 2      | 1    | status bits, opaque |
//! | 3      | 1    | auto mode      |
//! | 4      | 1    | rudder, i8, percent of full deflection |
//! | 5      | 1    | params slot    |

use crate::error::DecodeError;
use heapless::Vec;
use static_assertions::const_assert_eq;

/// Private command/status PGN sent by the autopilot.
pub const PRIVATE_COMMAND_STATUS_PGN: u32 = 61846;

pub const CAN_EFF_FLAG: u32 = 0x8000_0000;
pub const CAN_RTR_FLAG: u32 = 0x4000_0000;
pub const CAN_ERR_FLAG: u32 = 0x2000_0000;
pub const CAN_EFF_MASK: u32 = 0x1FFF_FFFF;
pub const CAN_MAX_DLEN: usize = 8;

const PGN_MASK: u32 = 0x1_FFFF;
const PGN_SHIFT: u32 = 8;

const HEADING_OFFSET: usize = 0;
const STATUS_OFFSET: usize = 2;
const MODE_OFFSET: usize = 3;
const RUDDER_OFFSET: usize = 4;
const PARAMS_SLOT_OFFSET: usize = 5;

/// Size of the command/status record; shorter payloads are rejected.
pub const COMMAND_STATUS_LEN: usize = 6;
const_assert_eq!(COMMAND_STATUS_LEN, PARAMS_SLOT_OFFSET + 1);

/// Full rudder deflection reported as 100 %, in radians (30 degrees).
pub const FULL_RUDDER_RAD: f64 = 0.52359878;
const HEADING_SCALE: f64 = 10_000.0;

/// Kernel acceptance filter selecting the command/status PGN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFilter {
    pub id: u32,
    pub mask: u32,
}

impl CanFilter {
    pub fn for_pgn(pgn: u32) -> Self {
        Self {
            id: (pgn << PGN_SHIFT) | CAN_EFF_FLAG,
            mask: (PGN_MASK << PGN_SHIFT) | CAN_EFF_FLAG,
        }
    }

    pub fn command_status() -> Self {
        Self::for_pgn(PRIVATE_COMMAND_STATUS_PGN)
    }
}

/// PGN field of a 29-bit extended identifier.
pub fn pgn_of(identifier: u32) -> u32 {
    ((identifier & CAN_EFF_MASK) >> PGN_SHIFT) & PGN_MASK
}

/// Software re-check of the kernel filter.
pub fn matches_filter(identifier: u32) -> bool {
    pgn_of(identifier) == PRIVATE_COMMAND_STATUS_PGN
}

/// A frame read from the bus, extended-id flag stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    pub identifier: u32,
    pub payload: Vec<u8, CAN_MAX_DLEN>,
}

impl InboundFrame {
    /// Payload bytes beyond the classic CAN limit are dropped.
    pub fn new(identifier: u32, data: &[u8]) -> Self {
        let len = data.len().min(CAN_MAX_DLEN);
        let mut payload = Vec::new();
        // Cannot fail, len is bounded by the capacity.
        let _ = payload.extend_from_slice(&data[..len]);
        Self {
            identifier: identifier & CAN_EFF_MASK,
            payload,
        }
    }

    pub fn payload_length(&self) -> usize {
        self.payload.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMode {
    Off,
    Standby,
    Heading,
    Unknown(u8),
}

impl From<u8> for AutoMode {
    fn from(raw: u8) -> Self {
        match raw {
            0 => AutoMode::Off,
            1 => AutoMode::Standby,
            2 => AutoMode::Heading,
            other => AutoMode::Unknown(other),
        }
    }
}

/// Decoded command/status record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandStatus {
    pub heading_raw: i16,
    pub status_bits: u8,
    pub auto_mode: AutoMode,
    pub rudder_percent: i8,
    pub params_slot: u8,
}

impl CommandStatus {
    pub fn decode(frame: &InboundFrame) -> Result<Self, DecodeError> {
        if !matches_filter(frame.identifier) {
            return Err(DecodeError::WrongPgn(pgn_of(frame.identifier)));
        }
        Self::from_payload(&frame.payload)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.len() < COMMAND_STATUS_LEN {
            return Err(DecodeError::ShortFrame {
                length: payload.len(),
                expected: COMMAND_STATUS_LEN,
            });
        }
        Ok(Self {
            heading_raw: i16::from_le_bytes([payload[HEADING_OFFSET], payload[HEADING_OFFSET + 1]]),
            status_bits: payload[STATUS_OFFSET],
            auto_mode: AutoMode::from(payload[MODE_OFFSET]),
            rudder_percent: i8::from_le_bytes([payload[RUDDER_OFFSET]]),
            params_slot: payload[PARAMS_SLOT_OFFSET],
        })
    }

    /// Heading setpoint in radians.
    pub fn heading_rad(&self) -> f64 {
        f64::from(self.heading_raw) / HEADING_SCALE
    }

    /// Rudder angle in radians. The autopilot's positive percent is the
    /// opposite sense of the model's positive angle.
    pub fn rudder_angle(&self) -> f64 {
        rudder_percent_to_rad(self.rudder_percent)
    }
}

pub fn rudder_percent_to_rad(percent: i8) -> f64 {
    -f64::from(percent) * FULL_RUDDER_RAD / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_frame(payload: &[u8]) -> InboundFrame {
        InboundFrame::new(PRIVATE_COMMAND_STATUS_PGN << 8 | 0x15, payload)
    }

    #[test]
    fn test_filter_constants() {
        let filter = CanFilter::command_status();
        assert_eq!(filter.id, (61846 << 8) | CAN_EFF_FLAG);
        assert_eq!(filter.mask, (0x1ffff << 8) | CAN_EFF_FLAG);
    }

    #[test]
    fn test_source_address_ignored_by_filter() {
        assert!(matches_filter(PRIVATE_COMMAND_STATUS_PGN << 8 | 0x01));
        assert!(matches_filter(6 << 26 | PRIVATE_COMMAND_STATUS_PGN << 8 | 0xfe));
        assert!(!matches_filter(127_245 << 8 | 0x01));
    }

    #[test]
    fn test_decode_fields() {
        let heading: i16 = 15708;
        let [h0, h1] = heading.to_le_bytes();
        let frame = command_frame(&[h0, h1, 0x03, 2, 0xce, 7]);
        let status = CommandStatus::decode(&frame).unwrap();

        assert_eq!(status.heading_raw, 15708);
        assert!((status.heading_rad() - 1.5708).abs() < 1e-9);
        assert_eq!(status.status_bits, 0x03);
        assert_eq!(status.auto_mode, AutoMode::Heading);
        assert_eq!(status.rudder_percent, -50);
        assert_eq!(status.params_slot, 7);
    }

    #[test]
    fn test_rudder_scale_and_sign() {
        assert!((rudder_percent_to_rad(50) - -0.26179939).abs() < 1e-8);
        assert!((rudder_percent_to_rad(-100) - 0.52359878).abs() < 1e-8);
        assert_eq!(rudder_percent_to_rad(0), 0.0);
    }

    #[test]
    fn test_short_frame_rejected() {
        let frame = command_frame(&[0, 0, 0, 0, 50]);
        assert_eq!(
            CommandStatus::decode(&frame),
            Err(DecodeError::ShortFrame { length: 5, expected: 6 })
        );
    }

    #[test]
    fn test_wrong_pgn_rejected() {
        let frame = InboundFrame::new(127_245 << 8 | 0x01, &[0, 0, 0, 0, 50, 0]);
        assert_eq!(CommandStatus::decode(&frame), Err(DecodeError::WrongPgn(127_245)));
    }

    #[test]
    fn test_unknown_mode_preserved() {
        let frame = command_frame(&[0, 0, 0, 9, 0, 0]);
        let status = CommandStatus::decode(&frame).unwrap();
        assert_eq!(status.auto_mode, AutoMode::Unknown(9));
    }

    #[test]
    fn test_oversized_payload_truncated() {
        let frame = InboundFrame::new(0, &[1; 12]);
        assert_eq!(frame.payload_length(), CAN_MAX_DLEN);
    }
}
