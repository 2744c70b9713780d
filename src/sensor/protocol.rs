//! WITMOTION serial framing.
//!
//! The device streams fixed 11-byte frames: `0x55`, a type byte in
//! `0x50..=0x5A`, three little-endian 16-bit axis values, two spare bytes
//! and an 8-bit additive checksum. Decoding is incremental so the stream
//! can resynchronize after garbage or a partial frame.

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::types::SensorSample;

pub const FRAME_LEN: usize = 11;

const FRAME_HEADER: u8 = 0x55;
const TYPE_ACCELERATION: u8 = 0x51;
const TYPE_ANGULAR_RATE: u8 = 0x52;
const TYPE_ANGLE: u8 = 0x53;

const ACC_RANGE_G: f64 = 16.0;
const GYRO_RANGE_DPS: f64 = 2000.0;
const ANGLE_RANGE_DEG: f64 = 180.0;

/// One decoded frame payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WitPacket {
    Acceleration([f64; 3]),
    AngularRate([f64; 3]),
    Angle([f64; 3]),
}

/// Incremental frame decoder. Feed it one byte at a time; it emits a packet
/// whenever a well-formed frame of a known type completes.
#[derive(Debug, Default)]
pub struct WitFrameDecoder {
    pending: Vec<u8>,
    checksum_errors: u64,
}

impl WitFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames discarded because of a checksum mismatch.
    pub fn checksum_errors(&self) -> u64 {
        self.checksum_errors
    }

    pub fn push(&mut self, byte: u8) -> Option<WitPacket> {
        self.pending.push(byte);

        if self.pending[0] != FRAME_HEADER {
            self.pending.remove(0);
            return None;
        }
        if self.pending.len() > 1 && !(0x50..=0x5A).contains(&self.pending[1]) {
            // Header byte was payload of a broken frame; drop it and rescan.
            self.pending.remove(0);
            return None;
        }
        if self.pending.len() < FRAME_LEN {
            return None;
        }

        let frame: Vec<u8> = self.pending.drain(..).collect();
        let expected = frame[..FRAME_LEN - 1]
            .iter()
            .fold(0u8, |sum, b| sum.wrapping_add(*b));
        if expected != frame[FRAME_LEN - 1] {
            self.checksum_errors += 1;
            warn!(
                "Checksum error: expected {:#04x}, got {:#04x}",
                expected,
                frame[FRAME_LEN - 1]
            );
            return None;
        }

        match frame[1] {
            TYPE_ACCELERATION => Some(WitPacket::Acceleration(decode_axes(&frame, ACC_RANGE_G))),
            TYPE_ANGULAR_RATE => Some(WitPacket::AngularRate(decode_axes(&frame, GYRO_RANGE_DPS))),
            TYPE_ANGLE => Some(WitPacket::Angle(decode_axes(&frame, ANGLE_RANGE_DEG))),
            _ => None,
        }
    }
}

fn decode_axes(frame: &[u8], range: f64) -> [f64; 3] {
    let mut values = [0.0; 3];
    for (i, value) in values.iter_mut().enumerate() {
        let lo = frame[2 + i * 2] as u16;
        let hi = frame[3 + i * 2] as u16;
        let mut v = (((hi as u32) << 8 | lo as u32) as f64) / 32768.0 * range;
        if v >= range {
            v -= 2.0 * range;
        }
        *value = v;
    }
    values
}

/// Combines the packet stream into complete samples. Angular-rate and angle
/// packets only update the held values; the acceleration packet closes out a
/// sample because it is the last frame of each device output cycle.
#[derive(Debug, Default)]
pub struct SampleAssembler {
    gyro: [f64; 3],
    angle: [f64; 3],
}

impl SampleAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: WitPacket) -> Option<SensorSample> {
        match packet {
            WitPacket::AngularRate(v) => {
                self.gyro = v;
                None
            }
            WitPacket::Angle(v) => {
                self.angle = v;
                None
            }
            WitPacket::Acceleration(acc) => Some(SensorSample::new(
                acc,
                self.gyro,
                self.angle,
                Utc::now().timestamp_millis(),
            )),
        }
    }
}

/// Device output rates accepted by the rate-configuration command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputRate {
    Hz1,
    Hz5,
    Hz10,
    Hz20,
    Hz50,
    Hz100,
    Hz200,
}

impl OutputRate {
    pub fn all() -> &'static [OutputRate] {
        &[
            OutputRate::Hz1,
            OutputRate::Hz5,
            OutputRate::Hz10,
            OutputRate::Hz20,
            OutputRate::Hz50,
            OutputRate::Hz100,
            OutputRate::Hz200,
        ]
    }

    /// Rate code understood by the device.
    pub fn code(self) -> u8 {
        match self {
            OutputRate::Hz1 => 0x01,
            OutputRate::Hz5 => 0x02,
            OutputRate::Hz10 => 0x05,
            OutputRate::Hz20 => 0x0A,
            OutputRate::Hz50 => 0x14,
            OutputRate::Hz100 => 0x19,
            OutputRate::Hz200 => 0x0B,
        }
    }

    pub fn hz(self) -> f64 {
        match self {
            OutputRate::Hz1 => 1.0,
            OutputRate::Hz5 => 5.0,
            OutputRate::Hz10 => 10.0,
            OutputRate::Hz20 => 20.0,
            OutputRate::Hz50 => 50.0,
            OutputRate::Hz100 => 100.0,
            OutputRate::Hz200 => 200.0,
        }
    }

    /// Sampling interval in seconds.
    pub fn dt(self) -> f64 {
        1.0 / self.hz()
    }

    pub fn label(self) -> String {
        format!("{} Hz", self.hz())
    }
}

/// Builds the `FF AA 03 <code> <checksum>` output-rate command.
pub fn rate_command(rate: OutputRate) -> [u8; 5] {
    let mut cmd = [0xFF, 0xAA, 0x03, rate.code(), 0x00];
    cmd[4] = cmd[..4].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(packet_type: u8, axes: [i16; 3]) -> [u8; FRAME_LEN] {
        let mut frame = [0u8; FRAME_LEN];
        frame[0] = FRAME_HEADER;
        frame[1] = packet_type;
        for (i, v) in axes.iter().enumerate() {
            let bytes = v.to_le_bytes();
            frame[2 + i * 2] = bytes[0];
            frame[3 + i * 2] = bytes[1];
        }
        frame[10] = frame[..10].iter().fold(0u8, |sum, b| sum.wrapping_add(*b));
        frame
    }

    fn feed(decoder: &mut WitFrameDecoder, bytes: &[u8]) -> Vec<WitPacket> {
        bytes.iter().filter_map(|&b| decoder.push(b)).collect()
    }

    #[test]
    fn decodes_acceleration_frame() {
        let mut decoder = WitFrameDecoder::new();
        // 2048 raw counts = 2048/32768 * 16 g = 1 g
        let frame = make_frame(TYPE_ACCELERATION, [2048, 0, -2048]);
        let packets = feed(&mut decoder, &frame);
        assert_eq!(packets.len(), 1);
        match packets[0] {
            WitPacket::Acceleration(acc) => {
                assert!((acc[0] - 1.0).abs() < 1e-9);
                assert!(acc[1].abs() < 1e-9);
                assert!((acc[2] + 1.0).abs() < 1e-9);
            }
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn decodes_angle_frame_with_wraparound() {
        let mut decoder = WitFrameDecoder::new();
        // -16384 counts = -90 deg with the 180 deg range
        let frame = make_frame(TYPE_ANGLE, [-16384, 16384, 0]);
        let packets = feed(&mut decoder, &frame);
        match packets[0] {
            WitPacket::Angle(angle) => {
                assert!((angle[0] + 90.0).abs() < 1e-9);
                assert!((angle[1] - 90.0).abs() < 1e-9);
            }
            other => panic!("unexpected packet {:?}", other),
        }
    }

    #[test]
    fn resynchronizes_after_garbage() {
        let mut decoder = WitFrameDecoder::new();
        let mut stream = vec![0x13, 0x55, 0x00, 0x37];
        stream.extend_from_slice(&make_frame(TYPE_ACCELERATION, [100, 200, 300]));
        let packets = feed(&mut decoder, &stream);
        assert_eq!(packets.len(), 1);
        assert!(matches!(packets[0], WitPacket::Acceleration(_)));
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut decoder = WitFrameDecoder::new();
        let mut frame = make_frame(TYPE_ACCELERATION, [100, 200, 300]);
        frame[10] = frame[10].wrapping_add(1);
        assert!(feed(&mut decoder, &frame).is_empty());
        assert_eq!(decoder.checksum_errors(), 1);
        // The stream stays usable afterwards.
        let good = make_frame(TYPE_ANGULAR_RATE, [1, 2, 3]);
        assert_eq!(feed(&mut decoder, &good).len(), 1);
    }

    #[test]
    fn ignores_unknown_packet_types() {
        let mut decoder = WitFrameDecoder::new();
        let frame = make_frame(0x54, [1, 2, 3]);
        assert!(feed(&mut decoder, &frame).is_empty());
        assert_eq!(decoder.checksum_errors(), 0);
    }

    #[test]
    fn assembler_emits_on_acceleration() {
        let mut assembler = SampleAssembler::new();
        assert!(assembler.push(WitPacket::AngularRate([1.0, 2.0, 3.0])).is_none());
        assert!(assembler.push(WitPacket::Angle([4.0, 5.0, 6.0])).is_none());
        let sample = assembler
            .push(WitPacket::Acceleration([0.1, 0.2, 1.0]))
            .expect("acceleration closes the sample");
        assert_eq!(sample.gyro, [1.0, 2.0, 3.0]);
        assert_eq!(sample.angle, [4.0, 5.0, 6.0]);
        assert_eq!(sample.acc, [0.1, 0.2, 1.0]);
    }

    #[test]
    fn rate_command_checksum() {
        assert_eq!(rate_command(OutputRate::Hz200), [0xFF, 0xAA, 0x03, 0x0B, 0xB7]);
        assert_eq!(rate_command(OutputRate::Hz100), [0xFF, 0xAA, 0x03, 0x19, 0xC5]);
    }

    #[test]
    fn rate_mapping_roundtrip() {
        for &rate in OutputRate::all() {
            assert!((rate.dt() * rate.hz() - 1.0).abs() < 1e-12);
        }
    }
}
