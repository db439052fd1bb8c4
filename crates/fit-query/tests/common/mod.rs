//! Minimal FIT encoder for building test activity files
//!
//! Writes one optional `record` message (position) and one `session` message,
//! wrapped in a 14-byte header and the trailing file CRC.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31 00:00:00 UTC)
const FIT_EPOCH_OFFSET: i64 = 631_065_600;

const MESG_SESSION: u16 = 18;
const MESG_RECORD: u16 = 20;

const BASE_ENUM: u8 = 0x00;
const BASE_UINT8: u8 = 0x02;
const BASE_UINT16: u8 = 0x84;
const BASE_SINT32: u8 = 0x85;
const BASE_UINT32: u8 = 0x86;

pub const SPORT_RUNNING: u8 = 1;
pub const SPORT_CYCLING: u8 = 2;
pub const SPORT_HIKING: u8 = 17;

const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

fn fit_crc(bytes: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in bytes {
        let tmp = CRC_TABLE[usize::from(crc & 0xF)];
        crc = ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[usize::from(byte & 0xF)];
        let tmp = CRC_TABLE[usize::from(crc & 0xF)];
        crc = ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[usize::from(byte >> 4)];
    }
    crc
}

fn fit_time(t: DateTime<Utc>) -> u32 {
    u32::try_from(t.timestamp() - FIT_EPOCH_OFFSET).expect("timestamp after FIT epoch")
}

/// Convert decimal degrees to FIT semicircles
pub fn degrees_to_semicircles(degrees: f64) -> i32 {
    (degrees * (2_147_483_648.0 / 180.0)).round() as i32
}

/// Session values written into a test file
#[derive(Debug, Clone)]
pub struct TestActivity {
    pub start_time: DateTime<Utc>,
    pub sport: u8,
    /// Meters, written with the profile scale of 100
    pub total_distance: f64,
    pub avg_heart_rate: u8,
    pub total_calories: u16,
    /// Semicircles (lat, long) of a single waypoint
    pub position: Option<(i32, i32)>,
}

impl TestActivity {
    pub fn running(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            sport: SPORT_RUNNING,
            total_distance: 9876.0,
            avg_heart_rate: 141,
            total_calories: 650,
            position: None,
        }
    }

    pub fn with_sport(mut self, sport: u8) -> Self {
        self.sport = sport;
        self
    }

    pub fn with_distance(mut self, meters: f64) -> Self {
        self.total_distance = meters;
        self
    }

    pub fn with_position(mut self, lat_degrees: f64, long_degrees: f64) -> Self {
        self.position = Some((
            degrees_to_semicircles(lat_degrees),
            degrees_to_semicircles(long_degrees),
        ));
        self
    }

    /// Encode as a complete FIT file
    pub fn encode(&self) -> Vec<u8> {
        let ts = fit_time(self.start_time);
        let mut data = Vec::new();

        if let Some((lat, long)) = self.position {
            definition(
                &mut data,
                1,
                MESG_RECORD,
                &[(253, 4, BASE_UINT32), (0, 4, BASE_SINT32), (1, 4, BASE_SINT32)],
            );
            data.push(1);
            data.extend_from_slice(&ts.to_le_bytes());
            data.extend_from_slice(&lat.to_le_bytes());
            data.extend_from_slice(&long.to_le_bytes());
        }

        definition(
            &mut data,
            0,
            MESG_SESSION,
            &[
                (253, 4, BASE_UINT32),
                (2, 4, BASE_UINT32),
                (5, 1, BASE_ENUM),
                (9, 4, BASE_UINT32),
                (16, 1, BASE_UINT8),
                (11, 2, BASE_UINT16),
            ],
        );
        let distance = (self.total_distance * 100.0).round() as u32;
        data.push(0);
        data.extend_from_slice(&ts.to_le_bytes());
        data.extend_from_slice(&ts.to_le_bytes());
        data.push(self.sport);
        data.extend_from_slice(&distance.to_le_bytes());
        data.push(self.avg_heart_rate);
        data.extend_from_slice(&self.total_calories.to_le_bytes());

        let mut file = Vec::with_capacity(data.len() + 16);
        file.push(14);
        file.push(0x10);
        file.extend_from_slice(&2132u16.to_le_bytes());
        file.extend_from_slice(&(data.len() as u32).to_le_bytes());
        file.extend_from_slice(b".FIT");
        let header_crc = fit_crc(&file);
        file.extend_from_slice(&header_crc.to_le_bytes());

        file.extend_from_slice(&data);
        let crc = fit_crc(&file);
        file.extend_from_slice(&crc.to_le_bytes());
        file
    }

    /// Encode and write to `dir/name`, creating parent directories
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        write_bytes(dir, name, &self.encode())
    }
}

fn definition(data: &mut Vec<u8>, local_type: u8, global: u16, fields: &[(u8, u8, u8)]) {
    data.push(0x40 | local_type);
    data.push(0);
    data.push(0);
    data.extend_from_slice(&global.to_le_bytes());
    data.push(fields.len() as u8);
    for &(num, size, base) in fields {
        data.extend_from_slice(&[num, size, base]);
    }
}

pub fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create test directory");
    }
    std::fs::write(&path, bytes).expect("write test file");
    path
}

