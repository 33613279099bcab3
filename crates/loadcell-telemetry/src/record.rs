//! Decoded telemetry readings and timestamped records.

use crate::format::SensorFormat;
use chrono::{DateTime, Local};

/// Timestamp layout written to the CSV file and the console.
///
/// For local time the zone qualifier renders as the UTC offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// One decoded telemetry line, tagged by its wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// Two load-cell readings.
    DualLoadCell { load1: f64, load2: f64 },
    /// Two load-cell readings, reported in millinewtons.
    DualLoadCellMn { load1: f64, load2: f64 },
    /// Load cells plus INA219 power telemetry. `manual_power` is always
    /// recomputed as `bus_voltage * current`, not taken from the wire.
    LoadCellPower {
        load1: f64,
        load2: f64,
        bus_voltage: f64,
        shunt_voltage: f64,
        current: f64,
        power: f64,
        manual_power: f64,
    },
}

impl Reading {
    /// Returns the wire format this reading was decoded from.
    pub fn format(&self) -> SensorFormat {
        match self {
            Reading::DualLoadCell { .. } => SensorFormat::DualLoadCell,
            Reading::DualLoadCellMn { .. } => SensorFormat::DualLoadCellMn,
            Reading::LoadCellPower { .. } => SensorFormat::LoadCellPower,
        }
    }
}

/// A reading plus the local time at which it was decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: DateTime<Local>,
    pub reading: Reading,
}

impl Record {
    /// Wraps a reading with the current local time.
    ///
    /// Called at the moment parsing succeeds, never at line arrival.
    pub fn stamp(reading: Reading) -> Self {
        Self {
            timestamp: Local::now(),
            reading,
        }
    }

    /// Renders the timestamp in the fixed [`TIMESTAMP_FORMAT`] layout.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reading_format() {
        let reading = Reading::DualLoadCellMn {
            load1: 1.0,
            load2: 2.0,
        };
        assert_eq!(reading.format(), SensorFormat::DualLoadCellMn);
    }

    #[test]
    fn test_timestamp_layout() {
        let record = Record {
            timestamp: Local.with_ymd_and_hms(2025, 6, 25, 16, 38, 52).unwrap(),
            reading: Reading::DualLoadCell {
                load1: 12.34,
                load2: 56.78,
            },
        };
        let text = record.timestamp_text();
        assert!(text.starts_with("2025-06-25 16:38:52 "));
        // zone qualifier present after the seconds field
        assert!(text.len() > "2025-06-25 16:38:52 ".len());
    }

    #[test]
    fn test_stamp_attaches_wall_clock() {
        let before = Local::now();
        let record = Record::stamp(Reading::DualLoadCell {
            load1: 0.0,
            load2: 0.0,
        });
        let after = Local::now();
        assert!(record.timestamp >= before && record.timestamp <= after);
    }
}
