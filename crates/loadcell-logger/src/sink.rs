//! CSV record sink with console echo.
//!
//! Writes one header row when the file is created and one row per record
//! afterwards, flushing each row. The file is always newly created; the rig
//! produces one file per session, never appended across runs.

use anyhow::{Context, Result};
use loadcell_telemetry::{Reading, Record, SensorFormat};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

/// Append-only CSV sink mirroring each record to stdout.
pub struct CsvSink {
    writer: BufWriter<File>,
}

impl CsvSink {
    /// Creates (or truncates) the output file and writes the header row.
    pub async fn create<P: AsRef<Path>>(path: P, format: SensorFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(header_row(format).as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        info!("Logging {} records to {}", format, path.display());
        Ok(Self { writer })
    }

    /// Appends one record and echoes it to the console.
    pub async fn append(&mut self, record: &Record) -> Result<()> {
        self.writer.write_all(csv_row(record).as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        // flush every row; readers tail the file mid-run
        self.writer.flush().await?;

        println!("{}", echo_line(record));
        Ok(())
    }
}

fn header_row(format: SensorFormat) -> &'static str {
    match format {
        SensorFormat::DualLoadCell => "Timestamp,Load Cell 1,Load Cell 2",
        SensorFormat::DualLoadCellMn => "Timestamp,Load Cell 1 (mN),Load Cell 2 (mN)",
        SensorFormat::LoadCellPower => {
            "Timestamp,Load Cell 1 (mN),Load Cell 2 (mN),Current (A),Voltage (V),\
             Shunt Voltage (mV),Power (W),Manual Power (W)"
        }
    }
}

fn csv_row(record: &Record) -> String {
    let ts = record.timestamp_text();
    match &record.reading {
        Reading::DualLoadCell { load1, load2 } | Reading::DualLoadCellMn { load1, load2 } => {
            format!("{},{},{}", ts, load1, load2)
        }
        Reading::LoadCellPower {
            load1,
            load2,
            bus_voltage,
            shunt_voltage,
            current,
            power,
            manual_power,
        } => format!(
            "{},{},{},{},{},{},{},{}",
            ts, load1, load2, current, bus_voltage, shunt_voltage, power, manual_power
        ),
    }
}

fn echo_line(record: &Record) -> String {
    let ts = record.timestamp_text();
    match &record.reading {
        Reading::DualLoadCell { load1, load2 } => format!("{}, {}, {}", ts, load1, load2),
        Reading::DualLoadCellMn { load1, load2 } => {
            format!("{}, {:.2} mN, {:.2} mN", ts, load1, load2)
        }
        Reading::LoadCellPower {
            load1,
            load2,
            bus_voltage,
            shunt_voltage,
            current,
            power,
            manual_power,
        } => format!(
            "{}, {:.2} mN, {:.2} mN, {:.3} A, {:.2} V, {:.3} mV, {:.3} W, {:.3} W",
            ts, load1, load2, current, bus_voltage, shunt_voltage, power, manual_power
        ),
    }
}
