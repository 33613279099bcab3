//! Telemetry line parser.
//!
//! Each line is handled independently: strip the format's known labels,
//! tokenize the residue, map tokens to fields by position, convert to floats.
//! Mapping is positional and unchecked beyond count. If the firmware ever
//! reorders fields, parsing yields plausible but wrong numbers rather than an
//! error. That fragility is the rig's documented wire contract.

use crate::error::{Error, Result};
use crate::format::{Delimiter, SensorFormat};
use crate::record::Reading;
use tracing::trace;

/// Literal the firmware emits for an unsettled load-cell reading.
const NAN_LITERAL: &str = "nan";

/// Parser for one sensor wire format.
///
/// Stateless: nothing carries over between lines.
#[derive(Debug, Clone, Copy)]
pub struct LineParser {
    format: SensorFormat,
}

impl LineParser {
    /// Creates a parser for the given wire format.
    pub fn new(format: SensorFormat) -> Self {
        Self { format }
    }

    /// Returns the wire format this parser decodes.
    pub fn format(&self) -> SensorFormat {
        self.format
    }

    /// Parses one raw line.
    ///
    /// Returns `Ok(None)` when the line lacks the format's data markers (a
    /// valid no-data outcome, empty lines included), `Ok(Some(reading))` when
    /// every required field converted, and an error otherwise. Partial
    /// records are never produced: one bad field rejects the whole line.
    pub fn parse(&self, line: &str) -> Result<Option<Reading>> {
        let grammar = self.format.grammar();
        if !grammar.markers.iter().all(|marker| line.contains(marker)) {
            trace!("no data markers in line: {:?}", line);
            return Ok(None);
        }

        let residue = strip_labels(line, grammar.labels);
        let tokens = tokenize(&residue, grammar.delimiter);
        if tokens.len() < grammar.expected_fields {
            return Err(Error::FieldCount {
                expected: grammar.expected_fields,
                found: tokens.len(),
                line: line.to_string(),
            });
        }

        let reading = match self.format {
            SensorFormat::DualLoadCell => Reading::DualLoadCell {
                load1: parse_load(tokens[0], line)?,
                load2: parse_load(tokens[tokens.len() - 1], line)?,
            },
            SensorFormat::DualLoadCellMn => Reading::DualLoadCellMn {
                load1: parse_load(tokens[0], line)?,
                load2: parse_load(tokens[tokens.len() - 1], line)?,
            },
            SensorFormat::LoadCellPower => {
                let load1 = parse_load(tokens[0], line)?;
                let load2 = parse_load(tokens[1], line)?;
                let bus_voltage = parse_field(tokens[2], line)?;
                let shunt_voltage = parse_field(tokens[3], line)?;
                let current = parse_field(tokens[4], line)?;
                let power = parse_field(tokens[5], line)?;
                // The transmitted manual-power field must be numeric for the
                // line to count as well formed, but its value is not trusted.
                parse_field(tokens[6], line)?;
                Reading::LoadCellPower {
                    load1,
                    load2,
                    bus_voltage,
                    shunt_voltage,
                    current,
                    power,
                    manual_power: bus_voltage * current,
                }
            }
        };
        Ok(Some(reading))
    }
}

/// Removes every occurrence of each label, in table order.
fn strip_labels(line: &str, labels: &[&str]) -> String {
    let mut residue = line.to_string();
    for label in labels {
        residue = residue.replace(label, "");
    }
    residue
}

fn tokenize(residue: &str, delimiter: Delimiter) -> Vec<&str> {
    match delimiter {
        Delimiter::Whitespace => residue.split_whitespace().collect(),
        Delimiter::Comma => residue
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .collect(),
    }
}

/// Converts a load-cell token, normalizing the firmware's `nan` to zero.
fn parse_load(token: &str, line: &str) -> Result<f64> {
    if token.eq_ignore_ascii_case(NAN_LITERAL) {
        return Ok(0.0);
    }
    parse_field(token, line)
}

fn parse_field(token: &str, line: &str) -> Result<f64> {
    token.parse().map_err(|source| Error::InvalidNumber {
        token: token.to_string(),
        line: line.to_string(),
        source,
    })
}
