//! Sensor wire formats and their grammars.
//!
//! The rig firmware has shipped three incompatible line layouts. Each one is
//! described by a static [`Grammar`]: the marker substrings that make a line
//! eligible, the ordered label table stripped from it, the tokenizer applied
//! to the residue, and the number of numeric fields expected.

use crate::error::Error;
use std::str::FromStr;

/// Tokenizer applied to the residue after label stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Split on runs of whitespace.
    Whitespace,
    /// Split on commas, trimming each token.
    Comma,
}

/// Wire grammar for one sensor format.
#[derive(Debug)]
pub struct Grammar {
    /// Substrings that must all be present for a line to carry data.
    pub markers: &'static [&'static str],
    /// Labels stripped from the line, in order, before tokenizing.
    pub labels: &'static [&'static str],
    /// Tokenizer for the stripped residue.
    pub delimiter: Delimiter,
    /// Minimum token count; mapping beyond it is positional and unchecked.
    pub expected_fields: usize,
}

static DUAL_GRAMMAR: Grammar = Grammar {
    markers: &["Load_cell"],
    labels: &["Load_cell 1 output val:", "Load_cell 2 output val:"],
    delimiter: Delimiter::Whitespace,
    expected_fields: 2,
};

// Label order matters: longer labels strip before their substrings
// ("manualPower:" before "Power:", "mV"/"mA"/"mW" before "V").
static POWER_GRAMMAR: Grammar = Grammar {
    markers: &["Load_cell", "Current:"],
    labels: &[
        "Load_cell 1 output val:",
        "Load_cell 2 output val:",
        "Bus Voltage:",
        "Shunt Voltage:",
        "manualPower:",
        "Current:",
        "Power:",
        "mV",
        "mA",
        "mW",
        "V",
    ],
    delimiter: Delimiter::Whitespace,
    expected_fields: 7,
};

/// Sensor wire format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorFormat {
    /// Two load-cell readings, unit-less output columns.
    #[default]
    DualLoadCell,
    /// Same wire grammar as [`SensorFormat::DualLoadCell`]; output annotated
    /// in millinewtons.
    DualLoadCellMn,
    /// Load cells plus INA219 current, voltage, and power telemetry.
    LoadCellPower,
}

impl SensorFormat {
    /// Returns the wire grammar for this format.
    pub fn grammar(&self) -> &'static Grammar {
        match self {
            SensorFormat::DualLoadCell | SensorFormat::DualLoadCellMn => &DUAL_GRAMMAR,
            SensorFormat::LoadCellPower => &POWER_GRAMMAR,
        }
    }
}

impl FromStr for SensorFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.to_lowercase().as_str() {
            "dual-load-cell" | "dual" => Ok(SensorFormat::DualLoadCell),
            "dual-load-cell-mn" | "dual-mn" => Ok(SensorFormat::DualLoadCellMn),
            "load-cell-power" | "power" => Ok(SensorFormat::LoadCellPower),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for SensorFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorFormat::DualLoadCell => write!(f, "dual-load-cell"),
            SensorFormat::DualLoadCellMn => write!(f, "dual-load-cell-mn"),
            SensorFormat::LoadCellPower => write!(f, "load-cell-power"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(
            "dual-load-cell".parse::<SensorFormat>().unwrap(),
            SensorFormat::DualLoadCell
        );
        assert_eq!(
            "dual-mn".parse::<SensorFormat>().unwrap(),
            SensorFormat::DualLoadCellMn
        );
        assert_eq!(
            "POWER".parse::<SensorFormat>().unwrap(),
            SensorFormat::LoadCellPower
        );
        assert!("csv".parse::<SensorFormat>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for format in [
            SensorFormat::DualLoadCell,
            SensorFormat::DualLoadCellMn,
            SensorFormat::LoadCellPower,
        ] {
            assert_eq!(format.to_string().parse::<SensorFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_grammar_shapes() {
        assert_eq!(SensorFormat::DualLoadCell.grammar().expected_fields, 2);
        assert_eq!(SensorFormat::DualLoadCellMn.grammar().expected_fields, 2);
        assert_eq!(SensorFormat::LoadCellPower.grammar().expected_fields, 7);
        assert!(SensorFormat::LoadCellPower
            .grammar()
            .markers
            .contains(&"Current:"));
    }

    #[test]
    fn test_power_labels_strip_longest_first() {
        let labels = SensorFormat::LoadCellPower.grammar().labels;
        let manual = labels.iter().position(|l| *l == "manualPower:").unwrap();
        let power = labels.iter().position(|l| *l == "Power:").unwrap();
        let milli = labels.iter().position(|l| *l == "mV").unwrap();
        let volts = labels.iter().position(|l| *l == "V").unwrap();
        assert!(manual < power);
        assert!(milli < volts);
    }
}
