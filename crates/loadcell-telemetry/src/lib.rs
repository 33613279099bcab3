//! Load-Cell Rig Telemetry Library
//!
//! Wire-format grammars, line parsing, and serial line acquisition for the
//! dual load-cell / INA219 current-sensor test rig.

pub mod error;
pub mod format;
pub mod parser;
pub mod record;
pub mod source;

pub use error::{Error, Result};
pub use format::{Delimiter, Grammar, SensorFormat};
pub use parser::LineParser;
pub use record::{Reading, Record, TIMESTAMP_FORMAT};
pub use source::{LineSource, SerialLineSource};
