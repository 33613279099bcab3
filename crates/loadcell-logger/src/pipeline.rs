//! The acquisition loop: read, parse, stamp, append.

use anyhow::{Context, Result};
use loadcell_telemetry::{LineParser, LineSource, Record};
use tracing::{trace, warn};

use crate::sink::CsvSink;

/// Runs the pipeline until the transport dies.
///
/// One cycle reads one line, parses it, stamps it, and appends one row.
/// Malformed lines are logged and dropped; a single bad line never halts the
/// stream. Serial failures are tolerated up to `max_transport_failures`
/// consecutive occurrences, and any successful cycle (a line, or a clean
/// timeout with no data) resets the budget.
pub async fn run<S: LineSource>(
    source: &mut S,
    parser: &LineParser,
    sink: &mut CsvSink,
    max_transport_failures: u32,
) -> Result<()> {
    let mut consecutive_failures: u32 = 0;

    loop {
        let line = match source.next_line().await {
            Ok(Some(line)) => {
                consecutive_failures = 0;
                line
            }
            Ok(None) => {
                consecutive_failures = 0;
                continue;
            }
            Err(e) => {
                consecutive_failures += 1;
                warn!(
                    "Serial read failed ({}/{}): {}",
                    consecutive_failures, max_transport_failures, e
                );
                if consecutive_failures >= max_transport_failures {
                    return Err(e).with_context(|| {
                        format!(
                            "Giving up after {} consecutive serial failures",
                            consecutive_failures
                        )
                    });
                }
                continue;
            }
        };

        match parser.parse(&line) {
            Ok(Some(reading)) => {
                let record = Record::stamp(reading);
                sink.append(&record).await.context("Failed to write record")?;
            }
            Ok(None) => trace!("no sensor data in line: {:?}", line),
            Err(e) => warn!("Discarding malformed line: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadcell_telemetry::{Error, SensorFormat};
    use std::collections::VecDeque;
    use std::path::PathBuf;

    struct ScriptedSource {
        replies: VecDeque<loadcell_telemetry::Result<Option<String>>>,
    }

    impl ScriptedSource {
        fn new(
            replies: impl IntoIterator<Item = loadcell_telemetry::Result<Option<String>>>,
        ) -> Self {
            Self {
                replies: replies.into_iter().collect(),
            }
        }
    }

    impl LineSource for ScriptedSource {
        async fn next_line(&mut self) -> loadcell_telemetry::Result<Option<String>> {
            self.replies.pop_front().unwrap_or_else(|| {
                Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "script exhausted",
                )))
            })
        }
    }

    fn transport_error() -> loadcell_telemetry::Error {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "device unplugged",
        ))
    }

    fn temp_csv(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("loadcell_{}_{}.csv", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_malformed_lines_do_not_stop_the_stream() {
        let path = temp_csv("pipeline");
        let mut sink = CsvSink::create(&path, SensorFormat::DualLoadCell)
            .await
            .unwrap();
        let mut source = ScriptedSource::new([
            Ok(Some("booting HX711".to_string())),
            Ok(Some(
                "Load_cell 1 output val: abc    Load_cell 2 output val: 2.0".to_string(),
            )),
            Ok(None),
            Ok(Some(
                "Load_cell 1 output val: 12.34    Load_cell 2 output val: 56.78".to_string(),
            )),
        ]);
        let parser = LineParser::new(SensorFormat::DualLoadCell);

        // script exhaustion ends the run as a transport death
        let result = run(&mut source, &parser, &mut sink, 1).await;
        assert!(result.is_err());

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let rows: Vec<&str> = contents.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "Timestamp,Load Cell 1,Load Cell 2");
        assert!(rows[1].ends_with(",12.34,56.78"));
    }

    #[tokio::test]
    async fn test_transport_failures_terminate_after_the_budget() {
        let path = temp_csv("transport");
        let mut sink = CsvSink::create(&path, SensorFormat::DualLoadCell)
            .await
            .unwrap();
        let mut source = ScriptedSource::new([
            Err(transport_error()),
            Err(transport_error()),
            // a clean empty cycle resets the consecutive count
            Ok(None),
            Err(transport_error()),
            Err(transport_error()),
            Err(transport_error()),
        ]);
        let parser = LineParser::new(SensorFormat::DualLoadCell);

        let result = run(&mut source, &parser, &mut sink, 3).await;
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
        // the first two failures were forgiven; only the final run of three hit the budget
        assert!(source.replies.is_empty());
    }
}
