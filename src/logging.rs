//! Line-oriented run log.
//!
//! One line per evaluation: timestamp, running counters, the configuration as
//! `name=value` pairs, and the cost or an `invalid` marker. The format is for
//! humans and ad-hoc grep, not a compatibility surface.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::SecondsFormat;

use crate::data::HistoryEntry;

pub(crate) struct RunLog {
    writer: BufWriter<File>,
}

impl RunLog {
    /// Create (or truncate) the log file, creating parent directories.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    /// Append one evaluation and flush, so the log survives a crashing cost
    /// function.
    pub fn record(&mut self, entry: &HistoryEntry) -> io::Result<()> {
        write!(
            self.writer,
            "{} evaluations={} valid={} {}",
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            entry.evaluations,
            entry.valid_evaluations,
            entry.configuration,
        )?;
        match entry.cost {
            Some(cost) => writeln!(self.writer, " cost={cost}")?,
            None => writeln!(self.writer, " invalid")?,
        }
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Configuration, Proposal};
    use crate::value::Value;
    use chrono::Utc;
    use std::time::Duration;

    fn entry(cost: Option<f64>) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            elapsed: Duration::from_millis(12),
            evaluations: 2,
            valid_evaluations: 1,
            configuration: Configuration::from_entries(vec![
                ("tile".into(), Value::Int(4)),
                ("mode".into(), Value::from("fast")),
            ]),
            cost,
            proposal: Proposal::Index(0),
        }
    }

    #[test]
    fn test_log_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("runs/tune.log");
        let mut log = RunLog::create(&path).expect("create");
        log.record(&entry(Some(3.5))).expect("record");
        log.record(&entry(None)).expect("record");
        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("tile=4 mode=fast cost=3.5"));
        assert!(lines[0].contains("evaluations=2"));
        assert!(lines[1].ends_with("invalid"));
    }
}
