//! Telemetry output for the experiment: CSV writer for per-evaluation loss.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One row in the telemetry CSV: a single objective evaluation.
#[derive(Debug, Clone)]
pub struct EvalRecord {
    pub mode: String,
    pub evaluation: u64,
    pub loss: f64,
}

impl EvalRecord {
    pub fn new(mode: &str, evaluation: u64, loss: f64) -> Self {
        Self { mode: mode.to_string(), evaluation, loss }
    }
}

/// Write a full optimization run to CSV.
pub fn write_csv(path: &Path, records: &[EvalRecord]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "mode,evaluation,loss")?;
    for r in records {
        writeln!(w, "{},{},{:.6}", r.mode, r.evaluation, r.loss)?;
    }

    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("lobachevsky_telemetry_{}.csv", std::process::id()));
        let records = vec![
            EvalRecord::new("mmc", 0, 1.25),
            EvalRecord::new("mmc", 1, 0.75),
        ];
        write_csv(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "mode,evaluation,loss");
        assert_eq!(lines[1], "mmc,0,1.250000");
        assert_eq!(lines.len(), 3);
    }
}
