use super::Sample;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Marker identifying a pressure record in the thermodynamic output.
///
/// VASP prints one such line per ionic step, e.g.
/// `  external pressure =      -5.84 kB  Pullay stress =        0.00 kB`.
const PRESSURE_MARKER: &str = "external pressure";

#[derive(Debug, Error)]
pub enum OutcarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed pressure record on line {line} (value: '{value}')")]
    MalformedRecord { line: usize, value: String },
}

/// Averages every pressure sample found in the thermodynamic output stream.
///
/// Returns [`Sample::Unavailable`] when no record matches, which callers must
/// treat as a legitimate outcome rather than an error.
pub fn average_pressure(reader: &mut impl BufRead) -> Result<Sample, OutcarError> {
    let mut sum = 0.0;
    let mut count = 0usize;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        if !line.contains(PRESSURE_MARKER) {
            continue;
        }

        let field = line
            .split_once('=')
            .map(|(_, rest)| rest)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or("");
        let value: f64 = field.parse().map_err(|_| OutcarError::MalformedRecord {
            line: line_num + 1,
            value: field.to_string(),
        })?;

        sum += value;
        count += 1;
    }

    Ok(Sample::from_accumulated(sum, count))
}

pub fn average_pressure_from_path(path: &Path) -> Result<Sample, OutcarError> {
    let mut reader = BufReader::new(File::open(path)?);
    average_pressure(&mut reader)
}
