use super::Sample;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Marker preceding the instantaneous temperature in the step log, e.g.
/// `     1 T=  3500. E= -0.13778505E+04 F= -0.13789115E+04 ...`.
const TEMPERATURE_MARKER: &str = "T=";

#[derive(Debug, Error)]
pub enum OszicarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed temperature record on line {line} (value: '{value}')")]
    MalformedRecord { line: usize, value: String },
}

/// Averages every temperature sample found in the step log stream.
///
/// The first numeric token after the marker is taken; trailing-dot forms like
/// `3500.` are accepted. Zero matching lines yield [`Sample::Unavailable`].
pub fn average_temperature(reader: &mut impl BufRead) -> Result<Sample, OszicarError> {
    let mut sum = 0.0;
    let mut count = 0usize;

    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let Some(pos) = line.find(TEMPERATURE_MARKER) else {
            continue;
        };

        let field = line[pos + TEMPERATURE_MARKER.len()..]
            .split_whitespace()
            .next()
            .unwrap_or("");
        let value: f64 = field.parse().map_err(|_| OszicarError::MalformedRecord {
            line: line_num + 1,
            value: field.to_string(),
        })?;

        sum += value;
        count += 1;
    }

    Ok(Sample::from_accumulated(sum, count))
}

pub fn average_temperature_from_path(path: &Path) -> Result<Sample, OszicarError> {
    let mut reader = BufReader::new(File::open(path)?);
    average_temperature(&mut reader)
}
