use nalgebra::{Matrix3, Vector3};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoscarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PoscarParseErrorKind,
    },
    #[error("Truncated structure file: missing {0}")]
    Truncated(&'static str),
}

#[derive(Debug, Error)]
pub enum PoscarParseErrorKind {
    #[error("Invalid float (value: '{value}')")]
    InvalidFloat { value: String },
    #[error("Invalid atom count (value: '{value}')")]
    InvalidInt { value: String },
    #[error("Universal scaling factor must be nonzero")]
    ZeroScale,
    #[error("Species and count columns differ in length ({symbols} vs {counts})")]
    SpeciesCountMismatch { symbols: usize, counts: usize },
}

/// A parsed structure description file (POSCAR format).
///
/// The header (comment, universal scaling factor, lattice, species, counts) is
/// parsed structurally; the coordinate block and anything after it are kept as
/// verbatim lines so a rewrite never perturbs atomic positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Poscar {
    pub comment: String,
    pub scale: f64,
    pub lattice: Matrix3<f64>,
    pub symbols: Vec<String>,
    pub counts: Vec<usize>,
    body: Vec<String>,
}

impl Poscar {
    pub fn read_from(reader: &mut impl BufRead) -> Result<Self, PoscarError> {
        let mut lines = reader.lines().enumerate();

        let mut next_line = |what: &'static str| -> Result<(usize, String), PoscarError> {
            match lines.next() {
                Some((idx, res)) => Ok((idx + 1, res?)),
                None => Err(PoscarError::Truncated(what)),
            }
        };

        let (_, comment) = next_line("comment line")?;

        let (scale_line, scale_str) = next_line("scaling factor")?;
        let scale: f64 = scale_str
            .trim()
            .parse()
            .map_err(|_| PoscarError::Parse {
                line: scale_line,
                kind: PoscarParseErrorKind::InvalidFloat {
                    value: scale_str.trim().to_string(),
                },
            })?;
        if scale == 0.0 {
            return Err(PoscarError::Parse {
                line: scale_line,
                kind: PoscarParseErrorKind::ZeroScale,
            });
        }

        let mut lattice = Matrix3::zeros();
        for row in 0..3 {
            let (line_num, line) = next_line("lattice vector")?;
            let vector = parse_vector(&line, line_num)?;
            lattice.set_row(row, &vector.transpose());
        }

        // VASP 5 carries an element-symbol line; VASP 4 goes straight to counts.
        let (first_line, first) = next_line("species counts")?;
        let (symbols, counts_line_num, counts_str) = if !first.trim().is_empty()
            && first.split_whitespace().all(|t| t.parse::<usize>().is_ok())
        {
            (Vec::new(), first_line, first)
        } else {
            let symbols: Vec<String> = first.split_whitespace().map(str::to_string).collect();
            let (line_num, line) = next_line("species counts")?;
            (symbols, line_num, line)
        };
        let counts = parse_counts(&counts_str, counts_line_num)?;

        if !symbols.is_empty() && symbols.len() != counts.len() {
            return Err(PoscarError::Parse {
                line: counts_line_num,
                kind: PoscarParseErrorKind::SpeciesCountMismatch {
                    symbols: symbols.len(),
                    counts: counts.len(),
                },
            });
        }

        let body = lines
            .map(|(_, res)| res.map_err(PoscarError::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            comment,
            scale,
            lattice,
            symbols,
            counts,
            body,
        })
    }

    pub fn read_from_path(path: &Path) -> Result<Self, PoscarError> {
        let mut reader = BufReader::new(File::open(path)?);
        Self::read_from(&mut reader)
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "{}", self.comment)?;
        writeln!(writer, "{:>19.14}", self.scale)?;
        for row in 0..3 {
            let r = self.lattice.row(row);
            writeln!(writer, " {:>21.16} {:>21.16} {:>21.16}", r[0], r[1], r[2])?;
        }
        if !self.symbols.is_empty() {
            writeln!(writer, "  {}", self.symbols.join("  "))?;
        }
        let counts: Vec<String> = self.counts.iter().map(|c| c.to_string()).collect();
        writeln!(writer, "  {}", counts.join("  "))?;
        for line in &self.body {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> io::Result<()> {
        let mut file = File::create(path)?;
        self.write_to(&mut file)
    }

    /// Cell volume in cubic length units.
    ///
    /// A negative universal scaling factor already denotes the target cell
    /// volume (the simulator rescales the lattice to reach it), so it is
    /// returned directly.
    pub fn cell_volume(&self) -> f64 {
        if self.scale < 0.0 {
            -self.scale
        } else {
            self.lattice.determinant().abs() * self.scale.powi(3)
        }
    }

    /// Returns a copy of this structure whose scaling factor requests the
    /// given cell volume, leaving lattice shape and coordinates untouched.
    pub fn restaged_at_volume(&self, volume: f64) -> Self {
        let mut staged = self.clone();
        staged.scale = -volume;
        staged
    }

    pub fn total_atoms(&self) -> usize {
        self.counts.iter().sum()
    }
}

fn parse_vector(line: &str, line_num: usize) -> Result<Vector3<f64>, PoscarError> {
    let mut components = [0.0f64; 3];
    let mut tokens = line.split_whitespace();
    for slot in &mut components {
        let token = tokens.next().unwrap_or("");
        *slot = token.parse().map_err(|_| PoscarError::Parse {
            line: line_num,
            kind: PoscarParseErrorKind::InvalidFloat {
                value: token.to_string(),
            },
        })?;
    }
    Ok(Vector3::from(components))
}

fn parse_counts(line: &str, line_num: usize) -> Result<Vec<usize>, PoscarError> {
    line.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| PoscarError::Parse {
                line: line_num,
                kind: PoscarParseErrorKind::InvalidInt {
                    value: token.to_string(),
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const CUBIC_MGO: &str = "\
MgO bulk
   1.00000000000000
    10.0    0.0    0.0
     0.0   10.0    0.0
     0.0    0.0   10.0
  Mg  O
  4  4
Direct
  0.0  0.0  0.0
  0.5  0.5  0.0
  0.5  0.0  0.5
  0.0  0.5  0.5
  0.5  0.0  0.0
  0.0  0.5  0.0
  0.0  0.0  0.5
  0.5  0.5  0.5
";

    fn parse(content: &str) -> Result<Poscar, PoscarError> {
        Poscar::read_from(&mut Cursor::new(content))
    }

    #[test]
    fn parses_header_and_counts() {
        let poscar = parse(CUBIC_MGO).unwrap();
        assert_eq!(poscar.comment, "MgO bulk");
        assert_relative_eq!(poscar.scale, 1.0);
        assert_eq!(poscar.symbols, vec!["Mg", "O"]);
        assert_eq!(poscar.counts, vec![4, 4]);
        assert_eq!(poscar.total_atoms(), 8);
    }

    #[test]
    fn volume_is_scaled_lattice_determinant() {
        let poscar = parse(CUBIC_MGO).unwrap();
        assert_relative_eq!(poscar.cell_volume(), 1000.0);

        let mut doubled = poscar.clone();
        doubled.scale = 2.0;
        assert_relative_eq!(doubled.cell_volume(), 8000.0);
    }

    #[test]
    fn negative_scale_is_the_volume_itself() {
        let staged = parse(CUBIC_MGO).unwrap().restaged_at_volume(3500.0);
        assert_relative_eq!(staged.scale, -3500.0);
        assert_relative_eq!(staged.cell_volume(), 3500.0);
    }

    #[test]
    fn restaging_preserves_coordinates_verbatim() {
        let original = parse(CUBIC_MGO).unwrap();
        let staged = original.restaged_at_volume(1234.0);
        assert_eq!(original.body, staged.body);
        assert_eq!(original.lattice, staged.lattice);
    }

    #[test]
    fn rewrite_is_deterministic() {
        let poscar = parse(CUBIC_MGO).unwrap();
        let mut first = Vec::new();
        let mut second = Vec::new();
        poscar.write_to(&mut first).unwrap();
        poscar.write_to(&mut second).unwrap();
        assert_eq!(first, second);

        let reparsed = parse(std::str::from_utf8(&first).unwrap()).unwrap();
        assert_eq!(reparsed, poscar);
    }

    #[test]
    fn vasp4_counts_without_symbols() {
        let content = "\
comment
  1.0
  5.0 0.0 0.0
  0.0 5.0 0.0
  0.0 0.0 5.0
  2
Direct
  0.0 0.0 0.0
  0.5 0.5 0.5
";
        let poscar = parse(content).unwrap();
        assert!(poscar.symbols.is_empty());
        assert_eq!(poscar.counts, vec![2]);
    }

    #[test]
    fn zero_scale_is_rejected() {
        let content = "comment\n0.0\n1 0 0\n0 1 0\n0 0 1\n1\nDirect\n0 0 0\n";
        let err = parse(content).unwrap_err();
        assert!(matches!(
            err,
            PoscarError::Parse {
                line: 2,
                kind: PoscarParseErrorKind::ZeroScale
            }
        ));
    }

    #[test]
    fn truncated_file_names_the_missing_section() {
        let err = parse("comment\n1.0\n1 0 0\n").unwrap_err();
        assert!(matches!(err, PoscarError::Truncated("lattice vector")));
    }

    #[test]
    fn bad_lattice_component_reports_line() {
        let content = "comment\n1.0\n1 0 0\n0 x 0\n0 0 1\n1\nDirect\n";
        let err = parse(content).unwrap_err();
        assert!(matches!(
            err,
            PoscarError::Parse {
                line: 4,
                kind: PoscarParseErrorKind::InvalidFloat { .. }
            }
        ));
    }
}
