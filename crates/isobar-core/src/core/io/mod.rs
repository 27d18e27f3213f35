pub mod oszicar;
pub mod outcar;
pub mod poscar;
pub mod wait;

use serde::{Serialize, Serializer};

/// An averaged scalar extracted from a simulator output stream.
///
/// `Unavailable` means the artifact was readable but contained no matching
/// records. It is a valid parse outcome, distinct from any I/O or format error,
/// and must never be conflated with a value of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(f64),
    Unavailable,
}

impl Sample {
    pub fn from_accumulated(sum: f64, count: usize) -> Self {
        if count == 0 {
            Sample::Unavailable
        } else {
            Sample::Value(sum / count as f64)
        }
    }

    pub fn as_value(&self) -> Option<f64> {
        match self {
            Sample::Value(v) => Some(*v),
            Sample::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Sample::Unavailable)
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sample::Value(v) => write!(f, "{:.4}", v),
            Sample::Unavailable => write!(f, "n/a"),
        }
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sample::Value(v) => serializer.serialize_f64(*v),
            Sample::Unavailable => serializer.serialize_str("n/a"),
        }
    }
}
