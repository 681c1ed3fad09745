use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::EstimateError;

/// Prefix of every rendered estimate number.
pub const NUMBER_PREFIX: &str = "EST";

const MIN_SEQUENCE_WIDTH: usize = 3;

/// Per-year estimate number, rendered as `EST-{year}-{sequence}`,
/// e.g. "EST-2025-001", "EST-2025-002", …, "EST-2025-1000".
///
/// Ordering is by year, then sequence, so "EST-2025-1000" sorts after
/// "EST-2025-999" even though the text form would not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentNumber {
    year: i32,
    sequence: u32,
}

impl DocumentNumber {
    /// Create a number. The year must render as four digits and the
    /// sequence starts at 1.
    pub fn new(year: i32, sequence: u32) -> Result<Self, EstimateError> {
        if !(0..=9999).contains(&year) {
            return Err(EstimateError::Validation(format!(
                "number year {year} must be between 0 and 9999"
            )));
        }
        if sequence == 0 {
            return Err(EstimateError::Validation(
                "number sequence must be at least 1".into(),
            ));
        }
        Ok(Self { year, sequence })
    }

    /// The first number of a year.
    pub fn first(year: i32) -> Result<Self, EstimateError> {
        Self::new(year, 1)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The number directly after this one in the same year.
    pub fn successor(&self) -> Result<Self, EstimateError> {
        let sequence = self.sequence.checked_add(1).ok_or_else(|| {
            EstimateError::Validation(format!("sequence space for {} is exhausted", self.year))
        })?;
        Ok(Self {
            year: self.year,
            sequence,
        })
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:04}-{:0>width$}",
            NUMBER_PREFIX,
            self.year,
            self.sequence,
            width = MIN_SEQUENCE_WIDTH
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EstimateError::Validation(format!("'{s}' is not an estimate number"));

        let mut parts = s.splitn(3, '-');
        let (Some(prefix), Some(year), Some(sequence)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if prefix != NUMBER_PREFIX
            || year.len() != 4
            || sequence.len() < MIN_SEQUENCE_WIDTH
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        // Wider sequences must not carry extra leading zeros ("EST-2025-0001").
        if sequence.len() > MIN_SEQUENCE_WIDTH && sequence.starts_with('0') {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let sequence: u32 = sequence.parse().map_err(|_| invalid())?;
        Self::new(year, sequence)
    }
}

impl TryFrom<String> for DocumentNumber {
    type Error = EstimateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocumentNumber> for String {
    fn from(number: DocumentNumber) -> Self {
        number.to_string()
    }
}
