
/***
 * ReadingHistory
 *
 *  An append-only, insertion-ordered record of the readings of one sensor.
 *  The element type is fixed per sensor kind (f32 for temperature, i32 for
 *  pressure) and must implement `Sample`, which supplies the kind's text
 *  parse and its mean arithmetic.
 *
 *  Besides appending, the only mutation is `remove_smallest`, which drops
 *  the first occurrence of the minimum value.
 */
use std::fmt;

use itertools::Itertools;
use thiserror::Error;

/// Raised when reading text is not a complete, finite number of the
/// sample type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed value text {text:?}")]
pub struct MalformedValue {
    pub text: String,
}

impl MalformedValue {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
        }
    }
}

/// A numeric type a `ReadingHistory` can hold.
pub trait Sample: Copy + PartialOrd + Default + fmt::Display + fmt::Debug {
    /// Parses the whole of `text` (surrounding whitespace ignored).
    fn parse_strict(text: &str) -> Result<Self, MalformedValue>;

    /// Arithmetic mean in the type's own division semantics; zero when
    /// `values` is empty.
    fn mean_of(values: &[Self]) -> Self;
}

impl Sample for f32 {
    fn parse_strict(text: &str) -> Result<Self, MalformedValue> {
        match text.trim().parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(MalformedValue::new(text)),
        }
    }

    fn mean_of(values: &[Self]) -> Self {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f32>() / values.len() as f32
    }
}

impl Sample for i32 {
    fn parse_strict(text: &str) -> Result<Self, MalformedValue> {
        text.trim()
            .parse::<i32>()
            .map_err(|_| MalformedValue::new(text))
    }

    // the sum is widened so long histories can't overflow; the quotient
    // always fits back into i32 and truncates toward zero
    fn mean_of(values: &[Self]) -> Self {
        if values.is_empty() {
            return 0;
        }
        let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
        (sum / values.len() as i64) as i32
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingHistory<T> {
    values: Vec<T>,
}

impl<T: Sample> ReadingHistory<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn append(&mut self, value: T) {
        self.values.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    pub fn mean(&self) -> T {
        T::mean_of(&self.values)
    }

    /// Removes the earliest minimum-valued reading. No-op on fewer than two
    /// readings. Returns the removed value.
    pub fn remove_smallest(&mut self) -> Option<T> {
        if self.values.len() < 2 {
            return None;
        }
        let idx = self
            .values
            .iter()
            .position_min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;

        Some(self.values.remove(idx))
    }
}

impl<T: Sample> FromIterator<T> for ReadingHistory<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
