use log::{error, warn};
use num_complex::Complex64;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Findings – accumulated errors and warnings of one validation pass
// ---------------------------------------------------------------------------

/// Messages gathered while validating. Checks only ever append, so one bad
/// parameter never hides problems with another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn merge(&mut self, other: Findings) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Log everything and turn the findings into the validation outcome:
    /// the warnings when there are no errors, otherwise a [`ValidationError`].
    pub fn into_result(self) -> Result<Vec<String>, ValidationError> {
        for w in &self.warnings {
            warn!("{w}");
        }
        if self.errors.is_empty() {
            return Ok(self.warnings);
        }
        for e in &self.errors {
            error!("{e}");
        }
        Err(ValidationError {
            errors: self.errors,
            warnings: self.warnings,
        })
    }
}

// ---------------------------------------------------------------------------
// Array element behaviour needed by the standard array checks
// ---------------------------------------------------------------------------

pub trait ArrayValue: Copy + std::fmt::Debug {
    fn is_finite_value(&self) -> bool;
    /// Sign test using numpy's ordering: complex values compare by real part,
    /// then imaginary part.
    fn is_negative(&self) -> bool;
    fn has_imaginary(&self) -> bool;
}

impl ArrayValue for f64 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }

    fn is_negative(&self) -> bool {
        *self < 0.0
    }

    fn has_imaginary(&self) -> bool {
        false
    }
}

impl ArrayValue for Complex64 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }

    fn is_negative(&self) -> bool {
        self.re < 0.0 || (self.re == 0.0 && self.im < 0.0)
    }

    fn has_imaginary(&self) -> bool {
        self.im != 0.0
    }
}

/// Which optional checks [`val_array_tests`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayChecks {
    pub error_negative: bool,
    pub warn_complex: bool,
}

impl Default for ArrayChecks {
    fn default() -> Self {
        ArrayChecks {
            error_negative: true,
            warn_complex: true,
        }
    }
}

/// Standard checks for a one-dimensional input array.
///
/// A valid array is non-empty, finite, real and has no values below zero;
/// `checks` relaxes the last two.
///
/// ```
/// use ccqo::validate::{val_array_tests, ArrayChecks};
///
/// let found = val_array_tests(&[1.0, -2.0, 3.0], "pump velocities", ArrayChecks::default());
/// assert_eq!(found.errors.len(), 1);
///
/// let relaxed = ArrayChecks { error_negative: false, ..ArrayChecks::default() };
/// assert!(val_array_tests(&[1.0, -2.0], "spectrum variable", relaxed).is_clean());
/// ```
pub fn val_array_tests<T: ArrayValue>(values: &[T], name: &str, checks: ArrayChecks) -> Findings {
    let mut found = Findings::new();

    if values.is_empty() {
        found.error(format!(
            "Received {name} with no values\nExpected {name} with at least one value"
        ));
        return found;
    }

    let non_finite = indices_where(values, |v| !v.is_finite_value());
    if !non_finite.is_empty() {
        found.error(format!(
            "Received {name} non-finite values at indices {non_finite:?}\nExpected {name} values finite"
        ));
    }

    if checks.warn_complex && values.iter().any(ArrayValue::has_imaginary) {
        found.warn(format!(
            "Received {name} in: complex\nExpected {name} in: real"
        ));
    }

    if checks.error_negative {
        let negative = indices_where(values, ArrayValue::is_negative);
        if !negative.is_empty() {
            found.error(format!(
                "Received {name} values < 0 at indices {negative:?}\nExpected {name} values >= 0"
            ));
        }
    }

    found
}

/// Indices of the entries matching `pred`.
pub fn indices_where<T>(values: &[T], pred: impl Fn(&T) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| pred(v))
        .map(|(i, _)| i)
        .collect()
}
