use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::{MIN_DIGITS, PREFIX};
use crate::error::CatalogError;

/// Catalog identity of one concept calculation, e.g. `CCqo103_spectral_pump`.
///
/// Ordering and equality cover both parts, but the catalog only ever keys on
/// [`CatalogId::number`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CatalogId {
    number: u32,
    concept: String,
}

impl CatalogId {
    pub fn new(number: u32, concept: &str) -> Result<Self, CatalogError> {
        check_concept(concept)?;
        Ok(CatalogId {
            number,
            concept: concept.to_string(),
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn concept(&self) -> &str {
        &self.concept
    }

    /// The module name as written in the catalog.
    pub fn module_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{PREFIX}{:0width$}_{}",
            self.number,
            self.concept,
            width = MIN_DIGITS
        )
    }
}

impl FromStr for CatalogId {
    type Err = CatalogError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let rest = name
            .strip_prefix(PREFIX)
            .ok_or_else(|| CatalogError::MissingPrefix {
                name: name.to_string(),
            })?;

        let n_digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (digits, tail) = rest.split_at(n_digits);
        if n_digits < MIN_DIGITS {
            return Err(CatalogError::TooFewDigits {
                name: name.to_string(),
                found: n_digits,
            });
        }
        if n_digits > MIN_DIGITS && digits.starts_with('0') {
            return Err(CatalogError::LeadingZero {
                name: name.to_string(),
            });
        }
        let number: u32 = digits.parse().map_err(|_| CatalogError::NumberOverflow {
            name: name.to_string(),
        })?;

        let concept = tail
            .strip_prefix('_')
            .ok_or_else(|| CatalogError::MissingSeparator {
                name: name.to_string(),
            })?;

        CatalogId::new(number, concept)
    }
}

impl Serialize for CatalogId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn check_concept(concept: &str) -> Result<(), CatalogError> {
    let starts_ok = concept
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    let body_ok = concept
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if starts_ok && body_ok {
        Ok(())
    } else {
        Err(CatalogError::InvalidConcept {
            concept: concept.to_string(),
        })
    }
}
