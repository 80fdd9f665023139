use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use num_complex::Complex64;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::data::loader::parse_cell;
use crate::error::{InputError, VerifyError};
use crate::models::Quantities;

/// Closeness criterion, `|computed - expected| <= atol + rtol * |expected|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl Tolerance {
    pub fn is_close(&self, computed: Complex64, expected: Complex64) -> bool {
        (computed - expected).norm() <= self.atol + self.rtol * expected.norm()
    }
}

// ---------------------------------------------------------------------------
// ReferenceData – expected outputs keyed by quantity name
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    columns: BTreeMap<String, Vec<Complex64>>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, quantity: impl Into<String>, values: Vec<Complex64>) {
        self.columns.insert(quantity.into(), values);
    }

    pub fn get(&self, quantity: &str) -> Option<&[Complex64]> {
        self.columns.get(quantity).map(Vec::as_slice)
    }

    pub fn quantities(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    /// Load reference data. Dispatch by extension.
    ///
    /// * `.csv`  – header row of quantity names, one value per cell; a
    ///   column may stop early (blank cells at its end are ignored)
    /// * `.json` – `{ "quantity": [values...], ... }` where a value is a
    ///   number, a complex literal string or an `[re, im]` pair; a bare
    ///   number or string stands for a one-value quantity
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Self::load_csv(path),
            "json" => Self::load_json(path),
            other => Err(InputError::UnsupportedExtension(other.to_string()).into()),
        }
    }

    fn load_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("opening reference data {}", path.display()))?;
        let headers: Vec<String> = reader
            .headers()
            .context("reading reference headers")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut cells: Vec<Vec<Option<Complex64>>> = vec![Vec::new(); headers.len()];
        let mut invalid = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("reference row {}", row_no + 2))?;
            for (k, column) in cells.iter_mut().enumerate() {
                let raw = record.get(k).unwrap_or("");
                let value = parse_cell(raw);
                if value.is_none() && !raw.is_empty() {
                    invalid.push(format!("row {}, {}", row_no + 2, headers[k]));
                }
                column.push(value);
            }
        }
        if !invalid.is_empty() {
            return Err(InputError::InvalidEntries {
                path: path.to_path_buf(),
                entries: invalid,
            }
            .into());
        }

        let mut reference = ReferenceData::new();
        for (name, column) in headers.into_iter().zip(cells) {
            let filled = column.iter().rposition(Option::is_some).map_or(0, |p| p + 1);
            let values: Option<Vec<Complex64>> = column[..filled].iter().copied().collect();
            match values {
                Some(values) => reference.insert(name, values),
                None => bail!("Reference column '{name}' has a gap before its last value"),
            }
        }
        Ok(reference)
    }

    fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading reference JSON")?;
        let root: JsonValue = serde_json::from_str(&text).context("parsing reference JSON")?;
        let obj = root
            .as_object()
            .context("Expected top-level JSON object of quantity arrays")?;

        let mut reference = ReferenceData::new();
        for (name, val) in obj {
            let items: Vec<&JsonValue> = match val {
                JsonValue::Array(items) => items.iter().collect(),
                single => vec![single],
            };
            let values = items
                .into_iter()
                .enumerate()
                .map(|(j, v)| {
                    json_value(v).with_context(|| format!("{name}[{j}]: not a finite number"))
                })
                .collect::<Result<Vec<_>>>()?;
            reference.insert(name.clone(), values);
        }
        Ok(reference)
    }
}

fn json_value(val: &JsonValue) -> Option<Complex64> {
    let value = match val {
        JsonValue::Number(n) => Complex64::from(n.as_f64()?),
        JsonValue::String(s) => return parse_cell(s),
        JsonValue::Array(pair) if pair.len() == 2 => {
            Complex64::new(pair[0].as_f64()?, pair[1].as_f64()?)
        }
        _ => return None,
    };
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub index: usize,
    pub computed: Complex64,
    pub expected: Complex64,
}

/// Result of comparing one output quantity with its reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub quantity: String,
    pub compared: usize,
    pub max_abs_deviation: f64,
    pub mismatches: Vec<Mismatch>,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compare one computed array with expected values. A single expected value
/// is compared against every computed entry.
pub fn verify_array(
    quantity: &str,
    computed: &[Complex64],
    expected: &[Complex64],
    tol: Tolerance,
) -> Result<Verification, VerifyError> {
    if expected.len() != computed.len() && expected.len() != 1 {
        return Err(VerifyError::LengthMismatch {
            quantity: quantity.to_string(),
            computed: computed.len(),
            expected: expected.len(),
        });
    }

    let mut max_abs_deviation: f64 = 0.0;
    let mut mismatches = Vec::new();
    for (index, &got) in computed.iter().enumerate() {
        let want = crate::models::broadcast::at(expected, index);
        max_abs_deviation = max_abs_deviation.max((got - want).norm());
        if !tol.is_close(got, want) {
            mismatches.push(Mismatch {
                index,
                computed: got,
                expected: want,
            });
        }
    }

    Ok(Verification {
        quantity: quantity.to_string(),
        compared: computed.len(),
        max_abs_deviation,
        mismatches,
    })
}

/// Compare every output quantity that the reference data knows about.
pub fn verify_against(
    output: &impl Quantities,
    reference: &ReferenceData,
    tol: Tolerance,
) -> Result<Vec<Verification>, VerifyError> {
    let quantities = output.quantities();
    let known: Vec<&str> = quantities.iter().map(|(name, _)| *name).collect();

    for name in reference.columns.keys() {
        if !known.contains(&name.as_str()) {
            warn!("Reference quantity '{name}' is not an output; ignored");
        }
    }

    let mut results = Vec::new();
    for (name, computed) in &quantities {
        if let Some(expected) = reference.get(name) {
            let v = verify_array(name, computed, expected, tol)?;
            info!(
                "Verified {name}: {} values, max |deviation| = {:e}, {} mismatches",
                v.compared,
                v.max_abs_deviation,
                v.mismatches.len()
            );
            results.push(v);
        }
    }

    if results.is_empty() {
        return Err(VerifyError::NoOverlap {
            reference: reference.quantities(),
            outputs: known.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::tempdir;

    use super::*;
    use crate::models::ring_damping::calc_ring_damping;

    fn reals(xs: &[f64]) -> Vec<Complex64> {
        xs.iter().copied().map(Complex64::from).collect()
    }

    #[test]
    fn tolerance_follows_allclose() {
        let tol = Tolerance::default();
        assert!(tol.is_close(Complex64::from(1.0 + 5e-6), Complex64::from(1.0)));
        assert!(!tol.is_close(Complex64::from(1.0 + 5e-5), Complex64::from(1.0)));
        assert!(tol.is_close(Complex64::from(5e-9), Complex64::from(0.0)));
    }

    #[test]
    fn verify_array_reports_mismatches() {
        let v = verify_array(
            "path_losses",
            &reals(&[24.0, 50.0]),
            &reals(&[24.0, 49.0]),
            Tolerance::default(),
        )
        .unwrap();
        assert!(!v.passed());
        assert_eq!(v.compared, 2);
        assert_eq!(v.max_abs_deviation, 1.0);
        assert_eq!(v.mismatches.len(), 1);
        assert_eq!(v.mismatches[0].index, 1);
    }

    #[test]
    fn verify_array_checks_lengths() {
        let err = verify_array(
            "path_losses",
            &reals(&[1.0, 2.0, 3.0]),
            &reals(&[1.0, 2.0]),
            Tolerance::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VerifyError::LengthMismatch { computed: 3, expected: 2, .. }));
    }

    #[test]
    fn verify_against_uses_shared_quantities() {
        let out = calc_ring_damping(&[12.0, 20.0], &[3.0, 4.0]).unwrap();
        let mut reference = ReferenceData::new();
        reference.insert("damping", reals(&[74.0]));
        reference.insert("unrelated", reals(&[1.0]));

        let results = verify_against(&out, &reference, Tolerance::default()).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].quantity, "damping");
        assert!(results[0].passed());
    }

    #[test]
    fn verify_against_needs_an_overlap() {
        let out = calc_ring_damping(&[12.0], &[3.0]).unwrap();
        let mut reference = ReferenceData::new();
        reference.insert("pump_ring", reals(&[1.0]));
        assert!(matches!(
            verify_against(&out, &reference, Tolerance::default()),
            Err(VerifyError::NoOverlap { .. })
        ));
    }

    #[test]
    fn csv_reference_allows_short_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reference.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "damping,path_losses").unwrap();
        writeln!(file, "74,24").unwrap();
        writeln!(file, ",50").unwrap();
        drop(file);

        let reference = ReferenceData::load(&path).unwrap();
        assert_eq!(reference.get("damping").unwrap(), reals(&[74.0]).as_slice());
        assert_eq!(reference.get("path_losses").unwrap(), reals(&[24.0, 50.0]).as_slice());
    }

    #[test]
    fn json_reference_accepts_scalars_and_complex() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reference.json");
        std::fs::write(
            &path,
            r#"{"damping": 74, "pump_ring": ["1.2-1.6i", [1.4088, -0.2642]]}"#,
        )
        .unwrap();

        let reference = ReferenceData::load(&path).unwrap();
        assert_eq!(reference.get("damping").unwrap(), reals(&[74.0]).as_slice());
        assert_eq!(
            reference.get("pump_ring").unwrap(),
            [Complex64::new(1.2, -1.6), Complex64::new(1.4088, -0.2642)].as_slice()
        );
    }
}
