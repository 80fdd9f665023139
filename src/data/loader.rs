use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use log::debug;
use num_complex::Complex64;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{SpectralColumn, SpectralInputs};
use crate::error::InputError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Layout of delimited text inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOptions {
    /// Field separator.
    pub delimiter: u8,
    /// Rows before the data. With one or more, the first holds the column
    /// names and the rest (units, comments) are skipped. With zero, columns
    /// are positional in canonical order.
    pub num_header_rows: usize,
}

impl Default for InputOptions {
    fn default() -> Self {
        InputOptions {
            delimiter: b',',
            num_header_rows: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load spectral inputs from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` / `.dat` – delimited text, laid out per `options`
/// * `.json`    – `[{ "wavevec": 1.0, "couplings": "2+0.1i", ... }, ...]`
/// * `.parquet` – one numeric (or complex-string) column per heading
///
/// Every entry must be present, parseable and finite. Failures that concern
/// the table itself carry an [`InputError`].
pub fn get_inputs(path: &Path, options: &InputOptions) -> Result<SpectralInputs> {
    debug!(
        "Inputs to get_inputs: path = {}, delimiter = {:?}, num_header_rows = {}",
        path.display(),
        options.delimiter as char,
        options.num_header_rows
    );

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let inputs = match ext.as_str() {
        "csv" | "txt" | "dat" => load_delimited(path, options),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(InputError::UnsupportedExtension(other.to_string()).into()),
    }?;

    debug!("Loaded {} spectral samples from {}", inputs.len(), path.display());
    Ok(inputs)
}

/// Parse one table cell: a real number or a complex literal such as `1+2i`
/// (`j` is accepted for the imaginary unit). Non-finite values are rejected.
pub(crate) fn parse_cell(s: &str) -> Option<Complex64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = match s.parse::<f64>() {
        Ok(re) => Complex64::from(re),
        Err(_) => s.replace('j', "i").parse::<Complex64>().ok()?,
    };
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Row collection shared by all formats
// ---------------------------------------------------------------------------

/// Gathers complete rows and remembers every missing or invalid cell, so a
/// bad file is reported in one go.
#[derive(Default)]
struct RowCollector {
    inputs: SpectralInputs,
    invalid: Vec<String>,
}

impl RowCollector {
    /// `cells` in [`SpectralColumn::ALL`] order.
    fn push(&mut self, label: &str, cells: [Option<Complex64>; 5]) {
        let mut values = [Complex64::default(); 5];
        let mut complete = true;
        for (k, cell) in cells.into_iter().enumerate() {
            match cell {
                Some(v) => values[k] = v,
                None => {
                    complete = false;
                    self.invalid
                        .push(format!("{label}, {}", SpectralColumn::ALL[k]));
                }
            }
        }
        if complete {
            self.inputs.push_row(values);
        }
    }

    fn finish(self, path: &Path) -> Result<SpectralInputs, InputError> {
        if !self.invalid.is_empty() {
            return Err(InputError::InvalidEntries {
                path: path.to_path_buf(),
                entries: self.invalid,
            });
        }
        if self.inputs.is_empty() {
            return Err(InputError::NoData(path.to_path_buf()));
        }
        Ok(self.inputs)
    }
}

/// Map received headings onto the canonical columns. The headings must be
/// exactly the canonical names, in any order, each once.
fn column_order(received: &[String]) -> Result<Vec<SpectralColumn>, InputError> {
    let mismatch = || InputError::HeadingMismatch {
        received: received.to_vec(),
        expected: SpectralColumn::headings(),
    };

    let order: Vec<SpectralColumn> = received
        .iter()
        .map(|h| SpectralColumn::from_heading(h.trim()))
        .collect::<Option<_>>()
        .ok_or_else(mismatch)?;

    let distinct: BTreeSet<SpectralColumn> = order.iter().copied().collect();
    if order.len() != SpectralColumn::ALL.len() || distinct.len() != order.len() {
        return Err(mismatch());
    }
    Ok(order)
}

/// Position of each canonical column within `order`.
fn positions(order: &[SpectralColumn]) -> [usize; 5] {
    let mut idx = [0usize; 5];
    for (pos, col) in order.iter().enumerate() {
        idx[*col as usize] = pos;
    }
    idx
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Layout:
/// ```text
/// wavevec,couplings,velocities,damping,pump_input   <- names (any order)
/// rad/s,...                                         <- skipped header rows
/// 1.0,2.0,3.0,4.0,5.0                               <- data
/// ```
fn load_delimited(path: &Path, options: &InputOptions) -> Result<SpectralInputs> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut records = reader.records();

    let order = if options.num_header_rows == 0 {
        SpectralColumn::ALL.to_vec()
    } else {
        let names = match records.next() {
            Some(record) => record.context("reading column names")?,
            None => return Err(InputError::NoData(path.to_path_buf()).into()),
        };
        let received: Vec<String> = names.iter().map(str::to_string).collect();
        column_order(&received)?
    };
    let idx = positions(&order);

    for skipped in 1..options.num_header_rows {
        match records.next() {
            Some(record) => {
                record.with_context(|| format!("reading header row {}", skipped + 1))?;
            }
            None => break,
        }
    }

    let mut rows = RowCollector::default();
    for (offset, result) in records.enumerate() {
        let row = options.num_header_rows + offset + 1;
        let record = result.with_context(|| format!("reading row {row}"))?;
        if record.len() != order.len() {
            return Err(InputError::FieldCount {
                row,
                found: record.len(),
                expected: order.len(),
            }
            .into());
        }
        let cells = idx.map(|pos| record.get(pos).and_then(parse_cell));
        rows.push(&format!("row {row}"), cells);
    }

    Ok(rows.finish(path)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, one object per spectral sample):
///
/// ```json
/// [
///   { "wavevec": 1.0, "couplings": [2.0, 0.1], "velocities": 3.0,
///     "damping": 4.0, "pump_input": "5+0i" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<SpectralInputs> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut rows = RowCollector::default();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Record {i} is not a JSON object"))?;

        if obj.keys().any(|k| SpectralColumn::from_heading(k).is_none()) {
            return Err(InputError::HeadingMismatch {
                received: obj.keys().cloned().collect(),
                expected: SpectralColumn::headings(),
            }
            .into());
        }

        let cells = SpectralColumn::ALL.map(|col| obj.get(col.heading()).and_then(json_to_complex));
        rows.push(&format!("record {i}"), cells);
    }

    Ok(rows.finish(path)?)
}

fn json_to_complex(val: &JsonValue) -> Option<Complex64> {
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
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of spectral inputs.
///
/// Expected schema: exactly the five headings as columns of Float64, Float32,
/// Int64 or Int32 (real values) or Utf8 (complex literals). Nulls count as
/// missing entries.
fn load_parquet(path: &Path) -> Result<SpectralInputs> {
    let file = File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = RowCollector::default();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let received: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
        let idx = positions(&column_order(&received)?);

        for row in 0..batch.num_rows() {
            let cells = idx.map(|pos| extract_value(batch.column(pos), row));
            rows.push(&format!("row {}", offset + row + 1), cells);
        }
        offset += batch.num_rows();
    }

    Ok(rows.finish(path)?)
}

/// Extract a single value from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Option<Complex64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => {
            Complex64::from(col.as_any().downcast_ref::<Float64Array>()?.value(row))
        }
        DataType::Float32 => {
            Complex64::from(col.as_any().downcast_ref::<Float32Array>()?.value(row) as f64)
        }
        DataType::Int64 => {
            Complex64::from(col.as_any().downcast_ref::<Int64Array>()?.value(row) as f64)
        }
        DataType::Int32 => {
            Complex64::from(col.as_any().downcast_ref::<Int32Array>()?.value(row) as f64)
        }
        DataType::Utf8 => {
            return parse_cell(col.as_any().downcast_ref::<StringArray>()?.value(row));
        }
        DataType::LargeUtf8 => return parse_cell(col.as_string::<i64>().value(row)),
        _ => return None,
    };
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::{tempdir, TempDir};

    use super::*;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn input_error(err: &anyhow::Error) -> &InputError {
        err.downcast_ref::<InputError>()
            .unwrap_or_else(|| panic!("expected an InputError, got {err:#}"))
    }

    #[test]
    fn parses_real_and_complex_cells() {
        assert_eq!(parse_cell(" 1.5e3 "), Some(Complex64::new(1500.0, 0.0)));
        assert_eq!(parse_cell("1+2i"), Some(Complex64::new(1.0, 2.0)));
        assert_eq!(parse_cell("1-2j"), Some(Complex64::new(1.0, -2.0)));
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("nan"), None);
        assert_eq!(parse_cell("inf"), None);
        assert_eq!(parse_cell("abc"), None);
    }

    #[test]
    fn csv_with_names_and_units_rows() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "spectra.csv",
            "wavevec,couplings,velocities,damping,pump_input\n\
             rad/s,-,m/s,rad/s,-\n\
             1,2,3,4,5\n\
             6,7,8,9,10\n",
        );
        let inputs = get_inputs(&path, &InputOptions::default()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs.wavevec, [Complex64::from(1.0), Complex64::from(6.0)]);
        assert_eq!(inputs.pump_input[1], Complex64::from(10.0));
    }

    #[test]
    fn csv_columns_may_come_in_any_order() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "spectra.csv",
            "pump_input,damping,velocities,couplings,wavevec\n5,4,3,2+0.5i,1\n",
        );
        let options = InputOptions {
            num_header_rows: 1,
            ..InputOptions::default()
        };
        let inputs = get_inputs(&path, &options).unwrap();
        assert_eq!(inputs.wavevec, [Complex64::from(1.0)]);
        assert_eq!(inputs.couplings, [Complex64::new(2.0, 0.5)]);
        assert_eq!(inputs.pump_input, [Complex64::from(5.0)]);
    }

    #[test]
    fn headerless_file_is_positional_with_custom_delimiter() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "spectra.txt", "1;2;3;4;5\n6;7;8;9;10\n");
        let options = InputOptions {
            delimiter: b';',
            num_header_rows: 0,
        };
        let inputs = get_inputs(&path, &options).unwrap();
        assert_eq!(inputs.damping, [Complex64::from(4.0), Complex64::from(9.0)]);
    }

    #[test]
    fn wrong_headings_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "spectra.csv",
            "wavevec,couplings,velocities,damping,damping\nunits\n1,2,3,4,5\n",
        );
        let err = get_inputs(&path, &InputOptions::default()).unwrap_err();
        match input_error(&err) {
            InputError::HeadingMismatch { received, expected } => {
                assert_eq!(received[4], "damping");
                assert_eq!(expected[4], "pump_input");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn every_invalid_entry_is_reported() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "spectra.csv",
            "wavevec,couplings,velocities,damping,pump_input\nunits\n1,,3,4,5\n6,7,nan,9,x\n",
        );
        let err = get_inputs(&path, &InputOptions::default()).unwrap_err();
        match input_error(&err) {
            InputError::InvalidEntries { entries, .. } => assert_eq!(
                entries,
                &["row 3, couplings", "row 4, velocities", "row 4, pump_input"]
            ),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn short_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "spectra.csv", "1,2,3,4,5\n1,2,3\n");
        let options = InputOptions {
            num_header_rows: 0,
            ..InputOptions::default()
        };
        let err = get_inputs(&path, &options).unwrap_err();
        assert_eq!(
            input_error(&err),
            &InputError::FieldCount {
                row: 2,
                found: 3,
                expected: 5
            }
        );
    }

    #[test]
    fn header_only_file_has_no_data() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "spectra.csv",
            "wavevec,couplings,velocities,damping,pump_input\nunits\n",
        );
        let err = get_inputs(&path, &InputOptions::default()).unwrap_err();
        assert!(matches!(input_error(&err), InputError::NoData(_)));
    }

    #[test]
    fn json_records_accept_numbers_pairs_and_strings() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "spectra.json",
            r#"[
                {"wavevec": 1, "couplings": [2.0, 0.5], "velocities": 3,
                 "damping": 4, "pump_input": "5+1i"}
            ]"#,
        );
        let inputs = get_inputs(&path, &InputOptions::default()).unwrap();
        assert_eq!(inputs.couplings, [Complex64::new(2.0, 0.5)]);
        assert_eq!(inputs.pump_input, [Complex64::new(5.0, 1.0)]);
    }

    #[test]
    fn json_missing_key_is_an_invalid_entry() {
        let dir = tempdir().unwrap();
        let path = write_file(
            &dir,
            "spectra.json",
            r#"[{"wavevec": 1, "couplings": 2, "velocities": 3, "damping": 4}]"#,
        );
        let err = get_inputs(&path, &InputOptions::default()).unwrap_err();
        match input_error(&err) {
            InputError::InvalidEntries { entries, .. } => {
                assert_eq!(entries, &["record 0, pump_input"])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn parquet_columns_load_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectra.parquet");

        let headings = ["damping", "wavevec", "couplings", "velocities", "pump_input"];
        let schema = Arc::new(Schema::new(
            headings
                .iter()
                .map(|h| Field::new(*h, DataType::Float64, false))
                .collect::<Vec<_>>(),
        ));
        let columns: Vec<ArrayRef> = [[4.0, 9.0], [1.0, 6.0], [2.0, 7.0], [3.0, 8.0], [5.0, 10.0]]
            .into_iter()
            .map(|vals| Arc::new(Float64Array::from(vals.to_vec())) as ArrayRef)
            .collect();
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let inputs = get_inputs(&path, &InputOptions::default()).unwrap();
        assert_eq!(inputs.wavevec, [Complex64::from(1.0), Complex64::from(6.0)]);
        assert_eq!(inputs.damping, [Complex64::from(4.0), Complex64::from(9.0)]);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = get_inputs(Path::new("spectra.xlsx"), &InputOptions::default()).unwrap_err();
        assert_eq!(
            input_error(&err),
            &InputError::UnsupportedExtension("xlsx".into())
        );
    }
}
