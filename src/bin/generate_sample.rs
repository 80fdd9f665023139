//! Write a sample spectral input set for `ccqo spectral-pump`.
//!
//! Produces `<out-dir>/spectral_inputs.csv` (a names row and a units row
//! before the data) and `<out-dir>/spectral_inputs.parquet` (one Float64
//! column per heading).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

use ccqo::data::model::SpectralColumn;
use ccqo::models::spectral_pump::PARAM_DEFNS;

#[derive(Parser, Debug)]
#[command(name = "generate_sample", about = "Write sample spectral inputs as CSV and Parquet")]
struct Args {
    /// Directory to write into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Number of spectral samples
    #[arg(long, default_value_t = 201)]
    samples: usize,

    /// Seed for the measurement noise
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One column per [`SpectralColumn`], canonical order.
fn generate_columns(samples: usize, rng: &mut SimpleRng) -> [Vec<f64>; 5] {
    let span = 100.0;
    let step = if samples > 1 { span / (samples - 1) as f64 } else { 0.0 };
    let wavevec: Vec<f64> = (0..samples).map(|i| -span / 2.0 + i as f64 * step).collect();

    // Slow dispersion in coupling and velocity, constant ring damping,
    // Gaussian input pump with a little non-negative noise.
    let couplings: Vec<f64> = wavevec.iter().map(|&k| 12.0 + 0.01 * k).collect();
    let velocities: Vec<f64> = wavevec.iter().map(|&k| 3.0 - 0.002 * k).collect();
    let damping = vec![74.0; samples];
    let pump_input: Vec<f64> = wavevec
        .iter()
        .map(|&k| (gaussian(k, 0.0, 15.0, 1.0) + rng.gauss(0.0, 0.002)).max(0.0))
        .collect();

    [wavevec, couplings, velocities, damping, pump_input]
}

/// Units row entry for an input column.
fn units(column: SpectralColumn) -> &'static str {
    let param = match column {
        SpectralColumn::Wavevec => "wavevec",
        SpectralColumn::Couplings => "couplings_pump",
        SpectralColumn::Velocities => "velocities_pump",
        SpectralColumn::Damping => "ring_damping_pump",
        SpectralColumn::PumpInput => "pump_input",
    };
    PARAM_DEFNS
        .iter()
        .find(|p| p.name == param)
        .map_or("", |p| p.units)
}

fn write_csv(path: &Path, columns: &[Vec<f64>; 5]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(SpectralColumn::ALL.map(SpectralColumn::heading))?;
    writer.write_record(SpectralColumn::ALL.map(units))?;
    for i in 0..columns[0].len() {
        writer.write_record(columns.iter().map(|col| col[i].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, columns: [Vec<f64>; 5]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        SpectralColumn::ALL
            .iter()
            .map(|col| Field::new(col.heading(), DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .into_iter()
        .map(|values| Arc::new(Float64Array::from(values)) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let columns = generate_columns(args.samples, &mut rng);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let csv_path = args.out_dir.join("spectral_inputs.csv");
    let parquet_path = args.out_dir.join("spectral_inputs.parquet");

    write_csv(&csv_path, &columns)?;
    write_parquet(&parquet_path, columns)?;

    println!(
        "Wrote {} spectral samples to {} and {}",
        args.samples,
        csv_path.display(),
        parquet_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccqo::data::loader::{get_inputs, InputOptions};
    use ccqo::models::spectral_pump::{SpectralPumpCalc, SpectralPumpParams};
    use ccqo::models::ConceptCalculation;

    fn load_and_validate(path: &Path) -> SpectralPumpParams {
        let inputs = get_inputs(path, &InputOptions::default()).unwrap();
        let params = SpectralPumpParams::from(inputs);
        let warnings = SpectralPumpCalc::validate_parameters(&params).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        params
    }

    #[test]
    fn written_samples_load_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let columns = generate_columns(21, &mut SimpleRng::new(42));
        let csv_path = dir.path().join("spectral_inputs.csv");
        let parquet_path = dir.path().join("spectral_inputs.parquet");

        write_csv(&csv_path, &columns).unwrap();
        write_parquet(&parquet_path, columns.clone()).unwrap();

        let from_csv = load_and_validate(&csv_path);
        let from_parquet = load_and_validate(&parquet_path);
        assert_eq!(from_csv.wavevec.len(), 21);
        assert_eq!(from_parquet.wavevec.len(), 21);
        assert_eq!(from_parquet.pump_input[10].re, columns[4][10]);
        assert_eq!(from_csv.wavevec[0].re, -50.0);
        assert_eq!(from_csv.wavevec[20].re, 50.0);
    }

    #[test]
    fn the_same_seed_gives_the_same_noise() {
        let a = generate_columns(5, &mut SimpleRng::new(7));
        let b = generate_columns(5, &mut SimpleRng::new(7));
        assert_eq!(a, b);
        assert!(a[4].iter().all(|&p| p >= 0.0));
    }
}
