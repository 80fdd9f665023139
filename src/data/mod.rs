/// Data layer: spectral input tables and reference data files.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SpectralInputs
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ SpectralInputs │  five equal-length complex columns
///   └────────────────┘
///        │
///        ▼
///   spectral pump calculation
/// ```

pub mod loader;
pub mod model;
