use std::fmt;

use num_complex::Complex64;
use serde::Serialize;

// ---------------------------------------------------------------------------
// SpectralColumn – the five canonical input columns
// ---------------------------------------------------------------------------

/// Columns of a spectral input table, in canonical (positional) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpectralColumn {
    Wavevec,
    Couplings,
    Velocities,
    Damping,
    PumpInput,
}

impl SpectralColumn {
    pub const ALL: [SpectralColumn; 5] = [
        SpectralColumn::Wavevec,
        SpectralColumn::Couplings,
        SpectralColumn::Velocities,
        SpectralColumn::Damping,
        SpectralColumn::PumpInput,
    ];

    /// Column heading as it appears in input files.
    pub fn heading(self) -> &'static str {
        match self {
            SpectralColumn::Wavevec => "wavevec",
            SpectralColumn::Couplings => "couplings",
            SpectralColumn::Velocities => "velocities",
            SpectralColumn::Damping => "damping",
            SpectralColumn::PumpInput => "pump_input",
        }
    }

    pub fn from_heading(heading: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.heading() == heading)
    }

    pub fn headings() -> Vec<String> {
        Self::ALL.iter().map(|c| c.heading().to_string()).collect()
    }
}

impl fmt::Display for SpectralColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

// ---------------------------------------------------------------------------
// SpectralInputs – one loaded input table
// ---------------------------------------------------------------------------

/// Spectral inputs for the spectral pump calculation. All columns have the
/// same length, one entry per spectral sample. Real-valued files load with
/// zero imaginary parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpectralInputs {
    pub wavevec: Vec<Complex64>,
    pub couplings: Vec<Complex64>,
    pub velocities: Vec<Complex64>,
    pub damping: Vec<Complex64>,
    pub pump_input: Vec<Complex64>,
}

impl SpectralInputs {
    pub fn with_capacity(n: usize) -> Self {
        SpectralInputs {
            wavevec: Vec::with_capacity(n),
            couplings: Vec::with_capacity(n),
            velocities: Vec::with_capacity(n),
            damping: Vec::with_capacity(n),
            pump_input: Vec::with_capacity(n),
        }
    }

    pub fn column(&self, col: SpectralColumn) -> &[Complex64] {
        match col {
            SpectralColumn::Wavevec => &self.wavevec,
            SpectralColumn::Couplings => &self.couplings,
            SpectralColumn::Velocities => &self.velocities,
            SpectralColumn::Damping => &self.damping,
            SpectralColumn::PumpInput => &self.pump_input,
        }
    }

    fn column_mut(&mut self, col: SpectralColumn) -> &mut Vec<Complex64> {
        match col {
            SpectralColumn::Wavevec => &mut self.wavevec,
            SpectralColumn::Couplings => &mut self.couplings,
            SpectralColumn::Velocities => &mut self.velocities,
            SpectralColumn::Damping => &mut self.damping,
            SpectralColumn::PumpInput => &mut self.pump_input,
        }
    }

    /// Append one spectral sample, values in [`SpectralColumn::ALL`] order.
    pub fn push_row(&mut self, row: [Complex64; 5]) {
        for (col, value) in SpectralColumn::ALL.into_iter().zip(row) {
            self.column_mut(col).push(value);
        }
    }

    /// Number of spectral samples.
    pub fn len(&self) -> usize {
        self.wavevec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavevec.is_empty()
    }
}
