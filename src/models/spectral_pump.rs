//! CCqo103: expected spectral pump inside a ring resonator.
//!
//! For every spectral sample the ring response to the input channel is
//! `rr = -i conj(g) / (-i k v + Γ)` and the pump in the ring is `b = rr a`,
//! with `k` the spectral variable, `g` the coupling, `v` the velocity, `Γ` the
//! ring damping and `a` the input pump.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::broadcast::{at, broadcast_len};
use super::{ConceptCalculation, Flow, ParamDefn, Quantities, Quantity};
use crate::data::model::SpectralInputs;
use crate::error::{CalcError, ValidationError};
use crate::validate::{indices_where, val_array_tests, ArrayChecks, Findings};

pub use crate::data::loader::get_inputs;

pub const PARAM_DEFNS: &[ParamDefn] = &[
    ParamDefn {
        name: "wavevec",
        desc: "spectrum independent variable",
        valrange: "(-inf, inf)",
        default: "0.0",
        datatype: "float (N-element array)",
        units: "rad s^(-1)",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "couplings_pump",
        desc: "spectral coupling constants for the pump",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "complex (N-element array)",
        units: "rad^(1/2) m^(1/2) s^(-1)",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "velocities_pump",
        desc: "spectral velocities for the pump",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float (N-element array)",
        units: "m s^(-1)",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "ring_damping_pump",
        desc: "spectral ring damping for the pump",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float (N-element array)",
        units: "rad s^(-1)",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "pump_input",
        desc: "input spectral pump distribution",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "complex (N-element array)",
        units: "[pump_input]",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "ring_response",
        desc: "spectral response of ring to pump",
        valrange: "(-inf, inf)",
        default: "0.0",
        datatype: "complex (N-element array)",
        units: "[m^(1/2) rad^(-1/2)]",
        flow: Flow::Intermediate,
    },
    ParamDefn {
        name: "pump_ring",
        desc: "expected value of spectral pump distribution",
        valrange: "(-inf, inf)",
        default: "0.0",
        datatype: "complex (N-element array)",
        units: "[pump_input * ring_response]",
        flow: Flow::Output,
    },
];

/// Spectral parameters. All arrays broadcast together: each has either the
/// common length or a single element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralPumpParams {
    pub wavevec: Vec<Complex64>,
    pub couplings_pump: Vec<Complex64>,
    pub velocities_pump: Vec<Complex64>,
    pub ring_damping_pump: Vec<Complex64>,
    pub pump_input: Vec<Complex64>,
}

impl SpectralPumpParams {
    /// Parameters from purely real spectra.
    pub fn real(
        wavevec: &[f64],
        couplings_pump: &[f64],
        velocities_pump: &[f64],
        ring_damping_pump: &[f64],
        pump_input: &[f64],
    ) -> Self {
        let lift =
            |xs: &[f64]| -> Vec<Complex64> { xs.iter().copied().map(Complex64::from).collect() };
        SpectralPumpParams {
            wavevec: lift(wavevec),
            couplings_pump: lift(couplings_pump),
            velocities_pump: lift(velocities_pump),
            ring_damping_pump: lift(ring_damping_pump),
            pump_input: lift(pump_input),
        }
    }

    fn shapes(&self) -> [(&'static str, usize); 5] {
        [
            ("wavevec", self.wavevec.len()),
            ("couplings_pump", self.couplings_pump.len()),
            ("velocities_pump", self.velocities_pump.len()),
            ("ring_damping_pump", self.ring_damping_pump.len()),
            ("pump_input", self.pump_input.len()),
        ]
    }
}

impl From<SpectralInputs> for SpectralPumpParams {
    fn from(inputs: SpectralInputs) -> Self {
        SpectralPumpParams {
            wavevec: inputs.wavevec,
            couplings_pump: inputs.couplings,
            velocities_pump: inputs.velocities,
            ring_damping_pump: inputs.damping,
            pump_input: inputs.pump_input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectralPump {
    /// Spectral pump in the ring.
    pub pump_ring: Vec<Complex64>,
    /// Spectral response of the ring.
    pub ring_response: Vec<Complex64>,
}

impl Quantities for SpectralPump {
    fn quantities(&self) -> Vec<Quantity> {
        vec![
            ("pump_ring", self.pump_ring.clone()),
            ("ring_response", self.ring_response.clone()),
        ]
    }
}

/// Pump inside the ring and the ring response, sample by sample.
///
/// ```
/// use ccqo::models::spectral_pump::{calc_spectral_pump, SpectralPumpParams};
/// use num_complex::Complex64;
///
/// let params = SpectralPumpParams::real(&[1.0], &[2.0], &[3.0], &[4.0], &[5.0]);
/// let out = calc_spectral_pump(&params).unwrap();
/// assert!((out.pump_ring[0] - Complex64::new(1.2, -1.6)).norm() < 1e-12);
/// assert!((out.ring_response[0] - Complex64::new(0.24, -0.32)).norm() < 1e-12);
/// ```
pub fn calc_spectral_pump(params: &SpectralPumpParams) -> Result<SpectralPump, CalcError> {
    let n = broadcast_len(&params.shapes())?;
    let i = Complex64::i();

    let denoms: Vec<Complex64> = (0..n)
        .map(|j| {
            -i * at(&params.wavevec, j) * at(&params.velocities_pump, j)
                + at(&params.ring_damping_pump, j)
        })
        .collect();

    let zero = indices_where(&denoms, |d| d.norm_sqr() == 0.0);
    if !zero.is_empty() {
        return Err(CalcError::DivisionByZero {
            expression: "-1j*wavevec*velocity+damping",
            indices: zero,
        });
    }

    let ring_response: Vec<Complex64> = denoms
        .iter()
        .enumerate()
        .map(|(j, d)| -i * at(&params.couplings_pump, j).conj() / d)
        .collect();
    let pump_ring = ring_response
        .iter()
        .enumerate()
        .map(|(j, rr)| rr * at(&params.pump_input, j))
        .collect();

    Ok(SpectralPump {
        pump_ring,
        ring_response,
    })
}

/// Array checks for every spectrum plus their broadcast compatibility.
///
/// Negative spectral variables are fine; couplings and input pump may be
/// complex. Imaginary parts anywhere else only warn.
pub fn validate_parameters(params: &SpectralPumpParams) -> Result<Vec<String>, ValidationError> {
    let mut found = Findings::new();
    let defaults = ArrayChecks::default();
    let complex_ok = ArrayChecks {
        warn_complex: false,
        ..defaults
    };

    found.merge(val_array_tests(
        &params.wavevec,
        "spectrum variable",
        ArrayChecks {
            error_negative: false,
            ..defaults
        },
    ));
    found.merge(val_array_tests(&params.couplings_pump, "pump couplings", complex_ok));
    found.merge(val_array_tests(&params.velocities_pump, "pump velocities", defaults));
    found.merge(val_array_tests(&params.ring_damping_pump, "pump ring damping", defaults));
    found.merge(val_array_tests(&params.pump_input, "pump input", complex_ok));

    if let Err(e) = broadcast_len(&params.shapes()) {
        let listing: Vec<String> = params
            .shapes()
            .iter()
            .map(|(name, len)| format!("  {name} shape = ({len},)"))
            .collect();
        found.error(format!("{e}\nCompatible shapes required:\n{}", listing.join("\n")));
    }

    found.into_result()
}

pub struct SpectralPumpCalc;

impl ConceptCalculation for SpectralPumpCalc {
    type Params = SpectralPumpParams;
    type Output = SpectralPump;

    const NUMBER: u32 = 103;
    const CONCEPT: &'static str = "spectral_pump";
    const SUMMARY: &'static str =
        "Spectral pump in a ring resonator accounting for coupling and damping";

    fn param_defns() -> &'static [ParamDefn] {
        PARAM_DEFNS
    }

    fn validate_parameters(params: &SpectralPumpParams) -> Result<Vec<String>, ValidationError> {
        validate_parameters(params)
    }

    fn calculate(params: &SpectralPumpParams) -> Result<SpectralPump, CalcError> {
        calc_spectral_pump(params)
    }
}
