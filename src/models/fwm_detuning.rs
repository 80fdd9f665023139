//! CCqo101: detuning in four-wave mixing.
//!
//! Two pump photons (ω₀₁, ω₀₂) impinge on a nonlinear medium and may produce
//! a signal (ω₁) and idler (ω₂) pair. The detuning is the output sum
//! frequency minus the input sum frequency.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::{ConceptCalculation, Flow, ParamDefn, Quantities, Quantity};
use crate::error::{CalcError, ValidationError};
use crate::validate::Findings;

pub const PARAM_DEFNS: &[ParamDefn] = &[
    ParamDefn {
        name: "pump1",
        desc: "angular frequency of pump 1 photon",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float",
        units: "rad s^{-1}",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "pump2",
        desc: "angular frequency of pump 2 photon (defaults to pump1)",
        valrange: "[0, inf)",
        default: "pump1",
        datatype: "float",
        units: "rad s^{-1}",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "signal",
        desc: "angular frequency of signal",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float",
        units: "rad s^{-1}",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "idler",
        desc: "angular frequency of idler (defaults to signal)",
        valrange: "[0, inf)",
        default: "signal",
        datatype: "float",
        units: "rad s^{-1}",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "detuning",
        desc: "angular frequency of detuning",
        valrange: "(-inf, inf)",
        default: "0.0",
        datatype: "float",
        units: "rad s^{-1}",
        flow: Flow::Output,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FwmDetuningParams {
    pub pump1: f64,
    pub signal: f64,
    #[serde(default)]
    pub pump2: Option<f64>,
    #[serde(default)]
    pub idler: Option<f64>,
}

impl FwmDetuningParams {
    /// Degenerate pumps and signal/idler: `pump2 = pump1`, `idler = signal`.
    pub fn degenerate(pump1: f64, signal: f64) -> Self {
        FwmDetuningParams {
            pump1,
            signal,
            pump2: None,
            idler: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FwmDetuning {
    /// ω₀₁ + ω₀₂
    pub input_sum: f64,
    /// ω₁ + ω₂
    pub output_sum: f64,
    pub detuning: f64,
}

impl Quantities for FwmDetuning {
    fn quantities(&self) -> Vec<Quantity> {
        vec![
            ("detuning", vec![Complex64::from(self.detuning)]),
            ("input_sum", vec![Complex64::from(self.input_sum)]),
            ("output_sum", vec![Complex64::from(self.output_sum)]),
        ]
    }
}

/// `detuning = (signal + idler) - (pump1 + pump2)`.
///
/// ```
/// use ccqo::models::fwm_detuning::calc_fwm_detuning;
///
/// assert_eq!(calc_fwm_detuning(100.0, 110.0, None, None).detuning, 20.0);
/// assert_eq!(calc_fwm_detuning(100.0, 110.0, Some(230.0), Some(250.0)).detuning, 30.0);
/// ```
pub fn calc_fwm_detuning(
    pump1: f64,
    signal: f64,
    pump2: Option<f64>,
    idler: Option<f64>,
) -> FwmDetuning {
    let pump2 = pump2.unwrap_or(pump1);
    let idler = idler.unwrap_or(signal);

    let input_sum = pump1 + pump2;
    let output_sum = signal + idler;
    FwmDetuning {
        input_sum,
        output_sum,
        detuning: output_sum - input_sum,
    }
}

/// Every supplied frequency must be finite and non-negative.
///
/// ```
/// use ccqo::models::fwm_detuning::{validate_parameters, FwmDetuningParams};
///
/// assert!(validate_parameters(&FwmDetuningParams::degenerate(1.22e15, 1.92e15)).is_ok());
///
/// let err = validate_parameters(&FwmDetuningParams::degenerate(-1.0, 1.92e15)).unwrap_err();
/// assert_eq!(err.errors[0], "Range check error:\n  Expected pump1 >= 0\n  Received pump1 = -1");
/// ```
pub fn validate_parameters(params: &FwmDetuningParams) -> Result<Vec<String>, ValidationError> {
    let mut found = Findings::new();

    let checked = [
        ("pump1", Some(params.pump1)),
        ("pump2", params.pump2),
        ("signal", Some(params.signal)),
        ("idler", params.idler),
    ];
    for (name, value) in checked {
        let Some(v) = value else {
            continue;
        };
        if !v.is_finite() {
            found.error(format!(
                "Range check error:\n  Expected {name} finite\n  Received {name} = {v}"
            ));
        } else if v < 0.0 {
            found.error(format!(
                "Range check error:\n  Expected {name} >= 0\n  Received {name} = {v}"
            ));
        }
    }

    found.into_result()
}

pub struct FwmDetuningCalc;

impl ConceptCalculation for FwmDetuningCalc {
    type Params = FwmDetuningParams;
    type Output = FwmDetuning;

    const NUMBER: u32 = 101;
    const CONCEPT: &'static str = "FWM_detuning";
    const SUMMARY: &'static str =
        "Detuning between output and input sum frequencies in four-wave mixing";

    fn param_defns() -> &'static [ParamDefn] {
        PARAM_DEFNS
    }

    fn validate_parameters(params: &FwmDetuningParams) -> Result<Vec<String>, ValidationError> {
        validate_parameters(params)
    }

    fn calculate(params: &FwmDetuningParams) -> Result<FwmDetuning, CalcError> {
        Ok(calc_fwm_detuning(
            params.pump1,
            params.signal,
            params.pump2,
            params.idler,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_frequencies_default_to_their_partners() {
        let out = calc_fwm_detuning(1.22e15, 1.92e15, None, None);
        assert_eq!(out.input_sum, 2.44e15);
        assert_eq!(out.output_sum, 3.84e15);
        assert!((out.detuning - 1.4e15).abs() < 1.0);
    }

    #[test]
    fn explicit_frequencies_are_used() {
        let out = calc_fwm_detuning(1.22e15, 1.92e15, Some(1.00e15), Some(2.00e15));
        assert_eq!(out.input_sum, 2.22e15);
        assert_eq!(out.output_sum, 3.92e15);
    }

    #[test]
    fn every_negative_frequency_is_reported_in_order() {
        let params = FwmDetuningParams {
            pump1: -1.0,
            signal: 5.0,
            pump2: Some(-2.0),
            idler: Some(-3.0),
        };
        let err = validate_parameters(&params).unwrap_err();
        let names: Vec<&str> = err
            .errors
            .iter()
            .map(|e| e.lines().nth(1).unwrap().trim())
            .collect();
        assert_eq!(
            names,
            ["Expected pump1 >= 0", "Expected pump2 >= 0", "Expected idler >= 0"]
        );
    }

    #[test]
    fn non_finite_frequency_is_rejected() {
        let err = validate_parameters(&FwmDetuningParams::degenerate(f64::NAN, 1.0)).unwrap_err();
        assert!(err.errors[0].contains("Expected pump1 finite"));
    }

    #[test]
    fn run_composes_validation_and_calculation() {
        let params = FwmDetuningParams::degenerate(100.0, 110.0);
        let outcome = FwmDetuningCalc::run(&params, true).unwrap();
        assert_eq!(outcome.output.detuning, 20.0);
        assert!(outcome.warnings.is_empty());

        let bad = FwmDetuningParams::degenerate(-100.0, 110.0);
        assert!(FwmDetuningCalc::run(&bad, true).is_err());
        assert_eq!(FwmDetuningCalc::run(&bad, false).unwrap().output.detuning, 420.0);
    }
}
