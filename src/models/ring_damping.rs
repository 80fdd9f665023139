//! CCqo102: damping of a ring resonator coupled to loss channels.
//!
//! Each channel coupled to the ring is a loss path for the ring photons. The
//! loss of channel `i` is `|C_i|^2 / (2 v_i)` and the total damping is the
//! sum over channels.

use num_complex::Complex64;
use serde::{Deserialize, Deserializer, Serialize};

use super::broadcast::{at, broadcast_len};
use super::{ConceptCalculation, Flow, ParamDefn, Quantities, Quantity};
use crate::error::{CalcError, ValidationError};
use crate::validate::{indices_where, Findings};

pub const PARAM_DEFNS: &[ParamDefn] = &[
    ParamDefn {
        name: "couplings",
        desc: "Coupling constant for each channel",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float (scalar or array)",
        units: "(rad s^{-1})^{1/2}",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "velocities",
        desc: "Speed of light for each channel",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float (scalar or array)",
        units: "rad s^{-1}",
        flow: Flow::Input,
    },
    ParamDefn {
        name: "path_losses",
        desc: "Damping value for each channel",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float (scalar or array)",
        units: "1",
        flow: Flow::Intermediate,
    },
    ParamDefn {
        name: "damping",
        desc: "Total damping coefficient",
        valrange: "[0, inf)",
        default: "0.0",
        datatype: "float",
        units: "1",
        flow: Flow::Output,
    },
];

/// A scalar is a one-element vector; it broadcasts against the other input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingDampingParams {
    #[serde(deserialize_with = "one_or_many")]
    pub couplings: Vec<f64>,
    #[serde(deserialize_with = "one_or_many")]
    pub velocities: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(f64),
    Many(Vec<f64>),
}

/// Accept either a bare number or an array of numbers.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingDamping {
    pub damping: f64,
    pub path_losses: Vec<f64>,
}

impl Quantities for RingDamping {
    fn quantities(&self) -> Vec<Quantity> {
        vec![
            ("damping", vec![Complex64::from(self.damping)]),
            (
                "path_losses",
                self.path_losses.iter().copied().map(Complex64::from).collect(),
            ),
        ]
    }
}

/// Total ring damping and the per-channel path losses.
///
/// ```
/// use ccqo::models::ring_damping::calc_ring_damping;
///
/// let single = calc_ring_damping(&[12.0], &[3.0]).unwrap();
/// assert_eq!((single.damping, single.path_losses), (24.0, vec![24.0]));
///
/// let shared_velocity = calc_ring_damping(&[12.0, 20.0], &[2.0]).unwrap();
/// assert_eq!(shared_velocity.path_losses, [36.0, 100.0]);
/// assert_eq!(shared_velocity.damping, 136.0);
/// ```
pub fn calc_ring_damping(couplings: &[f64], velocities: &[f64]) -> Result<RingDamping, CalcError> {
    let n = broadcast_len(&[("couplings", couplings.len()), ("velocities", velocities.len())])?;

    let zero = indices_where(velocities, |&v| v == 0.0);
    if !zero.is_empty() {
        return Err(CalcError::DivisionByZero {
            expression: "2 * velocity",
            indices: zero,
        });
    }

    let path_losses: Vec<f64> = (0..n)
        .map(|i| {
            let c = at(couplings, i);
            c.abs().powi(2) / (2.0 * at(velocities, i))
        })
        .collect();
    // `Sum` of no terms is -0.0
    let damping = path_losses.iter().fold(0.0, |total, loss| total + loss);

    Ok(RingDamping {
        damping,
        path_losses,
    })
}

/// Couplings and velocities must be non-negative and broadcast together.
///
/// ```
/// use ccqo::models::ring_damping::{validate_parameters, RingDampingParams};
///
/// let valid = RingDampingParams { couplings: vec![1.0, 2.0, 3.0], velocities: vec![6.0] };
/// assert!(validate_parameters(&valid).is_ok());
///
/// let mismatched = RingDampingParams {
///     couplings: vec![1.0, 2.0, 3.0],
///     velocities: vec![4.0, 5.0, 6.0, 7.0],
/// };
/// let err = validate_parameters(&mismatched).unwrap_err();
/// assert!(err.errors[0]
///     .starts_with("operands could not be broadcast together with shapes (3,) (4,)"));
/// ```
pub fn validate_parameters(params: &RingDampingParams) -> Result<Vec<String>, ValidationError> {
    let mut found = Findings::new();

    for (values, name) in [(&params.couplings, "couplings"), (&params.velocities, "velocities")] {
        if values.is_empty() {
            found.error(format!(
                "Received {name} with no values\nExpected {name} with at least one value"
            ));
        }
    }

    check_non_negative(&mut found, &params.couplings, "coupling", "couplings");
    check_non_negative(&mut found, &params.velocities, "velocity", "velocities");

    for (values, name) in [(&params.couplings, "couplings"), (&params.velocities, "velocities")] {
        let non_finite = indices_where(values, |v| !v.is_finite());
        if !non_finite.is_empty() {
            found.error(format!(
                "All {name} must be finite\nBad {name} indices: {non_finite:?}"
            ));
        }
    }

    if let Err(e) = broadcast_len(&[
        ("couplings", params.couplings.len()),
        ("velocities", params.velocities.len()),
    ]) {
        found.error(format!(
            "{e}\nSame shape required:\n  couplings shape  = ({},)\n  velocities shape = ({},)",
            params.couplings.len(),
            params.velocities.len()
        ));
    }

    found.into_result()
}

fn check_non_negative(found: &mut Findings, values: &[f64], singular: &str, plural: &str) {
    let bad = indices_where(values, |&v| v < 0.0);
    if bad.is_empty() {
        return;
    }
    let bad_values: Vec<f64> = bad.iter().map(|&i| values[i]).collect();
    found.error(format!(
        "All {singular} values must be >=0\nBad {plural} indices: {bad:?}\nBad {plural} values:  {bad_values:?}"
    ));
}

pub struct RingDampingCalc;

impl ConceptCalculation for RingDampingCalc {
    type Params = RingDampingParams;
    type Output = RingDamping;

    const NUMBER: u32 = 102;
    const CONCEPT: &'static str = "ring_damping";
    const SUMMARY: &'static str = "Total ring damping from one or more coupled loss channels";

    fn param_defns() -> &'static [ParamDefn] {
        PARAM_DEFNS
    }

    fn validate_parameters(params: &RingDampingParams) -> Result<Vec<String>, ValidationError> {
        validate_parameters(params)
    }

    fn calculate(params: &RingDampingParams) -> Result<RingDamping, CalcError> {
        calc_ring_damping(&params.couplings, &params.velocities)
    }
}
