/// Concept calculations: one module per catalog entry.
///
/// Every calculation follows the same flow:
/// ```text
///   Params ──► validate_parameters ──► calculate ──► Output ──► verify
///                 (Findings)            (CalcError)    (quantities)
/// ```

pub mod broadcast;
pub mod fwm_detuning;
pub mod ring_damping;
pub mod spectral_pump;

use log::{debug, info};
use num_complex::Complex64;
use serde::Serialize;

use crate::catalog::CatalogId;
use crate::error::{CalcError, CatalogError, Result, ValidationError};

// ---------------------------------------------------------------------------
// Parameter definitions
// ---------------------------------------------------------------------------

/// Where a variable sits in a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Input,
    Intermediate,
    Output,
}

/// Documentation record for one calculation variable.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamDefn {
    pub name: &'static str,
    pub desc: &'static str,
    pub valrange: &'static str,
    pub default: &'static str,
    pub datatype: &'static str,
    pub units: &'static str,
    pub flow: Flow,
}

// ---------------------------------------------------------------------------
// The calculation contract
// ---------------------------------------------------------------------------

/// Named output array offered for comparison against reference data.
pub type Quantity = (&'static str, Vec<Complex64>);

/// Output values a calculation exposes for verification.
pub trait Quantities {
    fn quantities(&self) -> Vec<Quantity>;
}

/// A calculation result together with any warnings raised while validating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<O> {
    pub output: O,
    pub warnings: Vec<String>,
}

pub trait ConceptCalculation {
    type Params: std::fmt::Debug;
    type Output: Quantities + Serialize + std::fmt::Debug;

    const NUMBER: u32;
    const CONCEPT: &'static str;
    const SUMMARY: &'static str;

    fn param_defns() -> &'static [ParamDefn];

    /// Check `params`, returning the warnings for dubious but usable values.
    fn validate_parameters(
        params: &Self::Params,
    ) -> std::result::Result<Vec<String>, ValidationError>;

    fn calculate(params: &Self::Params) -> std::result::Result<Self::Output, CalcError>;

    fn catalog_id() -> std::result::Result<CatalogId, CatalogError> {
        CatalogId::new(Self::NUMBER, Self::CONCEPT)
    }

    /// Validate (unless told not to) and calculate.
    fn run(params: &Self::Params, validate: bool) -> Result<Outcome<Self::Output>> {
        let id = Self::catalog_id()?;
        debug!("{id} inputs: {params:?}");

        let warnings = if validate {
            Self::validate_parameters(params)?
        } else {
            Vec::new()
        };

        let output = Self::calculate(params)?;
        info!("{id} outputs: {output:?}");
        Ok(Outcome { output, warnings })
    }
}
