use std::path::PathBuf;

use thiserror::Error;

/// Malformed module names and catalog bookkeeping failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Module name '{name}' must start with '{prefix}'", prefix = crate::catalog::PREFIX)]
    MissingPrefix { name: String },

    #[error("Module name '{name}': catalog number needs at least 3 digits, found {found}")]
    TooFewDigits { name: String, found: usize },

    #[error("Module name '{name}': catalog numbers wider than 3 digits take no leading zero")]
    LeadingZero { name: String },

    #[error("Module name '{name}': catalog number does not fit in 32 bits")]
    NumberOverflow { name: String },

    #[error("Module name '{name}': expected '_' between catalog number and concept")]
    MissingSeparator { name: String },

    #[error("Invalid concept label '{concept}': use ASCII letters, digits and '_', starting with a letter or digit")]
    InvalidConcept { concept: String },

    #[error("Catalog number {number:03} already assigned to {existing}; refusing {attempted}")]
    DuplicateId {
        number: u32,
        existing: String,
        attempted: String,
    },

    #[error("No catalog module matches '{0}'")]
    UnknownModule(String),
}

/// Parameters rejected by a module's `validate_parameters`.
///
/// Warnings found during the same pass ride along so nothing is lost when
/// the caller only reports the error.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", .errors.join("\n"))]
pub struct ValidationError {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("operands could not be broadcast together with shapes {}", format_shapes(.shapes))]
    ShapeMismatch { shapes: Vec<(String, usize)> },

    #[error("Division by zero for {expression} at indices {indices:?}")]
    DivisionByZero {
        expression: &'static str,
        indices: Vec<usize>,
    },
}

/// Problems with tabulated input files.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Received name headings = {received:?}\nExpected name headings = {expected:?}")]
    HeadingMismatch {
        received: Vec<String>,
        expected: Vec<String>,
    },

    #[error("Row {row}: found {found} fields, expected {expected}")]
    FieldCount {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error(
        "Received invalid entries in {}\nExpected all entries populated and finite in {}\nInvalid entries: {}",
        .path.display(), .path.display(), .entries.join("; ")
    )]
    InvalidEntries { path: PathBuf, entries: Vec<String> },

    #[error("{0} contains no data rows")]
    NoData(PathBuf),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerifyError {
    #[error("{quantity}: computed {computed} values but reference holds {expected}")]
    LengthMismatch {
        quantity: String,
        computed: usize,
        expected: usize,
    },

    #[error("Reference data shares no quantity with the outputs (reference has {reference:?}, outputs are {outputs:?})")]
    NoOverlap {
        reference: Vec<String>,
        outputs: Vec<String>,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid parameters:\n{0}")]
    Validation(#[from] ValidationError),

    #[error("Calculation failed: {0}")]
    Calc(#[from] CalcError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Verification failed: {0}")]
    Verify(#[from] VerifyError),
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_shapes(shapes: &[(String, usize)]) -> String {
    shapes
        .iter()
        .map(|(_, len)| format!("({len},)"))
        .collect::<Vec<_>>()
        .join(" ")
}
