//! Catalog of quantum-optics concept calculations.
//!
//! Each catalog entry (`CCqo<ddd>_<concept>`) is a [`models::ConceptCalculation`]
//! with documented parameters, input validation and a pure calculation.

pub mod catalog;
pub mod data;
pub mod error;
pub mod logging;
pub mod models;
pub mod validate;
pub mod verify;

pub use catalog::{Catalog, CatalogId};
pub use error::{Error, Result};
pub use models::{ConceptCalculation, Outcome};
