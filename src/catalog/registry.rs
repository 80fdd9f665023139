use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use super::id::CatalogId;
use crate::error::CatalogError;
use crate::models::fwm_detuning::FwmDetuningCalc;
use crate::models::ring_damping::RingDampingCalc;
use crate::models::spectral_pump::SpectralPumpCalc;
use crate::models::{ConceptCalculation, ParamDefn};

// ---------------------------------------------------------------------------
// CatalogEntry – one registered concept calculation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub id: CatalogId,
    pub summary: &'static str,
    pub params: &'static [ParamDefn],
}

impl CatalogEntry {
    /// Describe a calculation type as a catalog entry.
    pub fn for_calculation<C: ConceptCalculation>() -> Result<Self, CatalogError> {
        Ok(CatalogEntry {
            id: C::catalog_id()?,
            summary: C::SUMMARY,
            params: C::param_defns(),
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog – append-only registry keyed by catalog number
// ---------------------------------------------------------------------------

/// Registered calculations ordered by catalog number.
///
/// Entries are permanent: there is no way to replace or remove one once its
/// number has been assigned.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<u32, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The calculations shipped with this crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();
        catalog.register_calculation::<FwmDetuningCalc>()?;
        catalog.register_calculation::<RingDampingCalc>()?;
        catalog.register_calculation::<SpectralPumpCalc>()?;
        Ok(catalog)
    }

    /// Add an entry. Fails if its number is already taken.
    pub fn register(&mut self, entry: CatalogEntry) -> Result<(), CatalogError> {
        let number = entry.id.number();
        if let Some(existing) = self.entries.get(&number) {
            return Err(CatalogError::DuplicateId {
                number,
                existing: existing.id.to_string(),
                attempted: entry.id.to_string(),
            });
        }
        debug!("Registered {}", entry.id);
        self.entries.insert(number, entry);
        Ok(())
    }

    pub fn register_calculation<C: ConceptCalculation>(&mut self) -> Result<(), CatalogError> {
        self.register(CatalogEntry::for_calculation::<C>()?)
    }

    pub fn get(&self, number: u32) -> Option<&CatalogEntry> {
        self.entries.get(&number)
    }

    /// Find an entry by full module name, bare catalog number, or concept label.
    /// Concepts match regardless of ASCII case.
    pub fn lookup(&self, key: &str) -> Result<&CatalogEntry, CatalogError> {
        let unknown = || CatalogError::UnknownModule(key.to_string());

        if let Ok(id) = key.parse::<CatalogId>() {
            return self
                .entries
                .get(&id.number())
                .filter(|entry| entry.id.concept().eq_ignore_ascii_case(id.concept()))
                .ok_or_else(unknown);
        }
        if let Ok(number) = key.parse::<u32>() {
            return self.get(number).ok_or_else(unknown);
        }
        self.entries
            .values()
            .find(|entry| entry.id.concept().eq_ignore_ascii_case(key))
            .ok_or_else(unknown)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Audit of arbitrary module name lists
// ---------------------------------------------------------------------------

/// Check a list of module names (e.g. a directory listing) against the naming
/// pattern and catalog-number uniqueness. Returns every problem found, in
/// input order; an empty vector means the list is a valid catalog.
pub fn audit_names<'a, I>(names: I) -> Vec<CatalogError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: BTreeMap<u32, CatalogId> = BTreeMap::new();
    let mut problems = Vec::new();

    for name in names {
        match name.parse::<CatalogId>() {
            Ok(id) => match seen.get(&id.number()) {
                Some(existing) => problems.push(CatalogError::DuplicateId {
                    number: id.number(),
                    existing: existing.to_string(),
                    attempted: id.to_string(),
                }),
                None => {
                    seen.insert(id.number(), id);
                }
            },
            Err(e) => problems.push(e),
        }
    }
    problems
}
