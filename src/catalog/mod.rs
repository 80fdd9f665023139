/// Catalog layer: module naming and the registry of concept calculations.
///
/// ```text
///  "CCqo103_spectral_pump"
///        │
///        ▼
///   ┌──────────┐
///   │    id     │  parse / format CatalogId
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ registry  │  append-only, unique by number → CatalogEntry
///   └──────────┘
/// ```

pub mod id;
pub mod registry;

pub use id::CatalogId;
pub use registry::{audit_names, Catalog, CatalogEntry};

/// Every module name starts with this.
pub const PREFIX: &str = "CCqo";

/// Catalog numbers are zero-padded to this width.
pub const MIN_DIGITS: usize = 3;
