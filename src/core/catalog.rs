//=========================================================================
// Catalog Seam
//=========================================================================
//
// Outbound interface to the static-data catalog (tables, definitions,
// tuning data). The core only ever asks it to initialize once during
// bootstrap; lookups and schema are entirely the embedder's business.
//
// The catalog is optional. A missing service, or a service whose data
// source is absent, degrades to a logged skip and never blocks the
// boot flow.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Catalog Error =======================================================

/// Reasons catalog initialization can fail.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The backing data source does not exist. Treated as a skip, not
    /// a failure.
    #[error("catalog data source missing: {0}")]
    SourceMissing(String),

    /// The data source exists but could not be ingested.
    #[error("catalog initialization failed: {0}")]
    InitFailed(String),
}

//=== Catalog =============================================================

/// One-shot initialization hook for the embedder's data catalog.
pub trait Catalog {
    /// Loads and indexes the catalog data.
    ///
    /// Called at most once, during bootstrap.
    fn initialize(&self) -> Result<(), CatalogError>;
}

//=== Tests ===============================================================
