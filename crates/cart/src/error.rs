//! Cart-level error type.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::persistence::PersistenceError;

/// Error from a cart operation.
///
/// Notification failures never appear here: the channel is best-effort and
/// its failure must never roll back or block local cart state changes.
#[derive(Debug, Error)]
pub enum CartError {
    /// Catalog fetch failed; the add is blocked because stock could not be
    /// confirmed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Persistence backend failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
