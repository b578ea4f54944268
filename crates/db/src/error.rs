//! Store-level error taxonomy.

/// Outcome of a failed store operation.
///
/// `NotFound` and `EditConflict` are ordinary, recoverable outcomes
/// the caller is expected to branch on. `Timeout` and `Database` are
/// persistence failures: the store never retries them itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the requested id exists (or the id is < 1).
    #[error("record not found")]
    NotFound,

    /// The record exists but the supplied version is stale: a
    /// concurrent writer committed first. Distinct from `NotFound`.
    #[error("unable to update the record due to an edit conflict")]
    EditConflict,

    /// The statement exceeded the per-call deadline and was aborted.
    #[error("database statement timed out")]
    Timeout,

    /// Any other database fault (connectivity, integrity, ...).
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
