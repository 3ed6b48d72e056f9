/// Errors raised at the fallible edges of the engine.
///
/// The diff pipeline itself is total; these only cover caller-supplied
/// configuration and lookups.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("invalid anchor: {0}")]
    InvalidAnchor(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("row {row} out of range (diff has {len} rows)")]
    RowOutOfRange { row: usize, len: usize },
}
