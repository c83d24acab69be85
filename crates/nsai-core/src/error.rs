use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Outcome reported for a runner the selector has no statistics for.
    ///
    /// The ontology and the statistics map are out of sync; retrying cannot help.
    #[error("unknown runner: {0}")]
    UnknownRunner(String),

    #[error("invalid ci document: {0}")]
    Document(String),

    #[error("invalid ontology snapshot: {0}")]
    Snapshot(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
