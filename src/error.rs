use thiserror::Error;

/// Failures surfaced by a humanization run. Each is local to the operation
/// that raised it; none crash the coordinating thread.
#[derive(Debug, Error)]
pub enum RunError {
    /// Input text is empty; checked before any worker thread starts.
    #[error("input text is empty")]
    EmptyInput,

    /// Rewrite backend could not be constructed or reached at startup.
    #[error("rewrite model unavailable: {0}")]
    ModelUnavailable(String),

    /// The model raised during a (chunk, pass) unit. The message is the
    /// backend's error text, verbatim. The run aborts without retrying.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Export could not write the requested document. Run data is unaffected.
    #[error("export failed: {0}")]
    Export(String),
}
