//! Error taxonomy for document synchronization and artifact handling.

use thiserror::Error;

/// Errors surfaced by `load`/`dump` cycles, catalog lookups, and artifact
/// import/export.
///
/// Structural errors abort the whole recompute; the previously committed
/// document stays active and no partial result is ever installed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document violates a structural invariant (missing discriminator,
    /// malformed reference path, unknown binding shape).
    #[error("structural error in configuration document: {0}")]
    Structural(String),

    /// A process or reference referenced by id/name is absent from the
    /// current catalog snapshot.
    #[error("catalog lookup failed: {0}")]
    Lookup(String),

    /// An uploaded file name matches no recognized artifact; the whole
    /// import batch is refused.
    #[error("unrecognized artifact file name: {file_name}")]
    ImportRejected { file_name: String },

    /// JSON (de)serialization failure while reading or writing an artifact.
    #[error("artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure while assembling the bundled artifact archive.
    #[error("artifact archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O failure while writing an artifact bundle.
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type used across the engine.
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
