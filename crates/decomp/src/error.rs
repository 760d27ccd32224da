use decomp_config::ConfigError;
use decomp_core::SynthesisError;
use decomp_schema::SchemaError;
use thiserror::Error as ThisError;

///
/// Error
///
/// Everything that can go wrong before or around a synthesis run. Failures of
/// individual requests inside a batch stay in their `BatchEntry`.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse catalog '{path}': {source}")]
    Catalog {
        path: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to serialize run: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
}
