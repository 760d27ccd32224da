use decomp_schema::types::TypeRefError;
use thiserror::Error as ThisError;

///
/// SynthesisError
///
/// Errors surfaced per top-level synthesis request. Classification and
/// strategy selection are total once a type resolves, so the only hard
/// failures are unresolvable or malformed names.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SynthesisError {
    #[error("type not found: '{name}'")]
    NotFound { name: String },

    #[error("invalid type name '{name}': {source}")]
    InvalidTypeName { name: String, source: TypeRefError },
}

impl SynthesisError {
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
