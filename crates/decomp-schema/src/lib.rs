//! Read-only type model consumed by the synthesis engine.
//!
//! A `TypeCatalog` holds the declarations of the analyzed application plus a
//! table of known external (platform or library) types, and answers the
//! capability questions the classifier asks through the [`TypeModel`] trait.

pub mod catalog;
pub mod error;
pub mod model;
pub mod node;
pub mod platform;
pub mod types;
pub mod validate;

/// Maximum nesting depth accepted when parsing a type signature.
pub const MAX_TYPE_DEPTH: usize = 32;

use crate::{error::ErrorTree, types::TypeRefError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        catalog::TypeCatalog,
        err,
        error::ErrorTree,
        model::TypeModel,
        node::*,
        types::{TypeRef, TypeRefError},
    };
    pub use serde::{Deserialize, Serialize};
}

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error(transparent)]
    TypeRef(#[from] TypeRefError),

    #[error("catalog validation failed: {0}")]
    Validation(ErrorTree),
}
