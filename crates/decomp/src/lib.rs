//! ## Crate layout
//! - `schema`: type references, declarations, the in-memory catalog and its validation.
//! - `config`: synthesis configuration loaded from `decomp.toml`.
//! - `core`: the synthesis engine; its codec runtime sits behind the `runtime` feature.
//!
//! This crate ties them together: catalog loading from JSON, batch synthesis
//! over many type names, and a `tracing` bridge for synthesis events.

pub use decomp_config as config;
pub use decomp_core as core;
pub use decomp_schema as schema;

mod error;
mod load;
mod session;
mod trace;

pub use error::Error;
pub use load::{load_catalog, parse_catalog};
pub use session::{Batch, BatchEntry, BatchSummary, Decomp};
pub use trace::TracingSink;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{Batch, Decomp, Error, TracingSink};
    pub use decomp_config::{CacheConfig, ClassificationKey, CodecKey, DecompConfig};
    pub use decomp_core::prelude::*;
    pub use decomp_schema::{
        catalog::TypeCatalog,
        model::TypeModel,
        node::{DeclaredKind, ExternalType, TypeDecl},
        types::TypeRef,
    };
}
