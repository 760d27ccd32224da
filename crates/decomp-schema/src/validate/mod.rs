//! Catalog validation orchestration.

pub mod hierarchy;
pub mod naming;

use crate::{catalog::TypeCatalog, error::ErrorTree, node::ValidateNode};

/// Run full catalog validation in a staged, deterministic order.
pub fn validate_catalog(catalog: &TypeCatalog) -> Result<(), ErrorTree> {
    // Phase 1: validate each declaration (structural + local invariants).
    let mut errors = validate_nodes(catalog);

    // Phase 2: enforce catalog-wide invariants.
    validate_global(catalog, &mut errors);

    errors.result()
}

fn validate_nodes(catalog: &TypeCatalog) -> ErrorTree {
    let mut errors = ErrorTree::new();
    for decl in catalog.types() {
        if let Err(e) = decl.validate() {
            errors.merge_for(&decl.name, e);
        }
    }

    errors
}

fn validate_global(catalog: &TypeCatalog, errors: &mut ErrorTree) {
    naming::validate_unique_names(catalog, errors);
    hierarchy::validate_acyclic_supertypes(catalog, errors);
}
