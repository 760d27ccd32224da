use crate::{catalog::TypeCatalog, prelude::*};
use std::collections::BTreeSet;

/// Every qualified name is declared once, and never both locally and externally.
pub fn validate_unique_names(catalog: &TypeCatalog, errs: &mut ErrorTree) {
    let mut local = BTreeSet::new();
    for decl in catalog.types() {
        if !local.insert(decl.name.as_str()) {
            errs.add_for(&decl.name, "type declared more than once");
        }
    }

    let mut external = BTreeSet::new();
    for ext in catalog.external_types() {
        if ext.name.is_empty() {
            err!(errs, "external type with empty name");
            continue;
        }
        if !external.insert(ext.name.as_str()) {
            errs.add_for(&ext.name, "external type listed more than once");
        }
        if local.contains(ext.name.as_str()) {
            errs.add_for(
                &ext.name,
                "type declared both locally and as an external type",
            );
        }
    }
}
