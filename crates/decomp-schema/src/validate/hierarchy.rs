use crate::{catalog::TypeCatalog, model::TypeModel, prelude::*};
use std::collections::BTreeSet;

/// Local supertype chains must not loop back on themselves.
pub fn validate_acyclic_supertypes(catalog: &TypeCatalog, errs: &mut ErrorTree) {
    let mut reported = BTreeSet::new();

    for name in catalog.type_names() {
        let mut path = Vec::new();
        if let Some(cycle) = find_cycle(catalog, name, &mut path) {
            // report each cycle once, keyed by its smallest member
            let key = cycle.iter().min().cloned().unwrap_or_default();
            if reported.insert(key.clone()) {
                errs.add_for(&key, format!("supertype cycle: {}", cycle.join(" -> ")));
            }
        }
    }
}

// depth-first walk over local supertypes; returns the cycle path when found
fn find_cycle(catalog: &TypeCatalog, name: &str, path: &mut Vec<String>) -> Option<Vec<String>> {
    if let Some(pos) = path.iter().position(|p| p == name) {
        let mut cycle = path[pos..].to_vec();
        cycle.push(name.to_string());

        return Some(cycle);
    }

    let decl = catalog.declaration(name)?;
    path.push(name.to_string());
    for parent in &decl.supertypes {
        if let Some(cycle) = find_cycle(catalog, parent, path) {
            return Some(cycle);
        }
    }
    path.pop();

    None
}
