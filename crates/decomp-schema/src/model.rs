use crate::{
    node::{FieldDecl, TypeDecl},
    types::TypeRef,
};
use std::collections::{BTreeSet, VecDeque};

///
/// TypeModel
///
/// Read-only view of the analyzed application's types. The synthesis engine
/// only ever talks to the model through this trait.
///

pub trait TypeModel {
    /// Local declaration for a qualified name.
    fn declaration(&self, name: &str) -> Option<&TypeDecl>;

    /// Direct supertypes of a local or external type.
    fn supertypes(&self, name: &str) -> Option<&[String]>;

    fn has_local_declaration(&self, name: &str) -> bool {
        self.declaration(name).is_some()
    }

    /// Reflexive, transitive subtype check against a capability marker.
    /// Arrays and primitives only match the marker by name.
    fn is_subtype_of(&self, ty: &TypeRef, marker: &str) -> bool {
        let start = ty.qualified_name();
        if start == marker {
            return true;
        }
        if ty.is_array() || ty.is_primitive() {
            return false;
        }

        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([start.to_string()]);

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.clone()) {
                continue;
            }
            for parent in self.supertypes(&name).unwrap_or_default() {
                if parent == marker {
                    return true;
                }
                queue.push_back(parent.clone());
            }
        }

        false
    }

    /// All fields visible on a local type: its own first, then those inherited
    /// from local supertypes. A name declared lower in the hierarchy shadows
    /// the inherited one. Returns `(declaring type, field)` pairs.
    fn all_fields(&self, name: &str) -> Option<Vec<(String, FieldDecl)>> {
        let root = self.declaration(name)?;

        let mut out = Vec::new();
        let mut names = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([root]);

        while let Some(decl) = queue.pop_front() {
            if !visited.insert(decl.name.as_str()) {
                continue;
            }
            for field in &decl.fields {
                if names.insert(field.name.clone()) {
                    out.push((decl.name.clone(), field.clone()));
                }
            }
            for parent in &decl.supertypes {
                if let Some(parent_decl) = self.declaration(parent) {
                    queue.push_back(parent_decl);
                }
            }
        }

        Some(out)
    }
}
