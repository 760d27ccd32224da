use crate::{node::ValidateNode, prelude::*, types::simple_name_of};
use derive_more::{Display, FromStr};
use std::collections::BTreeSet;

///
/// DeclaredKind
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum DeclaredKind {
    Annotation,
    #[default]
    Class,
    Enum,
    Interface,
    Record,
}

impl DeclaredKind {
    /// Kinds that can declare constructors.
    #[must_use]
    pub const fn has_constructors(self) -> bool {
        matches!(self, Self::Class | Self::Record | Self::Enum)
    }

    /// Kinds whose instances carry field state worth transferring.
    #[must_use]
    pub const fn has_instance_state(self) -> bool {
        matches!(self, Self::Class | Self::Record | Self::Enum)
    }
}

///
/// TypeDecl
///
/// A type declared in the analyzed application.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: String,

    #[serde(default)]
    pub kind: DeclaredKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDecl>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDecl>,
}

impl TypeDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DeclaredKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supertypes: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredKind::Class)
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.fields.push(FieldDecl::new(name, ty));
        self
    }

    #[must_use]
    pub fn implements(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.name)
    }

    #[must_use]
    pub fn reference(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }
}

impl ValidateNode for TypeDecl {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.name.is_empty() {
            err!(errs, "type name is empty");
        } else if !TypeRef::parse(&self.name)
            .is_ok_and(|ty| !ty.is_array() && ty.qualified_name() == self.name)
        {
            err!(errs, "type name '{}' is not a plain qualified name", self.name);
        }

        if self.supertypes.iter().any(|s| s == &self.name) {
            err!(errs, "type '{}' lists itself as a supertype", self.name);
        }

        if self.kind == DeclaredKind::Interface
            && self.methods.iter().any(|m| m.constructor)
        {
            err!(errs, "interface '{}' declares a constructor", self.name);
        }

        // fields
        let mut seen = BTreeSet::new();
        for field in &self.fields {
            if let Err(e) = field.validate() {
                errs.merge_for(&field.name, e);
            }
            if !field.name.is_empty() && !seen.insert(field.name.as_str()) {
                err!(errs, "duplicate field '{}'", field.name);
            }
        }

        // methods
        for method in &self.methods {
            if let Err(e) = method.validate() {
                errs.merge_for(&method.signature(), e);
            }
        }

        errs.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> TypeRef {
        TypeRef::parse(s).expect("valid type")
    }

    #[test]
    fn duplicate_and_empty_fields_are_reported_together() {
        let decl = TypeDecl::class("com.example.Person")
            .field("name", ty("java.lang.String"))
            .field("name", ty("java.lang.String"))
            .field("", ty("int"));

        let errs = decl.validate().unwrap_err();
        assert_eq!(errs.len(), 2, "{errs}");
    }

    #[test]
    fn kind_parses_from_str() {
        assert_eq!("Record".parse::<DeclaredKind>().unwrap(), DeclaredKind::Record);
        assert!(!DeclaredKind::Interface.has_constructors());
    }

    #[test]
    fn generic_or_self_referencing_names_are_rejected() {
        let decl = TypeDecl::class("com.example.Box<T>").implements("com.example.Box<T>");
        assert_eq!(decl.validate().unwrap_err().len(), 2);
    }
}
