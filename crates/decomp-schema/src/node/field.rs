use crate::{prelude::*, node::ValidateNode};

///
/// FieldDecl
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
}

impl FieldDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl ValidateNode for FieldDecl {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.name.is_empty() {
            err!(errs, "field name is empty");
        } else if !self
            .name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            err!(errs, "field name '{}' is not a valid identifier", self.name);
        }
        if self.ty.qualified_name() == "void" {
            err!(errs, "field '{}' cannot have type void", self.name);
        }

        errs.result()
    }
}
