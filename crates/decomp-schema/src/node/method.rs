use crate::{prelude::*, node::ValidateNode};
use std::ops::Not;

///
/// ParamDecl
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeRef,
}

///
/// MethodDecl
///
/// A method or constructor declared on a local type. Constructors carry no
/// return type.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MethodDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDecl>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,

    #[serde(default, skip_serializing_if = "Not::not")]
    pub constructor: bool,
}

impl MethodDecl {
    #[must_use]
    pub fn method(name: impl Into<String>, returns: Option<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns,
            constructor: false,
        }
    }

    #[must_use]
    pub fn constructor(owner: impl Into<String>) -> Self {
        Self {
            name: owner.into(),
            params: Vec::new(),
            returns: None,
            constructor: true,
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: TypeRef) -> Self {
        self.params.push(ParamDecl {
            name: name.into(),
            ty,
        });
        self
    }

    /// `name(T1,T2)` with fully-qualified generic parameter types.
    #[must_use]
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| p.ty.to_string())
            .collect::<Vec<_>>()
            .join(",");

        format!("{}({params})", self.name)
    }
}

impl ValidateNode for MethodDecl {
    fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        if self.name.is_empty() {
            err!(errs, "method name is empty");
        }
        if self.constructor && self.returns.is_some() {
            err!(errs, "constructor '{}' declares a return type", self.name);
        }

        errs.result()
    }
}
