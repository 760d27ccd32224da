use crate::prelude::*;

///
/// ExternalType
///
/// A type known to the model without a local declaration: a platform type or
/// a third-party library type. Only its supertypes are recorded so capability
/// checks can be answered.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ExternalType {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
}

impl ExternalType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
        }
    }

    #[must_use]
    pub fn implements(mut self, supertype: impl Into<String>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }
}
