mod decl;
mod external;
mod field;
mod method;

pub use decl::*;
pub use external::*;
pub use field::*;
pub use method::*;

use crate::error::ErrorTree;

///
/// ValidateNode
/// local (single-node) structural checks; catalog-wide checks live in `validate`
///

pub trait ValidateNode {
    fn validate(&self) -> Result<(), ErrorTree> {
        Ok(())
    }
}
