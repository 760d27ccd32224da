use crate::MAX_TYPE_DEPTH;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// PRIMITIVES
/// type names the model treats as primitive (no declaration, no fields)
///

pub const PRIMITIVE_NAMES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short", "void",
];

/// Name substituted for an unbounded wildcard argument.
pub const OBJECT_TYPE: &str = "java.lang.Object";

///
/// TypeRefError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TypeRefError {
    #[error("type signature is empty")]
    Empty,

    #[error("invalid type name in '{0}'")]
    InvalidName(String),

    #[error("unbalanced generic brackets in '{0}'")]
    Unbalanced(String),

    #[error("unexpected trailing input in '{0}'")]
    Trailing(String),

    #[error("type signature '{0}' nests deeper than {MAX_TYPE_DEPTH} levels")]
    TooDeep(String),
}

///
/// TypeRef
///
/// A reference to a type as it appears in a declaration: qualified name,
/// simple name, primitive flag, array component and generic arguments.
/// `qualified_name` never carries generic arguments; `Display` renders the
/// full signature.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    qualified_name: String,
    simple_name: String,
    primitive: bool,
    component: Option<Box<TypeRef>>,
    type_args: Vec<TypeRef>,
}

impl TypeRef {
    /// Reference a non-array type by qualified name, without generic arguments.
    #[must_use]
    pub fn named(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let simple_name = simple_name_of(&qualified_name).to_string();
        let primitive = PRIMITIVE_NAMES.contains(&qualified_name.as_str());

        Self {
            qualified_name,
            simple_name,
            primitive,
            component: None,
            type_args: Vec::new(),
        }
    }

    /// Reference a parameterized type.
    #[must_use]
    pub fn generic(qualified_name: impl Into<String>, type_args: Vec<Self>) -> Self {
        Self {
            type_args,
            ..Self::named(qualified_name)
        }
    }

    /// Reference an array of `component`.
    #[must_use]
    pub fn array_of(component: Self) -> Self {
        Self {
            qualified_name: format!("{}[]", component.qualified_name),
            simple_name: format!("{}[]", component.simple_name),
            primitive: false,
            component: Some(Box::new(component)),
            type_args: Vec::new(),
        }
    }

    /// Parse a signature such as `java.util.Map<java.lang.String, int[]>`.
    pub fn parse(input: &str) -> Result<Self, TypeRefError> {
        let mut parser = Parser::new(input);
        parser.skip_ws();
        if parser.at_end() {
            return Err(TypeRefError::Empty);
        }

        let ty = parser.parse_type(0)?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(TypeRefError::Trailing(input.to_string()));
        }

        Ok(ty)
    }

    #[must_use]
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    #[must_use]
    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        self.primitive
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.component.is_some()
    }

    #[must_use]
    pub fn component(&self) -> Option<&Self> {
        self.component.as_deref()
    }

    #[must_use]
    pub fn type_args(&self) -> &[Self] {
        &self.type_args
    }

    /// The primitive boolean type (not its boxed form).
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        self.primitive && self.qualified_name == "boolean"
    }

    /// Package part of the qualified name, if any.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        let base = self.component().map_or(self.qualified_name.as_str(), |c| c.qualified_name());

        base.rsplit_once('.').map(|(pkg, _)| pkg)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(component) = &self.component {
            return write!(f, "{component}[]");
        }

        f.write_str(&self.qualified_name)?;
        if !self.type_args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }

        Ok(())
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

// simple_name_of
#[must_use]
pub fn simple_name_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit_once('.')
        .map_or(qualified_name, |(_, simple)| simple)
}

///
/// Parser
/// recursive descent over a type signature
///

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn read_name(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '$' | '.')))
            .unwrap_or(rest.len());
        self.pos += end;

        &rest[..end]
    }

    fn parse_type(&mut self, depth: usize) -> Result<TypeRef, TypeRefError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(TypeRefError::TooDeep(self.input.to_string()));
        }

        self.skip_ws();
        let mut ty = if self.eat("?") {
            self.parse_wildcard(depth)?
        } else {
            let name = self.read_name();
            if !is_valid_name(name) {
                return Err(TypeRefError::InvalidName(self.input.to_string()));
            }

            self.skip_ws();
            let mut args = Vec::new();
            if self.eat("<") {
                loop {
                    args.push(self.parse_type(depth + 1)?);
                    self.skip_ws();
                    if self.eat(",") {
                        continue;
                    }
                    if self.eat(">") {
                        break;
                    }

                    return Err(TypeRefError::Unbalanced(self.input.to_string()));
                }
            }

            TypeRef::generic(name, args)
        };

        self.skip_ws();
        while self.eat("[") {
            self.skip_ws();
            if !self.eat("]") {
                return Err(TypeRefError::Unbalanced(self.input.to_string()));
            }
            ty = TypeRef::array_of(ty);
            self.skip_ws();
        }

        Ok(ty)
    }

    // `?`, `? extends T` and `? super T` resolve to their bound (or Object)
    fn parse_wildcard(&mut self, depth: usize) -> Result<TypeRef, TypeRefError> {
        self.skip_ws();
        let checkpoint = self.pos;
        let keyword = self.read_name();
        if keyword == "extends" || keyword == "super" {
            return self.parse_type(depth + 1);
        }
        self.pos = checkpoint;

        match self.peek() {
            Some(',' | '>') | None => Ok(TypeRef::named(OBJECT_TYPE)),
            Some(_) => Err(TypeRefError::InvalidName(self.input.to_string())),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            segment
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        })
}
