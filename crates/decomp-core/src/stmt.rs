//! Structured method bodies for generated code.
//!
//! Generated methods are described as statements over a small expression
//! language; runtime-library pieces are named by role, never by a concrete
//! target-language class. A renderer maps these onto source text.

use decomp_schema::types::TypeRef;
use derive_more::Display;
use serde::Serialize;

///
/// TypeExpr
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum TypeExpr {
    Named(TypeRef),
    /// Ordered byte sequence as emitted into DTOs and codec signatures.
    Bytes,
    /// Native fixed byte buffer, only used inside codec bodies.
    NativeBytes,
    Object,
    Text,
    Void,
    Runtime(RuntimeType),
}

impl TypeExpr {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(TypeRef::named(name))
    }
}

///
/// RuntimeType
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum RuntimeType {
    CodecRuntime,
    FallbackInstantiation,
    ByteOutputBuffer,
    CodecWriter,
    ByteInputBuffer,
    CodecReader,
    ByteSequence,
    NativeBytes,
    FieldHandle,
}

///
/// RuntimeOp
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RuntimeOp {
    /// Allow classes that were never registered.
    RelaxRegistration,
    /// Instantiate classes without a no-argument constructor.
    InstallFallbackInstantiation,
    Register(TypeRef),
    /// Write a value prefixed with its runtime class.
    WriteTagged,
    /// Read a class-tagged value back.
    ReadTagged,
    Close,
    ToNativeBytes,
    Len,
    LookupDeclaredField,
    ForceAccessible,
    ReadField,
}

///
/// Expr
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Expr {
    Var(String),
    Null,
    Text(String),
    Construct {
        ty: RuntimeType,
        args: Vec<Self>,
    },
    /// Call a method declared on the generated type itself.
    Call {
        method: String,
        args: Vec<Self>,
    },
    /// Runtime-library operation on a target value.
    Op {
        target: Box<Self>,
        op: RuntimeOp,
        args: Vec<Self>,
    },
    Cast {
        ty: TypeExpr,
        expr: Box<Self>,
    },
}

impl Expr {
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Var(name.to_string())
    }

    #[must_use]
    pub fn call(method: &str, args: Vec<Self>) -> Self {
        Self::Call {
            method: method.to_string(),
            args,
        }
    }

    #[must_use]
    pub fn op(target: Self, op: RuntimeOp, args: Vec<Self>) -> Self {
        Self::Op {
            target: Box::new(target),
            op,
            args,
        }
    }

    #[must_use]
    pub fn construct(ty: RuntimeType, args: Vec<Self>) -> Self {
        Self::Construct { ty, args }
    }

    #[must_use]
    pub fn cast(ty: TypeExpr, expr: Self) -> Self {
        Self::Cast {
            ty,
            expr: Box::new(expr),
        }
    }
}

///
/// LogLevel
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum LogLevel {
    Debug,
    Warn,
    Error,
}

///
/// Stmt
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Stmt {
    /// Return null when `var` is null (or, with `or_empty`, an empty sequence).
    ReturnIfNull {
        var: String,
        or_empty: bool,
    },
    Declare {
        var: String,
        ty: TypeExpr,
        init: Expr,
    },
    Eval(Expr),
    /// Element-wise copy between byte representations.
    CopyBytes {
        from: Expr,
        into: String,
    },
    TryCatch {
        body: Vec<Self>,
        error_var: String,
        handler: Vec<Self>,
    },
    Log {
        level: LogLevel,
        message: Expr,
    },
    Return(Expr),
}

impl Stmt {
    #[must_use]
    pub fn declare(var: &str, ty: TypeExpr, init: Expr) -> Self {
        Self::Declare {
            var: var.to_string(),
            ty,
            init,
        }
    }
}

///
/// Param
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeExpr,
}

impl Param {
    #[must_use]
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

///
/// MethodSignature
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Param>,
    pub returns: TypeExpr,
}

///
/// MethodDef
/// a signature with a generated body (a default method on the mapper)
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MethodDef {
    pub signature: MethodSignature,
    pub body: Vec<Stmt>,
}

impl MethodDef {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.signature.name
    }
}
