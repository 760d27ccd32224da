//! Generated codec subsystem bodies.
//!
//! Each mapper with at least one opaque field carries a lazy runtime
//! initializer, one serialize/deserialize pair per codec key and a shared
//! reflective field accessor.

use crate::stmt::{
    Expr, LogLevel, MethodDef, MethodSignature, Param, RuntimeOp, RuntimeType, Stmt, TypeExpr,
};
use convert_case::{Case, Casing};
use decomp_config::CodecKey;
use decomp_schema::types::TypeRef;

pub const INITIALIZER_METHOD: &str = "createCodecInstance";
pub const FIELD_ACCESSOR_METHOD: &str = "getFieldValue";

pub const SERIALIZE_PARAM: &str = "field";
pub const DESERIALIZE_PARAM: &str = "data";
pub const ACCESSOR_SOURCE_PARAM: &str = "source";
pub const ACCESSOR_NAME_PARAM: &str = "fieldName";

const RUNTIME_VAR: &str = "runtime";

/// Codec cache key for a field type.
#[must_use]
pub fn codec_key(ty: &TypeRef, key: CodecKey) -> String {
    match key {
        CodecKey::Simple => ty.simple_name().to_string(),
        CodecKey::Qualified => ty.qualified_name().to_string(),
    }
}

/// `(serialize, deserialize)` method names for a field type.
#[must_use]
pub fn codec_names(ty: &TypeRef, key: CodecKey) -> (String, String) {
    let base = match key {
        CodecKey::Simple => ty.simple_name().replace("[]", "Array"),
        CodecKey::Qualified => ty
            .qualified_name()
            .replace("[]", "_Array")
            .replace('.', "_")
            .to_case(Case::Pascal),
    };

    (format!("{base}ToBytes"), format!("BytesTo{base}"))
}

//
// method builders
//

/// Initializer with no registrations yet; `register` statements go before
/// the final return.
#[must_use]
pub fn initializer() -> MethodDef {
    let runtime = || Expr::var(RUNTIME_VAR);

    MethodDef {
        signature: MethodSignature {
            name: INITIALIZER_METHOD.to_string(),
            params: Vec::new(),
            returns: TypeExpr::Runtime(RuntimeType::CodecRuntime),
        },
        body: vec![
            Stmt::declare(
                RUNTIME_VAR,
                TypeExpr::Runtime(RuntimeType::CodecRuntime),
                Expr::construct(RuntimeType::CodecRuntime, Vec::new()),
            ),
            Stmt::Eval(Expr::op(runtime(), RuntimeOp::RelaxRegistration, Vec::new())),
            Stmt::Eval(Expr::op(
                runtime(),
                RuntimeOp::InstallFallbackInstantiation,
                vec![Expr::construct(RuntimeType::FallbackInstantiation, Vec::new())],
            )),
            Stmt::Return(runtime()),
        ],
    }
}

pub fn register(initializer: &mut MethodDef, ty: &TypeRef) {
    let stmt = Stmt::Eval(Expr::op(
        Expr::var(RUNTIME_VAR),
        RuntimeOp::Register(ty.clone()),
        Vec::new(),
    ));
    let at = initializer.body.len().saturating_sub(1);

    initializer.body.insert(at, stmt);
}

/// `<Name>ToBytes(field) -> bytes`.
#[must_use]
pub fn serialize_method(name: &str, ty: &TypeRef) -> MethodDef {
    let var = Expr::var;

    MethodDef {
        signature: MethodSignature {
            name: name.to_string(),
            params: vec![Param::new(SERIALIZE_PARAM, TypeExpr::Named(ty.clone()))],
            returns: TypeExpr::Bytes,
        },
        body: vec![
            Stmt::ReturnIfNull {
                var: SERIALIZE_PARAM.to_string(),
                or_empty: false,
            },
            Stmt::declare(
                RUNTIME_VAR,
                TypeExpr::Runtime(RuntimeType::CodecRuntime),
                Expr::call(INITIALIZER_METHOD, Vec::new()),
            ),
            Stmt::declare(
                "outputStream",
                TypeExpr::Runtime(RuntimeType::ByteOutputBuffer),
                Expr::construct(RuntimeType::ByteOutputBuffer, Vec::new()),
            ),
            Stmt::declare(
                "output",
                TypeExpr::Runtime(RuntimeType::CodecWriter),
                Expr::construct(RuntimeType::CodecWriter, vec![var("outputStream")]),
            ),
            Stmt::Eval(Expr::op(
                var(RUNTIME_VAR),
                RuntimeOp::WriteTagged,
                vec![var("output"), var(SERIALIZE_PARAM)],
            )),
            Stmt::Eval(Expr::op(var("output"), RuntimeOp::Close, Vec::new())),
            Stmt::declare(
                "byteList",
                TypeExpr::Bytes,
                Expr::construct(RuntimeType::ByteSequence, Vec::new()),
            ),
            Stmt::CopyBytes {
                from: Expr::op(var("outputStream"), RuntimeOp::ToNativeBytes, Vec::new()),
                into: "byteList".to_string(),
            },
            Stmt::Return(var("byteList")),
        ],
    }
}

/// `BytesTo<Name>(data) -> value`.
#[must_use]
pub fn deserialize_method(name: &str, ty: &TypeRef) -> MethodDef {
    let var = Expr::var;

    MethodDef {
        signature: MethodSignature {
            name: name.to_string(),
            params: vec![Param::new(DESERIALIZE_PARAM, TypeExpr::Bytes)],
            returns: TypeExpr::Named(ty.clone()),
        },
        body: vec![
            Stmt::ReturnIfNull {
                var: DESERIALIZE_PARAM.to_string(),
                or_empty: true,
            },
            Stmt::declare(
                RUNTIME_VAR,
                TypeExpr::Runtime(RuntimeType::CodecRuntime),
                Expr::call(INITIALIZER_METHOD, Vec::new()),
            ),
            Stmt::declare(
                "byteArray",
                TypeExpr::NativeBytes,
                Expr::construct(
                    RuntimeType::NativeBytes,
                    vec![Expr::op(var(DESERIALIZE_PARAM), RuntimeOp::Len, Vec::new())],
                ),
            ),
            Stmt::CopyBytes {
                from: var(DESERIALIZE_PARAM),
                into: "byteArray".to_string(),
            },
            Stmt::declare(
                "inputStream",
                TypeExpr::Runtime(RuntimeType::ByteInputBuffer),
                Expr::construct(RuntimeType::ByteInputBuffer, vec![var("byteArray")]),
            ),
            Stmt::declare(
                "input",
                TypeExpr::Runtime(RuntimeType::CodecReader),
                Expr::construct(RuntimeType::CodecReader, vec![var("inputStream")]),
            ),
            Stmt::declare(
                "value",
                TypeExpr::Named(ty.clone()),
                Expr::cast(
                    TypeExpr::Named(ty.clone()),
                    Expr::op(var(RUNTIME_VAR), RuntimeOp::ReadTagged, vec![var("input")]),
                ),
            ),
            Stmt::Eval(Expr::op(var("input"), RuntimeOp::Close, Vec::new())),
            Stmt::Return(var("value")),
        ],
    }
}

/// `getFieldValue(source, fieldName) -> Object`; failures are logged and
/// yield null.
#[must_use]
pub fn field_accessor() -> MethodDef {
    let var = Expr::var;

    MethodDef {
        signature: MethodSignature {
            name: FIELD_ACCESSOR_METHOD.to_string(),
            params: vec![
                Param::new(ACCESSOR_SOURCE_PARAM, TypeExpr::Object),
                Param::new(ACCESSOR_NAME_PARAM, TypeExpr::Text),
            ],
            returns: TypeExpr::Object,
        },
        body: vec![Stmt::TryCatch {
            body: vec![
                Stmt::declare(
                    "handle",
                    TypeExpr::Runtime(RuntimeType::FieldHandle),
                    Expr::op(
                        var(ACCESSOR_SOURCE_PARAM),
                        RuntimeOp::LookupDeclaredField,
                        vec![var(ACCESSOR_NAME_PARAM)],
                    ),
                ),
                Stmt::Eval(Expr::op(var("handle"), RuntimeOp::ForceAccessible, Vec::new())),
                Stmt::Return(Expr::op(
                    var("handle"),
                    RuntimeOp::ReadField,
                    vec![var(ACCESSOR_SOURCE_PARAM)],
                )),
            ],
            error_var: "e".to_string(),
            handler: vec![
                Stmt::Log {
                    level: LogLevel::Error,
                    message: var("e"),
                },
                Stmt::Return(Expr::Null),
            ],
        }],
    }
}

/// Mapping expression: `codec((ty) getFieldValue(input, "field"))`.
#[must_use]
pub fn mapping_expression(codec: &str, input: &str, field: &str, ty: TypeExpr) -> Expr {
    Expr::call(
        codec,
        vec![Expr::cast(
            ty,
            Expr::call(
                FIELD_ACCESSOR_METHOD,
                vec![Expr::var(input), Expr::Text(field.to_string())],
            ),
        )],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_codec_names() {
        let ty = TypeRef::parse("com.vendor.ThirdPartyImage").unwrap();

        assert_eq!(codec_key(&ty, CodecKey::Simple), "ThirdPartyImage");
        assert_eq!(
            codec_names(&ty, CodecKey::Simple),
            (
                "ThirdPartyImageToBytes".to_string(),
                "BytesToThirdPartyImage".to_string()
            )
        );
    }

    #[test]
    fn qualified_codec_names_are_pascal_cased() {
        let ty = TypeRef::parse("com.vendor.ThirdPartyImage").unwrap();

        assert_eq!(codec_key(&ty, CodecKey::Qualified), "com.vendor.ThirdPartyImage");
        assert_eq!(
            codec_names(&ty, CodecKey::Qualified).0,
            "ComVendorThirdPartyImageToBytes"
        );
    }

    #[test]
    fn array_codec_names() {
        let ty = TypeRef::parse("com.vendor.Tile[]").unwrap();

        assert_eq!(codec_names(&ty, CodecKey::Simple).1, "BytesToTileArray");
    }

    #[test]
    fn registrations_precede_the_return() {
        let mut init = initializer();
        register(&mut init, &TypeRef::named("com.vendor.A"));
        register(&mut init, &TypeRef::named("com.vendor.B"));

        let registered: Vec<_> = init
            .body
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Eval(Expr::Op {
                    op: RuntimeOp::Register(ty),
                    ..
                }) => Some(ty.qualified_name().to_string()),
                _ => None,
            })
            .collect();

        assert_eq!(registered, ["com.vendor.A", "com.vendor.B"]);
        assert!(matches!(init.body.last(), Some(Stmt::Return(_))));
    }
}
