use super::*;
use crate::stmt::{RuntimeOp, Stmt};

fn mapper() -> MapperDefinition {
    MapperDefinition::new(
        "com.example.Person",
        "com.example.dto.PersonDTO",
        "com.example.mapper",
        "PersonMapper",
        &NamingConfig::default(),
    )
}

fn image() -> TypeRef {
    TypeRef::named("com.vendor.ThirdPartyImage")
}

#[test]
fn conversion_methods_exist_from_creation() {
    let mapper = mapper();

    assert_eq!(mapper.qualified_name, "com.example.mapper.PersonMapper");
    assert_eq!(mapper.instance_field, "INSTANCE");

    let forward = mapper.method(Direction::Forward);
    assert_eq!(forward.name(), "PersonToPersonDTO");
    assert_eq!(forward.input(), FORWARD_INPUT);
    assert_eq!(
        forward.signature.params[0].ty,
        TypeExpr::named("com.example.Person")
    );
    assert_eq!(
        forward.signature.returns,
        TypeExpr::named("com.example.dto.PersonDTO")
    );

    let reverse = mapper.method(Direction::Reverse);
    assert_eq!(reverse.name(), "PersonDTOToPerson");
    assert_eq!(reverse.input(), REVERSE_INPUT);
    assert_eq!(reverse.signature.returns, TypeExpr::named("com.example.Person"));

    assert!(mapper.initializer.is_none());
    assert!(!mapper.field_accessor_present());
    assert!(mapper.registered_types().is_empty());
}

#[test]
fn used_mappers_are_a_deterministic_set() {
    let mut mapper = mapper();

    assert!(mapper.add_used_mapper("com.example.mapper.ZoneMapper"));
    assert!(mapper.add_used_mapper("com.example.mapper.AddressMapper"));
    assert!(!mapper.add_used_mapper("com.example.mapper.ZoneMapper"));
    assert!(!mapper.add_used_mapper("com.example.mapper.PersonMapper"));

    assert_eq!(
        mapper.uses,
        [
            "com.example.mapper.AddressMapper",
            "com.example.mapper.ZoneMapper"
        ]
    );
}

#[test]
fn codec_pairs_are_created_once_per_key() {
    let mut mapper = mapper();

    let first = mapper.ensure_codec(&image(), CodecKey::Simple);
    assert!(first.created);
    assert_eq!(first.key, "ThirdPartyImage");
    assert_eq!(first.serialize, "ThirdPartyImageToBytes");
    assert_eq!(first.deserialize, "BytesToThirdPartyImage");

    let again = mapper.ensure_codec(&image(), CodecKey::Simple);
    assert!(!again.created);
    assert_eq!(again.serialize, first.serialize);

    assert_eq!(mapper.registered_types(), [image()]);

    let init = mapper.initializer.as_ref().unwrap();
    let ops: Vec<_> = init
        .method
        .body
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Eval(Expr::Op { op, .. }) => Some(op.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        ops,
        [
            RuntimeOp::RelaxRegistration,
            RuntimeOp::InstallFallbackInstantiation,
            RuntimeOp::Register(image()),
        ]
    );

    let pair = &mapper.codecs["ThirdPartyImage"];
    assert_eq!(pair.serialize.signature.returns, TypeExpr::Bytes);
    assert_eq!(pair.deserialize.signature.returns, TypeExpr::Named(image()));
    assert!(mapper.generated_method("BytesToThirdPartyImage").is_some());
    assert!(mapper.generated_method(codec::INITIALIZER_METHOD).is_some());
}

#[test]
fn opaque_fields_map_both_directions() {
    let mut mapper = mapper();
    mapper.add_opaque_field("photo", &image(), CodecKey::Simple);

    assert!(mapper.field_accessor_present());
    assert!(mapper.generated_method(codec::FIELD_ACCESSOR_METHOD).is_some());

    let forward = mapper.forward.mapping("photo").unwrap();
    assert_eq!(
        forward.expression,
        Expr::call(
            "ThirdPartyImageToBytes",
            vec![Expr::cast(
                TypeExpr::Named(image()),
                Expr::call(
                    codec::FIELD_ACCESSOR_METHOD,
                    vec![Expr::var("entity"), Expr::Text("photo".to_string())],
                ),
            )],
        )
    );

    let reverse = mapper.reverse.mapping("photo").unwrap();
    assert_eq!(
        reverse.expression,
        Expr::call(
            "BytesToThirdPartyImage",
            vec![Expr::cast(
                TypeExpr::Bytes,
                Expr::call(
                    codec::FIELD_ACCESSOR_METHOD,
                    vec![Expr::var("dto"), Expr::Text("photo".to_string())],
                ),
            )],
        )
    );
}

#[test]
fn remapping_a_field_replaces_its_entry() {
    let mut mapper = mapper();
    mapper.add_opaque_field("photo", &image(), CodecKey::Simple);
    mapper.add_opaque_field("photo", &image(), CodecKey::Simple);
    mapper.add_opaque_field("avatar", &image(), CodecKey::Simple);

    assert_eq!(mapper.forward.mappings.len(), 2);
    assert_eq!(mapper.reverse.mappings.len(), 2);
    assert_eq!(mapper.codecs.len(), 1);
    assert_eq!(mapper.registered_types().len(), 1);
}
