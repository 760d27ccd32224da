use super::*;
use crate::trace::RecordingSink;
use decomp_config::{CacheConfig, CodecKey, DecompConfig};
use decomp_schema::{platform::SERIALIZABLE, prelude::*};

fn ty(s: &str) -> TypeRef {
    TypeRef::parse(s).expect("valid type")
}

fn person_catalog() -> TypeCatalog {
    TypeCatalog::with_platform_types()
        .with(
            TypeDecl::class("com.example.Person")
                .field("name", ty("java.lang.String"))
                .field("address", ty("com.example.Address"))
                .field("photo", ty("com.vendor.ThirdPartyImage"))
                .field("age", ty("int")),
        )
        .with(
            TypeDecl::class("com.example.Address")
                .field("street", ty("java.lang.String"))
                .field("city", ty("java.lang.String")),
        )
        .with_external(ExternalType::new("com.vendor.ThirdPartyImage"))
}

#[test]
fn person_scenario() {
    let catalog = person_catalog();
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);
    let mut ctx = SynthesisContext::new();

    let out = synth
        .synthesize(&mut ctx, "com.example.Person", "com.example.dto")
        .unwrap();
    assert_eq!(out.dto, "com.example.dto.PersonDTO");
    assert_eq!(out.mapper, "com.example.mapper.PersonMapper");

    let dto = ctx.dto(&out.dto).unwrap();
    assert_eq!(dto.package, "com.example.dto");
    assert_eq!(dto.source_type, "com.example.Person");
    let names: Vec<_> = dto.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["name", "address", "photo", "age"]);

    let name = dto.field("name").unwrap();
    assert_eq!(name.strategy, FieldStrategy::PassThrough);
    assert_eq!(name.emitted, TypeExpr::Named(ty("java.lang.String")));

    let address = dto.field("address").unwrap();
    assert_eq!(address.emitted, TypeExpr::named("com.example.dto.AddressDTO"));
    assert_eq!(
        address.strategy,
        FieldStrategy::Nested {
            dto: "com.example.dto.AddressDTO".to_string(),
            mapper: "com.example.mapper.AddressMapper".to_string(),
        }
    );

    let photo = dto.field("photo").unwrap();
    assert_eq!(photo.emitted, TypeExpr::Bytes);
    assert_eq!(
        photo.strategy,
        FieldStrategy::Opaque {
            serialize: "ThirdPartyImageToBytes".to_string(),
            deserialize: "BytesToThirdPartyImage".to_string(),
        }
    );

    assert_eq!(dto.field("age").unwrap().strategy, FieldStrategy::PassThrough);

    let mapper = ctx.mapper(&out.mapper).unwrap();
    assert_eq!(mapper.forward.name(), "PersonToPersonDTO");
    assert_eq!(mapper.reverse.name(), "PersonDTOToPerson");
    assert_eq!(mapper.uses, ["com.example.mapper.AddressMapper"]);
    assert_eq!(mapper.registered_types(), [ty("com.vendor.ThirdPartyImage")]);
    assert_eq!(mapper.codecs.len(), 1);
    assert!(mapper.field_accessor_present());

    // the nested DTO is finished and reachable on its own
    let address_dto = ctx.dto("com.example.dto.AddressDTO").unwrap();
    assert_eq!(address_dto.fields.len(), 2);
    assert!(ctx.mapper_for_dto("com.example.dto.AddressDTO").is_some());
}

#[test]
fn accessors_follow_bean_naming() {
    let catalog = TypeCatalog::with_platform_types().with(
        TypeDecl::class("com.example.Account")
            .field("active", ty("boolean"))
            .field("verified", ty("java.lang.Boolean"))
            .field("name", ty("java.lang.String")),
    );
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);
    let mut ctx = SynthesisContext::new();

    let out = synth
        .synthesize(&mut ctx, "com.example.Account", "com.example")
        .unwrap();
    let dto = ctx.dto(&out.dto).unwrap();

    let accessor_names: Vec<_> = dto.accessors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        accessor_names,
        [
            "isActive",
            "setActive",
            "getVerified",
            "setVerified",
            "getName",
            "setName"
        ]
    );
    assert_eq!(dto.accessor("isActive").unwrap().kind, AccessorKind::Getter);
    assert_eq!(dto.accessor("setName").unwrap().kind, AccessorKind::Setter);
}

#[test]
fn target_package_with_or_without_dto_segment() {
    let catalog = person_catalog();
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);

    for target in ["com.example", "com.example.dto"] {
        let mut ctx = SynthesisContext::new();
        let out = synth
            .synthesize(&mut ctx, "com.example.Person", target)
            .unwrap();

        assert_eq!(out.dto, "com.example.dto.PersonDTO");
        assert!(out.mapper.ends_with(".mapper.PersonMapper"));
    }
}

#[test]
fn shared_nested_type_is_synthesized_once() {
    let catalog = person_catalog().with(
        TypeDecl::class("com.example.Route")
            .field("from", ty("com.example.Address"))
            .field("to", ty("com.example.Address")),
    );
    let config = DecompConfig::default();
    let sink = RecordingSink::new();
    let synth = Synthesizer::new(&catalog, &config).with_trace(&sink);
    let mut ctx = SynthesisContext::new();

    let out = synth
        .synthesize(&mut ctx, "com.example.Route", "com.example")
        .unwrap();

    let started = sink
        .take()
        .into_iter()
        .filter(|e| matches!(e, SynthesisEvent::DtoStarted { dto, .. } if dto.ends_with("AddressDTO")))
        .count();
    assert_eq!(started, 1);
    assert_eq!(ctx.dtos().count(), 2);
    assert_eq!(ctx.mappers().count(), 2);

    let mapper = ctx.mapper(&out.mapper).unwrap();
    assert_eq!(mapper.used_mappers.len(), 1);

    let dto = ctx.dto(&out.dto).unwrap();
    assert_eq!(dto.field("from").unwrap().strategy, dto.field("to").unwrap().strategy);
}

#[test]
fn repeated_requests_return_the_cached_pair() {
    let catalog = person_catalog();
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);
    let mut ctx = SynthesisContext::new();

    let first = synth
        .synthesize(&mut ctx, "com.example.Person", "com.example")
        .unwrap();
    let dto = ctx.dto(&first.dto).cloned();
    let mapper = ctx.mapper(&first.mapper).cloned();

    let second = synth
        .synthesize(&mut ctx, "com.example.Person", "com.example.dto")
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(ctx.dto(&second.dto).cloned(), dto);
    assert_eq!(ctx.mapper(&second.mapper).cloned(), mapper);
}

#[test]
fn mutual_references_terminate() {
    let catalog = TypeCatalog::with_platform_types()
        .with(TypeDecl::class("com.example.Order").field("customer", ty("com.example.Customer")))
        .with(
            TypeDecl::class("com.example.Customer")
                .field("lastOrder", ty("com.example.Order"))
                .field("name", ty("java.lang.String")),
        );
    let config = DecompConfig::default();
    let sink = RecordingSink::new();
    let synth = Synthesizer::new(&catalog, &config).with_trace(&sink);
    let mut ctx = SynthesisContext::new();

    let order = synth
        .synthesize(&mut ctx, "com.example.Order", "com.example")
        .unwrap();

    assert!(sink.take().iter().any(|e| matches!(
        e,
        SynthesisEvent::DtoReused { dto, pending: true } if dto == "com.example.dto.OrderDTO"
    )));

    let customer_mapper = ctx.mapper("com.example.mapper.CustomerMapper").unwrap();
    assert!(customer_mapper.used_mappers.contains(&order.mapper));
    let order_mapper = ctx.mapper(&order.mapper).unwrap();
    assert!(order_mapper.used_mappers.contains("com.example.mapper.CustomerMapper"));

    let customer = ctx.dto("com.example.dto.CustomerDTO").unwrap();
    assert_eq!(
        customer.field("lastOrder").unwrap().emitted,
        TypeExpr::named("com.example.dto.OrderDTO")
    );
    assert!(!ctx.is_pending(&order.dto));
}

#[test]
fn self_reference_does_not_use_itself() {
    let catalog = TypeCatalog::with_platform_types().with(
        TypeDecl::class("com.example.Node")
            .field("value", ty("int"))
            .field("next", ty("com.example.Node")),
    );
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);
    let mut ctx = SynthesisContext::new();

    let out = synth
        .synthesize(&mut ctx, "com.example.Node", "com.example")
        .unwrap();

    let mapper = ctx.mapper(&out.mapper).unwrap();
    assert!(mapper.used_mappers.is_empty());
    assert!(mapper.uses.is_empty());

    let dto = ctx.dto(&out.dto).unwrap();
    assert_eq!(dto.field("next").unwrap().emitted, TypeExpr::named(out.dto.clone()));
}

#[test]
fn library_and_unserializable_standard_fields_are_opaque() {
    let catalog = TypeCatalog::with_platform_types()
        .with(
            TypeDecl::class("com.example.Session")
                .field("token", ty("com.vendor.Token"))
                .field("backup", ty("com.vendor.Token"))
                .field("cached", ty("java.util.Optional"))
                .field("tags", ty("java.util.List<java.lang.String>")),
        )
        .with_external(ExternalType::new("com.vendor.Token").implements(SERIALIZABLE));
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);
    let mut ctx = SynthesisContext::new();

    let out = synth
        .synthesize(&mut ctx, "com.example.Session", "com.example")
        .unwrap();
    let dto = ctx.dto(&out.dto).unwrap();

    for name in ["token", "backup", "cached"] {
        assert_eq!(dto.field(name).unwrap().strategy.kind(), StrategyKind::Opaque, "{name}");
    }
    assert_eq!(dto.field("tags").unwrap().strategy, FieldStrategy::PassThrough);

    // one pair and one registration per codec key, one mapping per field
    let mapper = ctx.mapper(&out.mapper).unwrap();
    assert_eq!(mapper.codecs.len(), 2);
    assert_eq!(mapper.registered_types().len(), 2);
    assert_eq!(mapper.forward.mappings.len(), 3);
    assert_eq!(mapper.reverse.mappings.len(), 3);
}

#[test]
fn primitive_arrays_are_opaque() {
    let catalog = TypeCatalog::with_platform_types().with(
        TypeDecl::class("com.example.Blob")
            .field("data", ty("byte[]"))
            .field("grid", ty("int[][]")),
    );
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);
    let mut ctx = SynthesisContext::new();

    let out = synth
        .synthesize(&mut ctx, "com.example.Blob", "com.example")
        .unwrap();
    let dto = ctx.dto(&out.dto).unwrap();

    let data = dto.field("data").unwrap();
    assert_eq!(data.emitted, TypeExpr::Bytes);
    assert_eq!(
        data.strategy,
        FieldStrategy::Opaque {
            serialize: "byteArrayToBytes".to_string(),
            deserialize: "BytesTobyteArray".to_string(),
        }
    );
    let grid = dto.field("grid").unwrap();
    assert_eq!(grid.emitted, TypeExpr::Bytes);
    assert_eq!(grid.strategy.kind(), StrategyKind::Opaque);

    let mapper = ctx.mapper(&out.mapper).unwrap();
    let pair = &mapper.codecs["byte[]"];
    assert_eq!(pair.ty, ty("byte[]"));
    assert_eq!(pair.serialize.name(), "byteArrayToBytes");
    assert_eq!(pair.deserialize.name(), "BytesTobyteArray");
    assert_eq!(mapper.registered_types(), [ty("byte[]"), ty("int[][]")]);
}

#[test]
fn codec_key_controls_simple_name_collisions() {
    let catalog = TypeCatalog::with_platform_types()
        .with(
            TypeDecl::class("com.example.Gallery")
                .field("cover", ty("com.alpha.Image"))
                .field("thumb", ty("com.beta.Image")),
        )
        .with_external(ExternalType::new("com.alpha.Image"))
        .with_external(ExternalType::new("com.beta.Image"));

    let simple = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &simple);
    let mut ctx = SynthesisContext::new();
    let out = synth
        .synthesize(&mut ctx, "com.example.Gallery", "com.example")
        .unwrap();
    let mapper = ctx.mapper(&out.mapper).unwrap();
    assert_eq!(mapper.codecs.len(), 1);
    assert_eq!(mapper.registered_types(), [ty("com.alpha.Image")]);

    let qualified = DecompConfig {
        cache: CacheConfig {
            codec_key: CodecKey::Qualified,
            ..CacheConfig::default()
        },
        ..DecompConfig::default()
    };
    let synth = Synthesizer::new(&catalog, &qualified);
    let mut ctx = SynthesisContext::new();
    let out = synth
        .synthesize(&mut ctx, "com.example.Gallery", "com.example")
        .unwrap();
    let mapper = ctx.mapper(&out.mapper).unwrap();
    let keys: Vec<_> = mapper.codecs.keys().map(String::as_str).collect();
    assert_eq!(keys, ["com.alpha.Image", "com.beta.Image"]);

    let dto = ctx.dto(&out.dto).unwrap();
    assert_eq!(
        dto.field("thumb").unwrap().strategy,
        FieldStrategy::Opaque {
            serialize: "ComBetaImageToBytes".to_string(),
            deserialize: "BytesToComBetaImage".to_string(),
        }
    );
}

#[test]
fn errors_are_per_request() {
    let catalog = person_catalog();
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);
    let mut ctx = SynthesisContext::new();

    let results = synth.synthesize_all(
        &mut ctx,
        ["com.example.Address", "com.example.Ghost", "com.example.Person", "com.example.<"],
        "com.example",
    );

    assert!(results[0].1.is_ok());
    assert!(results[1].1.as_ref().unwrap_err().is_not_found());
    assert!(results[2].1.is_ok());
    assert!(matches!(
        results[3].1,
        Err(SynthesisError::InvalidTypeName { .. })
    ));

    // earlier definitions survive the failure
    assert!(ctx.dto("com.example.dto.AddressDTO").is_some());
    assert!(ctx.dto("com.example.dto.GhostDTO").is_none());
    assert!(!ctx.is_pending("com.example.dto.GhostDTO"));
}

///
/// Phantom
/// claims a local declaration it cannot produce
///

struct Phantom(TypeCatalog);

impl TypeModel for Phantom {
    fn declaration(&self, name: &str) -> Option<&TypeDecl> {
        self.0.declaration(name)
    }

    fn supertypes(&self, name: &str) -> Option<&[String]> {
        self.0.supertypes(name)
    }

    fn has_local_declaration(&self, name: &str) -> bool {
        name == "com.example.Missing" || self.0.has_local_declaration(name)
    }
}

#[test]
fn failed_requests_roll_back_their_entries() {
    let model = Phantom(
        TypeCatalog::with_platform_types()
            .with(TypeDecl::class("com.example.Holder").field("gone", ty("com.example.Missing"))),
    );
    let config = DecompConfig::default();
    let sink = RecordingSink::new();
    let synth = Synthesizer::new(&model, &config).with_trace(&sink);
    let mut ctx = SynthesisContext::new();

    let err = synth
        .synthesize(&mut ctx, "com.example.Holder", "com.example")
        .unwrap_err();
    assert!(err.is_not_found());

    assert!(ctx.dto("com.example.dto.HolderDTO").is_none());
    assert!(!ctx.is_pending("com.example.dto.HolderDTO"));
    assert!(ctx.mapper("com.example.mapper.HolderMapper").is_none());
    assert!(sink
        .take()
        .iter()
        .any(|e| matches!(e, SynthesisEvent::DtoAbandoned { .. })));

    // a failed request leaves the context usable
    assert!(ctx.finish().is_empty());
}

#[test]
fn failed_requests_roll_back_nested_entries() {
    let model = Phantom(
        TypeCatalog::with_platform_types()
            .with(
                TypeDecl::class("com.example.Order")
                    .field("line", ty("com.example.Line"))
                    .field("gone", ty("com.example.Missing")),
            )
            .with(TypeDecl::class("com.example.Line").field("order", ty("com.example.Order"))),
    );
    let config = DecompConfig::default();
    let sink = RecordingSink::new();
    let synth = Synthesizer::new(&model, &config).with_trace(&sink);
    let mut ctx = SynthesisContext::new();

    let err = synth
        .synthesize(&mut ctx, "com.example.Order", "com.example")
        .unwrap_err();
    assert!(err.is_not_found());

    // Line finished while Order was still pending, and goes with it
    for dto in ["com.example.dto.OrderDTO", "com.example.dto.LineDTO"] {
        assert!(ctx.dto(dto).is_none(), "{dto}");
        assert!(!ctx.is_pending(dto), "{dto}");
        assert!(ctx.mapper_for_dto(dto).is_none(), "{dto}");
    }
    assert!(ctx.mapper("com.example.mapper.LineMapper").is_none());
    assert_eq!(ctx.mappers().count(), 0);

    let abandoned: Vec<_> = sink
        .take()
        .into_iter()
        .filter_map(|e| match e {
            SynthesisEvent::DtoAbandoned { dto, .. } => Some(dto),
            _ => None,
        })
        .collect();
    assert_eq!(abandoned, ["com.example.dto.OrderDTO", "com.example.dto.LineDTO"]);

    // a later request starts from a clean journal
    let err = synth
        .synthesize(&mut ctx, "com.example.Line", "com.example")
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(ctx.finish().is_empty());
}

#[test]
fn successful_requests_survive_a_later_failure() {
    let model = Phantom(
        person_catalog()
            .with(TypeDecl::class("com.example.Holder").field("gone", ty("com.example.Missing"))),
    );
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&model, &config);
    let mut ctx = SynthesisContext::new();

    synth
        .synthesize(&mut ctx, "com.example.Person", "com.example")
        .unwrap();
    synth
        .synthesize(&mut ctx, "com.example.Holder", "com.example")
        .unwrap_err();

    let run = ctx.finish();
    assert!(run.dto("com.example.dto.PersonDTO").is_some());
    assert!(run.dto("com.example.dto.AddressDTO").is_some());
    assert!(run.dto("com.example.dto.HolderDTO").is_none());
    assert_eq!(run.mappers().count(), 2);
}

#[test]
fn finished_runs_are_reproducible() {
    let catalog = person_catalog();
    let config = DecompConfig::default();
    let synth = Synthesizer::new(&catalog, &config);

    let fingerprint = || {
        let mut ctx = SynthesisContext::new();
        synth
            .synthesize(&mut ctx, "com.example.Person", "com.example")
            .unwrap();
        let run = ctx.finish();
        assert!(run.dto("com.example.dto.AddressDTO").is_some());
        assert!(run.mapper("com.example.mapper.PersonMapper").is_some());

        run.fingerprint().unwrap()
    };

    let first = fingerprint();
    assert_eq!(first.len(), 64);
    assert_eq!(first, fingerprint());
}
