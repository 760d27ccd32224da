//! Mapper synthesis.
//!
//! A mapper is created together with its DTO and grows monotonically during a
//! run: used mappers and codec pairs are only ever added.

pub mod codec;

#[cfg(test)]
mod tests;

use crate::stmt::{Expr, MethodDef, MethodSignature, Param, TypeExpr};
use decomp_config::{CodecKey, NamingConfig};
use decomp_schema::types::{TypeRef, simple_name_of};
use derive_more::Display;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const FORWARD_INPUT: &str = "entity";
pub const REVERSE_INPUT: &str = "dto";

///
/// Direction
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    /// original type to DTO
    Forward,
    /// DTO to original type
    Reverse,
}

///
/// FieldMapping
/// "target + expression" binding attached to a conversion method
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldMapping {
    pub target: String,
    pub expression: Expr,
}

///
/// MappingMethod
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MappingMethod {
    pub signature: MethodSignature,
    pub mappings: Vec<FieldMapping>,
}

impl MappingMethod {
    fn new(name: String, input: &str, from: &str, to: &str) -> Self {
        Self {
            signature: MethodSignature {
                name,
                params: vec![Param::new(input, TypeExpr::named(from))],
                returns: TypeExpr::named(to),
            },
            mappings: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    #[must_use]
    pub fn input(&self) -> &str {
        self.signature
            .params
            .first()
            .map_or(FORWARD_INPUT, |p| p.name.as_str())
    }

    #[must_use]
    pub fn mapping(&self, target: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.target == target)
    }
}

///
/// CodecPair
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CodecPair {
    pub ty: TypeRef,
    pub serialize: MethodDef,
    pub deserialize: MethodDef,
}

///
/// CodecInitializer
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CodecInitializer {
    pub method: MethodDef,
    pub registered: Vec<TypeRef>,
}

///
/// CodecOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodecOutcome {
    pub key: String,
    pub serialize: String,
    pub deserialize: String,
    /// false when an existing pair was reused
    pub created: bool,
}

///
/// MapperDefinition
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MapperDefinition {
    pub qualified_name: String,
    pub package: String,
    pub simple_name: String,
    pub source_type: String,
    pub dto_type: String,

    /// static singleton obtained from the mapping framework
    pub instance_field: String,

    pub forward: MappingMethod,
    pub reverse: MappingMethod,

    pub used_mappers: BTreeSet<String>,
    /// "uses" declaration, regenerated from `used_mappers`
    pub uses: Vec<String>,

    pub codecs: BTreeMap<String, CodecPair>,
    pub initializer: Option<CodecInitializer>,
    pub field_accessor: Option<MethodDef>,
}

impl MapperDefinition {
    /// New mapper with both conversion methods declared.
    #[must_use]
    pub fn new(
        source_type: &str,
        dto_type: &str,
        package: &str,
        simple_name: &str,
        naming: &NamingConfig,
    ) -> Self {
        let source_simple = simple_name_of(source_type);
        let dto_simple = simple_name_of(dto_type);

        Self {
            qualified_name: crate::dto::naming::qualify(package, simple_name),
            package: package.to_string(),
            simple_name: simple_name.to_string(),
            source_type: source_type.to_string(),
            dto_type: dto_type.to_string(),
            instance_field: naming.instance_field.clone(),
            forward: MappingMethod::new(
                format!("{source_simple}To{dto_simple}"),
                FORWARD_INPUT,
                source_type,
                dto_type,
            ),
            reverse: MappingMethod::new(
                format!("{dto_simple}To{source_simple}"),
                REVERSE_INPUT,
                dto_type,
                source_type,
            ),
            used_mappers: BTreeSet::new(),
            uses: Vec::new(),
            codecs: BTreeMap::new(),
            initializer: None,
            field_accessor: None,
        }
    }

    #[must_use]
    pub const fn method(&self, direction: Direction) -> &MappingMethod {
        match direction {
            Direction::Forward => &self.forward,
            Direction::Reverse => &self.reverse,
        }
    }

    const fn method_mut(&mut self, direction: Direction) -> &mut MappingMethod {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Reverse => &mut self.reverse,
        }
    }

    /// Record a nested mapper; returns false if it was already present.
    pub fn add_used_mapper(&mut self, mapper: &str) -> bool {
        if mapper == self.qualified_name || !self.used_mappers.insert(mapper.to_string()) {
            return false;
        }
        self.uses = self.used_mappers.iter().cloned().collect();

        true
    }

    /// Get or create the codec pair for a field type.
    pub fn ensure_codec(&mut self, ty: &TypeRef, key: CodecKey) -> CodecOutcome {
        let codec_key = codec::codec_key(ty, key);

        if let Some(pair) = self.codecs.get(&codec_key) {
            return CodecOutcome {
                key: codec_key,
                serialize: pair.serialize.name().to_string(),
                deserialize: pair.deserialize.name().to_string(),
                created: false,
            };
        }

        let initializer = self.initializer.get_or_insert_with(|| CodecInitializer {
            method: codec::initializer(),
            registered: Vec::new(),
        });
        codec::register(&mut initializer.method, ty);
        initializer.registered.push(ty.clone());

        let (serialize, deserialize) = codec::codec_names(ty, key);
        self.codecs.insert(
            codec_key.clone(),
            CodecPair {
                ty: ty.clone(),
                serialize: codec::serialize_method(&serialize, ty),
                deserialize: codec::deserialize_method(&deserialize, ty),
            },
        );

        CodecOutcome {
            key: codec_key,
            serialize,
            deserialize,
            created: true,
        }
    }

    /// Bind `field` on a conversion method to `codec(cast(getFieldValue(..)))`.
    pub fn add_field_mapping(
        &mut self,
        direction: Direction,
        field: &str,
        codec_method: &str,
        cast_to: TypeExpr,
    ) {
        if self.field_accessor.is_none() {
            self.field_accessor = Some(codec::field_accessor());
        }

        let method = self.method_mut(direction);
        let expression = codec::mapping_expression(codec_method, method.input(), field, cast_to);
        let mapping = FieldMapping {
            target: field.to_string(),
            expression,
        };

        match method.mappings.iter_mut().find(|m| m.target == field) {
            Some(existing) => *existing = mapping,
            None => method.mappings.push(mapping),
        }
    }

    /// Opaque field: a codec pair plus a mapping in each direction.
    pub fn add_opaque_field(&mut self, field: &str, ty: &TypeRef, key: CodecKey) -> CodecOutcome {
        let outcome = self.ensure_codec(ty, key);

        self.add_field_mapping(
            Direction::Forward,
            field,
            &outcome.serialize,
            TypeExpr::Named(ty.clone()),
        );
        self.add_field_mapping(Direction::Reverse, field, &outcome.deserialize, TypeExpr::Bytes);

        outcome
    }

    #[must_use]
    pub const fn field_accessor_present(&self) -> bool {
        self.field_accessor.is_some()
    }

    /// Types registered by the lazy initializer, in first-seen order.
    #[must_use]
    pub fn registered_types(&self) -> &[TypeRef] {
        self.initializer
            .as_ref()
            .map(|init| init.registered.as_slice())
            .unwrap_or_default()
    }

    /// Generated default method by name.
    #[must_use]
    pub fn generated_method(&self, name: &str) -> Option<&MethodDef> {
        if let Some(init) = &self.initializer
            && init.method.name() == name
        {
            return Some(&init.method);
        }
        if let Some(accessor) = &self.field_accessor
            && accessor.name() == name
        {
            return Some(accessor);
        }

        self.codecs.values().find_map(|pair| {
            [&pair.serialize, &pair.deserialize]
                .into_iter()
                .find(|m| m.name() == name)
        })
    }
}
