//! DTO synthesis.
//!
//! Walks a type's fields and decides, per field, whether the value crosses the
//! boundary as is, becomes a nested DTO, or is opaquely encoded to bytes.

pub mod naming;

#[cfg(test)]
mod tests;

use crate::{
    Synthesizer,
    classify::Origin,
    context::{Slot, SynthesisContext},
    describe::{ClassDescriptor, Field},
    error::SynthesisError,
    mapper::{CodecOutcome, MapperDefinition, codec},
    stmt::TypeExpr,
    trace::{StrategyKind, SynthesisEvent},
};
use decomp_schema::types::TypeRef;
use derive_more::Display;
use serde::Serialize;

///
/// Synthesized
/// handles to a DTO and its mapper inside a context
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct Synthesized {
    pub dto: String,
    pub mapper: String,
}

///
/// DtoDefinition
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DtoDefinition {
    pub qualified_name: String,
    pub package: String,
    pub simple_name: String,
    pub source_type: String,
    pub fields: Vec<DtoField>,
    pub accessors: Vec<Accessor>,
}

impl DtoDefinition {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&DtoField> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.iter().find(|a| a.name == name)
    }
}

///
/// DtoField
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DtoField {
    pub name: String,
    pub emitted: TypeExpr,
    pub original: TypeRef,
    pub strategy: FieldStrategy,
}

///
/// FieldStrategy
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum FieldStrategy {
    PassThrough,
    Nested { dto: String, mapper: String },
    Opaque { serialize: String, deserialize: String },
}

impl FieldStrategy {
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::PassThrough => StrategyKind::PassThrough,
            Self::Nested { .. } => StrategyKind::Nested,
            Self::Opaque { .. } => StrategyKind::Opaque,
        }
    }
}

///
/// AccessorKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum AccessorKind {
    Getter,
    Setter,
}

///
/// Accessor
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Accessor {
    pub kind: AccessorKind,
    pub name: String,
    pub field: String,
    pub ty: TypeExpr,
}

impl Synthesizer<'_> {
    /// Synthesize the DTO and mapper for a local type.
    ///
    /// Repeated requests for the same DTO name return the cached handles; a
    /// re-entrant request for a type still being built returns the handles of
    /// the in-progress definition.
    pub fn synthesize(
        &self,
        ctx: &mut SynthesisContext,
        type_name: &str,
        target_package: &str,
    ) -> Result<Synthesized, SynthesisError> {
        let source = TypeRef::parse(type_name).map_err(|source| SynthesisError::InvalidTypeName {
            name: type_name.to_string(),
            source,
        })?;

        let cfg = &self.config.naming;
        let package = naming::dto_package(target_package, cfg);
        let dto_simple = naming::dto_simple_name(source.simple_name(), cfg);
        let dto_name = naming::qualify(&package, &dto_simple);
        let mapper_package = naming::mapper_package(&package, cfg);
        let mapper_simple = naming::mapper_simple_name(source.simple_name(), cfg);
        let handles = Synthesized {
            dto: dto_name.clone(),
            mapper: naming::qualify(&mapper_package, &mapper_simple),
        };

        if let Some(slot) = ctx.dto_slot(&dto_name) {
            self.emit(SynthesisEvent::DtoReused {
                dto: dto_name,
                pending: matches!(slot, Slot::Pending),
            });

            return Ok(handles);
        }

        let descriptor = self.describe(ctx, source.qualified_name())?;
        self.emit(SynthesisEvent::DtoStarted {
            dto: dto_name.clone(),
            source: descriptor.full_name.clone(),
        });

        // both entries exist before any field is processed
        ctx.begin_request();
        ctx.mark_pending(&dto_name);
        ctx.insert_mapper(MapperDefinition::new(
            &descriptor.full_name,
            &dto_name,
            &mapper_package,
            &mapper_simple,
            cfg,
        ));
        self.emit(SynthesisEvent::MapperCreated {
            mapper: handles.mapper.clone(),
            dto: dto_name.clone(),
        });

        match self.plan_fields(ctx, &descriptor, &handles, &package) {
            Ok(fields) => {
                ctx.end_request(true);
                let accessors = accessors_for(&fields);
                self.emit(SynthesisEvent::DtoFinished {
                    dto: dto_name.clone(),
                    fields: fields.len(),
                });
                ctx.commit_dto(DtoDefinition {
                    qualified_name: dto_name,
                    package,
                    simple_name: dto_simple,
                    source_type: descriptor.full_name,
                    fields,
                    accessors,
                });

                Ok(handles)
            }
            Err(err) => {
                // nested failures unwind to the outermost request, which
                // removes everything the request created
                for dto in ctx.end_request(false) {
                    self.emit(SynthesisEvent::DtoAbandoned {
                        dto,
                        reason: err.to_string(),
                    });
                }

                Err(err)
            }
        }
    }

    /// Synthesize several types into one package. Each name resolves
    /// independently; a failure never aborts the rest of the batch.
    pub fn synthesize_all<'n>(
        &self,
        ctx: &mut SynthesisContext,
        names: impl IntoIterator<Item = &'n str>,
        target_package: &str,
    ) -> Vec<(String, Result<Synthesized, SynthesisError>)> {
        names
            .into_iter()
            .map(|name| (name.to_string(), self.synthesize(ctx, name, target_package)))
            .collect()
    }

    fn plan_fields(
        &self,
        ctx: &mut SynthesisContext,
        descriptor: &ClassDescriptor,
        handles: &Synthesized,
        package: &str,
    ) -> Result<Vec<DtoField>, SynthesisError> {
        let mut fields = Vec::with_capacity(descriptor.fields.len());

        for field in &descriptor.fields {
            let (emitted, strategy) = if field.ty.is_pass_through() {
                (TypeExpr::Named(field.declared.clone()), FieldStrategy::PassThrough)
            } else if field.ty.origin == Origin::Local {
                self.plan_nested(ctx, field, handles, package)?
            } else {
                self.plan_opaque(ctx, field, handles)
            };

            self.emit(SynthesisEvent::FieldPlanned {
                dto: handles.dto.clone(),
                field: field.name.clone(),
                strategy: strategy.kind(),
            });

            fields.push(DtoField {
                name: field.name.clone(),
                emitted,
                original: field.declared.clone(),
                strategy,
            });
        }

        Ok(fields)
    }

    fn plan_nested(
        &self,
        ctx: &mut SynthesisContext,
        field: &Field,
        handles: &Synthesized,
        package: &str,
    ) -> Result<(TypeExpr, FieldStrategy), SynthesisError> {
        let nested = self.synthesize(ctx, &field.ty.full_name, package)?;

        // self-referencing types do not use themselves
        if nested.mapper != handles.mapper
            && let Some(mapper) = ctx.mapper_for_dto_mut(&handles.dto)
            && mapper.add_used_mapper(&nested.mapper)
        {
            self.emit(SynthesisEvent::UsedMapperAdded {
                mapper: handles.mapper.clone(),
                used: nested.mapper.clone(),
            });
        }

        Ok((
            TypeExpr::named(nested.dto.clone()),
            FieldStrategy::Nested {
                dto: nested.dto,
                mapper: nested.mapper,
            },
        ))
    }

    fn plan_opaque(
        &self,
        ctx: &mut SynthesisContext,
        field: &Field,
        handles: &Synthesized,
    ) -> (TypeExpr, FieldStrategy) {
        let codec_key = self.config.cache.codec_key;
        let outcome = ctx
            .mapper_for_dto_mut(&handles.dto)
            .map(|mapper| mapper.add_opaque_field(&field.name, &field.declared, codec_key));

        let (serialize, deserialize) = match outcome {
            Some(CodecOutcome {
                key,
                serialize,
                deserialize,
                created,
            }) => {
                let event = if created {
                    SynthesisEvent::CodecCreated {
                        mapper: handles.mapper.clone(),
                        key,
                        serialize: serialize.clone(),
                        deserialize: deserialize.clone(),
                    }
                } else {
                    SynthesisEvent::CodecReused {
                        mapper: handles.mapper.clone(),
                        key,
                    }
                };
                self.emit(event);

                (serialize, deserialize)
            }
            None => codec::codec_names(&field.declared, codec_key),
        };

        (
            TypeExpr::Bytes,
            FieldStrategy::Opaque {
                serialize,
                deserialize,
            },
        )
    }
}

// one getter and one setter per field, in field order
fn accessors_for(fields: &[DtoField]) -> Vec<Accessor> {
    let mut accessors = Vec::with_capacity(fields.len() * 2);

    for field in fields {
        accessors.push(Accessor {
            kind: AccessorKind::Getter,
            name: naming::getter_name(&field.name, &field.original),
            field: field.name.clone(),
            ty: field.emitted.clone(),
        });
        accessors.push(Accessor {
            kind: AccessorKind::Setter,
            name: naming::setter_name(&field.name),
            field: field.name.clone(),
            ty: field.emitted.clone(),
        });
    }

    accessors
}
