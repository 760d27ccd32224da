//! Field type classification.
//!
//! Decides where a type comes from (primitive, platform library, the analyzed
//! application, or a third-party library) and whether its values can cross a
//! process boundary as they are.


use crate::{Synthesizer, context::SynthesisContext, trace::SynthesisEvent};
use decomp_config::ClassificationKey;
use decomp_schema::types::TypeRef;
use derive_more::Display;
use serde::Serialize;

///
/// Origin
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum Origin {
    Library,
    Local,
    Primitive,
    Standard,
}

///
/// FieldType
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FieldType {
    pub full_name: String,
    pub simple_name: String,
    pub origin: Origin,
    pub serializable: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_types: Vec<Self>,
}

impl FieldType {
    /// Values of this type can be copied into a DTO unchanged.
    #[must_use]
    pub const fn is_pass_through(&self) -> bool {
        self.serializable && matches!(self.origin, Origin::Primitive | Origin::Standard)
    }
}

impl Synthesizer<'_> {
    /// Classify a type, memoized under the configured cache key.
    pub fn classify(&self, ctx: &mut SynthesisContext, ty: &TypeRef) -> FieldType {
        self.classify_by(ctx, ty, self.config.cache.classification_key)
    }

    /// Classify a type keyed by its full generic signature, regardless of the
    /// configured key.
    pub fn classify_with_generics(&self, ctx: &mut SynthesisContext, ty: &TypeRef) -> FieldType {
        self.classify_by(ctx, ty, ClassificationKey::Generic)
    }

    fn classify_by(
        &self,
        ctx: &mut SynthesisContext,
        ty: &TypeRef,
        key_kind: ClassificationKey,
    ) -> FieldType {
        let key = match key_kind {
            ClassificationKey::Qualified => ty.qualified_name().to_string(),
            ClassificationKey::Generic => ty.to_string(),
        };

        if let Some(hit) = ctx.classification(key_kind, &key) {
            let hit = hit.clone();
            self.emit(SynthesisEvent::ClassificationReused { key });

            return hit;
        }

        let origin = self.origin_of(ty);
        let generic_types = match ty.component() {
            Some(component) => vec![self.classify_by(ctx, component, key_kind)],
            None => ty
                .type_args()
                .iter()
                .map(|arg| self.classify_by(ctx, arg, key_kind))
                .collect(),
        };
        let serializable = self.is_serializable(ty, origin, &generic_types);

        let field_type = FieldType {
            full_name: ty.qualified_name().to_string(),
            simple_name: ty.simple_name().to_string(),
            origin,
            serializable,
            generic_types,
        };

        // a container's entry replaces an element entry computed under the same
        // coarse key, so repeating this exact request returns this exact value
        ctx.store_classification(key_kind, key.clone(), field_type.clone());
        self.emit(SynthesisEvent::Classified {
            key,
            origin,
            serializable,
        });

        field_type
    }

    fn origin_of(&self, ty: &TypeRef) -> Origin {
        if ty.is_primitive() {
            return Origin::Primitive;
        }

        if self.config.classification.is_standard(ty.qualified_name()) {
            return Origin::Standard;
        }

        if self.model.has_local_declaration(ty.qualified_name()) {
            return Origin::Local;
        }

        Origin::Library
    }

    fn is_serializable(&self, ty: &TypeRef, origin: Origin, generic_types: &[FieldType]) -> bool {
        if origin == Origin::Primitive {
            return true;
        }

        let markers = &self.config.classification;
        if self.model.is_subtype_of(ty, &markers.serializable_marker) {
            return true;
        }

        let container =
            ty.is_array() || self.model.is_subtype_of(ty, &markers.collection_marker);

        container && generic_types.iter().all(|g| g.serializable)
    }
}
