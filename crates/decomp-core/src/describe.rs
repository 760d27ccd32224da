use crate::{
    Synthesizer, classify::FieldType, context::SynthesisContext, error::SynthesisError,
    trace::SynthesisEvent,
};
use decomp_schema::{node::DeclaredKind, types::TypeRef};
use serde::Serialize;

///
/// Field
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub declaring_type_name: String,
    /// Type as written on the declaration, generic arguments included.
    pub declared: TypeRef,
    pub ty: FieldType,
}

///
/// ClassDescriptor
///
/// Per-type field table: every visible field with its classification.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClassDescriptor {
    pub full_name: String,
    pub simple_name: String,
    pub kind: DeclaredKind,
    pub fields: Vec<Field>,
}

impl ClassDescriptor {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Synthesizer<'_> {
    /// Resolve a local type and classify each of its visible fields.
    pub fn describe(
        &self,
        ctx: &mut SynthesisContext,
        name: &str,
    ) -> Result<ClassDescriptor, SynthesisError> {
        if let Some(cached) = ctx.descriptor(name) {
            return Ok(cached.clone());
        }

        let decl = self
            .model
            .declaration(name)
            .ok_or_else(|| SynthesisError::not_found(name))?;
        let visible = self
            .model
            .all_fields(name)
            .ok_or_else(|| SynthesisError::not_found(name))?;

        let mut fields = Vec::with_capacity(visible.len());
        for (owner, field) in visible {
            let ty = self.classify(ctx, &field.ty);
            fields.push(Field {
                name: field.name,
                declaring_type_name: owner,
                declared: field.ty,
                ty,
            });
        }

        let descriptor = ClassDescriptor {
            full_name: decl.name.clone(),
            simple_name: decl.simple_name().to_string(),
            kind: decl.kind,
            fields,
        };

        self.emit(SynthesisEvent::Described {
            type_name: descriptor.full_name.clone(),
            fields: descriptor.fields.len(),
        });
        ctx.store_descriptor(descriptor.clone());

        Ok(descriptor)
    }

    /// Describe every local type the model knows, in name order.
    pub fn describe_all<'n>(
        &self,
        ctx: &mut SynthesisContext,
        names: impl IntoIterator<Item = &'n str>,
    ) -> Vec<Result<ClassDescriptor, SynthesisError>> {
        names
            .into_iter()
            .map(|name| self.describe(ctx, name))
            .collect()
    }
}
