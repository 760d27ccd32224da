//! Method API type analysis.
//!
//! Classifies the parameter and return types of every method (and, for kinds
//! that have them, every constructor) a local type exposes. Types are keyed by
//! their full generic signature so `List<A>` and `List<B>` stay distinct.

use crate::{Synthesizer, classify::FieldType, context::SynthesisContext, error::SynthesisError};
use decomp_schema::{node::MethodDecl, types::TypeRef};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

///
/// MethodApiTypes
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MethodApiTypes {
    /// `<type>::<signature>`
    pub full_name: String,
    pub inputs: Vec<FieldType>,
    pub output: FieldType,
}

impl Synthesizer<'_> {
    /// API types of every method and constructor visible on a local type.
    /// Inherited methods from local supertypes are included unless overridden.
    pub fn method_api_types(
        &self,
        ctx: &mut SynthesisContext,
        type_name: &str,
    ) -> Result<Vec<MethodApiTypes>, SynthesisError> {
        let decl = self
            .model
            .declaration(type_name)
            .ok_or_else(|| SynthesisError::not_found(type_name))?;
        let owner = decl.reference();

        let mut out = Vec::new();
        for method in self.visible_methods(type_name) {
            let full_name = format!("{type_name}::{}", method.signature());
            let output = match &method.returns {
                Some(ty) => ty.clone(),
                None => TypeRef::named("void"),
            };
            out.push(self.api_types(ctx, full_name, &method, &output));
        }

        if decl.kind.has_constructors() {
            for ctor in decl.methods.iter().filter(|m| m.constructor) {
                // constructors are named after their owner
                let ctor = MethodDecl {
                    name: type_name.to_string(),
                    ..ctor.clone()
                };
                let full_name = format!("{type_name}::{}", ctor.signature());
                out.push(self.api_types(ctx, full_name, &ctor, &owner));
            }
        }

        Ok(out)
    }

    fn api_types(
        &self,
        ctx: &mut SynthesisContext,
        full_name: String,
        method: &MethodDecl,
        output: &TypeRef,
    ) -> MethodApiTypes {
        let inputs = method
            .params
            .iter()
            .map(|p| self.classify_with_generics(ctx, &p.ty))
            .collect();

        MethodApiTypes {
            full_name,
            inputs,
            output: self.classify_with_generics(ctx, output),
        }
    }

    // own methods first, then inherited ones whose `name(params)` is not
    // already taken
    fn visible_methods(&self, type_name: &str) -> Vec<MethodDecl> {
        let mut out = Vec::new();
        let mut taken = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([type_name.to_string()]);

        while let Some(name) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(decl) = self.model.declaration(&name) else {
                continue;
            };

            for method in decl.methods.iter().filter(|m| !m.constructor) {
                let key = method.signature();
                if taken.insert(key) {
                    out.push(method.clone());
                }
            }
            queue.extend(decl.supertypes.iter().cloned());
        }

        out
    }
}
