//! Per-run synthesis state.
//!
//! A context owns every cache of one synthesis run. Runs never share a
//! context; a hosting service running requests in parallel gives each its own.

use crate::{
    classify::FieldType, describe::ClassDescriptor, dto::DtoDefinition,
    mapper::MapperDefinition,
};
use decomp_config::ClassificationKey;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

///
/// Slot
/// DTO cache entry; `Pending` while its fields are still being processed
///

#[derive(Clone, Debug)]
pub(crate) enum Slot {
    Pending,
    Ready(DtoDefinition),
}

///
/// SynthesisContext
///

#[derive(Debug, Default)]
pub struct SynthesisContext {
    classifications: BTreeMap<String, FieldType>,
    generic_classifications: BTreeMap<String, FieldType>,
    descriptors: BTreeMap<String, ClassDescriptor>,
    dtos: BTreeMap<String, Slot>,

    // keyed by DTO qualified name, plus a name index
    mappers: BTreeMap<String, MapperDefinition>,
    mapper_names: BTreeMap<String, String>,

    // DTOs created since the outermost request began
    request_depth: usize,
    journal: Vec<String>,
}

impl SynthesisContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // classification cache
    //

    pub(crate) fn classification(&self, kind: ClassificationKey, key: &str) -> Option<&FieldType> {
        match kind {
            ClassificationKey::Qualified => self.classifications.get(key),
            ClassificationKey::Generic => self.generic_classifications.get(key),
        }
    }

    // last write wins
    pub(crate) fn store_classification(
        &mut self,
        kind: ClassificationKey,
        key: String,
        field_type: FieldType,
    ) {
        let map = match kind {
            ClassificationKey::Qualified => &mut self.classifications,
            ClassificationKey::Generic => &mut self.generic_classifications,
        };
        map.insert(key, field_type);
    }

    #[must_use]
    pub fn classification_count(&self) -> usize {
        self.classifications.len() + self.generic_classifications.len()
    }

    //
    // descriptor cache
    //

    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&ClassDescriptor> {
        self.descriptors.get(name)
    }

    pub(crate) fn store_descriptor(&mut self, descriptor: ClassDescriptor) {
        self.descriptors
            .insert(descriptor.full_name.clone(), descriptor);
    }

    //
    // DTO cache
    //

    pub(crate) fn dto_slot(&self, qualified_name: &str) -> Option<&Slot> {
        self.dtos.get(qualified_name)
    }

    pub(crate) fn mark_pending(&mut self, qualified_name: &str) {
        self.dtos.insert(qualified_name.to_string(), Slot::Pending);
        self.journal.push(qualified_name.to_string());
    }

    pub(crate) fn commit_dto(&mut self, dto: DtoDefinition) {
        self.dtos
            .insert(dto.qualified_name.clone(), Slot::Ready(dto));
    }

    //
    // request journal
    //

    pub(crate) const fn begin_request(&mut self) {
        self.request_depth += 1;
    }

    /// Close a request. When the outermost request fails, every DTO and
    /// mapper created since it began is removed and their names returned.
    pub(crate) fn end_request(&mut self, succeeded: bool) -> Vec<String> {
        self.request_depth = self.request_depth.saturating_sub(1);
        if self.request_depth > 0 {
            return Vec::new();
        }

        let created = std::mem::take(&mut self.journal);
        if succeeded {
            return Vec::new();
        }

        for dto_name in &created {
            self.dtos.remove(dto_name);
            if let Some(mapper) = self.mappers.remove(dto_name) {
                self.mapper_names.remove(&mapper.qualified_name);
            }
        }

        created
    }

    /// Finished DTO by qualified name.
    #[must_use]
    pub fn dto(&self, qualified_name: &str) -> Option<&DtoDefinition> {
        match self.dtos.get(qualified_name)? {
            Slot::Ready(dto) => Some(dto),
            Slot::Pending => None,
        }
    }

    #[must_use]
    pub fn is_pending(&self, qualified_name: &str) -> bool {
        matches!(self.dtos.get(qualified_name), Some(Slot::Pending))
    }

    pub fn dtos(&self) -> impl Iterator<Item = &DtoDefinition> {
        self.dtos.values().filter_map(|slot| match slot {
            Slot::Ready(dto) => Some(dto),
            Slot::Pending => None,
        })
    }

    //
    // mapper cache
    //

    pub(crate) fn insert_mapper(&mut self, mapper: MapperDefinition) {
        self.mapper_names
            .insert(mapper.qualified_name.clone(), mapper.dto_type.clone());
        self.mappers.insert(mapper.dto_type.clone(), mapper);
    }

    pub(crate) fn mapper_for_dto_mut(&mut self, dto_name: &str) -> Option<&mut MapperDefinition> {
        self.mappers.get_mut(dto_name)
    }

    /// Mapper by its own qualified name.
    #[must_use]
    pub fn mapper(&self, qualified_name: &str) -> Option<&MapperDefinition> {
        self.mapper_names
            .get(qualified_name)
            .and_then(|dto| self.mappers.get(dto))
    }

    #[must_use]
    pub fn mapper_for_dto(&self, dto_name: &str) -> Option<&MapperDefinition> {
        self.mappers.get(dto_name)
    }

    pub fn mappers(&self) -> impl Iterator<Item = &MapperDefinition> {
        self.mappers.values()
    }

    /// Freeze the run. Pending entries (only left behind by an abandoned
    /// host-side run) are dropped along with their mappers.
    #[must_use]
    pub fn finish(self) -> SynthesisRun {
        let mut dtos = BTreeMap::new();
        for slot in self.dtos.into_values() {
            if let Slot::Ready(dto) = slot {
                dtos.insert(dto.qualified_name.clone(), dto);
            }
        }

        let mappers = self
            .mappers
            .into_values()
            .filter(|mapper| dtos.contains_key(&mapper.dto_type))
            .map(|mapper| (mapper.qualified_name.clone(), mapper))
            .collect();

        SynthesisRun { dtos, mappers }
    }
}

///
/// SynthesisRun
///
/// Frozen output of one run, handed to a renderer.
///

#[derive(Clone, Debug, Serialize)]
pub struct SynthesisRun {
    dtos: BTreeMap<String, DtoDefinition>,
    mappers: BTreeMap<String, MapperDefinition>,
}

impl SynthesisRun {
    #[must_use]
    pub fn dto(&self, qualified_name: &str) -> Option<&DtoDefinition> {
        self.dtos.get(qualified_name)
    }

    #[must_use]
    pub fn mapper(&self, qualified_name: &str) -> Option<&MapperDefinition> {
        self.mappers.get(qualified_name)
    }

    pub fn dtos(&self) -> impl Iterator<Item = &DtoDefinition> {
        self.dtos.values()
    }

    pub fn mappers(&self) -> impl Iterator<Item = &MapperDefinition> {
        self.mappers.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dtos.is_empty()
    }

    /// Canonical JSON form; maps are ordered, so equal runs render equally.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Hex SHA-256 of the canonical JSON form.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let json = self.to_json()?;
        let digest = Sha256::digest(json.as_bytes());

        Ok(hex::encode(digest))
    }
}
