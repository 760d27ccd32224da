use crate::{model::TypeModel, platform::platform_types, prelude::*};
use std::collections::BTreeMap;

///
/// CatalogModel
/// serialized form of a catalog, as handed over by the upstream analysis
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct CatalogModel {
    #[serde(default)]
    types: Vec<TypeDecl>,

    #[serde(default)]
    external: Vec<ExternalType>,
}

///
/// TypeCatalog
///
/// In-memory `TypeModel`: local declarations plus known external types.
/// Lookups go through name indexes; the first entry wins on duplicates, which
/// `validate::validate_catalog` reports.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(from = "CatalogModel", into = "CatalogModel")]
pub struct TypeCatalog {
    types: Vec<TypeDecl>,
    external: Vec<ExternalType>,
    type_index: BTreeMap<String, usize>,
    external_index: BTreeMap<String, usize>,
}

impl TypeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the platform capability table.
    #[must_use]
    pub fn with_platform_types() -> Self {
        let mut catalog = Self::new();
        for ext in platform_types() {
            catalog.insert_external(ext);
        }

        catalog
    }

    pub fn insert(&mut self, decl: TypeDecl) {
        self.type_index
            .entry(decl.name.clone())
            .or_insert(self.types.len());
        self.types.push(decl);
    }

    pub fn insert_external(&mut self, ext: ExternalType) {
        self.external_index
            .entry(ext.name.clone())
            .or_insert(self.external.len());
        self.external.push(ext);
    }

    #[must_use]
    pub fn with(mut self, decl: TypeDecl) -> Self {
        self.insert(decl);
        self
    }

    #[must_use]
    pub fn with_external(mut self, ext: ExternalType) -> Self {
        self.insert_external(ext);
        self
    }

    /// Extend with another catalog's entries (e.g. platform table + upstream file).
    pub fn extend(&mut self, other: Self) {
        for decl in other.types {
            self.insert(decl);
        }
        for ext in other.external {
            self.insert_external(ext);
        }
    }

    #[must_use]
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    #[must_use]
    pub fn external_types(&self) -> &[ExternalType] {
        &self.external
    }

    #[must_use]
    pub fn external(&self, name: &str) -> Option<&ExternalType> {
        self.external_index.get(name).map(|&i| &self.external[i])
    }

    /// Local type names in name order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.type_index.keys().map(String::as_str)
    }
}

impl TypeModel for TypeCatalog {
    fn declaration(&self, name: &str) -> Option<&TypeDecl> {
        self.type_index.get(name).map(|&i| &self.types[i])
    }

    fn supertypes(&self, name: &str) -> Option<&[String]> {
        self.declaration(name)
            .map(|decl| decl.supertypes.as_slice())
            .or_else(|| self.external(name).map(|ext| ext.supertypes.as_slice()))
    }
}

impl From<CatalogModel> for TypeCatalog {
    fn from(model: CatalogModel) -> Self {
        let mut catalog = Self::new();
        for decl in model.types {
            catalog.insert(decl);
        }
        for ext in model.external {
            catalog.insert_external(ext);
        }

        catalog
    }
}

impl From<TypeCatalog> for CatalogModel {
    fn from(catalog: TypeCatalog) -> Self {
        Self {
            types: catalog.types,
            external: catalog.external,
        }
    }
}
