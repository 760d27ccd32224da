use crate::Error;
use decomp_schema::{SchemaError, catalog::TypeCatalog, validate::validate_catalog};
use std::{fs, path::Path};

/// Read a catalog JSON file, merge it over the platform table and validate it.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<TypeCatalog, Error> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_catalog(&source).map_err(|err| match err {
        Error::Catalog { source, .. } => Error::Catalog {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })
}

/// Parse a catalog JSON document, merge it over the platform table and
/// validate it.
///
/// External types that repeat a platform entry are skipped, so upstream
/// exports may list them freely.
pub fn parse_catalog(source: &str) -> Result<TypeCatalog, Error> {
    let parsed: TypeCatalog = serde_json::from_str(source).map_err(|source| Error::Catalog {
        path: "<inline>".to_string(),
        source,
    })?;

    let platform = TypeCatalog::with_platform_types();
    let mut catalog = platform.clone();
    for decl in parsed.types() {
        catalog.insert(decl.clone());
    }
    for ext in parsed.external_types() {
        if platform.external(&ext.name).is_none() {
            catalog.insert_external(ext.clone());
        }
    }

    validate_catalog(&catalog).map_err(SchemaError::Validation)?;

    Ok(catalog)
}
