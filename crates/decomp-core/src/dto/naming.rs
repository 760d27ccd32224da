use decomp_config::NamingConfig;
use decomp_schema::types::TypeRef;

/// Package DTOs are placed in. Targets that already name the DTO segment are
/// used as they are.
#[must_use]
pub fn dto_package(target: &str, naming: &NamingConfig) -> String {
    let segment = naming.dto_package.as_str();
    let target = target.trim_matches('.');

    if target.is_empty() {
        return segment.to_string();
    }
    if target == segment || target.ends_with(&format!(".{segment}")) {
        return target.to_string();
    }

    format!("{target}.{segment}")
}

/// Sibling mapper package of a DTO package.
#[must_use]
pub fn mapper_package(dto_package: &str, naming: &NamingConfig) -> String {
    match dto_package.rsplit_once('.') {
        Some((parent, _)) => format!("{parent}.{}", naming.mapper_package),
        None => naming.mapper_package.clone(),
    }
}

#[must_use]
pub fn dto_simple_name(source_simple: &str, naming: &NamingConfig) -> String {
    format!("{}{source_simple}{}", naming.class_prefix, naming.dto_suffix)
}

#[must_use]
pub fn mapper_simple_name(source_simple: &str, naming: &NamingConfig) -> String {
    format!("{}{source_simple}{}", naming.class_prefix, naming.mapper_suffix)
}

#[must_use]
pub fn qualify(package: &str, simple: &str) -> String {
    if package.is_empty() {
        simple.to_string()
    } else {
        format!("{package}.{simple}")
    }
}

/// Upper-case the first character only.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `isX` for primitive booleans, `getX` otherwise.
#[must_use]
pub fn getter_name(field: &str, ty: &TypeRef) -> String {
    let prefix = if ty.is_boolean() { "is" } else { "get" };

    format!("{prefix}{}", capitalize(field))
}

#[must_use]
pub fn setter_name(field: &str) -> String {
    format!("set{}", capitalize(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_package_appends_segment_once() {
        let naming = NamingConfig::default();

        assert_eq!(dto_package("com.example", &naming), "com.example.dto");
        assert_eq!(dto_package("com.example.dto", &naming), "com.example.dto");
        assert_eq!(dto_package("dto", &naming), "dto");
        assert_eq!(dto_package("", &naming), "dto");
        assert_eq!(dto_package("com.dtos", &naming), "com.dtos.dto");
    }

    #[test]
    fn mapper_package_is_a_sibling() {
        let naming = NamingConfig::default();

        assert_eq!(mapper_package("com.example.dto", &naming), "com.example.mapper");
        assert_eq!(mapper_package("dto", &naming), "mapper");
    }

    #[test]
    fn prefix_applies_to_both_names() {
        let naming = NamingConfig {
            class_prefix: "Svc".to_string(),
            ..NamingConfig::default()
        };

        assert_eq!(dto_simple_name("Person", &naming), "SvcPersonDTO");
        assert_eq!(mapper_simple_name("Person", &naming), "SvcPersonMapper");
    }

    #[test]
    fn accessor_names() {
        let boolean = TypeRef::parse("boolean").unwrap();
        let boxed = TypeRef::parse("java.lang.Boolean").unwrap();
        let text = TypeRef::parse("java.lang.String").unwrap();

        assert_eq!(getter_name("active", &boolean), "isActive");
        assert_eq!(getter_name("active", &boxed), "getActive");
        assert_eq!(getter_name("name", &text), "getName");
        assert_eq!(setter_name("name"), "setName");
        assert_eq!(setter_name("x"), "setX");
        assert_eq!(capitalize(""), "");
    }
}
