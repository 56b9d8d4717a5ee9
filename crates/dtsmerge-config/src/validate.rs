use crate::types::{BundlerConfig, EntryPointConfig};
use thiserror::Error;

/// Validation errors for configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Entry point file path is empty")]
    EmptyEntryPath,

    #[error("Invalid UMD module name: {0}. Must be a valid identifier")]
    InvalidUmdName(String),

    #[error("Invalid library name: {0}")]
    InvalidLibraryName(String),
}

/// Validate every entry of a configuration
pub fn validate_config(config: &BundlerConfig) -> Result<(), ValidationError> {
    config.entries.iter().try_for_each(validate_entry)
}

/// Validate a single entry point
pub fn validate_entry(entry: &EntryPointConfig) -> Result<(), ValidationError> {
    if entry.file_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyEntryPath);
    }

    if let Some(name) = &entry.output.umd_module_name {
        validate_umd_name(name)?;
    }

    let libraries = &entry.libraries;
    let all = libraries
        .inlined_libraries
        .iter()
        .chain(libraries.imported_libraries.iter().flatten())
        .chain(libraries.allowed_types_libraries.iter().flatten());
    for name in all {
        validate_library_name(name)?;
    }

    Ok(())
}

/// Validate a UMD global name
///
/// The name must:
/// - Be non-empty
/// - Start with a letter, `_` or `$`
/// - Continue with letters, digits, `_` or `$`
pub fn validate_umd_name(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };

    if !valid {
        return Err(ValidationError::InvalidUmdName(name.to_string()));
    }

    Ok(())
}

/// Validate an npm package name, plain or scoped (`@scope/name`)
pub fn validate_library_name(name: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidLibraryName(name.to_string());

    if name.is_empty() || name.len() > 214 {
        return Err(invalid());
    }

    let segments: Vec<&str> = match name.strip_prefix('@') {
        Some(scoped) => scoped.split('/').collect(),
        None => vec![name],
    };
    if name.starts_with('@') && segments.len() != 2 {
        return Err(invalid());
    }

    for segment in segments {
        if segment.is_empty() || segment.starts_with('.') || segment.starts_with('_') {
            return Err(invalid());
        }
        let url_safe = segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'));
        if !url_safe {
            return Err(invalid());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_umd_names() {
        assert!(validate_umd_name("MyLib").is_ok());
        assert!(validate_umd_name("_private").is_ok());
        assert!(validate_umd_name("$jq").is_ok());
        assert!(validate_umd_name("lib2").is_ok());
    }

    #[test]
    fn test_invalid_umd_names() {
        assert!(validate_umd_name("").is_err());
        assert!(validate_umd_name("2lib").is_err());
        assert!(validate_umd_name("my-lib").is_err());
        assert!(validate_umd_name("has space").is_err());
    }

    #[test]
    fn test_valid_library_names() {
        assert!(validate_library_name("react").is_ok());
        assert!(validate_library_name("@types/node").is_ok());
        assert!(validate_library_name("lodash.merge").is_ok());
        assert!(validate_library_name("@scope/pkg-name").is_ok());
    }

    #[test]
    fn test_invalid_library_names() {
        assert!(validate_library_name("").is_err());
        assert!(validate_library_name("@scope").is_err());
        assert!(validate_library_name("@scope/a/b").is_err());
        assert!(validate_library_name(".hidden").is_err());
        assert!(validate_library_name("_private").is_err());
        assert!(validate_library_name("has space").is_err());
        assert!(validate_library_name(&"a".repeat(215)).is_err());
    }

    #[test]
    fn test_entry_checks_every_list() {
        let mut entry = EntryPointConfig::new("index.ts");
        assert!(validate_entry(&entry).is_ok());

        entry.libraries.allowed_types_libraries = Some(vec!["bad name".to_string()]);
        assert_eq!(
            validate_entry(&entry),
            Err(ValidationError::InvalidLibraryName("bad name".to_string()))
        );
    }

    #[test]
    fn test_empty_entry_path() {
        let entry = EntryPointConfig::new("");
        assert_eq!(validate_entry(&entry), Err(ValidationError::EmptyEntryPath));
    }
}
