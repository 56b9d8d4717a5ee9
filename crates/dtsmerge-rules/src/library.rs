//! Package-name extraction from file paths.

use crate::constants::{NODE_MODULES, TYPES_SCOPE};
use regex::Regex;
use std::sync::LazyLock;

/// Package directory directly after `node_modules/`: `@scope/name` or `name`.
static PACKAGE_DIR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(@[^/]+/[^/]+|[^/@][^/]*)/").ok());

/// Converts Windows separators so every path is matched in one form.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// The npm package a file belongs to, taken from its last `node_modules/` segment.
///
/// ```
/// use dtsmerge_rules::library_name;
///
/// assert_eq!(library_name("/p/node_modules/react/index.d.ts").as_deref(), Some("react"));
/// assert_eq!(library_name("/p/node_modules/@types/node/fs.d.ts").as_deref(), Some("@types/node"));
/// assert_eq!(library_name("/p/src/index.ts"), None);
/// ```
pub fn library_name(path: &str) -> Option<String> {
    let path = normalize_path(path);
    let start = path.rfind(NODE_MODULES)? + NODE_MODULES.len();
    let pattern = PACKAGE_DIR.as_ref()?;
    pattern
        .captures(&path[start..])
        .and_then(|captures| captures.get(1))
        .map(|package| package.as_str().to_string())
}

/// The runtime package name of a companion `@types/<name>` file.
pub fn types_library_name(path: &str) -> Option<String> {
    library_name(path)?
        .strip_prefix(TYPES_SCOPE)
        .map(str::to_string)
}
