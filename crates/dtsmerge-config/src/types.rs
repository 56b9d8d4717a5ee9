use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration: one bundle per entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BundlerConfig {
    #[serde(default)]
    pub entries: Vec<EntryPointConfig>,
}

/// Options for a single entry point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryPointConfig {
    /// Entry file, as listed in the program's root files
    pub file_path: PathBuf,

    /// Fail the bundle if any class declaration would be inlined
    #[serde(default)]
    pub fail_on_class: bool,

    #[serde(default)]
    pub libraries: LibrariesOptions,

    #[serde(default)]
    pub output: OutputOptions,
}

impl EntryPointConfig {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            fail_on_class: false,
            libraries: LibrariesOptions::default(),
            output: OutputOptions::default(),
        }
    }
}

/// How declarations from dependency packages are treated.
///
/// Package names are npm names; `@types/<name>` companions may be listed
/// under either name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LibrariesOptions {
    /// Packages whose declarations are copied into the output
    #[serde(default)]
    pub inlined_libraries: Vec<String>,

    /// Packages imported from the output.
    ///
    /// A listed `@types` package is imported instead of referenced. Packages
    /// no list names are imported as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_libraries: Option<Vec<String>>,

    /// Companion `@types` packages allowed as reference directives.
    ///
    /// `None` allows every companion package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_types_libraries: Option<Vec<String>>,
}

/// Rendering switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputOptions {
    /// Sort emitted statements by text
    pub sort_nodes: bool,

    /// Emit `export as namespace <name>;`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub umd_module_name: Option<String>,

    /// Keep `declare global { }` blocks from inlined modules
    pub inline_declare_global: bool,

    /// Keep `declare module "pkg"` blocks for external packages found in local files
    pub inline_declare_externals: bool,

    /// Omit the generated-by banner
    pub no_banner: bool,

    /// Drop `const` from exported const enums when the program preserves them
    pub respect_preserve_const_enum: bool,
}
