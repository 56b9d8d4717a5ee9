//! Module classification under per-entry library rules.
//!
//! Precedence, first match wins:
//!
//! 1. local project file (no `node_modules/` segment, not under a type root) -> `Inline`
//! 2. package in the inline list -> `Inline`
//! 3. package in the import list -> `Import`
//! 4. `@types` companion, allowed by the allow-list (if any) -> `ReferenceAsTypes`
//! 5. anything else -> `Import`
//!
//! Files under a configured type root are treated as if they lived at
//! `node_modules/@types/<relative path>`.
//!
//! The target of a nested `declare module "x"` block that belongs to another
//! package is classified with [`ModuleCriteria::classify_nested`]: there rule 5
//! yields `ModuleOnly`, so the block's own members are never emitted.

use crate::constants::{NODE_MODULES, TYPES_SCOPE};
use crate::library::{library_name, normalize_path};
use dtsmerge_config::LibrariesOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How declarations from a module are placed in the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Disposition {
    /// Copied into the output
    Inline,
    /// Imported from the package by the output
    Import,
    /// Pulled in with `/// <reference types="..." />`
    ReferenceAsTypes { types_library: String },
    /// Only nested `declare module` blocks are examined
    ModuleOnly,
}

/// Classification of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub disposition: Disposition,
    /// Normalized path (forward slashes) of the classified file
    pub file_name: String,
    /// Whether the file belongs to a dependency package
    pub is_external: bool,
}

impl ModuleInfo {
    pub fn is_inline(&self) -> bool {
        self.disposition == Disposition::Inline
    }

    pub fn is_import(&self) -> bool {
        self.disposition == Disposition::Import
    }

    /// The companion package name when the module is referenced by directive.
    pub fn types_library(&self) -> Option<&str> {
        match &self.disposition {
            Disposition::ReferenceAsTypes { types_library } => Some(types_library),
            _ => None,
        }
    }
}

/// Per-entry library rules, built once and queried for every file.
#[derive(Debug, Clone, Default)]
pub struct ModuleCriteria {
    inlined_libraries: Vec<String>,
    imported_libraries: Option<Vec<String>>,
    allowed_types_libraries: Option<Vec<String>>,
    /// Normalized type roots, each ending with `/`
    type_roots: Vec<String>,
}

impl ModuleCriteria {
    pub fn new(libraries: &LibrariesOptions, type_roots: &[PathBuf]) -> Self {
        Self {
            inlined_libraries: libraries.inlined_libraries.clone(),
            imported_libraries: libraries.imported_libraries.clone(),
            allowed_types_libraries: libraries.allowed_types_libraries.clone(),
            type_roots: type_roots
                .iter()
                .map(|root| {
                    let mut root = normalize_path(&root.to_string_lossy());
                    if !root.ends_with('/') {
                        root.push('/');
                    }
                    root
                })
                .collect(),
        }
    }

    /// Classifies the file at `path`.
    pub fn classify(&self, path: &Path) -> ModuleInfo {
        self.classify_str(&path.to_string_lossy())
    }

    pub fn classify_str(&self, path: &str) -> ModuleInfo {
        self.classify_with(path, Disposition::Import)
    }

    /// Classifies the target of a nested module declaration.
    pub fn classify_nested(&self, path: &Path) -> ModuleInfo {
        self.classify_nested_str(&path.to_string_lossy())
    }

    pub fn classify_nested_str(&self, path: &str) -> ModuleInfo {
        self.classify_with(path, Disposition::ModuleOnly)
    }

    fn classify_with(&self, path: &str, unlisted: Disposition) -> ModuleInfo {
        let file_name = normalize_path(path);
        let package = library_name(&file_name).or_else(|| {
            self.remap_type_root(&file_name)
                .and_then(|remapped| library_name(&remapped))
        });

        let disposition = match &package {
            None => {
                return ModuleInfo {
                    disposition: Disposition::Inline,
                    file_name,
                    is_external: false,
                }
            }
            Some(package) => self.listed_disposition(package).unwrap_or(unlisted),
        };

        ModuleInfo {
            disposition,
            file_name,
            is_external: true,
        }
    }

    fn remap_type_root(&self, file_name: &str) -> Option<String> {
        self.type_roots.iter().find_map(|root| {
            file_name
                .strip_prefix(root.as_str())
                .map(|relative| format!("{}{}{}", NODE_MODULES, TYPES_SCOPE, relative))
        })
    }

    /// Rules 2 to 4; `None` when no rule names the package.
    fn listed_disposition(&self, package: &str) -> Option<Disposition> {
        let types_library = package.strip_prefix(TYPES_SCOPE);
        let listed = |list: &[String]| {
            list.iter()
                .any(|name| name == package || Some(name.as_str()) == types_library)
        };

        if listed(&self.inlined_libraries) {
            return Some(Disposition::Inline);
        }

        if let Some(imported) = &self.imported_libraries {
            if listed(imported) {
                return Some(Disposition::Import);
            }
        }

        if let Some(types_library) = types_library {
            let allowed = self
                .allowed_types_libraries
                .as_deref()
                .map_or(true, listed);
            if allowed {
                return Some(Disposition::ReferenceAsTypes {
                    types_library: types_library.to_string(),
                });
            }
        }
        None
    }
}

/// Classifies `path` under `criteria`.
pub fn classify(path: &Path, criteria: &ModuleCriteria) -> ModuleInfo {
    criteria.classify(path)
}
