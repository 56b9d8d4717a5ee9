//! Path markers shared by library detection and classification

/// Directory segment that marks a path as belonging to a dependency package.
pub const NODE_MODULES: &str = "node_modules/";

/// Scope of companion type-only packages.
///
/// A package `@types/<name>` carries declarations for the runtime package
/// `<name>` and is referenced by directive instead of imported.
pub const TYPES_SCOPE: &str = "@types/";
