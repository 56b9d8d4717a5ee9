//! dtsmerge Rules - module classification
//!
//! Decides, for every source file of a program, how its declarations reach
//! the bundled output. The decision is a pure function of the file path and
//! the entry point's library options.
//!
//! # Example
//!
//! ```
//! use dtsmerge_config::LibrariesOptions;
//! use dtsmerge_rules::{Disposition, ModuleCriteria};
//!
//! let libraries = LibrariesOptions {
//!     inlined_libraries: vec!["my-utils".to_string()],
//!     ..Default::default()
//! };
//! let criteria = ModuleCriteria::new(&libraries, &[]);
//!
//! let info = criteria.classify_str("/app/node_modules/my-utils/index.d.ts");
//! assert_eq!(info.disposition, Disposition::Inline);
//! assert!(info.is_external);
//! ```

pub mod classifier;
pub mod constants;
pub mod library;

pub use classifier::{classify, Disposition, ModuleCriteria, ModuleInfo};
pub use constants::*;
pub use library::{library_name, normalize_path, types_library_name};
