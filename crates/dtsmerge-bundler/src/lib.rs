//! Declaration bundling on top of `dtsmerge-core`.
//!
//! For each entry point the bundler walks every source unit of the program,
//! keeps the statements the entry's exports reach, and decides per module
//! whether they are inlined, imported from their package, or referenced with
//! a `/// <reference types>` directive. The resulting [`CollectingResult`] is
//! turned into text by an [`OutputRenderer`], [`DtsRenderer`] by default.
//!
//! # Example
//!
//! ```
//! use dtsmerge_bundler::bundle_all;
//! use dtsmerge_config::EntryPointConfig;
//! use dtsmerge_core::{DeclarationSpec, ProgramBuilder};
//!
//! let mut builder = ProgramBuilder::new();
//! let index = builder.unit("/project/src/index.ts");
//! let foo = builder.symbol();
//! builder.declare(index, DeclarationSpec::interface("Foo", foo).exported());
//! builder.export(index, "Foo", foo);
//! let (program, oracle) = builder.build();
//!
//! let entries = vec![
//!     EntryPointConfig::new("/project/src/index.ts"),
//!     EntryPointConfig::new("/project/src/missing.ts"),
//! ];
//! let outputs = bundle_all(&program, &oracle, &entries);
//! assert!(outputs[0].as_ref().unwrap().contains("export interface Foo {}"));
//! assert!(outputs[1].is_err());
//! ```

pub mod bundler;
pub mod collector;
pub mod imports;
pub mod output;
pub mod result;
pub mod root;

pub use bundler::{bundle_all, Bundler, CollectedEntry};
pub use collector::{Collector, UpdateContext};
pub use imports::ImportAggregator;
pub use output::{DtsRenderer, OutputRenderer, RenderHelpers};
pub use result::{CollectingResult, ImportRecord, Placement};
pub use root::RootExports;
