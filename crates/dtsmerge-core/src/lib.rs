//! dtsmerge Core - program model and reachability primitives.
//!
//! This crate provides the foundational types for merging a program's public
//! type surface into a single declaration file. It defines:
//!
//! - [`Program`], [`SourceUnit`] and [`Statement`]: the parsed view of a project
//! - [`ResolutionOracle`]: the name-resolution capability the bundler consumes
//! - [`UsageGraph`]: the type-level "is used by" relation between symbols
//! - [`MemoryOracle`] and [`ProgramBuilder`]: an in-memory implementation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ parser (external)│  (Program + oracle)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │  dtsmerge-core   │  (This crate - model, oracle, usage graph)
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │ dtsmerge-bundler │  (collection, imports, rendering)
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use dtsmerge_core::{DeclarationSpec, ProgramBuilder, UsageGraph};
//!
//! let mut builder = ProgramBuilder::new();
//! let unit = builder.unit("/project/src/index.ts");
//! let (foo, bar) = (builder.symbol(), builder.symbol());
//! builder.declare(unit, DeclarationSpec::interface("Bar", bar));
//! builder.declare(unit, DeclarationSpec::interface("Foo", foo).exported().uses("Bar", bar));
//!
//! let (program, oracle) = builder.build();
//! let graph = UsageGraph::build(&program, &oracle);
//! assert!(graph.is_used_by(bar, foo));
//! ```

pub mod error;
pub mod memory;
pub mod oracle;
pub mod types;
pub mod usage_graph;
pub mod validation;

// Re-export core types for convenience
pub use error::{Error, Result};
pub use memory::{DeclarationSpec, ExportSpec, ImportSpec, MemoryOracle, ProgramBuilder, Scope};
pub use oracle::{same_identity, ResolutionOracle};
pub use types::{
    AmbientModule, Declaration, DeclarationKind, DeclarationStatement, Declarator,
    ExportAssignment, ExportDeclaration, ExportSpecifier, ExportedSymbol, GlobalAugmentation,
    ImportEqualsStatement, ImportStatement, ModuleSpecifier, NameRef, NamedImport, NodeId,
    Program, SourceUnit, Statement, StatementKind, StmtId, SymbolId, UnitId,
};
pub use usage_graph::UsageGraph;
pub use validation::validate_no_classes;
