//! Name-resolution oracle consumed by the bundler.

use crate::types::{Declaration, ExportedSymbol, NodeId, SymbolId, UnitId};
use std::fmt;

/// Resolution capability injected by the parsing collaborator.
///
/// The oracle is the sole authority on declaration identity: merged
/// declarations resolve to one [`SymbolId`], and composite identities are
/// broken up by [`split_merged_identity`](Self::split_merged_identity).
/// Implementations are expected to resolve aliases, so an import binding
/// resolves to the symbol it ultimately names.
///
/// # Examples
///
/// ```
/// use dtsmerge_core::{ProgramBuilder, ResolutionOracle};
///
/// let mut builder = ProgramBuilder::new();
/// let unit = builder.unit("/project/src/index.ts");
/// let (_program, oracle) = builder.build();
///
/// assert!(oracle.module_symbol(unit).is_some());
/// assert!(!oracle.is_declared_in_builtin_library(unit));
/// ```
pub trait ResolutionOracle: fmt::Debug {
    /// Resolves a name occurrence to the symbol it identifies.
    fn resolve_symbol(&self, node: NodeId) -> Option<SymbolId>;

    /// All declarations of a symbol, in declaration order.
    fn declarations_of(&self, symbol: SymbolId) -> Vec<Declaration>;

    /// Names exported from a unit, following re-exports.
    fn exports_of(&self, unit: UnitId) -> Vec<ExportedSymbol>;

    /// The symbol of the unit itself; `None` for non-module scripts.
    fn module_symbol(&self, unit: UnitId) -> Option<SymbolId>;

    /// Resolves a module specifier as written in `from` to the unit it names.
    fn resolve_module(&self, from: UnitId, specifier: &str) -> Option<UnitId>;

    /// Whether a unit belongs to the built-in standard declarations.
    fn is_declared_in_builtin_library(&self, unit: UnitId) -> bool;

    /// Splits a transient composite identity into its constituents.
    fn split_merged_identity(&self, symbol: SymbolId) -> Vec<SymbolId> {
        vec![symbol]
    }

    /// Resolves a node and splits the result; empty when unresolvable.
    fn resolve_identities(&self, node: NodeId) -> Vec<SymbolId> {
        self.resolve_symbol(node)
            .map(|symbol| self.split_merged_identity(symbol))
            .unwrap_or_default()
    }
}

/// Identity equality over possibly merged identities: any member of `a`
/// equals any member of `b`.
pub fn same_identity(a: &[SymbolId], b: &[SymbolId]) -> bool {
    a.iter().any(|symbol| b.contains(symbol))
}
