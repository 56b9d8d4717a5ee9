//! The entry point's exported surface.

use crate::output::RenderHelpers;
use dtsmerge_config::OutputOptions;
use dtsmerge_core::{
    same_identity, DeclarationKind, Program, ResolutionOracle, Statement, SymbolId, UnitId,
};

/// Root unit exports with their identities split, queried while collecting
/// and rendering.
#[derive(Debug)]
pub struct RootExports<'a> {
    oracle: &'a dyn ResolutionOracle,
    unit: UnitId,
    module: Vec<SymbolId>,
    exports: Vec<(String, Vec<SymbolId>)>,
    strip_const_enums: bool,
}

impl<'a> RootExports<'a> {
    pub fn new(
        program: &Program,
        oracle: &'a dyn ResolutionOracle,
        unit: UnitId,
        module_symbol: SymbolId,
        output: &OutputOptions,
    ) -> Self {
        let exports = oracle
            .exports_of(unit)
            .into_iter()
            .map(|export| {
                (
                    export.exported_name,
                    oracle.split_merged_identity(export.symbol),
                )
            })
            .collect();

        Self {
            oracle,
            unit,
            module: oracle.split_merged_identity(module_symbol),
            exports,
            strip_const_enums: program.preserve_const_enums && output.respect_preserve_const_enum,
        }
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    /// Reachability roots: the module itself and every exported identity.
    pub fn identities(&self) -> Vec<SymbolId> {
        self.module
            .iter()
            .chain(self.exports.iter().flat_map(|(_, identities)| identities))
            .copied()
            .collect()
    }

    pub fn is_exported(&self, identities: &[SymbolId]) -> bool {
        self.exports
            .iter()
            .any(|(_, exported)| same_identity(exported, identities))
    }

    pub fn is_exported_as(&self, identities: &[SymbolId], name: &str) -> bool {
        self.exports
            .iter()
            .any(|(exported_name, exported)| exported_name == name && same_identity(exported, identities))
    }

    /// Exported identities and the root module itself.
    pub fn contains(&self, identities: &[SymbolId]) -> bool {
        same_identity(&self.module, identities) || self.is_exported(identities)
    }

    fn declared(&self, statement: &Statement) -> Vec<SymbolId> {
        statement
            .as_declaration()
            .map(|decl| {
                decl.declarators
                    .iter()
                    .flat_map(|declarator| self.oracle.resolve_identities(declarator.node))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl RenderHelpers for RootExports<'_> {
    fn needs_export_keyword(&self, statement: &Statement) -> bool {
        let Some(decl) = statement.as_declaration() else {
            return false;
        };
        if !decl.kind.is_value() {
            return true;
        }

        // `declare const a, b;` is exported when any declarator is
        let under_own_name = decl.declarators.iter().any(|declarator| {
            declarator.name.as_deref().is_some_and(|name| {
                self.is_exported_as(&self.oracle.resolve_identities(declarator.node), name)
            })
        });
        under_own_name
            || (decl.has_default && self.is_exported_as(&self.declared(statement), "default"))
    }

    fn should_strip_const(&self, statement: &Statement) -> bool {
        let is_const_enum = matches!(
            statement.as_declaration().map(|decl| decl.kind),
            Some(DeclarationKind::Enum { is_const: true })
        );
        is_const_enum && self.strip_const_enums && self.is_exported(&self.declared(statement))
    }

    fn should_strip_default(&self, statement: &Statement) -> bool {
        let has_default = statement
            .as_declaration()
            .is_some_and(|decl| decl.has_default);
        has_default && !self.is_exported_as(&self.declared(statement), "default")
    }
}
