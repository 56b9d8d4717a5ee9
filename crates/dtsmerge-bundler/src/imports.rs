//! Import aggregation for declarations that stay in external packages.
//!
//! A declaration is imported with exactly the forms the program already uses
//! for it: the aggregator looks at the files of every user of the
//! declaration and copies each import binding that resolves to it.

use crate::result::CollectingResult;
use crate::root::RootExports;
use dtsmerge_core::{
    same_identity, DeclarationStatement, Error, NameRef, Program, ResolutionOracle, Result,
    Statement, StatementKind, SymbolId, UnitId, UsageGraph,
};
use dtsmerge_rules::ModuleCriteria;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub struct ImportAggregator<'a> {
    program: &'a Program,
    oracle: &'a dyn ResolutionOracle,
    graph: &'a UsageGraph,
    criteria: &'a ModuleCriteria,
    root: &'a RootExports<'a>,
}

impl<'a> ImportAggregator<'a> {
    pub fn new(
        program: &'a Program,
        oracle: &'a dyn ResolutionOracle,
        graph: &'a UsageGraph,
        criteria: &'a ModuleCriteria,
        root: &'a RootExports<'a>,
    ) -> Self {
        Self {
            program,
            oracle,
            graph,
            criteria,
            root,
        }
    }

    /// Records imports for every declarator of `statement`.
    pub fn import_declaration(
        &self,
        statement: &Statement,
        decl: &DeclarationStatement,
        result: &mut CollectingResult,
    ) -> Result<()> {
        for declarator in &decl.declarators {
            let identities = self.oracle.resolve_identities(declarator.node);
            if identities.is_empty() || self.is_builtin(&identities) {
                continue;
            }
            if declarator.name.is_none() {
                return Err(Error::UnnamedDeclaration {
                    text: statement.preview(),
                });
            }

            self.collect_bindings(&identities, result)?;
        }

        let origin = &self.program.unit(statement.unit).path;
        if let Some(types_library) = self.criteria.classify(origin).types_library() {
            result.add_reference(types_library);
        }
        Ok(())
    }

    /// Records imports of a whole module (`import * as ns`, `import x = require()`).
    pub fn import_module(&self, module_symbol: SymbolId, result: &mut CollectingResult) -> Result<()> {
        let identities = self.oracle.split_merged_identity(module_symbol);
        self.collect_bindings(&identities, result)
    }

    fn is_builtin(&self, identities: &[SymbolId]) -> bool {
        identities.iter().any(|symbol| {
            self.oracle
                .declarations_of(*symbol)
                .iter()
                .any(|declaration| self.oracle.is_declared_in_builtin_library(declaration.unit))
        })
    }

    fn user_units(&self, identities: &[SymbolId]) -> Result<BTreeSet<UnitId>> {
        let mut units = BTreeSet::new();
        let mut has_users = false;
        for symbol in identities {
            let Some(users) = self.graph.users_of(*symbol) else {
                continue;
            };
            has_users = true;
            for user in users {
                units.extend(
                    self.oracle
                        .declarations_of(*user)
                        .iter()
                        .map(|declaration| declaration.unit),
                );
            }
        }

        // root exports may be reached without a user, e.g. through `export *`
        if !has_users && !self.root.contains(identities) {
            return Err(Error::MissingUsages {
                symbols: identities.to_vec(),
            });
        }
        Ok(units)
    }

    fn collect_bindings(&self, identities: &[SymbolId], result: &mut CollectingResult) -> Result<()> {
        let units = self.user_units(identities)?;
        let matches = |name: &NameRef| {
            same_identity(&self.oracle.resolve_identities(name.node), identities)
        };

        for unit in units {
            for id in &self.program.unit(unit).statements {
                let statement = self.program.statement(*id);
                match &statement.kind {
                    StatementKind::Import(import) => {
                        let default = import.default.as_ref().filter(|name| matches(*name));
                        let namespace = import.namespace.as_ref().filter(|name| matches(*name));
                        let named: Vec<String> = import
                            .named
                            .iter()
                            .filter(|named| matches(&named.local))
                            .map(|named| named.clause())
                            .collect();
                        if default.is_none() && namespace.is_none() && named.is_empty() {
                            continue;
                        }

                        let Some(specifier) = import.specifier.as_literal() else {
                            warn!(
                                "Cannot import from non-literal module specifier {} in {}",
                                import.specifier,
                                self.program.unit(unit).path.display()
                            );
                            continue;
                        };
                        debug!("Adding import from '{}': {}", specifier, statement.preview());

                        let record = result.import_record(specifier);
                        if let Some(name) = default {
                            record.default_imports.insert(name.text.clone());
                        }
                        if let Some(name) = namespace {
                            record.star_imports.insert(name.text.clone());
                        }
                        record.named_imports.extend(named);
                    }
                    StatementKind::ImportEquals(import) => {
                        let Some(specifier) = &import.specifier else {
                            continue;
                        };
                        if !matches(&import.local) {
                            continue;
                        }
                        let Some(specifier) = specifier.as_literal() else {
                            warn!(
                                "Cannot import from non-literal module specifier {} in {}",
                                specifier,
                                self.program.unit(unit).path.display()
                            );
                            continue;
                        };

                        result
                            .import_record(specifier)
                            .require_imports
                            .insert(import.local.text.clone());
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }
}
