//! Statement collection: decides which statements of each unit reach the
//! output and in what form.

use crate::imports::ImportAggregator;
use crate::result::{CollectingResult, Placement};
use crate::root::RootExports;
use dtsmerge_config::OutputOptions;
use dtsmerge_core::{
    AmbientModule, DeclarationKind, DeclarationStatement, ExportAssignment, ExportDeclaration,
    Program, ResolutionOracle, Result, SourceUnit, Statement, StatementKind, StmtId, SymbolId,
    UsageGraph,
};
use dtsmerge_rules::{library_name, Disposition, ModuleCriteria, ModuleInfo, NODE_MODULES};
use rustc_hash::FxHashSet;
use tracing::debug;

/// The module a statement list is read under, rebuilt per nesting level.
#[derive(Debug, Clone)]
pub struct UpdateContext<'s> {
    pub module: ModuleInfo,
    pub statements: &'s [StmtId],
}

/// Walks source units for one entry point.
pub struct Collector<'a> {
    program: &'a Program,
    oracle: &'a dyn ResolutionOracle,
    criteria: &'a ModuleCriteria,
    output: &'a OutputOptions,
    imports: ImportAggregator<'a>,
    reachable: FxHashSet<SymbolId>,
}

impl<'a> Collector<'a> {
    pub fn new(
        program: &'a Program,
        oracle: &'a dyn ResolutionOracle,
        graph: &'a UsageGraph,
        criteria: &'a ModuleCriteria,
        output: &'a OutputOptions,
        root: &'a RootExports<'a>,
    ) -> Self {
        let reachable = graph.reachable_from(&root.identities());
        Self {
            program,
            oracle,
            criteria,
            output,
            imports: ImportAggregator::new(program, oracle, graph, criteria, root),
            reachable,
        }
    }

    /// Whether any of `identities` is used by the entry point's exports.
    pub fn is_reachable(&self, identities: &[SymbolId]) -> bool {
        identities
            .iter()
            .any(|symbol| self.reachable.contains(symbol))
    }

    /// Collects one unit's top-level statements.
    pub fn collect_unit(&self, unit: &SourceUnit, result: &mut CollectingResult) -> Result<()> {
        let module = self.criteria.classify(&unit.path);
        debug!(
            "Processing {} ({:?})",
            unit.path.display(),
            module.disposition
        );

        let import_whole_module = module.is_import();
        self.update(
            UpdateContext {
                module,
                statements: &unit.statements,
            },
            result,
        )?;

        if import_whole_module {
            if let Some(module_symbol) = self.oracle.module_symbol(unit.id) {
                let identities = self.oracle.split_merged_identity(module_symbol);
                if self.is_reachable(&identities) {
                    self.imports.import_module(module_symbol, result)?;
                    result.mark(&identities, Placement::Import);
                }
            }
        }
        Ok(())
    }

    /// Applies the collection steps to every statement of `context`.
    pub fn update(&self, context: UpdateContext<'_>, result: &mut CollectingResult) -> Result<()> {
        for id in context.statements {
            let statement = self.program.statement(*id);
            match &statement.kind {
                StatementKind::Import(_)
                | StatementKind::ImportEquals(_)
                | StatementKind::ExportDeclaration(_) => {}
                StatementKind::AmbientModule(module) => {
                    self.update_ambient_module(&context, statement, module, result)?;
                }
                _ if context.module.disposition == Disposition::ModuleOnly => {}
                StatementKind::GlobalAugmentation(_) => {
                    if self.output.inline_declare_global && context.module.is_inline() {
                        result.push_verbatim(statement.id);
                    }
                }
                StatementKind::ExportAssignment(assignment) => {
                    self.update_export_assignment(&context, statement, assignment, result)?;
                }
                StatementKind::Declaration(decl) => {
                    self.update_declaration(&context, statement, decl, result)?;
                }
                StatementKind::Other => {}
            }
        }
        Ok(())
    }

    fn update_ambient_module(
        &self,
        context: &UpdateContext<'_>,
        statement: &Statement,
        module: &AmbientModule,
        result: &mut CollectingResult,
    ) -> Result<()> {
        let target = match self.oracle.resolve_module(statement.unit, &module.name) {
            Some(unit) => {
                let path = &self.program.unit(unit).path;
                let target = self.criteria.classify(path);
                if target.is_external
                    && library_name(&target.file_name) != library_name(&context.module.file_name)
                {
                    self.criteria.classify_nested(path)
                } else {
                    target
                }
            }
            None => self
                .criteria
                .classify_str(&format!("{}{}/", NODE_MODULES, module.name)),
        };

        if !context.module.is_external && target.is_external {
            if self.output.inline_declare_externals {
                result.push_verbatim(statement.id);
            } else {
                debug!("Skip external module declaration '{}'", module.name);
            }
            return Ok(());
        }

        match &module.body {
            Some(body) => self.update(
                UpdateContext {
                    module: target,
                    statements: body,
                },
                result,
            ),
            None => Ok(()),
        }
    }

    /// `export = NS` re-exports the namespace body as if it were top level.
    fn update_export_assignment(
        &self,
        context: &UpdateContext<'_>,
        statement: &Statement,
        assignment: &ExportAssignment,
        result: &mut CollectingResult,
    ) -> Result<()> {
        if !assignment.is_export_equals || !context.module.is_import() {
            return Ok(());
        }
        let Some(expression) = &assignment.expression else {
            return Ok(());
        };

        for symbol in self.oracle.resolve_identities(expression.node) {
            for declaration in self.oracle.declarations_of(symbol) {
                let Some(id) = declaration.statement else {
                    continue;
                };
                let target = self.program.statement(id);
                let Some(namespace) = target.as_declaration() else {
                    continue;
                };
                if namespace.kind != DeclarationKind::Namespace || target.unit != statement.unit {
                    continue;
                }

                self.update(
                    UpdateContext {
                        module: context.module.clone(),
                        statements: &namespace.body,
                    },
                    result,
                )?;
            }
        }
        Ok(())
    }

    fn update_declaration(
        &self,
        context: &UpdateContext<'_>,
        statement: &Statement,
        decl: &DeclarationStatement,
        result: &mut CollectingResult,
    ) -> Result<()> {
        let identities: Vec<SymbolId> = decl
            .declarators
            .iter()
            .flat_map(|declarator| self.oracle.resolve_identities(declarator.node))
            .collect();

        if !self.is_reachable(&identities) {
            debug!("Skip file member: {}", statement.preview());
            return Ok(());
        }

        match &context.module.disposition {
            Disposition::ReferenceAsTypes { types_library } => {
                if !result.conflicts(&identities, Placement::Reference) {
                    result.add_reference(types_library);
                    result.mark(&identities, Placement::Reference);
                }
            }
            Disposition::Import => {
                if !result.conflicts(&identities, Placement::Import) {
                    self.imports.import_declaration(statement, decl, result)?;
                    result.mark(&identities, Placement::Import);
                }
            }
            Disposition::Inline => {
                if !result.conflicts(&identities, Placement::Inline) {
                    result.inline(statement.id, &identities);
                }
            }
            Disposition::ModuleOnly => {}
        }
        Ok(())
    }

    /// Second pass over the root unit for re-exports the generic walk skips.
    pub fn collect_root_exports(&self, root: &SourceUnit, result: &mut CollectingResult) {
        for id in &root.statements {
            let statement = self.program.statement(*id);
            match &statement.kind {
                StatementKind::ExportAssignment(_) => {
                    result.push_verbatim(statement.id);
                }
                StatementKind::ExportDeclaration(export) => {
                    if self.reexports_imported_module(root, export) {
                        result.push_verbatim(statement.id);
                        continue;
                    }
                    self.collect_renames(export, result);
                }
                _ => {}
            }
        }
    }

    fn reexports_imported_module(&self, root: &SourceUnit, export: &ExportDeclaration) -> bool {
        export
            .specifier
            .as_ref()
            .and_then(|specifier| specifier.as_literal())
            .and_then(|specifier| self.oracle.resolve_module(root.id, specifier))
            .is_some_and(|target| {
                self.criteria
                    .classify(&self.program.unit(target).path)
                    .is_import()
            })
    }

    fn collect_renames(&self, export: &ExportDeclaration, result: &mut CollectingResult) {
        let Some(clauses) = &export.clauses else {
            return;
        };

        for clause in clauses {
            // bindings of imported packages are only re-exported by this clause
            let local = self.oracle.resolve_identities(clause.local().node);
            if local
                .iter()
                .any(|symbol| result.placement_of(*symbol) == Some(Placement::Import))
            {
                result.add_rename(match &clause.property_name {
                    Some(property) => format!("{} as {}", property.text, clause.name.text),
                    None => clause.name.text.clone(),
                });
                continue;
            }

            let Some(property) = &clause.property_name else {
                continue;
            };
            if property.text == "default" && clause.name.text == "default" {
                continue;
            }

            let original = self
                .oracle
                .resolve_symbol(property.node)
                .and_then(|symbol| self.declared_name(symbol))
                .unwrap_or_else(|| property.text.clone());
            if original == clause.name.text {
                continue;
            }
            result.add_rename(format!("{} as {}", original, clause.name.text));
        }
    }

    /// Name of the first named declaration statement of `symbol`.
    fn declared_name(&self, symbol: SymbolId) -> Option<String> {
        self.oracle
            .declarations_of(symbol)
            .into_iter()
            .filter_map(|declaration| declaration.statement)
            .find_map(|id| self.program.statement(id).name().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtsmerge_config::LibrariesOptions;
    use dtsmerge_core::{DeclarationSpec, MemoryOracle, ProgramBuilder, UnitId};

    fn collect(
        program: &Program,
        oracle: &MemoryOracle,
        root: UnitId,
        output: &OutputOptions,
    ) -> CollectingResult {
        let graph = UsageGraph::build(program, oracle);
        let criteria = ModuleCriteria::new(&LibrariesOptions::default(), &program.type_roots);
        let module = oracle.module_symbol(root).unwrap();
        let exports = RootExports::new(program, oracle, root, module, output);
        let collector = Collector::new(program, oracle, &graph, &criteria, output, &exports);

        let mut result = CollectingResult::new();
        for unit in program.source_units() {
            collector.collect_unit(unit, &mut result).unwrap();
        }
        collector.collect_root_exports(program.unit(root), &mut result);
        result
    }

    #[test]
    fn test_unreachable_statements_are_discarded() {
        let mut builder = ProgramBuilder::new();
        let index = builder.unit("/project/src/index.ts");
        let (used, unused) = (builder.symbol(), builder.symbol());
        let kept = builder.declare(index, DeclarationSpec::interface("Used", used).exported());
        builder.declare(index, DeclarationSpec::interface("Unused", unused));
        builder.export(index, "Used", used);
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        assert_eq!(result.statements, vec![kept]);
    }

    #[test]
    fn test_declare_global_needs_flag() {
        let mut builder = ProgramBuilder::new();
        let index = builder.unit("/project/src/index.ts");
        let global = builder.global_augmentation(index);
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        assert!(result.statements.is_empty());

        let output = OutputOptions {
            inline_declare_global: true,
            ..Default::default()
        };
        let result = collect(&program, &oracle, index, &output);
        assert_eq!(result.statements, vec![global]);
    }

    #[test]
    fn test_external_ambient_module_in_local_file() {
        let mut builder = ProgramBuilder::new();
        let index = builder.unit("/project/src/index.ts");
        let module = builder.ambient_module(index, "some-pkg");
        let inner = builder.symbol();
        builder.declare(module, DeclarationSpec::interface("Inner", inner).exported());
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        assert!(result.statements.is_empty());

        let output = OutputOptions {
            inline_declare_externals: true,
            ..Default::default()
        };
        let result = collect(&program, &oracle, index, &output);
        assert_eq!(result.statements, vec![module]);
    }

    #[test]
    fn test_ambient_module_body_uses_target_disposition() {
        let mut builder = ProgramBuilder::new();
        let types = builder.unit("/project/node_modules/@types/node/index.d.ts");
        let index = builder.unit("/project/src/index.ts");
        let fs = builder.ambient_module(types, "fs");
        let stats = builder.symbol();
        builder.declare(fs, DeclarationSpec::interface("Stats", stats).exported());
        builder.import(index, dtsmerge_core::ImportSpec::from("fs").named("Stats", stats));
        let info = builder.symbol();
        builder.declare(index, DeclarationSpec::interface("Info", info).exported().uses("Stats", stats));
        builder.export(index, "Info", info);
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        // `fs` is not resolvable, so it is treated as the package `fs` and imported
        assert!(result.imports["fs"].named_imports.contains("Stats"));
        assert!(result.types_references.contains("node"));
        assert_eq!(result.placement_of(stats), Some(Placement::Import));
    }

    #[test]
    fn test_declare_global_outside_inline_module_is_dropped() {
        let mut builder = ProgramBuilder::new();
        let pkg = builder.unit("/project/node_modules/pkg/index.d.ts");
        let index = builder.unit("/project/src/index.ts");
        builder.global_augmentation(pkg);
        let local = builder.global_augmentation(index);
        let (program, oracle) = builder.build();

        let output = OutputOptions {
            inline_declare_global: true,
            ..Default::default()
        };
        let result = collect(&program, &oracle, index, &output);
        assert_eq!(result.statements, vec![local]);
    }

    #[test]
    fn test_module_only_target_walks_nested_modules() {
        let mut builder = ProgramBuilder::new();
        let plugin = builder.unit("/project/node_modules/plugin/index.d.ts");
        let vue = builder.unit("/project/node_modules/vue/index.d.ts");
        let node = builder.unit("/project/node_modules/@types/node/index.d.ts");
        let index = builder.unit("/project/src/index.ts");
        let (augment, buffer, local) = (builder.symbol(), builder.symbol(), builder.symbol());

        let vue_block = builder.ambient_module(plugin, "vue");
        builder.declare(vue_block, DeclarationSpec::interface("Augment", augment).exported());
        let node_block = builder.ambient_module(vue_block, "node");
        builder.declare(node_block, DeclarationSpec::interface("Buffer", buffer).exported());
        builder.resolve_module(plugin, "vue", vue);
        builder.resolve_module(plugin, "node", node);
        builder.declare(
            index,
            DeclarationSpec::interface("Local", local)
                .exported()
                .uses("Augment", augment)
                .uses("Buffer", buffer),
        );
        builder.export(index, "Local", local);
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        // members of another package's module block are never placed
        assert_eq!(result.placement_of(augment), None);
        assert_eq!(result.placement_of(buffer), Some(Placement::Reference));
        assert!(result.types_references.contains("node"));
        assert!(result.imports.is_empty());
    }

    #[test]
    fn test_variable_reachable_through_any_declarator() {
        let mut builder = ProgramBuilder::new();
        let lib = builder.unit("/project/src/lib.ts");
        let index = builder.unit("/project/src/index.ts");
        let (a, b, c) = (builder.symbol(), builder.symbol(), builder.symbol());
        let pair = builder.declare(lib, DeclarationSpec::variables(&[("a", a), ("b", b)]).exported());
        builder.declare(lib, DeclarationSpec::variables(&[("c", c)]).exported());
        builder.export(index, "b", b);
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        assert_eq!(result.statements, vec![pair]);
        assert_eq!(result.placement_of(a), Some(Placement::Inline));
    }

    #[test]
    fn test_export_equals_in_inline_module_is_not_flattened() {
        let mut builder = ProgramBuilder::new();
        let lib = builder.unit("/project/src/legacy.ts");
        let index = builder.unit("/project/src/index.ts");
        let (ns, member, local) = (builder.symbol(), builder.symbol(), builder.symbol());
        let namespace = builder.declare(lib, DeclarationSpec::namespace("Legacy", ns));
        builder.declare(namespace, DeclarationSpec::interface("Member", member).exported());
        builder.export_equals(lib, "Legacy", ns);
        builder.import(index, dtsmerge_core::ImportSpec::from("./legacy").named("Member", member));
        let kept = builder.declare(
            index,
            DeclarationSpec::interface("Local", local)
                .exported()
                .uses("Member", member),
        );
        builder.export(index, "Local", local);
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        assert_eq!(result.statements, vec![kept]);
        assert_eq!(result.placement_of(member), None);
        assert!(result.imports.is_empty());
    }

    #[test]
    fn test_root_renames() {
        let mut builder = ProgramBuilder::new();
        let lib = builder.unit("/project/src/lib.ts");
        let index = builder.unit("/project/src/index.ts");
        let (foo, def) = (builder.symbol(), builder.symbol());
        builder.declare(lib, DeclarationSpec::interface("Foo", foo).exported());
        builder.declare(lib, DeclarationSpec::interface("Impl", def).default_export());
        builder.resolve_module(index, "./lib", lib);
        builder.export_declaration(
            index,
            dtsmerge_core::ExportSpec::from("./lib")
                .renamed("Foo", "Bar", foo)
                .renamed("default", "Main", def)
                .renamed("default", "default", def),
        );
        builder.export(index, "Bar", foo);
        builder.export(index, "Main", def);
        builder.export(index, "default", def);
        let (program, oracle) = builder.build();

        let result = collect(&program, &oracle, index, &OutputOptions::default());
        assert_eq!(result.renamed_exports, vec!["Foo as Bar", "Impl as Main"]);
        assert_eq!(result.statements.len(), 2);
    }
}
