//! Entry-point orchestration.

use crate::collector::Collector;
use crate::output::{DtsRenderer, OutputRenderer, RenderHelpers};
use crate::result::CollectingResult;
use crate::root::RootExports;
use dtsmerge_config::EntryPointConfig;
use dtsmerge_core::{validate_no_classes, Error, Program, ResolutionOracle, Result, UsageGraph};
use dtsmerge_rules::ModuleCriteria;
use std::sync::Arc;
use tracing::{error, info};

/// Bundles entry points of one program.
///
/// The usage graph is computed once and shared by every entry point.
///
/// # Examples
///
/// ```
/// use dtsmerge_bundler::Bundler;
/// use dtsmerge_config::EntryPointConfig;
/// use dtsmerge_core::{DeclarationSpec, ProgramBuilder};
///
/// let mut builder = ProgramBuilder::new();
/// let index = builder.unit("/project/src/index.ts");
/// let foo = builder.symbol();
/// builder.declare(index, DeclarationSpec::interface("Foo", foo).exported());
/// builder.export(index, "Foo", foo);
/// let (program, oracle) = builder.build();
///
/// let bundler = Bundler::new(&program, &oracle);
/// let mut entry = EntryPointConfig::new("/project/src/index.ts");
/// entry.output.no_banner = true;
///
/// let dts = bundler.generate(&entry).unwrap();
/// assert_eq!(dts, "export interface Foo {}\n\nexport {};\n");
/// ```
#[derive(Debug)]
pub struct Bundler<'a> {
    program: &'a Program,
    oracle: &'a dyn ResolutionOracle,
    graph: Arc<UsageGraph>,
}

/// Collecting result of one entry point, with the export queries the
/// renderer needs.
#[derive(Debug)]
pub struct CollectedEntry<'a> {
    pub result: CollectingResult,
    pub root: RootExports<'a>,
}

impl<'a> Bundler<'a> {
    pub fn new(program: &'a Program, oracle: &'a dyn ResolutionOracle) -> Self {
        let graph = Arc::new(UsageGraph::build(program, oracle));
        Self::with_graph(program, oracle, graph)
    }

    /// Reuses a graph built for the same program.
    pub fn with_graph(
        program: &'a Program,
        oracle: &'a dyn ResolutionOracle,
        graph: Arc<UsageGraph>,
    ) -> Self {
        Self {
            program,
            oracle,
            graph,
        }
    }

    pub fn graph(&self) -> &Arc<UsageGraph> {
        &self.graph
    }

    /// Runs collection for one entry point.
    pub fn collect(&self, entry: &EntryPointConfig) -> Result<CollectedEntry<'a>> {
        info!("Processing entry point {}", entry.file_path.display());

        let root_unit = self
            .program
            .root_unit_for(&entry.file_path)
            .ok_or_else(|| Error::RootFileNotFound {
                path: entry.file_path.clone(),
            })?;
        let module_symbol =
            self.oracle
                .module_symbol(root_unit.id)
                .ok_or_else(|| Error::RootSymbolNotFound {
                    path: root_unit.path.clone(),
                })?;

        let root = RootExports::new(
            self.program,
            self.oracle,
            root_unit.id,
            module_symbol,
            &entry.output,
        );
        let criteria = ModuleCriteria::new(&entry.libraries, &self.program.type_roots);

        let mut result = CollectingResult::new();
        {
            let collector = Collector::new(
                self.program,
                self.oracle,
                &self.graph,
                &criteria,
                &entry.output,
                &root,
            );
            for unit in self
                .program
                .source_units()
                .filter(|unit| unit.id != root_unit.id)
            {
                collector.collect_unit(unit, &mut result)?;
            }
            collector.collect_unit(root_unit, &mut result)?;
            collector.collect_root_exports(root_unit, &mut result);
        }

        if entry.fail_on_class {
            validate_no_classes(
                result
                    .statements
                    .iter()
                    .map(|id| self.program.statement(*id)),
            )?;
        }

        info!(
            statements = result.statements.len(),
            imports = result.imports.len(),
            references = result.types_references.len(),
            "Collected {}",
            entry.file_path.display()
        );
        Ok(CollectedEntry { result, root })
    }

    /// Bundles one entry point with the default renderer.
    pub fn generate(&self, entry: &EntryPointConfig) -> Result<String> {
        self.generate_with(entry, &DtsRenderer)
    }

    pub fn generate_with(
        &self,
        entry: &EntryPointConfig,
        renderer: &dyn OutputRenderer,
    ) -> Result<String> {
        let collected = self.collect(entry)?;
        let helpers: &dyn RenderHelpers = &collected.root;
        Ok(renderer.render(self.program, &collected.result, helpers, &entry.output))
    }
}

/// Bundles every entry point; a failing entry does not affect the others.
pub fn bundle_all(
    program: &Program,
    oracle: &dyn ResolutionOracle,
    entries: &[EntryPointConfig],
) -> Vec<Result<String>> {
    let bundler = Bundler::new(program, oracle);
    entries
        .iter()
        .map(|entry| {
            bundler.generate(entry).inspect_err(|err| {
                error!("Bundling {} failed: {}", entry.file_path.display(), err)
            })
        })
        .collect()
}
