//! Rendering of a collecting result into declaration text.

use crate::result::{CollectingResult, ImportRecord};
use dtsmerge_config::OutputOptions;
use dtsmerge_core::{DeclarationKind, Program, Statement, StatementKind};

/// Per-statement decisions that depend on the entry point's exports.
pub trait RenderHelpers {
    /// Whether the statement is emitted with an `export` keyword.
    fn needs_export_keyword(&self, statement: &Statement) -> bool;

    /// Whether a `const enum` loses its `const` modifier.
    fn should_strip_const(&self, statement: &Statement) -> bool;

    /// Whether a `default` modifier is dropped.
    fn should_strip_default(&self, statement: &Statement) -> bool;
}

/// Turns a collecting result into the final artifact.
pub trait OutputRenderer {
    fn render(
        &self,
        program: &Program,
        result: &CollectingResult,
        helpers: &dyn RenderHelpers,
        options: &OutputOptions,
    ) -> String;
}

/// Renders a single `.d.ts` file.
///
/// Sections, separated by blank lines: banner, reference directives,
/// imports, statements, rename block, UMD declaration, `export {};`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DtsRenderer;

impl DtsRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_statement(&self, statement: &Statement, helpers: &dyn RenderHelpers) -> String {
        let StatementKind::Declaration(decl) = &statement.kind else {
            return statement.text.clone();
        };

        let keeps_default = decl.has_default && !helpers.should_strip_default(statement);
        let mut modifiers = Vec::new();
        if helpers.needs_export_keyword(statement) {
            modifiers.push("export");
        }
        if keeps_default {
            modifiers.push("default");
        } else if decl.kind.is_value() {
            modifiers.push("declare");
        }
        if let DeclarationKind::Enum { is_const: true } = decl.kind {
            if !helpers.should_strip_const(statement) {
                modifiers.push("const");
            }
        }

        if modifiers.is_empty() {
            statement.text.clone()
        } else {
            format!("{} {}", modifiers.join(" "), statement.text)
        }
    }
}

fn render_imports(specifier: &str, record: &ImportRecord) -> Vec<String> {
    let mut lines = Vec::new();
    for name in &record.star_imports {
        lines.push(format!("import * as {} from '{}';", name, specifier));
    }
    for name in &record.require_imports {
        lines.push(format!("import {} = require('{}');", name, specifier));
    }
    for name in &record.default_imports {
        lines.push(format!("import {} from '{}';", name, specifier));
    }
    if !record.named_imports.is_empty() {
        let mut named: Vec<&str> = record.named_imports.iter().map(String::as_str).collect();
        named.sort_unstable();
        lines.push(format!("import {{ {} }} from '{}';", named.join(", "), specifier));
    }
    lines
}

impl OutputRenderer for DtsRenderer {
    fn render(
        &self,
        program: &Program,
        result: &CollectingResult,
        helpers: &dyn RenderHelpers,
        options: &OutputOptions,
    ) -> String {
        let mut sections: Vec<String> = Vec::new();

        if !options.no_banner {
            sections.push(format!(
                "// Generated by dtsmerge v{}",
                env!("CARGO_PKG_VERSION")
            ));
        }

        if !result.types_references.is_empty() {
            let mut references: Vec<&String> = result.types_references.iter().collect();
            references.sort();
            let lines: Vec<String> = references
                .into_iter()
                .map(|name| format!("/// <reference types=\"{}\" />", name))
                .collect();
            sections.push(lines.join("\n"));
        }

        let mut specifiers: Vec<(&String, &ImportRecord)> = result
            .imports
            .iter()
            .filter(|(_, record)| !record.is_empty())
            .collect();
        if !specifiers.is_empty() {
            specifiers.sort_by(|a, b| a.0.cmp(b.0));
            let lines: Vec<String> = specifiers
                .into_iter()
                .flat_map(|(specifier, record)| render_imports(specifier, record))
                .collect();
            sections.push(lines.join("\n"));
        }

        let mut statements: Vec<String> = result
            .statements
            .iter()
            .map(|id| self.render_statement(program.statement(*id), helpers))
            .collect();
        if options.sort_nodes {
            statements.sort();
        }
        sections.extend(statements);

        if !result.renamed_exports.is_empty() {
            sections.push(format!(
                "export {{\n\t{},\n}};",
                result.renamed_exports.join(",\n\t")
            ));
        }

        if let Some(name) = &options.umd_module_name {
            sections.push(format!("export as namespace {};", name));
        }

        sections.push("export {};".to_string());

        let mut output = sections.join("\n\n");
        output.push('\n');
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtsmerge_core::{DeclarationSpec, ProgramBuilder, SymbolId};

    /// Exports everything, strips nothing.
    struct ExportAll;

    impl RenderHelpers for ExportAll {
        fn needs_export_keyword(&self, _statement: &Statement) -> bool {
            true
        }

        fn should_strip_const(&self, _statement: &Statement) -> bool {
            false
        }

        fn should_strip_default(&self, _statement: &Statement) -> bool {
            false
        }
    }

    fn declare(builder: &mut ProgramBuilder, spec: DeclarationSpec) -> (Program, CollectingResult) {
        let unit = builder.unit("/project/src/index.ts");
        let id = builder.declare(unit, spec);
        let (program, _) = std::mem::take(builder).build();
        let mut result = CollectingResult::new();
        result.inline(id, &[SymbolId(100)]);
        (program, result)
    }

    #[test]
    fn test_modifiers_are_recomputed() {
        let mut builder = ProgramBuilder::new();
        let e = builder.symbol();
        let (program, result) = declare(&mut builder, DeclarationSpec::enumeration("E", e, true));

        let output = DtsRenderer.render(&program, &result, &ExportAll, &OutputOptions::default());
        assert!(output.contains("export declare const enum E {}"));
    }

    #[test]
    fn test_default_replaces_declare() {
        let mut builder = ProgramBuilder::new();
        let f = builder.symbol();
        let (program, result) =
            declare(&mut builder, DeclarationSpec::function("f", f).default_export());

        let output = DtsRenderer.render(&program, &result, &ExportAll, &OutputOptions::default());
        assert!(output.contains("export default function f(): void;"));
    }

    #[test]
    fn test_sections_in_order() {
        let program = Program::default();
        let mut result = CollectingResult::new();
        result.add_reference("node");
        result.import_record("b-pkg").named_imports.insert("Z".into());
        result.import_record("b-pkg").named_imports.insert("A as B".into());
        result.import_record("a-pkg").star_imports.insert("ns".into());
        result.add_rename("Foo as Bar".into());
        let options = OutputOptions {
            umd_module_name: Some("MyLib".into()),
            ..Default::default()
        };

        let output = DtsRenderer.render(&program, &result, &ExportAll, &options);
        let expected = format!(
            "// Generated by dtsmerge v{}\n\n\
             /// <reference types=\"node\" />\n\n\
             import * as ns from 'a-pkg';\n\
             import {{ A as B, Z }} from 'b-pkg';\n\n\
             export {{\n\tFoo as Bar,\n}};\n\n\
             export as namespace MyLib;\n\n\
             export {{}};\n",
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_no_banner() {
        let output = DtsRenderer.render(
            &Program::default(),
            &CollectingResult::new(),
            &ExportAll,
            &OutputOptions {
                no_banner: true,
                ..Default::default()
            },
        );
        assert_eq!(output, "export {};\n");
    }
}
