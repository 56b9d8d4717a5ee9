//! In-memory program construction and resolution.
//!
//! [`MemoryOracle`] is a table-driven [`ResolutionOracle`] for collaborators
//! that resolve names ahead of time. [`ProgramBuilder`] assembles a
//! [`Program`] together with a matching oracle, allocating node and symbol
//! ids as statements are declared.

use crate::oracle::ResolutionOracle;
use crate::types::{
    AmbientModule, Declaration, DeclarationKind, DeclarationStatement, Declarator,
    ExportAssignment, ExportDeclaration, ExportSpecifier, ExportedSymbol, GlobalAugmentation,
    ImportEqualsStatement, ImportStatement, ModuleSpecifier, NameRef, NamedImport, NodeId,
    Program, SourceUnit, Statement, StatementKind, StmtId, SymbolId, UnitId,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use tracing::warn;

/// Table-driven resolution oracle.
#[derive(Debug, Clone, Default)]
pub struct MemoryOracle {
    nodes: FxHashMap<NodeId, SymbolId>,
    declarations: FxHashMap<SymbolId, Vec<Declaration>>,
    exports: FxHashMap<UnitId, Vec<ExportedSymbol>>,
    module_symbols: FxHashMap<UnitId, SymbolId>,
    modules: FxHashMap<(UnitId, String), UnitId>,
    builtin: FxHashSet<UnitId>,
    composites: FxHashMap<SymbolId, Vec<SymbolId>>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_node(&mut self, node: NodeId, symbol: SymbolId) {
        self.nodes.insert(node, symbol);
    }

    pub fn add_declaration(&mut self, symbol: SymbolId, declaration: Declaration) {
        let declarations = self.declarations.entry(symbol).or_default();
        if !declarations.contains(&declaration) {
            declarations.push(declaration);
        }
    }

    pub fn add_export(&mut self, unit: UnitId, exported_name: impl Into<String>, symbol: SymbolId) {
        self.exports.entry(unit).or_default().push(ExportedSymbol {
            exported_name: exported_name.into(),
            symbol,
        });
    }

    pub fn set_module_symbol(&mut self, unit: UnitId, symbol: SymbolId) {
        self.module_symbols.insert(unit, symbol);
    }

    pub fn add_module_resolution(&mut self, from: UnitId, specifier: impl Into<String>, to: UnitId) {
        self.modules.insert((from, specifier.into()), to);
    }

    pub fn mark_builtin(&mut self, unit: UnitId) {
        self.builtin.insert(unit);
    }

    /// Registers `symbol` as a transient identity standing for `parts`.
    pub fn add_composite(&mut self, symbol: SymbolId, parts: Vec<SymbolId>) {
        self.composites.insert(symbol, parts);
    }
}

impl ResolutionOracle for MemoryOracle {
    fn resolve_symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.nodes.get(&node).copied()
    }

    fn declarations_of(&self, symbol: SymbolId) -> Vec<Declaration> {
        match self.composites.get(&symbol) {
            Some(parts) => parts
                .iter()
                .flat_map(|part| self.declarations_of(*part))
                .collect(),
            None => self.declarations.get(&symbol).cloned().unwrap_or_default(),
        }
    }

    fn exports_of(&self, unit: UnitId) -> Vec<ExportedSymbol> {
        self.exports.get(&unit).cloned().unwrap_or_default()
    }

    fn module_symbol(&self, unit: UnitId) -> Option<SymbolId> {
        self.module_symbols.get(&unit).copied()
    }

    fn resolve_module(&self, from: UnitId, specifier: &str) -> Option<UnitId> {
        self.modules.get(&(from, specifier.to_string())).copied()
    }

    fn is_declared_in_builtin_library(&self, unit: UnitId) -> bool {
        self.builtin.contains(&unit)
    }

    fn split_merged_identity(&self, symbol: SymbolId) -> Vec<SymbolId> {
        self.composites
            .get(&symbol)
            .cloned()
            .unwrap_or_else(|| vec![symbol])
    }
}

/// Where a new statement is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Top level of a source unit.
    Unit(UnitId),
    /// Body of a namespace, `declare module` or `declare global` statement.
    ///
    /// A statement added to any other kind of statement lands at the top
    /// level of that statement's unit instead.
    Block(StmtId),
}

impl From<UnitId> for Scope {
    fn from(unit: UnitId) -> Self {
        Scope::Unit(unit)
    }
}

impl From<StmtId> for Scope {
    fn from(statement: StmtId) -> Self {
        Scope::Block(statement)
    }
}

/// Description of a declaration statement for [`ProgramBuilder::declare`].
#[derive(Debug, Clone)]
pub struct DeclarationSpec {
    kind: DeclarationKind,
    declarators: Vec<(Option<String>, SymbolId)>,
    has_export: bool,
    has_default: bool,
    references: Vec<(String, SymbolId)>,
    text: Option<String>,
}

impl DeclarationSpec {
    pub fn new(kind: DeclarationKind, name: &str, symbol: SymbolId) -> Self {
        Self {
            kind,
            declarators: vec![(Some(name.to_string()), symbol)],
            has_export: false,
            has_default: false,
            references: Vec::new(),
            text: None,
        }
    }

    pub fn interface(name: &str, symbol: SymbolId) -> Self {
        Self::new(DeclarationKind::Interface, name, symbol)
    }

    pub fn type_alias(name: &str, symbol: SymbolId) -> Self {
        Self::new(DeclarationKind::TypeAlias, name, symbol)
    }

    pub fn class(name: &str, symbol: SymbolId) -> Self {
        Self::new(DeclarationKind::Class, name, symbol)
    }

    pub fn function(name: &str, symbol: SymbolId) -> Self {
        Self::new(DeclarationKind::Function, name, symbol)
    }

    pub fn enumeration(name: &str, symbol: SymbolId, is_const: bool) -> Self {
        Self::new(DeclarationKind::Enum { is_const }, name, symbol)
    }

    pub fn namespace(name: &str, symbol: SymbolId) -> Self {
        Self::new(DeclarationKind::Namespace, name, symbol)
    }

    /// A variable statement declaring every `(name, symbol)` pair.
    pub fn variables(declarators: &[(&str, SymbolId)]) -> Self {
        Self {
            kind: DeclarationKind::Variable,
            declarators: declarators
                .iter()
                .map(|(name, symbol)| (Some(name.to_string()), *symbol))
                .collect(),
            has_export: false,
            has_default: false,
            references: Vec::new(),
            text: None,
        }
    }

    /// An unnamed declaration such as `export default class {}`.
    pub fn anonymous(kind: DeclarationKind, symbol: SymbolId) -> Self {
        Self {
            declarators: vec![(None, symbol)],
            ..Self::new(kind, "", symbol)
        }
    }

    pub fn exported(mut self) -> Self {
        self.has_export = true;
        self
    }

    pub fn default_export(mut self) -> Self {
        self.has_export = true;
        self.has_default = true;
        self
    }

    /// Adds a type reference to `name`, resolving to `symbol`.
    pub fn uses(mut self, name: &str, symbol: SymbolId) -> Self {
        self.references.push((name.to_string(), symbol));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn default_text(&self) -> String {
        let names: Vec<&str> = self
            .declarators
            .iter()
            .map(|(name, _)| name.as_deref().unwrap_or(""))
            .collect();
        let name = names.first().copied().unwrap_or("");
        let separated = |keyword: &str| {
            if name.is_empty() {
                keyword.to_string()
            } else {
                format!("{} {}", keyword, name)
            }
        };
        match self.kind {
            DeclarationKind::Interface => format!("{} {{}}", separated("interface")),
            DeclarationKind::TypeAlias => format!("type {} = unknown;", name),
            DeclarationKind::Class => format!("{} {{}}", separated("class")),
            DeclarationKind::Function => format!("{}(): void;", separated("function")),
            DeclarationKind::Variable => {
                let declared: Vec<String> =
                    names.iter().map(|name| format!("{}: unknown", name)).collect();
                format!("const {};", declared.join(", "))
            }
            DeclarationKind::Enum { .. } => format!("{} {{}}", separated("enum")),
            DeclarationKind::Namespace => format!("{} {{}}", separated("namespace")),
        }
    }
}

/// Description of an import statement for [`ProgramBuilder::import`].
#[derive(Debug, Clone)]
pub struct ImportSpec {
    specifier: ModuleSpecifier,
    default: Option<(String, SymbolId)>,
    named: Vec<(Option<String>, String, SymbolId)>,
    namespace: Option<(String, SymbolId)>,
}

impl ImportSpec {
    pub fn from(specifier: &str) -> Self {
        Self::with_specifier(ModuleSpecifier::Literal(specifier.to_string()))
    }

    /// An import whose specifier is not a string literal.
    pub fn expression(expression: &str) -> Self {
        Self::with_specifier(ModuleSpecifier::Expression(expression.to_string()))
    }

    fn with_specifier(specifier: ModuleSpecifier) -> Self {
        Self {
            specifier,
            default: None,
            named: Vec::new(),
            namespace: None,
        }
    }

    pub fn default(mut self, local: &str, symbol: SymbolId) -> Self {
        self.default = Some((local.to_string(), symbol));
        self
    }

    pub fn named(mut self, name: &str, symbol: SymbolId) -> Self {
        self.named.push((None, name.to_string(), symbol));
        self
    }

    pub fn renamed(mut self, imported: &str, local: &str, symbol: SymbolId) -> Self {
        self.named
            .push((Some(imported.to_string()), local.to_string(), symbol));
        self
    }

    pub fn namespace(mut self, local: &str, symbol: SymbolId) -> Self {
        self.namespace = Some((local.to_string(), symbol));
        self
    }
}

/// Description of an export declaration for [`ProgramBuilder::export_declaration`].
#[derive(Debug, Clone)]
pub struct ExportSpec {
    specifier: Option<ModuleSpecifier>,
    clauses: Option<Vec<(Option<String>, String, SymbolId)>>,
}

impl ExportSpec {
    /// `export { ... };`
    pub fn local() -> Self {
        Self {
            specifier: None,
            clauses: Some(Vec::new()),
        }
    }

    /// `export { ... } from "specifier";`
    pub fn from(specifier: &str) -> Self {
        Self {
            specifier: Some(ModuleSpecifier::Literal(specifier.to_string())),
            clauses: Some(Vec::new()),
        }
    }

    /// `export * from "specifier";`
    pub fn star(specifier: &str) -> Self {
        Self {
            specifier: Some(ModuleSpecifier::Literal(specifier.to_string())),
            clauses: None,
        }
    }

    /// `name` exported under its own name.
    pub fn name(mut self, name: &str, symbol: SymbolId) -> Self {
        self.clauses
            .get_or_insert_with(Vec::new)
            .push((None, name.to_string(), symbol));
        self
    }

    /// `property as exported`.
    pub fn renamed(mut self, property: &str, exported: &str, symbol: SymbolId) -> Self {
        self.clauses.get_or_insert_with(Vec::new).push((
            Some(property.to_string()),
            exported.to_string(),
            symbol,
        ));
        self
    }
}

/// Incrementally builds a [`Program`] and its [`MemoryOracle`].
///
/// # Examples
///
/// ```
/// use dtsmerge_core::{DeclarationSpec, ExportSpec, ProgramBuilder, ResolutionOracle};
///
/// let mut builder = ProgramBuilder::new();
/// let internal = builder.unit("/project/src/internal.ts");
/// let index = builder.unit("/project/src/index.ts");
///
/// let foo = builder.symbol();
/// builder.declare(internal, DeclarationSpec::interface("Foo", foo).exported());
/// builder.export_declaration(index, ExportSpec::from("./internal").name("Foo", foo));
/// builder.export(index, "Foo", foo);
///
/// let (program, oracle) = builder.build();
/// assert_eq!(program.units.len(), 2);
/// assert_eq!(oracle.exports_of(index)[0].symbol, foo);
/// ```
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
    oracle: MemoryOracle,
    next_symbol: u32,
    next_node: u32,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh symbol.
    pub fn symbol(&mut self) -> SymbolId {
        let symbol = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        symbol
    }

    /// Allocates a transient symbol standing for several merged parts.
    pub fn merged(&mut self, parts: &[SymbolId]) -> SymbolId {
        let symbol = self.symbol();
        self.oracle.add_composite(symbol, parts.to_vec());
        symbol
    }

    /// Adds a module source unit with its own module symbol.
    pub fn unit(&mut self, path: impl Into<PathBuf>) -> UnitId {
        let unit = self.push_unit(path.into(), false);
        let symbol = self.symbol();
        self.oracle.set_module_symbol(unit, symbol);
        self.oracle.add_declaration(
            symbol,
            Declaration {
                unit,
                statement: None,
            },
        );
        unit
    }

    /// Adds a global script unit; it has no module symbol.
    pub fn script_unit(&mut self, path: impl Into<PathBuf>) -> UnitId {
        self.push_unit(path.into(), false)
    }

    /// Adds a built-in library unit (`lib.*.d.ts`).
    pub fn default_lib_unit(&mut self, path: impl Into<PathBuf>) -> UnitId {
        let unit = self.push_unit(path.into(), true);
        self.oracle.mark_builtin(unit);
        unit
    }

    fn push_unit(&mut self, path: PathBuf, is_default_lib: bool) -> UnitId {
        let id = UnitId(self.program.units.len() as u32);
        self.program.units.push(SourceUnit {
            id,
            path,
            statements: Vec::new(),
            is_default_lib,
        });
        id
    }

    /// The module symbol allocated for `unit`, if any.
    pub fn module_symbol(&self, unit: UnitId) -> Option<SymbolId> {
        self.oracle.module_symbol(unit)
    }

    fn node(&mut self, symbol: Option<SymbolId>) -> NodeId {
        let node = NodeId(self.next_node);
        self.next_node += 1;
        if let Some(symbol) = symbol {
            self.oracle.bind_node(node, symbol);
        }
        node
    }

    fn name_ref(&mut self, text: &str, symbol: SymbolId) -> NameRef {
        NameRef {
            node: self.node(Some(symbol)),
            text: text.to_string(),
        }
    }

    fn push_statement(&mut self, scope: Scope, kind: StatementKind, text: String) -> StmtId {
        let id = StmtId(self.program.statements.len() as u32);
        let unit = match scope {
            Scope::Unit(unit) => unit,
            Scope::Block(parent) => self.program.statement(parent).unit,
        };
        self.program.statements.push(Statement {
            id,
            unit,
            kind,
            text,
        });
        let body = match scope {
            Scope::Unit(_) => None,
            Scope::Block(parent) => match &mut self.program.statements[parent.0 as usize].kind {
                StatementKind::Declaration(decl) => Some(&mut decl.body),
                StatementKind::AmbientModule(module) => Some(module.body.get_or_insert_with(Vec::new)),
                StatementKind::GlobalAugmentation(global) => Some(&mut global.body),
                _ => {
                    warn!("Statement {:?} has no body, adding {:?} to the top level", parent, id);
                    None
                }
            },
        };
        match body {
            Some(body) => body.push(id),
            None => self.program.units[unit.0 as usize].statements.push(id),
        }
        id
    }

    /// Adds a declaration statement and registers it for each declared symbol.
    pub fn declare(&mut self, scope: impl Into<Scope>, spec: DeclarationSpec) -> StmtId {
        let scope = scope.into();
        let text = spec.text.clone().unwrap_or_else(|| spec.default_text());
        let declarators = spec
            .declarators
            .iter()
            .map(|(name, symbol)| Declarator {
                node: self.node(Some(*symbol)),
                name: name.clone(),
            })
            .collect();
        let type_references = spec
            .references
            .iter()
            .map(|(name, symbol)| self.name_ref(name, *symbol))
            .collect();
        let statement = DeclarationStatement {
            kind: spec.kind,
            declarators,
            has_export: spec.has_export,
            has_default: spec.has_default,
            type_references,
            body: Vec::new(),
        };
        let id = self.push_statement(scope, StatementKind::Declaration(statement), text);
        let unit = self.program.statement(id).unit;
        for (_, symbol) in &spec.declarators {
            self.oracle.add_declaration(
                *symbol,
                Declaration {
                    unit,
                    statement: Some(id),
                },
            );
        }
        id
    }

    /// Adds `declare module "name" { }` with a fresh symbol.
    pub fn ambient_module(&mut self, scope: impl Into<Scope>, name: &str) -> StmtId {
        let symbol = self.symbol();
        let node = self.node(Some(symbol));
        let id = self.push_statement(
            scope.into(),
            StatementKind::AmbientModule(AmbientModule {
                name: name.to_string(),
                node,
                body: Some(Vec::new()),
            }),
            format!("declare module '{}' {{}}", name),
        );
        let unit = self.program.statement(id).unit;
        self.oracle.add_declaration(
            symbol,
            Declaration {
                unit,
                statement: Some(id),
            },
        );
        id
    }

    /// Adds `declare global { }`.
    pub fn global_augmentation(&mut self, scope: impl Into<Scope>) -> StmtId {
        self.push_statement(
            scope.into(),
            StatementKind::GlobalAugmentation(GlobalAugmentation { body: Vec::new() }),
            "declare global {}".to_string(),
        )
    }

    pub fn import(&mut self, scope: impl Into<Scope>, spec: ImportSpec) -> StmtId {
        let mut parts = Vec::new();
        let default = spec.default.as_ref().map(|(local, symbol)| {
            parts.push(local.clone());
            self.name_ref(local, *symbol)
        });
        let namespace = spec.namespace.as_ref().map(|(local, symbol)| {
            parts.push(format!("* as {}", local));
            self.name_ref(local, *symbol)
        });
        let named: Vec<NamedImport> = spec
            .named
            .iter()
            .map(|(imported, local, symbol)| NamedImport {
                imported: imported.clone(),
                local: self.name_ref(local, *symbol),
            })
            .collect();
        if !named.is_empty() {
            let clauses: Vec<String> = named.iter().map(NamedImport::clause).collect();
            parts.push(format!("{{ {} }}", clauses.join(", ")));
        }
        let text = format!("import {} from {};", parts.join(", "), spec.specifier);
        self.push_statement(
            scope.into(),
            StatementKind::Import(ImportStatement {
                specifier: spec.specifier,
                default,
                named,
                namespace,
            }),
            text,
        )
    }

    /// `import local = require("specifier")`.
    pub fn import_equals(
        &mut self,
        scope: impl Into<Scope>,
        local: &str,
        specifier: &str,
        symbol: SymbolId,
    ) -> StmtId {
        let local = self.name_ref(local, symbol);
        let text = format!("import {} = require('{}');", local.text, specifier);
        self.push_statement(
            scope.into(),
            StatementKind::ImportEquals(ImportEqualsStatement {
                local,
                specifier: Some(ModuleSpecifier::Literal(specifier.to_string())),
            }),
            text,
        )
    }

    pub fn export_declaration(&mut self, scope: impl Into<Scope>, spec: ExportSpec) -> StmtId {
        let from = spec
            .specifier
            .as_ref()
            .map(|specifier| format!(" from {}", specifier))
            .unwrap_or_default();
        let (clauses, text) = match &spec.clauses {
            None => (None, format!("export *{};", from)),
            Some(clauses) => {
                let mut rendered = Vec::new();
                let mut specifiers = Vec::new();
                for (property, exported, symbol) in clauses {
                    let property_name = property
                        .as_ref()
                        .map(|property| self.name_ref(property, *symbol));
                    let name = self.name_ref(exported, *symbol);
                    rendered.push(match property {
                        Some(property) => format!("{} as {}", property, exported),
                        None => exported.clone(),
                    });
                    specifiers.push(ExportSpecifier {
                        property_name,
                        name,
                    });
                }
                (
                    Some(specifiers),
                    format!("export {{ {} }}{};", rendered.join(", "), from),
                )
            }
        };
        self.push_statement(
            scope.into(),
            StatementKind::ExportDeclaration(ExportDeclaration {
                specifier: spec.specifier,
                clauses,
            }),
            text,
        )
    }

    /// `export default name;`
    pub fn export_default(&mut self, scope: impl Into<Scope>, name: &str, symbol: SymbolId) -> StmtId {
        self.export_assignment(scope.into(), false, name, symbol)
    }

    /// `export = name;`
    pub fn export_equals(&mut self, scope: impl Into<Scope>, name: &str, symbol: SymbolId) -> StmtId {
        self.export_assignment(scope.into(), true, name, symbol)
    }

    fn export_assignment(&mut self, scope: Scope, is_export_equals: bool, name: &str, symbol: SymbolId) -> StmtId {
        let expression = self.name_ref(name, symbol);
        let text = if is_export_equals {
            format!("export = {};", name)
        } else {
            format!("export default {};", name)
        };
        self.push_statement(
            scope,
            StatementKind::ExportAssignment(ExportAssignment {
                is_export_equals,
                expression: Some(expression),
            }),
            text,
        )
    }

    /// A statement the bundler never places (expression statements and the like).
    pub fn other(&mut self, scope: impl Into<Scope>, text: &str) -> StmtId {
        self.push_statement(scope.into(), StatementKind::Other, text.to_string())
    }

    /// Records `symbol` as exported from `unit` under `exported_name`.
    pub fn export(&mut self, unit: UnitId, exported_name: &str, symbol: SymbolId) {
        self.oracle.add_export(unit, exported_name, symbol);
    }

    pub fn resolve_module(&mut self, from: UnitId, specifier: &str, to: UnitId) {
        self.oracle.add_module_resolution(from, specifier, to);
    }

    pub fn root_file(&mut self, entry: impl Into<PathBuf>, canonical: impl Into<PathBuf>) {
        self.program.root_files.insert(entry.into(), canonical.into());
    }

    pub fn type_root(&mut self, path: impl Into<PathBuf>) {
        self.program.type_roots.push(path.into());
    }

    pub fn preserve_const_enums(&mut self, preserve: bool) {
        self.program.preserve_const_enums = preserve;
    }

    pub fn build(self) -> (Program, MemoryOracle) {
        (self.program, self.oracle)
    }
}
