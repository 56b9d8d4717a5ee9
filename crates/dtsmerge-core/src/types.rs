//! Core data types for declaration bundling.
//!
//! A [`Program`] is the parsed view of a project handed over by the parsing
//! collaborator: an arena of [`Statement`]s grouped into [`SourceUnit`]s.
//! Statements never own their children directly; nested bodies (namespaces,
//! `declare module` blocks, `declare global`) refer back into the arena by
//! [`StmtId`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical, merging-aware identity of a declared entity.
///
/// Two syntactic declarations that merge (an interface declared twice, a
/// function and a namespace sharing a name) resolve to the same `SymbolId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Index of a [`SourceUnit`] inside a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Index of a [`Statement`] inside a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StmtId(pub u32);

/// A syntactic node the resolution oracle can map to a [`SymbolId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A name occurrence in source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRef {
    /// Node handed to the oracle for resolution.
    pub node: NodeId,
    /// The identifier as written.
    pub text: String,
}

/// Kind of a named declaration statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Interface,
    TypeAlias,
    Class,
    Function,
    /// `var`/`let`/`const` statement, possibly with several declarators.
    Variable,
    Enum {
        is_const: bool,
    },
    /// `namespace N { ... }` or `declare module N { ... }` with an identifier name.
    Namespace,
}

impl DeclarationKind {
    /// Whether declarations of this kind exist at runtime.
    pub fn is_value(&self) -> bool {
        !matches!(self, DeclarationKind::Interface | DeclarationKind::TypeAlias)
    }

    /// Keyword used when reporting this kind to users.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclarationKind::Interface => "interface",
            DeclarationKind::TypeAlias => "type",
            DeclarationKind::Class => "class",
            DeclarationKind::Function => "function",
            DeclarationKind::Variable => "variable",
            DeclarationKind::Enum { .. } => "enum",
            DeclarationKind::Namespace => "namespace",
        }
    }
}

/// One declared binding of a declaration statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarator {
    /// Node resolving to the declared symbol.
    pub node: NodeId,
    /// Declared name; `None` for anonymous `export default class {}`.
    pub name: Option<String>,
}

/// A statement introducing one or more declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationStatement {
    pub kind: DeclarationKind,
    pub declarators: Vec<Declarator>,
    pub has_export: bool,
    pub has_default: bool,
    /// Every identifier referenced from the declaration's type signature.
    pub type_references: Vec<NameRef>,
    /// Member statements of a namespace body.
    pub body: Vec<StmtId>,
}

/// Module specifier of an import or re-export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleSpecifier {
    /// A string literal, stored without quotes.
    Literal(String),
    /// Anything the bundler cannot resolve statically, kept as source text.
    Expression(String),
}

impl ModuleSpecifier {
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            ModuleSpecifier::Literal(text) => Some(text),
            ModuleSpecifier::Expression(_) => None,
        }
    }
}

impl fmt::Display for ModuleSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleSpecifier::Literal(text) => write!(f, "'{}'", text),
            ModuleSpecifier::Expression(text) => f.write_str(text),
        }
    }
}

/// `import { imported as local }` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedImport {
    /// Name exported by the target module when it differs from the local one.
    pub imported: Option<String>,
    pub local: NameRef,
}

impl NamedImport {
    /// The element exactly as it must appear inside `import { ... }`.
    pub fn clause(&self) -> String {
        match &self.imported {
            Some(imported) if imported != &self.local.text => {
                format!("{} as {}", imported, self.local.text)
            }
            _ => self.local.text.clone(),
        }
    }
}

/// `import ... from "specifier"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStatement {
    pub specifier: ModuleSpecifier,
    pub default: Option<NameRef>,
    pub named: Vec<NamedImport>,
    pub namespace: Option<NameRef>,
}

/// `import local = require("specifier")`; `specifier` is `None` for
/// `import local = Some.Entity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEqualsStatement {
    pub local: NameRef,
    pub specifier: Option<ModuleSpecifier>,
}

/// `export { property_name as name }` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub property_name: Option<NameRef>,
    pub name: NameRef,
}

impl ExportSpecifier {
    /// The name looked up in the exporting scope.
    pub fn local(&self) -> &NameRef {
        self.property_name.as_ref().unwrap_or(&self.name)
    }
}

/// `export { ... } [from "x"]` or `export * from "x"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDeclaration {
    pub specifier: Option<ModuleSpecifier>,
    /// `None` for star re-exports.
    pub clauses: Option<Vec<ExportSpecifier>>,
}

/// `export default expr` or `export = expr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportAssignment {
    pub is_export_equals: bool,
    pub expression: Option<NameRef>,
}

/// `declare module "name" { ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientModule {
    /// Module name without quotes.
    pub name: String,
    /// Node resolving to the ambient module's symbol.
    pub node: NodeId,
    /// `None` for the shorthand `declare module "name";`.
    pub body: Option<Vec<StmtId>>,
}

/// `declare global { ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAugmentation {
    pub body: Vec<StmtId>,
}

/// Closed set of top-level statement shapes the bundler distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StatementKind {
    Declaration(DeclarationStatement),
    AmbientModule(AmbientModule),
    GlobalAugmentation(GlobalAugmentation),
    ExportAssignment(ExportAssignment),
    ExportDeclaration(ExportDeclaration),
    Import(ImportStatement),
    ImportEquals(ImportEqualsStatement),
    Other,
}

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: StmtId,
    pub unit: UnitId,
    pub kind: StatementKind,
    /// Source text. For declarations the leading `export`, `default`,
    /// `declare` and `const` modifiers are removed; everything else is
    /// verbatim.
    pub text: String,
}

impl Statement {
    pub fn as_declaration(&self) -> Option<&DeclarationStatement> {
        match &self.kind {
            StatementKind::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(
            &self.kind,
            StatementKind::Declaration(DeclarationStatement {
                kind: DeclarationKind::Class,
                ..
            })
        )
    }

    /// First declared name, if any.
    pub fn name(&self) -> Option<&str> {
        self.as_declaration()?
            .declarators
            .iter()
            .find_map(|d| d.name.as_deref())
    }

    /// Single-line preview used in log messages.
    pub fn preview(&self) -> String {
        let flat: String = self.text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        flat.chars().take(50).collect()
    }
}

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub id: UnitId,
    pub path: PathBuf,
    pub statements: Vec<StmtId>,
    /// Part of the language's built-in declarations (`lib.*.d.ts`).
    pub is_default_lib: bool,
}

/// The parsed program shared by every entry point of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub units: Vec<SourceUnit>,
    pub statements: Vec<Statement>,
    /// Entry file path to the canonical root file path the compiler uses.
    pub root_files: BTreeMap<PathBuf, PathBuf>,
    /// Configured type root directories.
    pub type_roots: Vec<PathBuf>,
    /// Compiler-level `preserveConstEnums`.
    pub preserve_const_enums: bool,
}

impl Program {
    /// Units that are candidates for output (built-in declarations excluded).
    pub fn source_units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.iter().filter(|unit| !unit.is_default_lib)
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated for this program.
    pub fn unit(&self, id: UnitId) -> &SourceUnit {
        &self.units[id.0 as usize]
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated for this program.
    pub fn statement(&self, id: StmtId) -> &Statement {
        &self.statements[id.0 as usize]
    }

    pub fn unit_by_path(&self, path: &Path) -> Option<&SourceUnit> {
        self.units.iter().find(|unit| unit.path == path)
    }

    /// Finds the unit backing an entry file, following root-file remapping.
    pub fn root_unit_for(&self, entry: &Path) -> Option<&SourceUnit> {
        let canonical = self
            .root_files
            .get(entry)
            .map(PathBuf::as_path)
            .unwrap_or(entry);
        self.unit_by_path(canonical)
    }
}

/// Where a symbol is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Declaration {
    pub unit: UnitId,
    /// `None` when the declaration is the source unit itself (module symbols).
    pub statement: Option<StmtId>,
}

/// A name exported from a source unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSymbol {
    pub exported_name: String,
    pub symbol: SymbolId,
}
