//! The per-entry accumulator filled by the collector.

use dtsmerge_core::{StmtId, SymbolId};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// Import forms gathered for one external specifier.
///
/// The four forms are independent; one specifier may be imported several ways.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    /// `import Name from "x"`
    pub default_imports: IndexSet<String>,
    /// Clauses of `import { a, b as c } from "x"`, exactly as written
    pub named_imports: IndexSet<String>,
    /// `import * as ns from "x"`
    pub star_imports: IndexSet<String>,
    /// `import name = require("x")`
    pub require_imports: IndexSet<String>,
}

impl ImportRecord {
    pub fn is_empty(&self) -> bool {
        self.default_imports.is_empty()
            && self.named_imports.is_empty()
            && self.star_imports.is_empty()
            && self.require_imports.is_empty()
    }
}

/// Output category a declaration identity was placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Placement {
    Inline,
    Import,
    Reference,
}

/// Everything the renderer needs for one entry point.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectingResult {
    /// Companion package names for `/// <reference types="..." />`, first seen first
    pub types_references: IndexSet<String>,
    /// External specifier -> merged import forms
    pub imports: IndexMap<String, ImportRecord>,
    /// Statements emitted in order
    pub statements: Vec<StmtId>,
    /// Clauses of the final export block, `Original as Exported` or a bare name
    pub renamed_exports: Vec<String>,
    #[serde(skip)]
    placements: FxHashMap<SymbolId, Placement>,
    #[serde(skip)]
    emitted: FxHashSet<StmtId>,
}

impl CollectingResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where an identity was placed, if anywhere.
    pub fn placement_of(&self, symbol: SymbolId) -> Option<Placement> {
        self.placements.get(&symbol).copied()
    }

    /// Whether any of `identities` already went to a category other than `placement`.
    pub fn conflicts(&self, identities: &[SymbolId], placement: Placement) -> bool {
        identities.iter().any(|symbol| {
            self.placement_of(*symbol)
                .is_some_and(|existing| existing != placement)
        })
    }

    pub fn mark(&mut self, identities: &[SymbolId], placement: Placement) {
        for symbol in identities {
            self.placements.entry(*symbol).or_insert(placement);
        }
    }

    /// Appends a declaration statement unless one of its identities is already inlined.
    ///
    /// Returns whether the statement was appended.
    pub fn inline(&mut self, statement: StmtId, identities: &[SymbolId]) -> bool {
        let already_inlined = identities
            .iter()
            .any(|symbol| self.placement_of(*symbol) == Some(Placement::Inline));
        if already_inlined || !self.emitted.insert(statement) {
            return false;
        }
        self.statements.push(statement);
        self.mark(identities, Placement::Inline);
        true
    }

    /// Appends a statement that carries no identity of its own (`declare global`,
    /// export assignments, re-export lists). Each statement is appended once.
    pub fn push_verbatim(&mut self, statement: StmtId) -> bool {
        if !self.emitted.insert(statement) {
            return false;
        }
        self.statements.push(statement);
        true
    }

    pub fn add_reference(&mut self, types_library: &str) {
        if !self.types_references.contains(types_library) {
            self.types_references.insert(types_library.to_string());
        }
    }

    /// The record for `specifier`, created on first use.
    pub fn import_record(&mut self, specifier: &str) -> &mut ImportRecord {
        self.imports.entry(specifier.to_string()).or_default()
    }

    pub fn add_rename(&mut self, clause: String) {
        if !self.renamed_exports.contains(&clause) {
            self.renamed_exports.push(clause);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_once_per_identity() {
        let mut result = CollectingResult::new();
        let foo = [SymbolId(1)];

        assert!(result.inline(StmtId(0), &foo));
        // a merged part declared by another statement
        assert!(!result.inline(StmtId(1), &foo));
        assert!(!result.inline(StmtId(0), &foo));
        assert_eq!(result.statements, vec![StmtId(0)]);
    }

    #[test]
    fn test_conflicting_placements() {
        let mut result = CollectingResult::new();
        result.mark(&[SymbolId(1)], Placement::Import);

        assert!(result.conflicts(&[SymbolId(1)], Placement::Inline));
        assert!(!result.conflicts(&[SymbolId(1)], Placement::Import));
        assert!(!result.conflicts(&[SymbolId(2)], Placement::Inline));
    }

    #[test]
    fn test_verbatim_statements_once() {
        let mut result = CollectingResult::new();

        assert!(result.push_verbatim(StmtId(4)));
        assert!(!result.push_verbatim(StmtId(4)));
        assert_eq!(result.statements.len(), 1);
    }

    #[test]
    fn test_import_records_keyed_by_specifier() {
        let mut result = CollectingResult::new();
        result.import_record("pkg").named_imports.insert("A".into());
        result.import_record("pkg").named_imports.insert("A".into());
        result.import_record("pkg/sub").default_imports.insert("B".into());

        assert_eq!(result.imports.len(), 2);
        assert_eq!(result.imports["pkg"].named_imports.len(), 1);
        assert!(!result.imports["pkg/sub"].is_empty());
    }

    #[test]
    fn test_references_and_renames_deduplicated() {
        let mut result = CollectingResult::new();
        result.add_reference("node");
        result.add_reference("jest");
        result.add_reference("node");
        result.add_rename("Foo as Bar".into());
        result.add_rename("Foo as Bar".into());

        assert_eq!(
            result.types_references.iter().collect::<Vec<_>>(),
            vec!["node", "jest"]
        );
        assert_eq!(result.renamed_exports, vec!["Foo as Bar".to_string()]);
    }

    #[test]
    fn test_serializes_public_fields_only() {
        let mut result = CollectingResult::new();
        result.inline(StmtId(2), &[SymbolId(9)]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["statements"], serde_json::json!([2]));
        assert!(json.get("placements").is_none());
    }
}
