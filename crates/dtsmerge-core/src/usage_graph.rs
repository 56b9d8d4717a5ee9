//! Type-level usage graph between declaration identities.
//!
//! Edges run from a user to the symbol it references (`uses(A, B)`), and are
//! mirrored in a reverse index so both "what does A reach" and "who uses B"
//! are cheap. All identities are split through the oracle before they are
//! stored, so merged parts share edges.
//!
//! Time complexity: O(V + E) to build and per reachability query.

use crate::oracle::ResolutionOracle;
use crate::types::{Program, StatementKind, StmtId, SymbolId, UnitId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Who a statement list belongs to while edges are recorded.
#[derive(Clone, Copy)]
enum Owner<'a> {
    /// Top level of a unit: only exported declarations belong to the module.
    Module(&'a [SymbolId]),
    /// Namespace or ambient module body: every member belongs to the owner.
    Block(&'a [SymbolId]),
    /// `declare global` body.
    Global,
}

/// Directed "is used by" relation, computed once per program.
///
/// The graph is immutable after [`UsageGraph::build`]; share it between
/// entry points behind an `Arc`.
#[derive(Debug, Default, Clone)]
pub struct UsageGraph {
    /// Forward edges: user -> symbols its signature references
    uses: FxHashMap<SymbolId, FxHashSet<SymbolId>>,
    /// Reverse edges: symbol -> its users
    used_by: FxHashMap<SymbolId, FxHashSet<SymbolId>>,
}

impl UsageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspects every declaration of every non-built-in unit.
    pub fn build(program: &Program, oracle: &dyn ResolutionOracle) -> Self {
        let mut graph = Self::new();
        for unit in program.source_units() {
            let module: Vec<SymbolId> = oracle
                .module_symbol(unit.id)
                .map(|symbol| oracle.split_merged_identity(symbol))
                .unwrap_or_default();
            graph.visit(program, oracle, unit.id, &unit.statements, Owner::Module(&module));
        }

        tracing::debug!(
            symbols = graph.used_by.len(),
            "Usage graph built for {} units",
            program.source_units().count()
        );
        graph
    }

    fn visit(
        &mut self,
        program: &Program,
        oracle: &dyn ResolutionOracle,
        unit: UnitId,
        statements: &[StmtId],
        owner: Owner<'_>,
    ) {
        for id in statements {
            let statement = program.statement(*id);
            match &statement.kind {
                StatementKind::Declaration(decl) => {
                    let declared: Vec<SymbolId> = decl
                        .declarators
                        .iter()
                        .flat_map(|d| oracle.resolve_identities(d.node))
                        .collect();

                    match owner {
                        Owner::Module(module) if decl.has_export => {
                            self.add_edges(module, &declared)
                        }
                        Owner::Block(parents) => self.add_edges(parents, &declared),
                        _ => {}
                    }

                    for reference in &decl.type_references {
                        let referenced = oracle.resolve_identities(reference.node);
                        self.add_edges(&declared, &referenced);
                    }

                    if !decl.body.is_empty() {
                        self.visit(program, oracle, unit, &decl.body, Owner::Block(&declared));
                    }
                }
                StatementKind::AmbientModule(module) => {
                    let declared = oracle.resolve_identities(module.node);
                    if let Some(body) = &module.body {
                        self.visit(program, oracle, unit, body, Owner::Block(&declared));
                    }
                }
                StatementKind::GlobalAugmentation(global) => {
                    self.visit(program, oracle, unit, &global.body, Owner::Global);
                }
                StatementKind::ExportDeclaration(export) => {
                    let parents = match owner {
                        Owner::Module(parents) | Owner::Block(parents) => parents,
                        Owner::Global => continue,
                    };
                    match &export.clauses {
                        Some(clauses) => {
                            for clause in clauses {
                                let target = oracle.resolve_identities(clause.local().node);
                                self.add_edges(parents, &target);
                                // the exported alias may be its own symbol
                                let alias = oracle.resolve_identities(clause.name.node);
                                self.add_edges(&alias, &target);
                            }
                        }
                        None => {
                            let target: Vec<SymbolId> = export
                                .specifier
                                .as_ref()
                                .and_then(|specifier| specifier.as_literal())
                                .and_then(|specifier| oracle.resolve_module(unit, specifier))
                                .and_then(|target| oracle.module_symbol(target))
                                .map(|symbol| oracle.split_merged_identity(symbol))
                                .unwrap_or_default();
                            self.add_edges(parents, &target);
                        }
                    }
                }
                StatementKind::ExportAssignment(assignment) => {
                    let parents = match owner {
                        Owner::Module(parents) | Owner::Block(parents) => parents,
                        Owner::Global => continue,
                    };
                    if let Some(expression) = &assignment.expression {
                        let target = oracle.resolve_identities(expression.node);
                        self.add_edges(parents, &target);
                    }
                }
                StatementKind::Import(_)
                | StatementKind::ImportEquals(_)
                | StatementKind::Other => {}
            }
        }
    }

    fn add_edges(&mut self, users: &[SymbolId], used: &[SymbolId]) {
        for user in users {
            for target in used {
                self.add_edge(*user, *target);
            }
        }
    }

    /// Records that `user`'s signature references `used`.
    pub fn add_edge(&mut self, user: SymbolId, used: SymbolId) {
        if user == used {
            return;
        }
        self.uses.entry(user).or_default().insert(used);
        self.used_by.entry(used).or_default().insert(user);
    }

    /// Whether `candidate` is transitively used by `root`, including `candidate == root`.
    pub fn is_used_by(&self, candidate: SymbolId, root: SymbolId) -> bool {
        if candidate == root {
            return true;
        }

        let mut visited = FxHashSet::default();
        let mut stack = vec![candidate];
        visited.insert(candidate);
        while let Some(current) = stack.pop() {
            let Some(users) = self.used_by.get(&current) else {
                continue;
            };
            for user in users {
                if *user == root {
                    return true;
                }
                if visited.insert(*user) {
                    stack.push(*user);
                }
            }
        }
        false
    }

    /// Whether any of `candidates` is used by any of `roots`.
    pub fn is_used_by_any(&self, candidates: &[SymbolId], roots: &[SymbolId]) -> bool {
        candidates
            .iter()
            .any(|candidate| roots.iter().any(|root| self.is_used_by(*candidate, *root)))
    }

    /// Every symbol transitively used by `roots`, roots included.
    ///
    /// Membership in the returned set is equivalent to [`is_used_by_any`](Self::is_used_by_any)
    /// against the same roots, computed once.
    pub fn reachable_from(&self, roots: &[SymbolId]) -> FxHashSet<SymbolId> {
        let mut reachable: FxHashSet<SymbolId> = roots.iter().copied().collect();
        let mut queue: Vec<SymbolId> = roots.to_vec();
        while let Some(current) = queue.pop() {
            if let Some(used) = self.uses.get(&current) {
                for symbol in used {
                    if reachable.insert(*symbol) {
                        queue.push(*symbol);
                    }
                }
            }
        }
        reachable
    }

    /// One-hop users of `symbol`; `None` if nothing references it.
    pub fn users_of(&self, symbol: SymbolId) -> Option<&FxHashSet<SymbolId>> {
        self.used_by.get(&symbol)
    }

    /// Symbols referenced by `symbol`'s signature.
    pub fn used_by_symbol(&self, symbol: SymbolId) -> Option<&FxHashSet<SymbolId>> {
        self.uses.get(&symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DeclarationSpec, ExportSpec, ProgramBuilder};
    use proptest::prelude::*;

    fn chain() -> UsageGraph {
        // 0 uses 1 uses 2, 3 isolated
        let mut graph = UsageGraph::new();
        graph.add_edge(SymbolId(0), SymbolId(1));
        graph.add_edge(SymbolId(1), SymbolId(2));
        graph
    }

    #[test]
    fn test_transitive_use() {
        let graph = chain();

        assert!(graph.is_used_by(SymbolId(2), SymbolId(0)));
        assert!(graph.is_used_by(SymbolId(1), SymbolId(0)));
        assert!(!graph.is_used_by(SymbolId(0), SymbolId(2)));
        assert!(!graph.is_used_by(SymbolId(3), SymbolId(0)));
    }

    #[test]
    fn test_root_uses_itself() {
        let graph = UsageGraph::new();
        assert!(graph.is_used_by(SymbolId(7), SymbolId(7)));
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = UsageGraph::new();
        graph.add_edge(SymbolId(0), SymbolId(1));
        graph.add_edge(SymbolId(1), SymbolId(0));

        assert!(graph.is_used_by(SymbolId(0), SymbolId(1)));
        assert!(!graph.is_used_by(SymbolId(0), SymbolId(5)));
        assert_eq!(graph.reachable_from(&[SymbolId(0)]).len(), 2);
    }

    #[test]
    fn test_users_are_one_hop() {
        let graph = chain();

        let users = graph.users_of(SymbolId(2)).unwrap();
        assert_eq!(users.len(), 1);
        assert!(users.contains(&SymbolId(1)));
        assert!(graph.users_of(SymbolId(0)).is_none());
    }

    #[test]
    fn test_build_from_program() {
        let mut builder = ProgramBuilder::new();
        let internal = builder.unit("/project/src/internal.ts");
        let index = builder.unit("/project/src/index.ts");
        let foo = builder.symbol();
        let bar = builder.symbol();
        let unused = builder.symbol();
        builder.declare(internal, DeclarationSpec::interface("Bar", bar));
        builder.declare(internal, DeclarationSpec::interface("Unused", unused));
        builder.declare(
            internal,
            DeclarationSpec::interface("Foo", foo).exported().uses("Bar", bar),
        );
        builder.export_declaration(index, ExportSpec::from("./internal").name("Foo", foo));
        let index_module = builder.module_symbol(index).unwrap();
        let (program, oracle) = builder.build();

        let graph = UsageGraph::build(&program, &oracle);

        assert!(graph.is_used_by(bar, foo));
        assert!(graph.is_used_by(bar, index_module));
        assert!(!graph.is_used_by(unused, foo));
        assert!(graph.users_of(foo).unwrap().contains(&index_module));
    }

    #[test]
    fn test_namespace_members_used_by_namespace() {
        let mut builder = ProgramBuilder::new();
        let unit = builder.unit("/project/src/index.ts");
        let ns = builder.symbol();
        let member = builder.symbol();
        let namespace = builder.declare(unit, DeclarationSpec::namespace("NS", ns).exported());
        builder.declare(namespace, DeclarationSpec::interface("Member", member));
        let (program, oracle) = builder.build();

        let graph = UsageGraph::build(&program, &oracle);
        assert!(graph.is_used_by(member, ns));
    }

    #[test]
    fn test_merged_identity_shares_edges() {
        let mut builder = ProgramBuilder::new();
        let unit = builder.unit("/project/src/index.ts");
        let iface = builder.symbol();
        let ns = builder.symbol();
        let dep = builder.symbol();
        let user = builder.symbol();
        let merged = builder.merged(&[iface, ns]);
        builder.declare(unit, DeclarationSpec::interface("Dep", dep));
        builder.declare(unit, DeclarationSpec::interface("User", user).uses("A", merged));
        builder.declare(unit, DeclarationSpec::namespace("A", ns).uses("Dep", dep));
        let (program, oracle) = builder.build();

        let graph = UsageGraph::build(&program, &oracle);
        // the merged reference reaches both parts and through them `Dep`
        assert!(graph.is_used_by(iface, user));
        assert!(graph.is_used_by(ns, user));
        assert!(graph.is_used_by(dep, user));
        assert!(graph.users_of(merged).is_none());
    }

    proptest! {
        #[test]
        fn prop_reachable_matches_pointwise_queries(
            edges in proptest::collection::vec((0u32..12, 0u32..12), 0..40),
            root in 0u32..12,
        ) {
            let mut graph = UsageGraph::new();
            for (user, used) in &edges {
                graph.add_edge(SymbolId(*user), SymbolId(*used));
            }
            let reachable = graph.reachable_from(&[SymbolId(root)]);
            for candidate in 0u32..12 {
                prop_assert_eq!(
                    reachable.contains(&SymbolId(candidate)),
                    graph.is_used_by(SymbolId(candidate), SymbolId(root))
                );
            }
        }
    }
}
