//! Property tests for module classification

use dtsmerge_config::LibrariesOptions;
use dtsmerge_rules::{library_name, Disposition, ModuleCriteria};
use proptest::prelude::*;

fn package_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9-]{0,8}",
        "[a-z][a-z0-9-]{0,5}".prop_map(|name| format!("@scope/{}", name)),
        "[a-z][a-z0-9-]{0,5}".prop_map(|name| format!("@types/{}", name)),
    ]
}

fn libraries(
    inlined: Vec<String>,
    imported: Option<Vec<String>>,
    allowed: Option<Vec<String>>,
) -> LibrariesOptions {
    LibrariesOptions {
        inlined_libraries: inlined,
        imported_libraries: imported,
        allowed_types_libraries: allowed,
    }
}

proptest! {
    #[test]
    fn prop_library_name_extracts_package(package in package_name(), file in "[a-z]{1,6}\\.d\\.ts") {
        let path = format!("/work/node_modules/{}/{}", package, file);
        prop_assert_eq!(library_name(&path), Some(package));
    }

    #[test]
    fn prop_local_paths_always_inline(
        segments in proptest::collection::vec("[a-z]{1,6}", 1..4),
        inlined in proptest::collection::vec(package_name(), 0..3),
        imported in proptest::option::of(proptest::collection::vec(package_name(), 0..3)),
    ) {
        let criteria = ModuleCriteria::new(&libraries(inlined, imported, None), &[]);
        let path = format!("/work/src/{}.ts", segments.join("/"));
        let info = criteria.classify_str(&path);

        prop_assert_eq!(info.disposition, Disposition::Inline);
        prop_assert!(!info.is_external);
    }

    #[test]
    fn prop_inline_list_takes_precedence(package in package_name(), imported in any::<bool>()) {
        let imported = imported.then(|| vec![package.clone()]);
        let criteria = ModuleCriteria::new(&libraries(vec![package.clone()], imported, None), &[]);
        let info = criteria.classify_str(&format!("/work/node_modules/{}/index.d.ts", package));

        prop_assert_eq!(info.disposition, Disposition::Inline);
        prop_assert!(info.is_external);
    }

    #[test]
    fn prop_classification_is_deterministic(package in package_name(), with_list in any::<bool>()) {
        let imported = with_list.then(Vec::new);
        let criteria = ModuleCriteria::new(&libraries(Vec::new(), imported, None), &[]);
        let path = format!("/work/node_modules/{}/index.d.ts", package);

        prop_assert_eq!(criteria.classify_str(&path), criteria.classify_str(&path));
    }

    #[test]
    fn prop_unlisted_packages_are_imported(name in "[a-z][a-z0-9-]{0,8}", with_list in any::<bool>()) {
        let imported = with_list.then(Vec::new);
        let criteria = ModuleCriteria::new(&libraries(Vec::new(), imported, None), &[]);
        let path = format!("/work/node_modules/{}/index.d.ts", name);

        prop_assert_eq!(criteria.classify_str(&path).disposition, Disposition::Import);
        prop_assert_eq!(criteria.classify_nested_str(&path).disposition, Disposition::ModuleOnly);
    }
}
