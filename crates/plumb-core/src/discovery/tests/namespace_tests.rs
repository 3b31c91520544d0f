use std::path::PathBuf;

use crate::discovery::namespace::NamespaceMap;

#[test]
fn test_insert_appends_directories_to_existing_namespace() {
    let mut map = NamespaceMap::new();
    map.insert("app::runner", "/a/src");
    map.insert("app::runner", "/b/src");
    map.insert("app::other", "/c/src");

    assert_eq!(map.len(), 2);
    assert_eq!(
        map.dirs("app::runner"),
        Some(&[PathBuf::from("/a/src"), PathBuf::from("/b/src")][..])
    );
    assert!(map.dirs("app::missing").is_none());
}

#[test]
fn test_with_suffix_extends_namespace_and_directories() {
    let map = NamespaceMap::new()
        .with("app::runner", "/modules/runner/src")
        .with("app::extra", "/modules/extra/src");

    let suffixed = map.with_suffix("Plugin/Runner");

    assert_eq!(
        suffixed.dirs("app::runner::Plugin::Runner"),
        Some(&[PathBuf::from("/modules/runner/src/Plugin/Runner")][..])
    );
    assert_eq!(
        suffixed.dirs("app::extra::Plugin::Runner"),
        Some(&[PathBuf::from("/modules/extra/src/Plugin/Runner")][..])
    );
    assert!(suffixed.dirs("app::runner").is_none());
}

#[test]
fn test_with_suffix_ignores_stray_slashes() {
    let map = NamespaceMap::new().with("app::runner", "/src");
    let suffixed = map.with_suffix("/Plugin//Runner/");

    let namespaces: Vec<&str> = suffixed.iter().map(|(name, _)| name).collect();
    assert_eq!(namespaces, vec!["app::runner::Plugin::Runner"]);
}

#[test]
fn test_empty_suffix_returns_same_map() {
    let map: NamespaceMap = vec![("app::runner", "/src")].into_iter().collect();
    assert_eq!(map.with_suffix(""), map);
}
