//! Traversal behaviour over parsed lockfiles.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use lockgraph::{
    DependencyKind, LockfileBuilder, PackageId, PackageManager, ParsedLockfile, Visitor, Walk,
    traverse,
};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn npm_fixture() -> ParsedLockfile {
    let contents = std::fs::read_to_string(format!("{FIXTURES_DIR}/package-lock.json")).unwrap();
    lockgraph::parse(&contents, "package-lock.json", None).unwrap()
}

/// `root -> a -> b -> a` with every edge a runtime dependency.
fn two_node_cycle() -> (ParsedLockfile, PackageId, PackageId) {
    let mut builder = LockfileBuilder::new(PackageManager::Npm);
    let root = builder.add_package("root", None);
    let a = builder.add_package("a", Some("1.0.0".to_string()));
    let b = builder.add_package("b", Some("1.0.0".to_string()));
    builder.add_dependency(root, DependencyKind::Runtime, a);
    builder.add_dependency(a, DependencyKind::Runtime, b);
    builder.add_dependency(b, DependencyKind::Runtime, a);
    (builder.build(root).unwrap(), a, b)
}

#[test]
fn test_runtime_walk_visits_every_runtime_package_once() {
    let parsed = npm_fixture();
    let mut seen = Vec::new();

    let mut visitor = Visitor::new().on_dependency(|visit| {
        seen.push(format!("{}@{}", visit.package.name, visit.package.version_str()));
    });
    parsed.traverse(&mut visitor);
    drop(visitor);

    assert_eq!(
        seen,
        [
            "chalk@4.1.2",
            "ansi-styles@4.3.0",
            "color-convert@2.0.1",
            "color-name@1.1.4",
            "supports-color@7.2.0",
            "has-flag@4.0.0",
        ]
    );
}

#[test]
fn test_dev_only_walk_never_reaches_runtime_grandchildren() {
    let mut builder = LockfileBuilder::new(PackageManager::Npm);
    let root = builder.add_package("root", None);
    let jest = builder.add_package("jest", Some("29.7.0".to_string()));
    let expect = builder.add_package("expect", Some("29.7.0".to_string()));
    let chalk = builder.add_package("chalk", Some("4.1.2".to_string()));
    builder.add_dependency(root, DependencyKind::Dev, jest);
    builder.add_dependency(root, DependencyKind::Runtime, chalk);
    builder.add_dependency(jest, DependencyKind::Runtime, expect);
    let parsed = builder.build(root).unwrap();

    let mut seen = Vec::new();
    let mut visitor = Visitor::new().on_dev_dependency(|visit| seen.push(visit.id));
    parsed.traverse(&mut visitor);
    drop(visitor);

    assert_eq!(seen, [jest]);

    let fixture = npm_fixture();
    let mut dev = Vec::new();
    let mut visitor =
        Visitor::new().on_dev_dependency(|visit| dev.push(visit.package.name.clone()));
    fixture.traverse(&mut visitor);
    drop(visitor);

    assert_eq!(dev, ["typescript"]);
}

#[test]
fn test_cycle_reports_back_edge_target_once() {
    let (parsed, a, b) = two_node_cycle();
    let mut calls = Vec::new();

    let mut visitor = Visitor::new().on_dependency(|visit| calls.push((visit.parent, visit.id)));
    traverse(&parsed, a, &mut visitor);
    drop(visitor);

    assert_eq!(calls, [(a, b)]);
    assert!(parsed.has_cycles());
}

#[test]
fn test_cycle_from_root_terminates() {
    let (parsed, a, b) = two_node_cycle();
    let mut paths = Vec::new();

    let mut visitor = Visitor::new().on_dependency(|visit| paths.push(visit.path.to_vec()));
    parsed.traverse(&mut visitor);
    drop(visitor);

    let root = parsed.root();
    assert_eq!(paths, [vec![root], vec![root, a]]);
    assert_eq!(parsed.edges(b, DependencyKind::Runtime), &[a]);
}

#[test]
fn test_skip_children_prunes_subtree() {
    let parsed = npm_fixture();
    let mut seen = Vec::new();

    let mut visitor = Visitor::new().on_dependency(|visit| {
        seen.push(visit.package.name.clone());
        if visit.package.name == "supports-color" {
            Walk::SkipChildren
        } else {
            Walk::Continue
        }
    });
    parsed.traverse(&mut visitor);
    drop(visitor);

    assert!(seen.iter().any(|name| name == "supports-color"));
    assert!(!seen.iter().any(|name| name == "has-flag"));
    assert!(seen.iter().any(|name| name == "color-name"));
}

#[test]
fn test_parent_and_kind_are_reported() {
    let parsed = npm_fixture();
    let chalk = parsed.find("chalk").unwrap();
    let mut visits = Vec::new();

    let mut visitor = Visitor::new()
        .on_dependency(|visit| visits.push((visit.parent, visit.kind, visit.id)))
        .on_dev_dependency(|_| false);
    parsed.traverse(&mut visitor);
    drop(visitor);

    assert_eq!(visits[0], (parsed.root(), DependencyKind::Runtime, chalk));
    assert!(visits.iter().all(|(_, kind, _)| *kind == DependencyKind::Runtime));
}
