//! End-to-end scenarios through the public API.

use bincompat_core::differ::{diff_lists, TypeDiff};
use bincompat_core::model::{
    Access, EventNode, FieldNode, MethodNode, ModuleGraph, ParameterNode, TypeKind, TypeNode,
    TypeReference, Visibility,
};
use bincompat_core::query::MethodQuery;
use bincompat_core::{
    classify_breaking_change, compute_assembly_diff, match_with_wildcards, DiffPrinter,
    JsonModuleLoader, ModuleLoader, QueryAggregator, SemanticVersionAnalyzer,
};
use serde_json::json;
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn module(types: Vec<TypeNode>) -> ModuleGraph {
    let mut m = ModuleGraph::new("Lib");
    m.types = types;
    m.normalize()
}

fn class(name: &str) -> TypeNode {
    TypeNode::new("Lib", name, TypeKind::Class, Visibility::Public)
}

fn void_method(name: &str) -> MethodNode {
    MethodNode::new(name, TypeReference::void(), Access::Public)
}

/// A type exercising every member kind.
fn rich_type() -> TypeNode {
    class("Rich")
        .with_base(TypeReference::new("Lib", "Base"))
        .with_interface(TypeReference::parse("System.Collections.Generic.IEnumerable`1<System.String>"))
        .with_method(
            void_method("Add")
                .with_parameter(ParameterNode::new("item", TypeReference::parse("System.String"))),
        )
        .with_method(MethodNode::new(".ctor", TypeReference::void(), Access::Public))
        .with_field(FieldNode::new("Count", TypeReference::parse("System.Int32"), Access::Protected))
        .with_field(
            FieldNode::new("Max", TypeReference::parse("System.Int32"), Access::Public)
                .with_constant(json!(100)),
        )
        .with_event(EventNode::new(
            "Changed",
            TypeReference::parse("System.EventHandler"),
            Access::Public,
        ))
}

fn sample_graphs() -> Vec<ModuleGraph> {
    let mut nested = TypeNode::new("", "Inner", TypeKind::Struct, Visibility::Public)
        .nested_in(TypeReference::new("Lib", "Rich"));
    nested.fields.push(FieldNode::new("X", TypeReference::parse("System.Double"), Access::Public));
    let mut generic = class("Cache`2");
    generic.generic_parameters = vec!["K".to_string(), "V".to_string()];

    vec![
        module(vec![]),
        module(vec![class("A").with_method(void_method("M"))]),
        module(vec![rich_type(), nested, generic]),
    ]
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_scenario_removed_method_is_breaking() {
    let old = module(vec![class("A").with_method(void_method("M"))]);
    let new = module(vec![class("A")]);

    let diff = compute_assembly_diff(&old, &new, &QueryAggregator::public_api()).unwrap();
    assert_eq!(diff.changed_types.len(), 1);
    assert_eq!(diff.changed_types[0].full_name, "Lib.A");
    assert_eq!(diff.changed_types[0].methods.removed_count(), 1);
    assert!(classify_breaking_change(&diff));
}

#[test]
fn test_scenario_changed_base_type_is_breaking() {
    let old = module(vec![class("A").with_base(TypeReference::new("Lib", "Base1"))]);
    let new = module(vec![class("A").with_base(TypeReference::new("Lib", "Base2"))]);

    let diff = compute_assembly_diff(&old, &new, &QueryAggregator::public_api()).unwrap();
    assert!(diff.changed_types[0].has_changed_base_type());
    assert!(classify_breaking_change(&diff));
}

#[test]
fn test_scenario_added_method_is_not_breaking() {
    let old = module(vec![class("A")]);
    let new = module(vec![class("A").with_method(void_method("N"))]);

    let diff = compute_assembly_diff(&old, &new, &QueryAggregator::public_api()).unwrap();
    let methods = &diff.changed_types[0].methods;
    assert_eq!(methods.added_count(), 1);
    assert_eq!(methods.removed_count(), 0);
    assert!(!classify_breaking_change(&diff));
}

#[test]
fn test_scenario_removed_type_is_breaking() {
    let old = module(vec![class("Old")]);
    let new = module(vec![]);

    let diff = compute_assembly_diff(&old, &new, &QueryAggregator::public_api()).unwrap();
    assert_eq!(diff.added_removed_types.removed_count(), 1);
    assert!(classify_breaking_change(&diff));
}

#[test]
fn test_scenario_virtual_method_query() {
    let ty = class("A")
        .with_method(void_method("Virtual").with_virtual(true))
        .with_method(void_method("Plain"));
    let query = MethodQuery::parse("public virtual * *(*)").unwrap();
    let found: Vec<_> = query.methods(&ty).iter().map(|m| m.name.clone()).collect();
    assert_eq!(found, vec!["Virtual"]);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_list_differ_is_symmetric() {
    let cases: [(&[i32], &[i32]); 4] = [
        (&[], &[1]),
        (&[1, 2, 3], &[3, 4]),
        (&[5, 5, 6], &[6, 7, 7]),
        (&[1, 2], &[1, 2]),
    ];
    for (a, b) in cases {
        let (mut ab_added, mut ab_removed) = (Vec::new(), Vec::new());
        diff_lists(a, b, |x, y| x == y, |x| ab_added.push(*x), |x| ab_removed.push(*x));
        let (mut ba_added, mut ba_removed) = (Vec::new(), Vec::new());
        diff_lists(b, a, |x, y| x == y, |x| ba_added.push(*x), |x| ba_removed.push(*x));
        assert_eq!(ab_removed, ba_added);
        assert_eq!(ab_added, ba_removed);
    }
}

#[test]
fn test_diffing_identical_graphs_is_empty() {
    for aggregator in [QueryAggregator::public_api(), QueryAggregator::externally_visible()] {
        for graph in sample_graphs() {
            let diff = compute_assembly_diff(&graph, &graph, &aggregator).unwrap();
            assert!(diff.added_removed_types.is_empty());
            assert!(diff.changed_types.is_empty());
            assert!(!classify_breaking_change(&diff));
        }
    }
}

#[test]
fn test_identical_types_yield_no_type_diff() {
    let aggregator = QueryAggregator::public_api();
    for graph in sample_graphs() {
        for ty in &graph.types {
            assert!(TypeDiff::compute(ty, ty, &aggregator).unwrap().is_none());
        }
    }
}

#[test]
fn test_breaking_change_monotonicity() {
    let aggregator = QueryAggregator::public_api();
    let old = module(vec![rich_type()]);

    let removals: [fn(&mut TypeNode); 4] = [
        |t| t.methods.retain(|m| m.name != "Add"),
        |t| t.fields.retain(|f| f.name != "Count"),
        |t| t.events.clear(),
        |t| t.interfaces.clear(),
    ];
    for remove in removals {
        let mut changed = rich_type();
        remove(&mut changed);
        let diff = compute_assembly_diff(&old, &module(vec![changed]), &aggregator).unwrap();
        assert!(classify_breaking_change(&diff));
    }

    let additions = rich_type()
        .with_method(void_method("Remove"))
        .with_field(FieldNode::new("Extra", TypeReference::parse("System.Int32"), Access::Public))
        .with_event(EventNode::new("Cleared", TypeReference::parse("System.EventHandler"), Access::Public))
        .with_interface(TypeReference::parse("System.IDisposable"));
    let diff = compute_assembly_diff(&old, &module(vec![additions, class("New")]), &aggregator).unwrap();
    assert_eq!(diff.changed_types.len(), 1);
    assert_eq!(diff.added_removed_types.added_count(), 1);
    assert!(!classify_breaking_change(&diff));
}

#[test]
fn test_wildcard_boundaries() {
    assert!(match_with_wildcards(None, Some("X"), false));
    assert!(match_with_wildcards(Some("*"), Some(""), false));
    assert!(match_with_wildcards(Some("Foo*"), Some("FooBar"), true));
    assert!(match_with_wildcards(Some("*Bar"), Some("FooBar"), true));
    assert!(match_with_wildcards(Some("*oo*"), Some("FooBar"), true));
    assert!(!match_with_wildcards(Some("Foo"), Some("foobar"), false));
    assert!(!match_with_wildcards(Some("*"), None, false));
    assert!(match_with_wildcards(Some("**"), Some("anything"), false));
}

// ============================================================================
// Loading, reporting and versioning
// ============================================================================

#[test]
fn test_json_round_trip_diff() {
    let dir = TempDir::new().unwrap();
    let old_path = dir.path().join("old.json");
    let new_path = dir.path().join("new.json");
    let old = module(vec![rich_type()]);
    let mut changed = rich_type();
    changed.fields.retain(|f| f.name != "Max");
    fs::write(&old_path, serde_json::to_string_pretty(&old).unwrap()).unwrap();
    fs::write(&new_path, serde_json::to_string_pretty(&module(vec![changed])).unwrap()).unwrap();

    let loader = JsonModuleLoader::new();
    let old = loader.load_graph(&old_path).unwrap();
    let new = loader.load_graph(&new_path).unwrap();
    let diff = compute_assembly_diff(&old, &new, &QueryAggregator::public_api()).unwrap();

    let report = DiffPrinter::new().render(&diff);
    assert!(report.contains("public class Lib.Rich"));
    assert!(report.contains("- public const int Max - Value: 100"));

    let result = SemanticVersionAnalyzer::new().analyze(&[diff], "1.3.0").unwrap();
    assert!(result.breaking_changes_detected);
    assert_eq!(result.version_number, "2.0.0");
}

#[test]
fn test_unloadable_file_contributes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("native.dll");
    fs::write(&path, b"MZ\x90\x00").unwrap();
    assert!(JsonModuleLoader::new().load_graph(&path).is_none());
}
