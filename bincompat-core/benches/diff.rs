//! Benchmark for assembly diff performance.

use bincompat_core::model::{
    Access, FieldNode, MethodNode, ModuleGraph, ParameterNode, TypeKind, TypeNode, TypeReference,
    Visibility,
};
use bincompat_core::{compute_assembly_diff, QueryAggregator};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// `types` public classes with `members` methods and fields each.
fn make_module(types: usize, members: usize, drop_every: usize) -> ModuleGraph {
    let mut module = ModuleGraph::new("Bench");
    for t in 0..types {
        let mut ty = TypeNode::new("Bench.Types", &format!("Type{}", t), TypeKind::Class, Visibility::Public)
            .with_base(TypeReference::new("System", "Object"));
        for m in 0..members {
            if drop_every > 0 && m % drop_every == 0 {
                continue;
            }
            ty = ty
                .with_method(
                    MethodNode::new(&format!("Method{}", m), TypeReference::parse("System.String"), Access::Public)
                        .with_parameter(ParameterNode::new(
                            "items",
                            TypeReference::parse("System.Collections.Generic.List`1<System.Int32>"),
                        )),
                )
                .with_field(FieldNode::new(
                    &format!("field{}", m),
                    TypeReference::parse("System.Int32"),
                    Access::Protected,
                ));
        }
        module = module.with_type(ty);
    }
    module.normalize()
}

fn bench_identical_modules(c: &mut Criterion) {
    let module = make_module(200, 20, 0);
    let aggregator = QueryAggregator::public_api();

    c.bench_function("diff_identical_200_types", |b| {
        b.iter(|| black_box(compute_assembly_diff(&module, &module, &aggregator)))
    });
}

fn bench_changed_modules(c: &mut Criterion) {
    let old = make_module(200, 20, 0);
    let new = make_module(200, 20, 7);
    let aggregator = QueryAggregator::public_api();

    c.bench_function("diff_changed_200_types", |b| {
        b.iter(|| black_box(compute_assembly_diff(&old, &new, &aggregator)))
    });
}

fn bench_custom_queries(c: &mut Criterion) {
    let old = make_module(200, 20, 0);
    let new = make_module(200, 20, 5);
    let mut aggregator = QueryAggregator::public_api();
    aggregator.add_method_query("public string Method1*(List<int> *)").ok();
    aggregator.add_field_query("protected int field*").ok();

    c.bench_function("diff_changed_overlapping_queries", |b| {
        b.iter(|| black_box(compute_assembly_diff(&old, &new, &aggregator)))
    });
}

criterion_group!(benches, bench_identical_modules, bench_changed_modules, bench_custom_queries);
criterion_main!(benches);
