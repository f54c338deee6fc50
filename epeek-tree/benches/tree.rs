use criterion::{black_box, criterion_group, criterion_main, Criterion};
use epeek_tree::{newick, TreeLayout, TreeModel, TreeView, ViewStyle};

/// Balanced Newick tree with `2^depth` leaves and branch lengths.
fn balanced_newick(depth: u32) -> String {
    fn build(depth: u32, counter: &mut usize, out: &mut String) {
        if depth == 0 {
            *counter += 1;
            out.push_str(&format!("taxon_{}:0.{}", counter, *counter % 9 + 1));
            return;
        }
        out.push('(');
        build(depth - 1, counter, out);
        out.push(',');
        build(depth - 1, counter, out);
        out.push_str("):0.5");
    }
    let mut s = String::new();
    build(depth, &mut 0, &mut s);
    s.push(';');
    s
}

fn bench_newick(c: &mut Criterion) {
    let mut group = c.benchmark_group("newick");
    let text = balanced_newick(10);
    group.bench_function("parse_1k_leaves", |b| {
        b.iter(|| newick::parse(black_box(&text)).unwrap())
    });
    group.bench_function("bind_1k_leaves", |b| {
        b.iter(|| TreeModel::from_newick(black_box(&text)).unwrap())
    });
    group.finish();
}

fn bench_tree_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_ops");
    let tree = TreeModel::from_newick(&balanced_newick(10)).unwrap();
    let leaves = tree.leaves();
    let picks: Vec<_> = leaves.iter().step_by(37).copied().collect();

    group.bench_function("lca_28_leaves", |b| {
        b.iter(|| tree.lowest_common_ancestor(black_box(&picks)).unwrap())
    });
    group.bench_function("extract_subtree_28_leaves", |b| {
        b.iter(|| tree.extract_subtree(black_box(&picks)).unwrap())
    });
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let tree = TreeModel::from_newick(&balanced_newick(10)).unwrap();
    for layout in [TreeLayout::vertical(), TreeLayout::radial().with_scale(true)] {
        group.bench_function(format!("render_{}", layout.style), |b| {
            b.iter(|| {
                TreeView::new()
                    .render(black_box(&tree), &layout, &ViewStyle::default())
                    .unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_newick, bench_tree_ops, bench_layout);
criterion_main!(benches);
