use sprig_core::{NodeSpec, Tree, TreeConfig, resolve_layout};
use std::time::Instant;

/// A complete tree with `fanout` children per node, `depth` levels deep.
fn bushy(depth: usize, fanout: usize, label: &str) -> NodeSpec {
    let children = if depth == 0 {
        Vec::new()
    } else {
        (0..fanout)
            .map(|i| bushy(depth - 1, fanout, &format!("{label}.{i}")))
            .collect()
    };
    NodeSpec::new(label, children)
}

#[test]
#[ignore] // Run manually with `cargo test --test perf_benchmark -- --nocapture --ignored`
fn benchmark_layout_of_large_tree() {
    // 1 + 6 + 36 + ... + 6^5 = 9,331 nodes
    let spec = bushy(5, 6, "n");
    let tree = Tree::from_spec(&spec).expect("build failed");

    let start = Instant::now();
    let positioned = resolve_layout(&tree, &TreeConfig::default());
    let duration = start.elapsed();

    assert_eq!(positioned.len(), spec.count());
    println!("Laid out {} nodes in {:?}", positioned.len(), duration);
}
