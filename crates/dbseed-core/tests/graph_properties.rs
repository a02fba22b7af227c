use std::collections::BTreeSet;

use dbseed_core::{
    ColumnDescriptor, Error, TableDescriptor, build_graph, topological_sort,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random DAG: table `t{i}` may only reference tables with a lower index,
/// then the declaration order is shuffled.
fn random_acyclic_tables(rng: &mut ChaCha8Rng, size: usize) -> Vec<TableDescriptor> {
    let mut tables: Vec<TableDescriptor> = (0..size)
        .map(|idx| {
            let mut columns = vec![ColumnDescriptor::new("id", "int").primary_key()];
            for target in 0..idx {
                if rng.random_bool(0.3) {
                    columns.push(
                        ColumnDescriptor::new(format!("t{target}Id"), "int")
                            .references(format!("t{target}"), "id"),
                    );
                }
            }
            TableDescriptor::new(format!("t{idx}"), columns)
        })
        .collect();

    for idx in (1..tables.len()).rev() {
        let swap = rng.random_range(0..=idx);
        tables.swap(idx, swap);
    }
    tables
}

#[test]
fn order_respects_every_edge() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for size in 0..25 {
        let tables = random_acyclic_tables(&mut rng, size);
        let graph = build_graph(&tables);
        let order = topological_sort(&graph).expect("acyclic graph sorts");

        for table in graph.nodes() {
            let table_pos = order.iter().position(|name| name == table).expect("node");
            for dependency in graph.dependencies(table) {
                let dep_pos = order
                    .iter()
                    .position(|name| name == dependency)
                    .expect("dependency");
                assert!(dep_pos < table_pos, "{dependency} must precede {table}");
            }
        }
    }
}

#[test]
fn order_is_a_permutation_of_nodes() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for size in 0..25 {
        let tables = random_acyclic_tables(&mut rng, size);
        let graph = build_graph(&tables);
        let order = topological_sort(&graph).expect("acyclic graph sorts");

        let nodes: BTreeSet<&str> = graph.nodes().collect();
        let ordered: BTreeSet<&str> = order.iter().map(String::as_str).collect();
        assert_eq!(order.len(), graph.len(), "no duplicates");
        assert_eq!(nodes, ordered, "no omissions");
    }
}

#[test]
fn two_table_cycle_yields_no_order() {
    let tables = vec![
        TableDescriptor::new(
            "A",
            vec![ColumnDescriptor::new("bId", "int").references("B", "id")],
        ),
        TableDescriptor::new(
            "B",
            vec![ColumnDescriptor::new("aId", "int").references("A", "id")],
        ),
    ];
    let graph = build_graph(&tables);
    assert!(matches!(
        topological_sort(&graph),
        Err(Error::CyclicDependency { .. })
    ));
}

#[test]
fn cycle_behind_acyclic_prefix_is_detected() {
    let tables = vec![
        TableDescriptor::new("Root", vec![ColumnDescriptor::new("id", "int")]),
        TableDescriptor::new(
            "X",
            vec![
                ColumnDescriptor::new("rootId", "int").references("Root", "id"),
                ColumnDescriptor::new("yId", "int").references("Y", "id"),
            ],
        ),
        TableDescriptor::new(
            "Y",
            vec![ColumnDescriptor::new("xId", "int").references("X", "id")],
        ),
    ];
    let graph = build_graph(&tables);
    let Err(Error::CyclicDependency { cycle }) = topological_sort(&graph) else {
        panic!("expected cycle");
    };
    assert_eq!(cycle, vec!["X".to_string(), "Y".to_string(), "X".to_string()]);
}
