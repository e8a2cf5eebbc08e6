//! Property-based tests for graph building, metrics, partitions and ego
//! networks over random relationship tables.

use std::collections::{BTreeSet, HashSet};

use proptest::prelude::*;
use relation_graph_explorer::projection::ego_network;
use relation_graph_explorer::{
	EdgeRecord, LouvainConfig, Metric, RelationGraph, build_graph, compute_metrics, partition_with,
};

/// Up to 30 rows over a pool of 10 ids, so duplicates and self-loops occur.
fn table() -> impl Strategy<Value = Vec<(u8, u8)>> {
	prop::collection::vec((0u8..10, 0u8..10), 0..30)
}

fn rows(pairs: &[(u8, u8)]) -> Vec<EdgeRecord> {
	pairs
		.iter()
		.map(|(p, c)| EdgeRecord::new(format!("n{p}"), format!("n{c}")))
		.collect()
}

fn graph(pairs: &[(u8, u8)]) -> RelationGraph {
	match build_graph(&rows(pairs)) {
		Ok(g) => g,
		Err(err) => panic!("generated rows rejected: {err}"),
	}
}

proptest! {
	/// Property: one edge per distinct ordered pair, whatever the duplicates
	#[test]
	fn prop_duplicate_rows_are_idempotent(pairs in table()) {
		let g = graph(&pairs);
		let distinct: BTreeSet<_> = pairs.iter().collect();
		prop_assert_eq!(g.edge_count(), distinct.len());

		let mut doubled = pairs.clone();
		doubled.extend_from_slice(&pairs);
		prop_assert_eq!(graph(&doubled).edge_count(), g.edge_count());
	}

	/// Property: every id seen is a node, and nothing outside the node set is reachable
	#[test]
	fn prop_no_dangling_edges(pairs in table()) {
		let g = graph(&pairs);
		let nodes: HashSet<&str> = g.node_ids().collect();
		let seen: HashSet<String> = pairs
			.iter()
			.flat_map(|(p, c)| [format!("n{p}"), format!("n{c}")])
			.collect();
		prop_assert_eq!(nodes.len(), seen.len());
		prop_assert_eq!(g.node_count(), seen.len());

		for (p, c) in g.edges() {
			prop_assert!(nodes.contains(p) && nodes.contains(c));
		}
		for id in &nodes {
			let preds = g.predecessors(id).unwrap();
			let succs = g.successors(id).unwrap();
			prop_assert!(preds.union(&succs).all(|n| nodes.contains(n)));
		}
	}

	/// Property: ego network holds the focal node, and expansion only adds nodes
	#[test]
	fn prop_ego_network_grows_with_expansion(pairs in table(), pick in any::<prop::sample::Index>()) {
		let g = graph(&pairs);
		let ids: Vec<&str> = g.node_ids().collect();
		prop_assume!(!ids.is_empty());
		let focal = ids[pick.index(ids.len())];

		let near = ego_network(&g, focal, false).unwrap();
		let far = ego_network(&g, focal, true).unwrap();
		prop_assert!(near.contains(focal));
		prop_assert!(near.is_subset(&far));
	}

	/// Property: every node lands in exactly one non-empty community
	#[test]
	fn prop_partition_covers_every_node(pairs in table(), seed in prop::option::of(any::<u64>())) {
		let g = graph(&pairs);
		let config = LouvainConfig { seed, ..LouvainConfig::default() };
		let p = partition_with(&g, &config);

		prop_assert_eq!(p.len(), g.node_count());
		for id in g.node_ids() {
			prop_assert!(p.community_of(id).is_some());
		}
		let sizes = p.sizes();
		prop_assert_eq!(sizes.len(), p.community_count());
		prop_assert!(sizes.iter().all(|&(_, n)| n > 0));
		prop_assert_eq!(sizes.iter().map(|&(_, n)| n).sum::<usize>(), g.node_count());
	}

	/// Property: metrics never fail and stay within their ranges
	#[test]
	fn prop_metrics_are_total(pairs in table()) {
		let g = graph(&pairs);
		let m = compute_metrics(&g);

		prop_assert!(m.density >= 0.0);
		if g.node_count() < 2 {
			prop_assert_eq!(m.density, 0.0);
		}
		if g.node_count() < 2 || m.weak_components > 1 {
			prop_assert_eq!(m.diameter, Metric::NotComputable);
			prop_assert_eq!(m.avg_path_length, Metric::NotComputable);
			prop_assert_eq!(m.avg_clustering, Metric::NotComputable);
		}
		if let Metric::Value(c) = m.avg_clustering {
			prop_assert!((0.0..=1.0).contains(&c));
		}
		prop_assert!(m.centrality.values().all(|&c| (0.0..=1.0 + 1e-9).contains(&c)));
	}
}

#[test]
fn tiny_graphs_have_zero_density() {
	for pairs in [&[][..], &[(1, 1)][..]] {
		let m = compute_metrics(&graph(pairs));
		assert_eq!(m.density, 0.0);
		assert_eq!(m.diameter, Metric::NotComputable);
	}
}
