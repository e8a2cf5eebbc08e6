//! End-to-end scenarios over the public API: table rows in, projections and
//! metrics out.

use std::collections::BTreeSet;

use relation_graph_explorer::{
	EdgeRecord, ExplorerError, LouvainConfig, ProjectionRequest, ViewMode, ViewStyle, build_graph,
	compute_metrics, partition_with, project,
};

fn rows(pairs: &[(&str, &str)]) -> Vec<EdgeRecord> {
	pairs.iter().map(|(p, c)| EdgeRecord::new(*p, *c)).collect()
}

fn visible(nodes: &[String]) -> BTreeSet<&str> {
	nodes.iter().map(String::as_str).collect()
}

#[test]
fn triangle_ego_network_and_density() {
	let g = build_graph(&rows(&[("A", "B"), ("A", "C"), ("B", "C")])).unwrap();
	assert_eq!(g.node_ids().collect::<BTreeSet<_>>(), BTreeSet::from(["A", "B", "C"]));
	assert_eq!(
		g.edges().collect::<BTreeSet<_>>(),
		BTreeSet::from([("A", "B"), ("A", "C"), ("B", "C")])
	);

	let metrics = compute_metrics(&g);
	assert!((metrics.density - 0.5).abs() < 1e-12);

	let partition = partition_with(&g, &LouvainConfig::default());
	let projection = project(
		&g,
		&partition,
		&metrics.centrality,
		&ProjectionRequest::new("A", ViewMode::EgoNetwork),
		&ViewStyle::default(),
	)
	.unwrap();
	assert_eq!(visible(&projection.subgraph.nodes), BTreeSet::from(["A", "B", "C"]));
	assert_eq!(projection.subgraph.edges.len(), 3);
}

#[test]
fn duplicate_rows_collapse_to_one_edge() {
	let g = build_graph(&rows(&[("X", "Y"), ("X", "Y")])).unwrap();
	assert_eq!(g.node_count(), 2);
	assert_eq!(g.edge_count(), 1);
	assert!(g.has_edge("X", "Y"));
	assert!(!g.has_edge("Y", "X"));
}

#[test]
fn unknown_focal_node_is_rejected_in_every_mode() {
	let g = build_graph(&rows(&[("A", "B")])).unwrap();
	let metrics = compute_metrics(&g);
	let partition = partition_with(&g, &LouvainConfig::default());
	for mode in ViewMode::ALL {
		let result = project(
			&g,
			&partition,
			&metrics.centrality,
			&ProjectionRequest::new("Z", mode),
			&ViewStyle::default(),
		);
		assert!(matches!(result, Err(ExplorerError::UnknownNode(ref id)) if id == "Z"));
	}
}

#[test]
fn selected_community_shows_only_its_induced_subgraph() {
	// two triangles joined by a single bridge
	let g = build_graph(&rows(&[
		("A", "D"),
		("D", "E"),
		("E", "A"),
		("B", "C"),
		("C", "F"),
		("F", "B"),
		("E", "B"),
	]))
	.unwrap();
	let metrics = compute_metrics(&g);
	let partition = partition_with(&g, &LouvainConfig::default());
	let community = partition.community_of("A").unwrap();
	let members: BTreeSet<&str> = partition.members(community).collect();
	assert_eq!(members, BTreeSet::from(["A", "D", "E"]));

	let projection = project(
		&g,
		&partition,
		&metrics.centrality,
		&ProjectionRequest::new("A", ViewMode::SelectedCommunity),
		&ViewStyle::default(),
	)
	.unwrap();
	assert_eq!(visible(&projection.subgraph.nodes), members);
	assert_eq!(
		projection
			.subgraph
			.edges
			.iter()
			.map(|(p, c)| (p.as_str(), c.as_str()))
			.collect::<BTreeSet<_>>(),
		BTreeSet::from([("A", "D"), ("D", "E"), ("E", "A")])
	);

	let style = ViewStyle::default();
	assert_eq!(projection.visuals["A"].size, style.community_focal_size);
	assert_eq!(projection.visuals["D"].size, style.community_size);
	assert_eq!(projection.visuals["D"].color, projection.visuals["E"].color);
}

#[test]
fn isolated_node_makes_path_metrics_unavailable() {
	let g = build_graph(&rows(&[("A", "B"), ("B", "C"), ("Q", "Q")])).unwrap();
	let metrics = compute_metrics(&g);
	assert_eq!(metrics.weak_components, 2);
	assert!(!metrics.diameter.is_computable());
	assert!(!metrics.avg_path_length.is_computable());
	assert!(!metrics.avg_clustering.is_computable());
	assert_eq!(metrics.diameter.to_string(), "n/a");
}
