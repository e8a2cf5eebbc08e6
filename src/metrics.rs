//! Global structural statistics of a [`RelationGraph`].
//!
//! Nothing here fails. Metrics that are undefined for the current graph
//! shape come back as [`Metric::NotComputable`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::community::Partition;
use crate::graph::RelationGraph;

/// Node id → normalised betweenness centrality.
pub type CentralityMap = HashMap<String, f64>;

/// A metric value, or the explicit signal that it is undefined here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Metric<T> {
	/// The metric is defined and has this value.
	Value(T),
	/// The graph is too small or disconnected for this metric.
	NotComputable,
}

impl<T> Metric<T> {
	/// The value, if computable.
	pub fn value(&self) -> Option<&T> {
		match self {
			Self::Value(v) => Some(v),
			Self::NotComputable => None,
		}
	}

	/// Whether a value is present.
	pub fn is_computable(&self) -> bool {
		matches!(self, Self::Value(_))
	}
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(v) => v.fmt(f),
			Self::NotComputable => f.write_str("n/a"),
		}
	}
}

/// Everything the dashboard shows about the whole graph.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphMetrics {
	/// Number of nodes.
	pub node_count: usize,
	/// Number of directed edges.
	pub edge_count: usize,
	/// `edges / (n·(n−1))`, 0 below two nodes.
	pub density: f64,
	/// Nodes with no edge at all.
	pub isolated_count: usize,
	/// Weakly connected components.
	pub weak_components: usize,
	/// Longest shortest path on the undirected projection.
	pub diameter: Metric<usize>,
	/// Mean shortest path length on the undirected projection.
	pub avg_path_length: Metric<f64>,
	/// Mean local clustering coefficient on the undirected projection.
	pub avg_clustering: Metric<f64>,
	/// Directed betweenness centrality per node.
	pub centrality: CentralityMap,
	/// In-degree plus out-degree per node.
	pub degree_map: HashMap<String, usize>,
}

/// Compute every global metric of `graph`.
pub fn compute_metrics(graph: &RelationGraph) -> GraphMetrics {
	let n = graph.node_count();
	let edge_count = graph.edge_count();
	let density = if n < 2 {
		0.0
	} else {
		edge_count as f64 / (n * (n - 1)) as f64
	};

	let degree_map: HashMap<String, usize> = graph
		.node_ids()
		.map(|id| (id.to_string(), graph.degree(id).unwrap_or_default()))
		.collect();
	let isolated_count = degree_map.values().filter(|&&d| d == 0).count();
	let weak_components = graph.weak_component_count();

	let scores = betweenness(&graph.out_adjacency());
	let centrality = graph
		.node_ids()
		.zip(scores)
		.map(|(id, c)| (id.to_string(), c))
		.collect();

	let (diameter, avg_path_length, avg_clustering) = if n < 2 || weak_components != 1 {
		(
			Metric::NotComputable,
			Metric::NotComputable,
			Metric::NotComputable,
		)
	} else {
		let undirected = graph.undirected();
		let (diameter, avg) = path_lengths(&undirected.neighbors);
		(
			Metric::Value(diameter),
			Metric::Value(avg),
			Metric::Value(average_clustering(&undirected.neighbors)),
		)
	};

	GraphMetrics {
		node_count: n,
		edge_count,
		density,
		isolated_count,
		weak_components,
		diameter,
		avg_path_length,
		avg_clustering,
		centrality,
		degree_map,
	}
}

/// Brandes' betweenness over a directed adjacency list, normalised by
/// `1 / ((n−1)(n−2))`.
pub(crate) fn betweenness(adj: &[Vec<usize>]) -> Vec<f64> {
	let n = adj.len();
	let mut cb = vec![0.0; n];

	for s in 0..n {
		let mut stack = Vec::with_capacity(n);
		let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
		let mut sigma = vec![0.0f64; n];
		let mut dist: Vec<Option<usize>> = vec![None; n];
		sigma[s] = 1.0;
		dist[s] = Some(0);

		let mut queue = VecDeque::from([s]);
		while let Some(v) = queue.pop_front() {
			stack.push(v);
			let dv = dist[v].unwrap_or_default();
			for &w in &adj[v] {
				if dist[w].is_none() {
					dist[w] = Some(dv + 1);
					queue.push_back(w);
				}
				if dist[w] == Some(dv + 1) {
					sigma[w] += sigma[v];
					preds[w].push(v);
				}
			}
		}

		let mut delta = vec![0.0f64; n];
		while let Some(w) = stack.pop() {
			for &v in &preds[w] {
				delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
			}
			if w != s {
				cb[w] += delta[w];
			}
		}
	}

	if n > 2 {
		let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
		cb.iter_mut().for_each(|c| *c *= scale);
	}
	cb
}

/// Diameter and mean shortest-path length of a connected undirected graph.
fn path_lengths(neighbors: &[Vec<usize>]) -> (usize, f64) {
	let n = neighbors.len();
	let mut diameter = 0usize;
	let mut total = 0usize;
	for s in 0..n {
		let mut dist: Vec<Option<usize>> = vec![None; n];
		dist[s] = Some(0);
		let mut queue = VecDeque::from([s]);
		while let Some(v) = queue.pop_front() {
			let dv = dist[v].unwrap_or_default();
			diameter = diameter.max(dv);
			total += dv;
			for &w in &neighbors[v] {
				if dist[w].is_none() {
					dist[w] = Some(dv + 1);
					queue.push_back(w);
				}
			}
		}
	}
	(diameter, total as f64 / (n * (n - 1)) as f64)
}

/// Mean local clustering coefficient; nodes with fewer than two neighbors
/// contribute 0.
fn average_clustering(neighbors: &[Vec<usize>]) -> f64 {
	if neighbors.is_empty() {
		return 0.0;
	}
	let sum: f64 = neighbors
		.iter()
		.map(|ns| {
			let k = ns.len();
			if k < 2 {
				return 0.0;
			}
			let mut triangles = 0usize;
			for (i, &v) in ns.iter().enumerate() {
				for &w in &ns[i + 1..] {
					if neighbors[v].binary_search(&w).is_ok() {
						triangles += 1;
					}
				}
			}
			2.0 * triangles as f64 / (k * (k - 1)) as f64
		})
		.sum();
	sum / neighbors.len() as f64
}

/// Statistics of one community's induced subgraph.
#[derive(Clone, Debug, PartialEq)]
pub struct CommunitySummary {
	/// The community id.
	pub community: usize,
	/// Member ids in graph order.
	pub members: Vec<String>,
	/// Edges with both ends inside the community.
	pub edge_count: usize,
	/// Members without any edge inside the community.
	pub isolated_count: usize,
	/// Member with the highest betweenness inside the community subgraph;
	/// ties go to the earliest member.
	pub hub: Option<String>,
}

/// Summarise `community`, or `None` when no node carries that id.
pub fn community_summary(
	graph: &RelationGraph,
	partition: &Partition,
	community: usize,
) -> Option<CommunitySummary> {
	let members: Vec<&str> = graph
		.node_ids()
		.filter(|id| partition.community_of(id) == Some(community))
		.collect();
	if members.is_empty() {
		return None;
	}

	let local: HashMap<&str, usize> = members.iter().enumerate().map(|(i, &m)| (m, i)).collect();
	let member_set: HashSet<&str> = members.iter().copied().collect();
	let sub = graph.induced_subgraph(&member_set);

	let mut adj = vec![Vec::new(); members.len()];
	let mut touched = vec![false; members.len()];
	for (a, b) in &sub.edges {
		if let (Some(&i), Some(&j)) = (local.get(a.as_str()), local.get(b.as_str())) {
			adj[i].push(j);
			touched[i] = true;
			touched[j] = true;
		}
	}

	let scores = betweenness(&adj);
	let mut hub: Option<(usize, f64)> = None;
	for (i, &score) in scores.iter().enumerate() {
		if hub.is_none_or(|(_, best)| score > best) {
			hub = Some((i, score));
		}
	}

	Some(CommunitySummary {
		community,
		members: members.iter().map(|m| m.to_string()).collect(),
		edge_count: sub.edges.len(),
		isolated_count: touched.iter().filter(|t| !**t).count(),
		hub: hub.map(|(i, _)| members[i].to_string()),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::build_graph;
	use crate::table::EdgeRecord;

	fn graph(pairs: &[(&str, &str)]) -> RelationGraph {
		let rows: Vec<_> = pairs.iter().map(|(p, c)| EdgeRecord::new(*p, *c)).collect();
		build_graph(&rows).unwrap()
	}

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn triangle_scenario() {
		let m = compute_metrics(&graph(&[("A", "B"), ("A", "C"), ("B", "C")]));
		assert_eq!(m.node_count, 3);
		assert_eq!(m.edge_count, 3);
		assert!(close(m.density, 0.5));
		assert_eq!(m.isolated_count, 0);
		assert_eq!(m.weak_components, 1);
		assert_eq!(m.diameter, Metric::Value(1));
		assert!(close(*m.avg_path_length.value().unwrap(), 1.0));
		assert!(close(*m.avg_clustering.value().unwrap(), 1.0));
		assert_eq!(m.degree_map["A"], 2);
	}

	#[test]
	fn chain_betweenness() {
		let m = compute_metrics(&graph(&[("A", "B"), ("B", "C")]));
		// only A→C passes through B; 1 / ((3−1)(3−2))
		assert!(close(m.centrality["B"], 0.5));
		assert!(close(m.centrality["A"], 0.0));
		assert_eq!(m.diameter, Metric::Value(2));
		assert!(close(*m.avg_path_length.value().unwrap(), 8.0 / 6.0));
		assert!(close(*m.avg_clustering.value().unwrap(), 0.0));
	}

	#[test]
	fn tiny_graphs_do_not_divide_by_zero() {
		let empty = compute_metrics(&RelationGraph::default());
		assert_eq!(empty.density, 0.0);
		assert_eq!(empty.diameter, Metric::NotComputable);

		let single = compute_metrics(&graph(&[("A", "A")]));
		assert_eq!(single.density, 0.0);
		assert_eq!(single.isolated_count, 0);
		assert_eq!(single.avg_clustering, Metric::NotComputable);
	}

	#[test]
	fn disconnected_graph_is_not_computable() {
		let m = compute_metrics(&graph(&[("A", "B"), ("C", "D")]));
		assert_eq!(m.weak_components, 2);
		assert_eq!(m.diameter, Metric::NotComputable);
		assert_eq!(m.avg_path_length, Metric::NotComputable);
		assert_eq!(m.avg_clustering, Metric::NotComputable);
		assert_eq!(m.diameter.to_string(), "n/a");
	}

	#[test]
	fn star_hub_is_summarised() {
		let g = graph(&[("H", "A"), ("A", "H"), ("H", "B"), ("B", "H"), ("X", "Y")]);
		let partition = Partition::from_labels(&g, &[0, 0, 0, 1, 1]);
		let summary = community_summary(&g, &partition, 0).unwrap();
		assert_eq!(summary.members, ["H", "A", "B"]);
		assert_eq!(summary.edge_count, 4);
		assert_eq!(summary.isolated_count, 0);
		assert_eq!(summary.hub.as_deref(), Some("H"));
		assert!(community_summary(&g, &partition, 7).is_none());
	}
}
