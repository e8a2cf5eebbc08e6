//! Louvain community detection on the undirected projection.
//!
//! Each level greedily moves nodes to the neighboring community with the
//! best modularity gain, then contracts communities into super-nodes and
//! repeats until a level moves nothing.
//!
//! Community ids are dense (`0..k`) and assigned in node order, but which
//! nodes end up together can change with the visiting order. With
//! [`LouvainConfig::seed`] unset, nodes are visited in insertion order; with
//! a seed, the order is shuffled by a seeded RNG. Either way a fixed config
//! on a fixed graph gives a fixed result.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::graph::RelationGraph;

/// Louvain parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LouvainConfig {
	/// Shuffle the visiting order with this seed.
	pub seed: Option<u64>,
	/// Modularity resolution γ; larger values favour smaller communities.
	pub resolution: f64,
	/// Stop a level once a full pass gains less modularity than this.
	pub min_gain: f64,
	/// Upper bound on aggregation levels.
	pub max_levels: usize,
}

impl Default for LouvainConfig {
	fn default() -> Self {
		Self {
			seed: None,
			resolution: 1.0,
			min_gain: 1e-7,
			max_levels: 32,
		}
	}
}

/// Node id → community id. Covers every node of the graph it came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partition {
	nodes: Vec<(String, usize)>,
	index: HashMap<String, usize>,
	count: usize,
}

impl Partition {
	/// Label the nodes of `graph` by position. Labels are renumbered densely
	/// in node order, so any labelling works.
	pub(crate) fn from_labels(graph: &RelationGraph, labels: &[usize]) -> Self {
		let mut dense: HashMap<usize, usize> = HashMap::new();
		let mut nodes = Vec::with_capacity(labels.len());
		let mut index = HashMap::with_capacity(labels.len());
		for (pos, (id, &label)) in graph.node_ids().zip(labels).enumerate() {
			let next = dense.len();
			let community = *dense.entry(label).or_insert(next);
			nodes.push((id.to_string(), community));
			index.insert(id.to_string(), pos);
		}
		Self {
			nodes,
			index,
			count: dense.len(),
		}
	}

	/// Community of `id`.
	pub fn community_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).map(|&pos| self.nodes[pos].1)
	}

	/// Members of `community`, in node order.
	pub fn members(&self, community: usize) -> impl Iterator<Item = &str> {
		self.nodes
			.iter()
			.filter(move |(_, c)| *c == community)
			.map(|(id, _)| id.as_str())
	}

	/// Number of distinct communities.
	pub fn community_count(&self) -> usize {
		self.count
	}

	/// Number of labelled nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether no node is labelled.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// `(node id, community id)` pairs in node order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.nodes.iter().map(|(id, c)| (id.as_str(), *c))
	}

	/// `(community id, member count)` sorted by community id.
	pub fn sizes(&self) -> Vec<(usize, usize)> {
		let mut sizes = vec![0usize; self.count];
		for (_, c) in &self.nodes {
			sizes[*c] += 1;
		}
		sizes.into_iter().enumerate().collect()
	}
}

/// Partition `graph` with the default [`LouvainConfig`].
pub fn partition(graph: &RelationGraph) -> Partition {
	partition_with(graph, &LouvainConfig::default())
}

/// Partition `graph` into communities.
pub fn partition_with(graph: &RelationGraph, config: &LouvainConfig) -> Partition {
	let n = graph.node_count();
	let mut assignment: Vec<usize> = (0..n).collect();
	let mut level = Level::from_graph(graph);
	if level.total <= 0.0 {
		return Partition::from_labels(graph, &assignment);
	}

	let mut rng = config.seed.map(StdRng::seed_from_u64);
	for depth in 0..config.max_levels {
		let mut order: Vec<usize> = (0..level.len()).collect();
		if let Some(rng) = rng.as_mut() {
			order.shuffle(rng);
		}
		let Some(community) = level.local_moving(&order, config) else {
			break;
		};
		let (dense, k) = renumber(&community);
		for a in assignment.iter_mut() {
			*a = dense[*a];
		}
		debug!("louvain level {depth}: {k} communities");
		level = level.aggregate(&dense, k);
	}
	Partition::from_labels(graph, &assignment)
}

/// Modularity of `partition` over the undirected projection of `graph`.
pub fn modularity(graph: &RelationGraph, partition: &Partition, resolution: f64) -> f64 {
	let level = Level::from_graph(graph);
	let labels: Vec<usize> = graph
		.node_ids()
		.map(|id| partition.community_of(id).unwrap_or_default())
		.collect();
	level.modularity(&labels, partition.community_count(), resolution)
}

fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
	let mut dense: HashMap<usize, usize> = HashMap::new();
	let out = labels
		.iter()
		.map(|l| {
			let next = dense.len();
			*dense.entry(*l).or_insert(next)
		})
		.collect();
	(out, dense.len())
}

/// Weighted undirected graph at one aggregation level.
#[derive(Debug)]
struct Level {
	/// `(neighbor, weight)`, self excluded, symmetric.
	adj: Vec<Vec<(usize, f64)>>,
	/// Self-loop weight per node.
	loops: Vec<f64>,
	/// Weighted degree; a self-loop counts twice.
	degree: Vec<f64>,
	/// Total edge weight `m`, each edge once.
	total: f64,
}

impl Level {
	fn from_graph(graph: &RelationGraph) -> Self {
		let undirected = graph.undirected();
		let adj: Vec<Vec<(usize, f64)>> = undirected
			.neighbors
			.iter()
			.map(|ns| ns.iter().map(|&j| (j, 1.0)).collect())
			.collect();
		let loops: Vec<f64> = undirected
			.self_loops
			.iter()
			.map(|&l| if l { 1.0 } else { 0.0 })
			.collect();
		Self::new(adj, loops)
	}

	fn new(adj: Vec<Vec<(usize, f64)>>, loops: Vec<f64>) -> Self {
		let degree: Vec<f64> = adj
			.iter()
			.zip(&loops)
			.map(|(ns, l)| ns.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * l)
			.collect();
		let total = degree.iter().sum::<f64>() / 2.0;
		Self {
			adj,
			loops,
			degree,
			total,
		}
	}

	fn len(&self) -> usize {
		self.adj.len()
	}

	/// One local-moving phase. `None` when no node changed community.
	fn local_moving(&self, order: &[usize], config: &LouvainConfig) -> Option<Vec<usize>> {
		let m2 = 2.0 * self.total;
		let res = config.resolution;
		let mut community: Vec<usize> = (0..self.len()).collect();
		let mut tot = self.degree.clone();
		let mut moved_any = false;
		let mut current = self.modularity(&community, self.len(), res);

		loop {
			let mut moved = 0usize;
			for &i in order {
				let own = community[i];
				let ki = self.degree[i];

				let mut links: BTreeMap<usize, f64> = BTreeMap::new();
				for &(j, w) in &self.adj[i] {
					*links.entry(community[j]).or_default() += w;
				}

				tot[own] -= ki;
				let mut best = own;
				let mut best_gain = links.get(&own).copied().unwrap_or_default() - res * tot[own] * ki / m2;
				for (&c, &w) in &links {
					let gain = w - res * tot[c] * ki / m2;
					if gain > best_gain {
						best = c;
						best_gain = gain;
					}
				}
				tot[best] += ki;
				if best != own {
					community[i] = best;
					moved += 1;
				}
			}

			if moved == 0 {
				break;
			}
			moved_any = true;
			let next = self.modularity(&community, self.len(), res);
			if next - current < config.min_gain {
				break;
			}
			current = next;
		}

		moved_any.then_some(community)
	}

	/// Contract each community into one node.
	fn aggregate(&self, community: &[usize], k: usize) -> Self {
		let mut loops = vec![0.0; k];
		let mut links: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); k];
		for i in 0..self.len() {
			let ci = community[i];
			loops[ci] += self.loops[i];
			for &(j, w) in &self.adj[i] {
				if j <= i {
					continue;
				}
				let cj = community[j];
				if ci == cj {
					loops[ci] += w;
				} else {
					*links[ci].entry(cj).or_default() += w;
					*links[cj].entry(ci).or_default() += w;
				}
			}
		}
		let adj = links.into_iter().map(|l| l.into_iter().collect()).collect();
		Self::new(adj, loops)
	}

	fn modularity(&self, community: &[usize], k: usize, res: f64) -> f64 {
		if self.total <= 0.0 {
			return 0.0;
		}
		let mut inner = vec![0.0; k];
		let mut tot = vec![0.0; k];
		for i in 0..self.len() {
			let c = community[i];
			tot[c] += self.degree[i];
			inner[c] += self.loops[i];
			for &(j, w) in &self.adj[i] {
				if j > i && community[j] == c {
					inner[c] += w;
				}
			}
		}
		let m = self.total;
		inner
			.iter()
			.zip(&tot)
			.map(|(l, d)| l / m - res * (d / (2.0 * m)).powi(2))
			.sum()
	}
}
