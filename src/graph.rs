//! Directed attributed graph derived from the relationship table.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::error::{ExplorerError, Result};
use crate::table::{Attributes, EdgeRecord};

/// A node of the relation graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeRecord {
	/// Unique node id.
	pub id: String,
	/// Attributes merged from every row where this node is the child.
	pub attributes: Attributes,
}

/// A node subset plus every edge among it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subgraph {
	/// Visible node ids, in graph insertion order.
	pub nodes: Vec<String>,
	/// Directed edges `(parent, child)` with both ends in `nodes`.
	pub edges: Vec<(String, String)>,
}

impl Subgraph {
	/// Whether `id` is one of the nodes.
	pub fn contains(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n == id)
	}
}

/// Directed parent → child graph, immutable once built.
///
/// Duplicate `(parent, child)` rows collapse to one edge. Self-loops are kept.
#[derive(Clone, Debug, Default)]
pub struct RelationGraph {
	graph: DiGraph<NodeRecord, ()>,
	index: HashMap<String, NodeIndex>,
}

/// Build a graph from table rows.
///
/// Every row is validated before anything is built, so a bad row never
/// leaves a partial graph behind. Attributes are merged onto the child only,
/// in row order, later rows overwriting earlier values of the same name.
pub fn build_graph<'a>(rows: impl IntoIterator<Item = &'a EdgeRecord>) -> Result<RelationGraph> {
	let rows: Vec<&EdgeRecord> = rows.into_iter().collect();
	for (i, row) in rows.iter().enumerate() {
		if row.parent.trim().is_empty() {
			return Err(ExplorerError::invalid_record(i, "empty parent id"));
		}
		if row.child.trim().is_empty() {
			return Err(ExplorerError::invalid_record(i, "empty child id"));
		}
	}

	let mut g = RelationGraph::default();
	for row in rows {
		let parent = g.ensure_node(&row.parent);
		let child = g.ensure_node(&row.child);
		g.graph.update_edge(parent, child, ());
		g.graph[child].attributes.merge(&row.attributes);
	}
	debug!(
		"built graph with {} nodes and {} edges",
		g.node_count(),
		g.edge_count()
	);
	Ok(g)
}

impl RelationGraph {
	fn ensure_node(&mut self, id: &str) -> NodeIndex {
		if let Some(&idx) = self.index.get(id) {
			return idx;
		}
		let idx = self.graph.add_node(NodeRecord {
			id: id.to_string(),
			attributes: Attributes::new(),
		});
		self.index.insert(id.to_string(), idx);
		idx
	}

	fn idx(&self, id: &str) -> Result<NodeIndex> {
		self.index
			.get(id)
			.copied()
			.ok_or_else(|| ExplorerError::UnknownNode(id.to_string()))
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.graph.node_count()
	}

	/// Number of distinct directed edges.
	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}

	/// Whether `id` is a node.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// The node record for `id`.
	pub fn node(&self, id: &str) -> Result<&NodeRecord> {
		Ok(&self.graph[self.idx(id)?])
	}

	/// Attributes of `id`.
	pub fn attributes(&self, id: &str) -> Result<&Attributes> {
		Ok(&self.node(id)?.attributes)
	}

	/// Node records in first-seen order.
	pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
		self.graph.node_weights()
	}

	/// Node ids in first-seen order.
	pub fn node_ids(&self) -> impl Iterator<Item = &str> {
		self.nodes().map(|n| n.id.as_str())
	}

	/// Directed edges as `(parent, child)` id pairs.
	pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
		self.graph.edge_references().map(|e| {
			(
				self.graph[e.source()].id.as_str(),
				self.graph[e.target()].id.as_str(),
			)
		})
	}

	/// Whether the edge `parent → child` exists.
	pub fn has_edge(&self, parent: &str, child: &str) -> bool {
		match (self.index.get(parent), self.index.get(child)) {
			(Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
			_ => false,
		}
	}

	fn directed(&self, id: &str, dir: Direction) -> Result<BTreeSet<&str>> {
		let idx = self.idx(id)?;
		Ok(self
			.graph
			.neighbors_directed(idx, dir)
			.map(|n| self.graph[n].id.as_str())
			.collect())
	}

	/// Ids with an edge into `id`.
	pub fn predecessors(&self, id: &str) -> Result<BTreeSet<&str>> {
		self.directed(id, Direction::Incoming)
	}

	/// Ids `id` has an edge to.
	pub fn successors(&self, id: &str) -> Result<BTreeSet<&str>> {
		self.directed(id, Direction::Outgoing)
	}

	/// Predecessors and successors together.
	pub fn neighbors(&self, id: &str) -> Result<BTreeSet<&str>> {
		let mut all = self.predecessors(id)?;
		all.extend(self.successors(id)?);
		Ok(all)
	}

	/// Number of incoming edges.
	pub fn in_degree(&self, id: &str) -> Result<usize> {
		let idx = self.idx(id)?;
		Ok(self.graph.edges_directed(idx, Direction::Incoming).count())
	}

	/// Number of outgoing edges.
	pub fn out_degree(&self, id: &str) -> Result<usize> {
		let idx = self.idx(id)?;
		Ok(self.graph.edges_directed(idx, Direction::Outgoing).count())
	}

	/// In-degree plus out-degree; a self-loop counts twice.
	pub fn degree(&self, id: &str) -> Result<usize> {
		Ok(self.in_degree(id)? + self.out_degree(id)?)
	}

	/// The subgraph induced by `ids`. Unknown ids are ignored.
	pub fn induced_subgraph(&self, ids: &HashSet<&str>) -> Subgraph {
		let nodes = self
			.node_ids()
			.filter(|id| ids.contains(id))
			.map(str::to_string)
			.collect();
		let edges = self
			.edges()
			.filter(|(a, b)| ids.contains(a) && ids.contains(b))
			.map(|(a, b)| (a.to_string(), b.to_string()))
			.collect();
		Subgraph { nodes, edges }
	}

	/// The whole graph as a [`Subgraph`].
	pub fn to_subgraph(&self) -> Subgraph {
		Subgraph {
			nodes: self.node_ids().map(str::to_string).collect(),
			edges: self
				.edges()
				.map(|(a, b)| (a.to_string(), b.to_string()))
				.collect(),
		}
	}

	/// Undirected projection by dense node position: `u – v` when either
	/// direction exists.
	pub(crate) fn undirected(&self) -> Undirected {
		let n = self.node_count();
		let mut neighbors = vec![BTreeSet::new(); n];
		let mut self_loops = vec![false; n];
		for e in self.graph.edge_references() {
			let (a, b) = (e.source().index(), e.target().index());
			if a == b {
				self_loops[a] = true;
			} else {
				neighbors[a].insert(b);
				neighbors[b].insert(a);
			}
		}
		Undirected {
			neighbors: neighbors
				.into_iter()
				.map(|s| s.into_iter().collect())
				.collect(),
			self_loops,
		}
	}

	/// Out-neighbor positions of every node, for path searches.
	pub(crate) fn out_adjacency(&self) -> Vec<Vec<usize>> {
		self.graph
			.node_indices()
			.map(|idx| {
				self.graph
					.neighbors_directed(idx, Direction::Outgoing)
					.map(NodeIndex::index)
					.collect()
			})
			.collect()
	}

	/// Number of weakly connected components.
	pub fn weak_component_count(&self) -> usize {
		petgraph::algo::connected_components(&self.graph)
	}
}

/// Simple undirected view of a [`RelationGraph`] by node position.
#[derive(Clone, Debug)]
pub(crate) struct Undirected {
	/// Sorted distinct neighbors, self excluded.
	pub neighbors: Vec<Vec<usize>>,
	/// Whether the node has a self-loop.
	pub self_loops: Vec<bool>,
}
