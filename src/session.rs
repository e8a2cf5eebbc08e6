//! One user's exploration session: the editable table plus the immutable
//! analysis snapshot built from it.
//!
//! Edits only touch the pending table. `rebuild` derives a fresh
//! [`Snapshot`] and swaps it in whole, so readers holding the previous
//! `Arc<Snapshot>` keep a consistent view.

use std::collections::HashSet;
use std::io;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::community::{LouvainConfig, Partition, partition_with};
use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, Result};
use crate::graph::{RelationGraph, build_graph};
use crate::metrics::{CommunitySummary, GraphMetrics, community_summary, compute_metrics};
use crate::projection::{Projection, ProjectionRequest, project};
use crate::table::{Attributes, EdgeRecord, EdgeTable};

/// Graph, metrics and partition derived together from one table state.
#[derive(Clone, Debug)]
pub struct Snapshot {
	graph: RelationGraph,
	metrics: GraphMetrics,
	partition: Partition,
}

impl Snapshot {
	/// Run graph building, metrics and community detection over `table`.
	pub fn build(table: &EdgeTable, louvain: &LouvainConfig) -> Result<Self> {
		let graph = build_graph(table.rows())?;
		let metrics = compute_metrics(&graph);
		let partition = partition_with(&graph, louvain);
		info!(
			"rebuilt snapshot: {} nodes, {} edges, {} communities",
			metrics.node_count,
			metrics.edge_count,
			partition.community_count()
		);
		Ok(Self {
			graph,
			metrics,
			partition,
		})
	}

	/// The relation graph.
	pub fn graph(&self) -> &RelationGraph {
		&self.graph
	}

	/// Its global metrics.
	pub fn metrics(&self) -> &GraphMetrics {
		&self.metrics
	}

	/// Its community partition.
	pub fn partition(&self) -> &Partition {
		&self.partition
	}
}

impl Default for Snapshot {
	fn default() -> Self {
		let graph = RelationGraph::default();
		Self {
			metrics: compute_metrics(&graph),
			partition: Partition::default(),
			graph,
		}
	}
}

/// What the dashboard shows about a single node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeDetails {
	/// Node id.
	pub id: String,
	/// Merged attributes.
	pub attributes: Attributes,
	/// Incoming edges.
	pub in_degree: usize,
	/// Outgoing edges.
	pub out_degree: usize,
	/// Betweenness centrality.
	pub centrality: f64,
	/// Community id.
	pub community: Option<usize>,
}

impl NodeDetails {
	/// Pretty-printed JSON.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}
}

/// Session-scoped state.
#[derive(Debug)]
pub struct Session {
	config: ExplorerConfig,
	table: EdgeTable,
	snapshot: Arc<Snapshot>,
	dirty: bool,
}

impl Session {
	/// Empty session.
	pub fn new(config: ExplorerConfig) -> Self {
		let table = EdgeTable::new(&config.table);
		Self {
			config,
			table,
			snapshot: Arc::new(Snapshot::default()),
			dirty: false,
		}
	}

	/// Session over `table`, built immediately.
	pub fn with_table(config: ExplorerConfig, table: EdgeTable) -> Result<Self> {
		let snapshot = Snapshot::build(&table, &config.community)?;
		Ok(Self {
			config,
			table,
			snapshot: Arc::new(snapshot),
			dirty: false,
		})
	}

	/// Session over a CSV document using the configured column names.
	pub fn from_csv_reader<R: io::Read>(config: ExplorerConfig, reader: R) -> Result<Self> {
		let table = EdgeTable::from_csv_reader(reader, &config.table)?;
		Self::with_table(config, table)
	}

	/// Session configuration.
	pub fn config(&self) -> &ExplorerConfig {
		&self.config
	}

	/// The pending table, including rows not yet rebuilt.
	pub fn table(&self) -> &EdgeTable {
		&self.table
	}

	/// The current snapshot.
	pub fn snapshot(&self) -> Arc<Snapshot> {
		Arc::clone(&self.snapshot)
	}

	/// Whether the table changed since the last rebuild.
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	/// Append a row to the pending table. The snapshot is untouched.
	pub fn append_row(&mut self, record: EdgeRecord) -> Result<()> {
		self.table.append_row(record)?;
		self.dirty = true;
		Ok(())
	}

	/// Rebuild the snapshot from the pending table. On failure the previous
	/// snapshot stays in place.
	pub fn rebuild(&mut self) -> Result<Arc<Snapshot>> {
		let snapshot = Arc::new(Snapshot::build(&self.table, &self.config.community)?);
		self.snapshot = Arc::clone(&snapshot);
		self.dirty = false;
		Ok(snapshot)
	}

	/// Swap in a whole new table (an upload) and rebuild. On failure both the
	/// old table and the old snapshot stay in place.
	pub fn replace_table(&mut self, table: EdgeTable) -> Result<Arc<Snapshot>> {
		let snapshot = Arc::new(Snapshot::build(&table, &self.config.community)?);
		self.table = table;
		self.snapshot = Arc::clone(&snapshot);
		self.dirty = false;
		Ok(snapshot)
	}

	/// Project the current snapshot. An unknown palette falls back to the
	/// configured default.
	pub fn project(&self, request: &ProjectionRequest) -> Result<Projection> {
		let snap = &self.snapshot;
		let run = |request: &ProjectionRequest| {
			project(
				&snap.graph,
				&snap.partition,
				&snap.metrics.centrality,
				request,
				&self.config.style,
			)
		};
		match run(request) {
			Err(ExplorerError::UnknownPalette(name)) if name != self.config.default_palette => {
				warn!(
					"unknown palette {name:?}, falling back to {:?}",
					self.config.default_palette
				);
				run(&request.clone().with_palette(self.config.default_palette.clone()))
			}
			other => other,
		}
	}

	/// Details of one node of the current snapshot.
	pub fn node_details(&self, id: &str) -> Result<NodeDetails> {
		let snap = &self.snapshot;
		let node = snap.graph.node(id)?;
		Ok(NodeDetails {
			id: node.id.clone(),
			attributes: node.attributes.clone(),
			in_degree: snap.graph.in_degree(id)?,
			out_degree: snap.graph.out_degree(id)?,
			centrality: snap.metrics.centrality.get(id).copied().unwrap_or_default(),
			community: snap.partition.community_of(id),
		})
	}

	/// Summary of the community `id` belongs to.
	pub fn community_of_node(&self, id: &str) -> Result<CommunitySummary> {
		let snap = &self.snapshot;
		snap.partition
			.community_of(id)
			.and_then(|c| community_summary(&snap.graph, &snap.partition, c))
			.ok_or_else(|| ExplorerError::UnknownNode(id.to_string()))
	}

	/// Table rows touching any node of `projection`.
	pub fn projection_rows(&self, projection: &Projection) -> Vec<&EdgeRecord> {
		let nodes: HashSet<String> = projection.subgraph.nodes.iter().cloned().collect();
		self.table.rows_touching(&nodes)
	}

	/// Write the pending table as CSV.
	pub fn export_csv<W: io::Write>(&self, writer: W) -> Result<()> {
		self.table.to_csv_writer(writer)
	}

	/// The pending table as CSV text, for download.
	pub fn export_csv_text(&self) -> Result<String> {
		let mut out = Vec::new();
		self.export_csv(&mut out)?;
		String::from_utf8(out).map_err(|e| io::Error::other(e).into())
	}
}
