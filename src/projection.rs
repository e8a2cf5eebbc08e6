//! Mode-specific visual projections of the relation graph.
//!
//! A projection picks which nodes are visible for the current interaction
//! and how each one is drawn. It only reads the graph, centrality and
//! partition; nothing is recomputed here.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::community::Partition;
use crate::error::{ExplorerError, Result};
use crate::graph::{RelationGraph, Subgraph};
use crate::metrics::CentralityMap;
use crate::palette::{DEFAULT_PALETTE, palette};
use crate::table::Attributes;

/// How the graph is filtered and styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewMode {
	/// Focal node plus its direct (or two-hop) neighborhood.
	EgoNetwork,
	/// Whole graph, colored and sized by betweenness.
	CentralityHeatmap,
	/// Whole graph, colored by community.
	AllCommunities,
	/// Only the focal node's community.
	SelectedCommunity,
	/// Whole graph in one neutral style.
	Neutral,
}

impl ViewMode {
	/// The modes offered to users, in menu order.
	pub const ALL: [ViewMode; 4] = [
		ViewMode::EgoNetwork,
		ViewMode::CentralityHeatmap,
		ViewMode::AllCommunities,
		ViewMode::SelectedCommunity,
	];

	/// Menu label.
	pub fn label(self) -> &'static str {
		match self {
			Self::EgoNetwork => "Focus on node & neighbors",
			Self::CentralityHeatmap => "Betweenness Centrality",
			Self::AllCommunities => "All Communities",
			Self::SelectedCommunity => "Selected Node's Community",
			Self::Neutral => "Plain",
		}
	}

	/// One-line explanation shown under the graph.
	pub fn caption(self) -> &'static str {
		match self {
			Self::EgoNetwork => {
				"Selected node and its direct neighbors only. Expand to reach two hops."
			}
			Self::CentralityHeatmap => "Node color and size = betweenness centrality.",
			Self::AllCommunities => "Nodes colored by community.",
			Self::SelectedCommunity => "Only the selected node's community is shown and analysed.",
			Self::Neutral => "Whole graph, no highlighting.",
		}
	}

	/// Whether node colors come from a community palette.
	pub fn uses_palette(self) -> bool {
		matches!(self, Self::AllCommunities | Self::SelectedCommunity)
	}
}

impl From<&str> for ViewMode {
	/// Accepts menu labels and short keys; anything else is [`ViewMode::Neutral`].
	fn from(text: &str) -> Self {
		match text.trim() {
			"ego" | "Focus on node & neighbors" => Self::EgoNetwork,
			"centrality" | "Betweenness Centrality" => Self::CentralityHeatmap,
			"communities" | "All Communities" => Self::AllCommunities,
			"community" | "Selected Node's Community" => Self::SelectedCommunity,
			"neutral" | "Plain" => Self::Neutral,
			other => {
				warn!("unknown view mode {other:?}, using neutral view");
				Self::Neutral
			}
		}
	}
}

impl fmt::Display for ViewMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Visual constants of every mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewStyle {
	/// Ego network: focal node color.
	pub focal_color: String,
	/// Ego network: focal node size.
	pub focal_size: f64,
	/// Ego network: color of everyone else.
	pub neighbor_color: String,
	/// Ego network: size of everyone else.
	pub neighbor_size: f64,
	/// Heat-map RGB triple, e.g. `"255,100,100"`.
	pub heat_rgb: String,
	/// Heat-map alpha at centrality 0.
	pub heat_alpha_base: f64,
	/// Heat-map alpha added per unit of centrality.
	pub heat_alpha_scale: f64,
	/// Heat-map size at centrality 0.
	pub heat_size_base: f64,
	/// Heat-map size added per unit of centrality.
	pub heat_size_scale: f64,
	/// Community modes: node size.
	pub community_size: f64,
	/// Selected community: focal node size.
	pub community_focal_size: f64,
	/// Fallback color.
	pub neutral_color: String,
	/// Fallback size.
	pub neutral_size: f64,
	/// First tooltip line; omitted when empty.
	pub tooltip_header: String,
}

impl Default for ViewStyle {
	fn default() -> Self {
		Self {
			focal_color: "orange".into(),
			focal_size: 35.0,
			neighbor_color: "skyblue".into(),
			neighbor_size: 20.0,
			heat_rgb: "255,100,100".into(),
			heat_alpha_base: 0.2,
			heat_alpha_scale: 0.8,
			heat_size_base: 15.0,
			heat_size_scale: 40.0,
			community_size: 25.0,
			community_focal_size: 40.0,
			neutral_color: "lightgray".into(),
			neutral_size: 15.0,
			tooltip_header: "Node attributes:".into(),
		}
	}
}

/// How one visible node is drawn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisualAttrs {
	/// CSS color.
	pub color: String,
	/// Node size.
	pub size: f64,
	/// Hover text.
	pub tooltip: String,
}

/// The per-interaction inputs of a projection.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionRequest {
	/// Selected node.
	pub focal: String,
	/// Visualization mode.
	pub mode: ViewMode,
	/// Palette name for community modes.
	pub palette: String,
	/// Ego network: include two-hop neighbors.
	pub expand: bool,
}

impl ProjectionRequest {
	/// Request with the default palette and no expansion.
	pub fn new(focal: impl Into<String>, mode: ViewMode) -> Self {
		Self {
			focal: focal.into(),
			mode,
			palette: DEFAULT_PALETTE.into(),
			expand: false,
		}
	}

	/// Use the named palette.
	pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
		self.palette = palette.into();
		self
	}

	/// Toggle two-hop expansion.
	pub fn expanded(mut self, expand: bool) -> Self {
		self.expand = expand;
		self
	}
}

/// Visible subgraph plus how to draw each of its nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
	/// Induced subgraph of the visible nodes.
	pub subgraph: Subgraph,
	/// One entry per visible node.
	pub visuals: HashMap<String, VisualAttrs>,
}

/// Project `graph` for one interaction.
///
/// Fails with [`ExplorerError::UnknownNode`] when the focal node is not in
/// the graph, and with [`ExplorerError::UnknownPalette`] when a community
/// mode names an unregistered palette. The palette is not looked up for
/// other modes.
pub fn project(
	graph: &RelationGraph,
	partition: &Partition,
	centrality: &CentralityMap,
	request: &ProjectionRequest,
	style: &ViewStyle,
) -> Result<Projection> {
	let focal = request.focal.as_str();
	if !graph.contains(focal) {
		return Err(ExplorerError::UnknownNode(focal.to_string()));
	}
	let colors = if request.mode.uses_palette() {
		Some(palette(&request.palette)?)
	} else {
		None
	};

	let subgraph = match request.mode {
		ViewMode::EgoNetwork => {
			let visible = ego_network(graph, focal, request.expand)?;
			graph.induced_subgraph(&visible)
		}
		ViewMode::SelectedCommunity => {
			let community = partition
				.community_of(focal)
				.ok_or_else(|| ExplorerError::UnknownNode(focal.to_string()))?;
			let visible: HashSet<&str> = partition.members(community).collect();
			graph.induced_subgraph(&visible)
		}
		ViewMode::CentralityHeatmap | ViewMode::AllCommunities | ViewMode::Neutral => {
			graph.to_subgraph()
		}
	};

	let mut visuals = HashMap::with_capacity(subgraph.nodes.len());
	for id in &subgraph.nodes {
		let tooltip = tooltip(graph.attributes(id)?, &style.tooltip_header);
		let is_focal = id == focal;
		let (color, size) = match request.mode {
			ViewMode::EgoNetwork if is_focal => (style.focal_color.clone(), style.focal_size),
			ViewMode::EgoNetwork => (style.neighbor_color.clone(), style.neighbor_size),
			ViewMode::CentralityHeatmap => {
				let c = centrality.get(id).copied().unwrap_or_default();
				(
					format!(
						"rgba({},{:.3})",
						style.heat_rgb,
						style.heat_alpha_base + style.heat_alpha_scale * c
					),
					style.heat_size_base + style.heat_size_scale * c,
				)
			}
			ViewMode::AllCommunities | ViewMode::SelectedCommunity => {
				let color = match (colors, partition.community_of(id)) {
					(Some(p), Some(c)) => p.color_for(c).to_string(),
					_ => style.neutral_color.clone(),
				};
				let size = if is_focal && request.mode == ViewMode::SelectedCommunity {
					style.community_focal_size
				} else {
					style.community_size
				};
				(color, size)
			}
			ViewMode::Neutral => (style.neutral_color.clone(), style.neutral_size),
		};
		visuals.insert(
			id.clone(),
			VisualAttrs {
				color,
				size,
				tooltip,
			},
		);
	}

	Ok(Projection { subgraph, visuals })
}

/// Nodes within one hop of `focal` in either direction, or two hops when
/// `expand` is set. Always contains `focal`.
pub fn ego_network<'g>(
	graph: &'g RelationGraph,
	focal: &str,
	expand: bool,
) -> Result<HashSet<&'g str>> {
	let first = graph.neighbors(focal)?;
	let mut visible: HashSet<&str> = first.iter().copied().collect();
	visible.insert(graph.node(focal)?.id.as_str());
	if expand {
		for n in &first {
			visible.extend(graph.neighbors(n)?);
		}
	}
	Ok(visible)
}

/// `header` followed by one `key: value` line per attribute.
pub fn tooltip(attributes: &Attributes, header: &str) -> String {
	let lines = attributes.iter().map(|(k, v)| format!("{k}: {v}"));
	if header.is_empty() {
		lines.collect::<Vec<_>>().join("\n")
	} else {
		std::iter::once(header.to_string())
			.chain(lines)
			.collect::<Vec<_>>()
			.join("\n")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::community::partition;
	use crate::graph::build_graph;
	use crate::metrics::compute_metrics;
	use crate::table::EdgeRecord;

	fn graph(pairs: &[(&str, &str)]) -> RelationGraph {
		let rows: Vec<_> = pairs.iter().map(|(p, c)| EdgeRecord::new(*p, *c)).collect();
		build_graph(&rows).unwrap()
	}

	fn run(g: &RelationGraph, request: &ProjectionRequest) -> Result<Projection> {
		let metrics = compute_metrics(g);
		project(g, &partition(g), &metrics.centrality, request, &ViewStyle::default())
	}

	#[test]
	fn mode_parsing_falls_back() {
		assert_eq!(ViewMode::from("Betweenness Centrality"), ViewMode::CentralityHeatmap);
		assert_eq!(ViewMode::from("community"), ViewMode::SelectedCommunity);
		assert_eq!(ViewMode::from("sparkles"), ViewMode::Neutral);
		for mode in ViewMode::ALL {
			assert_eq!(ViewMode::from(mode.label()), mode);
		}
	}

	#[test]
	fn ego_highlights_focal() {
		let g = graph(&[("A", "B"), ("A", "C"), ("B", "C"), ("C", "D")]);
		let p = run(&g, &ProjectionRequest::new("A", ViewMode::EgoNetwork)).unwrap();
		assert_eq!(p.subgraph.nodes, ["A", "B", "C"]);
		assert_eq!(p.subgraph.edges.len(), 3);
		assert_eq!(p.visuals["A"].color, "orange");
		assert_eq!(p.visuals["A"].size, 35.0);
		assert_eq!(p.visuals["B"].color, "skyblue");
	}

	#[test]
	fn expansion_reaches_two_hops_both_directions() {
		let g = graph(&[("P", "A"), ("A", "B"), ("Q", "B"), ("B", "C"), ("C", "D")]);
		let near = ego_network(&g, "A", false).unwrap();
		let far = ego_network(&g, "A", true).unwrap();
		assert_eq!(near, ["A", "B", "P"].into());
		assert_eq!(far, ["A", "B", "P", "Q", "C"].into());
	}

	#[test]
	fn heatmap_scales_with_centrality() {
		let g = graph(&[("A", "B"), ("B", "C")]);
		let p = run(&g, &ProjectionRequest::new("A", ViewMode::CentralityHeatmap)).unwrap();
		assert_eq!(p.subgraph.nodes.len(), 3);
		assert_eq!(p.visuals["B"].size, 35.0);
		assert_eq!(p.visuals["B"].color, "rgba(255,100,100,0.600)");
		assert_eq!(p.visuals["A"].size, 15.0);
		assert!(p.visuals["B"].size > p.visuals["C"].size);
	}

	#[test]
	fn all_communities_use_palette() {
		let g = graph(&[("A", "B"), ("C", "D")]);
		let request = ProjectionRequest::new("A", ViewMode::AllCommunities).with_palette("Pastel");
		let p = run(&g, &request).unwrap();
		assert_eq!(p.visuals.len(), 4);
		assert_eq!(p.visuals["A"].color, p.visuals["B"].color);
		assert_ne!(p.visuals["A"].color, p.visuals["C"].color);
		assert!(p.visuals.values().all(|v| v.size == 25.0));
	}

	#[test]
	fn selected_community_enlarges_focal() {
		let g = graph(&[("A", "B"), ("C", "D")]);
		let p = run(&g, &ProjectionRequest::new("A", ViewMode::SelectedCommunity)).unwrap();
		assert_eq!(p.subgraph.nodes, ["A", "B"]);
		assert_eq!(p.visuals["A"].size, 40.0);
		assert_eq!(p.visuals["B"].size, 25.0);
	}

	#[test]
	fn neutral_is_uniform() {
		let g = graph(&[("A", "B")]);
		let p = run(&g, &ProjectionRequest::new("B", ViewMode::from("whatever"))).unwrap();
		assert!(p.visuals.values().all(|v| v.color == "lightgray" && v.size == 15.0));
	}

	#[test]
	fn errors_surface() {
		let g = graph(&[("A", "B")]);
		let err = run(&g, &ProjectionRequest::new("Z", ViewMode::CentralityHeatmap)).unwrap_err();
		assert!(matches!(err, ExplorerError::UnknownNode(id) if id == "Z"));

		let bad = ProjectionRequest::new("A", ViewMode::AllCommunities).with_palette("Neon");
		assert!(matches!(run(&g, &bad), Err(ExplorerError::UnknownPalette(_))));

		let ignored = ProjectionRequest::new("A", ViewMode::EgoNetwork).with_palette("Neon");
		assert!(run(&g, &ignored).is_ok());
	}

	#[test]
	fn tooltip_lists_attributes_in_order() {
		let rows = vec![EdgeRecord::new("A", "B").with_attr("role", "lead").with_attr("age", 40i64)];
		let g = build_graph(&rows).unwrap();
		let p = run(&g, &ProjectionRequest::new("A", ViewMode::Neutral)).unwrap();
		assert_eq!(p.visuals["B"].tooltip, "Node attributes:\nrole: lead\nage: 40");
		assert_eq!(p.visuals["A"].tooltip, "Node attributes:");
		assert_eq!(tooltip(g.attributes("B").unwrap(), ""), "role: lead\nage: 40");
	}
}
