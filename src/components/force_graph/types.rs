use crate::projection::Projection;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub color: String,
	pub size: f64,
	pub tooltip: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Canvas input for a projection; every visible node is labelled with its id.
	pub fn from_projection(projection: &Projection) -> Self {
		let nodes = projection
			.subgraph
			.nodes
			.iter()
			.filter_map(|id| {
				let visual = projection.visuals.get(id)?;
				Some(GraphNode {
					id: id.clone(),
					label: Some(id.clone()),
					color: visual.color.clone(),
					size: visual.size,
					tooltip: visual.tooltip.clone(),
				})
			})
			.collect();
		let links = projection
			.subgraph
			.edges
			.iter()
			.map(|(source, target)| GraphLink {
				source: source.clone(),
				target: target.clone(),
			})
			.collect();
		Self { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Subgraph;
	use crate::projection::VisualAttrs;

	#[test]
	fn projection_becomes_canvas_data() {
		let projection = Projection {
			subgraph: Subgraph {
				nodes: vec!["A".into(), "B".into()],
				edges: vec![("A".into(), "B".into())],
			},
			visuals: [("A", "orange"), ("B", "skyblue")]
				.into_iter()
				.map(|(id, color)| {
					(
						id.to_string(),
						VisualAttrs {
							color: color.into(),
							size: 20.0,
							tooltip: String::new(),
						},
					)
				})
				.collect(),
		};
		let data = GraphData::from_projection(&projection);
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].color, "orange");
		assert_eq!(data.nodes[1].label.as_deref(), Some("B"));
		assert_eq!(data.links, [GraphLink {
			source: "A".into(),
			target: "B".into()
		}]);
	}
}
