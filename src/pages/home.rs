use std::collections::HashMap;

use leptos::prelude::*;
use log::{error, warn};

use crate::components::force_graph::{ForceGraphCanvas, GraphData};
use crate::config::ExplorerConfig;
use crate::metrics::community_summary;
use crate::palette::{DEFAULT_PALETTE, palette_names};
use crate::projection::{Projection, ProjectionRequest, ViewMode};
use crate::session::Session;
use crate::table::EdgeRecord;

const SAMPLE_TABLE: &str = include_str!("../../assets/sample_network.csv");

/// Session over the bundled sample table; empty if it fails to load.
fn sample_session() -> Session {
	Session::from_csv_reader(ExplorerConfig::default(), SAMPLE_TABLE.as_bytes()).unwrap_or_else(
		|err| {
			error!("sample table rejected: {err}");
			Session::new(ExplorerConfig::default())
		},
	)
}

/// Sorted node ids of the current snapshot.
fn node_choices(session: &Session) -> Vec<String> {
	let snapshot = session.snapshot();
	let mut ids: Vec<String> = snapshot.graph().node_ids().map(str::to_string).collect();
	ids.sort();
	ids
}

/// Dashboard of whole-graph statistics, plus the selected community when
/// that mode is active.
fn stats_view(session: &Session, focal: &str, mode: ViewMode) -> impl IntoView + use<> {
	let snapshot = session.snapshot();
	let m = snapshot.metrics();
	let partition = snapshot.partition();
	let mut lines = vec![
		format!("Nodes: {}", m.node_count),
		format!("Edges: {}", m.edge_count),
		format!("Density: {:.3}", m.density),
		format!("Isolated nodes: {}", m.isolated_count),
		format!("Weakly connected components: {}", m.weak_components),
		format!("Diameter: {}", m.diameter),
		format!(
			"Average path length: {}",
			m.avg_path_length
				.value()
				.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
		),
		format!(
			"Average clustering: {}",
			m.avg_clustering
				.value()
				.map_or_else(|| "n/a".to_string(), |v| format!("{v:.3}"))
		),
		format!("Communities: {}", partition.community_count()),
	];

	match mode {
		ViewMode::SelectedCommunity => {
			if let Some(summary) = partition
				.community_of(focal)
				.and_then(|c| community_summary(snapshot.graph(), partition, c))
			{
				lines.push(format!("Community {}", summary.community));
				lines.push(format!("  Members: {}", summary.members.len()));
				lines.push(format!("  Edges: {}", summary.edge_count));
				lines.push(format!("  Isolated: {}", summary.isolated_count));
				if let Some(hub) = summary.hub {
					lines.push(format!("  Most central: {hub}"));
				}
			}
		}
		ViewMode::AllCommunities => {
			lines.push("Nodes per community".to_string());
			lines.extend(
				partition
					.sizes()
					.into_iter()
					.map(|(c, n)| format!("  {c}: {n}")),
			);
		}
		_ => {}
	}

	view! {
		<ul class="graph-stats">
			{lines.into_iter().map(|l| view! { <li>{l}</li> }).collect_view()}
		</ul>
	}
}

/// Table rows touching the visible subgraph, with the table's own columns.
fn subgraph_rows_view(session: &Session, projection: Option<&Projection>) -> impl IntoView + use<> {
	let table = session.table();
	let columns: Vec<String> = [table.parent_column(), table.child_column()]
		.into_iter()
		.map(str::to_string)
		.chain(table.extra_columns().iter().cloned())
		.collect();
	let rows: Vec<Vec<String>> = projection
		.map(|p| session.projection_rows(p))
		.unwrap_or_default()
		.into_iter()
		.map(|row| {
			let mut cells = vec![row.parent.clone(), row.child.clone()];
			cells.extend(table.extra_columns().iter().map(|col| {
				row.attributes
					.get(col)
					.map(ToString::to_string)
					.unwrap_or_default()
			}));
			cells
		})
		.collect();

	view! {
		<details class="subgraph-rows">
			<summary>{format!("Rows of the current subgraph ({})", rows.len())}</summary>
			<table>
				<thead>
					<tr>{columns.into_iter().map(|c| view! { <th>{c}</th> }).collect_view()}</tr>
				</thead>
				<tbody>
					{rows
						.into_iter()
						.map(|cells| {
							view! {
								<tr>{cells.into_iter().map(|c| view! { <td>{c}</td> }).collect_view()}</tr>
							}
						})
						.collect_view()}
				</tbody>
			</table>
		</details>
	}
}

/// Explorer page: node picker, mode and palette controls, graph and stats.
#[component]
pub fn Home() -> impl IntoView {
	let session = RwSignal::new(sample_session());
	let focal = RwSignal::new(session.with_untracked(|s| node_choices(s).into_iter().next().unwrap_or_default()));
	let mode = RwSignal::new(ViewMode::EgoNetwork);
	let palette = RwSignal::new(DEFAULT_PALETTE.to_string());
	let expand = RwSignal::new(false);
	let new_parent = RwSignal::new(String::new());
	let new_child = RwSignal::new(String::new());
	let new_cells = RwSignal::new(HashMap::<String, String>::new());
	let status = RwSignal::new(String::new());
	let export = RwSignal::new(None::<String>);

	let nodes = Signal::derive(move || session.with(node_choices));
	let extra_columns = Signal::derive(move || session.with(|s| s.table().extra_columns().to_vec()));
	let projection = Signal::derive(move || {
		let request = ProjectionRequest::new(focal.get(), mode.get())
			.with_palette(palette.get())
			.expanded(expand.get());
		session
			.with(|s| s.project(&request))
			.map_err(|err| warn!("projection unavailable: {err}"))
			.ok()
	});
	let graph_data = Signal::derive(move || {
		projection
			.with(|p| p.as_ref().map(GraphData::from_projection))
			.unwrap_or_default()
	});
	let details = Signal::derive(move || {
		session.with(|s| {
			s.node_details(&focal.get())
				.and_then(|d| d.to_json())
				.unwrap_or_default()
		})
	});

	let add_row = move |_| {
		let (parent, child) = (new_parent.get_untracked(), new_child.get_untracked());
		if parent.trim().is_empty() || child.trim().is_empty() {
			return;
		}
		let record = new_cells.with_untracked(|cells| {
			extra_columns
				.get_untracked()
				.into_iter()
				.fold(EdgeRecord::new(parent.clone(), child.clone()), |record, col| {
					let raw = cells.get(&col).map(String::as_str).unwrap_or_default();
					record.with_cell(col, raw)
				})
		});
		let result = session.try_update(|s| s.append_row(record)).unwrap_or(Ok(()));
		match result {
			Ok(()) => {
				status.set(format!("Added {parent} → {child} (rebuild to apply)"));
				new_parent.set(String::new());
				new_child.set(String::new());
				new_cells.set(HashMap::new());
			}
			Err(err) => status.set(err.to_string()),
		}
	};
	let rebuild = move |_| {
		let result = session
			.try_update(|s| s.rebuild().map(|_| ()))
			.unwrap_or(Ok(()));
		if let Err(err) = result {
			status.set(err.to_string());
		} else {
			status.set("Graph rebuilt".to_string());
		}
	};
	let export_table = move |_| {
		match session.with_untracked(Session::export_csv_text) {
			Ok(text) => export.set(Some(text)),
			Err(err) => status.set(err.to_string()),
		}
	};
	let on_select = Callback::new(move |id: String| focal.set(id));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas data=graph_data fullscreen=true on_select=on_select />
				<div class="graph-overlay">
					<h1>"Relation Graph Explorer"</h1>
					<p class="subtitle">{move || mode.get().caption()}</p>

					<label>
						"Node "
						<select
							prop:value=move || focal.get()
							on:change=move |ev| focal.set(event_target_value(&ev))
						>
							{move || {
								nodes
									.get()
									.into_iter()
									.map(|id| view! { <option value=id.clone()>{id.clone()}</option> })
									.collect_view()
							}}
						</select>
					</label>

					<fieldset>
						{ViewMode::ALL
							.into_iter()
							.map(|m| {
								view! {
									<label>
										<input
											type="radio"
											name="view-mode"
											prop:checked=move || mode.get() == m
											on:change=move |_| mode.set(m)
										/>
										{m.label()}
									</label>
								}
							})
							.collect_view()}
					</fieldset>

					<Show when=move || mode.get().uses_palette()>
						<label>
							"Palette "
							<select
								prop:value=move || palette.get()
								on:change=move |ev| palette.set(event_target_value(&ev))
							>
								{palette_names()
									.map(|name| view! { <option value=name>{name}</option> })
									.collect_view()}
							</select>
						</label>
					</Show>

					<Show when=move || mode.get() == ViewMode::EgoNetwork>
						<label>
							<input
								type="checkbox"
								prop:checked=move || expand.get()
								on:change=move |ev| expand.set(event_target_checked(&ev))
							/>
							"Expand to neighbors of neighbors (2 hops)"
						</label>
					</Show>

					{move || session.with(|s| stats_view(s, &focal.get(), mode.get()))}

					{move || session.with(|s| projection.with(|p| subgraph_rows_view(s, p.as_ref())))}

					<pre class="node-details">{move || details.get()}</pre>

					<div class="add-row">
						<input
							placeholder="parent"
							prop:value=move || new_parent.get()
							on:input=move |ev| new_parent.set(event_target_value(&ev))
						/>
						<input
							placeholder="child"
							prop:value=move || new_child.get()
							on:input=move |ev| new_child.set(event_target_value(&ev))
						/>
						{move || {
							extra_columns
								.get()
								.into_iter()
								.map(|col| {
									let (shown, edited) = (col.clone(), col.clone());
									view! {
										<input
											placeholder=col
											prop:value=move || {
												new_cells.with(|c| c.get(&shown).cloned().unwrap_or_default())
											}
											on:input=move |ev| {
												let value = event_target_value(&ev);
												new_cells.update(|c| {
													c.insert(edited.clone(), value);
												});
											}
										/>
									}
								})
								.collect_view()
						}}
						<button on:click=add_row>"Add relation"</button>
						<button on:click=rebuild>"Rebuild"</button>
						<p class="status">{move || status.get()}</p>
					</div>

					<div class="export">
						<button on:click=export_table>"Export table (CSV)"</button>
						{move || {
							export
								.get()
								.map(|text| {
									let href = format!(
										"data:text/csv;charset=utf-8,{}",
										String::from(js_sys::encode_uri_component(&text)),
									);
									view! {
										<a href=href download="relations.csv">"Download"</a>
										<textarea readonly=true rows="6">{text}</textarea>
									}
								})
						}}
					</div>
				</div>
			</div>
		</ErrorBoundary>
	}
}
