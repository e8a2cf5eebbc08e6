//! Explore a parent/child relationship table as an interactive graph.
//!
//! The analysis core (table, graph, metrics, communities, projections) is
//! target-independent; the Leptos client-side app renders its projections on
//! a force-directed canvas.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod community;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod palette;
pub mod projection;
pub mod session;
pub mod table;

// UI
mod components;
mod pages;

pub use community::{LouvainConfig, Partition, partition, partition_with};
pub use config::{ExplorerConfig, TableConfig};
pub use error::{ExplorerError, Result};
pub use graph::{NodeRecord, RelationGraph, Subgraph, build_graph};
pub use metrics::{CentralityMap, GraphMetrics, Metric, compute_metrics};
pub use palette::{DEFAULT_PALETTE, Palette, palette};
pub use projection::{Projection, ProjectionRequest, ViewMode, ViewStyle, VisualAttrs, project};
pub use session::{Session, Snapshot};
pub use table::{AttrValue, Attributes, EdgeRecord, EdgeTable};

use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the explorer and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Relation Graph Explorer" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
