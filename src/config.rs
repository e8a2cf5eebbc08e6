//! Session configuration: table schema, community detection and view styling.

use serde::{Deserialize, Serialize};

use crate::community::LouvainConfig;
use crate::error::Result;
use crate::palette::DEFAULT_PALETTE;
use crate::projection::ViewStyle;

/// Column names of the relationship table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
	/// Column holding the parent (edge source) id.
	pub parent_column: String,
	/// Column holding the child (edge destination) id.
	pub child_column: String,
}

impl Default for TableConfig {
	fn default() -> Self {
		Self {
			parent_column: "nome_parent".into(),
			child_column: "nome_nodo".into(),
		}
	}
}

/// Everything a [`crate::session::Session`] needs besides its table.
///
/// Every key is optional; a TOML document only has to name what it overrides:
///
/// ```toml
/// default_palette = "Pastel"
///
/// [table]
/// parent_column = "source"
///
/// [community]
/// seed = 7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// Table schema.
	pub table: TableConfig,
	/// Palette used when a request names none.
	pub default_palette: String,
	/// Louvain parameters.
	pub community: LouvainConfig,
	/// Visual constants for every projection mode.
	pub style: ViewStyle,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			table: TableConfig::default(),
			default_palette: DEFAULT_PALETTE.into(),
			community: LouvainConfig::default(),
			style: ViewStyle::default(),
		}
	}
}

impl ExplorerConfig {
	/// Parse a configuration from TOML text.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}
}
