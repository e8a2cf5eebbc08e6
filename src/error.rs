//! Error types for the relation graph core.

use thiserror::Error;

/// Top-level error type for table loading, graph building and projection.
///
/// Metric unavailability is not an error: see [`crate::metrics::Metric`].
#[derive(Debug, Error)]
pub enum ExplorerError {
	/// An edge record could not be turned into graph structure.
	#[error("invalid record at row {row}: {reason}")]
	InvalidRecord {
		/// Zero-based position of the offending row.
		row: usize,
		/// What was wrong with it.
		reason: String,
	},

	/// The requested node is not part of the current graph.
	#[error("unknown node: {0}")]
	UnknownNode(String),

	/// The requested palette is not registered.
	#[error("unknown palette: {0}")]
	UnknownPalette(String),

	/// A tabular source lacks one of the required id columns.
	#[error("missing required column: {0}")]
	MissingColumn(String),

	/// Configuration text could not be parsed.
	#[error("configuration error: {0}")]
	Config(#[from] toml::de::Error),

	/// CSV reading or writing failed.
	#[error("csv error: {0}")]
	Csv(#[from] csv::Error),

	/// JSON serialization failed.
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),

	/// I/O error wrapper.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl ExplorerError {
	pub(crate) fn invalid_record(row: usize, reason: impl Into<String>) -> Self {
		Self::InvalidRecord {
			row,
			reason: reason.into(),
		}
	}
}

/// Result type for relation graph operations.
pub type Result<T> = std::result::Result<T, ExplorerError>;
