//! The relationship table: typed edge rows plus the tabular (CSV) schema they
//! round-trip through.
//!
//! Rows are normalised on the way in: ids are trimmed, and rows with a
//! missing parent or child are dropped before they can reach the graph
//! builder. Extra columns are preserved in first-seen order.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::io;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::TableConfig;
use crate::error::{ExplorerError, Result};

/// A scalar cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
	/// `true` / `false`.
	Bool(bool),
	/// Whole number.
	Integer(i64),
	/// Finite floating point number.
	Float(f64),
	/// Anything else.
	Text(String),
}

impl AttrValue {
	/// Parse a raw cell. Blank cells are absent (`None`).
	///
	/// A cell is only typed as a number when writing the number back gives
	/// the same text, so `007`, `1.50` or `1e3` stay text and export
	/// unchanged.
	pub fn parse_cell(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		if raw.is_empty() {
			return None;
		}
		if let Ok(i) = raw.parse::<i64>() {
			if i.to_string() == raw {
				return Some(Self::Integer(i));
			}
		}
		if let Ok(f) = raw.parse::<f64>() {
			if f.is_finite() && f.to_string() == raw {
				return Some(Self::Float(f));
			}
		}
		Some(match raw {
			"true" => Self::Bool(true),
			"false" => Self::Bool(false),
			_ => Self::Text(raw.to_string()),
		})
	}
}

impl fmt::Display for AttrValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bool(b) => write!(f, "{b}"),
			Self::Integer(i) => write!(f, "{i}"),
			Self::Float(x) => write!(f, "{x}"),
			Self::Text(s) => f.write_str(s),
		}
	}
}

impl From<&str> for AttrValue {
	fn from(s: &str) -> Self {
		Self::Text(s.to_string())
	}
}

impl From<String> for AttrValue {
	fn from(s: String) -> Self {
		Self::Text(s)
	}
}

impl From<i64> for AttrValue {
	fn from(i: i64) -> Self {
		Self::Integer(i)
	}
}

impl From<f64> for AttrValue {
	fn from(x: f64) -> Self {
		Self::Float(x)
	}
}

impl From<bool> for AttrValue {
	fn from(b: bool) -> Self {
		Self::Bool(b)
	}
}

/// Named attributes kept in insertion order.
///
/// Re-inserting an existing name overwrites the value in place, so the
/// position of a name is fixed by the first time it was seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
	entries: Vec<(String, AttrValue)>,
}

impl Attributes {
	/// Empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or overwrite (last write wins).
	pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
		let name = name.into();
		match self.entries.iter_mut().find(|(k, _)| *k == name) {
			Some((_, slot)) => *slot = value,
			None => self.entries.push((name, value)),
		}
	}

	/// Merge every entry of `other` into `self`, in `other`'s order.
	pub fn merge(&mut self, other: &Attributes) {
		for (k, v) in other.iter() {
			self.insert(k.clone(), v.clone());
		}
	}

	/// Value for `name`, if present.
	pub fn get(&self, name: &str) -> Option<&AttrValue> {
		self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
	}

	/// Entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
		self.entries.iter().map(|(k, v)| (k, v))
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether there are no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Serialize for Attributes {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		serializer.collect_map(self.iter())
	}
}

impl<K: Into<String>, V: Into<AttrValue>> FromIterator<(K, V)> for Attributes {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut attrs = Self::new();
		for (k, v) in iter {
			attrs.insert(k, v.into());
		}
		attrs
	}
}

/// One row of the relationship table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeRecord {
	/// Parent (edge source) id.
	pub parent: String,
	/// Child (edge destination) id.
	pub child: String,
	/// Extra non-null cells of the row.
	pub attributes: Attributes,
}

impl EdgeRecord {
	/// Row without extra attributes.
	pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
		Self {
			parent: parent.into(),
			child: child.into(),
			attributes: Attributes::new(),
		}
	}

	/// Builder-style attribute setter.
	pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
		self.attributes.insert(name, value.into());
		self
	}

	/// Builder-style setter from a raw cell, typed like a CSV cell. Blank
	/// cells are skipped.
	pub fn with_cell(mut self, name: impl Into<String>, raw: &str) -> Self {
		if let Some(value) = AttrValue::parse_cell(raw) {
			self.attributes.insert(name, value);
		}
		self
	}
}

/// The pending, editable relationship table.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeTable {
	parent_column: String,
	child_column: String,
	extra_columns: Vec<String>,
	rows: Vec<EdgeRecord>,
}

impl EdgeTable {
	/// Empty table with the given schema.
	pub fn new(schema: &TableConfig) -> Self {
		Self {
			parent_column: schema.parent_column.clone(),
			child_column: schema.child_column.clone(),
			extra_columns: Vec::new(),
			rows: Vec::new(),
		}
	}

	/// Build a table from already-typed rows, dropping rows with blank ids.
	pub fn from_records(schema: &TableConfig, records: impl IntoIterator<Item = EdgeRecord>) -> Self {
		let mut table = Self::new(schema);
		let mut dropped = 0usize;
		for record in records {
			if table.push(record).is_err() {
				dropped += 1;
			}
		}
		if dropped > 0 {
			debug!("dropped {dropped} rows without parent or child");
		}
		table
	}

	/// Read a CSV document with a header row.
	///
	/// Fails with [`ExplorerError::MissingColumn`] when the parent or child
	/// header is absent. Rows with a blank parent or child are dropped.
	pub fn from_csv_reader<R: io::Read>(reader: R, schema: &TableConfig) -> Result<Self> {
		let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
		let headers = csv.headers()?.clone();

		let position = |name: &str| {
			headers
				.iter()
				.position(|h| h.trim() == name)
				.ok_or_else(|| ExplorerError::MissingColumn(name.to_string()))
		};
		let parent_idx = position(&schema.parent_column)?;
		let child_idx = position(&schema.child_column)?;

		let extras: Vec<(usize, String)> = headers
			.iter()
			.enumerate()
			.filter(|(i, _)| *i != parent_idx && *i != child_idx)
			.map(|(i, h)| (i, h.trim().to_string()))
			.collect();

		let mut table = Self::new(schema);
		table.extra_columns = extras.iter().map(|(_, h)| h.clone()).collect();

		let mut dropped = 0usize;
		for record in csv.records() {
			let record = record?;
			let parent = record.get(parent_idx).map(str::trim).unwrap_or_default();
			let child = record.get(child_idx).map(str::trim).unwrap_or_default();
			if parent.is_empty() || child.is_empty() {
				dropped += 1;
				continue;
			}
			let attributes = extras
				.iter()
				.filter_map(|(i, name)| {
					record
						.get(*i)
						.and_then(AttrValue::parse_cell)
						.map(|v| (name.clone(), v))
				})
				.collect();
			table.rows.push(EdgeRecord {
				parent: parent.to_string(),
				child: child.to_string(),
				attributes,
			});
		}
		if dropped > 0 {
			debug!("dropped {dropped} rows without parent or child");
		}
		Ok(table)
	}

	/// Write the table as CSV: parent column, child column, then every extra
	/// column. Absent values become empty cells.
	pub fn to_csv_writer<W: io::Write>(&self, writer: W) -> Result<()> {
		let mut csv = csv::Writer::from_writer(writer);
		let header = [self.parent_column.as_str(), self.child_column.as_str()]
			.into_iter()
			.chain(self.extra_columns.iter().map(String::as_str));
		csv.write_record(header)?;
		for row in &self.rows {
			let mut cells = vec![row.parent.clone(), row.child.clone()];
			cells.extend(self.extra_columns.iter().map(|col| {
				row.attributes
					.get(col)
					.map(ToString::to_string)
					.unwrap_or_default()
			}));
			csv.write_record(&cells)?;
		}
		csv.flush()?;
		Ok(())
	}

	/// Append one relationship row. Does not touch any built graph.
	///
	/// Blank ids are rejected with [`ExplorerError::InvalidRecord`]; attribute
	/// names not yet in the schema become new extra columns.
	pub fn append_row(&mut self, record: EdgeRecord) -> Result<()> {
		self.push(record)
	}

	fn push(&mut self, mut record: EdgeRecord) -> Result<()> {
		record.parent = record.parent.trim().to_string();
		record.child = record.child.trim().to_string();
		if record.parent.is_empty() || record.child.is_empty() {
			return Err(ExplorerError::invalid_record(
				self.rows.len(),
				"parent and child must be non-empty",
			));
		}
		for (name, _) in record.attributes.iter() {
			if !self.extra_columns.contains(name) {
				self.extra_columns.push(name.clone());
			}
		}
		self.rows.push(record);
		Ok(())
	}

	/// Rows in table order.
	pub fn rows(&self) -> &[EdgeRecord] {
		&self.rows
	}

	/// Number of rows.
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	/// Whether the table has no rows.
	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Name of the parent id column.
	pub fn parent_column(&self) -> &str {
		&self.parent_column
	}

	/// Name of the child id column.
	pub fn child_column(&self) -> &str {
		&self.child_column
	}

	/// Extra columns in first-seen order.
	pub fn extra_columns(&self) -> &[String] {
		&self.extra_columns
	}

	/// Every distinct id appearing as parent or child, sorted.
	pub fn node_ids(&self) -> Vec<String> {
		self.rows
			.iter()
			.flat_map(|r| [r.parent.as_str(), r.child.as_str()])
			.collect::<BTreeSet<_>>()
			.into_iter()
			.map(str::to_string)
			.collect()
	}

	/// Rows whose parent or child is one of `nodes`.
	pub fn rows_touching(&self, nodes: &HashSet<String>) -> Vec<&EdgeRecord> {
		self.rows
			.iter()
			.filter(|r| nodes.contains(&r.parent) || nodes.contains(&r.child))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = "\
nome_parent,nome_nodo,ruolo,peso
A,B,manager,3
A,C,,1.5
,D,orphan,
B,C,analyst,true
";

	#[test]
	fn parse_cell_types() {
		assert_eq!(AttrValue::parse_cell("  "), None);
		assert_eq!(AttrValue::parse_cell("12"), Some(AttrValue::Integer(12)));
		assert_eq!(AttrValue::parse_cell("1.5"), Some(AttrValue::Float(1.5)));
		assert_eq!(AttrValue::parse_cell("true"), Some(AttrValue::Bool(true)));
		assert_eq!(AttrValue::parse_cell("inf"), Some(AttrValue::Text("inf".into())));
		assert_eq!(AttrValue::parse_cell(" x "), Some(AttrValue::Text("x".into())));
		assert_eq!(AttrValue::parse_cell("007"), Some(AttrValue::Text("007".into())));
		assert_eq!(AttrValue::parse_cell("1.50"), Some(AttrValue::Text("1.50".into())));
		assert_eq!(AttrValue::parse_cell("1e3"), Some(AttrValue::Text("1e3".into())));
		assert_eq!(AttrValue::parse_cell("-4"), Some(AttrValue::Integer(-4)));
	}

	#[test]
	fn csv_export_keeps_cell_text() {
		let src = "nome_parent,nome_nodo,codice,quota,soglia,intero\nA,B,007,1.50,1e3,1.0\nB,C,12,0.25,,+5\n";
		let table = EdgeTable::from_csv_reader(src.as_bytes(), &TableConfig::default()).unwrap();
		let mut out = Vec::new();
		table.to_csv_writer(&mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), src);

		let first = &table.rows()[0].attributes;
		assert_eq!(first.get("codice").map(ToString::to_string).as_deref(), Some("007"));
		assert_eq!(table.rows()[1].attributes.get("quota"), Some(&AttrValue::Float(0.25)));
	}

	#[test]
	fn with_cell_skips_blanks_and_types_values() {
		let record = EdgeRecord::new("A", "B")
			.with_cell("ruolo", " dev ")
			.with_cell("sede", "   ")
			.with_cell("anzianita", "4");
		assert_eq!(record.attributes.len(), 2);
		assert_eq!(record.attributes.get("ruolo"), Some(&AttrValue::Text("dev".into())));
		assert_eq!(record.attributes.get("anzianita"), Some(&AttrValue::Integer(4)));
	}

	#[test]
	fn attributes_overwrite_in_place() {
		let mut attrs = Attributes::new();
		attrs.insert("a", AttrValue::Integer(1));
		attrs.insert("b", AttrValue::Integer(2));
		attrs.insert("a", AttrValue::Integer(3));
		let names: Vec<_> = attrs.iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(names, ["a", "b"]);
		assert_eq!(attrs.get("a"), Some(&AttrValue::Integer(3)));
	}

	#[test]
	fn csv_drops_rows_without_ids() {
		let table = EdgeTable::from_csv_reader(SAMPLE.as_bytes(), &TableConfig::default()).unwrap();
		assert_eq!(table.len(), 3);
		assert_eq!(table.extra_columns(), ["ruolo", "peso"]);
		let second = &table.rows()[1];
		assert_eq!(second.attributes.get("ruolo"), None);
		assert_eq!(second.attributes.get("peso"), Some(&AttrValue::Float(1.5)));
		assert_eq!(table.node_ids(), ["A", "B", "C"]);
	}

	#[test]
	fn csv_missing_child_column() {
		let err = EdgeTable::from_csv_reader("nome_parent,x\nA,B\n".as_bytes(), &TableConfig::default())
			.unwrap_err();
		assert!(matches!(err, ExplorerError::MissingColumn(c) if c == "nome_nodo"));
	}

	#[test]
	fn csv_round_trip_preserves_columns() {
		let table = EdgeTable::from_csv_reader(SAMPLE.as_bytes(), &TableConfig::default()).unwrap();
		let mut out = Vec::new();
		table.to_csv_writer(&mut out).unwrap();
		let text = String::from_utf8(out).unwrap();
		assert!(text.starts_with("nome_parent,nome_nodo,ruolo,peso\n"));
		let reread = EdgeTable::from_csv_reader(text.as_bytes(), &TableConfig::default()).unwrap();
		assert_eq!(reread, table);
	}

	#[test]
	fn append_row_extends_schema() {
		let mut table = EdgeTable::new(&TableConfig::default());
		table
			.append_row(EdgeRecord::new(" X ", "Y").with_attr("colore", "blu"))
			.unwrap();
		assert_eq!(table.rows()[0].parent, "X");
		assert_eq!(table.extra_columns(), ["colore"]);

		let err = table.append_row(EdgeRecord::new("X", "  ")).unwrap_err();
		assert!(matches!(err, ExplorerError::InvalidRecord { row: 1, .. }));
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn rows_touching_filters_by_either_end() {
		let table = EdgeTable::from_csv_reader(SAMPLE.as_bytes(), &TableConfig::default()).unwrap();
		let nodes: HashSet<String> = ["C".to_string()].into();
		assert_eq!(table.rows_touching(&nodes).len(), 2);
	}
}
