//! Row projection.
//!
//! Turns live records into plain column-name-to-value rows, dropping every
//! field that must never be persisted or reloaded.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::{SeedError, SeedResult};
use crate::table::TableDescriptor;

/// One record's persisted data.
pub type Row = serde_json::Map<String, Value>;

/// Projects records into rows.
#[derive(Debug, Clone)]
pub struct RowProjector {
	excluded: BTreeSet<String>,
	columns: Option<BTreeSet<String>>,
}

impl RowProjector {
	/// Creates a projector that drops the given field names.
	pub fn new<I, S>(excluded: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			excluded: excluded.into_iter().map(Into::into).collect(),
			columns: None,
		}
	}

	/// Creates a projector for a table's excluded fields.
	///
	/// When the table declares its columns, every projected row must carry
	/// exactly the columns that survive exclusion.
	pub fn for_table(table: &TableDescriptor) -> Self {
		let columns = (!table.columns.is_empty()).then(|| {
			table
				.seeded_columns()
				.into_iter()
				.map(String::from)
				.collect()
		});
		Self {
			excluded: table.excluded_fields(),
			columns,
		}
	}

	/// Projects records in order. Empty input yields an empty sequence.
	///
	/// # Errors
	///
	/// Returns [`SeedError::Projection`] if a record does not serialize to
	/// a map of fields, or if its columns differ from the table's declared
	/// columns.
	pub fn project<T: Serialize>(&self, records: &[T]) -> SeedResult<Vec<Row>> {
		records
			.iter()
			.enumerate()
			.map(|(index, record)| self.project_one(index, record))
			.collect()
	}

	fn project_one<T: Serialize>(&self, index: usize, record: &T) -> SeedResult<Row> {
		let value = serde_json::to_value(record).map_err(|e| SeedError::Projection {
			index,
			message: e.to_string(),
		})?;

		match value {
			Value::Object(mut fields) => {
				fields.retain(|name, _| !self.excluded.contains(name));
				self.check_declared(index, &fields)?;
				Ok(fields)
			}
			other => Err(SeedError::Projection {
				index,
				message: format!("expected a map of fields, got {}", kind_of(&other)),
			}),
		}
	}

	fn check_declared(&self, index: usize, fields: &Row) -> SeedResult<()> {
		let Some(columns) = &self.columns else {
			return Ok(());
		};
		let missing: Vec<&str> = columns
			.iter()
			.filter(|c| !fields.contains_key(c.as_str()))
			.map(String::as_str)
			.collect();
		let undeclared: Vec<&str> = fields
			.keys()
			.filter(|k| !columns.contains(k.as_str()))
			.map(String::as_str)
			.collect();
		if missing.is_empty() && undeclared.is_empty() {
			return Ok(());
		}
		Err(SeedError::Projection {
			index,
			message: format!(
				"columns do not match the table: missing {:?}, undeclared {:?}",
				missing, undeclared
			),
		})
	}
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
