//! Chunked bulk insertion.
//!
//! A single statement for a large table can exceed the database's
//! parameter or payload limits, so rows are inserted in bounded chunks.

use std::num::NonZeroUsize;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BoxError, SeedError, SeedResult};
use crate::observer::{NoopObserver, SeedObserver};
use crate::projector::Row;

/// A bulk insert operation.
///
/// Implemented by the host's data-access layer; a load can also be given a
/// different implementation (an upsert, a logging wrapper) per call.
#[async_trait]
pub trait BulkInsert: Send + Sync {
	/// Inserts `rows` into `table`, returning the number of rows written.
	async fn insert_all(
		&self,
		table: &str,
		rows: &[Row],
		options: &InsertOptions,
	) -> Result<u64, BoxError>;
}

/// What to do when an inserted row conflicts with an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnConflict {
	/// Fail the statement.
	#[default]
	Raise,
	/// Skip conflicting rows.
	Nothing,
	/// Overwrite every column of the existing row.
	ReplaceAll,
	/// Overwrite only the listed columns.
	Replace(Vec<String>),
}

/// Options handed verbatim to every [`BulkInsert::insert_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertOptions {
	/// Conflict resolution.
	pub on_conflict: OnConflict,

	/// Columns identifying a conflict.
	pub conflict_target: Vec<String>,

	/// Values rows may reference instead of repeating them.
	pub placeholders: Row,

	/// Schema or database prefix for the table.
	pub prefix: Option<String>,
}

impl InsertOptions {
	/// Creates default options (plain insert, raise on conflict).
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the conflict behaviour.
	pub fn with_on_conflict(mut self, on_conflict: OnConflict) -> Self {
		self.on_conflict = on_conflict;
		self
	}

	/// Sets the conflict target columns.
	pub fn with_conflict_target<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.conflict_target = columns.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the placeholders.
	pub fn with_placeholders(mut self, placeholders: Row) -> Self {
		self.placeholders = placeholders;
		self
	}

	/// Sets the table prefix.
	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}
}

/// Outcome of a chunked load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkSummary {
	/// Insert calls issued.
	pub chunks: usize,
	/// Rows handed to the insert operation.
	pub rows: usize,
	/// Rows the insert operation reported as written.
	pub inserted: u64,
}

/// Splits rows into chunks and inserts them in order.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedLoader {
	chunk_size: NonZeroUsize,
}

impl ChunkedLoader {
	/// Creates a loader with the given chunk size.
	pub fn new(chunk_size: NonZeroUsize) -> Self {
		Self { chunk_size }
	}

	/// Number of insert calls needed for `rows` rows.
	pub fn chunk_count(&self, rows: usize) -> usize {
		rows.div_ceil(self.chunk_size.get())
	}

	/// Inserts `rows` chunk by chunk.
	///
	/// Stops at the first failing chunk. Chunks before it are not rolled
	/// back; wrap the call in a transaction for all-or-nothing loads.
	pub async fn load<I>(
		&self,
		inserter: &I,
		table: &str,
		rows: &[Row],
		options: &InsertOptions,
	) -> SeedResult<ChunkSummary>
	where
		I: BulkInsert + ?Sized,
	{
		self.load_observed(inserter, table, rows, options, &NoopObserver)
			.await
	}

	/// Like [`load`](Self::load), reporting each committed chunk.
	pub async fn load_observed<I>(
		&self,
		inserter: &I,
		table: &str,
		rows: &[Row],
		options: &InsertOptions,
		observer: &dyn SeedObserver,
	) -> SeedResult<ChunkSummary>
	where
		I: BulkInsert + ?Sized,
	{
		let total = self.chunk_count(rows.len());
		let mut summary = ChunkSummary::default();

		for (chunk_index, chunk) in rows.chunks(self.chunk_size.get()).enumerate() {
			let inserted = inserter
				.insert_all(table, chunk, options)
				.await
				.map_err(|source| SeedError::Insert {
					table: table.to_string(),
					chunk_index,
					source,
				})?;

			summary.chunks += 1;
			summary.rows += chunk.len();
			summary.inserted += inserted;
			observer.on_chunk_inserted(table, chunk_index, total, chunk.len());
		}

		Ok(summary)
	}
}

impl Default for ChunkedLoader {
	fn default() -> Self {
		Self::new(crate::settings::SeedSettings::default().default_chunk_size)
	}
}
