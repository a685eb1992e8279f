//! Progress reporting for dump and load.
//!
//! The seeder reports through a [`SeedObserver`] instead of logging
//! directly. [`TracingObserver`] forwards to `tracing`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Result of a successful dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpReport {
	/// Dumped table.
	pub table: String,
	/// Archive written.
	pub path: PathBuf,
	/// Rows in the archive.
	pub rows: usize,
	/// Compressed archive size.
	pub bytes: usize,
	/// When the archive was written.
	pub dumped_at: DateTime<Utc>,
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
	/// Target table.
	pub table: String,
	/// Archive read.
	pub path: PathBuf,
	/// Rows decoded from the archive.
	pub rows: usize,
	/// Insert calls issued.
	pub chunks: usize,
	/// Rows the insert operation reported as written.
	pub inserted: u64,
}

/// Receives dump and load events.
///
/// All methods default to doing nothing.
pub trait SeedObserver: Send + Sync {
	/// Called after an archive has been written.
	fn on_dump(&self, _report: &DumpReport) {}

	/// Called after every chunk of a load has been inserted.
	fn on_load(&self, _report: &LoadReport) {}

	/// Called after each chunk insert succeeds.
	fn on_chunk_inserted(&self, _table: &str, _chunk_index: usize, _chunks: usize, _rows: usize) {
	}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SeedObserver for NoopObserver {}

/// Observer that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SeedObserver for TracingObserver {
	fn on_dump(&self, report: &DumpReport) {
		tracing::info!(
			table = %report.table,
			path = %report.path.display(),
			rows = report.rows,
			bytes = report.bytes,
			"dumped seed archive"
		);
	}

	fn on_load(&self, report: &LoadReport) {
		tracing::info!(
			table = %report.table,
			path = %report.path.display(),
			rows = report.rows,
			chunks = report.chunks,
			inserted = report.inserted,
			"loaded seed archive"
		);
	}

	fn on_chunk_inserted(&self, table: &str, chunk_index: usize, chunks: usize, rows: usize) {
		tracing::debug!(
			table,
			chunk = chunk_index + 1,
			chunks,
			rows,
			"inserted seed chunk"
		);
	}
}
