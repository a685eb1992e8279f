//! Dump and load orchestration.
//!
//! - dump: scan → project → encode → write
//! - load: read → decode → chunked insert

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::Utc;

use crate::archive::{ArchiveCodec, ArchiveStore, SeedArchive};
use crate::error::{SeedError, SeedResult};
use crate::loader::{BulkInsert, ChunkedLoader, InsertOptions};
use crate::observer::{DumpReport, LoadReport, SeedObserver, TracingObserver};
use crate::projector::{Row, RowProjector};
use crate::repository::SeedRepository;
use crate::table::{ConnectionIdentity, TableDescriptor};

/// Options for [`Seeder::dump`].
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
	/// Free text written at the top of the archive.
	pub comment: Option<String>,

	/// Rows to archive instead of scanning the table.
	pub seed_data: Option<Vec<Row>>,
}

impl DumpOptions {
	/// Creates default options: scan the table, no comment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the archive comment.
	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	/// Archives the given rows instead of the table contents.
	pub fn with_seed_data(mut self, rows: Vec<Row>) -> Self {
		self.seed_data = Some(rows);
		self
	}
}

/// Options for [`Seeder::load`].
#[derive(Clone, Default)]
pub struct LoadOptions {
	/// Insert operation to use instead of the repository's own.
	pub insert_operation: Option<Arc<dyn BulkInsert>>,

	/// Options passed verbatim to every insert call.
	pub insert_options: InsertOptions,

	/// Rows per insert call. Falls back to the configured default.
	pub chunk_size: Option<NonZeroUsize>,
}

impl fmt::Debug for LoadOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LoadOptions")
			.field("insert_operation", &self.insert_operation.as_ref().map(|_| "custom"))
			.field("insert_options", &self.insert_options)
			.field("chunk_size", &self.chunk_size)
			.finish()
	}
}

impl LoadOptions {
	/// Creates default options: repository insert, default chunk size.
	pub fn new() -> Self {
		Self::default()
	}

	/// Uses a custom insert operation.
	pub fn with_insert_operation<I: BulkInsert + 'static>(mut self, operation: I) -> Self {
		self.insert_operation = Some(Arc::new(operation));
		self
	}

	/// Sets the insert options.
	pub fn with_insert_options(mut self, options: InsertOptions) -> Self {
		self.insert_options = options;
		self
	}

	/// Sets the chunk size.
	pub fn with_chunk_size(mut self, size: NonZeroUsize) -> Self {
		self.chunk_size = Some(size);
		self
	}
}

/// Options for [`Seeder::read_archive`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
	/// Return only the comment without parsing rows.
	pub comment_only: bool,
}

impl ReadOptions {
	/// Reads the full archive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads only the comment.
	pub fn comment_only() -> Self {
		Self { comment_only: true }
	}
}

/// What [`Seeder::read_archive`] returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveContents {
	/// The archive comment, if any.
	Comment(Option<String>),
	/// The archived rows.
	Rows(Vec<Row>),
}

/// Dumps tables into seed archives and loads them back.
#[derive(Clone)]
pub struct Seeder {
	store: ArchiveStore,
	codec: ArchiveCodec,
	observer: Arc<dyn SeedObserver>,
}

impl fmt::Debug for Seeder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Seeder")
			.field("store", &self.store)
			.field("codec", &self.codec)
			.finish_non_exhaustive()
	}
}

impl Seeder {
	/// Creates a seeder over `store`, logging through `tracing`.
	pub fn new(store: ArchiveStore) -> Self {
		let codec = ArchiveCodec::from_validated(store.settings());
		Self {
			store,
			codec,
			observer: Arc::new(TracingObserver),
		}
	}

	/// Replaces the observer.
	pub fn with_observer<O: SeedObserver + 'static>(mut self, observer: O) -> Self {
		self.observer = Arc::new(observer);
		self
	}

	/// Returns the archive store.
	pub fn store(&self) -> &ArchiveStore {
		&self.store
	}

	/// Returns the archive codec.
	pub fn codec(&self) -> &ArchiveCodec {
		&self.codec
	}

	/// Writes `table`'s archive, replacing any previous one.
	///
	/// Rows come from `options.seed_data` when given, otherwise from a
	/// primary-key-ordered scan projected through the table's exclusions.
	pub async fn dump<R>(
		&self,
		repository: &R,
		table: &TableDescriptor,
		options: DumpOptions,
	) -> SeedResult<DumpReport>
	where
		R: SeedRepository + ?Sized,
	{
		let rows = match options.seed_data {
			Some(rows) => rows,
			None => {
				let records = repository.scan_ordered(table).await.map_err(|source| {
					SeedError::Scan {
						table: table.name.clone(),
						source,
					}
				})?;
				RowProjector::for_table(table).project(&records)?
			}
		};

		let bytes = self.codec.encode(&rows, options.comment.as_deref())?;
		let path = self
			.store
			.write_archive(repository.identity(), &table.name, &bytes)?;

		let report = DumpReport {
			table: table.name.clone(),
			path,
			rows: rows.len(),
			bytes: bytes.len(),
			dumped_at: Utc::now(),
		};
		self.observer.on_dump(&report);
		Ok(report)
	}

	/// Inserts `table`'s archived rows through the chunked loader.
	///
	/// The archive comment is ignored. Chunks inserted before a failure
	/// stay inserted.
	pub async fn load<R>(
		&self,
		repository: &R,
		table: &TableDescriptor,
		options: LoadOptions,
	) -> SeedResult<LoadReport>
	where
		R: SeedRepository + ?Sized,
	{
		let (path, archive) = self.read_full(repository.identity(), table)?;
		let chunk_size = options
			.chunk_size
			.unwrap_or(self.store.settings().default_chunk_size);
		let loader = ChunkedLoader::new(chunk_size);
		let observer = self.observer.as_ref();

		let summary = match &options.insert_operation {
			Some(operation) => {
				loader
					.load_observed(
						operation.as_ref(),
						&table.name,
						&archive.rows,
						&options.insert_options,
						observer,
					)
					.await?
			}
			None => {
				loader
					.load_observed(
						repository,
						&table.name,
						&archive.rows,
						&options.insert_options,
						observer,
					)
					.await?
			}
		};

		let report = LoadReport {
			table: table.name.clone(),
			path,
			rows: summary.rows,
			chunks: summary.chunks,
			inserted: summary.inserted,
		};
		self.observer.on_load(&report);
		Ok(report)
	}

	/// Reads an archive's rows, or only its comment.
	pub fn read_archive(
		&self,
		connection: &ConnectionIdentity,
		table: &TableDescriptor,
		options: ReadOptions,
	) -> SeedResult<ArchiveContents> {
		if options.comment_only {
			self.read_comment(connection, table)
				.map(ArchiveContents::Comment)
		} else {
			self.read_full(connection, table)
				.map(|(_, archive)| ArchiveContents::Rows(archive.rows))
		}
	}

	/// Reads only the archive comment.
	pub fn read_comment(
		&self,
		connection: &ConnectionIdentity,
		table: &TableDescriptor,
	) -> SeedResult<Option<String>> {
		let (path, bytes) = self.store.read_archive(connection, &table.name)?;
		self.codec
			.decode_comment(&bytes)
			.map_err(|e| e.at_path(&path))
	}

	/// Reads and decodes the whole archive.
	pub fn read(
		&self,
		connection: &ConnectionIdentity,
		table: &TableDescriptor,
	) -> SeedResult<SeedArchive> {
		self.read_full(connection, table).map(|(_, archive)| archive)
	}

	fn read_full(
		&self,
		connection: &ConnectionIdentity,
		table: &TableDescriptor,
	) -> SeedResult<(std::path::PathBuf, SeedArchive)> {
		let (path, bytes) = self.store.read_archive(connection, &table.name)?;
		let archive = self.codec.decode(&bytes).map_err(|e| e.at_path(&path))?;
		Ok((path, archive))
	}
}
