//! Error types for seed archive operations.
//!
//! Every variant carries the context an operator needs to find the root
//! cause: the table, the archive path, or the failing chunk.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error surfaced by the external data-access collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while dumping, reading or loading seed archives.
#[derive(Debug, Error)]
pub enum SeedError {
	/// The project is not set up for this connection, or settings are invalid.
	#[error("Configuration error at {}: {message}", .path.display())]
	Configuration {
		/// Directory or file the problem concerns.
		path: PathBuf,
		/// What the caller has to fix.
		message: String,
	},

	/// No archive exists for the requested table.
	#[error("Seed archive for table '{table}' not found at {}", .path.display())]
	NotFound {
		/// Table whose archive was requested.
		table: String,
		/// Resolved archive path.
		path: PathBuf,
	},

	/// The decompressed archive is not a well-formed row literal.
	#[error("Parse error{}: {message}", archive_suffix(.path))]
	Parse {
		/// Archive path, when the bytes came from the store.
		path: Option<PathBuf>,
		/// Parser diagnostic.
		message: String,
	},

	/// Underlying filesystem failure.
	#[error("IO error at {}: {source}", .path.display())]
	Io {
		/// Path being read or written.
		path: PathBuf,
		/// Originating error.
		#[source]
		source: std::io::Error,
	},

	/// The bulk insert of a chunk failed. Earlier chunks stay applied.
	#[error("Insert into '{table}' failed at chunk {chunk_index}: {source}")]
	Insert {
		/// Target table.
		table: String,
		/// Zero-based index of the first failed chunk.
		chunk_index: usize,
		/// Error returned by the insert operation.
		#[source]
		source: BoxError,
	},

	/// The ordered table scan failed.
	#[error("Scan of table '{table}' failed: {source}")]
	Scan {
		/// Table being read.
		table: String,
		/// Error returned by the repository.
		#[source]
		source: BoxError,
	},

	/// A record could not be projected into a row.
	#[error("Projection error at record {index}: {message}")]
	Projection {
		/// Position of the record in the input sequence.
		index: usize,
		/// Why the record was rejected.
		message: String,
	},

	/// A row does not share the column set of the first row.
	#[error("Inconsistent columns at row {index}: {message}")]
	InconsistentColumns {
		/// Position of the offending row.
		index: usize,
		/// Column difference.
		message: String,
	},
}

impl SeedError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}

	pub(crate) fn parse(message: impl Into<String>) -> Self {
		Self::Parse {
			path: None,
			message: message.into(),
		}
	}

	/// Attaches an archive path to a parse error that has none.
	pub(crate) fn at_path(self, archive: impl Into<PathBuf>) -> Self {
		match self {
			Self::Parse {
				path: None,
				message,
			} => Self::Parse {
				path: Some(archive.into()),
				message,
			},
			other => other,
		}
	}
}

fn archive_suffix(path: &Option<PathBuf>) -> String {
	path.as_ref()
		.map(|p| format!(" in {}", p.display()))
		.unwrap_or_default()
}

/// Result type alias for seed archive operations.
pub type SeedResult<T> = Result<T, SeedError>;
