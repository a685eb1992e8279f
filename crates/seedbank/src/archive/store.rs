//! On-disk location and I/O for seed archives.
//!
//! Archives live at `<namespace root>/<seeds dir>/<table>.<extension>`,
//! e.g. `apps/billing/seeds/invoices.seed.gz`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;

use crate::error::{SeedError, SeedResult};
use crate::settings::SeedSettings;
use crate::table::ConnectionIdentity;

/// Resolves the filesystem root that owns a connection's seeds directory.
pub trait NamespaceResolver: Send + Sync {
	/// Returns the namespace root for the connection.
	fn namespace_root(&self, connection: &ConnectionIdentity) -> PathBuf;
}

impl<F> NamespaceResolver for F
where
	F: Fn(&ConnectionIdentity) -> PathBuf + Send + Sync,
{
	fn namespace_root(&self, connection: &ConnectionIdentity) -> PathBuf {
		self(connection)
	}
}

/// Maps a namespace to `<base>/<namespace>`.
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
	base: PathBuf,
}

impl DirectoryResolver {
	/// Creates a resolver rooted at `base`.
	pub fn new(base: impl Into<PathBuf>) -> Self {
		Self { base: base.into() }
	}
}

impl NamespaceResolver for DirectoryResolver {
	fn namespace_root(&self, connection: &ConnectionIdentity) -> PathBuf {
		self.base.join(&connection.namespace)
	}
}

/// Reads and writes archive files.
#[derive(Clone)]
pub struct ArchiveStore {
	resolver: Arc<dyn NamespaceResolver>,
	settings: SeedSettings,
}

impl std::fmt::Debug for ArchiveStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ArchiveStore")
			.field("settings", &self.settings)
			.finish_non_exhaustive()
	}
}

impl ArchiveStore {
	/// Creates a store with default settings.
	pub fn new<R: NamespaceResolver + 'static>(resolver: R) -> Self {
		Self {
			resolver: Arc::new(resolver),
			settings: SeedSettings::default(),
		}
	}

	/// Creates a store with explicit settings.
	///
	/// # Errors
	///
	/// Returns [`SeedError::Configuration`] if the settings fail
	/// [`SeedSettings::validate`].
	pub fn with_settings<R: NamespaceResolver + 'static>(
		resolver: R,
		settings: SeedSettings,
	) -> SeedResult<Self> {
		settings.validate()?;
		Ok(Self {
			resolver: Arc::new(resolver),
			settings,
		})
	}

	/// Returns the store settings.
	pub fn settings(&self) -> &SeedSettings {
		&self.settings
	}

	/// Directory holding the connection's archives.
	pub fn seeds_dir(&self, connection: &ConnectionIdentity) -> PathBuf {
		self.resolver
			.namespace_root(connection)
			.join(&self.settings.seeds_dir_name)
	}

	/// Archive path for a table.
	///
	/// # Errors
	///
	/// Returns [`SeedError::Configuration`] if the table name cannot be used
	/// as a single file name.
	pub fn resolve_path(&self, connection: &ConnectionIdentity, table: &str) -> SeedResult<PathBuf> {
		let dir = self.seeds_dir(connection);
		validate_table_name(table).map_err(|message| SeedError::Configuration {
			path: dir.clone(),
			message,
		})?;
		Ok(dir.join(format!("{}.{}", table, self.settings.archive_extension)))
	}

	/// Creates the seeds directory, including parents, if absent.
	pub fn ensure_directory_exists(&self, connection: &ConnectionIdentity) -> SeedResult<PathBuf> {
		let dir = self.seeds_dir(connection);
		std::fs::create_dir_all(&dir).map_err(|e| SeedError::io(&dir, e))?;
		Ok(dir)
	}

	/// Fails unless the seeds directory already exists.
	pub fn require_directory(&self, connection: &ConnectionIdentity) -> SeedResult<PathBuf> {
		let dir = self.seeds_dir(connection);
		if !dir.is_dir() {
			return Err(SeedError::Configuration {
				message: format!(
					"seeds directory for connection '{}' does not exist; create {} before loading",
					connection,
					dir.display()
				),
				path: dir,
			});
		}
		Ok(dir)
	}

	/// Replaces the file at `path` with `bytes`.
	///
	/// Content goes to a temporary file in the same directory which is then
	/// renamed over the target, so readers see the old or the new archive.
	pub fn write(&self, path: &Path, bytes: &[u8]) -> SeedResult<()> {
		let dir = path.parent().unwrap_or_else(|| Path::new("."));
		let mut file = NamedTempFile::new_in(dir).map_err(|e| SeedError::io(dir, e))?;
		file.write_all(bytes).map_err(|e| SeedError::io(file.path(), e))?;
		file.as_file()
			.sync_all()
			.map_err(|e| SeedError::io(file.path(), e))?;
		file.persist(path).map_err(|e| SeedError::io(path, e.error))?;

		tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote seed archive");
		Ok(())
	}

	/// Reads the raw bytes at `path`.
	pub fn read(&self, path: &Path) -> SeedResult<Vec<u8>> {
		let bytes = std::fs::read(path).map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				SeedError::NotFound {
					table: table_from_path(path, &self.settings.archive_extension),
					path: path.to_path_buf(),
				}
			} else {
				SeedError::io(path, e)
			}
		})?;

		tracing::debug!(path = %path.display(), bytes = bytes.len(), "read seed archive");
		Ok(bytes)
	}

	/// Resolves, checks and writes a table's archive. Returns its path.
	pub fn write_archive(
		&self,
		connection: &ConnectionIdentity,
		table: &str,
		bytes: &[u8],
	) -> SeedResult<PathBuf> {
		let path = self.resolve_path(connection, table)?;
		self.ensure_directory_exists(connection)?;
		self.write(&path, bytes)?;
		Ok(path)
	}

	/// Resolves, checks and reads a table's archive.
	///
	/// The seeds directory is checked before any file is opened.
	pub fn read_archive(
		&self,
		connection: &ConnectionIdentity,
		table: &str,
	) -> SeedResult<(PathBuf, Vec<u8>)> {
		self.require_directory(connection)?;
		let path = self.resolve_path(connection, table)?;
		let bytes = self.read(&path)?;
		Ok((path, bytes))
	}
}

fn validate_table_name(table: &str) -> Result<(), String> {
	if table.is_empty() {
		return Err("table name cannot be empty".to_string());
	}
	if table.contains(['/', '\\', '\0']) {
		return Err(format!("table name contains a path separator: {:?}", table));
	}
	if table.starts_with('.') {
		return Err(format!("table name cannot start with '.': {:?}", table));
	}
	Ok(())
}

fn table_from_path(path: &Path, extension: &str) -> String {
	let file_name = path
		.file_name()
		.and_then(|n| n.to_str())
		.unwrap_or_default();
	file_name
		.strip_suffix(extension)
		.and_then(|stem| stem.strip_suffix('.'))
		.unwrap_or(file_name)
		.to_string()
}
