//! Seed archive settings.
//!
//! Settings can be built in code, read from a TOML file, and overridden from
//! `SEEDBANK_`-prefixed environment variables.
//!
//! ```toml
//! seeds_dir_name = "seeds"
//! archive_extension = "seed.gz"
//! default_chunk_size = 1000
//! compression_level = 6
//! comment_marker = "# "
//! ```

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SeedError, SeedResult};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "SEEDBANK_";

const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
	Some(size) => size,
	None => unreachable!(),
};

/// Settings shared by the archive store, codec and loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedSettings {
	/// Directory created under the namespace root to hold archives.
	pub seeds_dir_name: String,

	/// File extension appended to the table name.
	pub archive_extension: String,

	/// Rows per bulk insert when a load does not choose its own size.
	pub default_chunk_size: NonZeroUsize,

	/// Gzip compression level (0-9).
	pub compression_level: u32,

	/// Prefix written in front of every comment line.
	pub comment_marker: String,
}

impl Default for SeedSettings {
	fn default() -> Self {
		Self {
			seeds_dir_name: "seeds".to_string(),
			archive_extension: "seed.gz".to_string(),
			default_chunk_size: DEFAULT_CHUNK_SIZE,
			compression_level: 6,
			comment_marker: "# ".to_string(),
		}
	}
}

impl SeedSettings {
	/// Creates the default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the seeds directory name.
	pub fn with_seeds_dir_name(mut self, name: impl Into<String>) -> Self {
		self.seeds_dir_name = name.into();
		self
	}

	/// Sets the archive file extension.
	pub fn with_archive_extension(mut self, extension: impl Into<String>) -> Self {
		self.archive_extension = extension.into();
		self
	}

	/// Sets the default chunk size.
	pub fn with_default_chunk_size(mut self, size: NonZeroUsize) -> Self {
		self.default_chunk_size = size;
		self
	}

	/// Sets the gzip compression level.
	pub fn with_compression_level(mut self, level: u32) -> Self {
		self.compression_level = level;
		self
	}

	/// Sets the comment line marker.
	pub fn with_comment_marker(mut self, marker: impl Into<String>) -> Self {
		self.comment_marker = marker.into();
		self
	}

	/// Parses settings from TOML. Missing keys take their defaults.
	pub fn from_toml_str(content: &str) -> SeedResult<Self> {
		let settings: Self = toml::from_str(content).map_err(|e| SeedError::Configuration {
			path: PathBuf::from("<inline>"),
			message: format!("invalid settings: {}", e),
		})?;
		settings.validate()?;
		Ok(settings)
	}

	/// Reads and parses a TOML settings file.
	pub fn from_toml_file(path: &Path) -> SeedResult<Self> {
		let content = std::fs::read_to_string(path).map_err(|e| SeedError::io(path, e))?;
		Self::from_toml_str(&content).map_err(|e| match e {
			SeedError::Configuration { message, .. } => SeedError::Configuration {
				path: path.to_path_buf(),
				message,
			},
			other => other,
		})
	}

	/// Applies overrides from `SEEDBANK_*` environment variables.
	pub fn with_env_overrides(self) -> SeedResult<Self> {
		self.with_overrides_from(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
	}

	fn with_overrides_from<F>(mut self, lookup: F) -> SeedResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(name) = lookup("SEEDS_DIR_NAME") {
			self.seeds_dir_name = name;
		}
		if let Some(extension) = lookup("ARCHIVE_EXTENSION") {
			self.archive_extension = extension;
		}
		if let Some(raw) = lookup("DEFAULT_CHUNK_SIZE") {
			self.default_chunk_size = raw
				.trim()
				.parse()
				.map_err(|_| env_error("DEFAULT_CHUNK_SIZE", &raw, "a positive integer"))?;
		}
		if let Some(raw) = lookup("COMPRESSION_LEVEL") {
			self.compression_level = raw
				.trim()
				.parse()
				.map_err(|_| env_error("COMPRESSION_LEVEL", &raw, "an integer 0-9"))?;
		}
		self.validate()?;
		Ok(self)
	}

	/// Checks value ranges that serde cannot express.
	pub fn validate(&self) -> SeedResult<()> {
		check_compression_level(self.compression_level)?;
		if self.seeds_dir_name.trim().is_empty() {
			return Err(invalid("seeds_dir_name must not be empty"));
		}
		if self.archive_extension.trim().is_empty() {
			return Err(invalid("archive_extension must not be empty"));
		}
		check_comment_marker(&self.comment_marker)
	}
}

pub(crate) fn check_compression_level(level: u32) -> SeedResult<()> {
	if level > 9 {
		return Err(invalid(format!(
			"compression_level must be 0-9, got {}",
			level
		)));
	}
	Ok(())
}

pub(crate) fn check_comment_marker(marker: &str) -> SeedResult<()> {
	if !marker.chars().next().is_some_and(|c| !c.is_whitespace()) {
		return Err(invalid(
			"comment_marker must start with a non-whitespace character",
		));
	}
	// A marker starting like the JSON literal would make comments ambiguous.
	if marker.starts_with(['[', '{']) {
		return Err(invalid("comment_marker must not start with '[' or '{'"));
	}
	Ok(())
}

fn invalid(message: impl Into<String>) -> SeedError {
	SeedError::Configuration {
		path: PathBuf::from("<settings>"),
		message: message.into(),
	}
}

fn env_error(key: &str, value: &str, expected: &str) -> SeedError {
	SeedError::Configuration {
		path: PathBuf::from(format!("${}{}", ENV_PREFIX, key)),
		message: format!("expected {}, got '{}'", expected, value),
	}
}
