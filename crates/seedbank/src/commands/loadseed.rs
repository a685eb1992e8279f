//! loadseed command implementation.
//!
//! This command restores table archives into the database, or prints the
//! archive comments in inspect mode.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::error::{SeedError, SeedResult};
use crate::loader::InsertOptions;
use crate::observer::LoadReport;
use crate::repository::SeedRepository;
use crate::seeder::{LoadOptions, Seeder};
use crate::table::TableDescriptor;

/// Arguments for the loadseed command.
#[derive(Debug, Clone, Default)]
pub struct LoadSeedArgs {
	/// Tables to restore, in order.
	pub tables: Vec<TableDescriptor>,
}

/// Options for the loadseed command.
#[derive(Debug, Clone, Default)]
pub struct LoadSeedOptions {
	/// Rows per insert call.
	pub chunk_size: Option<NonZeroUsize>,

	/// Options passed to every insert call.
	pub insert_options: InsertOptions,

	/// Print archive comments instead of loading.
	pub comment_only: bool,

	/// Verbosity level.
	pub verbosity: u8,
}

impl LoadSeedOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the chunk size.
	pub fn with_chunk_size(mut self, size: NonZeroUsize) -> Self {
		self.chunk_size = Some(size);
		self
	}

	/// Sets the insert options.
	pub fn with_insert_options(mut self, options: InsertOptions) -> Self {
		self.insert_options = options;
		self
	}

	/// Sets comment-only mode.
	pub fn with_comment_only(mut self, comment_only: bool) -> Self {
		self.comment_only = comment_only;
		self
	}

	/// Sets verbosity level.
	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}
}

/// Result of a loadseed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSeedResult {
	/// One report per loaded table.
	pub loaded: Vec<LoadReport>,

	/// `(table, comment)` pairs in comment-only mode.
	pub comments: Vec<(String, Option<String>)>,
}

/// The loadseed command for restoring archives into the database.
///
/// # Example
///
/// ```ignore
/// let command = LoadSeedCommand::new(seeder);
/// let args = LoadSeedArgs { tables: vec![TableDescriptor::new("users")] };
/// let result = command.execute(&repo, args, LoadSeedOptions::new()).await?;
/// println!("Loaded {} table(s)", result.loaded.len());
/// ```
#[derive(Debug, Clone)]
pub struct LoadSeedCommand {
	seeder: Seeder,
}

impl LoadSeedCommand {
	/// Creates a new loadseed command.
	pub fn new(seeder: Seeder) -> Self {
		Self { seeder }
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"loadseed"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Restores table seed archives into the database"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: loadseed [options] table [table ...]

Restores each table from <namespace>/seeds/<table>.seed.gz.

Arguments:
  table                One or more tables to restore

Options:
  --chunk-size N       Rows per insert statement (default 1000)
  --on-conflict MODE   raise | nothing | replace_all
  --comment-only       Print archive comments without loading
  --verbosity LEVEL    Verbosity level (0=minimal, 1=normal, 2=verbose)
"#
	}

	/// Executes the loadseed command.
	///
	/// Tables are processed in order; the first error stops the run.
	pub async fn execute<R>(
		&self,
		repository: &R,
		args: LoadSeedArgs,
		options: LoadSeedOptions,
	) -> SeedResult<LoadSeedResult>
	where
		R: SeedRepository + ?Sized,
	{
		if args.tables.is_empty() {
			return Err(SeedError::Configuration {
				path: PathBuf::from(self.name()),
				message: "At least one table must be specified".to_string(),
			});
		}

		let mut result = LoadSeedResult::default();

		if options.comment_only {
			for table in &args.tables {
				let comment = self.seeder.read_comment(repository.identity(), table)?;
				result.comments.push((table.name.clone(), comment));
			}
		} else {
			for table in &args.tables {
				let load_options = LoadOptions {
					insert_operation: None,
					insert_options: options.insert_options.clone(),
					chunk_size: options.chunk_size,
				};
				let report = self.seeder.load(repository, table, load_options).await?;
				result.loaded.push(report);
			}
		}

		if options.verbosity > 0 {
			self.print_result(&result);
		}

		Ok(result)
	}

	/// Prints the load result summary.
	fn print_result(&self, result: &LoadSeedResult) {
		for report in &result.loaded {
			println!(
				"Installed {} row(s) into {} in {} chunk(s)",
				report.rows, report.table, report.chunks
			);
		}
		for (table, comment) in &result.comments {
			match comment {
				Some(text) => println!("{}:\n{}", table, text),
				None => println!("{}: (no comment)", table),
			}
		}
	}
}
