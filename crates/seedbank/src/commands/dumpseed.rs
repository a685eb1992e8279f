//! dumpseed command implementation.

use std::path::PathBuf;

use crate::error::{SeedError, SeedResult};
use crate::observer::DumpReport;
use crate::repository::SeedRepository;
use crate::seeder::{DumpOptions, Seeder};
use crate::table::TableDescriptor;

/// Arguments for the dumpseed command.
#[derive(Debug, Clone, Default)]
pub struct DumpSeedArgs {
	/// Tables to dump.
	pub tables: Vec<TableDescriptor>,
}

/// Options for the dumpseed command.
#[derive(Debug, Clone, Default)]
pub struct DumpSeedOptions {
	/// Comment written into every archive.
	pub comment: Option<String>,

	/// Verbosity level.
	pub verbosity: u8,
}

impl DumpSeedOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the archive comment.
	pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
		self.comment = Some(comment.into());
		self
	}

	/// Sets verbosity level.
	pub fn with_verbosity(mut self, level: u8) -> Self {
		self.verbosity = level;
		self
	}
}

/// The dumpseed command for snapshotting tables into archives.
#[derive(Debug, Clone)]
pub struct DumpSeedCommand {
	seeder: Seeder,
}

impl DumpSeedCommand {
	/// Creates a new dumpseed command.
	pub fn new(seeder: Seeder) -> Self {
		Self { seeder }
	}

	/// Returns the command name.
	pub fn name(&self) -> &str {
		"dumpseed"
	}

	/// Returns the command description.
	pub fn description(&self) -> &str {
		"Snapshots tables into compressed seed archives"
	}

	/// Returns the command help text.
	pub fn help(&self) -> &str {
		r#"
Usage: dumpseed [options] table [table ...]

Writes each table to <namespace>/seeds/<table>.seed.gz, replacing any
existing archive.

Arguments:
  table                One or more tables to dump

Options:
  --comment TEXT       Comment stored at the top of each archive
  --verbosity LEVEL    Verbosity level (0=minimal, 1=normal, 2=verbose)
"#
	}

	/// Executes the dumpseed command.
	pub async fn execute<R>(
		&self,
		repository: &R,
		args: DumpSeedArgs,
		options: DumpSeedOptions,
	) -> SeedResult<Vec<DumpReport>>
	where
		R: SeedRepository + ?Sized,
	{
		if args.tables.is_empty() {
			return Err(SeedError::Configuration {
				path: PathBuf::from(self.name()),
				message: "At least one table must be specified".to_string(),
			});
		}

		let mut reports = Vec::with_capacity(args.tables.len());
		for table in &args.tables {
			let dump_options = DumpOptions {
				comment: options.comment.clone(),
				seed_data: None,
			};
			reports.push(self.seeder.dump(repository, table, dump_options).await?);
		}

		if options.verbosity > 0 {
			for report in &reports {
				println!(
					"Dumped {} row(s) from {} to {}",
					report.rows,
					report.table,
					report.path.display()
				);
			}
		}

		Ok(reports)
	}
}
