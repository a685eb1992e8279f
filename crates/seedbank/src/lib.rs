//! Table snapshots as compressed, human-readable seed archives.
//!
//! This crate dumps the rows of a single table into a gzip-compressed text
//! file and restores it later, so data pulled from a remote or legacy
//! database can be replayed locally without that database.
//!
//! - **Archives**: optional `# `-prefixed comment lines followed by a JSON
//!   array of rows, gzip-compressed. `gunzip -c users.seed.gz` shows it.
//! - **Projection**: associations, timestamps and other excluded fields are
//!   stripped before writing.
//! - **Chunked loading**: rows are restored in bounded bulk inserts so large
//!   tables stay under per-statement limits.
//!
//! # Quick Start
//!
//! ```ignore
//! use seedbank::prelude::*;
//!
//! let store = ArchiveStore::new(DirectoryResolver::new("apps"));
//! let seeder = Seeder::new(store);
//! let users = TableDescriptor::new("users")
//!     .with_primary_key(["id"])
//!     .with_autogenerated(["inserted_at", "updated_at"]);
//!
//! // apps/<namespace>/seeds/users.seed.gz
//! seeder
//!     .dump(&legacy_repo, &users, DumpOptions::new().with_comment("prod snapshot"))
//!     .await?;
//!
//! seeder
//!     .load(
//!         &local_repo,
//!         &users,
//!         LoadOptions::new().with_insert_options(
//!             InsertOptions::new().with_on_conflict(OnConflict::Nothing),
//!         ),
//!     )
//!     .await?;
//! ```
//!
//! # Architecture
//!
//! - [`RowProjector`](projector::RowProjector) - records to rows
//! - [`ArchiveCodec`](archive::ArchiveCodec) - rows and comment to bytes and back
//! - [`ArchiveStore`](archive::ArchiveStore) - archive paths and file I/O
//! - [`ChunkedLoader`](loader::ChunkedLoader) - chunked bulk insert
//! - [`Seeder`](seeder::Seeder) - dump, load and read operations
//!
//! The host supplies a [`SeedRepository`](repository::SeedRepository) for
//! scanning and inserting, and may inject a
//! [`SeedObserver`](observer::SeedObserver) for progress reporting.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod archive;
pub mod commands;
pub mod error;
pub mod loader;
pub mod observer;
pub mod prelude;
pub mod projector;
pub mod repository;
pub mod seeder;
pub mod settings;
pub mod table;

// Re-export commonly used types at crate root
pub use archive::{ArchiveCodec, ArchiveStore, DirectoryResolver, NamespaceResolver, SeedArchive};
pub use error::{BoxError, SeedError, SeedResult};
pub use loader::{BulkInsert, ChunkedLoader, InsertOptions, OnConflict};
pub use projector::{Row, RowProjector};
pub use repository::SeedRepository;
pub use seeder::{ArchiveContents, DumpOptions, LoadOptions, ReadOptions, Seeder};
pub use settings::SeedSettings;
pub use table::{ConnectionIdentity, TableDescriptor};
