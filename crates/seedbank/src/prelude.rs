//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use seedbank::prelude::*;
//! ```

// Error types
pub use crate::error::{BoxError, SeedError, SeedResult};

// Archive types
pub use crate::archive::{
	ArchiveCodec, ArchiveStore, DirectoryResolver, NamespaceResolver, SeedArchive,
};

// Data model
pub use crate::projector::{Row, RowProjector};
pub use crate::settings::SeedSettings;
pub use crate::table::{ConnectionIdentity, TableDescriptor};

// Loading
pub use crate::loader::{BulkInsert, ChunkSummary, ChunkedLoader, InsertOptions, OnConflict};
pub use crate::repository::SeedRepository;

// Orchestration
pub use crate::observer::{DumpReport, LoadReport, NoopObserver, SeedObserver, TracingObserver};
pub use crate::seeder::{ArchiveContents, DumpOptions, LoadOptions, ReadOptions, Seeder};

// Command types
pub use crate::commands::{
	DumpSeedArgs, DumpSeedCommand, DumpSeedOptions, LoadSeedArgs, LoadSeedCommand,
	LoadSeedOptions, LoadSeedResult,
};
