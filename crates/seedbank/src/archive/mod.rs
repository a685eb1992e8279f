//! Seed archive format and storage.

mod codec;
mod store;

pub use codec::{ArchiveCodec, SeedArchive, check_columns};
pub use store::{ArchiveStore, DirectoryResolver, NamespaceResolver};
