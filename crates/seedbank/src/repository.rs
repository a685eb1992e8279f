//! Data-access collaborator.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::loader::BulkInsert;
use crate::projector::Row;
use crate::table::{ConnectionIdentity, TableDescriptor};

/// Connected data-access handle supplied by the host application.
///
/// Connection management, credentials and transport stay with the host;
/// the seeder only scans and bulk-inserts through this trait.
#[async_trait]
pub trait SeedRepository: BulkInsert {
	/// Identity used to locate this connection's archives.
	fn identity(&self) -> &ConnectionIdentity;

	/// Returns every record of `table` in ascending primary-key order.
	///
	/// Records may still contain associations, timestamps and other
	/// excluded fields; the seeder projects them away.
	async fn scan_ordered(&self, table: &TableDescriptor) -> Result<Vec<Row>, BoxError>;
}
