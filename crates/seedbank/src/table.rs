//! Connection and table metadata supplied by the host application.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Bookkeeping field an ORM may attach to every record. Never persisted.
pub const META_FIELD: &str = "__meta__";

/// Identity of a database connection.
///
/// Archives are keyed by `(connection, table)`. The `namespace` names the
/// application that owns the connection and decides where its seeds live.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionIdentity {
	/// Connection alias (e.g. "default", "legacy").
	pub name: String,

	/// Owning application namespace (e.g. "billing").
	pub namespace: String,
}

impl ConnectionIdentity {
	/// Creates a connection identity.
	pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			namespace: namespace.into(),
		}
	}
}

impl fmt::Display for ConnectionIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.namespace, self.name)
	}
}

/// Static description of a table.
///
/// Replaces runtime schema reflection: the host builds one of these per
/// table, by hand or from generated code.
///
/// # Example
///
/// ```
/// use seedbank::TableDescriptor;
///
/// let users = TableDescriptor::new("users")
///     .with_primary_key(["id"])
///     .with_columns(["id", "email", "inserted_at"])
///     .with_associations(["posts"])
///     .with_autogenerated(["inserted_at"]);
///
/// let excluded = users.excluded_fields();
/// assert!(excluded.contains("posts"));
/// assert!(excluded.contains("inserted_at"));
/// assert!(excluded.contains("__meta__"));
/// assert!(!excluded.contains("email"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
	/// Table name; also the archive file stem.
	pub name: String,

	/// Primary key column(s), in ordering priority.
	#[serde(default)]
	pub primary_key: Vec<String>,

	/// Persisted columns in declaration order.
	#[serde(default)]
	pub columns: Vec<String>,

	/// Association (relation) fields.
	#[serde(default)]
	pub associations: BTreeSet<String>,

	/// Fields filled in by the database or ORM (timestamps, generated ids).
	#[serde(default)]
	pub autogenerated: BTreeSet<String>,

	/// Any further fields the host never wants in an archive.
	#[serde(default)]
	pub extra_excluded: BTreeSet<String>,
}

impl TableDescriptor {
	/// Creates a descriptor with only a table name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			primary_key: Vec::new(),
			columns: Vec::new(),
			associations: BTreeSet::new(),
			autogenerated: BTreeSet::new(),
			extra_excluded: BTreeSet::new(),
		}
	}

	/// Sets the primary key column(s).
	pub fn with_primary_key<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.primary_key = fields.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the persisted column list.
	pub fn with_columns<I, S>(mut self, columns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.columns = columns.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the association fields.
	pub fn with_associations<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.associations = fields.into_iter().map(Into::into).collect();
		self
	}

	/// Sets the autogenerated fields.
	pub fn with_autogenerated<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.autogenerated = fields.into_iter().map(Into::into).collect();
		self
	}

	/// Adds fields to exclude beyond associations and autogenerated ones.
	pub fn with_excluded<I, S>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.extra_excluded.extend(fields.into_iter().map(Into::into));
		self
	}

	/// All field names a projected row must not contain.
	pub fn excluded_fields(&self) -> BTreeSet<String> {
		let mut excluded: BTreeSet<String> = self
			.associations
			.iter()
			.chain(&self.autogenerated)
			.chain(&self.extra_excluded)
			.cloned()
			.collect();
		excluded.insert(META_FIELD.to_string());
		excluded
	}

	/// Columns that survive projection, in declaration order.
	pub fn seeded_columns(&self) -> Vec<&str> {
		let excluded = self.excluded_fields();
		self.columns
			.iter()
			.filter(|c| !excluded.contains(c.as_str()))
			.map(String::as_str)
			.collect()
	}
}
