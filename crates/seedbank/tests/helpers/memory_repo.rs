//! In-memory repository.
//!
//! Stores rows per table, honours `OnConflict` against the first primary-key
//! column, and records every insert call.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use seedbank::prelude::*;

/// Records an insert call: table, row count, options.
pub type InsertCall = (String, usize, InsertOptions);

pub struct MemoryRepository {
	identity: ConnectionIdentity,
	primary_keys: HashMap<String, String>,
	tables: Mutex<HashMap<String, Vec<Row>>>,
	inserts: Mutex<Vec<InsertCall>>,
	scans: AtomicUsize,
	fail_on_insert: Option<usize>,
	fail_scan: bool,
}

impl MemoryRepository {
	pub fn new(identity: ConnectionIdentity) -> Self {
		Self {
			identity,
			primary_keys: HashMap::new(),
			tables: Mutex::new(HashMap::new()),
			inserts: Mutex::new(Vec::new()),
			scans: AtomicUsize::new(0),
			fail_on_insert: None,
			fail_scan: false,
		}
	}

	/// Registers `table` with its rows, in any order.
	pub fn with_table(mut self, table: &TableDescriptor, rows: Vec<Row>) -> Self {
		if let Some(pk) = table.primary_key.first() {
			self.primary_keys.insert(table.name.clone(), pk.clone());
		}
		self.tables.lock().insert(table.name.clone(), rows);
		self
	}

	/// Fails the insert call with this zero-based index.
	pub fn failing_insert(mut self, call: usize) -> Self {
		self.fail_on_insert = Some(call);
		self
	}

	/// Fails every scan.
	pub fn failing_scan(mut self) -> Self {
		self.fail_scan = true;
		self
	}

	pub fn rows(&self, table: &str) -> Vec<Row> {
		self.tables.lock().get(table).cloned().unwrap_or_default()
	}

	pub fn inserts(&self) -> Vec<InsertCall> {
		self.inserts.lock().clone()
	}

	pub fn insert_sizes(&self) -> Vec<usize> {
		self.inserts.lock().iter().map(|(_, n, _)| *n).collect()
	}

	pub fn scan_count(&self) -> usize {
		self.scans.load(AtomicOrdering::SeqCst)
	}
}

#[async_trait]
impl BulkInsert for MemoryRepository {
	async fn insert_all(
		&self,
		table: &str,
		rows: &[Row],
		options: &InsertOptions,
	) -> Result<u64, BoxError> {
		let call = self.inserts.lock().len();
		if self.fail_on_insert == Some(call) {
			return Err(format!("simulated failure on insert call {}", call).into());
		}

		let pk = self.primary_keys.get(table).cloned();
		let mut tables = self.tables.lock();
		let stored = tables.entry(table.to_string()).or_default();
		let mut written = 0;

		for row in rows {
			let existing = pk.as_ref().and_then(|pk| {
				stored
					.iter()
					.position(|s| s.get(pk).is_some() && s.get(pk) == row.get(pk))
			});
			match (existing, &options.on_conflict) {
				(None, _) => {
					stored.push(row.clone());
					written += 1;
				}
				(Some(_), OnConflict::Raise) => {
					return Err(format!("duplicate key in {}", table).into());
				}
				(Some(_), OnConflict::Nothing) => {}
				(Some(index), OnConflict::ReplaceAll) => {
					stored[index] = row.clone();
					written += 1;
				}
				(Some(index), OnConflict::Replace(columns)) => {
					for column in columns {
						if let Some(value) = row.get(column) {
							stored[index].insert(column.clone(), value.clone());
						}
					}
					written += 1;
				}
			}
		}

		drop(tables);
		self.inserts
			.lock()
			.push((table.to_string(), rows.len(), options.clone()));
		Ok(written)
	}
}

#[async_trait]
impl SeedRepository for MemoryRepository {
	fn identity(&self) -> &ConnectionIdentity {
		&self.identity
	}

	async fn scan_ordered(&self, table: &TableDescriptor) -> Result<Vec<Row>, BoxError> {
		self.scans.fetch_add(1, AtomicOrdering::SeqCst);
		if self.fail_scan {
			return Err("connection reset".into());
		}

		let mut rows = self.rows(&table.name);
		if let Some(pk) = table.primary_key.first() {
			rows.sort_by(|a, b| compare(a.get(pk), b.get(pk)));
		}
		Ok(rows)
	}
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
	match (a, b) {
		(Some(Value::Number(x)), Some(Value::Number(y))) => x
			.as_f64()
			.partial_cmp(&y.as_f64())
			.unwrap_or(Ordering::Equal),
		(Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
		_ => Ordering::Equal,
	}
}

/// Builds a row from a JSON object literal.
pub fn row(value: Value) -> Row {
	match value {
		Value::Object(map) => map,
		other => panic!("expected an object, got {}", other),
	}
}

/// A live `users` record with fields the archive must not keep.
pub fn user_record(id: i64) -> Row {
	row(json!({
		"__meta__": {"state": "loaded"},
		"id": id,
		"email": format!("user{}@example.com", id),
		"active": id % 3 != 0,
		"balance": id as f64 * 1.5,
		"nickname": if id % 2 == 0 { Value::Null } else { json!(format!("u{}", id)) },
		"posts": [],
		"inserted_at": format!("2024-01-01T00:00:{:02}Z", id % 60),
	}))
}

pub fn users_table() -> TableDescriptor {
	TableDescriptor::new("users")
		.with_primary_key(["id"])
		.with_columns(["id", "email", "active", "balance", "nickname", "inserted_at"])
		.with_associations(["posts"])
		.with_autogenerated(["inserted_at"])
}
