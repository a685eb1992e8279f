//! Seed archive encoding.
//!
//! An archive is gzip-compressed UTF-8 text: zero or more comment lines,
//! each starting with the comment marker, followed by one JSON array of
//! row objects.
//!
//! ```text
//! # Snapshot of billing.invoices
//! # taken before the 2024 migration
//! [
//!   {
//!     "amount": 1200,
//!     "id": 1
//!   }
//! ]
//! ```

use std::io::{BufRead, BufReader, Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde_json::Value;

use crate::error::{SeedError, SeedResult};
use crate::projector::{Row, kind_of};
use crate::settings::{SeedSettings, check_compression_level};

/// Decoded archive contents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeedArchive {
	/// Comment lines joined with `\n`, or `None` if the archive had none.
	pub comment: Option<String>,

	/// Rows in archive order.
	pub rows: Vec<Row>,
}

impl SeedArchive {
	/// Creates an archive value.
	pub fn new(rows: Vec<Row>, comment: Option<String>) -> Self {
		Self { comment, rows }
	}
}

/// Encoder/decoder for seed archives.
#[derive(Debug, Clone)]
pub struct ArchiveCodec {
	level: u32,
	marker: String,
}

impl ArchiveCodec {
	/// Creates a codec with gzip level 6 and the `"# "` marker.
	pub fn new() -> Self {
		Self::from_validated(&SeedSettings::default())
	}

	/// Creates a codec from settings.
	///
	/// # Errors
	///
	/// Returns [`SeedError::Configuration`] if the compression level is out
	/// of range or the comment marker could be mistaken for the row literal.
	pub fn from_settings(settings: &SeedSettings) -> SeedResult<Self> {
		settings.validate()?;
		Ok(Self::from_validated(settings))
	}

	pub(crate) fn from_validated(settings: &SeedSettings) -> Self {
		Self {
			level: settings.compression_level,
			marker: settings.comment_marker.clone(),
		}
	}

	/// Sets the gzip compression level (0-9).
	///
	/// # Errors
	///
	/// Returns [`SeedError::Configuration`] for levels above 9.
	pub fn with_level(mut self, level: u32) -> SeedResult<Self> {
		check_compression_level(level)?;
		self.level = level;
		Ok(self)
	}

	/// Returns the compression level.
	pub fn level(&self) -> u32 {
		self.level
	}

	/// Returns the comment marker.
	pub fn marker(&self) -> &str {
		&self.marker
	}

	/// Splits a comment into the lines that will be written.
	///
	/// Blank and whitespace-only lines are dropped.
	pub fn comment_lines(comment: &str) -> Vec<&str> {
		comment
			.lines()
			.filter(|line| !line.trim().is_empty())
			.collect()
	}

	/// Encodes rows and an optional comment into compressed archive bytes.
	///
	/// Object keys are written in sorted order at every depth, so the same
	/// rows always encode to the same bytes.
	///
	/// # Errors
	///
	/// Returns [`SeedError::InconsistentColumns`] if the rows do not all
	/// share the first row's column set.
	pub fn encode(&self, rows: &[Row], comment: Option<&str>) -> SeedResult<Vec<u8>> {
		check_columns(rows)?;

		let mut encoder = GzEncoder::new(Vec::new(), Compression::new(self.level));
		let buffer_error = |e: std::io::Error| SeedError::io("<archive buffer>", e);

		for line in comment.map(Self::comment_lines).unwrap_or_default() {
			writeln!(encoder, "{}{}", self.marker, line).map_err(buffer_error)?;
		}
		let mut literal = Value::Array(rows.iter().cloned().map(Value::Object).collect());
		literal.sort_all_objects();
		serde_json::to_writer_pretty(&mut encoder, &literal)
			.map_err(|e| buffer_error(std::io::Error::from(e)))?;
		encoder.write_all(b"\n").map_err(buffer_error)?;

		encoder.finish().map_err(buffer_error)
	}

	/// Decodes archive bytes into rows and comment.
	///
	/// # Errors
	///
	/// Returns [`SeedError::Parse`] if the bytes are not gzip, not UTF-8,
	/// or do not contain a JSON array of objects after the comment lines.
	pub fn decode(&self, bytes: &[u8]) -> SeedResult<SeedArchive> {
		let mut text = String::new();
		GzDecoder::new(bytes)
			.read_to_string(&mut text)
			.map_err(|e| SeedError::parse(format!("decompression failed: {}", e)))?;

		let mut comments = Vec::new();
		let mut offset = 0;
		for line in text.split_inclusive('\n') {
			match self.strip_marker(line.trim_end_matches(['\r', '\n'])) {
				Some(content) => {
					comments.push(content.to_string());
					offset += line.len();
				}
				None => break,
			}
		}

		let rows = parse_rows(&text[offset..])?;
		Ok(SeedArchive {
			comment: join_comment(comments),
			rows,
		})
	}

	/// Reads only the leading comment lines.
	///
	/// Decompression stops at the first non-comment line, so the row
	/// literal is never materialized or validated.
	pub fn decode_comment(&self, bytes: &[u8]) -> SeedResult<Option<String>> {
		let mut reader = BufReader::new(GzDecoder::new(bytes));
		let mut comments = Vec::new();
		let mut line = String::new();

		loop {
			line.clear();
			let read = reader
				.read_line(&mut line)
				.map_err(|e| SeedError::parse(format!("decompression failed: {}", e)))?;
			if read == 0 {
				break;
			}
			match self.strip_marker(line.trim_end_matches(['\r', '\n'])) {
				Some(content) => comments.push(content.to_string()),
				None => break,
			}
		}

		Ok(join_comment(comments))
	}

	fn strip_marker<'a>(&self, line: &'a str) -> Option<&'a str> {
		line.strip_prefix(self.marker.as_str())
			.or_else(|| line.strip_prefix(self.marker.trim_end()))
	}
}

impl Default for ArchiveCodec {
	fn default() -> Self {
		Self::new()
	}
}

fn join_comment(lines: Vec<String>) -> Option<String> {
	if lines.is_empty() {
		None
	} else {
		Some(lines.join("\n"))
	}
}

fn parse_rows(literal: &str) -> SeedResult<Vec<Row>> {
	if literal.trim().is_empty() {
		return Err(SeedError::parse("missing row literal after comments"));
	}

	let value: Value = serde_json::from_str(literal)
		.map_err(|e| SeedError::parse(format!("invalid row literal: {}", e)))?;
	let items = match value {
		Value::Array(items) => items,
		other => {
			return Err(SeedError::parse(format!(
				"expected an array of rows, got {}",
				kind_of(&other)
			)));
		}
	};

	let rows = items
		.into_iter()
		.enumerate()
		.map(|(index, item)| match item {
			Value::Object(row) => Ok(row),
			other => Err(SeedError::parse(format!(
				"row {} is {}, expected an object",
				index,
				kind_of(&other)
			))),
		})
		.collect::<SeedResult<Vec<Row>>>()?;

	check_columns(&rows)
		.map_err(|e| SeedError::parse(format!("archive rows are inconsistent: {}", e)))?;
	Ok(rows)
}

/// Verifies every row has the same column set as the first one.
pub fn check_columns(rows: &[Row]) -> SeedResult<()> {
	let Some(first) = rows.first() else {
		return Ok(());
	};

	for (index, row) in rows.iter().enumerate().skip(1) {
		if row.len() == first.len() && row.keys().all(|k| first.contains_key(k)) {
			continue;
		}
		let missing: Vec<&str> = first
			.keys()
			.filter(|k| !row.contains_key(*k))
			.map(String::as_str)
			.collect();
		let extra: Vec<&str> = row
			.keys()
			.filter(|k| !first.contains_key(*k))
			.map(String::as_str)
			.collect();
		return Err(SeedError::InconsistentColumns {
			index,
			message: format!("missing {:?}, unexpected {:?}", missing, extra),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use serde_json::json;

	fn row(value: Value) -> Row {
		match value {
			Value::Object(map) => map,
			_ => panic!("test row must be an object"),
		}
	}

	fn sample_rows() -> Vec<Row> {
		vec![
			row(json!({"id": 1, "name": "Ada", "balance": 10.25, "notes": null})),
			row(json!({"id": 2, "name": "Grace", "balance": -3.5, "notes": "vip"})),
		]
	}

	fn decompress(bytes: &[u8]) -> String {
		let mut text = String::new();
		GzDecoder::new(bytes).read_to_string(&mut text).unwrap();
		text
	}

	#[rstest]
	#[case(None, None)]
	#[case(Some("captured from staging"), Some("captured from staging"))]
	#[case(Some("line one\nline two"), Some("line one\nline two"))]
	#[case(Some("line one\r\nline two\r"), Some("line one\nline two"))]
	fn test_round_trip(#[case] comment: Option<&str>, #[case] expected: Option<&str>) {
		let codec = ArchiveCodec::new();
		let bytes = codec.encode(&sample_rows(), comment).unwrap();
		let archive = codec.decode(&bytes).unwrap();

		assert_eq!(archive.rows, sample_rows());
		assert_eq!(archive.comment.as_deref(), expected);
		assert_eq!(codec.decode_comment(&bytes).unwrap().as_deref(), expected);
	}

	#[rstest]
	fn test_multiline_comment_drops_blank_lines() {
		let codec = ArchiveCodec::new();
		let bytes = codec.encode(&[], Some("line one\n\nline two")).unwrap();

		let text = decompress(&bytes);
		assert!(text.starts_with("# line one\n# line two\n["));

		let archive = codec.decode(&bytes).unwrap();
		assert_eq!(archive.comment.as_deref(), Some("line one\nline two"));
		assert!(archive.rows.is_empty());
	}

	#[rstest]
	#[case("")]
	#[case("\n  \n")]
	fn test_blank_comment_is_absent(#[case] comment: &str) {
		let codec = ArchiveCodec::new();
		let bytes = codec.encode(&sample_rows(), Some(comment)).unwrap();
		assert_eq!(codec.decode(&bytes).unwrap().comment, None);
		assert_eq!(codec.decode_comment(&bytes).unwrap(), None);
	}

	#[rstest]
	fn test_encoding_is_deterministic() {
		let codec = ArchiveCodec::new();
		let first = codec.encode(&sample_rows(), Some("same")).unwrap();
		let second = codec.encode(&sample_rows(), Some("same")).unwrap();
		assert_eq!(first, second);
	}

	#[rstest]
	fn test_keys_are_written_sorted() {
		let codec = ArchiveCodec::new();
		let bytes = codec
			.encode(&[row(json!({"zeta": 1, "alpha": 2}))], None)
			.unwrap();
		let text = decompress(&bytes);
		assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
	}

	#[rstest]
	fn test_nested_keys_are_written_sorted() {
		let codec = ArchiveCodec::new();
		let nested = row(json!({
			"id": 1,
			"attrs": {"zeta": true, "alpha": [{"y": 1, "x": 2}]},
		}));
		let bytes = codec.encode(&[nested], None).unwrap();
		let text = decompress(&bytes);
		assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
		assert!(text.find("\"x\"").unwrap() < text.find("\"y\"").unwrap());
	}

	#[rstest]
	fn test_insertion_order_does_not_change_bytes() {
		let mut forward = Row::new();
		forward.insert("id".to_string(), json!(1));
		forward.insert("name".to_string(), json!("Ada"));
		let mut backward = Row::new();
		backward.insert("name".to_string(), json!("Ada"));
		backward.insert("id".to_string(), json!(1));

		let codec = ArchiveCodec::new();
		assert_eq!(
			codec.encode(&[forward], Some("same")).unwrap(),
			codec.encode(&[backward], Some("same")).unwrap()
		);
	}

	#[rstest]
	fn test_decode_comment_ignores_corrupt_literal() {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(b"# kept\n[{\"id\": ").unwrap();
		let bytes = encoder.finish().unwrap();

		let codec = ArchiveCodec::new();
		assert_eq!(codec.decode_comment(&bytes).unwrap().as_deref(), Some("kept"));
		assert!(matches!(codec.decode(&bytes), Err(SeedError::Parse { .. })));
	}

	#[rstest]
	fn test_decode_accepts_bare_marker_line() {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(b"#\r\n# text\r\n[]\r\n").unwrap();
		let bytes = encoder.finish().unwrap();

		let archive = ArchiveCodec::new().decode(&bytes).unwrap();
		assert_eq!(archive.comment.as_deref(), Some("\ntext"));
		assert!(archive.rows.is_empty());
	}

	#[rstest]
	#[case(b"# only a comment\n".as_slice())]
	#[case(b"{\"id\": 1}".as_slice())]
	#[case(b"[1, 2]".as_slice())]
	#[case(b"[{\"id\": 1}, {\"name\": \"x\"}]".as_slice())]
	#[case(b"rows = [{id: 1}]".as_slice())]
	fn test_decode_rejects_malformed(#[case] text: &[u8]) {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(text).unwrap();
		let bytes = encoder.finish().unwrap();

		let result = ArchiveCodec::new().decode(&bytes);
		assert!(matches!(result, Err(SeedError::Parse { path: None, .. })));
	}

	#[rstest]
	fn test_decode_rejects_non_gzip() {
		let result = ArchiveCodec::new().decode(b"[]");
		assert!(matches!(result, Err(SeedError::Parse { .. })));
	}

	#[rstest]
	fn test_encode_rejects_inconsistent_columns() {
		let rows = vec![row(json!({"id": 1, "a": 1})), row(json!({"id": 2, "b": 1}))];
		let result = ArchiveCodec::new().encode(&rows, None);
		assert!(matches!(
			result,
			Err(SeedError::InconsistentColumns { index: 1, .. })
		));
	}

	#[rstest]
	fn test_custom_marker() {
		let settings = SeedSettings::default().with_comment_marker("-- ");
		let codec = ArchiveCodec::from_settings(&settings).unwrap();
		let bytes = codec.encode(&sample_rows(), Some("sql style")).unwrap();

		assert!(decompress(&bytes).starts_with("-- sql style\n"));
		assert_eq!(codec.decode_comment(&bytes).unwrap().as_deref(), Some("sql style"));
	}

	#[rstest]
	#[case("")]
	#[case("[")]
	#[case("{ ")]
	#[case(" #")]
	fn test_from_settings_rejects_ambiguous_marker(#[case] marker: &str) {
		let settings = SeedSettings::default().with_comment_marker(marker);
		assert!(matches!(
			ArchiveCodec::from_settings(&settings),
			Err(SeedError::Configuration { .. })
		));
	}

	#[rstest]
	fn test_with_level_rejects_out_of_range() {
		assert_eq!(ArchiveCodec::new().with_level(9).unwrap().level(), 9);
		assert!(matches!(
			ArchiveCodec::new().with_level(42),
			Err(SeedError::Configuration { .. })
		));
	}

	fn arb_scalar() -> impl Strategy<Value = Value> {
		prop_oneof![
			Just(Value::Null),
			any::<bool>().prop_map(Value::Bool),
			any::<i64>().prop_map(|n| json!(n)),
			any::<f64>()
				.prop_filter("finite", |f| f.is_finite())
				.prop_map(|f| json!(f)),
			".*".prop_map(Value::String),
		]
	}

	fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
		prop::collection::btree_set("[a-z_]{1,8}", 0..6).prop_flat_map(|columns| {
			let columns: Vec<String> = columns.into_iter().collect();
			let width = columns.len();
			prop::collection::vec(prop::collection::vec(arb_scalar(), width), 0..30).prop_map(
				move |values| {
					values
						.into_iter()
						.map(|vals| columns.iter().cloned().zip(vals).collect::<Row>())
						.collect()
				},
			)
		})
	}

	fn arb_comment() -> impl Strategy<Value = Option<String>> {
		prop::option::of(
			prop::collection::vec("[^\r\n]*[^\r\n\\s][^\r\n]*", 1..4).prop_map(|l| l.join("\n")),
		)
	}

	proptest! {
		#[test]
		fn prop_decode_inverts_encode(rows in arb_rows(), comment in arb_comment()) {
			let codec = ArchiveCodec::new();
			let bytes = codec.encode(&rows, comment.as_deref()).unwrap();
			let archive = codec.decode(&bytes).unwrap();

			prop_assert_eq!(&archive.rows, &rows);
			prop_assert_eq!(&archive.comment, &comment);
			prop_assert_eq!(codec.decode_comment(&bytes).unwrap(), comment);
		}
	}
}
