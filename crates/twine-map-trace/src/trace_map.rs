// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The tracer: envelope metadata plus lazily decoded mappings and query
//! acceleration state.
//!
//! A [`TraceMap`] is immutable after construction. Exactly one of the
//! encoded string and the decoded rows is populated up front; the other is
//! computed on first use and cached, as are the reverse index and the
//! per-row search memos. The caches are `std::cell` based, which makes the
//! type deliberately `!Sync`: confine an instance to one thread.

use std::cell::{OnceCell, RefCell};

use twine_map_core::{
	biased_search, ensure_sorted, lower_bound, resolve, strip_filename, upper_bound,
	validate_version, vlq, Bias, DecodedSourceMap, MapError, MemoState, SourceMapInput,
	SourceMapSegment, SourceMapV3,
};

use crate::by_source::{self, ReverseIndex};
use crate::error::{Result, TraceError};
use crate::position::{
	GeneratedNeedle, GeneratedPosition, MappingItem, OriginalNeedle, OriginalPosition,
};
use crate::section;

enum Mappings {
	Encoded(String),
	Decoded(Vec<Vec<SourceMapSegment>>),
}

/// A queryable source map.
#[derive(Debug)]
pub struct TraceMap {
	version: u32,
	file: Option<String>,
	source_root: Option<String>,
	sources: Vec<Option<String>>,
	sources_content: Option<Vec<Option<String>>>,
	names: Vec<String>,
	resolved_sources: Vec<String>,

	encoded: OnceCell<String>,
	decoded: OnceCell<Vec<Vec<SourceMapSegment>>>,
	decoded_memo: RefCell<MemoState>,
	by_source: OnceCell<ReverseIndex>,
	by_source_memos: RefCell<Vec<MemoState>>,
}

impl TraceMap {
	/// Build a trace map from any input form.
	///
	/// Decoded input from a programmatic caller is checked for row order
	/// and sorted where needed; sectioned input is flattened. `map_url` is
	/// the URL the map itself was fetched from, used to resolve sources.
	pub fn new(input: SourceMapInput, map_url: Option<&str>) -> Result<Self> {
		Self::build(input, map_url, false)
	}

	/// Parse a map from JSON text and build a trace map from it.
	///
	/// Tool-emitted JSON is trusted to carry sorted rows, so the sort check
	/// is skipped.
	pub fn from_json(json: &str, map_url: Option<&str>) -> Result<Self> {
		let input = SourceMapInput::from_json(json).map_err(TraceError::from)?;
		Self::build(input, map_url, true)
	}

	/// Build a trace map from decoded rows known to be sorted, skipping the
	/// sort check.
	pub fn presorted_decoded_map(map: DecodedSourceMap, map_url: Option<&str>) -> Result<Self> {
		Self::build(SourceMapInput::Decoded(map), map_url, true)
	}

	pub(crate) fn build(input: SourceMapInput, map_url: Option<&str>, trusted: bool) -> Result<Self> {
		match input {
			SourceMapInput::Sectioned(map) => section::flatten(map, map_url),
			SourceMapInput::Map(map) => {
				validate_version(map.version)?;
				Ok(Self::from_parts(
					map.version,
					map.file,
					map.source_root,
					map.sources,
					map.sources_content,
					map.names,
					Mappings::Encoded(map.mappings),
					map_url,
				))
			}
			SourceMapInput::Decoded(mut map) => {
				validate_version(map.version)?;
				if !trusted {
					ensure_sorted(&mut map.mappings);
				}
				Ok(Self::from_parts(
					map.version,
					map.file,
					map.source_root,
					map.sources,
					map.sources_content,
					map.names,
					Mappings::Decoded(map.mappings),
					map_url,
				))
			}
		}
	}

	#[allow(clippy::too_many_arguments)]
	fn from_parts(
		version: u32,
		file: Option<String>,
		source_root: Option<String>,
		sources: Vec<Option<String>>,
		sources_content: Option<Vec<Option<String>>>,
		names: Vec<String>,
		mappings: Mappings,
		map_url: Option<&str>,
	) -> Self {
		let base = resolve(
			source_root.as_deref().unwrap_or(""),
			strip_filename(map_url.unwrap_or("")),
		);
		let resolved_sources = sources
			.iter()
			.map(|source| resolve(source.as_deref().unwrap_or(""), &base))
			.collect();

		let (encoded, decoded) = match mappings {
			Mappings::Encoded(string) => (OnceCell::from(string), OnceCell::new()),
			Mappings::Decoded(rows) => (OnceCell::new(), OnceCell::from(rows)),
		};

		Self {
			version,
			file,
			source_root,
			sources,
			sources_content,
			names,
			resolved_sources,
			encoded,
			decoded,
			decoded_memo: RefCell::new(MemoState::default()),
			by_source: OnceCell::new(),
			by_source_memos: RefCell::new(Vec::new()),
		}
	}

	pub fn version(&self) -> u32 {
		self.version
	}

	pub fn file(&self) -> Option<&str> {
		self.file.as_deref()
	}

	pub fn source_root(&self) -> Option<&str> {
		self.source_root.as_deref()
	}

	/// The raw `sources` list; entries may be null.
	pub fn sources(&self) -> &[Option<String>] {
		&self.sources
	}

	/// Sources resolved against `sourceRoot` and the map URL.
	pub fn resolved_sources(&self) -> &[String] {
		&self.resolved_sources
	}

	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn sources_content(&self) -> Option<&[Option<String>]> {
		self.sources_content.as_deref()
	}

	/// The VLQ-encoded `mappings` string, encoding on first use if the map
	/// was constructed from decoded rows.
	pub fn encoded_mappings(&self) -> Result<&str> {
		if let Some(encoded) = self.encoded.get() {
			return Ok(encoded);
		}
		let encoded = vlq::encode_mappings(self.decoded_mappings()?);
		Ok(self.encoded.get_or_init(|| encoded))
	}

	/// The decoded rows, decoding on first use if the map was constructed
	/// from an encoded string.
	pub fn decoded_mappings(&self) -> Result<&[Vec<SourceMapSegment>]> {
		if let Some(decoded) = self.decoded.get() {
			return Ok(decoded);
		}
		let encoded = self.encoded.get().map(String::as_str).unwrap_or("");
		let rows = vlq::decode_mappings(encoded)?;
		Ok(self.decoded.get_or_init(|| rows))
	}

	/// The segment covering a generated position, or `None` when the line
	/// is out of range or the column precedes every mapping.
	///
	/// Both coordinates are 0-indexed, unlike the position queries.
	pub fn trace_segment(&self, line: u32, column: u32) -> Result<Option<&SourceMapSegment>> {
		let decoded = self.decoded_mappings()?;
		let Some(row) = decoded.get(line as usize) else {
			return Ok(None);
		};
		let mut memo = self.decoded_memo.borrow_mut();
		let (index, _) = biased_search(row, column, &mut memo, line, Bias::GreatestLowerBound);
		Ok(index.map(|index| &row[index]))
	}

	/// Original position for a generated position, or `None` for unmapped
	/// territory.
	pub fn original_position_for(&self, needle: GeneratedNeedle) -> Result<Option<OriginalPosition>> {
		if needle.line < 1 {
			return Err(TraceError::InvalidCoordinate { line: needle.line });
		}
		let line = needle.line - 1;

		let decoded = self.decoded_mappings()?;
		let Some(row) = decoded.get(line as usize) else {
			return Ok(None);
		};
		let mut memo = self.decoded_memo.borrow_mut();
		let (index, _) = biased_search(row, needle.column, &mut memo, line, needle.bias);
		let Some(index) = index else {
			return Ok(None);
		};
		let Some(original) = &row[index].source else {
			return Ok(None);
		};

		let source = self
			.resolved_sources
			.get(original.source_index as usize)
			.cloned()
			.ok_or(MapError::InvalidSourceIndex(original.source_index))?;
		let name = match original.name_index {
			Some(name_index) => Some(
				self.names
					.get(name_index as usize)
					.cloned()
					.ok_or(MapError::InvalidNameIndex(name_index))?,
			),
			None => None,
		};

		Ok(Some(OriginalPosition {
			source,
			line: original.line + 1,
			column: original.column,
			name,
		}))
	}

	/// Generated position for an original position, or `None` when the
	/// source is unknown or the line carries no mappings.
	pub fn generated_position_for(&self, needle: OriginalNeedle<'_>) -> Result<Option<GeneratedPosition>> {
		if needle.line < 1 {
			return Err(TraceError::InvalidCoordinate { line: needle.line });
		}
		let line = needle.line - 1;

		let Some(source_index) = self.source_index_of(needle.source) else {
			return Ok(None);
		};
		let index = self.reverse_index()?;
		let Some(row) = index[source_index].get(line as usize) else {
			return Ok(None);
		};

		let mut memos = self.by_source_memos.borrow_mut();
		let memo = &mut memos[source_index];
		let (found, _) = biased_search(row, needle.column, memo, line, needle.bias);
		Ok(found.map(|index| {
			let rev = row[index];
			GeneratedPosition {
				line: rev.generated_line + 1,
				column: rev.generated_column,
			}
		}))
	}

	/// Every generated position mapping back to the original column band
	/// the needle lands in.
	///
	/// The band is found with a greatest-lower-bound search, then widened
	/// across all entries sharing the matched column. A least-upper-bound
	/// bias moves a missed needle forward before widening.
	pub fn all_generated_positions_for(&self, needle: OriginalNeedle<'_>) -> Result<Vec<GeneratedPosition>> {
		if needle.line < 1 {
			return Err(TraceError::InvalidCoordinate { line: needle.line });
		}
		let line = needle.line - 1;

		let Some(source_index) = self.source_index_of(needle.source) else {
			return Ok(Vec::new());
		};
		let index = self.reverse_index()?;
		let Some(row) = index[source_index].get(line as usize) else {
			return Ok(Vec::new());
		};

		let mut memos = self.by_source_memos.borrow_mut();
		let memo = &mut memos[source_index];
		let (index, found) = biased_search(row, needle.column, memo, line, Bias::GreatestLowerBound);

		let mut min = match index {
			Some(index) => index as isize,
			None => -1,
		};
		if !found && needle.bias == Bias::LeastUpperBound {
			min += 1;
		}
		if min < 0 || min as usize >= row.len() {
			return Ok(Vec::new());
		}
		let mut min = min as usize;

		let matched_column = if found { needle.column } else { row[min].column };
		if !found {
			min = lower_bound(row, matched_column, min);
		}
		let max = upper_bound(row, matched_column, min);

		Ok(row[min..=max]
			.iter()
			.map(|rev| GeneratedPosition {
				line: rev.generated_line + 1,
				column: rev.generated_column,
			})
			.collect())
	}

	/// Invoke `cb` once per segment, in generated order.
	pub fn each_mapping<F: FnMut(MappingItem<'_>)>(&self, mut cb: F) -> Result<()> {
		let decoded = self.decoded_mappings()?;
		for (line, row) in decoded.iter().enumerate() {
			for segment in row {
				let mut item = MappingItem {
					generated_line: line as u32 + 1,
					generated_column: segment.generated_column,
					source: None,
					original_line: None,
					original_column: None,
					name: None,
				};
				if let Some(original) = &segment.source {
					item.source = self
						.resolved_sources
						.get(original.source_index as usize)
						.map(String::as_str);
					item.original_line = Some(original.line + 1);
					item.original_column = Some(original.column);
					if let Some(name_index) = original.name_index {
						item.name = self.names.get(name_index as usize).map(String::as_str);
					}
				}
				cb(item);
			}
		}
		Ok(())
	}

	/// Embedded content for a source, matched against the raw `sources`
	/// first and the resolved list second.
	pub fn source_content_for(&self, source: &str) -> Option<&str> {
		let contents = self.sources_content.as_ref()?;
		let index = self.source_index_of(source)?;
		contents.get(index)?.as_deref()
	}

	/// A fresh decoded envelope for this map.
	pub fn decoded_map(&self) -> Result<DecodedSourceMap> {
		Ok(DecodedSourceMap {
			version: self.version,
			file: self.file.clone(),
			source_root: self.source_root.clone(),
			sources: self.sources.clone(),
			sources_content: self.sources_content.clone(),
			names: self.names.clone(),
			mappings: self.decoded_mappings()?.to_vec(),
		})
	}

	/// A fresh encoded envelope for this map.
	pub fn encoded_map(&self) -> Result<SourceMapV3> {
		Ok(SourceMapV3 {
			version: self.version,
			file: self.file.clone(),
			source_root: self.source_root.clone(),
			sources: self.sources.clone(),
			sources_content: self.sources_content.clone(),
			names: self.names.clone(),
			mappings: self.encoded_mappings()?.to_string(),
		})
	}

	fn source_index_of(&self, source: &str) -> Option<usize> {
		self.sources
			.iter()
			.position(|candidate| candidate.as_deref() == Some(source))
			.or_else(|| {
				self.resolved_sources
					.iter()
					.position(|candidate| candidate == source)
			})
	}

	fn reverse_index(&self) -> Result<&ReverseIndex> {
		if let Some(index) = self.by_source.get() {
			return Ok(index);
		}
		let decoded = self.decoded_mappings()?;
		let mut memos = vec![MemoState::default(); self.sources.len()];
		let index = by_source::build(decoded, &mut memos, self.sources.len())?;
		*self.by_source_memos.borrow_mut() = memos;
		Ok(self.by_source.get_or_init(|| index))
	}
}
