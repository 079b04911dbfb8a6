// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canonical mapping segment model.
//!
//! A segment maps a column in the generated file to, optionally, a position
//! in an original source and a symbol name. On the wire a segment is a
//! 1-, 4- or 5-element integer array; the structured form here keeps the
//! generated column flat and folds the optional fields into [`OriginalRef`].

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire constant for [`Bias::GreatestLowerBound`].
pub const GREATEST_LOWER_BOUND: i32 = 1;

/// Wire constant for [`Bias::LeastUpperBound`].
pub const LEAST_UPPER_BOUND: i32 = -1;

/// Policy for resolving a query that falls between two adjacent segment
/// columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
	/// Match the greatest column at or before the needle (the default).
	#[default]
	GreatestLowerBound,
	/// Match the least column at or after the needle.
	LeastUpperBound,
}

impl Bias {
	/// Parse the conventional integer constant for a bias.
	pub fn from_constant(value: i32) -> Option<Self> {
		match value {
			GREATEST_LOWER_BOUND => Some(Self::GreatestLowerBound),
			LEAST_UPPER_BOUND => Some(Self::LeastUpperBound),
			_ => None,
		}
	}

	/// The conventional integer constant for this bias.
	pub fn to_constant(self) -> i32 {
		match self {
			Self::GreatestLowerBound => GREATEST_LOWER_BOUND,
			Self::LeastUpperBound => LEAST_UPPER_BOUND,
		}
	}
}

/// Original-position fields of a mapped segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalRef {
	/// Index into the map's `sources` list.
	pub source_index: u32,
	/// Line in the original source (0-indexed).
	pub line: u32,
	/// Column in the original source (0-indexed).
	pub column: u32,
	/// Optional index into the map's `names` list.
	pub name_index: Option<u32>,
}

/// A single mapping entry: a generated column plus an optional original
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMapSegment {
	/// Column in the generated file (0-indexed).
	pub generated_column: u32,
	/// Original position, absent for unmapped generated ranges.
	pub source: Option<OriginalRef>,
}

impl SourceMapSegment {
	/// An unmapped point in the generated output.
	pub const fn generated(generated_column: u32) -> Self {
		Self {
			generated_column,
			source: None,
		}
	}

	/// A segment mapped to an original position, without a name.
	pub const fn mapped(generated_column: u32, source_index: u32, line: u32, column: u32) -> Self {
		Self {
			generated_column,
			source: Some(OriginalRef {
				source_index,
				line,
				column,
				name_index: None,
			}),
		}
	}

	/// Attach a name index. No effect on unmapped segments, which cannot
	/// carry a name.
	pub fn with_name(mut self, name_index: u32) -> Self {
		if let Some(source) = self.source.as_mut() {
			source.name_index = Some(name_index);
		}
		self
	}

	/// Wire arity of this segment: 1, 4 or 5.
	pub fn arity(&self) -> usize {
		match &self.source {
			None => 1,
			Some(source) if source.name_index.is_some() => 5,
			Some(_) => 4,
		}
	}

	pub fn has_source(&self) -> bool {
		self.source.is_some()
	}

	pub fn has_name(&self) -> bool {
		self.source.is_some_and(|source| source.name_index.is_some())
	}
}

impl Serialize for SourceMapSegment {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(self.arity()))?;
		seq.serialize_element(&self.generated_column)?;
		if let Some(source) = &self.source {
			seq.serialize_element(&source.source_index)?;
			seq.serialize_element(&source.line)?;
			seq.serialize_element(&source.column)?;
			if let Some(name_index) = source.name_index {
				seq.serialize_element(&name_index)?;
			}
		}
		seq.end()
	}
}

impl<'de> Deserialize<'de> for SourceMapSegment {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		struct SegmentVisitor;

		impl<'de> Visitor<'de> for SegmentVisitor {
			type Value = SourceMapSegment;

			fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str("a mapping segment of 1, 4 or 5 integers")
			}

			fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
				let generated_column: u32 = seq
					.next_element()?
					.ok_or_else(|| de::Error::invalid_length(0, &self))?;
				let Some(source_index) = seq.next_element::<u32>()? else {
					return Ok(SourceMapSegment::generated(generated_column));
				};
				let line: u32 = seq
					.next_element()?
					.ok_or_else(|| de::Error::invalid_length(2, &self))?;
				let column: u32 = seq
					.next_element()?
					.ok_or_else(|| de::Error::invalid_length(3, &self))?;
				let segment = SourceMapSegment::mapped(generated_column, source_index, line, column);
				match seq.next_element::<u32>()? {
					Some(name_index) => Ok(segment.with_name(name_index)),
					None => Ok(segment),
				}
			}
		}

		deserializer.deserialize_seq(SegmentVisitor)
	}
}
