// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reverse index from original positions back to generated positions.
//!
//! The forward decoded rows are keyed by generated line and column; queries
//! in the other direction need the inverse. One pass over the forward rows
//! builds, per source, rows keyed by original line holding
//! [`ReverseSegment`] entries sorted by original column. Several forward
//! segments may target the same original position; all of them are kept,
//! in forward insertion order.

use twine_map_core::{memoized_search, upper_bound, ColumnKeyed, MapError, MemoState, SourceMapSegment};

use crate::error::Result;

/// One entry of the reverse index, keyed by original column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ReverseSegment {
	/// Column in the original source (0-indexed).
	pub column: u32,
	/// Line in the generated file (0-indexed).
	pub generated_line: u32,
	/// Column in the generated file (0-indexed).
	pub generated_column: u32,
}

impl ColumnKeyed for ReverseSegment {
	fn column(&self) -> u32 {
		self.column
	}
}

/// Rows of reverse segments per source, indexed `[source][original line]`.
/// Untouched lines stay empty.
pub(crate) type ReverseIndex = Vec<Vec<Vec<ReverseSegment>>>;

/// Build the reverse index for a decoded map.
///
/// `memos` must hold one slot per source; the slots double as the query
/// memos afterwards. Tool-emitted maps walk their originals mostly forward,
/// so the memoized search turns each insertion into an append.
pub(crate) fn build(
	decoded: &[Vec<SourceMapSegment>],
	memos: &mut [MemoState],
	source_count: usize,
) -> Result<ReverseIndex> {
	let mut sources: ReverseIndex = vec![Vec::new(); source_count];

	for (generated_line, row) in decoded.iter().enumerate() {
		for segment in row {
			let Some(original) = &segment.source else {
				continue;
			};
			let source_index = original.source_index as usize;
			if source_index >= source_count {
				return Err(MapError::InvalidSourceIndex(original.source_index).into());
			}

			let rows = &mut sources[source_index];
			if rows.len() <= original.line as usize {
				rows.resize_with(original.line as usize + 1, Vec::new);
			}
			let line_row = &mut rows[original.line as usize];

			let memo = &mut memos[source_index];
			let result = memoized_search(line_row, original.column, memo, original.line);
			let insert_at = if result.index < 0 {
				0
			} else {
				upper_bound(line_row, original.column, result.index as usize) + 1
			};
			memo.note_inserted(insert_at as isize);
			line_row.insert(
				insert_at,
				ReverseSegment {
					column: original.column,
					generated_line: generated_line as u32,
					generated_column: segment.generated_column,
				},
			);
		}
	}

	Ok(sources)
}
