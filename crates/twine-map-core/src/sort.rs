// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row sort check for decoded mappings.
//!
//! Maps produced by tools arrive sorted; hand-constructed decoded input may
//! not. Each row is scanned for an out-of-order adjacent pair and only
//! offending rows are sorted, stably, by generated column.

use crate::segment::SourceMapSegment;

/// Whether a row is non-decreasing in generated column.
pub fn is_sorted(row: &[SourceMapSegment]) -> bool {
	row.windows(2)
		.all(|pair| pair[0].generated_column <= pair[1].generated_column)
}

/// Sort any rows that need it. Duplicate columns keep their insertion order.
pub fn ensure_sorted(rows: &mut [Vec<SourceMapSegment>]) {
	for row in rows {
		if !is_sorted(row) {
			row.sort_by_key(|segment| segment.generated_column);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_sorted_rows_untouched() {
		let row = vec![
			SourceMapSegment::mapped(0, 0, 0, 0),
			SourceMapSegment::mapped(5, 0, 0, 9),
			SourceMapSegment::mapped(5, 0, 1, 2),
		];
		let mut rows = vec![row.clone()];
		ensure_sorted(&mut rows);
		assert_eq!(rows[0], row);
	}

	#[test]
	fn test_unsorted_row_sorted_stably() {
		let mut rows = vec![vec![
			SourceMapSegment::mapped(9, 0, 0, 0),
			SourceMapSegment::mapped(2, 0, 1, 0),
			SourceMapSegment::mapped(2, 0, 2, 0),
		]];
		ensure_sorted(&mut rows);
		assert_eq!(
			rows[0],
			vec![
				SourceMapSegment::mapped(2, 0, 1, 0),
				SourceMapSegment::mapped(2, 0, 2, 0),
				SourceMapSegment::mapped(9, 0, 0, 0),
			]
		);
	}

	proptest! {
		#[test]
		fn ensure_sorted_always_yields_sorted_rows(
			columns in proptest::collection::vec(proptest::collection::vec(0u32..100, 0..20), 0..6),
		) {
			let mut rows: Vec<Vec<SourceMapSegment>> = columns
				.into_iter()
				.map(|row| row.into_iter().map(SourceMapSegment::generated).collect())
				.collect();
			ensure_sorted(&mut rows);
			for row in &rows {
				prop_assert!(is_sorted(row));
			}
		}
	}
}
