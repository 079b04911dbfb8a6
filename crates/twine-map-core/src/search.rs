// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column-keyed binary search over segment rows, with monotonic memoization.
//!
//! Tracing queries tend to walk forward through a file (a stack trace, a
//! diagnostics pass), so consecutive searches in the same row are usually
//! monotonic. [`MemoState`] remembers the last `(row, column)` query and its
//! result; the next search in the same row constrains its bounds from that
//! point instead of starting over.

use crate::segment::{Bias, SourceMapSegment};

/// Keyed access to the search column of a row entry.
///
/// Forward rows search by generated column; reverse-index rows search by
/// original column.
pub trait ColumnKeyed {
	fn column(&self) -> u32;
}

impl ColumnKeyed for SourceMapSegment {
	fn column(&self) -> u32 {
		self.generated_column
	}
}

/// Result of a column search.
///
/// `index` is the greatest entry whose column is at most the needle, or -1
/// when every entry exceeds it. `found` reports an exact column match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
	pub index: isize,
	pub found: bool,
}

/// Memo of the last search in a row. One slot accelerates one query stream.
#[derive(Debug, Clone, Copy)]
pub struct MemoState {
	last_key: i64,
	last_needle: i64,
	last_index: isize,
}

impl Default for MemoState {
	fn default() -> Self {
		Self {
			last_key: -1,
			last_needle: -1,
			last_index: -1,
		}
	}
}

impl MemoState {
	/// Record the index of an entry just inserted into the memoized row, so
	/// the next monotonic insertion constrains its bounds from there.
	pub fn note_inserted(&mut self, index: isize) {
		self.last_index = index;
	}
}

/// Binary search over `row[low..high)` for the greatest column at most
/// `needle`.
pub fn binary_search<T: ColumnKeyed>(row: &[T], needle: u32, low: usize, high: usize) -> SearchResult {
	let idx = low + row[low..high].partition_point(|entry| entry.column() <= needle);
	let found = idx > low && row[idx - 1].column() == needle;
	SearchResult {
		index: idx as isize - 1,
		found,
	}
}

/// Widen a matched index to the lowest index with the same column.
pub fn lower_bound<T: ColumnKeyed>(row: &[T], needle: u32, index: usize) -> usize {
	let mut index = index;
	while index > 0 && row[index - 1].column() == needle {
		index -= 1;
	}
	index
}

/// Widen a matched index to the highest index with the same column.
pub fn upper_bound<T: ColumnKeyed>(row: &[T], needle: u32, index: usize) -> usize {
	let mut index = index;
	let mut i = index + 1;
	while i < row.len() && row[i].column() == needle {
		index = i;
		i += 1;
	}
	index
}

/// Search with memoized bounds.
///
/// When `key` matches the memoized row: an identical needle returns the
/// cached index outright; a larger needle constrains the low bound to the
/// cached index (clamped at 0); a smaller one constrains the high bound.
/// A different key falls back to a full search.
pub fn memoized_search<T: ColumnKeyed>(
	row: &[T],
	needle: u32,
	memo: &mut MemoState,
	key: u32,
) -> SearchResult {
	let mut low = 0usize;
	let mut high = row.len();

	if i64::from(key) == memo.last_key {
		if i64::from(needle) == memo.last_needle {
			let found = memo.last_index >= 0
				&& row
					.get(memo.last_index as usize)
					.is_some_and(|entry| entry.column() == needle);
			return SearchResult {
				index: memo.last_index,
				found,
			};
		}
		if i64::from(needle) >= memo.last_needle {
			low = memo.last_index.max(0) as usize;
		} else {
			high = (memo.last_index + 1) as usize;
		}
	}
	memo.last_key = i64::from(key);
	memo.last_needle = i64::from(needle);

	let result = binary_search(row, needle, low, high);
	memo.last_index = result.index;
	result
}

/// Memoized search with bias applied.
///
/// On an exact match the index widens to the duplicate-run boundary for the
/// bias; on a miss, [`Bias::LeastUpperBound`] advances to the next entry.
/// Returns the in-range index (or `None`) and the exact-match flag.
pub fn biased_search<T: ColumnKeyed>(
	row: &[T],
	needle: u32,
	memo: &mut MemoState,
	key: u32,
	bias: Bias,
) -> (Option<usize>, bool) {
	let SearchResult { mut index, found } = memoized_search(row, needle, memo, key);
	if found {
		index = match bias {
			Bias::LeastUpperBound => upper_bound(row, needle, index as usize) as isize,
			Bias::GreatestLowerBound => lower_bound(row, needle, index as usize) as isize,
		};
	} else if bias == Bias::LeastUpperBound {
		index += 1;
	}

	if index < 0 || index as usize >= row.len() {
		(None, found)
	} else {
		(Some(index as usize), found)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn row(columns: &[u32]) -> Vec<SourceMapSegment> {
		columns
			.iter()
			.map(|&column| SourceMapSegment::generated(column))
			.collect()
	}

	#[test]
	fn test_binary_search_basic() {
		let row = row(&[0, 10, 20]);
		assert_eq!(
			binary_search(&row, 5, 0, 3),
			SearchResult { index: 0, found: false }
		);
		assert_eq!(
			binary_search(&row, 10, 0, 3),
			SearchResult { index: 1, found: true }
		);
		assert_eq!(
			binary_search(&row, 25, 0, 3),
			SearchResult { index: 2, found: false }
		);
	}

	#[test]
	fn test_binary_search_before_first() {
		let row = row(&[10, 20]);
		assert_eq!(
			binary_search(&row, 5, 0, 2),
			SearchResult { index: -1, found: false }
		);
	}

	#[test]
	fn test_bounds_widen_over_duplicates() {
		let row = row(&[0, 5, 5, 5, 9]);
		assert_eq!(lower_bound(&row, 5, 3), 1);
		assert_eq!(upper_bound(&row, 5, 1), 3);
		// A non-duplicate index stays put.
		assert_eq!(lower_bound(&row, 9, 4), 4);
		assert_eq!(upper_bound(&row, 0, 0), 0);
	}

	#[test]
	fn test_memoized_search_same_needle_uses_cache() {
		let row = row(&[0, 10, 20]);
		let mut memo = MemoState::default();
		let first = memoized_search(&row, 10, &mut memo, 3);
		let second = memoized_search(&row, 10, &mut memo, 3);
		assert_eq!(first, second);
		assert!(second.found);
	}

	#[test]
	fn test_memoized_search_monotonic_forward_and_back() {
		let row = row(&[0, 4, 8, 12, 16]);
		let mut memo = MemoState::default();
		assert_eq!(memoized_search(&row, 4, &mut memo, 0).index, 1);
		assert_eq!(memoized_search(&row, 13, &mut memo, 0).index, 3);
		assert_eq!(memoized_search(&row, 5, &mut memo, 0).index, 1);
		assert_eq!(memoized_search(&row, 0, &mut memo, 0).index, 0);
	}

	#[test]
	fn test_memoized_search_key_change_resets() {
		let row_a = row(&[0, 10, 20]);
		let row_b = row(&[3, 7]);
		let mut memo = MemoState::default();
		assert_eq!(memoized_search(&row_a, 20, &mut memo, 0).index, 2);
		assert_eq!(memoized_search(&row_b, 4, &mut memo, 1).index, 0);
	}

	#[test]
	fn test_biased_search_miss_semantics() {
		let row = row(&[0, 10, 20]);
		let mut memo = MemoState::default();
		let (index, found) = biased_search(&row, 15, &mut memo, 0, Bias::GreatestLowerBound);
		assert_eq!((index, found), (Some(1), false));

		let mut memo = MemoState::default();
		let (index, found) = biased_search(&row, 15, &mut memo, 0, Bias::LeastUpperBound);
		assert_eq!((index, found), (Some(2), false));

		// Out of range on either side.
		let mut memo = MemoState::default();
		let (index, _) = biased_search(&row, 25, &mut memo, 0, Bias::LeastUpperBound);
		assert_eq!(index, None);
		let mut memo = MemoState::default();
		let (index, _) = biased_search(&row, 0, &mut memo, 1, Bias::GreatestLowerBound);
		assert_eq!(index, Some(0));
	}

	#[test]
	fn test_biased_search_exact_match_widens() {
		let row = row(&[0, 5, 5, 5, 9]);
		let mut memo = MemoState::default();
		let (index, found) = biased_search(&row, 5, &mut memo, 0, Bias::GreatestLowerBound);
		assert_eq!((index, found), (Some(1), true));
		let mut memo = MemoState::default();
		let (index, found) = biased_search(&row, 5, &mut memo, 0, Bias::LeastUpperBound);
		assert_eq!((index, found), (Some(3), true));
	}

	proptest! {
		// Memoization transparency: any query sequence gives the same
		// answers as a cold full-range search.
		#[test]
		fn memoized_matches_cold_search(
			columns in proptest::collection::vec(0u32..200, 1..40),
			needles in proptest::collection::vec(0u32..220, 1..40),
		) {
			let mut columns = columns;
			columns.sort_unstable();
			let row = row(&columns);
			let mut memo = MemoState::default();
			for needle in needles {
				let memoized = memoized_search(&row, needle, &mut memo, 7);
				let cold = binary_search(&row, needle, 0, row.len());
				prop_assert_eq!(memoized.index, cold.index);
				prop_assert_eq!(memoized.found, cold.found);
			}
		}
	}
}
