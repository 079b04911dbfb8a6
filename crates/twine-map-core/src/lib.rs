// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core model and codec for the Twine source-map toolkit.
//!
//! This crate provides the shared machinery the tracer and composer build
//! on:
//! - The segment model and v3 envelope types (encoded, decoded, sectioned)
//! - The Base64-VLQ codec for the `mappings` field
//! - Column-keyed binary search with monotonic memoization
//! - The row sort check for programmatically constructed mappings
//! - Insertion-ordered unique string tables
//! - URL/path resolution for source names
//!
//! It holds no map state of its own; see `twine-map-trace` for the tracer
//! and `twine-map-remap` for chain composition.

pub mod envelope;
pub mod error;
pub mod resolve;
pub mod search;
pub mod segment;
pub mod sort;
pub mod table;
pub mod vlq;

pub use envelope::{
	validate_version, DecodedSourceMap, Section, SectionOffset, SectionedSourceMap, SourceMapInput,
	SourceMapV3,
};
pub use error::{MapError, Result};
pub use resolve::{resolve, strip_filename};
pub use search::{
	biased_search, binary_search, lower_bound, memoized_search, upper_bound, ColumnKeyed, MemoState,
	SearchResult,
};
pub use segment::{Bias, OriginalRef, SourceMapSegment, GREATEST_LOWER_BOUND, LEAST_UPPER_BOUND};
pub use sort::{ensure_sorted, is_sorted};
pub use table::UniqueTable;
pub use vlq::{decode_mappings, encode_mappings};
