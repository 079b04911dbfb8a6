// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bidirectional source-map tracer.
//!
//! This crate provides functionality for:
//! - Building a [`TraceMap`] from JSON text, encoded or decoded envelopes,
//!   or sectioned index maps (flattened on construction)
//! - Tracing generated positions to original positions and back, with
//!   greatest-lower-bound / least-upper-bound bias control
//! - Enumerating every mapping in generated order
//! - Looking up embedded source content
//!
//! Decoding, re-encoding and the original→generated reverse index are all
//! computed lazily on first use and cached for the life of the instance.
//! Instances are intentionally not `Sync`; confine each to one thread.
//!
//! # Example
//!
//! ```
//! use twine_map_trace::{GeneratedNeedle, TraceMap};
//!
//! let map = TraceMap::from_json(
//! 	r#"{
//! 		"version": 3,
//! 		"sources": ["input.js"],
//! 		"names": [],
//! 		"mappings": "AAAA"
//! 	}"#,
//! 	None,
//! )
//! .unwrap();
//!
//! let original = map
//! 	.original_position_for(GeneratedNeedle::new(1, 0))
//! 	.unwrap()
//! 	.unwrap();
//! assert_eq!(original.source, "input.js");
//! assert_eq!(original.line, 1);
//! ```

mod by_source;
pub mod error;
pub mod position;
mod section;
mod trace_map;

pub use error::{Result, TraceError};
pub use position::{
	GeneratedNeedle, GeneratedPosition, MappingItem, OriginalNeedle, OriginalPosition,
};
pub use trace_map::TraceMap;

// Re-export the pieces of the core model that appear in this crate's API.
pub use twine_map_core::{
	Bias, DecodedSourceMap, MapError, SourceMapInput, SourceMapSegment, SourceMapV3,
	GREATEST_LOWER_BOUND, LEAST_UPPER_BOUND,
};
