// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types shared across the Twine source-map crates.

use thiserror::Error;

/// Errors that can occur while parsing, decoding or encoding source maps.
#[derive(Debug, Error)]
pub enum MapError {
	#[error("Invalid source map JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(u32),

	#[error("Invalid VLQ character '{ch}' at offset {offset}")]
	InvalidVlqChar { ch: char, offset: usize },

	#[error("Unterminated VLQ sequence at offset {offset}")]
	UnterminatedVlq { offset: usize },

	#[error("Invalid segment arity {arity} at offset {offset}")]
	InvalidSegmentArity { arity: usize, offset: usize },

	#[error("Invalid source index: {0}")]
	InvalidSourceIndex(u32),

	#[error("Invalid name index: {0}")]
	InvalidNameIndex(u32),
}

pub type Result<T> = std::result::Result<T, MapError>;
