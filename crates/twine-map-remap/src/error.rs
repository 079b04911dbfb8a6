// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for map composition.

use thiserror::Error;

use twine_map_core::MapError;
use twine_map_trace::TraceError;

/// Errors that can occur while composing a source map chain.
#[derive(Debug, Error)]
pub enum RemapError {
	#[error("Invalid source map: {0}")]
	Map(#[from] MapError),

	#[error("Trace failed: {0}")]
	Trace(#[from] TraceError),

	#[error("Source map referenced an invalid position: source {source_index}, line {line}, column {column}")]
	InvalidMap {
		source_index: u32,
		line: u32,
		column: u32,
	},
}

pub type Result<T> = std::result::Result<T, RemapError>;
