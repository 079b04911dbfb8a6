// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for tracing operations.

use thiserror::Error;

use twine_map_core::MapError;

/// Errors that can occur while constructing or querying a trace map.
#[derive(Debug, Error)]
pub enum TraceError {
	#[error("Invalid source map: {0}")]
	Map(#[from] MapError),

	#[error("Line numbers are 1-based, got {line}")]
	InvalidCoordinate { line: u32 },
}

pub type Result<T> = std::result::Result<T, TraceError>;
