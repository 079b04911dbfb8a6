// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map chain composition.
//!
//! A transpile-then-bundle pipeline leaves a chain of maps: the bundle maps
//! to transpiled intermediates, which map to the files a developer actually
//! wrote. [`remap`] flattens such a chain into one map from the final
//! output to the ultimate originals, walking the chain through a caller
//! supplied synchronous [`SourceMapLoader`].
//!
//! # Example
//!
//! ```
//! use twine_map_core::{SourceMapInput, SourceMapV3};
//! use twine_map_remap::{remap, LoaderContext, RemapOptions, RemappedMap};
//!
//! let root = SourceMapInput::Map(SourceMapV3 {
//! 	version: 3,
//! 	file: Some("bundle.js".to_string()),
//! 	source_root: None,
//! 	sources: vec![Some("transpiled.js".to_string())],
//! 	sources_content: None,
//! 	names: vec![],
//! 	mappings: "AAAA".to_string(),
//! });
//!
//! let loader = |source: &str, _ctx: &mut LoaderContext| {
//! 	if source == "transpiled.js" {
//! 		Some(SourceMapInput::Map(SourceMapV3 {
//! 			version: 3,
//! 			file: None,
//! 			source_root: None,
//! 			sources: vec![Some("original.js".to_string())],
//! 			sources_content: None,
//! 			names: vec![],
//! 			mappings: "AAAA".to_string(),
//! 		}))
//! 	} else {
//! 		None
//! 	}
//! };
//!
//! let remapped = remap(root, loader, &RemapOptions::default()).unwrap();
//! let RemappedMap::Encoded(map) = remapped else { unreachable!() };
//! assert_eq!(map.sources, vec![Some("original.js".to_string())]);
//! ```

use tracing::{debug, instrument};

use twine_map_core::{encode_mappings, DecodedSourceMap, MapError, SourceMapInput, SourceMapV3};
use twine_map_trace::TraceMap;

mod build;
mod compose;
pub mod error;

pub use build::{LoaderContext, SourceMapLoader};
pub use error::{RemapError, Result};

/// Options controlling the composed output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemapOptions {
	/// Leave `sourcesContent` out of the output.
	pub exclude_content: bool,
	/// Keep the output mappings decoded instead of re-encoding to VLQ.
	pub decoded_mappings: bool,
}

/// A composed map, in the mapping form the options requested.
#[derive(Debug, Clone, PartialEq)]
pub enum RemappedMap {
	Encoded(SourceMapV3),
	Decoded(DecodedSourceMap),
}

impl RemappedMap {
	/// Serialize to v3 JSON.
	pub fn to_json(&self) -> Result<String> {
		let json = match self {
			Self::Encoded(map) => serde_json::to_string(map),
			Self::Decoded(map) => serde_json::to_string(map),
		};
		json.map_err(|err| MapError::from(err).into())
	}
}

/// Compose a chain of maps into a single map from the root's generated
/// file to the ultimate original sources.
///
/// The loader is invoked once per source at each nesting level, in
/// traversal order; returning `None` marks the source as an original file.
#[instrument(skip(input, loader), fields(exclude_content = options.exclude_content, decoded = options.decoded_mappings))]
pub fn remap<L: SourceMapLoader>(
	input: SourceMapInput,
	mut loader: L,
	options: &RemapOptions,
) -> Result<RemappedMap> {
	let root = TraceMap::new(input, None)?;
	let tree = build::build_tree(root, &mut loader, "", 0)?;
	let composed = compose::trace_mappings(&tree)?;

	let file = tree.map.file().map(str::to_string);
	let sources: Vec<Option<String>> = composed.sources.into_vec().into_iter().map(Some).collect();
	let names = composed.names.into_vec();
	let sources_content = (!options.exclude_content).then_some(composed.sources_content);

	debug!(sources = sources.len(), names = names.len(), "composed source map chain");

	if options.decoded_mappings {
		Ok(RemappedMap::Decoded(DecodedSourceMap {
			version: 3,
			file,
			source_root: None,
			sources,
			sources_content,
			names,
			mappings: composed.mappings,
		}))
	} else {
		let mappings = encode_mappings(&composed.mappings);
		Ok(RemappedMap::Encoded(SourceMapV3 {
			version: 3,
			file,
			source_root: None,
			sources,
			sources_content,
			names,
			mappings,
		}))
	}
}
