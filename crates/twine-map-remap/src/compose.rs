// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Recursive downward tracing of root segments to their ultimate originals.
//!
//! Each mapped root segment names a position in one of the root's sources;
//! when that source has its own map, the position traces through it, and so
//! on until an original leaf terminates the branch. Positions that fall off
//! a child map (no row, or no segment at or before the column) contribute
//! nothing to the output. A child hit on an unmapped segment surfaces as a
//! sourceless output segment. A child segment's name takes precedence over
//! the name carried down from above.

use twine_map_core::{MapError, SourceMapSegment, UniqueTable};

use crate::build::{MapNode, OriginalLeaf, SourceNode};
use crate::error::{RemapError, Result};

/// Accumulated output of a composition pass.
pub(crate) struct ComposedMap {
	pub mappings: Vec<Vec<SourceMapSegment>>,
	pub sources: UniqueTable,
	pub sources_content: Vec<Option<String>>,
	pub names: UniqueTable,
}

enum Traced<'a> {
	/// The trace hit an unmapped segment; the output stays sourceless.
	Sourceless,
	/// The trace bottomed out in an original file.
	Original {
		leaf: &'a OriginalLeaf,
		line: u32,
		column: u32,
		name: Option<&'a str>,
	},
}

fn trace_position<'a>(
	node: &'a SourceNode,
	line: u32,
	column: u32,
	name: Option<&'a str>,
) -> Result<Option<Traced<'a>>> {
	match node {
		SourceNode::Leaf(leaf) => Ok(Some(Traced::Original {
			leaf,
			line,
			column,
			name,
		})),
		SourceNode::Node(map_node) => {
			let Some(segment) = map_node.map.trace_segment(line, column)? else {
				return Ok(None);
			};
			let Some(original) = &segment.source else {
				return Ok(Some(Traced::Sourceless));
			};
			let child = map_node
				.children
				.get(original.source_index as usize)
				.ok_or(RemapError::InvalidMap {
					source_index: original.source_index,
					line,
					column,
				})?;
			let name = match original.name_index {
				Some(name_index) => Some(
					map_node
						.map
						.names()
						.get(name_index as usize)
						.map(String::as_str)
						.ok_or(MapError::InvalidNameIndex(name_index))?,
				),
				None => name,
			};
			trace_position(child, original.line, original.column, name)
		}
	}
}

/// Trace every root segment down the tree and assemble the flattened map.
pub(crate) fn trace_mappings(tree: &MapNode) -> Result<ComposedMap> {
	let mut mappings = Vec::new();
	let mut sources = UniqueTable::new();
	let mut sources_content: Vec<Option<String>> = Vec::new();
	let mut names = UniqueTable::new();

	let decoded = tree.map.decoded_mappings()?;
	let root_names = tree.map.names();

	for row in decoded {
		let mut out_row: Vec<SourceMapSegment> = Vec::new();
		for segment in row {
			let traced = match &segment.source {
				None => Some(Traced::Sourceless),
				Some(original) => {
					let child = tree
						.children
						.get(original.source_index as usize)
						.ok_or(RemapError::InvalidMap {
							source_index: original.source_index,
							line: original.line,
							column: original.column,
						})?;
					let incoming = match original.name_index {
						Some(name_index) => Some(
							root_names
								.get(name_index as usize)
								.map(String::as_str)
								.ok_or(MapError::InvalidNameIndex(name_index))?,
						),
						None => None,
					};
					trace_position(child, original.line, original.column, incoming)?
				}
			};
			// A trace that found nothing drops the segment entirely.
			let Some(traced) = traced else {
				continue;
			};

			let rewritten = match traced {
				Traced::Sourceless => SourceMapSegment::generated(segment.generated_column),
				Traced::Original {
					leaf,
					line,
					column,
					name,
				} => {
					let before = sources.len();
					let source_index = sources.insert(&leaf.filename);
					if sources.len() > before {
						sources_content.push(leaf.content.clone());
					} else if sources_content[source_index as usize].is_none() {
						sources_content[source_index as usize] = leaf.content.clone();
					}
					let rewritten =
						SourceMapSegment::mapped(segment.generated_column, source_index, line, column);
					match name {
						Some(name) if !name.is_empty() => rewritten.with_name(names.insert(name)),
						_ => rewritten,
					}
				}
			};

			// Collapse identical adjacent emits.
			if out_row.last() == Some(&rewritten) {
				continue;
			}
			out_row.push(rewritten);
		}
		mappings.push(out_row);
	}

	Ok(ComposedMap {
		mappings,
		sources,
		sources_content,
		names,
	})
}
