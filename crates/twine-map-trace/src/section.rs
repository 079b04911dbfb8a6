// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flattening of sectioned ("index") maps into a single trace map.
//!
//! Sections appear in generated order, each shifting a child map by a line
//! and column offset; children may themselves be sectioned. One recursive
//! traversal rewrites every child segment into the composed coordinate
//! space, deduplicating sources and names along the way. Each section is
//! clipped at the next section's offset, so overlapping child mappings
//! cannot leak past their slot.

use tracing::debug;

use twine_map_core::{
	validate_version, DecodedSourceMap, MapError, Section, SectionOffset, SectionedSourceMap,
	SourceMapInput, SourceMapSegment, UniqueTable,
};

use crate::error::Result;
use crate::trace_map::TraceMap;

/// Flatten a sectioned map into a trace map over the composed output.
pub(crate) fn flatten(map: SectionedSourceMap, map_url: Option<&str>) -> Result<TraceMap> {
	validate_version(map.version)?;
	debug!(sections = map.sections.len(), "flattening sectioned source map");

	let mut mappings: Vec<Vec<SourceMapSegment>> = Vec::new();
	let mut sources = UniqueTable::new();
	let mut sources_content: Vec<Option<String>> = Vec::new();
	let mut names = UniqueTable::new();

	let file = map.file;
	recurse(
		map.sections,
		map_url,
		&mut mappings,
		&mut sources,
		&mut sources_content,
		&mut names,
		0,
		0,
		u32::MAX,
		u32::MAX,
	)?;

	let decoded = DecodedSourceMap {
		version: 3,
		file,
		source_root: None,
		sources: sources.into_vec().into_iter().map(Some).collect(),
		sources_content: Some(sources_content),
		names: names.into_vec(),
		mappings,
	};
	// Section order yields sorted rows; skip the sort check. Sources were
	// already resolved per child, so no map URL is applied again here.
	TraceMap::presorted_decoded_map(decoded, None)
}

#[allow(clippy::too_many_arguments)]
fn recurse(
	sections: Vec<Section>,
	map_url: Option<&str>,
	mappings: &mut Vec<Vec<SourceMapSegment>>,
	sources: &mut UniqueTable,
	sources_content: &mut Vec<Option<String>>,
	names: &mut UniqueTable,
	line_offset: u32,
	column_offset: u32,
	stop_line: u32,
	stop_column: u32,
) -> Result<()> {
	let offsets: Vec<SectionOffset> = sections.iter().map(|section| section.offset).collect();
	let count = sections.len();

	for (i, section) in sections.into_iter().enumerate() {
		let mut section_stop_line = stop_line;
		let mut section_stop_column = stop_column;
		if i + 1 < count {
			let next = offsets[i + 1];
			section_stop_line = stop_line.min(line_offset + next.line);
			if section_stop_line == stop_line {
				section_stop_column = stop_column.min(column_offset + next.column);
			} else {
				section_stop_column = column_offset + next.column;
			}
		}

		add_section(
			section.map,
			map_url,
			mappings,
			sources,
			sources_content,
			names,
			line_offset + section.offset.line,
			column_offset + section.offset.column,
			section_stop_line,
			section_stop_column,
		)?;
	}
	Ok(())
}

#[allow(clippy::too_many_arguments)]
fn add_section(
	input: SourceMapInput,
	map_url: Option<&str>,
	mappings: &mut Vec<Vec<SourceMapSegment>>,
	sources: &mut UniqueTable,
	sources_content: &mut Vec<Option<String>>,
	names: &mut UniqueTable,
	line_offset: u32,
	column_offset: u32,
	stop_line: u32,
	stop_column: u32,
) -> Result<()> {
	if let SourceMapInput::Sectioned(nested) = input {
		validate_version(nested.version)?;
		return recurse(
			nested.sections,
			map_url,
			mappings,
			sources,
			sources_content,
			names,
			line_offset,
			column_offset,
			stop_line,
			stop_column,
		);
	}

	let map = TraceMap::new(input, map_url)?;
	let decoded = map.decoded_mappings()?;

	// Rewrite this child's source and name indices into the accumulated
	// unique tables. Content travels with the first sighting of a source.
	let mut source_map = Vec::with_capacity(map.resolved_sources().len());
	for (i, resolved) in map.resolved_sources().iter().enumerate() {
		let before = sources.len();
		let index = sources.insert(resolved);
		if sources.len() > before {
			let content = map
				.sources_content()
				.and_then(|contents| contents.get(i))
				.and_then(Clone::clone);
			sources_content.push(content);
		}
		source_map.push(index);
	}
	let name_map: Vec<u32> = map.names().iter().map(|name| names.insert(name)).collect();

	for (r, row) in decoded.iter().enumerate() {
		let line = line_offset + r as u32;
		if line > stop_line {
			return Ok(());
		}
		while mappings.len() <= line as usize {
			mappings.push(Vec::new());
		}
		// Only the section's first row is shifted by the column offset.
		let offset = if r == 0 { column_offset } else { 0 };

		for segment in row {
			let column = offset + segment.generated_column;
			if line == stop_line && column >= stop_column {
				return Ok(());
			}
			let rewritten = match &segment.source {
				None => SourceMapSegment::generated(column),
				Some(original) => {
					let mapped_source = source_map
						.get(original.source_index as usize)
						.copied()
						.ok_or(MapError::InvalidSourceIndex(original.source_index))?;
					let rewritten =
						SourceMapSegment::mapped(column, mapped_source, original.line, original.column);
					match original.name_index {
						Some(name_index) => {
							let mapped_name = name_map
								.get(name_index as usize)
								.copied()
								.ok_or(MapError::InvalidNameIndex(name_index))?;
							rewritten.with_name(mapped_name)
						}
						None => rewritten,
					}
				}
			};
			mappings[line as usize].push(rewritten);
		}
	}
	Ok(())
}
