// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flattening of nested sectioned maps into a single coordinate space.

use twine_map_trace::{SourceMapInput, SourceMapSegment, TraceMap};

fn nested_sectioned_json() -> &'static str {
	// An outer section at (1, 1) holding an inner sectioned map whose own
	// sections sit at column offsets 1 and 2.
	r#"{
		"version": 3,
		"file": "bundle.js",
		"sections": [
			{
				"offset": { "line": 1, "column": 1 },
				"map": {
					"version": 3,
					"sections": [
						{
							"offset": { "line": 0, "column": 1 },
							"map": {
								"version": 3,
								"sources": ["first.js"],
								"names": ["a"],
								"mappings": "AAAAA"
							}
						},
						{
							"offset": { "line": 0, "column": 2 },
							"map": {
								"version": 3,
								"sources": ["second.js"],
								"names": ["b"],
								"mappings": "AAAAA"
							}
						}
					]
				}
			}
		]
	}"#
}

#[test]
fn nested_sections_compose_offsets_and_dedupe_tables() {
	let map = TraceMap::from_json(nested_sectioned_json(), None).unwrap();

	assert_eq!(map.file(), Some("bundle.js"));
	assert_eq!(
		map.resolved_sources(),
		&["first.js".to_string(), "second.js".to_string()]
	);
	assert_eq!(map.names(), &["a", "b"]);

	let decoded = map.decoded_mappings().unwrap();
	assert_eq!(decoded.len(), 2);
	assert!(decoded[0].is_empty());
	assert_eq!(
		decoded[1],
		vec![
			SourceMapSegment::mapped(2, 0, 0, 0).with_name(0),
			SourceMapSegment::mapped(3, 1, 0, 0).with_name(1),
		]
	);
}

#[test]
fn flattened_map_round_trips_through_the_codec() {
	let map = TraceMap::from_json(nested_sectioned_json(), None).unwrap();
	let encoded = map.encoded_mappings().unwrap().to_string();

	let reparsed = TraceMap::new(
		SourceMapInput::Map(map.encoded_map().unwrap()),
		None,
	)
	.unwrap();
	assert_eq!(reparsed.encoded_mappings().unwrap(), encoded);
	assert_eq!(reparsed.decoded_mappings().unwrap(), map.decoded_mappings().unwrap());
}

#[test]
fn sectioned_map_supports_position_queries() {
	let map = TraceMap::from_json(nested_sectioned_json(), None).unwrap();
	let position = map
		.original_position_for(twine_map_trace::GeneratedNeedle::new(2, 2))
		.unwrap()
		.unwrap();
	assert_eq!(position.source, "first.js");
	assert_eq!(position.line, 1);
	assert_eq!(position.column, 0);
	assert_eq!(position.name.as_deref(), Some("a"));
}
