// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source Map v3 wire structures.
//!
//! The envelope carries the scalar metadata around the `mappings` payload.
//! Three shapes exist on the wire: the standard envelope with a VLQ-encoded
//! `mappings` string, the same envelope with decoded segment arrays (as
//! produced programmatically or by composition with decoded output), and
//! the sectioned index-map form that nests further maps at offsets.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::segment::SourceMapSegment;

/// Standard v3 envelope with VLQ-encoded mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapV3 {
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_root: Option<String>,
	pub sources: Vec<Option<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sources_content: Option<Vec<Option<String>>>,
	pub names: Vec<String>,
	pub mappings: String,
}

/// Standard v3 envelope with decoded mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedSourceMap {
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_root: Option<String>,
	pub sources: Vec<Option<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sources_content: Option<Vec<Option<String>>>,
	pub names: Vec<String>,
	pub mappings: Vec<Vec<SourceMapSegment>>,
}

/// 0-based position of a section within the composed generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOffset {
	pub line: u32,
	pub column: u32,
}

/// One entry of a sectioned map: a child map shifted to an offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
	pub offset: SectionOffset,
	pub map: SourceMapInput,
}

/// Sectioned ("index map") v3 envelope. Sections may nest recursively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionedSourceMap {
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	pub sections: Vec<Section>,
}

/// Any accepted source map input form.
///
/// Parsing JSON distinguishes the variants structurally: `sections` marks a
/// sectioned map, a string `mappings` the encoded envelope, and segment
/// arrays the decoded envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMapInput {
	Sectioned(SectionedSourceMap),
	Map(SourceMapV3),
	Decoded(DecodedSourceMap),
}

impl SourceMapInput {
	/// Parse a map from its JSON text.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// The envelope's version field.
	pub fn version(&self) -> u32 {
		match self {
			Self::Sectioned(map) => map.version,
			Self::Map(map) => map.version,
			Self::Decoded(map) => map.version,
		}
	}
}

impl From<SourceMapV3> for SourceMapInput {
	fn from(map: SourceMapV3) -> Self {
		Self::Map(map)
	}
}

impl From<DecodedSourceMap> for SourceMapInput {
	fn from(map: DecodedSourceMap) -> Self {
		Self::Decoded(map)
	}
}

impl From<SectionedSourceMap> for SourceMapInput {
	fn from(map: SectionedSourceMap) -> Self {
		Self::Sectioned(map)
	}
}

/// Reject any version other than 3.
pub fn validate_version(version: u32) -> Result<()> {
	if version != 3 {
		return Err(MapError::InvalidSourceMapVersion(version));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_standard_envelope() {
		let json = r#"{
			"version": 3,
			"file": "out.js",
			"sourceRoot": "",
			"sources": ["src/index.ts", null],
			"sourcesContent": ["let x = 1;\n", null],
			"names": ["x"],
			"mappings": "AAAA"
		}"#;
		let input = SourceMapInput::from_json(json).unwrap();
		let SourceMapInput::Map(map) = input else {
			panic!("expected the encoded envelope");
		};
		assert_eq!(map.version, 3);
		assert_eq!(map.file.as_deref(), Some("out.js"));
		assert_eq!(map.sources, vec![Some("src/index.ts".to_string()), None]);
		assert_eq!(map.names, vec!["x"]);
		assert_eq!(map.mappings, "AAAA");
	}

	#[test]
	fn test_parse_decoded_envelope() {
		let json = r#"{
			"version": 3,
			"sources": ["a.js"],
			"names": [],
			"mappings": [[[0, 0, 0, 0], [4]]]
		}"#;
		let input = SourceMapInput::from_json(json).unwrap();
		let SourceMapInput::Decoded(map) = input else {
			panic!("expected the decoded envelope");
		};
		assert_eq!(
			map.mappings,
			vec![vec![
				SourceMapSegment::mapped(0, 0, 0, 0),
				SourceMapSegment::generated(4),
			]]
		);
	}

	#[test]
	fn test_parse_sectioned_envelope() {
		let json = r#"{
			"version": 3,
			"file": "bundle.js",
			"sections": [
				{
					"offset": { "line": 0, "column": 0 },
					"map": { "version": 3, "sources": ["a.js"], "names": [], "mappings": "AAAA" }
				},
				{
					"offset": { "line": 4, "column": 0 },
					"map": { "version": 3, "sections": [] }
				}
			]
		}"#;
		let input = SourceMapInput::from_json(json).unwrap();
		let SourceMapInput::Sectioned(map) = input else {
			panic!("expected the sectioned envelope");
		};
		assert_eq!(map.sections.len(), 2);
		assert_eq!(map.sections[1].offset, SectionOffset { line: 4, column: 0 });
		assert!(matches!(map.sections[1].map, SourceMapInput::Sectioned(_)));
	}

	#[test]
	fn test_missing_optional_fields_default() {
		let json = r#"{"version": 3, "sources": [], "names": [], "mappings": ""}"#;
		let input = SourceMapInput::from_json(json).unwrap();
		let SourceMapInput::Map(map) = input else {
			panic!("expected the encoded envelope");
		};
		assert!(map.file.is_none());
		assert!(map.source_root.is_none());
		assert!(map.sources_content.is_none());
	}

	#[test]
	fn test_validate_version() {
		assert!(validate_version(3).is_ok());
		assert!(matches!(
			validate_version(2),
			Err(MapError::InvalidSourceMapVersion(2))
		));
	}

	#[test]
	fn test_envelope_serialization_roundtrip() {
		let map = DecodedSourceMap {
			version: 3,
			file: Some("out.js".to_string()),
			source_root: None,
			sources: vec![Some("a.js".to_string())],
			sources_content: Some(vec![None]),
			names: vec!["n".to_string()],
			mappings: vec![vec![SourceMapSegment::mapped(0, 0, 0, 0).with_name(0)]],
		};
		let json = serde_json::to_string(&map).unwrap();
		let parsed: DecodedSourceMap = serde_json::from_str(&json).unwrap();
		assert_eq!(map, parsed);
	}
}
