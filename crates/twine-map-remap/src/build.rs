// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loader-driven construction of the source map tree.
//!
//! Every source of a map either has its own map (it was itself generated)
//! or is an original file. The caller's loader decides which, one source at
//! a time: returning a map descends a level, returning `None` terminates
//! that branch in an [`OriginalLeaf`]. Each child is a separately loaded
//! map, so the resulting structure is a DAG with no cycles to detect.

use tracing::debug;

use twine_map_core::SourceMapInput;
use twine_map_trace::TraceMap;

use crate::error::Result;

/// Mutable context handed to the loader per source.
#[derive(Debug)]
pub struct LoaderContext {
	/// Resolved name of the map that references this source.
	pub importer: String,
	/// Nesting depth; the root map's own sources are at depth 1.
	pub depth: usize,
	/// Source name, pre-resolved against the importer. The loader may
	/// rewrite it to rename the source in the output.
	pub source: String,
	/// Content the loader may supply for an original file. When left
	/// unset, the importing map's `sourcesContent` entry applies.
	pub content: Option<String>,
}

/// Synchronous supplier of child source maps.
///
/// Called exactly once per source per nesting level, in traversal order.
pub trait SourceMapLoader {
	/// The map that produced `source`, or `None` when `source` is an
	/// original file.
	fn load(&mut self, source: &str, ctx: &mut LoaderContext) -> Option<SourceMapInput>;
}

impl<F> SourceMapLoader for F
where
	F: FnMut(&str, &mut LoaderContext) -> Option<SourceMapInput>,
{
	fn load(&mut self, source: &str, ctx: &mut LoaderContext) -> Option<SourceMapInput> {
		self(source, ctx)
	}
}

/// A map in the chain plus one child per source.
pub(crate) struct MapNode {
	pub map: TraceMap,
	pub children: Vec<SourceNode>,
}

/// An original file at the end of a branch.
pub(crate) struct OriginalLeaf {
	pub filename: String,
	pub content: Option<String>,
}

pub(crate) enum SourceNode {
	Node(MapNode),
	Leaf(OriginalLeaf),
}

/// Recursively load the tree under `map`.
pub(crate) fn build_tree(
	map: TraceMap,
	loader: &mut dyn SourceMapLoader,
	importer: &str,
	importer_depth: usize,
) -> Result<MapNode> {
	let depth = importer_depth + 1;
	let source_count = map.resolved_sources().len();
	let mut children = Vec::with_capacity(source_count);

	for i in 0..source_count {
		let mut ctx = LoaderContext {
			importer: importer.to_string(),
			depth,
			source: map.resolved_sources()[i].clone(),
			content: None,
		};
		let source_name = ctx.source.clone();
		let loaded = loader.load(&source_name, &mut ctx);
		let LoaderContext { source, content, .. } = ctx;

		match loaded {
			Some(input) => {
				debug!(source = %source, depth, "descending into child source map");
				let child = TraceMap::new(input, Some(&source))?;
				children.push(SourceNode::Node(build_tree(child, loader, &source, depth)?));
			}
			None => {
				debug!(source = %source, depth, "source is an original leaf");
				let content = content.or_else(|| {
					map.sources_content()
						.and_then(|contents| contents.get(i))
						.and_then(Clone::clone)
				});
				children.push(SourceNode::Leaf(OriginalLeaf {
					filename: source,
					content,
				}));
			}
		}
	}

	Ok(MapNode { map, children })
}

#[cfg(test)]
mod tests {
	use super::*;
	use twine_map_core::SourceMapV3;

	fn root_input() -> SourceMapInput {
		SourceMapInput::Map(SourceMapV3 {
			version: 3,
			file: Some("out.js".to_string()),
			source_root: None,
			sources: vec![Some("mid.js".to_string())],
			sources_content: Some(vec![Some("mid content".to_string())]),
			names: vec![],
			mappings: "AAAA".to_string(),
		})
	}

	#[test]
	fn test_loader_observes_importer_and_depth() {
		let root = TraceMap::new(root_input(), None).unwrap();
		let mut observed = Vec::new();
		let mut loader = |source: &str, ctx: &mut LoaderContext| {
			observed.push((source.to_string(), ctx.importer.clone(), ctx.depth));
			if source == "mid.js" {
				Some(SourceMapInput::Map(SourceMapV3 {
					version: 3,
					file: None,
					source_root: None,
					sources: vec![Some("original.js".to_string())],
					sources_content: None,
					names: vec![],
					mappings: "AAAA".to_string(),
				}))
			} else {
				None
			}
		};
		let tree = build_tree(root, &mut loader, "", 0).unwrap();

		assert_eq!(
			observed,
			vec![
				("mid.js".to_string(), String::new(), 1),
				("original.js".to_string(), "mid.js".to_string(), 2),
			]
		);
		let SourceNode::Node(mid) = &tree.children[0] else {
			panic!("expected a child map node");
		};
		assert!(matches!(&mid.children[0], SourceNode::Leaf(leaf) if leaf.filename == "original.js"));
	}

	#[test]
	fn test_leaf_content_falls_back_to_sources_content() {
		let root = TraceMap::new(root_input(), None).unwrap();
		let mut loader = |_: &str, _: &mut LoaderContext| None;
		let tree = build_tree(root, &mut loader, "", 0).unwrap();
		let SourceNode::Leaf(leaf) = &tree.children[0] else {
			panic!("expected a leaf");
		};
		assert_eq!(leaf.content.as_deref(), Some("mid content"));
	}

	#[test]
	fn test_loader_can_rewrite_source_and_supply_content() {
		let root = TraceMap::new(root_input(), None).unwrap();
		let mut loader = |_: &str, ctx: &mut LoaderContext| {
			ctx.source = "renamed.js".to_string();
			ctx.content = Some("supplied".to_string());
			None
		};
		let tree = build_tree(root, &mut loader, "", 0).unwrap();
		let SourceNode::Leaf(leaf) = &tree.children[0] else {
			panic!("expected a leaf");
		};
		assert_eq!(leaf.filename, "renamed.js");
		assert_eq!(leaf.content.as_deref(), Some("supplied"));
	}
}
