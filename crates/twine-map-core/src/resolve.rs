// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! URL and path resolution for source names.
//!
//! Source maps reference their originals with anything from bare file names
//! to absolute URLs, joined against an optional `sourceRoot` and the map's
//! own URL. [`resolve`] implements standard relative-URL semantics over
//! that mix: scheme-qualified bases go through [`url::Url`]; scheme-less
//! paths (the common case) use a plain path normalizer, since a relative
//! base is not representable as a parsed URL.

use std::borrow::Cow;

use url::Url;

/// Remove the final path component of a URL or path, keeping the trailing
/// slash. A value without any slash strips to the empty string.
pub fn strip_filename(path: &str) -> &str {
	match path.rfind('/') {
		Some(index) => &path[..=index],
		None => "",
	}
}

/// Resolve `input` against `base`.
///
/// A non-empty base is treated as a directory: a missing trailing slash is
/// supplied before resolution.
pub fn resolve(input: &str, base: &str) -> String {
	let base = if !base.is_empty() && !base.ends_with('/') {
		Cow::Owned(format!("{base}/"))
	} else {
		Cow::Borrowed(base)
	};

	// Scheme-qualified input stands alone; the base is ignored.
	if has_scheme(input) {
		return match Url::parse(input) {
			Ok(url) => url.to_string(),
			Err(_) => input.to_string(),
		};
	}

	if has_scheme(&base) {
		if let Ok(base_url) = Url::parse(&base) {
			if let Ok(joined) = base_url.join(input) {
				return joined.to_string();
			}
		}
	}

	// Protocol-relative input keeps its own authority.
	if input.starts_with("//") {
		let (origin, path) = split_authority(input);
		return format!("{origin}{}", normalize_path(path));
	}

	if input.starts_with('/') {
		if base.starts_with("//") {
			let (origin, _) = split_authority(&base);
			return format!("{origin}{}", normalize_path(input));
		}
		return normalize_path(input);
	}

	if base.starts_with("//") {
		let (origin, base_path) = split_authority(&base);
		let merged = format!("{base_path}{input}");
		let merged = if merged.starts_with('/') {
			merged
		} else {
			format!("/{merged}")
		};
		return format!("{origin}{}", normalize_path(&merged));
	}

	let merged = format!("{base}{input}");
	normalize_path(&merged)
}

/// Whether the value starts with a URL scheme (`[a-z][a-z0-9+.-]*:`)
/// before any path separator.
fn has_scheme(value: &str) -> bool {
	let Some(colon) = value.find(':') else {
		return false;
	};
	if let Some(slash) = value.find('/') {
		if slash < colon {
			return false;
		}
	}
	let head = value[..colon].as_bytes();
	!head.is_empty()
		&& head[0].is_ascii_alphabetic()
		&& head
			.iter()
			.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// Split a protocol-relative URL into `//authority` and the path after it.
fn split_authority(url: &str) -> (&str, &str) {
	let rest = &url[2..];
	match rest.find('/') {
		Some(index) => url.split_at(2 + index),
		None => (url, ""),
	}
}

/// Collapse `.`/`..` segments and duplicate slashes.
///
/// Leading `..` segments survive for relative paths; an absolute path
/// cannot climb above its root. A trailing slash is preserved.
fn normalize_path(path: &str) -> String {
	if path.is_empty() {
		return String::new();
	}
	let absolute = path.starts_with('/');
	let mut parts: Vec<&str> = Vec::new();
	for piece in path.split('/') {
		match piece {
			"" | "." => {}
			".." => {
				if let Some(last) = parts.last() {
					if *last == ".." {
						parts.push("..");
					} else {
						parts.pop();
					}
				} else if !absolute {
					parts.push("..");
				}
			}
			piece => parts.push(piece),
		}
	}

	let mut out = String::new();
	if absolute {
		out.push('/');
	}
	out.push_str(&parts.join("/"));
	if path.ends_with('/') && !out.ends_with('/') {
		out.push('/');
	}
	out
}
