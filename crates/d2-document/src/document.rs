use std::{
	borrow::Cow,
	fmt::{self, Write},
};

use indexmap::IndexMap;

use crate::path::{parse_path, PathError};

const INDENT: &str = "  ";

type Map = IndexMap<String, Node>;

#[derive(Debug, Default, Clone)]
struct Node {
	value: Option<String>,
	children: Map,
}

/// A D2 document built from `create`/`set` operations.
///
/// Keys keep the order in which they were first created, so issuing the same
/// sequence of operations always serializes to the same text.
#[derive(Debug, Default, Clone)]
pub struct Document {
	root: Map,
}

impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create the node at `path` (and any missing parents).
	///
	/// Creating a node that already exists is a no-op.
	pub fn create(&mut self, path: &str) -> Result<(), PathError> {
		self.node_mut(path).map(|_| ())
	}

	/// Set the scalar value of the node at `path`, creating it if needed.
	///
	/// An existing value is overwritten.
	pub fn set(&mut self, path: &str, value: impl Into<String>) -> Result<(), PathError> {
		self.node_mut(path)?.value = Some(value.into());
		Ok(())
	}

	pub fn contains(&self, path: &str) -> bool {
		self.node(path).is_some()
	}

	/// Scalar value stored at `path`, if any.
	pub fn value(&self, path: &str) -> Option<&str> {
		self.node(path)?.value.as_deref()
	}

	pub fn is_empty(&self) -> bool {
		self.root.is_empty()
	}

	/// Serialize the document to D2 text.
	pub fn format(&self) -> String {
		self.to_string()
	}

	fn node_mut(&mut self, path: &str) -> Result<&mut Node, PathError> {
		let segments = parse_path(path)?;
		let (last, parents) = segments.split_last().ok_or(PathError::Empty)?;

		let mut map = &mut self.root;
		for segment in parents {
			map = &mut map.entry(segment.clone()).or_default().children;
		}
		Ok(map.entry(last.clone()).or_default())
	}

	fn node(&self, path: &str) -> Option<&Node> {
		let segments = parse_path(path).ok()?;
		let (last, parents) = segments.split_last()?;

		let mut map = &self.root;
		for segment in parents {
			map = &map.get(segment)?.children;
		}
		map.get(last)
	}
}

impl fmt::Display for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_map(f, &self.root, 0)
	}
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &Map, depth: usize) -> fmt::Result {
	for (key, node) in map {
		for _ in 0..depth {
			f.write_str(INDENT)?;
		}
		f.write_str(&quote(key))?;
		if let Some(value) = &node.value {
			write!(f, ": {}", quote(value))?;
		}
		if !node.children.is_empty() {
			f.write_str(if node.value.is_some() { " {" } else { ": {" })?;
			f.write_char('\n')?;
			write_map(f, &node.children, depth + 1)?;
			for _ in 0..depth {
				f.write_str(INDENT)?;
			}
			f.write_char('}')?;
		}
		f.write_char('\n')?;
	}
	Ok(())
}

/// Render a key or scalar the way D2 expects it.
///
/// Plain identifiers (ASCII alphanumerics, `-`, `_`) are left bare, everything
/// else is double-quoted with escapes.
pub fn quote(s: &str) -> Cow<'_, str> {
	let bare = !s.is_empty()
		&& s
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
	if bare {
		return Cow::Borrowed(s);
	}

	let mut out = String::with_capacity(s.len() + 2);
	out.push('"');
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			c => out.push(c),
		}
	}
	out.push('"');
	Cow::Owned(out)
}
