//! D2 diagram generation.
//!
//! [`layout`] decides what goes where and talks to the diagram engine only
//! through [`DiagramSink`]; [`render`] replays its [`plan`] into a
//! [`d2_document::Document`] and produces the final text.

pub mod layout;
mod sink;

use std::{
	fs, io,
	path::{Path, PathBuf},
};

use d2_document::{Document, PathError};
pub use layout::{build, plan};
pub use sink::{Command, DiagramSink};
use thiserror::Error;
use tracing::instrument;

use crate::workload::Aggregation;

#[derive(Debug, Error)]
pub enum DiagramError {
	#[error("invalid diagram path")]
	Path(#[from] PathError),

	#[error("failed to write diagram to {}", path.display())]
	Write {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// Build the diagram for `aggregation` and format it as D2 text.
pub fn render(aggregation: &Aggregation) -> Result<String, DiagramError> {
	let mut document = Document::new();
	for command in plan(aggregation) {
		command.apply(&mut document)?;
	}
	Ok(unwrap_class_lists(&document.format()))
}

/// Turn `"<[a; b]>"` back into a bare `[a; b]`.
fn unwrap_class_lists(text: &str) -> String {
	text.replace("\"<", "").replace(">\"", "")
}

/// Write diagram text to `path`, replacing any existing file.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn write_diagram(path: &Path, text: &str) -> Result<(), DiagramError> {
	fs::write(path, text).map_err(|source| DiagramError::Write {
		path: path.to_path_buf(),
		source,
	})
}
