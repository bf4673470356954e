use std::convert::Infallible;

use d2_document::{Document, PathError};

/// A single diagram-building operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Create { path: String },
	Set { path: String, value: String },
}

impl Command {
	/// Replay this command against a sink.
	pub fn apply<S: DiagramSink>(&self, sink: &mut S) -> Result<(), S::Error> {
		match self {
			Command::Create { path } => sink.create(path),
			Command::Set { path, value } => sink.set(path, value),
		}
	}
}

/// The operations the layout needs from a diagram engine.
///
/// Paths are dotted D2 key paths; segments that are not plain identifiers
/// must be quoted.
pub trait DiagramSink {
	type Error;

	/// Create a node or container.
	fn create(&mut self, path: &str) -> Result<(), Self::Error>;

	/// Set a scalar property, creating the node if needed.
	fn set(&mut self, path: &str, value: &str) -> Result<(), Self::Error>;
}

impl DiagramSink for Document {
	type Error = PathError;

	fn create(&mut self, path: &str) -> Result<(), PathError> {
		Document::create(self, path)
	}

	fn set(&mut self, path: &str, value: &str) -> Result<(), PathError> {
		Document::set(self, path, value)
	}
}

/// Records the commands instead of executing them.
impl DiagramSink for Vec<Command> {
	type Error = Infallible;

	fn create(&mut self, path: &str) -> Result<(), Infallible> {
		self.push(Command::Create {
			path: path.to_string(),
		});
		Ok(())
	}

	fn set(&mut self, path: &str, value: &str) -> Result<(), Infallible> {
		self.push(Command::Set {
			path: path.to_string(),
			value: value.to_string(),
		});
		Ok(())
	}
}
