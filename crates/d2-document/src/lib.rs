//! Write-mostly model of a [D2](https://d2lang.com) diagram.
//!
//! A [`Document`] is built by issuing `create`/`set` operations against dotted
//! key paths, and is then serialized to D2 text with [`Document::format`].

mod document;
mod path;

pub use document::{quote, Document};
pub use path::{parse_path, PathError};
