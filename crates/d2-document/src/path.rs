//! Dotted key paths, e.g. `table.default.Ng` or `table."with.dot"`.

use thiserror::Error;

/// Errors produced while parsing a key path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
	#[error("key path is empty")]
	Empty,

	#[error("key path `{0}` contains an empty segment")]
	EmptySegment(String),

	#[error("key path `{0}` has an unterminated quote")]
	UnterminatedQuote(String),

	#[error("key path `{0}` has characters after a closing quote")]
	TrailingAfterQuote(String),
}

/// Split a dotted key path into its segments.
///
/// Segments are separated by `.`. A segment wrapped in double quotes may
/// contain dots; inside quotes `\` escapes the next character.
pub fn parse_path(path: &str) -> Result<Vec<String>, PathError> {
	if path.is_empty() {
		return Err(PathError::Empty);
	}

	let mut segments = Vec::new();
	let mut chars = path.chars().peekable();

	loop {
		let mut segment = String::new();

		if chars.peek() == Some(&'"') {
			chars.next();
			let mut closed = false;
			while let Some(c) = chars.next() {
				match c {
					'"' => {
						closed = true;
						break;
					}
					'\\' => match chars.next() {
						Some(escaped) => segment.push(escaped),
						None => break,
					},
					c => segment.push(c),
				}
			}
			if !closed {
				return Err(PathError::UnterminatedQuote(path.to_owned()));
			}
			if !matches!(chars.peek(), None | Some('.')) {
				return Err(PathError::TrailingAfterQuote(path.to_owned()));
			}
		} else {
			while let Some(&c) = chars.peek() {
				if c == '.' {
					break;
				}
				segment.push(c);
				chars.next();
			}
		}

		if segment.is_empty() {
			return Err(PathError::EmptySegment(path.to_owned()));
		}
		segments.push(segment);

		// Either the separator or the end of input.
		if chars.next().is_none() {
			return Ok(segments);
		}
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn test_plain_segments() {
		assert_eq!(
			parse_path("classes.Deployment.style.fill").unwrap(),
			vec!["classes", "Deployment", "style", "fill"]
		);
	}

	#[test]
	fn test_single_segment() {
		assert_eq!(parse_path("table").unwrap(), vec!["table"]);
	}

	#[test]
	fn test_quoted_segment_keeps_dots() {
		assert_eq!(
			parse_path(r#"table."a.b".label"#).unwrap(),
			vec!["table", "a.b", "label"]
		);
	}

	#[test]
	fn test_quoted_segment_escapes() {
		assert_eq!(parse_path(r#""say \"hi\"""#).unwrap(), vec![r#"say "hi""#]);
	}

	#[test]
	fn test_errors() {
		assert_matches!(parse_path(""), Err(PathError::Empty));
		assert_matches!(parse_path("a..b"), Err(PathError::EmptySegment(_)));
		assert_matches!(parse_path("a."), Err(PathError::EmptySegment(_)));
		assert_matches!(parse_path(".a"), Err(PathError::EmptySegment(_)));
		assert_matches!(parse_path(r#"a."b"#), Err(PathError::UnterminatedQuote(_)));
		assert_matches!(parse_path(r#""a"b"#), Err(PathError::TrailingAfterQuote(_)));
		assert_matches!(parse_path(r#"a."""#), Err(PathError::EmptySegment(_)));
	}
}
