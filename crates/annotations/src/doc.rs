//! Directive extraction from documentation comment bodies.
//!
//! ```text
//! doc-block  = line*
//! line       = "*"* (directive | text | blank)
//! directive  = "@brief" text | "@dp" uint | "@dp_module" ident | "@version" text | "@" word text
//! ```
//!
//! `@brief` text continues over following non-blank, non-directive lines.
//! A tag may also start mid-line, after whitespace, and ends the text before
//! it. Unknown tags end a running `@brief` and are otherwise ignored.

use crate::error::AnnotationError;
use crate::lexer::parse_int_literal;

/// Directives collected from one documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
	/// `@brief` text with continuation lines joined by single spaces.
	pub brief: Option<String>,
	/// `@dp` local index.
	pub dp: Option<u32>,
	/// `@dp_module` module reference.
	pub dp_module: Option<String>,
	/// `@version` text.
	pub version: Option<String>,
}

impl DocBlock {
	/// Parses a comment body (the text between `/**` and `*/`) whose first
	/// line is line `line` of the file.
	pub fn parse(body: &str, line: usize) -> Result<Self, AnnotationError> {
		let mut doc = Self::default();
		let mut brief: Option<Vec<&str>> = None;

		for (offset, raw) in body.lines().enumerate() {
			let text = strip_decoration(raw);
			if text.is_empty() {
				if let Some(parts) = brief.take() {
					doc.brief = Some(parts.join(" "));
				}
				continue;
			}

			for segment in segments(text) {
				if !segment.starts_with('@') {
					if let Some(parts) = brief.as_mut() {
						parts.push(segment);
					}
					continue;
				}
				if let Some(parts) = brief.take() {
					doc.brief = Some(parts.join(" "));
				}
				let (tag, rest) = segment.split_once(char::is_whitespace).unwrap_or((segment, ""));
				let rest = rest.trim();
				match tag {
					"@brief" => brief = Some(if rest.is_empty() { Vec::new() } else { vec![rest] }),
					"@dp" => doc.dp = Some(parse_index(rest, line + offset)?),
					"@dp_module" => doc.dp_module = Some(parse_module_ref(rest, line + offset)?),
					"@version" => doc.version = Some(rest.to_string()),
					_ => {}
				}
			}
		}

		if let Some(parts) = brief {
			doc.brief = Some(parts.join(" "));
		}
		Ok(doc)
	}

	/// Returns `true` if the block carries neither DataPool directive.
	pub fn is_unannotated(&self) -> bool {
		self.dp.is_none() && self.dp_module.is_none()
	}
}

fn strip_decoration(line: &str) -> &str {
	line.trim().trim_start_matches('*').trim()
}

/// Splits a line before every `@tag` that starts a word, so directives
/// written inline (`@brief Init flag. @dp 1`) are seen separately.
fn segments(text: &str) -> Vec<&str> {
	let mut starts = vec![0];
	for (i, _) in text.match_indices('@') {
		let after_space = text[..i].ends_with(char::is_whitespace);
		let tag_follows = text[i + 1..].starts_with(|c: char| c.is_ascii_alphabetic());
		if i > 0 && after_space && tag_follows {
			starts.push(i);
		}
	}
	starts.push(text.len());
	starts
		.windows(2)
		.map(|w| text[w[0]..w[1]].trim())
		.filter(|s| !s.is_empty())
		.collect()
}

fn parse_index(rest: &str, line: usize) -> Result<u32, AnnotationError> {
	let word = rest.split_whitespace().next().unwrap_or("");
	parse_int_literal(word).ok_or_else(|| AnnotationError::InvalidDirective {
		tag: "dp",
		value: word.to_string(),
		line,
	})
}

fn parse_module_ref(rest: &str, line: usize) -> Result<String, AnnotationError> {
	let word = rest.split_whitespace().next().unwrap_or("");
	let valid = word.chars().next().is_some_and(|ch| ch.is_alphabetic() || ch == '_')
		&& word.chars().all(|ch| ch.is_alphanumeric() || ch == '_');
	if valid {
		Ok(word.to_string())
	} else {
		Err(AnnotationError::InvalidDirective {
			tag: "dp_module",
			value: word.to_string(),
			line,
		})
	}
}
