//! File-level extraction: header version, includes, struct bodies and macro
//! definitions.

use crate::decl::{Declaration, member_declarations};
use crate::doc::DocBlock;
use crate::error::AnnotationError;
use crate::lexer::{Lexer, Token, TokenKind, tokenize};

/// Returns the `@version` of the file's leading documentation comment.
///
/// Only the first doc comment is consulted; a version tag further down the
/// file does not count.
pub fn header_version(text: &str) -> Result<String, AnnotationError> {
	for token in Lexer::new(text) {
		let token = token?;
		if let TokenKind::DocComment(body) = &token.kind {
			return DocBlock::parse(body, token.line)?.version.ok_or(AnnotationError::MissingVersion);
		}
	}
	Err(AnnotationError::MissingVersion)
}

/// Returns every quoted `#include "path"` in source order, without repeats.
pub fn includes(text: &str) -> Result<Vec<String>, AnnotationError> {
	let mut paths: Vec<String> = Vec::new();
	for token in tokenize(text)? {
		let TokenKind::Directive(directive) = &token.kind else {
			continue;
		};
		let Some(rest) = directive.strip_prefix("include") else {
			continue;
		};
		let Some(quoted) = rest.trim().strip_prefix('"') else {
			continue;
		};
		if let Some((path, _)) = quoted.split_once('"')
			&& !paths.iter().any(|p| p == path)
		{
			paths.push(path.to_string());
		}
	}
	Ok(paths)
}

/// A struct definition found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
	/// Type name: the typedef name, or the tag of a plain `struct Tag { }`.
	pub name: String,
	pub tag: Option<String>,
	/// Text between the braces.
	pub body: String,
	/// Line the opening brace is on.
	pub line: usize,
}

impl StructDef {
	/// Returns the annotated member declarations of this struct.
	///
	/// A struct expected to hold members but yielding none signals malformed
	/// or refactored input and is an error.
	pub fn members(&self) -> Result<Vec<Declaration>, AnnotationError> {
		let members = member_declarations(&self.body, self.line)?;
		if members.is_empty() {
			return Err(AnnotationError::NoDeclarations {
				name: self.name.clone(),
				line: self.line,
			});
		}
		Ok(members)
	}
}

/// Returns every `typedef struct [tag] { ... } Name;` and `struct Tag { ... };`
/// definition in source order.
pub fn struct_bodies(text: &str) -> Result<Vec<StructDef>, AnnotationError> {
	let tokens: Vec<Token> = tokenize(text)?.into_iter().filter(|t| !t.is_comment()).collect();
	let mut defs = Vec::new();
	let mut i = 0;

	while i < tokens.len() {
		if tokens[i].ident() != Some("struct") {
			i += 1;
			continue;
		}
		let is_typedef = i > 0 && tokens[i - 1].ident() == Some("typedef");
		let mut j = i + 1;
		let tag = tokens.get(j).and_then(Token::ident).map(String::from);
		if tag.is_some() {
			j += 1;
		}
		let Some(open) = tokens.get(j).filter(|t| t.is_punct('{')) else {
			i += 1;
			continue;
		};

		let name_hint = tag.clone().unwrap_or_else(|| "<anonymous>".to_string());
		let close = matching_brace(&tokens, j).ok_or_else(|| AnnotationError::UnbalancedBraces {
			name: name_hint.clone(),
			line: open.line,
		})?;
		let body = text[open.span.end..tokens[close].span.start].to_string();

		let name = if is_typedef {
			tokens[close + 1..].iter().take_while(|t| !t.is_punct(';')).filter_map(Token::ident).last().map(String::from)
		} else {
			tag.clone()
		};

		if let Some(name) = name {
			defs.push(StructDef {
				name,
				tag,
				body,
				line: open.line,
			});
		}
		i = close + 1;
	}

	Ok(defs)
}

fn matching_brace(tokens: &[Token], open: usize) -> Option<usize> {
	let mut depth = 0usize;
	for (idx, token) in tokens.iter().enumerate().skip(open) {
		if token.is_punct('{') {
			depth += 1;
		} else if token.is_punct('}') {
			depth -= 1;
			if depth == 0 {
				return Some(idx);
			}
		}
	}
	None
}

/// A `#define` directive with the comment immediately preceding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Define {
	pub name: String,
	/// Replacement text, trimmed.
	pub body: String,
	/// Raw text of the preceding comment, documentation or plain.
	pub comment: Option<String>,
	/// Directives parsed from the preceding comment if it was a doc comment.
	pub doc: Option<DocBlock>,
	pub line: usize,
}

/// Returns every object-like `#define` in source order. Function-like macros
/// are skipped.
pub fn defines(text: &str) -> Result<Vec<Define>, AnnotationError> {
	let mut defines = Vec::new();
	let mut comment: Option<&Token> = None;
	let tokens = tokenize(text)?;

	for token in &tokens {
		match &token.kind {
			TokenKind::DocComment(_) | TokenKind::Comment(_) => comment = Some(token),
			TokenKind::Directive(directive) => {
				if let Some(define) = parse_define(directive, comment, token.line)? {
					defines.push(define);
				}
				comment = None;
			}
			_ => comment = None,
		}
	}

	Ok(defines)
}

fn parse_define(directive: &str, comment: Option<&Token>, line: usize) -> Result<Option<Define>, AnnotationError> {
	let Some(rest) = directive.strip_prefix("define") else {
		return Ok(None);
	};
	if !rest.starts_with(char::is_whitespace) {
		return Ok(None);
	}
	let rest = rest.trim_start();
	let name_len = rest.find(|ch: char| !(ch.is_alphanumeric() || ch == '_')).unwrap_or(rest.len());
	let (name, body) = rest.split_at(name_len);
	if name.is_empty() || body.starts_with('(') {
		return Ok(None);
	}

	let (comment, doc) = match comment.map(|t| (&t.kind, t.line)) {
		Some((TokenKind::DocComment(body), at)) => (Some(body.clone()), Some(DocBlock::parse(body, at)?)),
		Some((TokenKind::Comment(body), _)) => (Some(body.clone()), None),
		_ => (None, None),
	};

	Ok(Some(Define {
		name: name.to_string(),
		body: body.trim().to_string(),
		comment,
		doc,
		line,
	}))
}
