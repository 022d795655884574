//! Tokenizer for annotated C-like definition files.
//!
//! Only the lexical shapes the annotation grammar needs are distinguished:
//! comments (documentation or plain), identifiers, numeric literals, quoted
//! literals, single punctuation characters, and whole preprocessor lines.

use std::ops::Range;

use crate::error::AnnotationError;

/// Lexical token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
	/// Body of a `/** ... */` comment, without the delimiters.
	DocComment(String),
	/// Body of a `/* ... */` or `// ...` comment.
	Comment(String),
	Ident(String),
	/// Numeric literal text as written (`10`, `0x22`, `1u`).
	Number(String),
	/// Quoted literal contents, without the quotes.
	Str(String),
	Punct(char),
	/// A preprocessor line after the `#`, trimmed, with comments removed and
	/// continuation lines joined.
	Directive(String),
}

/// A token with its starting line (1-based) and byte span in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	pub line: usize,
	pub span: Range<usize>,
}

impl Token {
	pub fn is_punct(&self, ch: char) -> bool {
		self.kind == TokenKind::Punct(ch)
	}

	pub fn ident(&self) -> Option<&str> {
		match &self.kind {
			TokenKind::Ident(name) => Some(name),
			_ => None,
		}
	}

	pub fn is_comment(&self) -> bool {
		matches!(self.kind, TokenKind::Comment(_) | TokenKind::DocComment(_))
	}
}

/// Streaming tokenizer. Yields `Err` once on malformed input and then stops.
pub struct Lexer<'a> {
	input: &'a str,
	rest: &'a str,
	line: usize,
	failed: bool,
}

impl<'a> Lexer<'a> {
	pub fn new(input: &'a str) -> Self {
		Self::with_line(input, 1)
	}

	/// Creates a lexer whose first line is numbered `line`, for scanning a
	/// slice cut out of a larger file.
	pub fn with_line(input: &'a str, line: usize) -> Self {
		Self {
			input,
			rest: input,
			line,
			failed: false,
		}
	}

	fn offset(&self) -> usize {
		self.input.len() - self.rest.len()
	}

	fn peek(&self) -> Option<char> {
		self.rest.chars().next()
	}

	fn peek_at(&self, n: usize) -> Option<char> {
		self.rest.chars().nth(n)
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.rest = &self.rest[ch.len_utf8()..];
		if ch == '\n' {
			self.line += 1;
		}
		Some(ch)
	}

	fn advance(&mut self, len: usize) -> &'a str {
		let (taken, rest) = self.rest.split_at(len);
		self.line += taken.matches('\n').count();
		self.rest = rest;
		taken
	}

	fn take_while<F>(&mut self, predicate: F) -> &'a str
	where
		F: Fn(char) -> bool,
	{
		let end = self.rest.char_indices().find(|&(_, ch)| !predicate(ch)).map_or(self.rest.len(), |(i, _)| i);
		self.advance(end)
	}

	/// Consumes a block comment whose `/*` has already been consumed.
	fn block_comment(&mut self, start_line: usize) -> Result<&'a str, AnnotationError> {
		let Some(end) = self.rest.find("*/") else {
			return Err(AnnotationError::Unterminated {
				what: "comment",
				line: start_line,
			});
		};
		let body = self.advance(end);
		self.advance(2);
		Ok(body)
	}

	fn quoted(&mut self, quote: char, start_line: usize) -> Result<String, AnnotationError> {
		let mut out = String::new();
		loop {
			match self.bump() {
				Some('\\') => {
					if let Some(escaped) = self.bump() {
						out.push('\\');
						out.push(escaped);
					}
				}
				Some(ch) if ch == quote => return Ok(out),
				Some('\n') | None => {
					return Err(AnnotationError::Unterminated {
						what: "literal",
						line: start_line,
					});
				}
				Some(ch) => out.push(ch),
			}
		}
	}

	/// Consumes a preprocessor line whose `#` has already been consumed.
	fn directive(&mut self, start_line: usize) -> Result<String, AnnotationError> {
		let mut out = String::new();
		loop {
			match self.peek() {
				None | Some('\n') => break,
				Some('\\') if matches!(self.peek_at(1), Some('\n')) => {
					self.advance(2);
					out.push(' ');
				}
				Some('\\') if self.rest.starts_with("\\\r\n") => {
					self.advance(3);
					out.push(' ');
				}
				Some('/') if self.peek_at(1) == Some('*') => {
					self.advance(2);
					self.block_comment(start_line)?;
					out.push(' ');
				}
				Some('/') if self.peek_at(1) == Some('/') => {
					self.take_while(|ch| ch != '\n');
				}
				Some(quote @ ('"' | '\'')) => {
					self.bump();
					let text = self.quoted(quote, self.line)?;
					out.push(quote);
					out.push_str(&text);
					out.push(quote);
				}
				Some(ch) => {
					self.bump();
					out.push(ch);
				}
			}
		}
		Ok(out.trim().to_string())
	}

	fn scan(&mut self) -> Option<Result<Token, AnnotationError>> {
		self.take_while(char::is_whitespace);
		let start = self.offset();
		let line = self.line;
		let ch = self.peek()?;

		let kind = match ch {
			'/' if self.peek_at(1) == Some('*') => {
				self.advance(2);
				let is_doc = self.peek() == Some('*') && self.peek_at(1) != Some('/');
				if is_doc {
					self.bump();
				}
				match self.block_comment(line) {
					Ok(body) if is_doc => TokenKind::DocComment(body.to_string()),
					Ok(body) => TokenKind::Comment(body.to_string()),
					Err(e) => return Some(Err(e)),
				}
			}
			'/' if self.peek_at(1) == Some('/') => {
				self.advance(2);
				TokenKind::Comment(self.take_while(|ch| ch != '\n').to_string())
			}
			'#' => {
				self.bump();
				match self.directive(line) {
					Ok(text) => TokenKind::Directive(text),
					Err(e) => return Some(Err(e)),
				}
			}
			'"' | '\'' => {
				self.bump();
				match self.quoted(ch, line) {
					Ok(text) => TokenKind::Str(text),
					Err(e) => return Some(Err(e)),
				}
			}
			ch if ch.is_ascii_digit() => {
				TokenKind::Number(self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '.').to_string())
			}
			ch if ch.is_alphabetic() || ch == '_' => {
				TokenKind::Ident(self.take_while(|ch| ch.is_alphanumeric() || ch == '_').to_string())
			}
			_ => {
				self.bump();
				TokenKind::Punct(ch)
			}
		};

		Some(Ok(Token {
			kind,
			line,
			span: start..self.offset(),
		}))
	}
}

impl Iterator for Lexer<'_> {
	type Item = Result<Token, AnnotationError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed {
			return None;
		}
		let item = self.scan();
		if matches!(item, Some(Err(_))) {
			self.failed = true;
		}
		item
	}
}

/// Tokenizes the whole input eagerly.
pub fn tokenize(input: &str) -> Result<Vec<Token>, AnnotationError> {
	Lexer::new(input).collect()
}

/// Parses a C integer literal: decimal or `0x` hex, with optional `u`/`l`
/// suffixes.
pub fn parse_int_literal(text: &str) -> Option<u32> {
	let text = text.trim().trim_end_matches(['u', 'U', 'l', 'L']);
	if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
		u32::from_str_radix(hex, 16).ok()
	} else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
		text.parse().ok()
	} else {
		None
	}
}
