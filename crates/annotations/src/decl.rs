//! Doc-comment / declaration pairing.

use crate::doc::DocBlock;
use crate::error::AnnotationError;
use crate::lexer::{Lexer, Token, TokenKind};

/// How a declaration was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
	/// `;`: a member or variable declaration.
	Semicolon,
	/// `{`: the opening of a type definition.
	Brace,
}

/// A documentation comment immediately followed by a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
	pub doc: DocBlock,
	/// Type tokens joined by single spaces (`uint8_t`, `struct Foo`, `char*`).
	pub ty: String,
	pub symbol: String,
	/// Array suffix as written (`[EPS_MAX_UART_FRAME_LENGTH]`).
	pub array: Option<String>,
	pub terminator: Terminator,
	/// Brace depth the declaration appears at, relative to the scanned text.
	pub depth: usize,
	/// Line of the declaration's first token.
	pub line: usize,
}

/// Lazy iterator over the doc-comment / declaration pairs of a text.
///
/// Created by [`declarations`]. Stops after the first error.
pub struct Declarations<'a> {
	lexer: Lexer<'a>,
	pending: Option<Token>,
	depth: usize,
}

/// Scans `text` for documentation comments immediately followed by a
/// declaration terminated by `;` or `{`.
pub fn declarations(text: &str) -> Declarations<'_> {
	declarations_at(text, 1)
}

/// Like [`declarations`], numbering the first line of `text` as `line`.
pub fn declarations_at(text: &str, line: usize) -> Declarations<'_> {
	Declarations {
		lexer: Lexer::with_line(text, line),
		pending: None,
		depth: 0,
	}
}

enum Candidate {
	Found(Declaration),
	/// The tokens after the doc comment were not a declaration.
	Rejected,
}

impl Declarations<'_> {
	fn next_token(&mut self) -> Option<Result<Token, AnnotationError>> {
		if let Some(token) = self.pending.take() {
			return Some(Ok(token));
		}
		let token = self.lexer.next()?;
		if let Ok(token) = &token {
			if token.is_punct('{') {
				self.depth += 1;
			} else if token.is_punct('}') {
				self.depth = self.depth.saturating_sub(1);
			}
		}
		Some(token)
	}

	/// Collects the tokens following a doc comment up to the terminator.
	fn candidate(&mut self, doc: DocBlock) -> Result<Candidate, AnnotationError> {
		let depth = self.depth;
		let mut tokens = Vec::new();
		let mut nesting = 0usize;

		let terminator = loop {
			let Some(token) = self.next_token().transpose()? else {
				return Ok(Candidate::Rejected);
			};
			match &token.kind {
				TokenKind::Comment(_) => continue,
				TokenKind::DocComment(_) | TokenKind::Directive(_) => {
					self.pending = Some(token);
					return Ok(Candidate::Rejected);
				}
				TokenKind::Punct('[' | '(') => nesting += 1,
				TokenKind::Punct(']' | ')') => nesting = nesting.saturating_sub(1),
				TokenKind::Punct(';') if nesting == 0 => break Terminator::Semicolon,
				TokenKind::Punct('{') if nesting == 0 => break Terminator::Brace,
				TokenKind::Punct('}') if nesting == 0 => return Ok(Candidate::Rejected),
				_ => {}
			}
			tokens.push(token);
		};

		let line = tokens.first().map_or(0, |t| t.line);
		Ok(match split_declaration(&tokens) {
			Some((ty, symbol, array)) => Candidate::Found(Declaration {
				doc,
				ty,
				symbol,
				array,
				terminator,
				depth,
				line,
			}),
			None => Candidate::Rejected,
		})
	}
}

impl Iterator for Declarations<'_> {
	type Item = Result<Declaration, AnnotationError>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let token = match self.next_token()? {
				Ok(token) => token,
				Err(e) => return Some(Err(e)),
			};
			let TokenKind::DocComment(body) = &token.kind else {
				continue;
			};
			let doc = match DocBlock::parse(body, token.line) {
				Ok(doc) => doc,
				Err(e) => return Some(Err(e)),
			};
			match self.candidate(doc) {
				Ok(Candidate::Found(decl)) => return Some(Ok(decl)),
				Ok(Candidate::Rejected) => continue,
				Err(e) => return Some(Err(e)),
			}
		}
	}
}

/// Splits declaration tokens into `(type, symbol, array suffix)`.
///
/// Accepts `ident+ ("*" | ident)* ident ("[" ... "]")*`; anything else, such
/// as a function prototype or an initialiser, is not a declaration.
fn split_declaration(tokens: &[Token]) -> Option<(String, String, Option<String>)> {
	let cut = tokens.iter().position(|t| t.is_punct('[')).unwrap_or(tokens.len());
	let (head, tail) = tokens.split_at(cut);

	let (symbol_token, type_tokens) = head.split_last()?;
	let symbol = symbol_token.ident()?;
	if type_tokens.is_empty() {
		return None;
	}

	let mut ty = String::new();
	for token in type_tokens {
		match &token.kind {
			TokenKind::Ident(name) => {
				if !ty.is_empty() {
					ty.push(' ');
				}
				ty.push_str(name);
			}
			TokenKind::Punct('*') => ty.push('*'),
			_ => return None,
		}
	}

	let array = if tail.is_empty() {
		None
	} else {
		let mut text = String::new();
		for token in tail {
			match &token.kind {
				TokenKind::Punct(ch @ ('[' | ']' | '+' | '-' | '*' | '/' | '(' | ')')) => text.push(*ch),
				TokenKind::Ident(name) | TokenKind::Number(name) => text.push_str(name),
				_ => return None,
			}
		}
		Some(text)
	};

	Some((ty, symbol.to_string(), array))
}

/// Returns the `;`-terminated declarations at the top level of a struct
/// body. Declarations inside nested braces are not members of this body.
pub fn member_declarations(body: &str, line: usize) -> Result<Vec<Declaration>, AnnotationError> {
	let mut members = Vec::new();
	for decl in declarations_at(body, line) {
		let decl = decl?;
		if decl.depth == 0 && decl.terminator == Terminator::Semicolon {
			members.push(decl);
		}
	}
	Ok(members)
}
