use logos::Logos;
use snailquote::unescape;

use crate::GinkoError;
use crate::GinkoResult;
use crate::Properties;
use crate::PropertyValue;

/// Raw tokens produced by logos for a property list such as
/// `(id="intro" collapsed, step=2)`.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
	#[token("(")]
	ParenOpen,
	#[token(")")]
	ParenClose,
	#[token("{")]
	BraceOpen,
	#[token("}")]
	BraceClose,
	#[token("=")]
	Equals,
	#[token(",")]
	Comma,
	#[regex(r"[ \t\r]+")]
	Whitespace,
	#[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*")]
	Ident,
	#[regex(r"[0-9]+(\.[0-9]+)?")]
	Number,
	#[regex(r#""([^"\\]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'[^']*'")]
	SingleQuotedString,
}

/// Which part of an entry the walker expects next.
enum ListContext {
	/// Before a key, or between entries.
	Key,
	/// After a key: `=`, a separator or the closing bracket may follow.
	AfterKey(String),
	/// After `key=`: only a value may follow.
	Value(String),
}

/// Walks the logos token stream of one property list.
struct PropertyWalker<'a> {
	source: &'a str,
	raw_tokens: Vec<(Result<RawToken, ()>, std::ops::Range<usize>)>,
	cursor: usize,
	line: usize,
	closing: RawToken,
	properties: Properties,
}

impl<'a> PropertyWalker<'a> {
	fn new(source: &'a str, line: usize, closing: RawToken) -> Self {
		let raw_tokens = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			line,
			closing,
			properties: Properties::new(),
		}
	}

	fn current_slice(&self) -> &'a str {
		let (_, span) = &self.raw_tokens[self.cursor];
		&self.source[span.clone()]
	}

	fn malformed(&self, reason: impl Into<String>) -> GinkoError {
		GinkoError::MalformedProperties {
			line: self.line,
			reason: reason.into(),
		}
	}

	/// Turn a quoted token into its value. Double quoted strings are
	/// unescaped, single quoted strings are taken literally.
	fn string_value(&self, raw: RawToken) -> GinkoResult<String> {
		let slice = self.current_slice();
		let inner = &slice[1..slice.len() - 1];

		if raw == RawToken::SingleQuotedString || !inner.contains('\\') {
			return Ok(inner.to_string());
		}

		unescape(slice).map_err(|e| self.malformed(format!("invalid escape in {slice}: {e}")))
	}

	/// Consume tokens up to and including the closing bracket. Returns the
	/// byte offset just past it.
	fn process(&mut self) -> GinkoResult<usize> {
		let mut context = ListContext::Key;

		while self.cursor < self.raw_tokens.len() {
			let (result, span) = self.raw_tokens[self.cursor].clone();
			let Ok(raw) = result else {
				return Err(self.malformed(format!(
					"unexpected `{}`",
					&self.source[span.clone()]
				)));
			};

			if raw == RawToken::Whitespace {
				self.cursor += 1;
				continue;
			}

			context = match context {
				ListContext::Key => {
					match raw {
						RawToken::Ident => ListContext::AfterKey(self.current_slice().to_string()),
						RawToken::Comma => ListContext::Key,
						closing if closing == self.closing => return Ok(span.end),
						_ => {
							return Err(self.malformed(format!(
								"expected a property name, found `{}`",
								self.current_slice()
							)));
						}
					}
				}
				ListContext::AfterKey(key) => {
					match raw {
						RawToken::Equals => ListContext::Value(key),
						RawToken::Comma => {
							self.properties.set(key, true);
							ListContext::Key
						}
						RawToken::Ident => {
							self.properties.set(key, true);
							ListContext::AfterKey(self.current_slice().to_string())
						}
						closing if closing == self.closing => {
							self.properties.set(key, true);
							return Ok(span.end);
						}
						_ => {
							return Err(self.malformed(format!(
								"unexpected `{}` after `{key}`",
								self.current_slice()
							)));
						}
					}
				}
				ListContext::Value(key) => {
					let value = match raw {
						RawToken::DoubleQuotedString | RawToken::SingleQuotedString => {
							PropertyValue::String(self.string_value(raw)?)
						}
						RawToken::Ident if self.current_slice() == "true" => {
							PropertyValue::Bool(true)
						}
						RawToken::Ident if self.current_slice() == "false" => {
							PropertyValue::Bool(false)
						}
						RawToken::Ident | RawToken::Number => {
							PropertyValue::String(self.current_slice().to_string())
						}
						_ => return Err(self.malformed(format!("missing value for `{key}`"))),
					};
					self.properties.set(key, value);
					ListContext::Key
				}
			};

			self.cursor += 1;
		}

		Err(self.malformed("property list is never closed"))
	}
}

/// Read a property list starting at the opening `(` or `{` of `source`.
///
/// Returns the properties and the number of bytes consumed, closing bracket
/// included. Anything after the closing bracket is left for the caller.
pub(crate) fn lex_properties(source: &str, line: usize) -> GinkoResult<(Properties, usize)> {
	let closing = match source.as_bytes().first() {
		Some(b'(') => RawToken::ParenClose,
		Some(b'{') => RawToken::BraceClose,
		_ => {
			return Err(GinkoError::MalformedProperties {
				line,
				reason: "property list must start with `(` or `{`".to_string(),
			});
		}
	};

	let mut walker = PropertyWalker::new(&source[1..], line, closing);
	let consumed = walker.process()?;

	Ok((walker.properties, consumed + 1))
}
