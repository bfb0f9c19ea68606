//! Text helpers shared by the rewrite rules for syntax Markdown does not know
//! about: `++answer++` markers, `![[wiki]]` images, `=>` feedback lines and
//! plain file outlines.

use std::sync::LazyLock;

use markdown::ParseOptions;
use markdown::mdast;
use markdown::to_mdast;
use regex::Regex;
use serde::Serialize;

use crate::GinkoError;
use crate::GinkoResult;
use crate::Node;
use crate::parser::split_inline_code;
use crate::serialize;

/// `++term++`
static HIGHLIGHT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\+\+(.+?)\+\+").unwrap_or_else(|e| panic!("{e}")));

/// `![[src|figure]]`
static WIKI_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^!\[\[([^\]|]+)(?:\|([^\]]*))?\]\]$").unwrap_or_else(|e| panic!("{e}"))
});

/// Parse `content` with the GitHub flavored Markdown constructs enabled.
pub fn markdown_tree(content: &str) -> GinkoResult<mdast::Node> {
	to_mdast(content, &ParseOptions::gfm()).map_err(|e| GinkoError::Markdown(e.to_string()))
}

/// Indentation of a line in columns. Tabs count as four.
pub fn indent_width(line: &str) -> usize {
	line.chars()
		.take_while(|c| *c == ' ' || *c == '\t')
		.map(|c| if c == '\t' { 4 } else { 1 })
		.sum()
}

/// The name on an outline line, without indentation or a `-`, `*` or `+`
/// bullet.
pub fn outline_entry(line: &str) -> &str {
	let body = line.trim();
	["- ", "* ", "+ "]
		.iter()
		.find_map(|bullet| body.strip_prefix(bullet))
		.unwrap_or(body)
		.trim()
}

/// Apply `f` to the prose of `text`, leaving inline code spans as written.
fn map_prose(text: &str, f: impl Fn(&str) -> String) -> String {
	split_inline_code(text)
		.iter()
		.map(|node| {
			match node {
				Node::Text { value } => f(value),
				other => serialize(other),
			}
		})
		.collect()
}

/// The terms wrapped in `++` markers, in order of appearance. Markers inside
/// inline code do not count.
pub fn highlights(text: &str) -> Vec<String> {
	split_inline_code(text)
		.iter()
		.filter_map(|node| {
			match node {
				Node::Text { value } => Some(value),
				_ => None,
			}
		})
		.flat_map(|value| {
			HIGHLIGHT
				.captures_iter(value)
				.filter_map(|captures| captures.get(1))
				.map(|term| term.as_str().trim().to_string())
				.collect::<Vec<_>>()
		})
		.filter(|term| !term.is_empty())
		.collect()
}

/// Replace every `++term++` with `replacement`.
pub fn replace_highlights(text: &str, replacement: &str) -> String {
	map_prose(text, |value| {
		HIGHLIGHT
			.replace_all(value, regex::NoExpand(replacement))
			.into_owned()
	})
}

/// Drop the `++` markers and keep the terms.
pub fn strip_highlights(text: &str) -> String {
	map_prose(text, |value| HIGHLIGHT.replace_all(value, "$1").into_owned())
}

/// An image reference found in a table cell or list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Figure {
	pub src: String,
	pub figure: String,
}

/// Decompose `![figure](src)` or `![[src|figure]]`. The whole text must be the
/// image.
pub fn image(text: &str) -> GinkoResult<Option<Figure>> {
	let text = text.trim();

	let tree = markdown_tree(text)?;
	if let [mdast::Node::Paragraph(paragraph)] = tree.children().map_or(&[][..], Vec::as_slice) {
		if let [mdast::Node::Image(image)] = paragraph.children.as_slice() {
			return Ok(Some(Figure {
				src: image.url.clone(),
				figure: image.alt.trim().to_string(),
			}));
		}
	}

	let Some(captures) = WIKI_IMAGE.captures(text) else {
		return Ok(None);
	};

	Ok(captures.get(1).map(|src| {
		Figure {
			src: src.as_str().trim().to_string(),
			figure: captures.get(2).map_or("", |m| m.as_str()).trim().to_string(),
		}
	}))
}

/// Feedback lines pulled out of a question body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
	/// `=> text`, shown when the answer is correct.
	pub correct: Option<String>,
	/// `=< text`, a hint.
	pub hint: Option<String>,
}

impl Feedback {
	/// Move `=>` and `=<` lines out of `text` into `self` and return the
	/// remaining lines. The first line of each kind wins; later ones are
	/// dropped.
	pub fn take_from(&mut self, text: &str) -> String {
		let mut kept = String::with_capacity(text.len());

		for line in text.split_inclusive('\n') {
			let trimmed = line.trim();
			if let Some(correct) = trimmed.strip_prefix("=>") {
				self.correct
					.get_or_insert_with(|| correct.trim().to_string());
			} else if let Some(hint) = trimmed.strip_prefix("=<") {
				self.hint.get_or_insert_with(|| hint.trim().to_string());
			} else {
				kept.push_str(line);
			}
		}

		kept
	}
}

/// Join lines and trim the result, keeping interior line breaks.
pub fn join_trimmed<S: AsRef<str>>(lines: &[S]) -> String {
	lines
		.iter()
		.map(AsRef::as_ref)
		.collect::<Vec<_>>()
		.join("\n")
		.trim()
		.to_string()
}

/// Push `value` unless an equal value is already present.
pub fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
	if !values.contains(&value) {
		values.push(value);
	}
}
