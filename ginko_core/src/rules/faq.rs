use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::GinkoResult;
use crate::IdSource;
use crate::InlineBlock;
use crate::Node;
use crate::Properties;
use crate::Rule;
use crate::body::Body;
use crate::body::Piece;
use crate::markup::join_trimmed;
use crate::rules::is_block_named;

pub const FAQ_NAME: &str = "ginko-faq";

/// `::faq` → `:ginko-faq{items='[...]'}`.
///
/// Questions are either headings with the answer below them, or top level
/// bullets with the answer nested underneath:
///
/// ```text
/// ::faq
/// - Is it free?
///   - Yes.
/// ::
/// ```
pub struct FaqRule {
	ids: Arc<dyn IdSource>,
}

impl fmt::Debug for FaqRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FaqRule").field("ids", &self.ids).finish()
	}
}

impl FaqRule {
	pub fn new(ids: Arc<dyn IdSource>) -> Self {
		Self { ids }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqItem {
	pub id: String,
	pub question: String,
	pub answer: String,
}

impl Rule for FaqRule {
	fn name(&self) -> &'static str {
		"faq"
	}

	fn can_handle(&self, node: &Node) -> bool {
		is_block_named(node, &["faq"])
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		let body = Body::read(node.children())?;

		let pairs = if body
			.pieces()
			.iter()
			.any(|piece| matches!(piece, Piece::Heading(_)))
		{
			heading_sections(&body)
		} else {
			bullet_sections(&body)
		};

		let mut items = Vec::with_capacity(pairs.len());
		for (question, answer) in pairs {
			if question.is_empty() || answer.is_empty() {
				warn!(question = %question, "dropping faq item without a question or an answer");
				continue;
			}

			items.push(FaqItem {
				id: self.ids.next_id(),
				question,
				answer,
			});
		}

		let properties = Properties::new().with("items", serde_json::to_value(&items)?);
		Ok(InlineBlock::new(FAQ_NAME, properties).into())
	}
}

/// `## Question` followed by everything up to the next heading.
fn heading_sections(body: &Body) -> Vec<(String, String)> {
	let headings: Vec<(usize, &str)> = body
		.pieces()
		.iter()
		.enumerate()
		.filter_map(|(index, piece)| {
			match piece {
				Piece::Heading(title) => Some((index, title.as_str())),
				_ => None,
			}
		})
		.collect();

	headings
		.iter()
		.enumerate()
		.map(|(position, (index, title))| {
			let next = headings.get(position + 1).map(|(next, _)| *next);
			let answer = body.text_between(*index, next).trim().to_string();
			(title.to_string(), answer)
		})
		.collect()
}

/// Top level bullets are questions. Deeper bullets, lines indented past the
/// question and code or nested elements belong to the answer above them.
fn bullet_sections(body: &Body) -> Vec<(String, String)> {
	let top = body.items().map(|item| item.indent).min().unwrap_or(0);

	let mut sections = Vec::new();
	let mut current: Option<(String, Vec<&str>)> = None;

	for piece in body.pieces() {
		if let Piece::Item(item) = piece {
			if item.indent == top {
				if let Some((question, answer)) = current.take() {
					sections.push((question, join_trimmed(&answer)));
				}
				current = Some((item.text.clone(), Vec::new()));
				continue;
			}
		}

		let Some((_, answer)) = current.as_mut() else {
			continue;
		};

		match piece {
			Piece::Item(item) => answer.push(&item.text),
			Piece::Line { indent, text } if *indent > top => answer.push(text),
			Piece::Verbatim(text) => answer.push(text),
			Piece::Heading(_) | Piece::Line { .. } => {}
		}
	}

	if let Some((question, answer)) = current {
		sections.push((question, join_trimmed(&answer)));
	}

	sections
}
