//! `::quiz` blocks.
//!
//! Every `--kind` item of a quiz block is one question. The item's label is
//! the question, its body holds the answers in a small per-kind grammar:
//!
//! ```text
//! ::quiz
//! --select Which are prime?
//! - [x] 2
//! - [ ] 4
//! => 2 is the only even prime.
//! --blank
//! The capital of France is ++Paris++.
//! ::
//! ```
//!
//! The block is replaced by `:ginko-quiz{questions='[...]'}`.

use serde::Serialize;
use tracing::warn;

use crate::DashElement;
use crate::GinkoResult;
use crate::InlineBlock;
use crate::Node;
use crate::Properties;
use crate::Rule;
use crate::Table;
use crate::body::Body;
use crate::config::DEFAULT_DIFFICULTY;
use crate::markup::Feedback;
use crate::markup::Figure;
use crate::rules::is_block_named;

mod grammar;

pub const QUIZ_NAME: &str = "ginko-quiz";

/// Question kinds understood inside a quiz block.
pub const QUESTION_KINDS: [&str; 8] = [
	"select", "blank", "choose", "sort", "match", "pair", "order", "find",
];

/// One question of a quiz, as serialized into the `questions` attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
	pub question: String,
	#[serde(flatten)]
	pub kind: QuestionKind,
	pub difficulty: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub feedback: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
	/// Pick every correct option.
	Select { options: Vec<SelectOption> },
	/// Type the missing words, shown as `___`.
	Blank {
		content: String,
		answers: Vec<String>,
	},
	/// Pick the missing words from a list.
	Choose {
		content: String,
		options: Vec<String>,
		answers: Vec<String>,
	},
	/// Put items into the order they were written in.
	Sort { items: Vec<String> },
	/// Connect each term to its definition.
	Match { pairs: Vec<MatchPair> },
	/// Connect left and right halves.
	Pair { pairs: Vec<Pair> },
	/// Give each item its position.
	Order { items: Vec<OrderItem> },
	/// Find the marked words in the text.
	Find {
		content: String,
		answers: Vec<String>,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
	pub text: String,
	pub correct: bool,
}

/// One side of a match pair: text, or an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MatchSide {
	Text(String),
	Figure(Figure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchPair {
	pub term: MatchSide,
	pub definition: MatchSide,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
	pub left: String,
	pub right: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
	pub text: String,
	pub position: u32,
}

/// What a grammar gets to look at for one question.
pub(crate) struct QuestionSource<'a> {
	pub label: Option<&'a str>,
	pub properties: &'a Properties,
	/// The body with feedback lines removed.
	pub body: Body,
	/// The first table of the body, if any.
	pub table: Option<&'a Table>,
}

/// `::quiz` → `:ginko-quiz{questions='[...]'}`.
#[derive(Debug, Clone)]
pub struct QuizRule {
	default_difficulty: String,
}

impl Default for QuizRule {
	fn default() -> Self {
		Self::new(DEFAULT_DIFFICULTY)
	}
}

impl QuizRule {
	pub fn new(default_difficulty: impl Into<String>) -> Self {
		Self {
			default_difficulty: default_difficulty.into(),
		}
	}

	fn question(&self, dash: &DashElement, quiz: &Properties) -> GinkoResult<Option<Question>> {
		if !QUESTION_KINDS.contains(&dash.name.as_str()) {
			warn!(kind = %dash.name, "skipping quiz question of unknown kind");
			return Ok(None);
		}

		let (body, Feedback { correct, hint }) = Body::read_question(&dash.children)?;
		let table = dash.children.iter().find_map(|child| {
			match child {
				Node::Table(table) => Some(table),
				_ => None,
			}
		});

		let source = QuestionSource {
			label: dash.non_empty_label(),
			properties: &dash.properties,
			body,
			table,
		};

		let parsed = match dash.name.as_str() {
			"select" => grammar::select(&source),
			"blank" => grammar::blank(&source),
			"choose" => grammar::choose(&source),
			"sort" => grammar::sort(&source),
			"match" => grammar::match_pairs(&source),
			"pair" => grammar::pair(&source),
			"order" => grammar::order(&source),
			_ => grammar::find(&source),
		};

		let Some((question, kind)) = parsed? else {
			warn!(kind = %dash.name, "dropping quiz question without answers");
			return Ok(None);
		};

		let difficulty = dash
			.properties
			.get_str("difficulty")
			.or_else(|| quiz.get_str("difficulty"))
			.unwrap_or(&self.default_difficulty)
			.to_string();

		Ok(Some(Question {
			question,
			kind,
			difficulty,
			feedback: correct,
			hint,
		}))
	}
}

impl Rule for QuizRule {
	fn name(&self) -> &'static str {
		"quiz"
	}

	fn can_handle(&self, node: &Node) -> bool {
		is_block_named(node, &["quiz"])
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		let Node::Block(block) = node else {
			return Ok(node);
		};

		let mut questions = Vec::new();
		for child in &block.children {
			if let Node::DashElement(dash) = child {
				if let Some(question) = self.question(dash, &block.properties)? {
					questions.push(question);
				}
			}
		}

		let properties = Properties::new().with("questions", serde_json::to_value(&questions)?);
		Ok(InlineBlock::new(QUIZ_NAME, properties).into())
	}
}
