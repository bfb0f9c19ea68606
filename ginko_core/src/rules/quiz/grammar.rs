//! Per-kind question grammars.
//!
//! Each grammar returns `Ok(None)` when the body holds nothing to ask. The
//! question is then dropped with a warning.

use super::MatchPair;
use super::MatchSide;
use super::OrderItem;
use super::Pair;
use super::QuestionKind;
use super::QuestionSource;
use super::SelectOption;
use crate::GinkoResult;
use crate::Table;
use crate::body::Part;
use crate::body::Piece;
use crate::markup::highlights;
use crate::markup::image;
use crate::markup::push_unique;
use crate::markup::replace_highlights;
use crate::markup::strip_highlights;
use crate::serialize_nodes;

pub(crate) type Parsed = GinkoResult<Option<(String, QuestionKind)>>;

/// Replacement for every `++answer++` in blank and choose questions.
const BLANK: &str = "___";

/// The text of a heading or a prose line.
fn prose(piece: &Piece) -> Option<&str> {
	let text = match piece {
		Piece::Heading(text) | Piece::Line { text, .. } => text,
		_ => return None,
	};

	(!text.is_empty()).then_some(text.as_str())
}

/// The label, or else the first prose line of the body.
fn list_question(source: &QuestionSource<'_>) -> String {
	source
		.label
		.or_else(|| source.body.pieces().iter().find_map(prose))
		.unwrap_or_default()
		.to_string()
}

/// For questions whose body is the text itself: the label, or else the first
/// prose line without answer markers. Returns the question and the remaining
/// content.
fn text_question(source: &QuestionSource<'_>) -> (String, Vec<Part>) {
	if let Some(label) = source.label {
		return (label.to_string(), source.body.parts(None));
	}

	let found = source
		.body
		.pieces()
		.iter()
		.enumerate()
		.find_map(|(index, piece)| {
			prose(piece)
				.filter(|text| highlights(text).is_empty())
				.map(|text| (index, text))
		});

	match found {
		Some((index, text)) => (text.to_string(), source.body.parts(Some(index))),
		None => (String::new(), source.body.parts(None)),
	}
}

/// Every `++answer++` in the prose parts.
fn answers(parts: &[Part]) -> Vec<String> {
	parts
		.iter()
		.filter_map(|part| {
			match part {
				Part::Prose(text) => Some(highlights(text)),
				Part::Verbatim(_) => None,
			}
		})
		.flatten()
		.collect()
}

/// Join the parts back together with `f` applied to the prose.
fn render(parts: &[Part], f: impl Fn(&str) -> String) -> String {
	parts
		.iter()
		.map(|part| {
			match part {
				Part::Prose(text) => f(text),
				Part::Verbatim(text) => text.clone(),
			}
		})
		.collect::<String>()
		.trim()
		.to_string()
}

pub(crate) fn select(source: &QuestionSource<'_>) -> Parsed {
	let options: Vec<SelectOption> = source
		.body
		.items()
		.filter(|item| !item.text.is_empty())
		.filter_map(|item| {
			item.checked.map(|correct| {
				SelectOption {
					text: item.text.clone(),
					correct,
				}
			})
		})
		.collect();

	if options.is_empty() {
		return Ok(None);
	}

	Ok(Some((list_question(source), QuestionKind::Select { options })))
}

pub(crate) fn blank(source: &QuestionSource<'_>) -> Parsed {
	let (question, parts) = text_question(source);
	let answers = answers(&parts);

	if answers.is_empty() {
		return Ok(None);
	}

	let content = render(&parts, |text| replace_highlights(text, BLANK));
	Ok(Some((question, QuestionKind::Blank { content, answers })))
}

pub(crate) fn choose(source: &QuestionSource<'_>) -> Parsed {
	let (question, parts) = text_question(source);
	let answers = answers(&parts);

	if answers.is_empty() {
		return Ok(None);
	}

	let mut options = Vec::new();
	for option in source
		.properties
		.get_str("options")
		.unwrap_or_default()
		.split('|')
		.map(str::trim)
		.filter(|option| !option.is_empty())
	{
		push_unique(&mut options, option.to_string());
	}
	for answer in &answers {
		push_unique(&mut options, answer.clone());
	}

	let content = render(&parts, |text| replace_highlights(text, BLANK));
	Ok(Some((
		question,
		QuestionKind::Choose {
			content,
			options,
			answers,
		},
	)))
}

pub(crate) fn sort(source: &QuestionSource<'_>) -> Parsed {
	let items: Vec<String> = source
		.body
		.items()
		.map(|item| item.text.clone())
		.filter(|text| !text.is_empty())
		.collect();

	if items.is_empty() {
		return Ok(None);
	}

	Ok(Some((list_question(source), QuestionKind::Sort { items })))
}

pub(crate) fn match_pairs(source: &QuestionSource<'_>) -> Parsed {
	let (question, pairs) = match source.table {
		Some(table) => table_pairs(source, table)?,
		None => (list_question(source), bullet_pairs(source)?),
	};

	if pairs.is_empty() {
		return Ok(None);
	}

	Ok(Some((question, QuestionKind::Match { pairs })))
}

fn match_side(text: &str) -> GinkoResult<MatchSide> {
	Ok(image(text)?.map_or_else(|| MatchSide::Text(text.trim().to_string()), MatchSide::Figure))
}

/// The header row names the columns and the first data row asks the
/// question. Every row after it is one pair.
fn table_pairs(source: &QuestionSource<'_>, table: &Table) -> GinkoResult<(String, Vec<MatchPair>)> {
	let mut rows = table.rows.iter().map(|row| {
		row.cells
			.iter()
			.map(|cell| serialize_nodes(&cell.children).trim().to_string())
			.collect::<Vec<_>>()
	});

	let header = rows.next().unwrap_or_default();
	let asking = rows.next().unwrap_or_default();
	let first_cell = |cells: &[String]| cells.iter().find(|cell| !cell.is_empty()).cloned();
	let question = source
		.label
		.map(str::to_string)
		.or_else(|| first_cell(asking.as_slice()))
		.or_else(|| first_cell(header.as_slice()))
		.unwrap_or_default();

	let mut pairs = Vec::new();
	for cells in rows {
		let (Some(term), Some(definition)) = (cells.first(), cells.get(1)) else {
			continue;
		};
		if term.is_empty() || definition.is_empty() {
			continue;
		}

		push_unique(
			&mut pairs,
			MatchPair {
				term: match_side(term)?,
				definition: match_side(definition)?,
			},
		);
	}

	Ok((question, pairs))
}

/// `- term` with its definitions as nested bullets.
fn bullet_pairs(source: &QuestionSource<'_>) -> GinkoResult<Vec<MatchPair>> {
	let Some(top) = source.body.items().map(|item| item.indent).min() else {
		return Ok(Vec::new());
	};

	let mut pairs = Vec::new();
	let mut term: Option<&str> = None;

	for item in source.body.items() {
		if item.indent == top {
			term = Some(item.text.as_str()).filter(|text| !text.is_empty());
			continue;
		}

		let Some(term) = term else {
			continue;
		};
		if item.text.is_empty() {
			continue;
		}

		push_unique(
			&mut pairs,
			MatchPair {
				term: match_side(term)?,
				definition: match_side(&item.text)?,
			},
		);
	}

	Ok(pairs)
}

pub(crate) fn pair(source: &QuestionSource<'_>) -> Parsed {
	let mut pairs = Vec::new();

	for item in source.body.items() {
		let Some((left, right)) = item.text.split_once('|') else {
			continue;
		};
		let (left, right) = (left.trim(), right.trim());
		if left.is_empty() || right.is_empty() {
			continue;
		}

		push_unique(
			&mut pairs,
			Pair {
				left: left.to_string(),
				right: right.to_string(),
			},
		);
	}

	if pairs.is_empty() {
		return Ok(None);
	}

	Ok(Some((list_question(source), QuestionKind::Pair { pairs })))
}

pub(crate) fn order(source: &QuestionSource<'_>) -> Parsed {
	let items: Vec<OrderItem> = source
		.body
		.items()
		.filter(|item| !item.text.is_empty())
		.zip(1..)
		.map(|(item, index)| {
			OrderItem {
				text: item.text.clone(),
				position: item.number.unwrap_or(index),
			}
		})
		.collect();

	if items.is_empty() {
		return Ok(None);
	}

	Ok(Some((list_question(source), QuestionKind::Order { items })))
}

pub(crate) fn find(source: &QuestionSource<'_>) -> Parsed {
	let (question, parts) = text_question(source);
	let answers = answers(&parts);

	if answers.is_empty() {
		return Ok(None);
	}

	let content = render(&parts, strip_highlights);
	Ok(Some((question, QuestionKind::Find { content, answers })))
}
