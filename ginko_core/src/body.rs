//! The body of a block or dash element, read as Markdown.
//!
//! Runs of prose are parsed with the `markdown` crate and flattened into
//! [`Piece`]s: headings, list items and prose lines. Every other child node,
//! such as a code block, a table or a nested element, is never read as
//! Markdown. It becomes a single [`Piece::Verbatim`] holding its serialized
//! text.

use markdown::mdast;
use markdown::unist::Position;

use crate::GinkoResult;
use crate::Node;
use crate::markup::Feedback;
use crate::markup::indent_width;
use crate::markup::markdown_tree;
use crate::serialize;

#[derive(Debug, Clone)]
enum Segment {
	Markdown(String),
	Verbatim(String),
}

impl Segment {
	fn text(&self) -> &str {
		match self {
			Self::Markdown(text) | Self::Verbatim(text) => text,
		}
	}
}

/// Where a piece sits: a byte range of one segment.
#[derive(Debug, Clone, Copy)]
struct Span {
	segment: usize,
	start: usize,
	end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListItem {
	/// Indentation of the bullet in columns.
	pub indent: usize,
	/// The number of an ordered list item.
	pub number: Option<u32>,
	/// `Some` for a task list item, `- [ ]` or `- [x]`.
	pub checked: Option<bool>,
	/// The first line of the item without bullet or checkbox.
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece {
	Heading(String),
	Item(ListItem),
	/// A prose line that does not open a list item.
	Line { indent: usize, text: String },
	/// Text kept exactly as written.
	Verbatim(String),
}

/// A stretch of the body for questions that are written as running text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Part {
	/// Prose that may carry `++answer++` markers.
	Prose(String),
	/// Code, tables and nested elements.
	Verbatim(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Body {
	segments: Vec<Segment>,
	pieces: Vec<Piece>,
	spans: Vec<Span>,
}

impl Body {
	pub fn read(children: &[Node]) -> GinkoResult<Self> {
		Self::from_segments(segments(children))
	}

	/// Like [`Body::read`], with `=>` and `=<` lines taken out of the prose
	/// first.
	pub fn read_question(children: &[Node]) -> GinkoResult<(Self, Feedback)> {
		let mut feedback = Feedback::default();
		let segments: Vec<Segment> = segments(children)
			.into_iter()
			.map(|segment| {
				match segment {
					Segment::Markdown(text) => Segment::Markdown(feedback.take_from(&text)),
					verbatim @ Segment::Verbatim(_) => verbatim,
				}
			})
			.collect();

		Ok((Self::from_segments(segments)?, feedback))
	}

	fn from_segments(segments: Vec<Segment>) -> GinkoResult<Self> {
		let mut pieces = Vec::new();
		let mut spans = Vec::new();

		for (index, segment) in segments.iter().enumerate() {
			match segment {
				Segment::Verbatim(text) => {
					pieces.push(Piece::Verbatim(text.trim_end().to_string()));
					spans.push(Span {
						segment: index,
						start: 0,
						end: text.len(),
					});
				}
				Segment::Markdown(text) => {
					let tree = markdown_tree(text)?;
					let mut reader = Reader {
						source: text,
						segment: index,
						pieces: Vec::new(),
					};
					for node in tree.children().map_or(&[][..], Vec::as_slice) {
						reader.block(node);
					}
					for (piece, span) in reader.pieces {
						pieces.push(piece);
						spans.push(span);
					}
				}
			}
		}

		Ok(Self {
			segments,
			pieces,
			spans,
		})
	}

	pub fn pieces(&self) -> &[Piece] {
		&self.pieces
	}

	pub fn items(&self) -> impl Iterator<Item = &ListItem> {
		self.pieces.iter().filter_map(|piece| {
			match piece {
				Piece::Item(item) => Some(item),
				_ => None,
			}
		})
	}

	/// The text written after piece `after` and before piece `before`, or up
	/// to the end of the body when `before` is `None`.
	pub fn text_between(&self, after: usize, before: Option<usize>) -> String {
		let Some(from) = self.spans.get(after) else {
			return String::new();
		};
		let (last, stop) = match before.and_then(|index| self.spans.get(index)) {
			Some(span) => (span.segment, span.start),
			None => {
				let last = self.segments.len().saturating_sub(1);
				(last, self.segments.get(last).map_or(0, |s| s.text().len()))
			}
		};

		let mut text = String::new();
		for (index, segment) in self
			.segments
			.iter()
			.enumerate()
			.take(last + 1)
			.skip(from.segment)
		{
			let source = segment.text();
			let start = if index == from.segment { from.end } else { 0 };
			let end = if index == last { stop } else { source.len() };
			if start < end {
				text.push_str(&source[start..end]);
			}
		}

		text
	}

	/// The whole body split into prose and verbatim parts, leaving out the
	/// source line of piece `skip`.
	pub fn parts(&self, skip: Option<usize>) -> Vec<Part> {
		let skip = skip.and_then(|index| self.spans.get(index));

		self.segments
			.iter()
			.enumerate()
			.map(|(index, segment)| {
				match segment {
					Segment::Verbatim(text) => Part::Verbatim(text.clone()),
					Segment::Markdown(text) => {
						let mut text = text.clone();
						if let Some(span) = skip.filter(|span| span.segment == index) {
							let end = if text[span.end..].starts_with('\n') {
								span.end + 1
							} else {
								span.end
							};
							text.replace_range(span.start..end, "");
						}
						Part::Prose(text)
					}
				}
			})
			.collect()
	}
}

/// Split children into prose runs and opaque nodes. Text and inline code stay
/// together so inline code is read in place by the Markdown parser.
fn segments(children: &[Node]) -> Vec<Segment> {
	let mut segments = Vec::new();
	let mut prose = String::new();

	for child in children {
		match child {
			Node::Text { .. } | Node::InlineCode { .. } => prose.push_str(&serialize(child)),
			other => {
				if !prose.is_empty() {
					segments.push(Segment::Markdown(std::mem::take(&mut prose)));
				}
				let mut text = serialize(other);
				if !text.ends_with('\n') {
					text.push('\n');
				}
				segments.push(Segment::Verbatim(text));
			}
		}
	}

	if !prose.is_empty() {
		segments.push(Segment::Markdown(prose));
	}

	segments
}

/// Flattens the mdast of one prose segment.
struct Reader<'a> {
	source: &'a str,
	segment: usize,
	pieces: Vec<(Piece, Span)>,
}

impl Reader<'_> {
	fn push(&mut self, piece: Piece, start: usize, end: usize) {
		let span = Span {
			segment: self.segment,
			start,
			end,
		};
		self.pieces.push((piece, span));
	}

	/// Byte bounds of the line holding `offset`, without its line break.
	fn line_bounds(&self, offset: usize) -> (usize, usize) {
		let start = self.source[..offset].rfind('\n').map_or(0, |index| index + 1);
		let end = self.source[offset..]
			.find('\n')
			.map_or(self.source.len(), |index| offset + index);
		(start, end)
	}

	fn block(&mut self, node: &mdast::Node) {
		match node {
			mdast::Node::Heading(heading) => self.heading(heading),
			mdast::Node::List(list) => self.list(list),
			mdast::Node::Paragraph(paragraph) => self.lines(paragraph.position.as_ref(), 0),
			other => self.verbatim(other.position()),
		}
	}

	fn heading(&mut self, heading: &mdast::Heading) {
		let source = self.source;
		let Some(position) = heading.position.as_ref() else {
			return;
		};

		let content = heading.children.first().and_then(mdast::Node::position);
		let text = match (content, heading.children.last().and_then(mdast::Node::position)) {
			(Some(first), Some(last)) => source[first.start.offset..last.end.offset].trim(),
			_ => "",
		};

		self.push(
			Piece::Heading(text.to_string()),
			position.start.offset,
			position.end.offset,
		);
	}

	fn list(&mut self, list: &mdast::List) {
		for child in &list.children {
			if let mdast::Node::ListItem(item) = child {
				self.item(item, list.ordered);
			}
		}
	}

	fn item(&mut self, item: &mdast::ListItem, ordered: bool) {
		let source = self.source;
		let Some(position) = item.position.as_ref() else {
			return;
		};
		let start = position.start.offset;
		let (line_start, _) = self.line_bounds(start);
		let lead = &source[line_start..start];
		let indent = indent_width(lead) + lead.trim_start().chars().count();

		let number = if ordered {
			let marker = &source[start..];
			let digits = marker.len() - marker.trim_start_matches(|c: char| c.is_ascii_digit()).len();
			marker[..digits].parse().ok()
		} else {
			None
		};

		// The item's text is the first line of its leading paragraph. Any
		// further lines follow as their own pieces.
		let head = item
			.children
			.first()
			.filter(|child| matches!(child, mdast::Node::Paragraph(_)))
			.and_then(mdast::Node::position);
		let (text, head_end) = match head {
			Some(head) => {
				let (_, line_end) = self.line_bounds(head.start.offset);
				let end = line_end.min(head.end.offset);
				(source[head.start.offset..end].trim(), end)
			}
			None => ("", start),
		};
		let text = if item.checked.is_some() {
			strip_checkbox(text)
		} else {
			text
		};

		self.push(
			Piece::Item(ListItem {
				indent,
				number,
				checked: item.checked,
				text: text.to_string(),
			}),
			start,
			head_end,
		);

		for child in &item.children {
			match child {
				mdast::Node::List(list) => self.list(list),
				mdast::Node::Paragraph(paragraph) => {
					self.lines(paragraph.position.as_ref(), head_end);
				}
				mdast::Node::Heading(heading) => self.heading(heading),
				other => self.verbatim(other.position()),
			}
		}
	}

	/// One [`Piece::Line`] per source line of `position` that ends after
	/// `from`.
	fn lines(&mut self, position: Option<&Position>, from: usize) {
		let source = self.source;
		let Some(position) = position else {
			return;
		};

		let mut offset = position.start.offset;
		while offset < position.end.offset {
			let (line_start, line_end) = self.line_bounds(offset);
			let end = line_end.min(position.end.offset);

			if end > from {
				let line = &source[line_start..end];
				let text = line.trim();
				if !text.is_empty() {
					self.push(
						Piece::Line {
							indent: indent_width(line),
							text: text.to_string(),
						},
						line_start,
						end,
					);
				}
			}

			offset = line_end + 1;
		}
	}

	fn verbatim(&mut self, position: Option<&Position>) {
		let source = self.source;
		let Some(position) = position else {
			return;
		};
		let (start, end) = (position.start.offset, position.end.offset);
		let text = source[start..end].trim_end();
		if !text.is_empty() {
			self.push(Piece::Verbatim(text.to_string()), start, end);
		}
	}
}

fn strip_checkbox(text: &str) -> &str {
	["[ ]", "[x]", "[X]"]
		.iter()
		.find_map(|checkbox| text.strip_prefix(checkbox))
		.map_or(text, str::trim_start)
}
