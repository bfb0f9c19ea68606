use crate::Block;
use crate::CodeBlock;
use crate::DashElement;
use crate::GinkoConfig;
use crate::GinkoError;
use crate::GinkoResult;
use crate::InlineBlock;
use crate::Node;
use crate::Properties;
use crate::Table;
use crate::TableCell;
use crate::TableRow;
use crate::lexer::lex_properties;

/// Default limit on how many blocks and dash elements may be open at once.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling [`parse_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
	/// Opening a block or dash element deeper than this is a parse error.
	pub max_depth: usize,
}

impl Default for ParseOptions {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

impl ParseOptions {
	pub fn from_config(config: &GinkoConfig) -> Self {
		Self {
			max_depth: config.parser.max_depth,
		}
	}
}

/// Parse a note into a [`Node::Document`].
///
/// Either the whole document parses or an error is returned. There is no
/// partial tree.
pub fn parse(content: impl AsRef<str>) -> GinkoResult<Node> {
	parse_with_options(content, &ParseOptions::default())
}

/// Like [`parse`], with an explicit nesting limit.
pub fn parse_with_options(content: impl AsRef<str>, options: &ParseOptions) -> GinkoResult<Node> {
	let content = normalize_line_endings(content.as_ref());
	let lines: Vec<&str> = content.split_inclusive('\n').collect();

	BlockScanner::new(&lines, options.max_depth).scan()
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

enum FrameKind {
	Document,
	Block {
		name: String,
		properties: Properties,
	},
	Dash {
		name: String,
		properties: Properties,
		label: Option<String>,
	},
}

/// A container that is still open while scanning.
struct Frame {
	kind: FrameKind,
	/// 1-indexed line of the opening fence.
	line: usize,
	children: Vec<Node>,
	/// Prose lines not yet turned into nodes.
	text: String,
}

impl Frame {
	fn new(kind: FrameKind, line: usize) -> Self {
		Self {
			kind,
			line,
			children: Vec::new(),
			text: String::new(),
		}
	}

	fn flush_text(&mut self) {
		if !self.text.is_empty() {
			let text = std::mem::take(&mut self.text);
			self.children.extend(split_inline_code(&text));
		}
	}

	fn push_node(&mut self, node: Node) {
		self.flush_text();
		self.children.push(node);
	}

	fn into_node(mut self) -> Node {
		self.flush_text();

		match self.kind {
			FrameKind::Document => Node::document(self.children),
			FrameKind::Block { name, properties } => {
				Node::Block(Block {
					name,
					properties,
					children: self.children,
				})
			}
			FrameKind::Dash {
				name,
				properties,
				label,
			} => {
				Node::DashElement(DashElement {
					name,
					properties,
					label,
					children: self.children,
				})
			}
		}
	}

	fn accepts_dash_elements(&self) -> bool {
		matches!(self.kind, FrameKind::Block { .. } | FrameKind::Dash { .. })
	}

	fn into_unterminated_error(self) -> GinkoError {
		match self.kind {
			FrameKind::Dash { name, .. } => {
				GinkoError::UnterminatedDashElement {
					name,
					line: self.line,
				}
			}
			FrameKind::Block { name, .. } => {
				GinkoError::UnterminatedBlock {
					name,
					line: self.line,
				}
			}
			FrameKind::Document => {
				GinkoError::UnterminatedBlock {
					name: String::new(),
					line: self.line,
				}
			}
		}
	}
}

/// The name, optional property list and trailing text of an opening line,
/// everything after its `::`, `--` or `:` prefix.
struct Head<'a> {
	name: &'a str,
	properties: Option<Properties>,
	rest: &'a str,
}

/// Single pass, line oriented scanner. Open blocks and dash elements live on
/// `stack`, the document frame is always at the bottom.
struct BlockScanner<'a> {
	lines: &'a [&'a str],
	cursor: usize,
	stack: Vec<Frame>,
	max_depth: usize,
}

impl<'a> BlockScanner<'a> {
	fn new(lines: &'a [&'a str], max_depth: usize) -> Self {
		Self {
			lines,
			cursor: 0,
			stack: vec![Frame::new(FrameKind::Document, 1)],
			max_depth,
		}
	}

	fn line_number(&self) -> usize {
		self.cursor + 1
	}

	fn top(&mut self) -> &mut Frame {
		let last = self.stack.len() - 1;
		&mut self.stack[last]
	}

	fn scan(mut self) -> GinkoResult<Node> {
		while self.cursor < self.lines.len() {
			let raw = self.lines[self.cursor];
			let lead = raw.trim_start();

			if let Some((fence_char, fence_len, info)) = code_fence_open(lead) {
				self.scan_code_block(fence_char, fence_len, info)?;
				continue;
			}

			if raw.trim() == "::" && self.close_block() {
				self.cursor += 1;
				continue;
			}

			if let Some(rest) = lead.strip_prefix("::") {
				if let Some(head) = parse_head(rest, self.line_number())? {
					if head.rest.trim().is_empty() {
						self.open_block(head)?;
						self.cursor += 1;
						continue;
					}
				}
			}

			if let Some(rest) = lead.strip_prefix("--") {
				if self.top().accepts_dash_elements() {
					if let Some(head) = parse_head(rest, self.line_number())? {
						self.open_dash_element(head)?;
						self.cursor += 1;
						continue;
					}
				}
			}

			if !lead.starts_with("::") {
				if let Some(rest) = lead.strip_prefix(':') {
					// A prose line such as `:D(smile` is text, not a broken element.
					if let Ok(Some(head)) = parse_head(rest, self.line_number()) {
						if let (Some(properties), true) = (head.properties, head.rest.trim().is_empty()) {
							let node = InlineBlock::new(head.name, properties);
							self.top().push_node(node.into());
							self.cursor += 1;
							continue;
						}
					}
				}
			}

			if is_divider(raw) {
				self.top().push_node(Node::Divider);
				self.cursor += 1;
				continue;
			}

			if raw.contains('|') {
				if let Some(table) = self.scan_table() {
					self.top().push_node(Node::Table(table));
					continue;
				}
			}

			self.top().text.push_str(raw);
			self.cursor += 1;
		}

		if self.stack.len() > 1 {
			if let Some(frame) = self.stack.pop() {
				return Err(frame.into_unterminated_error());
			}
		}

		let document = self
			.stack
			.pop()
			.map_or_else(|| Node::document(Vec::new()), Frame::into_node);

		Ok(document)
	}

	fn check_depth(&self) -> GinkoResult<()> {
		// The document frame does not count towards nesting.
		if self.stack.len() > self.max_depth {
			return Err(GinkoError::NestingTooDeep {
				line: self.line_number(),
				limit: self.max_depth,
			});
		}

		Ok(())
	}

	fn open_block(&mut self, head: Head<'_>) -> GinkoResult<()> {
		self.check_depth()?;
		let kind = FrameKind::Block {
			name: head.name.to_string(),
			properties: head.properties.unwrap_or_default(),
		};
		self.top().flush_text();
		self.stack.push(Frame::new(kind, self.line_number()));

		Ok(())
	}

	fn open_dash_element(&mut self, head: Head<'_>) -> GinkoResult<()> {
		self.close_dash_element();
		self.check_depth()?;

		let label = head.rest.trim();
		let kind = FrameKind::Dash {
			name: head.name.to_string(),
			properties: head.properties.unwrap_or_default(),
			label: (!label.is_empty()).then(|| label.to_string()),
		};
		self.top().flush_text();
		self.stack.push(Frame::new(kind, self.line_number()));

		Ok(())
	}

	/// Pop an open dash element into its block. Does nothing when the
	/// innermost frame is not a dash element.
	fn close_dash_element(&mut self) {
		if !matches!(self.top().kind, FrameKind::Dash { .. }) {
			return;
		}

		if let Some(frame) = self.stack.pop() {
			let node = frame.into_node();
			self.top().push_node(node);
		}
	}

	/// Handle a `::` line. Returns `false` when no block is open, in which
	/// case the line is plain prose.
	fn close_block(&mut self) -> bool {
		self.close_dash_element();

		if !matches!(self.top().kind, FrameKind::Block { .. }) {
			return false;
		}

		if let Some(frame) = self.stack.pop() {
			let node = frame.into_node();
			self.top().push_node(node);
		}

		true
	}

	fn scan_code_block(&mut self, fence_char: char, fence_len: usize, info: &str) -> GinkoResult<()> {
		let opening_line = self.line_number();
		let fence = self.lines[self.cursor].trim_start()[..fence_len].to_string();
		let mut content = String::new();
		self.cursor += 1;

		while self.cursor < self.lines.len() {
			let raw = self.lines[self.cursor];
			self.cursor += 1;

			if is_code_fence_close(raw, fence_char, fence_len) {
				let node = Node::CodeBlock(CodeBlock {
					language: (!info.is_empty()).then(|| info.to_string()),
					fence,
					content,
				});
				self.top().push_node(node);
				return Ok(());
			}

			content.push_str(raw);
		}

		Err(GinkoError::UnterminatedCodeBlock { line: opening_line })
	}

	/// Consume a table starting at the current line when the next line is a
	/// delimiter row with a matching number of cells.
	fn scan_table(&mut self) -> Option<Table> {
		let header = split_row(self.lines[self.cursor]);
		let delimiter_line = self.lines.get(self.cursor + 1)?;
		let delimiters = delimiter_cells(delimiter_line)?;

		if delimiters.len() != header.len() {
			return None;
		}

		let mut rows = vec![cells_to_row(header)];
		self.cursor += 2;

		while self.cursor < self.lines.len() {
			let raw = self.lines[self.cursor];
			let trimmed = raw.trim();
			if trimmed.is_empty() || !trimmed.contains('|') || trimmed.starts_with("::") {
				break;
			}
			rows.push(cells_to_row(split_row(raw)));
			self.cursor += 1;
		}

		Some(Table { rows, delimiters })
	}
}

/// Length in bytes of the identifier at the start of `source`.
fn identifier_len(source: &str) -> usize {
	let bytes = source.as_bytes();
	if !bytes.first().is_some_and(u8::is_ascii_alphabetic) {
		return 0;
	}

	bytes
		.iter()
		.take_while(|byte| byte.is_ascii_alphanumeric() || **byte == b'_' || **byte == b'-')
		.count()
}

fn parse_head(source: &str, line: usize) -> GinkoResult<Option<Head<'_>>> {
	let name_len = identifier_len(source);
	if name_len == 0 {
		return Ok(None);
	}

	let name = &source[..name_len];
	let after = &source[name_len..];

	if after.starts_with('(') || after.starts_with('{') {
		let (properties, used) = lex_properties(after.trim_end(), line)?;
		return Ok(Some(Head {
			name,
			properties: Some(properties),
			rest: &after.trim_end()[used..],
		}));
	}

	Ok(Some(Head {
		name,
		properties: None,
		rest: after,
	}))
}

/// Detect an opening code fence: three or more backticks or tildes. Returns
/// the fence character, its run length and the info string.
fn code_fence_open(lead: &str) -> Option<(char, usize, &str)> {
	let fence_char = lead.chars().next().filter(|c| *c == '`' || *c == '~')?;
	let fence_len = lead.chars().take_while(|c| *c == fence_char).count();
	if fence_len < 3 {
		return None;
	}

	let info = lead[fence_len..].trim();
	if fence_char == '`' && info.contains('`') {
		return None;
	}

	Some((fence_char, fence_len, info))
}

fn is_code_fence_close(raw: &str, fence_char: char, fence_len: usize) -> bool {
	let trimmed = raw.trim();
	trimmed.len() >= fence_len && trimmed.chars().all(|c| c == fence_char)
}

fn is_divider(raw: &str) -> bool {
	let trimmed = raw.trim();
	trimmed.len() >= 3 && trimmed.chars().all(|c| c == '-')
}

/// Split a table row into trimmed cell texts. `\|` is an escaped pipe and
/// pipes inside code spans do not split cells.
fn split_row(raw: &str) -> Vec<String> {
	let mut trimmed = raw.trim();
	trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
	if trimmed.ends_with('|') && !trimmed.ends_with("\\|") {
		trimmed = &trimmed[..trimmed.len() - 1];
	}

	let mut cells = Vec::new();
	let mut current = String::new();
	let mut in_code = false;
	let mut chars = trimmed.chars().peekable();

	while let Some(c) = chars.next() {
		match c {
			'\\' if chars.peek() == Some(&'|') => {
				current.push('|');
				chars.next();
			}
			'`' => {
				in_code = !in_code;
				current.push(c);
			}
			'|' if !in_code => {
				cells.push(current.trim().to_string());
				current.clear();
			}
			_ => current.push(c),
		}
	}
	cells.push(current.trim().to_string());

	cells
}

/// The cells of a delimiter row such as `| --- | :-: |`, or `None` when the
/// line is not one.
fn delimiter_cells(raw: &str) -> Option<Vec<String>> {
	if !raw.contains('-') {
		return None;
	}

	let cells = split_row(raw);
	let valid = cells.iter().all(|cell| {
		let inner = cell.strip_prefix(':').unwrap_or(cell);
		let inner = inner.strip_suffix(':').unwrap_or(inner);
		!inner.is_empty() && inner.chars().all(|c| c == '-')
	});

	valid.then_some(cells)
}

fn cells_to_row(cells: Vec<String>) -> TableRow {
	TableRow {
		cells: cells
			.into_iter()
			.map(|cell| {
				TableCell {
					children: split_inline_code(&cell),
				}
			})
			.collect(),
	}
}

/// Split a run of prose into text and inline code nodes. A backtick run only
/// opens a code span when a run of the same length closes it.
pub(crate) fn split_inline_code(text: &str) -> Vec<Node> {
	let bytes = text.as_bytes();
	let mut nodes = Vec::new();
	let mut plain_start = 0;
	let mut index = 0;

	while index < bytes.len() {
		if bytes[index] != b'`' {
			index += 1;
			continue;
		}

		let run = backtick_run(bytes, index);
		let Some(close) = find_closing_run(bytes, index + run, run) else {
			index += run;
			continue;
		};

		if plain_start < index {
			nodes.push(Node::text(&text[plain_start..index]));
		}
		nodes.push(Node::inline_code(unpad_code(&text[index + run..close])));
		index = close + run;
		plain_start = index;
	}

	if plain_start < bytes.len() {
		nodes.push(Node::text(&text[plain_start..]));
	}

	nodes
}

/// Drop the single spaces that keep a backtick at the edge of a code span
/// apart from its fence.
fn unpad_code(content: &str) -> &str {
	let Some(inner) = content.strip_prefix(' ').and_then(|c| c.strip_suffix(' ')) else {
		return content;
	};

	if inner.starts_with('`') || inner.ends_with('`') {
		inner
	} else {
		content
	}
}

fn backtick_run(bytes: &[u8], start: usize) -> usize {
	bytes[start..].iter().take_while(|byte| **byte == b'`').count()
}

fn find_closing_run(bytes: &[u8], from: usize, run: usize) -> Option<usize> {
	let mut index = from;
	while index < bytes.len() {
		if bytes[index] == b'`' {
			let candidate = backtick_run(bytes, index);
			if candidate == run {
				return Some(index);
			}
			index += candidate;
		} else {
			index += 1;
		}
	}

	None
}
