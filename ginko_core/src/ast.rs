use derive_more::Deref;
use derive_more::DerefMut;
use serde::Serialize;

use crate::GinkoResult;

/// A node of the document tree.
///
/// Every kind of content has its own variant and every variant owns its
/// children exclusively. Rules replace whole nodes, they never patch fields of
/// a node that stays in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
	/// The root of a parsed document.
	Document { children: Vec<Node> },
	/// Prose passed through verbatim, including its line breaks.
	Text { value: String },
	/// A fenced container: `::name(props)` ... `::`.
	Block(Block),
	/// A sub-item of a block: `--name(props) label`. Only valid as a direct
	/// child of a [`Block`].
	DashElement(DashElement),
	/// A self-closing single line element: `:name{props}`.
	InlineBlock(InlineBlock),
	/// A fenced code block. Its content is never parsed.
	CodeBlock(CodeBlock),
	/// An inline code span. Its content is never parsed.
	InlineCode { content: String },
	/// A thematic break, `---`.
	Divider,
	/// A pipe delimited table.
	Table(Table),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
	pub name: String,
	pub properties: Properties,
	pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashElement {
	pub name: String,
	pub properties: Properties,
	/// Text following the element name on its opening line. `None` when the
	/// line carries nothing after the name and property list.
	pub label: Option<String>,
	pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineBlock {
	pub name: String,
	pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBlock {
	/// The info string after the opening fence.
	pub language: Option<String>,
	/// The fence characters exactly as written, e.g. "```" or "~~~~".
	pub fence: String,
	/// Every line between the fences, line breaks included.
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
	/// All rows in order. The first row is the header row.
	pub rows: Vec<TableRow>,
	/// The delimiter cells (`---`, `:--:`) as written below the header row.
	pub delimiters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
	pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
	pub children: Vec<Node>,
}

impl Node {
	pub fn document(children: Vec<Node>) -> Self {
		Self::Document { children }
	}

	pub fn text(value: impl Into<String>) -> Self {
		Self::Text {
			value: value.into(),
		}
	}

	pub fn inline_code(content: impl Into<String>) -> Self {
		Self::InlineCode {
			content: content.into(),
		}
	}

	/// The name of a block-like node.
	pub fn name(&self) -> Option<&str> {
		match self {
			Self::Block(block) => Some(&block.name),
			Self::DashElement(dash) => Some(&dash.name),
			Self::InlineBlock(inline) => Some(&inline.name),
			_ => None,
		}
	}

	/// The direct children of the node. Table cells are not included, use
	/// [`Table::rows`] for those.
	pub fn children(&self) -> &[Node] {
		match self {
			Self::Document { children } => children,
			Self::Block(block) => &block.children,
			Self::DashElement(dash) => &dash.children,
			_ => &[],
		}
	}

	/// Rebuild the node with `f` applied to every child, in order. The first
	/// error stops the walk and is returned as is.
	pub fn try_map_children<F>(self, mut f: F) -> GinkoResult<Node>
	where
		F: FnMut(Node) -> GinkoResult<Node>,
	{
		let node = match self {
			Self::Document { children } => {
				Self::Document {
					children: children.into_iter().map(&mut f).collect::<GinkoResult<_>>()?,
				}
			}
			Self::Block(block) => {
				Self::Block(Block {
					children: block
						.children
						.into_iter()
						.map(&mut f)
						.collect::<GinkoResult<_>>()?,
					..block
				})
			}
			Self::DashElement(dash) => {
				Self::DashElement(DashElement {
					children: dash
						.children
						.into_iter()
						.map(&mut f)
						.collect::<GinkoResult<_>>()?,
					..dash
				})
			}
			Self::Table(table) => {
				let mut rows = Vec::with_capacity(table.rows.len());
				for row in table.rows {
					let mut cells = Vec::with_capacity(row.cells.len());
					for cell in row.cells {
						cells.push(TableCell {
							children: cell
								.children
								.into_iter()
								.map(&mut f)
								.collect::<GinkoResult<_>>()?,
						});
					}
					rows.push(TableRow { cells });
				}
				Self::Table(Table {
					rows,
					delimiters: table.delimiters,
				})
			}
			leaf => leaf,
		};

		Ok(node)
	}

	/// A tree is well formed when its root is a document and dash elements
	/// only ever sit directly inside blocks.
	pub fn is_well_formed(&self) -> bool {
		matches!(self, Self::Document { .. }) && self.children_well_formed()
	}

	fn children_well_formed(&self) -> bool {
		let dash_allowed = matches!(self, Self::Block(_));
		let children_ok = self.children().iter().all(|child| {
			match child {
				Self::Document { .. } => false,
				Self::DashElement(_) if !dash_allowed => false,
				_ => child.children_well_formed(),
			}
		});

		let cells_ok = match self {
			Self::Table(table) => {
				table.rows.iter().flat_map(|row| &row.cells).all(|cell| {
					cell.children.iter().all(|child| {
						matches!(child, Self::Text { .. } | Self::InlineCode { .. })
					})
				})
			}
			_ => true,
		};

		children_ok && cells_ok
	}
}

impl Block {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			properties: Properties::default(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_properties(mut self, properties: Properties) -> Self {
		self.properties = properties;
		self
	}

	#[must_use]
	pub fn with_children(mut self, children: Vec<Node>) -> Self {
		self.children = children;
		self
	}
}

impl DashElement {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			properties: Properties::default(),
			label: None,
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	#[must_use]
	pub fn with_properties(mut self, properties: Properties) -> Self {
		self.properties = properties;
		self
	}

	#[must_use]
	pub fn with_children(mut self, children: Vec<Node>) -> Self {
		self.children = children;
		self
	}

	/// The label, if it holds anything other than whitespace.
	pub fn non_empty_label(&self) -> Option<&str> {
		self.label
			.as_deref()
			.map(str::trim)
			.filter(|label| !label.is_empty())
	}
}

impl InlineBlock {
	pub fn new(name: impl Into<String>, properties: Properties) -> Self {
		Self {
			name: name.into(),
			properties,
		}
	}
}

impl From<Block> for Node {
	fn from(value: Block) -> Self {
		Self::Block(value)
	}
}

impl From<DashElement> for Node {
	fn from(value: DashElement) -> Self {
		Self::DashElement(value)
	}
}

impl From<InlineBlock> for Node {
	fn from(value: InlineBlock) -> Self {
		Self::InlineBlock(value)
	}
}

/// The value of a single property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
	String(String),
	Bool(bool),
	/// A structured payload, written out as a single quoted JSON attribute.
	Json(serde_json::Value),
}

impl PropertyValue {
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// `true` for `Bool(true)`. Every other value, including strings, is not a
	/// flag.
	pub fn is_true(&self) -> bool {
		matches!(self, Self::Bool(true))
	}
}

impl From<&str> for PropertyValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for PropertyValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for PropertyValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<serde_json::Value> for PropertyValue {
	fn from(value: serde_json::Value) -> Self {
		Self::Json(value)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
	pub key: String,
	pub value: PropertyValue,
}

/// An insertion ordered property list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deref, DerefMut)]
#[serde(transparent)]
pub struct Properties(pub Vec<Property>);

impl Properties {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&PropertyValue> {
		self.iter()
			.find(|property| property.key == key)
			.map(|property| &property.value)
	}

	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(PropertyValue::as_str)
	}

	/// Whether `key` is present as a boolean `true`.
	pub fn flag(&self, key: &str) -> bool {
		self.get(key).is_some_and(PropertyValue::is_true)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.iter().any(|property| property.key == key)
	}

	/// Replace the value of an existing key in place, or append it.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
		let key = key.into();
		let value = value.into();
		match self.iter_mut().find(|property| property.key == key) {
			Some(existing) => existing.value = value,
			None => self.push(Property { key, value }),
		}
	}

	/// Append `key` only when it is not already present.
	pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
		let key = key.into();
		if !self.contains_key(&key) {
			self.push(Property {
				key,
				value: value.into(),
			});
		}
	}

	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
		self.set(key, value);
		self
	}
}

impl FromIterator<Property> for Properties {
	fn from_iter<T: IntoIterator<Item = Property>>(iter: T) -> Self {
		let mut properties = Self::new();
		for property in iter {
			properties.set(property.key, property.value);
		}
		properties
	}
}

impl IntoIterator for Properties {
	type IntoIter = std::vec::IntoIter<Property>;
	type Item = Property;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
