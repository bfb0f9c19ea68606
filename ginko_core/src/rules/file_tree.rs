use crate::Block;
use crate::GinkoResult;
use crate::Node;
use crate::Properties;
use crate::Rule;
use crate::markup::indent_width;
use crate::markup::outline_entry;
use crate::rules::is_block_named;
use crate::serialize_nodes;

pub const FILE_TREE_NAME: &str = "ginko-file-tree";

/// Pairs of toggles folded into one flag: `(positive, negative, combined)`.
const TOGGLES: [(&str, &str, &str); 2] = [
	("expand", "collapse", "expanded"),
	("icons", "no-icons", "icons"),
];

/// `::file-tree` with an indented list of paths → `::ginko-file-tree` with a
/// normalized listing, two spaces per level and a trailing `/` on folders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTreeRule;

#[derive(Debug, PartialEq, Eq)]
struct Entry {
	depth: usize,
	name: String,
}

impl Rule for FileTreeRule {
	fn name(&self) -> &'static str {
		"file-tree"
	}

	fn can_handle(&self, node: &Node) -> bool {
		is_block_named(node, &["file-tree", "filetree"])
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		let Node::Block(block) = node else {
			return Ok(node);
		};

		let properties = combine_toggles(&block.properties);
		let entries = entries(&serialize_nodes(&block.children));
		let listing = render(&entries);

		let children = if listing.is_empty() {
			Vec::new()
		} else {
			vec![Node::text(listing)]
		};

		Ok(Block::new(FILE_TREE_NAME)
			.with_properties(properties)
			.with_children(children)
			.into())
	}
}

fn combine_toggles(original: &Properties) -> Properties {
	let mut properties = Properties::new();

	for (positive, negative, combined) in TOGGLES {
		properties.set(combined, original.flag(positive) && !original.flag(negative));
	}

	for property in original.iter() {
		let is_toggle = TOGGLES
			.iter()
			.any(|(positive, negative, _)| property.key == *positive || property.key == *negative);
		if !is_toggle {
			properties.insert_if_absent(property.key.clone(), property.value.clone());
		}
	}

	properties
}

/// Read one entry per non-blank line. Depth follows indentation: a line
/// indented further than the previous entry is its child.
fn entries(body: &str) -> Vec<Entry> {
	let mut entries = Vec::new();
	let mut indents: Vec<usize> = Vec::new();

	for line in body.lines() {
		if line.trim().is_empty() {
			continue;
		}

		let indent = indent_width(line);
		let name = outline_entry(line);
		if name.is_empty() {
			continue;
		}

		while indents.last().is_some_and(|last| *last >= indent) {
			indents.pop();
		}

		entries.push(Entry {
			depth: indents.len(),
			name: name.to_string(),
		});
		indents.push(indent);
	}

	entries
}

fn render(entries: &[Entry]) -> String {
	let mut listing = String::new();

	for (index, entry) in entries.iter().enumerate() {
		let has_children = entries
			.get(index + 1)
			.is_some_and(|next| next.depth > entry.depth);

		listing.push_str(&"  ".repeat(entry.depth));
		listing.push_str(&entry.name);
		if has_children && !entry.name.ends_with('/') {
			listing.push('/');
		}
		listing.push('\n');
	}

	listing
}
