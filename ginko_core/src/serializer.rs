use crate::Node;
use crate::Properties;
use crate::PropertyValue;
use crate::Table;

/// Render a tree as component dialect text.
///
/// Serialization never fails. Any tree the parser or the pipeline can build
/// has a textual form.
pub fn serialize(node: &Node) -> String {
	let mut output = String::new();
	write_node(&mut output, node);
	output
}

/// Render a run of sibling nodes.
pub fn serialize_nodes(nodes: &[Node]) -> String {
	let mut output = String::new();
	for node in nodes {
		write_node(&mut output, node);
	}
	output
}

fn write_node(output: &mut String, node: &Node) {
	match node {
		Node::Document { children } => {
			for child in children {
				write_node(output, child);
			}
		}
		Node::Text { value } => output.push_str(value),
		Node::Block(block) => {
			start_line(output);
			output.push_str("::");
			output.push_str(&block.name);
			write_properties(output, &block.properties);
			output.push('\n');
			for child in &block.children {
				write_node(output, child);
			}
			start_line(output);
			output.push_str("::\n");
		}
		Node::DashElement(dash) => {
			start_line(output);
			output.push_str("--");
			output.push_str(&dash.name);
			write_properties(output, &dash.properties);
			if let Some(label) = dash.non_empty_label() {
				output.push(' ');
				output.push_str(label);
			}
			output.push('\n');
			for child in &dash.children {
				write_node(output, child);
			}
		}
		Node::InlineBlock(inline) => {
			start_line(output);
			output.push(':');
			output.push_str(&inline.name);
			write_properties(output, &inline.properties);
			output.push('\n');
		}
		Node::CodeBlock(code) => {
			start_line(output);
			output.push_str(&code.fence);
			if let Some(language) = &code.language {
				output.push_str(language);
			}
			output.push('\n');
			output.push_str(&code.content);
			start_line(output);
			output.push_str(&code.fence);
			output.push('\n');
		}
		Node::InlineCode { content } => {
			let fence = "`".repeat(longest_backtick_run(content) + 1);
			// A backtick at either edge would merge with the fence.
			let padding = if content.starts_with('`') || content.ends_with('`') {
				" "
			} else {
				""
			};
			output.push_str(&fence);
			output.push_str(padding);
			output.push_str(content);
			output.push_str(padding);
			output.push_str(&fence);
		}
		Node::Divider => {
			start_line(output);
			output.push_str("---\n");
		}
		Node::Table(table) => {
			start_line(output);
			write_table(output, table);
		}
	}
}

/// Make sure the next write starts on a fresh line.
fn start_line(output: &mut String) {
	if !output.is_empty() && !output.ends_with('\n') {
		output.push('\n');
	}
}

fn write_properties(output: &mut String, properties: &Properties) {
	let rendered: Vec<String> = properties
		.iter()
		.filter_map(|property| {
			match &property.value {
				PropertyValue::Bool(false) => None,
				PropertyValue::Bool(true) => Some(property.key.clone()),
				PropertyValue::String(value) => {
					Some(format!("{}=\"{}\"", property.key, escape_string(value)))
				}
				PropertyValue::Json(value) => {
					Some(format!(
						"{}='{}'",
						property.key,
						escape_attribute(&value.to_string())
					))
				}
			}
		})
		.collect();

	if rendered.is_empty() {
		return;
	}

	output.push('{');
	output.push_str(&rendered.join(" "));
	output.push('}');
}

fn escape_string(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'\\' => escaped.push_str("\\\\"),
			'"' => escaped.push_str("\\\""),
			'\n' => escaped.push_str("\\n"),
			_ => escaped.push(c),
		}
	}
	escaped
}

/// Make serialized JSON safe inside a single quoted attribute.
pub fn escape_attribute(json: &str) -> String {
	json.replace('\'', "&apos;").replace("\\\"", "&quot;")
}

fn longest_backtick_run(content: &str) -> usize {
	content
		.split(|c| c != '`')
		.map(str::len)
		.max()
		.unwrap_or(0)
}

fn write_table(output: &mut String, table: &Table) {
	let mut rows = table.rows.iter();

	if let Some(header) = rows.next() {
		write_row(output, header.cells.iter().map(|cell| cell_text(&cell.children)));
		write_row(output, table.delimiters.iter().cloned());
	}

	for row in rows {
		write_row(output, row.cells.iter().map(|cell| cell_text(&cell.children)));
	}
}

fn write_row(output: &mut String, cells: impl Iterator<Item = String>) {
	output.push('|');
	for cell in cells {
		output.push(' ');
		output.push_str(&cell);
		output.push_str(" |");
	}
	output.push('\n');
}

fn cell_text(children: &[Node]) -> String {
	children
		.iter()
		.map(|child| {
			match child {
				Node::Text { value } => value.replace('|', "\\|"),
				other => serialize(other),
			}
		})
		.collect()
}
