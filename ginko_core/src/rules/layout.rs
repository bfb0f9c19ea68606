use crate::Block;
use crate::DashElement;
use crate::GinkoResult;
use crate::Node;
use crate::Rule;
use crate::rules::is_block_named;

pub const CENTER_NAME: &str = "ginko-center";
pub const LAYOUT_NAME: &str = "ginko-layout";
pub const COLUMN_NAME: &str = "ginko-column";

/// `::layout` with `--col` items.
///
/// A single column becomes `::ginko-center` holding the column's content
/// directly. Two or more become `::ginko-layout` with one `::ginko-column`
/// per item.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutRule;

fn is_column_name(name: &str) -> bool {
	name == "col" || name == "column"
}

/// The column's label as a leading text line, then its content.
fn column_content(dash: DashElement) -> Vec<Node> {
	let mut children = Vec::with_capacity(dash.children.len() + 1);
	if let Some(label) = dash.non_empty_label() {
		children.push(Node::text(format!("{label}\n")));
	}
	children.extend(dash.children);
	children
}

impl Rule for LayoutRule {
	fn name(&self) -> &'static str {
		"layout"
	}

	fn can_handle(&self, node: &Node) -> bool {
		is_block_named(node, &["layout"])
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		let Node::Block(block) = node else {
			return Ok(node);
		};

		let columns = block
			.children
			.iter()
			.filter(|child| matches!(child, Node::DashElement(dash) if is_column_name(&dash.name)))
			.count();

		if columns == 1 {
			let mut properties = block.properties;
			let mut children = Vec::new();
			for child in block.children {
				match child {
					Node::DashElement(dash) if is_column_name(&dash.name) => {
						for property in dash.properties.iter().cloned() {
							properties.insert_if_absent(property.key, property.value);
						}
						children.extend(column_content(dash));
					}
					other => children.push(other),
				}
			}

			return Ok(Block::new(CENTER_NAME)
				.with_properties(properties)
				.with_children(children)
				.into());
		}

		let children = block
			.children
			.into_iter()
			.map(|child| {
				match child {
					Node::DashElement(dash) if is_column_name(&dash.name) => {
						let properties = dash.properties.clone();
						Block::new(COLUMN_NAME)
							.with_properties(properties)
							.with_children(column_content(dash))
							.into()
					}
					other => other,
				}
			})
			.collect();

		Ok(Block::new(LAYOUT_NAME)
			.with_properties(block.properties)
			.with_children(children)
			.into())
	}
}
