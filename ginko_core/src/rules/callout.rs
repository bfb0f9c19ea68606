use crate::Block;
use crate::GinkoResult;
use crate::Node;
use crate::Properties;
use crate::Rule;

pub const CALLOUT_NAME: &str = "ginko-callout";

/// Callout kinds. A trailing `-` on any of them marks the callout as
/// collapsed.
pub const CALLOUT_TYPES: [&str; 7] = [
	"note",
	"info",
	"tip",
	"important",
	"warning",
	"danger",
	"caution",
];

/// `::warning-` → `::ginko-callout{type="warning" collapsed}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalloutRule;

/// Split a block name into its callout type and whether it is collapsed.
fn callout_type(name: &str) -> Option<(&'static str, bool)> {
	let (base, collapsed) = match name.strip_suffix('-') {
		Some(base) => (base, true),
		None => (name, false),
	};

	CALLOUT_TYPES
		.iter()
		.find(|kind| **kind == base)
		.map(|kind| (*kind, collapsed))
}

impl Rule for CalloutRule {
	fn name(&self) -> &'static str {
		"callout"
	}

	fn can_handle(&self, node: &Node) -> bool {
		matches!(node, Node::Block(block) if callout_type(&block.name).is_some())
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		let Node::Block(block) = node else {
			return Ok(node);
		};
		let Some((kind, collapsed)) = callout_type(&block.name) else {
			return Ok(Node::Block(block));
		};

		let mut titled = false;
		let mut title = None;
		let mut children = Vec::with_capacity(block.children.len());
		for child in block.children {
			match child {
				Node::DashElement(dash) if !titled && dash.name == "title" => {
					titled = true;
					title = dash.non_empty_label().map(str::to_string);
					children.extend(dash.children);
				}
				other => children.push(other),
			}
		}

		let mut properties = Properties::new().with("type", kind);
		if collapsed {
			properties.set("collapsed", true);
		}
		if let Some(title) = title {
			properties.set("title", title);
		}
		for property in block.properties {
			if property.key != "collapsed" {
				properties.insert_if_absent(property.key, property.value);
			}
		}

		Ok(Block::new(CALLOUT_NAME)
			.with_properties(properties)
			.with_children(children)
			.into())
	}
}
