use crate::Block;
use crate::DashElement;
use crate::GinkoResult;
use crate::Node;
use crate::Rule;
use crate::rules::is_block_named;

pub const TABS_NAME: &str = "ginko-tabs";
pub const TAB_NAME: &str = "ginko-tab";
pub const STEPS_NAME: &str = "ginko-steps";
pub const STEP_NAME: &str = "ginko-step";

/// `::tabs` with `--tab Label` items → `::ginko-tabs` holding one
/// `::ginko-tab{label="Label"}` block per item.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabsRule;

/// `::steps` with `--step Label` items → `::ginko-steps` holding numbered
/// `::ginko-step{label="Label" step="1"}` blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepsRule;

impl Rule for TabsRule {
	fn name(&self) -> &'static str {
		"tabs"
	}

	fn can_handle(&self, node: &Node) -> bool {
		is_block_named(node, &["tabs"])
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		Ok(promote_items(node, TABS_NAME, TAB_NAME, false))
	}
}

impl Rule for StepsRule {
	fn name(&self) -> &'static str {
		"steps"
	}

	fn can_handle(&self, node: &Node) -> bool {
		is_block_named(node, &["steps"])
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		Ok(promote_items(node, STEPS_NAME, STEP_NAME, true))
	}
}

/// Rename the wrapper and turn each dash element into a block of its own.
/// Anything that is not a dash element keeps its position.
fn promote_items(node: Node, wrapper: &str, item: &str, numbered: bool) -> Node {
	let Node::Block(block) = node else {
		return node;
	};

	let mut ordinal = 0;
	let children = block
		.children
		.into_iter()
		.map(|child| {
			match child {
				Node::DashElement(dash) => {
					ordinal += 1;
					promote(dash, item, numbered.then_some(ordinal))
				}
				other => other,
			}
		})
		.collect();

	Block::new(wrapper)
		.with_properties(block.properties)
		.with_children(children)
		.into()
}

fn promote(dash: DashElement, name: &str, step: Option<usize>) -> Node {
	let label = dash.non_empty_label().map(str::to_string);
	let mut properties = dash.properties;
	if let Some(label) = label {
		properties.set("label", label);
	}
	if let Some(step) = step {
		properties.set("step", step.to_string());
	}

	Block::new(name)
		.with_properties(properties)
		.with_children(dash.children)
		.into()
}
