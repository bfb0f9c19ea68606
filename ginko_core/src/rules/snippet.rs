use crate::Block;
use crate::GinkoError;
use crate::GinkoResult;
use crate::InlineBlock;
use crate::Node;
use crate::Properties;
use crate::Rule;

pub const SNIPPET_SOURCE_NAME: &str = "ginko-snippet-source";
pub const SNIPPET_NAME: &str = "ginko-snippet";

/// `::snippet(id="x")` defines reusable content, `:snippet{id="x"}` refers to
/// it. Both keep only their `id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetRule;

impl SnippetRule {
	fn id_only(&self, properties: &Properties) -> GinkoResult<Properties> {
		let id = properties
			.get_str("id")
			.filter(|id| !id.trim().is_empty())
			.ok_or_else(|| {
				GinkoError::MissingProperty {
					rule: self.name().to_string(),
					property: "id".to_string(),
				}
			})?;

		Ok(Properties::new().with("id", id))
	}
}

impl Rule for SnippetRule {
	fn name(&self) -> &'static str {
		"snippet"
	}

	fn can_handle(&self, node: &Node) -> bool {
		match node {
			Node::Block(block) => block.name == "snippet",
			Node::InlineBlock(inline) => inline.name == "snippet",
			_ => false,
		}
	}

	fn apply(&self, node: Node) -> GinkoResult<Node> {
		match node {
			Node::Block(block) => {
				let properties = self.id_only(&block.properties)?;
				Ok(Block::new(SNIPPET_SOURCE_NAME)
					.with_properties(properties)
					.with_children(block.children)
					.into())
			}
			Node::InlineBlock(inline) => {
				let properties = self.id_only(&inline.properties)?;
				Ok(InlineBlock::new(SNIPPET_NAME, properties).into())
			}
			other => Ok(other),
		}
	}
}
