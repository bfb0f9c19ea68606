//! The built-in rewrite rules.
//!
//! Each rule matches nodes by name and replaces them with their component
//! form. Rules never see a node twice: the names they emit are all prefixed
//! with `ginko-` and none of them match those names.

use std::sync::Arc;

pub use callout::*;
pub use faq::*;
pub use file_tree::*;
pub use layout::*;
pub use quiz::*;
pub use snippet::*;
pub use tabs::*;

use crate::IdSource;
use crate::Node;
use crate::Rule;

mod callout;
mod faq;
mod file_tree;
mod layout;
mod quiz;
mod snippet;
mod tabs;

/// The built-in rules in the order the pipeline tries them.
pub fn standard_rules(default_difficulty: &str, ids: Arc<dyn IdSource>) -> Vec<Box<dyn Rule>> {
	vec![
		Box::new(CalloutRule),
		Box::new(TabsRule),
		Box::new(StepsRule),
		Box::new(LayoutRule),
		Box::new(SnippetRule),
		Box::new(FileTreeRule),
		Box::new(FaqRule::new(ids)),
		Box::new(QuizRule::new(default_difficulty)),
	]
}

/// Whether `node` is a block with one of `names`.
pub(crate) fn is_block_named(node: &Node, names: &[&str]) -> bool {
	matches!(node, Node::Block(block) if names.contains(&block.name.as_str()))
}
