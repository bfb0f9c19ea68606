use std::fmt;
use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::GinkoConfig;
use crate::GinkoResult;
use crate::IdSource;
use crate::NanoIdSource;
use crate::Node;
use crate::rules;

/// A single rewrite unit.
///
/// A rule decides from a node alone whether it applies and returns the
/// replacement. It must not keep state between calls; one rule value serves
/// many documents, possibly from several threads at once.
pub trait Rule: Send + Sync {
	/// Stable name, used in logs, errors and `[rules] disabled`.
	fn name(&self) -> &'static str;

	fn can_handle(&self, node: &Node) -> bool;

	/// Build the node that replaces `node`. Only called when
	/// [`Rule::can_handle`] returned `true`.
	fn apply(&self, node: Node) -> GinkoResult<Node>;
}

/// An ordered list of rules applied to a tree in one depth first pass.
pub struct Pipeline {
	rules: Vec<Box<dyn Rule>>,
}

impl fmt::Debug for Pipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Pipeline")
			.field("rules", &self.rule_names())
			.finish()
	}
}

impl Default for Pipeline {
	fn default() -> Self {
		Self::standard()
	}
}

impl Pipeline {
	/// A pipeline with no rules. Every tree passes through unchanged.
	pub fn new() -> Self {
		Self { rules: Vec::new() }
	}

	/// Every built-in rule with random FAQ ids.
	pub fn standard() -> Self {
		Self::standard_with_ids(Arc::new(NanoIdSource::default()))
	}

	/// Every built-in rule, drawing FAQ ids from `ids`.
	pub fn standard_with_ids(ids: Arc<dyn IdSource>) -> Self {
		Self::from_config_with_ids(&GinkoConfig::default(), ids)
	}

	/// The built-in rules minus those disabled in `config`.
	pub fn from_config(config: &GinkoConfig) -> Self {
		Self::from_config_with_ids(config, Arc::new(NanoIdSource::new(config.faq.id_length)))
	}

	pub fn from_config_with_ids(config: &GinkoConfig, ids: Arc<dyn IdSource>) -> Self {
		let rules = rules::standard_rules(&config.quiz.default_difficulty, ids)
			.into_iter()
			.filter(|rule| config.rules.is_enabled(rule.name()))
			.collect();

		Self { rules }
	}

	/// Append a rule. It is tried after every rule already present.
	#[must_use]
	pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
		self.rules.push(Box::new(rule));
		self
	}

	/// Rule names in the order they are tried.
	pub fn rule_names(&self) -> Vec<&'static str> {
		self.rules.iter().map(|rule| rule.name()).collect()
	}

	/// Rewrite the result of a parse.
	///
	/// An error is handed back untouched. A tree that is not a well formed
	/// document is replaced by an empty document. Otherwise the first rule
	/// failure aborts the pass and nothing of the partial rewrite survives.
	pub fn modify(&self, ast: GinkoResult<Node>) -> GinkoResult<Node> {
		let node = ast?;

		if !node.is_well_formed() {
			warn!("input is not a well formed document, replacing it with an empty document");
			return Ok(Node::document(Vec::new()));
		}

		self.visit(node)
	}

	/// Depth first, pre-order. The replacement's children are visited, not
	/// the original node's.
	fn visit(&self, node: Node) -> GinkoResult<Node> {
		let node = match self.rules.iter().find(|rule| rule.can_handle(&node)) {
			Some(rule) => {
				debug!(rule = rule.name(), node = ?node.name(), "rewriting node");
				rule.apply(node)?
			}
			None => node,
		};

		node.try_map_children(|child| self.visit(child))
	}
}
