use std::sync::Arc;

use tracing::instrument;

use crate::GinkoConfig;
use crate::GinkoResult;
use crate::IdSource;
use crate::Node;
use crate::ParseOptions;
use crate::Pipeline;
use crate::parse_with_options;
use crate::serialize;

/// Parse options and a rule pipeline bundled for converting whole notes.
///
/// A converter holds no per-document state. Share one across threads to
/// convert documents in parallel.
#[derive(Debug, Default)]
pub struct Converter {
	options: ParseOptions,
	pipeline: Pipeline,
}

impl Converter {
	pub fn new(options: ParseOptions, pipeline: Pipeline) -> Self {
		Self { options, pipeline }
	}

	pub fn from_config(config: &GinkoConfig) -> Self {
		Self::new(ParseOptions::from_config(config), Pipeline::from_config(config))
	}

	/// Like [`Converter::from_config`] with FAQ ids drawn from `ids`.
	pub fn from_config_with_ids(config: &GinkoConfig, ids: Arc<dyn IdSource>) -> Self {
		Self::new(
			ParseOptions::from_config(config),
			Pipeline::from_config_with_ids(config, ids),
		)
	}

	pub fn options(&self) -> &ParseOptions {
		&self.options
	}

	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	pub fn parse(&self, content: &str) -> GinkoResult<Node> {
		parse_with_options(content, &self.options)
	}

	pub fn modify(&self, ast: GinkoResult<Node>) -> GinkoResult<Node> {
		self.pipeline.modify(ast)
	}

	/// Parse, rewrite and serialize a note. Any failure leaves nothing
	/// behind but the error.
	#[instrument(level = "debug", skip_all, fields(bytes = content.len()))]
	pub fn convert(&self, content: &str) -> GinkoResult<String> {
		let ast = self.modify(self.parse(content))?;
		Ok(serialize(&ast))
	}
}

/// Rewrite a parse result with every built-in rule.
pub fn modify(ast: GinkoResult<Node>) -> GinkoResult<Node> {
	Pipeline::standard().modify(ast)
}

/// Convert a note with default options and every built-in rule.
pub fn convert(content: &str) -> GinkoResult<String> {
	Converter::default().convert(content)
}
