use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum GinkoError {
	#[error(transparent)]
	#[diagnostic(code(ginko::io_error))]
	Io(#[from] std::io::Error),

	#[error("block `{name}` opened on line {line} is never closed")]
	#[diagnostic(
		code(ginko::unterminated_block),
		help("add a line containing only `::` to close the block")
	)]
	UnterminatedBlock { name: String, line: usize },

	#[error("element `--{name}` opened on line {line} is never closed")]
	#[diagnostic(
		code(ginko::unterminated_dash_element),
		help("dash elements end at the next `--` element or at the `::` closing their block")
	)]
	UnterminatedDashElement { name: String, line: usize },

	#[error("code fence opened on line {line} is never closed")]
	#[diagnostic(
		code(ginko::unterminated_code_block),
		help("close the fence with the same characters used to open it")
	)]
	UnterminatedCodeBlock { line: usize },

	#[error("malformed property list on line {line}: {reason}")]
	#[diagnostic(
		code(ginko::malformed_properties),
		help("properties look like `(key=\"value\" flag)` or `{{key=\"value\" flag}}`")
	)]
	MalformedProperties { line: usize, reason: String },

	#[error("blocks nested deeper than {limit} levels on line {line}")]
	#[diagnostic(
		code(ginko::nesting_too_deep),
		help("raise `max_depth` in the `[parser]` section of ginko.toml if this is intentional")
	)]
	NestingTooDeep { line: usize, limit: usize },

	#[error("rule `{rule}` failed: {message}")]
	#[diagnostic(code(ginko::rule))]
	Rule { rule: String, message: String },

	#[error("rule `{rule}` requires a `{property}` property")]
	#[diagnostic(
		code(ginko::missing_property),
		help("add `{property}=\"...\"` to the block's property list")
	)]
	MissingProperty { rule: String, property: String },

	#[error("failed to read markdown: {0}")]
	#[diagnostic(code(ginko::markdown))]
	Markdown(String),

	#[error("failed to encode payload: {0}")]
	#[diagnostic(code(ginko::json))]
	Json(#[from] serde_json::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(ginko::config_parse),
		help("check that ginko.toml is valid TOML with [parser], [rules], [quiz] and/or [faq] sections")
	)]
	ConfigParse(String),
}

impl GinkoError {
	/// Errors raised while turning text into a tree. The whole document is
	/// rejected.
	pub fn is_parse_error(&self) -> bool {
		matches!(
			self,
			Self::UnterminatedBlock { .. }
				| Self::UnterminatedDashElement { .. }
				| Self::UnterminatedCodeBlock { .. }
				| Self::MalformedProperties { .. }
				| Self::NestingTooDeep { .. }
		)
	}

	/// Errors raised by a rewrite rule while the pipeline walks the tree.
	pub fn is_rule_error(&self) -> bool {
		matches!(
			self,
			Self::Rule { .. } | Self::MissingProperty { .. } | Self::Markdown(_) | Self::Json(_)
		)
	}
}

pub type GinkoResult<T> = Result<T, GinkoError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
