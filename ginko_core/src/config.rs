use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::GinkoError;
use crate::GinkoResult;
use crate::parser::DEFAULT_MAX_DEPTH;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["ginko.toml", ".ginko.toml", ".config/ginko.toml"];

/// Difficulty recorded on quiz questions that do not set their own.
pub const DEFAULT_DIFFICULTY: &str = "medium";

/// Length of generated FAQ item ids.
pub const DEFAULT_ID_LENGTH: usize = 10;

/// Configuration loaded from a `ginko.toml` file.
///
/// ```toml
/// [parser]
/// max_depth = 64
///
/// [rules]
/// disabled = ["file-tree"]
///
/// [quiz]
/// default_difficulty = "medium"
///
/// [faq]
/// id_length = 10
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GinkoConfig {
	#[serde(default)]
	pub parser: ParserConfig,
	#[serde(default)]
	pub rules: RulesConfig,
	#[serde(default)]
	pub quiz: QuizConfig,
	#[serde(default)]
	pub faq: FaqConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ParserConfig {
	/// How many blocks and dash elements may be open at once.
	#[serde(default = "default_max_depth")]
	pub max_depth: usize,
}

impl Default for ParserConfig {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct RulesConfig {
	/// Names of rules left out of the pipeline, e.g. `"quiz"` or
	/// `"file-tree"`.
	#[serde(default)]
	pub disabled: Vec<String>,
}

impl RulesConfig {
	pub fn is_enabled(&self, name: &str) -> bool {
		!self.disabled.iter().any(|disabled| disabled == name)
	}
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct QuizConfig {
	#[serde(default = "default_difficulty")]
	pub default_difficulty: String,
}

impl Default for QuizConfig {
	fn default() -> Self {
		Self {
			default_difficulty: default_difficulty(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FaqConfig {
	#[serde(default = "default_id_length")]
	pub id_length: usize,
}

impl Default for FaqConfig {
	fn default() -> Self {
		Self {
			id_length: DEFAULT_ID_LENGTH,
		}
	}
}

fn default_max_depth() -> usize {
	DEFAULT_MAX_DEPTH
}

fn default_difficulty() -> String {
	DEFAULT_DIFFICULTY.to_string()
}

fn default_id_length() -> usize {
	DEFAULT_ID_LENGTH
}

impl GinkoConfig {
	/// Resolve the config file path for `root` using the supported discovery
	/// order.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> GinkoResult<Option<GinkoConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		Self::from_toml(&content).map(Some)
	}

	pub fn from_toml(content: &str) -> GinkoResult<GinkoConfig> {
		toml::from_str(content).map_err(|e| GinkoError::ConfigParse(e.to_string()))
	}
}
