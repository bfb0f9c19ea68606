use std::sync::Arc;

use crate::Converter;
use crate::GinkoConfig;
use crate::GinkoResult;
use crate::InlineBlock;
use crate::Node;
use crate::Pipeline;
use crate::PropertyValue;
use crate::SequentialIdSource;
use crate::parse;

/// A pipeline with every built-in rule and predictable FAQ ids.
pub fn sequential_pipeline() -> Pipeline {
	Pipeline::standard_with_ids(Arc::new(SequentialIdSource::new("faq")))
}

pub fn sequential_converter() -> Converter {
	Converter::from_config_with_ids(
		&GinkoConfig::default(),
		Arc::new(SequentialIdSource::new("faq")),
	)
}

/// Parse `content`, run the standard pipeline and return the JSON payload
/// stored under `key` on the single inline block it produces.
pub fn payload(content: &str, key: &str) -> GinkoResult<serde_json::Value> {
	let ast = sequential_pipeline().modify(parse(content))?;
	let Node::Document { children } = ast else {
		panic!("expected a document");
	};

	let inline = children
		.iter()
		.find_map(|child| {
			match child {
				Node::InlineBlock(inline) => Some(inline),
				_ => None,
			}
		})
		.cloned()
		.unwrap_or_else(|| panic!("no inline block in {children:?}"));

	Ok(json_property(&inline, key))
}

pub fn json_property(inline: &InlineBlock, key: &str) -> serde_json::Value {
	match inline.properties.get(key) {
		Some(PropertyValue::Json(value)) => value.clone(),
		other => panic!("expected a json `{key}` property, found {other:?}"),
	}
}

pub fn quiz(body: &str) -> String {
	format!("::quiz\n{body}::\n")
}

pub const KITCHEN_SINK: &str = r#"# Getting started

::note
Plain callout.
::

::warning-(icon="alert")
--title Careful
Collapsed by default.
::

::tabs
--tab Rust
```rust
fn main() {}
```
--tab Go
::tip
Nested callout.
::
::

::steps
--step Install
Run the installer.
--step Configure
Edit `ginko.toml`.
::

::layout
--col Left
A
--col Right
B
::

::file-tree(expand icons)
- src/
    - lib.rs
- Cargo.toml
::

::faq
- Is it free?
  - Yes.
::

::quiz
--select Pick one
- [x] right
- [ ] wrong
::

| Term | Meaning |
| --- | --- |
| AST | tree |

---
The end.
"#;
