//! `ginko_core` converts notes written in a block based note dialect into
//! the component dialect rendered by ginko sites.
//!
//! ## Processing Pipeline
//!
//! ```text
//! note text
//!   → Parser (blocks, dash elements, inline blocks, code, tables, prose)
//!   → Pipeline (first matching rule replaces each node, depth first)
//!   → Serializer (component dialect text)
//! ```
//!
//! ## Key Types
//!
//! - [`Node`] - The document tree shared by every stage.
//! - [`Rule`] - A rewrite unit. The built-in rules live in [`rules`].
//! - [`Pipeline`] - An ordered list of rules.
//! - [`Converter`] - Parse options and a pipeline bundled together.
//! - [`GinkoConfig`] - Configuration loaded from `ginko.toml`.
//! - [`IdSource`] - Where FAQ item ids come from.
//!
//! ## Quick Start
//!
//! ```rust
//! let output = ginko_core::convert("::note\nHello\n::\n").unwrap();
//! assert_eq!(output, "::ginko-callout{type=\"note\"}\nHello\n::\n");
//! ```
//!
//! The stages are also available one by one:
//!
//! ```rust
//! use ginko_core::modify;
//! use ginko_core::parse;
//! use ginko_core::serialize;
//!
//! let ast = modify(parse("::info-\nBody\n::\n")).unwrap();
//! assert_eq!(
//! 	serialize(&ast),
//! 	"::ginko-callout{type=\"info\" collapsed}\nBody\n::\n"
//! );
//! ```

pub use ast::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use id::*;
pub use markup::Figure;
pub use parser::*;
pub use pipeline::*;
pub use serializer::*;

mod ast;
pub(crate) mod body;
pub mod config;
mod engine;
#[allow(unused_assignments)]
mod error;
mod id;
pub(crate) mod lexer;
pub(crate) mod markup;
mod parser;
mod pipeline;
pub mod rules;
mod serializer;

#[cfg(test)]
mod __fixtures;
#[cfg(test)]
mod __tests;
