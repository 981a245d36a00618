//! # pr-agent-templates
//!
//! Pull request description templates for pr-agent.
//!
//! Templates are plain Markdown files in a directory. The catalog is read
//! from disk on every request, so edits show up without a restart.
//!
//! ## Key Types
//!
//! - [`TemplateCatalog`] - Name → text mapping loaded from `*.md` files
//! - [`Suggestion`] - Template recommendation, or the list of valid types
//! - [`DEFAULT_TEMPLATES`] - Bundled starter templates

mod catalog;
mod defaults;
mod suggest;

pub use catalog::{TemplateCatalog, TemplateError, TEMPLATE_EXTENSION};
pub use defaults::{write_defaults, WriteOutcome, DEFAULT_TEMPLATES};
pub use suggest::{suggest, Suggestion, USAGE_HINT};
