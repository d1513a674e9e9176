//! Content module - loads topic markdown and renders it

pub mod loader;
mod markdown;

pub use loader::{not_found_placeholder, ContentLoader};
pub use markdown::{is_external, HeadingEntry, MarkdownRenderer, NodeKind, RenderRules, Rendered};
pub(crate) use markdown::html_escape;
