//! Encyclopedia content retrieval.
//!
//! [`WikiClient`] talks to one language edition of Wikipedia through its
//! REST and classic query APIs and normalizes what comes back: page HTML is
//! stripped to plain text, snippets lose their markup and entities, and
//! category prefixes disappear. Batch helpers iterate topic lists without
//! letting one bad title abort the run.

mod api;
pub mod batch;
pub mod client;
pub mod sanitize;

pub use batch::{create_knowledge_base, search_and_summarize};
pub use client::WikiClient;
pub use sanitize::{clean_snippet, extract_text};
