mod document;
mod fixed;
mod fuzzy;
mod keyword;

pub use document::{Document, DocumentSet, SNIPPET_MAX_CHARS};
pub use fixed::FixedRetriever;
pub use fuzzy::FuzzyRetriever;
pub use keyword::KeywordRetriever;
