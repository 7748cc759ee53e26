//! Error types for syntax tree ingestion.

use thiserror::Error;

/// Errors raised while turning language-server JSON into a [`SyntaxNode`] tree.
///
/// [`SyntaxNode`]: crate::syntax::SyntaxNode
#[derive(Error, Debug)]
pub enum SyntaxTreeError {
    /// The value at the root is not an object carrying a string `kind`.
    #[error("expected a syntax node object with a `kind` tag, found {found}")]
    NotANode { found: &'static str },

    /// The input could not be decoded as JSON.
    #[error("invalid syntax tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyntaxTreeError>;
