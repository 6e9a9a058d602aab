use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur during chunking.
///
/// All of these are recoverable at file granularity: the chunker entry
/// points convert them into fallback chunks and the pipeline logs them.
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Failed to parse the source text
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tree-sitter setup failure
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// Language has no syntax-tree support
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Empty content provided
    #[error("Empty content provided")]
    EmptyContent,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ChunkerError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitter(msg.into())
    }

    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
