use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for chunking behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Chunking strategy to use
    pub strategy: ChunkStrategy,

    /// Maximum byte size for a single extracted declaration.
    ///
    /// Declarations larger than this are skipped by the syntax chunker
    /// (the diagram path wants small, focused fragments). `None` keeps
    /// every declaration; the packer splits oversized content later.
    pub max_chunk_size: Option<usize>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Syntax,
            max_chunk_size: None,
        }
    }
}

impl ChunkerConfig {
    /// Config for diagram extraction: bounded declarations only
    pub fn for_diagram() -> Self {
        Self {
            strategy: ChunkStrategy::Syntax,
            max_chunk_size: Some(2000),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == Some(0) {
            return Err(ChunkerError::invalid_config(
                "max_chunk_size must be > 0 when set",
            ));
        }
        Ok(())
    }
}

/// Strategy for splitting a file into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Syntax-tree extraction of top-level declarations.
    /// Falls back to a whole-file chunk on parse failure.
    Syntax,

    /// Brace-depth/line heuristic splitting.
    /// Universal fallback for content the tree parser cannot handle.
    Heuristic,
}
