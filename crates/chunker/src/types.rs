use serde::{Deserialize, Serialize};

/// A source file handed to the chunkers by the caller.
///
/// Inputs are owned by the file store collaborator; the chunkers only ever
/// read them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file inside the scanned tree
    pub path: String,

    /// Full file content
    pub content: String,
}

impl SourceFile {
    /// Create a new source file
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A bounded fragment of a source file, tagged with a semantic kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Source file path
    pub path: String,

    /// Semantic kind of this fragment
    pub kind: ChunkKind,

    /// The fragment text
    pub content: String,

    /// Start byte offset into the original file
    pub start_offset: usize,

    /// End byte offset (exclusive); equals `start_offset + content.len()`
    /// for chunks sliced from the original file
    pub end_offset: usize,
}

impl Chunk {
    /// Create a chunk with explicit byte offsets
    #[must_use]
    pub const fn new(
        path: String,
        kind: ChunkKind,
        content: String,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Self {
            path,
            kind,
            content,
            start_offset,
            end_offset,
        }
    }

    /// Create a chunk whose offsets simply cover its own content.
    ///
    /// Used by the heuristic chunker and the fallback paths, where byte
    /// positions in the original file are not tracked.
    pub fn detached(path: impl Into<String>, kind: ChunkKind, content: impl Into<String>) -> Self {
        let content = content.into();
        let len = content.len();
        Self::new(path.into(), kind, content, 0, len)
    }

    /// Byte length of the span this chunk covers
    #[must_use]
    pub const fn span_len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }
}

/// Semantic kind of a chunk.
///
/// Mirrors the declaration categories the syntax chunker recognizes plus the
/// classifications the heuristic chunker applies to flushed buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkKind {
    /// Named function declaration
    Function,
    /// Class declaration
    Class,
    /// Interface declaration
    Interface,
    /// Type alias declaration
    TypeAlias,
    /// Default export declaration
    Export,
    /// Import declaration
    Import,
    /// Arrow function bound at top level
    ArrowFunction,
    /// JSDoc block comment
    Jsdoc,
    /// Stylesheet content
    Style,
    /// Heuristic fragment with no sharper classification
    Semantic,
    /// Markup fragment
    Html,
    /// Whole-file fallback when parsing produced nothing usable
    File,
    /// Raw content attached after a per-file processing failure
    Error,
}

impl ChunkKind {
    /// Human-readable kind name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::TypeAlias => "type-alias",
            Self::Export => "export",
            Self::Import => "import",
            Self::ArrowFunction => "arrow-function",
            Self::Jsdoc => "jsdoc",
            Self::Style => "style",
            Self::Semantic => "semantic",
            Self::Html => "html",
            Self::File => "file",
            Self::Error => "error",
        }
    }

    /// Check if this kind marks a fallback rather than a real extraction
    #[must_use]
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::File | Self::Error)
    }

    /// Check if this kind came from a recognized declaration
    #[must_use]
    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::Function
                | Self::Class
                | Self::Interface
                | Self::TypeAlias
                | Self::Export
                | Self::Import
                | Self::ArrowFunction
        )
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
