//! # Codeflow Chunker
//!
//! Splits source files into semantically meaningful, bounded fragments
//! ("chunks") for downstream ranking, packing and interaction analysis.
//!
//! ## Strategies
//!
//! ```text
//! SourceFile
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> SyntaxChunker (tree-sitter)
//!     │    ├─> Top-level declarations → byte-exact chunks
//!     │    ├─> Markup → single html chunk (bypasses parsing)
//!     │    └─> Parse failure → whole-file fallback chunk
//!     │
//!     └──> HeuristicChunker (brace depth + natural break points)
//!          ├─> Stylesheets → single style chunk
//!          ├─> Markup → structural-tag fragments
//!          └─> Code → classified balanced sections
//! ```
//!
//! Both chunkers are total: they return a non-empty chunk list for any
//! non-empty input and never propagate an error to the caller.
//!
//! ## Example
//!
//! ```rust
//! use codeflow_chunker::{SourceFile, SyntaxChunker};
//!
//! let file = SourceFile::new("src/lib.ts", "function hello() { return 42; }");
//! let chunks = SyntaxChunker::default().extract(&file);
//! assert!(!chunks.is_empty());
//! ```

mod config;
mod error;
mod heuristic;
mod language;
mod syntax;
mod types;

pub use config::{ChunkStrategy, ChunkerConfig};
pub use error::{ChunkerError, Result};
pub use heuristic::HeuristicChunker;
pub use language::Language;
pub use syntax::SyntaxChunker;
pub use types::{Chunk, ChunkKind, SourceFile};
