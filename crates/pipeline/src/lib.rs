//! # Codeflow Pipeline
//!
//! Drives chunking, scoring and packing across many files in bounded-
//! concurrency groups, with per-file fault tolerance and progress
//! reporting.
//!
//! ## Flow
//!
//! ```text
//! FileStore ──collect_sources──> SourceFile[]
//!     │
//!     └──> BatchPipeline::run
//!            ├─ preconditions (files present, content present)
//!            ├─ groups of N files, chunked concurrently
//!            │    └─ per-file failure → error chunk + log entry
//!            ├─ pacing delay between groups
//!            ├─ rank (ChunkScorer) → pack (TokenBudgetPacker)
//!            └─ PipelineReport { batches, progress }
//!
//!      BatchPipeline::run_diagram: same front half, top-ranked chunks
//!      handed to the DiagramGenerator instead of the packer.
//! ```
//!
//! A run fails only on structural preconditions or host cancellation,
//! never because one file refused to chunk.

mod error;
mod pipeline;
mod progress;
mod store;

pub use error::{PipelineError, Result};
pub use pipeline::{
    BatchPipeline, CancelFlag, PipelineOptions, PipelineReport, PipelineState,
};
pub use progress::{LogEntry, LogLevel, Progress, ProgressState};
pub use store::{
    collect_sources, is_processable, FileStore, MemoryFileStore, StoreError,
    PROCESSABLE_EXTENSIONS,
};
