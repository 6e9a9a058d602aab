//! # Codeflow Pack
//!
//! Relevance scoring and token-budgeted packing of chunks.
//!
//! Chunks flow through two pure stages: the [`ChunkScorer`] ranks them by
//! kind, content keywords and path hints, and the [`TokenBudgetPacker`]
//! walks the ranked order accumulating batches under a token ceiling,
//! line-splitting any chunk that alone exceeds it. Rank decides order,
//! budget decides volume; neither stage mutates its input.

mod budget;
mod score;

pub use budget::{estimate_tokens, Batch, TokenBudgetPacker, CHARS_PER_TOKEN};
pub use score::{ChunkScorer, ScoreProfile, ScoredChunk};
