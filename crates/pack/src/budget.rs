use crate::score::ScoredChunk;
use codeflow_chunker::Chunk;
use serde::{Deserialize, Serialize};

/// Fixed, documented approximation of tokens-per-character for code.
/// This is not a real tokenizer and is not meant to be one.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of a piece of content
#[must_use]
pub fn estimate_tokens(content: &str) -> usize {
    content.len().div_ceil(CHARS_PER_TOKEN)
}

/// An ordered group of chunks whose cumulative estimated token count fits
/// one downstream request. Produced fresh on every packing call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Batch {
    pub chunks: Vec<Chunk>,
    pub estimated_tokens: usize,
}

impl Batch {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            estimated_tokens: 0,
        }
    }

    fn push(&mut self, chunk: Chunk, tokens: usize) {
        self.chunks.push(chunk);
        self.estimated_tokens += tokens;
    }

    /// Number of chunks in this batch
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Packs ranked chunks into token-budgeted batches.
///
/// Rank-then-budget: the budget only limits volume, it never reorders the
/// scorer's consumption order.
#[derive(Debug, Clone, Copy)]
pub struct TokenBudgetPacker {
    max_tokens_per_batch: usize,
    max_chunks_total: usize,
}

impl TokenBudgetPacker {
    #[must_use]
    pub const fn new(max_tokens_per_batch: usize, max_chunks_total: usize) -> Self {
        Self {
            max_tokens_per_batch,
            max_chunks_total,
        }
    }

    /// Pack ranked chunks into batches.
    ///
    /// Chunks are consumed in the given (rank) order. A chunk that alone
    /// exceeds the batch budget is line-split into single-chunk sub-batches
    /// rather than dropped or silently truncated. After batching, whole
    /// batches beyond `max_chunks_total` chunks are dropped, counting from
    /// the highest-ranked batch first.
    #[must_use]
    pub fn pack(&self, ranked: &[ScoredChunk]) -> Vec<Batch> {
        let mut batches = Vec::new();
        let mut current = Batch::new();

        for scored in ranked {
            let chunk = &scored.chunk;
            let tokens = estimate_tokens(&chunk.content);

            if tokens > self.max_tokens_per_batch {
                if !current.is_empty() {
                    batches.push(std::mem::replace(&mut current, Batch::new()));
                }
                batches.extend(self.split_oversized(chunk));
                continue;
            }

            if current.estimated_tokens + tokens > self.max_tokens_per_batch
                && !current.is_empty()
            {
                batches.push(std::mem::replace(&mut current, Batch::new()));
            }

            current.push(chunk.clone(), tokens);
        }

        if !current.is_empty() {
            batches.push(current);
        }

        self.truncate_batches(batches)
    }

    /// Split an oversized chunk into line-accumulated sub-batches, each
    /// under the per-chunk byte budget.
    fn split_oversized(&self, chunk: &Chunk) -> Vec<Batch> {
        let max_chars = self.max_tokens_per_batch * CHARS_PER_TOKEN;
        let mut batches = Vec::new();
        let mut lines: Vec<&str> = Vec::new();
        let mut size = 0;

        let mut flush = |lines: &mut Vec<&str>| {
            if !lines.is_empty() {
                let content = lines.join("\n");
                let tokens = estimate_tokens(&content);
                let mut batch = Batch::new();
                batch.push(Chunk::detached(&chunk.path, chunk.kind, content), tokens);
                batches.push(batch);
                lines.clear();
            }
        };

        for line in chunk.content.lines() {
            if line.len() > max_chars {
                // A single line above the budget still has to respect it:
                // split at character boundaries.
                flush(&mut lines);
                size = 0;
                for piece in char_windows(line, max_chars) {
                    let mut v = vec![piece];
                    flush(&mut v);
                }
                continue;
            }

            if size + line.len() + 1 > max_chars {
                flush(&mut lines);
                size = 0;
            }

            size += line.len() + 1;
            lines.push(line);
        }
        flush(&mut lines);

        log::debug!(
            "Split oversized chunk from {} into {} sub-batches",
            chunk.path,
            batches.len()
        );
        batches
    }

    /// Keep whole batches from the front while the cumulative chunk count
    /// stays within the cap.
    fn truncate_batches(&self, batches: Vec<Batch>) -> Vec<Batch> {
        let mut total = 0;
        let mut kept = Vec::new();

        for batch in batches {
            if total + batch.chunk_count() > self.max_chunks_total {
                log::debug!("Dropping batches beyond the {}-chunk cap", self.max_chunks_total);
                break;
            }
            total += batch.chunk_count();
            kept.push(batch);
        }

        kept
    }
}

/// Iterate over byte-bounded, char-boundary-aligned windows of a string
fn char_windows(s: &str, max_bytes: usize) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = rest.len().min(max_bytes);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeflow_chunker::ChunkKind;
    use pretty_assertions::assert_eq;

    fn scored(content: &str, score: i64) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::detached("src/a.ts", ChunkKind::Function, content),
            score,
        }
    }

    #[test]
    fn test_estimate_tokens_is_ceiling_division() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_batches_respect_token_budget() {
        let packer = TokenBudgetPacker::new(10, 100);
        let chunks: Vec<ScoredChunk> = (0..6).map(|i| scored(&"y".repeat(20), 6 - i)).collect();

        let batches = packer.pack(&chunks);
        assert!(batches.len() > 1);
        for batch in &batches {
            assert!(batch.estimated_tokens <= 10);
        }
    }

    #[test]
    fn test_consumption_preserves_rank_order() {
        let packer = TokenBudgetPacker::new(100, 100);
        let chunks = vec![scored("high", 9), scored("mid", 5), scored("low", 1)];

        let batches = packer.pack(&chunks);
        let flat: Vec<&str> = batches
            .iter()
            .flat_map(|b| b.chunks.iter().map(|c| c.content.as_str()))
            .collect();
        assert_eq!(flat, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_oversized_chunk_is_split_not_dropped() {
        // 4000 chars at a 100-token budget: must split, each piece within
        // the 400-byte budget.
        let packer = TokenBudgetPacker::new(100, 1000);
        let chunks = vec![scored(&"x".repeat(4000), 1)];

        let batches = packer.pack(&chunks);
        assert!(batches.len() > 1);
        for batch in &batches {
            assert_eq!(batch.chunk_count(), 1);
            assert!(batch.chunks[0].content.len() <= 100 * CHARS_PER_TOKEN);
        }

        let recombined: usize = batches.iter().map(|b| b.chunks[0].content.len()).sum();
        assert_eq!(recombined, 4000);
    }

    #[test]
    fn test_oversized_multiline_chunk_splits_on_lines() {
        let content = (0..100)
            .map(|i| format!("line number {i} with some padding text"))
            .collect::<Vec<_>>()
            .join("\n");
        let packer = TokenBudgetPacker::new(50, 1000);

        let batches = packer.pack(&[scored(&content, 1)]);
        assert!(batches.len() > 1);
        for batch in &batches {
            assert!(batch.chunks[0].content.len() <= 50 * CHARS_PER_TOKEN);
        }
        // Line splitting keeps lines intact.
        assert!(batches[0].chunks[0].content.starts_with("line number 0"));
    }

    #[test]
    fn test_whole_batches_dropped_beyond_chunk_cap() {
        // Each chunk is 1 token; budget of 2 tokens → 2 chunks per batch.
        let packer = TokenBudgetPacker::new(2, 3);
        let chunks: Vec<ScoredChunk> = (0..8).map(|i| scored("abc", 8 - i)).collect();

        let batches = packer.pack(&chunks);
        // First batch (2 chunks) fits under the 3-chunk cap; the second
        // would push the total to 4, so it is dropped whole.
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].chunk_count(), 2);
    }

    #[test]
    fn test_empty_input_packs_to_no_batches() {
        let packer = TokenBudgetPacker::new(10, 10);
        assert!(packer.pack(&[]).is_empty());
    }
}
