use codeflow_chunker::{Chunk, ChunkKind};
use serde::{Deserialize, Serialize};

/// A chunk paired with its derived relevance score.
///
/// Scores are recomputed on every ranking pass, never cached across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: i64,
}

/// Which caller the score serves.
///
/// The chat-context and diagram paths weight the `component` keyword
/// differently; everything else is shared policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreProfile {
    #[default]
    ChatContext,
    Diagram,
}

impl ScoreProfile {
    const fn component_bonus(self) -> i64 {
        match self {
            Self::ChatContext => 2,
            Self::Diagram => 3,
        }
    }
}

/// Assigns importance scores to chunks from kind, content keywords and
/// path hints. Pure and deterministic: no I/O, no hidden state.
///
/// The exact numbers are policy, not law. Downstream truncation depends
/// on the relative order: class/function above interface and export,
/// above arrow functions, above imports; TypeScript above JavaScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkScorer {
    profile: ScoreProfile,
}

impl ChunkScorer {
    #[must_use]
    pub const fn new(profile: ScoreProfile) -> Self {
        Self { profile }
    }

    /// Score one chunk
    #[must_use]
    pub fn score(&self, chunk: &Chunk) -> i64 {
        Self::kind_weight(chunk.kind)
            + self.content_weight(&chunk.content)
            + Self::path_weight(&chunk.path)
    }

    /// File-level importance from the path alone, used to order whole
    /// files before chunking.
    #[must_use]
    pub fn score_path(path: &str) -> i64 {
        Self::path_weight(path)
    }

    /// Rank chunks by descending score. The sort is stable, so equal
    /// scores keep their discovery order and identical inputs always
    /// produce identical output.
    #[must_use]
    pub fn rank(&self, chunks: Vec<Chunk>) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = chunks
            .into_iter()
            .map(|chunk| ScoredChunk {
                score: self.score(&chunk),
                chunk,
            })
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    const fn kind_weight(kind: ChunkKind) -> i64 {
        match kind {
            ChunkKind::Class => 5,
            ChunkKind::Function => 4,
            ChunkKind::Interface | ChunkKind::TypeAlias => 4,
            ChunkKind::Export => 3,
            ChunkKind::ArrowFunction => 2,
            ChunkKind::Import => 1,
            _ => 0,
        }
    }

    fn content_weight(&self, content: &str) -> i64 {
        let content = content.to_lowercase();
        let mut score = 0;

        if content.contains("component") {
            score += self.profile.component_bonus();
        }
        if content.contains("service") {
            score += 3;
        }
        if content.contains("api") {
            score += 2;
        }
        if content.contains("store") {
            score += 2;
        }
        if content.contains("context") {
            score += 2;
        }
        if content.contains("hook") {
            score += 2;
        }
        if content.contains("async") {
            score += 1;
        }
        if content.contains("await") {
            score += 1;
        }

        score
    }

    fn path_weight(path: &str) -> i64 {
        let path = path.to_lowercase();
        let mut score = 0;

        if path.contains("index.") {
            score += 5;
        }
        if path.contains("app.") {
            score += 4;
        }
        if path.contains("main.") {
            score += 4;
        }
        if path.contains("types") {
            score += 3;
        }
        if path.contains("context") {
            score += 3;
        }
        if path.contains("store") {
            score += 3;
        }
        if path.contains("component") {
            score += 2;
        }
        if path.contains("util") {
            score += 1;
        }

        if path.ends_with(".ts") || path.ends_with(".tsx") {
            score += 2;
        } else if path.ends_with(".js") || path.ends_with(".jsx") {
            score += 1;
        }

        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(path: &str, kind: ChunkKind, content: &str) -> Chunk {
        Chunk::detached(path, kind, content)
    }

    #[test]
    fn test_kind_ordering_is_stable_policy() {
        let scorer = ChunkScorer::default();
        let class = scorer.score(&chunk("a.txt", ChunkKind::Class, "x"));
        let function = scorer.score(&chunk("a.txt", ChunkKind::Function, "x"));
        let interface = scorer.score(&chunk("a.txt", ChunkKind::Interface, "x"));
        let export = scorer.score(&chunk("a.txt", ChunkKind::Export, "x"));
        let arrow = scorer.score(&chunk("a.txt", ChunkKind::ArrowFunction, "x"));
        let import = scorer.score(&chunk("a.txt", ChunkKind::Import, "x"));

        assert!(class > function);
        assert!(function >= interface);
        assert!(interface > export);
        assert!(export > arrow);
        assert!(arrow > import);
    }

    #[test]
    fn test_typescript_outranks_javascript() {
        let scorer = ChunkScorer::default();
        let ts = scorer.score(&chunk("src/a.ts", ChunkKind::Function, "x"));
        let js = scorer.score(&chunk("src/a.js", ChunkKind::Function, "x"));
        assert!(ts > js);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let scorer = ChunkScorer::new(ScoreProfile::Diagram);
        let c = chunk(
            "src/components/UserService.ts",
            ChunkKind::Class,
            "class UserService { async fetch() { await api.get(); } }",
        );
        assert_eq!(scorer.score(&c), scorer.score(&c));
    }

    #[test]
    fn test_diagram_profile_boosts_component_keyword() {
        let c = chunk("a.txt", ChunkKind::Function, "renders a component");
        let chat = ChunkScorer::new(ScoreProfile::ChatContext).score(&c);
        let diagram = ChunkScorer::new(ScoreProfile::Diagram).score(&c);
        assert_eq!(diagram - chat, 1);
    }

    #[test]
    fn test_keyword_bonuses_are_independent() {
        let scorer = ChunkScorer::default();
        let plain = scorer.score(&chunk("a.txt", ChunkKind::Function, "nothing"));
        let loaded = scorer.score(&chunk(
            "a.txt",
            ChunkKind::Function,
            "async service await api",
        ));
        // service +3, api +2, async +1, await +1
        assert_eq!(loaded - plain, 7);
    }

    #[test]
    fn test_rank_descending_with_stable_ties() {
        let scorer = ChunkScorer::default();
        let chunks = vec![
            chunk("z.txt", ChunkKind::Import, "first import"),
            chunk("z.txt", ChunkKind::Class, "the class"),
            chunk("z.txt", ChunkKind::Import, "second import"),
        ];
        let ranked = scorer.rank(chunks);

        assert_eq!(ranked[0].chunk.kind, ChunkKind::Class);
        // Equal-score imports keep discovery order.
        assert!(ranked[1].chunk.content.contains("first"));
        assert!(ranked[2].chunk.content.contains("second"));
        assert!(ranked[0].score >= ranked[1].score);
        assert_eq!(ranked[1].score, ranked[2].score);
    }

    #[test]
    fn test_path_importance_for_file_ordering() {
        assert!(ChunkScorer::score_path("src/index.ts") > ChunkScorer::score_path("src/helper.ts"));
        assert!(ChunkScorer::score_path("src/store/userStore.ts") > ChunkScorer::score_path("src/misc.ts"));
    }
}
