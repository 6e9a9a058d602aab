use crate::error::{PipelineError, Result};
use crate::progress::{LogLevel, Progress, ProgressState};
use codeflow_chunker::{
    Chunk, ChunkKind, ChunkStrategy, ChunkerConfig, HeuristicChunker, SourceFile, SyntaxChunker,
};
use codeflow_diagram::{ChatBackend, DiagramGenerator};
use codeflow_pack::{Batch, ChunkScorer, ScoreProfile, ScoredChunk, TokenBudgetPacker};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// Cancellation signal shared between the host and a running pipeline.
///
/// Setting it stops the pipeline from scheduling further groups; an
/// in-flight group always finishes its files first.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<OnceLock<String>>);

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation with a host-supplied reason. The first reason
    /// wins; later calls are ignored.
    pub fn cancel(&self, reason: impl Into<String>) {
        let _ = self.0.set(reason.into());
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.0.get().map(String::as_str)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Options for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Which chunker splits each file
    pub strategy: ChunkStrategy,

    /// Token ceiling per packed batch
    pub max_batch_tokens: usize,

    /// Cap on total chunks across all batches (and on chunks handed to
    /// the diagram path)
    pub max_chunks: usize,

    /// Files processed concurrently per group
    pub group_size: usize,

    /// Pacing delay between groups. A deliberate backpressure throttle,
    /// tunable rather than hard-coded.
    pub pacing: Duration,

    /// Scoring profile for ranking
    pub score_profile: ScoreProfile,

    /// Optional per-declaration byte bound forwarded to the syntax chunker
    pub max_chunk_size: Option<usize>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            strategy: ChunkStrategy::Syntax,
            max_batch_tokens: 6000,
            max_chunks: 15,
            group_size: 5,
            pacing: Duration::from_millis(100),
            score_profile: ScoreProfile::ChatContext,
            max_chunk_size: None,
        }
    }
}

/// Pipeline lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Final output of a packing run
#[derive(Debug)]
pub struct PipelineReport {
    pub batches: Vec<Batch>,
    pub progress: ProgressState,
}

/// Orchestrates chunking, scoring and packing across many files in
/// bounded-concurrency groups, tolerating per-file failures.
///
/// Within a group, file tasks run concurrently and are awaited together;
/// groups execute strictly in sequence with a pacing delay between them.
/// Progress is owned by the pipeline task: file tasks return their results
/// instead of mutating shared state.
pub struct BatchPipeline {
    options: PipelineOptions,
    state: PipelineState,
    progress_tx: watch::Sender<Progress>,
    cancel: CancelFlag,
}

impl BatchPipeline {
    /// Create a pipeline. Panics on an invalid chunker configuration.
    #[must_use]
    pub fn new(options: PipelineOptions) -> Self {
        let config = ChunkerConfig {
            strategy: options.strategy,
            max_chunk_size: options.max_chunk_size,
        };
        config
            .validate()
            .expect("Invalid pipeline configuration provided");

        let (progress_tx, _) = watch::channel(Progress::default());
        Self {
            options,
            state: PipelineState::Idle,
            progress_tx,
            cancel: CancelFlag::new(),
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Cancellation handle for the host
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Subscribe to the progress stream
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress_tx.subscribe()
    }

    /// Run the chat-context path: chunk, rank, and pack into batches.
    pub async fn run(&mut self, files: Vec<SourceFile>) -> Result<PipelineReport> {
        let (ranked, mut progress) = self.chunk_and_rank(files).await?;

        let packer = TokenBudgetPacker::new(self.options.max_batch_tokens, self.options.max_chunks);
        let batches = packer.pack(&ranked);
        progress.log(
            LogLevel::Success,
            format!("Packed {} batches within token limits", batches.len()),
            "packing",
        );

        self.state = PipelineState::Completed;
        Ok(PipelineReport { batches, progress })
    }

    /// Run the diagram path: chunk, rank, and hand the top-ranked chunks
    /// to the diagram generator.
    pub async fn run_diagram<B: ChatBackend>(
        &mut self,
        files: Vec<SourceFile>,
        generator: &DiagramGenerator<B>,
    ) -> Result<(String, ProgressState)> {
        let (ranked, mut progress) = self.chunk_and_rank(files).await?;

        let selected: Vec<Chunk> = ranked
            .into_iter()
            .take(self.options.max_chunks)
            .map(|scored| scored.chunk)
            .collect();
        progress.log(
            LogLevel::Info,
            format!("Selected {} chunks for diagram analysis", selected.len()),
            "diagram",
        );

        match generator.generate(&selected).await {
            Ok(text) => {
                progress.log(LogLevel::Success, "Generated sequence diagram", "diagram");
                self.state = PipelineState::Completed;
                Ok((text, progress))
            }
            Err(e) => {
                progress.log(LogLevel::Error, format!("Diagram generation failed: {e}"), "diagram");
                self.state = PipelineState::Failed;
                Err(e.into())
            }
        }
    }

    /// Shared front half of both paths: preconditions, grouped chunking,
    /// progress accounting, ranking.
    async fn chunk_and_rank(
        &mut self,
        files: Vec<SourceFile>,
    ) -> Result<(Vec<ScoredChunk>, ProgressState)> {
        self.state = PipelineState::Running;

        if files.is_empty() {
            self.state = PipelineState::Failed;
            return Err(PipelineError::NoFiles);
        }
        for file in &files {
            if file.content.trim().is_empty() {
                self.state = PipelineState::Failed;
                return Err(PipelineError::MissingContent {
                    path: file.path.clone(),
                });
            }
        }

        let files = order_files(files);
        let total = files.len();
        let mut progress = ProgressState::new(total);
        self.progress_tx.send_replace(progress.snapshot());
        progress.log(
            LogLevel::Info,
            format!(
                "Starting {} processing for {total} files",
                strategy_name(self.options.strategy)
            ),
            "pipeline",
        );

        let config = ChunkerConfig {
            strategy: self.options.strategy,
            max_chunk_size: self.options.max_chunk_size,
        };
        let group_size = self.options.group_size.max(1);
        let mut all_chunks: Vec<Chunk> = Vec::new();

        let mut groups = files.chunks(group_size).peekable();
        while let Some(group) = groups.next() {
            if let Some(reason) = self.cancel.reason() {
                let reason = reason.to_string();
                progress.log(
                    LogLevel::Error,
                    format!("Processing cancelled: {reason}"),
                    "pipeline",
                );
                self.state = PipelineState::Failed;
                return Err(PipelineError::Cancelled { reason });
            }

            let mut tasks: JoinSet<(usize, Vec<Chunk>)> = JoinSet::new();
            for (slot, file) in group.iter().enumerate() {
                let file = file.clone();
                let config = config.clone();
                tasks.spawn(async move { (slot, chunk_file(&file, &config)) });
            }

            let mut results: Vec<Option<Vec<Chunk>>> = vec![None; group.len()];
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((slot, chunks)) => results[slot] = Some(chunks),
                    // The slot stays empty; accounting below attaches the
                    // raw content under the file's identity.
                    Err(e) => log::error!("File task failed to complete: {e}"),
                }
            }

            for (slot, file) in group.iter().enumerate() {
                let chunks = results[slot].take().unwrap_or_else(|| {
                    vec![Chunk::detached(&file.path, ChunkKind::Error, &file.content)]
                });

                if chunks.iter().any(|c| c.kind.is_fallback()) {
                    progress.log(
                        LogLevel::Error,
                        format!("Error processing {}; kept raw content", file.path),
                        &file.path,
                    );
                } else {
                    progress.log(LogLevel::Success, format!("Processed {}", file.path), &file.path);
                }

                all_chunks.extend(chunks);
                progress.processed_count += 1;
            }
            self.progress_tx.send_replace(progress.snapshot());

            if groups.peek().is_some() {
                tokio::time::sleep(self.options.pacing).await;
            }
        }

        progress.log(LogLevel::Success, "All files processed", "pipeline");

        let scorer = ChunkScorer::new(self.options.score_profile);
        let ranked = scorer.rank(all_chunks);
        progress.log(
            LogLevel::Info,
            format!("Ranked {} chunks", ranked.len()),
            "scoring",
        );

        Ok((ranked, progress))
    }
}

/// Split one file with the configured strategy
fn chunk_file(file: &SourceFile, config: &ChunkerConfig) -> Vec<Chunk> {
    match config.strategy {
        ChunkStrategy::Syntax => SyntaxChunker::new(config.clone()).extract(file),
        ChunkStrategy::Heuristic => HeuristicChunker::new().extract(file),
    }
}

/// Code files first (tests excluded from that tier), then everything
/// else; higher path importance first within a tier. Stable, so equal
/// scores keep the caller's order.
fn order_files(mut files: Vec<SourceFile>) -> Vec<SourceFile> {
    files.sort_by_key(|f| {
        let tier = if is_code_file(&f.path) { 0 } else { 1 };
        (tier, -ChunkScorer::score_path(&f.path))
    });
    files
}

fn is_code_file(path: &str) -> bool {
    let path = path.to_lowercase();
    let code_ext = path.ends_with(".ts")
        || path.ends_with(".tsx")
        || path.ends_with(".js")
        || path.ends_with(".jsx");
    code_ext && !path.contains(".test.") && !path.contains(".spec.")
}

fn strategy_name(strategy: ChunkStrategy) -> &'static str {
    match strategy {
        ChunkStrategy::Syntax => "syntax",
        ChunkStrategy::Heuristic => "heuristic",
    }
}
