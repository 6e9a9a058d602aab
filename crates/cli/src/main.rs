use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use codeflow_chunker::{ChunkStrategy, SourceFile};
use codeflow_diagram::{BackendError, ChatBackend, DiagramGenerator};
use codeflow_pack::ScoreProfile;
use codeflow_pipeline::{is_processable, BatchPipeline, PipelineOptions, PipelineReport};
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "codeflow",
    version,
    about = "Chunk a source tree into ranked, token-budgeted context and sequence diagrams"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, rank and pack a source tree into token-budgeted batches
    Pack {
        /// Root directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Chunking strategy
        #[arg(long, value_enum, default_value_t = StrategyFlag::Syntax)]
        chunker: StrategyFlag,

        /// Token ceiling per batch
        #[arg(long, default_value_t = 6000)]
        max_batch_tokens: usize,

        /// Cap on total packed chunks
        #[arg(long, default_value_t = 15)]
        max_chunks: usize,

        /// Files processed concurrently per group
        #[arg(long, default_value_t = 5)]
        group_size: usize,

        /// Pacing delay between groups, in milliseconds
        #[arg(long, default_value_t = 100)]
        pacing_ms: u64,

        /// Emit the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Derive a sequence diagram from the highest-ranked chunks
    Diagram {
        /// Root directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Chunking strategy
        #[arg(long, value_enum, default_value_t = StrategyFlag::Syntax)]
        chunker: StrategyFlag,

        /// Cap on chunks fed to interaction analysis
        #[arg(long, default_value_t = 15)]
        max_chunks: usize,

        /// Skip declarations larger than this many bytes
        #[arg(long, default_value_t = 2000)]
        max_chunk_size: usize,
    },
}

#[derive(Copy, Clone, ValueEnum)]
enum StrategyFlag {
    Syntax,
    Heuristic,
}

impl StrategyFlag {
    const fn as_domain(self) -> ChunkStrategy {
        match self {
            StrategyFlag::Syntax => ChunkStrategy::Syntax,
            StrategyFlag::Heuristic => ChunkStrategy::Heuristic,
        }
    }
}

impl std::fmt::Display for StrategyFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StrategyFlag::Syntax => "syntax",
            StrategyFlag::Heuristic => "heuristic",
        })
    }
}

/// Placeholder chat collaborator. Diagram generation succeeds on the
/// static path; wiring a real backend replaces this one type.
struct UnconfiguredBackend;

#[async_trait]
impl ChatBackend for UnconfiguredBackend {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, BackendError> {
        Err(BackendError::Transport(
            "no chat backend configured".to_string(),
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Pack {
            root,
            chunker,
            max_batch_tokens,
            max_chunks,
            group_size,
            pacing_ms,
            json,
        } => {
            let options = PipelineOptions {
                strategy: chunker.as_domain(),
                max_batch_tokens,
                max_chunks,
                group_size,
                pacing: Duration::from_millis(pacing_ms),
                score_profile: ScoreProfile::ChatContext,
                max_chunk_size: None,
            };
            run_pack(&root, options, json).await
        }
        Command::Diagram {
            root,
            chunker,
            max_chunks,
            max_chunk_size,
        } => {
            let options = PipelineOptions {
                strategy: chunker.as_domain(),
                max_chunks,
                score_profile: ScoreProfile::Diagram,
                max_chunk_size: Some(max_chunk_size),
                ..Default::default()
            };
            run_diagram(&root, options).await
        }
    }
}

async fn run_pack(root: &Path, options: PipelineOptions, json: bool) -> Result<()> {
    let files = scan_files(root)?;
    if files.is_empty() {
        bail!("no processable files under {}", root.display());
    }

    let mut pipeline = BatchPipeline::new(options);
    let bar = progress_bar(files.len() as u64, pipeline.subscribe());

    let report = pipeline
        .run(files)
        .await
        .with_context(|| format!("processing {}", root.display()))?;
    bar.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report.batches)?);
    } else {
        print_summary(&report);
    }
    Ok(())
}

async fn run_diagram(root: &Path, options: PipelineOptions) -> Result<()> {
    let files = scan_files(root)?;
    if files.is_empty() {
        bail!("no processable files under {}", root.display());
    }

    let mut pipeline = BatchPipeline::new(options);
    let bar = progress_bar(files.len() as u64, pipeline.subscribe());

    let generator = DiagramGenerator::new(UnconfiguredBackend);
    let (diagram, _progress) = pipeline
        .run_diagram(files, &generator)
        .await
        .with_context(|| format!("deriving diagram for {}", root.display()))?;
    bar.finish_and_clear();

    println!("{diagram}");
    Ok(())
}

/// Walk the tree (.gitignore aware) and read processable files.
/// Unreadable entries are logged and skipped.
fn scan_files(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.exists() {
        bail!("path does not exist: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .build()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Failed to read entry: {e}");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_processable(name) {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => files.push(SourceFile::new(path.display().to_string(), content)),
            Err(e) => log::warn!("Skipping unreadable file {}: {e}", path.display()),
        }
    }

    log::info!("Found {} processable files under {}", files.len(), root.display());
    Ok(files)
}

fn progress_bar(
    total: u64,
    mut progress_rx: tokio::sync::watch::Receiver<codeflow_pipeline::Progress>,
) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} files")
            .expect("progress template is valid")
            .progress_chars("=> "),
    );

    let bar_handle = bar.clone();
    tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            let snapshot = *progress_rx.borrow();
            bar_handle.set_position(snapshot.processed_count as u64);
        }
    });

    bar
}

fn print_summary(report: &PipelineReport) {
    println!(
        "Processed {}/{} files into {} batches",
        report.progress.processed_count,
        report.progress.total_count,
        report.batches.len()
    );

    for (i, batch) in report.batches.iter().enumerate() {
        println!(
            "\nBatch {} ({} chunks, ~{} tokens):",
            i + 1,
            batch.chunk_count(),
            batch.estimated_tokens
        );
        for chunk in &batch.chunks {
            println!("  [{}] {} ({} bytes)", chunk.kind, chunk.path, chunk.content.len());
        }
    }

    let errors = report
        .progress
        .logs
        .iter()
        .filter(|l| l.level == codeflow_pipeline::LogLevel::Error)
        .count();
    if errors > 0 {
        println!("\n{errors} file(s) fell back to raw content; see logs for details");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_files_filters_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "const a = 1;").unwrap();
        fs::write(dir.path().join("b.png"), [0u8, 1, 2]).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.css"), ".x {}").unwrap();

        let mut files = scan_files(dir.path()).unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(files.len(), 2);
        assert!(files[0].path.ends_with("a.ts"));
        assert!(files[1].path.ends_with("c.css"));
    }

    #[test]
    fn test_scan_missing_root_fails() {
        assert!(scan_files(Path::new("/definitely/not/here")).is_err());
    }
}
