use codeflow_diagram::DiagramError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Run-fatal pipeline errors.
///
/// Per-file chunking problems never appear here; they degrade to fallback
/// chunks and log entries. Only structural precondition violations,
/// cancellation, and an exhausted diagram fallback reach the host.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No files supplied to the run
    #[error("No files provided for processing")]
    NoFiles,

    /// A supplied file is missing the content it requires
    #[error("No content provided for file: {path}")]
    MissingContent { path: String },

    /// The host cancelled the run between groups
    #[error("Processing cancelled: {reason}")]
    Cancelled { reason: String },

    /// The diagram path failed even through its fallback
    #[error("Diagram generation failed: {0}")]
    Diagram(#[from] DiagramError),
}

impl PipelineError {
    /// Originating context, carried alongside the message so hosts never
    /// have to parse failure text.
    #[must_use]
    pub const fn context(&self) -> &'static str {
        match self {
            Self::NoFiles | Self::MissingContent { .. } => "validating pipeline input",
            Self::Cancelled { .. } => "scheduling processing groups",
            Self::Diagram(_) => "generating sequence diagram",
        }
    }
}
