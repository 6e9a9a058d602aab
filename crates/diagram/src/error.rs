use crate::backend::BackendError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiagramError>;

/// Errors on the diagram path.
///
/// `NoComponents`, `NoInteractions` and `InvalidDiagram` are soft: they
/// route the caller to the fallback generation strategy. Only
/// `ServiceExhausted` is terminal.
#[derive(Error, Debug)]
pub enum DiagramError {
    /// Static analysis found no components to draw
    #[error("No components found in the provided chunks")]
    NoComponents,

    /// Components exist but no call interactions were discovered
    #[error("No interactions found between components")]
    NoInteractions,

    /// Rendered or candidate text failed diagram validation
    #[error("Diagram text failed validation")]
    InvalidDiagram,

    /// Fallback backend call failed
    #[error("Chat backend error: {0}")]
    Backend(#[from] BackendError),

    /// Fallback generation gave up after bounded retries
    #[error("Diagram generation failed after {attempts} attempts")]
    ServiceExhausted { attempts: u32 },
}
