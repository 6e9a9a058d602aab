//! # Codeflow Diagram
//!
//! Derives a static caller/callee interaction model from code chunks and
//! renders it as PlantUML sequence diagram text.
//!
//! ## Architecture
//!
//! ```text
//! Chunk[]
//!     │
//!     ├──> InteractionExtractor (regex heuristics, petgraph)
//!     │      ├─ Component registry (first-seen wins)
//!     │      └─ Directed call interactions (discovery order)
//!     │
//!     ├──> DiagramRenderer
//!     │      ├─ participant declarations
//!     │      ├─ call / activate / response / deactivate blocks
//!     │      └─ structural validation
//!     │
//!     └──> DiagramGenerator
//!            ├─ static path (extract + render + validate)
//!            └─ ChatBackend fallback, validated, bounded retry
//! ```
//!
//! The extraction is a syntactic heuristic, deliberately isolated behind
//! [`InteractionExtractor`] so a resolved call-graph implementation can
//! replace it without touching the rest of the pipeline.

mod backend;
mod error;
mod extractor;
mod generator;
mod prompts;
mod renderer;
mod types;

pub use backend::{BackendError, ChatBackend};
pub use error::{DiagramError, Result};
pub use extractor::InteractionExtractor;
pub use generator::DiagramGenerator;
pub use prompts::{user_prompt, SYSTEM_PROMPT};
pub use renderer::DiagramRenderer;
pub use types::{Component, DeclKind, DiagramDocument, Interaction};
