use serde::{Deserialize, Serialize};

/// A named class or function identified via pattern matching, used as a
/// diagram participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component {
    /// Component name, unique within one extraction (case-sensitive)
    pub name: String,

    /// How the component was declared
    pub decl_kind: DeclKind,
}

impl Component {
    pub fn new(name: impl Into<String>, decl_kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            decl_kind,
        }
    }
}

/// Declaration category of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Function,
}

/// A directed, method-labeled edge between two components inferred from
/// call-site text. Duplicates of the same triple are meaningful (repeated
/// calls in a trace) and are preserved in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    pub from: String,
    pub to: String,
    pub method: String,
}

/// The extracted participant set plus the interaction list, created once
/// per generate call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub participants: Vec<Component>,
    pub interactions: Vec<Interaction>,
}
