use crate::error::{DiagramError, Result};
use crate::types::DiagramDocument;
use regex::Regex;
use std::sync::OnceLock;

const BEGIN_MARKER: &str = "@startuml";
const END_MARKER: &str = "@enduml";

fn participant_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)participant\s+"[^"]+""#).expect("participant pattern is valid"))
}

/// Serializes a [`DiagramDocument`] into PlantUML sequence diagram text.
///
/// The output is the wire contract with any downstream rendering service:
/// plain ASCII, begin/end markers, human-diffable.
#[derive(Debug, Default)]
pub struct DiagramRenderer;

impl DiagramRenderer {
    /// Render the document.
    ///
    /// The result is checked with [`DiagramRenderer::validate`] before it
    /// is returned; text that fails validation is never handed back as
    /// success.
    pub fn render(doc: &DiagramDocument) -> Result<String> {
        let participants = doc
            .participants
            .iter()
            .map(|c| format!("participant \"{0}\" as {0}", c.name))
            .collect::<Vec<_>>()
            .join("\n");

        let interactions = doc
            .interactions
            .iter()
            .map(|i| {
                format!(
                    "{from} -> {to}: {method}()\nactivate {to}\n{to} --> {from}: response\ndeactivate {to}",
                    from = i.from,
                    to = i.to,
                    method = i.method,
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let text = format!(
            "{BEGIN_MARKER}\n\
             ' Style and theme configuration\n\
             skinparam style strictuml\n\
             skinparam sequenceMessageAlign center\n\
             skinparam sequenceGroupBorderThickness 2\n\
             skinparam roundcorner 10\n\
             skinparam maxmessagesize 160\n\
             \n\
             ' Participants\n\
             {participants}\n\
             \n\
             ' Interactions\n\
             {interactions}\n\
             \n\
             {END_MARKER}"
        );

        if !Self::validate(&text) {
            return Err(DiagramError::InvalidDiagram);
        }
        Ok(text)
    }

    /// Check the minimal structural validity of diagram text: begin and end
    /// markers, at least one participant declaration, at least one arrow.
    #[must_use]
    pub fn validate(text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }

        trimmed.starts_with(BEGIN_MARKER)
            && trimmed.ends_with(END_MARKER)
            && participant_pattern().is_match(trimmed)
            && trimmed.contains("->")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Component, DeclKind, Interaction};
    use pretty_assertions::assert_eq;

    fn sample_doc() -> DiagramDocument {
        DiagramDocument {
            participants: vec![
                Component::new("A", DeclKind::Class),
                Component::new("B", DeclKind::Class),
            ],
            interactions: vec![Interaction {
                from: "A".into(),
                to: "B".into(),
                method: "call".into(),
            }],
        }
    }

    #[test]
    fn test_render_output_validates() {
        let text = DiagramRenderer::render(&sample_doc()).unwrap();
        assert!(DiagramRenderer::validate(&text));
    }

    #[test]
    fn test_render_structure() {
        let text = DiagramRenderer::render(&sample_doc()).unwrap();

        assert!(text.starts_with("@startuml"));
        assert!(text.ends_with("@enduml"));
        assert!(text.contains("participant \"A\" as A"));
        assert!(text.contains("participant \"B\" as B"));
        assert!(text.contains("A -> B: call()"));
        assert!(text.contains("activate B"));
        assert!(text.contains("B --> A: response"));
        assert!(text.contains("deactivate B"));
    }

    #[test]
    fn test_interactions_separated_by_blank_line() {
        let mut doc = sample_doc();
        doc.interactions.push(Interaction {
            from: "B".into(),
            to: "A".into(),
            method: "reply".into(),
        });

        let text = DiagramRenderer::render(&doc).unwrap();
        assert!(text.contains("deactivate B\n\nB -> A: reply()"));
    }

    #[test]
    fn test_validate_rejects_missing_markers() {
        assert!(!DiagramRenderer::validate(""));
        assert!(!DiagramRenderer::validate("participant \"A\" as A\nA -> B: x()"));
        assert!(!DiagramRenderer::validate(
            "@startuml\nparticipant \"A\" as A\nA -> B: x()"
        ));
    }

    #[test]
    fn test_validate_rejects_missing_participants_or_arrows() {
        assert!(!DiagramRenderer::validate("@startuml\nA -> B: x()\n@enduml"));
        assert!(!DiagramRenderer::validate(
            "@startuml\nparticipant \"A\" as A\n@enduml"
        ));
    }

    #[test]
    fn test_validate_accepts_surrounding_whitespace() {
        let text = DiagramRenderer::render(&sample_doc()).unwrap();
        assert!(DiagramRenderer::validate(&format!("\n  {text}\n")));
    }

    #[test]
    fn test_render_empty_document_is_rejected() {
        let doc = DiagramDocument {
            participants: vec![],
            interactions: vec![],
        };
        let err = DiagramRenderer::render(&doc).unwrap_err();
        assert!(matches!(err, DiagramError::InvalidDiagram));
    }
}
