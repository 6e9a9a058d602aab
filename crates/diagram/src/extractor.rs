use crate::error::{DiagramError, Result};
use crate::types::{Component, DeclKind, DiagramDocument, Interaction};
use codeflow_chunker::Chunk;
use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn class_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"class\s+(\w+)").expect("class pattern is valid"))
}

fn function_component_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"function\s+(\w+)\s*\([^)]*\)\s*:\s*(?:React\.)?(?:FC|FunctionComponent|JSX\.Element|\w+Component)",
        )
        .expect("function component pattern is valid")
    })
}

/// Method-labeled call edge between two registry nodes
#[derive(Debug, Clone)]
struct CallEdge {
    method: String,
}

/// Builds a component registry and a directed call-interaction list from
/// chunk text.
///
/// This is a syntactic heuristic over concatenated source, not a resolved
/// call graph: it misses interactions whose caller lives in another chunk
/// and fabricates coincidental ones when unrelated declarations share a
/// chunk. It stays isolated behind this interface so a real call-graph
/// resolver can replace it without touching chunking or packing.
#[derive(Debug, Default)]
pub struct InteractionExtractor;

impl InteractionExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract components and interactions from the chunk set.
    ///
    /// Fails softly: finding nothing is reported as [`DiagramError::NoComponents`]
    /// or [`DiagramError::NoInteractions`] so the caller can fall back,
    /// never as an empty diagram.
    pub fn extract(&self, chunks: &[Chunk]) -> Result<DiagramDocument> {
        let mut graph: DiGraph<Component, CallEdge> = DiGraph::new();
        let mut registry: HashMap<String, NodeIndex> = HashMap::new();
        // Node indices in first-seen order; the registry map alone loses it.
        let mut order: Vec<NodeIndex> = Vec::new();

        // Phase 1: discover components (first occurrence of a name wins).
        for chunk in chunks {
            for cap in class_pattern().captures_iter(&chunk.content) {
                Self::register(&mut graph, &mut registry, &mut order, &cap[1], DeclKind::Class);
            }
            for cap in function_component_pattern().captures_iter(&chunk.content) {
                Self::register(
                    &mut graph,
                    &mut registry,
                    &mut order,
                    &cap[1],
                    DeclKind::Function,
                );
            }
        }

        if registry.is_empty() {
            return Err(DiagramError::NoComponents);
        }

        // Phase 2: discover call sites `Callee.method(` and attribute each
        // to the first component declared in the same chunk.
        for &callee_idx in &order {
            let callee = graph[callee_idx].name.clone();
            let call_site = Regex::new(&format!(r"{}\.(\w+)\(", regex::escape(&callee)))
                .expect("escaped call-site pattern is valid");

            for chunk in chunks {
                for cap in call_site.captures_iter(&chunk.content) {
                    let method = cap[1].to_string();

                    let caller_idx = order
                        .iter()
                        .copied()
                        .find(|&idx| Self::declares(&chunk.content, &graph[idx].name));

                    if let Some(caller_idx) = caller_idx {
                        if caller_idx != callee_idx {
                            graph.add_edge(caller_idx, callee_idx, CallEdge { method });
                        }
                    }
                }
            }
        }

        if graph.edge_count() == 0 {
            return Err(DiagramError::NoInteractions);
        }

        let participants: Vec<Component> = order.iter().map(|&idx| graph[idx].clone()).collect();
        // Edge indices follow insertion order, which is discovery order.
        let interactions: Vec<Interaction> = graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = graph.edge_endpoints(e)?;
                Some(Interaction {
                    from: graph[from].name.clone(),
                    to: graph[to].name.clone(),
                    method: graph[e].method.clone(),
                })
            })
            .collect();

        log::info!(
            "Extracted {} components, {} interactions",
            participants.len(),
            interactions.len()
        );

        Ok(DiagramDocument {
            participants,
            interactions,
        })
    }

    fn register(
        graph: &mut DiGraph<Component, CallEdge>,
        registry: &mut HashMap<String, NodeIndex>,
        order: &mut Vec<NodeIndex>,
        name: &str,
        decl_kind: DeclKind,
    ) {
        if registry.contains_key(name) {
            return;
        }
        let idx = graph.add_node(Component::new(name, decl_kind));
        registry.insert(name.to_string(), idx);
        order.push(idx);
    }

    /// Does this chunk declare the named component?
    fn declares(content: &str, name: &str) -> bool {
        content.contains(&format!("class {name}")) || content.contains(&format!("function {name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeflow_chunker::ChunkKind;
    use pretty_assertions::assert_eq;

    fn chunk(content: &str) -> Chunk {
        Chunk::detached("src/app.ts", ChunkKind::Class, content)
    }

    #[test]
    fn test_two_class_interaction() {
        let chunks = vec![
            chunk("class A { b() { B.call(); } }"),
            chunk("class B { call() {} }"),
        ];

        let doc = InteractionExtractor::new().extract(&chunks).unwrap();

        let names: Vec<&str> = doc.participants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(doc.interactions.len(), 1);
        assert_eq!(
            doc.interactions[0],
            Interaction {
                from: "A".into(),
                to: "B".into(),
                method: "call".into(),
            }
        );
    }

    #[test]
    fn test_first_seen_component_wins() {
        let chunks = vec![
            chunk("class Store { get() {} }"),
            chunk("class User { load() { Store.get(); } }"),
            chunk("class Store { shadow() {} }"),
        ];

        let doc = InteractionExtractor::new().extract(&chunks).unwrap();
        let stores = doc
            .participants
            .iter()
            .filter(|c| c.name == "Store")
            .count();
        assert_eq!(stores, 1);
        assert!(doc
            .interactions
            .iter()
            .any(|i| i.from == "User" && i.to == "Store" && i.method == "get"));
    }

    #[test]
    fn test_callee_declared_in_calling_chunk_suppresses_edge() {
        // When the callee itself is the first declaration found in the
        // calling chunk, attribution lands on the callee and the edge is
        // dropped: the heuristic's documented false negative.
        let chunks = vec![chunk(
            "class Store { get() {} } class User { load() { Store.get(); } }",
        )];

        let err = InteractionExtractor::new().extract(&chunks).unwrap_err();
        assert!(matches!(err, DiagramError::NoInteractions));
    }

    #[test]
    fn test_function_component_discovered() {
        let chunks = vec![
            chunk("function Panel(props: Props): JSX.Element { return Api.render(props); }"),
            chunk("class Api { render() {} }"),
        ];

        let doc = InteractionExtractor::new().extract(&chunks).unwrap();
        let panel = doc.participants.iter().find(|c| c.name == "Panel").unwrap();
        assert_eq!(panel.decl_kind, DeclKind::Function);

        assert!(doc
            .interactions
            .iter()
            .any(|i| i.from == "Panel" && i.to == "Api" && i.method == "render"));
    }

    #[test]
    fn test_duplicate_interactions_preserved_in_order() {
        let chunks = vec![
            chunk("class A { run() { B.step(); B.step(); } }"),
            chunk("class B { step() {} }"),
        ];

        let doc = InteractionExtractor::new().extract(&chunks).unwrap();
        assert_eq!(doc.interactions.len(), 2);
        assert_eq!(doc.interactions[0], doc.interactions[1]);
    }

    #[test]
    fn test_no_components_reported() {
        let chunks = vec![chunk("const x = 1;")];
        let err = InteractionExtractor::new().extract(&chunks).unwrap_err();
        assert!(matches!(err, DiagramError::NoComponents));
    }

    #[test]
    fn test_no_interactions_reported() {
        let chunks = vec![chunk("class Lonely { solo() {} }")];
        let err = InteractionExtractor::new().extract(&chunks).unwrap_err();
        assert!(matches!(err, DiagramError::NoInteractions));
    }

    #[test]
    fn test_cross_chunk_caller_is_missed() {
        // The caller declaration lives in a different chunk than the call
        // site, so attribution fails: a documented limitation of the
        // same-chunk heuristic.
        let chunks = vec![
            chunk("class Caller {"),
            chunk("go() { Callee.run(); } }"),
            chunk("class Callee { run() {} }"),
        ];

        let err = InteractionExtractor::new().extract(&chunks).unwrap_err();
        assert!(matches!(err, DiagramError::NoInteractions));
    }

    #[test]
    fn test_coincidental_cohabitant_is_misattributed() {
        // The call site sits in a free function, but `Bystander` is
        // declared in the same chunk, so the edge is fabricated from it.
        let chunks = vec![
            chunk("class Bystander { watch() {} }\nfunction helper() { Target.fire(); }"),
            chunk("class Target { fire() {} }"),
        ];

        let doc = InteractionExtractor::new().extract(&chunks).unwrap();
        assert!(doc
            .interactions
            .iter()
            .any(|i| i.from == "Bystander" && i.to == "Target" && i.method == "fire"));
    }
}
