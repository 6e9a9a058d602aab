use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::language::Language;
use crate::types::{Chunk, ChunkKind, SourceFile};
use tree_sitter::{Node, Parser};

/// Syntax-tree chunker for JavaScript/TypeScript sources.
///
/// Extracts top-level declarations as byte-exact chunks. Total: any parse
/// failure degrades to a single whole-file chunk, and a malformed node is
/// skipped without aborting extraction of its siblings.
pub struct SyntaxChunker {
    config: ChunkerConfig,
}

impl SyntaxChunker {
    /// Create a new syntax chunker
    #[must_use]
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Extract chunks from a file. Never fails; see [`ChunkKind::File`].
    pub fn extract(&self, file: &SourceFile) -> Vec<Chunk> {
        let language = Language::from_path(&file.path);

        // Markup bypasses tree parsing entirely.
        if language.is_markup() {
            return vec![Chunk::detached(&file.path, ChunkKind::Html, &file.content)];
        }

        match self.extract_declarations(file, language) {
            Ok(chunks) if !chunks.is_empty() => chunks,
            Ok(_) => vec![Self::fallback(file)],
            Err(e) => {
                log::warn!("Syntax chunking failed for {}: {e}", file.path);
                vec![Self::fallback(file)]
            }
        }
    }

    fn extract_declarations(&self, file: &SourceFile, language: Language) -> Result<Vec<Chunk>> {
        let ts_language = language.tree_sitter_language()?;
        let mut parser = Parser::new();
        parser
            .set_language(&ts_language)
            .map_err(|e| ChunkerError::tree_sitter(format!("Failed to set language: {e}")))?;

        // Tree-sitter parses with error recovery; `None` only on hard failure.
        let tree = parser
            .parse(&file.content, None)
            .ok_or_else(|| ChunkerError::parse("Failed to parse source text"))?;

        let root = tree.root_node();
        let mut chunks = Vec::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            // One bad node must not lose the rest of the file.
            if let Some(chunk) = self.node_to_chunk(file, child) {
                chunks.push(chunk);
            }
        }

        Ok(chunks)
    }

    /// Map a top-level node to a chunk, or `None` when the node is not a
    /// recognized declaration or its span cannot be sliced.
    fn node_to_chunk(&self, file: &SourceFile, node: Node) -> Option<Chunk> {
        let (kind, span_node) = match node.kind() {
            "function_declaration" => (ChunkKind::Function, node),
            "class_declaration" => (ChunkKind::Class, node),
            "interface_declaration" => (ChunkKind::Interface, node),
            "type_alias_declaration" => (ChunkKind::TypeAlias, node),
            "import_statement" => (ChunkKind::Import, node),
            "export_statement" => Self::classify_export(node)?,
            "lexical_declaration" if Self::binds_arrow_function(node) => {
                (ChunkKind::ArrowFunction, node)
            }
            _ => return None,
        };

        let start = span_node.start_byte();
        let end = span_node.end_byte();
        // Guarded slice: an out-of-range or mid-codepoint span skips this
        // node only.
        let content = file.content.get(start..end)?;

        if let Some(max) = self.config.max_chunk_size {
            if content.len() > max {
                log::debug!(
                    "Skipping oversized {} ({} bytes) in {}",
                    kind,
                    content.len(),
                    file.path
                );
                return None;
            }
        }

        Some(Chunk::new(
            file.path.clone(),
            kind,
            content.to_string(),
            start,
            end,
        ))
    }

    /// Classify an export statement.
    ///
    /// `export default …` is an export chunk spanning the whole statement.
    /// `export function f() {}` and friends surface the wrapped declaration
    /// under its own kind, matching what a nested-visitor extractor sees.
    fn classify_export(node: Node) -> Option<(ChunkKind, Node)> {
        for i in 0..node.child_count() {
            if let Some(child) = node.child(i) {
                if child.kind() == "default" {
                    return Some((ChunkKind::Export, node));
                }
            }
        }

        let declaration = node.child_by_field_name("declaration")?;
        let kind = match declaration.kind() {
            "function_declaration" => ChunkKind::Function,
            "class_declaration" => ChunkKind::Class,
            "interface_declaration" => ChunkKind::Interface,
            "type_alias_declaration" => ChunkKind::TypeAlias,
            "lexical_declaration" if Self::binds_arrow_function(declaration) => {
                ChunkKind::ArrowFunction
            }
            _ => return None,
        };
        Some((kind, declaration))
    }

    /// Check whether a `const`/`let` declaration binds an arrow function
    fn binds_arrow_function(node: Node) -> bool {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "variable_declarator" {
                if let Some(value) = child.child_by_field_name("value") {
                    if value.kind() == "arrow_function" {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Whole-file fallback chunk
    fn fallback(file: &SourceFile) -> Chunk {
        Chunk::new(
            file.path.clone(),
            ChunkKind::File,
            file.content.clone(),
            0,
            file.content.len(),
        )
    }
}

impl Default for SyntaxChunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}
