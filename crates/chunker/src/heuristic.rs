use crate::language::Language;
use crate::types::{Chunk, ChunkKind, SourceFile};
use regex::Regex;
use std::sync::OnceLock;

/// Break-point keywords for the line classifier. Prefix match without a
/// word boundary; part of the approximation, not an oversight.
const BREAK_KEYWORDS: [&str; 9] = [
    "import",
    "export",
    "interface",
    "type",
    "function",
    "class",
    "const",
    "let",
    "var",
];

/// Structural tags that open a new markup fragment
fn markup_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</?(?:div|section|article|header|footer|main|nav)")
            .expect("markup boundary pattern is valid")
    })
}

/// Bracket-depth/line-based chunker.
///
/// The universal fallback strategy: it relies on brace balance rather than
/// parsing, so unbalanced braces inside string or template literals will
/// mis-split. That is a documented limitation of the heuristic, not a
/// defect to be corrected by guessing intent.
#[derive(Debug, Default)]
pub struct HeuristicChunker;

impl HeuristicChunker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Extract chunks from a file. Never fails.
    pub fn extract(&self, file: &SourceFile) -> Vec<Chunk> {
        let language = Language::from_path(&file.path);

        if language.is_style() {
            return vec![Chunk::detached(
                &file.path,
                ChunkKind::Style,
                file.content.trim(),
            )];
        }

        if language.is_markup() {
            return Self::split_markup(file);
        }

        let chunks = Self::split_sections(file);
        if chunks.is_empty() && !file.content.is_empty() {
            // Everything was comments or blank lines; keep the file whole
            // so the chunker stays total.
            return vec![Chunk::detached(
                &file.path,
                ChunkKind::Semantic,
                file.content.trim(),
            )];
        }
        chunks
    }

    /// Split markup immediately before each opening or closing structural
    /// tag, discarding empty fragments.
    fn split_markup(file: &SourceFile) -> Vec<Chunk> {
        let content = &file.content;
        let mut boundaries: Vec<usize> = markup_boundary()
            .find_iter(content)
            .map(|m| m.start())
            .collect();
        boundaries.push(content.len());

        let mut chunks = Vec::new();
        let mut start = 0;
        for end in boundaries {
            if end > start {
                let fragment = content[start..end].trim();
                if !fragment.is_empty() {
                    chunks.push(Chunk::detached(&file.path, ChunkKind::Html, fragment));
                }
            }
            start = end;
        }

        if chunks.is_empty() && !content.trim().is_empty() {
            chunks.push(Chunk::detached(&file.path, ChunkKind::Html, content.trim()));
        }
        chunks
    }

    /// Brace-balanced section splitting with natural break points
    fn split_sections(file: &SourceFile) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut depth: i64 = 0;
        let mut in_comment = false;
        let mut in_jsdoc = false;

        for line in file.content.lines() {
            let trimmed = line.trim();

            if trimmed.starts_with("/*") {
                in_comment = true;
                if line.contains("/**") {
                    in_jsdoc = true;
                }
            }

            if in_comment {
                buffer.push_str(line);
                buffer.push('\n');
                if line.contains("*/") {
                    in_comment = false;
                    if in_jsdoc {
                        Self::flush(&mut chunks, file, &mut buffer, Some(ChunkKind::Jsdoc));
                        in_jsdoc = false;
                    }
                }
                continue;
            }

            if trimmed.starts_with("//") {
                continue;
            }

            depth += brace_delta(line);

            buffer.push_str(line);
            buffer.push('\n');

            if depth == 0 && is_natural_break_point(trimmed) {
                Self::flush(&mut chunks, file, &mut buffer, None);
            }
        }

        if !buffer.trim().is_empty() {
            Self::flush(&mut chunks, file, &mut buffer, Some(ChunkKind::Semantic));
        }

        chunks
    }

    fn flush(chunks: &mut Vec<Chunk>, file: &SourceFile, buffer: &mut String, kind: Option<ChunkKind>) {
        let trimmed = buffer.trim();
        if !trimmed.is_empty() {
            let kind = kind.unwrap_or_else(|| classify(trimmed));
            chunks.push(Chunk::detached(&file.path, kind, trimmed));
        }
        buffer.clear();
    }
}

/// Net brace depth change for one line, ignoring backslash-escaped braces
fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut prev = '\0';
    for ch in line.chars() {
        if prev != '\\' {
            match ch {
                '{' => delta += 1,
                '}' => delta -= 1,
                _ => {}
            }
        }
        prev = ch;
    }
    delta
}

/// A heuristic line boundary where a balanced buffer can be flushed
fn is_natural_break_point(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.ends_with('}')
        || trimmed.ends_with(';')
        || trimmed.ends_with("*/")
        || BREAK_KEYWORDS.iter().any(|kw| trimmed.starts_with(kw))
}

/// Classify a flushed buffer by its leading syntax markers
fn classify(section: &str) -> ChunkKind {
    if section.starts_with("import") {
        ChunkKind::Import
    } else if section.starts_with("export") {
        ChunkKind::Export
    } else if section.contains("function") {
        ChunkKind::Function
    } else if section.contains("class") {
        ChunkKind::Class
    } else if section.contains("=>") {
        ChunkKind::ArrowFunction
    } else if section.contains("interface") {
        ChunkKind::Interface
    } else if section.contains("type ") {
        ChunkKind::TypeAlias
    } else {
        ChunkKind::Semantic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(path: &str, content: &str) -> Vec<Chunk> {
        HeuristicChunker::new().extract(&SourceFile::new(path, content))
    }

    #[test]
    fn test_splits_on_balanced_braces() {
        let code = "function a() {\n  return 1;\n}\n\nfunction b() {\n  return 2;\n}\n";
        let chunks = chunk("src/ab.js", code);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].kind, ChunkKind::Function);
        assert!(chunks[0].content.contains("return 1"));
        assert!(chunks[1].content.contains("return 2"));
    }

    #[test]
    fn test_classifies_flushed_buffers() {
        let code = "import { x } from 'y';\n\nconst f = (a) => a + 1;\n";
        let chunks = chunk("src/f.ts", code);

        let kinds: Vec<ChunkKind> = chunks.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ChunkKind::Import));
        assert!(kinds.contains(&ChunkKind::ArrowFunction));
    }

    #[test]
    fn test_trailing_buffer_flushes() {
        // No closing break point on the last line.
        let code = "const x = {\n  a: 1\n";
        let chunks = chunk("src/open.js", code);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.contains("a: 1"));
    }

    #[test]
    fn test_jsdoc_block_captured() {
        let code = "/**\n * Adds numbers.\n */\nfunction add(a, b) { return a + b; }\n";
        let chunks = chunk("src/add.js", code);

        assert_eq!(chunks[0].kind, ChunkKind::Jsdoc);
        assert!(chunks[0].content.contains("Adds numbers"));
        assert_eq!(chunks[1].kind, ChunkKind::Function);
    }

    #[test]
    fn test_line_comments_dropped() {
        let code = "// top note\nlet a = 1;\n";
        let chunks = chunk("src/a.js", code);
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].content.contains("top note"));
    }

    #[test]
    fn test_css_kept_whole() {
        let css = ".a { color: red; }\n.b { color: blue; }\n";
        let chunks = chunk("styles/site.css", css);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].kind, ChunkKind::Style);
    }

    #[test]
    fn test_markup_splits_on_structural_tags() {
        let html = "<html><body><div>one</div><section>two</section></body></html>";
        let chunks = chunk("index.html", html);

        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.kind == ChunkKind::Html));
        assert!(chunks.iter().any(|c| c.content.contains("one")));
        assert!(chunks.iter().any(|c| c.content.contains("two")));
    }

    #[test]
    fn test_total_on_comment_only_input() {
        let chunks = chunk("src/only.js", "// nothing here\n// at all\n");
        assert!(!chunks.is_empty());
    }

    #[test]
    fn test_heuristic_offsets_cover_own_content() {
        let chunks = chunk("src/x.js", "let a = 1;\n");
        for c in &chunks {
            assert_eq!(c.start_offset, 0);
            assert_eq!(c.end_offset, c.content.len());
        }
    }

    #[test]
    fn test_escaped_braces_ignored() {
        assert_eq!(brace_delta("const re = '\\{';"), 0);
        assert_eq!(brace_delta("if (x) {"), 1);
        assert_eq!(brace_delta("}"), -1);
    }
}
