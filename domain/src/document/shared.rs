//! The collaboratively edited markdown document.
//!
//! [`SharedDocument`] is the one piece of state every participant touches.
//! All reads and writes go through a single mutex, and compound edits
//! (insert-after-heading, replace-section) are single locked methods so a
//! caller never has to do a read-then-write across two calls.
//!
//! Section lookup is a line scan over the raw buffer. Heading text is the
//! key and the first match wins: two headings with the same text are
//! ambiguous and only the first one is addressable.

use super::heading::{Heading, line_spans};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default file name used by [`SharedDocument::save_to_file`] for an empty path.
pub const DEFAULT_DOCUMENT_PATH: &str = "conversation.md";

/// Opaque copy of the document contents for rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot(String);

impl DocumentSnapshot {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Thread-safe markdown buffer addressed by heading text.
#[derive(Debug, Default)]
pub struct SharedDocument {
    buffer: Mutex<String>,
}

impl SharedDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document seeded with existing markdown.
    pub fn from_markdown(markdown: impl Into<String>) -> Self {
        Self {
            buffer: Mutex::new(markdown.into()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        // A panic while holding the lock leaves a complete String behind;
        // every edit below builds the new text before swapping it in.
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Full markdown text.
    pub fn content(&self) -> String {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().trim().is_empty()
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot(self.lock().clone())
    }

    pub fn restore(&self, snapshot: DocumentSnapshot) {
        *self.lock() = snapshot.0;
    }

    /// Set the H1 title.
    ///
    /// Replaces the first line when the document already starts with an H1,
    /// otherwise prepends `# title` and a blank line.
    pub fn set_title(&self, title: &str) {
        let mut doc = self.lock();
        let title_line = format!("# {}", title.trim());
        if doc.starts_with("# ") {
            let rest = match doc.find('\n') {
                Some(idx) => doc[idx + 1..].to_string(),
                None => String::new(),
            };
            *doc = format!("{title_line}\n{rest}");
        } else {
            doc.insert_str(0, &format!("{title_line}\n\n"));
        }
    }

    /// Append a heading. `level` is clamped to 1..=6.
    pub fn add_heading(&self, text: &str, level: u8) {
        let mut doc = self.lock();
        push_heading(&mut doc, text, level);
    }

    /// Append a trimmed paragraph followed by a blank line.
    pub fn append_paragraph(&self, text: &str) {
        let mut doc = self.lock();
        push_paragraph(&mut doc, text);
    }

    /// Insert content directly below the first heading with matching text.
    ///
    /// A missing heading is created as a level-2 section holding the content.
    pub fn insert_after_heading(&self, heading_text: &str, content: &str) {
        let mut doc = self.lock();
        let Some(found) = find_heading(&doc, heading_text) else {
            push_heading(&mut doc, heading_text, 2);
            push_paragraph(&mut doc, content);
            return;
        };

        let insertion = framed(content, found.terminated);
        doc.insert_str(found.body_start, &insertion);
    }

    /// Replace everything between the matching heading and the next heading
    /// of any level (or end of document).
    ///
    /// A missing heading is created as a level-2 section holding the content.
    pub fn replace_section(&self, heading_text: &str, content: &str) {
        let mut doc = self.lock();
        let Some(found) = find_heading(&doc, heading_text) else {
            push_heading(&mut doc, heading_text, 2);
            push_paragraph(&mut doc, content);
            return;
        };

        let section_end = line_spans(&doc)
            .skip_while(|line| line.start < found.body_start)
            .find(|line| Heading::parse(line.text).is_some())
            .map(|line| line.start)
            .unwrap_or(doc.len());

        let replacement = framed(content, found.terminated);
        doc.replace_range(found.body_start..section_end, &replacement);
    }

    /// Heading outline, one heading per line in document order.
    pub fn list_headings(&self) -> String {
        let doc = self.lock();
        line_spans(&doc)
            .filter(|line| Heading::parse(line.text).is_some())
            .map(|line| line.text.trim())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Structured form of [`list_headings`](Self::list_headings).
    pub fn headings(&self) -> Vec<Heading> {
        let doc = self.lock();
        line_spans(&doc)
            .filter_map(|line| Heading::parse(line.text))
            .collect()
    }

    /// Write the document to `path`, overwriting any existing file.
    ///
    /// An empty path falls back to [`DEFAULT_DOCUMENT_PATH`]. Parent
    /// directories are created on demand. Returns the absolute path written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = path.as_ref();
        let path = if path.as_os_str().is_empty() {
            Path::new(DEFAULT_DOCUMENT_PATH)
        } else {
            path
        };
        let full_path = std::path::absolute(path)?;

        let doc = self.lock();
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, doc.as_bytes())?;
        Ok(full_path)
    }
}

/// Location of a heading line in the raw buffer.
struct HeadingMatch {
    /// Offset just past the heading line (after its newline, if any)
    body_start: usize,
    /// Whether the heading line ends with a newline
    terminated: bool,
}

fn find_heading(doc: &str, heading_text: &str) -> Option<HeadingMatch> {
    let wanted = heading_text.trim();
    line_spans(doc).find_map(|line| {
        let heading = Heading::parse(line.text)?;
        (heading.text == wanted).then_some(HeadingMatch {
            body_start: line.next,
            terminated: line.terminated,
        })
    })
}

/// Content framed by one leading and one trailing blank line.
fn framed(content: &str, heading_terminated: bool) -> String {
    let lead = if heading_terminated { "\n" } else { "\n\n" };
    format!("{lead}{}\n\n", content.trim())
}

fn push_heading(doc: &mut String, text: &str, level: u8) {
    let level = level.clamp(1, 6) as usize;
    doc.push_str(&"#".repeat(level));
    doc.push(' ');
    doc.push_str(text.trim());
    doc.push_str("\n\n");
}

fn push_paragraph(doc: &mut String, text: &str) {
    doc.push_str(text.trim());
    doc.push_str("\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_title_twice_keeps_single_title() {
        let doc = SharedDocument::new();
        doc.set_title("A");
        doc.set_title("B");

        let content = doc.content();
        assert_eq!(content.lines().next(), Some("# B"));
        assert!(!content.contains("# A"));
        assert_eq!(content, "# B\n\n");
    }

    #[test]
    fn test_set_title_prepends_to_existing_body() {
        let doc = SharedDocument::from_markdown("## Position\n\nWe agree.\n\n");
        doc.set_title("Consensus");
        assert!(doc.content().starts_with("# Consensus\n\n## Position\n"));
    }

    #[test]
    fn test_set_title_without_trailing_newline() {
        let doc = SharedDocument::from_markdown("# Old");
        doc.set_title("New");
        assert_eq!(doc.content(), "# New\n");
    }

    #[test]
    fn test_add_heading_clamps_level() {
        let doc = SharedDocument::new();
        doc.add_heading("Too deep", 9);
        doc.add_heading("Too shallow", 0);
        assert_eq!(doc.list_headings(), "###### Too deep\n# Too shallow");
    }

    #[test]
    fn test_append_paragraph_trims() {
        let doc = SharedDocument::new();
        doc.append_paragraph("  hello  \n");
        assert_eq!(doc.content(), "hello\n\n");
    }

    #[test]
    fn test_replace_section_twice_scenario() {
        let doc = SharedDocument::new();
        doc.replace_section("Details", "Old");
        doc.replace_section("Details", "New");

        let content = doc.content();
        assert_eq!(content.matches("New").count(), 1);
        assert!(!content.contains("Old"));
        assert_eq!(content.matches("## Details").count(), 1);
    }

    #[test]
    fn test_replace_section_is_idempotent() {
        let doc = SharedDocument::from_markdown(
            "# T\n\n## Position\n\ndraft\n\n## Trade-offs\n\n- cost\n\n",
        );
        doc.replace_section("Position", "Final stance.");
        let once = doc.content();
        doc.replace_section("Position", "Final stance.");
        assert_eq!(doc.content(), once);
        assert_eq!(
            once,
            "# T\n\n## Position\n\nFinal stance.\n\n## Trade-offs\n\n- cost\n\n"
        );
    }

    #[test]
    fn test_replace_section_stops_at_any_level() {
        let doc =
            SharedDocument::from_markdown("## Reasons\n\nold\n\n### Detail\n\nkeep me\n");
        doc.replace_section("Reasons", "new");
        assert_eq!(
            doc.content(),
            "## Reasons\n\nnew\n\n### Detail\n\nkeep me\n"
        );
    }

    #[test]
    fn test_replace_last_section_runs_to_end() {
        let doc = SharedDocument::from_markdown("## A\n\na\n\n## B\n\nb\nmore b\n");
        doc.replace_section("B", "replaced");
        assert_eq!(doc.content(), "## A\n\na\n\n## B\n\nreplaced\n\n");
    }

    #[test]
    fn test_replace_section_heading_without_newline() {
        let doc = SharedDocument::from_markdown("## End");
        doc.replace_section("End", "body");
        assert_eq!(doc.content(), "## End\n\nbody\n\n");
    }

    #[test]
    fn test_insert_after_heading() {
        let doc = SharedDocument::from_markdown("## Position\nexisting\n");
        doc.insert_after_heading("Position", "inserted");
        assert_eq!(doc.content(), "## Position\n\ninserted\n\nexisting\n");
    }

    #[test]
    fn test_insert_after_missing_heading_creates_section() {
        let doc = SharedDocument::from_markdown("# T\n\n");
        doc.insert_after_heading("Risks", "  - outage  ");
        assert_eq!(doc.content(), "# T\n\n## Risks\n\n- outage\n\n");
    }

    #[test]
    fn test_first_duplicate_heading_wins() {
        let doc = SharedDocument::from_markdown("## Notes\n\none\n\n## Notes\n\ntwo\n\n");
        doc.replace_section("Notes", "first");
        assert_eq!(
            doc.content(),
            "## Notes\n\nfirst\n\n## Notes\n\ntwo\n\n"
        );
    }

    #[test]
    fn test_heading_match_is_case_sensitive() {
        let doc = SharedDocument::from_markdown("## Position\n\nx\n\n");
        doc.replace_section("position", "y");
        assert_eq!(doc.list_headings(), "## Position\n## position");
    }

    #[test]
    fn test_edits_preserve_heading_outline() {
        let doc = SharedDocument::new();
        doc.set_title("Plan");
        doc.add_heading("Position", 2);
        doc.add_heading("Detail", 3);
        doc.add_heading("Final Recommendation", 2);
        let before = doc.list_headings();

        doc.insert_after_heading("Position", "We should ship.");
        doc.replace_section("Detail", "Because tests pass.");
        doc.replace_section("Final Recommendation", "Ship it.");

        assert_eq!(doc.list_headings(), before);
        assert_eq!(
            before,
            "# Plan\n## Position\n### Detail\n## Final Recommendation"
        );
        assert_eq!(doc.headings()[2].level, 3);
    }

    #[test]
    fn test_snapshot_restore() {
        let doc = SharedDocument::new();
        doc.set_title("Keep");
        let snapshot = doc.snapshot();
        doc.append_paragraph("scratch");
        doc.restore(snapshot.clone());
        assert_eq!(doc.content(), snapshot.as_str());
    }

    #[test]
    fn test_is_empty() {
        assert!(SharedDocument::new().is_empty());
        assert!(SharedDocument::from_markdown("\n\n").is_empty());
        assert!(!SharedDocument::from_markdown("# T").is_empty());
    }

    #[test]
    fn test_save_to_file_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("nested").join("doc.md");

        let doc = SharedDocument::new();
        doc.set_title("First");
        let written = doc.save_to_file(&path).unwrap();
        assert!(written.is_absolute());

        doc.set_title("Second");
        doc.save_to_file(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Second\n\n");
    }
}
