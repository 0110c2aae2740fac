//! Paragraph buffering for plain text lines.

use super::classify::{Category, Fragment};

#[derive(Debug, Clone)]
enum Entry {
    Text { line: usize, text: String },
    Separator { line: usize },
}

/// Buffers fallback lines until some other classification (or the end of
/// input) flushes them.
///
/// Consecutive text lines join into one paragraph with single spaces; each
/// buffered blank line is kept as its own separator fragment.
#[derive(Debug, Clone, Default)]
pub struct ParagraphAccumulator {
    entries: Vec<Entry>,
}

impl ParagraphAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buffer a stripped text line.
    pub fn push_line(&mut self, line: usize, text: &str) {
        self.entries.push(Entry::Text {
            line,
            text: text.to_string(),
        });
    }

    /// Buffer a blank-line separator.
    pub fn push_separator(&mut self, line: usize) {
        self.entries.push(Entry::Separator { line });
    }

    /// Drain the buffer into paragraph and separator fragments.
    pub fn flush(&mut self) -> Vec<Fragment> {
        let mut fragments = Vec::new();
        let mut run: Vec<String> = Vec::new();
        let mut run_start = 0;

        for entry in self.entries.drain(..) {
            match entry {
                Entry::Text { line, text } => {
                    if run.is_empty() {
                        run_start = line;
                    }
                    run.push(text);
                }
                Entry::Separator { line } => {
                    if !run.is_empty() {
                        fragments.push(paragraph(run_start, &run));
                        run.clear();
                    }
                    fragments.push(Fragment::new(Category::Blank, line, "\n"));
                }
            }
        }
        if !run.is_empty() {
            fragments.push(paragraph(run_start, &run));
        }

        fragments
    }
}

fn paragraph(line: usize, run: &[String]) -> Fragment {
    Fragment::new(Category::Paragraph, line, format!("{}\n", run.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flush_yields_nothing() {
        let mut acc = ParagraphAccumulator::new();
        assert!(acc.flush().is_empty());
    }

    #[test]
    fn joins_runs_and_keeps_separators() {
        let mut acc = ParagraphAccumulator::new();
        acc.push_line(3, "first line");
        acc.push_line(4, "continues here");
        acc.push_separator(5);
        acc.push_line(6, "second paragraph");

        let texts: Vec<String> = acc.flush().into_iter().map(|f| f.text).collect();
        assert_eq!(texts, vec!["first line continues here\n", "\n", "second paragraph\n"]);
        assert!(acc.is_empty());
    }

    #[test]
    fn paragraph_fragment_starts_at_first_line() {
        let mut acc = ParagraphAccumulator::new();
        acc.push_line(7, "a");
        acc.push_line(8, "b");
        let fragments = acc.flush();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].line, 7);
        assert_eq!(fragments[0].category, Category::Paragraph);
    }

    #[test]
    fn trailing_separator_is_kept() {
        let mut acc = ParagraphAccumulator::new();
        acc.push_line(0, "text");
        acc.push_separator(1);
        let categories: Vec<Category> = acc.flush().iter().map(|f| f.category).collect();
        assert_eq!(categories, vec![Category::Paragraph, Category::Blank]);
    }
}
