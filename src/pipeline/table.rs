//! Table caption detection.
//!
//! Extracted table bodies are column soup, so they are not parsed at all:
//! a caption line (containing both `Table` and `:`) is kept in bold and a
//! fixed-size window of following lines is dropped as the table body.

/// Skip span for a table caption at `index`, or `None` if the line is not one.
///
/// A caption needs at least two lines after it. The span is
/// `min(max_skip, total_lines - index)`, counted from the caption itself;
/// when that exceeds the lines actually left, the scan simply runs out first.
pub fn detect_table(line: &str, index: usize, total_lines: usize, max_skip: usize) -> Option<usize> {
    if index + 2 >= total_lines {
        return None;
    }
    if line.contains("Table") && line.contains(':') {
        return Some(max_skip.min(total_lines - index));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_with_long_tail_skips_max() {
        assert_eq!(detect_table("Table 1: Results", 5, 100, 10), Some(10));
    }

    #[test]
    fn caption_near_end_skips_remaining() {
        assert_eq!(detect_table("Table 2: Ablations", 0, 4, 10), Some(4));
    }

    #[test]
    fn needs_two_following_lines() {
        assert_eq!(detect_table("Table 3: Too late", 8, 10, 10), None);
        assert_eq!(detect_table("Table 3: Just enough", 7, 10, 10), Some(3));
    }

    #[test]
    fn requires_keyword_and_colon() {
        assert_eq!(detect_table("Table 4 shows results", 0, 20, 10), None);
        assert_eq!(detect_table("table 4: lowercase", 0, 20, 10), None);
        assert_eq!(detect_table("Note: see below", 0, 20, 10), None);
    }
}
