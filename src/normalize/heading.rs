//! Heading-level correction for converted Markdown.
//!
//! Quarto numbers sections from the heading hierarchy, so a heading may never
//! be more than one level deeper than the heading before it. Deeper headings
//! are clamped to `current + 1`; a level-1 heading resets the hierarchy.
//!
//! # Rules
//!
//! 1. A line starting with `#` is a heading; its depth is the length of the `#` run
//! 2. Runs longer than six characters are not headings and pass through
//! 3. Lines inside fenced code blocks are never headings

use std::borrow::Cow;

/// Longest `#` run treated as a heading marker.
pub const MAX_HEADING_DEPTH: usize = 6;

/// Line-by-line heading corrector.
#[derive(Debug, Clone, Default)]
pub struct HeadingCorrector {
    current_level: usize,
    fence: Option<&'static str>,
}

impl HeadingCorrector {
    /// Create a new corrector with no heading seen yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of the most recent heading (0 before any heading).
    pub fn current_level(&self) -> usize {
        self.current_level
    }

    /// Correct one line, updating the hierarchy state.
    pub fn correct_line<'a>(&mut self, line: &'a str) -> Cow<'a, str> {
        if self.track_fence(line) {
            return Cow::Borrowed(line);
        }

        let depth = line.bytes().take_while(|&b| b == b'#').count();
        if depth == 0 || depth > MAX_HEADING_DEPTH {
            return Cow::Borrowed(line);
        }

        if depth == 1 {
            self.current_level = 1;
            return Cow::Borrowed(line);
        }

        if depth <= self.current_level + 1 {
            self.current_level = depth;
            return Cow::Borrowed(line);
        }

        let level = self.current_level + 1;
        self.current_level = level;
        let (text, ending) = match line.strip_suffix('\r') {
            Some(text) => (text, "\r"),
            None => (line, ""),
        };
        Cow::Owned(format!(
            "{}{}{}",
            "#".repeat(level),
            text[depth..].trim_end(),
            ending
        ))
    }

    /// Returns true when the line opens, closes or sits inside a fenced block.
    fn track_fence(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.fence {
            Some(marker) => {
                if trimmed.starts_with(marker) {
                    self.fence = None;
                }
                true
            }
            None => {
                if trimmed.starts_with("```") {
                    self.fence = Some("```");
                    true
                } else if trimmed.starts_with("~~~") {
                    self.fence = Some("~~~");
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Clamp heading depths so no level is skipped. Line endings are preserved.
pub fn fix_heading_levels(content: &str) -> String {
    let mut corrector = HeadingCorrector::new();
    content
        .split('\n')
        .map(|line| corrector.correct_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn depths(content: &str) -> Vec<usize> {
        content
            .lines()
            .filter(|l| l.starts_with('#'))
            .map(|l| l.bytes().take_while(|&b| b == b'#').count())
            .collect()
    }

    fn doc(depths: &[usize]) -> String {
        depths
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{} Heading {}\n\nBody.\n", "#".repeat(*d), i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_crlf_preserved_on_clamped_heading() {
        let input = "# A\r\n\r\n### B  \r\nText\r\n";
        assert_eq!(fix_heading_levels(input), "# A\r\n\r\n## B\r\nText\r\n");
    }

    #[test]
    fn test_clamps_skipped_levels() {
        let fixed = fix_heading_levels(&doc(&[1, 4, 2, 5]));
        assert_eq!(depths(&fixed), vec![1, 2, 2, 3]);
    }

    #[test]
    fn test_first_heading_deep() {
        let fixed = fix_heading_levels("### Deep start\n");
        assert_eq!(fixed, "# Deep start\n");
    }

    #[test]
    fn test_level_one_resets() {
        let fixed = fix_heading_levels(&doc(&[2, 3, 1, 4]));
        assert_eq!(depths(&fixed), vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_over_six_passes_through() {
        let input = "# Title\n####### not a heading\n";
        assert_eq!(fix_heading_levels(input), input);
    }

    #[test]
    fn test_code_fence_ignored() {
        let input = "# Title\n```python\n#### comment\n```\n### Next\n";
        let fixed = fix_heading_levels(input);
        assert!(fixed.contains("#### comment"));
        assert!(fixed.contains("\n## Next\n"));
    }

    #[test]
    fn test_attributes_preserved() {
        let fixed = fix_heading_levels("# A\n#### B {#sec:b}   \n");
        assert_eq!(fixed, "# A\n## B {#sec:b}\n");
    }

    #[test]
    fn test_preserves_trailing_newlines() {
        let input = "# A\n\n## B\n\n\n";
        assert_eq!(fix_heading_levels(input), input);
    }

    #[test]
    fn test_random_sequences_never_skip() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let len = rng.gen_range(1..20);
            let input: Vec<usize> = (0..len).map(|_| rng.gen_range(1..=6)).collect();
            let fixed = fix_heading_levels(&doc(&input));
            let output = depths(&fixed);
            assert_eq!(output.len(), input.len());

            let mut previous = 0;
            for (original, corrected) in input.iter().zip(&output) {
                assert!(*corrected <= previous + 1, "{:?} -> {:?}", input, output);
                assert!(corrected <= original);
                previous = *corrected;
            }
            assert_eq!(fix_heading_levels(&fixed), fixed);
        }
    }
}
