//! crates/chunk_view_core/src/truncation.rs
//!
//! Decides whether a chunk's content is long enough to be collapsed behind a
//! "Show more" control.

/// Words assumed to fit on one rendered line.
pub const WORDS_PER_LINE: usize = 20;

/// Lines shown before content is collapsed, unless configured otherwise.
pub const DEFAULT_LINES_TO_SHOW: usize = 10;

/// A coarse word-count heuristic over the raw, markup-bearing content.
///
/// Tokens are produced by splitting on single spaces, so markup and runs of
/// spaces inflate the count. The only guarantee is that more tokens never
/// make truncation less likely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentTruncationPolicy {
    lines_to_show: usize,
}

impl Default for ContentTruncationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LINES_TO_SHOW)
    }
}

impl ContentTruncationPolicy {
    pub fn new(lines_to_show: usize) -> Self {
        Self { lines_to_show }
    }

    pub fn lines_to_show(&self) -> usize {
        self.lines_to_show
    }

    /// The token count above which content is truncated.
    pub fn word_limit(&self) -> usize {
        self.lines_to_show.saturating_mul(WORDS_PER_LINE)
    }

    pub fn needs_truncation(&self, content: &str) -> bool {
        content.split(' ').count() > self.word_limit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn default_limit_is_two_hundred_tokens() {
        let policy = ContentTruncationPolicy::default();
        assert_eq!(policy.word_limit(), 200);
        assert!(!policy.needs_truncation(&words(200)));
        assert!(policy.needs_truncation(&words(201)));
    }

    #[test]
    fn empty_content_is_never_truncated() {
        assert!(!ContentTruncationPolicy::default().needs_truncation(""));
    }

    #[test]
    fn markup_counts_toward_the_limit() {
        let policy = ContentTruncationPolicy::new(1);
        let content = format!("<p class=\"x\"> {} </p>", words(18));
        assert!(policy.needs_truncation(&content));
    }

    #[test]
    fn custom_threshold_scales_limit() {
        let policy = ContentTruncationPolicy::new(2);
        assert!(!policy.needs_truncation(&words(40)));
        assert!(policy.needs_truncation(&words(41)));
    }
}
