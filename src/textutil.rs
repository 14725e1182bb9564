use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bparaphraser\b").expect("marker"));

/// Counts task-marker words the model leaked into its output. The rewriting
/// model occasionally echoes the word from its task prefix; those spots need
/// manual fixing.
pub fn count_marker_leaks(text: &str) -> usize {
    MARKER_WORD_RE.find_iter(text).count()
}

#[cfg(test)]
mod tests {
    use super::count_marker_leaks;

    #[test]
    fn counts_leaked_marker_words() {
        assert_eq!(count_marker_leaks("clean output text"), 0);
        assert_eq!(count_marker_leaks("the Paraphraser said: paraphraser"), 2);
        assert_eq!(count_marker_leaks("paraphrasers"), 0);
    }
}
