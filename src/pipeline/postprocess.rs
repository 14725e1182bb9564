use once_cell::sync::Lazy;
use regex::Regex;

static DASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[\u{2014}\u{2013}]\s*").expect("dash re"));
static DOUBLE_COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*,").expect("double comma re"));
static COMMA_SPACING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").expect("comma re"));
static COMMA_PERIOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*\.").expect("comma period re"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws re"));

/// Deterministic humanization of one model candidate. Pure text transform,
/// idempotent: re-applying it to its own output is a no-op.
///
/// With `remove_dashes`, em/en-dashes become `", "`, doubled commas collapse,
/// comma spacing is normalized to `", "`, and a comma directly before a
/// period is dropped. Whitespace runs always collapse to a single space.
pub fn normalize(candidate: &str, remove_dashes: bool) -> String {
    let mut result = candidate.to_string();

    if remove_dashes {
        result = DASH_RE.replace_all(&result, ", ").into_owned();
        loop {
            let collapsed = DOUBLE_COMMA_RE.replace_all(&result, ",").into_owned();
            if collapsed == result {
                break;
            }
            result = collapsed;
        }
        result = COMMA_SPACING_RE.replace_all(&result, ", ").into_owned();
        result = COMMA_PERIOD_RE.replace_all(&result, ".").into_owned();
    }

    WHITESPACE_RE.replace_all(&result, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_dashes_with_commas() {
        assert_eq!(normalize("A — B.", true), "A, B.");
        assert_eq!(normalize("A—B.", true), "A, B.");
        assert_eq!(normalize("A – B", true), "A, B");
    }

    #[test]
    fn keeps_dashes_when_disabled() {
        assert_eq!(normalize("A — B.", false), "A — B.");
    }

    #[test]
    fn collapses_doubled_commas() {
        assert_eq!(normalize("a,, b", true), "a, b");
        assert_eq!(normalize("a,,,, b", true), "a, b");
        assert_eq!(normalize("a , , b", true), "a, b");
    }

    #[test]
    fn drops_comma_before_sentence_final_period() {
        assert_eq!(normalize("the end, .", true), "the end.");
        assert_eq!(normalize("the end,.", true), "the end.");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize("  a \t b\n c  ", false), "a b c");
        assert_eq!(normalize("  a \t b\n c  ", true), "a b c");
    }

    #[test]
    fn dash_next_to_comma_does_not_double_up() {
        assert_eq!(normalize("one, — two", true), "one, two");
    }

    #[test]
    fn idempotent_on_varied_inputs() {
        let samples = [
            "A — B, — C,. done",
            "plain text with no punctuation issues",
            "x,,y — z  .",
            "  spaced   out — dashes – here ,, now . ",
            "",
        ];
        for s in samples {
            for remove_dashes in [false, true] {
                let once = normalize(s, remove_dashes);
                let twice = normalize(&once, remove_dashes);
                assert_eq!(once, twice, "not idempotent for {s:?}");
            }
        }
    }
}
