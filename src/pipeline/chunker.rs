use once_cell::sync::Lazy;
use regex::Regex;

use crate::settings::TASK_PREFIX;
use crate::tokenizer::TokenCounter;

static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("sentence re"));
static PART_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;]\s+").expect("part re"));

/// Splits `text` into sentences at `.`/`!`/`?` followed by whitespace. The
/// terminal punctuation stays with its sentence. Input without any terminal
/// punctuation is one sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();
    let mut last = 0usize;
    for m in SENTENCE_END_RE.find_iter(text) {
        // The boundary char is one ASCII byte; keep it on the sentence.
        let end = m.start() + 1;
        push_trimmed(&mut sentences, &text[last..end]);
        last = m.end();
    }
    push_trimmed(&mut sentences, &text[last..]);
    sentences
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let s = fragment.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

/// Greedily packs sentences into chunks whose token count, measured with the
/// task prefix included, stays within `budget`.
///
/// A single sentence over budget is split on comma/semicolon boundaries and
/// each part becomes its own chunk, even when a part is still over budget:
/// oversized parts are truncated by the model at generation time, and
/// downstream behavior depends on them being passed through as-is.
pub fn chunk(text: &str, counter: &dyn TokenCounter, budget: usize) -> anyhow::Result<Vec<String>> {
    let sentences = split_sentences(text);

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let sentence_tokens = counter.count(&format!("{TASK_PREFIX}{sentence}"))?;

        if sentence_tokens > budget {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            for part in PART_SPLIT_RE.split(&sentence) {
                let part = part.trim();
                if !part.is_empty() {
                    chunks.push(part.to_string());
                }
            }
            continue;
        }

        if current.is_empty() {
            current = sentence;
            continue;
        }

        let joined = format!("{current} {sentence}");
        if counter.count(&format!("{TASK_PREFIX}{joined}"))? > budget {
            chunks.push(std::mem::take(&mut current));
            current = sentence;
        } else {
            current = joined;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::ApproxTokenCounter;

    #[test]
    fn splits_on_terminal_punctuation() {
        let s = split_sentences("First one. Second one!  Third?\nFourth");
        assert_eq!(s, vec!["First one.", "Second one!", "Third?", "Fourth"]);
    }

    #[test]
    fn input_without_punctuation_is_one_sentence() {
        let s = split_sentences("no terminal punctuation here");
        assert_eq!(s, vec!["no terminal punctuation here"]);
    }

    #[test]
    fn packs_sentences_up_to_budget() {
        // Each sentence is 3 whitespace tokens + 1 for the prefix.
        let text = "one two three. four five six. seven eight nine.";
        let chunks = chunk(text, &ApproxTokenCounter, 7).expect("chunk");
        assert_eq!(
            chunks,
            vec!["one two three. four five six.", "seven eight nine."]
        );
    }

    #[test]
    fn oversized_sentence_splits_on_commas() {
        let text = "alpha beta gamma delta, epsilon zeta; eta theta";
        let chunks = chunk(text, &ApproxTokenCounter, 4).expect("chunk");
        assert_eq!(chunks, vec!["alpha beta gamma delta", "epsilon zeta", "eta theta"]);
    }

    #[test]
    fn oversized_part_is_accepted_as_its_own_chunk() {
        // No comma boundary at all: the whole sentence passes through over
        // budget rather than being rejected.
        let text = "one two three four five six seven";
        let chunks = chunk(text, &ApproxTokenCounter, 3).expect("chunk");
        assert_eq!(chunks, vec!["one two three four five six seven"]);
    }

    #[test]
    fn no_chunk_is_empty_and_order_is_preserved() {
        let text = "A one. B two. C three, with a tail; and more. D four.";
        let chunks = chunk(text, &ApproxTokenCounter, 4).expect("chunk");
        assert!(!chunks.is_empty());
        assert!(chunks.iter().all(|c| !c.trim().is_empty()));
        let rejoined = chunks.join(" ");
        assert!(rejoined.starts_with("A one."));
        assert!(rejoined.ends_with("D four."));
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk("   ", &ApproxTokenCounter, 60).expect("chunk").is_empty());
    }
}
