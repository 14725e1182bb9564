use std::path::Path;

use tokenizers::Tokenizer;

/// Token-count boundary owned by the model runtime. The pipeline only ever
/// uses the count for chunk budgeting; token ids are never exposed downstream.
pub trait TokenCounter {
    fn count(&self, text: &str) -> anyhow::Result<usize>;
}

/// Counts tokens with a HuggingFace `tokenizer.json`, matching what the
/// rewrite model sees.
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
}

impl HfTokenCounter {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("load tokenizer {}: {e}", path.display()))?;
        Ok(Self { tokenizer })
    }
}

impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> anyhow::Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow::anyhow!("tokenize failed: {e}"))?;
        Ok(encoding.get_ids().len())
    }
}

/// Whitespace-token approximation for running without a tokenizer file.
/// Budgeting only needs a rough, monotone measure of chunk size.
pub struct ApproxTokenCounter;

impl TokenCounter for ApproxTokenCounter {
    fn count(&self, text: &str) -> anyhow::Result<usize> {
        Ok(text.split_whitespace().count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_counter_counts_whitespace_tokens() {
        let c = ApproxTokenCounter;
        assert_eq!(c.count("one two three").expect("count"), 3);
        assert_eq!(c.count("   ").expect("count"), 0);
    }
}
