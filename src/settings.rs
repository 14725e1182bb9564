use anyhow::anyhow;
use serde::Serialize;

/// Task marker the rewriting model was trained on. Every prompt sent to the
/// model starts with this, and the chunk token budget is measured with it
/// included.
pub const TASK_PREFIX: &str = "paraphraser: ";

/// Token budget per chunk, measured as `count(TASK_PREFIX + chunk)`.
pub const CHUNK_TOKEN_BUDGET: usize = 60;

/// Number of candidate sequences requested from the model per pass, and the
/// number of parallel whole-document versions assembled from them.
pub const NUM_VERSIONS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Strength {
    Standard,
    High,
    Maximum,
}

impl Strength {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            "maximum" | "max" => Ok(Self::Maximum),
            other => Err(anyhow!("unknown strength: {other} (expected standard/high/maximum)")),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::High => "High",
            Self::Maximum => "Maximum",
        }
    }

    /// Beam-search parameters for this preset.
    pub fn gen_params(&self) -> GenParams {
        match self {
            Self::Standard => GenParams {
                beams: 4,
                repetition_penalty: 10.0,
            },
            Self::High => GenParams {
                beams: 8,
                repetition_penalty: 12.0,
            },
            Self::Maximum => GenParams {
                beams: 10,
                repetition_penalty: 15.0,
            },
        }
    }

    pub fn default_passes(&self) -> usize {
        match self {
            Self::Standard | Self::High => 1,
            Self::Maximum => 2,
        }
    }
}

/// Strength-derived beam settings. The remaining decoding constraints are
/// fixed for every call (see the `GenParams` accessors).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenParams {
    pub beams: usize,
    pub repetition_penalty: f32,
}

impl GenParams {
    pub fn length_penalty(&self) -> f32 {
        1.5
    }

    pub fn no_repeat_ngram_size(&self) -> usize {
        3
    }

    pub fn min_length(&self) -> usize {
        10
    }

    pub fn max_length(&self) -> usize {
        80
    }

    pub fn num_return_sequences(&self) -> usize {
        NUM_VERSIONS
    }
}

/// Immutable per-run configuration snapshot.
#[derive(Clone, Debug, Serialize)]
pub struct Settings {
    pub strength: Strength,
    pub use_custom_passes: bool,
    pub custom_passes: usize,
    pub remove_dashes: bool,
    pub save_intermediate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strength: Strength::High,
            use_custom_passes: false,
            custom_passes: 1,
            remove_dashes: true,
            save_intermediate: true,
        }
    }
}

impl Settings {
    /// Pass count for a run: the custom override when enabled, otherwise the
    /// strength preset.
    pub fn effective_passes(&self) -> usize {
        if self.use_custom_passes {
            self.custom_passes.max(1)
        } else {
            self.strength.default_passes()
        }
    }

    pub fn gen_params(&self) -> GenParams {
        self.strength.gen_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_table_is_exact() {
        let p = Strength::Standard.gen_params();
        assert_eq!(p.beams, 4);
        assert_eq!(p.repetition_penalty, 10.0);
        assert_eq!(Strength::Standard.default_passes(), 1);

        let p = Strength::High.gen_params();
        assert_eq!(p.beams, 8);
        assert_eq!(p.repetition_penalty, 12.0);
        assert_eq!(Strength::High.default_passes(), 1);

        let p = Strength::Maximum.gen_params();
        assert_eq!(p.beams, 10);
        assert_eq!(p.repetition_penalty, 15.0);
        assert_eq!(Strength::Maximum.default_passes(), 2);
    }

    #[test]
    fn custom_passes_override_strength() {
        let s = Settings {
            strength: Strength::Maximum,
            use_custom_passes: true,
            custom_passes: 3,
            ..Settings::default()
        };
        assert_eq!(s.effective_passes(), 3);

        let s = Settings {
            strength: Strength::Maximum,
            use_custom_passes: false,
            custom_passes: 3,
            ..Settings::default()
        };
        assert_eq!(s.effective_passes(), 2);
    }

    #[test]
    fn parse_strength_accepts_case_variants() {
        assert_eq!(Strength::parse("standard").expect("parse"), Strength::Standard);
        assert_eq!(Strength::parse("HIGH").expect("parse"), Strength::High);
        assert_eq!(Strength::parse("Maximum").expect("parse"), Strength::Maximum);
        assert!(Strength::parse("extreme").is_err());
    }
}
