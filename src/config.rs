use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::settings::{Settings, Strength};

pub const CONFIG_FILENAME: &str = "text-humanizer.toml";
pub const CONFIG_ENV_VAR: &str = "TEXT_HUMANIZER_CONFIG";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub model: ModelSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PipelineSection {
    /// Humanization strength preset: "standard", "high", or "maximum".
    #[serde(default)]
    pub strength: Option<String>,

    #[serde(default)]
    pub use_custom_passes: Option<bool>,
    #[serde(default)]
    pub custom_passes: Option<usize>,

    #[serde(default)]
    pub remove_dashes: Option<bool>,
    #[serde(default)]
    pub save_intermediate: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ModelSection {
    /// Base URL of the rewrite inference server.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Optional `tokenizer.json` used for chunk budgeting. Without it, a
    /// whitespace approximation is used.
    #[serde(default)]
    pub tokenizer: Option<PathBuf>,
}

impl AppConfig {
    /// Baseline run settings from the config file; CLI flags layer on top.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let defaults = Settings::default();
        let strength = match self.pipeline.strength.as_deref() {
            Some(s) => Strength::parse(s)?,
            None => defaults.strength,
        };
        Ok(Settings {
            strength,
            use_custom_passes: self
                .pipeline
                .use_custom_passes
                .unwrap_or(defaults.use_custom_passes),
            custom_passes: self
                .pipeline
                .custom_passes
                .unwrap_or(defaults.custom_passes)
                .max(1),
            remove_dashes: self.pipeline.remove_dashes.unwrap_or(defaults.remove_dashes),
            save_intermediate: self
                .pipeline
                .save_intermediate
                .unwrap_or(defaults.save_intermediate),
        })
    }

    /// Resolves the tokenizer path relative to the config file directory.
    pub fn tokenizer_path(&self, config_path: &Path) -> Option<PathBuf> {
        let p = self.model.tokenizer.clone()?;
        if p.is_relative() {
            let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
            Some(dir.join(p))
        } else {
            Some(p)
        }
    }
}

pub fn find_file_upwards(start: &Path, filename: &str, max_depth: usize) -> Option<PathBuf> {
    let mut dir = Some(start.to_path_buf());
    for _ in 0..max_depth {
        let d = dir?;
        let cand = d.join(filename);
        if cand.is_file() {
            return Some(cand);
        }
        dir = d.parent().map(|p| p.to_path_buf());
    }
    None
}

pub fn find_default_config(workdir: &Path) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, CONFIG_FILENAME, 8) {
            return Some(p);
        }
    }
    if let Some(p) = find_file_upwards(workdir, CONFIG_FILENAME, 8) {
        return Some(p);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, CONFIG_FILENAME, 10) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(CONFIG_FILENAME);
    if cfg_path.exists() && !force {
        return Ok(cfg_path);
    }

    let cfg_text = r#"[pipeline]
# Strength preset controls beams, repetition penalty and default pass count:
#   standard: 1 pass, 4 beams
#   high:     1 pass, 8 beams (recommended)
#   maximum:  2 passes, 10 beams
strength = "high"

# When true, custom_passes overrides the strength-derived pass count.
use_custom_passes = false
custom_passes = 1

# Replace AI-typical long dashes with commas.
remove_dashes = true

# Keep every intermediate paraphrase, not just the final versions.
save_intermediate = true

[model]
# Rewrite inference server (POST /generate, GET /health).
endpoint = "http://127.0.0.1:8763"

# Optional HuggingFace tokenizer.json for exact chunk budgeting.
# tokenizer = "tokenizer.json"
"#;

    std::fs::write(&cfg_path, cfg_text)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}
