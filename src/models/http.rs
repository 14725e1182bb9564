use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::settings::{GenParams, NUM_VERSIONS};

use super::RewriteModel;

/// JSON-over-HTTP adapter to a local seq2seq inference server hosting the
/// rewriting model. Requests carry the full decoding parameter set; responses
/// carry the candidate list and nothing else.
///
/// No request timeout is configured: a hung backend hangs the run, which is
/// the documented behavior of the pipeline.
pub struct HttpRewriteClient {
    base_url: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    beams: usize,
    repetition_penalty: f32,
    length_penalty: f32,
    no_repeat_ngram_size: usize,
    min_length: usize,
    max_length: usize,
    num_return_sequences: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<String>,
}

impl HttpRewriteClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new(),
        }
    }

    /// Readiness probe. The server answers `GET /health` once the model is
    /// loaded onto its device.
    pub fn check_ready(&self) -> anyhow::Result<()> {
        let url = format!("{}/health", self.base_url);
        self.agent
            .get(&url)
            .call()
            .map(|_| ())
            .map_err(|e| anyhow!("backend not ready at {url}: {e}"))
    }
}

impl RewriteModel for HttpRewriteClient {
    fn generate(&mut self, prompt: &str, params: &GenParams) -> anyhow::Result<Vec<String>> {
        let url = format!("{}/generate", self.base_url);
        let request = GenerateRequest {
            prompt,
            beams: params.beams,
            repetition_penalty: params.repetition_penalty,
            length_penalty: params.length_penalty(),
            no_repeat_ngram_size: params.no_repeat_ngram_size(),
            min_length: params.min_length(),
            max_length: params.max_length(),
            num_return_sequences: params.num_return_sequences(),
        };

        let response = self
            .agent
            .post(&url)
            .send_json(&request)
            .with_context(|| format!("call rewrite backend: {url}"))?;
        let response: GenerateResponse = response
            .into_json()
            .context("parse rewrite backend response")?;

        if response.candidates.len() != NUM_VERSIONS {
            return Err(anyhow!(
                "backend returned {} candidates, expected {NUM_VERSIONS}",
                response.candidates.len()
            ));
        }
        Ok(response.candidates)
    }
}
