use crate::settings::GenParams;

pub mod http;

pub use http::HttpRewriteClient;

/// Opaque rewrite capability: given a prefixed prompt and beam settings, the
/// backend returns a fixed number of candidate rewrites. No streaming, no
/// partial results. Any error aborts the run that issued the call.
pub trait RewriteModel {
    fn generate(&mut self, prompt: &str, params: &GenParams) -> anyhow::Result<Vec<String>>;
}
