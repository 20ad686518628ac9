use std::time::Duration;

use murmur_config::EmbeddingProviderConfig;
use murmur_providers::embedding::fit_dimensions;

use crate::{EmbeddingProvider, MurmurService};

/// Embeds `text` for retrieval, or returns `None` when semantic search is unavailable.
///
/// Blank text and a missing credential short-circuit without a provider call. Every provider
/// failure, including exceeding `cfg.timeout_ms`, is logged and reported as `None`.
pub async fn embed_or_none(
	provider: &dyn EmbeddingProvider,
	cfg: &EmbeddingProviderConfig,
	text: &str,
) -> Option<Vec<f32>> {
	let text = text.trim();

	if text.is_empty() {
		return None;
	}
	if cfg.credential().is_none() {
		tracing::debug!("Embedding credential is not configured; vector search is disabled.");

		return None;
	}

	let budget = Duration::from_millis(cfg.timeout_ms);
	let vec = match tokio::time::timeout(budget, provider.embed(cfg, text)).await {
		Ok(Ok(vec)) => vec,
		Ok(Err(err)) => {
			tracing::warn!(
				error = %err,
				timed_out = err.is_timeout(),
				provider_id = cfg.provider_id.as_str(),
				"Embedding provider call failed."
			);

			return None;
		},
		Err(_) => {
			tracing::warn!(
				timeout_ms = cfg.timeout_ms,
				provider_id = cfg.provider_id.as_str(),
				"Embedding provider call timed out."
			);

			return None;
		},
	};

	match fit_dimensions(vec, cfg.dimensions) {
		Ok(vec) => Some(vec),
		Err(err) => {
			tracing::warn!(error = %err, expected = cfg.dimensions, "Embedding rejected.");

			None
		},
	}
}

impl MurmurService {
	pub(crate) async fn query_vector(&self, text: &str) -> Option<Vec<f32>> {
		embed_or_none(self.providers.embedding.as_ref(), &self.cfg.providers.embedding, text).await
	}
}
