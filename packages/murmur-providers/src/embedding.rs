use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Embeds a single text. The request is bounded by `cfg.timeout_ms`.
pub async fn embed(cfg: &murmur_config::EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let Some(api_key) = cfg.credential() else {
		return Err(Error::InvalidConfig {
			message: "Embedding provider api_key is not configured.".to_string(),
		});
	};
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let body = serde_json::json!({
		"input": normalize_input(text),
		"model": cfg.model,
	});
	let res = client
		.post(cfg.endpoint())
		.headers(crate::auth_headers(api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		let body: String =
			res.text().await.unwrap_or_default().chars().take(MAX_ERROR_BODY_CHARS).collect();

		return Err(Error::Status { status: status.as_u16(), body });
	}

	let json: Value = res.json().await?;

	parse_embedding_response(json)
}

/// Newlines degrade some embedding models, so they are sent as spaces.
pub fn normalize_input(text: &str) -> String {
	text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Truncates a longer vector to `dimensions`. A shorter one is rejected: padding it with zeros
/// would shift its cosine distance to every stored vector.
pub fn fit_dimensions(mut vec: Vec<f32>, dimensions: u32) -> Result<Vec<f32>> {
	let dimensions = dimensions as usize;

	if vec.len() < dimensions {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding has {} dimensions, expected at least {dimensions}.",
				vec.len()
			),
		});
	}

	vec.truncate(dimensions);

	Ok(vec)
}

fn parse_embedding_response(json: Value) -> Result<Vec<f32>> {
	let item = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Embedding response is missing data array.".to_string(),
		})?
		.first()
		.ok_or_else(|| Error::InvalidResponse {
			message: "Embedding response data array is empty.".to_string(),
		})?;
	let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
	})?;
	let mut vec = Vec::with_capacity(embedding.len());

	for value in embedding {
		let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
			message: "Embedding value must be numeric.".to_string(),
		})?;

		vec.push(number as f32);
	}

	if vec.is_empty() {
		return Err(Error::InvalidResponse { message: "Embedding vector is empty.".to_string() });
	}

	Ok(vec)
}
