mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Postgres, Providers, Search, SearchRoaming,
	SearchVocabulary, Service, Storage,
};

use std::{env, fs, path::Path};

pub const MAX_EMBEDDING_TIMEOUT_MS: u64 = 3_000;
pub const MAX_SEARCH_LIMIT: u32 = 200;

pub const ENV_EMBEDDING_API_BASE: &str = "MURMUR_EMBEDDING_API_BASE";
pub const ENV_EMBEDDING_PATH: &str = "MURMUR_EMBEDDING_PATH";
pub const ENV_EMBEDDING_API_KEY: &str = "MURMUR_EMBEDDING_API_KEY";
pub const ENV_EMBEDDING_MODEL: &str = "MURMUR_EMBEDDING_MODEL";
pub const ENV_EMBEDDING_DIMENSIONS: &str = "MURMUR_EMBEDDING_DIMENSIONS";
pub const ENV_PG_DSN: &str = "MURMUR_PG_DSN";
pub const ENV_LOG_LEVEL: &str = "MURMUR_LOG_LEVEL";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	finish(cfg, |name| env::var(name).ok())
}

/// Builds a configuration from defaults plus the process environment.
pub fn load_from_env() -> Result<Config> {
	finish(Config::default(), |name| env::var(name).ok())
}

/// Normalizes, applies overrides from `lookup`, then validates.
pub fn finish<F>(mut cfg: Config, lookup: F) -> Result<Config>
where
	F: Fn(&str) -> Option<String>,
{
	apply_env_overrides(&mut cfg, lookup)?;
	normalize(&mut cfg);
	validate(&cfg)?;

	Ok(cfg)
}

pub fn apply_env_overrides<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
	F: Fn(&str) -> Option<String>,
{
	let embedding = &mut cfg.providers.embedding;

	if let Some(value) = lookup(ENV_EMBEDDING_API_BASE) {
		embedding.api_base = value;
	}
	if let Some(value) = lookup(ENV_EMBEDDING_PATH) {
		embedding.path = value;
	}
	if let Some(value) = lookup(ENV_EMBEDDING_API_KEY) {
		embedding.api_key = Some(value);
	}
	if let Some(value) = lookup(ENV_EMBEDDING_MODEL) {
		embedding.model = value;
	}
	if let Some(value) = lookup(ENV_EMBEDDING_DIMENSIONS) {
		embedding.dimensions = value.trim().parse().map_err(|_| Error::Env {
			name: ENV_EMBEDDING_DIMENSIONS.to_string(),
			message: format!("expected a positive integer, got {value:?}."),
		})?;
	}
	if let Some(value) = lookup(ENV_PG_DSN) {
		cfg.storage.postgres.dsn = value;
	}
	if let Some(value) = lookup(ENV_LOG_LEVEL) {
		cfg.service.log_level = value;
	}

	Ok(())
}

pub fn validate(cfg: &Config) -> Result<()> {
	let embedding = &cfg.providers.embedding;

	if embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if embedding.timeout_ms == 0 || embedding.timeout_ms > MAX_EMBEDDING_TIMEOUT_MS {
		return Err(Error::Validation {
			message: format!(
				"providers.embedding.timeout_ms must be in the range 1-{MAX_EMBEDDING_TIMEOUT_MS}."
			),
		});
	}
	if embedding.credential().is_some() && embedding.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_base must be non-empty when an api_key is set."
				.to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 || cfg.search.default_limit > MAX_SEARCH_LIMIT {
		return Err(Error::Validation {
			message: format!("search.default_limit must be in the range 1-{MAX_SEARCH_LIMIT}."),
		});
	}
	if !(-12..=14).contains(&cfg.search.utc_offset_hours) {
		return Err(Error::Validation {
			message: "search.utc_offset_hours must be in the range -12-14.".to_string(),
		});
	}
	if cfg.search.window_radius_hours >= 12 {
		return Err(Error::Validation {
			message: "search.window_radius_hours must be less than 12.".to_string(),
		});
	}

	let threshold = cfg.search.roaming.threshold_meters;

	if !threshold.is_finite() {
		return Err(Error::Validation {
			message: "search.roaming.threshold_meters must be a finite number.".to_string(),
		});
	}
	if threshold <= 0.0 {
		return Err(Error::Validation {
			message: "search.roaming.threshold_meters must be greater than zero.".to_string(),
		});
	}

	let vocabulary = &cfg.search.vocabulary;

	for (label, words) in [
		("cultural", &vocabulary.cultural),
		("nostalgic", &vocabulary.nostalgic),
		("landmark", &vocabulary.landmark),
	] {
		let Some(words) = words else { continue };

		if words.is_empty() {
			return Err(Error::Validation {
				message: format!("search.vocabulary.{label} must be non-empty when set."),
			});
		}
		if words.iter().any(|word| word.trim().is_empty()) {
			return Err(Error::Validation {
				message: format!("search.vocabulary.{label} must not contain blank entries."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.providers.embedding.credential().is_none() {
		cfg.providers.embedding.api_key = None;
	}
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
