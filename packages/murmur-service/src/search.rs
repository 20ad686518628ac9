pub mod cultural;
pub mod fallback;
pub mod resonance;
pub mod roaming;

use serde::{Deserialize, Serialize};

use murmur_config::MAX_SEARCH_LIMIT;
use murmur_domain::{AudioRecord, Locality, vocabulary};

use crate::{Error, MurmurService, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
	Resonance,
	Cultural,
	Roaming,
}

/// Which branch produced the results: query-vector similarity or keyword filtering.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
	Vector,
	Keyword,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResonanceRequest {
	pub query: String,
	/// Requester's local hour of day, 0-23.
	pub local_hour: u8,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CulturalRequest {
	pub query: String,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoamingRequest {
	pub query: String,
	pub latitude: f64,
	pub longitude: f64,
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub strategy: Strategy,
	pub mode: RetrievalMode,
	/// Whether the results came from the relaxed retry.
	pub relaxed: bool,
	/// Requester classification, set by the roaming strategy only.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub locality: Option<Locality>,
	pub items: Vec<AudioRecord>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum VocabularyKind {
	Cultural,
	Nostalgic,
	Landmark,
}
impl VocabularyKind {
	pub(crate) fn for_locality(locality: Locality) -> Self {
		match locality {
			Locality::Roaming => Self::Nostalgic,
			Locality::Local => Self::Landmark,
		}
	}
}

impl MurmurService {
	/// Caller limit, else the configured default, capped at [`MAX_SEARCH_LIMIT`].
	pub(crate) fn resolve_limit(&self, limit: Option<u32>) -> Result<u32> {
		match limit {
			Some(0) => Err(Error::invalid("limit must be greater than zero.")),
			Some(limit) => Ok(limit.min(MAX_SEARCH_LIMIT)),
			None => Ok(self.cfg.search.default_limit.clamp(1, MAX_SEARCH_LIMIT)),
		}
	}

	/// Configured vocabulary override, else the built-in list.
	pub(crate) fn vocabulary(&self, kind: VocabularyKind) -> Vec<String> {
		let overrides = &self.cfg.search.vocabulary;
		let (custom, builtin) = match kind {
			VocabularyKind::Cultural => (&overrides.cultural, vocabulary::CULTURAL),
			VocabularyKind::Nostalgic => (&overrides.nostalgic, vocabulary::NOSTALGIC),
			VocabularyKind::Landmark => (&overrides.landmark, vocabulary::LANDMARK),
		};

		custom.clone().unwrap_or_else(|| vocabulary::owned(builtin))
	}
}
