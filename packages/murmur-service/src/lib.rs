pub mod embedding;
pub mod ingest;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use search::{
	CulturalRequest, ResonanceRequest, RetrievalMode, RoamingRequest, SearchResponse, Strategy,
};

use std::{future::Future, pin::Pin, sync::Arc};

use murmur_config::{Config, EmbeddingProviderConfig};
use murmur_storage::RecordStore;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, murmur_providers::Result<Vec<f32>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

/// Retrieval engine over a record store. Holds no mutable state, so one instance can serve
/// concurrent requests behind an `Arc`.
pub struct MurmurService {
	pub cfg: Config,
	pub store: Arc<dyn RecordStore>,
	pub providers: Providers,
}
impl MurmurService {
	pub fn new(cfg: Config, store: Arc<dyn RecordStore>) -> Self {
		Self { cfg, store, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn RecordStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, murmur_providers::Result<Vec<f32>>> {
		Box::pin(murmur_providers::embedding::embed(cfg, text))
	}
}
