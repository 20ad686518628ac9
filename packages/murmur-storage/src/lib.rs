pub mod db;
pub mod memory;
pub mod models;
pub mod queries;
pub mod schema;
pub mod sql;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use uuid::Uuid;

use murmur_domain::{
	AudioRecord, Counter, CounterChange, Enrichment, GeoPoint, NewAudioRecord, Predicate,
	RecordQuery,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Query surface the ranking strategies run against. Implementations translate the predicate
/// tree and ordering keys into their own query language.
pub trait RecordStore
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, query: &'a RecordQuery) -> BoxFuture<'a, Result<Vec<AudioRecord>>>;

	/// Mean point of every record matching `filter`, or `None` when nothing matches.
	fn centroid<'a>(&'a self, filter: &'a Predicate) -> BoxFuture<'a, Result<Option<GeoPoint>>>;

	/// Great-circle distance in meters.
	fn distance_meters(&self, a: GeoPoint, b: GeoPoint) -> BoxFuture<'_, Result<f64>>;

	fn get_record(&self, record_id: Uuid) -> BoxFuture<'_, Result<Option<AudioRecord>>>;

	fn insert_record(&self, record: NewAudioRecord) -> BoxFuture<'_, Result<AudioRecord>>;

	/// Applies the one-time enrichment. Fails with [`Error::Conflict`] when the record was
	/// already processed and [`Error::NotFound`] when it does not exist.
	fn complete_processing<'a>(
		&'a self,
		record_id: Uuid,
		enrichment: &'a Enrichment,
		embedding: Option<&'a [f32]>,
	) -> BoxFuture<'a, Result<AudioRecord>>;

	/// Moves a reaction counter by one and returns the updated record. Counters never drop below
	/// zero. Fails with [`Error::NotFound`] for unknown records.
	fn adjust_counter(
		&self,
		record_id: Uuid,
		counter: Counter,
		change: CounterChange,
	) -> BoxFuture<'_, Result<AudioRecord>>;
}
