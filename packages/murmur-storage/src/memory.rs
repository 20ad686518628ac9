use std::sync::{
	RwLock,
	atomic::{AtomicUsize, Ordering},
};

use time::OffsetDateTime;
use uuid::Uuid;

use murmur_domain::{
	AudioRecord, Counter, CounterChange, Enrichment, GeoPoint, NewAudioRecord, Predicate,
	RecordQuery, geo, query,
};

use crate::{BoxFuture, Error, RecordStore, Result};

/// Process-local store evaluating predicates and orderings directly over records. Used by tests
/// and by tooling that runs without Postgres.
#[derive(Default)]
pub struct MemoryStore {
	records: RwLock<Vec<AudioRecord>>,
	fetches: AtomicUsize,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_records<I>(records: I) -> Self
	where
		I: IntoIterator<Item = AudioRecord>,
	{
		Self { records: RwLock::new(records.into_iter().collect()), fetches: AtomicUsize::new(0) }
	}

	/// Inserts or replaces a fully formed record.
	pub fn insert(&self, record: AudioRecord) -> Result<()> {
		let mut records = self.write()?;

		match records.iter_mut().find(|existing| existing.record_id == record.record_id) {
			Some(existing) => *existing = record,
			None => records.push(record),
		}

		Ok(())
	}

	/// Number of [`RecordStore::fetch`] calls served so far.
	pub fn queries_issued(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}

	pub fn len(&self) -> Result<usize> {
		Ok(self.read()?.len())
	}

	pub fn is_empty(&self) -> Result<bool> {
		Ok(self.read()?.is_empty())
	}

	fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<AudioRecord>>> {
		self.records
			.read()
			.map_err(|_| Error::Unavailable("Memory store lock is poisoned.".to_string()))
	}

	fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<AudioRecord>>> {
		self.records
			.write()
			.map_err(|_| Error::Unavailable("Memory store lock is poisoned.".to_string()))
	}

	fn fetch_now(&self, query: &RecordQuery) -> Result<Vec<AudioRecord>> {
		self.fetches.fetch_add(1, Ordering::SeqCst);

		let records = self.read()?;

		Ok(query::execute(records.iter(), query))
	}

	fn centroid_now(&self, filter: &Predicate) -> Result<Option<GeoPoint>> {
		let records = self.read()?;

		let points = records.iter().filter(|record| filter.matches(record)).map(AudioRecord::point);

		Ok(geo::centroid(points))
	}

	fn get_now(&self, record_id: Uuid) -> Result<Option<AudioRecord>> {
		let records = self.read()?;

		Ok(records.iter().find(|record| record.record_id == record_id).cloned())
	}

	fn insert_now(&self, record: NewAudioRecord) -> Result<AudioRecord> {
		if !GeoPoint::new(record.latitude, record.longitude).is_valid() {
			return Err(Error::InvalidArgument(format!(
				"Coordinates ({}, {}) are out of range.",
				record.latitude, record.longitude
			)));
		}

		let record = record.into_record(Uuid::new_v4(), OffsetDateTime::now_utc());

		self.write()?.push(record.clone());

		Ok(record)
	}

	fn complete_now(
		&self,
		record_id: Uuid,
		enrichment: &Enrichment,
		embedding: Option<&[f32]>,
	) -> Result<AudioRecord> {
		let mut records = self.write()?;
		let record = records
			.iter_mut()
			.find(|record| record.record_id == record_id)
			.ok_or_else(|| Error::NotFound(format!("Record {record_id} does not exist.")))?;

		if record.processed_at.is_some() {
			return Err(Error::Conflict(format!("Record {record_id} was already processed.")));
		}

		record.transcript = enrichment.transcript.clone();
		record.emotion_tag = enrichment.emotion_tag.clone();
		record.generated_story = enrichment.generated_story.clone();
		record.scene_tags = enrichment.scene_tags.clone();
		record.embedding = embedding.map(<[f32]>::to_vec);
		record.processed_at = Some(OffsetDateTime::now_utc());

		Ok(record.clone())
	}

	fn adjust_now(
		&self,
		record_id: Uuid,
		counter: Counter,
		change: CounterChange,
	) -> Result<AudioRecord> {
		let mut records = self.write()?;
		let record = records
			.iter_mut()
			.find(|record| record.record_id == record_id)
			.ok_or_else(|| Error::NotFound(format!("Record {record_id} does not exist.")))?;

		record.adjust_counter(counter, change);

		Ok(record.clone())
	}
}

impl RecordStore for MemoryStore {
	fn fetch<'a>(&'a self, query: &'a RecordQuery) -> BoxFuture<'a, Result<Vec<AudioRecord>>> {
		Box::pin(async move { self.fetch_now(query) })
	}

	fn centroid<'a>(&'a self, filter: &'a Predicate) -> BoxFuture<'a, Result<Option<GeoPoint>>> {
		Box::pin(async move { self.centroid_now(filter) })
	}

	fn distance_meters(&self, a: GeoPoint, b: GeoPoint) -> BoxFuture<'_, Result<f64>> {
		Box::pin(async move { Ok(geo::haversine_meters(a, b)) })
	}

	fn get_record(&self, record_id: Uuid) -> BoxFuture<'_, Result<Option<AudioRecord>>> {
		Box::pin(async move { self.get_now(record_id) })
	}

	fn insert_record(&self, record: NewAudioRecord) -> BoxFuture<'_, Result<AudioRecord>> {
		Box::pin(async move { self.insert_now(record) })
	}

	fn complete_processing<'a>(
		&'a self,
		record_id: Uuid,
		enrichment: &'a Enrichment,
		embedding: Option<&'a [f32]>,
	) -> BoxFuture<'a, Result<AudioRecord>> {
		Box::pin(async move { self.complete_now(record_id, enrichment, embedding) })
	}

	fn adjust_counter(
		&self,
		record_id: Uuid,
		counter: Counter,
		change: CounterChange,
	) -> BoxFuture<'_, Result<AudioRecord>> {
		Box::pin(async move { self.adjust_now(record_id, counter, change) })
	}
}
